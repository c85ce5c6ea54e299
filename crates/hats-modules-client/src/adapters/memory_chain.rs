//! # In-Memory Chain
//!
//! A single-node chain emulating the module factory and module instances,
//! implementing both [`PublicClient`] and [`WalletClient`]. Module behaviour
//! is scripted per implementation through [`InstanceLogic`].
//!
//! Transactions execute atomically against a copy of the world state; a
//! revert discards the copy and mines a `reverted` receipt. Calls execute the
//! same way and never commit.

use crate::domain::codec::{self, DynSolValue};
use crate::domain::entities::{Log, TransactionReceipt, TransactionStatus};
use crate::domain::factory::{
    encode_address_return, encode_uint_return, FactoryCall, ModuleDeployedEvent,
    ModuleDeployment, HAT_ID, IMPLEMENTATION,
};
use crate::domain::services::{
    encode_revert_message, function_selector, keccak256, predict_instance_address,
};
use crate::domain::value_objects::{to_abi_uint, Address, Bytes, ChainId, Hash, U256};
use crate::errors::RpcError;
use crate::ports::outbound::{CallRequest, PublicClient, TransactionRequest, WalletClient};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, trace};

/// `HatsModuleFactory_ModuleAlreadyDeployed(address,uint256,bytes)`.
const ALREADY_DEPLOYED_ERROR: &str = "HatsModuleFactory_ModuleAlreadyDeployed(address,uint256,bytes)";

/// Scripted behaviour of a module implementation.
///
/// Return `Err(revert_data)` to revert; the data is surfaced to callers
/// verbatim (use [`encode_revert_message`] or a custom error selector).
pub trait InstanceLogic: Send + Sync {
    /// Runs once when the factory deploys an instance, with its ABI-encoded
    /// mutable arguments.
    fn set_up(&self, ctx: &mut InstanceContext<'_>, init_data: &[u8]) -> Result<(), Vec<u8>> {
        let _ = (ctx, init_data);
        Ok(())
    }

    /// Handles a call to the instance. `IMPLEMENTATION()` and `hatId()` are
    /// answered by the chain and never reach this method.
    fn call(&self, ctx: &mut InstanceContext<'_>, caller: Address, data: &[u8]) -> Result<Vec<u8>, Vec<u8>>;
}

/// View of one instance handed to [`InstanceLogic`].
pub struct InstanceContext<'a> {
    /// Instance address.
    pub address: Address,
    /// Implementation the instance clones.
    pub implementation: Address,
    /// Hat the instance serves.
    pub hat_id: U256,
    /// Module-specific packed immutable arguments.
    pub immutable_args: &'a [u8],
    storage: &'a mut BTreeMap<Vec<u8>, Vec<u8>>,
}

impl InstanceContext<'_> {
    /// Reads a storage entry.
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.storage.get(key).map(Vec::as_slice)
    }

    /// Writes a storage entry.
    pub fn set(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.storage.insert(key.into(), value.into());
    }

    /// Deletes a storage entry.
    pub fn remove(&mut self, key: &[u8]) -> Option<Vec<u8>> {
        self.storage.remove(key)
    }
}

/// A deployed instance as recorded by the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceRecord {
    pub implementation: Address,
    pub hat_id: U256,
    pub immutable_args: Vec<u8>,
    pub init_data: Vec<u8>,
    pub storage: BTreeMap<Vec<u8>, Vec<u8>>,
}

#[derive(Clone, Default)]
struct World {
    code: HashMap<Address, Bytes>,
    instances: HashMap<Address, InstanceRecord>,
}

#[derive(Default)]
struct ChainState {
    world: World,
    block_number: u64,
    nonce: u64,
    receipts: HashMap<Hash, TransactionReceipt>,
    sent: Vec<TransactionRequest>,
    calls: u64,
}

/// In-memory chain with a module factory.
pub struct InMemoryChain {
    chain_id: ChainId,
    factory: Address,
    default_account: Address,
    logic: Mutex<HashMap<Address, Arc<dyn InstanceLogic>>>,
    state: Mutex<ChainState>,
}

impl InMemoryChain {
    /// Default signing account.
    pub const DEFAULT_ACCOUNT: Address = Address::new([
        0xf3, 0x9f, 0xd6, 0xe5, 0x1a, 0xad, 0x88, 0xf6, 0xf4, 0xce, 0x6a, 0xb8, 0x82, 0x72, 0x79,
        0xcf, 0xff, 0xb9, 0x22, 0x66,
    ]);

    /// Create a chain with a factory deployed at `factory`.
    #[must_use]
    pub fn new(chain_id: ChainId, factory: Address) -> Self {
        let mut state = ChainState::default();
        state
            .world
            .code
            .insert(factory, Bytes::from(b"hats-module-factory".to_vec()));
        Self {
            chain_id,
            factory,
            default_account: Self::DEFAULT_ACCOUNT,
            logic: Mutex::new(HashMap::new()),
            state: Mutex::new(state),
        }
    }

    /// Use `account` when a request names no sender.
    #[must_use]
    pub fn with_default_account(mut self, account: Address) -> Self {
        self.default_account = account;
        self
    }

    /// Scripts the behaviour of instances of `implementation`.
    pub fn register_logic(&self, implementation: Address, logic: Arc<dyn InstanceLogic>) {
        self.logic.lock().insert(implementation, logic);
    }

    /// Factory address.
    #[must_use]
    pub fn factory(&self) -> Address {
        self.factory
    }

    /// Snapshot of a deployed instance.
    #[must_use]
    pub fn instance(&self, address: Address) -> Option<InstanceRecord> {
        self.state.lock().world.instances.get(&address).cloned()
    }

    /// Transactions submitted so far, in order.
    #[must_use]
    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.state.lock().sent.clone()
    }

    /// Number of read-only calls served so far.
    #[must_use]
    pub fn call_count(&self) -> u64 {
        self.state.lock().calls
    }

    /// Current block number.
    #[must_use]
    pub fn block_number(&self) -> u64 {
        self.state.lock().block_number
    }

    fn logic_for(&self, implementation: Address) -> Option<Arc<dyn InstanceLogic>> {
        self.logic.lock().get(&implementation).cloned()
    }

    /// Executes `data` from `caller` to `to` against `world`.
    fn execute(
        &self,
        world: &mut World,
        caller: Address,
        to: Address,
        data: &[u8],
    ) -> Result<(Vec<u8>, Vec<Log>), Vec<u8>> {
        if to == self.factory {
            return self.execute_factory(world, data);
        }
        if world.instances.contains_key(&to) {
            return self.execute_instance(world, caller, to, data).map(|out| (out, Vec::new()));
        }
        if world.code.contains_key(&to) {
            // Contract without scripted behaviour.
            return Err(Vec::new());
        }
        // Plain account: nothing to run.
        Ok((Vec::new(), Vec::new()))
    }

    fn execute_factory(&self, world: &mut World, data: &[u8]) -> Result<(Vec<u8>, Vec<Log>), Vec<u8>> {
        let call = FactoryCall::decode(data).map_err(|e| encode_revert_message(&e.to_string()))?;
        match call {
            Some(FactoryCall::Create(deployment)) => {
                let (instance, log) = self.deploy(world, &deployment)?;
                Ok((encode_address_return(instance), vec![log]))
            }
            Some(FactoryCall::BatchCreate(deployments)) => {
                let mut logs = Vec::with_capacity(deployments.len());
                for deployment in &deployments {
                    logs.push(self.deploy(world, deployment)?.1);
                }
                let mut success = vec![0u8; 32];
                success[31] = 1;
                Ok((success, logs))
            }
            Some(FactoryCall::PredictAddress {
                implementation,
                hat_id,
                other_immutable_args,
            }) => {
                let predicted = predict_instance_address(
                    self.factory,
                    implementation,
                    hat_id,
                    &other_immutable_args,
                    self.chain_id,
                );
                Ok((encode_address_return(predicted), Vec::new()))
            }
            None => Err(Vec::new()),
        }
    }

    fn deploy(&self, world: &mut World, deployment: &ModuleDeployment) -> Result<(Address, Log), Vec<u8>> {
        let instance = predict_instance_address(
            self.factory,
            deployment.implementation,
            deployment.hat_id,
            &deployment.other_immutable_args,
            self.chain_id,
        );
        if world.code.contains_key(&instance) {
            let mut revert = function_selector(ALREADY_DEPLOYED_ERROR).to_vec();
            revert.extend(codec::encode(&[
                DynSolValue::Address(deployment.implementation.into()),
                DynSolValue::Uint(to_abi_uint(deployment.hat_id), 256),
                DynSolValue::Bytes(deployment.other_immutable_args.clone()),
            ]));
            return Err(revert);
        }

        let mut record = InstanceRecord {
            implementation: deployment.implementation,
            hat_id: deployment.hat_id,
            immutable_args: deployment.other_immutable_args.clone(),
            init_data: deployment.init_data.clone(),
            storage: BTreeMap::new(),
        };
        if let Some(logic) = self.logic_for(deployment.implementation) {
            let mut ctx = InstanceContext {
                address: instance,
                implementation: record.implementation,
                hat_id: record.hat_id,
                immutable_args: &record.immutable_args,
                storage: &mut record.storage,
            };
            logic.set_up(&mut ctx, &deployment.init_data)?;
        }

        let mut code = deployment.implementation.as_bytes().to_vec();
        code.extend_from_slice(&deployment.other_immutable_args);
        world.code.insert(instance, Bytes::from(code));
        world.instances.insert(instance, record);
        debug!(%instance, implementation = %deployment.implementation, "module instance deployed");

        let log = ModuleDeployedEvent {
            implementation: deployment.implementation,
            instance,
            hat_id: deployment.hat_id,
            other_immutable_args: deployment.other_immutable_args.clone(),
            init_data: deployment.init_data.clone(),
        }
        .to_log(self.factory);
        Ok((instance, log))
    }

    fn execute_instance(
        &self,
        world: &mut World,
        caller: Address,
        address: Address,
        data: &[u8],
    ) -> Result<Vec<u8>, Vec<u8>> {
        let record = world.instances.get_mut(&address).ok_or_else(Vec::new)?;
        let selector = data.get(..4).unwrap_or_default();

        if selector == function_selector(IMPLEMENTATION) {
            return Ok(encode_address_return(record.implementation));
        }
        if selector == function_selector(HAT_ID) {
            return Ok(encode_uint_return(record.hat_id));
        }

        let logic = self.logic_for(record.implementation).ok_or_else(Vec::new)?;
        let mut ctx = InstanceContext {
            address,
            implementation: record.implementation,
            hat_id: record.hat_id,
            immutable_args: &record.immutable_args,
            storage: &mut record.storage,
        };
        logic.call(&mut ctx, caller, data)
    }
}

#[async_trait]
impl PublicClient for InMemoryChain {
    async fn chain_id(&self) -> Result<ChainId, RpcError> {
        Ok(self.chain_id)
    }

    async fn call(&self, request: CallRequest) -> Result<Bytes, RpcError> {
        let mut world = {
            let mut state = self.state.lock();
            state.calls += 1;
            state.world.clone()
        };
        let caller = request.from.unwrap_or(self.default_account);
        trace!(to = %request.to, "eth_call");
        self.execute(&mut world, caller, request.to, request.data.as_slice())
            .map(|(out, _)| Bytes::from(out))
            .map_err(|data| RpcError::Reverted {
                message: format!("execution reverted (0x{})", hex::encode(&data)),
                data: Bytes::from(data),
            })
    }

    async fn get_code(&self, address: Address) -> Result<Bytes, RpcError> {
        Ok(self
            .state
            .lock()
            .world
            .code
            .get(&address)
            .cloned()
            .unwrap_or_default())
    }

    async fn wait_for_transaction_receipt(&self, hash: Hash) -> Result<TransactionReceipt, RpcError> {
        self.state
            .lock()
            .receipts
            .get(&hash)
            .cloned()
            .ok_or_else(|| RpcError::NotFound(format!("transaction {hash}")))
    }
}

#[async_trait]
impl WalletClient for InMemoryChain {
    async fn chain_id(&self) -> Result<ChainId, RpcError> {
        Ok(self.chain_id)
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<Hash, RpcError> {
        let caller = request.from.unwrap_or(self.default_account);
        let mut state = self.state.lock();

        let mut preimage = state.nonce.to_be_bytes().to_vec();
        preimage.extend_from_slice(caller.as_bytes());
        preimage.extend_from_slice(request.to.as_bytes());
        preimage.extend_from_slice(request.data.as_slice());
        let hash = keccak256(&preimage);
        state.nonce += 1;
        state.block_number += 1;

        let mut world = state.world.clone();
        let (status, logs) = match self.execute(&mut world, caller, request.to, request.data.as_slice()) {
            Ok((_, logs)) => {
                state.world = world;
                (TransactionStatus::Success, logs)
            }
            Err(data) => {
                debug!(%hash, revert = %hex::encode(&data), "transaction reverted");
                (TransactionStatus::Reverted, Vec::new())
            }
        };

        let receipt = TransactionReceipt {
            transaction_hash: hash,
            status,
            block_number: state.block_number,
            logs,
        };
        state.receipts.insert(hash, receipt);
        state.sent.push(request);
        Ok(hash)
    }
}

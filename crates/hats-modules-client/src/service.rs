//! # Modules Client Service
//!
//! `ModulesClient` ties the registry index, the argument marshaller and the
//! network ports together and implements [`ModulesApi`].
//!
//! Every operation follows the same order of checks, failing fast before any
//! network traffic:
//! 1. registry loaded (`ClientNotPrepared`)
//! 2. required collaborators present (`MissingWalletClient` / `MissingPublicClient`)
//! 3. module known and deployed on the active network (`ModuleNotAvailable`)
//! 4. argument count and types (`ParametersLengthsMismatch` / `InvalidParam`)
//!
//! Writes are simulated with a read-only call first so reverts surface as
//! `TransactionReverted` carrying the decoded reason.

use crate::adapters::HttpRegistrySource;
use crate::domain::abi::{self, is_read_only, param_types, AbiExt, Function, JsonAbi};
use crate::domain::codec::{self, DynSolType, DynSolValue};
use crate::domain::config::ClientConfig;
use crate::domain::entities::{
    BatchCreateInstancesResult, CallInstanceWriteFunctionResult, ChainModule,
    CreateInstanceResult, Module, ModuleCreationArg, ModuleFilter, ModuleParameter, Registry,
    TransactionReceipt, TransactionResult, TransactionStatus,
};
use crate::domain::factory::{
    batch_create_calldata, chain_immutable_args, create_module_calldata, decode_address_return,
    deployed_instances, getter_calldata, module_address_calldata, ModuleDeployment,
    IMPLEMENTATION,
};
use crate::domain::marshal::{marshal_args, to_json, ArgSpec};
use crate::domain::registry::RegistryIndex;
use crate::domain::services::decode_revert;
use crate::domain::value_objects::{Address, Bytes, ChainId, HatId, U256};
use crate::errors::{ModulesError, RpcError};
use crate::ports::inbound::{
    BatchCreateInstancesRequest, CallWriteFunctionRequest, CreateChainRequest,
    CreateInstanceRequest, ModulesApi, PredictInstanceRequest, ReadInstanceRequest,
};
use crate::ports::outbound::{
    CallRequest, PublicClient, RegistrySource, TransactionRequest, WalletClient,
};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// =============================================================================
// BUILDER
// =============================================================================

/// Builder for [`ModulesClient`].
#[derive(Default)]
pub struct ModulesClientBuilder {
    config: ClientConfig,
    public_client: Option<Arc<dyn PublicClient>>,
    wallet_client: Option<Arc<dyn WalletClient>>,
    registry_source: Option<Arc<dyn RegistrySource>>,
}

impl ModulesClientBuilder {
    /// Client configuration.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Collaborator for reads and receipts.
    #[must_use]
    pub fn public_client(mut self, client: Arc<dyn PublicClient>) -> Self {
        self.public_client = Some(client);
        self
    }

    /// Collaborator for signing and submitting transactions.
    #[must_use]
    pub fn wallet_client(mut self, client: Arc<dyn WalletClient>) -> Self {
        self.wallet_client = Some(client);
        self
    }

    /// Where `prepare(None)` loads the registry from. Defaults to
    /// [`HttpRegistrySource`] built from the configuration.
    #[must_use]
    pub fn registry_source(mut self, source: Arc<dyn RegistrySource>) -> Self {
        self.registry_source = Some(source);
        self
    }

    /// Validates the configuration, resolves the active network and builds
    /// the client.
    ///
    /// Fails with [`ModulesError::ChainIdMismatch`] when the public and
    /// wallet clients are connected to different networks.
    pub async fn build(self) -> Result<ModulesClient, ModulesError> {
        self.config.validate()?;

        let public_chain = match &self.public_client {
            Some(client) => Some(client.chain_id().await?),
            None => None,
        };
        let wallet_chain = match &self.wallet_client {
            Some(client) => Some(client.chain_id().await?),
            None => None,
        };
        if let (Some(public), Some(wallet)) = (public_chain, wallet_chain) {
            if public != wallet {
                return Err(ModulesError::ChainIdMismatch(format!(
                    "public client is on chain {public}, wallet client is on chain {wallet}"
                )));
            }
        }

        let registry_source = match self.registry_source {
            Some(source) => source,
            None => Arc::new(HttpRegistrySource::from_config(&self.config)?),
        };

        Ok(ModulesClient {
            config: self.config,
            public_client: self.public_client,
            wallet_client: self.wallet_client,
            registry_source,
            chain_id: public_chain.or(wallet_chain),
            registry: RwLock::new(None),
        })
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// Client for discovering, deploying and calling Hats modules.
pub struct ModulesClient {
    config: ClientConfig,
    public_client: Option<Arc<dyn PublicClient>>,
    wallet_client: Option<Arc<dyn WalletClient>>,
    registry_source: Arc<dyn RegistrySource>,
    chain_id: Option<ChainId>,
    /// Replaced wholesale by `prepare`.
    registry: RwLock<Option<Arc<RegistryIndex>>>,
}

impl ModulesClient {
    /// Start building a client.
    #[must_use]
    pub fn builder() -> ModulesClientBuilder {
        ModulesClientBuilder::default()
    }

    /// Client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Active network, when a client is connected.
    #[must_use]
    pub fn chain_id(&self) -> Option<ChainId> {
        self.chain_id
    }

    /// True once a registry has been loaded.
    #[must_use]
    pub fn is_prepared(&self) -> bool {
        self.registry.read().is_some()
    }

    /// The loaded registry index.
    pub fn registry(&self) -> Result<Arc<RegistryIndex>, ModulesError> {
        self.registry.read().clone().ok_or_else(|| {
            ModulesError::ClientNotPrepared("call prepare() before using the client".to_string())
        })
    }

    fn public(&self) -> Result<&Arc<dyn PublicClient>, ModulesError> {
        self.public_client.as_ref().ok_or_else(|| {
            ModulesError::MissingPublicClient("a public client is required for this operation".to_string())
        })
    }

    fn wallet(&self) -> Result<&Arc<dyn WalletClient>, ModulesError> {
        self.wallet_client.as_ref().ok_or_else(|| {
            ModulesError::MissingWalletClient("a wallet client is required for this operation".to_string())
        })
    }

    fn active_chain(&self) -> Result<ChainId, ModulesError> {
        self.chain_id.ok_or_else(|| {
            ModulesError::MissingPublicClient("no client connected to determine the network".to_string())
        })
    }

    /// Factory to deploy through: the configured override, or the registry
    /// factory when it is deployed on the active network.
    fn factory_address(&self, index: &RegistryIndex, chain_id: ChainId) -> Result<Address, ModulesError> {
        if let Some(address) = self.config.factory_address {
            return Ok(address);
        }
        if !index.factory_deployed_on(chain_id) {
            return Err(ModulesError::ModuleNotAvailable(format!(
                "module factory is not deployed on chain {chain_id}"
            )));
        }
        Ok(index.factory().implementation_address)
    }

    /// Marshals creation arguments into a factory deployment. Immutable
    /// arguments are packed; mutable arguments become ABI-encoded init data
    /// (empty when the module declares none).
    fn module_deployment(
        module: &Module,
        hat_id: HatId,
        immutable_args: &[Value],
        mutable_args: &[Value],
    ) -> Result<ModuleDeployment, ModulesError> {
        let other_immutable_args = packed_immutable_args(module, immutable_args)?;

        let (types, values) = marshal_creation_args(
            &format!("{} mutable args", module.name),
            &module.creation_args.mutable,
            mutable_args,
        )?;
        let init_data = if types.is_empty() {
            Vec::new()
        } else {
            codec::encode(&values)
        };

        Ok(ModuleDeployment {
            implementation: module.implementation_address,
            hat_id,
            other_immutable_args,
            init_data,
        })
    }

    /// Simulates, sends and waits for a transaction.
    async fn submit(
        &self,
        account: Option<Address>,
        to: Address,
        data: Vec<u8>,
        abi: &JsonAbi,
    ) -> Result<TransactionReceipt, ModulesError> {
        let public = self.public()?;
        let wallet = self.wallet()?;
        let request = TransactionRequest {
            from: account,
            to,
            data: Bytes::from(data),
            value: U256::zero(),
        };

        if self.config.simulate_writes {
            public
                .call(request.as_call())
                .await
                .map_err(|e| revert_error(e, abi))?;
        }

        let hash = wallet
            .send_transaction(request)
            .await
            .map_err(|e| revert_error(e, abi))?;
        debug!(%hash, %to, "transaction submitted");

        let receipt = public.wait_for_transaction_receipt(hash).await?;
        debug!(%hash, status = ?receipt.status, block = receipt.block_number, "transaction mined");
        Ok(receipt)
    }

    /// Sends a factory call and collects the deployed instances.
    async fn deploy(
        &self,
        account: Option<Address>,
        factory: Address,
        data: Vec<u8>,
        abi: &JsonAbi,
        expected: usize,
    ) -> Result<(TransactionResult, Vec<Address>), ModulesError> {
        let receipt = self.submit(account, factory, data, abi).await?;
        if receipt.status == TransactionStatus::Reverted {
            return Err(ModulesError::TransactionReverted(format!(
                "transaction {} reverted",
                receipt.transaction_hash
            )));
        }
        let instances = deployed_instances(&receipt, factory)?;
        if instances.len() != expected {
            return Err(RpcError::UnexpectedResponse(format!(
                "expected {expected} module deployment events, receipt has {}",
                instances.len()
            ))
            .into());
        }
        Ok((TransactionResult::from(&receipt), instances))
    }

    async fn create_chain(
        &self,
        request: CreateChainRequest,
        chain_module: ChainModule,
        index: &RegistryIndex,
    ) -> Result<CreateInstanceResult, ModulesError> {
        let chain_id = self.active_chain()?;
        if !chain_module.deployments.iter().any(|d| d.chain_id == chain_id) {
            return Err(ModulesError::ModuleNotAvailable(format!(
                "{} is not deployed on chain {chain_id}",
                chain_module.name
            )));
        }
        if request.clauses.is_empty() || request.clauses.iter().any(Vec::is_empty) {
            return Err(ModulesError::InvalidParam(
                "a chain needs at least one clause and every clause at least one module".to_string(),
            ));
        }
        let factory = self.factory_address(index, chain_id)?;

        let deployment = ModuleDeployment {
            implementation: chain_module.implementation_address,
            hat_id: request.hat_id,
            other_immutable_args: chain_immutable_args(&request.clauses)?,
            init_data: Vec::new(),
        };
        let data = create_module_calldata(&deployment);
        let abi = abi::merge(&[&chain_module.abi, &index.factory().abi]);
        let (result, instances) = self.deploy(request.account, factory, data, &abi, 1).await?;

        info!(instance = %instances[0], name = %chain_module.name, "chain module deployed");
        Ok(CreateInstanceResult {
            status: result.status,
            transaction_hash: result.transaction_hash,
            new_instance: instances[0],
        })
    }

    /// Reads `IMPLEMENTATION()` of `instance`; `None` when the call reverts or
    /// returns garbage.
    async fn instance_implementation(&self, instance: Address) -> Result<Option<Address>, ModulesError> {
        let public = self.public()?;
        let result = public
            .call(CallRequest {
                from: None,
                to: instance,
                data: Bytes::from(getter_calldata(IMPLEMENTATION)),
            })
            .await;
        match result {
            Ok(data) => Ok(decode_address_return(data.as_slice()).ok()),
            Err(RpcError::Reverted { .. }) => Ok(None),
            Err(other) => Err(other.into()),
        }
    }

    /// Calls a view function and decodes its outputs.
    async fn call_view(
        &self,
        instance: Address,
        function: &Function,
        args: &[Value],
        abi: &JsonAbi,
    ) -> Result<Vec<Value>, ModulesError> {
        let input_types = param_types(&function.inputs)?;
        let specs: Vec<ArgSpec> = function
            .inputs
            .iter()
            .zip(&input_types)
            .map(|(param, ty)| ArgSpec { name: param.name.clone(), ty: ty.clone() })
            .collect();
        let values = marshal_args(&function.name, &specs, args)?;
        let data = function_calldata(function, &values);

        let output = self
            .public()?
            .call(CallRequest {
                from: None,
                to: instance,
                data: Bytes::from(data),
            })
            .await
            .map_err(|e| revert_error(e, abi))?;

        let output_types = param_types(&function.outputs)?;
        let decoded = codec::decode(&output_types, output.as_slice()).map_err(|e| {
            RpcError::UnexpectedResponse(format!("{} returned undecodable data: {e}", function.name))
        })?;
        Ok(decoded.iter().map(to_json).collect())
    }
}

fn marshal_creation_args(
    context: &str,
    declared: &[ModuleCreationArg],
    supplied: &[Value],
) -> Result<(Vec<DynSolType>, Vec<DynSolValue>), ModulesError> {
    let specs = declared
        .iter()
        .map(|arg| ArgSpec::parse(arg.name.clone(), &arg.kind))
        .collect::<Result<Vec<_>, _>>()?;
    let values = marshal_args(context, &specs, supplied)?;
    Ok((specs.into_iter().map(|spec| spec.ty).collect(), values))
}

fn packed_immutable_args(module: &Module, supplied: &[Value]) -> Result<Vec<u8>, ModulesError> {
    let (_, values) = marshal_creation_args(
        &format!("{} immutable args", module.name),
        &module.creation_args.immutable,
        supplied,
    )?;
    Ok(codec::encode_packed(&values)?)
}

/// Selector of `function` followed by its encoded arguments.
fn function_calldata(function: &Function, values: &[DynSolValue]) -> Vec<u8> {
    let mut data = function.selector().to_vec();
    data.extend(codec::encode(values));
    data
}

fn revert_error(err: RpcError, abi: &JsonAbi) -> ModulesError {
    match err {
        RpcError::Reverted { data, .. } => {
            ModulesError::TransactionReverted(decode_revert(data.as_slice(), abi).to_string())
        }
        other => ModulesError::Rpc(other),
    }
}

// =============================================================================
// API IMPLEMENTATION
// =============================================================================

#[async_trait]
impl ModulesApi for ModulesClient {
    #[instrument(skip(self, registry), fields(supplied = registry.is_some()))]
    async fn prepare(&self, registry: Option<Registry>) -> Result<(), ModulesError> {
        let registry = match registry {
            Some(registry) => registry,
            None => self.registry_source.fetch().await?,
        };
        let index = RegistryIndex::new(registry)?;
        info!(modules = index.modules().len(), "modules registry loaded");
        *self.registry.write() = Some(Arc::new(index));
        Ok(())
    }

    fn get_module_by_id(&self, module_id: &str) -> Result<Module, ModulesError> {
        self.registry()?.module_by_id(module_id).cloned()
    }

    fn get_module_by_name(&self, name: &str) -> Result<Module, ModulesError> {
        self.registry()?.module_by_name(name).cloned()
    }

    fn get_modules(&self, filter: &ModuleFilter) -> Result<Vec<Module>, ModulesError> {
        Ok(self
            .registry()?
            .modules_with(filter)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn get_available_modules(&self) -> Result<Vec<Module>, ModulesError> {
        let index = self.registry()?;
        let chain_id = self.active_chain()?;
        Ok(index.available_on(chain_id).into_iter().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn get_module_by_instance(&self, instance: Address) -> Result<Option<Module>, ModulesError> {
        let index = self.registry()?;
        let Some(implementation) = self.instance_implementation(instance).await? else {
            debug!(%instance, "address is not a module instance");
            return Ok(None);
        };
        Ok(index.module_by_implementation(implementation).cloned())
    }

    async fn get_modules_by_instances(
        &self,
        instances: &[Address],
    ) -> Result<Vec<Option<Module>>, ModulesError> {
        let mut modules = Vec::with_capacity(instances.len());
        for instance in instances {
            modules.push(self.get_module_by_instance(*instance).await?);
        }
        Ok(modules)
    }

    #[instrument(skip(self, request), fields(module_id = %request.module_id, hat_id = %request.hat_id))]
    async fn create_new_instance(
        &self,
        request: CreateInstanceRequest,
    ) -> Result<CreateInstanceResult, ModulesError> {
        let index = self.registry()?;
        self.wallet()?;
        let chain_id = self.active_chain()?;
        let module = index.available_module(&request.module_id, chain_id)?;
        let factory = self.factory_address(&index, chain_id)?;

        let deployment = Self::module_deployment(
            module,
            request.hat_id,
            &request.immutable_args,
            &request.mutable_args,
        )?;
        let data = create_module_calldata(&deployment);
        let abi = abi::merge(&[&module.abi, &index.factory().abi]);
        let (result, instances) = self.deploy(request.account, factory, data, &abi, 1).await?;

        info!(instance = %instances[0], module = %module.name, "module instance created");
        Ok(CreateInstanceResult {
            status: result.status,
            transaction_hash: result.transaction_hash,
            new_instance: instances[0],
        })
    }

    #[instrument(skip(self, request), fields(count = request.module_ids.len()))]
    async fn batch_create_new_instances(
        &self,
        request: BatchCreateInstancesRequest,
    ) -> Result<BatchCreateInstancesResult, ModulesError> {
        let index = self.registry()?;
        self.wallet()?;
        let chain_id = self.active_chain()?;

        let count = request.module_ids.len();
        if request.hat_ids.len() != count
            || request.immutable_args_list.len() != count
            || request.mutable_args_list.len() != count
        {
            return Err(ModulesError::ParametersLengthsMismatch(format!(
                "batch lists differ in length: {count} module ids, {} hat ids, {} immutable arg lists, {} mutable arg lists",
                request.hat_ids.len(),
                request.immutable_args_list.len(),
                request.mutable_args_list.len()
            )));
        }
        let factory = self.factory_address(&index, chain_id)?;

        let mut deployments = Vec::with_capacity(count);
        let mut abis = vec![&index.factory().abi];
        for (i, module_id) in request.module_ids.iter().enumerate() {
            let module = index.available_module(module_id, chain_id)?;
            deployments.push(Self::module_deployment(
                module,
                request.hat_ids[i],
                &request.immutable_args_list[i],
                &request.mutable_args_list[i],
            )?);
            abis.push(&module.abi);
        }

        let data = batch_create_calldata(&deployments);
        let abi = abi::merge(&abis);
        let (result, instances) = self.deploy(request.account, factory, data, &abi, count).await?;

        info!(instances = instances.len(), "module instances created");
        Ok(BatchCreateInstancesResult {
            status: result.status,
            transaction_hash: result.transaction_hash,
            new_instances: instances,
        })
    }

    async fn predict_instance_address(
        &self,
        request: PredictInstanceRequest,
    ) -> Result<Address, ModulesError> {
        let index = self.registry()?;
        let public = self.public()?;
        let chain_id = self.active_chain()?;
        let module = index.available_module(&request.module_id, chain_id)?;
        let factory = self.factory_address(&index, chain_id)?;

        let other_immutable_args = packed_immutable_args(module, &request.immutable_args)?;
        let data = module_address_calldata(
            module.implementation_address,
            request.hat_id,
            &other_immutable_args,
        );
        let output = public
            .call(CallRequest {
                from: None,
                to: factory,
                data: Bytes::from(data),
            })
            .await
            .map_err(|e| revert_error(e, &index.factory().abi))?;
        Ok(decode_address_return(output.as_slice())?)
    }

    async fn is_instance_deployed(&self, request: PredictInstanceRequest) -> Result<bool, ModulesError> {
        let instance = self.predict_instance_address(request).await?;
        let code = self.public()?.get_code(instance).await?;
        Ok(!code.is_empty())
    }

    #[instrument(skip(self, request), fields(hat_id = %request.hat_id, clauses = request.clauses.len()))]
    async fn create_eligibilities_chain(
        &self,
        request: CreateChainRequest,
    ) -> Result<CreateInstanceResult, ModulesError> {
        let index = self.registry()?;
        self.wallet()?;
        let chain_module = index.eligibilities_chain().clone();
        self.create_chain(request, chain_module, &index).await
    }

    #[instrument(skip(self, request), fields(hat_id = %request.hat_id, clauses = request.clauses.len()))]
    async fn create_toggles_chain(
        &self,
        request: CreateChainRequest,
    ) -> Result<CreateInstanceResult, ModulesError> {
        let index = self.registry()?;
        self.wallet()?;
        let chain_module = index.toggles_chain().clone();
        self.create_chain(request, chain_module, &index).await
    }

    #[instrument(
        skip(self, request),
        fields(module_id = %request.module_id, instance = %request.instance, function = %request.func.function_name)
    )]
    async fn call_instance_write_function(
        &self,
        request: CallWriteFunctionRequest,
    ) -> Result<CallInstanceWriteFunctionResult, ModulesError> {
        let index = self.registry()?;
        self.wallet()?;
        let chain_id = self.active_chain()?;
        let module = index.available_module(&request.module_id, chain_id)?;
        let func = &request.func;

        if request.args.len() != func.args.len() {
            return Err(ModulesError::ParametersLengthsMismatch(format!(
                "{} expects {} arguments, got {}",
                func.function_name,
                func.args.len(),
                request.args.len()
            )));
        }

        let abi_function = module
            .abi
            .function_with_arity(&func.function_name, func.args.len())
            .ok_or_else(|| {
                ModulesError::InvalidParam(format!(
                    "{} with {} arguments is not in the ABI of {}",
                    func.function_name,
                    func.args.len(),
                    module.name
                ))
            })?;
        if is_read_only(abi_function) {
            return Err(ModulesError::InvalidParam(format!(
                "{} is read-only and cannot be called as a write function",
                func.function_name
            )));
        }

        let types = param_types(&abi_function.inputs)?;
        let specs: Vec<ArgSpec> = func
            .args
            .iter()
            .zip(&types)
            .map(|(arg, ty)| ArgSpec { name: arg.name.clone(), ty: ty.clone() })
            .collect();
        let values = marshal_args(&func.function_name, &specs, &request.args)?;
        let data = function_calldata(abi_function, &values);

        let receipt = self
            .submit(request.account, request.instance, data, &module.abi)
            .await?;
        if receipt.status == TransactionStatus::Reverted {
            warn!(hash = %receipt.transaction_hash, "write function transaction reverted");
        }
        Ok(TransactionResult::from(&receipt))
    }

    #[instrument(skip(self))]
    async fn get_instance_parameters(
        &self,
        instance: Address,
    ) -> Result<Vec<ModuleParameter>, ModulesError> {
        let module = self.get_module_by_instance(instance).await?.ok_or_else(|| {
            ModulesError::ModuleNotAvailable(format!("{instance} is not a known module instance"))
        })?;

        let mut parameters = Vec::with_capacity(module.parameters.len());
        for descriptor in &module.parameters {
            let function = module
                .abi
                .function_with_arity(&descriptor.function_name, 0)
                .ok_or_else(|| {
                    ModulesError::InvalidParam(format!(
                        "parameter function {} is not in the ABI of {}",
                        descriptor.function_name, module.name
                    ))
                })?;
            let mut values = self.call_view(instance, function, &[], &module.abi).await?;
            let solidity_type = codec::type_list(&param_types(&function.outputs)?);
            let value = if values.len() == 1 {
                values.remove(0)
            } else {
                Value::Array(values)
            };
            parameters.push(ModuleParameter {
                label: descriptor.label.clone(),
                value,
                solidity_type,
                display_type: descriptor.display_type.clone(),
            });
        }
        Ok(parameters)
    }

    #[instrument(skip(self, request), fields(instance = %request.instance, function = %request.function_name))]
    async fn read_instance(&self, request: ReadInstanceRequest) -> Result<Vec<Value>, ModulesError> {
        let index = self.registry()?;
        self.public()?;
        let chain_id = self.active_chain()?;
        let module = index.available_module(&request.module_id, chain_id)?;

        let function = match module.abi.function_with_arity(&request.function_name, request.args.len()) {
            Some(function) => function,
            None => {
                return Err(match module.abi.first_function(&request.function_name) {
                    Some(other) => ModulesError::ParametersLengthsMismatch(format!(
                        "{} expects {} arguments, got {}",
                        request.function_name,
                        other.inputs.len(),
                        request.args.len()
                    )),
                    None => ModulesError::InvalidParam(format!(
                        "{} is not in the ABI of {}",
                        request.function_name, module.name
                    )),
                })
            }
        };
        if !is_read_only(function) {
            return Err(ModulesError::InvalidParam(format!(
                "{} is not a view function",
                request.function_name
            )));
        }
        self.call_view(request.instance, function, &request.args, &module.abi)
            .await
    }
}

// =============================================================================
// TESTS
// =============================================================================

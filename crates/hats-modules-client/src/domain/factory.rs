//! # Module Factory Interface
//!
//! Calldata for the module factory and module instances, decoding of the
//! factory's deployment event, and the immutable argument layout of the
//! eligibilities/toggles chain modules.

use crate::domain::codec::{self, DynSolType, DynSolValue};
use crate::domain::entities::{Log, TransactionReceipt};
use crate::domain::services::{calldata, event_topic, function_selector};
use crate::domain::value_objects::{from_abi_uint, to_abi_uint, Address, Bytes, Hash, U256};
use crate::errors::CodecError;

/// `createHatsModule(address _implementation, uint256 _hatId, bytes _otherImmutableArgs, bytes _initData)`.
pub const CREATE_HATS_MODULE: &str = "createHatsModule(address,uint256,bytes,bytes)";

/// Batch variant; every list holds one entry per new instance.
pub const BATCH_CREATE_HATS_MODULE: &str =
    "batchCreateHatsModule(address[],uint256[],bytes[],bytes[])";

/// Predicted address of an instance, deployed or not.
pub const GET_HATS_MODULE_ADDRESS: &str = "getHatsModuleAddress(address,uint256,bytes)";

/// Emitted once per deployed instance. No indexed parameters.
pub const MODULE_DEPLOYED_EVENT: &str =
    "HatsModuleFactory_ModuleDeployed(address,address,uint256,bytes,bytes)";

/// Instance getter for the implementation it clones.
pub const IMPLEMENTATION: &str = "IMPLEMENTATION()";

/// Instance getter for the hat it serves.
pub const HAT_ID: &str = "hatId()";

fn create_types() -> [DynSolType; 4] {
    [
        DynSolType::Address,
        DynSolType::Uint(256),
        DynSolType::Bytes,
        DynSolType::Bytes,
    ]
}

fn batch_types() -> [DynSolType; 4] {
    create_types().map(|ty| DynSolType::Array(Box::new(ty)))
}

fn predict_types() -> [DynSolType; 3] {
    [DynSolType::Address, DynSolType::Uint(256), DynSolType::Bytes]
}

fn address_value(address: Address) -> DynSolValue {
    DynSolValue::Address(address.into())
}

fn uint_value(value: U256) -> DynSolValue {
    DynSolValue::Uint(to_abi_uint(value), 256)
}

fn take_address(value: Option<DynSolValue>) -> Option<Address> {
    match value? {
        DynSolValue::Address(address) => Some(address.into()),
        _ => None,
    }
}

fn take_uint(value: Option<DynSolValue>) -> Option<U256> {
    match value? {
        DynSolValue::Uint(word, _) => Some(from_abi_uint(word)),
        _ => None,
    }
}

fn take_bytes(value: Option<DynSolValue>) -> Option<Vec<u8>> {
    match value? {
        DynSolValue::Bytes(bytes) => Some(bytes),
        _ => None,
    }
}

/// Everything the factory needs to deploy one instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleDeployment {
    pub implementation: Address,
    pub hat_id: U256,
    /// Packed immutable arguments (after the factory-provided prefix).
    pub other_immutable_args: Vec<u8>,
    /// ABI-encoded mutable arguments passed to `setUp`.
    pub init_data: Vec<u8>,
}

impl ModuleDeployment {
    fn values(&self) -> [DynSolValue; 4] {
        [
            address_value(self.implementation),
            uint_value(self.hat_id),
            DynSolValue::Bytes(self.other_immutable_args.clone()),
            DynSolValue::Bytes(self.init_data.clone()),
        ]
    }

    fn from_values(values: Vec<DynSolValue>) -> Result<Self, CodecError> {
        let malformed = || CodecError::TypeMismatch {
            expected: "(address,uint256,bytes,bytes)".to_string(),
            found: "malformed arguments".to_string(),
        };
        let mut iter = values.into_iter();
        Ok(Self {
            implementation: take_address(iter.next()).ok_or_else(malformed)?,
            hat_id: take_uint(iter.next()).ok_or_else(malformed)?,
            other_immutable_args: take_bytes(iter.next()).ok_or_else(malformed)?,
            init_data: take_bytes(iter.next()).ok_or_else(malformed)?,
        })
    }
}

/// Calldata for `createHatsModule`.
#[must_use]
pub fn create_module_calldata(deployment: &ModuleDeployment) -> Vec<u8> {
    calldata(CREATE_HATS_MODULE, &codec::encode(&deployment.values()))
}

/// Calldata for `batchCreateHatsModule`.
#[must_use]
pub fn batch_create_calldata(deployments: &[ModuleDeployment]) -> Vec<u8> {
    let mut columns: [Vec<DynSolValue>; 4] = Default::default();
    for deployment in deployments {
        for (column, value) in columns.iter_mut().zip(deployment.values()) {
            column.push(value);
        }
    }
    calldata(
        BATCH_CREATE_HATS_MODULE,
        &codec::encode(&columns.map(DynSolValue::Array)),
    )
}

/// Calldata for `getHatsModuleAddress`.
#[must_use]
pub fn module_address_calldata(
    implementation: Address,
    hat_id: U256,
    other_immutable_args: &[u8],
) -> Vec<u8> {
    let args = codec::encode(&[
        address_value(implementation),
        uint_value(hat_id),
        DynSolValue::Bytes(other_immutable_args.to_vec()),
    ]);
    calldata(GET_HATS_MODULE_ADDRESS, &args)
}

/// Calldata for a no-argument getter such as [`IMPLEMENTATION`].
#[must_use]
pub fn getter_calldata(signature: &str) -> Vec<u8> {
    function_selector(signature).to_vec()
}

/// A factory call recognised from its calldata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FactoryCall {
    Create(ModuleDeployment),
    BatchCreate(Vec<ModuleDeployment>),
    PredictAddress {
        implementation: Address,
        hat_id: U256,
        other_immutable_args: Vec<u8>,
    },
}

impl FactoryCall {
    /// Decodes factory calldata. `Ok(None)` for selectors the factory does
    /// not expose.
    pub fn decode(data: &[u8]) -> Result<Option<Self>, CodecError> {
        let Some(selector) = data.get(..4) else {
            return Ok(None);
        };
        let args = &data[4..];

        if selector == function_selector(CREATE_HATS_MODULE) {
            let values = codec::decode(&create_types(), args)?;
            return ModuleDeployment::from_values(values).map(|d| Some(Self::Create(d)));
        }
        if selector == function_selector(BATCH_CREATE_HATS_MODULE) {
            let columns = codec::decode(&batch_types(), args)?
                .into_iter()
                .map(|column| match column {
                    DynSolValue::Array(items) => Ok(items),
                    _ => Err(CodecError::TypeMismatch {
                        expected: "array".to_string(),
                        found: "scalar".to_string(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            let len = columns.first().map_or(0, Vec::len);
            if let Some(bad) = columns.iter().find(|c| c.len() != len) {
                return Err(CodecError::LengthMismatch {
                    ty: BATCH_CREATE_HATS_MODULE.to_string(),
                    expected: len,
                    actual: bad.len(),
                });
            }
            let mut iters: Vec<_> = columns.into_iter().map(Vec::into_iter).collect();
            let mut deployments = Vec::with_capacity(len);
            for _ in 0..len {
                let row = iters.iter_mut().filter_map(Iterator::next).collect();
                deployments.push(ModuleDeployment::from_values(row)?);
            }
            return Ok(Some(Self::BatchCreate(deployments)));
        }
        if selector == function_selector(GET_HATS_MODULE_ADDRESS) {
            let values = codec::decode(&predict_types(), args)?;
            let deployment = ModuleDeployment::from_values(
                values.into_iter().chain([DynSolValue::Bytes(Vec::new())]).collect(),
            )?;
            return Ok(Some(Self::PredictAddress {
                implementation: deployment.implementation,
                hat_id: deployment.hat_id,
                other_immutable_args: deployment.other_immutable_args,
            }));
        }
        Ok(None)
    }
}

/// Decodes a single `address` return value.
pub fn decode_address_return(data: &[u8]) -> Result<Address, CodecError> {
    take_address(codec::decode(&[DynSolType::Address], data)?.into_iter().next())
        .ok_or_else(|| CodecError::Decode(format!("expected an address, got {} bytes", data.len())))
}

/// ABI-encodes a single `address` return value.
#[must_use]
pub fn encode_address_return(address: Address) -> Vec<u8> {
    codec::encode(&[address_value(address)])
}

/// ABI-encodes a single `uint256` return value.
#[must_use]
pub fn encode_uint_return(value: U256) -> Vec<u8> {
    codec::encode(&[uint_value(value)])
}

// =============================================================================
// DEPLOYMENT EVENT
// =============================================================================

/// Payload of `HatsModuleFactory_ModuleDeployed`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleDeployedEvent {
    pub implementation: Address,
    pub instance: Address,
    pub hat_id: U256,
    pub other_immutable_args: Vec<u8>,
    pub init_data: Vec<u8>,
}

impl ModuleDeployedEvent {
    fn types() -> [DynSolType; 5] {
        [
            DynSolType::Address,
            DynSolType::Address,
            DynSolType::Uint(256),
            DynSolType::Bytes,
            DynSolType::Bytes,
        ]
    }

    /// Topic0 of the event.
    #[must_use]
    pub fn topic() -> Hash {
        event_topic(MODULE_DEPLOYED_EVENT)
    }

    /// Builds the log the factory at `factory` emits for this event.
    #[must_use]
    pub fn to_log(&self, factory: Address) -> Log {
        let data = codec::encode(&[
            address_value(self.implementation),
            address_value(self.instance),
            uint_value(self.hat_id),
            DynSolValue::Bytes(self.other_immutable_args.clone()),
            DynSolValue::Bytes(self.init_data.clone()),
        ]);
        Log {
            address: factory,
            topics: vec![Self::topic()],
            data: Bytes::from(data),
        }
    }

    /// Decodes `log` if it is this event. Logs of other events yield `Ok(None)`.
    pub fn from_log(log: &Log) -> Result<Option<Self>, CodecError> {
        if log.topics.first() != Some(&Self::topic()) {
            return Ok(None);
        }
        let mut values = codec::decode(&Self::types(), log.data.as_slice())?.into_iter();
        let malformed = || CodecError::TypeMismatch {
            expected: MODULE_DEPLOYED_EVENT.to_string(),
            found: "malformed event data".to_string(),
        };
        Ok(Some(Self {
            implementation: take_address(values.next()).ok_or_else(malformed)?,
            instance: take_address(values.next()).ok_or_else(malformed)?,
            hat_id: take_uint(values.next()).ok_or_else(malformed)?,
            other_immutable_args: take_bytes(values.next()).ok_or_else(malformed)?,
            init_data: take_bytes(values.next()).ok_or_else(malformed)?,
        }))
    }
}

/// Instances announced by `factory` in `receipt`, in log order.
pub fn deployed_instances(
    receipt: &TransactionReceipt,
    factory: Address,
) -> Result<Vec<Address>, CodecError> {
    let mut instances = Vec::new();
    for log in receipt.logs.iter().filter(|log| log.address == factory) {
        if let Some(event) = ModuleDeployedEvent::from_log(log)? {
            instances.push(event.instance);
        }
    }
    Ok(instances)
}

// =============================================================================
// CHAIN MODULES
// =============================================================================

/// Packed immutable arguments of an eligibilities/toggles chain:
/// `(uint256 numClauses, uint256[] clauseLengths, address[] modules)`.
///
/// Each clause is a conjunction of modules; clauses are combined by
/// disjunction.
pub fn chain_immutable_args(clauses: &[Vec<Address>]) -> Result<Vec<u8>, CodecError> {
    let lengths = clauses
        .iter()
        .map(|clause| uint_value(U256::from(clause.len())))
        .collect();
    let modules = clauses
        .iter()
        .flatten()
        .map(|module| address_value(*module))
        .collect();
    codec::encode_packed(&[
        uint_value(U256::from(clauses.len())),
        DynSolValue::Array(lengths),
        DynSolValue::Array(modules),
    ])
}

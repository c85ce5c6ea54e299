//! # Core Domain Entities
//!
//! The registry document (factory, chain modules, modules) as loaded from
//! JSON, the chain-facing values the ports exchange (logs, receipts) and the
//! typed results of client operations.

use crate::domain::abi::JsonAbi;
use crate::domain::value_objects::{Address, Bytes, ChainId, Hash};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// REGISTRY DOCUMENT
// =============================================================================

/// Catalog of available modules, the factory and the chain modules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    pub factory: Factory,
    pub eligibilities_chain: ChainModule,
    pub toggles_chain: ChainModule,
    pub modules: Vec<Module>,
}

/// A labelled external link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub link: String,
}

/// Deployment of a contract on one network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub chain_id: ChainId,
    /// Block the implementation was deployed at (decimal string in the document).
    pub block: String,
}

/// The module factory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Factory {
    pub name: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub links: Vec<Link>,
    pub implementation_address: Address,
    #[serde(default)]
    pub deployments: Vec<Deployment>,
    #[serde(default)]
    pub abi: JsonAbi,
}

/// An eligibilities or toggles chain module.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainModule {
    pub name: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub links: Vec<Link>,
    pub implementation_address: Address,
    #[serde(default)]
    pub deployments: Vec<Deployment>,
    #[serde(default)]
    pub abi: JsonAbi,
}

/// Capability flags of a module.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleType {
    pub eligibility: bool,
    pub toggle: bool,
    pub hatter: bool,
}

/// A view function describing one of an instance's current parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDescriptor {
    pub label: String,
    pub function_name: String,
    pub display_type: String,
}

/// A deployable module blueprint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    #[serde(rename = "type")]
    pub module_type: ModuleType,
    pub implementation_address: Address,
    #[serde(default)]
    pub deployments: Vec<Deployment>,
    pub creation_args: ModuleCreationArgs,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub write_functions: Vec<WriteFunction>,
    #[serde(default)]
    pub abi: JsonAbi,
}

impl Module {
    /// True when the module is flagged as deprecated.
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.deprecated.unwrap_or(false)
    }

    /// Deployment on `chain_id`, if any.
    #[must_use]
    pub fn deployment(&self, chain_id: ChainId) -> Option<&Deployment> {
        self.deployments.iter().find(|d| d.chain_id == chain_id)
    }

    /// Write function by name.
    #[must_use]
    pub fn write_function(&self, name: &str) -> Option<&WriteFunction> {
        self.write_functions.iter().find(|f| f.function_name == name)
    }

    /// Role by id.
    #[must_use]
    pub fn role(&self, id: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }
}

/// A role that may call some of a module's write functions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub criteria: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hat_admins_fallback: Option<bool>,
}

/// A state-mutating action of a module instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteFunction {
    /// Role ids allowed to call the function.
    #[serde(default)]
    pub roles: Vec<String>,
    pub function_name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
    #[serde(default)]
    pub args: Vec<WriteFunctionArg>,
}

/// Argument of a write function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteFunctionArg {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Solidity type string.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub display_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

/// Argument of a module's creation (immutable or mutable).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleCreationArg {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Solidity type string.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub example: Value,
    #[serde(default)]
    pub display_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

/// Creation arguments of a module.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleCreationArgs {
    #[serde(default)]
    pub use_hat_id: bool,
    #[serde(default)]
    pub immutable: Vec<ModuleCreationArg>,
    #[serde(default)]
    pub mutable: Vec<ModuleCreationArg>,
}

/// Current value of one of an instance's parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleParameter {
    pub label: String,
    pub value: Value,
    pub solidity_type: String,
    pub display_type: String,
}

/// Capability filter for registry listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModuleFilter {
    pub eligibility: Option<bool>,
    pub toggle: Option<bool>,
    pub hatter: Option<bool>,
    /// Include deprecated modules (excluded by default).
    pub include_deprecated: bool,
}

impl ModuleFilter {
    /// True when `module` passes every set criterion.
    #[must_use]
    pub fn matches(&self, module: &Module) -> bool {
        let flag = |want: Option<bool>, have: bool| want.map_or(true, |w| w == have);
        (self.include_deprecated || !module.is_deprecated())
            && flag(self.eligibility, module.module_type.eligibility)
            && flag(self.toggle, module.module_type.toggle)
            && flag(self.hatter, module.module_type.hatter)
    }
}

// =============================================================================
// CHAIN VALUES
// =============================================================================

/// Event log emitted by a contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Contract address that emitted the log.
    pub address: Address,
    /// Indexed topics (up to 4).
    pub topics: Vec<Hash>,
    /// Non-indexed data.
    pub data: Bytes,
}

/// Outcome of a mined transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Reverted,
}

impl TransactionStatus {
    /// True for [`TransactionStatus::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Receipt of a mined transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: Hash,
    pub status: TransactionStatus,
    pub block_number: u64,
    #[serde(default)]
    pub logs: Vec<Log>,
}

// =============================================================================
// OPERATION RESULTS
// =============================================================================

/// Status and hash of a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    pub status: TransactionStatus,
    pub transaction_hash: Hash,
}

impl From<&TransactionReceipt> for TransactionResult {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            status: receipt.status,
            transaction_hash: receipt.transaction_hash,
        }
    }
}

/// Result of calling a module instance write function.
pub type CallInstanceWriteFunctionResult = TransactionResult;

/// Result of deploying one module instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstanceResult {
    pub status: TransactionStatus,
    pub transaction_hash: Hash,
    pub new_instance: Address,
}

/// Result of deploying several module instances in one transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCreateInstancesResult {
    pub status: TransactionStatus,
    pub transaction_hash: Hash,
    pub new_instances: Vec<Address>,
}

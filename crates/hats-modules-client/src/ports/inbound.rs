//! # Driving Ports (API - Inbound)
//!
//! The public API of the modules client. `ModulesClient` implements
//! [`ModulesApi`]; applications may depend on the trait to swap in fakes.

use crate::domain::entities::{
    BatchCreateInstancesResult, CallInstanceWriteFunctionResult, CreateInstanceResult, Module,
    ModuleFilter, ModuleParameter, Registry, WriteFunction,
};
use crate::domain::value_objects::{Address, HatId};
use crate::errors::ModulesError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// REQUESTS
// =============================================================================

/// Deploy one module instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstanceRequest {
    /// Signing account; `None` uses the wallet's default account.
    #[serde(default)]
    pub account: Option<Address>,
    /// Module id (implementation address).
    pub module_id: String,
    /// Hat the instance serves.
    pub hat_id: HatId,
    /// One value per `creationArgs.immutable` entry.
    #[serde(default)]
    pub immutable_args: Vec<Value>,
    /// One value per `creationArgs.mutable` entry.
    #[serde(default)]
    pub mutable_args: Vec<Value>,
}

/// Deploy several module instances in one transaction. All lists are
/// positional and must have the same length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCreateInstancesRequest {
    #[serde(default)]
    pub account: Option<Address>,
    pub module_ids: Vec<String>,
    pub hat_ids: Vec<HatId>,
    pub immutable_args_list: Vec<Vec<Value>>,
    pub mutable_args_list: Vec<Vec<Value>>,
}

/// Identify an instance by what it would be deployed with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictInstanceRequest {
    pub module_id: String,
    pub hat_id: HatId,
    #[serde(default)]
    pub immutable_args: Vec<Value>,
}

/// Call a write function of a module instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallWriteFunctionRequest {
    #[serde(default)]
    pub account: Option<Address>,
    pub module_id: String,
    pub instance: Address,
    pub func: WriteFunction,
    #[serde(default)]
    pub args: Vec<Value>,
}

/// Deploy an eligibilities or toggles chain.
///
/// `clauses` is a disjunction of conjunctions: the chain passes when every
/// module of at least one clause passes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChainRequest {
    #[serde(default)]
    pub account: Option<Address>,
    pub hat_id: HatId,
    pub clauses: Vec<Vec<Address>>,
}

/// Call a view function of a module instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadInstanceRequest {
    pub module_id: String,
    pub instance: Address,
    pub function_name: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

// =============================================================================
// API
// =============================================================================

/// Modules client API.
///
/// Every operation except [`ModulesApi::prepare`] fails with
/// [`ModulesError::ClientNotPrepared`] until a registry has been loaded.
#[async_trait]
pub trait ModulesApi: Send + Sync {
    /// Loads `registry`, or fetches it from the configured source when `None`.
    async fn prepare(&self, registry: Option<Registry>) -> Result<(), ModulesError>;

    /// Module by id (implementation address).
    fn get_module_by_id(&self, module_id: &str) -> Result<Module, ModulesError>;

    /// Module by display name.
    fn get_module_by_name(&self, name: &str) -> Result<Module, ModulesError>;

    /// Modules passing `filter`.
    fn get_modules(&self, filter: &ModuleFilter) -> Result<Vec<Module>, ModulesError>;

    /// Modules deployed on the active network.
    async fn get_available_modules(&self) -> Result<Vec<Module>, ModulesError>;

    /// Registry module an instance clones, `None` when it is not a module
    /// instance.
    async fn get_module_by_instance(&self, instance: Address) -> Result<Option<Module>, ModulesError>;

    /// [`ModulesApi::get_module_by_instance`] for several instances.
    async fn get_modules_by_instances(
        &self,
        instances: &[Address],
    ) -> Result<Vec<Option<Module>>, ModulesError>;

    /// Deploys one module instance.
    async fn create_new_instance(
        &self,
        request: CreateInstanceRequest,
    ) -> Result<CreateInstanceResult, ModulesError>;

    /// Deploys several module instances in one transaction.
    async fn batch_create_new_instances(
        &self,
        request: BatchCreateInstancesRequest,
    ) -> Result<BatchCreateInstancesResult, ModulesError>;

    /// Address an instance has (or would have) once deployed.
    async fn predict_instance_address(
        &self,
        request: PredictInstanceRequest,
    ) -> Result<Address, ModulesError>;

    /// True when the predicted instance has code.
    async fn is_instance_deployed(&self, request: PredictInstanceRequest) -> Result<bool, ModulesError>;

    /// Deploys an eligibilities chain.
    async fn create_eligibilities_chain(
        &self,
        request: CreateChainRequest,
    ) -> Result<CreateInstanceResult, ModulesError>;

    /// Deploys a toggles chain.
    async fn create_toggles_chain(
        &self,
        request: CreateChainRequest,
    ) -> Result<CreateInstanceResult, ModulesError>;

    /// Calls a write function of a module instance.
    async fn call_instance_write_function(
        &self,
        request: CallWriteFunctionRequest,
    ) -> Result<CallInstanceWriteFunctionResult, ModulesError>;

    /// Current values of the instance's declared parameters.
    async fn get_instance_parameters(
        &self,
        instance: Address,
    ) -> Result<Vec<ModuleParameter>, ModulesError>;

    /// Calls a view function of a module instance and decodes its outputs.
    async fn read_instance(&self, request: ReadInstanceRequest) -> Result<Vec<Value>, ModulesError>;
}

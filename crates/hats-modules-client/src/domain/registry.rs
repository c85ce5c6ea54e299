//! # Registry Accessor
//!
//! Read-only index over a loaded [`Registry`]. Built once per load; lookups
//! never mutate the document and the index is shared behind `Arc`.

use crate::domain::abi::param_types;
use crate::domain::codec::parse_type;
use crate::domain::entities::{ChainModule, Deployment, Factory, Module, ModuleFilter, Registry};
use crate::domain::value_objects::{Address, ChainId};
use crate::errors::ModulesError;
use std::collections::HashMap;
use tracing::warn;

/// Role ids every module accepts without declaring them.
pub const BUILTIN_ROLES: [&str; 2] = ["public", "hatAdmins"];

/// Indexed, validated registry.
#[derive(Clone, Debug)]
pub struct RegistryIndex {
    registry: Registry,
    by_implementation: HashMap<Address, usize>,
}

impl RegistryIndex {
    /// Validates `registry` and builds the lookup tables.
    ///
    /// Fails with [`ModulesError::InvalidParam`] naming the offending path
    /// when an argument type does not parse, an ABI entry is malformed, or two
    /// modules share an implementation address.
    pub fn new(registry: Registry) -> Result<Self, ModulesError> {
        let mut by_implementation = HashMap::with_capacity(registry.modules.len());
        for (i, module) in registry.modules.iter().enumerate() {
            validate_module(i, module)?;
            if let Some(previous) = by_implementation.insert(module.implementation_address, i) {
                return Err(ModulesError::InvalidParam(format!(
                    "modules[{i}]: implementation {} already used by modules[{previous}]",
                    module.implementation_address
                )));
            }
        }
        Ok(Self {
            registry,
            by_implementation,
        })
    }

    /// The underlying document.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// All modules in document order.
    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.registry.modules
    }

    /// Modules passing `filter`, in document order.
    #[must_use]
    pub fn modules_with(&self, filter: &ModuleFilter) -> Vec<&Module> {
        self.registry
            .modules
            .iter()
            .filter(|m| filter.matches(m))
            .collect()
    }

    /// Module by id. The id is the implementation address (any hex case).
    pub fn module_by_id(&self, id: &str) -> Result<&Module, ModulesError> {
        let address: Address = id
            .parse()
            .map_err(|_| ModulesError::ModuleNotAvailable(format!("module {id} not found")))?;
        self.module_by_implementation(address)
            .ok_or_else(|| ModulesError::ModuleNotAvailable(format!("module {id} not found")))
    }

    /// Module whose implementation is `address`.
    #[must_use]
    pub fn module_by_implementation(&self, address: Address) -> Option<&Module> {
        self.by_implementation
            .get(&address)
            .map(|&i| &self.registry.modules[i])
    }

    /// Module by display name.
    pub fn module_by_name(&self, name: &str) -> Result<&Module, ModulesError> {
        self.registry
            .modules
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| ModulesError::ModuleNotAvailable(format!("module named {name} not found")))
    }

    /// The module factory.
    #[must_use]
    pub fn factory(&self) -> &Factory {
        &self.registry.factory
    }

    /// The eligibilities chain module.
    #[must_use]
    pub fn eligibilities_chain(&self) -> &ChainModule {
        &self.registry.eligibilities_chain
    }

    /// The toggles chain module.
    #[must_use]
    pub fn toggles_chain(&self) -> &ChainModule {
        &self.registry.toggles_chain
    }

    /// Deployment of `module` on `chain_id`.
    pub fn deployment<'a>(
        &self,
        module: &'a Module,
        chain_id: ChainId,
    ) -> Result<&'a Deployment, ModulesError> {
        module.deployment(chain_id).ok_or_else(|| {
            ModulesError::ModuleNotAvailable(format!(
                "module {} is not deployed on chain {chain_id}",
                module.name
            ))
        })
    }

    /// Module by id, required to be deployed on `chain_id`.
    pub fn available_module(&self, id: &str, chain_id: ChainId) -> Result<&Module, ModulesError> {
        let module = self.module_by_id(id)?;
        self.deployment(module, chain_id)?;
        Ok(module)
    }

    /// Modules deployed on `chain_id`, in document order.
    #[must_use]
    pub fn available_on(&self, chain_id: ChainId) -> Vec<&Module> {
        self.registry
            .modules
            .iter()
            .filter(|m| m.deployment(chain_id).is_some())
            .collect()
    }

    /// True when the factory is deployed on `chain_id`.
    #[must_use]
    pub fn factory_deployed_on(&self, chain_id: ChainId) -> bool {
        self.registry
            .factory
            .deployments
            .iter()
            .any(|d| d.chain_id == chain_id)
    }
}

fn validate_module(index: usize, module: &Module) -> Result<(), ModulesError> {
    let invalid = |path: String, detail: String| {
        ModulesError::InvalidParam(format!("modules[{index}] ({}).{path}: {detail}", module.name))
    };

    let sections = [
        ("immutable", &module.creation_args.immutable),
        ("mutable", &module.creation_args.mutable),
    ];
    for (section, args) in sections {
        for (i, arg) in args.iter().enumerate() {
            parse_type(&arg.kind)
                .map_err(|e| invalid(format!("creationArgs.{section}[{i}]"), e.to_string()))?;
        }
    }

    for (f, func) in module.write_functions.iter().enumerate() {
        for (a, arg) in func.args.iter().enumerate() {
            parse_type(&arg.kind)
                .map_err(|e| invalid(format!("writeFunctions[{f}].args[{a}]"), e.to_string()))?;
        }
        for role in &func.roles {
            if module.role(role).is_none() && !BUILTIN_ROLES.contains(&role.as_str()) {
                warn!(
                    module = %module.name,
                    function = %func.function_name,
                    role = %role,
                    "write function references an undeclared role"
                );
            }
        }
    }

    for function in module.abi.functions() {
        param_types(&function.inputs)
            .and_then(|_| param_types(&function.outputs))
            .map_err(|e| invalid(format!("abi.{}", function.name), e.to_string()))?;
    }
    Ok(())
}

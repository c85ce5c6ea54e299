//! # Contract Interface Descriptors
//!
//! Registry documents carry standard JSON ABIs, modelled by `alloy-json-abi`.
//! This module adds the lookups the client needs (overloads by arity, custom
//! errors by selector, merged ABIs for revert decoding) and resolves
//! parameters into codec types.

use alloy_dyn_abi::Specifier;
pub use alloy_json_abi::{Error as AbiError, Event, Function, JsonAbi, Param, StateMutability};

use crate::domain::codec::{self, DynSolType, MAX_TYPE_NESTING};
use crate::errors::CodecError;

/// Resolves a parameter list into codec types, expanding tuple components.
pub fn param_types(params: &[Param]) -> Result<Vec<DynSolType>, CodecError> {
    params.iter().map(param_type).collect()
}

fn param_type(param: &Param) -> Result<DynSolType, CodecError> {
    check_param_nesting(param, 0)?;
    let ty = param
        .resolve()
        .map_err(|e| CodecError::InvalidType(format!("{}: {e}", param.ty)))?;
    codec::check_type(&ty)
        .map_err(|reason| CodecError::InvalidType(format!("{}: {reason}", param.ty)))?;
    Ok(ty)
}

fn check_param_nesting(param: &Param, depth: usize) -> Result<(), CodecError> {
    codec::check_nesting(&param.ty)?;
    let depth = depth + param.ty.bytes().filter(|b| matches!(b, b'(' | b'[')).count();
    if depth > MAX_TYPE_NESTING {
        return Err(CodecError::InvalidType(format!(
            "{}: components nest deeper than {MAX_TYPE_NESTING}",
            param.ty
        )));
    }
    param
        .components
        .iter()
        .try_for_each(|component| check_param_nesting(component, depth + 1))
}

/// True for `view` and `pure` functions.
#[must_use]
pub fn is_read_only(function: &Function) -> bool {
    matches!(
        function.state_mutability,
        StateMutability::View | StateMutability::Pure
    )
}

/// Lookups over a [`JsonAbi`].
pub trait AbiExt {
    /// First function with this name.
    fn first_function(&self, name: &str) -> Option<&Function>;

    /// Function with this name and input count (overload resolution).
    fn function_with_arity(&self, name: &str, arity: usize) -> Option<&Function>;

    /// Custom error whose selector matches.
    fn error_by_selector(&self, selector: [u8; 4]) -> Option<&AbiError>;
}

impl AbiExt for JsonAbi {
    fn first_function(&self, name: &str) -> Option<&Function> {
        self.function(name).and_then(|overloads| overloads.first())
    }

    fn function_with_arity(&self, name: &str, arity: usize) -> Option<&Function> {
        self.function(name)?
            .iter()
            .find(|f| f.inputs.len() == arity)
    }

    fn error_by_selector(&self, selector: [u8; 4]) -> Option<&AbiError> {
        self.errors().find(|e| e.selector().0 == selector)
    }
}

/// Functions, events and errors of several ABIs in one document.
pub fn merge(abis: &[&JsonAbi]) -> JsonAbi {
    let mut merged = JsonAbi::default();
    for abi in abis {
        for (name, items) in &abi.functions {
            merged.functions.entry(name.clone()).or_default().extend(items.iter().cloned());
        }
        for (name, items) in &abi.events {
            merged.events.entry(name.clone()).or_default().extend(items.iter().cloned());
        }
        for (name, items) in &abi.errors {
            merged.errors.entry(name.clone()).or_default().extend(items.iter().cloned());
        }
    }
    merged
}

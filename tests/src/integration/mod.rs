//! # Integration Flows
//!
//! `ModulesClient` against `InMemoryChain`, which emulates the module factory
//! and scripted module instances.

pub mod chains;
pub mod lifecycle;
pub mod registry;
pub mod writes;

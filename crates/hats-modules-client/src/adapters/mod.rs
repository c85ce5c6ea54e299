//! # Adapters Layer (Outer Hexagon)
//!
//! Implementations of the driven ports.
//!
//! - `HttpRegistrySource` / `StaticRegistrySource` implement `RegistrySource`
//! - `InMemoryChain` implements `PublicClient` and `WalletClient` for tests
//!   and local development

pub mod memory_chain;
pub mod registry_source;

pub use memory_chain::*;
pub use registry_source::*;

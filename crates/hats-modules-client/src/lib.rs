//! # Hats Modules Client
//!
//! Client for the Hats Protocol modules registry: discover modules, deploy
//! instances through the module factory, build eligibility and toggle chains,
//! and call instance functions with arguments checked against their declared
//! Solidity types.
//!
//! ## Architecture
//!
//! | Layer | Location | Contents |
//! |-------|----------|----------|
//! | Domain | `domain/` | Registry entities, ABI codec (`alloy-dyn-abi` / `alloy-json-abi`), argument marshalling, factory encoding, revert decoding |
//! | Ports | `ports/` | `ModulesApi` (inbound); `PublicClient`, `WalletClient`, `RegistrySource` (outbound) |
//! | Adapters | `adapters/` | HTTP registry source, in-memory chain |
//! | Service | `service.rs` | `ModulesClient` |
//!
//! ## Error Taxonomy
//!
//! | Error | Raised when |
//! |-------|-------------|
//! | `ClientNotPrepared` | any registry-backed operation runs before `prepare` |
//! | `MissingWalletClient` | a write runs without a wallet client |
//! | `MissingPublicClient` | a read runs without a public client |
//! | `ChainIdMismatch` | public and wallet clients are on different networks |
//! | `ModuleNotAvailable` | the module is unknown or not deployed on the active network |
//! | `ParametersLengthsMismatch` | argument count differs from the declared signature |
//! | `InvalidParam` | an argument does not match its declared type |
//! | `TransactionReverted` | simulation or execution reverted (decoded reason attached) |
//! | `MissingToken` / `ModulesRegistryFetchError` | registry retrieval fails |
//!
//! ## Usage Example
//!
//! ```ignore
//! use hats_modules_client::prelude::*;
//!
//! let client = ModulesClient::builder()
//!     .public_client(public)
//!     .wallet_client(wallet)
//!     .build()
//!     .await?;
//! client.prepare(None).await?;
//!
//! let created = client
//!     .create_new_instance(CreateInstanceRequest {
//!         account: None,
//!         module_id: allowlist_id.into(),
//!         hat_id,
//!         immutable_args: vec![json!(owner_hat)],
//!         mutable_args: vec![json!([])],
//!     })
//!     .await?;
//! println!("instance at {}", created.new_instance);
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        BatchCreateInstancesResult, CallInstanceWriteFunctionResult, ChainModule,
        CreateInstanceResult, Factory, Module, ModuleCreationArg, ModuleCreationArgs,
        ModuleFilter, ModuleParameter, ModuleType, Registry, Role, TransactionReceipt,
        TransactionResult, TransactionStatus, WriteFunction, WriteFunctionArg,
    };

    // Value objects
    pub use crate::domain::value_objects::{Address, Bytes, ChainId, Hash, HatId, U256};

    // Domain services
    pub use crate::domain::abi::{AbiExt, JsonAbi};
    pub use crate::domain::config::ClientConfig;
    pub use crate::domain::marshal::{solidity_to_native_kind, verify, NativeKind};
    pub use crate::domain::registry::RegistryIndex;
    pub use crate::domain::services::{decode_revert, predict_instance_address, RevertReason};

    // Ports
    pub use crate::ports::inbound::{
        BatchCreateInstancesRequest, CallWriteFunctionRequest, CreateChainRequest,
        CreateInstanceRequest, ModulesApi, PredictInstanceRequest, ReadInstanceRequest,
    };
    pub use crate::ports::outbound::{PublicClient, RegistrySource, WalletClient};

    // Errors
    pub use crate::errors::{ErrorKind, ModulesError, RpcError};

    // Adapters
    pub use crate::adapters::{HttpRegistrySource, InMemoryChain, StaticRegistrySource};

    // Service
    pub use crate::service::{ModulesClient, ModulesClientBuilder};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================

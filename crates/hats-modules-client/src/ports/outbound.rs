//! # Driven Ports (SPI - Outbound)
//!
//! The collaborators the modules client depends on:
//! - `PublicClient`: reads contract state and waits for receipts
//! - `WalletClient`: signs and submits transactions
//! - `RegistrySource`: retrieves the registry document
//!
//! The client never speaks JSON-RPC itself; adapters translate these calls to
//! whatever transport the application uses.

use crate::domain::entities::{Registry, TransactionReceipt};
use crate::domain::value_objects::{Address, Bytes, ChainId, Hash, U256};
use crate::errors::{ModulesError, RpcError};
use async_trait::async_trait;

// =============================================================================
// REQUESTS
// =============================================================================

/// A read-only call (`eth_call`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRequest {
    /// Caller; matters for simulations of permissioned functions.
    pub from: Option<Address>,
    /// Contract to call.
    pub to: Address,
    /// Calldata.
    pub data: Bytes,
}

/// A state-changing transaction to sign and submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Signing account. `None` lets the wallet pick its default account.
    pub from: Option<Address>,
    /// Contract to call.
    pub to: Address,
    /// Calldata.
    pub data: Bytes,
    /// Value in wei.
    pub value: U256,
}

impl TransactionRequest {
    /// The read-only call that simulates this transaction.
    #[must_use]
    pub fn as_call(&self) -> CallRequest {
        CallRequest {
            from: self.from,
            to: self.to,
            data: self.data.clone(),
        }
    }
}

// =============================================================================
// PUBLIC CLIENT
// =============================================================================

/// Read access to a network.
///
/// Reverts are reported as [`RpcError::Reverted`] carrying the raw revert
/// payload so the client can decode it against the module ABI.
#[async_trait]
pub trait PublicClient: Send + Sync {
    /// Network this client is connected to.
    async fn chain_id(&self) -> Result<ChainId, RpcError>;

    /// Executes a read-only call and returns its return data.
    async fn call(&self, request: CallRequest) -> Result<Bytes, RpcError>;

    /// Deployed bytecode at `address` (empty when nothing is deployed).
    async fn get_code(&self, address: Address) -> Result<Bytes, RpcError>;

    /// Waits until `hash` is mined and returns its receipt.
    async fn wait_for_transaction_receipt(&self, hash: Hash) -> Result<TransactionReceipt, RpcError>;
}

// =============================================================================
// WALLET CLIENT
// =============================================================================

/// Signing access to a network.
#[async_trait]
pub trait WalletClient: Send + Sync {
    /// Network this wallet signs for.
    async fn chain_id(&self) -> Result<ChainId, RpcError>;

    /// Signs and submits `request`, returning the transaction hash.
    async fn send_transaction(&self, request: TransactionRequest) -> Result<Hash, RpcError>;
}

// =============================================================================
// REGISTRY SOURCE
// =============================================================================

/// Retrieves the registry document.
///
/// Implementations report failures as [`ModulesError::ModulesRegistryFetchError`]
/// or [`ModulesError::MissingToken`].
#[async_trait]
pub trait RegistrySource: Send + Sync {
    /// Fetches the full document.
    async fn fetch(&self) -> Result<Registry, ModulesError>;
}

//! # Error Types
//!
//! All error types surfaced by the modules client.
//!
//! `ModulesError` is the public taxonomy. Lower layers (`CodecError` from the
//! ABI codec, `ConfigError` from configuration, `RpcError` from the network
//! ports) fold into it through `From`.

use crate::domain::config::ConfigError;
use crate::domain::value_objects::Bytes;
use thiserror::Error;

// =============================================================================
// MODULES ERRORS
// =============================================================================

/// Errors returned by every client operation.
///
/// Each variant carries a human readable message; callers discriminate on the
/// variant (or on [`ModulesError::kind`]).
#[derive(Debug, Error, Clone)]
pub enum ModulesError {
    /// The supplied clients are not connected to the expected network.
    #[error("chain id mismatch: {0}")]
    ChainIdMismatch(String),

    /// A read operation was attempted without a public client.
    #[error("missing public client: {0}")]
    MissingPublicClient(String),

    /// A write operation was attempted without a wallet client.
    #[error("missing wallet client: {0}")]
    MissingWalletClient(String),

    /// The registry has not been loaded yet (call `prepare` first).
    #[error("client not prepared: {0}")]
    ClientNotPrepared(String),

    /// The transaction reverted. Carries the decoded revert reason when known.
    #[error("{0}")]
    TransactionReverted(String),

    /// Unknown module, or module without a deployment on the active network.
    #[error("module not available: {0}")]
    ModuleNotAvailable(String),

    /// An argument does not match its declared type.
    #[error("invalid param: {0}")]
    InvalidParam(String),

    /// Argument count does not match the declared signature.
    #[error("parameters lengths mismatch: {0}")]
    ParametersLengthsMismatch(String),

    /// A required token was not supplied.
    #[error("missing token: {0}")]
    MissingToken(String),

    /// The registry could not be retrieved or parsed.
    #[error("modules registry fetch error: {0}")]
    ModulesRegistryFetchError(String),

    /// A network collaborator failed.
    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError),
}

/// Fieldless discriminant of [`ModulesError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`ModulesError::ChainIdMismatch`].
    ChainIdMismatch,
    /// See [`ModulesError::MissingPublicClient`].
    MissingPublicClient,
    /// See [`ModulesError::MissingWalletClient`].
    MissingWalletClient,
    /// See [`ModulesError::ClientNotPrepared`].
    ClientNotPrepared,
    /// See [`ModulesError::TransactionReverted`].
    TransactionReverted,
    /// See [`ModulesError::ModuleNotAvailable`].
    ModuleNotAvailable,
    /// See [`ModulesError::InvalidParam`].
    InvalidParam,
    /// See [`ModulesError::ParametersLengthsMismatch`].
    ParametersLengthsMismatch,
    /// See [`ModulesError::MissingToken`].
    MissingToken,
    /// See [`ModulesError::ModulesRegistryFetchError`].
    ModulesRegistryFetchError,
    /// See [`ModulesError::Rpc`].
    Rpc,
}

impl ModulesError {
    /// Returns the fieldless kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ChainIdMismatch(_) => ErrorKind::ChainIdMismatch,
            Self::MissingPublicClient(_) => ErrorKind::MissingPublicClient,
            Self::MissingWalletClient(_) => ErrorKind::MissingWalletClient,
            Self::ClientNotPrepared(_) => ErrorKind::ClientNotPrepared,
            Self::TransactionReverted(_) => ErrorKind::TransactionReverted,
            Self::ModuleNotAvailable(_) => ErrorKind::ModuleNotAvailable,
            Self::InvalidParam(_) => ErrorKind::InvalidParam,
            Self::ParametersLengthsMismatch(_) => ErrorKind::ParametersLengthsMismatch,
            Self::MissingToken(_) => ErrorKind::MissingToken,
            Self::ModulesRegistryFetchError(_) => ErrorKind::ModulesRegistryFetchError,
            Self::Rpc(_) => ErrorKind::Rpc,
        }
    }
}

impl From<CodecError> for ModulesError {
    fn from(err: CodecError) -> Self {
        Self::InvalidParam(err.to_string())
    }
}

impl From<ConfigError> for ModulesError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingToken(message) => Self::MissingToken(message),
            other => Self::InvalidParam(other.to_string()),
        }
    }
}

// =============================================================================
// CODEC ERRORS
// =============================================================================

/// Errors from ABI type parsing, encoding and decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The Solidity type string could not be parsed.
    #[error("invalid solidity type: {0}")]
    InvalidType(String),

    /// A value does not match the type it is encoded as.
    #[error("type mismatch: expected {expected}, got {found}")]
    TypeMismatch { expected: String, found: String },

    /// A numeric value does not fit its declared width.
    #[error("value {value} out of range for {ty}")]
    OutOfRange { value: String, ty: String },

    /// Wrong number of elements for a fixed array, tuple or argument list.
    #[error("length mismatch for {ty}: expected {expected}, got {actual}")]
    LengthMismatch {
        ty: String,
        expected: usize,
        actual: usize,
    },

    /// Hex text could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Encoded data does not match the declared layout.
    #[error("malformed abi data: {0}")]
    Decode(String),

    /// The type cannot be used in this encoding mode.
    #[error("unsupported in packed encoding: {0}")]
    UnsupportedPacked(String),
}

// =============================================================================
// RPC ERRORS
// =============================================================================

/// Errors reported by the network collaborators (public and wallet clients).
#[derive(Debug, Error, Clone)]
pub enum RpcError {
    /// Execution reverted. `data` is the raw revert payload.
    #[error("execution reverted: {message}")]
    Reverted { message: String, data: Bytes },

    /// Transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Request timed out in the transport.
    #[error("request timed out")]
    Timeout,

    /// Requested item (e.g. receipt) is unknown to the node.
    #[error("not found: {0}")]
    NotFound(String),

    /// The node answered with something the client cannot interpret.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

// =============================================================================
// TESTS
// =============================================================================

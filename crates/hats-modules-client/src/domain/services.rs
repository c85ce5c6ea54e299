//! # Domain Services
//!
//! Pure functions shared by the client and the in-memory chain: Keccak-256
//! hashing, selectors and topics, revert payload decoding and deterministic
//! instance address derivation.
//!
//! - NO I/O operations
//! - NO async code

use crate::domain::abi::{param_types, AbiExt, JsonAbi};
use crate::domain::codec::{self, DynSolType, DynSolValue};
use crate::domain::value_objects::{from_abi_uint, Address, ChainId, Hash, U256};
use sha3::{Digest, Keccak256};
use std::fmt;

// =============================================================================
// KECCAK256 UTILITY
// =============================================================================

/// Computes keccak256 hash of data.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let hash = Keccak256::digest(data);
    Hash::new(hash.into())
}

/// First four bytes of `keccak256(signature)`.
#[must_use]
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash.as_bytes()[..4]);
    selector
}

/// Topic0 of an event: the full `keccak256(signature)`.
#[must_use]
pub fn event_topic(signature: &str) -> Hash {
    keccak256(signature.as_bytes())
}

/// Prefixes `args` (already ABI-encoded) with the selector of `signature`.
#[must_use]
pub fn calldata(signature: &str, args: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + args.len());
    data.extend_from_slice(&function_selector(signature));
    data.extend_from_slice(args);
    data
}

// =============================================================================
// REVERT DECODING
// =============================================================================

/// `Error(string)`.
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// `Panic(uint256)`.
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// A decoded revert payload.
#[derive(Clone, Debug, PartialEq)]
pub enum RevertReason {
    /// `require(cond, "message")` / `revert("message")`.
    Message(String),
    /// Compiler-inserted panic (overflow, division by zero, ...).
    Panic(U256),
    /// A custom error declared in the module ABI.
    Custom { name: String, args: Vec<DynSolValue> },
    /// Empty data or a selector the ABI does not declare.
    Unknown(Vec<u8>),
}

impl fmt::Display for RevertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(msg) => write!(f, "module function reverted with reason: {msg}"),
            Self::Panic(code) => write!(
                f,
                "module function panicked with code 0x{code:x} ({})",
                panic_description(*code)
            ),
            Self::Custom { name, .. } => {
                write!(f, "module function reverted with error name {name}")
            }
            Self::Unknown(data) if data.is_empty() => {
                f.write_str("module function reverted without a reason")
            }
            Self::Unknown(data) => write!(
                f,
                "module function reverted with unknown error data 0x{}",
                hex::encode(data)
            ),
        }
    }
}

/// Decodes revert `data`, resolving custom errors against `abi`.
#[must_use]
pub fn decode_revert(data: &[u8], abi: &JsonAbi) -> RevertReason {
    let Some(selector) = data.get(..4).and_then(|s| <[u8; 4]>::try_from(s).ok()) else {
        return RevertReason::Unknown(data.to_vec());
    };
    let payload = &data[4..];

    if selector == ERROR_STRING_SELECTOR {
        if let Ok(values) = codec::decode(&[DynSolType::String], payload) {
            if let Some(DynSolValue::String(msg)) = values.into_iter().next() {
                return RevertReason::Message(msg);
            }
        }
    } else if selector == PANIC_SELECTOR {
        if let Ok(values) = codec::decode(&[DynSolType::Uint(256)], payload) {
            if let Some(DynSolValue::Uint(code, _)) = values.first() {
                return RevertReason::Panic(from_abi_uint(*code));
            }
        }
    } else if let Some(error) = abi.error_by_selector(selector) {
        // Arguments are best effort; the name alone identifies the error.
        let args = param_types(&error.inputs)
            .ok()
            .and_then(|types| codec::decode(&types, payload).ok())
            .unwrap_or_default();
        return RevertReason::Custom {
            name: error.name.clone(),
            args,
        };
    }
    RevertReason::Unknown(data.to_vec())
}

fn panic_description(code: U256) -> &'static str {
    if code.bits() > 8 {
        return "unknown panic";
    }
    match code.low_u32() {
        0x01 => "assertion failed",
        0x11 => "arithmetic overflow or underflow",
        0x12 => "division or modulo by zero",
        0x21 => "invalid enum value",
        0x22 => "invalid storage byte array",
        0x31 => "pop on empty array",
        0x32 => "array index out of bounds",
        0x41 => "out of memory",
        0x51 => "call to zero-initialized function",
        _ => "unknown panic",
    }
}

/// Builds the `Error(string)` revert payload for `message`.
#[must_use]
pub fn encode_revert_message(message: &str) -> Vec<u8> {
    let mut data = ERROR_STRING_SELECTOR.to_vec();
    data.extend(codec::encode(&[DynSolValue::String(message.to_string())]));
    data
}

// =============================================================================
// INSTANCE ADDRESS DERIVATION
// =============================================================================

const CLONE_PREFIX: [u8; 20] = [
    0x3d, 0x60, 0x2d, 0x80, 0x60, 0x0a, 0x3d, 0x39, 0x81, 0xf3, 0x36, 0x3d, 0x3d, 0x37, 0x3d, 0x3d,
    0x3d, 0x36, 0x3d, 0x73,
];
const CLONE_SUFFIX: [u8; 15] = [
    0x5a, 0xf4, 0x3d, 0x82, 0x80, 0x3e, 0x90, 0x3d, 0x91, 0x60, 0x2b, 0x57, 0xfd, 0x5b, 0xf3,
];

/// Computes the contract address for CREATE2 opcode.
///
/// Address = keccak256(0xff ++ sender ++ salt ++ `keccak256(init_code)`)\[12:\]
///
/// Per EIP-1014.
#[must_use]
pub fn compute_contract_address_create2(sender: Address, salt: Hash, init_code: &[u8]) -> Address {
    let code_hash = Keccak256::digest(init_code);

    let mut data = Vec::with_capacity(85);
    data.push(0xff);
    data.extend_from_slice(sender.as_bytes());
    data.extend_from_slice(salt.as_bytes());
    data.extend_from_slice(&code_hash);

    let hash = Keccak256::digest(&data);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..32]);
    Address::new(addr)
}

/// Immutable argument blob appended to every module clone:
/// `factory ++ implementation ++ hatId ++ otherImmutableArgs`.
#[must_use]
pub fn instance_immutable_args(
    factory: Address,
    implementation: Address,
    hat_id: U256,
    other_immutable_args: &[u8],
) -> Vec<u8> {
    let mut args = Vec::with_capacity(20 + 20 + 32 + other_immutable_args.len());
    args.extend_from_slice(factory.as_bytes());
    args.extend_from_slice(implementation.as_bytes());
    let mut word = [0u8; 32];
    hat_id.to_big_endian(&mut word);
    args.extend_from_slice(&word);
    args.extend_from_slice(other_immutable_args);
    args
}

/// Deterministic address of a module instance deployed by `factory`.
///
/// Salt is `keccak256(args ++ chainId)`; creation code is a minimal proxy to
/// `implementation` with `args` appended.
#[must_use]
pub fn predict_instance_address(
    factory: Address,
    implementation: Address,
    hat_id: U256,
    other_immutable_args: &[u8],
    chain_id: ChainId,
) -> Address {
    let args = instance_immutable_args(factory, implementation, hat_id, other_immutable_args);

    let mut salt_input = args.clone();
    let mut chain_word = [0u8; 32];
    U256::from(chain_id.as_u64()).to_big_endian(&mut chain_word);
    salt_input.extend_from_slice(&chain_word);
    let salt = keccak256(&salt_input);

    let mut init_code = Vec::with_capacity(CLONE_PREFIX.len() + 20 + CLONE_SUFFIX.len() + args.len());
    init_code.extend_from_slice(&CLONE_PREFIX);
    init_code.extend_from_slice(implementation.as_bytes());
    init_code.extend_from_slice(&CLONE_SUFFIX);
    init_code.extend_from_slice(&args);

    compute_contract_address_create2(factory, salt, &init_code)
}

// =============================================================================
// UNIT TESTS
// =============================================================================

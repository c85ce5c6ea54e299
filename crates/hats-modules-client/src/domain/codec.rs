//! # ABI Codec
//!
//! Thin layer over `alloy-dyn-abi`: type parsing with the limits registry
//! documents are held to, head/tail parameter encoding and its width-checked
//! inverse, and the packed encoding used for module immutable arguments.
//!
//! Pure functions only; no I/O.

pub use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{I256, U256};

use crate::errors::CodecError;

/// Size of one ABI word.
pub const WORD: usize = 32;

/// Most `(` and `[` a single type string may contain.
pub const MAX_TYPE_NESTING: usize = 32;

// =============================================================================
// TYPES
// =============================================================================

/// Parses a Solidity type string such as `uint256`, `address[]`,
/// `(uint256,bytes)[2]` or `tuple(address,bool)`.
pub fn parse_type(text: &str) -> Result<DynSolType, CodecError> {
    check_nesting(text)?;
    let ty = DynSolType::parse(text.trim())
        .map_err(|e| CodecError::InvalidType(format!("{text}: {e}")))?;
    check_type(&ty).map_err(|reason| CodecError::InvalidType(format!("{text}: {reason}")))?;
    Ok(ty)
}

/// Rejects type strings deeper than [`MAX_TYPE_NESTING`] before they reach
/// the recursive parser.
pub(crate) fn check_nesting(text: &str) -> Result<(), CodecError> {
    let brackets = text.bytes().filter(|b| matches!(b, b'(' | b'[')).count();
    if brackets > MAX_TYPE_NESTING {
        return Err(CodecError::InvalidType(format!(
            "type nests {brackets} levels, limit is {MAX_TYPE_NESTING}"
        )));
    }
    Ok(())
}

/// Width and length limits `DynSolType::parse` leaves to the caller.
pub(crate) fn check_type(ty: &DynSolType) -> Result<(), String> {
    match ty {
        DynSolType::Uint(bits) | DynSolType::Int(bits)
            if *bits == 0 || *bits > 256 || bits % 8 != 0 =>
        {
            Err(format!("integer width {bits}"))
        }
        DynSolType::FixedBytes(size) if *size == 0 || *size > WORD => {
            Err(format!("fixed bytes size {size}"))
        }
        DynSolType::FixedArray(_, 0) => Err("zero-length fixed array".into()),
        DynSolType::Array(inner) | DynSolType::FixedArray(inner, _) => check_type(inner),
        DynSolType::Tuple(members) => members.iter().try_for_each(check_type),
        _ => Ok(()),
    }
}

/// Canonical spelling of a list of types, as used in signatures.
pub fn type_list(types: &[DynSolType]) -> String {
    types
        .iter()
        .map(|ty| ty.sol_type_name().into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

// =============================================================================
// ENCODING
// =============================================================================

/// ABI-encodes `values` as a parameter list (no selector).
pub fn encode(values: &[DynSolValue]) -> Vec<u8> {
    DynSolValue::Tuple(values.to_vec()).abi_encode_params()
}

/// Packed encoding as produced by `abi.encodePacked`. Array elements are
/// padded to a full word; tuples and arrays of dynamic elements are rejected.
pub fn encode_packed(values: &[DynSolValue]) -> Result<Vec<u8>, CodecError> {
    for value in values {
        packable(value)?;
    }
    Ok(DynSolValue::Tuple(values.to_vec()).abi_encode_packed())
}

fn packable(value: &DynSolValue) -> Result<(), CodecError> {
    match value {
        DynSolValue::Tuple(_) => Err(CodecError::UnsupportedPacked("tuple".into())),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            if items
                .iter()
                .any(|item| item.is_dynamic() || matches!(item, DynSolValue::Tuple(_)))
            {
                Err(CodecError::UnsupportedPacked(
                    "array of dynamic or tuple elements".into(),
                ))
            } else {
                Ok(())
            }
        }
        _ => Ok(()),
    }
}

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a parameter list of `types` from `data`.
///
/// Integer words must fit the declared width: a `uint8` word holding 256 is
/// malformed data, not a value to truncate.
pub fn decode(types: &[DynSolType], data: &[u8]) -> Result<Vec<DynSolValue>, CodecError> {
    let decoded = DynSolType::Tuple(types.to_vec())
        .abi_decode_params(data)
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    let values = match decoded {
        DynSolValue::Tuple(values) => values,
        other => vec![other],
    };
    if values.len() != types.len() {
        return Err(CodecError::LengthMismatch {
            ty: format!("({})", type_list(types)),
            expected: types.len(),
            actual: values.len(),
        });
    }
    values.iter().try_for_each(check_range)?;
    Ok(values)
}

fn check_range(value: &DynSolValue) -> Result<(), CodecError> {
    match value {
        DynSolValue::Uint(v, bits) if v.bit_len() > *bits => Err(CodecError::OutOfRange {
            value: v.to_string(),
            ty: format!("uint{bits}"),
        }),
        DynSolValue::Int(v, bits) if !int_fits(*v, *bits) => Err(CodecError::OutOfRange {
            value: v.to_string(),
            ty: format!("int{bits}"),
        }),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            items.iter().try_for_each(check_range)
        }
        _ => Ok(()),
    }
}

/// Whether a signed value fits in `bits` two's-complement bits.
pub fn int_fits(value: I256, bits: usize) -> bool {
    if bits >= 256 {
        return true;
    }
    let bound = U256::from(1u8) << (bits - 1);
    let magnitude = value.unsigned_abs();
    if value.is_negative() {
        magnitude <= bound
    } else {
        magnitude < bound
    }
}

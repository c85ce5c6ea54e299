//! # Argument Marshalling
//!
//! Conversion between caller supplied JSON values and typed [`DynSolValue`]s.
//!
//! Accepted inputs per declared type:
//!
//! | Solidity type       | JSON input                                        |
//! |---------------------|---------------------------------------------------|
//! | `uintN` / `intN`    | integer number, decimal string, `0x` hex string   |
//! | `bool`              | `true` / `false`                                  |
//! | `address`           | `0x` + 40 hex digits                              |
//! | `string`            | string                                            |
//! | `bytes` / `bytesN`  | `0x` hex string (exactly N bytes for `bytesN`)    |
//! | `T[]` / `T[k]`      | array (exactly k items for `T[k]`)                |
//! | tuple               | array with one item per member                    |
//!
//! Outputs use the same shapes. Integers of at most 48 bits become JSON
//! numbers, wider integers become decimal strings.

use crate::domain::codec::{int_fits, parse_type, DynSolType, DynSolValue, WORD};
use crate::domain::value_objects::{decode_hex, Address};
use crate::errors::{CodecError, ModulesError};
use alloy_primitives::{B256, I256, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Widest integer that is still returned as a JSON number.
pub const MAX_NUMBER_BITS: usize = 48;

// =============================================================================
// NATIVE KINDS
// =============================================================================

/// Native argument kind a Solidity type maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NativeKind {
    Number,
    BigInt,
    String,
    Boolean,
    NumberArray,
    BigIntArray,
    StringArray,
    BooleanArray,
    Unknown,
}

/// Classifies a Solidity type string into its native argument kind.
///
/// Unparseable types, tuples and nested arrays are `Unknown`.
#[must_use]
pub fn solidity_to_native_kind(ty: &str) -> NativeKind {
    let Ok(parsed) = parse_type(ty) else {
        return NativeKind::Unknown;
    };
    match &parsed {
        DynSolType::Array(inner) | DynSolType::FixedArray(inner, _) => match scalar_kind(inner) {
            Some(NativeKind::Number) => NativeKind::NumberArray,
            Some(NativeKind::BigInt) => NativeKind::BigIntArray,
            Some(NativeKind::String) => NativeKind::StringArray,
            Some(NativeKind::Boolean) => NativeKind::BooleanArray,
            _ => NativeKind::Unknown,
        },
        scalar => scalar_kind(scalar).unwrap_or(NativeKind::Unknown),
    }
}

fn scalar_kind(ty: &DynSolType) -> Option<NativeKind> {
    match ty {
        DynSolType::Uint(bits) | DynSolType::Int(bits) if *bits <= MAX_NUMBER_BITS => {
            Some(NativeKind::Number)
        }
        DynSolType::Uint(_) | DynSolType::Int(_) => Some(NativeKind::BigInt),
        DynSolType::Address | DynSolType::String | DynSolType::Bytes | DynSolType::FixedBytes(_) => {
            Some(NativeKind::String)
        }
        DynSolType::Bool => Some(NativeKind::Boolean),
        _ => None,
    }
}

// =============================================================================
// JSON -> ABI
// =============================================================================

fn name(ty: &DynSolType) -> String {
    ty.sol_type_name().into_owned()
}

fn mismatch(ty: &DynSolType, value: &Value) -> CodecError {
    CodecError::TypeMismatch {
        expected: name(ty),
        found: json_kind(value).to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parses an unsigned magnitude from decimal or `0x` hex text.
fn parse_magnitude(text: &str, ty: &DynSolType) -> Result<U256, CodecError> {
    let out_of_range = || CodecError::OutOfRange {
        value: text.to_string(),
        ty: name(ty),
    };
    if let Some(hex_digits) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        if hex_digits.is_empty() || hex_digits.len() > 64 {
            return Err(out_of_range());
        }
        return U256::from_str_radix(hex_digits, 16)
            .map_err(|_| CodecError::InvalidHex(text.to_string()));
    }
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::TypeMismatch {
            expected: name(ty),
            found: format!("\"{text}\""),
        });
    }
    U256::from_str_radix(text, 10).map_err(|_| out_of_range())
}

/// Reads a JSON number or string as (negative, magnitude).
fn integer_parts(ty: &DynSolType, value: &Value) -> Result<(bool, U256), CodecError> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Ok((false, U256::from(u)))
            } else if let Some(i) = n.as_i64() {
                Ok((i < 0, U256::from(i.unsigned_abs())))
            } else {
                Err(CodecError::TypeMismatch {
                    expected: name(ty),
                    found: format!("non-integer number {n}"),
                })
            }
        }
        Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix('-') {
                Some(rest) => Ok((true, parse_magnitude(rest, ty)?)),
                None => Ok((false, parse_magnitude(s, ty)?)),
            }
        }
        other => Err(mismatch(ty, other)),
    }
}

fn elements<'a>(ty: &DynSolType, value: &'a Value) -> Result<&'a [Value], CodecError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(mismatch(ty, other)),
    }
}

fn check_len(ty: &DynSolType, expected: usize, actual: usize) -> Result<(), CodecError> {
    if expected != actual {
        return Err(CodecError::LengthMismatch {
            ty: name(ty),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Converts a JSON value into a [`DynSolValue`] of type `ty`.
pub fn to_abi_value(ty: &DynSolType, value: &Value) -> Result<DynSolValue, CodecError> {
    match ty {
        DynSolType::Uint(bits) => {
            let (negative, magnitude) = integer_parts(ty, value)?;
            if (negative && !magnitude.is_zero()) || magnitude.bit_len() > *bits {
                return Err(CodecError::OutOfRange {
                    value: value.to_string(),
                    ty: name(ty),
                });
            }
            Ok(DynSolValue::Uint(magnitude, *bits))
        }
        DynSolType::Int(bits) => {
            let (negative, magnitude) = integer_parts(ty, value)?;
            let out_of_range = || CodecError::OutOfRange {
                value: value.to_string(),
                ty: name(ty),
            };
            let min_magnitude = U256::from(1u8) << 255usize;
            if magnitude > min_magnitude || (magnitude == min_magnitude && !negative) {
                return Err(out_of_range());
            }
            let raw = I256::from_raw(magnitude);
            let signed = if negative { raw.wrapping_neg() } else { raw };
            if !int_fits(signed, *bits) {
                return Err(out_of_range());
            }
            Ok(DynSolValue::Int(signed, *bits))
        }
        DynSolType::Bool => match value {
            Value::Bool(b) => Ok(DynSolValue::Bool(*b)),
            other => Err(mismatch(ty, other)),
        },
        DynSolType::Address => match value {
            Value::String(s) => s
                .trim()
                .parse::<Address>()
                .map(|a| DynSolValue::Address(a.into())),
            other => Err(mismatch(ty, other)),
        },
        DynSolType::String => match value {
            Value::String(s) => Ok(DynSolValue::String(s.clone())),
            other => Err(mismatch(ty, other)),
        },
        DynSolType::Bytes => match value {
            Value::String(s) => decode_hex(s).map(DynSolValue::Bytes),
            other => Err(mismatch(ty, other)),
        },
        DynSolType::FixedBytes(n) => match value {
            Value::String(s) => {
                let bytes = decode_hex(s)?;
                if bytes.len() != *n {
                    return Err(CodecError::LengthMismatch {
                        ty: name(ty),
                        expected: *n,
                        actual: bytes.len(),
                    });
                }
                let mut word = [0u8; WORD];
                word[..*n].copy_from_slice(&bytes);
                Ok(DynSolValue::FixedBytes(B256::from(word), *n))
            }
            other => Err(mismatch(ty, other)),
        },
        DynSolType::Array(inner) => elements(ty, value)?
            .iter()
            .map(|item| to_abi_value(inner, item))
            .collect::<Result<Vec<_>, _>>()
            .map(DynSolValue::Array),
        DynSolType::FixedArray(inner, len) => {
            let items = elements(ty, value)?;
            check_len(ty, *len, items.len())?;
            items
                .iter()
                .map(|item| to_abi_value(inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::FixedArray)
        }
        DynSolType::Tuple(members) => {
            let items = elements(ty, value)?;
            check_len(ty, members.len(), items.len())?;
            members
                .iter()
                .zip(items)
                .map(|(member, item)| to_abi_value(member, item))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::Tuple)
        }
        other => Err(CodecError::InvalidType(format!(
            "{} arguments are not supported",
            name(other)
        ))),
    }
}

/// True if `value` can be used as an argument of Solidity type `ty`.
#[must_use]
pub fn verify(value: &Value, ty: &str) -> bool {
    parse_type(ty)
        .and_then(|parsed| to_abi_value(&parsed, value))
        .is_ok()
}

/// A declared argument: its name (for messages) and parsed type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: String,
    pub ty: DynSolType,
}

impl ArgSpec {
    /// Parses `ty` into an argument spec.
    pub fn parse(name: impl Into<String>, ty: &str) -> Result<Self, ModulesError> {
        let name = name.into();
        let ty = parse_type(ty)
            .map_err(|e| ModulesError::InvalidParam(format!("argument {name}: {e}")))?;
        Ok(Self { name, ty })
    }
}

/// Converts a full argument list.
///
/// The count is checked first ([`ModulesError::ParametersLengthsMismatch`]),
/// then each value against its type ([`ModulesError::InvalidParam`] naming the
/// argument).
pub fn marshal_args(
    context: &str,
    specs: &[ArgSpec],
    values: &[Value],
) -> Result<Vec<DynSolValue>, ModulesError> {
    if specs.len() != values.len() {
        return Err(ModulesError::ParametersLengthsMismatch(format!(
            "{context}: expected {} arguments, got {}",
            specs.len(),
            values.len()
        )));
    }
    specs
        .iter()
        .zip(values)
        .map(|(spec, value)| {
            to_abi_value(&spec.ty, value).map_err(|e| {
                ModulesError::InvalidParam(format!("{context}: argument {}: {e}", spec.name))
            })
        })
        .collect()
}

// =============================================================================
// ABI -> JSON
// =============================================================================

/// Converts a decoded value back into JSON.
///
/// Values wider than their declared width (never produced by
/// [`crate::domain::codec::decode`]) come out as decimal strings rather than
/// truncated numbers.
#[must_use]
pub fn to_json(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Uint(v, bits) => match small_uint(*v) {
            Some(n) if *bits <= MAX_NUMBER_BITS => Value::from(n),
            _ => Value::String(v.to_string()),
        },
        DynSolValue::Int(v, bits) => match small_int(*v) {
            Some(n) if *bits <= MAX_NUMBER_BITS => Value::from(n),
            _ => Value::String(v.to_string()),
        },
        DynSolValue::Address(a) => Value::String(Address::from(*a).to_string()),
        DynSolValue::Bool(b) => Value::Bool(*b),
        DynSolValue::String(s) => Value::String(s.clone()),
        DynSolValue::Bytes(b) => Value::String(format!("0x{}", hex::encode(b))),
        DynSolValue::FixedBytes(word, n) => {
            Value::String(format!("0x{}", hex::encode(&word[..(*n).min(WORD)])))
        }
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            Value::Array(items.iter().map(to_json).collect())
        }
        other => Value::String(format!("0x{}", hex::encode(other.abi_encode_packed()))),
    }
}

fn small_uint(value: U256) -> Option<u64> {
    (value.bit_len() <= 64).then(|| value.as_limbs()[0])
}

fn small_int(value: I256) -> Option<i64> {
    let magnitude = i64::try_from(small_uint(value.unsigned_abs())?).ok()?;
    if value.is_negative() {
        magnitude.checked_neg()
    } else {
        Some(magnitude)
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================

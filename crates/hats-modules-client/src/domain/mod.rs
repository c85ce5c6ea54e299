//! # Domain Layer (Inner Hexagon)
//!
//! Registry model, ABI codec, argument marshalling and factory interface.
//! NO I/O, NO async.
//!
//! Dependencies point INWARD only: ports and adapters depend on this layer,
//! never the reverse.

pub mod abi;
pub mod codec;
pub mod config;
pub mod entities;
pub mod factory;
pub mod marshal;
pub mod registry;
pub mod services;
pub mod value_objects;

pub use abi::*;
pub use codec::{DynSolType, DynSolValue};
pub use config::*;
pub use entities::*;
pub use marshal::{solidity_to_native_kind, verify, NativeKind};
pub use registry::RegistryIndex;
pub use services::{decode_revert, keccak256, RevertReason};
pub use value_objects::*;

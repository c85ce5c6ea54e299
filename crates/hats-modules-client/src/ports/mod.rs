//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions between the client and the outside world.
//!
//! - **Driving Ports (Inbound)**: `ModulesApi`
//! - **Driven Ports (Outbound)**: `PublicClient`, `WalletClient`, `RegistrySource`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;

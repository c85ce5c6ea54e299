//! # Hats Modules Test Suite
//!
//! End-to-end flows of `ModulesClient` against the in-memory chain adapter.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures/         # Registry document, scripted module logic, client setup
//! └── integration/      # Flows grouped by client area
//!     ├── registry.rs   # prepare, lookups, filters
//!     ├── lifecycle.rs  # builder, missing collaborators, unprepared client
//!     ├── instances.rs  # create, batch create, predict, instance lookup
//!     ├── chains.rs     # eligibilities / toggles chains
//!     ├── writes.rs     # write functions, reverts
//!     └── reads.rs      # instance parameters, view calls
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p hats-modules-tests
//! RUST_LOG=hats_modules_client=debug cargo test -p hats-modules-tests -- --nocapture
//!
//! # Benchmarks
//! cargo bench -p hats-modules-tests
//! ```

#![allow(dead_code)]

pub mod integration;

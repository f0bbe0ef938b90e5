//! TaskFlow stub server library.
//!
//! An in-memory implementation of the TaskFlow REST API, exposed for
//! in-process integration tests and local demos of the terminal client.

pub mod config;
pub mod server;
pub mod store;

//! Shared wire types for the TaskFlow REST API.
//!
//! Both the terminal client and the development stub server speak JSON
//! through these types, so the two can never disagree on field names.

pub mod auth;
pub mod error;
pub mod task;

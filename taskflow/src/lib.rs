//! `TaskFlow`: terminal client for a task-management REST API.

pub mod api;
pub mod app;
pub mod config;
pub mod net;
pub mod session;
pub mod tasks;
pub mod ui;

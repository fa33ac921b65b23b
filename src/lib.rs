//! Knowledge extraction API server.
//!
//! Stores project metadata in SQLite and exposes HTTP endpoints for
//! agent-backed conversational sessions scoped to a project's repository.

pub mod agent;
pub mod api;
pub mod config;
pub mod db;
pub mod project;
pub mod session;

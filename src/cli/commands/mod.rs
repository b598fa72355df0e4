//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod access;
pub mod dump;
pub mod erase;
pub mod fields;
pub mod init;
pub mod validate;

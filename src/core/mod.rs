//! Core processing: traversal, export, erasure, dump sanitization and the
//! field inventory.

pub mod dump;
pub mod export;
pub mod inventory;
pub mod tasks;
pub mod traversal;

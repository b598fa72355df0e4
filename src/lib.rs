// Amnesia - GDPR data subject request toolkit
// Copyright (c) 2025 Amnesia Contributors
// Licensed under the MIT License

//! # Amnesia - GDPR Data Subject Request Toolkit
//!
//! Amnesia processes GDPR data subject requests against a structured
//! entity store: Right to Access exports, Right to be Forgotten erasure,
//! and sanitized SQL dumps for safe environment refreshes.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Classifying** fields through per-field sensitivity policies
//! - **Traversing** the entity graph from a data subject, following
//!   configured relationships with cycle protection
//! - **Exporting** subject data as grouped CSV files plus bundled file
//!   assets in a single zip archive
//! - **Erasing** subject data by clearing or anonymizing fields, with an
//!   audit log of every applied action
//! - **Sanitizing** SQL dumps by substituting anonymized shadow tables for
//!   tables holding sensitive columns
//!
//! ## Architecture
//!
//! Amnesia follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (traversal, export, tasks, dump, inventory)
//! - [`store`] - Entity storage (JSON-backed and in-memory)
//! - [`anonymize`] - Anonymizer plugins and registry
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use amnesia::anonymize::AnonymizerRegistry;
//! use amnesia::config::load_config;
//! use amnesia::core::tasks::{Task, TaskKind, TaskManager};
//! use amnesia::domain::EntityRef;
//! use amnesia::store::JsonStore;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("amnesia.toml")?;
//!     let registry = config.policy_registry()?;
//!     let anonymizers = AnonymizerRegistry::with_builtins();
//!     let store = JsonStore::open("entities.json")?;
//!
//!     let manager = TaskManager::new(&registry, &anonymizers, &config.export.directory);
//!     let mut task = Task::new(TaskKind::Access, EntityRef::parse("user:123")?);
//!     let archive = manager.process_access(&mut task, &store)?;
//!
//!     println!("Export written to {}", archive.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Amnesia uses the [`domain::AmnesiaError`] type for all errors:
//!
//! ```rust,no_run
//! use amnesia::domain::AmnesiaError;
//!
//! fn example() -> Result<(), AmnesiaError> {
//!     let config = amnesia::config::load_config("amnesia.toml")?;
//!     Ok(())
//! }
//! ```

pub mod anonymize;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod store;

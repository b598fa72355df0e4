//! Data subject request tasks
//!
//! A [`Task`] records one Right to Access or Right to be Forgotten request
//! for a subject entity. The [`TaskManager`] drives a task end to end:
//! traverse from the subject, hand the results to the export pipeline or
//! apply erasure actions, and flip the task to processed.

use crate::anonymize::AnonymizerRegistry;
use crate::core::export::Exporter;
use crate::core::traversal::{
    apply_actions, AccessVisitor, AuditEntry, RemovalAction, RemovalVisitor, Traverser,
};
use crate::domain::policy::PolicyRegistry;
use crate::domain::{AmnesiaError, EntityRef, Result};
use crate::store::EntityStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Which data subject right a task exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Right to Access: produce an export archive
    Access,
    /// Right to be Forgotten: erase or anonymize stored values
    Removal,
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created but not yet processed
    Requested,
    /// Fully processed
    Processed,
}

/// One data subject request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task id
    pub id: Uuid,
    /// The right being exercised
    pub kind: TaskKind,
    /// The subject entity the request concerns
    pub subject: EntityRef,
    /// Lifecycle state
    pub status: TaskStatus,
    /// Creation timestamp
    pub created: DateTime<Utc>,
}

impl Task {
    /// Create a new task in the requested state
    pub fn new(kind: TaskKind, subject: EntityRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            subject,
            status: TaskStatus::Requested,
            created: Utc::now(),
        }
    }
}

/// Result of processing a removal task.
#[derive(Debug)]
pub struct RemovalOutcome {
    /// The actions collected during traversal
    pub actions: Vec<RemovalAction>,
    /// Audit log of applied actions, empty for a dry run
    pub audit: Vec<AuditEntry>,
    /// Path of the written audit file, `None` for a dry run
    pub audit_file: Option<PathBuf>,
}

/// Drives tasks through traversal, export and erasure.
pub struct TaskManager<'a> {
    policies: &'a PolicyRegistry,
    anonymizers: &'a AnonymizerRegistry,
    export_dir: PathBuf,
}

impl<'a> TaskManager<'a> {
    /// Create a manager over a policy registry and anonymizer registry
    pub fn new(
        policies: &'a PolicyRegistry,
        anonymizers: &'a AnonymizerRegistry,
        export_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            policies,
            anonymizers,
            export_dir: export_dir.into(),
        }
    }

    /// Process a Right to Access task, returning the archive path.
    pub fn process_access(&self, task: &mut Task, store: &dyn EntityStore) -> Result<PathBuf> {
        if task.kind != TaskKind::Access {
            return Err(AmnesiaError::Validation(
                "Task is not an access request".to_string(),
            ));
        }

        tracing::info!(task = %task.id, subject = %task.subject, "Processing access request");

        let mut visitor = AccessVisitor::new();
        let mut traverser = Traverser::new(store, self.policies);
        traverser.traverse(&task.subject, &mut visitor)?;

        let (rows, assets) = visitor.into_results();
        if rows.is_empty() {
            tracing::warn!(
                subject = %task.subject,
                "Traversal produced no rows, export will contain no data files"
            );
        }

        let archive = Exporter::new(&self.export_dir).export(&rows, &assets)?;
        task.status = TaskStatus::Processed;
        Ok(archive)
    }

    /// Process a Right to be Forgotten task.
    ///
    /// A dry run collects and returns the actions without touching the
    /// store and without writing an audit file.
    pub fn process_removal(
        &self,
        task: &mut Task,
        store: &mut dyn EntityStore,
        dry_run: bool,
    ) -> Result<RemovalOutcome> {
        if task.kind != TaskKind::Removal {
            return Err(AmnesiaError::Validation(
                "Task is not a removal request".to_string(),
            ));
        }

        tracing::info!(
            task = %task.id,
            subject = %task.subject,
            dry_run,
            "Processing removal request"
        );

        let mut visitor = RemovalVisitor::new();
        let mut traverser = Traverser::new(store, self.policies);
        traverser.traverse(&task.subject, &mut visitor)?;
        let actions = visitor.into_actions();

        if dry_run {
            return Ok(RemovalOutcome {
                actions,
                audit: Vec::new(),
                audit_file: None,
            });
        }

        let audit = apply_actions(&actions, store, self.anonymizers)?;
        let audit_file = self.write_audit(task, &audit)?;
        task.status = TaskStatus::Processed;

        Ok(RemovalOutcome {
            actions,
            audit,
            audit_file: Some(audit_file),
        })
    }

    /// Write the erasure audit log as `removal_<task_id>.csv` under the
    /// export directory.
    fn write_audit(&self, task: &Task, audit: &[AuditEntry]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.export_dir).map_err(|e| {
            AmnesiaError::Export(format!(
                "Cannot create export directory {}: {e}",
                self.export_dir.display()
            ))
        })?;

        let path = self.export_dir.join(format!("removal_{}.csv", task.id));
        write_audit_file(&path, audit)?;
        tracing::info!(file = %path.display(), entries = audit.len(), "Audit log written");
        Ok(path)
    }
}

fn write_audit_file(path: &Path, audit: &[AuditEntry]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["entity", "field", "action", "detail"])?;
    for entry in audit {
        writer.write_record([
            entry.entity.as_str(),
            entry.field.as_str(),
            entry.action.as_str(),
            entry.detail.as_str(),
        ])?;
    }
    writer.flush().map_err(AmnesiaError::from)?;
    Ok(())
}

//! CSV emission for subject access exports
//!
//! Rows are grouped by their target filename and written one file per
//! group, columns `row_id, label, value, notes`, no header row. Emission
//! order is the traversal visitation order; nothing is re-sorted, so output
//! is deterministic per run given a deterministic traversal.

use crate::core::traversal::TraversalRow;
use crate::domain::Result;
use std::path::Path;

/// Group rows by target file, preserving first-seen group order.
pub fn group_rows(rows: &[TraversalRow]) -> Vec<(String, Vec<&TraversalRow>)> {
    let mut groups: Vec<(String, Vec<&TraversalRow>)> = Vec::new();
    for row in rows {
        match groups.iter_mut().find(|(name, _)| *name == row.target_file) {
            Some((_, members)) => members.push(row),
            None => groups.push((row.target_file.clone(), vec![row])),
        }
    }
    groups
}

/// Write one group of rows as `<dir>/<group>.csv`.
pub fn write_group(dir: &Path, group: &str, rows: &[&TraversalRow]) -> Result<()> {
    let path = dir.join(format!("{group}.csv"));
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)?;
    for row in rows {
        writer.write_record([
            row.row_id.to_string().as_str(),
            row.label.as_str(),
            row.value.as_str(),
            row.notes.as_str(),
        ])?;
    }
    writer.flush().map_err(crate::domain::AmnesiaError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RtaPolicy;
    use tempfile::tempdir;

    fn row(file: &str, row_id: u64, label: &str, value: &str) -> TraversalRow {
        TraversalRow {
            plugin_name: format!("user|user|{label}"),
            entity_type: "user".to_string(),
            entity_id: "1".to_string(),
            target_file: file.to_string(),
            row_id,
            label: label.to_string(),
            value: value.to_string(),
            notes: String::new(),
            rta: RtaPolicy::Inc,
        }
    }

    #[test]
    fn test_grouping_preserves_first_seen_order() {
        let rows = vec![
            row("main", 1, "Email", "a@b.com"),
            row("orders", 2, "Order", "#1"),
            row("main", 1, "Name", "bob"),
        ];
        let groups = group_rows(&rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "main");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "orders");
    }

    #[test]
    fn test_written_file_has_no_header_and_quotes_commas() {
        let dir = tempdir().unwrap();
        let rows = vec![row("main", 1, "Address", "1 Main St, Springfield")];
        let refs: Vec<&TraversalRow> = rows.iter().collect();
        write_group(dir.path(), "main", &refs).unwrap();

        let contents = std::fs::read_to_string(dir.path().join("main.csv")).unwrap();
        assert_eq!(contents, "1,Address,\"1 Main St, Springfield\",\n");
    }
}

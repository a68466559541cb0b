//! Rotation batches: rows grouped by the Report they came from

use serde::Serialize;

use reefer_types::{CellValue, Table};

use crate::model::{ReportMetadata, ROTATION_COLUMN};

/// Rows of the consolidated table belonging to one vessel rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationBatch {
    pub label: String,
    pub rows: Vec<usize>,
}

impl RotationBatch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Tag every row of a parsed Report with its rotation label
pub fn tag_rotation(table: &mut Table, metadata: &ReportMetadata) {
    let label = metadata.rotation_label();
    table.set_column(ROTATION_COLUMN, vec![CellValue::text(label); table.len()]);
}

/// Batches in first-seen order; untagged rows share the empty label
pub fn group_by_rotation(table: &Table) -> Vec<RotationBatch> {
    let mut batches: Vec<RotationBatch> = Vec::new();
    for row in 0..table.len() {
        let label = table
            .value(row, ROTATION_COLUMN)
            .map(|cell| cell.to_string())
            .unwrap_or_default();
        match batches.iter_mut().find(|b| b.label == label) {
            Some(batch) => batch.rows.push(row),
            None => batches.push(RotationBatch {
                label,
                rows: vec![row],
            }),
        }
    }
    batches
}

/// Rows of one rotation; matching ignores case and surrounding spaces.
///
/// A bare rotation code (`2401-E`) also matches the `vessel / rotation` label.
pub fn filter_rotation(table: &Table, label: &str) -> Table {
    let wanted = label.trim().to_uppercase();
    let mut rows: Vec<usize> = group_by_rotation(table)
        .into_iter()
        .filter(|batch| {
            let have = batch.label.trim().to_uppercase();
            have == wanted
                || have
                    .rsplit_once(" / ")
                    .map(|(_, rotation)| rotation == wanted)
                    .unwrap_or(false)
        })
        .flat_map(|batch| batch.rows)
        .collect();

    rows.sort_unstable();
    table.select_rows(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(vessel: &str, rotation: &str) -> ReportMetadata {
        ReportMetadata {
            vessel: vessel.into(),
            rotation: rotation.into(),
            ..ReportMetadata::default()
        }
    }

    fn consolidated() -> Table {
        let mut a = Table::from_rows(
            vec!["CONTENEDOR".into()],
            vec![vec!["A1".into()], vec!["A2".into()]],
        );
        tag_rotation(&mut a, &meta("MSC ANNA", "2401-E"));
        let mut b = Table::from_rows(vec!["CONTENEDOR".into()], vec![vec!["B1".into()]]);
        tag_rotation(&mut b, &meta("MAERSK ONE", "88W"));

        let mut all = a.clone();
        all.append(&b);
        all.append(&a);
        all
    }

    #[test]
    fn test_tag_rotation() {
        let mut t = Table::from_rows(vec!["CONTENEDOR".into()], vec![vec!["A1".into()]]);
        tag_rotation(&mut t, &meta("MSC ANNA", "2401-E"));
        assert_eq!(
            t.value(0, ROTATION_COLUMN),
            Some(&CellValue::text("MSC ANNA / 2401-E"))
        );
    }

    #[test]
    fn test_group_in_first_seen_order() {
        let batches = group_by_rotation(&consolidated());
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].label, "MSC ANNA / 2401-E");
        assert_eq!(batches[0].rows, vec![0, 1, 3, 4]);
        assert_eq!(batches[1].rows, vec![2]);
    }

    #[test]
    fn test_filter_by_full_label_or_code() {
        let table = consolidated();
        assert_eq!(filter_rotation(&table, "maersk one / 88w").len(), 1);
        assert_eq!(filter_rotation(&table, "2401-E").len(), 4);
        assert!(filter_rotation(&table, "nope").is_empty());
    }
}

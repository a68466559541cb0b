//! Vessel / rotation / date extraction from the Report banner
//!
//! The banner above the Report header is free-form. Extraction is a list of
//! rules tried in order; each rule fills one field and the first rule to
//! produce a value for a field wins. Nothing here fails: fields no rule
//! matched keep their placeholder.

use once_cell::sync::Lazy;
use regex::Regex;

use reefer_types::{CellValue, RawSheet};

use crate::model::ReportMetadata;

/// Rows of the banner considered
pub const DEFAULT_SCAN_ROWS: usize = 20;

static DATE_TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{2}[/-]\d{2}[/-]\d{4}\s+\d{2}:\d{2}").expect("valid date-time pattern")
});

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{2}[/-]\d{2}[/-]\d{4}").expect("valid date pattern"));

/// Field a rule fills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Vessel,
    Rotation,
    ConsultedAt,
}

/// One extraction strategy
#[derive(Debug, Clone)]
pub enum ExtractionRule {
    /// First regex match in the flattened, upper-cased banner text
    Pattern {
        field: MetadataField,
        pattern: &'static Regex,
    },
    /// A cell containing one of the tokens labels the value: text after the
    /// colon in the same cell, else the next cell of the row
    Label {
        field: MetadataField,
        tokens: Vec<&'static str>,
    },
}

impl ExtractionRule {
    pub fn field(&self) -> MetadataField {
        match self {
            ExtractionRule::Pattern { field, .. } | ExtractionRule::Label { field, .. } => *field,
        }
    }

    fn apply(&self, rows: &[Vec<CellValue>], flattened: &str) -> Option<String> {
        match self {
            ExtractionRule::Pattern { pattern, .. } => {
                pattern.find(flattened).map(|m| m.as_str().to_string())
            }
            ExtractionRule::Label { tokens, .. } => find_labelled_value(rows, tokens),
        }
    }
}

/// Ordered rule set applied to the top rows of a Report sheet
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    rules: Vec<ExtractionRule>,
    scan_rows: usize,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_SCAN_ROWS)
    }
}

impl MetadataExtractor {
    /// Standard rules: date with time, date only, vessel label, rotation label
    pub fn new(scan_rows: usize) -> Self {
        Self {
            rules: vec![
                ExtractionRule::Pattern {
                    field: MetadataField::ConsultedAt,
                    pattern: &DATE_TIME_PATTERN,
                },
                ExtractionRule::Pattern {
                    field: MetadataField::ConsultedAt,
                    pattern: &DATE_PATTERN,
                },
                ExtractionRule::Label {
                    field: MetadataField::Vessel,
                    tokens: vec!["NAVE"],
                },
                ExtractionRule::Label {
                    field: MetadataField::Rotation,
                    tokens: vec!["ROTACION", "ROTACIÓN", "VIAJE", "VOY"],
                },
            ],
            scan_rows,
        }
    }

    pub fn with_rule(mut self, rule: ExtractionRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    pub fn extract(&self, sheet: &RawSheet) -> ReportMetadata {
        let rows = &sheet.rows[..sheet.rows.len().min(self.scan_rows)];
        let flattened = flatten(rows);

        let mut metadata = ReportMetadata::default();
        let mut filled: Vec<MetadataField> = Vec::new();

        for rule in &self.rules {
            let field = rule.field();
            if filled.contains(&field) {
                continue;
            }
            if let Some(value) = rule.apply(rows, &flattened) {
                match field {
                    MetadataField::Vessel => metadata.vessel = value,
                    MetadataField::Rotation => metadata.rotation = value,
                    MetadataField::ConsultedAt => metadata.consulted_at = value,
                }
                filled.push(field);
            }
        }

        log::debug!(
            "{}: vessel={} rotation={} date={}",
            sheet.source,
            metadata.vessel,
            metadata.rotation,
            metadata.consulted_at
        );
        metadata
    }
}

/// All banner text on one upper-cased line
fn flatten(rows: &[Vec<CellValue>]) -> String {
    rows.iter()
        .flatten()
        .filter(|cell| !cell.is_blank())
        .map(|cell| cell.to_string())
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

fn find_labelled_value(rows: &[Vec<CellValue>], tokens: &[&str]) -> Option<String> {
    for row in rows {
        for (col, cell) in row.iter().enumerate() {
            if !tokens.iter().any(|t| cell.normalized_text().contains(t)) {
                continue;
            }

            let text = cell.to_string();
            let after_colon = text
                .split_once(':')
                .map(|(_, rest)| rest.trim().to_string())
                .filter(|rest| !rest.is_empty());

            let value = after_colon.or_else(|| {
                row.get(col + 1)
                    .filter(|next| !next.is_blank())
                    .map(|next| next.to_string().trim().to_string())
            });

            if value.is_some() {
                return value;
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::metadata::{DATE_PLACEHOLDER, ROTATION_PLACEHOLDER, VESSEL_PLACEHOLDER};
    use chrono::NaiveDateTime;

    fn sheet(rows: Vec<Vec<&str>>) -> RawSheet {
        RawSheet::new(
            "reporte.xls",
            rows.into_iter()
                .map(|r| r.into_iter().map(CellValue::from).collect())
                .collect(),
        )
    }

    #[test]
    fn test_label_with_colon_and_next_cell() {
        let s = sheet(vec![
            vec!["Reporte de Contenedores"],
            vec!["Nave: MSC ANNA", ""],
            vec!["Rotación", "2401-E"],
            vec!["Fecha consulta 10/01/2024 08:35"],
        ]);
        let meta = MetadataExtractor::default().extract(&s);
        assert_eq!(meta.vessel, "MSC ANNA");
        assert_eq!(meta.rotation, "2401-E");
        assert_eq!(meta.consulted_at, "10/01/2024 08:35");
    }

    #[test]
    fn test_date_only_fallback() {
        let s = sheet(vec![vec!["Consulta", "10-01-2024"], vec!["VOY", "123W"]]);
        let meta = MetadataExtractor::default().extract(&s);
        assert_eq!(meta.consulted_at, "10-01-2024");
        assert_eq!(meta.rotation, "123W");
    }

    #[test]
    fn test_native_date_cell_is_found() {
        let dt = NaiveDateTime::parse_from_str("2024-01-10 08:35", "%Y-%m-%d %H:%M").unwrap();
        let s = RawSheet::new("r.xls", vec![vec![CellValue::text("Fecha"), CellValue::DateTime(dt)]]);
        let meta = MetadataExtractor::default().extract(&s);
        assert_eq!(meta.consulted_at, "10/01/2024 08:35");
    }

    #[test]
    fn test_first_match_wins() {
        let s = sheet(vec![
            vec!["NAVE", "MAERSK ONE"],
            vec!["NAVE", "OTHER"],
            vec!["Viaje: 24A"],
            vec!["Rotacion", "99Z"],
        ]);
        let meta = MetadataExtractor::default().extract(&s);
        assert_eq!(meta.vessel, "MAERSK ONE");
        assert_eq!(meta.rotation, "24A");
    }

    #[test]
    fn test_missing_labels_keep_placeholders() {
        let s = sheet(vec![vec!["CONTENEDOR", "PESO"], vec!["ABCU1234567", "100"]]);
        let meta = MetadataExtractor::default().extract(&s);
        assert_eq!(meta.vessel, VESSEL_PLACEHOLDER);
        assert_eq!(meta.rotation, ROTATION_PLACEHOLDER);
        assert_eq!(meta.consulted_at, DATE_PLACEHOLDER);
        assert!(!meta.has_rotation());
    }

    #[test]
    fn test_empty_label_value_keeps_scanning() {
        let s = sheet(vec![vec!["Nave:", ""], vec!["Nave", "CMA CGM TAGE"]]);
        let meta = MetadataExtractor::default().extract(&s);
        assert_eq!(meta.vessel, "CMA CGM TAGE");
    }

    #[test]
    fn test_rows_beyond_scan_range_ignored() {
        let mut rows = vec![vec![""]; 25];
        rows.push(vec!["Nave", "LATE"]);
        let meta = MetadataExtractor::default().extract(&sheet(rows));
        assert_eq!(meta.vessel, VESSEL_PLACEHOLDER);
    }

    #[test]
    fn test_extra_rule_runs_after_standard_ones() {
        let extractor = MetadataExtractor::default().with_rule(ExtractionRule::Label {
            field: MetadataField::Vessel,
            tokens: vec!["BUQUE"],
        });
        assert_eq!(extractor.rules().len(), 5);

        let s = sheet(vec![vec!["Buque", "HAMBURG SUD"]]);
        assert_eq!(extractor.extract(&s).vessel, "HAMBURG SUD");

        let s = sheet(vec![vec!["Buque", "HAMBURG SUD"], vec!["Nave", "MSC ANNA"]]);
        assert_eq!(extractor.extract(&s).vessel, "MSC ANNA");
    }

    #[test]
    fn test_empty_sheet() {
        let meta = MetadataExtractor::default().extract(&RawSheet::default());
        assert_eq!(meta, ReportMetadata::default());
    }
}

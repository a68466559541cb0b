//! Column name normalization
//!
//! Exports repeat column names (two `SENSOR1_TMP` blocks, several blank
//! headers) and vary in case and padding. Names are upper-cased and trimmed,
//! and later repeats get an occurrence suffix: `A`, `A.1`, `A.2`.

use std::collections::{HashMap, HashSet};

use reefer_types::CellValue;

/// Prefix given to header cells that hold no text
pub const UNNAMED_PREFIX: &str = "UNNAMED";

/// Upper-case and trim a single column name
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Header name for a cell of the chosen header row
pub fn header_name(cell: &CellValue, col: usize) -> String {
    if cell.is_blank() {
        format!("{}: {}", UNNAMED_PREFIX, col)
    } else {
        cell.to_string()
    }
}

/// Normalize every name and suffix duplicates with their occurrence count.
///
/// The first occurrence keeps its name. A suffixed name that would clash with
/// a name already emitted keeps counting up, so the output never repeats.
pub fn normalize_columns<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut result = Vec::with_capacity(names.len());

    for raw in names {
        let base = normalize_name(raw.as_ref());
        let count = occurrences.entry(base.clone()).or_insert(0);

        let mut name = if *count == 0 {
            base.clone()
        } else {
            format!("{}.{}", base, count)
        };
        while taken.contains(&name) {
            *count += 1;
            name = format!("{}.{}", base, count);
        }
        *count += 1;

        taken.insert(name.clone());
        result.push(name);
    }

    result
}

/// Split a possibly suffixed name into its base and occurrence number
pub fn split_suffix(name: &str) -> (&str, Option<usize>) {
    if let Some((base, suffix)) = name.rsplit_once('.') {
        if !base.is_empty() && !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
            return (base, suffix.parse().ok());
        }
    }
    (name, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercase_and_trim() {
        let names = normalize_columns(&[" Contenedor ", "nave", "Peso Bruto"]);
        assert_eq!(names, vec!["CONTENEDOR", "NAVE", "PESO BRUTO"]);
    }

    #[test]
    fn test_duplicates_get_occurrence_suffix() {
        let names = normalize_columns(&["SENSOR1_TMP", "sensor1_tmp", "Unidad", "SENSOR1_TMP "]);
        assert_eq!(names, vec!["SENSOR1_TMP", "SENSOR1_TMP.1", "UNIDAD", "SENSOR1_TMP.2"]);
    }

    #[test]
    fn test_no_two_names_equal() {
        let names = normalize_columns(&["A", "A", "A.1", "A", "b", "B"]);
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
        assert_eq!(names[0], "A");
        assert_eq!(names[4], "B");
    }

    #[test]
    fn test_deterministic() {
        let input = ["x", "X", "y", "x "];
        assert_eq!(normalize_columns(&input), normalize_columns(&input));
    }

    #[test]
    fn test_blank_header_cells_are_unnamed() {
        assert_eq!(header_name(&CellValue::Empty, 3), "UNNAMED: 3");
        assert_eq!(header_name(&CellValue::text("Unidad"), 0), "Unidad");
    }

    #[test]
    fn test_split_suffix() {
        assert_eq!(split_suffix("SENSOR1_TMP.2"), ("SENSOR1_TMP", Some(2)));
        assert_eq!(split_suffix("SENSOR1_TMP"), ("SENSOR1_TMP", None));
        assert_eq!(split_suffix("TEMP. SUMINISTRO"), ("TEMP. SUMINISTRO", None));
    }
}

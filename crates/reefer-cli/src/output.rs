//! Output formatting module

use std::path::Path;

use serde::Serialize;

use reefer_app::app::ConsolidationOutcome;
use reefer_domain::{ConsolidationSummary, ReportMetadata, RotationBatch, TYPE_COLUMN};
use reefer_types::{OutputFormat, Result, Table, Warning};

#[derive(Serialize)]
struct OutcomeJson<'a> {
    vessel: &'a str,
    rotation: &'a str,
    consulted_at: &'a str,
    report_only: bool,
    exported_to: Option<String>,
    rotations: &'a [RotationBatch],
    summary: &'a ConsolidationSummary,
    warnings: &'a [Warning],
    table: &'a Table,
}

pub fn output_outcome(
    output_format: OutputFormat,
    outcome: &ConsolidationOutcome,
    rotations: &[RotationBatch],
    exported_to: Option<&Path>,
) -> Result<()> {
    if output_format == OutputFormat::Json {
        let json = OutcomeJson {
            vessel: &outcome.metadata.vessel,
            rotation: &outcome.metadata.rotation,
            consulted_at: &outcome.metadata.consulted_at,
            report_only: outcome.report_only,
            exported_to: exported_to.map(|p| p.display().to_string()),
            rotations,
            summary: &outcome.summary,
            warnings: &outcome.warnings,
            table: &outcome.table,
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    let summary = &outcome.summary;
    println!("\nConsolidation Result");
    println!("====================");
    print_metadata_lines(&outcome.metadata);
    println!("Containers:      {}", summary.total);
    println!("  CT:            {}", summary.ct);
    println!("  General:       {}", summary.general);
    if outcome.report_only {
        println!("Monitor:         (none, report only)");
    } else {
        println!("Monitor match:   {}", summary.matched);
        println!("Sensor data:     {}", summary.with_sensor_data);
    }
    println!("Columns:         {}", summary.columns);

    if rotations.len() > 1 {
        println!("\n--- Rotations ---");
        for batch in rotations {
            println!("{:<40} {:>6}", truncate(&batch.label, 40), batch.len());
        }
    }

    println!("\n--- Processes ---");
    println!(
        "{:<28} {:>6} {:>6} {:>6} {:>9} {:>5} {:>5} {:>5} {:>8}",
        "Process", "Done", "Pend.", "N/R", "Avg(min)", "G", "Y", "R", "Comply"
    );
    println!("{}", "-".repeat(88));
    for p in &summary.processes {
        println!(
            "{:<28} {:>6} {:>6} {:>6} {:>9} {:>5} {:>5} {:>5} {:>8}",
            truncate(&p.label, 28),
            p.completed,
            p.pending,
            p.not_requested,
            p.average_completed_minutes
                .map(|m| format!("{:.1}", m))
                .unwrap_or_else(|| "-".to_string()),
            p.green,
            p.yellow,
            p.red,
            p.compliance_rate
                .map(|r| format!("{:.0}%", r * 100.0))
                .unwrap_or_else(|| "-".to_string()),
        );
    }

    if !outcome.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &outcome.warnings {
            println!("  - {}", warning);
        }
    }

    if let Some(path) = exported_to {
        println!("\nExported to: {}", path.display());
    }

    Ok(())
}

pub fn output_metadata(output_format: OutputFormat, metadata: &ReportMetadata) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(metadata)?);
    } else {
        println!("\nReport Metadata");
        println!("===============");
        print_metadata_lines(metadata);
    }
    Ok(())
}

pub fn output_history(
    output_format: OutputFormat,
    history: &Table,
    unit_column: &str,
    limit: usize,
) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(history)?);
        return Ok(());
    }

    let ct = history
        .column(TYPE_COLUMN)
        .map(|cells| cells.filter(|c| c.to_string() == "CT").count())
        .unwrap_or(0);

    println!("Monitor History");
    println!("===============");
    println!("Units: {} (CT: {})", history.len(), ct);
    println!();

    if history.is_empty() {
        println!("No units recorded.");
        return Ok(());
    }

    println!("{:<16} {:>8}", truncate(unit_column, 16), "Type");
    println!("{}", "-".repeat(25));
    for row in 0..history.len().min(limit) {
        let unit = history
            .value(row, unit_column)
            .map(|c| c.to_string())
            .unwrap_or_default();
        let ty = history
            .value(row, TYPE_COLUMN)
            .map(|c| c.to_string())
            .unwrap_or_default();
        println!("{:<16} {:>8}", truncate(&unit, 16), ty);
    }

    if history.len() > limit {
        println!();
        println!("... and {} more units", history.len() - limit);
    }
    Ok(())
}

fn print_metadata_lines(metadata: &ReportMetadata) {
    println!("Vessel:          {}", metadata.vessel);
    println!("Rotation:        {}", metadata.rotation);
    println!("Consulted at:    {}", metadata.consulted_at);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Desconexión para Embarque", 12), "Desconexi...");
    }
}

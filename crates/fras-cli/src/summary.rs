//! Stage summary table printed after a run.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use fras_core::{PipelineRun, StageStatus};

pub fn print_summary(run: &PipelineRun) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Output"),
        header_cell("Status"),
        header_cell("Records"),
    ]);
    if let Some(column) = table.column_mut(3) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    let mut executed = 0usize;
    let mut skipped = 0usize;
    for report in &run.reports {
        match report.status {
            StageStatus::Executed => executed += 1,
            StageStatus::Skipped => skipped += 1,
            StageStatus::Pending => {}
        }
        table.add_row(vec![
            Cell::new(&report.name),
            Cell::new(report.output.as_deref().unwrap_or("-")),
            status_cell(report.status),
            match report.records {
                Some(records) => Cell::new(records),
                None => Cell::new("-").fg(Color::DarkGrey),
            },
        ]);
    }
    println!("{table}");
    println!(
        "Final dataset: {} ({executed} stage(s) executed, {skipped} skipped)",
        run.output
    );
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn status_cell(status: StageStatus) -> Cell {
    match status {
        StageStatus::Executed => Cell::new("executed").fg(Color::Green),
        StageStatus::Skipped => Cell::new("skipped").fg(Color::Yellow),
        StageStatus::Pending => Cell::new("pending").fg(Color::DarkGrey),
    }
}

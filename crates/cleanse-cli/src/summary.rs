use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use cleanse_core::PipelineResult;
use cleanse_model::metrics::{ROWS_FINAL, ROWS_INITIAL};

const PHASE_ORDER: [&str; 6] = [
    "extraction",
    "validation",
    "transformation",
    "quality",
    "anomaly_detection",
    "loading",
];

pub fn print_summary(result: &PipelineResult) {
    println!("Pipeline: {}", result.pipeline_id);
    println!("State: {}", result.state);
    if let Some(path) = &result.report_path {
        println!("Report: {}", path.display());
    }

    print_phase_table(result);
    print_cleaning_table(result);
    print_quality_table(result);
    print_anomaly_table(result);
    print_artifacts(result);

    if let Some(error) = &result.error {
        eprintln!(
            "error: [{}/{}] {}: {}",
            error.classification.category.as_str(),
            error.classification.severity.as_str(),
            error.classification.error_type,
            error.classification.message
        );
        eprintln!("action: {}", error.action_taken.as_str());
        if let Some(path) = &error.error_log {
            eprintln!("error log: {}", path.display());
        }
    }
}

fn print_phase_table(result: &PipelineResult) {
    let phases = &result.metrics.execution.phases;
    if phases.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Phase"),
        header_cell("Records"),
        header_cell("Seconds"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for name in PHASE_ORDER {
        let Some(phase) = phases.get(name) else {
            table.add_row(vec![dim_cell(name), dim_cell("-"), dim_cell("-")]);
            continue;
        };
        table.add_row(vec![
            Cell::new(name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(phase.records),
            Cell::new(format!("{:.3}", phase.duration_seconds)),
        ]);
    }
    let execution = &result.metrics.execution;
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{:.0} rows/s", execution.rows_per_second)),
        Cell::new(format!("{:.3}", execution.duration_seconds)).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

fn print_cleaning_table(result: &PipelineResult) {
    let Some(stats) = result.metrics.transformation.as_ref() else {
        return;
    };
    let mut table = Table::new();
    table.set_header(vec![header_cell("Cleaning"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (name, count) in stats.iter() {
        let cell = if name == ROWS_INITIAL || name == ROWS_FINAL {
            Cell::new(count).add_attribute(Attribute::Bold)
        } else {
            count_cell(count, Color::Yellow)
        };
        table.add_row(vec![Cell::new(name), cell]);
    }
    println!();
    println!("{table}");
}

fn print_quality_table(result: &PipelineResult) {
    let Some(quality) = result.metrics.quality.as_ref() else {
        return;
    };
    let mut table = Table::new();
    table.set_header(vec![header_cell("Quality"), header_cell("Score")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (name, dimension) in [
        ("completeness", &quality.completeness),
        ("uniqueness", &quality.uniqueness),
        ("validity", &quality.validity),
    ] {
        table.add_row(vec![Cell::new(name), score_cell(dimension.overall)]);
    }
    // Reported alongside, never part of the overall score.
    for check in quality.consistency.values() {
        table.add_row(vec![
            dim_cell(format!("consistency: {}", check.expression)),
            dim_cell(format!("{:.2} ({} checked)", check.score, check.rows_checked)),
        ]);
    }
    table.add_row(vec![
        Cell::new("overall")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        score_cell(result.quality_score).add_attribute(Attribute::Bold),
    ]);
    println!();
    println!("{table}");
}

fn print_anomaly_table(result: &PipelineResult) {
    let Some(report) = result.metrics.anomalies.as_ref() else {
        return;
    };
    let mut table = Table::new();
    table.set_header(vec![header_cell("Anomaly check"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (name, check) in &report.checks {
        table.add_row(vec![Cell::new(name), count_cell(check.count as u64, Color::Red)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!(
            "{} ({:.2}%)",
            report.summary.total_anomalies_detected, report.summary.anomaly_rate
        ))
        .add_attribute(Attribute::Bold),
    ]);
    println!();
    println!("{table}");
}

fn print_artifacts(result: &PipelineResult) {
    let Some(paths) = result.output_paths.as_ref() else {
        return;
    };
    println!();
    println!("Artifacts:");
    for path in paths.written() {
        println!("- {}", path.display());
    }
}

/// Scores at or above 95 are green, at or above 80 yellow, otherwise red.
fn score_cell(score: f64) -> Cell {
    let color = if score >= 95.0 {
        Color::Green
    } else if score >= 80.0 {
        Color::Yellow
    } else {
        Color::Red
    };
    Cell::new(format!("{score:.2}")).fg(color)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: u64, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

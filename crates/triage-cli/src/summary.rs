use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use triage_core::{CycleValidation, FeatureOutput};
use triage_model::{FileType, RunStatus, Severity, ValidationMessage, ValidationResult};
use triage_validate::{DriftReport, DriftTest};

pub fn print_validation(validation: &CycleValidation) {
    let result = &validation.result;
    print_file_table(result);
    print_message_table(result);
    if let Some(report) = &validation.drift {
        print_drift_table(report);
    }
    println!();
    println!("Status: {}", result.overall_status().label());
    println!(
        "Data mode: {}",
        result.data_mode().map_or("undetermined", |mode| mode.as_str())
    );
    println!(
        "Can proceed: {}",
        if result.can_proceed() { "yes" } else { "no" }
    );
}

pub fn print_output(output: &FeatureOutput) {
    println!(
        "Pipeline: {} (fitted {} on {} applicants, data {})",
        output.pipeline.version,
        output.pipeline.fitted_at.format("%Y-%m-%d %H:%M:%S UTC"),
        output.pipeline.pipeline.training_rows,
        short_signature(&output.pipeline.pipeline.fitted_on_signature)
    );
    println!(
        "Features: {} applicants x {} columns",
        output.table.height(),
        output.table.width()
    );
}

fn print_file_table(result: &ValidationResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Join key"),
        header_cell("Status"),
        header_cell("Errors"),
        header_cell("Warnings"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    align_column(&mut table, 5, CellAlignment::Right);
    align_column(&mut table, 6, CellAlignment::Right);

    let mut total_rows = 0usize;
    for file_type in FileType::ALL {
        let detail = result.file_detail(file_type);
        let errors = count_for(result.errors(), file_type);
        let warnings = count_for(result.warnings(), file_type);
        if detail.is_none() && errors == 0 && warnings == 0 {
            continue;
        }
        let (rows, columns, join_key, status) = match detail {
            Some(detail) => {
                total_rows += detail.row_count;
                (
                    Cell::new(detail.row_count),
                    Cell::new(detail.column_count),
                    detail
                        .join_key
                        .as_deref()
                        .map_or_else(|| dim_cell("-"), Cell::new),
                    status_cell(detail.status()),
                )
            }
            // Required file that was never uploaded.
            None => (
                dim_cell("-"),
                dim_cell("-"),
                dim_cell("-"),
                status_cell(RunStatus::Error),
            ),
        };
        table.add_row(vec![
            Cell::new(file_type.label())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            rows,
            columns,
            join_key,
            status,
            count_cell(errors, Color::Red),
            count_cell(warnings, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        status_cell(result.overall_status()).add_attribute(Attribute::Bold),
        count_cell(result.error_count(), Color::Red).add_attribute(Attribute::Bold),
        count_cell(result.warning_count(), Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

fn print_message_table(result: &ValidationResult) {
    let messages: Vec<&ValidationMessage> = result.messages().collect();
    if messages.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("File"),
        header_cell("Code"),
        header_cell("Message"),
        header_cell("Recommendation"),
    ]);
    apply_message_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for message in messages {
        table.add_row(vec![
            severity_cell(message.severity),
            message
                .file_type
                .map_or_else(|| dim_cell("-"), |file_type| Cell::new(file_type.label())),
            Cell::new(&message.code),
            Cell::new(&message.message),
            message
                .recommendation
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
        ]);
    }
    println!();
    println!("Messages:");
    println!("{table}");
}

fn print_drift_table(report: &DriftReport) {
    if report.features.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Feature"),
        header_cell("Test"),
        header_cell("p-value"),
        header_cell("Effect"),
        header_cell("Drifted"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    for feature in &report.features {
        let drifted = if feature.high_risk {
            Cell::new("HIGH RISK")
                .fg(Color::Red)
                .add_attribute(Attribute::Bold)
        } else if feature.drifted {
            Cell::new("yes").fg(Color::Yellow)
        } else {
            dim_cell("no")
        };
        table.add_row(vec![
            Cell::new(&feature.feature),
            Cell::new(test_label(feature.test_used)),
            Cell::new(format!("{:.2e}", feature.p_value)),
            Cell::new(format!("{:.3}", feature.effect_size)),
            drifted,
        ]);
    }
    println!();
    println!(
        "Drift: {} of {} features ({:.1}%)",
        report.drifted().count(),
        report.features.len(),
        report.drifted_fraction * 100.0
    );
    println!("{table}");
}

fn count_for(messages: &[ValidationMessage], file_type: FileType) -> usize {
    messages
        .iter()
        .filter(|message| message.file_type == Some(file_type))
        .count()
}

fn test_label(test: DriftTest) -> &'static str {
    match test {
        DriftTest::KolmogorovSmirnov => "KS",
        DriftTest::ChiSquare => "chi-square",
    }
}

fn short_signature(signature: &str) -> &str {
    signature.get(..12).unwrap_or(signature)
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn apply_message_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(180);
    if table.column_count() >= 5 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(9)),
            ColumnConstraint::UpperBoundary(Width::Fixed(24)),
            ColumnConstraint::UpperBoundary(Width::Fixed(28)),
            ColumnConstraint::UpperBoundary(Width::Percentage(45)),
            ColumnConstraint::UpperBoundary(Width::Percentage(30)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
        Severity::Info => dim_cell("INFO"),
    }
}

fn status_cell(status: RunStatus) -> Cell {
    let cell = Cell::new(status.label());
    match status {
        RunStatus::Success => cell.fg(Color::Green),
        RunStatus::Warning => cell.fg(Color::Yellow),
        RunStatus::Error => cell.fg(Color::Red),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
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

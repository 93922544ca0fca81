use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use hapi_config::PipelineConfig;
use hapi_core::{RunSummary, ThemeStatus};

use crate::commands::RunResult;

pub fn print_summary(result: &RunResult) {
    println!("Warehouse: {}", result.database.display());
    if let Some(path) = &result.alias_report {
        println!("Alias report: {}", path.display());
    }
    println!("{}", table_counts(&result.summary));
    if !result.summary.themes.is_empty() {
        println!();
        println!("Themes:");
        println!("{}", theme_outcomes(&result.summary));
    }
    print_messages(&result.summary);
}

fn table_counts(summary: &RunSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Table"), header_cell("Rows")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let mut total = 0usize;
    for (name, rows) in &summary.tables {
        total += rows;
        table.add_row(vec![Cell::new(name), count_cell(*rows, Color::Reset)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total).add_attribute(Attribute::Bold),
    ]);
    table
}

fn theme_outcomes(summary: &RunSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Theme"),
        header_cell("Status"),
        header_cell("Rows"),
        header_cell("Duplicates"),
        header_cell("Skipped"),
    ]);
    apply_summary_table_style(&mut table);
    for column in 2..5 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for outcome in &summary.themes {
        let theme = Cell::new(outcome.theme).add_attribute(Attribute::Bold);
        let row = match &outcome.status {
            ThemeStatus::Completed(report) => vec![
                theme,
                Cell::new("✓ completed").fg(Color::Green),
                Cell::new(report.rows),
                count_cell(report.duplicates, Color::Yellow),
                count_cell(report.skipped, Color::Yellow),
            ],
            ThemeStatus::Failed { error } => vec![
                theme,
                Cell::new(format!("✗ {error}")).fg(Color::Red),
                dim_cell("-"),
                dim_cell("-"),
                dim_cell("-"),
            ],
        };
        table.add_row(row);
    }
    table
}

fn print_messages(summary: &RunSummary) {
    let messages = &summary.messages;
    if !messages.warnings.is_empty() {
        println!();
        println!("Warnings ({}):", messages.warnings.len());
        for message in messages.warnings.iter() {
            println!("- {message}");
        }
    }
    if !messages.errors.is_empty() {
        eprintln!();
        eprintln!("Errors ({}):", messages.errors.len());
        for message in messages.errors.iter() {
            eprintln!("- {message}");
        }
    }
}

pub fn print_config(config: &PipelineConfig) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Setting"), header_cell("Value")]);
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec![
        Cell::new("database"),
        Cell::new(config.database.display()),
    ]);
    table.add_row(vec![
        Cell::new("commit_limit"),
        Cell::new(config.commit_limit),
    ]);
    table.add_row(vec![
        Cell::new("tracked_countries"),
        Cell::new(config.tracked_countries.join(", ")),
    ]);
    table.add_row(vec![
        Cell::new("orphan_admin2s"),
        Cell::new(config.orphan_admin2s.len()),
    ]);
    for (theme, path) in config.themes.configured() {
        table.add_row(vec![
            Cell::new(format!("theme {theme}")),
            Cell::new(path.display()),
        ]);
    }
    println!("{table}");
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

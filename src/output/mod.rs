//
//  circleci-cli
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Module
//!
//! Renders command results either as human-readable tables or as JSON:
//!
//! - **Table format**: `comfy_table` tables and `key: value` detail views
//! - **JSON format**: pretty-printed `serde_json` output for scripting
//!
//! ## Core Components
//!
//! - [`OutputFormat`]: the selected format
//! - [`OutputWriter`]: main entry point for writing formatted output
//! - [`TableOutput`]: types that render as a detail view
//! - [`TableRow`]: types that render as one row of a list table
//!
//! ## Example
//!
//! ```rust,ignore
//! use circleci_cli::output::{OutputFormat, OutputWriter};
//!
//! let writer = OutputWriter::new(OutputFormat::Json);
//! writer.write_list(&pipelines)?;
//! writer.write_success("Pipeline triggered");
//! ```

mod table;

pub use table::*;

use console::style;
use serde::Serialize;

/// The available output formats.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OutputFormat {
    /// Human-readable tables, colored when the terminal supports it.
    #[default]
    Table,
    /// Pretty-printed JSON for scripting and automation.
    Json,
}

/// A unified output writer that handles both output formats.
///
/// Data goes to stdout; warnings and errors go to stderr so they never mix
/// with JSON output.
///
/// # Notes
///
/// Color output is automatically detected based on terminal capabilities.
/// Colors are disabled when output is piped or redirected.
pub struct OutputWriter {
    format: OutputFormat,
    color: bool,
}

impl OutputWriter {
    /// Creates a new output writer with the specified format.
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: console::colors_enabled(),
        }
    }

    /// Creates a new output writer configured for table output.
    pub fn table() -> Self {
        Self::new(OutputFormat::Table)
    }

    /// Returns the output format configured for this writer.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Writes a single value to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn write<T: Serialize + TableOutput>(&self, value: &T) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(value)?);
            }
            OutputFormat::Table => value.print_table(self.color),
        }
        Ok(())
    }

    /// Writes a list of values to stdout.
    ///
    /// JSON output is a single array (`[]` when empty). Table output is one
    /// table with a row per value; an empty list prints `empty_message`
    /// instead.
    pub fn write_list<T: Serialize + TableRow>(
        &self,
        values: &[T],
        empty_message: &str,
    ) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(values)?);
            }
            OutputFormat::Table if values.is_empty() => self.write_info(empty_message),
            OutputFormat::Table => {
                println!("{}", render_rows(values, self.color));
            }
        }
        Ok(())
    }

    /// Writes a single value as a one-row table, or as a JSON object.
    pub fn write_row<T: Serialize + TableRow>(&self, value: &T) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(value)?);
            }
            OutputFormat::Table => {
                println!("{}", render_rows(std::slice::from_ref(value), self.color));
            }
        }
        Ok(())
    }

    /// Writes a warning message to stderr.
    pub fn write_warning(&self, msg: &str) {
        if self.color {
            eprintln!("{} {}", style("warning:").yellow().bold(), msg);
        } else {
            eprintln!("warning: {}", msg);
        }
    }

    /// Writes an informational message to stdout.
    pub fn write_info(&self, msg: &str) {
        println!("{}", msg);
    }

    /// Writes a success message to stdout, prefixed with a check mark.
    pub fn write_success(&self, msg: &str) {
        if self.color {
            println!("{} {}", style("✓").green().bold(), msg);
        } else {
            println!("✓ {}", msg);
        }
    }
}

/// A type that renders as a `key: value` detail view.
pub trait TableOutput {
    /// Prints the value to stdout.
    ///
    /// Implementations should use `color` to conditionally apply styling.
    fn print_table(&self, color: bool);
}

/// A type that renders as one row of a list table.
pub trait TableRow {
    /// Column headers, in display order.
    const HEADERS: &'static [&'static str];

    /// The cells of this row, one per header.
    fn cells(&self, color: bool) -> Vec<String>;
}

/// Renders `values` as a table with one row per value.
pub fn render_rows<T: TableRow>(values: &[T], color: bool) -> String {
    TableBuilder::new()
        .color(color)
        .headers(T::HEADERS.iter().copied())
        .rows(values.iter().map(|value| value.cells(color)))
        .build()
        .to_string()
}

/// Prints a styled header with an underline.
pub fn print_header(text: &str) {
    println!("{}", style(text).bold());
    println!("{}", "-".repeat(text.chars().count()));
}

/// Prints a key-value pair, dimming the key when color is enabled.
pub fn print_field(key: &str, value: &str, color: bool) {
    if color {
        println!("{}: {}", style(key).dim(), value);
    } else {
        println!("{}: {}", key, value);
    }
}

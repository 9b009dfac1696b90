//! Output formatting utilities

use anyhow::Result;
use catch_lib::session::SessionSummary;
use clap::ValueEnum;
use colored::Colorize;
use std::panic::{self, AssertUnwindSafe};
use tabled::{settings::Style, Table, Tabled};
use tracing::error;

/// Shown in place of the form when rendering fails
pub const RENDER_FAILURE_MESSAGE: &str =
    "Sorry, something went wrong while displaying the form. Please restart heavy-slam.";

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Parse a format name from the config file
    pub fn from_config(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

/// Run a rendering closure, replacing its output with a static apology
/// if it errors or panics
///
/// Returns whether rendering succeeded.
pub fn render_boundary<F>(render: F) -> bool
where
    F: FnOnce() -> Result<()>,
{
    // The default hook would print the panic before the apology
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let outcome = panic::catch_unwind(AssertUnwindSafe(render));
    panic::set_hook(previous);

    let failure = match outcome {
        Ok(Ok(())) => return true,
        Ok(Err(err)) => err.to_string(),
        Err(payload) => panic_message(payload.as_ref()),
    };

    error!(error = %failure, "Rendering failed");
    eprintln!("{}", RENDER_FAILURE_MESSAGE.red());
    false
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic while rendering".to_string()
    }
}

/// Row for the form table
#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Render the form as a table
pub fn summary_table(summary: &SessionSummary) -> String {
    let mut rows = vec![
        FieldRow {
            field: "Pokemon",
            value: summary.subject.clone(),
        },
        FieldRow {
            field: "Image",
            value: summary.image.clone().unwrap_or_else(|| "-".to_string()),
        },
        FieldRow {
            field: "Weight",
            value: summary
                .weight
                .map(|w| w.to_string())
                .unwrap_or_else(|| "-".to_string()),
        },
        FieldRow {
            field: "Level",
            value: summary.level.to_string(),
        },
        FieldRow {
            field: "Health %",
            value: summary.health_percent.to_string(),
        },
        FieldRow {
            field: "Ball",
            value: summary.ball.clone(),
        },
        FieldRow {
            field: "Status",
            value: summary.status.clone(),
        },
    ];

    if let (Some(ball_rate), Some(status_rate)) = (&summary.ball_rate, &summary.status_rate) {
        rows.push(FieldRow {
            field: "Ball rate",
            value: ball_rate.clone(),
        });
        rows.push(FieldRow {
            field: "Status rate",
            value: status_rate.clone(),
        });
    }

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Print the form in the requested format
pub fn print_summary(summary: &SessionSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", summary_table(summary));
            println!("{} {}", "Catch rate:".bold(), color_catch_rate(&summary.catch_rate));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
    }
    Ok(())
}

/// Print a success message (stderr, like every status line)
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message (stderr, so JSON output stays parseable)
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// Color the catch rate line
pub fn color_catch_rate(catch_rate: &str) -> String {
    match catch_rate.parse::<f64>() {
        Ok(rate) if rate >= 1.0 => catch_rate.green().bold().to_string(),
        Ok(_) => catch_rate.yellow().to_string(),
        Err(_) => catch_rate.dimmed().to_string(),
    }
}

//! Rate table command

use anyhow::Result;
use catch_lib::rates::{ContainerType, StatusCondition};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::output::OutputFormat;

#[derive(Tabled, Serialize)]
struct RateRow {
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Rate")]
    rate: f64,
}

#[derive(Serialize)]
struct RateTables {
    balls: Vec<RateRow>,
    statuses: Vec<RateRow>,
}

fn rate_tables() -> RateTables {
    RateTables {
        balls: ContainerType::ALL
            .iter()
            .map(|ball| RateRow {
                name: ball.label(),
                rate: ball.multiplier(),
            })
            .collect(),
        statuses: StatusCondition::ALL
            .iter()
            .map(|status| RateRow {
                name: status.label(),
                rate: status.multiplier(),
            })
            .collect(),
    }
}

/// Print the ball and status rate tables
pub fn show_rates(format: OutputFormat) -> Result<()> {
    let tables = rate_tables();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&tables)?);
        }
        OutputFormat::Table => {
            println!("{}", "Ball rates".bold());
            println!("{}", Table::new(&tables.balls).with(Style::rounded()).to_string());
            println!();
            println!("{}", "Status rates".bold());
            println!("{}", Table::new(&tables.statuses).with(Style::rounded()).to_string());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_tables_cover_every_variant() {
        let tables = rate_tables();
        assert_eq!(tables.balls.len(), 3);
        assert_eq!(tables.statuses.len(), 6);
        assert_eq!(tables.balls[2].name, "Ultra Ball");
        assert_eq!(tables.balls[2].rate, 2.25);
        assert_eq!(tables.statuses[5].name, "Sleep");
        assert_eq!(tables.statuses[5].rate, 2.0);
    }
}

//! Subject lookup command

use anyhow::Result;
use catch_lib::lookup::{resolve_subject, LookupError, SubjectSource};
use catch_lib::models::RelayPayload;
use colored::Colorize;

use crate::output::{print_error, print_warning, OutputFormat};

/// Look a subject up through the relay and print what came back
pub async fn lookup_subject<S>(source: &S, name: &str, format: OutputFormat) -> Result<()>
where
    S: SubjectSource + ?Sized,
{
    match resolve_subject(source, name).await {
        Ok(Some(profile)) => {
            match format {
                OutputFormat::Json => {
                    let payload = RelayPayload::from(profile);
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
                OutputFormat::Table => {
                    println!("{}", profile.display_name.bold());
                    println!("{}", "=".repeat(50));
                    println!("Weight:                 {}", profile.mass_units);
                    println!("Image:                  {}", profile.sprite_ref.cyan());
                }
            }
            Ok(())
        }
        Ok(None) => {
            print_warning("No Pokemon name given; nothing to look up");
            Ok(())
        }
        Err(LookupError::NotFound) => {
            print_warning(&format!("{} was not found", name.trim()));
            Ok(())
        }
        Err(err) => {
            print_error(&err.to_string());
            Err(err.into())
        }
    }
}

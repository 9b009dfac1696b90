//! Interactive form session
//!
//! Reads one field edit per line. A `pokemon <name>` line commits the
//! name field and starts a lookup in the background; edits keep being
//! accepted while it runs, and only the newest lookup may update the
//! form.

use anyhow::Result;
use catch_lib::{
    estimator::EstimatorError,
    lookup::{LookupError, SubjectSource},
    models::SubjectProfile,
    session::{FormSession, LookupTicket},
};
use colored::Colorize;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use crate::output::{
    print_error, print_info, print_success, print_summary, render_boundary, OutputFormat,
};

const HELP: &str = "\
Commands:
  pokemon <name>     look up a Pokemon (no name clears it)
  level <1-100>      set the level
  health <1-100>     set health % (number field)
  slider <1-100>     set health % (slider)
  ball <name>        Poke Ball, Great Ball or Ultra Ball
  status <name>      None, Burn, Freeze, Paralysis, Poison or Sleep
  calc [on|off]      show or hide the ball/status rates
  show               print the form
  help               print this help
  quit               leave";

/// One line of operator input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    Pokemon(String),
    Level(i64),
    Health(i64),
    Slider(i64),
    Ball(String),
    Status(String),
    /// `None` toggles
    Calculations(Option<bool>),
    Show,
    Help,
    Quit,
}

impl FormCommand {
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "pokemon" | "p" => FormCommand::Pokemon(rest.to_string()),
            "level" | "l" => FormCommand::Level(parse_number("Level", rest)?),
            "health" | "h" => FormCommand::Health(parse_number("Health %", rest)?),
            "slider" => FormCommand::Slider(parse_number("Health %", rest)?),
            "ball" | "b" => FormCommand::Ball(rest.to_string()),
            "status" | "s" => FormCommand::Status(rest.to_string()),
            "calc" => match rest.to_lowercase().as_str() {
                "" => FormCommand::Calculations(None),
                "on" => FormCommand::Calculations(Some(true)),
                "off" => FormCommand::Calculations(Some(false)),
                other => return Err(format!("calc expects on or off, got \"{}\"", other)),
            },
            "show" => FormCommand::Show,
            "help" | "?" => FormCommand::Help,
            "quit" | "exit" | "q" => FormCommand::Quit,
            other => return Err(format!("Unknown command \"{}\" (try help)", other)),
        };

        Ok(Some(command))
    }
}

fn parse_number(field: &str, raw: &str) -> Result<i64, String> {
    raw.parse()
        .map_err(|_| format!("{} must be a whole number in the range 1-100", field))
}

/// What the loop should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Lookup(LookupTicket),
    Redraw,
    Help,
    Quit,
}

/// Apply a command to the session
pub fn apply(session: &mut FormSession, command: FormCommand) -> Result<Effect, EstimatorError> {
    let effect = match command {
        FormCommand::Pokemon(name) => match session.begin_lookup(&name) {
            Some(ticket) => Effect::Lookup(ticket),
            None => Effect::Redraw,
        },
        FormCommand::Level(level) => {
            session.set_level(level)?;
            Effect::Redraw
        }
        FormCommand::Health(health) => {
            session.set_health_from_number(health)?;
            Effect::Redraw
        }
        FormCommand::Slider(health) => {
            session.set_health_from_slider(health)?;
            Effect::Redraw
        }
        FormCommand::Ball(label) => {
            session.select_container(&label)?;
            Effect::Redraw
        }
        FormCommand::Status(label) => {
            session.select_status(&label)?;
            Effect::Redraw
        }
        FormCommand::Calculations(Some(show)) => {
            session.set_show_calculations(show);
            Effect::Redraw
        }
        FormCommand::Calculations(None) => {
            session.toggle_calculations();
            Effect::Redraw
        }
        FormCommand::Show => Effect::Redraw,
        FormCommand::Help => Effect::Help,
        FormCommand::Quit => Effect::Quit,
    };

    Ok(effect)
}

type Settlement = (LookupTicket, Result<SubjectProfile, LookupError>);

fn redraw(session: &FormSession, format: OutputFormat) -> Result<()> {
    let summary = session.summary();
    if render_boundary(|| print_summary(&summary, format)) {
        Ok(())
    } else {
        anyhow::bail!("the form could not be displayed; restart to continue")
    }
}

/// Run the form until `quit`, or until end of input once the newest
/// lookup has settled
pub async fn run(source: Arc<dyn SubjectSource>, format: OutputFormat) -> Result<()> {
    let mut session = FormSession::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<Settlement>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    eprintln!("{}", "Heavy Slam!".bold());
    print_info("Type help for commands");
    redraw(&session, format)?;

    while input_open || session.subject().is_pending() {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    input_open = false;
                    continue;
                };

                let command = match FormCommand::parse(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(message) => {
                        print_error(&message);
                        continue;
                    }
                };

                match apply(&mut session, command) {
                    Ok(Effect::Lookup(ticket)) => {
                        print_info(&format!("Looking up {}...", ticket.query()));
                        let source = Arc::clone(&source);
                        let tx = tx.clone();
                        tokio::spawn(async move {
                            let outcome = source.fetch(ticket.query()).await;
                            let _ = tx.send((ticket, outcome));
                        });
                    }
                    Ok(Effect::Redraw) => redraw(&session, format)?,
                    Ok(Effect::Help) => println!("{}", HELP),
                    Ok(Effect::Quit) => break,
                    Err(err) => print_error(&err.to_string()),
                }
            }
            Some((ticket, outcome)) = rx.recv() => {
                let found = outcome.is_ok();
                if session.settle(&ticket, outcome) {
                    if found {
                        print_success(&format!("Found {}", ticket.query()));
                    }
                    redraw(&session, format)?;
                } else {
                    debug!(query = %ticket.query(), "Ignored superseded lookup");
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use catch_lib::session::SubjectState;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            FormCommand::parse("pokemon Pikachu").unwrap(),
            Some(FormCommand::Pokemon("Pikachu".to_string()))
        );
        assert_eq!(
            FormCommand::parse("pokemon").unwrap(),
            Some(FormCommand::Pokemon(String::new()))
        );
        assert_eq!(
            FormCommand::parse("  ball   Great Ball ").unwrap(),
            Some(FormCommand::Ball("Great Ball".to_string()))
        );
        assert_eq!(FormCommand::parse("health -3").unwrap(), Some(FormCommand::Health(-3)));
        assert_eq!(
            FormCommand::parse("calc").unwrap(),
            Some(FormCommand::Calculations(None))
        );
        assert_eq!(
            FormCommand::parse("CALC on").unwrap(),
            Some(FormCommand::Calculations(Some(true)))
        );
        assert_eq!(FormCommand::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(FormCommand::parse("level ten").is_err());
        assert!(FormCommand::parse("calc maybe").is_err());
        assert!(FormCommand::parse("throw").is_err());
    }

    #[test]
    fn test_apply_lookup_and_clear() {
        let mut session = FormSession::new();

        let effect = apply(&mut session, FormCommand::Pokemon("Eevee".to_string())).unwrap();
        assert!(matches!(effect, Effect::Lookup(ref t) if t.query() == "eevee"));
        assert!(session.subject().is_pending());

        let effect = apply(&mut session, FormCommand::Pokemon(String::new())).unwrap();
        assert_eq!(effect, Effect::Redraw);
        assert_eq!(session.subject(), &SubjectState::Absent);
    }

    #[test]
    fn test_apply_rejection_keeps_value() {
        let mut session = FormSession::new();
        apply(&mut session, FormCommand::Slider(40)).unwrap();

        let err = apply(&mut session, FormCommand::Health(101)).unwrap_err();
        assert_eq!(err.to_string(), "Health % must be in the range 1-100");
        assert_eq!(session.inputs().health_percent(), 40);
    }

    #[test]
    fn test_apply_toggle_calculations() {
        let mut session = FormSession::new();
        apply(&mut session, FormCommand::Calculations(None)).unwrap();
        assert!(session.show_calculations());
        apply(&mut session, FormCommand::Calculations(Some(false))).unwrap();
        assert!(!session.show_calculations());
    }
}

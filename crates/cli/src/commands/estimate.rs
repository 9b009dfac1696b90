//! One-shot estimate command

use anyhow::Result;
use catch_lib::{
    estimator::EstimatorError,
    lookup::{LookupError, SubjectSource},
    session::FormSession,
};
use clap::Args;

use crate::output::{print_error, print_summary, print_warning, render_boundary, OutputFormat};

/// Form fields for a single estimate
#[derive(Debug, Clone, Default, Args)]
pub struct EstimateArgs {
    /// Pokemon name to look up through the relay
    #[arg(long, short)]
    pub pokemon: Option<String>,

    /// Level (1-100)
    #[arg(long, allow_negative_numbers = true)]
    pub level: Option<i64>,

    /// Remaining health percentage (1-100)
    #[arg(long, allow_negative_numbers = true)]
    pub health: Option<i64>,

    /// Ball: Poke Ball, Great Ball or Ultra Ball
    #[arg(long)]
    pub ball: Option<String>,

    /// Status: None, Burn, Freeze, Paralysis, Poison or Sleep
    #[arg(long)]
    pub status: Option<String>,

    /// Also show the ball and status rates
    #[arg(long)]
    pub show_calculations: bool,
}

/// Apply every given field to the session
///
/// Rejected fields keep their previous value; the rejections are returned
/// so the caller can report them.
pub fn apply_fields(session: &mut FormSession, args: &EstimateArgs) -> Vec<EstimatorError> {
    let mut rejected = Vec::new();

    if let Some(level) = args.level {
        if let Err(err) = session.set_level(level) {
            rejected.push(err);
        }
    }
    if let Some(health) = args.health {
        if let Err(err) = session.set_health_from_number(health) {
            rejected.push(err);
        }
    }
    if let Some(ball) = &args.ball {
        if let Err(err) = session.select_container(ball) {
            rejected.push(err);
        }
    }
    if let Some(status) = &args.status {
        if let Err(err) = session.select_status(status) {
            rejected.push(err);
        }
    }
    session.set_show_calculations(args.show_calculations);

    rejected
}

/// Fill in the form, look the subject up and print the estimate
pub async fn run_estimate<S>(source: &S, args: &EstimateArgs, format: OutputFormat) -> Result<()>
where
    S: SubjectSource + ?Sized,
{
    let mut session = FormSession::new();

    for err in apply_fields(&mut session, args) {
        print_error(&err.to_string());
    }

    if let Some(name) = &args.pokemon {
        if let Some(ticket) = session.begin_lookup(name) {
            let outcome = source.fetch(ticket.query()).await;
            match &outcome {
                Err(LookupError::NotFound) => {
                    print_warning(&format!("{} was not found", ticket.query()))
                }
                Err(err @ LookupError::Upstream(_)) => print_warning(&err.to_string()),
                Ok(_) => {}
            }
            session.settle(&ticket, outcome);
        }
    }

    let summary = session.summary();
    if !render_boundary(|| print_summary(&summary, format)) {
        anyhow::bail!("failed to display the estimate");
    }

    Ok(())
}

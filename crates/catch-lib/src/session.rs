//! Form session state
//!
//! One `FormSession` per open form. It owns the estimator inputs, the
//! subject lookup state and the display toggle. Lookups are sequenced:
//! every committed name edit issues a ticket, and only the newest
//! ticket may settle the subject state.

use crate::estimator::{compute_score, Estimate, EstimatorError, EstimatorInputs, Multipliers};
use crate::lookup::{normalize_name, LookupError};
use crate::models::SubjectProfile;
use crate::rates::{ContainerType, StatusCondition};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lifecycle of the looked-up subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectState {
    /// No name entered, or the name was cleared
    Absent,
    /// A lookup for `query` is outstanding
    Pending { query: String },
    Resolved(SubjectProfile),
    NotFound { query: String },
    Failed { query: String, reason: String },
}

impl SubjectState {
    /// The profile, only when fully resolved
    pub fn profile(&self) -> Option<&SubjectProfile> {
        match self {
            SubjectState::Resolved(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SubjectState::Pending { .. })
    }
}

/// Handle for one issued lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    seq: u64,
    query: String,
}

impl LookupTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Normalized name to send to the source
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// State of one open form
#[derive(Debug, Clone)]
pub struct FormSession {
    inputs: EstimatorInputs,
    subject: SubjectState,
    latest_seq: u64,
    show_calculations: bool,
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FormSession {
    pub fn new() -> Self {
        Self {
            inputs: EstimatorInputs::default(),
            subject: SubjectState::Absent,
            latest_seq: 0,
            show_calculations: false,
        }
    }

    pub fn inputs(&self) -> &EstimatorInputs {
        &self.inputs
    }

    pub fn subject(&self) -> &SubjectState {
        &self.subject
    }

    pub fn show_calculations(&self) -> bool {
        self.show_calculations
    }

    pub fn set_show_calculations(&mut self, show: bool) {
        self.show_calculations = show;
    }

    pub fn toggle_calculations(&mut self) -> bool {
        self.show_calculations = !self.show_calculations;
        self.show_calculations
    }

    /// Health typed into the number field
    pub fn set_health_from_number(&mut self, value: i64) -> Result<(), EstimatorError> {
        self.inputs.set_health_percent(value)
    }

    /// Health dragged on the slider; same value as the number field
    pub fn set_health_from_slider(&mut self, value: i64) -> Result<(), EstimatorError> {
        self.inputs.set_health_percent(value)
    }

    pub fn set_level(&mut self, value: i64) -> Result<(), EstimatorError> {
        self.inputs.set_level(value)
    }

    pub fn set_container(&mut self, container: ContainerType) {
        self.inputs.set_container(container);
    }

    pub fn set_status(&mut self, status: StatusCondition) {
        self.inputs.set_status(status);
    }

    pub fn select_container(&mut self, label: &str) -> Result<(), EstimatorError> {
        self.inputs.select_container(label)
    }

    pub fn select_status(&mut self, label: &str) -> Result<(), EstimatorError> {
        self.inputs.select_status(label)
    }

    /// Commit an edit of the subject name field
    ///
    /// A blank name clears the subject and cancels whatever is in flight.
    /// Otherwise the subject becomes pending and a ticket is returned for
    /// the caller to run the lookup with.
    pub fn begin_lookup(&mut self, name: &str) -> Option<LookupTicket> {
        self.latest_seq += 1;

        let Some(query) = normalize_name(name) else {
            debug!(seq = self.latest_seq, "Subject name cleared");
            self.subject = SubjectState::Absent;
            return None;
        };

        debug!(seq = self.latest_seq, query = %query, "Subject lookup issued");
        self.subject = SubjectState::Pending {
            query: query.clone(),
        };

        Some(LookupTicket {
            seq: self.latest_seq,
            query,
        })
    }

    /// Apply the outcome of a lookup
    ///
    /// Returns false (and changes nothing) when a newer lookup was issued
    /// or the name was cleared after this ticket.
    pub fn settle(
        &mut self,
        ticket: &LookupTicket,
        outcome: Result<SubjectProfile, LookupError>,
    ) -> bool {
        if ticket.seq != self.latest_seq {
            debug!(
                seq = ticket.seq,
                latest = self.latest_seq,
                "Dropping superseded lookup result"
            );
            return false;
        }

        let query = ticket.query.clone();
        self.subject = match outcome {
            Ok(profile) => SubjectState::Resolved(profile),
            Err(LookupError::NotFound) => SubjectState::NotFound { query },
            Err(LookupError::Upstream(reason)) => SubjectState::Failed { query, reason },
        };
        true
    }

    pub fn estimate(&self) -> Estimate {
        compute_score(&self.inputs, self.subject.profile())
    }

    pub fn multipliers(&self) -> Multipliers {
        self.inputs.multipliers()
    }

    /// Read-only view of everything the form displays
    pub fn summary(&self) -> SessionSummary {
        let profile = self.subject.profile();
        let multipliers = self.multipliers();

        SessionSummary {
            subject: subject_line(&self.subject),
            image: profile.map(|p| p.sprite_ref.clone()),
            weight: profile.map(|p| p.mass_units),
            level: self.inputs.level(),
            health_percent: self.inputs.health_percent(),
            ball: self.inputs.container().label().to_string(),
            status: self.inputs.status().label().to_string(),
            catch_rate: self.estimate().display(),
            ball_rate: self
                .show_calculations
                .then(|| multipliers.container_display()),
            status_rate: self.show_calculations.then(|| multipliers.status_display()),
        }
    }
}

fn subject_line(subject: &SubjectState) -> String {
    match subject {
        SubjectState::Absent => "No subject".to_string(),
        SubjectState::Pending { query } => format!("Looking up {}...", query),
        SubjectState::Resolved(profile) => profile.display_name.clone(),
        SubjectState::NotFound { query } => format!("{}: no data (not found)", query),
        SubjectState::Failed { query, .. } => format!("{}: no data (lookup failed)", query),
    }
}

/// Display model of a form session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    pub level: u8,
    pub health_percent: u8,
    pub ball: String,
    pub status: String,
    pub catch_rate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ball_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_rate: Option<String>,
}

//! Session state machine: draft input, validation, the single-in-flight gate,
//! the append-only result log, and the error banner lifecycle.
//!
//! Owned by the UI thread only; no cross-thread mutation. The two mutation
//! points are `submit` (validation) and `resolve` (outcome fold), which keeps
//! the log and banner single-writer without any locking.

use crate::model::{CheckRequest, Outcome, ResultRecord, SubmitError};

/// The currently edited, not-yet-submitted prompt/brand pair. Kept separate
/// from the result log on purpose: transient editable state on one side, an
/// immutable append log on the other.
#[derive(Debug, Default, Clone)]
pub struct DraftInput {
    pub prompt: String,
    pub brand: String,
}

impl DraftInput {
    fn clear(&mut self) {
        self.prompt.clear();
        self.brand.clear();
    }
}

pub struct Session {
    pub draft: DraftInput,
    in_flight: bool,
    banner: Option<String>,
    results: Vec<ResultRecord>,
}

impl Session {
    pub fn new(initial_brand: Option<String>) -> Self {
        Self {
            draft: DraftInput {
                prompt: String::new(),
                brand: initial_brand.unwrap_or_default(),
            },
            in_flight: false,
            banner: None,
            results: Vec::new(),
        }
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// The append-only log, in submission completion order.
    pub fn results(&self) -> &[ResultRecord] {
        &self.results
    }

    /// Validate the draft and hand back the request payload to send.
    ///
    /// A submit while one is unresolved is dropped (not queued, not an error
    /// banner). Validation failure sets the banner and keeps the draft so the
    /// user can fix it in place. On success the banner is cleared, the gate
    /// closes, and the payload carries the draft text verbatim.
    pub fn submit(&mut self) -> Result<CheckRequest, SubmitError> {
        if self.in_flight {
            return Err(SubmitError::InFlight);
        }
        if self.draft.prompt.trim().is_empty() || self.draft.brand.trim().is_empty() {
            let err = SubmitError::EmptyFields;
            self.banner = Some(err.to_string());
            return Err(err);
        }
        self.banner = None;
        self.in_flight = true;
        Ok(CheckRequest {
            prompt: self.draft.prompt.clone(),
            brand: self.draft.brand.clone(),
        })
    }

    /// Fold one resolved outcome into the session. Always reopens the gate.
    /// The draft is cleared on every classified outcome; only a transport
    /// failure preserves it for a retry without retyping.
    pub fn resolve(&mut self, outcome: Outcome) {
        self.in_flight = false;
        match outcome {
            Outcome::TransportFailure { message } => {
                self.banner = Some(message);
            }
            Outcome::BackendError { message } => {
                self.banner = Some(message);
                self.draft.clear();
            }
            Outcome::MentionError { record, message } => {
                self.results.push(record);
                self.banner = Some(message);
                self.draft.clear();
            }
            Outcome::Success { record } => {
                self.results.push(record);
                self.draft.clear();
            }
        }
    }
}

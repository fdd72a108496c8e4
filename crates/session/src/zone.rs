//! Per-zone capture state machine.
//!
//! Transitions:
//!
//! ```text
//! Idle --capture--> HasImage --begin_analysis--> Analyzing --success--> Resolved
//!                                               Analyzing --failure--> Failed
//! Resolved | Failed | HasImage --discard--> Idle
//! Resolved --edit_field--> Resolved
//! ```
//!
//! At most one extraction is in flight per zone: `capture` is rejected
//! while `Analyzing`, and `begin_analysis` only fires from `HasImage`.
//!
//! Staleness suppression: there is no way to abort an in-flight
//! extraction call, so a discard or recapture issued while one is pending
//! must instead make its eventual result a no-op. Every `begin_analysis`
//! stamps the current generation into the ticket; every transition out of
//! `Analyzing` bumps the generation; a result only applies while the zone
//! is still `Analyzing` with a matching generation.

use std::sync::Arc;

use log::debug;
use panelscan_protocol::ZoneRecord;
use panelscan_registry::ZoneId;

/// Captured frame bytes, shared with the extraction worker thread.
pub type Image = Arc<[u8]>;

/// Capture lifecycle state for one zone.
#[derive(Debug, Clone)]
pub enum ZoneCaptureState {
    Idle,
    HasImage(Image),
    Analyzing(Image),
    Resolved { image: Image, record: ZoneRecord },
    Failed { image: Image, error: String },
}

impl ZoneCaptureState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::HasImage(_) => "has_image",
            Self::Analyzing(_) => "analyzing",
            Self::Resolved { .. } => "resolved",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Error type for rejected state transitions.
#[derive(Debug, PartialEq, Eq)]
pub enum TransitionError {
    /// Capture attempted while an extraction is in flight
    AnalysisInFlight,
    /// Analysis attempted without a captured image
    NoImage,
    /// Field edit attempted outside the `Resolved` state
    NotResolved,
    /// Field edit for a key the zone does not own
    UnknownField(String),
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionError::AnalysisInFlight => {
                write!(f, "Analysis is in progress — wait or discard first")
            }
            TransitionError::NoImage => write!(f, "No captured image to analyze"),
            TransitionError::NotResolved => {
                write!(f, "Readings can only be edited after analysis completes")
            }
            TransitionError::UnknownField(key) => {
                write!(f, "Field '{}' does not belong to this zone", key)
            }
        }
    }
}

impl std::error::Error for TransitionError {}

/// Claim ticket for one extraction attempt. Carries everything the worker
/// thread needs plus the generation the result will be validated against.
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    zone: ZoneId,
    generation: u64,
    image: Image,
}

impl AnalysisTicket {
    pub fn zone(&self) -> ZoneId {
        self.zone
    }

    pub fn image(&self) -> &[u8] {
        &self.image
    }
}

/// State machine for a single zone.
#[derive(Debug)]
pub struct ZoneMachine {
    zone: ZoneId,
    state: ZoneCaptureState,
    generation: u64,
}

impl ZoneMachine {
    pub fn new(zone: ZoneId) -> Self {
        Self {
            zone,
            state: ZoneCaptureState::Idle,
            generation: 0,
        }
    }

    pub fn zone(&self) -> ZoneId {
        self.zone
    }

    pub fn state(&self) -> &ZoneCaptureState {
        &self.state
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, ZoneCaptureState::Resolved { .. })
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, ZoneCaptureState::Analyzing(_))
    }

    /// The extracted record, when resolved.
    pub fn record(&self) -> Option<&ZoneRecord> {
        match &self.state {
            ZoneCaptureState::Resolved { record, .. } => Some(record),
            _ => None,
        }
    }

    /// Accept a new captured frame. Allowed from every state except
    /// `Analyzing`; replaces any prior record or error.
    pub fn capture(&mut self, image: Image) -> Result<(), TransitionError> {
        if self.is_analyzing() {
            return Err(TransitionError::AnalysisInFlight);
        }
        self.state = ZoneCaptureState::HasImage(image);
        Ok(())
    }

    /// Start an extraction attempt. Only valid with a fresh captured
    /// image; the returned ticket must be handed to the worker that runs
    /// the extraction and then back into `apply_success`/`apply_failure`.
    pub fn begin_analysis(&mut self) -> Result<AnalysisTicket, TransitionError> {
        let image = match &self.state {
            ZoneCaptureState::HasImage(image) => image.clone(),
            ZoneCaptureState::Analyzing(_) => return Err(TransitionError::AnalysisInFlight),
            _ => return Err(TransitionError::NoImage),
        };
        self.state = ZoneCaptureState::Analyzing(image.clone());
        Ok(AnalysisTicket {
            zone: self.zone,
            generation: self.generation,
            image,
        })
    }

    /// Drop the zone back to `Idle`. A discard while `Analyzing` also
    /// invalidates the in-flight ticket.
    pub fn discard(&mut self) {
        if self.is_analyzing() {
            self.generation += 1;
        }
        self.state = ZoneCaptureState::Idle;
    }

    /// Apply a successful extraction. Returns `false` when the result is
    /// stale (the zone left the `Analyzing` state the ticket was issued
    /// from) and was suppressed.
    pub fn apply_success(&mut self, ticket: &AnalysisTicket, record: ZoneRecord) -> bool {
        let Some(image) = self.accept(ticket) else {
            return false;
        };
        self.state = ZoneCaptureState::Resolved { image, record };
        true
    }

    /// Apply a failed extraction. Same staleness contract as
    /// [`apply_success`].
    pub fn apply_failure(&mut self, ticket: &AnalysisTicket, error: String) -> bool {
        let Some(image) = self.accept(ticket) else {
            return false;
        };
        self.state = ZoneCaptureState::Failed { image, error };
        true
    }

    /// Manual operator correction of a single reading.
    pub fn edit_field(&mut self, key: &str, value: Option<f64>) -> Result<(), TransitionError> {
        match &mut self.state {
            ZoneCaptureState::Resolved { record, .. } => {
                if record.set(key, value) {
                    Ok(())
                } else {
                    Err(TransitionError::UnknownField(key.to_string()))
                }
            }
            _ => Err(TransitionError::NotResolved),
        }
    }

    /// Staleness gate. On acceptance the generation bumps (this is a
    /// transition out of `Analyzing`) and the analyzed image is returned.
    fn accept(&mut self, ticket: &AnalysisTicket) -> Option<Image> {
        match &self.state {
            ZoneCaptureState::Analyzing(image) if ticket.generation == self.generation => {
                let image = image.clone();
                self.generation += 1;
                Some(image)
            }
            _ => {
                debug!(
                    "suppressed stale extraction result for {} (state {})",
                    self.zone,
                    self.state.name()
                );
                None
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

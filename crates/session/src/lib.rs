//! `panelscan-session` — Capture state machines and session context.
//!
//! One [`ZoneMachine`] per zone enforces the capture lifecycle (idle →
//! has-image → analyzing → resolved/failed) and suppresses stale
//! extraction results via a generation counter. [`Session`] owns the four
//! machines plus the once-per-session capture timestamp and decides
//! submit-eligibility; [`build_payload`] flattens the whole session into
//! the deviation-report row the sheet expects.
//!
//! Zones are independent: a failure or in-flight extraction on one zone
//! never blocks or mutates another.

mod payload;
mod session;
pub mod zone;

pub use payload::build_payload;
pub use session::{spawn_extraction, Session};
pub use zone::{AnalysisTicket, Image, TransitionError, ZoneCaptureState, ZoneMachine};

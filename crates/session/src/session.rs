//! Session context: the four zone machines plus once-per-session state.

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use panelscan_extract::Extract;
use panelscan_protocol::ZoneRecord;
use panelscan_registry::ZoneId;

use crate::zone::{AnalysisTicket, Image, TransitionError, ZoneMachine};

/// One operator session: four independent zone machines and the capture
/// timestamp stamped by the first successful resolution anywhere.
#[derive(Debug)]
pub struct Session {
    zones: [ZoneMachine; 4],
    captured_at: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            zones: ZoneId::ALL.map(ZoneMachine::new),
            captured_at: None,
        }
    }

    /// Explicit "new session": all zones back to idle, timestamp cleared.
    /// Zone generation counters survive the reset so a pre-reset
    /// extraction still in flight can never apply into the new session.
    pub fn reset(&mut self) {
        for zone in &mut self.zones {
            zone.discard();
        }
        self.captured_at = None;
    }

    pub fn zone(&self, zone: ZoneId) -> &ZoneMachine {
        &self.zones[zone as usize]
    }

    pub fn zone_mut(&mut self, zone: ZoneId) -> &mut ZoneMachine {
        &mut self.zones[zone as usize]
    }

    /// Canonical event time of the report: the wall-clock moment of the
    /// session's first successful resolution. `None` until then.
    pub fn captured_at(&self) -> Option<&str> {
        self.captured_at.as_deref()
    }

    pub fn capture(&mut self, zone: ZoneId, image: Image) -> Result<(), TransitionError> {
        self.zone_mut(zone).capture(image)
    }

    pub fn begin_analysis(&mut self, zone: ZoneId) -> Result<AnalysisTicket, TransitionError> {
        self.zone_mut(zone).begin_analysis()
    }

    pub fn discard(&mut self, zone: ZoneId) {
        self.zone_mut(zone).discard()
    }

    pub fn edit_field(
        &mut self,
        zone: ZoneId,
        key: &str,
        value: Option<f64>,
    ) -> Result<(), TransitionError> {
        self.zone_mut(zone).edit_field(key, value)
    }

    /// Apply a successful extraction through the zone's staleness gate.
    /// The first application anywhere in the session stamps the capture
    /// timestamp; later ones never move it.
    pub fn apply_success(&mut self, ticket: &AnalysisTicket, record: ZoneRecord) -> bool {
        let applied = self.zone_mut(ticket.zone()).apply_success(ticket, record);
        if applied && self.captured_at.is_none() {
            self.captured_at = Some(now_timestamp());
        }
        applied
    }

    pub fn apply_failure(&mut self, ticket: &AnalysisTicket, error: String) -> bool {
        self.zone_mut(ticket.zone()).apply_failure(ticket, error)
    }

    /// Submission is permitted only with all four zones resolved.
    pub fn is_submittable(&self) -> bool {
        self.zones.iter().all(ZoneMachine::is_resolved)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Report-row timestamp format, local time.
pub(crate) fn now_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

// ── Worker dispatch ─────────────────────────────────────────────────

/// Run one extraction on a worker thread.
///
/// Begins analysis synchronously (so the in-flight-per-zone guarantee
/// holds before this returns), then hands the ticket to a thread that
/// runs the blocking extraction and applies the outcome through the
/// staleness gate. Zones are independent; callers may have one of these
/// running per zone.
pub fn spawn_extraction(
    session: &Arc<Mutex<Session>>,
    extractor: Arc<dyn Extract>,
    zone: ZoneId,
    model: String,
) -> Result<thread::JoinHandle<()>, TransitionError> {
    let ticket = lock(session).begin_analysis(zone)?;

    let session = Arc::clone(session);
    let handle = thread::spawn(move || {
        let result = extractor.extract(zone, ticket.image(), &model);
        let mut session = lock(&session);
        match result {
            Ok(record) => session.apply_success(&ticket, record),
            Err(e) => session.apply_failure(&ticket, e.to_string()),
        };
    });
    Ok(handle)
}

fn lock(session: &Arc<Mutex<Session>>) -> MutexGuard<'_, Session> {
    match session.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// ── Tests ───────────────────────────────────────────────────────────

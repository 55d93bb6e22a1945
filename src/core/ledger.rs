use std::collections::HashSet;

/// In-memory record of video ids that already produced a summary.
///
/// Not synchronized on its own; the orchestrator keeps it behind a mutex and
/// only touches it for check-and-mark. Nothing is ever evicted, so the set
/// lives exactly as long as the process.
#[derive(Debug, Default)]
pub struct DedupLedger {
    seen: HashSet<String>,
    in_flight: HashSet<String>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self, video_id: &str) -> bool {
        self.seen.contains(video_id)
    }

    pub fn mark_seen(&mut self, video_id: &str) {
        self.seen.insert(video_id.to_string());
    }

    /// Claims `video_id` for a running request. Returns `false` if another request holds it.
    pub fn reserve(&mut self, video_id: &str) -> bool {
        self.in_flight.insert(video_id.to_string())
    }

    pub fn release(&mut self, video_id: &str) {
        self.in_flight.remove(video_id);
    }

    pub fn is_in_flight(&self, video_id: &str) -> bool {
        self.in_flight.contains(video_id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }
}

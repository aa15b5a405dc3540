/// Sequence numbers for in-flight nearby refreshes.
///
/// In-flight refreshes are never cancelled. Every fix takes a new number,
/// and a completion is applied only if it carries the newest number issued
/// so far, so overlapping refreshes cannot publish an older fix's items
/// over a newer one regardless of completion order. While fixes keep
/// arriving faster than refreshes complete nothing is published; the
/// newest refresh lands once the fixes settle.
#[derive(Debug, Clone, Default)]
pub struct RefreshSequencer {
    issued: u64,
    applied: u64,
}

impl RefreshSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the number for a new refresh
    pub fn next(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Whether the completion tagged `sequence` may be published.
    /// Marks it applied when it may.
    pub fn accept(&mut self, sequence: u64) -> bool {
        if sequence != self.issued || sequence <= self.applied {
            return false;
        }
        self.applied = sequence;
        true
    }

    pub fn latest_issued(&self) -> u64 {
        self.issued
    }

    /// True while the newest refresh has not come back yet
    pub fn is_pending(&self) -> bool {
        self.applied < self.issued
    }
}

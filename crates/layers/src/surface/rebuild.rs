use foundation::time::Time;

/// Lifecycle of a shape's fragment set.
///
/// `Dirty` is entered on any edit of the ring. `Clean` remembers when the
/// fragments were built so terrain refreshes are picked up once the throttle
/// interval has passed. `Failed` holds until the next edit.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum RebuildState {
    #[default]
    Dirty,
    Rebuilding,
    Clean {
        last_rebuild: Time,
    },
    Failed,
}

impl RebuildState {
    pub fn mark_dirty(&mut self) {
        *self = RebuildState::Dirty;
    }

    pub fn begin(&mut self) {
        *self = RebuildState::Rebuilding;
    }

    pub fn finish(&mut self, now: Time) {
        *self = RebuildState::Clean { last_rebuild: now };
    }

    pub fn fail(&mut self) {
        *self = RebuildState::Failed;
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, RebuildState::Clean { .. })
    }
}

/// Minimum time between two rebuilds of a clean shape.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RebuildThrottle {
    pub interval_s: f64,
}

impl RebuildThrottle {
    pub fn new(interval_s: f64) -> Self {
        Self { interval_s }
    }

    pub fn is_due(&self, state: &RebuildState, now: Time) -> bool {
        match state {
            RebuildState::Dirty => true,
            RebuildState::Clean { last_rebuild } => now.since(*last_rebuild) > self.interval_s,
            RebuildState::Rebuilding | RebuildState::Failed => false,
        }
    }
}

impl Default for RebuildThrottle {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Engine time in seconds. Supplied by the frame loop, never read from a
/// wall clock, so every time-based decision replays identically.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Seconds elapsed since `earlier` (negative if `earlier` is in the future).
    pub fn since(self, earlier: Time) -> f64 {
        self.0 - earlier.0
    }

    pub fn after(self, seconds: f64) -> Time {
        Time(self.0 + seconds)
    }
}

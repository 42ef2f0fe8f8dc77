use foundation::time::Time;

/// Deterministic frame metadata.
///
/// This is the primary timebase for the render loop. Shapes receive
/// `Frame::time` to decide whether their terrain fragments are due for a
/// rebuild, so a recorded frame sequence replays the same rebuilds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time since the previous frame (seconds).
    pub dt_s: f64,
    /// Engine time at the start of the frame.
    pub time: Time,
}

/// Produces frames at a fixed step starting from an arbitrary time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameClock {
    start: Time,
    dt_s: f64,
    next_index: u64,
}

impl FrameClock {
    pub fn new(dt_s: f64) -> Self {
        Self::starting_at(Time::ZERO, dt_s)
    }

    pub fn starting_at(start: Time, dt_s: f64) -> Self {
        Self {
            start,
            dt_s,
            next_index: 0,
        }
    }

    pub fn dt_s(&self) -> f64 {
        self.dt_s
    }

    /// Frames emitted so far.
    pub fn frames_emitted(&self) -> u64 {
        self.next_index
    }

    pub fn tick(&mut self) -> Frame {
        let index = self.next_index;
        self.next_index += 1;
        Frame {
            index,
            dt_s: self.dt_s,
            time: self.start.after(index as f64 * self.dt_s),
        }
    }
}

impl Iterator for FrameClock {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        Some(self.tick())
    }
}

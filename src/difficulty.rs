/// Time-driven difficulty steps. Fires once each time the elapsed whole
/// seconds cross into a new positive multiple of the step interval, no matter
/// how many frames are rendered inside that second.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DifficultyRamp {
    step_secs: u64,
    steps_applied: u64,
}

impl DifficultyRamp {
    pub fn new(step_secs: u64) -> Self {
        DifficultyRamp {
            step_secs: step_secs.max(1),
            steps_applied: 0,
        }
    }

    /// Number of steps that became due since the last call. Usually 0 or 1;
    /// more than one only if a frame stalled across several intervals.
    pub fn steps_due(&mut self, elapsed_secs: u64) -> u64 {
        let reached = elapsed_secs / self.step_secs;
        let due = reached.saturating_sub(self.steps_applied);
        self.steps_applied = self.steps_applied.max(reached);
        due
    }

    pub fn steps_applied(&self) -> u64 {
        self.steps_applied
    }
}

use crate::time::DEFAULT_UPS;

/// Loop driver configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Target fixed updates per second.
    pub updates_per_second: f32,

    /// Maximum fixed updates per frame. `None` runs every due step, however
    /// long the previous frame took.
    pub step_limit: Option<u32>,
}

impl EngineConfig {
    pub fn with_ups(mut self, ups: f32) -> Self {
        self.updates_per_second = ups;
        self
    }

    pub fn with_step_limit(mut self, limit: u32) -> Self {
        self.step_limit = Some(limit);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            updates_per_second: DEFAULT_UPS,
            step_limit: None,
        }
    }
}

use std::time::Duration;

use crate::error::{Error, Result};

pub const MIN_GRID_SIZE: usize = 10;
pub const DEFAULT_GRID_SIZE: usize = 20;
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(500);

/// Display colors handed through to the renderer untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub alive: u32,
    pub dead: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            alive: 0xFF00_0000,
            dead: 0xFFFF_FFFF,
        }
    }
}

/// Settings a session starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    pub size: usize,
    pub step_delay: Duration,
    pub palette: Palette,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_GRID_SIZE,
            step_delay: DEFAULT_STEP_DELAY,
            palette: Palette::default(),
        }
    }
}

impl SimulationConfig {
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_size(self.size)
    }
}

/// Sizes picked by the user must be at least `MIN_GRID_SIZE`. Loaded grids
/// are not held to this.
pub(crate) fn check_size(size: usize) -> Result<()> {
    if size < MIN_GRID_SIZE {
        return Err(Error::InvalidSize {
            size,
            min: MIN_GRID_SIZE,
        });
    }
    Ok(())
}

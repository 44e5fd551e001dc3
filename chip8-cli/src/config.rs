//! Run configuration.
use std::fs;

use chip8::KeyCode;
use serde::Deserialize;

use crate::error::AppError;

/// Parameters for a headless run, loaded from YAML.
///
/// ```yaml
/// steps_per_frame: 10
/// frames: 600
/// throttle: false
/// seed: 42
/// keys:
///   - { frame: 30, key: 5 }
///   - { frame: 45, key: 5, pressed: false }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConf {
    /// Instructions executed between timer ticks.
    pub steps_per_frame: usize,
    /// Number of 60 Hz frames to run before stopping.
    pub frames: usize,
    /// Pace frames to real time instead of running flat out.
    pub throttle: bool,
    /// Seed for the random number opcode, for reproducible runs.
    pub seed: Option<u64>,
    /// Scripted keypad input.
    pub keys: Vec<KeyEvent>,
}

impl Default for RunConf {
    fn default() -> Self {
        Self {
            steps_per_frame: 10,
            frames: 600,
            throttle: false,
            seed: None,
            keys: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyEvent {
    /// Frame at the start of which the event is delivered.
    pub frame: usize,
    pub key: KeyCode,
    #[serde(default = "pressed_default")]
    pub pressed: bool,
}

fn pressed_default() -> bool {
    true
}

impl RunConf {
    pub fn from_file(filepath: &str) -> Result<Self, AppError> {
        let source = fs::read_to_string(filepath)?;
        let conf = Self::from_yaml(&source)?;
        log::debug!("loaded run configuration: {:#?}", conf);
        Ok(conf)
    }

    pub fn from_yaml(source: &str) -> Result<Self, AppError> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Key events scheduled for the given frame, in file order.
    pub fn keys_at(&self, frame: usize) -> impl Iterator<Item = &KeyEvent> {
        self.keys.iter().filter(move |event| event.frame == frame)
    }
}

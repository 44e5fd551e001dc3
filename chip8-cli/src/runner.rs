//! Headless host loop.
use chip8::prelude::*;
use log::{debug, error, info};

use crate::{clock::Clock, config::RunConf, error::AppError};

/// Counters collected over a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub frames: usize,
    pub steps: usize,
    /// Frames in which at least one instruction changed the display.
    pub redraws: usize,
    /// Number of times the buzzer was switched on.
    pub beeps: usize,
}

/// Drives a machine the way a render loop would: a batch of instructions,
/// one timer tick, and a redraw when the batch reported display changes.
pub struct Runner {
    conf: RunConf,
    buzzer: bool,
    stats: RunStats,
}

impl Runner {
    pub fn new(conf: RunConf) -> Self {
        Self {
            conf,
            buzzer: false,
            stats: RunStats::default(),
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Reset the machine, load the program and run it for the configured number of frames.
    pub fn run(&mut self, vm: &mut Chip8Vm, rom: &[u8]) -> Result<(), AppError> {
        vm.reset();
        if let Some(seed) = self.conf.seed {
            vm.seed_rng(seed);
        }
        vm.load_bytecode(rom)?;

        info!(
            "running {} frames at {} steps per frame",
            self.conf.frames, self.conf.steps_per_frame
        );

        let mut clock = Clock::new();

        for frame in 0..self.conf.frames {
            if let Err(err) = self.frame(vm, frame) {
                error!("frame {frame}: {err}");
                return Err(err.into());
            }

            if self.conf.throttle {
                clock.wait();
            }
        }

        if self.buzzer {
            debug!("buzzer off");
            self.buzzer = false;
        }

        Ok(())
    }

    fn frame(&mut self, vm: &mut Chip8Vm, frame: usize) -> Chip8Result<()> {
        for event in self.conf.keys_at(frame) {
            debug!("frame {frame}: {} {}", event.key, if event.pressed { "down" } else { "up" });
            vm.set_key(event.key, event.pressed);
        }

        let mut redraw = false;
        for _ in 0..self.conf.steps_per_frame {
            redraw |= vm.step()?;
            self.stats.steps += 1;
        }

        vm.tick_timers();
        self.update_buzzer(vm.sound_timer_active());

        self.stats.frames += 1;
        if redraw {
            self.stats.redraws += 1;
        }

        Ok(())
    }

    /// Buzzer should be on while sound timer counts down,
    /// then turned off when the timer reaches zero.
    fn update_buzzer(&mut self, active: bool) {
        if active && !self.buzzer {
            debug!("buzzer on");
            self.stats.beeps += 1;
        } else if !active && self.buzzer {
            debug!("buzzer off");
        }
        self.buzzer = active;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::KeyEvent;

    #[rustfmt::skip]
    const ECHO_KEY: &[u8] = &[
        0xF0, 0x0A, // LD v0, K
        0xF0, 0x29, // LD F, v0
        0x00, 0xE0, // CLS
        0xD1, 0x15, // DRW v1, v1, 5
        0x62, 0x02, // LD v2, 2
        0xF2, 0x18, // LD ST, v2
        0x12, 0x0C, // JP 0x20C
    ];

    #[test]
    fn test_scripted_run() {
        let conf = RunConf {
            steps_per_frame: 4,
            frames: 10,
            keys: vec![KeyEvent {
                frame: 3,
                key: KeyCode::Key7,
                pressed: true,
            }],
            ..RunConf::default()
        };
        let mut runner = Runner::new(conf);
        let mut vm = Chip8Vm::new();

        runner.run(&mut vm, ECHO_KEY).unwrap();

        assert_eq!(
            runner.stats(),
            &RunStats {
                frames: 10,
                steps: 40,
                redraws: 1,
                beeps: 1,
            }
        );
        assert_eq!(vm.cpu().register(0), 7);
        assert!(vm.display_buffer().iter().any(|px| *px));
    }

    #[test]
    fn test_run_stops_on_fault() {
        let mut runner = Runner::new(RunConf::default());
        let mut vm = Chip8Vm::new();

        let result = runner.run(&mut vm, &[0x60, 0x01, 0xFF, 0xFF]);
        assert!(result.is_err());
        assert_eq!(runner.stats().frames, 0);
        assert_eq!(runner.stats().steps, 1);
    }
}

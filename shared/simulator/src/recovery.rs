//! Timed crash recovery for racing agents.
use serde::{Deserialize, Serialize};

const EPSILON: f64 = 1e-9;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Seconds the explosion is shown before the aircraft is moved back.
    pub explosion_delay: f64,
    /// Seconds spent at the checkpoint before control returns.
    pub recovery_delay: f64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            explosion_delay: 2.0,
            recovery_delay: 1.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RecoveryPhase {
    Normal,
    Exploding { remaining: f64 },
    Recovering { remaining: f64 },
}

/// What the owner has to do when a phase ends.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RecoveryStep {
    /// Move back to the last completed checkpoint and restore the visuals.
    Reposition,
    /// Give control back.
    Thaw,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrashRecovery {
    config: RecoveryConfig,
    phase: RecoveryPhase,
}

impl CrashRecovery {
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            config,
            phase: RecoveryPhase::Normal,
        }
    }

    pub fn phase(&self) -> RecoveryPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != RecoveryPhase::Normal
    }

    /// Starts the sequence. Returns false if one is already running.
    pub fn start(&mut self) -> bool {
        if self.is_active() {
            return false;
        }
        self.phase = RecoveryPhase::Exploding {
            remaining: self.config.explosion_delay,
        };
        true
    }

    /// Advances the timer by `dt` seconds. At most one step is returned per
    /// call, even when `dt` covers both delays.
    pub fn tick(&mut self, dt: f64) -> Option<RecoveryStep> {
        match self.phase {
            RecoveryPhase::Normal => None,
            RecoveryPhase::Exploding { remaining } => {
                let remaining = remaining - dt;
                if remaining <= EPSILON {
                    self.phase = RecoveryPhase::Recovering {
                        remaining: self.config.recovery_delay,
                    };
                    Some(RecoveryStep::Reposition)
                } else {
                    self.phase = RecoveryPhase::Exploding { remaining };
                    None
                }
            }
            RecoveryPhase::Recovering { remaining } => {
                let remaining = remaining - dt;
                if remaining <= EPSILON {
                    self.phase = RecoveryPhase::Normal;
                    Some(RecoveryStep::Thaw)
                } else {
                    self.phase = RecoveryPhase::Recovering { remaining };
                    None
                }
            }
        }
    }

    /// Drops any pending step.
    pub fn cancel(&mut self) {
        self.phase = RecoveryPhase::Normal;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn test_sequence() {
        let mut recovery = CrashRecovery::new(RecoveryConfig::default());
        assert_eq!(recovery.tick(1.0), None);
        assert!(recovery.start());
        assert!(!recovery.start());
        assert_eq!(recovery.tick(1.0), None);
        assert_eq!(recovery.tick(1.0), Some(RecoveryStep::Reposition));
        assert_eq!(
            recovery.phase(),
            RecoveryPhase::Recovering { remaining: 1.0 }
        );
        assert_eq!(recovery.tick(0.5), None);
        assert_eq!(recovery.tick(0.5), Some(RecoveryStep::Thaw));
        assert!(!recovery.is_active());
    }

    #[test]
    fn test_fixed_ticks() {
        let mut recovery = CrashRecovery::new(RecoveryConfig::default());
        recovery.start();
        let dt = 1.0 / 60.0;
        let mut steps = vec![];
        for tick in 0..300 {
            if let Some(step) = recovery.tick(dt) {
                steps.push((tick, step));
            }
        }
        assert_eq!(
            steps,
            vec![(119, RecoveryStep::Reposition), (179, RecoveryStep::Thaw)]
        );
    }

    #[test]
    fn test_cancel() {
        let mut recovery = CrashRecovery::new(RecoveryConfig::default());
        recovery.start();
        recovery.cancel();
        assert_eq!(recovery.tick(10.0), None);
        assert_eq!(recovery.phase(), RecoveryPhase::Normal);
    }
}

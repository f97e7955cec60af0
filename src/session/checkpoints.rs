//! Checkpoint crossing detection

use std::collections::BTreeSet;

use crate::state::SessionConfig;

/// How checkpoint announcements are detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnouncementPolicy {
    /// Fire only on a tick landing exactly on a checkpoint's whole minute.
    /// A tick lost to throttling skips that checkpoint for good.
    #[default]
    ExactMinute,
    /// Track the checkpoints not yet announced and fire for any the countdown
    /// has passed, whether or not its exact minute tick was seen.
    CatchUp,
}

/// Decides, per distinct tick, whether an announcement is due
#[derive(Debug, Clone, Default)]
pub struct CheckpointTracker {
    policy: AnnouncementPolicy,
    /// Remaining-seconds instants still to announce (CatchUp only)
    pending: BTreeSet<u64>,
}

impl CheckpointTracker {
    pub fn new(policy: AnnouncementPolicy) -> Self {
        Self {
            policy,
            pending: BTreeSet::new(),
        }
    }

    pub fn policy(&self) -> AnnouncementPolicy {
        self.policy
    }

    /// Prepare for a countdown currently showing `seconds`.
    ///
    /// Checkpoints already behind the countdown are not re-announced. A
    /// display resting exactly on a checkpoint means its tick was already
    /// handled, since checkpoints are always below the total.
    pub fn arm(&mut self, config: &SessionConfig, seconds: u64) {
        self.pending = config
            .checkpoints
            .iter()
            .map(|&m| u64::from(m) * 60)
            .filter(|&instant| instant < seconds)
            .collect();
    }

    pub fn disarm(&mut self) {
        self.pending.clear();
    }

    /// The minute count to announce for this tick, if any
    pub fn check(&mut self, config: &SessionConfig, seconds: u64) -> Option<u64> {
        match self.policy {
            AnnouncementPolicy::ExactMinute => {
                if seconds % 60 != 0 {
                    return None;
                }
                let minutes = seconds / 60;
                config.is_checkpoint(minutes).then_some(minutes)
            }
            AnnouncementPolicy::CatchUp => {
                let crossed: Vec<u64> = self.pending.range(seconds..).copied().collect();
                if crossed.is_empty() {
                    return None;
                }
                for instant in &crossed {
                    self.pending.remove(instant);
                }
                // Finish has its own announcement
                if seconds == 0 {
                    return None;
                }
                Some(seconds.div_ceil(60))
            }
        }
    }
}

/// Spoken text for a checkpoint
pub fn checkpoint_phrase(minutes: u64) -> String {
    format!("{} minutes remaining.", minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(raw: &str) -> SessionConfig {
        SessionConfig::parse(raw).unwrap()
    }

    #[test]
    fn exact_minute_fires_only_on_checkpoint_minutes() {
        let config = config("30, 15, 10, 5");
        let mut tracker = CheckpointTracker::new(AnnouncementPolicy::ExactMinute);
        tracker.arm(&config, 1800);

        assert_eq!(tracker.check(&config, 900), Some(15));
        assert_eq!(tracker.check(&config, 600), Some(10));
        assert_eq!(tracker.check(&config, 300), Some(5));
        assert_eq!(tracker.check(&config, 301), None);
        assert_eq!(tracker.check(&config, 299), None);
        assert_eq!(tracker.check(&config, 1200), None);
        assert_eq!(tracker.check(&config, 0), None);
    }

    #[test]
    fn exact_minute_misses_skipped_ticks() {
        let config = config("30, 5");
        let mut tracker = CheckpointTracker::new(AnnouncementPolicy::ExactMinute);
        tracker.arm(&config, 1800);

        assert_eq!(tracker.check(&config, 301), None);
        assert_eq!(tracker.check(&config, 299), None);
    }

    #[test]
    fn catch_up_announces_skipped_checkpoints_once() {
        let config = config("30, 5");
        let mut tracker = CheckpointTracker::new(AnnouncementPolicy::CatchUp);
        tracker.arm(&config, 1800);

        assert_eq!(tracker.check(&config, 301), None);
        assert_eq!(tracker.check(&config, 297), Some(5));
        assert_eq!(tracker.check(&config, 296), None);
        assert_eq!(tracker.check(&config, 240), None);
    }

    #[test]
    fn catch_up_collapses_several_crossings_into_one_announcement() {
        let config = config("30, 15, 10, 5");
        let mut tracker = CheckpointTracker::new(AnnouncementPolicy::CatchUp);
        tracker.arm(&config, 1800);

        assert_eq!(tracker.check(&config, 550), Some(10));
        assert_eq!(tracker.check(&config, 300), Some(5));
        assert_eq!(tracker.check(&config, 120), None);
    }

    #[test]
    fn catch_up_ignores_checkpoints_behind_a_resumed_countdown() {
        let config = config("30, 15, 10, 5");
        let mut tracker = CheckpointTracker::new(AnnouncementPolicy::CatchUp);
        tracker.arm(&config, 700);

        assert_eq!(tracker.check(&config, 699), None);
        assert_eq!(tracker.check(&config, 600), Some(10));
    }

    #[test]
    fn catch_up_skips_a_checkpoint_the_display_rests_on() {
        let config = config("30, 15");
        let mut tracker = CheckpointTracker::new(AnnouncementPolicy::CatchUp);
        tracker.arm(&config, 900);

        assert_eq!(tracker.check(&config, 899), None);
        assert_eq!(tracker.check(&config, 60), None);
    }

    #[test]
    fn catch_up_stays_quiet_at_zero() {
        let config = config("30, 5");
        let mut tracker = CheckpointTracker::new(AnnouncementPolicy::CatchUp);
        tracker.arm(&config, 1800);

        assert_eq!(tracker.check(&config, 0), None);
        assert_eq!(tracker.check(&config, 0), None);
    }

    #[test]
    fn phrase_matches_spoken_format() {
        assert_eq!(checkpoint_phrase(5), "5 minutes remaining.");
    }
}

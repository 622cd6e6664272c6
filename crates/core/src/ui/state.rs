//! UI-only state and event definitions.
//!
//! The request status itself lives in [`crate::session`]; this module holds
//! the transient bits the window needs on top of it.

use crate::error::Result;
use crate::metadata::{CopyTarget, GeneratedMetadata};
use eframe::egui;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// How long a copy button shows "Copied!".
pub const COPY_FEEDBACK_DURATION: Duration = Duration::from_secs(2);

/// Result sent back from the background request thread.
pub(crate) struct GenerationOutcome {
    pub ticket_id: u64,
    pub outcome: Result<GeneratedMetadata>,
}

/// Preview decoded on a worker thread for the pick numbered `pick_id`.
pub(crate) struct PreviewReady {
    pub pick_id: u64,
    pub preview: Result<egui::ColorImage>,
}

/// Tracks which copy buttons were clicked recently.
#[derive(Debug, Default)]
pub struct CopyFeedback {
    copied_at: HashMap<CopyTarget, Instant>,
}

impl CopyFeedback {
    pub fn mark(&mut self, target: CopyTarget, now: Instant) {
        self.copied_at.insert(target, now);
    }

    /// Whether `target` should still read "Copied!" at `now`.
    pub fn is_active(&self, target: CopyTarget, now: Instant) -> bool {
        self.copied_at
            .get(&target)
            .is_some_and(|at| now.saturating_duration_since(*at) < COPY_FEEDBACK_DURATION)
    }

    /// Time until the earliest active indicator expires.
    pub fn next_expiry(&self, now: Instant) -> Option<Duration> {
        self.copied_at
            .values()
            .filter_map(|at| COPY_FEEDBACK_DURATION.checked_sub(now.saturating_duration_since(*at)))
            .filter(|remaining| !remaining.is_zero())
            .min()
    }

    pub fn clear(&mut self) {
        self.copied_at.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_expires_after_two_seconds() {
        let start = Instant::now();
        let mut feedback = CopyFeedback::default();
        feedback.mark(CopyTarget::Title, start);

        assert!(feedback.is_active(CopyTarget::Title, start));
        assert!(feedback.is_active(CopyTarget::Title, start + Duration::from_millis(1999)));
        assert!(!feedback.is_active(CopyTarget::Title, start + COPY_FEEDBACK_DURATION));
        assert!(!feedback.is_active(CopyTarget::Description, start));
    }

    #[test]
    fn targets_are_tracked_independently() {
        let start = Instant::now();
        let mut feedback = CopyFeedback::default();
        feedback.mark(CopyTarget::Title, start);
        feedback.mark(CopyTarget::Keywords, start + Duration::from_secs(1));

        let later = start + Duration::from_millis(2500);
        assert!(!feedback.is_active(CopyTarget::Title, later));
        assert!(feedback.is_active(CopyTarget::Keywords, later));
        assert_eq!(feedback.next_expiry(later), Some(Duration::from_millis(500)));
    }

    #[test]
    fn nothing_pending_after_clear() {
        let now = Instant::now();
        let mut feedback = CopyFeedback::default();
        feedback.mark(CopyTarget::Description, now);
        feedback.clear();
        assert_eq!(feedback.next_expiry(now), None);
    }
}

use crate::conversation::Conversation;

/// Near-bottom distance used to resume follow mode deterministically.
const AUTO_FOLLOW_RESUME_THRESHOLD: f32 = 24.0;
/// Small delta used to ignore floating-point scroll jitter.
const SCROLL_DELTA_EPSILON: f32 = 1.0;

/// One-way observation contract between the conversation log and the
/// transcript view.
///
/// Whenever the conversation's length changes, the consumer scrolls the
/// visible transcript so the most recently appended turn is fully visible.
/// This never feeds back into the send pipeline; a missed scroll is a
/// cosmetic defect, not a correctness violation.
pub trait ViewSync {
    fn conversation_extended(&mut self, conversation: &Conversation);
}

/// Framework-free follow-bottom tracker.
///
/// The rendering layer reports scroll metrics through `update_follow_state`
/// and drains the pending target with `apply_pending_scroll`. Offsets grow
/// downward: `0.0` is the top of the transcript, `max_offset` its tail.
#[derive(Debug, Clone)]
pub struct TailFollower {
    pending_scroll_to_bottom: bool,
    follow_bottom: bool,
    last_scroll_offset: f32,
    last_max_offset: f32,
}

impl TailFollower {
    pub fn new() -> Self {
        Self {
            pending_scroll_to_bottom: false,
            follow_bottom: true,
            last_scroll_offset: 0.0,
            last_max_offset: 0.0,
        }
    }

    pub fn is_following_bottom(&self) -> bool {
        self.follow_bottom
    }

    pub fn request_scroll_to_bottom(&mut self) {
        self.pending_scroll_to_bottom = true;
        self.follow_bottom = true;
    }

    pub fn reset(&mut self) {
        self.last_scroll_offset = 0.0;
        self.last_max_offset = 0.0;
        self.follow_bottom = true;
        self.pending_scroll_to_bottom = true;
    }

    /// Reconciles follow mode with the metrics the renderer observed.
    pub fn update_follow_state(&mut self, offset: f32, max_offset: f32) {
        let offset_delta = offset - self.last_scroll_offset;
        let max_delta = (max_offset - self.last_max_offset).abs();
        let content_size_changed = max_delta > SCROLL_DELTA_EPSILON;
        let user_scrolled_up = offset_delta < -SCROLL_DELTA_EPSILON && !content_size_changed;
        let user_scrolled_down = offset_delta > SCROLL_DELTA_EPSILON && !content_size_changed;

        // Keep follow mode enabled while we are fulfilling an explicit follow request.
        if self.pending_scroll_to_bottom
            || (content_size_changed && self.was_near_bottom())
        {
            self.follow_bottom = true;
        } else if self.follow_bottom {
            // Pause follow mode only when the user manually scrolls away from the tail.
            if user_scrolled_up {
                self.follow_bottom = false;
            }
        } else if user_scrolled_down && Self::is_near_bottom(offset, max_offset) {
            // Resume follow mode once the user intentionally returns near the bottom boundary.
            self.follow_bottom = true;
        }

        self.last_scroll_offset = offset;
        self.last_max_offset = max_offset;
    }

    /// Returns the offset the renderer should scroll to, when one is due.
    /// Clears the pending request either way.
    pub fn apply_pending_scroll(&mut self, max_offset: f32) -> Option<f32> {
        let should_scroll = self.follow_bottom || self.pending_scroll_to_bottom;
        self.pending_scroll_to_bottom = false;

        should_scroll.then(|| max_offset.max(0.0))
    }

    fn is_near_bottom(offset: f32, max_offset: f32) -> bool {
        if max_offset <= 0.0 {
            return true;
        }

        (max_offset - offset).abs() <= AUTO_FOLLOW_RESUME_THRESHOLD
    }

    fn was_near_bottom(&self) -> bool {
        Self::is_near_bottom(self.last_scroll_offset, self.last_max_offset)
    }
}

impl Default for TailFollower {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewSync for TailFollower {
    fn conversation_extended(&mut self, _conversation: &Conversation) {
        self.request_scroll_to_bottom();
    }
}

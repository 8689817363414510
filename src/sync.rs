//! Playback position to active segment synchronization.
//!
//! The active segment is the last one whose start time, minus a small lead
//! tolerance, has been reached.

use crate::content::TextSegment;
use tracing::debug;

/// Default lead time, in seconds.
pub const DEFAULT_TOLERANCE: f64 = 0.2;

/// Select the active segment id for a playback position.
///
/// Scans from the last segment to the first, so segments sharing a start time
/// resolve to the later one. Returns `None` before the first adjusted start.
pub fn select_active(segments: &[TextSegment], current_time: f64, tolerance: f64) -> Option<u32> {
    segments
        .iter()
        .rev()
        .find(|s| s.start_time - tolerance <= current_time)
        .map(|s| s.id)
}

/// Where a scrolled-to segment should land in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    Center,
}

/// How the scroll should be animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
}

/// Request to bring a newly active segment into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub segment_id: u32,
    pub align: ScrollAlign,
    pub behavior: ScrollBehavior,
}

impl ScrollRequest {
    fn center(segment_id: u32) -> Self {
        Self {
            segment_id,
            align: ScrollAlign::Center,
            behavior: ScrollBehavior::Smooth,
        }
    }
}

/// Tracks the active segment across position updates.
#[derive(Debug, Clone)]
pub struct SyncEngine {
    tolerance: f64,
    active: Option<u32>,
}

impl SyncEngine {
    /// Create an engine with the given lead tolerance.
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            active: None,
        }
    }

    /// Currently active segment id.
    pub fn active(&self) -> Option<u32> {
        self.active
    }

    /// Feed a new playback position.
    ///
    /// Returns a scroll request only when the active segment changes to a new
    /// segment. Moving before the first segment clears the active id silently.
    pub fn update(&mut self, segments: &[TextSegment], current_time: f64) -> Option<ScrollRequest> {
        let next = select_active(segments, current_time, self.tolerance);
        if next == self.active {
            return None;
        }

        debug!("Active segment {:?} -> {:?} at {:.2}s", self.active, next, current_time);
        self.active = next;
        next.map(ScrollRequest::center)
    }
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

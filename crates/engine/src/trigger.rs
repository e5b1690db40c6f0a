//! Progressive reveal trigger - edge-triggered "near the end" detection.
//!
//! A reusable primitive that watches a sentinel position at the tail of the
//! rendered output and signals "load more" once per approach. The rendering
//! surface feeds it discrete visibility observations; the primitive owns the
//! watch state machine and the once-per-transition gating:
//!
//! - `idle -> watching` on attach with a sentinel present
//! - `watching -> idle` on attach with the sentinel absent, or on detach
//! - `watching` self-loops on irrelevant observations (not intersecting, or
//!   `has_more`/`is_loading` gating false)
//! - a qualifying entry transition fires the signal exactly once; leaving the
//!   expanded region (or reattaching, e.g. after the window grew and the
//!   sentinel moved) rearms it

/// Observation tuning: how far ahead of the region boundary the sentinel
/// counts as visible, and how much of it must intersect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerTuning {
    /// Pre-trigger margin, in rows past the bottom of the viewport.
    pub margin_rows: u16,
    /// Fraction of the sentinel that must be inside the expanded region.
    pub threshold: f32,
}

impl Default for TriggerTuning {
    fn default() -> Self {
        Self {
            margin_rows: 4,
            threshold: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchState {
    Idle,
    Watching { fired: bool },
}

#[derive(Debug, Clone, Copy)]
pub struct RevealTrigger {
    tuning: TriggerTuning,
    state: WatchState,
}

impl RevealTrigger {
    pub fn new(tuning: TriggerTuning) -> Self {
        Self {
            tuning,
            state: WatchState::Idle,
        }
    }

    pub fn tuning(&self) -> TriggerTuning {
        self.tuning
    }

    /// (Re)establish the watch. Call whenever the sentinel identity changes:
    /// it was inserted, removed, or moved because the window grew. With no
    /// sentinel there is nothing left to reveal and no observation occurs.
    pub fn attach(&mut self, sentinel_present: bool) {
        self.state = if sentinel_present {
            WatchState::Watching { fired: false }
        } else {
            WatchState::Idle
        };
    }

    /// Replace the tuning and re-establish the watch.
    pub fn retune(&mut self, tuning: TriggerTuning) {
        self.tuning = tuning;
        if matches!(self.state, WatchState::Watching { .. }) {
            self.state = WatchState::Watching { fired: false };
        }
    }

    /// Tear down the watch; no observation survives disposal.
    pub fn detach(&mut self) {
        self.state = WatchState::Idle;
    }

    /// The `isObserving` status flag for the rendering surface.
    pub fn is_watching(&self) -> bool {
        matches!(self.state, WatchState::Watching { .. })
    }

    /// Feed one visibility observation. Returns true exactly when the advance
    /// callback should run: the sentinel's visible fraction exceeds the
    /// threshold, rows remain, no advance is in flight, and this is an entry
    /// transition rather than continued visibility.
    pub fn observe(&mut self, visible_fraction: f32, has_more: bool, is_loading: bool) -> bool {
        let WatchState::Watching { fired } = self.state else {
            return false;
        };

        let intersecting = visible_fraction > self.tuning.threshold;
        if !intersecting {
            // Exit transition rearms the edge detector
            self.state = WatchState::Watching { fired: false };
            return false;
        }
        if fired || !has_more || is_loading {
            return false;
        }
        self.state = WatchState::Watching { fired: true };
        true
    }
}

/// Visible fraction of a one-row sentinel against a viewport expanded
/// downward by `margin_rows`. Row-granular surface: the fraction is 0.0 or
/// 1.0, matching the discrete "entered view" contract.
pub fn sentinel_fraction(
    sentinel_row: usize,
    scroll_row: usize,
    viewport_rows: usize,
    margin_rows: u16,
) -> f32 {
    let bottom = scroll_row + viewport_rows + margin_rows as usize;
    if sentinel_row >= scroll_row && sentinel_row < bottom {
        1.0
    } else {
        0.0
    }
}

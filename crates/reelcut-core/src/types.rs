//! Reelcut Core Type Definitions
//!
//! Defines fundamental types used throughout the project.

use crate::{CoreError, CoreResult};

// =============================================================================
// ID Types
// =============================================================================

/// Highlight unique identifier (ULID)
pub type HighlightId = String;

// =============================================================================
// Time Types
// =============================================================================

/// Time in seconds (floating point)
pub type TimeSec = f64;

// =============================================================================
// Time Range
// =============================================================================

/// Validated (start, end) interval in seconds.
///
/// Invariant: `0 <= start < end <= duration_bound`. A range is an immutable
/// value: editing operations return a new range instead of mutating in
/// place, so a `TimeRange` held by a highlight is always valid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeRange {
    start_sec: TimeSec,
    end_sec: TimeSec,
}

impl TimeRange {
    /// Creates a validated range. The caller is responsible for any clamping;
    /// this constructor only validates.
    pub fn new(start_sec: TimeSec, end_sec: TimeSec, duration_bound: TimeSec) -> CoreResult<Self> {
        if !start_sec.is_finite() || !end_sec.is_finite() {
            return Err(CoreError::InvalidRange {
                start: start_sec,
                end: end_sec,
                bound: duration_bound,
            });
        }
        if start_sec < 0.0 || end_sec <= start_sec || end_sec > duration_bound {
            return Err(CoreError::InvalidRange {
                start: start_sec,
                end: end_sec,
                bound: duration_bound,
            });
        }
        Ok(Self { start_sec, end_sec })
    }

    /// Start of the range in seconds.
    pub fn start_sec(&self) -> TimeSec {
        self.start_sec
    }

    /// End of the range in seconds.
    pub fn end_sec(&self) -> TimeSec {
        self.end_sec
    }

    /// Returns duration in seconds
    pub fn duration(&self) -> TimeSec {
        self.end_sec - self.start_sec
    }

    /// Returns a new range with both bounds shifted by `delta`, clamped to
    /// `[0, duration_bound]`. Fails if clamping collapses the range.
    pub fn shift(&self, delta: TimeSec, duration_bound: TimeSec) -> CoreResult<Self> {
        let start = (self.start_sec + delta).max(0.0);
        let end = (self.end_sec + delta).min(duration_bound);
        Self::new(start, end, duration_bound)
    }

    /// Returns a new range with the given bounds; same failure mode as `new`.
    pub fn resize(
        &self,
        new_start: TimeSec,
        new_end: TimeSec,
        duration_bound: TimeSec,
    ) -> CoreResult<Self> {
        Self::new(new_start, new_end, duration_bound)
    }

    /// Returns a new range with each bound shifted independently by its
    /// delta, each clamped to `[0, duration_bound]`. Fails if the result is
    /// empty or inverted.
    pub fn nudge(
        &self,
        delta_start: TimeSec,
        delta_end: TimeSec,
        duration_bound: TimeSec,
    ) -> CoreResult<Self> {
        let start = (self.start_sec + delta_start).clamp(0.0, duration_bound);
        let end = (self.end_sec + delta_end).clamp(0.0, duration_bound);
        Self::new(start, end, duration_bound)
    }

    /// Returns a copy clamped so `end <= duration_bound`. `None` when
    /// clamping collapses the range to zero-or-negative length.
    pub fn clamped_to(&self, duration_bound: TimeSec) -> Option<Self> {
        let end = self.end_sec.min(duration_bound);
        if end <= self.start_sec {
            return None;
        }
        Some(Self {
            start_sec: self.start_sec,
            end_sec: end,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_valid_range() {
        let range = TimeRange::new(30.0, 45.5, 120.0).unwrap();
        assert_eq!(range.start_sec(), 30.0);
        assert_eq!(range.end_sec(), 45.5);
        assert_eq!(range.duration(), 15.5);
    }

    #[test]
    fn test_new_rejects_negative_start() {
        assert!(TimeRange::new(-1.0, 10.0, 120.0).is_err());
    }

    #[test]
    fn test_new_rejects_empty_or_inverted() {
        assert!(TimeRange::new(10.0, 10.0, 120.0).is_err());
        assert!(TimeRange::new(20.0, 10.0, 120.0).is_err());
    }

    #[test]
    fn test_new_rejects_end_past_bound() {
        assert!(TimeRange::new(40.0, 200.0, 120.0).is_err());
    }

    #[test]
    fn test_new_rejects_non_finite_bounds() {
        assert!(TimeRange::new(f64::NAN, 10.0, 120.0).is_err());
        assert!(TimeRange::new(0.0, f64::INFINITY, 120.0).is_err());
    }

    #[test]
    fn test_new_accepts_range_ending_at_bound() {
        let range = TimeRange::new(0.0, 120.0, 120.0).unwrap();
        assert_eq!(range.duration(), 120.0);
    }

    #[test]
    fn test_shift_moves_both_bounds() {
        let range = TimeRange::new(10.0, 20.0, 120.0).unwrap();
        let shifted = range.shift(5.0, 120.0).unwrap();
        assert_eq!(shifted.start_sec(), 15.0);
        assert_eq!(shifted.end_sec(), 25.0);
    }

    #[test]
    fn test_shift_clamps_at_zero() {
        let range = TimeRange::new(2.0, 12.0, 120.0).unwrap();
        let shifted = range.shift(-5.0, 120.0).unwrap();
        assert_eq!(shifted.start_sec(), 0.0);
        assert_eq!(shifted.end_sec(), 7.0);
    }

    #[test]
    fn test_shift_fails_when_clamping_collapses() {
        let range = TimeRange::new(115.0, 120.0, 120.0).unwrap();
        // Both bounds clamp to 120.0 -> empty.
        assert!(range.shift(10.0, 120.0).is_err());
    }

    #[test]
    fn test_resize_validates_like_new() {
        let range = TimeRange::new(10.0, 20.0, 120.0).unwrap();
        let resized = range.resize(5.0, 30.0, 120.0).unwrap();
        assert_eq!(resized.start_sec(), 5.0);
        assert_eq!(resized.end_sec(), 30.0);
        assert!(range.resize(5.0, 200.0, 120.0).is_err());
    }

    #[test]
    fn test_nudge_shifts_bounds_independently() {
        let range = TimeRange::new(30.0, 45.5, 120.0).unwrap();
        let nudged = range.nudge(-5.0, 0.0, 120.0).unwrap();
        assert_eq!(nudged.start_sec(), 25.0);
        assert_eq!(nudged.end_sec(), 45.5);
    }

    #[test]
    fn test_nudge_zero_is_noop() {
        let range = TimeRange::new(30.0, 45.5, 120.0).unwrap();
        let nudged = range.nudge(0.0, 0.0, 120.0).unwrap();
        assert_eq!(nudged, range);
    }

    #[test]
    fn test_nudge_fails_on_inversion() {
        let range = TimeRange::new(10.0, 20.0, 120.0).unwrap();
        assert!(range.nudge(15.0, 0.0, 120.0).is_err());
    }

    #[test]
    fn test_clamped_to_shortens_range() {
        let range = TimeRange::new(10.0, 60.0, 120.0).unwrap();
        let clamped = range.clamped_to(30.0).unwrap();
        assert_eq!(clamped.start_sec(), 10.0);
        assert_eq!(clamped.end_sec(), 30.0);
    }

    #[test]
    fn test_clamped_to_collapsed_is_none() {
        let range = TimeRange::new(50.0, 60.0, 120.0).unwrap();
        assert!(range.clamped_to(40.0).is_none());
        assert!(range.clamped_to(50.0).is_none());
    }
}

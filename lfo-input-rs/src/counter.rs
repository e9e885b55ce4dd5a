//! Bounded detent counter.
//!
//! [`Counter`] is plain data: the current value, its inclusive range and the
//! wrap flag. The whole struct doubles as the saved-state snapshot used by
//! the menu to hand the encoder back exactly as it found it.

/// Inclusive-range counter that either wraps or saturates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Counter {
    value: i32,
    minimum: i32,
    maximum: i32,
    wrap: bool,
}

impl Counter {
    /// Counter at 0 spanning the full `i32` range, wrapping.
    pub const fn new() -> Self {
        Self {
            value: 0,
            minimum: i32::MIN,
            maximum: i32::MAX,
            wrap: true,
        }
    }

    /// Counter at `minimum` with the given range.
    pub fn with_range(minimum: i32, maximum: i32, wrap: bool) -> Self {
        let mut counter = Self::new();
        counter.set_range(minimum, maximum, wrap);
        counter.reset(minimum);
        counter
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn minimum(&self) -> i32 {
        self.minimum
    }

    pub fn maximum(&self) -> i32 {
        self.maximum
    }

    pub fn wraps(&self) -> bool {
        self.wrap
    }

    /// Replace the range, then clamp the current value into it.
    ///
    /// A `maximum` below `minimum` is raised to `minimum`.
    pub fn set_range(&mut self, minimum: i32, maximum: i32, wrap: bool) {
        let maximum = maximum.max(minimum);
        self.minimum = minimum;
        self.maximum = maximum;
        self.wrap = wrap;
        self.value = self.value.clamp(minimum, maximum);
    }

    /// Set the value, clamped into range.
    pub fn reset(&mut self, value: i32) {
        self.value = value.clamp(self.minimum, self.maximum);
    }

    /// Move by `delta` detents. Returns `true` if the value changed.
    ///
    /// Wrapping moves are taken modulo the range size, so any number of
    /// detents lands where stepping one at a time would.
    pub fn apply(&mut self, delta: i32) -> bool {
        if delta == 0 {
            return false;
        }
        let previous = self.value;
        let minimum = self.minimum as i64;
        let maximum = self.maximum as i64;
        let target = self.value as i64 + delta as i64;

        self.value = if self.wrap {
            let span = maximum - minimum + 1;
            (minimum + (target - minimum).rem_euclid(span)) as i32
        } else {
            target.clamp(minimum, maximum) as i32
        };
        self.value != previous
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_spans_full_range_and_wraps() {
        let mut counter = Counter::default();
        assert_eq!(counter.value(), 0);
        assert!(counter.wraps());

        counter.reset(i32::MAX);
        assert!(counter.apply(1));
        assert_eq!(counter.value(), i32::MIN);
    }

    #[test]
    fn saturates_without_wrap() {
        let mut counter = Counter::with_range(0, 2, false);
        assert!(counter.apply(5));
        assert_eq!(counter.value(), 2);
        // Further turns in the same direction change nothing.
        assert!(!counter.apply(1));
        assert_eq!(counter.value(), 2);

        assert!(counter.apply(-10));
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn wraps_both_directions() {
        let mut counter = Counter::with_range(0, 3, true);
        counter.apply(5);
        assert_eq!(counter.value(), 1);
        counter.apply(-2);
        assert_eq!(counter.value(), 3);
    }

    #[test]
    fn wrap_by_full_span_reports_no_change() {
        let mut counter = Counter::with_range(-1, 1, true);
        assert!(!counter.apply(3));
        assert_eq!(counter.value(), -1);
    }

    #[test]
    fn set_range_clamps_value_and_fixes_inverted_bounds() {
        let mut counter = Counter::new();
        counter.reset(50);
        counter.set_range(0, 10, false);
        assert_eq!(counter.value(), 10);

        counter.set_range(5, 2, false);
        assert_eq!(counter.minimum(), 5);
        assert_eq!(counter.maximum(), 5);
        assert_eq!(counter.value(), 5);
    }

    #[test]
    fn reset_clamps() {
        let mut counter = Counter::with_range(1, 4, true);
        counter.reset(-7);
        assert_eq!(counter.value(), 1);
        counter.reset(9);
        assert_eq!(counter.value(), 4);
    }

    #[test]
    fn zero_delta_is_not_a_change() {
        let mut counter = Counter::with_range(0, 10, false);
        assert!(!counter.apply(0));
    }
}

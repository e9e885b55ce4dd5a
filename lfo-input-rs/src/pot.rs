//! Potentiometer hysteresis filter.
//!
//! ADC readings from a pot jitter by a few counts. [`PotFilter`] only follows
//! a new reading once it leaves a window around the last accepted one. The
//! window is shifted against the last direction of travel, so continuing to
//! turn the same way responds sooner than reversing.

/// Filter tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PotConfig {
    /// Half the width of the direction-dependent Schmitt window.
    pub half_schmitt: i32,
    /// Fixed dead band added on both sides.
    pub deadband: i32,
    /// Raw readings per output step.
    pub divisor: i32,
}

impl Default for PotConfig {
    fn default() -> Self {
        Self {
            half_schmitt: 32,
            deadband: 16,
            divisor: 32,
        }
    }
}

/// Hysteresis filter producing a stepped value from raw ADC readings.
#[derive(Debug, Clone)]
pub struct PotFilter {
    config: PotConfig,
    reading: i32,
    value: i32,
    direction: i32,
}

impl PotFilter {
    /// Start at `initial_reading` with no direction of travel.
    pub fn new(initial_reading: u16, config: PotConfig) -> Self {
        let reading = initial_reading as i32;
        Self {
            value: reading / config.divisor.max(1),
            config,
            reading,
            direction: 0,
        }
    }

    /// Feed a raw reading. Returns `true` if the output value changed.
    pub fn update(&mut self, reading: u16) -> bool {
        let reading = reading as i32;
        let half = self.config.half_schmitt;
        let shift = self.direction * half;
        let lower = self.reading - self.config.deadband - half - shift;
        let upper = self.reading + self.config.deadband + half - shift;

        if reading < lower || reading > upper {
            self.reading = reading;
        }
        self.set_value(self.reading / self.config.divisor.max(1))
    }

    /// Current output value.
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Last accepted raw reading.
    pub fn reading(&self) -> i32 {
        self.reading
    }

    fn set_value(&mut self, value: i32) -> bool {
        if value == self.value {
            return false;
        }
        self.direction = if value > self.value { 1 } else { -1 };
        self.value = value;
        true
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────────

//! Container timestamps.
//!
//! The container stores time as a whole second byte plus a 16-bit
//! fraction in 1/65536ths, giving a resolution of about 15 microseconds
//! over a range of 256 seconds. All entries along the stream carry one of
//! these, non-decreasing.

/// Fixed-point timestamp: `second + fraction / 65536` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp {
    /// Whole seconds.
    pub second: u8,
    /// Fractional part in 1/65536 second units.
    pub fraction: u16,
}

const FRACTION_UNITS: f32 = 65536.0;

impl Timestamp {
    /// Time zero.
    pub const ZERO: Self = Self {
        second: 0,
        fraction: 0,
    };

    /// Largest representable timestamp.
    pub const MAX: Self = Self {
        second: u8::MAX,
        fraction: u16::MAX,
    };

    /// Create a timestamp from its raw parts.
    pub fn new(second: u8, fraction: u16) -> Self {
        Self { second, fraction }
    }

    /// Create a timestamp from seconds, clamped to the representable range.
    pub fn from_seconds(seconds: f32) -> Self {
        if seconds <= 0.0 {
            return Self::ZERO;
        }
        let ticks = (seconds * FRACTION_UNITS) as u64;
        if ticks > u64::from(u32::from(u8::MAX) << 16 | u32::from(u16::MAX)) {
            return Self::MAX;
        }
        Self::from_ticks(ticks as u32)
    }

    /// Convert to seconds.
    pub fn to_seconds(self) -> f32 {
        f32::from(self.second) + f32::from(self.fraction) / FRACTION_UNITS
    }

    /// Whether this timestamp is strictly later than `other`.
    pub fn is_after(self, other: Self) -> bool {
        self.ticks() > other.ticks()
    }

    /// Time elapsed from `earlier` to `self`.
    ///
    /// Saturates at zero when `earlier` is not actually earlier, so a
    /// non-monotonic boundary never yields a negative duration.
    pub fn delta_to(self, earlier: Self) -> Self {
        Self::from_ticks(self.ticks().saturating_sub(earlier.ticks()))
    }

    fn ticks(self) -> u32 {
        u32::from(self.second) << 16 | u32::from(self.fraction)
    }

    fn from_ticks(ticks: u32) -> Self {
        Self {
            second: (ticks >> 16) as u8,
            fraction: (ticks & 0xFFFF) as u16,
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s", self.to_seconds())
    }
}

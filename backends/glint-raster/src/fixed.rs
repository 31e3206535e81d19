//! 26.6 fixed point: pixel coordinates that add up the same everywhere
//!
//! Curve flattening runs on integers so the segments it emits depend only
//! on the input outline, never on the platform's float rounding. Six
//! fractional bits give 1/64 px resolution, finer than any coverage step.

use std::ops::{Add, Neg, Sub};

/// A signed pixel coordinate with 1/64 px resolution
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct F26Dot6(i32);

impl F26Dot6 {
    pub const FRAC_BITS: u32 = 6;

    pub const FRAC_MASK: i32 = (1 << Self::FRAC_BITS) - 1;

    pub const ONE: F26Dot6 = F26Dot6(1 << Self::FRAC_BITS);

    pub const ZERO: F26Dot6 = F26Dot6(0);

    pub const HALF: F26Dot6 = F26Dot6(1 << (Self::FRAC_BITS - 1));

    #[inline]
    pub const fn from_int(x: i32) -> Self {
        F26Dot6(x << Self::FRAC_BITS)
    }

    /// Nearest 1/64, halves away from zero
    #[inline]
    pub fn from_float(x: f32) -> Self {
        F26Dot6((x * 64.0).round() as i32)
    }

    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        F26Dot6(raw)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Floor to a whole pixel
    #[inline]
    pub const fn to_int(self) -> i32 {
        self.0 >> Self::FRAC_BITS
    }

    /// Smallest whole pixel not below this value
    #[inline]
    pub const fn to_int_ceil(self) -> i32 {
        (self.0 + Self::FRAC_MASK) >> Self::FRAC_BITS
    }

    /// Exact: every 26.6 value is representable in f32 within the glyph range
    #[inline]
    pub fn to_float(self) -> f32 {
        self.0 as f32 / 64.0
    }

    #[inline]
    pub const fn abs(self) -> F26Dot6 {
        F26Dot6(self.0.abs())
    }

    /// Midpoint, rounding toward negative infinity
    #[inline]
    pub const fn midpoint(self, other: F26Dot6) -> F26Dot6 {
        F26Dot6(((self.0 as i64 + other.0 as i64) >> 1) as i32)
    }
}

impl Add for F26Dot6 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        F26Dot6(self.0 + other.0)
    }
}

impl Sub for F26Dot6 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        F26Dot6(self.0 - other.0)
    }
}

impl Neg for F26Dot6 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        F26Dot6(-self.0)
    }
}

/// A point on the fixed-point pixel grid, y down
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct FixedPoint {
    pub x: F26Dot6,
    pub y: F26Dot6,
}

impl FixedPoint {
    pub const fn new(x: F26Dot6, y: F26Dot6) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: FixedPoint) -> FixedPoint {
        FixedPoint::new(self.x.midpoint(other.x), self.y.midpoint(other.y))
    }

    /// Manhattan distance, the flatness metric
    pub fn manhattan(self, other: FixedPoint) -> F26Dot6 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn to_f32(self) -> (f32, f32) {
        (self.x.to_float(), self.y.to_float())
    }
}

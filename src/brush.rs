//! Radial-falloff brush stamping.

use egui::{Pos2, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::mask::SelectionMask;

/// Shape of the weight curve from center to rim
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Falloff {
    /// Linear in squared distance, reaching zero at the radius
    #[default]
    Cone,
    /// Cone stretched by 1.44, so the rim keeps some weight
    Soft,
}

impl Falloff {
    pub fn factor(self) -> f32 {
        match self {
            Self::Cone => 1.0,
            Self::Soft => 1.44,
        }
    }
}

/// One dab of the brush
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stamp {
    pub center: Pos2,
    pub radius: f32,
    pub falloff: Falloff,
}

impl Stamp {
    pub fn new(center: Pos2, radius: f32) -> Self {
        Self {
            center,
            radius,
            falloff: Falloff::Cone,
        }
    }

    pub fn with_falloff(mut self, falloff: Falloff) -> Self {
        self.falloff = falloff;
        self
    }

    fn is_drawable(&self) -> bool {
        self.radius.is_finite() && self.radius > 0.0 && self.center.x.is_finite() && self.center.y.is_finite()
    }

    /// Weight this stamp leaves at `(x, y)`, `None` where it leaves nothing
    pub fn weight_at(&self, x: i32, y: i32) -> Option<u8> {
        if !self.is_drawable() {
            return None;
        }
        let dx = x as f32 - self.center.x;
        let dy = y as f32 - self.center.y;
        let normalize = 255.0 / (self.radius * self.radius * self.falloff.factor());
        let weight = 255.0 - (dx * dx + dy * dy) * normalize;
        if weight > 0.0 {
            Some((weight as i32).clamp(1, 255) as u8)
        } else {
            None
        }
    }
}

/// Rasterizes `stamp` into `mask` and returns how many samples it produced.
///
/// Visits every integer coordinate within `radius` of the center on both
/// axes. Samples are max-blended with whatever the mask already holds.
pub fn stamp(mask: &mut SelectionMask, stamp: &Stamp) -> usize {
    if !stamp.is_drawable() {
        return 0;
    }
    let Pos2 { x: cx, y: cy } = stamp.center;
    let min_x = (cx - stamp.radius).ceil() as i32;
    let max_x = (cx + stamp.radius).floor() as i32;
    let min_y = (cy - stamp.radius).ceil() as i32;
    let max_y = (cy + stamp.radius).floor() as i32;

    let mut count = 0;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if let Some(weight) = stamp.weight_at(x, y) {
                mask.add(x, y, weight);
                count += 1;
            }
        }
    }
    count
}

/// Source of the per-update jitter applied to spray stamps
pub trait ScatterSource {
    /// An offset uniformly drawn from `[-scatter, scatter)` on each axis
    fn offset(&mut self, scatter: f32) -> Vec2;
}

/// Jitter backed by a seedable generator
#[derive(Debug, Clone)]
pub struct RandomScatter<R = StdRng> {
    rng: R,
}

impl RandomScatter<StdRng> {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomScatter<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> ScatterSource for RandomScatter<R> {
    fn offset(&mut self, scatter: f32) -> Vec2 {
        if scatter.is_nan() || scatter <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(
            self.rng.gen_range(-scatter..scatter),
            self.rng.gen_range(-scatter..scatter),
        )
    }
}

/// Always returns the same offset
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedScatter(pub Vec2);

impl ScatterSource for FixedScatter {
    fn offset(&mut self, scatter: f32) -> Vec2 {
        self.0.clamp(Vec2::splat(-scatter.abs()), Vec2::splat(scatter.abs()))
    }
}

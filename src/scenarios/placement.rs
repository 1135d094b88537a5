//! Initial-position generators for episode resets.
//!
//! Every variant is pure given its inputs; the uniform variant draws from the
//! crate RNG stream so resets stay reproducible under a seed.

use crate::core::{Result, SimError};
use crate::utils::rng::RngStream;
use crate::world::Vec2;
use rand::distributions::{Distribution, Uniform};

/// How a scenario lays out its agents at reset.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Placement {
    /// A literal coordinate table, consumed front to back.
    Fixed(Vec<Vec2>),
    /// A size x size lattice centered on a point.
    Grid { center: Vec2, size: usize, spacing: f32 },
    /// Equally spaced points on a circle.
    Circle { center: Vec2, radius: f32 },
    /// I.i.d. uniform positions in [-range, range]^2.
    Uniform { range: f32 },
}

impl Placement {
    /// Check that this placement can supply `n` positions. Scenarios call
    /// this from `make_world` so an undersized table or grid surfaces as a
    /// config error instead of a degenerate reset.
    pub fn validate(&self, n: usize) -> Result<()> {
        match self {
            Placement::Fixed(table) if table.len() < n => Err(SimError::InvalidConfig(format!(
                "fixed placement has {} positions but {} agents",
                table.len(),
                n
            ))),
            Placement::Grid { size, .. } if size * size < n => {
                Err(SimError::InvalidConfig(format!(
                    "{size}x{size} grid holds {} positions but {} agents",
                    size * size,
                    n
                )))
            }
            _ => Ok(()),
        }
    }

    /// Produce `n` positions, drawing from `rng` only for the uniform variant.
    pub fn positions(&self, n: usize, rng: &mut RngStream) -> Result<Vec<Vec2>> {
        self.validate(n)?;
        match self {
            Placement::Fixed(table) => Ok(table[..n].to_vec()),
            Placement::Grid { center, size, spacing } => {
                Ok(grid(*center, *size, *spacing)[..n].to_vec())
            }
            Placement::Circle { center, radius } => Ok(circle(*center, *radius, n)),
            Placement::Uniform { range } => Ok(uniform(rng, n, *range)),
        }
    }
}

/// A size x size lattice of points centered on `center`, `spacing` apart.
/// Odd sizes center a point on `center`; even sizes straddle it.
pub fn grid(center: Vec2, size: usize, spacing: f32) -> Vec<Vec2> {
    let half = (size / 2) as i32;
    let lo = -half;
    let hi = if size % 2 == 0 { half - 1 } else { half };
    let mut points = Vec::with_capacity(size * size);
    for i in lo..=hi {
        for j in lo..=hi {
            points.push(Vec2::new(
                center.x + i as f32 * spacing,
                center.y + j as f32 * spacing,
            ));
        }
    }
    points
}

/// `n` points at equal angles on a circle, starting at angle 0.
pub fn circle(center: Vec2, radius: f32, n: usize) -> Vec<Vec2> {
    (0..n)
        .map(|k| {
            let angle = 2.0 * std::f32::consts::PI * k as f32 / n as f32;
            Vec2::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

/// `n` i.i.d. uniform positions in [-range, range]^2.
pub fn uniform(rng: &mut RngStream, n: usize, range: f32) -> Vec<Vec2> {
    let dist = Uniform::new_inclusive(-range, range);
    (0..n)
        .map(|_| Vec2::new(dist.sample(rng), dist.sample(rng)))
        .collect()
}

/// Cross formation: a center point plus four points `arm` away on each axis.
/// Yields exactly 5 positions, leader first.
pub fn cross(center: Vec2, arm: f32) -> Vec<Vec2> {
    vec![
        center,
        Vec2::new(center.x - arm, center.y),
        Vec2::new(center.x + arm, center.y),
        Vec2::new(center.x, center.y + arm),
        Vec2::new(center.x, center.y - arm),
    ]
}

//! Obstacle layout generation by bounded rejection sampling
//!
//! Obstacles are placed one at a time. Each candidate footprint is drawn from
//! the shared random stream and tested against every obstacle accepted so
//! far; a candidate touching or overlapping any of them is rejected and
//! redrawn, up to [`MAX_PLACEMENT_ATTEMPTS`] times per obstacle.
//!
//! Draw order per attempt is `x_min`, `x_max`, `y_min`, `y_max`, followed by
//! a single height draw once the candidate is accepted. Reordering these
//! draws changes every layout produced from a given seed.

use crate::geometry::{BoxBounds, Obstacle};
use crate::{Result, ScenarioError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Lane along the low-x edge of the area that is kept free of obstacles
pub const X_INSET: f64 = 30.0;

/// Candidate draws allowed per obstacle before the layout is abandoned
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 100;

pub const MIN_OBSTACLE_HEIGHT: f64 = 1.6;
pub const MAX_OBSTACLE_HEIGHT: f64 = 40.0;

/// Source of uniformly distributed samples.
///
/// Implementations return a value in `[min, max)`; when `min == max` the
/// bound itself is returned.
pub trait UniformSource {
    fn uniform(&mut self, min: f64, max: f64) -> f64;
}

/// The single sequential random stream shared by all scenario components
#[derive(Clone, Debug)]
pub struct SeededStream {
    rng: StdRng,
}

impl SeededStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl UniformSource for SeededStream {
    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        let unit: f64 = self.rng.gen();
        min + (max - min) * unit
    }
}

/// Parameters of one layout run
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutRequest {
    pub x_area: f64,
    pub y_area: f64,
    /// Largest extent a footprint may have along either axis
    pub max_size: f64,
    pub count: usize,
    pub max_attempts: u32,
}

impl LayoutRequest {
    pub fn new(x_area: f64, y_area: f64, max_size: f64, count: usize) -> Self {
        Self {
            x_area,
            y_area,
            max_size,
            count,
            max_attempts: MAX_PLACEMENT_ATTEMPTS,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let finite =
            self.x_area.is_finite() && self.y_area.is_finite() && self.max_size.is_finite();
        if !finite {
            return Err(ScenarioError::InvalidConfig(
                "layout extents must be finite".to_string(),
            ));
        }
        if self.x_area < X_INSET {
            return Err(ScenarioError::InvalidConfig(format!(
                "x area {} is narrower than the {} unit obstacle-free lane",
                self.x_area, X_INSET
            )));
        }
        if self.y_area < 0.0 || self.max_size < 0.0 {
            return Err(ScenarioError::InvalidConfig(format!(
                "y area ({}) and max obstacle size ({}) must be non-negative",
                self.y_area, self.max_size
            )));
        }
        if self.max_attempts == 0 {
            return Err(ScenarioError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Places non-overlapping obstacles inside the configured area
#[derive(Clone, Debug)]
pub struct ObstacleLayoutGenerator {
    request: LayoutRequest,
}

impl ObstacleLayoutGenerator {
    pub fn new(request: LayoutRequest) -> Result<Self> {
        request.validate()?;
        Ok(Self { request })
    }

    pub fn request(&self) -> &LayoutRequest {
        &self.request
    }

    /// Draw one candidate footprint
    fn draw_candidate<R: UniformSource + ?Sized>(&self, rng: &mut R) -> BoxBounds {
        let x_min = rng.uniform(X_INSET, self.request.x_area);
        let x_max = rng.uniform(x_min, x_min + self.request.max_size);
        let y_min = rng.uniform(0.0, self.request.y_area);
        let y_max = rng.uniform(y_min, y_min + self.request.max_size);
        BoxBounds::footprint(x_min, x_max, y_min, y_max)
    }

    /// Place the obstacle that follows `accepted`.
    ///
    /// Pure with respect to the layout: nothing is recorded, the caller
    /// decides what to do with the returned obstacle.
    pub fn place_next<R: UniformSource + ?Sized>(
        &self,
        accepted: &[Obstacle],
        rng: &mut R,
    ) -> Result<Obstacle> {
        let index = accepted.len();
        for attempt in 1..=self.request.max_attempts {
            let candidate = self.draw_candidate(rng);
            if candidate.overlaps_any(accepted.iter().map(|o| &o.bounds)) {
                continue;
            }

            let height = rng.uniform(MIN_OBSTACLE_HEIGHT, MAX_OBSTACLE_HEIGHT);
            debug!(
                "Obstacle {} in coordinates ({}, {}) and ({}, {}) height {} after {} attempts",
                index,
                candidate.x_min,
                candidate.y_min,
                candidate.x_max,
                candidate.y_max,
                height,
                attempt
            );
            return Ok(Obstacle::new(candidate, height));
        }

        Err(ScenarioError::LayoutInfeasible {
            index,
            attempts: self.request.max_attempts,
        })
    }

    /// Place all requested obstacles in order
    pub fn generate<R: UniformSource + ?Sized>(&self, rng: &mut R) -> Result<Vec<Obstacle>> {
        let mut accepted = Vec::new();
        for _ in 0..self.request.count {
            let obstacle = self.place_next(&accepted, rng)?;
            accepted.push(obstacle);
        }

        info!(
            "Placed {} obstacles in {}x{} area",
            accepted.len(),
            self.request.x_area,
            self.request.y_area
        );
        Ok(accepted)
    }
}

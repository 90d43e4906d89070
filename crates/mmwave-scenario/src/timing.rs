//! Run duration and UE motion schedule
//!
//! The UE stays still while the report-table filter settles, drives its
//! track at constant speed, then stops one second before the run ends.

use crate::{Result, ScenarioError};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Idle time kept between the UE stopping and the end of the run
pub const SETTLE_TAIL_S: f64 = 1.0;

/// Velocity change applied to the UE at a given time
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionEvent {
    pub at_s: f64,
    /// Velocity along the x axis, m/s
    pub velocity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimingPlan {
    pub transient_duration_s: f64,
    pub total_sim_time_s: f64,
    pub movement_start_s: f64,
    pub movement_stop_s: f64,
    pub start_motion: MotionEvent,
    pub stop_motion: MotionEvent,
}

/// The UE has to move forward along its track at a positive, finite speed
pub fn check_motion_range(initial_position: f64, final_position: f64, speed: f64) -> Result<()> {
    let valid = speed.is_finite()
        && speed > 0.0
        && initial_position.is_finite()
        && final_position.is_finite()
        && final_position > initial_position;
    if !valid {
        return Err(ScenarioError::InvalidMotionRange {
            initial: initial_position,
            final_position,
            speed,
        });
    }
    Ok(())
}

impl TimingPlan {
    pub fn plan(
        transient_duration_s: f64,
        initial_position: f64,
        final_position: f64,
        speed: f64,
    ) -> Result<Self> {
        check_motion_range(initial_position, final_position, speed)?;
        if !(transient_duration_s.is_finite() && transient_duration_s >= 0.0) {
            return Err(ScenarioError::InvalidMotionRange {
                initial: initial_position,
                final_position,
                speed,
            });
        }

        let travel_s = (final_position - initial_position) / speed;
        let total_sim_time_s = transient_duration_s + travel_s + SETTLE_TAIL_S;
        let movement_stop_s = total_sim_time_s - SETTLE_TAIL_S;

        info!(
            "transientDuration {} simTime {} (UE {} -> {} at {} m/s)",
            transient_duration_s, total_sim_time_s, initial_position, final_position, speed
        );

        Ok(Self {
            transient_duration_s,
            total_sim_time_s,
            movement_start_s: transient_duration_s,
            movement_stop_s,
            start_motion: MotionEvent {
                at_s: transient_duration_s,
                velocity: speed,
            },
            stop_motion: MotionEvent {
                at_s: movement_stop_s,
                velocity: 0.0,
            },
        })
    }

    /// Both velocity changes in schedule order
    pub fn motion_events(&self) -> [MotionEvent; 2] {
        [self.start_motion, self.stop_motion]
    }
}

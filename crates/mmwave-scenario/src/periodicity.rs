//! Report table periodicity and the filter transient it implies

use crate::{Result, ScenarioError};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Periodicity of the SINR report tables, in microseconds.
///
/// Only three values are supported, each tied to the number of samples the
/// filter needs before its output is trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ReportPeriodicity {
    Us1600,
    Us12800,
    Us25600,
}

impl ReportPeriodicity {
    pub const ALL: [ReportPeriodicity; 3] = [
        ReportPeriodicity::Us1600,
        ReportPeriodicity::Us12800,
        ReportPeriodicity::Us25600,
    ];

    pub fn from_micros(value: u32) -> Result<Self> {
        match value {
            1600 => Ok(Self::Us1600),
            12800 => Ok(Self::Us12800),
            25600 => Ok(Self::Us25600),
            other => Err(ScenarioError::UnrecognizedConfiguration(other)),
        }
    }

    pub fn as_micros(self) -> u32 {
        match self {
            Self::Us1600 => 1600,
            Self::Us12800 => 12800,
            Self::Us25600 => 25600,
        }
    }

    /// Samples discarded by the filter at the start of the run
    pub fn window_length(self) -> u32 {
        match self {
            Self::Us1600 => 150,
            Self::Us12800 => 100,
            Self::Us25600 => 50,
        }
    }

    pub fn transient_window(self) -> TransientWindow {
        let window_length = self.window_length();
        let vector_transient_us = u64::from(window_length) * u64::from(self.as_micros());
        let window = TransientWindow {
            periodicity: self,
            window_length,
            vector_transient_us,
            transient_duration_s: vector_transient_us as f64 / 1_000_000.0,
        };
        debug!(
            "Periodicity {} us: window {} samples, transient {} s",
            self.as_micros(),
            window.window_length,
            window.transient_duration_s
        );
        window
    }
}

impl TryFrom<u32> for ReportPeriodicity {
    type Error = ScenarioError;

    fn try_from(value: u32) -> Result<Self> {
        Self::from_micros(value)
    }
}

impl From<ReportPeriodicity> for u32 {
    fn from(value: ReportPeriodicity) -> Self {
        value.as_micros()
    }
}

impl fmt::Display for ReportPeriodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.as_micros())
    }
}

/// Window length and transient derived from a periodicity
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransientWindow {
    pub periodicity: ReportPeriodicity,
    pub window_length: u32,
    /// `window_length * periodicity`, in microseconds
    pub vector_transient_us: u64,
    pub transient_duration_s: f64,
}

/// Resolve a raw periodicity value into its transient window
pub fn resolve(periodicity_us: u32) -> Result<TransientWindow> {
    Ok(ReportPeriodicity::from_micros(periodicity_us)?.transient_window())
}

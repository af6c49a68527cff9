//! `TemporalMetadata`: the `{duration, start, end}` triple attached to every
//! stamped primitive in a plan.

use crate::error::PlannerError;
use crate::temporal::duration::{duration_to_seconds, format_duration, DurationInput};
use crate::temporal::instant::{add_duration, format_instant, parse_instant};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed under two derivation laws:
/// (a) `start` and `duration` set ⇒ `end = start + duration`;
/// (b) `start` and `end` set ⇒ `duration = end - start`, which must be ≥ 0.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemporalMetadata {
    duration_secs: Option<f64>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

/// Present-fields-only wire representation, matching `to_dict`/`from_dict`
/// in the original Python implementation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TemporalMetadataDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

impl TemporalMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(duration: impl Into<DurationInput>) -> Result<Self, PlannerError> {
        let mut tm = Self::new();
        tm.set_duration(duration)?;
        Ok(tm)
    }

    pub fn set_duration(&mut self, duration: impl Into<DurationInput>) -> Result<(), PlannerError> {
        self.duration_secs = Some(duration_to_seconds(&duration.into())?);
        Ok(())
    }

    pub fn set_start_time(&mut self, start: DateTime<Utc>) {
        self.start = Some(start);
    }

    pub fn set_start_time_str(&mut self, start: &str) -> Result<(), PlannerError> {
        self.start = Some(parse_instant(start)?);
        Ok(())
    }

    pub fn set_end_time(&mut self, end: DateTime<Utc>) {
        self.end = Some(end);
    }

    pub fn set_end_time_str(&mut self, end: &str) -> Result<(), PlannerError> {
        self.end = Some(parse_instant(end)?);
        Ok(())
    }

    pub fn duration_seconds(&self) -> Option<f64> {
        self.duration_secs
    }

    pub fn duration(&self) -> Option<String> {
        self.duration_secs.map(format_duration)
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    /// `end := start + duration`.
    pub fn derive_end(&mut self) -> Result<(), PlannerError> {
        let start = self
            .start
            .ok_or_else(|| PlannerError::TemporalInvariant("derive_end requires start_time".into()))?;
        let dur = self
            .duration_secs
            .ok_or_else(|| PlannerError::TemporalInvariant("derive_end requires duration".into()))?;
        self.end = Some(add_duration(start, dur)?);
        Ok(())
    }

    /// `duration := end - start`; fails if negative.
    pub fn derive_duration(&mut self) -> Result<(), PlannerError> {
        let start = self
            .start
            .ok_or_else(|| PlannerError::TemporalInvariant("derive_duration requires start_time".into()))?;
        let end = self
            .end
            .ok_or_else(|| PlannerError::TemporalInvariant("derive_duration requires end_time".into()))?;
        let secs = (end - start).num_milliseconds() as f64 / 1000.0;
        if secs < 0.0 {
            return Err(PlannerError::TemporalInvariant(format!(
                "derived duration is negative: start={start}, end={end}"
            )));
        }
        self.duration_secs = Some(secs);
        Ok(())
    }

    pub fn to_dto(&self) -> TemporalMetadataDto {
        TemporalMetadataDto {
            duration: self.duration(),
            start_time: self.start.as_ref().map(format_instant),
            end_time: self.end.as_ref().map(format_instant),
        }
    }

    pub fn from_dto(dto: &TemporalMetadataDto) -> Result<Self, PlannerError> {
        let mut tm = Self::new();
        if let Some(d) = &dto.duration {
            tm.set_duration(d.as_str())?;
        }
        if let Some(s) = &dto.start_time {
            tm.set_start_time_str(s)?;
        }
        if let Some(e) = &dto.end_time {
            tm.set_end_time_str(e)?;
        }
        Ok(tm)
    }
}

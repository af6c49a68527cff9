//! Duration parsing, instant arithmetic, per-action temporal stamping, and
//! the Simple Temporal Network used to check the consistency of stamped
//! plans.

pub mod duration;
pub mod instant;
pub mod metadata;
pub mod stn;

pub use duration::{duration_to_seconds, format_duration, parse_duration, DurationInput};
pub use instant::{add_duration, format_instant, parse_instant};
pub use metadata::{TemporalMetadata, TemporalMetadataDto};
pub use stn::Stn;

use thiserror::Error;

/// Hard failures surfaced to callers of [`crate::engine::Planner`].
///
/// Soft failures (a precondition unmet, a method that does not apply) never
/// reach this type — they drive retraction internally and are only ever
/// observed, from the outside, as [`PlannerError::PlanNotFound`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlannerError {
    #[error("no plan found for the given task list")]
    PlanNotFound,

    #[error("unknown task: {0}")]
    UnknownTask(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("invalid instant: {0}")]
    InvalidInstant(String),

    #[error("temporal invariant violated: {0}")]
    TemporalInvariant(String),

    #[error("invalid STN constraint {from} -> {to}: min ({min}) > max ({max})")]
    InvalidConstraint { from: String, to: String, min: f64, max: f64 },
}

//! Action registry: primitive task name -> effect function, declared
//! duration, and optional cost/probability.

use crate::error::PlannerError;
use crate::state::State;
use crate::temporal::duration::{duration_to_seconds, DurationInput};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// `(state, args) -> Option<()>`. Mutates `state` in place on success;
/// returns `None` (leaving the caller's clone to be discarded) when a
/// precondition fails.
pub type ActionFn = Arc<dyn Fn(&mut State, &[Value]) -> Option<()> + Send + Sync>;

struct ActionEntry {
    func: ActionFn,
    cost: f64,
    success_prob: f64,
    failure_prob: f64,
    duration_secs: Option<f64>,
}

/// Keeps the action map, cost map, and probability map in lockstep: every
/// declared name has an entry in all three, regardless of how it was
/// declared.
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, ActionEntry>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a batch of plain (non-temporal) actions. Cost defaults to
    /// `1.0`, success/failure probability to `[1.0, 0.0]`.
    pub fn declare(&mut self, fns: Vec<(&str, ActionFn)>) {
        for (name, func) in fns {
            self.actions.insert(
                name.to_string(),
                ActionEntry {
                    func,
                    cost: 1.0,
                    success_prob: 1.0,
                    failure_prob: 0.0,
                    duration_secs: None,
                },
            );
        }
    }

    /// Declares a batch of temporal actions: `(name, fn, duration)`.
    /// Registers each action if not already present and stores its
    /// duration. Fails immediately if the duration does not parse.
    pub fn declare_temporal(
        &mut self,
        entries: Vec<(&str, ActionFn, impl Into<DurationInput>)>,
    ) -> Result<(), PlannerError> {
        for (name, func, duration) in entries {
            let secs = duration_to_seconds(&duration.into())?;
            if secs < 0.0 {
                return Err(PlannerError::InvalidDuration(format!(
                    "duration for action '{name}' must be non-negative, got {secs}"
                )));
            }
            self.actions
                .entry(name.to_string())
                .and_modify(|e| e.duration_secs = Some(secs))
                .or_insert(ActionEntry {
                    func,
                    cost: 1.0,
                    success_prob: 1.0,
                    failure_prob: 0.0,
                    duration_secs: Some(secs),
                });
        }
        Ok(())
    }

    pub fn set_cost(&mut self, name: &str, cost: f64) {
        if let Some(e) = self.actions.get_mut(name) {
            e.cost = cost;
        }
    }

    pub fn set_probabilities(&mut self, name: &str, success: f64, failure: f64) {
        if let Some(e) = self.actions.get_mut(name) {
            e.success_prob = success;
            e.failure_prob = failure;
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ActionFn> {
        self.actions.get(name).map(|e| &e.func)
    }

    pub fn get_duration(&self, name: &str) -> Option<f64> {
        self.actions.get(name).and_then(|e| e.duration_secs)
    }

    pub fn has_temporal(&self, name: &str) -> bool {
        self.actions.get(name).map(|e| e.duration_secs.is_some()).unwrap_or(false)
    }

    pub fn cost(&self, name: &str) -> Option<f64> {
        self.actions.get(name).map(|e| e.cost)
    }

    pub fn probabilities(&self, name: &str) -> Option<(f64, f64)> {
        self.actions.get(name).map(|e| (e.success_prob, e.failure_prob))
    }
}

//! Method registry: compound task name -> ordered list of candidate
//! decomposers, plus multigoal splitting.

use crate::state::State;
use crate::task::{Multigoal, Task};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// `(state, args) -> Option<Vec<Task>>`. `None` (or, where semantically
/// convenient, an empty list) means the method does not apply; the engine
/// advances to the next declared alternative for the same task name.
pub type MethodFn = Arc<dyn Fn(&State, &[Value]) -> Option<Vec<Task>> + Send + Sync>;

/// `(state, multigoal) -> Option<Vec<Task>>`.
pub type MultigoalMethodFn = Arc<dyn Fn(&State, &Multigoal) -> Option<Vec<Task>> + Send + Sync>;

#[derive(Default)]
pub struct MethodRegistry {
    task_methods: HashMap<String, Vec<MethodFn>>,
    multigoal_methods: HashMap<String, Vec<MultigoalMethodFn>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the ordered list of candidate methods for a compound task.
    /// Order is the preference order explored during search.
    pub fn declare_task_methods(&mut self, task_name: &str, methods: Vec<MethodFn>) {
        self.task_methods.insert(task_name.to_string(), methods);
    }

    pub fn declare_multigoal_methods(&mut self, goal_name: &str, methods: Vec<MultigoalMethodFn>) {
        self.multigoal_methods.insert(goal_name.to_string(), methods);
    }

    pub fn contains_task(&self, task_name: &str) -> bool {
        self.task_methods.contains_key(task_name)
    }

    pub fn methods_for(&self, task_name: &str) -> Option<&[MethodFn]> {
        self.task_methods.get(task_name).map(|v| v.as_slice())
    }

    pub fn multigoal_methods_for(&self, goal_name: &str) -> Option<&[MultigoalMethodFn]> {
        self.multigoal_methods.get(goal_name).map(|v| v.as_slice())
    }

    /// Falls back to this when a multigoal name has no declared methods:
    /// emit one compound task per binding not yet satisfied by `state`, in
    /// declared order. An already-satisfied multigoal reduces to the empty
    /// plan.
    pub fn default_multigoal_split(state: &State, goal: &Multigoal) -> Vec<Task> {
        let mut tasks = Vec::new();
        for (attr, key, desired) in &goal.bindings {
            let satisfied = state
                .attr(attr)
                .and_then(|a| a.symbols())
                .and_then(|m| m.get(key))
                .map(|v| Value::Str(v.clone()) == *desired)
                .unwrap_or(false);
            if !satisfied {
                tasks.push(Task::invocation(
                    format!("achieve_{attr}"),
                    vec![Value::Str(key.clone()), desired.clone()],
                ));
            }
        }
        tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AttrValue;
    use crate::temporal::parse_instant;
    use std::collections::HashMap as Map;

    #[test]
    fn declares_methods_in_order() {
        let mut reg = MethodRegistry::new();
        let m1: MethodFn = Arc::new(|_, _| None);
        let m2: MethodFn = Arc::new(|_, _| Some(vec![]));
        reg.declare_task_methods("travel", vec![m1, m2]);
        assert_eq!(reg.methods_for("travel").unwrap().len(), 2);
    }

    #[test]
    fn default_split_skips_satisfied_bindings() {
        let mut state = State::new("s", parse_instant("2025-01-01T00:00:00Z").unwrap());
        let mut loc = Map::new();
        loc.insert("alice".to_string(), "park".to_string());
        state.set_attr("loc", AttrValue::Symbols(loc));

        let goal = Multigoal::new("at_park")
            .with_binding("loc", "alice", "park")
            .with_binding("loc", "bob", "park");

        let tasks = MethodRegistry::default_multigoal_split(&state, &goal);
        assert_eq!(tasks.len(), 1);
        if let Task::Invocation(inv) = &tasks[0] {
            assert_eq!(inv.args[0], Value::Str("bob".to_string()));
        } else {
            panic!("expected invocation");
        }
    }
}

//! World state: an open bag of user-declared attributes plus the wall-clock
//! cursor and executed timeline that the temporal layer rides on.

use crate::task::TaskInvocation;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Closed sum type over the attribute shapes the core actually needs:
/// identifier -> identifier, identifier -> bool, identifier -> number,
/// identifier -> optional identifier, and a nested identifier -> identifier
/// -> bool table. Domain code picks whichever shape fits a given attribute
/// name (e.g. `loc` is `Symbols`, `cash` is `Numbers`).
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Symbols(HashMap<String, String>),
    Bools(HashMap<String, bool>),
    Numbers(HashMap<String, f64>),
    OptSymbols(HashMap<String, Option<String>>),
    Nested(HashMap<String, HashMap<String, bool>>),
}

impl AttrValue {
    pub fn symbols(&self) -> Option<&HashMap<String, String>> {
        match self {
            AttrValue::Symbols(m) => Some(m),
            _ => None,
        }
    }

    pub fn symbols_mut(&mut self) -> Option<&mut HashMap<String, String>> {
        match self {
            AttrValue::Symbols(m) => Some(m),
            _ => None,
        }
    }

    pub fn numbers(&self) -> Option<&HashMap<String, f64>> {
        match self {
            AttrValue::Numbers(m) => Some(m),
            _ => None,
        }
    }

    pub fn numbers_mut(&mut self) -> Option<&mut HashMap<String, f64>> {
        match self {
            AttrValue::Numbers(m) => Some(m),
            _ => None,
        }
    }

    pub fn bools(&self) -> Option<&HashMap<String, bool>> {
        match self {
            AttrValue::Bools(m) => Some(m),
            _ => None,
        }
    }

    pub fn bools_mut(&mut self) -> Option<&mut HashMap<String, bool>> {
        match self {
            AttrValue::Bools(m) => Some(m),
            _ => None,
        }
    }

    pub fn opt_symbols(&self) -> Option<&HashMap<String, Option<String>>> {
        match self {
            AttrValue::OptSymbols(m) => Some(m),
            _ => None,
        }
    }

    pub fn opt_symbols_mut(&mut self) -> Option<&mut HashMap<String, Option<String>>> {
        match self {
            AttrValue::OptSymbols(m) => Some(m),
            _ => None,
        }
    }

    pub fn nested(&self) -> Option<&HashMap<String, HashMap<String, bool>>> {
        match self {
            AttrValue::Nested(m) => Some(m),
            _ => None,
        }
    }

    pub fn nested_mut(&mut self) -> Option<&mut HashMap<String, HashMap<String, bool>>> {
        match self {
            AttrValue::Nested(m) => Some(m),
            _ => None,
        }
    }
}

/// One committed entry on a state's executed timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub action: TaskInvocation,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A named bag of attributes plus the planner's wall-clock cursor.
///
/// `Clone` is a full deep copy: every field is owned data with no interior
/// mutability or shared pointers, so the derived impl already satisfies the
/// "independent clone" contract the planner relies on when it speculatively
/// applies an action and discards the clone on failure.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub name: String,
    attrs: HashMap<String, AttrValue>,
    current_time: DateTime<Utc>,
    timeline: Vec<TimelineEntry>,
}

impl State {
    pub fn new(name: impl Into<String>, initial_time: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            attrs: HashMap::new(),
            current_time: initial_time,
            timeline: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    pub fn attr_mut(&mut self, name: &str) -> Option<&mut AttrValue> {
        self.attrs.get_mut(name)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: AttrValue) {
        self.attrs.insert(name.into(), value);
    }

    pub fn get_current_time(&self) -> DateTime<Utc> {
        self.current_time
    }

    /// Advances the cursor to an explicit instant. Fails if it would move
    /// backward.
    pub fn set_current_time(&mut self, time: DateTime<Utc>) -> Result<(), crate::error::PlannerError> {
        if time < self.current_time {
            return Err(crate::error::PlannerError::TemporalInvariant(format!(
                "cursor would move backward: {} -> {}",
                self.current_time, time
            )));
        }
        self.current_time = time;
        Ok(())
    }

    /// Moves the cursor forward by a non-negative number of seconds.
    pub fn advance_time(&mut self, seconds: f64) -> Result<(), crate::error::PlannerError> {
        if seconds < 0.0 {
            return Err(crate::error::PlannerError::TemporalInvariant(format!(
                "advance_time requires a non-negative duration, got {seconds}"
            )));
        }
        let millis = (seconds * 1000.0).round() as i64;
        self.current_time += chrono::Duration::milliseconds(millis);
        Ok(())
    }

    pub fn add_to_timeline(&mut self, action: TaskInvocation, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.timeline.push(TimelineEntry { action, start, end });
    }

    pub fn get_timeline(&self) -> &[TimelineEntry] {
        &self.timeline
    }

    pub fn clear_timeline(&mut self) {
        self.timeline.clear();
    }

    /// Deep independent clone; an alias over `Clone` since `State` owns all
    /// of its data.
    pub fn copy(&self) -> State {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::parse_instant;

    fn t0() -> DateTime<Utc> {
        parse_instant("2025-01-01T10:00:00Z").unwrap()
    }

    #[test]
    fn copy_is_independent_of_original() {
        let mut s = State::new("s", t0());
        let mut loc = HashMap::new();
        loc.insert("alice".to_string(), "home_a".to_string());
        s.set_attr("loc", AttrValue::Symbols(loc));

        let mut copy = s.copy();
        copy.attr_mut("loc").unwrap().symbols_mut().unwrap().insert("alice".to_string(), "park".to_string());

        assert_eq!(
            s.attr("loc").unwrap().symbols().unwrap().get("alice").map(String::as_str),
            Some("home_a")
        );
        assert_eq!(
            copy.attr("loc").unwrap().symbols().unwrap().get("alice").map(String::as_str),
            Some("park")
        );
    }

    #[test]
    fn advance_time_moves_cursor_forward() {
        let mut s = State::new("s", t0());
        s.advance_time(300.0).unwrap();
        assert_eq!(s.get_current_time(), parse_instant("2025-01-01T10:05:00Z").unwrap());
    }

    #[test]
    fn set_current_time_rejects_backward_move() {
        let mut s = State::new("s", t0());
        let earlier = parse_instant("2025-01-01T09:00:00Z").unwrap();
        assert!(s.set_current_time(earlier).is_err());
    }

    #[test]
    fn timeline_records_committed_actions() {
        let mut s = State::new("s", t0());
        let action = TaskInvocation::new("a_walk", vec!["alice".into(), "home_a".into(), "park".into()]);
        s.add_to_timeline(action.clone(), t0(), t0());
        assert_eq!(s.get_timeline().len(), 1);
        assert_eq!(s.get_timeline()[0].action, action);
        s.clear_timeline();
        assert!(s.get_timeline().is_empty());
    }
}

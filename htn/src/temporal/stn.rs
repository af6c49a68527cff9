//! Simple Temporal Network: time points connected by `(min, max)` distance
//! constraints, with consistency decided by Floyd-Warshall all-pairs
//! shortest paths.

use crate::error::PlannerError;
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Stn {
    points: Vec<String>,
    index: HashMap<String, usize>,
    constraints: HashMap<(usize, usize), (f64, f64)>,
    distances: RefCell<Option<Vec<Vec<f64>>>>,
}

impl Stn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_time_point(&mut self, point: &str) -> usize {
        if let Some(&i) = self.index.get(point) {
            return i;
        }
        let i = self.points.len();
        self.points.push(point.to_string());
        self.index.insert(point.to_string(), i);
        self.invalidate();
        i
    }

    pub fn time_points(&self) -> &[String] {
        &self.points
    }

    /// Adds (or replaces) the constraint `min <= t(to) - t(from) <= max`.
    pub fn add_constraint(&mut self, from: &str, to: &str, min: f64, max: f64) -> Result<(), PlannerError> {
        if min > max {
            return Err(PlannerError::InvalidConstraint {
                from: from.to_string(),
                to: to.to_string(),
                min,
                max,
            });
        }
        let u = self.add_time_point(from);
        let v = self.add_time_point(to);
        self.constraints.insert((u, v), (min, max));
        self.invalidate();
        Ok(())
    }

    fn invalidate(&mut self) {
        *self.distances.borrow_mut() = None;
    }

    fn build_distance_matrix(&self) -> Vec<Vec<f64>> {
        let n = self.points.len();
        let mut dist = vec![vec![f64::INFINITY; n]; n];
        for i in 0..n {
            dist[i][i] = 0.0;
        }
        for (&(u, v), &(min, max)) in &self.constraints {
            if max < dist[u][v] {
                dist[u][v] = max;
            }
            if -min < dist[v][u] {
                dist[v][u] = -min;
            }
        }
        for k in 0..n {
            for i in 0..n {
                if dist[i][k].is_infinite() {
                    continue;
                }
                for j in 0..n {
                    if dist[k][j].is_infinite() {
                        continue;
                    }
                    let through = dist[i][k] + dist[k][j];
                    if through < dist[i][j] {
                        dist[i][j] = through;
                    }
                }
            }
        }
        dist
    }

    fn distances(&self) -> Vec<Vec<f64>> {
        if self.distances.borrow().is_none() {
            let built = self.build_distance_matrix();
            *self.distances.borrow_mut() = Some(built);
        }
        self.distances.borrow().clone().unwrap()
    }

    /// True iff `d[i][i] >= 0` for every time point after closure.
    pub fn consistent(&self) -> bool {
        let dist = self.distances();
        (0..dist.len()).all(|i| dist[i][i] >= 0.0)
    }

    /// Tightest known upper bound on `t(to) - t(from)`, or `None` if no path
    /// exists between the two points.
    pub fn distance(&self, from: &str, to: &str) -> Option<f64> {
        let u = *self.index.get(from)?;
        let v = *self.index.get(to)?;
        let d = self.distances()[u][v];
        if d.is_infinite() {
            None
        } else {
            Some(d)
        }
    }

    /// Equivalent to adding the constraint to a copy and testing
    /// `consistent()`; never mutates the receiver.
    pub fn check_interval_conflicts(&self, from: &str, to: &str, min: f64, max: f64) -> bool {
        let mut probe = self.copy();
        if probe.add_constraint(from, to, min, max).is_err() {
            return true;
        }
        !probe.consistent()
    }

    pub fn copy(&self) -> Stn {
        Stn {
            points: self.points.clone(),
            index: self.index.clone(),
            constraints: self.constraints.clone(),
            distances: RefCell::new(self.distances.borrow().clone()),
        }
    }

    pub fn get_intervals(&self) -> Vec<(String, String, f64, f64)> {
        self.constraints
            .iter()
            .map(|(&(u, v), &(min, max))| (self.points[u].clone(), self.points[v].clone(), min, max))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_chain_is_consistent() {
        let mut stn = Stn::new();
        stn.add_constraint("a", "b", 10.0, 15.0).unwrap();
        stn.add_constraint("b", "c", 0.0, 5.0).unwrap();
        assert!(stn.consistent());
    }

    #[test]
    fn contradictory_constraints_make_it_inconsistent() {
        // (a,b) = (10,10), (b,c) = (5,5), (a,c) = (0,10): forced distance 15 > 10.
        let mut stn = Stn::new();
        stn.add_constraint("a", "b", 10.0, 10.0).unwrap();
        stn.add_constraint("b", "c", 5.0, 5.0).unwrap();
        stn.add_constraint("a", "c", 0.0, 10.0).unwrap();
        assert!(!stn.consistent());
    }

    #[test]
    fn removing_the_bad_constraint_restores_consistency() {
        // a->c->b->a forces a distance of 3 - 5 - 10 = -18 < 0.
        let mut stn = Stn::new();
        stn.add_constraint("a", "b", 10.0, 10.0).unwrap();
        stn.add_constraint("b", "c", 5.0, 5.0).unwrap();
        stn.add_constraint("a", "c", 0.0, 3.0).unwrap();
        assert!(!stn.consistent());

        let mut fresh = Stn::new();
        fresh.add_constraint("a", "b", 10.0, 10.0).unwrap();
        fresh.add_constraint("b", "c", 5.0, 5.0).unwrap();
        assert!(fresh.consistent());
    }

    #[test]
    fn add_constraint_rejects_min_greater_than_max() {
        let mut stn = Stn::new();
        assert!(stn.add_constraint("a", "b", 10.0, 5.0).is_err());
    }

    #[test]
    fn check_interval_conflicts_does_not_mutate() {
        // Same (from, to) pair would just overwrite the existing constraint,
        // so probe the reverse direction: a->b (max 10) and b->a (max -20,
        // from min 20) force a->b->a = -20 + -5 < 0.
        let mut stn = Stn::new();
        stn.add_constraint("a", "b", 5.0, 10.0).unwrap();
        let before = stn.get_intervals().len();
        let conflicts = stn.check_interval_conflicts("b", "a", 20.0, 30.0);
        assert!(conflicts);
        assert_eq!(stn.get_intervals().len(), before);
        assert!(stn.consistent());
    }

    #[test]
    fn copy_is_independent() {
        let mut stn = Stn::new();
        stn.add_constraint("a", "b", 5.0, 10.0).unwrap();
        let mut cloned = stn.copy();
        cloned.add_constraint("a", "b", 20.0, 30.0).unwrap();
        assert!(!cloned.consistent());
        assert!(stn.consistent());
    }

    #[test]
    fn distance_after_closure() {
        let mut stn = Stn::new();
        stn.add_constraint("a", "b", 10.0, 15.0).unwrap();
        stn.add_constraint("b", "c", 0.0, 5.0).unwrap();
        assert_eq!(stn.distance("a", "c"), Some(20.0));
    }
}

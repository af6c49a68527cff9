//! The planner engine: depth-first HTN refinement with temporal stamping.
//!
//! The design-level algorithm describes an iterative loop over a frontier
//! pointer with explicit tree-walking retraction. Rust's call stack already
//! gives us that for free: the frontier is realized as a recursive,
//! continuation-passing search where "the rest of the frontier" is just the
//! tail of the list being refined. A method alternative is retried exactly
//! when everything after it — including sibling tasks and everything
//! outside the compound task being decomposed — turns out to be
//! unsatisfiable, which is what makes cross-sibling backtracking correct.

use crate::action::ActionRegistry;
use crate::error::PlannerError;
use crate::method::{MethodRegistry, MultigoalMethodFn};
use crate::state::State;
use crate::task::{Multigoal, Task, TaskInvocation};
use crate::temporal::{TemporalMetadata, TemporalMetadataDto};
use crate::tree::{Resolution, SolutionTree};
use env_param::EnvParam;
use htn_backtrack::Backtrack;
use std::sync::Arc;

/// Safety valve against runaway search on a misbehaving domain: the total
/// number of solution-tree nodes a single `plan()` call may allocate.
static HTN_MAX_NODES: EnvParam<usize> = EnvParam::new("HTN_MAX_NODES", "200000");

/// One element of a produced plan.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanStep {
    Plain(TaskInvocation),
    Temporal(TaskInvocation, TemporalMetadataDto),
}

#[derive(Debug, Clone)]
pub struct PlanResult {
    pub steps: Vec<PlanStep>,
    pub tree: SolutionTree,
}

/// Internal control-flow type for the search. `SoftFail` drives retraction
/// and retry of the next alternative; `Hard` propagates straight to the
/// caller of `plan()` and is never retried.
enum Flow {
    SoftFail,
    Hard(PlannerError),
}

impl From<PlannerError> for Flow {
    fn from(e: PlannerError) -> Self {
        Flow::Hard(e)
    }
}

/// A pending unit of work: a task and the tree node it should be attached
/// under once (if) it resolves.
type Frontier = Vec<(Task, usize)>;

pub struct Planner<'a> {
    actions: &'a ActionRegistry,
    methods: &'a MethodRegistry,
    verbose: u8,
}

impl<'a> Planner<'a> {
    pub fn new(actions: &'a ActionRegistry, methods: &'a MethodRegistry) -> Self {
        Self { actions, methods, verbose: 0 }
    }

    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        self.verbose = verbose;
        self
    }

    /// Runs the search to completion. On success, the plan and the final
    /// solution tree are returned. On failure, only the hard error is
    /// surfaced — per the contract, there is no partial plan.
    pub fn plan(&self, state: State, task_list: Vec<Task>) -> Result<PlanResult, PlannerError> {
        let mut tree = SolutionTree::new();
        let root = tree.push(Task::invocation("__root__", vec![]), state.clone(), None);
        let frontier: Frontier = task_list.into_iter().map(|t| (t, root)).collect();

        match self.refine(&frontier, state, &mut tree) {
            Ok(_final_state) => {
                let steps = self.collect_plan(&tree, root);
                Ok(PlanResult { steps, tree })
            }
            Err(Flow::SoftFail) => Err(PlannerError::PlanNotFound),
            Err(Flow::Hard(e)) => Err(e),
        }
    }

    fn log(&self, level: u8, msg: impl Fn() -> String) {
        if self.verbose >= level {
            eprintln!("[htn] {}", msg());
        }
    }

    /// Walks `root`'s descendants in tree order, emitting a `PlanStep` for
    /// every primitive resolution — the in-order leaf traversal the
    /// solution tree's ordering invariant promises.
    fn collect_plan(&self, tree: &SolutionTree, root: usize) -> Vec<PlanStep> {
        let mut steps = Vec::new();
        self.collect_from(tree, root, &mut steps);
        steps
    }

    fn collect_from(&self, tree: &SolutionTree, node_id: usize, out: &mut Vec<PlanStep>) {
        let node = tree.node(node_id);
        match &node.resolution {
            Resolution::Primitive { action, temporal } => {
                out.push(match temporal {
                    Some(tm) => PlanStep::Temporal(action.clone(), tm.to_dto()),
                    None => PlanStep::Plain(action.clone()),
                });
            }
            Resolution::Compound | Resolution::Unresolved => {
                for &child in &node.children {
                    self.collect_from(tree, child, out);
                }
            }
        }
    }

    fn refine(&self, frontier: &Frontier, state: State, tree: &mut SolutionTree) -> Result<State, Flow> {
        if tree.len() > *HTN_MAX_NODES.get_ref() {
            return Err(Flow::Hard(PlannerError::PlanNotFound));
        }
        match frontier.split_first() {
            None => Ok(state),
            Some(((task, parent), rest)) => self.refine_one(task, *parent, rest, state, tree),
        }
    }

    fn refine_one(
        &self,
        task: &Task,
        parent: usize,
        rest: &[(Task, usize)],
        state: State,
        tree: &mut SolutionTree,
    ) -> Result<State, Flow> {
        match task {
            Task::Invocation(inv) => {
                if self.actions.contains(&inv.name) {
                    self.refine_primitive(inv, parent, rest, state, tree)
                } else if self.methods.contains_task(&inv.name) {
                    self.refine_compound(inv, parent, rest, state, tree)
                } else {
                    Err(Flow::Hard(PlannerError::UnknownTask(inv.name.clone())))
                }
            }
            Task::Multigoal(mg) => self.refine_goal(mg, parent, rest, state, tree),
        }
    }

    fn refine_primitive(
        &self,
        inv: &TaskInvocation,
        parent: usize,
        rest: &[(Task, usize)],
        state: State,
        tree: &mut SolutionTree,
    ) -> Result<State, Flow> {
        let action = self
            .actions
            .get(&inv.name)
            .cloned()
            .expect("caller already checked actions.contains(&inv.name)");

        tree.save_state();
        let mut candidate = state.clone();
        if action(&mut candidate, &inv.args).is_none() {
            self.log(2, || format!("precondition failed for {}", inv.name));
            tree.restore_last();
            return Err(Flow::SoftFail);
        }

        let temporal = match self.stamp(inv, &state, &mut candidate) {
            Ok(tm) => tm,
            Err(e) => {
                // Hard failure: leave the tree as-is for inspection.
                tree.commit();
                return Err(e);
            }
        };

        let node = tree.push(Task::Invocation(inv.clone()), state.clone(), Some(parent));
        tree.node_mut(node).resolution = Resolution::Primitive { action: inv.clone(), temporal };
        self.log(1, || format!("applied {:?}", inv));

        match self.refine(rest, candidate, tree) {
            Ok(s) => {
                tree.commit();
                Ok(s)
            }
            Err(Flow::SoftFail) => {
                tree.restore_last();
                Err(Flow::SoftFail)
            }
            Err(e) => {
                tree.commit();
                Err(e)
            }
        }
    }

    fn stamp(
        &self,
        inv: &TaskInvocation,
        pre_state: &State,
        post_state: &mut State,
    ) -> Result<Option<TemporalMetadata>, Flow> {
        let Some(duration_secs) = self.actions.get_duration(&inv.name) else {
            return Ok(None);
        };
        let start = pre_state.get_current_time();
        let mut tm = TemporalMetadata::new();
        tm.set_duration(duration_secs)?;
        tm.set_start_time(start);
        tm.derive_end()?;
        let end = tm.end_time().expect("derive_end just set it");
        post_state.set_current_time(end)?;
        post_state.add_to_timeline(inv.clone(), start, end);
        Ok(Some(tm))
    }

    fn refine_compound(
        &self,
        inv: &TaskInvocation,
        parent: usize,
        rest: &[(Task, usize)],
        state: State,
        tree: &mut SolutionTree,
    ) -> Result<State, Flow> {
        let methods = self
            .methods
            .methods_for(&inv.name)
            .expect("caller already checked contains_task")
            .to_vec();

        let node = tree.push(Task::Invocation(inv.clone()), state.clone(), Some(parent));
        tree.node_mut(node).resolution = Resolution::Compound;
        let start_index = tree.node(node).method_index;

        for idx in start_index..methods.len() {
            tree.node_mut(node).method_index = idx;
            let Some(subtasks) = methods[idx](&state, &inv.args) else {
                continue;
            };
            self.log(2, || format!("method #{idx} for {} applies", inv.name));

            tree.save_state();
            let mut next_frontier: Frontier = subtasks.into_iter().map(|t| (t, node)).collect();
            next_frontier.extend_from_slice(rest);

            match self.refine(&next_frontier, state.clone(), tree) {
                Ok(s) => {
                    tree.commit();
                    return Ok(s);
                }
                Err(Flow::SoftFail) => {
                    tree.restore_last();
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        Err(Flow::SoftFail)
    }

    fn refine_goal(
        &self,
        goal: &Multigoal,
        parent: usize,
        rest: &[(Task, usize)],
        state: State,
        tree: &mut SolutionTree,
    ) -> Result<State, Flow> {
        let decomposers: Vec<MultigoalMethodFn> = match self.methods.multigoal_methods_for(&goal.name) {
            Some(list) => list.to_vec(),
            None => {
                let fallback: MultigoalMethodFn =
                    Arc::new(|s: &State, g: &Multigoal| Some(MethodRegistry::default_multigoal_split(s, g)));
                vec![fallback]
            }
        };

        let node = tree.push(Task::Multigoal(goal.clone()), state.clone(), Some(parent));
        tree.node_mut(node).resolution = Resolution::Compound;
        let start_index = tree.node(node).method_index;

        for idx in start_index..decomposers.len() {
            tree.node_mut(node).method_index = idx;
            let Some(subtasks) = decomposers[idx](&state, goal) else {
                continue;
            };

            tree.save_state();
            let mut next_frontier: Frontier = subtasks.into_iter().map(|t| (t, node)).collect();
            next_frontier.extend_from_slice(rest);

            match self.refine(&next_frontier, state.clone(), tree) {
                Ok(s) => {
                    tree.commit();
                    return Ok(s);
                }
                Err(Flow::SoftFail) => {
                    tree.restore_last();
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        Err(Flow::SoftFail)
    }
}

/// Convenience entry point mirroring the original `plan(state, task_list,
/// verbose)` contract.
pub fn plan(
    actions: &ActionRegistry,
    methods: &MethodRegistry,
    state: State,
    task_list: Vec<Task>,
    verbose: u8,
) -> Result<PlanResult, PlannerError> {
    Planner::new(actions, methods).with_verbosity(verbose).plan(state, task_list)
}

//! A Hierarchical Task Network planner with a temporal layer: duration
//! parsing, start/end stamping of primitive actions, a wall-clock state
//! cursor, and a Simple Temporal Network for symbolic constraint checks.

pub mod action;
pub mod engine;
pub mod error;
pub mod method;
pub mod state;
pub mod task;
pub mod temporal;
pub mod tree;
pub mod value;

pub use action::{ActionFn, ActionRegistry};
pub use engine::{plan, PlanResult, PlanStep, Planner};
pub use error::PlannerError;
pub use method::{MethodFn, MethodRegistry, MultigoalMethodFn};
pub use state::{AttrValue, State, TimelineEntry};
pub use task::{Multigoal, Task, TaskInvocation};
pub use temporal::{Stn, TemporalMetadata, TemporalMetadataDto};
pub use tree::SolutionTree;
pub use value::Value;

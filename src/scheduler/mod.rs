//! Scheduling engine: conflict detection and greedy auto-placement.
//!
//! `conflict` holds the pure predicates that gate every slot write;
//! `planner` drives batch placement of bulk-imported course offerings on
//! top of them.

pub mod conflict;
pub mod planner;

pub use conflict::{Conflict, ConflictAxis};
pub use planner::{
    place_batch, CancelToken, FailedRequest, PlacementRequest, PlanResult,
};

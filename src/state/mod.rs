//! Domain rules module
//!
//! This module holds the event state machine and the admission policy

pub mod lifecycle;
pub mod admission;

// Re-export commonly used rule components
pub use lifecycle::{EventRules, admin_transition, owner_transition, apply_patch};
pub use admission::{BulkPlan, check_can_apply, check_bulk_preconditions, initial_status, plan_bulk_decision};

//! Event query building

pub mod filter;

pub use filter::{
    EventFilter, EventPredicate, EventSort, EventOrder, PublicSearchCriteria, AdminSearchCriteria,
    sort_by_views,
};

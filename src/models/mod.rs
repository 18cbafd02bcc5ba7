//! Data models module
//!
//! This module contains all data structures used throughout the core

pub mod user;
pub mod category;
pub mod event;
pub mod request;
pub mod rating;
pub mod page;

// Re-export commonly used models
pub use user::{User, CreateUserRequest};
pub use category::{Category, CreateCategoryRequest};
pub use event::{
    Event, EventState, Location, CreateEventRequest, UpdateEventRequest, AdminUpdateEventRequest,
    OwnerUpdateEventRequest, AdminStateAction, OwnerStateAction, ViewerContext,
};
pub use request::{ParticipationRequest, RequestStatus, RequestDecision, RequestStatusUpdate, RequestStatusUpdateResult};
pub use rating::{Vote, VoteKind, VoteTally, RatingOrder};
pub use page::Page;

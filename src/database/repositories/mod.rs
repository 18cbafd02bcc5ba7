//! Database repositories module
//! 
//! This module contains all repository implementations for data access

pub mod user;
pub mod category;
pub mod event;
pub mod request;
pub mod vote;

// Re-export repositories
pub use user::UserRepository;
pub use category::CategoryRepository;
pub use event::EventRepository;
pub use request::RequestRepository;
pub use vote::VoteRepository;

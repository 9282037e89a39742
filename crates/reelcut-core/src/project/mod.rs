//! Project Management Module
//!
//! Handles the project aggregate, its models, and JSON persistence.

mod models;
mod state;
mod store;

pub use models::*;
pub use state::*;
pub use store::*;

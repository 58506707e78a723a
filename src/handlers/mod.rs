//! JSON API handlers.

pub mod cards;
pub mod error;
pub mod speech;
pub mod study;
pub mod tags;
pub mod tips;

pub use error::ApiError;

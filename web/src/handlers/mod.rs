//! HTTP request handlers, organized by resource.

pub mod auth;
pub mod categories;
pub mod health;
pub mod payments;
pub mod recipes;
pub mod social;
pub mod upload;

pub use health::{health_check, readiness_check};

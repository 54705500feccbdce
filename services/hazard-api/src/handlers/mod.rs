//! HTTP request handlers.

pub mod api;
pub mod health;
pub mod ranking;

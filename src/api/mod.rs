//! HTTP surface: JSON envelope handlers and middleware

pub mod middleware;
pub mod services;

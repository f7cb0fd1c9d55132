//! HTTP handlers
//!
//! Handlers only unpack the request, call a service and wrap the result; every rule lives in
//! [`crate::services`].

pub mod activities;
pub mod analytics;
pub mod auth;
pub mod health;
pub mod tasks;
pub mod teams;

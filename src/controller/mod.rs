//! HTTP controllers
//!
//! `callback` faces the hub; the rest is the operator API.

pub mod callback;
pub mod status;
pub mod subscriptions;

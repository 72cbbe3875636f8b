//! Campus coffee review service.
//!
//! Users review points of sale; a review counts as approved once enough
//! other users have approved it.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod storage;

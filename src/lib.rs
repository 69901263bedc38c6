//! postboard: a client for the JSONPlaceholder posts API whose query cache
//! is kept in sync from mutation results instead of refetching.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;

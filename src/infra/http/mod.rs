//! HTTP transport for the posts API.

mod client;

pub use client::HttpClient;

//! Application services wiring the transport, the query cache and mutations.

pub mod error;
pub mod mutation;
pub mod posts;
pub mod transport;

pub(crate) const METRIC_MUTATION_FAILED: &str = "postboard_mutation_failed_total";

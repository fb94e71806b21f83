//! Stack Exchange question harvesting: a rate-limited transport, the paginated
//! question fetcher, the accepted-answer enricher, and the category pipeline
//! that ties them together.

pub mod client;
pub mod error;
pub mod harvester;
pub mod normalize;
pub mod pipeline;
pub mod rate_limit;
pub mod retry;
pub mod stats;
pub mod transport;
pub mod types;

mod answers;
mod questions;

#[cfg(test)]
mod test_support;

pub use client::StackExchangeClient;
pub use error::TransportError;
pub use harvester::Harvester;
pub use pipeline::HarvestReport;
pub use rate_limit::{Pacer, QuotaGuard, RateLimits};
pub use retry::RetryPolicy;
pub use stats::{HarvestStats, HarvestSummary};
pub use transport::Transport;
pub use types::{ApiResponse, QuotaState};

pub mod config;
pub mod context;
pub mod error;
pub mod helpers;
pub mod metrics;

#[path = "llm/lib.rs"]
pub mod llm;
#[path = "tools/lib.rs"]
pub mod tools;
#[path = "api/lib.rs"]
pub mod api;

pub use config::RouterConfig;
pub use context::McpContext;
pub use error::RouterError;
pub use metrics::{MetricsAggregator, MetricsSummary, RequestRecord};

//! Report composition engine for roofing claim and retail documents.
//!
//! ```text
//! placeholders  template slug → required field paths
//! sections      persisted keys + context → ordered outline → rendered sections
//! enrichment    context → triggered AI modules → batch result (cost, failures)
//! report        the three above, driven once per document request
//! ```

pub mod config;
pub mod context;
pub mod placeholders;
pub mod sections;
pub mod enrichment;
pub mod report;

pub use config::{ConfigError, EngineConfig};
pub use context::{Capability, ReportContext};
pub use report::{PreparedReport, ReportEngine, ReportRequest, TemplateRef};

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` wins over the crate default.
/// Returns false when a subscriber was already installed.
pub fn init_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .map(|()| tracing::info!("{} v{} ready", config::APP_NAME, config::APP_VERSION))
        .is_ok()
}

pub mod config;
pub mod config_loader;
pub mod models;
pub mod reducer;
pub mod scheduler;
pub mod traits;
pub mod window;
pub mod worker;

pub use config::{AppConfig, OutputConfig, RunConfig, SourceConfig};
pub use config_loader::ConfigLoader;
pub use models::{
    AvailabilityPoint, BatchOutcome, RawRow, RawSeries, ReferenceWindow, ResultSet, SymbolResult,
};
pub use reducer::reduce;
pub use scheduler::{BatchScheduler, CancelFlag, DEFAULT_BATCH_SIZE, DEFAULT_MAX_CONCURRENCY};
pub use traits::{AvailabilityProvider, BlobStore, FetchError, ProviderFactory, SymbolUniverse};
pub use window::{derive_window, filter_window, DocumentError, MIN_SERIES_ROWS};

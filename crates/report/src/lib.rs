pub mod blob;
pub mod csv_writer;
pub mod error;
pub mod publisher;

pub use blob::GcsClient;
pub use error::PublishError;
pub use publisher::{PublishedFiles, ResultPublisher};

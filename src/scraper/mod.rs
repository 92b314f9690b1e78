// Remote deals API access and request sequencing.

pub mod coordinator;
pub mod fetcher;
pub mod traits;

pub use coordinator::{FetchCoordinator, FetchReport, FetchStatus};
pub use fetcher::ApiClient;
pub use traits::DealSource;

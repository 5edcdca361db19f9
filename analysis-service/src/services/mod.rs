pub mod metrics;
pub mod providers;
pub mod uploads;

pub use self::metrics::{get_metrics, init_metrics};
pub use providers::{InlineImage, ProviderError, ProviderResponse, VisionProvider};
pub use uploads::{StoredUpload, UploadStore};

pub mod api_key;
pub mod mask;
pub mod severity;

pub use api_key::{format_date, ApiKeyRecord, CreationResult};
pub use mask::mask_secret;
pub use severity::Severity;

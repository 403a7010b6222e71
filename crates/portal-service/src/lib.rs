mod generator;
mod mock;
mod traits;

pub use generator::{KeyGenerator, RandomKeyGenerator, SeededKeyGenerator, SECRET_BODY_LEN};
pub use mock::{Latency, MockKeyService};
pub use traits::{KeyService, ServiceError};

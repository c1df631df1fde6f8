pub mod hash;
pub mod record;
pub mod storage;

pub use hash::fingerprint;
pub use record::{GenerationRecord, GenerationStatus};
pub use storage::{CacheStats, ResultCache};

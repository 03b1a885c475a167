pub mod load;
pub mod save;
pub mod types;

pub use types::{Config, DEFAULT_SEGMENT_LENGTH_SECONDS, MAX_RECENT_PATHS, UserSettings};

mod ffprobe_info;
mod media_source;
mod path_validator;

pub use ffprobe_info::get_media_duration;
pub use media_source::MediaSource;
pub use path_validator::{ensure_directory_exists, validate_file_exists};

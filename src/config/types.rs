use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const MAX_RECENT_PATHS: usize = 10;

/// 預設每段長度（秒）
pub const DEFAULT_SEGMENT_LENGTH_SECONDS: u32 = 60;

/// 使用者設定（儲存於 settings.json）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub segment_length_seconds: u32,
    pub output_directory: PathBuf,
    /// 覆寫 ffmpeg 執行檔位置，未設定時從 PATH 尋找
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
    /// 引擎執行逾時；未設定則不限時
    pub engine_timeout_seconds: Option<u64>,
    pub recent_paths: Vec<String>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            segment_length_seconds: DEFAULT_SEGMENT_LENGTH_SECONDS,
            output_directory: PathBuf::from("clips"),
            ffmpeg_path: None,
            ffprobe_path: None,
            engine_timeout_seconds: None,
            recent_paths: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub settings: UserSettings,
}

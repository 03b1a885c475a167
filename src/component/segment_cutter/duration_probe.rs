use super::ffmpeg_engine::resolve_binary;
use crate::error::CutError;
use crate::tools::{MediaSource, get_media_duration};
use std::path::{Path, PathBuf};

/// 取得輸入影片的總長度（秒）
pub trait DurationProbe: Send + Sync {
    fn probe(&self, source: &MediaSource) -> Result<f64, CutError>;
}

/// 以 ffprobe 讀取容器資訊
pub struct FfprobeDurationProbe {
    ffprobe: PathBuf,
}

impl FfprobeDurationProbe {
    #[must_use]
    pub fn new(configured: Option<&Path>) -> Self {
        // 找不到時仍保留名稱，讓錯誤在實際探測時以 UnreadableMedia 回報
        let ffprobe =
            resolve_binary("ffprobe", configured).unwrap_or_else(|_| PathBuf::from("ffprobe"));
        Self { ffprobe }
    }
}

impl DurationProbe for FfprobeDurationProbe {
    fn probe(&self, source: &MediaSource) -> Result<f64, CutError> {
        get_media_duration(&self.ffprobe, &source.path)
    }
}

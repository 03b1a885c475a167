use super::path_validator::validate_file_exists;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// 使用者選取的輸入影片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    pub path: PathBuf,
    pub byte_len: u64,
    pub mime_hint: Option<&'static str>,
}

impl MediaSource {
    pub fn open(path: &Path) -> Result<Self> {
        validate_file_exists(path)?;
        let metadata = fs::metadata(path)
            .with_context(|| format!("無法讀取檔案資訊: {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            byte_len: metadata.len(),
            mime_hint: mime_from_extension(path),
        })
    }

    /// 開啟檔案供串流寫入引擎工作區
    pub fn open_reader(&self) -> std::io::Result<File> {
        File::open(&self.path)
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    }
}

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let mime = match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "ts" | "m2ts" => "video/mp2t",
        "flv" => "video/x-flv",
        "wmv" => "video/x-ms-wmv",
        _ => return None,
    };
    Some(mime)
}

use super::artifact_collector::Artifact;
use crate::tools::ensure_directory_exists;
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// 一個可下載的輸出段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download<'a> {
    pub display_name: &'a str,
    pub bytes: &'a [u8],
    pub suggested_filename: String,
}

/// 只列出有內容的輸出段，建議檔名為 `cortado_<秒數>s_<段名>`
#[must_use]
pub fn downloads(artifacts: &[Artifact], segment_length_seconds: u32) -> Vec<Download<'_>> {
    artifacts
        .iter()
        .filter_map(|artifact| {
            let bytes = artifact.bytes.as_deref()?;
            Some(Download {
                display_name: &artifact.name,
                bytes,
                suggested_filename: format!("cortado_{segment_length_seconds}s_{}", artifact.name),
            })
        })
        .collect()
}

/// 將輸出段寫入資料夾
pub struct DirectoryPresenter {
    output_directory: PathBuf,
}

impl DirectoryPresenter {
    #[must_use]
    pub fn new(output_directory: &Path) -> Self {
        Self {
            output_directory: output_directory.to_path_buf(),
        }
    }

    pub fn present(&self, download: &Download<'_>) -> Result<PathBuf> {
        ensure_directory_exists(&self.output_directory).with_context(|| {
            format!("無法建立輸出資料夾: {}", self.output_directory.display())
        })?;

        let path = self.output_directory.join(&download.suggested_filename);
        fs::write(&path, download.bytes)
            .with_context(|| format!("無法寫入 {}", path.display()))?;

        info!("已輸出 {} -> {}", download.display_name, path.display());
        Ok(path)
    }

    pub fn present_all(&self, downloads: &[Download<'_>]) -> Result<Vec<PathBuf>> {
        downloads.iter().map(|d| self.present(d)).collect()
    }
}

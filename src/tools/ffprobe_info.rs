use crate::error::CutError;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

/// 使用 ffprobe 取得影片總長度（秒）
///
/// 只讀取容器層的 `format` 資訊，不解碼串流。
/// `output()` 會等待 ffprobe 結束，成功或失敗都不會留下子程序。
pub fn get_media_duration(ffprobe: &Path, path: &Path) -> Result<f64, CutError> {
    let output = Command::new(ffprobe)
        .args(["-v", "error", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()
        .map_err(|e| CutError::UnreadableMedia(format!("無法執行 ffprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CutError::UnreadableMedia(format!(
            "ffprobe 執行失敗: {}",
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_format_duration(&stdout).ok_or_else(|| {
        CutError::UnreadableMedia(format!("無法取得影片長度: {}", path.display()))
    })
}

/// 解析 ffprobe JSON 輸出中的 `format.duration`
fn parse_format_duration(json: &str) -> Option<f64> {
    let probe: FfprobeOutput = serde_json::from_str(json).ok()?;
    let duration = probe.format?.duration?.trim().parse::<f64>().ok()?;

    (duration.is_finite() && duration >= 0.0).then_some(duration)
}

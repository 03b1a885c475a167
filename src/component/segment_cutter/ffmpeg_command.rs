use super::segment_planner::SegmentPlan;

/// 引擎工作區內的輸入檔名（同一時間只有一個工作）
pub const INPUT_NAME: &str = "input.mp4";

/// 輸出檔名樣板，`%03d` 由 ffmpeg 依序填入 001、002...
pub const OUTPUT_TEMPLATE: &str = "clip_%03d.mp4";

/// 第 `index` 段（從 1 開始）的輸出檔名
#[must_use]
pub fn clip_name(index: usize) -> String {
    format!("clip_{index:03}.mp4")
}

/// 交給引擎執行的分段指令
///
/// 串流複製（不重新編碼）、保留所有串流、每段重設時間戳。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    argv: Vec<String>,
}

impl EngineCommand {
    #[must_use]
    pub fn from_plan(plan: &SegmentPlan) -> Self {
        let segment_times = plan.cut_point_list();
        let argv = [
            "-i", INPUT_NAME,
            "-c", "copy",
            "-map", "0",
            "-f", "segment",
            "-segment_times", segment_times.as_str(),
            "-reset_timestamps", "1",
            OUTPUT_TEMPLATE,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        Self { argv }
    }

    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// `-segment_times` 的參數值
    #[must_use]
    pub fn segment_times(&self) -> Option<&str> {
        self.argv
            .iter()
            .position(|arg| arg == "-segment_times")
            .and_then(|i| self.argv.get(i + 1))
            .map(String::as_str)
    }
}

use super::job::{JobObserver, JobState, JobSummary};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// 在終端機顯示工作狀態
///
/// 同一時間只會顯示進度、完成摘要或錯誤其中之一。
pub struct TerminalObserver {
    progress_bar: ProgressBar,
}

impl TerminalObserver {
    #[must_use]
    pub fn new() -> Self {
        let progress_bar = ProgressBar::new(100);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );
        progress_bar.enable_steady_tick(Duration::from_millis(120));
        Self { progress_bar }
    }

    fn print_summary(summary: &JobSummary) {
        println!();
        println!("{}", style("=== 切割完成 ===").cyan().bold());
        println!("  每段長度: {} 秒", summary.segment_length_seconds);
        println!("  預期段數: {}", summary.expected_clip_count);
        println!("  取得段數: {}", style(summary.retrieved_count()).green());

        if summary.has_count_mismatch() {
            let missing: Vec<&str> = summary
                .artifacts
                .iter()
                .filter(|a| !a.is_retrieved())
                .map(|a| a.name.as_str())
                .collect();
            println!(
                "  {} {}",
                style("缺少:").yellow(),
                style(missing.join(", ")).yellow()
            );
        }
    }
}

impl Default for TerminalObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl JobObserver for TerminalObserver {
    fn on_transition(&self, state: &JobState) {
        match state {
            JobState::Idle => {}
            JobState::ProbingDuration => self.progress_bar.set_message("讀取影片長度..."),
            JobState::LoadingEngine => self.progress_bar.set_message("載入切割引擎..."),
            JobState::Processing(percent) => {
                self.progress_bar.set_position(u64::from(*percent));
                self.progress_bar.set_message("切割中...");
            }
            JobState::CollectingArtifacts => self.progress_bar.set_message("讀取輸出檔..."),
            JobState::Done(summary) => {
                self.progress_bar.finish_and_clear();
                Self::print_summary(summary);
            }
            JobState::Failed(reason) => {
                self.progress_bar.finish_and_clear();
                eprintln!("{} {}", style("切割失敗:").red().bold(), reason);
            }
        }
    }
}

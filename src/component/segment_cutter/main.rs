use super::duration_probe::FfprobeDurationProbe;
use super::engine_invoker::EngineInvoker;
use super::ffmpeg_engine::FfmpegEngine;
use super::job::SegmentJob;
use super::presenter::{DirectoryPresenter, downloads};
use super::terminal_observer::TerminalObserver;
use crate::config::Config;
use crate::config::save::{add_recent_path, save_settings};
use crate::error::CutError;
use crate::tools::MediaSource;
use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use log::warn;
use std::path::Path;
use std::sync::Arc;

/// 影片分段切割
///
/// 讀取影片長度、以固定秒數切段（串流複製，不重新編碼），
/// 並將每一段寫入輸出資料夾。
pub struct SegmentCutter<'a> {
    config: &'a mut Config,
    invoker: Arc<EngineInvoker<FfmpegEngine>>,
}

impl<'a> SegmentCutter<'a> {
    pub fn new(config: &'a mut Config, invoker: Arc<EngineInvoker<FfmpegEngine>>) -> Self {
        Self { config, invoker }
    }

    pub fn run(&mut self) -> Result<()> {
        println!("{}", style("=== 影片分段切割 ===").cyan().bold());

        let input_path = self.prompt_input_path()?;
        let source = MediaSource::open(Path::new(&input_path))?;

        add_recent_path(&mut self.config.settings, &input_path);
        if let Err(e) = save_settings(&self.config.settings) {
            warn!("無法儲存最近使用的路徑: {e:#}");
        }

        let settings = &self.config.settings;
        println!(
            "{}",
            style(format!(
                "{} ({:.2} MB)，每 {} 秒一段",
                source.file_name(),
                source.byte_len as f64 / 1024.0 / 1024.0,
                settings.segment_length_seconds
            ))
            .dim()
        );

        let job = SegmentJob::new(
            Arc::clone(&self.invoker),
            FfprobeDurationProbe::new(settings.ffprobe_path.as_deref()),
            settings.segment_length_seconds,
            Box::new(TerminalObserver::new()),
        );

        let summary = match job.start(source) {
            Ok(summary) => summary,
            Err(CutError::Busy) => return Err(CutError::Busy.into()),
            // 錯誤訊息已由 TerminalObserver 顯示
            Err(_) => return Ok(()),
        };

        let items = downloads(&summary.artifacts, summary.segment_length_seconds);
        let presenter = DirectoryPresenter::new(&settings.output_directory);
        for path in presenter.present_all(&items)? {
            println!("  {} {}", style("⬇").green(), path.display());
        }

        Ok(())
    }

    fn prompt_input_path(&self) -> Result<String> {
        let recent = &self.config.settings.recent_paths;
        if !recent.is_empty() {
            let mut options: Vec<String> = recent.clone();
            options.push("輸入新的路徑...".to_string());

            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("請選擇影片")
                .items(&options)
                .default(0)
                .interact()?;

            if selection < recent.len() {
                return Ok(recent[selection].clone());
            }
        }

        let path: String = Input::new()
            .with_prompt("請輸入影片檔案路徑")
            .interact_text()?;
        Ok(path.trim().to_string())
    }
}

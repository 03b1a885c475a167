use crate::component::SegmentCutter;
use crate::component::segment_cutter::{EngineInvoker, FfmpegEngine};
use crate::config::Config;
use crate::pause;
use anyhow::Result;
use console::{Term, style};
use indicatif::ProgressBar;
use log::warn;
use std::sync::Arc;
use std::time::Duration;

pub fn run_segment_cutter(
    term: &Term,
    invoker: &Arc<EngineInvoker<FfmpegEngine>>,
    config: &mut Config,
) -> Result<()> {
    let mut cutter = SegmentCutter::new(config, Arc::clone(invoker));

    if let Err(e) = cutter.run() {
        eprintln!("{} {}", style("錯誤:").red().bold(), e);
    }

    pause(term)?;
    Ok(())
}

/// 程式啟動時預先載入引擎；失敗時第一次切割會再嘗試
pub fn warm_up_engine(invoker: &EngineInvoker<FfmpegEngine>) {
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message("載入切割引擎...");

    match invoker.initialize() {
        Ok(()) => spinner.finish_with_message("切割引擎已就緒"),
        Err(e) => {
            spinner.finish_and_clear();
            warn!("引擎預載失敗: {e}");
            eprintln!("{} {}", style("無法載入切割引擎:").red().bold(), e);
        }
    }
}

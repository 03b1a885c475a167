use anyhow::Result;
use console::{Term, style};
use cortado::component::segment_cutter::{EngineInvoker, FfmpegEngine, FfmpegEngineSettings};
use cortado::config::Config;
use cortado::init;
use cortado::menu::{show_main_menu, warm_up_engine};
use cortado::signal::setup_shutdown_signal;
use log::{info, warn};
use std::sync::Arc;
use std::sync::atomic::Ordering;

fn main() -> Result<()> {
    init::init();
    let term = Term::stdout();
    let shutdown_signal = setup_shutdown_signal()?;

    let mut config = Config::new()?;

    // 引擎在整個程序中只載入一次，之後的每次切割都重複使用
    let invoker = Arc::new(EngineInvoker::new(FfmpegEngine::new(
        FfmpegEngineSettings::from(&config.settings),
    )));
    warm_up_engine(&invoker);

    loop {
        if shutdown_signal.load(Ordering::SeqCst) {
            info!("Shutdown requested");
            break;
        }

        match show_main_menu(&term, &invoker, &mut config) {
            Ok(true) => {}
            Ok(false) => {
                term.clear_screen()?;
                println!("\n{}", style("再見！").green().bold());
                info!("Program exited normally");
                break;
            }
            Err(e) => {
                warn!("Program error: {e}");
                eprintln!("{} {}", style("錯誤:").red().bold(), e);
                break;
            }
        }
    }

    Ok(())
}

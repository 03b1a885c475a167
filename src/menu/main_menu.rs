use crate::component::segment_cutter::{EngineInvoker, FfmpegEngine};
use crate::config::save::save_settings;
use crate::config::types::Config;
use crate::menu::handlers::run_segment_cutter;
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use std::path::PathBuf;
use std::sync::Arc;

pub fn show_main_menu(
    term: &Term,
    invoker: &Arc<EngineInvoker<FfmpegEngine>>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style("=== Cortado 影片分段切割 ===").cyan().bold());
    println!("{}", style("按 ESC 離開").dim());

    let options = vec!["切割影片", "設定", "離開"];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇功能")
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_segment_cutter(term, invoker, config)?;
            Ok(true)
        }
        Some(1) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(2) | None => Ok(false),
        _ => unreachable!(),
    }
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        let settings = &config.settings;
        println!("{}", style("=== 設定 ===").cyan().bold());
        println!(
            "{} {} 秒",
            style("每段長度:").dim(),
            settings.segment_length_seconds
        );
        println!(
            "{} {}",
            style("輸出資料夾:").dim(),
            settings.output_directory.display()
        );

        let options = vec!["每段長度", "輸出資料夾", "返回"];
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("請選擇要修改的項目")
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => {
                let seconds: u32 = Input::new()
                    .with_prompt("每段長度（秒）")
                    .default(config.settings.segment_length_seconds)
                    .validate_with(|value: &u32| {
                        if *value > 0 {
                            Ok(())
                        } else {
                            Err("必須大於 0")
                        }
                    })
                    .interact_text()?;
                config.settings.segment_length_seconds = seconds;
                save_settings(&config.settings)?;
            }
            Some(1) => {
                let path: String = Input::new()
                    .with_prompt("輸出資料夾")
                    .default(config.settings.output_directory.display().to_string())
                    .interact_text()?;
                config.settings.output_directory = PathBuf::from(path.trim());
                save_settings(&config.settings)?;
            }
            Some(2) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

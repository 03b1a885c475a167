use super::engine::{Engine, EngineEvent};
use crate::config::UserSettings;
use crate::error::EngineIoError;
use log::{debug, info, warn};
use regex::Regex;
use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// 失敗時附在錯誤訊息中的 stderr 行數
const ERROR_TAIL_LINES: usize = 8;

/// 沒有切點時改用的單段長度（秒），讓整段輸入成為一個輸出檔
const WHOLE_INPUT_SEGMENT_TIME: &str = "2147483647";

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Duration:\s*(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("Invalid duration pattern")
});

#[derive(Debug, Clone, Default)]
pub struct FfmpegEngineSettings {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl From<&UserSettings> for FfmpegEngineSettings {
    fn from(settings: &UserSettings) -> Self {
        Self {
            ffmpeg_path: settings.ffmpeg_path.clone(),
            ffprobe_path: settings.ffprobe_path.clone(),
            timeout: settings.engine_timeout_seconds.map(Duration::from_secs),
        }
    }
}

struct LoadedEngine {
    ffmpeg: PathBuf,
    workspace: TempDir,
}

/// 以本機 ffmpeg 實作的切割引擎
///
/// 引擎的檔案儲存是一個私有的暫存資料夾，載入時建立、引擎釋放時刪除。
pub struct FfmpegEngine {
    settings: FfmpegEngineSettings,
    loaded: Option<LoadedEngine>,
}

enum OutputLine {
    Stdout(String),
    Stderr(String),
}

impl FfmpegEngine {
    #[must_use]
    pub const fn new(settings: FfmpegEngineSettings) -> Self {
        Self {
            settings,
            loaded: None,
        }
    }

    /// 引擎工作區位置，尚未載入時為 `None`
    #[must_use]
    pub fn workspace(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|l| l.workspace.path())
    }

    fn workspace_path(&self, name: &str) -> Result<PathBuf, EngineIoError> {
        let loaded = self
            .loaded
            .as_ref()
            .ok_or_else(|| EngineIoError::other(name, "引擎尚未載入"))?;

        // 只接受單一檔名，不允許跳出工作區
        if Path::new(name).file_name().and_then(|n| n.to_str()) != Some(name) {
            return Err(EngineIoError::other(name, "不合法的檔名"));
        }

        Ok(loaded.workspace.path().join(name))
    }
}

impl Engine for FfmpegEngine {
    fn load(&mut self) -> Result<(), String> {
        if self.loaded.is_some() {
            return Ok(());
        }

        let ffmpeg = resolve_binary("ffmpeg", self.settings.ffmpeg_path.as_deref())?;
        let ffprobe = resolve_binary("ffprobe", self.settings.ffprobe_path.as_deref())?;
        verify_binary(&ffmpeg)?;
        verify_binary(&ffprobe)?;

        let workspace = tempfile::Builder::new()
            .prefix("cortado-")
            .tempdir()
            .map_err(|e| format!("無法建立引擎工作區: {e}"))?;

        info!(
            "切割引擎已載入: {} (工作區 {})",
            ffmpeg.display(),
            workspace.path().display()
        );
        self.loaded = Some(LoadedEngine { ffmpeg, workspace });
        Ok(())
    }

    fn write_file(&mut self, name: &str, bytes: &[u8]) -> Result<(), EngineIoError> {
        let path = self.workspace_path(name)?;
        fs::write(&path, bytes).map_err(|e| EngineIoError::from_io(name, &e))
    }

    fn write_file_from(&mut self, name: &str, reader: &mut dyn Read) -> Result<(), EngineIoError> {
        let path = self.workspace_path(name)?;
        let mut file = File::create(&path).map_err(|e| EngineIoError::from_io(name, &e))?;
        io::copy(reader, &mut file).map_err(|e| EngineIoError::from_io(name, &e))?;
        Ok(())
    }

    fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineIoError> {
        let path = self.workspace_path(name)?;
        fs::read(&path).map_err(|e| EngineIoError::from_io(name, &e))
    }

    fn delete_file(&mut self, name: &str) -> Result<(), EngineIoError> {
        let path = self.workspace_path(name)?;
        fs::remove_file(&path).map_err(|e| EngineIoError::from_io(name, &e))
    }

    fn exec(
        &mut self,
        argv: &[String],
        events: &mut dyn FnMut(EngineEvent),
    ) -> Result<(), String> {
        let loaded = self
            .loaded
            .as_ref()
            .ok_or_else(|| "引擎尚未載入".to_string())?;

        let args = native_args(argv);
        debug!("ffmpeg {}", args.join(" "));

        let mut command = Command::new(&loaded.ffmpeg);
        command
            .current_dir(loaded.workspace.path())
            .args(["-hide_banner", "-nostdin", "-y", "-nostats", "-progress", "pipe:1"])
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // 獨立的行程群組：終端機的 Ctrl-C 只通知本程式，不會中斷進行中的切割
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command
            .spawn()
            .map_err(|e| format!("無法啟動 ffmpeg: {e}"))?;

        let (tx, rx) = mpsc::channel();
        let readers = [
            child
                .stdout
                .take()
                .map(|s| spawn_line_reader(s, tx.clone(), OutputLine::Stdout)),
            child
                .stderr
                .take()
                .map(|s| spawn_line_reader(s, tx.clone(), OutputLine::Stderr)),
        ];
        drop(tx);

        let deadline = self.settings.timeout.map(|t| Instant::now() + t);
        let mut tracker = ProgressTracker::default();
        let mut tail: VecDeque<String> = VecDeque::with_capacity(ERROR_TAIL_LINES);
        let mut timed_out = false;

        loop {
            if !timed_out && deadline.is_some_and(|d| Instant::now() >= d) {
                warn!("ffmpeg 執行逾時，終止程序");
                if let Err(e) = child.kill() {
                    warn!("無法終止 ffmpeg: {e}");
                }
                timed_out = true;
            }

            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(OutputLine::Stderr(line)) => {
                    tracker.observe_log(&line);
                    if tail.len() == ERROR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line.clone());
                    events(EngineEvent::Log(line));
                }
                Ok(OutputLine::Stdout(line)) => {
                    if let Some(ratio) = tracker.observe_progress(&line) {
                        events(EngineEvent::Progress(ratio));
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        for reader in readers.into_iter().flatten() {
            let _ = reader.join();
        }

        let status = child
            .wait()
            .map_err(|e| format!("無法取得 ffmpeg 結束狀態: {e}"))?;

        if timed_out {
            let secs = self.settings.timeout.map_or(0, |t| t.as_secs());
            return Err(format!("執行逾時 ({secs} 秒)"));
        }

        if status.success() {
            Ok(())
        } else {
            let code = status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            let detail = tail.into_iter().collect::<Vec<_>>().join("\n");
            Err(format!("ffmpeg 結束代碼 {code}: {detail}"))
        }
    }
}

/// 轉換成 ffmpeg 可接受的參數
///
/// segment muxer 不接受空的 `-segment_times`，沒有切點時改成一段涵蓋整個輸入。
fn native_args(argv: &[String]) -> Vec<String> {
    let mut args = Vec::with_capacity(argv.len());
    let mut iter = argv.iter();
    while let Some(arg) = iter.next() {
        if arg != "-segment_times" {
            args.push(arg.clone());
            continue;
        }
        match iter.next() {
            Some(times) if times.is_empty() => {
                args.push("-segment_time".to_string());
                args.push(WHOLE_INPUT_SEGMENT_TIME.to_string());
            }
            Some(times) => {
                args.push(arg.clone());
                args.push(times.clone());
            }
            None => args.push(arg.clone()),
        }
    }
    args
}

/// 找出引擎執行檔：優先使用設定值，其次從 PATH 尋找
pub fn resolve_binary(name: &str, configured: Option<&Path>) -> Result<PathBuf, String> {
    match configured {
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(path) => Err(format!("找不到 {name}: {}", path.display())),
        None => which::which(name).map_err(|e| format!("PATH 中找不到 {name}: {e}")),
    }
}

fn verify_binary(path: &Path) -> Result<(), String> {
    let output = Command::new(path)
        .arg("-version")
        .stdin(Stdio::null())
        .output()
        .map_err(|e| format!("無法執行 {}: {e}", path.display()))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(format!("{} -version 執行失敗", path.display()))
    }
}

/// 逐行讀取子程序輸出；非 UTF-8 內容以替代字元保留，確保管線持續被讀空
fn spawn_line_reader<R>(
    stream: R,
    tx: Sender<OutputLine>,
    wrap: fn(String) -> OutputLine,
) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        while let Ok(bytes) = reader.read_until(b'\n', &mut buf) {
            if bytes == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf).trim_end().to_string();
            buf.clear();
            if !line.is_empty() && tx.send(wrap(line)).is_err() {
                break;
            }
        }
    })
}

/// 由 `Duration:` 記錄與 `-progress` 輸出推算完成比例
#[derive(Debug, Default)]
struct ProgressTracker {
    total_ms: Option<u64>,
}

impl ProgressTracker {
    fn observe_log(&mut self, line: &str) {
        if self.total_ms.is_none() {
            self.total_ms = parse_log_duration_ms(line);
        }
    }

    fn observe_progress(&self, line: &str) -> Option<f64> {
        let (key, value) = line.trim().split_once('=')?;
        match key {
            "out_time_ms" | "out_time_us" => {
                let current = parse_out_time_ms(value)?;
                let total = self.total_ms.filter(|t| *t > 0)?;
                Some(current as f64 / total as f64)
            }
            "progress" if value == "end" => Some(1.0),
            _ => None,
        }
    }
}

fn parse_log_duration_ms(line: &str) -> Option<u64> {
    let caps = DURATION_PATTERN.captures(line)?;
    let h: u64 = caps[1].parse().ok()?;
    let m: u64 = caps[2].parse().ok()?;
    let s: f64 = caps[3].parse().ok()?;
    Some((h * 3600 + m * 60) * 1000 + (s * 1000.0).round() as u64)
}

fn parse_out_time_ms(raw: &str) -> Option<u64> {
    if let Ok(us) = raw.parse::<u64>() {
        return Some(us / 1000); // ffmpeg out_time_ms 單位為微秒
    }

    // 後備：解析 HH:MM:SS.micro
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() == 3 {
        let h = parts[0].parse::<u64>().ok()?;
        let m = parts[1].parse::<u64>().ok()?;
        let (s, frac) = match parts[2].split_once('.') {
            Some((sec, micro)) => (sec.parse::<u64>().ok()?, micro.parse::<u64>().unwrap_or(0)),
            None => (parts[2].parse::<u64>().ok()?, 0),
        };
        return Some((h * 3600 + m * 60 + s) * 1000 + frac / 1000);
    }
    None
}

//! 影片分段切割元件
//!
//! 使用 ffmpeg 以固定秒數將影片切成多段（串流複製）

mod artifact_collector;
mod duration_probe;
mod engine;
mod engine_invoker;
mod ffmpeg_command;
mod ffmpeg_engine;
mod job;
mod main;
mod presenter;
mod segment_planner;
mod terminal_observer;

pub use artifact_collector::{Artifact, RetrievalOutcome, collect_artifacts};
pub use duration_probe::{DurationProbe, FfprobeDurationProbe};
pub use engine::{Engine, EngineEvent};
pub use engine_invoker::{EngineInvoker, EngineLifecycle, progress_percent};
pub use ffmpeg_command::{EngineCommand, INPUT_NAME, OUTPUT_TEMPLATE, clip_name};
pub use ffmpeg_engine::{FfmpegEngine, FfmpegEngineSettings, resolve_binary};
pub use job::{JobObserver, JobState, JobSummary, SegmentJob};
pub use main::SegmentCutter;
pub use presenter::{DirectoryPresenter, Download, downloads};
pub use segment_planner::{MAX_CLIP_COUNT, SegmentPlan, plan};
pub use terminal_observer::TerminalObserver;

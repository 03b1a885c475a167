use super::artifact_collector::{Artifact, collect_artifacts};
use super::duration_probe::DurationProbe;
use super::engine::Engine;
use super::engine_invoker::EngineInvoker;
use super::ffmpeg_command::{EngineCommand, INPUT_NAME, clip_name};
use super::segment_planner::{SegmentPlan, plan};
use crate::error::{CutError, EngineIoError};
use crate::tools::MediaSource;
use log::{debug, error, info, warn};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// 一次成功切割的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub segment_length_seconds: u32,
    pub expected_clip_count: usize,
    pub artifacts: Vec<Artifact>,
}

impl JobSummary {
    #[must_use]
    pub fn retrieved_count(&self) -> usize {
        self.artifacts.iter().filter(|a| a.is_retrieved()).count()
    }

    /// 實際取得的段數少於規劃時為 true
    #[must_use]
    pub fn has_count_mismatch(&self) -> bool {
        self.retrieved_count() != self.expected_clip_count
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    Idle,
    ProbingDuration,
    LoadingEngine,
    Processing(u8),
    CollectingArtifacts,
    Done(Arc<JobSummary>),
    Failed(String),
}

impl JobState {
    /// 只有在閒置或上一次工作結束後才能開始新的工作
    #[must_use]
    pub const fn accepts_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Done(_) | Self::Failed(_))
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Failed(_))
    }

    fn can_advance_to(&self, next: &Self) -> bool {
        use JobState::{
            CollectingArtifacts, Done, Failed, Idle, LoadingEngine, Processing, ProbingDuration,
        };

        matches!(
            (self, next),
            (Idle | Done(_) | Failed(_), ProbingDuration)
                | (ProbingDuration, LoadingEngine | Processing(_))
                | (LoadingEngine, Processing(_))
                | (Processing(_), Processing(_) | CollectingArtifacts)
                | (CollectingArtifacts, Done(_))
                | (
                    ProbingDuration | LoadingEngine | Processing(_) | CollectingArtifacts,
                    Failed(_)
                )
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::ProbingDuration => write!(f, "ProbingDuration"),
            Self::LoadingEngine => write!(f, "LoadingEngine"),
            Self::Processing(p) => write!(f, "Processing({p}%)"),
            Self::CollectingArtifacts => write!(f, "CollectingArtifacts"),
            Self::Done(_) => write!(f, "Done"),
            Self::Failed(_) => write!(f, "Failed"),
        }
    }
}

/// 接收狀態轉換通知
///
/// 一次工作的通知只會在該工作進行中送出，進入 `Done`/`Failed` 後不會再有通知。
/// 通知時不持有狀態鎖，觀察者可以呼叫 `SegmentJob::state`。
pub trait JobObserver: Send + Sync {
    fn on_transition(&self, state: &JobState);
}

impl JobObserver for () {
    fn on_transition(&self, _state: &JobState) {}
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 串接探測、規劃、引擎執行與輸出收集的切割工作
///
/// 狀態依序前進：
/// `Idle -> ProbingDuration -> LoadingEngine* -> Processing -> CollectingArtifacts -> Done`，
/// 任何一步失敗都直接進入 `Failed`。引擎已就緒時略過 `LoadingEngine`。
pub struct SegmentJob<E: Engine, D: DurationProbe> {
    invoker: Arc<EngineInvoker<E>>,
    probe: D,
    segment_length_seconds: u32,
    state: Mutex<JobState>,
    observer: Box<dyn JobObserver>,
}

impl<E: Engine, D: DurationProbe> SegmentJob<E, D> {
    pub fn new(
        invoker: Arc<EngineInvoker<E>>,
        probe: D,
        segment_length_seconds: u32,
        observer: Box<dyn JobObserver>,
    ) -> Self {
        Self {
            invoker,
            probe,
            segment_length_seconds,
            state: Mutex::new(JobState::Idle),
            observer,
        }
    }

    #[must_use]
    pub fn state(&self) -> JobState {
        lock(&self.state).clone()
    }

    /// 執行一次完整的切割
    ///
    /// 工作進行中再次呼叫會回傳 `Busy`，且不影響進行中的工作。
    /// 其餘錯誤都會讓工作進入 `Failed`，並在那之前清除引擎中的輸入檔。
    pub fn start(&self, source: MediaSource) -> Result<Arc<JobSummary>, CutError> {
        self.begin()?;

        info!(
            "開始切割: {} ({} bytes, {})",
            source.path.display(),
            source.byte_len,
            source.mime_hint.unwrap_or("unknown")
        );

        let mut planned = None;
        let result = self.execute(&source, &mut planned);
        drop(source);
        self.cleanup(planned.as_ref());

        match result {
            Ok(summary) => match self.transition(JobState::Done(Arc::clone(&summary))) {
                Ok(()) => {
                    info!(
                        "切割完成: 取得 {}/{} 段",
                        summary.retrieved_count(),
                        summary.expected_clip_count
                    );
                    Ok(summary)
                }
                Err(e) => {
                    self.fail(&e);
                    Err(e)
                }
            },
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    fn begin(&self) -> Result<(), CutError> {
        let current = {
            let mut state = lock(&self.state);
            if !state.accepts_start() {
                warn!("已有切割工作進行中 ({state})，忽略新的請求");
                return Err(CutError::Busy);
            }
            // 上一次的結果在此釋放
            advance(&mut state, JobState::ProbingDuration)?
        };
        self.observer.on_transition(&current);
        Ok(())
    }

    fn execute(
        &self,
        source: &MediaSource,
        planned: &mut Option<SegmentPlan>,
    ) -> Result<Arc<JobSummary>, CutError> {
        let duration = self.probe.probe(source)?;
        let plan = plan(duration, self.segment_length_seconds)?;
        let command = EngineCommand::from_plan(&plan);
        info!(
            "分段: 長度 {:.2}s，切點 {}，共 {} 段",
            plan.total_duration_seconds(),
            command.segment_times().filter(|s| !s.is_empty()).unwrap_or("N/A"),
            plan.expected_clip_count()
        );
        let plan = planned.insert(plan);

        if !self.invoker.is_ready() {
            self.transition(JobState::LoadingEngine)?;
            self.invoker.initialize()?;
        }

        self.transition(JobState::Processing(0))?;
        let mut reader = source
            .open_reader()
            .map_err(|e| CutError::UnreadableMedia(format!("無法讀取輸入檔: {e}")))?;
        self.invoker.write_input_from(INPUT_NAME, &mut reader)?;
        drop(reader);

        self.invoker
            .run(&command, |percent| self.report_progress(percent))?;

        self.transition(JobState::CollectingArtifacts)?;
        let artifacts = collect_artifacts(&self.invoker, plan);

        Ok(Arc::new(JobSummary {
            segment_length_seconds: self.segment_length_seconds,
            expected_clip_count: plan.expected_clip_count(),
            artifacts,
        }))
    }

    fn report_progress(&self, percent: u8) {
        let next = JobState::Processing(percent);
        let current = {
            let mut state = lock(&self.state);
            if *state == next {
                return;
            }
            match advance(&mut state, next) {
                Ok(current) => current,
                Err(e) => {
                    debug!("忽略進度更新: {e}");
                    return;
                }
            }
        };
        self.observer.on_transition(&current);
    }

    /// 無論成功或失敗都會執行：刪除輸入檔，並移除本次的輸出檔以免下次誤取
    fn cleanup(&self, planned: Option<&SegmentPlan>) {
        match self.invoker.delete_input(INPUT_NAME) {
            Ok(()) => debug!("已刪除引擎中的輸入檔"),
            Err(e) => log_cleanup_failure(&e),
        }

        let Some(plan) = planned else {
            return;
        };
        for index in 1..=plan.expected_clip_count() {
            if let Err(e) = self.invoker.delete_output(&clip_name(index)) {
                log_cleanup_failure(&e);
            }
        }
    }

    /// 觀察者在狀態鎖釋放後才收到通知，因此可以在通知中讀取 `state()`
    fn transition(&self, next: JobState) -> Result<(), CutError> {
        let current = advance(&mut lock(&self.state), next)?;
        self.observer.on_transition(&current);
        Ok(())
    }

    /// 從目前狀態直接進入 `Failed`
    fn fail(&self, err: &CutError) {
        error!("切割失敗: {err}");
        let current = {
            let mut state = lock(&self.state);
            if state.is_terminal() {
                return;
            }
            *state = JobState::Failed(err.to_string());
            state.clone()
        };
        self.observer.on_transition(&current);
    }
}

/// 檢查並套用狀態轉換，回傳新狀態的副本供通知使用
fn advance(state: &mut JobState, next: JobState) -> Result<JobState, CutError> {
    if !state.can_advance_to(&next) {
        return Err(CutError::InvalidTransition {
            from: state.to_string(),
            to: next.to_string(),
        });
    }
    debug!("狀態 {state} -> {next}");
    *state = next;
    Ok(state.clone())
}

fn log_cleanup_failure(err: &EngineIoError) {
    if err.is_not_found() {
        debug!("清除時檔案已不存在: {}", err.name);
    } else {
        warn!("清除引擎檔案失敗: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> Arc<JobSummary> {
        Arc::new(JobSummary {
            segment_length_seconds: 60,
            expected_clip_count: 1,
            artifacts: Vec::new(),
        })
    }

    #[test]
    fn test_linear_transitions_allowed() {
        let path = [
            JobState::Idle,
            JobState::ProbingDuration,
            JobState::LoadingEngine,
            JobState::Processing(0),
            JobState::Processing(40),
            JobState::Processing(30),
            JobState::CollectingArtifacts,
            JobState::Done(summary()),
            JobState::ProbingDuration,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(&pair[1]), "{} -> {}", pair[0], pair[1]);
        }
        assert!(JobState::ProbingDuration.can_advance_to(&JobState::Processing(0)));
    }

    #[test]
    fn test_skips_and_reorders_rejected() {
        assert!(!JobState::Idle.can_advance_to(&JobState::Processing(0)));
        assert!(!JobState::ProbingDuration.can_advance_to(&JobState::CollectingArtifacts));
        assert!(!JobState::Processing(50).can_advance_to(&JobState::Done(summary())));
        assert!(!JobState::CollectingArtifacts.can_advance_to(&JobState::Processing(0)));
        assert!(!JobState::ProbingDuration.can_advance_to(&JobState::ProbingDuration));
        assert!(!JobState::Idle.can_advance_to(&JobState::Failed("x".to_string())));
        assert!(!JobState::Done(summary()).can_advance_to(&JobState::Failed("x".to_string())));
    }

    #[test]
    fn test_failed_reachable_from_every_active_state() {
        let failed = JobState::Failed("boom".to_string());
        for state in [
            JobState::ProbingDuration,
            JobState::LoadingEngine,
            JobState::Processing(10),
            JobState::CollectingArtifacts,
        ] {
            assert!(state.can_advance_to(&failed), "{state}");
            assert!(!state.accepts_start());
        }
    }

    #[test]
    fn test_accepts_start() {
        assert!(JobState::Idle.accepts_start());
        assert!(JobState::Done(summary()).accepts_start());
        assert!(JobState::Failed(String::new()).accepts_start());
    }

    #[test]
    fn test_summary_count_mismatch() {
        let summary = JobSummary {
            segment_length_seconds: 60,
            expected_clip_count: 3,
            artifacts: Vec::new(),
        };
        assert_eq!(summary.retrieved_count(), 0);
        assert!(summary.has_count_mismatch());
    }
}

use super::engine::{Engine, EngineEvent};
use super::ffmpeg_command::EngineCommand;
use crate::error::{CutError, EngineIoError};
use log::{debug, info};
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// 引擎的生命週期；整個程序只載入一次並重複使用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineLifecycle {
    Uninitialized,
    Initializing,
    Ready,
    Failed(String),
}

/// 管理引擎的初始化與執行
///
/// 同一時間只允許一個初始化與一個執行。
pub struct EngineInvoker<E: Engine> {
    engine: Mutex<E>,
    lifecycle: Mutex<EngineLifecycle>,
    lifecycle_changed: Condvar,
    running: AtomicBool,
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 將引擎回報的比例轉成 0..=100 的整數百分比
#[must_use]
pub fn progress_percent(ratio: f64) -> u8 {
    if !ratio.is_finite() {
        return 0;
    }
    (ratio * 100.0).floor().clamp(0.0, 100.0) as u8
}

impl<E: Engine> EngineInvoker<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine: Mutex::new(engine),
            lifecycle: Mutex::new(EngineLifecycle::Uninitialized),
            lifecycle_changed: Condvar::new(),
            running: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn lifecycle(&self) -> EngineLifecycle {
        lock(&self.lifecycle).clone()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        *lock(&self.lifecycle) == EngineLifecycle::Ready
    }

    /// 載入引擎；已就緒時直接返回
    ///
    /// 另一個執行緒正在載入時會等待其結果，而不是重複載入。
    pub fn initialize(&self) -> Result<(), CutError> {
        {
            let mut state = lock(&self.lifecycle);
            let mut waited = false;
            loop {
                match state.clone() {
                    EngineLifecycle::Ready => return Ok(()),
                    EngineLifecycle::Initializing => {
                        waited = true;
                        state = self
                            .lifecycle_changed
                            .wait(state)
                            .unwrap_or_else(PoisonError::into_inner);
                    }
                    EngineLifecycle::Failed(reason) if waited => {
                        return Err(CutError::EngineLoad { reason });
                    }
                    EngineLifecycle::Uninitialized | EngineLifecycle::Failed(_) => break,
                }
            }
            *state = EngineLifecycle::Initializing;
        }

        info!("載入切割引擎...");
        let result = lock(&self.engine).load();

        let mut state = lock(&self.lifecycle);
        let outcome = match result {
            Ok(()) => {
                *state = EngineLifecycle::Ready;
                Ok(())
            }
            Err(reason) => {
                *state = EngineLifecycle::Failed(reason.clone());
                Err(CutError::EngineLoad { reason })
            }
        };
        self.lifecycle_changed.notify_all();
        outcome
    }

    /// 執行一次分段指令
    ///
    /// 尚未就緒回傳 `EngineNotReady`；已有執行中的指令則立即回傳 `Busy`，不會呼叫引擎。
    pub fn run(
        &self,
        command: &EngineCommand,
        mut on_progress: impl FnMut(u8),
    ) -> Result<(), CutError> {
        if !self.is_ready() {
            return Err(CutError::EngineNotReady);
        }
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CutError::Busy);
        }
        let _guard = RunningGuard(&self.running);

        let mut sink = |event: EngineEvent| match event {
            EngineEvent::Progress(ratio) => on_progress(progress_percent(ratio)),
            EngineEvent::Log(line) => debug!("[ffmpeg] {line}"),
        };

        lock(&self.engine)
            .exec(command.argv(), &mut sink)
            .map_err(|message| CutError::EngineExecution { message })
    }

    pub fn write_input(&self, name: &str, bytes: &[u8]) -> Result<(), EngineIoError> {
        lock(&self.engine).write_file(name, bytes)
    }

    /// 以串流寫入輸入檔，大型影片不必整個載入記憶體
    pub fn write_input_from(&self, name: &str, reader: &mut dyn Read) -> Result<(), EngineIoError> {
        lock(&self.engine).write_file_from(name, reader)
    }

    pub fn read_output(&self, name: &str) -> Result<Vec<u8>, EngineIoError> {
        lock(&self.engine).read_file(name)
    }

    pub fn delete_input(&self, name: &str) -> Result<(), EngineIoError> {
        lock(&self.engine).delete_file(name)
    }

    pub fn delete_output(&self, name: &str) -> Result<(), EngineIoError> {
        lock(&self.engine).delete_file(name)
    }
}

use super::engine::Engine;
use super::engine_invoker::EngineInvoker;
use super::ffmpeg_command::clip_name;
use super::segment_planner::SegmentPlan;
use log::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalOutcome {
    Success,
    NotFound,
    Error(String),
}

/// 一段輸出影片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// 從 1 開始的序號
    pub index: usize,
    pub name: String,
    pub bytes: Option<Vec<u8>>,
    pub outcome: RetrievalOutcome,
}

impl Artifact {
    #[must_use]
    pub const fn is_retrieved(&self) -> bool {
        matches!(self.outcome, RetrievalOutcome::Success)
    }
}

/// 依規劃的段數逐一讀取輸出檔
///
/// 個別檔案缺少或讀取失敗只記錄在該筆結果中，不中斷其餘檔案。
pub fn collect_artifacts<E: Engine>(
    invoker: &EngineInvoker<E>,
    plan: &SegmentPlan,
) -> Vec<Artifact> {
    (1..=plan.expected_clip_count())
        .map(|index| {
            let name = clip_name(index);
            match invoker.read_output(&name) {
                Ok(bytes) => {
                    debug!("已取得 {name} ({} bytes)", bytes.len());
                    Artifact {
                        index,
                        name,
                        bytes: Some(bytes),
                        outcome: RetrievalOutcome::Success,
                    }
                }
                Err(e) if e.is_not_found() => {
                    warn!("找不到輸出檔 {name}");
                    Artifact {
                        index,
                        name,
                        bytes: None,
                        outcome: RetrievalOutcome::NotFound,
                    }
                }
                Err(e) => {
                    warn!("讀取輸出檔失敗 {name}: {e}");
                    Artifact {
                        index,
                        name,
                        bytes: None,
                        outcome: RetrievalOutcome::Error(e.to_string()),
                    }
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::segment_cutter::engine::EngineEvent;
    use crate::component::segment_cutter::segment_planner::plan;
    use crate::error::EngineIoError;
    use std::collections::HashMap;

    struct MapEngine {
        files: HashMap<String, Result<Vec<u8>, EngineIoError>>,
    }

    impl Engine for MapEngine {
        fn load(&mut self) -> Result<(), String> {
            Ok(())
        }

        fn write_file(&mut self, _name: &str, _bytes: &[u8]) -> Result<(), EngineIoError> {
            Ok(())
        }

        fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineIoError> {
            self.files
                .get(name)
                .cloned()
                .unwrap_or_else(|| Err(EngineIoError::not_found(name)))
        }

        fn delete_file(&mut self, _name: &str) -> Result<(), EngineIoError> {
            Ok(())
        }

        fn exec(
            &mut self,
            _argv: &[String],
            _events: &mut dyn FnMut(EngineEvent),
        ) -> Result<(), String> {
            Ok(())
        }
    }

    #[test]
    fn test_missing_clip_does_not_abort() {
        let files = [1, 2, 4, 5]
            .into_iter()
            .map(|i| (clip_name(i), Ok(vec![i as u8; 4])))
            .collect();
        let invoker = EngineInvoker::new(MapEngine { files });

        let artifacts = collect_artifacts(&invoker, &plan(290.0, 60).unwrap());

        assert_eq!(artifacts.len(), 5);
        assert_eq!(artifacts.iter().filter(|a| a.is_retrieved()).count(), 4);
        assert_eq!(artifacts[2].index, 3);
        assert_eq!(artifacts[2].name, "clip_003.mp4");
        assert_eq!(artifacts[2].outcome, RetrievalOutcome::NotFound);
        assert!(artifacts[2].bytes.is_none());
        assert_eq!(artifacts[4].bytes.as_deref(), Some(&[5u8; 4][..]));
    }

    #[test]
    fn test_other_errors_recorded_per_artifact() {
        let mut files = HashMap::new();
        files.insert(clip_name(1), Ok(vec![1]));
        files.insert(
            clip_name(2),
            Err(EngineIoError::other("clip_002.mp4", "permission denied")),
        );
        let invoker = EngineInvoker::new(MapEngine { files });

        let artifacts = collect_artifacts(&invoker, &plan(100.0, 60).unwrap());

        assert_eq!(artifacts.len(), 2);
        assert!(artifacts[0].is_retrieved());
        assert!(matches!(artifacts[1].outcome, RetrievalOutcome::Error(ref m) if m.contains("permission denied")));
    }

    #[test]
    fn test_single_clip_plan_requests_one() {
        let invoker = EngineInvoker::new(MapEngine {
            files: HashMap::new(),
        });
        let artifacts = collect_artifacts(&invoker, &plan(45.0, 60).unwrap());
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].name, "clip_001.mp4");
    }
}

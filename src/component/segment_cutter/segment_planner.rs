use crate::error::CutError;

/// 單次切割的段數上限，對應輸出樣板的三位數編號
pub const MAX_CLIP_COUNT: usize = 999;

/// 固定長度的分段規劃
///
/// `cut_points` 不含 0 與最後的結束點，長度恆為 `expected_clip_count - 1`。
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPlan {
    total_duration_seconds: f64,
    segment_length_seconds: u32,
    cut_points: Vec<u64>,
    expected_clip_count: usize,
}

impl SegmentPlan {
    #[must_use]
    pub const fn total_duration_seconds(&self) -> f64 {
        self.total_duration_seconds
    }

    #[must_use]
    pub const fn segment_length_seconds(&self) -> u32 {
        self.segment_length_seconds
    }

    #[must_use]
    pub fn cut_points(&self) -> &[u64] {
        &self.cut_points
    }

    #[must_use]
    pub const fn expected_clip_count(&self) -> usize {
        self.expected_clip_count
    }

    /// 以逗號串接的切點，例如 `60,120`；沒有切點時為空字串
    #[must_use]
    pub fn cut_point_list(&self) -> String {
        self.cut_points
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// 依影片長度與每段長度計算切點
///
/// 段數為 `ceil(duration / length)`，最少 1 段，超過 [`MAX_CLIP_COUNT`] 時拒絕。
/// 切點 `i` 為 `(i + 1) * length` 四捨五入到整數秒（`f64::round`，.5 遠離零）。
pub fn plan(duration_seconds: f64, segment_length_seconds: u32) -> Result<SegmentPlan, CutError> {
    if !duration_seconds.is_finite() || duration_seconds < 0.0 {
        return Err(CutError::InvalidPlanInput(format!(
            "影片長度必須為非負數: {duration_seconds}"
        )));
    }
    if segment_length_seconds == 0 {
        return Err(CutError::InvalidPlanInput("每段長度必須大於 0".to_string()));
    }

    let length = f64::from(segment_length_seconds);
    let clip_count = (duration_seconds / length).ceil();
    if clip_count > MAX_CLIP_COUNT as f64 {
        return Err(CutError::InvalidPlanInput(format!(
            "段數 {clip_count} 超過上限 {MAX_CLIP_COUNT}，請加大每段長度"
        )));
    }
    let expected_clip_count = (clip_count as usize).max(1);

    let cut_points = (1..expected_clip_count)
        .map(|i| (i as f64 * length).round() as u64)
        .collect();

    Ok(SegmentPlan {
        total_duration_seconds: duration_seconds,
        segment_length_seconds,
        cut_points,
        expected_clip_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_150_seconds() {
        let plan = plan(150.0, 60).unwrap();
        assert_eq!(plan.expected_clip_count(), 3);
        assert_eq!(plan.cut_points(), &[60, 120]);
        assert_eq!(plan.cut_point_list(), "60,120");
    }

    #[test]
    fn test_plan_shorter_than_segment() {
        let plan = plan(45.0, 60).unwrap();
        assert_eq!(plan.expected_clip_count(), 1);
        assert!(plan.cut_points().is_empty());
        assert_eq!(plan.cut_point_list(), "");
    }

    #[test]
    fn test_plan_zero_duration() {
        let plan = plan(0.0, 60).unwrap();
        assert_eq!(plan.expected_clip_count(), 1);
        assert!(plan.cut_points().is_empty());
    }

    #[test]
    fn test_plan_exact_multiple() {
        let plan = plan(120.0, 60).unwrap();
        assert_eq!(plan.expected_clip_count(), 2);
        assert_eq!(plan.cut_points(), &[60]);
    }

    #[test]
    fn test_plan_fractional_overflow_adds_clip() {
        let plan = plan(120.5, 60).unwrap();
        assert_eq!(plan.expected_clip_count(), 3);
        assert_eq!(plan.cut_points(), &[60, 120]);
    }

    #[test]
    fn test_plan_properties_over_range() {
        for length in [1u32, 7, 30, 60, 90] {
            for tenths in (0..5000).step_by(37) {
                let duration = f64::from(tenths) / 10.0;
                let plan = plan(duration, length).unwrap();
                let expected = ((duration / f64::from(length)).ceil() as usize).max(1);

                assert_eq!(plan.expected_clip_count(), expected);
                assert_eq!(plan.cut_points().len(), expected - 1);
                for (i, point) in plan.cut_points().iter().enumerate() {
                    assert_eq!(*point, (i as u64 + 1) * u64::from(length));
                }
                assert!(plan.cut_points().windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn test_plan_rejects_invalid_input() {
        assert!(matches!(plan(-1.0, 60), Err(CutError::InvalidPlanInput(_))));
        assert!(matches!(plan(f64::NAN, 60), Err(CutError::InvalidPlanInput(_))));
        assert!(matches!(
            plan(f64::INFINITY, 60),
            Err(CutError::InvalidPlanInput(_))
        ));
        assert!(matches!(plan(10.0, 0), Err(CutError::InvalidPlanInput(_))));
    }

    #[test]
    fn test_plan_clip_count_limit() {
        let at_limit = plan(999.0 * 60.0, 60).unwrap();
        assert_eq!(at_limit.expected_clip_count(), MAX_CLIP_COUNT);
        assert_eq!(at_limit.cut_points().len(), MAX_CLIP_COUNT - 1);

        assert!(matches!(
            plan(999.0 * 60.0 + 0.5, 60),
            Err(CutError::InvalidPlanInput(_))
        ));
        // 容器回報的異常長度不可造成巨量配置
        assert!(matches!(
            plan(9_223_372_036_854.775_807, 60),
            Err(CutError::InvalidPlanInput(_))
        ));
        assert!(matches!(plan(f64::MAX, 1), Err(CutError::InvalidPlanInput(_))));
    }
}

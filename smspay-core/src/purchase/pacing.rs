// src/purchase/pacing.rs

use std::collections::VecDeque;
use std::time::Duration;
use smspay_common::traits::purchase_traits::IntervalSource;

/// The waits between consecutive sends of one purchase run.
///
/// Progress is measured in time: the share of the plan's total seconds that
/// has already been waited out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingPlan {
    intervals: VecDeque<u32>,
    total_secs: u64,
    remaining_secs: u64,
}

impl PacingPlan {
    /// Draws `count` intervals from `source`.
    pub fn build(count: u32, source: &mut dyn IntervalSource) -> Self {
        Self::from_intervals((0..count).map(|_| source.next_interval().max(1)).collect())
    }

    pub fn from_intervals(intervals: Vec<u32>) -> Self {
        let total_secs = intervals.iter().map(|&i| u64::from(i)).sum();
        Self {
            intervals: intervals.into(),
            total_secs,
            remaining_secs: total_secs,
        }
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn total_seconds(&self) -> u64 {
        self.total_secs
    }

    /// Seconds still to wait, including the whole of the upcoming interval.
    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_secs
    }

    pub fn next_interval(&self) -> Option<u32> {
        self.intervals.front().copied()
    }

    /// Consumes the upcoming interval once it has been waited out.
    pub fn pop_interval(&mut self) -> Option<u32> {
        let next = self.intervals.pop_front()?;
        self.remaining_secs = self.remaining_secs.saturating_sub(u64::from(next));
        Some(next)
    }

    /// Progress in percent, given how much of the upcoming interval has elapsed.
    ///
    /// A plan with no waiting at all reports 0 until the purchase completes.
    pub fn percent(&self, elapsed_in_current: Duration) -> u8 {
        if self.total_secs == 0 {
            return 0;
        }
        let current_ms = u64::from(self.next_interval().unwrap_or(0)) * 1000;
        let elapsed_ms = (elapsed_in_current.as_millis() as u64).min(current_ms);
        let total_ms = self.total_secs * 1000;
        let remaining_ms = (self.remaining_secs * 1000).saturating_sub(elapsed_ms).min(total_ms);
        ((total_ms - remaining_ms) * 100 / total_ms).min(100) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<u32>);

    impl IntervalSource for Fixed {
        fn next_interval(&mut self) -> u32 {
            self.0.remove(0)
        }
    }

    #[test]
    fn build_draws_count_intervals() {
        let plan = PacingPlan::build(2, &mut Fixed(vec![5, 7, 99]));
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.total_seconds(), 12);
        assert_eq!(plan.next_interval(), Some(5));
    }

    #[test]
    fn zero_intervals_are_bumped_to_one_second() {
        let plan = PacingPlan::build(1, &mut Fixed(vec![0]));
        assert_eq!(plan.total_seconds(), 1);
    }

    #[test]
    fn percent_follows_elapsed_time() {
        let mut plan = PacingPlan::from_intervals(vec![5, 7]);
        assert_eq!(plan.percent(Duration::ZERO), 0);
        assert_eq!(plan.percent(Duration::from_secs(3)), 25);
        // Elapsed beyond the current interval is clamped.
        assert_eq!(plan.percent(Duration::from_secs(60)), 41);

        assert_eq!(plan.pop_interval(), Some(5));
        assert_eq!(plan.remaining_seconds(), 7);
        assert_eq!(plan.percent(Duration::ZERO), 41);
        assert_eq!(plan.percent(Duration::from_millis(3500)), 70);

        assert_eq!(plan.pop_interval(), Some(7));
        assert_eq!(plan.percent(Duration::ZERO), 100);
        assert!(plan.pop_interval().is_none());
    }

    #[test]
    fn percent_is_monotonic_over_a_run() {
        let mut plan = PacingPlan::from_intervals(vec![3, 1, 4, 1, 5]);
        let mut last = 0;
        while let Some(current) = plan.next_interval() {
            for ms in (0..=current * 1000).step_by(200) {
                let p = plan.percent(Duration::from_millis(u64::from(ms)));
                assert!(p >= last, "{p} < {last}");
                last = p;
            }
            plan.pop_interval();
        }
        assert_eq!(plan.percent(Duration::ZERO), 100);
    }

    #[test]
    fn empty_plan_reports_zero() {
        let plan = PacingPlan::from_intervals(vec![]);
        assert!(plan.is_empty());
        assert_eq!(plan.percent(Duration::from_secs(1)), 0);
    }
}

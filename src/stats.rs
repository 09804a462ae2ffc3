use crate::counter::RepCounter;
use num_traits::ToPrimitive;

/// Figures derived from a [`RepCounter`] on demand.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct SessionStats {
    pub(crate) total_attempts: u64,
    pub(crate) correct_pct: f64,
    pub(crate) goal_pct: f64,
}

fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    match (numerator.to_f64(), denominator.to_f64()) {
        (Some(numerator), Some(denominator)) => numerator / denominator * 100.0,
        _ => 0.0,
    }
}

impl SessionStats {
    pub(crate) fn derive(counter: &RepCounter, goal: u64) -> Self {
        let total_attempts = counter.correct_count() + counter.wrong_count();
        Self {
            total_attempts,
            correct_pct: percentage(counter.correct_count(), total_attempts),
            goal_pct: percentage(counter.squat_count(), goal),
        }
    }
}

/// Counters and percentages handed to the presentation layer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Snapshot {
    pub(crate) squat_count: u64,
    pub(crate) correct_count: u64,
    pub(crate) wrong_count: u64,
    pub(crate) correct_pct: f64,
    pub(crate) goal_pct: f64,
}

impl Snapshot {
    pub(crate) fn new(counter: &RepCounter, goal: u64) -> Self {
        let stats = SessionStats::derive(counter, goal);
        Self {
            squat_count: counter.squat_count(),
            correct_count: counter.correct_count(),
            wrong_count: counter.wrong_count(),
            correct_pct: stats.correct_pct,
            goal_pct: stats.goal_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionStats, Snapshot};
    use crate::{counter::RepCounter, stability::PostureLabel};
    use assert_approx_eq::assert_approx_eq;

    fn counter(correct: usize, wrong: usize) -> RepCounter {
        let mut counter = RepCounter::new();
        (0..correct).for_each(|_| counter.record_classification(PostureLabel::GoodForm));
        (0..wrong).for_each(|_| counter.record_classification(PostureLabel::BadForm));
        counter
    }

    #[test]
    fn correct_percentage() {
        let stats = SessionStats::derive(&counter(3, 1), 100);
        assert_eq!(stats.total_attempts, 4);
        assert_approx_eq!(stats.correct_pct, 75.0);
    }

    #[test]
    fn no_attempts() {
        let stats = SessionStats::derive(&RepCounter::new(), 100);
        assert_eq!(stats.total_attempts, 0);
        assert_eq!(stats.correct_pct, 0.0);
        assert_eq!(stats.goal_pct, 0.0);
    }

    #[test]
    fn goal_progress() {
        let mut counter = RepCounter::new();
        for _ in 0..5 {
            counter.on_confirmed(PostureLabel::GoodForm);
            counter.on_confirmed(PostureLabel::Stand);
        }
        assert_approx_eq!(SessionStats::derive(&counter, 20).goal_pct, 25.0);
        assert_eq!(SessionStats::derive(&counter, 0).goal_pct, 0.0);
    }

    #[test]
    fn snapshot_carries_counts() {
        let snapshot = Snapshot::new(&counter(1, 1), 100);
        assert_eq!(snapshot.squat_count, 0);
        assert_eq!(snapshot.correct_count, 1);
        assert_eq!(snapshot.wrong_count, 1);
        assert_approx_eq!(snapshot.correct_pct, 50.0);
    }
}

use std::time::Duration;

const DEFAULT_MIN_INFERENCE_INTERVAL_MS: &str = "100";
const DEFAULT_REQUIRED_STABLE_FRAMES: &str = "3";
const DEFAULT_SQUAT_GOAL: &str = "100";

#[derive(Debug, Clone, Copy, PartialEq, Eq, structopt::StructOpt)]
pub(crate) struct Config {
    /// Minimum spacing between two classifier invocations, in milliseconds.
    #[structopt(long, default_value = DEFAULT_MIN_INFERENCE_INTERVAL_MS)]
    pub(crate) min_inference_interval_ms: u64,

    /// Consecutive identical classifications needed to confirm a posture.
    #[structopt(long, default_value = DEFAULT_REQUIRED_STABLE_FRAMES)]
    pub(crate) required_stable_frames: u32,

    /// Number of squats that counts as 100% progress.
    #[structopt(long, default_value = DEFAULT_SQUAT_GOAL)]
    pub(crate) squat_goal: u64,
}

impl Config {
    pub(crate) fn min_inference_interval(&self) -> Duration {
        Duration::from_millis(self.min_inference_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_inference_interval_ms: DEFAULT_MIN_INFERENCE_INTERVAL_MS.parse().unwrap(),
            required_stable_frames: DEFAULT_REQUIRED_STABLE_FRAMES.parse().unwrap(),
            squat_goal: DEFAULT_SQUAT_GOAL.parse().unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use std::time::Duration;
    use structopt::StructOpt;

    #[test]
    fn command_line_defaults_match() {
        let parsed = Config::from_iter(vec!["reps"]);
        assert_eq!(parsed, Config::default());
        assert_eq!(parsed.min_inference_interval(), Duration::from_millis(100));
        assert_eq!(parsed.required_stable_frames, 3);
        assert_eq!(parsed.squat_goal, 100);
    }

    #[test]
    fn overrides() {
        let parsed = Config::from_iter(vec![
            "reps",
            "--required-stable-frames",
            "5",
            "--squat-goal",
            "20",
        ]);
        assert_eq!(parsed.required_stable_frames, 5);
        assert_eq!(parsed.squat_goal, 20);
        assert_eq!(parsed.min_inference_interval_ms, 100);
    }
}

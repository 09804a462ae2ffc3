use std::time::Duration;

/// Bounds how often the classifier runs, independent of the frame rate.
///
/// Timestamps are offsets from the start of the stream and must not go
/// backwards. Skipped frames are not queued.
#[derive(Debug, Clone)]
pub(crate) struct InferenceThrottle {
    min_interval: Duration,
    last_inference: Option<Duration>,
}

impl InferenceThrottle {
    pub(crate) fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_inference: None,
        }
    }

    pub(crate) fn should_infer(&mut self, now: Duration) -> bool {
        let ready = match self.last_inference {
            None => true,
            Some(last) => now.checked_sub(last).map_or(false, |elapsed| elapsed >= self.min_interval),
        };
        if ready {
            self.last_inference = Some(now);
        }
        ready
    }

    pub(crate) fn reset(&mut self) {
        self.last_inference = None;
    }
}

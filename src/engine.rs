use crate::{
    angle::AngleSet,
    classifier::Classifier,
    config::Config,
    counter::{RepCounter, Transition},
    event::{Event, EventSink},
    extract::extract_joints,
    features::FeatureVector,
    frame::{Delivery, Frame},
    stability::{PostureLabel, StabilityFilter},
    stats::{SessionStats, Snapshot},
    throttle::InferenceThrottle,
};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Runs the per-frame pipeline for one exercise session.
///
/// Not meant to be shared: every stateful stage is driven through `&mut self`
/// by a single worker.
pub(crate) struct Engine {
    config: Config,
    classifier: Option<Box<dyn Classifier>>,
    throttle: InferenceThrottle,
    filter: StabilityFilter,
    counter: RepCounter,
    pub(crate) timing: Timing,
}

#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct Timing {
    pub(crate) inference: Duration,
    pub(crate) inferences: usize,
    pub(crate) frames: usize,
}

impl Engine {
    /// An engine without a classifier. Poses and angles are still reported.
    pub(crate) fn new(config: Config) -> Self {
        Self {
            config,
            classifier: None,
            throttle: InferenceThrottle::new(config.min_inference_interval()),
            filter: StabilityFilter::new(config.required_stable_frames),
            counter: RepCounter::new(),
            timing: Default::default(),
        }
    }

    pub(crate) fn with_classifier<C>(config: Config, classifier: C) -> Self
    where
        C: Classifier + 'static,
    {
        let mut engine = Self::new(config);
        engine.classifier = Some(Box::new(classifier));
        engine
    }

    pub(crate) fn is_degraded(&self) -> bool {
        self.classifier.is_none()
    }

    pub(crate) fn counter(&self) -> &RepCounter {
        &self.counter
    }

    pub(crate) fn stats(&self) -> SessionStats {
        SessionStats::derive(&self.counter, self.config.squat_goal)
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot::new(&self.counter, self.config.squat_goal)
    }

    pub(crate) fn process<S>(&mut self, frame: &Frame, sink: &mut S)
    where
        S: EventSink,
    {
        self.timing.frames += 1;

        let joints = match extract_joints(&frame.persons, frame.width, frame.height) {
            Ok(joints) => joints,
            Err(error) => {
                trace!(
                    message = "skipping frame",
                    timestamp_ms = frame.timestamp_ms,
                    %error
                );
                sink.emit(Event::PoseLost);
                return;
            }
        };
        let angles = AngleSet::from_joints(&joints);
        sink.emit(Event::Pose { joints, angles });

        let classifier = match self.classifier.as_mut() {
            Some(classifier) => classifier,
            None => return,
        };
        if !self.throttle.should_infer(frame.timestamp()) {
            return;
        }

        let features = FeatureVector::new(&joints, &angles, frame.width, frame.height);
        let start_inference = Instant::now();
        let result = classifier.predict(&features);
        self.timing.inference += start_inference.elapsed();
        self.timing.inferences += 1;
        let label = result.unwrap_or_else(|error| {
            warn!(
                message = "classification failed",
                timestamp_ms = frame.timestamp_ms,
                %error
            );
            PostureLabel::Unknown
        });
        self.counter.record_classification(label);
        sink.emit(Event::Classified {
            label,
            snapshot: self.snapshot(),
        });

        let confirmed = self.filter.observe(label);
        debug!(
            message = "classified frame",
            timestamp_ms = frame.timestamp_ms,
            ?label,
            run_length = self.filter.run_length()
        );

        if let Some(confirmed) = confirmed {
            let transition = self.counter.on_confirmed(confirmed);
            match transition {
                Some(Transition::CompletedRep) => info!(
                    message = "completed rep",
                    squat_count = self.counter.squat_count(),
                    correct_count = self.counter.correct_count(),
                    wrong_count = self.counter.wrong_count()
                ),
                Some(Transition::EnteredRep) => {
                    debug!(message = "entered rep", label = ?confirmed)
                }
                None => {}
            }
            sink.emit(Event::Confirmed {
                label: confirmed,
                transition,
                snapshot: self.snapshot(),
            });
        }
    }

    /// Apply a reader delivery: a pending reset first, then its frame.
    pub(crate) fn deliver<S>(&mut self, delivery: &Delivery, sink: &mut S)
    where
        S: EventSink,
    {
        if delivery.reset {
            self.reset_session();
        }
        if let Some(frame) = delivery.frame.as_ref() {
            self.process(frame, sink);
        }
    }

    /// Start a new session: counters, debouncing and throttling start over.
    pub(crate) fn reset_session(&mut self) {
        self.counter.reset();
        self.filter.reset();
        self.throttle.reset();
        info!(message = "session reset");
    }

    /// Release the classifier. Safe to call any number of times, including on
    /// an engine that never had a classifier.
    pub(crate) fn shutdown(&mut self) {
        if let Some(mut classifier) = self.classifier.take() {
            classifier.close();
            debug!(message = "classifier closed");
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::Engine;
    use crate::{
        classifier::Classifier,
        config::Config,
        counter::Transition,
        error::Error,
        event::Event,
        frame::{Delivery, Frame},
        pose::Landmark,
        stability::PostureLabel::{self, *},
    };
    use assert_approx_eq::assert_approx_eq;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn frame(timestamp_ms: u64) -> Frame {
        Frame {
            timestamp_ms,
            width: 640,
            height: 480,
            persons: vec![vec![Landmark { x: 0.5, y: 0.5 }; 33]],
        }
    }

    fn empty_frame(timestamp_ms: u64) -> Frame {
        Frame {
            persons: vec![],
            ..frame(timestamp_ms)
        }
    }

    fn scripted(
        script: Vec<Result<PostureLabel, Error>>,
    ) -> impl FnMut(&[f32]) -> Result<PostureLabel, Error> + Send {
        let mut script = script.into_iter();
        move |features: &[f32]| {
            assert_eq!(features.len(), 20);
            script.next().unwrap_or(Ok(Stand))
        }
    }

    fn engine(script: Vec<PostureLabel>) -> Engine {
        Engine::with_classifier(
            Config::default(),
            scripted(script.into_iter().map(Ok).collect()),
        )
    }

    fn run(engine: &mut Engine, frames: impl IntoIterator<Item = Frame>) -> Vec<Event> {
        let mut events = vec![];
        for frame in frames {
            engine.process(&frame, &mut events);
        }
        events
    }

    fn every_100ms(count: u64) -> impl Iterator<Item = Frame> {
        (0..count).map(|i| frame(i * 100))
    }

    fn classified(events: &[Event]) -> Vec<PostureLabel> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::Classified { label, .. } => Some(*label),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn counts_one_rep() {
        let mut engine = engine(vec![Stand, GoodForm, GoodForm, GoodForm, Stand, Stand, Stand]);
        let events = run(&mut engine, every_100ms(7));

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.squat_count, 1);
        assert_eq!(snapshot.correct_count, 3);
        assert_eq!(snapshot.wrong_count, 0);
        assert_approx_eq!(snapshot.correct_pct, 100.0);
        assert_approx_eq!(snapshot.goal_pct, 1.0);

        let transitions = events
            .iter()
            .filter_map(|event| match event {
                Event::Confirmed { transition, .. } => Some(*transition),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(
            transitions,
            vec![Some(Transition::EnteredRep), Some(Transition::CompletedRep)]
        );
    }

    #[test]
    fn latest_status_includes_completed_rep() {
        let mut engine = engine(vec![GoodForm, GoodForm, GoodForm, Stand, Stand, Stand]);
        let events = run(&mut engine, every_100ms(6));

        let (label, snapshot) = events.iter().rev().find_map(Event::status).unwrap();
        assert_eq!(label, Stand);
        assert_eq!(snapshot.squat_count, 1);
        assert_eq!(snapshot.correct_count, 3);
        assert_eq!(*snapshot, engine.snapshot());
    }

    #[test]
    fn throttles_classification() {
        let mut engine = engine(vec![GoodForm, BadForm, Stand]);
        let events = run(&mut engine, vec![frame(0), frame(50), frame(110), frame(150)]);

        assert_eq!(classified(&events), vec![GoodForm, BadForm]);
        assert_eq!(engine.timing.inferences, 2);
        assert_eq!(engine.timing.frames, 4);
        let poses = events
            .iter()
            .filter(|event| matches!(event, Event::Pose { .. }))
            .count();
        assert_eq!(poses, 4);
    }

    #[test]
    fn missing_person_is_skipped() {
        let mut engine = engine(vec![GoodForm, GoodForm, GoodForm]);
        let events = run(
            &mut engine,
            vec![empty_frame(0), frame(10), empty_frame(200), frame(220)],
        );

        assert_eq!(events[0], Event::PoseLost);
        assert_eq!(classified(&events), vec![GoodForm, GoodForm]);
        assert!(!engine.counter().in_down_phase());
    }

    #[test]
    fn short_landmark_list_is_skipped() {
        let mut engine = engine(vec![GoodForm]);
        let mut short = frame(0);
        short.persons[0].truncate(20);
        let events = run(&mut engine, vec![short]);
        assert_eq!(events, vec![Event::PoseLost]);
        assert_eq!(engine.timing.inferences, 0);
    }

    #[test]
    fn classifier_failure_is_unknown() {
        let mut engine = Engine::with_classifier(
            Config::default(),
            scripted(vec![
                Ok(Stand),
                Ok(Stand),
                Err(Error::ClassifierUnavailable("boom".to_owned())),
                Ok(Stand),
            ]),
        );
        let events = run(&mut engine, every_100ms(4));

        assert_eq!(classified(&events), vec![Stand, Stand, Unknown, Stand]);
        let confirmed = events
            .iter()
            .filter(|event| matches!(event, Event::Confirmed { .. }))
            .count();
        assert_eq!(confirmed, 1);
    }

    #[test]
    fn degraded_engine_still_reports_angles() {
        let mut engine = Engine::new(Config::default());
        assert!(engine.is_degraded());
        let events = run(&mut engine, every_100ms(3));
        assert_eq!(events.len(), 3);
        assert!(events
            .iter()
            .all(|event| matches!(event, Event::Pose { .. })));
        assert_eq!(engine.stats().total_attempts, 0);
    }

    struct CountingClose {
        closed: Arc<AtomicUsize>,
    }

    impl Classifier for CountingClose {
        fn predict(&mut self, _features: &[f32]) -> Result<PostureLabel, Error> {
            Ok(Stand)
        }

        fn close(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn classifier_closed_exactly_once() {
        let closed = Arc::new(AtomicUsize::new(0));
        let mut engine = Engine::with_classifier(
            Config::default(),
            CountingClose {
                closed: closed.clone(),
            },
        );
        engine.shutdown();
        engine.shutdown();
        assert!(engine.is_degraded());
        drop(engine);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_closes_classifier() {
        let closed = Arc::new(AtomicUsize::new(0));
        drop(Engine::with_classifier(
            Config::default(),
            CountingClose {
                closed: closed.clone(),
            },
        ));
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reset_session_starts_over() {
        let mut engine = engine(vec![GoodForm, GoodForm, GoodForm, Stand, Stand, Stand, Stand]);
        run(&mut engine, every_100ms(6));
        assert_eq!(engine.counter().squat_count(), 1);

        engine.reset_session();
        assert_eq!(engine.snapshot().squat_count, 0);
        assert_eq!(engine.stats().total_attempts, 0);

        // throttle reopened: a frame at an earlier timestamp classifies again
        let events = run(&mut engine, vec![frame(0)]);
        assert_eq!(classified(&events), vec![Stand]);
    }

    #[test]
    fn delivered_reset_applies_before_frame() {
        let mut engine = engine(vec![GoodForm, GoodForm, GoodForm, Stand, Stand, Stand, GoodForm]);
        run(&mut engine, every_100ms(6));
        assert_eq!(engine.counter().squat_count(), 1);

        let mut events = vec![];
        engine.deliver(
            &Delivery {
                reset: true,
                frame: Some(frame(600)),
            },
            &mut events,
        );
        assert_eq!(classified(&events), vec![GoodForm]);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.squat_count, 0);
        assert_eq!(snapshot.correct_count, 1);
        assert_eq!(engine.timing.frames, 7);
    }

    #[test]
    fn reset_only_delivery_emits_nothing() {
        let mut engine = engine(vec![GoodForm]);
        run(&mut engine, every_100ms(1));

        let mut events = vec![];
        engine.deliver(
            &Delivery {
                reset: true,
                frame: None,
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(engine.stats().total_attempts, 0);
    }
}

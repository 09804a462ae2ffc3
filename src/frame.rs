use crate::pose::Landmark;
use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use std::time::{Duration, Instant};

/// One frame of pose-source output.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub(crate) struct Frame {
    /// Capture time in milliseconds. Only differences between frames matter.
    pub(crate) timestamp_ms: u64,
    pub(crate) width: u32,
    pub(crate) height: u32,
    /// Detected persons, each an ordered list of body-model landmarks.
    #[serde(default)]
    pub(crate) persons: Vec<Vec<Landmark>>,
}

impl Frame {
    pub(crate) fn timestamp(&self) -> Duration {
        Duration::from_millis(self.timestamp_ms)
    }
}

/// A line of the frame stream: either a frame or a control record such as
/// `{"reset": true}`.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(untagged)]
pub(crate) enum Record {
    Frame(Frame),
    Control(Control),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Control {
    /// Start a new session before the next frame.
    pub(crate) reset: bool,
}

/// The unit handed from the reader to the pipeline worker.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Delivery {
    pub(crate) reset: bool,
    pub(crate) frame: Option<Frame>,
}

impl Delivery {
    /// Merge an undelivered `older` item into `newer`. A pending reset always
    /// survives; a frame older than a reset is dropped.
    pub(crate) fn coalesce(older: Self, newer: Self) -> Self {
        let frame = if newer.reset || newer.frame.is_some() {
            newer.frame
        } else {
            older.frame
        };
        Self {
            reset: older.reset || newer.reset,
            frame,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        !self.reset && self.frame.is_none()
    }
}

impl From<Record> for Delivery {
    fn from(record: Record) -> Self {
        match record {
            Record::Frame(frame) => Self {
                reset: false,
                frame: Some(frame),
            },
            Record::Control(Control { reset }) => Self { reset, frame: None },
        }
    }
}

/// Maps recorded timestamps onto the wall clock, anchored at the first frame
/// seen.
#[derive(Debug, Default)]
pub(crate) struct Pacer {
    origin: Option<(Instant, Duration)>,
}

impl Pacer {
    /// When a frame stamped `timestamp` is due. Timestamps earlier than the
    /// first frame are due immediately.
    pub(crate) fn due(&mut self, timestamp: Duration, now: Instant) -> Instant {
        let (start, first) = *self.origin.get_or_insert((now, timestamp));
        start + timestamp.saturating_sub(first)
    }
}

/// Sending half of a single-slot channel that always holds the newest item.
///
/// A consumer that falls behind sees only the latest frame; older undelivered
/// frames are discarded.
pub(crate) struct LatestSender<T> {
    tx: Sender<T>,
    stale: Receiver<T>,
}

pub(crate) fn latest<T>() -> (LatestSender<T>, Receiver<T>) {
    let (tx, rx) = bounded(1);
    (
        LatestSender {
            tx,
            stale: rx.clone(),
        },
        rx,
    )
}

impl<T> LatestSender<T> {
    /// Put `item` in the slot. An undelivered item already waiting there is
    /// taken out and folded in with `merge(older, newer)`. Returns the number
    /// of undelivered items that were replaced.
    pub(crate) fn send<F>(&self, mut item: T, mut merge: F) -> usize
    where
        F: FnMut(T, T) -> T,
    {
        let mut discarded = 0;
        loop {
            match self.tx.try_send(item) {
                Ok(()) => return discarded,
                Err(TrySendError::Full(back)) => {
                    item = match self.stale.try_recv() {
                        Ok(stale) => {
                            discarded += 1;
                            merge(stale, back)
                        }
                        Err(_) => back,
                    };
                }
                // unreachable while `stale` keeps a receiver alive
                Err(TrySendError::Disconnected(_)) => return discarded,
            }
        }
    }

    /// Block until the slot is free, then deliver `item` without discarding
    /// anything.
    pub(crate) fn send_lossless(&self, item: T) {
        let _ = self.tx.send(item);
    }
}

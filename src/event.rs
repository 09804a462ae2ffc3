use crate::{
    angle::AngleSet,
    counter::Transition,
    pose::JointSet,
    stability::PostureLabel,
    stats::Snapshot,
};
use std::sync::mpsc::Sender;

/// Everything the pipeline tells the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    /// Joints and angles of the person in the current frame.
    Pose { joints: JointSet, angles: AngleSet },
    /// The current frame has no usable person; overlays should be cleared.
    PoseLost,
    /// The classifier ran on this frame.
    Classified {
        label: PostureLabel,
        snapshot: Snapshot,
    },
    /// The stability filter confirmed a label.
    Confirmed {
        label: PostureLabel,
        transition: Option<Transition>,
        snapshot: Snapshot,
    },
}

impl Event {
    /// The label and session snapshot carried by the event, if any. The
    /// snapshot on `Confirmed` is the newest one for its frame.
    pub(crate) fn status(&self) -> Option<(PostureLabel, &Snapshot)> {
        match self {
            Event::Classified { label, snapshot } | Event::Confirmed { label, snapshot, .. } => {
                Some((*label, snapshot))
            }
            Event::Pose { .. } | Event::PoseLost => None,
        }
    }
}

/// Receives events from the pipeline. Delivery is fire-and-forget.
pub(crate) trait EventSink {
    fn emit(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) {
        self.push(event);
    }
}

impl EventSink for Sender<Event> {
    fn emit(&mut self, event: Event) {
        // a hung-up receiver only means nobody is watching anymore
        let _ = self.send(event);
    }
}

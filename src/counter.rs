use crate::stability::PostureLabel;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Phase {
    StandingOutsideRep,
    InRep,
}

/// What a confirmed label did to the counter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Transition {
    EnteredRep,
    CompletedRep,
}

/// Counts repetitions from confirmed posture labels and scores every
/// classification as it arrives.
///
/// `squat_count` moves once per down-and-up cycle while `correct_count` and
/// `wrong_count` move once per classification, so a single rep usually
/// contributes several scored classifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RepCounter {
    in_down_phase: bool,
    squat_count: u64,
    correct_count: u64,
    wrong_count: u64,
}

impl RepCounter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn phase(&self) -> Phase {
        if self.in_down_phase {
            Phase::InRep
        } else {
            Phase::StandingOutsideRep
        }
    }

    pub(crate) fn in_down_phase(&self) -> bool {
        self.in_down_phase
    }

    pub(crate) fn squat_count(&self) -> u64 {
        self.squat_count
    }

    pub(crate) fn correct_count(&self) -> u64 {
        self.correct_count
    }

    pub(crate) fn wrong_count(&self) -> u64 {
        self.wrong_count
    }

    /// Score a single classifier result.
    pub(crate) fn record_classification(&mut self, label: PostureLabel) {
        match label {
            PostureLabel::GoodForm => self.correct_count += 1,
            PostureLabel::BadForm => self.wrong_count += 1,
            PostureLabel::Stand | PostureLabel::Unknown => {}
        }
    }

    /// Advance the state machine with a label confirmed by the stability
    /// filter. Repeated confirmations of the same label are no-ops.
    pub(crate) fn on_confirmed(&mut self, label: PostureLabel) -> Option<Transition> {
        match (self.phase(), label) {
            (Phase::StandingOutsideRep, label) if label.is_squat() => {
                self.in_down_phase = true;
                Some(Transition::EnteredRep)
            }
            (Phase::InRep, PostureLabel::Stand) => {
                self.in_down_phase = false;
                self.squat_count += 1;
                Some(Transition::CompletedRep)
            }
            _ => None,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

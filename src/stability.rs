use num_derive::FromPrimitive;

/// Output classes of the posture classifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
pub(crate) enum PostureLabel {
    Unknown = -1,
    Stand = 0,
    GoodForm = 1,
    BadForm = 2,
}

impl PostureLabel {
    /// Whether the label describes a person inside a squat.
    pub(crate) fn is_squat(self) -> bool {
        matches!(self, PostureLabel::GoodForm | PostureLabel::BadForm)
    }
}

/// Suppresses label flicker: a label is confirmed once it has been seen on
/// `required` consecutive inferences, and stays confirmed while it repeats.
#[derive(Debug, Clone)]
pub(crate) struct StabilityFilter {
    required: u32,
    last_label: PostureLabel,
    run_length: u32,
}

impl StabilityFilter {
    pub(crate) fn new(required: u32) -> Self {
        Self {
            required: required.max(1),
            last_label: PostureLabel::Unknown,
            run_length: 0,
        }
    }

    pub(crate) fn observe(&mut self, label: PostureLabel) -> Option<PostureLabel> {
        // failed classifications never touch the run
        if label == PostureLabel::Unknown {
            return None;
        }

        if label == self.last_label {
            self.run_length = self.run_length.saturating_add(1);
        } else {
            self.last_label = label;
            self.run_length = 1;
        }

        if self.run_length >= self.required {
            Some(label)
        } else {
            None
        }
    }

    pub(crate) fn run_length(&self) -> u32 {
        self.run_length
    }

    pub(crate) fn reset(&mut self) {
        self.last_label = PostureLabel::Unknown;
        self.run_length = 0;
    }
}

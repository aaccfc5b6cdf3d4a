use indexmap::IndexMap;

/// Field values collected for one submission, keyed by field name in form order.
pub type FormData = IndexMap<String, String>;

/// Two-valued lifecycle flag gating submission.
///
/// `Idle → Submitting` on a validated submit, `Submitting → Idle` when the endpoint
/// settles (or the attempt is abandoned). There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
}

/// How a submission attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Succeeded,
    Failed(String),
    /// The submission future was dropped before the endpoint settled
    Abandoned,
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Succeeded)
    }
}

/// Visual state of the submit control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControl {
    pub disabled: bool,
    pub loading: bool,
    pub label: String,
}

impl SubmitControl {
    pub fn idle(label: impl Into<String>) -> Self {
        Self {
            disabled: false,
            loading: false,
            label: label.into(),
        }
    }

    pub fn loading(label: impl Into<String>) -> Self {
        Self {
            disabled: true,
            loading: true,
            label: label.into(),
        }
    }
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self::idle("Submit")
    }
}

/// Single source of truth for the form's submission lifecycle.
///
/// Wrapped in `Arc<RwLock<_>>` by [`crate::state::StateManager`]; field values and
/// error displays are not stored here, they belong to the
/// [`FieldSource`](crate::ui::FieldSource).
#[derive(Clone, Debug, Default)]
pub struct FormState {
    pub submission: SubmissionState,
    pub submit_control: SubmitControl,

    /// Number of submissions that reached the endpoint
    pub attempts: usize,
    pub last_outcome: Option<SubmissionOutcome>,
}

impl FormState {
    pub fn is_submitting(&self) -> bool {
        self.submission == SubmissionState::Submitting
    }
}

use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Message sent to the room when the NLU service cannot be reached.
pub const FALLBACK_MESSAGE: &str = "Unable to communicate with AWS Lex.";

/// Dialog status returned by the NLU service for a single `PostText` call.
///
/// Statuses the service may add in the future land in `Unrecognized`, which
/// drives no state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogOutcome {
    ConfirmIntent,
    ElicitSlot,
    ElicitIntent,
    Failed,
    Fulfilled,
    ReadyForFulfillment,
    Unrecognized,
}

/// What a [`DialogOutcome`] means for the per-room conversation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    /// More input is needed; the dialog stays (or becomes) active.
    Continue,
    /// The dialog turn concluded; the conversation state is cleared.
    Stop,
    /// Unknown status; leave the conversation state untouched.
    Inert,
}

impl DialogOutcome {
    pub fn action(&self) -> DialogAction {
        match self {
            DialogOutcome::ConfirmIntent | DialogOutcome::ElicitSlot => DialogAction::Continue,
            DialogOutcome::ElicitIntent | DialogOutcome::Failed | DialogOutcome::Fulfilled | DialogOutcome::ReadyForFulfillment => DialogAction::Stop,
            DialogOutcome::Unrecognized => DialogAction::Inert,
        }
    }
}

/// Response from a single NLU request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NluReply {
    /// The dialog status for this turn.
    pub outcome: DialogOutcome,
    /// User-facing text to relay back to the room, if the service produced any.
    pub message: Option<String>,
}

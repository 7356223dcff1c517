use crate::sync::Outcome;
use crate::sync::coordinator::AttemptId;

/// Result of one load attempt, delivered back to the widget's event queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub attempt: AttemptId,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Item CRUD
    AddItem(String),
    DeleteItem(u64),
    ToggleCompleted(u64),

    // Edit session
    BeginEdit(u64),
    UpdateDraft(String),
    CommitEdit,
    CancelEdit,

    // Remote
    RequestFetch,
    LoadSettled(Settlement),

    // Lifecycle
    Close,
}

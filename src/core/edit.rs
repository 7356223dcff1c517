use super::item::Item;
use super::list::ListStore;

/// Draft-editing state for at most one item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditSession {
    #[default]
    NotEditing,
    Editing { id: u64, draft: String },
}

impl EditSession {
    /// Starts editing `item`, silently replacing any session already open.
    pub fn begin(&mut self, item: &Item) {
        *self = Self::Editing {
            id: item.id,
            draft: item.text.clone(),
        };
    }

    pub fn update_draft(&mut self, text: &str) {
        if let Self::Editing { draft, .. } = self {
            *draft = text.to_string();
        }
    }

    /// Writes the draft back to the list and closes the session.
    pub fn commit(&mut self, list: &mut ListStore) {
        if let Self::Editing { id, draft } = std::mem::take(self) {
            list.set_text(id, &draft);
        }
    }

    pub fn cancel(&mut self) {
        *self = Self::NotEditing;
    }

    pub fn editing_id(&self) -> Option<u64> {
        match self {
            Self::Editing { id, .. } => Some(*id),
            Self::NotEditing => None,
        }
    }

    pub fn draft(&self) -> Option<&str> {
        match self {
            Self::Editing { draft, .. } => Some(draft.as_str()),
            Self::NotEditing => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }
}

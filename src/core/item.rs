use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Item {
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }
}

/// The three items the simulated remote serves when no fixture is configured.
pub fn default_fixture() -> Vec<Item> {
    vec![
        Item::new(1, "Learn Rust"),
        Item::new(2, "Build a task list"),
        Item::new(3, "Wire up the remote fetch"),
    ]
}

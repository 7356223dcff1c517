use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use super::{LoadError, RemoteSource};
use crate::core::item::Item;

/// Test remote: each call takes the next scripted (delay, result) pair.
#[derive(Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<(Duration, Result<Vec<Item>, LoadError>)>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_ok(self, delay_ms: u64, items: Vec<Item>) -> Self {
        self.push(delay_ms, Ok(items))
    }

    pub fn then_err(self, delay_ms: u64, message: &str) -> Self {
        self.push(delay_ms, Err(LoadError::Remote(message.to_string())))
    }

    fn push(self, delay_ms: u64, result: Result<Vec<Item>, LoadError>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back((Duration::from_millis(delay_ms), result));
        self
    }
}

impl RemoteSource for ScriptedSource {
    async fn load_items(&self) -> Result<Vec<Item>, LoadError> {
        let next = self.script.lock().unwrap().pop_front();
        let (delay, result) = next.unwrap_or_else(|| {
            (Duration::ZERO, Err(LoadError::Remote("script exhausted".to_string())))
        });
        tokio::time::sleep(delay).await;
        result
    }
}

pub fn items(texts: &[(u64, &str)]) -> Vec<Item> {
    texts.iter().map(|&(id, text)| Item::new(id, text)).collect()
}

use std::sync::Arc;

use super::item::Item;

/// An immutable, insertion-ordered list of items.
///
/// Every transition builds a fresh allocation, and a transition that changes
/// nothing hands back the same allocation, so observers can detect changes
/// with [`ItemList::ptr_eq`] alone.
#[derive(Debug, Clone)]
pub struct ItemList {
    items: Arc<[Item]>,
}

impl Default for ItemList {
    fn default() -> Self {
        Self::from(Vec::new())
    }
}

impl From<Vec<Item>> for ItemList {
    fn from(items: Vec<Item>) -> Self {
        Self { items: items.into() }
    }
}

impl PartialEq for ItemList {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for ItemList {}

impl ItemList {
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: u64) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.get(id).is_some()
    }

    /// Number of items not yet completed.
    pub fn remaining(&self) -> usize {
        self.items.iter().filter(|item| !item.completed).count()
    }

    /// Next id under the max-of-existing policy: one past the largest id, or 1.
    /// `None` once an item already holds `u64::MAX`.
    pub fn next_id(&self) -> Option<u64> {
        self.items.iter().map(|item| item.id).max().unwrap_or(0).checked_add(1)
    }

    /// Appends a new incomplete item. Blank text is ignored, as is any add
    /// once ids are exhausted.
    pub fn with_added(&self, text: &str) -> Self {
        if text.trim().is_empty() {
            return self.clone();
        }
        let Some(id) = self.next_id() else {
            return self.clone();
        };
        let mut items = self.items.to_vec();
        items.push(Item::new(id, text));
        Self::from(items)
    }

    pub fn without(&self, id: u64) -> Self {
        if !self.contains(id) {
            return self.clone();
        }
        let items: Vec<Item> = self.items.iter().filter(|item| item.id != id).cloned().collect();
        Self::from(items)
    }

    /// Replaces the text of an item. Unlike `with_added`, empty text is kept.
    pub fn with_text(&self, id: u64, text: &str) -> Self {
        self.map_item(id, |item| item.text = text.to_string())
    }

    pub fn with_toggled(&self, id: u64) -> Self {
        self.map_item(id, |item| item.completed = !item.completed)
    }

    fn map_item(&self, id: u64, f: impl FnOnce(&mut Item)) -> Self {
        let Some(pos) = self.items.iter().position(|item| item.id == id) else {
            return self.clone();
        };
        let mut items = self.items.to_vec();
        f(&mut items[pos]);
        Self::from(items)
    }
}

impl<'a> IntoIterator for &'a ItemList {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sole owner of the current list. All mutation goes through here.
#[derive(Debug, Default)]
pub struct ListStore {
    current: ItemList,
}

impl ListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cheap handle to the current list value.
    pub fn items(&self) -> ItemList {
        self.current.clone()
    }

    pub fn get(&self, id: u64) -> Option<&Item> {
        self.current.get(id)
    }

    pub fn add(&mut self, text: &str) {
        if text.trim().is_empty() {
            log::debug!("Ignoring blank item");
            return;
        }
        if self.current.next_id().is_none() {
            log::warn!("Item ids exhausted, ignoring add");
            return;
        }
        self.current = self.current.with_added(text);
        log::debug!("Added item, list now has {} items", self.current.len());
    }

    pub fn remove(&mut self, id: u64) {
        self.current = self.current.without(id);
    }

    pub fn set_text(&mut self, id: u64, text: &str) {
        self.current = self.current.with_text(id, text);
    }

    pub fn toggle_completed(&mut self, id: u64) {
        self.current = self.current.with_toggled(id);
    }

    /// Wholesale replace. Only a successful load calls this.
    pub fn replace_all(&mut self, items: Vec<Item>) {
        self.current = ItemList::from(items);
    }
}

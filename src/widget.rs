use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::config::WidgetConfig;
use crate::core::edit::EditSession;
use crate::core::list::{ItemList, ListStore};
use crate::message::Message;
use crate::sync::coordinator::FetchCoordinator;
use crate::sync::{LoadState, RemoteSource};

/// Read-only view handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub items: ItemList,
    pub load_state: LoadState,
    pub edit: EditSession,
    pub last_loaded: Option<NaiveDateTime>,
}

/// Presentation collaborator: draws snapshots, sends intents via [`Widget::sender`].
pub trait Render {
    fn render(&mut self, snapshot: &Snapshot);
}

/// The list widget: one event queue, three pieces of owned state.
pub struct Widget<S> {
    list: ListStore,
    fetch: FetchCoordinator<S>,
    edit: EditSession,
    sender: UnboundedSender<Message>,
    events: UnboundedReceiver<Message>,
    mounted: bool,
}

impl<S: RemoteSource> Widget<S> {
    pub fn new(source: S, config: &WidgetConfig) -> Self {
        let (sender, events) = unbounded_channel();
        let fetch = FetchCoordinator::new(Arc::new(source), sender.clone(), config.fetch_timeout());
        Self {
            list: ListStore::new(),
            fetch,
            edit: EditSession::default(),
            sender,
            events,
            mounted: false,
        }
    }

    /// Handle for sending intents into the widget's queue.
    pub fn sender(&self) -> UnboundedSender<Message> {
        self.sender.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            items: self.list.items(),
            load_state: self.fetch.state().clone(),
            edit: self.edit.clone(),
            last_loaded: self.fetch.last_loaded(),
        }
    }

    /// Lifecycle start: kicks off the initial load.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        log::info!("Widget mounted");
        self.fetch.start_load();
    }

    /// Lifecycle end: cancels any outstanding load. Later events are ignored.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.fetch.cancel();
        log::info!("Widget unmounted");
    }

    pub fn update(&mut self, message: Message) {
        if !self.mounted {
            log::debug!("Ignoring {:?} while unmounted", message);
            return;
        }

        match message {
            Message::AddItem(text) => self.list.add(&text),
            Message::DeleteItem(id) => self.list.remove(id),
            Message::ToggleCompleted(id) => self.list.toggle_completed(id),

            Message::BeginEdit(id) => match self.list.get(id) {
                Some(item) => self.edit.begin(item),
                None => log::debug!("BeginEdit for unknown item {}", id),
            },
            Message::UpdateDraft(text) => self.edit.update_draft(&text),
            Message::CommitEdit => self.edit.commit(&mut self.list),
            Message::CancelEdit => self.edit.cancel(),

            Message::RequestFetch => {
                self.fetch.start_load();
            }
            Message::LoadSettled(settlement) => {
                self.fetch.settle(settlement, &mut self.list);
            }

            Message::Close => self.unmount(),
        }
    }

    /// Waits for the next queued message.
    pub async fn next_message(&mut self) -> Option<Message> {
        self.events.recv().await
    }

    /// Applies every message already queued, without waiting. Returns how many.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.events.try_recv() {
            self.update(message);
            applied += 1;
        }
        applied
    }

    /// Mounts, then renders after every message until `Close` arrives.
    ///
    /// The widget keeps its own sender for load settlements, so the queue never
    /// closes on its own: hosts must send `Close` to end the loop.
    pub async fn run<R: Render>(mut self, renderer: &mut R) {
        self.mount();
        renderer.render(&self.snapshot());

        while let Some(message) = self.events.recv().await {
            let closing = message == Message::Close;
            let before = self.snapshot();
            self.update(message);
            if closing {
                break;
            }
            let after = self.snapshot();
            if after != before || !after.items.ptr_eq(&before.items) {
                renderer.render(&after);
            }
        }

        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Settlement;
    use crate::sync::Outcome;
    use crate::sync::fixture::FixtureSource;
    use crate::sync::scripted::{ScriptedSource, items};
    use std::time::Duration;

    fn widget(source: ScriptedSource) -> Widget<ScriptedSource> {
        Widget::new(source, &WidgetConfig::default())
    }

    async fn settle_next(widget: &mut Widget<ScriptedSource>) {
        let message = widget.next_message().await.unwrap();
        assert!(matches!(message, Message::LoadSettled(_)));
        widget.update(message);
    }

    #[tokio::test(start_paused = true)]
    async fn mount_loads_initial_items() {
        let fixture = items(&[(1, "a"), (3, "c"), (2, "b")]);
        let mut w = widget(ScriptedSource::new().then_ok(1000, fixture));
        assert_eq!(w.snapshot().load_state, LoadState::Idle);

        w.mount();
        assert!(w.snapshot().load_state.is_loading());

        settle_next(&mut w).await;
        let snap = w.snapshot();
        assert_eq!(snap.load_state, LoadState::Loaded);
        assert_eq!(snap.items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 3, 2]);

        w.update(Message::AddItem("x".into()));
        let last = w.snapshot().items.as_slice().last().cloned().unwrap();
        assert_eq!((last.id, last.text.as_str()), (4, "x"));
    }

    #[tokio::test(start_paused = true)]
    async fn refetch_supersedes_pending_load() {
        let a_items = items(&[(1, "from a")]);
        let b_items = items(&[(7, "from b"), (8, "also b")]);
        let mut w = widget(
            ScriptedSource::new()
                .then_ok(1000, a_items.clone())
                .then_ok(10, b_items.clone()),
        );

        w.mount();
        let a = w.fetch.in_flight().unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;
        w.update(Message::RequestFetch);

        settle_next(&mut w).await;
        settle_next(&mut w).await;
        assert_eq!(w.snapshot().items.as_slice(), b_items.as_slice());

        // A late result from A changes nothing.
        let before = w.snapshot();
        w.update(Message::LoadSettled(Settlement {
            attempt: a,
            outcome: Outcome::Loaded(a_items),
        }));
        let after = w.snapshot();
        assert!(after.items.ptr_eq(&before.items));
        assert_eq!(after, before);

        // Nothing else is pending once A's timer would have fired.
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(w.drain(), 0);
        assert_eq!(w.snapshot().items.as_slice(), b_items.as_slice());
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_blocks_late_results() {
        let mut w = widget(ScriptedSource::new().then_ok(1000, items(&[(1, "a")])));
        w.mount();
        tokio::time::sleep(Duration::from_millis(1)).await;
        let attempt = w.fetch.in_flight().unwrap();
        w.unmount();
        let before = w.snapshot();

        tokio::time::sleep(Duration::from_millis(2000)).await;
        w.drain();
        w.update(Message::LoadSettled(Settlement {
            attempt,
            outcome: Outcome::Loaded(items(&[(9, "late")])),
        }));
        w.update(Message::AddItem("after unmount".into()));

        let after = w.snapshot();
        assert!(after.items.ptr_eq(&before.items));
        assert!(after.items.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn edit_session_through_intents() {
        let mut w = widget(ScriptedSource::new().then_ok(10, items(&[(1, "one"), (2, "two")])));
        w.mount();
        settle_next(&mut w).await;

        w.update(Message::BeginEdit(1));
        w.update(Message::UpdateDraft("draft".into()));
        w.update(Message::CancelEdit);
        assert_eq!(w.snapshot().items.get(1).unwrap().text, "one");
        assert_eq!(w.snapshot().edit, EditSession::NotEditing);

        w.update(Message::BeginEdit(1));
        w.update(Message::UpdateDraft("new".into()));
        w.update(Message::CommitEdit);
        assert_eq!(w.snapshot().items.get(1).unwrap().text, "new");
        assert!(!w.snapshot().edit.is_editing());

        w.update(Message::BeginEdit(99));
        assert_eq!(w.snapshot().edit, EditSession::NotEditing);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_keeps_items_then_recovers() {
        let mut w = widget(
            ScriptedSource::new()
                .then_ok(10, items(&[(1, "kept")]))
                .then_err(10, "network down")
                .then_ok(10, items(&[(2, "replaced")])),
        );
        w.mount();
        settle_next(&mut w).await;
        w.update(Message::ToggleCompleted(1));
        let local = w.snapshot().items;

        w.update(Message::RequestFetch);
        settle_next(&mut w).await;
        let snap = w.snapshot();
        assert_eq!(snap.load_state, LoadState::Failed("network down".into()));
        assert!(snap.items.ptr_eq(&local));

        w.update(Message::RequestFetch);
        assert_eq!(w.snapshot().load_state, LoadState::Loading);
        settle_next(&mut w).await;
        let snap = w.snapshot();
        assert_eq!(snap.load_state, LoadState::Loaded);
        assert_eq!(snap.items.as_slice(), items(&[(2, "replaced")]).as_slice());
    }

    #[tokio::test(start_paused = true)]
    async fn delete_and_toggle_intents() {
        let mut w = widget(ScriptedSource::new().then_ok(10, items(&[(1, "a"), (2, "b")])));
        w.mount();
        settle_next(&mut w).await;

        w.update(Message::DeleteItem(1));
        w.update(Message::DeleteItem(1));
        w.update(Message::ToggleCompleted(2));
        w.update(Message::AddItem("   ".into()));

        let snap = w.snapshot();
        assert_eq!(snap.items.len(), 1);
        assert!(snap.items.get(2).unwrap().completed);
        assert_eq!(snap.items.remaining(), 0);
    }

    struct Recorder {
        frames: Vec<Snapshot>,
    }

    impl Render for Recorder {
        fn render(&mut self, snapshot: &Snapshot) {
            self.frames.push(snapshot.clone());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn run_renders_until_close() {
        let config = WidgetConfig {
            latency_ms: 50,
            ..WidgetConfig::default()
        };
        let w = Widget::new(FixtureSource::from_config(&config), &config);
        let tx = w.sender();
        let mut recorder = Recorder { frames: Vec::new() };

        let driver = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            tx.send(Message::AddItem("typed".into())).unwrap();
            tx.send(Message::Close).unwrap();
        });
        w.run(&mut recorder).await;
        driver.await.unwrap();

        let first = recorder.frames.first().unwrap();
        assert!(first.load_state.is_loading());
        let last = recorder.frames.last().unwrap();
        assert_eq!(last.load_state, LoadState::Loaded);
        assert_eq!(last.items.len(), 4);
        assert_eq!(last.items.as_slice()[3].text, "typed");
    }
}

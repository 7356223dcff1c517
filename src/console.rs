use std::io::Write;

use ticklist::core::edit::EditSession;
use ticklist::message::Message;
use ticklist::sync::LoadState;
use ticklist::widget::{Render, Snapshot};

pub const HELP: &str = "commands: add <text> | rm <id> | toggle <id> | edit <id> | \
                        draft <text> | save | cancel | fetch | quit";

/// Maps one line of input to an intent. `None` for blank or unknown input.
pub fn parse_command(line: &str) -> Option<Message> {
    let line = line.trim_start();
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest),
        None => (line.trim_end(), ""),
    };
    let id = || rest.trim().parse::<u64>().ok();

    match cmd {
        "add" | "a" => Some(Message::AddItem(rest.to_string())),
        "rm" | "del" => id().map(Message::DeleteItem),
        "toggle" | "t" => id().map(Message::ToggleCompleted),
        "edit" | "e" => id().map(Message::BeginEdit),
        "draft" => Some(Message::UpdateDraft(rest.to_string())),
        "save" => Some(Message::CommitEdit),
        "cancel" => Some(Message::CancelEdit),
        "fetch" | "f" => Some(Message::RequestFetch),
        "quit" | "q" => Some(Message::Close),
        _ => None,
    }
}

/// Plain-text renderer writing each snapshot to stdout.
pub struct ConsoleRenderer<W> {
    out: W,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn draw(&mut self, snapshot: &Snapshot) -> std::io::Result<()> {
        let status = match &snapshot.load_state {
            LoadState::Idle => String::new(),
            LoadState::Loading => "loading...".to_string(),
            LoadState::Loaded => match snapshot.last_loaded {
                Some(at) => format!("loaded at {}", at.format("%H:%M:%S")),
                None => "loaded".to_string(),
            },
            LoadState::Failed(message) => format!("error: {}", message),
        };
        writeln!(self.out, "-- {} left -- {}", snapshot.items.remaining(), status)?;

        for item in &snapshot.items {
            let mark = if item.completed { 'x' } else { ' ' };
            match &snapshot.edit {
                EditSession::Editing { id, draft } if *id == item.id => {
                    writeln!(self.out, "[{}] {:>3}  > {}_", mark, item.id, draft)?
                }
                _ => writeln!(self.out, "[{}] {:>3}  {}", mark, item.id, item.text)?,
            }
        }
        self.out.flush()
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Render for ConsoleRenderer<W> {
    fn render(&mut self, snapshot: &Snapshot) {
        if let Err(e) = self.draw(snapshot) {
            log::error!("Failed to render: {}", e);
        }
    }
}

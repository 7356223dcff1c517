mod console;

use tokio::io::{AsyncBufReadExt, BufReader};

use console::{ConsoleRenderer, HELP, parse_command};
use ticklist::config::WidgetConfig;
use ticklist::message::Message;
use ticklist::sync::Source;
use ticklist::widget::Widget;

fn crate_target(target: &str) -> bool {
    target.starts_with("ticklist")
}

/// Wrapper filters: ticklist targets at info/debug (per config), everything else at warn.
struct FilteredJournal {
    inner: systemd_journal_logger::JournalLog,
}

impl log::Log for FilteredJournal {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        if crate_target(metadata.target()) {
            let max = if ticklist::debug_logging() {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            };
            metadata.level() <= max
        } else {
            metadata.level() <= log::LevelFilter::Warn
        }
    }
    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            self.inner.log(record);
        }
    }
    fn flush(&self) {
        self.inner.flush();
    }
}

/// Logs to the systemd user journal (`journalctl --user -t ticklist -f`), or to
/// stderr when no journal is reachable.
fn init_logging() {
    let journal = systemd_journal_logger::JournalLog::new()
        .map(|journal| journal.with_syslog_identifier("ticklist".to_string()));

    match journal {
        Ok(inner) => {
            if log::set_boxed_logger(Box::new(FilteredJournal { inner })).is_ok() {
                // Global max must be Debug so debug logs can pass through when toggled
                log::set_max_level(log::LevelFilter::Debug);
            }
        }
        Err(e) => {
            let filter = if ticklist::debug_logging() {
                "ticklist=debug,warn"
            } else {
                "ticklist=info,warn"
            };
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
                .format(|buf, record| {
                    use std::io::Write;
                    writeln!(
                        buf,
                        "[{}] {} [{}] {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                        record.level(),
                        record.target(),
                        record.args()
                    )
                })
                .init();
            log::debug!("Journal unavailable ({}), logging to stderr", e);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = WidgetConfig::load_or_default(&WidgetConfig::default_path());

    // Parse CLI flags
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--debug") {
        config.debug_logging = true;
    }
    if let Some(pos) = args.iter().position(|a| a == "--fail") {
        config.fail_with = Some(
            args.get(pos + 1)
                .cloned()
                .unwrap_or_else(|| "remote unavailable".to_string()),
        );
    }

    ticklist::set_debug_logging(config.debug_logging);
    init_logging();

    let source = Source::from_config(&config)?;
    let widget = Widget::new(source, &config);
    let intents = widget.sender();

    println!("{}", HELP);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                // End of input closes the widget.
                Ok(None) => break,
                Err(e) => {
                    log::error!("Failed to read input: {}", e);
                    break;
                }
            };
            let Some(message) = parse_command(&line) else {
                if !line.trim().is_empty() {
                    println!("{}", HELP);
                }
                continue;
            };
            let closing = message == Message::Close;
            if intents.send(message).is_err() || closing {
                return;
            }
        }
        let _ = intents.send(Message::Close);
    });

    let mut renderer = ConsoleRenderer::new(std::io::stdout());
    widget.run(&mut renderer).await;

    Ok(())
}

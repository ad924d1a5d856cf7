//! Terminal ownership and the event feed for the search client.
//!
//! Two producers share one channel: crossterm input and a poll timer. The
//! timer is what collects finished backend requests, so an answer shows up
//! even when the user isn't touching the keyboard.

use std::io::{self, Stderr};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEvent, KeyEventKind, MouseEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// How often outstanding requests are polled; also paces the "Searching..." dots
pub const POLL_INTERVAL: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Terminal size changed; the next draw picks up the new layout
    Resize,
    /// Timer fired: collect finished requests and advance the animation
    Poll,
}

impl AppEvent {
    /// Map a raw crossterm event to one the app reacts to. Key releases and
    /// repeats, focus and paste events are dropped.
    pub fn from_terminal(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(Self::Key(key)),
            Event::Mouse(mouse) => Some(Self::Mouse(mouse)),
            Event::Resize(..) => Some(Self::Resize),
            _ => None,
        }
    }
}

/// Merged stream of terminal input and poll ticks. Dropping it stops both
/// producer tasks.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    producers: [JoinHandle<()>; 2],
}

impl EventHandler {
    pub fn new() -> Self {
        Self::with_poll_interval(POLL_INTERVAL)
    }

    pub fn with_poll_interval(period: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let input = spawn_input_reader(tx.clone());
        let poll = spawn_poll_timer(tx, period);

        Self { rx, producers: [input, poll] }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        for task in &self.producers {
            task.abort();
        }
    }
}

fn spawn_input_reader(tx: mpsc::UnboundedSender<AppEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        while let Some(next) = reader.next().await {
            let event = match next {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(error = %e, "terminal input closed");
                    break;
                }
            };
            if let Some(event) = AppEvent::from_terminal(event) {
                if tx.send(event).is_err() {
                    break;
                }
            }
        }
    })
}

fn spawn_poll_timer(tx: mpsc::UnboundedSender<AppEvent>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if tx.send(AppEvent::Poll).is_err() {
                break;
            }
        }
    })
}

/// Raw mode, alternate screen and mouse capture (for wheel scrolling of the
/// history sidebar and answer panel).
pub fn init() -> Result<Tui> {
    enable_raw_mode().context("enabling raw mode")?;
    execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)
        .context("entering alternate screen")?;

    Terminal::new(CrosstermBackend::new(io::stderr())).context("creating terminal")
}

/// Undo [`init`]. Every step runs even if an earlier one fails; the first
/// error is returned.
pub fn restore() -> Result<()> {
    let screen = execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen)
        .context("leaving alternate screen");
    let raw = disable_raw_mode().context("disabling raw mode");
    screen.and(raw)
}

/// Put the terminal back before the panic message prints, so it is readable.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if let Err(e) = restore() {
            eprintln!("kbsearch: could not restore terminal: {e:#}");
        }
        previous(info);
    }));
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;

use anyhow::Result;
use crossterm::event::Event as CrosstermEvent;
use crossterm::event::EventStream;
use crossterm::event::MouseEventKind;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time;
use tui_textarea::Input;
use tui_textarea::Key;

use crate::domain::models::Event;

pub fn help_text() -> String {
    let text = r#"
HOTKEYS:
- Ctrl+n: Open a new tab.
- Ctrl+w: Close the current tab.
- Tab / Ctrl+Right: Switch to the next tab.
- Ctrl+Left: Switch to the previous tab.
- Alt+Up / Alt+Down: Move the current tab to a later or earlier year.
- Ctrl+p: Process uploaded data.
- Up / Down: Scroll, or move between sources while picking who you are.
- Left / Right: Pick the previous or next name for a source.
- Ctrl+u / Ctrl+d: Page up / down.
- Enter: Send the message, or confirm who you are.
- Esc: Dismiss a notice.
- Ctrl+c: Quit.
    "#;

    return text.trim().to_string();
}

/// Maps a key press to what the app should do with it. Keys without a
/// binding fall through as text input.
pub fn map_input(input: Input) -> Event {
    match input {
        Input {
            key: Key::Char('c'),
            ctrl: true,
            ..
        } => {
            return Event::KeyboardCTRLC();
        }
        Input {
            key: Key::Char('n'),
            ctrl: true,
            ..
        } => {
            return Event::TabNew();
        }
        Input {
            key: Key::Char('w'),
            ctrl: true,
            ..
        } => {
            return Event::TabClose();
        }
        Input {
            key: Key::Char('p'),
            ctrl: true,
            ..
        } => {
            return Event::ProcessData();
        }
        Input { key: Key::Tab, .. } => {
            return Event::TabNext();
        }
        Input {
            key: Key::Right,
            ctrl: true,
            ..
        } => {
            return Event::TabNext();
        }
        Input {
            key: Key::Left,
            ctrl: true,
            ..
        } => {
            return Event::TabPrevious();
        }
        Input {
            key: Key::Up,
            alt: true,
            ..
        } => {
            return Event::YearNext();
        }
        Input {
            key: Key::Down,
            alt: true,
            ..
        } => {
            return Event::YearPrevious();
        }
        Input { key: Key::Down, .. } => {
            return Event::UIScrollDown();
        }
        Input { key: Key::Up, .. } => {
            return Event::UIScrollUp();
        }
        Input {
            key: Key::MouseScrollDown,
            ..
        } => {
            return Event::UIScrollDown();
        }
        Input {
            key: Key::MouseScrollUp,
            ..
        } => {
            return Event::UIScrollUp();
        }
        Input {
            key: Key::PageDown, ..
        } => {
            return Event::UIScrollPageDown();
        }
        Input {
            key: Key::PageUp, ..
        } => {
            return Event::UIScrollPageUp();
        }
        Input {
            key: Key::Char('d'),
            ctrl: true,
            ..
        } => {
            return Event::UIScrollPageDown();
        }
        Input {
            key: Key::Char('u'),
            ctrl: true,
            ..
        } => {
            return Event::UIScrollPageUp();
        }
        Input { key: Key::Esc, .. } => {
            return Event::KeyboardEsc();
        }
        Input {
            key: Key::Enter, ..
        } => {
            return Event::KeyboardEnter();
        }
        input => {
            return Event::KeyboardCharInput(input);
        }
    }
}

pub struct EventsService {
    crossterm_events: EventStream,
    events: mpsc::UnboundedReceiver<Event>,
}

impl EventsService {
    pub fn new(events: mpsc::UnboundedReceiver<Event>) -> EventsService {
        return EventsService {
            crossterm_events: EventStream::new(),
            events,
        };
    }

    fn handle_crossterm(&self, event: CrosstermEvent) -> Option<Event> {
        match event {
            CrosstermEvent::Paste(text) => {
                return Some(Event::KeyboardPaste(text));
            }
            CrosstermEvent::Mouse(mouseevent) => match mouseevent.kind {
                MouseEventKind::ScrollUp => {
                    return Some(Event::UIScrollUp());
                }
                MouseEventKind::ScrollDown => {
                    return Some(Event::UIScrollDown());
                }
                _ => {
                    return None;
                }
            },
            CrosstermEvent::Key(keyevent) => {
                return Some(map_input(keyevent.into()));
            }
            _ => return None,
        }
    }

    pub async fn next(&mut self) -> Result<Event> {
        loop {
            let evt = tokio::select! {
                event = self.events.recv() => event,
                event = self.crossterm_events.next() => match event {
                    Some(Ok(input)) => self.handle_crossterm(input),
                    Some(Err(_)) => None,
                    None => None
                },
                _ = time::sleep(time::Duration::from_millis(500)) => Some(Event::UITick())
            };

            if let Some(event) = evt {
                return Ok(event);
            }
        }
    }
}

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum AppEvent {
    Quit,
    Key(KeyEvent),
    Mouse(MouseEvent),
    Tick,
}

pub struct EventHandler;

impl EventHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn next_event(&self) -> crate::error::Result<AppEvent> {
        if event::poll(Duration::from_millis(100))? {
            Ok(Self::translate(event::read()?))
        } else {
            Ok(AppEvent::Tick)
        }
    }

    fn translate(event: Event) -> AppEvent {
        match event {
            Event::Key(key)
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                AppEvent::Quit
            }
            // Release/repeat reports would double every keystroke on some terminals
            Event::Key(key) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
            Event::Mouse(mouse) => AppEvent::Mouse(mouse),
            _ => AppEvent::Tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    #[test]
    fn ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(EventHandler::translate(Event::Key(key)), AppEvent::Quit));
    }

    #[test]
    fn ignores_key_releases() {
        let key = KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert!(matches!(EventHandler::translate(Event::Key(key)), AppEvent::Tick));

        let press = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        assert!(matches!(EventHandler::translate(Event::Key(press)), AppEvent::Key(_)));
    }
}

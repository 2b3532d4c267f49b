use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

use crate::{
    clock::Clock,
    controller::SessionController,
    runtime::SessionEvent,
    surface::{CellGrid, InputBuffer, InputSurface, MetricsBoard},
    ticker::TickScheduler,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
}

/// What the event loop should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App<C, T> {
    pub session: SessionController<CellGrid, InputBuffer, MetricsBoard, C, T>,
    pub state: AppState,
}

impl<C: Clock, T: TickScheduler> App<C, T> {
    pub fn new(session: SessionController<CellGrid, InputBuffer, MetricsBoard, C, T>) -> Self {
        Self {
            session,
            state: AppState::Typing,
        }
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> Flow {
        match event {
            SessionEvent::Tick(id) => {
                self.session.on_tick_from(id);
                Flow::Continue
            }
            SessionEvent::Resize => Flow::Continue,
            SessionEvent::InputClosed => {
                info!("input closed");
                Flow::Quit
            }
            SessionEvent::Key(key) => self.handle_key(key),
        }
    }

    /// Same text again
    pub fn retry(&mut self) {
        let text = self.session.target_text();
        self.session.start_with(text);
        self.state = AppState::Typing;
    }

    /// Fresh text from the corpus
    pub fn next(&mut self) {
        self.session.start();
        self.state = AppState::Typing;
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Flow::Quit,
                _ => Flow::Continue,
            };
        }

        match key.code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::Left => self.retry(),
            KeyCode::Right => self.next(),
            _ => match self.state {
                AppState::Typing => self.handle_typing_key(key.code),
                AppState::Results => match key.code {
                    KeyCode::Char('r') => self.retry(),
                    KeyCode::Char('n') => self.next(),
                    _ => {}
                },
            },
        }

        Flow::Continue
    }

    fn handle_typing_key(&mut self, code: KeyCode) {
        let changed = match code {
            KeyCode::Char(c) => self.session.input_mut().push(c),
            KeyCode::Backspace => self.session.input_mut().pop(),
            _ => false,
        };

        if !changed {
            debug!(?code, enabled = self.session.input().is_enabled(), "key ignored");
            return;
        }

        self.session.on_input_changed();
        if self.session.state().finished {
            self.state = AppState::Results;
        }
    }
}

//! Terminal key input for the appliance loop.

use std::time::Duration;

use chromatap_lib::control::{CommandSource, UserCommand};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// Reads single key presses without blocking. Raw mode is held for the
/// lifetime of the value and restored on drop.
pub(super) struct TerminalKeys {
    _private: (),
}

impl TerminalKeys {
    pub(super) fn enable() -> std::io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl Drop for TerminalKeys {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            log::warn!("could not restore terminal: {e}");
        }
    }
}

impl CommandSource for TerminalKeys {
    fn poll_command(&mut self) -> Option<UserCommand> {
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => {
                    log::warn!("[keys] poll failed: {e}");
                    return None;
                }
            }
            match event::read() {
                Ok(Event::Key(key)) => {
                    if let Some(cmd) = map_key(key) {
                        return Some(cmd);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    log::warn!("[keys] read failed: {e}");
                    return None;
                }
            }
        }
    }
}

/// `s` captures; `q`, Esc, and Ctrl+C exit. Raw mode swallows SIGINT, so
/// Ctrl+C has to be handled here.
fn map_key(key: KeyEvent) -> Option<UserCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(UserCommand::Exit)
        }
        KeyCode::Char('s') | KeyCode::Char('S') => Some(UserCommand::Capture),
        KeyCode::Char('q') | KeyCode::Esc => Some(UserCommand::Exit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn s_captures() {
        assert_eq!(map_key(press(KeyCode::Char('s'))), Some(UserCommand::Capture));
    }

    #[test]
    fn q_and_esc_exit() {
        assert_eq!(map_key(press(KeyCode::Char('q'))), Some(UserCommand::Exit));
        assert_eq!(map_key(press(KeyCode::Esc)), Some(UserCommand::Exit));
    }

    #[test]
    fn ctrl_c_exits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(key), Some(UserCommand::Exit));
        assert_eq!(map_key(press(KeyCode::Char('c'))), None);
    }

    #[test]
    fn releases_are_ignored() {
        let mut key = press(KeyCode::Char('s'));
        key.kind = KeyEventKind::Release;
        assert_eq!(map_key(key), None);
    }
}

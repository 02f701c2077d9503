//! Terminal frontend for [`SettingsEditor`].
//!
//! Draws on stderr inside the alternate screen; stdout belongs to the update
//! protocol and must only ever receive update lines.

use std::io::{self, Stderr, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    style::{Print, PrintStyledContent, Stylize},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use subconf_common::DynamicSettings;
use subconf_core::editor::{SaveReport, SettingsEditor, Widget};
use unicode_width::UnicodeWidthStr;

const HELP: &str = "Tab/↓ next · ↑ prev · ←/→ change · Space toggle · Ctrl+S save · Esc save & close · Ctrl+C discard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Closed with Esc after a final save.
    Closed,
    /// Discarded with Ctrl+C; nothing further was sent.
    Discarded,
}

/// What a key press asks the editor loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Prev,
    Increment,
    Decrement,
    Toggle,
    Insert(char),
    Backspace,
    Save,
    Close,
    Discard,
    Ignore,
}

fn action_for(key: KeyEvent, focused_is_checkbox: bool) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::Ignore;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => Action::Discard,
        KeyCode::Char('s') if ctrl => Action::Save,
        KeyCode::Esc => Action::Close,
        KeyCode::Tab | KeyCode::Down | KeyCode::Enter => Action::Next,
        KeyCode::BackTab | KeyCode::Up => Action::Prev,
        KeyCode::Right => Action::Increment,
        KeyCode::Left => Action::Decrement,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Char(' ') if focused_is_checkbox => Action::Toggle,
        KeyCode::Char(c) if !ctrl => Action::Insert(c),
        _ => Action::Ignore,
    }
}

/// Restores the terminal however the editor loop ends.
struct ScreenGuard {
    out: Stderr,
}

impl ScreenGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stderr();
        if let Err(err) = crossterm::execute!(out, EnterAlternateScreen, cursor::Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(err);
        }
        Ok(Self { out })
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(self.out, cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Runs the form until it is closed or discarded. `emit` is called with the
/// saved settings on every Ctrl+S and once more on Esc.
pub fn run<F>(editor: &mut SettingsEditor, mut emit: F) -> anyhow::Result<Exit>
where
    F: FnMut(&DynamicSettings) -> anyhow::Result<()>,
{
    let mut screen = ScreenGuard::enter()?;
    let mut status = String::from("Editing");

    loop {
        draw(&mut screen.out, editor, &status)?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        let focused_is_checkbox = editor
            .focused()
            .is_some_and(|field| matches!(field.widget(), Widget::Checkbox(_)));

        match action_for(key, focused_is_checkbox) {
            Action::Next => editor.focus_next(),
            Action::Prev => editor.focus_prev(),
            Action::Increment => editor.increment(),
            Action::Decrement => editor.decrement(),
            Action::Toggle => editor.toggle(),
            Action::Insert(c) => editor.insert_char(c),
            Action::Backspace => editor.backspace(),
            Action::Save => {
                let report = editor.save();
                emit(editor.settings())?;
                status = save_status(&report);
            }
            Action::Close => {
                editor.save();
                emit(editor.settings())?;
                return Ok(Exit::Closed);
            }
            Action::Discard => return Ok(Exit::Discarded),
            Action::Ignore => {}
        }
    }
}

fn save_status(report: &SaveReport) -> String {
    if report.is_clean() {
        format!("Saved {} settings", report.applied)
    } else {
        format!(
            "Saved {} settings, kept previous values for: {}",
            report.applied,
            report.invalid.join(", ")
        )
    }
}

fn draw<W: Write>(out: &mut W, editor: &SettingsEditor, status: &str) -> io::Result<()> {
    let key_width: usize = editor
        .fields()
        .iter()
        .map(|field| field.name().width())
        .max()
        .unwrap_or(0);

    queue!(
        out,
        Clear(ClearType::All),
        cursor::MoveTo(0, 0),
        PrintStyledContent(format!("Settings for {}", editor.settings().schema()).bold().green()),
        cursor::MoveTo(0, 1),
        PrintStyledContent("─".repeat(48).dark_grey()),
    )?;

    let mut row: u16 = 2;
    for (idx, field) in editor.fields().iter().enumerate() {
        let focused = idx == editor.focus_index();
        let marker = if focused { "›" } else { " " };
        let label = format!("{} {}{} ", marker, field.name(), " ".repeat(key_width - field.name().width()));
        let value = field.display();

        let label = if focused { label.bold().cyan() } else { label.white() };
        let value = if !field.is_valid() {
            value.red()
        } else if !field.is_editable() {
            value.dark_grey()
        } else if focused {
            value.reverse()
        } else {
            value.stylize()
        };

        queue!(
            out,
            cursor::MoveTo(0, row),
            PrintStyledContent(label),
            PrintStyledContent(value)
        )?;
        row = row.saturating_add(1);
    }

    queue!(
        out,
        cursor::MoveTo(0, row.saturating_add(1)),
        Print(status),
        cursor::MoveTo(0, row.saturating_add(2)),
        PrintStyledContent(HELP.dark_grey()),
    )?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn control_chords_map_to_commands() {
        assert_eq!(action_for(press(KeyCode::Char('s'), KeyModifiers::CONTROL), false), Action::Save);
        assert_eq!(action_for(press(KeyCode::Char('c'), KeyModifiers::CONTROL), false), Action::Discard);
        assert_eq!(action_for(press(KeyCode::Char('x'), KeyModifiers::CONTROL), false), Action::Ignore);
        assert_eq!(action_for(press(KeyCode::Esc, KeyModifiers::NONE), false), Action::Close);
    }

    #[test]
    fn space_toggles_only_checkboxes() {
        assert_eq!(action_for(press(KeyCode::Char(' '), KeyModifiers::NONE), true), Action::Toggle);
        assert_eq!(action_for(press(KeyCode::Char(' '), KeyModifiers::NONE), false), Action::Insert(' '));
    }

    #[test]
    fn key_releases_are_ignored() {
        let mut key = press(KeyCode::Char('a'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(action_for(key, false), Action::Ignore);
    }

    #[test]
    fn save_status_lists_rejected_fields() {
        let report = SaveReport {
            applied: 3,
            invalid: vec!["separator".into()],
        };
        assert_eq!(save_status(&report), "Saved 3 settings, kept previous values for: separator");
    }
}

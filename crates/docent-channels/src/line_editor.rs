use std::io::{self, Write, stdout};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyModifiers},
    style::Stylize,
    terminal::{self, ClearType},
};

pub enum ReadLineResult {
    Line(String),
    Interrupted,
    Eof,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Input line being edited, with the cursor counted in characters.
#[derive(Debug, Default)]
struct EditBuffer {
    input: String,
    cursor: usize,
    history_index: Option<usize>,
    draft: String,
}

impl EditBuffer {
    fn len(&self) -> usize {
        self.input.chars().count()
    }

    fn insert(&mut self, c: char) {
        let off = byte_offset(&self.input, self.cursor);
        self.input.insert(off, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            let off = byte_offset(&self.input, self.cursor - 1);
            self.input.remove(off);
            self.cursor -= 1;
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.len() {
            let off = byte_offset(&self.input, self.cursor);
            self.input.remove(off);
        }
    }

    fn delete_word(&mut self) {
        let boundary = prev_word_boundary(&self.input, self.cursor);
        let start = byte_offset(&self.input, boundary);
        let end = byte_offset(&self.input, self.cursor);
        self.input.drain(start..end);
        self.cursor = boundary;
    }

    fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    fn home(&mut self) {
        self.cursor = 0;
    }

    fn end(&mut self) {
        self.cursor = self.len();
    }

    /// Step back to the previous history entry starting with the text typed before browsing.
    fn history_up(&mut self, history: &[String]) {
        let searched = match self.history_index {
            None => {
                self.draft.clone_from(&self.input);
                history
            }
            Some(i) => &history[..i],
        };
        let prefix = self.draft.as_str();
        let Some(idx) = searched
            .iter()
            .rposition(|e| prefix.is_empty() || e.starts_with(prefix))
        else {
            return;
        };
        self.history_index = Some(idx);
        self.input.clone_from(&history[idx]);
        self.end();
    }

    fn history_down(&mut self, history: &[String]) {
        let Some(i) = self.history_index else { return };
        let prefix = self.draft.as_str();
        let found = history[i + 1..]
            .iter()
            .position(|e| prefix.is_empty() || e.starts_with(prefix))
            .map(|offset| i + 1 + offset);
        if let Some(idx) = found {
            self.history_index = Some(idx);
            self.input.clone_from(&history[idx]);
        } else {
            self.history_index = None;
            self.input = std::mem::take(&mut self.draft);
        }
        self.end();
    }
}

/// Read one line in raw mode with a yellow prompt, cursor movement and prefix history search.
pub fn read_line(prompt: &str, history: &[String]) -> io::Result<ReadLineResult> {
    let _guard = RawModeGuard::enter()?;
    let mut buffer = EditBuffer::default();

    render(prompt, &buffer)?;

    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != event::KeyEventKind::Press {
            continue;
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                finish_line()?;
                return Ok(ReadLineResult::Interrupted);
            }
            (KeyModifiers::CONTROL, KeyCode::Char('d')) => {
                if buffer.input.is_empty() {
                    finish_line()?;
                    return Ok(ReadLineResult::Eof);
                }
            }
            (_, KeyCode::Enter) => {
                finish_line()?;
                return Ok(ReadLineResult::Line(buffer.input));
            }
            (KeyModifiers::CONTROL, KeyCode::Char('a')) | (_, KeyCode::Home) => buffer.home(),
            (KeyModifiers::CONTROL, KeyCode::Char('e')) | (_, KeyCode::End) => buffer.end(),
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => buffer.clear(),
            (KeyModifiers::ALT, KeyCode::Backspace) => buffer.delete_word(),
            (_, KeyCode::Backspace) => buffer.backspace(),
            (_, KeyCode::Delete) => buffer.delete(),
            (_, KeyCode::Left) => buffer.left(),
            (_, KeyCode::Right) => buffer.right(),
            (_, KeyCode::Up) => buffer.history_up(history),
            (_, KeyCode::Down) => buffer.history_down(history),
            (_, KeyCode::Char(c)) => buffer.insert(c),
            _ => {}
        }

        render(prompt, &buffer)?;
    }
}

fn finish_line() -> io::Result<()> {
    let mut out = stdout();
    write!(out, "\r\n")?;
    out.flush()
}

fn render(prompt: &str, buffer: &EditBuffer) -> io::Result<()> {
    let mut out = stdout();
    let cursor_col = cursor_column(prompt, &buffer.input, buffer.cursor);
    write!(
        out,
        "\r{}{}{}{}",
        terminal::Clear(ClearType::CurrentLine),
        prompt.yellow(),
        buffer.input,
        cursor::MoveToColumn(u16::try_from(cursor_col).unwrap_or(u16::MAX)),
    )?;
    out.flush()
}

/// Terminal column of the cursor. The prompt is measured unstyled.
fn cursor_column(prompt: &str, input: &str, cursor: usize) -> usize {
    let prefix: String = input.chars().take(cursor).collect();
    display_width(prompt) + display_width(&prefix)
}

fn byte_offset(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

fn prev_word_boundary(s: &str, cursor: usize) -> usize {
    let chars: Vec<char> = s.chars().collect();
    let mut i = cursor.min(chars.len());
    while i > 0 && !chars[i - 1].is_alphanumeric() {
        i -= 1;
    }
    while i > 0 && chars[i - 1].is_alphanumeric() {
        i -= 1;
    }
    i
}

fn display_width(s: &str) -> usize {
    use unicode_width::UnicodeWidthStr;
    UnicodeWidthStr::width(s)
}

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const MASK_CHAR: char = '•';

#[derive(Debug, Clone)]
pub struct InputField {
    pub value: String,
    /// Cursor position in characters, not bytes.
    pub cursor: usize,
    pub placeholder: String,
    pub label: String,
    pub focused: bool,
    pub masked: bool,
}

impl InputField {
    pub fn new(label: &str, placeholder: &str) -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            placeholder: placeholder.to_string(),
            label: label.to_string(),
            focused: false,
            masked: false,
        }
    }

    /// An input whose value is never drawn.
    pub fn secret(label: &str, placeholder: &str) -> Self {
        Self {
            masked: true,
            ..Self::new(label, placeholder)
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map(|(idx, _)| idx)
            .unwrap_or(self.value.len())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) => {
                let idx = self.byte_index(self.cursor);
                self.value.insert(idx, c);
                self.cursor += 1;
                true
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let idx = self.byte_index(self.cursor);
                    self.value.remove(idx);
                }
                true
            }
            KeyCode::Delete => {
                if self.cursor < self.char_count() {
                    let idx = self.byte_index(self.cursor);
                    self.value.remove(idx);
                }
                true
            }
            KeyCode::Left => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                }
                true
            }
            KeyCode::Right => {
                if self.cursor < self.char_count() {
                    self.cursor += 1;
                }
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.char_count();
                true
            }
            _ => false,
        }
    }

    fn display_value(&self) -> String {
        if self.masked {
            MASK_CHAR.to_string().repeat(self.char_count())
        } else {
            self.value.clone()
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.label.as_str())
            .border_style(if self.focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Gray)
            });

        let text = if self.value.is_empty() && !self.focused {
            Line::from(Span::styled(
                self.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            let shown = self.display_value();

            if self.focused {
                let split = shown
                    .char_indices()
                    .nth(self.cursor)
                    .map(|(idx, _)| idx)
                    .unwrap_or(shown.len());
                let (before, after) = shown.split_at(split);
                Line::from(vec![
                    Span::raw(before.to_string()),
                    Span::styled("│", Style::default().fg(Color::Yellow)),
                    Span::raw(after.to_string()),
                ])
            } else {
                Line::from(Span::raw(shown))
            }
        };

        let paragraph = Paragraph::new(text).block(block);
        f.render_widget(paragraph, area);
    }

    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = self.char_count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::InputField;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn press(field: &mut InputField, code: KeyCode) {
        field.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn edits_multibyte_text_by_character() {
        let mut field = InputField::new("Topic", "");
        for c in "Préambule".chars() {
            press(&mut field, KeyCode::Char(c));
        }
        assert_eq!(field.cursor, 9);

        press(&mut field, KeyCode::Home);
        press(&mut field, KeyCode::Right);
        press(&mut field, KeyCode::Right);
        press(&mut field, KeyCode::Delete);
        assert_eq!(field.value, "Prambule");

        press(&mut field, KeyCode::End);
        press(&mut field, KeyCode::Backspace);
        assert_eq!(field.value, "Prambul");
    }

    #[test]
    fn secret_fields_never_show_their_value() {
        let field = InputField::secret("API key", "sk-...").with_value("sk-secret");
        assert_eq!(field.display_value(), "•".repeat(9));
        assert!(!field.display_value().contains("secret"));
    }
}

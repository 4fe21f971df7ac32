use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Scrollable Markdown pane.
pub struct ContentViewer {
    pub content: String,
    pub scroll: usize,
    pub title: String,
}

impl ContentViewer {
    pub fn new(content: String, title: String) -> Self {
        Self {
            content,
            scroll: 0,
            title,
        }
    }

    fn max_scroll(&self, area_height: usize) -> usize {
        let lines = self.content.lines().count();
        lines.saturating_sub(area_height.saturating_sub(2))
    }

    pub fn handle_key(&mut self, key: KeyEvent, area_height: usize) -> bool {
        let page_size = area_height.saturating_sub(2);
        match key.code {
            KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                true
            }
            KeyCode::Down => {
                if self.scroll < self.max_scroll(area_height) {
                    self.scroll += 1;
                }
                true
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(page_size);
                true
            }
            KeyCode::PageDown => {
                self.scroll = (self.scroll + page_size).min(self.max_scroll(area_height));
                true
            }
            KeyCode::Home => {
                self.scroll = 0;
                true
            }
            KeyCode::End => {
                self.scroll = self.max_scroll(area_height);
                true
            }
            _ => false,
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, area_height: usize) -> bool {
        match mouse.kind {
            MouseEventKind::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(1);
                true
            }
            MouseEventKind::ScrollDown => {
                if self.scroll < self.max_scroll(area_height) {
                    self.scroll += 1;
                }
                true
            }
            _ => false,
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let lines: Vec<Line> = self
            .content
            .lines()
            .skip(self.scroll)
            .take(area.height.saturating_sub(2) as usize)
            .map(|line| {
                let trimmed = line.trim_start();
                if trimmed.starts_with('#') {
                    // Root node
                    Line::from(Span::styled(line, Style::default().fg(Color::Yellow)))
                } else if trimmed.starts_with('-') || trimmed.starts_with('*') {
                    let color = if trimmed.len() == line.len() {
                        Color::Green
                    } else {
                        Color::Cyan
                    };
                    Line::from(Span::styled(line, Style::default().fg(color)))
                } else {
                    Line::from(Span::raw(line))
                }
            })
            .collect();

        let total_lines = self.content.lines().count();
        let visible_lines = area.height.saturating_sub(2) as usize;
        let scroll_info = if total_lines > visible_lines {
            format!(
                " (lines {}-{} of {})",
                self.scroll + 1,
                (self.scroll + visible_lines).min(total_lines),
                total_lines
            )
        } else {
            String::new()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{}{scroll_info}", self.title));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });

        f.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::ContentViewer;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn scrolling_stays_within_content() {
        let content = (0..30).map(|i| format!("- {i}")).collect::<Vec<_>>().join("\n");
        let mut viewer = ContentViewer::new(content, "Mind map".to_string());

        viewer.handle_key(key(KeyCode::Up), 12);
        assert_eq!(viewer.scroll, 0);

        viewer.handle_key(key(KeyCode::End), 12);
        assert_eq!(viewer.scroll, 20);

        viewer.handle_key(key(KeyCode::Down), 12);
        assert_eq!(viewer.scroll, 20);

        viewer.handle_key(key(KeyCode::PageUp), 12);
        assert_eq!(viewer.scroll, 10);
    }
}

use crate::core::storage::FileEntry;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

/// Selectable list of downloaded mind maps with multi-select for deletion.
pub struct FileList {
    pub items: Vec<FileEntry>,
    pub state: ListState,
    pub marked: Vec<bool>,
    viewport_size: usize,
}

impl FileList {
    pub fn new(items: Vec<FileEntry>) -> Self {
        let mut list = Self {
            items: Vec::new(),
            state: ListState::default(),
            marked: Vec::new(),
            viewport_size: 1,
        };
        list.update_items(items);
        list
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let step = self.viewport_size.max(1) as isize;
        match key.code {
            KeyCode::Up => self.move_by(-1, true),
            KeyCode::Down => self.move_by(1, true),
            KeyCode::PageUp => self.move_by(-step, false),
            KeyCode::PageDown => self.move_by(step, false),
            KeyCode::Home => self.select(0),
            KeyCode::End => self.select(self.items.len().saturating_sub(1)),
            KeyCode::Char(' ') => self.toggle_marked(),
            _ => return false,
        }
        true
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.move_by(-1, false),
            MouseEventKind::ScrollDown => self.move_by(1, false),
            _ => return false,
        }
        true
    }

    /// Move the selection; arrow keys wrap around, paging and scrolling clamp.
    fn move_by(&mut self, delta: isize, wrap: bool) {
        if self.items.is_empty() {
            return;
        }

        let len = self.items.len() as isize;
        let current = self.state.selected().unwrap_or(0) as isize;
        let next = if wrap {
            (current + delta).rem_euclid(len)
        } else {
            (current + delta).clamp(0, len - 1)
        };
        self.select(next as usize);
    }

    fn select(&mut self, index: usize) {
        if self.items.is_empty() {
            self.state.select(None);
            return;
        }
        self.state.select(Some(index.min(self.items.len() - 1)));
        self.adjust_offset();
    }

    pub fn toggle_marked(&mut self) {
        if let Some(i) = self.state.selected()
            && let Some(mark) = self.marked.get_mut(i)
        {
            *mark = !*mark;
        }
    }

    pub fn selected(&self) -> Option<&FileEntry> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    /// Marked entries, or the highlighted one when nothing is marked.
    pub fn targets(&self) -> Vec<&FileEntry> {
        let marked: Vec<&FileEntry> = self
            .items
            .iter()
            .zip(&self.marked)
            .filter_map(|(item, &marked)| marked.then_some(item))
            .collect();

        if marked.is_empty() {
            self.selected().into_iter().collect()
        } else {
            marked
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, title: &str) {
        self.viewport_size = (area.height.saturating_sub(2) as usize).max(1);
        self.adjust_offset();

        let items: Vec<ListItem> = self
            .items
            .iter()
            .zip(&self.marked)
            .map(|(file, &marked)| {
                let checkbox = if marked { "☑ " } else { "☐ " };
                let modified = chrono::DateTime::<chrono::Local>::from(file.modified)
                    .format("%Y-%m-%d %H:%M");

                ListItem::new(Line::from(vec![
                    Span::raw(checkbox),
                    Span::styled(file.name.as_str(), Style::default().fg(Color::White)),
                    Span::styled(
                        format!("  {}  {modified}", file.size_label()),
                        Style::default().fg(Color::Gray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            );

        f.render_stateful_widget(list, area, &mut self.state);
    }

    pub fn update_items(&mut self, new_items: Vec<FileEntry>) {
        let current = self.state.selected().unwrap_or(0);
        self.items = new_items;
        self.marked = vec![false; self.items.len()];
        self.select(current);
    }

    fn adjust_offset(&mut self) {
        let Some(selected) = self.state.selected() else {
            *self.state.offset_mut() = 0;
            return;
        };

        let viewport = self.viewport_size.max(1);
        let max_offset = self.items.len().saturating_sub(viewport);
        let mut offset = self.state.offset().min(max_offset);

        if selected < offset {
            offset = selected;
        } else if selected >= offset + viewport {
            offset = selected + 1 - viewport;
        }
        *self.state.offset_mut() = offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn entries(names: &[&str]) -> Vec<FileEntry> {
        names
            .iter()
            .map(|name| FileEntry {
                path: PathBuf::from(name),
                name: name.to_string(),
                size: 2048,
                modified: SystemTime::now(),
            })
            .collect()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_wrap_around() {
        let mut list = FileList::new(entries(&["a.html", "b.html", "c.html"]));
        assert_eq!(list.selected().unwrap().name, "a.html");

        list.handle_key(key(KeyCode::Up));
        assert_eq!(list.selected().unwrap().name, "c.html");

        list.handle_key(key(KeyCode::Down));
        assert_eq!(list.selected().unwrap().name, "a.html");
    }

    #[test]
    fn targets_prefer_marked_entries() {
        let mut list = FileList::new(entries(&["a.html", "b.html", "c.html"]));
        let names = |list: &FileList| -> Vec<String> {
            list.targets().into_iter().map(|f| f.name.clone()).collect()
        };
        assert_eq!(names(&list), vec!["a.html"]);

        list.handle_key(key(KeyCode::Down));
        list.handle_key(key(KeyCode::Char(' ')));
        list.handle_key(key(KeyCode::Down));
        list.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(names(&list), vec!["b.html", "c.html"]);
    }

    #[test]
    fn selection_survives_shrinking() {
        let mut list = FileList::new(entries(&["a.html", "b.html", "c.html"]));
        list.handle_key(key(KeyCode::End));
        list.update_items(entries(&["a.html"]));
        assert_eq!(list.selected().unwrap().name, "a.html");

        list.update_items(Vec::new());
        assert!(list.selected().is_none());
        assert!(list.targets().is_empty());
    }
}

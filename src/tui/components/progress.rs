use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};

pub struct ProgressBar {
    pub progress: f64,
    pub message: String,
    pub logs: Vec<String>,
    pub max_logs: usize,
}

impl ProgressBar {
    pub fn new() -> Self {
        Self {
            progress: 0.0,
            message: String::new(),
            logs: Vec::new(),
            max_logs: 10,
        }
    }

    pub fn set_progress(&mut self, progress: f64) {
        self.progress = progress.clamp(0.0, 1.0);
    }

    pub fn set_message(&mut self, message: String) {
        self.message = message;
    }

    pub fn add_log(&mut self, log: String) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        self.logs.push(format!("[{timestamp}] {log}"));

        if self.logs.len() > self.max_logs {
            self.logs.remove(0);
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, topic: &str) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Topic
                Constraint::Length(3), // Gauge
                Constraint::Length(2), // Status
                Constraint::Min(1),    // Logs
            ])
            .split(area);

        let topic_paragraph =
            Paragraph::new(format!("Topic: {topic}")).style(Style::default().fg(Color::White));
        f.render_widget(topic_paragraph, chunks[0]);

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Progress"))
            .gauge_style(Style::default().fg(Color::Green))
            .percent((self.progress * 100.0).round() as u16);
        f.render_widget(gauge, chunks[1]);

        let status_paragraph = Paragraph::new(format!("Status: {}", self.message))
            .style(Style::default().fg(Color::Yellow));
        f.render_widget(status_paragraph, chunks[2]);

        let log_lines: Vec<Line> = self
            .logs
            .iter()
            .map(|log| Line::from(Span::raw(log.as_str())))
            .collect();

        let logs_paragraph =
            Paragraph::new(log_lines).block(Block::default().borders(Borders::ALL).title("Log"));
        f.render_widget(logs_paragraph, chunks[3]);
    }

    pub fn reset(&mut self) {
        self.progress = 0.0;
        self.message.clear();
        self.logs.clear();
    }
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::ProgressBar;

    #[test]
    fn keeps_only_recent_logs() {
        let mut bar = ProgressBar::new();
        for i in 0..15 {
            bar.add_log(format!("entry {i}"));
        }
        assert_eq!(bar.logs.len(), bar.max_logs);
        assert!(bar.logs[0].ends_with("entry 5"));
        assert!(bar.logs.last().unwrap().ends_with("entry 14"));
    }

    #[test]
    fn clamps_progress() {
        let mut bar = ProgressBar::new();
        bar.set_progress(1.7);
        assert_eq!(bar.progress, 1.0);
        bar.set_progress(-0.2);
        assert_eq!(bar.progress, 0.0);
    }
}

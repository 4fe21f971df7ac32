use crate::tui::app::{App, AppState, HOME_OPTIONS};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

pub fn draw(f: &mut Frame, app: &mut App) {
    match &app.state {
        AppState::Home => draw_home(f, app),
        AppState::NewMindMap => draw_form(f, app),
        AppState::Processing { topic } => {
            let topic = topic.clone();
            draw_processing(f, app, &topic)
        }
        AppState::Result => draw_result(f, app),
        AppState::Browser => draw_browser(f, app),
        AppState::Viewer { file_path } => {
            let location = file_path.display().to_string();
            draw_viewer(f, app, &location)
        }
        AppState::Settings => draw_settings(f, app),
    }
}

fn draw_title(f: &mut Frame, area: Rect, title: &str) {
    let title = Paragraph::new(title.to_string())
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

fn draw_help(f: &mut Frame, area: Rect, help: &str) {
    let help = Paragraph::new(help.to_string())
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, area);
}

fn draw_home(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(2), // Tagline
            Constraint::Min(1),    // Menu
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    draw_title(f, chunks[0], "vidmap: YouTube to Mind Map");

    let tagline = Paragraph::new(
        "Convert YouTube academic content into structured, interactive mind maps for revision.",
    )
    .style(Style::default().fg(Color::Gray))
    .alignment(Alignment::Center);
    f.render_widget(tagline, chunks[1]);

    let menu_items: Vec<ListItem> = HOME_OPTIONS
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let (marker, style) = if i == app.selected_option {
                (
                    "●",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ("○", Style::default().fg(Color::White))
            };

            ListItem::new(Line::from(Span::styled(format!("{marker} {option}"), style)))
        })
        .collect();

    let menu = List::new(menu_items).block(Block::default().borders(Borders::ALL).title("Mode"));
    f.render_widget(menu, chunks[2]);

    draw_help(f, chunks[3], "[↑↓] Navigate  [Enter] Select  [q] Exit");
}

fn draw_form(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // API key
            Constraint::Length(3), // Topic
            Constraint::Length(3), // URL
            Constraint::Min(1),    // Error
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    draw_title(f, chunks[0], "New Mind Map");

    app.api_key_input.render(f, chunks[1]);
    app.topic_input.render(f, chunks[2]);
    app.url_input.render(f, chunks[3]);

    if let Some(error) = &app.form_error {
        let error = Paragraph::new(format!("❌ {error}"))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
        f.render_widget(error, chunks[4]);
    }

    draw_help(
        f,
        chunks[5],
        "[Enter] Next / Generate  [Tab] Next field  [Esc] Back",
    );
}

fn draw_processing(f: &mut Frame, app: &App, topic: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(1),    // Progress area
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    draw_title(f, chunks[0], "Generating...");
    app.progress_bar.render(f, chunks[1], topic);
    draw_help(f, chunks[2], "[Esc] Cancel");
}

fn draw_result(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(1),    // Markdown
            Constraint::Length(2), // Status
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    let title = match &app.generated {
        Some(generated) => format!("{} (video {})", generated.topic, generated.video_id),
        None => "Mind Map".to_string(),
    };
    draw_title(f, chunks[0], &title);

    if let Some(viewer) = &app.content_viewer {
        app.viewer_height = chunks[1].height as usize;
        viewer.render(f, chunks[1]);
    }

    if let Some(status) = &app.result_status {
        let status = Paragraph::new(status.as_str()).style(Style::default().fg(Color::Green));
        f.render_widget(status, chunks[2]);
    }

    draw_help(
        f,
        chunks[3],
        "[d] Download HTML  [↑↓] Scroll  [n] New  [Esc] Edit inputs",
    );
}

fn draw_browser(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search
            Constraint::Min(1),    // Files
            Constraint::Length(1), // Status
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    app.search_input.render(f, chunks[0]);

    let title = format!("Mind maps in {}", app.settings.output_dir.display());
    app.file_list.render(f, chunks[1], &title);

    if let Some(status) = &app.browser_status {
        let status = Paragraph::new(status.as_str()).style(Style::default().fg(Color::Yellow));
        f.render_widget(status, chunks[2]);
    }

    draw_help(
        f,
        chunks[3],
        "[Enter] Open  [Space] Mark  [Del] Delete  [/] Search  [Esc] Back",
    );
}

fn draw_viewer(f: &mut Frame, app: &mut App, location: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(f.area());

    if let Some(viewer) = &app.content_viewer {
        app.viewer_height = chunks[0].height as usize;
        viewer.render(f, chunks[0]);
    }

    let path = Paragraph::new(location.to_string()).style(Style::default().fg(Color::DarkGray));
    f.render_widget(path, chunks[1]);

    draw_help(
        f,
        chunks[2],
        "[↑↓] Scroll  [PgUp/PgDn] Page  [Home/End] Home/End  [Esc] Back",
    );
}

fn draw_settings(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(1),    // Settings content
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    draw_title(f, chunks[0], "Settings");

    let mut lines: Vec<Line> = app
        .settings
        .describe()
        .into_iter()
        .map(|(name, value)| {
            Line::from(vec![
                Span::styled(format!("{name:<18}"), Style::default().fg(Color::Yellow)),
                Span::raw(value),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Override with command-line flags or VIDMAP_* environment variables.",
        Style::default().fg(Color::Gray),
    )));

    let settings = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(settings, chunks[1]);

    draw_help(f, chunks[2], "[Esc] Back");
}

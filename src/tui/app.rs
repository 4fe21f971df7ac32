use crate::config::Settings;
use crate::core::{
    GeneratedMindMap, MindMapRequest, OpenAiGenerator, Pipeline, StorageService,
    TranscriptService, embedded_markdown, storage::FileEntry,
};
use crate::error::Result;
use crate::tui::components::{ContentViewer, FileList, InputField, ProgressBar};
use crate::tui::events::AppEvent;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const API_KEY_ENV: &str = "VIDMAP_API_KEY";
pub const HOME_OPTIONS: [&str; 3] = ["New Mind Map", "Downloaded Mind Maps", "Settings"];
const FORM_FIELDS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Home,
    NewMindMap,
    Processing { topic: String },
    Result,
    Browser,
    Viewer { file_path: PathBuf },
    Settings,
}

#[derive(Debug)]
pub enum ProcessingUpdate {
    Progress(f64),
    Status(String),
    Log(String),
    Finished(Box<std::result::Result<GeneratedMindMap, String>>),
    Saved(std::result::Result<PathBuf, String>),
}

/// Update from a background task, tagged with the run that produced it.
#[derive(Debug)]
pub struct ProcessingMessage {
    pub run: u64,
    pub update: ProcessingUpdate,
}

type MindMapPipeline = Pipeline<TranscriptService, OpenAiGenerator>;

pub struct App {
    pub state: AppState,
    pub should_quit: bool,

    // Home screen
    pub selected_option: usize,

    // New mind map form
    pub api_key_input: InputField,
    pub topic_input: InputField,
    pub url_input: InputField,
    pub input_focus: usize,
    pub form_error: Option<String>,

    // Processing screen
    pub progress_bar: ProgressBar,
    run_id: u64,

    // Result screen
    pub generated: Option<GeneratedMindMap>,
    pub result_status: Option<String>,

    // Browser screen
    pub file_list: FileList,
    pub search_input: InputField,
    pub browser_status: Option<String>,

    // Result and file viewer
    pub content_viewer: Option<ContentViewer>,
    pub viewer_height: usize,

    pub settings: Settings,
    storage: StorageService,
    pipeline: Arc<MindMapPipeline>,

    // Async communication
    pub processing_tx: Option<mpsc::UnboundedSender<ProcessingMessage>>,
    pub processing_rx: Option<mpsc::UnboundedReceiver<ProcessingMessage>>,
}

impl App {
    pub fn new(settings: Settings) -> Result<Self> {
        let pipeline = Arc::new(Pipeline::from_settings(&settings)?);
        let storage = StorageService::new(&settings.output_dir);
        let files = storage.list_files().unwrap_or_default();
        let api_key = std::env::var(API_KEY_ENV).unwrap_or_default();

        Ok(Self {
            state: AppState::Home,
            should_quit: false,

            selected_option: 0,

            api_key_input: InputField::secret("API Key", "sk-...").with_value(&api_key),
            topic_input: InputField::new(
                "Video Topic (title of the mind map)",
                "e.g. Analysis of the Preamble of the Indian Constitution",
            ),
            url_input: InputField::new(
                "YouTube Video URL",
                "e.g. https://www.youtube.com/watch?v=your_video_id",
            ),
            input_focus: 0,
            form_error: None,

            progress_bar: ProgressBar::new(),
            run_id: 0,

            generated: None,
            result_status: None,

            file_list: FileList::new(files),
            search_input: InputField::new("Search", "Filter files..."),
            browser_status: None,

            content_viewer: None,
            viewer_height: 0,

            settings,
            storage,
            pipeline,

            processing_tx: None,
            processing_rx: None,
        })
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Quit => {
                self.should_quit = true;
            }
            AppEvent::Key(key) => {
                self.handle_key(key)?;
            }
            AppEvent::Mouse(mouse) => {
                self.handle_mouse(mouse);
            }
            AppEvent::Tick => {
                self.handle_tick();
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match &self.state {
            AppState::Home => self.handle_home_key(key),
            AppState::NewMindMap => self.handle_form_key(key),
            AppState::Processing { .. } => self.handle_processing_key(key),
            AppState::Result => self.handle_result_key(key),
            AppState::Browser => self.handle_browser_key(key),
            AppState::Viewer { .. } => self.handle_viewer_key(key),
            AppState::Settings => self.handle_settings_key(key),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match self.state {
            AppState::Browser => {
                self.file_list.handle_mouse(mouse);
            }
            AppState::Result | AppState::Viewer { .. } => {
                if let Some(viewer) = &mut self.content_viewer {
                    viewer.handle_mouse(mouse, self.viewer_height);
                }
            }
            _ => {}
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Up => {
                self.selected_option = self.selected_option.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_option + 1 < HOME_OPTIONS.len() {
                    self.selected_option += 1;
                }
            }
            KeyCode::Char('1') => self.selected_option = 0,
            KeyCode::Char('2') => self.selected_option = 1,
            KeyCode::Char('3') => self.selected_option = 2,
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Enter => match self.selected_option {
                0 => self.open_form(),
                1 => {
                    self.search_input.clear();
                    self.search_input.focused = false;
                    self.browser_status = None;
                    self.refresh_file_list();
                    self.state = AppState::Browser;
                }
                2 => {
                    self.state = AppState::Settings;
                }
                _ => {}
            },
            _ => {}
        }
        Ok(())
    }

    fn open_form(&mut self) {
        self.form_error = None;
        // Skip straight to the topic when the key came from the environment.
        let first_empty = if self.api_key_input.value.trim().is_empty() {
            0
        } else {
            1
        };
        self.set_focus(first_empty);
        self.state = AppState::NewMindMap;
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.state = AppState::Home;
            }
            KeyCode::Tab | KeyCode::Down => {
                self.set_focus((self.input_focus + 1) % FORM_FIELDS);
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.set_focus((self.input_focus + FORM_FIELDS - 1) % FORM_FIELDS);
            }
            KeyCode::Enter => {
                if self.input_focus + 1 < FORM_FIELDS {
                    self.set_focus(self.input_focus + 1);
                } else {
                    self.start_processing();
                }
            }
            _ => {
                self.form_error = None;
                match self.input_focus {
                    0 => self.api_key_input.handle_key(key),
                    1 => self.topic_input.handle_key(key),
                    _ => self.url_input.handle_key(key),
                };
            }
        }
        Ok(())
    }

    fn set_focus(&mut self, focus: usize) {
        self.input_focus = focus;
        self.api_key_input.focused = focus == 0;
        self.topic_input.focused = focus == 1;
        self.url_input.focused = focus == 2;
    }

    fn handle_processing_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.code == KeyCode::Esc {
            // Detach from the run; whatever it reports from now on is ignored.
            self.run_id += 1;
            self.progress_bar.reset();
            self.form_error = Some("Generation cancelled.".to_string());
            self.state = AppState::NewMindMap;
        }
        Ok(())
    }

    fn handle_result_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.form_error = None;
                self.state = AppState::NewMindMap;
            }
            KeyCode::Char('d') => self.download(),
            KeyCode::Char('n') => {
                self.topic_input.clear();
                self.url_input.clear();
                self.generated = None;
                self.content_viewer = None;
                self.open_form();
            }
            _ => {
                if let Some(viewer) = &mut self.content_viewer {
                    viewer.handle_key(key, self.viewer_height);
                }
            }
        }
        Ok(())
    }

    fn handle_browser_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.search_input.focused {
            match key.code {
                KeyCode::Esc => {
                    self.search_input.focused = false;
                    self.search_input.clear();
                    self.refresh_file_list();
                }
                KeyCode::Enter => {
                    self.search_input.focused = false;
                }
                _ => {
                    self.search_input.handle_key(key);
                    self.refresh_file_list();
                }
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Esc => {
                self.state = AppState::Home;
            }
            KeyCode::Enter => {
                if let Some(file) = self.file_list.selected().cloned() {
                    self.open_file(file);
                }
            }
            KeyCode::Delete => {
                self.delete_selected_files();
            }
            KeyCode::Char('/') => {
                self.search_input.focused = true;
            }
            _ => {
                self.file_list.handle_key(key);
            }
        }
        Ok(())
    }

    fn handle_viewer_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.content_viewer = None;
                self.state = AppState::Browser;
            }
            _ => {
                if let Some(viewer) = &mut self.content_viewer {
                    viewer.handle_key(key, self.viewer_height);
                }
            }
        }
        Ok(())
    }

    fn handle_settings_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.code == KeyCode::Esc {
            self.state = AppState::Home;
        }
        Ok(())
    }

    fn handle_tick(&mut self) {
        let mut messages = Vec::new();
        if let Some(rx) = &mut self.processing_rx {
            while let Ok(message) = rx.try_recv() {
                messages.push(message);
            }
        }

        for message in messages {
            if message.run != self.run_id {
                continue;
            }

            match message.update {
                ProcessingUpdate::Progress(progress) => self.progress_bar.set_progress(progress),
                ProcessingUpdate::Status(status) => self.progress_bar.set_message(status),
                ProcessingUpdate::Log(log) => self.progress_bar.add_log(log),
                ProcessingUpdate::Finished(outcome) => self.finish_run(*outcome),
                ProcessingUpdate::Saved(Ok(path)) => {
                    self.result_status = Some(format!("Saved to {}", path.display()));
                }
                ProcessingUpdate::Saved(Err(e)) => {
                    self.result_status = Some(format!("Download failed: {e}"));
                }
            }
        }
    }

    fn start_processing(&mut self) {
        let request = MindMapRequest::new(
            self.api_key_input.value.clone(),
            self.topic_input.value.clone(),
            self.url_input.value.clone(),
        );

        // Blank inputs are reported on the form; nothing goes over the network.
        if let Err(e) = request.validate() {
            self.form_error = Some(e.to_string());
            return;
        }

        let Some(tx) = self.processing_tx.clone() else {
            return;
        };

        self.run_id += 1;
        self.form_error = None;
        self.progress_bar.reset();
        self.progress_bar.set_message("Starting...".to_string());
        self.state = AppState::Processing {
            topic: request.topic.trim().to_string(),
        };

        let run = self.run_id;
        let pipeline = Arc::clone(&self.pipeline);

        tokio::spawn(async move {
            let send = |update: ProcessingUpdate| {
                let _ = tx.send(ProcessingMessage { run, update });
            };

            let outcome = pipeline
                .run(&request, |event| {
                    send(ProcessingUpdate::Progress(event.progress()));
                    send(ProcessingUpdate::Status(event.message()));
                    send(ProcessingUpdate::Log(event.message()));
                })
                .await;

            if let Err(e) = &outcome {
                send(ProcessingUpdate::Log(format!("Error: {e}")));
            }
            send(ProcessingUpdate::Finished(Box::new(
                outcome.map_err(|e| e.to_string()),
            )));
        });
    }

    fn finish_run(&mut self, outcome: std::result::Result<GeneratedMindMap, String>) {
        self.progress_bar.reset();

        match outcome {
            Ok(generated) => {
                self.content_viewer = Some(ContentViewer::new(
                    generated.markdown.clone(),
                    "Generated Markmap Markdown".to_string(),
                ));
                self.result_status = Some(format!(
                    "{} | press [d] to download {}",
                    generated.outline.summary(),
                    generated.artifact.file_name
                ));
                self.generated = Some(generated);
                self.state = AppState::Result;
            }
            Err(message) => {
                self.form_error = Some(message);
                self.state = AppState::NewMindMap;
            }
        }
    }

    fn download(&mut self) {
        let (Some(generated), Some(tx)) = (&self.generated, self.processing_tx.clone()) else {
            return;
        };

        let storage = self.storage.clone();
        let artifact = generated.artifact.clone();
        let run = self.run_id;
        self.result_status = Some(format!("Saving {}...", artifact.file_name));

        tokio::spawn(async move {
            let saved = storage
                .save_artifact(&artifact)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(ProcessingMessage {
                run,
                update: ProcessingUpdate::Saved(saved),
            });
        });
    }

    fn refresh_file_list(&mut self) {
        let search_term = self.search_input.value.trim().to_lowercase();

        match self.storage.list_files() {
            Ok(files) => {
                let filtered: Vec<FileEntry> = files
                    .into_iter()
                    .filter(|file| {
                        search_term.is_empty() || file.name.to_lowercase().contains(&search_term)
                    })
                    .collect();
                self.file_list.update_items(filtered);
            }
            Err(e) => {
                self.browser_status = Some(format!("Could not list mind maps: {e}"));
            }
        }
    }

    fn open_file(&mut self, file: FileEntry) {
        match self.storage.read_file(&file.path) {
            Ok(content) => {
                let content = embedded_markdown(&content).unwrap_or(content);
                self.content_viewer = Some(ContentViewer::new(content, file.name.clone()));
                self.state = AppState::Viewer {
                    file_path: file.path,
                };
            }
            Err(e) => {
                self.browser_status = Some(format!("Could not open {}: {e}", file.name));
            }
        }
    }

    fn delete_selected_files(&mut self) {
        let targets: Vec<PathBuf> = self
            .file_list
            .targets()
            .into_iter()
            .map(|file| file.path.clone())
            .collect();

        let mut deleted = 0;
        for path in &targets {
            match self.storage.delete_file(path) {
                Ok(()) => deleted += 1,
                Err(e) => {
                    self.browser_status = Some(format!("Could not delete {}: {e}", path.display()));
                }
            }
        }

        if deleted > 0 {
            self.browser_status = Some(format!("Deleted {deleted} file(s)"));
        }
        self.refresh_file_list();
    }
}

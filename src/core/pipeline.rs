use crate::config::Settings;
use crate::core::artifact::Artifact;
use crate::core::mindmap::{OpenAiGenerator, Outline, TextGenerator, generate_mind_map};
use crate::core::transcript::{TranscriptService, TranscriptSource, extract_transcript};
use crate::error::{Error, InputField, Result};
use tracing::info;

/// What the user typed into the form.
#[derive(Debug, Clone, Default)]
pub struct MindMapRequest {
    pub credential: String,
    pub topic: String,
    pub url: String,
}

impl MindMapRequest {
    pub fn new(
        credential: impl Into<String>,
        topic: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            credential: credential.into(),
            topic: topic.into(),
            url: url.into(),
        }
    }

    /// Reports the first blank field, in form order.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            (InputField::Credential, &self.credential),
            (InputField::Topic, &self.topic),
            (InputField::Url, &self.url),
        ];

        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(Error::MissingInput(*field)),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Transcript,
    Generation,
    Artifact,
}

impl Stage {
    pub const COUNT: usize = 3;

    pub fn number(&self) -> usize {
        match self {
            Stage::Transcript => 1,
            Stage::Generation => 2,
            Stage::Artifact => 3,
        }
    }

    pub fn started_message(&self) -> &'static str {
        match self {
            Stage::Transcript => "Extracting transcript from YouTube...",
            Stage::Generation => "Analyzing transcript to generate the mind map...",
            Stage::Artifact => "Creating downloadable HTML file...",
        }
    }

    pub fn finished_message(&self) -> &'static str {
        match self {
            Stage::Transcript => "Transcript extracted successfully!",
            Stage::Generation => "Mind map generated successfully!",
            Stage::Artifact => "HTML file ready for download!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent {
    Started(Stage),
    Finished(Stage),
}

impl PipelineEvent {
    pub fn progress(&self) -> f64 {
        let done = match self {
            PipelineEvent::Started(stage) => stage.number() - 1,
            PipelineEvent::Finished(stage) => stage.number(),
        };
        done as f64 / Stage::COUNT as f64
    }

    pub fn message(&self) -> String {
        match self {
            PipelineEvent::Started(stage) => format!(
                "Step {}/{}: {}",
                stage.number(),
                Stage::COUNT,
                stage.started_message()
            ),
            PipelineEvent::Finished(stage) => stage.finished_message().to_string(),
        }
    }
}

/// Outcome of one successful run.
#[derive(Debug, Clone)]
pub struct GeneratedMindMap {
    pub topic: String,
    pub video_id: String,
    pub markdown: String,
    pub outline: Outline,
    pub artifact: Artifact,
}

pub struct Pipeline<S, G> {
    source: S,
    generator: G,
}

impl Pipeline<TranscriptService, OpenAiGenerator> {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let source = TranscriptService::new(settings.language_list())?;
        let generator = OpenAiGenerator::new(&settings.model, &settings.api_base);
        Ok(Self::new(source, generator))
    }
}

impl<S: TranscriptSource, G: TextGenerator> Pipeline<S, G> {
    pub fn new(source: S, generator: G) -> Self {
        Self { source, generator }
    }

    /// Validate, fetch the transcript, generate the mind map and render it.
    /// Stops at the first failure; nothing is produced for a failed run.
    pub async fn run<F>(&self, request: &MindMapRequest, mut on_event: F) -> Result<GeneratedMindMap>
    where
        F: FnMut(PipelineEvent),
    {
        request.validate()?;
        let topic = request.topic.trim();

        on_event(PipelineEvent::Started(Stage::Transcript));
        let transcript = extract_transcript(&self.source, request.url.trim()).await?;
        on_event(PipelineEvent::Finished(Stage::Transcript));

        on_event(PipelineEvent::Started(Stage::Generation));
        let markdown = generate_mind_map(
            &self.generator,
            request.credential.trim(),
            topic,
            &transcript.text,
        )
        .await?;
        on_event(PipelineEvent::Finished(Stage::Generation));

        on_event(PipelineEvent::Started(Stage::Artifact));
        let outline = Outline::of(&markdown);
        let artifact = Artifact::new(topic, &markdown);
        on_event(PipelineEvent::Finished(Stage::Artifact));

        info!(
            video_id = %transcript.video_id,
            fragments = transcript.fragments,
            file_name = %artifact.file_name,
            outline = %outline.summary(),
            "mind map ready"
        );

        Ok(GeneratedMindMap {
            topic: topic.to_string(),
            video_id: transcript.video_id,
            markdown,
            outline,
            artifact,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifact::script_literal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct ScriptedCaptions {
        fragments: Vec<String>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl TranscriptSource for ScriptedCaptions {
        async fn fetch_fragments(&self, video_id: &str) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::TranscriptUnavailable {
                    video_id: video_id.to_string(),
                    reason: "video unavailable".to_string(),
                });
            }
            Ok(self.fragments.clone())
        }
    }

    #[derive(Default)]
    struct ScriptedModel {
        reply: String,
        fail: bool,
        calls: AtomicUsize,
    }

    impl TextGenerator for ScriptedModel {
        async fn complete(&self, _credential: &str, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::custom("429 quota exceeded"));
            }
            Ok(self.reply.clone())
        }
    }

    fn pipeline(fragments: &[&str], reply: &str) -> Pipeline<ScriptedCaptions, ScriptedModel> {
        Pipeline::new(
            ScriptedCaptions {
                fragments: fragments.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
            ScriptedModel {
                reply: reply.to_string(),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn end_to_end_with_mocked_services() {
        let pipeline = pipeline(&["Hello", "World"], "```markdown\n# Test Topic\n- A\n  - B\n```");
        let request = MindMapRequest::new(
            "sk-test",
            "Test Topic",
            "https://www.youtube.com/watch?v=abc123",
        );

        let mut events = Vec::new();
        let result = pipeline
            .run(&request, |event| events.push(event))
            .await
            .expect("pipeline succeeds");

        assert_eq!(result.video_id, "abc123");
        assert_eq!(result.markdown, "# Test Topic\n- A\n  - B");
        assert_eq!(result.artifact.file_name, "test_topic.html");
        assert_eq!(result.artifact.mime, "text/html");
        assert!(result.artifact.html.contains(&script_literal(&result.markdown)));
        assert_eq!(result.outline.branches, 1);

        assert_eq!(events.len(), 6);
        assert_eq!(events[0], PipelineEvent::Started(Stage::Transcript));
        assert_eq!(events[5], PipelineEvent::Finished(Stage::Artifact));
        assert_eq!(events[5].progress(), 1.0);
    }

    #[tokio::test]
    async fn missing_credential_stops_before_any_call() {
        let pipeline = pipeline(&["Hello"], "# T");
        let request =
            MindMapRequest::new("", "Test Topic", "https://www.youtube.com/watch?v=abc123");

        let mut events = Vec::new();
        let err = pipeline
            .run(&request, |event| events.push(event))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingInput(InputField::Credential)));
        assert!(events.is_empty());
        assert_eq!(pipeline.source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(pipeline.generator.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn validation_reports_fields_in_form_order() {
        let err = MindMapRequest::new("  ", "", "").validate().unwrap_err();
        assert!(matches!(err, Error::MissingInput(InputField::Credential)));

        let err = MindMapRequest::new("key", " ", "").validate().unwrap_err();
        assert!(matches!(err, Error::MissingInput(InputField::Topic)));

        let err = MindMapRequest::new("key", "topic", "").validate().unwrap_err();
        assert!(matches!(err, Error::MissingInput(InputField::Url)));

        assert!(MindMapRequest::new("key", "topic", "url").validate().is_ok());
    }

    #[tokio::test]
    async fn invalid_url_halts_before_generation() {
        let pipeline = pipeline(&["Hello"], "# T");
        let request = MindMapRequest::new("key", "Topic", "https://vimeo.com/12345");

        let err = pipeline.run(&request, |_| {}).await.unwrap_err();

        assert!(matches!(err, Error::InvalidUrl { .. }));
        assert_eq!(pipeline.source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(pipeline.generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transcript_failure_halts_before_generation() {
        let pipeline = Pipeline::new(
            ScriptedCaptions {
                fail: true,
                ..Default::default()
            },
            ScriptedModel::default(),
        );
        let request = MindMapRequest::new("key", "Topic", "https://youtu.be/abc123");

        let mut events = Vec::new();
        let err = pipeline
            .run(&request, |event| events.push(event))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::TranscriptUnavailable { .. }));
        assert_eq!(events, vec![PipelineEvent::Started(Stage::Transcript)]);
        assert_eq!(pipeline.generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn generation_failure_produces_no_artifact() {
        let pipeline = Pipeline::new(
            ScriptedCaptions {
                fragments: vec!["Hello".to_string()],
                ..Default::default()
            },
            ScriptedModel {
                fail: true,
                ..Default::default()
            },
        );
        let request = MindMapRequest::new("key", "Topic", "https://youtu.be/abc123");

        let mut events = Vec::new();
        let err = pipeline
            .run(&request, |event| events.push(event))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::GenerationFailed { .. }));
        assert!(err.to_string().contains("429 quota exceeded"));
        assert_eq!(
            events.last(),
            Some(&PipelineEvent::Started(Stage::Generation))
        );
        assert!(!events.contains(&PipelineEvent::Started(Stage::Artifact)));
        assert_eq!(pipeline.source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(pipeline.generator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn events_describe_progress() {
        let started = PipelineEvent::Started(Stage::Generation);
        assert_eq!(
            started.message(),
            "Step 2/3: Analyzing transcript to generate the mind map..."
        );
        assert!((started.progress() - 1.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(PipelineEvent::Started(Stage::Transcript).progress(), 0.0);
    }
}

use crate::error::{Error, Result};
use async_openai::{
    self,
    config::OpenAIConfig,
    types::responses::{
        CreateResponseArgs, EasyInputMessageArgs, InputItem, InputParam, OutputItem,
        OutputMessageContent, Role,
    },
};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use std::future::Future;
use tracing::{debug, warn};

/// A hosted text model: one prompt in, one completion out.
pub trait TextGenerator {
    fn complete(
        &self,
        credential: &str,
        prompt: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    model: String,
    api_base: String,
}

impl OpenAiGenerator {
    pub fn new(model: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_base: api_base.into(),
        }
    }
}

impl TextGenerator for OpenAiGenerator {
    async fn complete(&self, credential: &str, prompt: &str) -> Result<String> {
        let config = OpenAIConfig::new()
            .with_api_key(credential.to_string())
            .with_api_base(self.api_base.clone());
        let client = async_openai::Client::with_config(config);

        // Sampling parameters stay at the service defaults.
        let request = CreateResponseArgs::default()
            .model(self.model.clone())
            .input(InputParam::Items(vec![InputItem::EasyMessage(
                EasyInputMessageArgs::default()
                    .role(Role::User)
                    .content(prompt)
                    .build()
                    .map_err(Error::generation)?,
            )]))
            .build()
            .map_err(Error::generation)?;

        let response = client
            .responses()
            .create(request)
            .await
            .map_err(Error::generation)?;

        let mut content = String::new();
        for output in response.output {
            if let OutputItem::Message(out) = output {
                for c in out.content {
                    match c {
                        OutputMessageContent::OutputText(text) => content.push_str(&text.text),
                        _ => {
                            warn!("ignoring non-text content in model response");
                            continue;
                        }
                    }
                }
            }
        }

        if content.trim().is_empty() {
            return Err(Error::generation("the model returned no text"));
        }

        Ok(content)
    }
}

/// Ask `generator` for a mind map of `transcript` rooted at `topic`.
pub async fn generate_mind_map<G: TextGenerator>(
    generator: &G,
    credential: &str,
    topic: &str,
    transcript: &str,
) -> Result<String> {
    let prompt = build_prompt(topic, transcript);
    debug!(prompt_chars = prompt.len(), "requesting mind map");

    let raw = generator
        .complete(credential, &prompt)
        .await
        .map_err(|e| match e {
            Error::GenerationFailed { .. } => e,
            other => Error::generation(other),
        })?;

    let markdown = clean_markdown(&raw);
    debug!(
        raw_chars = raw.len(),
        markdown_chars = markdown.len(),
        "mind map received"
    );
    Ok(markdown)
}

pub fn build_prompt(topic: &str, transcript: &str) -> String {
    format!(
        r#"
### System Instructions & Persona
You are an expert AI assistant specialising in academic content analysis for competitive examinations. Act as a **UPSC (Union Public Service Commission) Exam Analyst**.

You turn educational content into a tightly organised, hierarchical mind map for efficient learning and revision. Be precise and factual, and stay strictly within the supplied material: accuracy is paramount for exam preparation.

### Workflow Goal
Analyse the provided `youtube_transcript` on the topic of `video_topic` and convert it into a logical mind map written in Markdown that the `markmap` tool can render.

### Core Instructions & Constraints
1.  **Strict Source Adherence:** Derive every piece of information exclusively from `youtube_transcript`. Do not introduce external facts, figures or concepts. Distil and structure what is given; never supplement it.
2.  **UPSC Relevance Filter:** Read the transcript through the lens of the UPSC Civil Services Examination syllabus and prioritise the information most relevant to the exam.
3.  **Logical Structuring:** Do not merely list points. Identify the main themes of the transcript and arrange the extracted details hierarchically beneath them, flowing from main ideas to supporting details.
4.  **Conciseness:** Use clear, concise language. Summarise points without losing their core meaning, using bullet points for detailed breakdowns.

### Output Format (CRITICAL)
The output **MUST** be a single Markdown code block formatted for `markmap`, following this structure exactly:
* **Root Node (`#`):** the main topic of the video, taken from `video_topic`.
* **Main Branches (`-`):** the primary themes or sections identified in the transcript.
* **Sub-branches (indented `-`):** supporting details, facts, figures and examples. Use two spaces for each level of indentation.

-----
### User Input Variables

*   `video_topic`: {topic}
*   `youtube_transcript`: {transcript}
"#
    )
}

const MIN_FENCE: usize = 3;

pub fn clean_markdown(raw: &str) -> String {
    let mut text = raw.trim();

    // An opening fence is any run of three or more backticks; the closing run
    // must be at least as long.
    let opening = backtick_run(text.chars());
    if opening >= MIN_FENCE {
        let rest = &text[opening..];
        let (first_line, remainder) = rest.split_once('\n').unwrap_or((rest, ""));
        text = if is_info_string(first_line) {
            remainder
        } else {
            rest
        };
    }

    let text = text.trim_end();
    let closing = backtick_run(text.chars().rev());
    let text = if closing >= opening.max(MIN_FENCE) {
        &text[..text.len() - closing]
    } else {
        text
    };
    text.trim().to_string()
}

fn backtick_run(chars: impl Iterator<Item = char>) -> usize {
    chars.take_while(|&c| c == '`').count()
}

fn is_info_string(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'))
}

/// Shape of a mind-map document as markmap will see it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Outline {
    pub headings: usize,
    pub branches: usize,
    pub nodes: usize,
    pub depth: usize,
}

impl Outline {
    pub fn of(markdown: &str) -> Self {
        let mut outline = Outline::default();
        let mut list_depth = 0usize;

        for event in Parser::new(markdown) {
            match event {
                Event::Start(Tag::Heading { .. }) => outline.headings += 1,
                Event::Start(Tag::List(_)) => {
                    list_depth += 1;
                    outline.depth = outline.depth.max(list_depth);
                }
                Event::End(TagEnd::List(_)) => list_depth = list_depth.saturating_sub(1),
                Event::Start(Tag::Item) => {
                    outline.nodes += 1;
                    if list_depth == 1 {
                        outline.branches += 1;
                    }
                }
                _ => {}
            }
        }

        outline
    }

    pub fn summary(&self) -> String {
        format!(
            "{} heading(s), {} branch(es), {} node(s), depth {}",
            self.headings, self.branches, self.nodes, self.depth
        )
    }
}

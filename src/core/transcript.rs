use crate::error::{Error, Result};
use std::future::Future;
use tracing::{debug, info};
use yt_transcript_rs::api::YouTubeTranscriptApi;

/// Anything that can hand back the caption fragments of a video, in order.
pub trait TranscriptSource {
    fn fetch_fragments(&self, video_id: &str) -> impl Future<Output = Result<Vec<String>>> + Send;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub video_id: String,
    pub text: String,
    pub fragments: usize,
}

#[derive(Clone)]
pub struct TranscriptService {
    api: YouTubeTranscriptApi,
    languages: Vec<String>,
}

impl TranscriptService {
    pub fn new(languages: Vec<String>) -> Result<Self> {
        let api = YouTubeTranscriptApi::new(None, None, None)
            .map_err(|e| Error::custom(format!("Failed to initialise transcript client: {e}")))?;
        Ok(Self { api, languages })
    }
}

impl TranscriptSource for TranscriptService {
    async fn fetch_fragments(&self, video_id: &str) -> Result<Vec<String>> {
        let languages: Vec<&str> = self.languages.iter().map(String::as_str).collect();

        match self.api.fetch_transcript(video_id, &languages, false).await {
            Ok(transcript) => Ok(transcript
                .snippets
                .into_iter()
                .map(|snippet| snippet.text)
                .collect()),
            Err(e) => Err(Error::TranscriptUnavailable {
                video_id: video_id.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

/// Resolve the video behind `url` and return its flattened transcript.
///
/// Nothing is requested from `source` when the URL carries no usable video ID.
pub async fn extract_transcript<S: TranscriptSource>(source: &S, url: &str) -> Result<Transcript> {
    let video_id = extract_video_id(url).ok_or_else(|| Error::InvalidUrl {
        url: url.to_string(),
    })?;
    info!(%video_id, "fetching transcript");

    let fragments = source.fetch_fragments(&video_id).await?;
    let text = join_fragments(&fragments);
    debug!(fragments = fragments.len(), chars = text.len(), "transcript fetched");

    Ok(Transcript {
        video_id,
        text,
        fragments: fragments.len(),
    })
}

pub fn join_fragments(fragments: &[String]) -> String {
    fragments.join(" ")
}

const ID_MARKERS: [&str; 2] = ["v=", "be/"];
const ID_TERMINATORS: [char; 4] = ['&', '#', '?', '/'];

/// Pull the video ID out of `watch?v=ID` and `youtu.be/ID` style URLs.
///
/// The leftmost marker followed by at least one ID character wins.
pub fn extract_video_id(url: &str) -> Option<String> {
    for (idx, _) in url.char_indices() {
        if !ID_MARKERS.iter().any(|marker| url[..idx].ends_with(marker)) {
            continue;
        }

        let raw_id = url[idx..].split(ID_TERMINATORS).next().unwrap_or("");
        if !raw_id.is_empty() {
            return sanitize_video_id(raw_id).ok();
        }
    }

    None
}

const MAX_VIDEO_ID_LEN: usize = 128;

/// Ensure a video identifier is safe to hand to the transcript service.
/// Only ASCII alphanumeric characters plus `_` and `-` are allowed.
pub fn sanitize_video_id(raw: &str) -> Result<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(Error::custom("Video ID cannot be empty"));
    }

    if trimmed.len() > MAX_VIDEO_ID_LEN {
        return Err(Error::custom("Video ID is unexpectedly long"));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
    {
        return Err(Error::custom(
            "Video ID contains unsupported characters; expected only letters, numbers, '-' or '_'",
        ));
    }

    Ok(trimmed.to_string())
}

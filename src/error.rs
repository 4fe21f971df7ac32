use derive_more::{Display, From};

pub type Result<T> = core::result::Result<T, Error>;

/// The three inputs a run needs, in the order they are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Credential,
    Topic,
    Url,
}

impl InputField {
    pub fn missing_message(&self) -> &'static str {
        match self {
            InputField::Credential => "Please enter your API key.",
            InputField::Topic => "Please provide a video topic.",
            InputField::Url => "Please provide a YouTube URL.",
        }
    }
}

#[derive(Debug, Display, From)]
pub enum Error {
    #[display("{_0}")]
    Custom(String),

    #[display("{}", _0.missing_message())]
    MissingInput(InputField),

    #[display(
        "Could not extract video ID from the URL ({url}). Please use a valid YouTube video link."
    )]
    InvalidUrl { url: String },

    #[display(
        "Could not fetch transcript for {video_id}. The video might not have transcripts enabled, or the URL is incorrect. (Details: {reason})"
    )]
    TranscriptUnavailable { video_id: String, reason: String },

    #[display(
        "Failed to generate mind map from the LLM. Please check your API key and try again. (Details: {reason})"
    )]
    GenerationFailed { reason: String },

    #[display("IO error: {_0}")]
    #[from]
    Io(std::io::Error),
}

impl Error {
    pub fn custom(val: impl std::fmt::Display) -> Self {
        Self::Custom(val.to_string())
    }

    pub fn generation(reason: impl std::fmt::Display) -> Self {
        Self::GenerationFailed {
            reason: reason.to_string(),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::{Error, InputField};

    #[test]
    fn missing_input_messages_are_distinct() {
        let messages: Vec<String> = [InputField::Credential, InputField::Topic, InputField::Url]
            .into_iter()
            .map(|field| Error::MissingInput(field).to_string())
            .collect();

        assert_eq!(messages[0], "Please enter your API key.");
        assert_ne!(messages[0], messages[1]);
        assert_ne!(messages[1], messages[2]);
        assert_ne!(messages[0], messages[2]);
    }

    #[test]
    fn stage_failures_carry_details() {
        let err = Error::TranscriptUnavailable {
            video_id: "abc123".into(),
            reason: "captions disabled".into(),
        };
        assert!(err.to_string().ends_with("(Details: captions disabled)"));

        let err = Error::generation("quota exceeded");
        assert!(err.to_string().contains("check your API key"));
        assert!(err.to_string().contains("quota exceeded"));
    }
}

use clap::Args;
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_OUTPUT_DIR: &str = "mindmaps";

/// Settings shared by every mode. The API key is deliberately not part of
/// this: it is an input of each run.
#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Model used to build the mind map
    #[arg(long, global = true, env = "VIDMAP_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, global = true, env = "VIDMAP_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Preferred transcript languages (comma-separated)
    #[arg(short, long, global = true, env = "VIDMAP_LANGUAGES", default_value = "en")]
    pub languages: String,

    /// Directory downloaded mind maps are written to
    #[arg(short, long, global = true, env = "VIDMAP_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,
}

impl Settings {
    pub fn language_list(&self) -> Vec<String> {
        let languages: Vec<String> = self
            .languages
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if languages.is_empty() {
            vec!["en".to_string()]
        } else {
            languages
        }
    }

    /// Lines shown on the settings screen.
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Model", self.model.clone()),
            ("API base", self.api_base.clone()),
            ("Languages", self.language_list().join(", ")),
            ("Output directory", self.output_dir.display().to_string()),
        ]
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            languages: "en".to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;

    #[test]
    fn splits_and_trims_languages() {
        let settings = Settings {
            languages: " en, es ,,de".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.language_list(), vec!["en", "es", "de"]);
    }

    #[test]
    fn falls_back_to_english() {
        let settings = Settings {
            languages: " , ".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.language_list(), vec!["en"]);
    }
}

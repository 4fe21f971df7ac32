use crate::config::Settings;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vidmap")]
#[command(about = "Turn a YouTube video's transcript into an interactive mind map")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub settings: Settings,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a mind map and save it as an HTML file
    Generate {
        /// Topic of the video; becomes the root of the mind map and the file name
        #[arg(short, long)]
        topic: String,

        /// YouTube video URL
        #[arg(short, long)]
        url: String,

        /// API key for the language model
        #[arg(long, env = "VIDMAP_API_KEY", hide_env_values = true, default_value = "")]
        api_key: String,

        /// Print the generated Markdown
        #[arg(short, long)]
        print: bool,
    },

    /// List downloaded mind maps
    List {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Open TUI interface
    Tui,
}

use clap::Parser;
use std::path::PathBuf;

/// Upload a mix to Mixcloud.
#[derive(Parser, Debug, Default)]
#[command(name = "mixcloud-uploader", version)]
pub struct Args {
    /// About the application
    #[arg(long)]
    pub about: bool,

    /// Configure the application
    #[arg(long)]
    pub config: bool,

    /// The mp3 file to upload to mixcloud
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// The image file to upload to mixcloud as the cover
    #[arg(long, value_name = "PATH")]
    pub cover: Option<PathBuf>,

    /// A file containing a tracklist for the cloudcast
    #[arg(long, value_name = "PATH")]
    pub tracklist: Option<PathBuf>,

    /// A title for the cloudcast
    #[arg(long)]
    pub title: Option<String>,

    /// A description for the cloudcast
    #[arg(long)]
    pub description: Option<String>,

    /// A comma-separated list of tags to apply to the cloudcast
    #[arg(long)]
    pub tags: Option<String>,

    /// A custom directory to store the mixcloud uploader configuration in
    #[arg(long, value_name = "PATH")]
    pub config_dir: Option<PathBuf>,
}

impl Args {
    /// True when any of title, description or tags came from the command
    /// line; the interactive questions are skipped in that case.
    pub fn has_cast_details(&self) -> bool {
        self.title.is_some() || self.description.is_some() || self.tags.is_some()
    }
}

// Upload form module: assembles the multipart/form-data form sent to the
// upload endpoint. Field names follow the endpoint's indexed convention
// (`tags-0-tag`, `sections-0-artist`, ...), so positions matter.

use crate::api::User;
use crate::tracklist::Track;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use reqwest::blocking::multipart::{Form, Part};
use std::fs::File;
use std::path::Path;

/// Name, description and tags of the cloudcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CastDetails {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Publishing attributes only pro accounts may set. `publish_date` is an
/// RFC-3339 UTC timestamp already checked to lie in the future.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PremiumOptions {
    pub publish_date: Option<String>,
    pub disable_comments: bool,
    pub hide_stats: bool,
    pub unlisted: bool,
}

/// Split a comma separated tag list. Order and duplicates are kept, blank
/// entries are dropped.
pub fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[derive(Debug)]
enum Field {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        file: File,
        len: u64,
    },
}

/// Ordered list of form fields. Files are opened when added and streamed
/// when the request is sent. Call [`UploadForm::finish`] to turn the list
/// into a multipart form; the list is consumed, so nothing can be appended
/// afterwards.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: Vec<Field>,
}

/// A finished multipart form, ready to be sent.
#[derive(Debug)]
pub struct MultipartBody {
    form: Form,
    file_bytes: u64,
}

impl MultipartBody {
    /// Value of the `Content-Type` header the form is sent with.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.form.boundary())
    }

    /// Total size of the attached files; this is what the progress bar
    /// counts.
    pub fn file_bytes(&self) -> u64 {
        self.file_bytes
    }

    pub fn into_form(self) -> Form {
        self.form
    }
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plain text field. Empty values are still written.
    pub fn text(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.fields.push(Field::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Attach the file at `path` under the form key `name`. The file is
    /// opened now so a bad path fails before anything is sent.
    pub fn file(&mut self, name: &str, path: &Path) -> Result<&mut Self> {
        let file = File::open(path)
            .with_context(|| format!("Error opening file {}", path.display()))?;
        let len = file
            .metadata()
            .with_context(|| format!("Error reading file {}", path.display()))?
            .len();
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(name)
            .to_string();
        log::debug!("adding {} ({} bytes) as `{}`", path.display(), len, name);
        self.fields.push(Field::File {
            name: name.to_string(),
            file_name,
            file,
            len,
        });
        Ok(self)
    }

    /// `name`, `description` and one `tags-{i}-tag` field per tag.
    pub fn add_details(&mut self, details: &CastDetails) -> &mut Self {
        self.text("name", details.name.as_str());
        self.text("description", details.description.as_str());
        for (i, tag) in details.tags.iter().enumerate() {
            self.text(format!("tags-{}-tag", i), tag.as_str());
        }
        self
    }

    /// Three `sections-{i}-*` fields per track, in tracklist order.
    pub fn add_tracklist(&mut self, tracks: &[Track]) -> &mut Self {
        for (i, track) in tracks.iter().enumerate() {
            self.text(format!("sections-{}-artist", i), track.artist.as_str());
            self.text(format!("sections-{}-song", i), track.song.as_str());
            self.text(format!("sections-{}-start_time", i), track.start_time.to_string());
        }
        self
    }

    /// Premium fields, written only for pro users. Flags that are off are
    /// left out instead of being sent as "0".
    pub fn add_premium(&mut self, user: &User, options: &PremiumOptions) -> &mut Self {
        if !user.is_pro {
            return self;
        }
        if let Some(date) = &options.publish_date {
            self.text("publish_date", date.as_str());
        }
        for (name, enabled) in [
            ("disable_comments", options.disable_comments),
            ("hide_stats", options.hide_stats),
            ("unlisted", options.unlisted),
        ] {
            if enabled {
                self.text(name, "1");
            }
        }
        self
    }

    /// Text fields in insertion order.
    pub fn text_fields(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.fields.iter().filter_map(|f| match f {
            Field::Text { name, value } => Some((name.as_str(), value.as_str())),
            Field::File { .. } => None,
        })
    }

    /// Form keys of the attached files, in insertion order.
    pub fn file_fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().filter_map(|f| match f {
            Field::File { name, .. } => Some(name.as_str()),
            Field::Text { .. } => None,
        })
    }

    /// Build the multipart form. File contents are read through `progress`
    /// while the request is sent, and its length is set to the file total.
    pub fn finish(self, progress: &ProgressBar) -> Result<MultipartBody> {
        let mut form = Form::new();
        let mut file_bytes = 0;
        for field in self.fields {
            form = match field {
                Field::Text { name, value } => form.text(name, value),
                Field::File {
                    name,
                    file_name,
                    file,
                    len,
                } => {
                    file_bytes += len;
                    let part = Part::reader_with_length(progress.wrap_read(file), len)
                        .file_name(file_name)
                        .mime_str("application/octet-stream")?;
                    form.part(name, part)
                }
            };
        }
        progress.set_length(file_bytes);
        Ok(MultipartBody { form, file_bytes })
    }
}

/// Build the complete upload form: details, tracklist, premium fields,
/// then the audio file (`mp3`) and the optional cover (`picture`).
/// Failing to open either file is an error.
pub fn build_upload_body(
    details: &CastDetails,
    tracklist: &[Track],
    user: &User,
    premium: &PremiumOptions,
    audio: &Path,
    cover: Option<&Path>,
    progress: &ProgressBar,
) -> Result<MultipartBody> {
    let mut form = UploadForm::new();
    form.add_details(details)
        .add_tracklist(tracklist)
        .add_premium(user, premium);
    form.file("mp3", audio)?;
    if let Some(cover) = cover {
        form.file("picture", cover)?;
    }
    form.finish(progress)
}

// Response module: the decoded upload response and the rules that turn it
// into a success or failure for the user.

use crate::tracklist::{write_tracklist, Track};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Host used to build the link to the uploaded cloudcast.
pub const SHARE_HOST: &str = "mixcloud.com";

/// Body of the upload endpoint's answer. Exactly one of `error` and
/// `result` is expected; anything else is treated as a failure.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UploadResponse {
    #[serde(default)]
    pub error: Option<ApiError>,
    /// Per-field diagnostics sent along with an error.
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default)]
    pub result: Option<UploadResult>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UploadResult {
    #[serde(default)]
    pub success: bool,
    /// Resource path of the new cloudcast, e.g. `/user/show-name/`.
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// What a response means for the run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Uploaded {
        url: String,
    },
    Rejected {
        message: String,
        kind: Option<String>,
        details: Option<serde_json::Value>,
    },
    Unexpected(UploadResponse),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Uploaded { .. })
    }
}

/// `https://<host><key>edit`, the page where the cloudcast can be edited.
pub fn share_url(key: &str) -> String {
    format!("https://{}{}edit", SHARE_HOST, key)
}

impl UploadResponse {
    pub fn reconcile(self) -> Outcome {
        if let Some(error) = self.error {
            return Outcome::Rejected {
                message: error.message,
                kind: error.kind,
                details: self.details,
            };
        }
        match &self.result {
            Some(result) if result.success => Outcome::Uploaded {
                url: share_url(&result.key),
            },
            _ => Outcome::Unexpected(self),
        }
    }
}

/// Print `outcome` and, on success only, the tracklist summary. Returns
/// whether the upload succeeded.
pub fn report_outcome<O: Write, E: Write>(
    outcome: &Outcome,
    tracklist: Option<&[Track]>,
    out: &mut O,
    err: &mut E,
) -> std::io::Result<bool> {
    match outcome {
        Outcome::Uploaded { url } => {
            writeln!(out, "{}", "Successfully uploaded file".green())?;
            writeln!(out, "{}", url.green())?;
            if let Some(tracks) = tracklist {
                write_tracklist(out, tracks)?;
            }
            Ok(true)
        }
        Outcome::Rejected {
            message,
            kind,
            details,
        } => {
            writeln!(err, "{}", message.red().bold())?;
            if let Some(kind) = kind {
                writeln!(err, "Error type: {}", kind)?;
            }
            if let Some(details) = details {
                writeln!(err, "{}", details)?;
            }
            Ok(false)
        }
        Outcome::Unexpected(response) => {
            writeln!(err, "{}", "Error uploading, no success".red().bold())?;
            writeln!(err, "{:?}", response)?;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Outcome {
        serde_json::from_str::<UploadResponse>(json).unwrap().reconcile()
    }

    fn report(outcome: &Outcome, tracks: Option<&[Track]>) -> (bool, String, String) {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let ok = report_outcome(outcome, tracks, &mut out, &mut err).unwrap();
        (
            ok,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    fn tracks() -> Vec<Track> {
        vec![
            Track { artist: "Chicane".into(), song: "Sunstroke".into(), start_time: 64 },
            Track { artist: "Will Atkinson".into(), song: "Isolator".into(), start_time: 7291 },
        ]
    }

    #[test]
    fn api_error_is_a_failure_without_tracklist() {
        let outcome = decode(r#"{"error": {"message": "Invalid token"}}"#);
        assert_eq!(
            outcome,
            Outcome::Rejected {
                message: "Invalid token".into(),
                kind: None,
                details: None
            }
        );

        let tracks = tracks();
        let (ok, out, err) = report(&outcome, Some(&tracks));
        assert!(!ok);
        assert!(err.contains("Invalid token"));
        assert!(!out.contains("Tracklist"));
        assert!(!out.contains("Sunstroke"));
    }

    #[test]
    fn api_error_details_are_dumped() {
        let outcome = decode(
            r#"{"error": {"message": "Upload failed", "type": "UploadError"},
                "details": {"mp3": ["This field is required."]}}"#,
        );
        let (ok, _, err) = report(&outcome, None);
        assert!(!ok);
        assert!(err.contains("UploadError"));
        assert!(err.contains("This field is required."));
    }

    #[test]
    fn success_prints_share_url_and_tracklist() {
        let outcome = decode(r#"{"result": {"success": true, "key": "/user/show/mycast/"}}"#);
        assert_eq!(
            outcome,
            Outcome::Uploaded {
                url: "https://mixcloud.com/user/show/mycast/edit".into()
            }
        );

        let tracks = tracks();
        let (ok, out, _) = report(&outcome, Some(&tracks));
        assert!(ok);
        assert!(out.contains("https://mixcloud.com/user/show/mycast/edit"));
        assert!(out.contains("Tracklist\n1. Chicane-Sunstroke\n2. Will Atkinson-Isolator\n"));
    }

    #[test]
    fn success_without_tracklist_prints_no_summary() {
        let outcome = decode(r#"{"result": {"success": true, "key": "/a/b/"}}"#);
        let (ok, out, _) = report(&outcome, None);
        assert!(ok);
        assert!(!out.contains("Tracklist"));
    }

    #[test]
    fn unsuccessful_or_empty_responses_fail() {
        for json in [
            r#"{}"#,
            r#"{"result": {"success": false, "key": "/a/b/"}}"#,
            r#"{"result": null, "error": null}"#,
        ] {
            let outcome = decode(json);
            assert!(matches!(outcome, Outcome::Unexpected(_)), "{}", json);
            let (ok, _, err) = report(&outcome, None);
            assert!(!ok);
            assert!(err.contains("no success"));
        }
    }
}

// Library root
// -----------
// The binary (`main.rs`) only parses arguments and maps the result of
// `app::run` to an exit code; everything else lives here.
//
// Module responsibilities:
// - `config`: the saved access token and default tags.
// - `api`: HTTP calls to Mixcloud (token exchange, `/me`, upload).
// - `tracklist`: reading tracklist exports and printing the summary.
// - `upload`: building the multipart upload body.
// - `publish_date`: parsing and checking scheduled publish dates.
// - `response`: interpreting the upload response.
// - `ui`: prompts, colored output and the progress bar.
// - `cli`: command line flags.
// - `app`: the run itself.
pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod publish_date;
pub mod response;
pub mod tracklist;
pub mod ui;
pub mod upload;

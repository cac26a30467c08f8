// Run orchestration: configuration, user lookup, form collection, upload
// and reporting, in that order. Any error returned from here ends the run;
// `main` turns it into the exit code.

use crate::api::{ApiClient, User};
use crate::cli::Args;
use crate::config::{ConfigStore, Configuration, Loaded};
use crate::response::report_outcome;
use crate::tracklist::load_tracklist;
use crate::ui::{self, Prompter, TerminalPrompter};
use crate::upload::{build_upload_body, split_tags, CastDetails, PremiumOptions};
use anyhow::{anyhow, Result};

/// How a run that did not error ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing to upload (`--about`).
    Done,
    Uploaded,
    /// The API answered, but not with a success.
    Failed,
}

impl RunOutcome {
    pub fn exit_code(self) -> i32 {
        match self {
            RunOutcome::Done | RunOutcome::Uploaded => 0,
            RunOutcome::Failed => 2,
        }
    }
}

/// Exit code for runs that ended with an error.
pub const FATAL_EXIT_CODE: i32 = 2;

/// State of one run, built once the configuration and user are known.
pub struct RunContext {
    pub args: Args,
    pub api: ApiClient,
    pub config: Configuration,
    pub user: User,
}

/// Run against the real API and terminal.
pub fn run(args: Args) -> Result<RunOutcome> {
    ui::print_welcome();
    if args.about {
        ui::print_about();
        return Ok(RunOutcome::Done);
    }
    let api = ApiClient::from_env()?;
    run_with(args, api, &mut TerminalPrompter)
}

/// Same as [`run`] minus the banner, with the client and prompter supplied
/// by the caller.
pub fn run_with(args: Args, api: ApiClient, prompter: &mut dyn Prompter) -> Result<RunOutcome> {
    let store = ConfigStore::new(args.config_dir.clone())?;
    let config = load_or_create_config(&store, &api, prompter, args.config)?;
    let token = config.require_token()?;

    ui::print_success("Fetching your user data..");
    let user = api.fetch_current_user(token)?;
    log::info!("logged in as {} (pro: {})", user.username, user.is_pro);

    let ctx = RunContext {
        args,
        api,
        config,
        user,
    };
    ctx.upload(prompter)
}

/// Load the saved configuration, creating it interactively when it is
/// missing, unreadable, or `force` is set.
pub fn load_or_create_config(
    store: &ConfigStore,
    api: &ApiClient,
    prompter: &mut dyn Prompter,
    force: bool,
) -> Result<Configuration> {
    if force {
        return create_config(store, api, prompter);
    }
    match store.load() {
        Loaded::Found(config) => Ok(config),
        Loaded::Missing => create_config(store, api, prompter),
        Loaded::Invalid(e) => {
            log::warn!("{:#}", e);
            ui::print_error(&format!("{:#}", e));
            create_config(store, api, prompter)
        }
    }
}

/// Walk the user through the OAuth code exchange and save the result.
pub fn create_config(
    store: &ConfigStore,
    api: &ApiClient,
    prompter: &mut dyn Prompter,
) -> Result<Configuration> {
    println!("Creating Configuration File...");
    println!("Please visit the URL below\n\n{}\n", api.authorize_url());

    let code = prompter.input("Enter the provided code", None)?;
    let access_token = api.exchange_code_for_token(code.trim())?;
    if access_token.is_empty() {
        anyhow::bail!("Error fetching access token");
    }

    let default_tags = prompter.input("Enter default tags (comma separated)", Some(""))?;
    let config = Configuration {
        access_token,
        default_tags: default_tags.trim().to_string(),
    };
    store.save(&config)?;
    ui::print_success("Configuration saved.");
    Ok(config)
}

/// Details given on the command line; missing tags fall back to the
/// configured defaults.
pub fn cast_details_from_args(args: &Args, default_tags: &str) -> CastDetails {
    CastDetails {
        name: args.title.clone().unwrap_or_default(),
        description: args.description.clone().unwrap_or_default(),
        tags: split_tags(args.tags.as_deref().unwrap_or(default_tags)),
    }
}

impl RunContext {
    pub fn upload(&self, prompter: &mut dyn Prompter) -> Result<RunOutcome> {
        let file = self.args.file.as_deref().ok_or_else(|| {
            anyhow!("You must pass a file to upload, use --file or see --help.\n Exiting.")
        })?;
        let tracklist = self.args.tracklist.as_deref().and_then(load_tracklist);

        let details = if self.args.has_cast_details() {
            cast_details_from_args(&self.args, &self.config.default_tags)
        } else {
            ui::prompt_cast_details(prompter, &self.config.default_tags)?
        };
        let premium = if self.user.is_pro {
            ui::prompt_premium_options(prompter)?
        } else {
            PremiumOptions::default()
        };

        let progress = ui::upload_progress()?;
        let body = build_upload_body(
            &details,
            tracklist.as_deref().unwrap_or_default(),
            &self.user,
            &premium,
            file,
            self.args.cover.as_deref(),
            &progress,
        )?;

        println!("\n");
        let response = self
            .api
            .upload(&self.config.access_token, body, &progress)?;

        let outcome = response.reconcile();
        let uploaded = report_outcome(
            &outcome,
            tracklist.as_deref(),
            &mut std::io::stdout().lock(),
            &mut std::io::stderr().lock(),
        )?;
        Ok(if uploaded {
            RunOutcome::Uploaded
        } else {
            RunOutcome::Failed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(RunOutcome::Done.exit_code(), 0);
        assert_eq!(RunOutcome::Uploaded.exit_code(), 0);
        assert_eq!(RunOutcome::Failed.exit_code(), 2);
        assert_eq!(FATAL_EXIT_CODE, 2);
    }

    #[test]
    fn command_line_details_fall_back_to_default_tags() {
        let args = Args {
            title: Some("Show".into()),
            ..Default::default()
        };
        assert_eq!(
            cast_details_from_args(&args, "house, techno"),
            CastDetails {
                name: "Show".into(),
                description: "".into(),
                tags: vec!["house".into(), "techno".into()],
            }
        );

        let args = Args {
            tags: Some("dnb".into()),
            ..Default::default()
        };
        assert_eq!(cast_details_from_args(&args, "house").tags, vec!["dnb"]);
    }
}

// UI layer: terminal prompts (through `dialoguer`), colored messages and
// the upload progress bar. Prompts go through the `Prompter` trait so the
// interactive flows can be driven by a script in tests.

use crate::publish_date::prompt_publish_date;
use crate::upload::{split_tags, CastDetails, PremiumOptions};
use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};

/// Source of interactive answers.
pub trait Prompter {
    /// Ask for a line of text. `default` is returned for empty input.
    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String>;

    /// Ask a yes/no question.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;

    /// Tell the user an answer was not accepted.
    fn warn(&mut self, message: &str) {
        print_error(message);
    }
}

/// Prompts on the controlling terminal.
#[derive(Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::new();
        input.with_prompt(prompt).allow_empty(true);
        if let Some(d) = default {
            input.default(d.to_string());
        }
        Ok(input.interact_text()?)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Ok(Confirm::new().with_prompt(prompt).interact()?)
    }
}

pub fn print_error(message: &str) {
    eprintln!("{}", message.red().bold());
}

pub fn print_success(message: &str) {
    println!("{}", message.green());
}

pub fn print_welcome() {
    print_success(&format!(
        "Mixcloud CLI Uploader v{}\n",
        env!("CARGO_PKG_VERSION")
    ));
}

pub fn print_about() {
    println!("Build Number: {}", env!("CARGO_PKG_VERSION"));
    println!("Created by: Greg Tangey (http://ignite.digitalignition.net/)");
    println!("Website: http://www.rhythmandpoetry.net/");
}

/// Ask for name, description and tags. Empty tag input falls back to
/// `default_tags`.
pub fn prompt_cast_details<P: Prompter + ?Sized>(
    prompter: &mut P,
    default_tags: &str,
) -> Result<CastDetails> {
    let name = prompter.input("Enter a name for the cloudcast", None)?;
    let description = prompter.input("Enter a description", None)?;
    let tags = prompter.input("Enter tags (comma separated)", Some(default_tags))?;
    let tags = if tags.trim().is_empty() {
        default_tags
    } else {
        tags.as_str()
    };
    Ok(CastDetails {
        name: name.trim().to_string(),
        description: description.trim().to_string(),
        tags: split_tags(tags),
    })
}

/// Ask for the pro-only publishing attributes.
pub fn prompt_premium_options<P: Prompter + ?Sized>(prompter: &mut P) -> Result<PremiumOptions> {
    print_success("\nSetting pro user attributes...");
    let disable_comments = prompter.confirm("Disable comments?")?;
    let hide_stats = prompter.confirm("Hide statistics?")?;
    let unlisted = prompter.confirm("Set to unlisted?")?;
    let publish_date = if prompter.confirm("Set publish date?")? {
        Some(prompt_publish_date(prompter, Local::now)?)
    } else {
        None
    };
    Ok(PremiumOptions {
        publish_date,
        disable_comments,
        hide_stats,
        unlisted,
    })
}

/// Byte progress bar for the upload; the length is set once the files are
/// attached to the form.
pub fn upload_progress() -> Result<ProgressBar> {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{bar:40.green/red}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
        )?
        .progress_chars("=>-"),
    );
    Ok(bar)
}

/// Replays canned answers; records warnings instead of printing them.
#[cfg(test)]
pub struct ScriptedPrompter {
    inputs: std::collections::VecDeque<String>,
    confirms: std::collections::VecDeque<bool>,
    pub warnings: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new(inputs: &[&str], confirms: &[bool]) -> Self {
        ScriptedPrompter {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            confirms: confirms.iter().copied().collect(),
            warnings: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn input(&mut self, _prompt: &str, default: Option<&str>) -> Result<String> {
        let answer = self
            .inputs
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted input left"))?;
        match default {
            Some(d) if answer.is_empty() => Ok(d.to_string()),
            _ => Ok(answer),
        }
    }

    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        self.confirms
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted confirmation left"))
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }
}

// Entrypoint for the uploader.
// - Keeps `main` small: parse flags, run, translate the outcome into the
//   process exit code (0 on success, 2 on any failure).

use clap::Parser;
use mixcloud_uploader::app::{self, FATAL_EXIT_CODE};
use mixcloud_uploader::{cli::Args, ui};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let code = match app::run(args) {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            log::debug!("{:?}", e);
            ui::print_error(&format!("{:#}", e));
            FATAL_EXIT_CODE
        }
    };
    std::process::exit(code);
}

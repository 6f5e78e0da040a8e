//! formdrop is a Command Line Interface (CLI) for the contact form's Supabase
//! backend.
//!
//! It saves contact-form submissions, lists what has been stored, and exports
//! every submission to a JSON file for archiving or import elsewhere.
//!
//! # Usage
//!
//! View CLI help with `formdrop help` or `formdrop help <subcommand>`.
//!
//! ## Configuration
//!
//! formdrop needs the project URL and its anon key. Either:
//!
//! - Set `SUPABASE_URL` and `SUPABASE_ANON_KEY` in the environment
//! - Place them in `~/.config/formdrop/formdrop.toml`
//! - Use the `--config path/to/formdrop.toml` flag
//!
//! ```toml
//! url = "https://abcdefghijkl.supabase.co"
//! anon_key = "eyJhbGciOi..."
//!
//! # Optional. Needed to list or export when row-level security only lets
//! # signed-in users read submissions.
//! [auth]
//! email = "admin@example.com"
//! password = "..."
//! ```
//!
//! Environment variables override the file; nested keys use a double
//! underscore, e.g. `SUPABASE_AUTH__PASSWORD`. Whitespace around the URL and
//! key is ignored, as are quotes around the key.
//!
//! formdrop refuses to run any command other than `config` if the URL or key
//! is missing.
//!
//! ## Commands
//!
//! ```formdrop submit [--json FILE] [--name ..] [--company ..] [--email ..] [--project-type ..] [--description ..]```
//!
//! Saves one submission and prints it, including the `created_at` timestamp
//! it was stamped with. Name, company, email, project type, and description
//! are required; phone, budget, timeline, and source are optional.
//!
//! ```formdrop ls```
//!
//! Lists all submissions, newest first.
//!
//! ```formdrop export [--dir DIR]```
//!
//! Writes all submissions to `DIR/form_submissions_YYYY-MM-DD.json` as a
//! pretty-printed JSON array. If there is nothing to export, or the export
//! fails, a message is printed and no file is written.
//!
//! ```formdrop config```
//!
//! Echoes current config (with any overrides applied and secrets redacted)
//! and exits.
//!
//! # Troubleshooting
//!
//! | Error                                                   | Resolution                                                                                   |
//! |-                                                        |-                                                                                             |
//! | Missing Supabase configuration: url                     | Set `SUPABASE_URL` or `url` in the config file.                                              |
//! | Permission denied. Please sign in to view submissions.  | Add an `[auth]` section with credentials of a user allowed to read `contact_submissions`.    |
//! | This submission already exists.                         | An identical submission was already saved.                                                   |

#[cfg(not(debug_assertions))]
use human_panic::setup_panic;

pub mod app_config;
pub mod backend;
mod cli;

use anyhow::Result;

#[doc(hidden)]
/// Main entrypoint
pub async fn run() -> Result<()> {
    // Human Panic. Only enabled when *not* debugging.
    //
    // Example of what panic message looks like:
    // https://docs.rs/human-panic/1.0.3/human_panic/
    #[cfg(not(debug_assertions))]
    {
        setup_panic!();
    }

    // Better Panic. Only enabled *when* debugging.
    #[cfg(debug_assertions)]
    {
        better_panic::Settings::debug()
            .most_recent_first(false)
            .lineno_suffix(true)
            .verbosity(better_panic::Verbosity::Full)
            .install();
    }

    env_logger::init();

    // Get CLI arguments and flags (one may have provided the config file to use)
    let cli_matches = cli::cli_config()?;
    let settings = app_config::load(cli_matches.value_of("config"))?;

    // Match against CLI subcommands, which delegate to functions
    cli::cli_match(settings, cli_matches).await
}

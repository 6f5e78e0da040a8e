// Copyright (c) 2021 Tangram Robotics Inc. - All Rights Reserved
// Unauthorized copying of this file, via any medium is strictly prohibited
// Proprietary and confidential
// ----------------------------

use std::path::Path;

use anyhow::Result;
use clap::{crate_authors, crate_description, crate_version};
use clap::{Arg, ArgMatches, Command};

use crate::app_config::AppConfig;
use crate::backend::api::connection::BackendConnection;
use crate::backend::commands;
use crate::backend::gateway::Gateway;
use crate::backend::models::{Budget, SubmissionInput};
use crate::backend::notify::ConsoleNotifier;

/// Fields of `submit` that can be given as flags instead of `--json`.
const SUBMISSION_FIELDS: [&str; 9] = [
    "name",
    "company",
    "email",
    "phone",
    "project-type",
    "description",
    "budget",
    "timeline",
    "source",
];

/// Match commands
pub async fn cli_match(config: config::Config, cli_matches: ArgMatches) -> Result<()> {
    // Handle config subcommand first, because it doesn't need any valid configuration, and is helpful for debugging bad config!
    if let Some(("config", _config_matches)) = cli_matches.subcommand() {
        commands::print_config(config)?;
        return Ok(());
    }

    // Every other command talks to Supabase; refuse to start without a usable connection
    let app_config: AppConfig = config.try_into()?;
    let connection = BackendConnection::install(BackendConnection::from_config(&app_config)?)?;
    if let Some(auth) = &app_config.auth {
        connection
            .sign_in_with_password(&auth.email, &auth.password)
            .await?;
    }
    let gateway = Gateway::global()?;

    match cli_matches.subcommand() {
        Some(("submit", submit_matches)) => {
            let input = submission_input(submit_matches)?;
            let submission = gateway.save(input).await?;
            println!("{}", serde_json::to_string_pretty(&submission)?);
        }
        Some(("ls", _ls_matches)) => {
            for submission in gateway.fetch_all().await?.iter() {
                println!("{}", commands::format_submission_row(submission));
            }
        }
        Some(("export", export_matches)) => {
            // Safe to unwrap because argument has a default
            let dir = export_matches.value_of("dir").unwrap();
            // The outcome has already been shown to the user
            gateway.export_all(Path::new(dir), &ConsoleNotifier).await;
        }
        _ => {
            // Arguments are required by default (in Clap).
            // This section should never execute.
            unreachable!("No matching subcommand!");
        }
    }
    if app_config.auth.is_some() {
        connection.sign_out().await;
    }
    Ok(())
}

fn submission_input(matches: &ArgMatches) -> Result<SubmissionInput> {
    if let Some(path) = matches.value_of("json") {
        return commands::read_submission_input(Path::new(path));
    }
    let value = |name: &str| matches.value_of(name).map(str::to_owned);
    Ok(SubmissionInput {
        name: value("name"),
        company: value("company"),
        email: value("email"),
        phone: value("phone"),
        project_type: value("project-type"),
        description: value("description"),
        budget: value("budget").map(Budget::Text),
        timeline: value("timeline"),
        source: value("source"),
    })
}

/// Configure Clap
/// This function will configure clap and match arguments
pub fn cli_config() -> Result<ArgMatches> {
    let mut submit = Command::new("submit")
        .about("Save one contact-form submission")
        .arg(
            Arg::new("json")
                .long("json")
                .value_name("FILE")
                .help("Read the submission from a JSON file")
                .takes_value(true)
                .conflicts_with_all(&SUBMISSION_FIELDS),
        );
    for field in SUBMISSION_FIELDS.iter() {
        submit = submit.arg(Arg::new(*field).long(*field).takes_value(true));
    }

    let cli_app = Command::new("formdrop")
        .arg_required_else_help(true)
        .version(crate_version!())
        .about(crate_description!())
        .author(crate_authors!("\n"))
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Set a custom config file")
                .takes_value(true),
        )
        .subcommand(submit)
        .subcommand(Command::new("ls").about("List submissions, newest first"))
        .subcommand(
            Command::new("export")
                .about("Export all submissions to a dated JSON file")
                .arg(
                    Arg::new("dir")
                        .long("dir")
                        .value_name("DIR")
                        .help("Directory to write the export to")
                        .default_value(".")
                        .takes_value(true),
                ),
        )
        .subcommand(Command::new("config").about("Show Configuration"));

    // Get matches
    let cli_matches = cli_app.get_matches();

    Ok(cli_matches)
}

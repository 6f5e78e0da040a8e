// Copyright (c) 2021 Tangram Robotics Inc. - All Rights Reserved
// Unauthorized copying of this file, via any medium is strictly prohibited
// Proprietary and confidential
// ----------------------------

use assert_cmd::prelude::*;
use httpmock::{
    Method::{GET, POST},
    MockServer,
};
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use std::process::Command;

/// The binary with no config file and no Supabase environment, unless a test
/// adds them back.
fn formdrop(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("formdrop").expect("Calling binary failed");
    cmd.env("HOME", home)
        .env_remove("SUPABASE_URL")
        .env_remove("SUPABASE_ANON_KEY")
        .env_remove("SUPABASE_AUTH__EMAIL")
        .env_remove("SUPABASE_AUTH__PASSWORD");
    cmd
}

#[test]
fn test_cli() {
    let home = tempfile::tempdir().unwrap();
    formdrop(home.path()).assert().failure();
}

#[test]
fn test_config_runs_without_configuration() {
    let home = tempfile::tempdir().unwrap();
    formdrop(home.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("url = \"\""));
}

#[test]
fn test_config_redacts_key() {
    let home = tempfile::tempdir().unwrap();
    formdrop(home.path())
        .env("SUPABASE_URL", "https://abc.supabase.co")
        .env("SUPABASE_ANON_KEY", "SECRET-KEY")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("url = \"https://abc.supabase.co\""))
        .stdout(predicate::str::contains("SECRET-KEY").not());
}

#[test]
fn test_missing_configuration_aborts() {
    let home = tempfile::tempdir().unwrap();
    formdrop(home.path())
        .env("SUPABASE_ANON_KEY", "KEY")
        .arg("ls")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing Supabase configuration: url"));
}

#[test]
fn test_submit() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .header("apikey", "TEST-KEY")
            .path("/rest/v1/contact_submissions")
            .body_contains(r#""name":"Ana""#)
            .body_contains(r#""project_type":"web""#);
        then.status(201);
    });

    formdrop(home.path())
        .env("SUPABASE_URL", server.base_url())
        .env("SUPABASE_ANON_KEY", "\"TEST-KEY\"")
        .args(&[
            "submit",
            "--name",
            " Ana ",
            "--company",
            "Acme",
            "--email",
            "a@b.com",
            "--project-type",
            "web",
            "--description",
            "desc",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Ana\""))
        .stdout(predicate::str::contains("\"phone\": null"));

    mock.assert();
}

#[test]
fn test_submit_any_project_type() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/rest/v1/contact_submissions")
            .body_contains(r#""project_type":"saas""#);
        then.status(201);
    });

    formdrop(home.path())
        .env("SUPABASE_URL", server.base_url())
        .env("SUPABASE_ANON_KEY", "TEST-KEY")
        .args(&[
            "submit",
            "--name",
            "Ana",
            "--company",
            "Acme",
            "--email",
            "a@b.com",
            "--project-type",
            "saas",
            "--description",
            "desc",
        ])
        .assert()
        .success();

    mock.assert();
}

#[test]
fn test_submit_missing_field() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start();

    formdrop(home.path())
        .env("SUPABASE_URL", server.base_url())
        .env("SUPABASE_ANON_KEY", "TEST-KEY")
        .args(&["submit", "--name", "Ana", "--company", "Acme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required field: email"));
}

#[test]
fn test_ls() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .query_param("order", "created_at.desc")
            .path("/rest/v1/contact_submissions");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!([{
                "name": "Ana", "company": "Acme", "email": "a@b.com",
                "phone": null, "project_type": "web", "description": "desc",
                "budget": null, "timeline": null, "source": null,
                "created_at": "2024-05-06T08:00:00+00:00",
            }]));
    });

    formdrop(home.path())
        .env("SUPABASE_URL", server.base_url())
        .env("SUPABASE_ANON_KEY", "TEST-KEY")
        .arg("ls")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "2024-05-06T08:00:00+00:00  Ana  Acme  a@b.com  web",
        ));

    mock.assert();
}

#[test]
fn test_export_nothing() {
    let home = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/rest/v1/contact_submissions");
        then.status(200)
            .header("Content-Type", "application/json")
            .body("[]");
    });

    formdrop(home.path())
        .env("SUPABASE_URL", server.base_url())
        .env("SUPABASE_ANON_KEY", "TEST-KEY")
        .args(&["export", "--dir"])
        .arg(out.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("No form submissions to export"));

    mock.assert();
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

//! Orchestrator guard behavior against fixture skeletons.

use std::collections::BTreeMap;
use std::fs;

use serde_json::Value;
use tempfile::TempDir;

use groundwork::context::RunContext;
use groundwork::prompt::ScriptedPrompter;
use groundwork::setup::{self, SetupOptions};

fn skeleton(dir: &TempDir) -> RunContext {
    let root = dir.path();
    fs::write(
        root.join("Gemfile"),
        "source 'https://rubygems.org'\n# See https://guides.rubygems.org\ngem 'rails'\ngem 'sass-rails', '~> 5.0'\n",
    )
    .unwrap();
    fs::create_dir_all(root.join("config/environments")).unwrap();
    fs::create_dir_all(root.join("config/initializers")).unwrap();
    fs::write(
        root.join("config/environments/development.rb"),
        "Rails.application.configure do\nend\n",
    )
    .unwrap();
    RunContext::new(root.to_str().unwrap()).unwrap()
}

fn scripted(pairs: &[(&str, Value)]) -> ScriptedPrompter {
    let answers: BTreeMap<String, Value> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    ScriptedPrompter::new(answers)
}

#[test]
fn refuses_target_without_manifest() {
    let dir = TempDir::new().unwrap();
    let ctx = RunContext::new(dir.path().to_str().unwrap()).unwrap();
    let prompter = scripted(&[]);

    let err = setup::run(&ctx, &prompter, &SetupOptions::default()).unwrap_err();

    assert_eq!(err.code.as_str(), "setup.manifest_missing");
}

#[test]
fn refuses_second_run_without_force() {
    let dir = TempDir::new().unwrap();
    let ctx = skeleton(&dir);
    fs::write(ctx.stamp_path(), "{}").unwrap();
    let prompter = scripted(&[]);

    let err = setup::run(&ctx, &prompter, &SetupOptions::default()).unwrap_err();

    assert_eq!(err.code.as_str(), "setup.already_configured");
    assert!(!err.hints.is_empty());
}

#[test]
fn missing_scripted_answer_stops_the_run() {
    let dir = TempDir::new().unwrap();
    let ctx = skeleton(&dir);
    let prompter = scripted(&[]);

    let err = setup::run(&ctx, &prompter, &SetupOptions::default()).unwrap_err();

    assert_eq!(err.code.as_str(), "prompt.answer_missing");
}

#[test]
fn invalid_scripted_answer_stops_the_run() {
    let dir = TempDir::new().unwrap();
    let ctx = skeleton(&dir);
    let prompter = scripted(&[("database", Value::String("oracle".to_string()))]);

    let err = setup::run(&ctx, &prompter, &SetupOptions::default()).unwrap_err();

    assert_eq!(err.code.as_str(), "prompt.answer_invalid");
}

#[test]
fn no_stamp_is_written_on_a_failed_run() {
    let dir = TempDir::new().unwrap();
    let ctx = skeleton(&dir);
    let prompter = scripted(&[]);

    let _ = setup::run(&ctx, &prompter, &SetupOptions::default());

    assert!(!ctx.is_configured());
}

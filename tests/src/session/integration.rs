#![cfg(unix)]
use std::path::PathBuf;

use subconf_common::SchemaRegistry;
use subconf_common::schema::{EXAMPLE_SCHEMA, SHOWCASE_SCHEMA};
use subconf_core::session::{self, ProcessLauncher, SessionSummary, SharedSettings};

/// Editor stand-in: `sh -c <script> editor <schema> <payload>`, so the script
/// sees the schema as `$1` and the initial settings as `$2`.
fn shell_editor(script: &str) -> ProcessLauncher {
    ProcessLauncher::new(PathBuf::from("/bin/sh")).with_args(["-c", script, "editor"])
}

fn settings(schema: &str) -> SharedSettings {
    session::shared(SchemaRegistry::builtin().create(schema).unwrap())
}

async fn run_session(settings: &SharedSettings, launcher: &ProcessLauncher) -> SessionSummary {
    let result = session::open_config(settings.clone(), launcher).await;
    assert!(result.is_ok(), "Editor failed to launch: {:?}", result.err());
    result.unwrap().wait().await.unwrap()
}

#[tokio::test]
async fn child_updates_reach_host_settings() {
    let shared: SharedSettings = settings(EXAMPLE_SCHEMA);
    let launcher = shell_editor(r#"printf '%s\n' '{"example1":true,"example2":"from child"}' '{"example3":42}'"#);

    let summary: SessionSummary = run_session(&shared, &launcher).await;

    assert_eq!(summary.updates_applied, 2);
    assert!(summary.exited_cleanly());
    assert!(!summary.aborted());

    let guard = shared.read().unwrap();
    assert!(guard.get::<bool>("example1").unwrap());
    assert_eq!(guard.get::<String>("example2").unwrap(), "from child");
    assert_eq!(guard.get::<i32>("example3").unwrap(), 42);
}

#[tokio::test]
async fn child_receives_schema_and_current_settings() {
    let shared: SharedSettings = settings(EXAMPLE_SCHEMA);
    shared.write().unwrap().set("example2", "seed").unwrap();
    // echo the payload back with one field changed only if it arrived intact
    let launcher = shell_editor(
        r#"[ "$1" = example ] && case "$2" in *'"example2":"seed"'*) printf '%s\n' '{"example3":7}' ;; esac"#,
    );

    let summary: SessionSummary = run_session(&shared, &launcher).await;

    assert_eq!(summary.updates_applied, 1, "Child did not see the expected arguments");
    assert_eq!(shared.read().unwrap().get::<i32>("example3").unwrap(), 7);
}

#[tokio::test]
async fn discarded_editor_is_reported_as_aborted() {
    let shared: SharedSettings = settings(EXAMPLE_SCHEMA);
    let launcher = shell_editor("exit 130");

    let summary: SessionSummary = run_session(&shared, &launcher).await;

    assert_eq!(summary.updates_applied, 0);
    assert!(summary.aborted());
    assert!(!summary.exited_cleanly());
}

#[tokio::test]
async fn invalid_update_is_skipped_and_session_continues() {
    let shared: SharedSettings = settings(SHOWCASE_SCHEMA);
    let launcher = shell_editor(
        r#"printf '%s\n' '{"retries":99}' 'garbage' '{"mode":"fast","tags":["x"]}'"#,
    );

    let summary: SessionSummary = run_session(&shared, &launcher).await;

    assert_eq!(summary.updates_applied, 1);
    assert_eq!(summary.updates_rejected, 2);

    let guard = shared.read().unwrap();
    assert_eq!(guard.get::<i32>("retries").unwrap(), 3);
    assert_eq!(guard.get::<String>("mode").unwrap(), "fast");
    assert_eq!(guard.list_len("tags").unwrap(), 1);
}

#[tokio::test]
async fn failing_editor_still_keeps_applied_updates() {
    let shared: SharedSettings = settings(EXAMPLE_SCHEMA);
    let launcher = shell_editor(r#"printf '%s\n' '{"example4":2.5}'; exit 3"#);

    let summary: SessionSummary = run_session(&shared, &launcher).await;

    assert!(!summary.exited_cleanly());
    assert!(!summary.aborted());
    assert_eq!(shared.read().unwrap().get::<f64>("example4").unwrap(), 2.5);
}

#[tokio::test]
async fn non_utf8_line_does_not_end_session() {
    let shared: SharedSettings = settings(EXAMPLE_SCHEMA);
    let launcher = shell_editor(r#"printf '\377\376\n{"example3":5}\n'"#);

    let summary: SessionSummary = run_session(&shared, &launcher).await;

    assert_eq!(summary.updates_rejected, 1);
    assert_eq!(summary.updates_applied, 1, "Update after the bad line was dropped");
    assert!(summary.exited_cleanly());
    assert_eq!(shared.read().unwrap().get::<i32>("example3").unwrap(), 5);
}

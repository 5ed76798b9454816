//! Contract tests: observable guarantees of the session lifecycle.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use shellmux::{new_sink, sink_lines, SessionConfig, ShellSession, ShellStatus, SpawnSpec};

#[test]
fn open_yields_a_live_session() {
    let session = ShellSession::open(SpawnSpec::default()).expect("open");
    assert!(session.status().is_live());
    assert!(session.is_alive());
    session.close();
}

#[test]
fn status_ordering_is_closed_unknown_nonroot_root() {
    assert!(ShellStatus::Closed < ShellStatus::Unknown);
    assert!(ShellStatus::Unknown < ShellStatus::NonRoot);
    assert!(ShellStatus::NonRoot < ShellStatus::Root);
    assert!(!ShellStatus::Closed.is_live());
    assert!(!ShellStatus::Unknown.is_live());
    assert!(ShellStatus::NonRoot.is_live());
    assert!(ShellStatus::Root.is_live());
    assert!(ShellStatus::Root.is_root());
    assert!(!ShellStatus::NonRoot.is_root());
}

#[test]
fn privilege_matches_the_actual_uid() {
    let session = ShellSession::open(SpawnSpec::default()).expect("open");
    let uid_zero = {
        let out = std::process::Command::new("id")
            .arg("-u")
            .output()
            .expect("id -u");
        String::from_utf8_lossy(&out.stdout).trim() == "0"
    };
    assert_eq!(session.is_root(), uid_zero);
    session.close();
}

#[test]
fn skipping_the_privilege_probe_reports_non_root() {
    let options = SessionConfig {
        probe_root: false,
        ..SessionConfig::default()
    };
    let session = ShellSession::open_with(SpawnSpec::default(), &options).expect("open");
    assert_eq!(session.status(), ShellStatus::NonRoot);
    session.close();
}

#[test]
fn close_is_terminal_and_idempotent() {
    let session = ShellSession::open(SpawnSpec::default()).expect("open");
    session.close();
    assert_eq!(session.status(), ShellStatus::Closed);
    assert!(!session.is_alive());
    session.close();
    assert_eq!(session.status(), ShellStatus::Closed);
}

#[test]
fn close_waits_for_the_batch_in_flight() {
    let session = Arc::new(ShellSession::open(SpawnSpec::default()).expect("open"));
    let output = new_sink();
    let runner = {
        let session = Arc::clone(&session);
        let output = output.clone();
        thread::spawn(move || {
            session.run(&["sleep 0.3", "echo finished"], Some(output), None);
        })
    };
    // Let the batch take the lock, then close from another thread.
    thread::sleep(Duration::from_millis(100));
    session.close();
    runner.join().expect("runner");
    // The batch had the lock before close; its commands completed.
    assert_eq!(sink_lines(&output), vec!["finished"]);
}

#[test]
fn is_alive_during_an_in_flight_batch() {
    let session = Arc::new(ShellSession::open(SpawnSpec::default()).expect("open"));
    let runner = {
        let session = Arc::clone(&session);
        thread::spawn(move || {
            session.run(&["sleep 0.4"], None, None);
        })
    };
    thread::sleep(Duration::from_millis(100));
    // The batch holds the batch lock right now; that alone is proof of life.
    assert!(session.is_alive());
    runner.join().expect("runner");
    session.close();
}

#[test]
fn opened_at_is_recent() {
    let before = chrono::Utc::now();
    let session = ShellSession::open(SpawnSpec::default()).expect("open");
    let opened = session.opened_at();
    assert!(opened >= before);
    assert!(opened <= chrono::Utc::now());
    session.close();
}

#[test]
fn spec_is_retained() {
    let spec = SpawnSpec::new("/bin/sh");
    let session = ShellSession::open(spec).expect("open");
    assert_eq!(session.spec().command_line(), "/bin/sh");
    session.close();
}

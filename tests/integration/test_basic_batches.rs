//! Integration tests: single batches against a real `/bin/sh`.

use shellmux::{new_sink, sink_lines, ShellSession, SpawnSpec};

fn open() -> ShellSession {
    ShellSession::open(SpawnSpec::default()).expect("open /bin/sh")
}

#[test]
fn single_command_output_is_collected() {
    let session = open();
    let output = new_sink();
    session.run(&["echo hello"], Some(output.clone()), None);
    assert_eq!(sink_lines(&output), vec!["hello"]);
    session.close();
}

#[test]
fn multi_command_batch_preserves_order() {
    let session = open();
    let output = new_sink();
    session.run(
        &["echo first", "echo second", "echo third"],
        Some(output.clone()),
        None,
    );
    assert_eq!(sink_lines(&output), vec!["first", "second", "third"]);
    session.close();
}

#[test]
fn stderr_goes_to_the_diagnostic_sink() {
    let session = open();
    let output = new_sink();
    let diagnostic = new_sink();
    session.run(
        &["echo out", "echo err >&2"],
        Some(output.clone()),
        Some(diagnostic.clone()),
    );
    assert_eq!(sink_lines(&output), vec!["out"]);
    assert_eq!(sink_lines(&diagnostic), vec!["err"]);
    session.close();
}

#[test]
fn unwatched_stdout_is_discarded() {
    let session = open();
    let diagnostic = new_sink();
    // The stderr write happens inside a subshell so the appended stdout
    // redirection cannot override it.
    session.run(
        &["echo invisible", "sh -c 'echo seen >&2'"],
        None,
        Some(diagnostic.clone()),
    );
    assert_eq!(sink_lines(&diagnostic), vec!["seen"]);
    session.close();
}

#[test]
fn unwatched_stderr_is_discarded() {
    let session = open();
    let output = new_sink();
    session.run(&["echo seen", "echo invisible >&2"], Some(output.clone()), None);
    assert_eq!(sink_lines(&output), vec!["seen"]);
    session.close();
}

#[test]
fn state_persists_between_batches() {
    let session = open();
    session.run(&["GREETING=persisted"], None, None);
    let output = new_sink();
    session.run(&["echo $GREETING"], Some(output.clone()), None);
    assert_eq!(sink_lines(&output), vec!["persisted"]);
    session.close();
}

#[test]
fn empty_batch_still_completes() {
    let session = open();
    let output = new_sink();
    session.run(&[], Some(output.clone()), None);
    assert!(sink_lines(&output).is_empty());
    assert!(session.is_alive());
    session.close();
}

#[test]
fn sinks_accumulate_across_batches() {
    let session = open();
    let output = new_sink();
    session.run(&["echo one"], Some(output.clone()), None);
    session.run(&["echo two"], Some(output.clone()), None);
    assert_eq!(sink_lines(&output), vec!["one", "two"]);
    session.close();
}

#[test]
fn multi_line_command_output() {
    let session = open();
    let output = new_sink();
    session.run(&["printf 'a\\nb\\nc\\n'"], Some(output.clone()), None);
    assert_eq!(sink_lines(&output), vec!["a", "b", "c"]);
    session.close();
}

#[test]
fn failing_command_does_not_break_the_batch() {
    let session = open();
    let output = new_sink();
    session.run(
        &["false", "echo still here"],
        Some(output.clone()),
        None,
    );
    assert_eq!(sink_lines(&output), vec!["still here"]);
    assert!(session.is_alive());
    session.close();
}

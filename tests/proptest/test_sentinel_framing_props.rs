//! Property-based tests for sentinel framing and output collection.

use std::io::Cursor;

use proptest::prelude::*;

use shellmux::{new_sink, sink_lines, GobblerState, StreamGobbler};

const TOKEN: &str = "9c1f4a7e2b8d43569f0a1c3e5b7d9f21";

fn framed(lines: &[String]) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text.push_str(TOKEN);
    text.push('\n');
    text
}

/// Lines that cannot be confused with framing: no newlines, not the token.
fn arbitrary_line() -> impl Strategy<Value = String> {
    "[ -~]{0,120}".prop_filter("must not equal the sentinel", |s| s != TOKEN)
}

proptest! {
    #[test]
    fn all_lines_before_the_sentinel_are_delivered(
        lines in prop::collection::vec(arbitrary_line(), 0..32)
    ) {
        let gobbler = StreamGobbler::spawn(
            Cursor::new(framed(&lines)),
            TOKEN.to_string(),
            "prop",
        );
        let sink = new_sink();
        gobbler.begin(Some(sink.clone()));
        gobbler.wait_done();
        prop_assert_eq!(gobbler.state(), GobblerState::Done);
        prop_assert_eq!(sink_lines(&sink), lines);
    }

    #[test]
    fn sentinel_never_leaks_into_the_sink(
        lines in prop::collection::vec(arbitrary_line(), 0..16)
    ) {
        let gobbler = StreamGobbler::spawn(
            Cursor::new(framed(&lines)),
            TOKEN.to_string(),
            "prop",
        );
        let sink = new_sink();
        gobbler.begin(Some(sink.clone()));
        gobbler.wait_done();
        prop_assert!(sink_lines(&sink).iter().all(|l| l != TOKEN));
    }

    #[test]
    fn consecutive_batches_stay_separated(
        first in prop::collection::vec(arbitrary_line(), 0..8),
        second in prop::collection::vec(arbitrary_line(), 0..8),
    ) {
        let mut text = framed(&first);
        text.push_str(&framed(&second));
        let gobbler = StreamGobbler::spawn(Cursor::new(text), TOKEN.to_string(), "prop");

        let sink_a = new_sink();
        gobbler.begin(Some(sink_a.clone()));
        gobbler.wait_done();
        let sink_b = new_sink();
        gobbler.begin(Some(sink_b.clone()));
        gobbler.wait_done();

        prop_assert_eq!(sink_lines(&sink_a), first);
        prop_assert_eq!(sink_lines(&sink_b), second);
    }

    #[test]
    fn truncated_streams_terminate_instead_of_hanging(
        lines in prop::collection::vec(arbitrary_line(), 0..16)
    ) {
        // No sentinel at all: EOF must unblock the waiter.
        let mut text = String::new();
        for line in &lines {
            text.push_str(line);
            text.push('\n');
        }
        let gobbler = StreamGobbler::spawn(Cursor::new(text), TOKEN.to_string(), "prop");
        let sink = new_sink();
        gobbler.begin(Some(sink.clone()));
        gobbler.wait_done();
        prop_assert_eq!(gobbler.state(), GobblerState::Terminated);
        prop_assert_eq!(sink_lines(&sink), lines);
    }
}

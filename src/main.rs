//! Command-line front end: open a configured shell session, run the
//! arguments as one batch and print what came back.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use shellmux::{new_sink, sink_lines, ShellSession};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let config = shellmux::init()?;
    let commands: Vec<String> = std::env::args().skip(1).collect();
    let commands = if commands.is_empty() {
        vec![format!("echo shellmux {}", shellmux::VERSION)]
    } else {
        commands
    };

    let session = ShellSession::open_with(config.shell.to_spawn_spec(), &config.session)?;
    eprintln!("{} [{}]", config.shell.program, session.status());

    let output = new_sink();
    let diagnostic = new_sink();
    let refs: Vec<&str> = commands.iter().map(String::as_str).collect();
    session.run(&refs, Some(output.clone()), Some(diagnostic.clone()));

    for line in sink_lines(&output) {
        println!("{}", line);
    }
    for line in sink_lines(&diagnostic) {
        eprintln!("{}", line);
    }
    session.close();
    Ok(())
}

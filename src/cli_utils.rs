/// CLI utilities for consistent output formatting
use std::io::IsTerminal;

/// Prefix for human-readable lines on stderr
///
/// Bright cyan if stderr is a TTY, plain text otherwise.
pub fn datadeps_prefix() -> &'static str {
    prefix(std::io::stderr().is_terminal())
}

fn prefix(color: bool) -> &'static str {
    if color {
        "\x1b[96m[datadeps]\x1b[0m"
    } else {
        "[datadeps]"
    }
}

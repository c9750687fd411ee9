//! Argument construction for the watched child process

use crate::common::config::RunContext;

/// Subcommand under test.
const WATCH_SUBCOMMAND: &str = "watch";

/// Flag selecting the child's interactive line-oriented mode.
const INTERACTIVE_FLAG: &str = "--interactive";

/// Build the full child argv: command prefix, the watch subcommand, then
/// either the scenario args verbatim or the lone interactive flag. In
/// interactive mode the scenario args are withheld from the argv; they are
/// typed as a line of input instead.
pub fn watch_args(ctx: &RunContext, args: &[String]) -> Vec<String> {
    let mut argv = ctx.prefix_args();
    argv.push(WATCH_SUBCOMMAND.to_string());
    if ctx.interactive {
        argv.push(INTERACTIVE_FLAG.to_string());
    } else {
        argv.extend(args.iter().cloned());
    }
    argv
}

/// The interactive command line: the watch subcommand joined with the
/// scenario args by single spaces, terminated by a carriage return.
pub fn interactive_line(args: &[String]) -> String {
    let mut line = WATCH_SUBCOMMAND.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line.push('\r');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn test_context(interactive: bool) -> RunContext {
        RunContext {
            client_bin: PathBuf::from("kvctl"),
            endpoints: vec!["127.0.0.1:2379".to_string()],
            extra_args: Vec::new(),
            dial_timeout: Duration::from_secs(7),
            expect_timeout: Duration::from_secs(10),
            put_timeout: Duration::from_secs(30),
            interactive,
        }
    }

    fn strings(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn scripted_mode_passes_args_verbatim() {
        let ctx = test_context(false);
        let argv = watch_args(&ctx, &strings(&["sample", "--rev", "1"]));
        assert_eq!(
            argv,
            strings(&[
                "kvctl",
                "--endpoints",
                "127.0.0.1:2379",
                "--dial-timeout",
                "7s",
                "watch",
                "sample",
                "--rev",
                "1",
            ])
        );
    }

    #[test]
    fn interactive_mode_withholds_args_from_argv() {
        let ctx = test_context(true);
        let argv = watch_args(&ctx, &strings(&["sample", "--rev", "1"]));
        assert_eq!(argv.last().map(String::as_str), Some("--interactive"));
        assert!(!argv.contains(&"sample".to_string()));
    }

    #[test]
    fn interactive_line_is_space_joined_and_cr_terminated() {
        let line = interactive_line(&strings(&["sample", "--rev", "1"]));
        assert_eq!(line, "watch sample --rev 1\r");
    }

    #[test]
    fn interactive_line_without_args_is_bare_subcommand() {
        assert_eq!(interactive_line(&[]), "watch\r");
    }
}

//! Command line parsing tests for the widget binary.

use crate::{parse_args, Args};
use std::path::PathBuf;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn no_arguments_runs_the_loop_with_default_config() {
    let parsed = parse_args(args(&[])).unwrap();
    assert_eq!(
        parsed,
        Args {
            once: false,
            card: false,
            config_path: PathBuf::from("salat-widget.toml"),
        }
    );
}

#[test]
fn flags_combine_in_any_order() {
    let parsed = parse_args(args(&["--card", "--config", "/etc/widget.toml", "--once"])).unwrap();
    assert!(parsed.once);
    assert!(parsed.card);
    assert_eq!(parsed.config_path, PathBuf::from("/etc/widget.toml"));
}

#[test]
fn config_flag_requires_a_path() {
    let err = parse_args(args(&["--config"])).unwrap_err();
    assert!(err.to_string().contains("--config"), "unexpected error: {err}");
}

#[test]
fn unknown_arguments_are_rejected() {
    let err = parse_args(args(&["--stdout"])).unwrap_err();
    assert!(err.to_string().contains("--stdout"), "unexpected error: {err}");
}

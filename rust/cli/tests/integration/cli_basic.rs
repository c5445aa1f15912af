use crate::helpers::cli_runner::CliRunner;

#[test]
fn help_lists_every_command() {
    let res = CliRunner::new().run(&["--help"]);
    assert_eq!(res.exit_code, 0);
    for c in ["play", "sim", "deal", "cfg"] {
        assert!(res.stdout.contains(c), "help should mention `{c}`:\n{}", res.stdout);
    }
}

#[test]
fn version_flag_succeeds() {
    let res = CliRunner::new().run(&["--version"]);
    assert_eq!(res.exit_code, 0);
    assert!(res.stdout.starts_with("kuhn "));
}

#[test]
fn unknown_command_is_usage_error() {
    let res = CliRunner::new().run(&["replay"]);
    assert_eq!(res.exit_code, 2);
    assert!(res.stderr.contains("Usage: kuhn <command> [options]"));
    assert!(res.stdout.is_empty());
}

#[test]
fn deal_is_reproducible_by_seed() {
    let cli = CliRunner::new();
    let a = cli.run(&["deal", "--seed", "42"]);
    let b = cli.run(&["deal", "--seed", "42"]);
    assert_eq!(a.exit_code, 0, "stderr={}", a.stderr);
    assert_eq!(a.stdout, b.stdout);
    assert!(a.stdout.contains("Seed: 42"));
    assert!(a.stdout.contains("Seat 1: "));
    assert!(a.stdout.contains("Seat 2: "));
}

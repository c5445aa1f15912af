use crate::helpers::cli_runner::CliRunner;

#[test]
fn fold_every_hand() {
    let res = CliRunner::new().run_with_input(
        &["play", "--hands", "3", "--seed", "42"],
        "fold\nfold\nfold\n",
    );
    assert_eq!(res.exit_code, 0, "stderr={}", res.stderr);
    assert!(res.stdout.contains("Hand 3"));
    assert_eq!(res.stdout.matches("You folded. Opponent wins.").count(), 3);
    assert!(res.stdout.contains("Hands played: 3"));
    assert!(res.stdout.contains("Wins: 0  Losses: 3"));
}

#[test]
fn quit_stops_the_session() {
    let res = CliRunner::new().run_with_input(&["play", "--hands", "5", "--seed", "1"], "q\n");
    assert_eq!(res.exit_code, 0);
    assert!(res.stdout.contains("Hand abandoned."));
    assert!(!res.stdout.contains("Hand 2"));
    assert!(res.stdout.contains("Hands played: 0"));
}

#[test]
fn checked_down_hands_reach_showdown_or_fold() {
    // Check, then call any bet. Every hand ends in a showdown or an AI fold.
    let input = "check\ncall\n".repeat(4);
    let res = CliRunner::new().run_with_input(&["play", "--hands", "4", "--seed", "5"], &input);
    assert_eq!(res.exit_code, 0, "stderr={}", res.stderr);
    assert!(res.stdout.contains("Hands played: 4"), "{}", res.stdout);
    assert!(!res.stdout.contains("You folded."));
}

#[test]
fn zero_hands_is_an_error() {
    let res = CliRunner::new().run_with_input(&["play", "--hands", "0"], "");
    assert_eq!(res.exit_code, 2);
    assert!(res.stderr.contains("hands must be >= 1"));
}

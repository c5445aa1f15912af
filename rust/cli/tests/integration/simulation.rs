use crate::helpers::cli_runner::CliRunner;
use crate::helpers::temp_files::TempFileManager;

use kuhn_engine::logger::HandRecord;
use std::fs;

fn seat_line<'a>(stdout: &'a str, seat: u8) -> &'a str {
    let prefix = format!("Seat {seat}: ");
    stdout
        .lines()
        .find(|l| l.starts_with(&prefix))
        .unwrap_or_else(|| panic!("no line for seat {seat} in {stdout}"))
}

fn net(line: &str) -> i64 {
    line.split("net=")
        .nth(1)
        .and_then(|n| n.trim().parse().ok())
        .expect("net value")
}

#[test]
fn reports_wins_and_net_chips() {
    let res = CliRunner::new().run(&["sim", "--hands", "100", "--seed", "42"]);
    assert_eq!(res.exit_code, 0, "stderr={}", res.stderr);
    assert!(res.stdout.contains("Hands: 100"));
    let first = seat_line(&res.stdout, 1);
    let second = seat_line(&res.stdout, 2);
    assert_eq!(net(first) + net(second), 0);
}

#[test]
fn same_seed_same_report() {
    let cli = CliRunner::new();
    let a = cli.run(&["sim", "--hands", "30", "--seed", "9"]);
    let b = cli.run(&["sim", "--hands", "30", "--seed", "9"]);
    assert_eq!(a.stdout, b.stdout);
}

#[test]
fn output_file_holds_hand_records() {
    let tfm = TempFileManager::new();
    let path = tfm.path("runs/hands.jsonl");
    let path_str = path.to_string_lossy().into_owned();

    let res = CliRunner::new().run(&["sim", "--hands", "10", "--seed", "3", "--output", &path_str]);
    assert_eq!(res.exit_code, 0, "stderr={}", res.stderr);

    let contents = fs::read_to_string(&path).expect("records file");
    let records: Vec<HandRecord> = contents
        .lines()
        .map(|l| serde_json::from_str(l).expect("valid record"))
        .collect();
    assert_eq!(records.len(), 10);
    for rec in &records {
        assert_ne!(rec.cards[0], rec.cards[1]);
        assert!(!rec.actions.is_empty());
        assert!(rec.ts.is_some());
        assert!(rec.pot >= 2);
    }
}

#[test]
fn zero_hands_is_an_error() {
    let res = CliRunner::new().run(&["sim", "--hands", "0"]);
    assert_eq!(res.exit_code, 2);
    assert!(res.stderr.contains("hands must be >= 1"));
}

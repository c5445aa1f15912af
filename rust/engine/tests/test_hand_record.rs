use std::fs;

use kuhn_engine::cards::Card;
use kuhn_engine::game::{GameMode, GameState, WinMethod};
use kuhn_engine::logger::{ActionRecord, HandLogger, HandRecord, format_hand_id};
use kuhn_engine::player::{Action, Seat, Tally};
use kuhn_engine::rules::TableRules;

fn finished() -> GameState {
    let mut s = GameState::new(
        [Card::Queen, Card::King],
        TableRules::default(),
        GameMode::Ai,
        [Tally::default(); 2],
    )
    .unwrap();
    s.apply(Seat::First, Action::Bet).unwrap();
    s.apply(Seat::Second, Action::Call).unwrap();
    s.resolve_showdown().unwrap();
    s
}

#[test]
fn id_format_is_date_and_sequence() {
    assert_eq!(format_hand_id("20251231", 42), "20251231-000042");
    let mut logger = HandLogger::detached("20250101");
    assert_eq!(logger.next_id(), "20250101-000001");
    assert_eq!(logger.next_id(), "20250101-000002");
}

#[test]
fn record_captures_finished_hand() {
    let rec = HandRecord::from_state("h1".into(), Some(7), &finished()).unwrap();
    assert_eq!(rec.cards, [Card::Queen, Card::King]);
    assert_eq!(rec.winner, Seat::Second);
    assert_eq!(rec.by, WinMethod::Showdown);
    assert_eq!(rec.pot, 4);
    assert_eq!(
        rec.actions,
        vec![
            ActionRecord {
                seat: Seat::First,
                action: Action::Bet
            },
            ActionRecord {
                seat: Seat::Second,
                action: Action::Call
            },
        ]
    );
}

#[test]
fn record_is_absent_for_unfinished_hand() {
    let s = GameState::new(
        [Card::Queen, Card::King],
        TableRules::default(),
        GameMode::Ai,
        [Tally::default(); 2],
    )
    .unwrap();
    assert!(HandRecord::from_state("h".into(), None, &s).is_none());
}

#[test]
fn logger_writes_jsonl_with_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("hands.jsonl");
    let mut logger = HandLogger::create(&path).unwrap();
    for _ in 0..2 {
        let id = logger.next_id();
        let rec = HandRecord::from_state(id, Some(1), &finished()).unwrap();
        logger.write(&rec).unwrap();
    }
    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    let rec: HandRecord = serde_json::from_str(lines[1]).unwrap();
    assert!(rec.ts.is_some());
    assert!(rec.hand_id.ends_with("-000002"));
    let raw: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(raw["cards"], serde_json::json!(["Q", "K"]));
    assert_eq!(raw["winner"], "second");
    assert_eq!(raw["by"], "showdown");
}

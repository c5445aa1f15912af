use kuhn_engine::cards::Card;
use kuhn_engine::errors::GameError;
use kuhn_engine::game::{GameMode, GameState, Stage, Transition, WinMethod};
use kuhn_engine::player::{Action, Seat, Tally};
use kuhn_engine::rules::TableRules;

fn deal(cards: [Card; 2]) -> GameState {
    GameState::new(cards, TableRules::default(), GameMode::Ai, [Tally::default(); 2]).unwrap()
}

#[test]
fn ace_vs_king_bet_call_pays_full_pot_to_ace() {
    let mut s = deal([Card::Ace, Card::King]);
    assert_eq!(
        s.apply(Seat::First, Action::Bet).unwrap(),
        Transition::Continue { next: Seat::Second }
    );
    assert_eq!(s.pot(), 3);
    assert_eq!(s.chips(Seat::First), 0);

    assert_eq!(s.apply(Seat::Second, Action::Call).unwrap(), Transition::Showdown);
    assert_eq!(s.stage(), Stage::Showdown);
    // initial pot + 2 x bet
    assert_eq!(s.pot(), 2 + 2 * 1);
    assert!(s.is_active());

    assert_eq!(s.resolve_showdown().unwrap(), Seat::First);
    assert_eq!(s.chips(Seat::First), 4);
    assert_eq!(s.chips(Seat::Second), 0);
    assert_eq!(s.pot(), 0);
    assert!(s.is_revealed());
    assert!(!s.is_active());
    assert_eq!(s.stage(), Stage::Complete);
    assert_eq!(s.tally(Seat::First), Tally { wins: 1, losses: 0 });
    assert_eq!(s.tally(Seat::Second), Tally { wins: 0, losses: 1 });
    let outcome = s.outcome().unwrap();
    assert_eq!(outcome.by, WinMethod::Showdown);
    assert_eq!(outcome.pot, 4);
}

#[test]
fn check_check_reaches_showdown_without_chip_movement() {
    let mut s = deal([Card::Queen, Card::King]);
    assert_eq!(
        s.apply(Seat::First, Action::Check).unwrap(),
        Transition::Continue { next: Seat::Second }
    );
    assert_eq!(s.apply(Seat::Second, Action::Check).unwrap(), Transition::Showdown);
    assert_eq!(s.pot(), 2);
    assert_eq!(s.chips(Seat::First), 1);
    assert_eq!(s.chips(Seat::Second), 1);

    assert_eq!(s.resolve_showdown().unwrap(), Seat::Second);
    assert_eq!(s.chips(Seat::Second), 3);
    assert_eq!(s.pot(), 0);
}

#[test]
fn immediate_fold_pays_opponent_and_keeps_cards_hidden() {
    let mut s = deal([Card::Ace, Card::Queen]);
    assert_eq!(
        s.apply(Seat::First, Action::Fold).unwrap(),
        Transition::Folded { winner: Seat::Second }
    );
    assert_eq!(s.chips(Seat::Second), 3);
    assert_eq!(s.chips(Seat::First), 1);
    assert_eq!(s.pot(), 0);
    assert!(!s.is_revealed());
    assert!(!s.is_active());
    assert_eq!(s.outcome().unwrap().by, WinMethod::Fold);
    assert_eq!(s.tally(Seat::Second).wins, 1);
    assert_eq!(s.tally(Seat::First).losses, 1);
}

#[test]
fn fold_to_bet_transfers_entire_pot() {
    let mut s = deal([Card::Queen, Card::Ace]);
    s.apply(Seat::First, Action::Bet).unwrap();
    let pot_before = s.pot();
    s.apply(Seat::Second, Action::Fold).unwrap();
    assert_eq!(s.chips(Seat::First), pot_before);
    assert_eq!(s.pot(), 0);
}

#[test]
fn check_bet_call_reaches_showdown() {
    let mut s = deal([Card::King, Card::Ace]);
    s.apply(Seat::First, Action::Check).unwrap();
    s.apply(Seat::Second, Action::Bet).unwrap();
    assert!(s.facing_bet(Seat::First));
    assert_eq!(s.apply(Seat::First, Action::Call).unwrap(), Transition::Showdown);
    assert_eq!(s.pot(), 4);
    assert_eq!(
        s.history(),
        &[
            (Seat::First, Action::Check),
            (Seat::Second, Action::Bet),
            (Seat::First, Action::Call)
        ]
    );
    assert_eq!(s.last_action(Seat::First), Some(Action::Call));
    assert_eq!(s.last_action(Seat::Second), Some(Action::Bet));
}

#[test]
fn actions_after_hand_end_are_rejected() {
    let mut s = deal([Card::King, Card::Queen]);
    s.apply(Seat::First, Action::Fold).unwrap();
    assert_eq!(s.apply(Seat::Second, Action::Check), Err(GameError::HandNotActive));
}

#[test]
fn actions_at_showdown_are_rejected() {
    let mut s = deal([Card::King, Card::Queen]);
    s.apply(Seat::First, Action::Check).unwrap();
    s.apply(Seat::Second, Action::Check).unwrap();
    assert_eq!(s.apply(Seat::First, Action::Bet), Err(GameError::HandNotActive));
}

#[test]
fn tallies_carry_into_next_hand() {
    let mut s = deal([Card::King, Card::Queen]);
    s.apply(Seat::First, Action::Fold).unwrap();
    let next = GameState::new(
        [Card::Ace, Card::Queen],
        TableRules::default(),
        GameMode::Ai,
        s.tallies(),
    )
    .unwrap();
    assert_eq!(next.tally(Seat::Second).wins, 1);
    assert_eq!(next.pot(), 2);
    assert_eq!(next.chips(Seat::Second), 1);
}

#[test]
fn larger_stakes_scale_pot() {
    let rules = TableRules {
        ante: 2,
        starting_stack: 10,
        bet_size: 3,
    };
    let mut s = GameState::new([Card::Ace, Card::King], rules, GameMode::Online, [Tally::default(); 2])
        .unwrap();
    assert_eq!(s.pot(), 4);
    assert_eq!(s.chips(Seat::First), 8);
    s.apply(Seat::First, Action::Bet).unwrap();
    s.apply(Seat::Second, Action::Call).unwrap();
    assert_eq!(s.pot(), 4 + 2 * 3);
    s.resolve_showdown().unwrap();
    assert_eq!(s.chips(Seat::First), 5 + 10);
}

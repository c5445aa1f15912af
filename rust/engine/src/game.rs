use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::errors::GameError;
use crate::player::{Action, Seat, Tally};
use crate::rules::{add_to_pot, chips_after_bet, validate_action, TableRules, ValidatedAction};

/// Where a hand is in its lifecycle.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Seats are acting
    Betting,
    /// Betting closed, waiting for cards to be compared
    Showdown,
    /// Pot has been paid out
    Complete,
}

/// Whether a hand is played against the AI or between two connected humans.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Ai,
    Online,
}

impl GameMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Ai => "ai",
            GameMode::Online => "online",
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinMethod {
    Fold,
    Showdown,
}

/// How a finished hand was decided.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandOutcome {
    pub winner: Seat,
    pub by: WinMethod,
    /// Chips paid to the winner
    pub pot: u32,
}

/// Result of an accepted action.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Transition {
    /// Betting continues with `next` to act
    Continue { next: Seat },
    /// Betting closed; call [`GameState::resolve_showdown`]
    Showdown,
    /// The acting seat folded and the pot went to `winner`
    Folded { winner: Seat },
}

/// Compares two dealt cards and returns the seat holding the higher one.
///
/// # Errors
///
/// [`GameError::DuplicateCard`] when both cards have the same rank, which a
/// three-card deck can never deal.
pub fn determine_winner(first: Card, second: Card) -> Result<Seat, GameError> {
    match first.cmp(&second) {
        std::cmp::Ordering::Greater => Ok(Seat::First),
        std::cmp::Ordering::Less => Ok(Seat::Second),
        std::cmp::Ordering::Equal => Err(GameError::DuplicateCard(first)),
    }
}

/// Canonical, seat-indexed state of one hand.
///
/// Both seats are described symmetrically; a viewer's perspective is produced by
/// [`crate::view::project`]. Every mutation goes through [`GameState::apply`] or
/// [`GameState::resolve_showdown`], which validate fully before touching any field.
///
/// # Examples
///
/// ```
/// use kuhn_engine::cards::Card;
/// use kuhn_engine::game::{GameMode, GameState, Transition};
/// use kuhn_engine::player::{Action, Seat, Tally};
/// use kuhn_engine::rules::TableRules;
///
/// let mut state = GameState::new(
///     [Card::Ace, Card::King],
///     TableRules::default(),
///     GameMode::Ai,
///     [Tally::default(); 2],
/// )
/// .unwrap();
/// assert_eq!(state.apply(Seat::First, Action::Bet), Ok(Transition::Continue { next: Seat::Second }));
/// assert_eq!(state.apply(Seat::Second, Action::Call), Ok(Transition::Showdown));
/// assert_eq!(state.pot(), 4);
/// assert_eq!(state.resolve_showdown(), Ok(Seat::First));
/// assert_eq!(state.chips(Seat::First), 4);
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    cards: [Card; 2],
    pot: u32,
    chips: [u32; 2],
    bet_size: u32,
    initial_pot: u32,
    to_act: Seat,
    last_action: [Option<Action>; 2],
    history: Vec<(Seat, Action)>,
    stage: Stage,
    active: bool,
    revealed: bool,
    tally: [Tally; 2],
    outcome: Option<HandOutcome>,
    mode: GameMode,
}

impl GameState {
    /// Starts a hand with antes posted. The first seat acts first.
    pub fn new(
        cards: [Card; 2],
        rules: TableRules,
        mode: GameMode,
        tally: [Tally; 2],
    ) -> Result<Self, GameError> {
        rules.validate()?;
        if cards[0] == cards[1] {
            return Err(GameError::DuplicateCard(cards[0]));
        }
        let behind = rules.chips_behind();
        Ok(Self {
            cards,
            pot: rules.initial_pot(),
            chips: [behind, behind],
            bet_size: rules.bet_size,
            initial_pot: rules.initial_pot(),
            to_act: Seat::First,
            last_action: [None, None],
            history: Vec::new(),
            stage: Stage::Betting,
            active: true,
            revealed: false,
            tally,
            outcome: None,
            mode,
        })
    }

    pub fn card(&self, seat: Seat) -> Card {
        self.cards[seat.index()]
    }
    pub fn cards(&self) -> [Card; 2] {
        self.cards
    }
    pub fn pot(&self) -> u32 {
        self.pot
    }
    pub fn initial_pot(&self) -> u32 {
        self.initial_pot
    }
    pub fn chips(&self, seat: Seat) -> u32 {
        self.chips[seat.index()]
    }
    pub fn bet_size(&self) -> u32 {
        self.bet_size
    }
    pub fn to_act(&self) -> Seat {
        self.to_act
    }
    pub fn last_action(&self, seat: Seat) -> Option<Action> {
        self.last_action[seat.index()]
    }
    pub fn history(&self) -> &[(Seat, Action)] {
        &self.history
    }
    pub fn stage(&self) -> Stage {
        self.stage
    }
    pub fn is_active(&self) -> bool {
        self.active
    }
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }
    pub fn tally(&self, seat: Seat) -> Tally {
        self.tally[seat.index()]
    }
    pub fn tallies(&self) -> [Tally; 2] {
        self.tally
    }
    pub fn outcome(&self) -> Option<HandOutcome> {
        self.outcome
    }
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// True when `seat` must answer an outstanding bet.
    pub fn facing_bet(&self, seat: Seat) -> bool {
        matches!(self.history.last(), Some(&(s, Action::Bet)) if s == seat.other())
    }

    /// Actions the seat to act may take right now. Empty once betting is over.
    pub fn legal_actions(&self) -> Vec<Action> {
        if !self.active || self.stage != Stage::Betting {
            return Vec::new();
        }
        let seat = self.to_act;
        let stack = self.chips(seat);
        let facing = self.facing_bet(seat);
        Action::all()
            .into_iter()
            .filter(|a| validate_action(stack, facing, self.bet_size, *a).is_ok())
            .collect()
    }

    /// Applies `action` for `seat`.
    ///
    /// # Errors
    ///
    /// - [`GameError::HandNotActive`] - hand finished or betting already closed
    /// - [`GameError::NotPlayersTurn`] - `seat` does not own the turn
    /// - [`GameError::IllegalAction`] / [`GameError::InsufficientChips`] - see
    ///   [`validate_action`]
    ///
    /// On error the state is unchanged.
    pub fn apply(&mut self, seat: Seat, action: Action) -> Result<Transition, GameError> {
        if !self.active || self.stage != Stage::Betting {
            return Err(GameError::HandNotActive);
        }
        if seat != self.to_act {
            return Err(GameError::NotPlayersTurn {
                expected: self.to_act,
                actual: seat,
            });
        }
        let facing = self.facing_bet(seat);
        let validated = validate_action(self.chips(seat), facing, self.bet_size, action)?;

        match validated {
            ValidatedAction::Fold => {
                self.record(seat, action);
                let winner = seat.other();
                self.settle(winner, WinMethod::Fold);
                Ok(Transition::Folded { winner })
            }
            ValidatedAction::Check => {
                let closes = matches!(self.history.last(), Some(&(s, Action::Check)) if s == seat.other());
                self.record(seat, action);
                if closes {
                    self.stage = Stage::Showdown;
                    Ok(Transition::Showdown)
                } else {
                    self.to_act = seat.other();
                    Ok(Transition::Continue {
                        next: self.to_act,
                    })
                }
            }
            ValidatedAction::Bet(amount) | ValidatedAction::Call(amount) => {
                let chips = chips_after_bet(self.chips(seat), amount)?;
                let pot = add_to_pot(self.pot, i64::from(amount))?;
                self.chips[seat.index()] = chips;
                self.pot = pot;
                self.record(seat, action);
                if action == Action::Call {
                    self.stage = Stage::Showdown;
                    Ok(Transition::Showdown)
                } else {
                    self.to_act = seat.other();
                    Ok(Transition::Continue {
                        next: self.to_act,
                    })
                }
            }
        }
    }

    /// Reveals both cards and pays the pot to the higher card.
    pub fn resolve_showdown(&mut self) -> Result<Seat, GameError> {
        if self.stage != Stage::Showdown {
            return Err(GameError::NotInShowdown);
        }
        let winner = determine_winner(self.cards[0], self.cards[1])?;
        self.revealed = true;
        self.settle(winner, WinMethod::Showdown);
        Ok(winner)
    }

    fn record(&mut self, seat: Seat, action: Action) {
        self.last_action[seat.index()] = Some(action);
        self.history.push((seat, action));
    }

    fn settle(&mut self, winner: Seat, by: WinMethod) {
        let pot = self.pot;
        self.chips[winner.index()] = self.chips[winner.index()].saturating_add(pot);
        self.pot = 0;
        self.tally[winner.index()].record(true);
        self.tally[winner.other().index()].record(false);
        self.outcome = Some(HandOutcome { winner, by, pot });
        self.active = false;
        self.stage = Stage::Complete;
    }
}

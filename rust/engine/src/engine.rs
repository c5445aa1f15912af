use crate::deck::Deck;
use crate::errors::GameError;
use crate::game::{GameMode, GameState};
use crate::player::Tally;
use crate::rules::TableRules;

const DEFAULT_SEED: u64 = 0xA1A2_A3A4;

/// Dealer that starts Kuhn hands from a seeded deck.
///
/// The same seed always produces the same sequence of deals, which the simulator and
/// tests rely on.
///
/// # Examples
///
/// ```
/// use kuhn_engine::engine::Engine;
/// use kuhn_engine::game::GameMode;
/// use kuhn_engine::player::Tally;
/// use kuhn_engine::rules::TableRules;
///
/// let mut engine = Engine::new(Some(7), TableRules::default()).unwrap();
/// let state = engine.deal(GameMode::Ai, [Tally::default(); 2]).unwrap();
/// assert_eq!(state.pot(), 2);
/// assert_ne!(state.cards()[0], state.cards()[1]);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    deck: Deck,
    rules: TableRules,
    seed: u64,
    hands_dealt: u64,
}

impl Engine {
    pub fn new(seed: Option<u64>, rules: TableRules) -> Result<Self, GameError> {
        rules.validate()?;
        let seed = seed.unwrap_or(DEFAULT_SEED);
        Ok(Self {
            deck: Deck::new_with_seed(seed),
            rules,
            seed,
            hands_dealt: 0,
        })
    }

    pub fn rules(&self) -> TableRules {
        self.rules
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn hands_dealt(&self) -> u64 {
        self.hands_dealt
    }

    /// Shuffles the three-card deck and deals one card to each seat. `tally` is
    /// carried over from the previous hand.
    pub fn deal(&mut self, mode: GameMode, tally: [Tally; 2]) -> Result<GameState, GameError> {
        self.deck.shuffle();
        let cards = self
            .deck
            .deal_pair()
            .ok_or_else(|| GameError::InvalidRules("deck ran out of cards".into()))?;
        self.hands_dealt += 1;
        GameState::new(cards, self.rules, mode, tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Seat;

    #[test]
    fn deal_posts_antes_and_first_seat_acts() {
        let mut eng = Engine::new(Some(1), TableRules::default()).expect("engine");
        let state = eng.deal(GameMode::Online, [Tally::default(); 2]).expect("deal");
        assert_eq!(state.pot(), 2);
        assert_eq!(state.chips(Seat::First), 1);
        assert_eq!(state.chips(Seat::Second), 1);
        assert_eq!(state.to_act(), Seat::First);
        assert!(state.is_active());
        assert!(!state.is_revealed());
        assert_eq!(eng.hands_dealt(), 1);
    }

    #[test]
    fn deal_carries_tallies() {
        let mut eng = Engine::new(Some(2), TableRules::default()).expect("engine");
        let tally = [Tally { wins: 3, losses: 1 }, Tally { wins: 1, losses: 3 }];
        let state = eng.deal(GameMode::Ai, tally).expect("deal");
        assert_eq!(state.tallies(), tally);
    }

    #[test]
    fn invalid_rules_are_refused() {
        let rules = TableRules {
            ante: 1,
            starting_stack: 2,
            bet_size: 0,
        };
        assert!(Engine::new(None, rules).is_err());
    }
}

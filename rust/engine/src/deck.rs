use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};

/// The three-card Kuhn deck with its own seeded RNG.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: [Card; 3],
    dealt: usize,
    rng: ChaCha20Rng,
}

impl Deck {
    /// Deck in Q, K, A order. Nothing is shuffled until [`Deck::shuffle`].
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            cards: full_deck(),
            dealt: 0,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Gathers every card back and shuffles.
    pub fn shuffle(&mut self) {
        self.reset();
        self.cards.shuffle(&mut self.rng);
    }

    pub fn deal_card(&mut self) -> Option<Card> {
        let card = self.cards.get(self.dealt).copied()?;
        self.dealt += 1;
        Some(card)
    }

    /// One card for each seat; the third card stays face down.
    pub fn deal_pair(&mut self) -> Option<[Card; 2]> {
        if self.remaining() < 2 {
            return None;
        }
        Some([self.deal_card()?, self.deal_card()?])
    }

    pub fn reset(&mut self) {
        self.cards = full_deck();
        self.dealt = 0;
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.dealt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_leaves_one_card() {
        let mut deck = Deck::new_with_seed(3);
        deck.shuffle();
        let [a, b] = deck.deal_pair().expect("pair");
        assert_ne!(a, b);
        assert_eq!(deck.remaining(), 1);
        assert!(deck.deal_pair().is_none());
        assert_eq!(deck.remaining(), 1);
    }

    #[test]
    fn unshuffled_deck_is_in_rank_order() {
        let mut deck = Deck::new_with_seed(0);
        assert_eq!(deck.deal_pair(), Some([Card::Queen, Card::King]));
        assert_eq!(deck.deal_card(), Some(Card::Ace));
    }
}

//! Rules of play that don't depend on who is deciding: suit following, trick
//! evaluation and scoring.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    cards::{Card, Rank, Suit, SUIT_ORDER},
    Seat, Team,
};

/// Points needed to win the game
pub const WINNING_SCORE: u8 = 10;
pub const TRICKS_PER_HAND: usize = 5;
pub const CARDS_PER_HAND: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedCard {
    pub seat: Seat,
    pub card: Card,
}

impl PlayedCard {
    pub fn new(seat: Seat, card: Card) -> Self {
        Self { seat, card }
    }
}

/// A completed trick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    pub plays: Vec<PlayedCard>,
    pub winner: Seat,
}

impl Trick {
    pub fn lead(&self) -> Option<Card> {
        self.plays.first().map(|p| p.card)
    }
}

/// Gets the suit of a given card. The left bower counts as trump.
pub fn effective_suit(card: Card, trump: Suit) -> Suit {
    if card.is_left_bower(trump) {
        trump
    } else {
        card.suit()
    }
}

pub fn is_trump(card: Card, trump: Suit) -> bool {
    effective_suit(card, trump) == trump
}

/// Rank value of a card for a given trump and lead suit, higher wins
pub fn euchre_rank(card: Card, trump: Suit, lead: Option<Suit>) -> u8 {
    if card.is_right_bower(trump) {
        return 25;
    }
    if card.is_left_bower(trump) {
        return 24;
    }

    let rank = card.rank() as u8;
    if card.suit() == trump {
        // jack is a bower, so the remaining trump ranks close the gap
        let idx = if card.rank() > Rank::Jack { rank - 1 } else { rank };
        return 15 + idx;
    }

    if Some(card.suit()) == lead {
        return 6 + rank;
    }

    rank
}

/// Returns the seat that won the trick
pub fn trick_winner(plays: &[PlayedCard], trump: Suit) -> Option<Seat> {
    let lead = effective_suit(plays.first()?.card, trump);
    plays
        .iter()
        .min_by_key(|p| std::cmp::Reverse(euchre_rank(p.card, trump, Some(lead))))
        .map(|p| p.seat)
}

/// Cards that may be played from `hand`. Must follow the lead suit if possible.
pub fn legal_cards(hand: &[Card], lead: Option<Card>, trump: Suit) -> Vec<Card> {
    let Some(lead) = lead else {
        return hand.to_vec();
    };

    let lead_suit = effective_suit(lead, trump);
    let following = hand
        .iter()
        .copied()
        .filter(|c| effective_suit(*c, trump) == lead_suit)
        .collect_vec();

    if following.is_empty() {
        hand.to_vec()
    } else {
        following
    }
}

/// Sort cards for display: bowers and trump first, then suits in `SUIT_ORDER`,
/// highest rank first within a suit
pub fn sort_hand(hand: &mut [Card], trump: Option<Suit>) {
    let suit_group = |suit: Suit| SUIT_ORDER.iter().position(|s| *s == suit).unwrap_or(4);

    hand.sort_by_key(|c| {
        let group = match trump {
            Some(t) if c.is_right_bower(t) => 0,
            Some(t) if c.is_left_bower(t) => 1,
            Some(t) if c.suit() == t => 2,
            Some(_) => suit_group(c.suit()) + 3,
            None => suit_group(c.suit()),
        };
        (group, std::cmp::Reverse(c.rank()))
    });
}

/// Points each team earns for a hand, indexed by `Team::index`
pub fn score_hand(maker: Team, tricks: [u8; 2], alone: bool) -> [u8; 2] {
    let mut points = [0; 2];

    for team in [Team::Team1, Team::Team2] {
        let won = tricks[team.index()];
        if won < 3 {
            continue;
        }

        points[team.index()] = if team != maker {
            // euchred the makers
            2
        } else if won as usize == TRICKS_PER_HAND {
            if alone {
                4
            } else {
                2
            }
        } else {
            1
        };
    }

    points
}

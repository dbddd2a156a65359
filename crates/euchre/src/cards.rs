use std::{
    fmt::{Display, Write},
    str::FromStr,
};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CLUBS_MASK: u32 = 0b00000000000000000000000000111111;
pub const SPADES_MASK: u32 = 0b00000000000000000000111111000000;
pub const HEART_MASK: u32 = 0b00000000000000111111000000000000;
pub const DIAMONDS_MASK: u32 = 0b00000000111111000000000000000000;

/// Full euchre deck, grouped by suit and ordered by rank within each suit
pub const CARDS: &[Card] = &[
    Card::NC,
    Card::TC,
    Card::JC,
    Card::QC,
    Card::KC,
    Card::AC,
    Card::NS,
    Card::TS,
    Card::JS,
    Card::QS,
    Card::KS,
    Card::AS,
    Card::NH,
    Card::TH,
    Card::JH,
    Card::QH,
    Card::KH,
    Card::AH,
    Card::ND,
    Card::TD,
    Card::JD,
    Card::QD,
    Card::KD,
    Card::AD,
];

/// Suit order used when sorting hands and when listing the "reverse" suits
pub const SUIT_ORDER: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

const SUITS: [Suit; 4] = [Suit::Clubs, Suit::Spades, Suit::Hearts, Suit::Diamonds];
const RANKS: [Rank; 6] = [
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
    Rank::Ace,
];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid card string: {0}")]
pub struct ParseCardError(pub String);

/// Represent cards in a deck, represented as a bitmask
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[repr(u32)]
pub enum Card {
    NC = 0b1,
    TC = 0b10,
    JC = 0b100,
    QC = 0b1000,
    KC = 0b10000,
    AC = 0b100000,
    NS = 0b1000000,
    TS = 0b10000000,
    JS = 0b100000000,
    QS = 0b1000000000,
    KS = 0b10000000000,
    AS = 0b100000000000,
    NH = 0b1000000000000,
    TH = 0b10000000000000,
    JH = 0b100000000000000,
    QH = 0b1000000000000000,
    KH = 0b10000000000000000,
    AH = 0b100000000000000000,
    ND = 0b1000000000000000000,
    TD = 0b10000000000000000000,
    JD = 0b100000000000000000000,
    QD = 0b1000000000000000000000,
    KD = 0b10000000000000000000000,
    AD = 0b100000000000000000000000,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        CARDS[suit as usize * 6 + rank as usize]
    }

    pub fn mask(&self) -> u32 {
        *self as u32
    }

    pub fn to_idx(&self) -> usize {
        (*self as u32).trailing_zeros() as usize
    }

    pub fn suit(&self) -> Suit {
        SUITS[self.to_idx() / 6]
    }

    pub fn rank(&self) -> Rank {
        RANKS[self.to_idx() % 6]
    }

    pub fn is_right_bower(&self, trump: Suit) -> bool {
        self.rank() == Rank::Jack && self.suit() == trump
    }

    pub fn is_left_bower(&self, trump: Suit) -> bool {
        self.rank() == Rank::Jack && self.suit() == trump.same_color()
    }

    /// True for the jacks of clubs and spades, used when drawing for dealer
    pub fn is_black_jack(&self) -> bool {
        matches!(self, Card::JC | Card::JS)
    }
}

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let (Some(r), Some(c), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(ParseCardError(s.to_string()));
        };

        let rank = match r.to_ascii_uppercase() {
            '9' => Rank::Nine,
            'T' => Rank::Ten,
            'J' => Rank::Jack,
            'Q' => Rank::Queen,
            'K' => Rank::King,
            'A' => Rank::Ace,
            _ => return Err(ParseCardError(s.to_string())),
        };

        let suit = match c.to_ascii_uppercase() {
            'C' => Suit::Clubs,
            'S' => Suit::Spades,
            'H' => Suit::Hearts,
            'D' => Suit::Diamonds,
            _ => return Err(ParseCardError(s.to_string())),
        };

        Ok(Card::new(rank, suit))
    }
}

impl TryFrom<String> for Card {
    type Error = ParseCardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Card> for String {
    fn from(value: Card) -> Self {
        value.to_string()
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suit = match self.suit() {
            Suit::Clubs => 'c',
            Suit::Spades => 's',
            Suit::Hearts => 'h',
            Suit::Diamonds => 'd',
        };
        f.write_char(self.rank().symbol())?;
        f.write_char(suit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Nine = 0,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub fn symbol(&self) -> char {
        match self {
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, Copy, Serialize, Deserialize, Hash, PartialOrd, Ord, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Clubs = 0,
    Spades,
    Hearts,
    Diamonds,
}

impl Suit {
    /// The other suit of the same color, also called "next"
    pub fn same_color(&self) -> Suit {
        match self {
            Suit::Clubs => Suit::Spades,
            Suit::Spades => Suit::Clubs,
            Suit::Hearts => Suit::Diamonds,
            Suit::Diamonds => Suit::Hearts,
        }
    }

    /// The two suits of the other color, in `SUIT_ORDER`
    pub fn reverse_suits(&self) -> [Suit; 2] {
        let mut out = [Suit::Hearts; 2];
        let mut i = 0;
        for s in SUIT_ORDER {
            if s != *self && s != self.same_color() {
                out[i] = s;
                i += 1;
            }
        }
        out
    }

    pub fn mask(&self) -> u32 {
        match self {
            Suit::Clubs => CLUBS_MASK,
            Suit::Spades => SPADES_MASK,
            Suit::Hearts => HEART_MASK,
            Suit::Diamonds => DIAMONDS_MASK,
        }
    }
}

impl Display for Suit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Suit::Clubs => "clubs",
            Suit::Spades => "spades",
            Suit::Hearts => "hearts",
            Suit::Diamonds => "diamonds",
        };
        f.write_str(s)
    }
}

/// Performant representation of collection of cards using a bit mask
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct CardSet {
    mask: u32,
}

impl CardSet {
    pub fn all() -> Self {
        Self {
            mask: CLUBS_MASK | SPADES_MASK | HEART_MASK | DIAMONDS_MASK,
        }
    }

    pub fn add(&mut self, card: Card) {
        self.mask |= card.mask();
    }

    pub fn remove(&mut self, card: Card) {
        self.mask &= !card.mask();
    }

    pub fn contains(&self, card: Card) -> bool {
        self.mask & card.mask() > 0
    }

    pub fn len(&self) -> usize {
        self.mask.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    /// Cards in deck order
    pub fn cards(&self) -> Vec<Card> {
        CARDS.iter().copied().filter(|c| self.contains(*c)).collect()
    }
}

impl FromIterator<Card> for CardSet {
    fn from_iter<T: IntoIterator<Item = Card>>(iter: T) -> Self {
        let mut set = CardSet::default();
        for c in iter {
            set.add(c);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_deck_is_unique() {
        let set: HashSet<Card> = CARDS.iter().copied().collect();
        assert_eq!(set.len(), 24);
        assert_eq!(CardSet::all().len(), 24);
    }

    #[test]
    fn test_rank_and_suit() {
        assert_eq!(Card::JD.suit(), Suit::Diamonds);
        assert_eq!(Card::JD.rank(), Rank::Jack);
        assert_eq!(Card::NC.rank(), Rank::Nine);
        assert_eq!(Card::AS.suit(), Suit::Spades);
        for c in CARDS {
            assert_eq!(Card::new(c.rank(), c.suit()), *c);
        }
    }

    #[test]
    fn test_parse_card() {
        assert_eq!("Js".parse::<Card>().unwrap(), Card::JS);
        assert_eq!("9h".parse::<Card>().unwrap(), Card::NH);
        assert_eq!("TD".parse::<Card>().unwrap(), Card::TD);
        assert!("Xs".parse::<Card>().is_err());
        assert!("As ".parse::<Card>().is_ok());
        assert!("10s".parse::<Card>().is_err());

        for c in CARDS {
            assert_eq!(c.to_string().parse::<Card>().unwrap(), *c);
        }
    }

    #[test]
    fn test_bowers() {
        assert!(Card::JH.is_right_bower(Suit::Hearts));
        assert!(Card::JD.is_left_bower(Suit::Hearts));
        assert!(!Card::JD.is_right_bower(Suit::Hearts));
        assert!(!Card::JC.is_left_bower(Suit::Hearts));
        assert!(Card::JS.is_black_jack());
        assert!(!Card::JH.is_black_jack());
    }

    #[test]
    fn test_reverse_suits() {
        assert_eq!(
            Suit::Clubs.reverse_suits(),
            [Suit::Hearts, Suit::Diamonds]
        );
        assert_eq!(Suit::Hearts.reverse_suits(), [Suit::Clubs, Suit::Spades]);
    }

    #[test]
    fn test_card_set() {
        let mut set = CardSet::default();
        set.add(Card::JS);
        set.add(Card::TD);

        assert!(set.contains(Card::JS));
        assert!(set.contains(Card::TD));
        assert!(!set.contains(Card::QS));
        set.remove(Card::JS);
        assert_eq!(set.cards(), vec![Card::TD]);
    }

    #[test]
    fn test_card_serde() {
        let json = serde_json::to_string(&Card::QH).unwrap();
        assert_eq!(json, "\"Qh\"");
        let card: Card = serde_json::from_str("\"ad\"").unwrap();
        assert_eq!(card, Card::AD);
        assert!(serde_json::from_str::<Card>("\"1x\"").is_err());
    }
}

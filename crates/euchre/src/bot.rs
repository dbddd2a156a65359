//! Heuristic bot used for every computer controlled seat.
//!
//! Bidding scores a hand between 0 and 1 and compares it to a threshold table
//! keyed by seat position. Card play follows a fixed set of lead and follow
//! heuristics built around "boss" cards, the highest unplayed card of a suit.

use std::cmp::Reverse;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    cards::{Card, CardSet, Rank, Suit},
    rules::{effective_suit, euchre_rank, is_trump, PlayedCard, Trick},
    Seat,
};

const TRUMP_WEIGHT: f64 = 0.7;
const ACES_WEIGHT: f64 = 0.2;
const VOIDS_WEIGHT: f64 = 0.1;

/// Seat position relative to the dealer during bidding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    First = 0,
    Second,
    Third,
    Dealer,
}

impl Position {
    /// Position for the `idx`th seat to bid, the dealer bids last
    pub fn from_bid_index(idx: usize) -> Position {
        match idx {
            0 => Position::First,
            1 => Position::Second,
            2 => Position::Third,
            _ => Position::Dealer,
        }
    }
}

/// Serialized as the round number, 1 or 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum BidRound {
    /// Order up the face up card or pass
    One,
    /// Name any other suit or pass
    Two,
}

impl BidRound {
    pub fn number(&self) -> u8 {
        match self {
            BidRound::One => 1,
            BidRound::Two => 2,
        }
    }
}

impl From<BidRound> for u8 {
    fn from(round: BidRound) -> Self {
        round.number()
    }
}

impl TryFrom<u8> for BidRound {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(BidRound::One),
            2 => Ok(BidRound::Two),
            _ => Err(format!("bidding round must be 1 or 2, got {}", value)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Threshold {
    normal: f64,
    loner: f64,
}

const fn t(normal: f64, loner: f64) -> Threshold {
    Threshold { normal, loner }
}

// indexed by `Position`
const ROUND_ONE: [Threshold; 4] = [t(0.33, 0.51), t(0.225, 0.451), t(0.355, 0.525), t(0.26, 0.47)];
const ROUND_TWO_NEXT: [Threshold; 4] = [t(0.2, 0.45), t(0.315, 0.48), t(0.23, 0.465), t(0.35, 0.46)];
const ROUND_TWO_REVERSE: [Threshold; 4] =
    [t(0.315, 0.48), t(0.2, 0.45), t(0.305, 0.485), t(0.3, 0.45)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrumpDecision {
    /// Suit called as trump, `None` to pass
    pub call: Option<Suit>,
    pub alone: bool,
}

impl TrumpDecision {
    pub fn pass() -> Self {
        Self {
            call: None,
            alone: false,
        }
    }

    pub fn call(suit: Suit, alone: bool) -> Self {
        Self {
            call: Some(suit),
            alone,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandScore {
    pub trump: f64,
    pub aces: f64,
    pub voids: f64,
    pub total: f64,
}

pub fn score_breakdown(hand: &[Card], trump: Suit) -> HandScore {
    let trump_score = evaluate_trump(hand, trump);
    let aces = evaluate_aces(hand, trump);
    let voids = evaluate_voids(hand, trump);
    HandScore {
        trump: trump_score,
        aces,
        voids,
        total: trump_score * TRUMP_WEIGHT + aces * ACES_WEIGHT + voids * VOIDS_WEIGHT,
    }
}

/// Strength of a hand for a given trump suit, between 0 and 1
pub fn evaluate_hand(hand: &[Card], trump: Suit) -> f64 {
    score_breakdown(hand, trump).total
}

pub fn evaluate_trump(hand: &[Card], trump: Suit) -> f64 {
    let trump_cards = trump_cards(hand, trump);

    let mut score = 0.0;
    let mut right = false;
    let mut left = false;
    for c in &trump_cards {
        score += if c.is_right_bower(trump) {
            right = true;
            1.0
        } else if c.is_left_bower(trump) {
            left = true;
            0.9
        } else {
            match c.rank() {
                Rank::Ace => 0.8,
                Rank::King => 0.7,
                Rank::Queen => 0.6,
                Rank::Ten => 0.575,
                Rank::Nine => 0.55,
                Rank::Jack => 0.0,
            }
        };
    }

    let mut multiplier = match trump_cards.len() {
        3 => 1.4,
        4 => 1.6,
        5.. => 1.8,
        _ => 1.0,
    };
    if right && left {
        multiplier += 0.15;
    }

    let max_score = (1.0 + 0.9 + 0.8 + 0.7 + 0.6) * 1.7;
    f64::min(1.0, score * multiplier / max_score)
}

pub fn evaluate_aces(hand: &[Card], trump: Suit) -> f64 {
    let trump_count = trump_cards(hand, trump).len();
    let off_suit = hand.iter().filter(|c| !is_trump(**c, trump)).collect_vec();
    let suit_len = |suit: Suit| off_suit.iter().filter(|c| c.suit() == suit).count();
    let num_off_suits = off_suit.iter().map(|c| c.suit()).unique().count();

    let mut sum = 0.0;
    let mut num_aces = 0;
    for c in off_suit.iter().filter(|c| c.rank() == Rank::Ace) {
        num_aces += 1;
        let base = if c.suit() == trump.same_color() {
            0.9
        } else {
            1.0
        };
        let multiplier = match suit_len(c.suit()) {
            1 => 1.0,
            2 => 0.9,
            3 => 0.7,
            _ => 0.5,
        };
        sum += base * multiplier;
    }

    // aces are worth more with plenty of trump to get the lead back
    let mut bonus = 1.0;
    if trump_count >= 3 && num_aces >= 1 {
        bonus += 0.2;
        if num_off_suits == 1 {
            bonus += 0.1;
        }
    }

    f64::min(1.0, sum * bonus / 2.9)
}

pub fn evaluate_voids(hand: &[Card], trump: Suit) -> f64 {
    let trump_count = trump_cards(hand, trump).len();
    if trump_count == 0 {
        return 0.0;
    }

    let num_off_suits = hand
        .iter()
        .filter(|c| !is_trump(**c, trump))
        .map(|c| c.suit())
        .unique()
        .count();

    match num_off_suits {
        0 => 1.0,
        1 if trump_count == 3 => 1.0,
        1 => 0.9,
        2 => 0.15,
        _ => 0.0,
    }
}

/// Decide whether to call trump.
///
/// In round one a dealer evaluates the hand as if the up card was already
/// picked up and the worst card discarded.
pub fn determine_trump(
    hand: &[Card],
    position: Position,
    up_card: Card,
    round: BidRound,
) -> TrumpDecision {
    match round {
        BidRound::One => round_one_decision(hand, position, up_card),
        BidRound::Two => round_two_decision(hand, position, up_card),
    }
}

fn round_one_decision(hand: &[Card], position: Position, up_card: Card) -> TrumpDecision {
    let trump = up_card.suit();
    let threshold = ROUND_ONE[position as usize];

    let score = if position == Position::Dealer {
        let mut picked_up = hand.to_vec();
        picked_up.push(up_card);
        if let Some(discard) = worst_card(&picked_up, trump) {
            if let Some(idx) = picked_up.iter().position(|c| *c == discard) {
                picked_up.remove(idx);
            }
        }
        evaluate_hand(&picked_up, trump)
    } else {
        evaluate_hand(hand, trump)
    };

    if score < threshold.normal {
        return TrumpDecision::pass();
    }

    // don't go alone from first or third seat when the right bower goes to an opponent
    let alone = score >= threshold.loner
        && (up_card.rank() != Rank::Jack
            || !matches!(position, Position::First | Position::Third));

    // first seat gets the first chance at next in round two
    if position == Position::First {
        let next_score = evaluate_hand(hand, trump.same_color());
        let next_margin = next_score - ROUND_TWO_NEXT[Position::First as usize].normal;
        if next_margin > score - threshold.normal {
            return TrumpDecision::pass();
        }
    }

    TrumpDecision::call(trump, alone)
}

fn round_two_decision(hand: &[Card], position: Position, up_card: Card) -> TrumpDecision {
    let turned_down = up_card.suit();
    let next = turned_down.same_color();
    let [reverse1, reverse2] = turned_down.reverse_suits();

    let next_t = ROUND_TWO_NEXT[position as usize];
    let reverse_t = ROUND_TWO_REVERSE[position as usize];

    let next_score = evaluate_hand(hand, next);
    let reverse1_score = evaluate_hand(hand, reverse1);
    let reverse2_score = evaluate_hand(hand, reverse2);

    if position == Position::Dealer {
        // stuck, take whichever suit clears its threshold by the most
        let options = [
            (next, next_score - next_t.normal, next_score >= next_t.loner),
            (
                reverse1,
                reverse1_score - reverse_t.normal,
                reverse1_score >= reverse_t.loner,
            ),
            (
                reverse2,
                reverse2_score - reverse_t.normal,
                reverse2_score >= reverse_t.loner,
            ),
        ];

        let mut best = options[0];
        for o in &options[1..] {
            if o.1 > best.1 {
                best = *o;
            }
        }
        return TrumpDecision::call(best.0, best.2);
    }

    let call_next = next_score >= next_t.normal;
    let alone_next = next_score >= next_t.loner;
    let call_reverse = reverse1_score >= reverse_t.normal || reverse2_score >= reverse_t.normal;
    let alone_reverse = reverse1_score >= reverse_t.loner || reverse2_score >= reverse_t.loner;
    let best_reverse = if reverse1_score >= reverse2_score {
        reverse1
    } else {
        reverse2
    };

    if call_next && call_reverse {
        let next_margin = next_score - next_t.normal;
        let reverse1_margin = reverse1_score - reverse_t.normal;
        let reverse2_margin = reverse2_score - reverse_t.normal;

        if next_margin >= reverse1_margin && next_margin >= reverse2_margin {
            TrumpDecision::call(next, alone_next)
        } else {
            TrumpDecision::call(best_reverse, alone_reverse)
        }
    } else if call_next {
        TrumpDecision::call(next, alone_next)
    } else if call_reverse {
        TrumpDecision::call(best_reverse, alone_reverse)
    } else {
        TrumpDecision::pass()
    }
}

pub fn trump_cards(hand: &[Card], trump: Suit) -> Vec<Card> {
    hand.iter().copied().filter(|c| is_trump(*c, trump)).collect()
}

/// Highest card by euchre rank, the first one wins ties
fn highest(cards: &[Card], trump: Suit, lead: Option<Suit>) -> Option<Card> {
    cards
        .iter()
        .copied()
        .min_by_key(|c| Reverse(euchre_rank(*c, trump, lead)))
}

/// Lowest card by euchre rank, the first one wins ties
fn lowest(cards: &[Card], trump: Suit, lead: Option<Suit>) -> Option<Card> {
    cards
        .iter()
        .copied()
        .min_by_key(|c| euchre_rank(*c, trump, lead))
}

/// Card to get rid of, preferring one that creates a void.
///
/// Used both for the dealer's discard and as the default card to throw off.
pub fn worst_card(hand: &[Card], trump: Suit) -> Option<Card> {
    let off_suit = hand
        .iter()
        .copied()
        .filter(|c| !is_trump(*c, trump))
        .collect_vec();

    if off_suit.is_empty() {
        return lowest(hand, trump, None);
    }

    let singletons = off_suit
        .iter()
        .map(|c| c.suit())
        .unique()
        .filter_map(|s| {
            let cards = off_suit.iter().filter(|c| c.suit() == s).collect_vec();
            match cards.as_slice() {
                [c] if c.rank() != Rank::Ace => Some(**c),
                _ => None,
            }
        })
        .collect_vec();

    if !singletons.is_empty() {
        return lowest(&singletons, trump, None);
    }

    lowest(&off_suit, trump, None)
}

/// Cards of an effective suit from highest to lowest
fn suit_ranking(suit: Suit, trump: Suit) -> Vec<Card> {
    use Rank::*;
    if suit == trump {
        let mut cards = vec![
            Card::new(Jack, trump),
            Card::new(Jack, trump.same_color()),
        ];
        cards.extend([Ace, King, Queen, Ten, Nine].map(|r| Card::new(r, trump)));
        cards
    } else {
        [Ace, King, Queen, Jack, Ten, Nine]
            .map(|r| Card::new(r, suit))
            .into_iter()
            .filter(|c| !c.is_left_bower(trump))
            .collect()
    }
}

/// Highest card of the effective suit that hasn't been played in a previous trick
pub fn boss_card(suit: Suit, trump: Suit, previous: &[Trick]) -> Option<Card> {
    let played: CardSet = previous
        .iter()
        .flat_map(|t| t.plays.iter().map(|p| p.card))
        .collect();

    suit_ranking(suit, trump)
        .into_iter()
        .find(|c| !played.contains(*c))
}

pub fn is_boss_card(card: Card, trump: Suit, previous: &[Trick]) -> bool {
    boss_card(effective_suit(card, trump), trump, previous) == Some(card)
}

fn has_boss_card(hand: &[Card], suit: Suit, trump: Suit, previous: &[Trick]) -> bool {
    boss_card(suit, trump, previous).is_some_and(|boss| hand.contains(&boss))
}

/// Everything a bot can see when choosing a card
#[derive(Debug, Clone, Copy)]
pub struct PlayContext<'a> {
    pub seat: Seat,
    pub hand: &'a [Card],
    pub trump: Suit,
    /// Cards already played to the current trick, in order
    pub played: &'a [PlayedCard],
    pub previous: &'a [Trick],
    pub maker: Seat,
    pub going_alone: bool,
    /// Tricks taken so far by the bot's team
    pub tricks_won: u8,
    /// Players taking part in each trick, 3 when someone is alone
    pub active_players: usize,
}

struct Roles {
    partner_called: bool,
    player_called: bool,
    opponent_called: bool,
    player_alone: bool,
}

/// Choose a legal card to play. Returns `None` for an empty hand.
pub fn best_card(ctx: &PlayContext) -> Option<Card> {
    if ctx.hand.len() <= 1 {
        return ctx.hand.first().copied();
    }

    let player_called = ctx.maker == ctx.seat;
    let partner_called = ctx.maker == ctx.seat.partner();
    let roles = Roles {
        partner_called,
        player_called,
        opponent_called: !partner_called && !player_called,
        player_alone: ctx.going_alone && player_called,
    };

    let Some(lead) = ctx.played.first() else {
        return choose_lead_card(ctx, &roles);
    };

    let trump = ctx.trump;
    let lead_suit = effective_suit(lead.card, trump);
    let winning = ctx
        .played
        .iter()
        .min_by_key(|p| Reverse(euchre_rank(p.card, trump, Some(lead_suit))))?;

    let partner_winning = winning.seat == ctx.seat.partner();
    let last_to_play = ctx.played.len() + 1 == ctx.active_players;
    let winning_rank = euchre_rank(winning.card, trump, None);

    let trump_in_hand = trump_cards(ctx.hand, trump);
    let following = ctx
        .hand
        .iter()
        .copied()
        .filter(|c| effective_suit(*c, trump) == lead_suit)
        .collect_vec();
    let throw_off = worst_card(ctx.hand, trump);

    if !following.is_empty() {
        let high = highest(&following, trump, Some(lead_suit))?;
        let low = lowest(&following, trump, Some(lead_suit))?;
        let can_win = euchre_rank(high, trump, None) > winning_rank;

        if partner_winning {
            if last_to_play || is_boss_card(winning.card, trump, ctx.previous) {
                return Some(low);
            }
        }
        if can_win {
            return Some(high);
        }
        return Some(low);
    }

    let trump_played = ctx.played.iter().any(|p| is_trump(p.card, trump));
    if !trump_played {
        let Some(small_trump) = lowest(&trump_in_hand, trump, None) else {
            return throw_off;
        };

        if partner_winning {
            if last_to_play || is_boss_card(winning.card, trump, ctx.previous) {
                return throw_off;
            }
        }
        return Some(small_trump);
    }

    if partner_winning {
        return throw_off;
    }

    // cheapest trump that takes the lead
    let overtrumps = trump_in_hand
        .into_iter()
        .filter(|c| euchre_rank(*c, trump, None) > winning_rank)
        .collect_vec();
    lowest(&overtrumps, trump, None).or(throw_off)
}

fn choose_lead_card(ctx: &PlayContext, roles: &Roles) -> Option<Card> {
    let trump = ctx.trump;
    let hand = ctx.hand;

    let trump_in_hand = trump_cards(hand, trump);
    let off_suit = hand
        .iter()
        .copied()
        .filter(|c| !is_trump(*c, trump))
        .collect_vec();
    let off_suit_boss = off_suit
        .iter()
        .copied()
        .filter(|c| is_boss_card(*c, trump, ctx.previous))
        .collect_vec();
    let have_highest_trump = has_boss_card(hand, trump, trump, ctx.previous);
    let trump_led_before = ctx
        .previous
        .iter()
        .filter_map(|t| t.lead())
        .any(|c| is_trump(c, trump));
    let secured_point = ctx.tricks_won >= 3;

    let high_trump = highest(&trump_in_hand, trump, None);
    let low_trump = lowest(&trump_in_hand, trump, None);

    // pull trump then cash the off suit winner
    if have_highest_trump
        && !off_suit_boss.is_empty()
        && (roles.player_called
            || roles.partner_called
            || (roles.opponent_called && trump_led_before))
    {
        return high_trump;
    }

    // second to last trick holding one trump and one off suit card
    if ctx.previous.len() == 3 && hand.len() == 2 && trump_in_hand.len() == 1 {
        if roles.player_alone && secured_point {
            return high_trump;
        }
        return lowest(hand, trump, None);
    }

    if roles.partner_called
        && !trump_in_hand.is_empty()
        && (!trump_led_before || (trump_in_hand.len() > 1 && !off_suit_boss.is_empty()))
    {
        return high_trump;
    }

    if roles.player_called {
        if have_highest_trump {
            return high_trump;
        } else if trump_in_hand.len() > 1 {
            return if roles.player_alone {
                high_trump
            } else {
                low_trump
            };
        } else if roles.player_alone {
            if let Some(c) = highest(&off_suit, trump, None) {
                return Some(c);
            }
        }
    }

    if roles.opponent_called && !off_suit_boss.is_empty() && trump_in_hand.len() >= 3 {
        return if have_highest_trump {
            high_trump
        } else {
            low_trump
        };
    }

    if let Some(c) = highest(&off_suit_boss, trump, None) {
        return Some(c);
    }

    worst_card(hand, trump)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{cards::Card::*, rules::legal_cards};

    fn trick(cards: &[Card], starter: Seat, trump: Suit) -> Trick {
        let mut seat = starter;
        let plays: Vec<PlayedCard> = cards
            .iter()
            .map(|c| {
                let p = PlayedCard::new(seat, *c);
                seat = seat.next();
                p
            })
            .collect();
        let winner = crate::rules::trick_winner(&plays, trump).unwrap();
        Trick { plays, winner }
    }

    fn played(cards: &[Card], starter: Seat) -> Vec<PlayedCard> {
        trick(cards, starter, Suit::Hearts).plays
    }

    fn ctx<'a>(
        seat: Seat,
        hand: &'a [Card],
        played: &'a [PlayedCard],
        previous: &'a [Trick],
        maker: Seat,
    ) -> PlayContext<'a> {
        PlayContext {
            seat,
            hand,
            trump: Suit::Hearts,
            played,
            previous,
            maker,
            going_alone: false,
            tricks_won: 0,
            active_players: 4,
        }
    }

    #[test]
    fn test_evaluate_all_trump() {
        let hand = [JH, JD, AH, KH, QH];
        let score = score_breakdown(&hand, Suit::Hearts);
        assert_relative_eq!(score.trump, 1.0);
        assert_relative_eq!(score.aces, 0.0);
        assert_relative_eq!(score.voids, 1.0);
        assert_relative_eq!(score.total, 0.8);
    }

    #[test]
    fn test_evaluate_aces_hand() {
        let hand = [AC, AS, AD, NH, TH];
        let score = score_breakdown(&hand, Suit::Hearts);
        assert_relative_eq!(score.trump, 1.125 / 6.8, epsilon = 1e-9);
        // ace of diamonds is in next, so counts for less
        assert_relative_eq!(score.aces, 1.0, epsilon = 1e-9);
        assert_relative_eq!(score.voids, 0.0);
        assert_relative_eq!(score.total, 0.7 * 1.125 / 6.8 + 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_evaluate_voids() {
        assert_relative_eq!(evaluate_voids(&[NC, TC, QS, KD, AD], Suit::Hearts), 0.0);
        assert_relative_eq!(evaluate_voids(&[NH, TH, JH, KD, AD], Suit::Hearts), 1.0);
        assert_relative_eq!(evaluate_voids(&[NH, TH, KD, AD, QD], Suit::Hearts), 0.9);
        assert_relative_eq!(evaluate_voids(&[NH, TH, KD, AD, QS], Suit::Hearts), 0.15);
    }

    #[test]
    fn test_round_one_strong_hand_goes_alone() {
        let decision = determine_trump(&[JH, JD, AH, KH, QH], Position::First, NH, BidRound::One);
        assert_eq!(decision, TrumpDecision::call(Suit::Hearts, true));
    }

    #[test]
    fn test_round_one_weak_hand_passes() {
        let decision = determine_trump(&[NC, TC, NS, TD, QD], Position::Second, AH, BidRound::One);
        assert_eq!(decision, TrumpDecision::pass());
    }

    #[test]
    fn test_no_loner_from_third_seat_with_jack_up() {
        let decision = determine_trump(&[JD, AH, KH, QH, TH], Position::Third, JH, BidRound::One);
        assert_eq!(decision.call, Some(Suit::Hearts));
        assert!(!decision.alone);
    }

    #[test]
    fn test_first_seat_saves_a_better_next_suit() {
        // spades scores ~0.358, clubs as next scores 0.8
        let hand = [JS, JC, AC, KC, QC];
        let decision = determine_trump(&hand, Position::First, NS, BidRound::One);
        assert_eq!(decision, TrumpDecision::pass());

        let decision = determine_trump(&hand, Position::Second, NS, BidRound::One);
        assert_eq!(decision, TrumpDecision::call(Suit::Spades, false));
    }

    #[test]
    fn test_round_two_prefers_larger_margin() {
        // diamonds ~0.541, clubs ~0.324, spades ~0.218
        let hand = [JD, AD, KD, JC, AC];

        // hearts down: next is diamonds, margin 0.226 against 0.124 for clubs
        let decision = determine_trump(&hand, Position::Second, AH, BidRound::Two);
        assert_eq!(decision, TrumpDecision::call(Suit::Diamonds, true));

        // spades down: clubs is next and barely clears, diamonds wins as a reverse suit
        let decision = determine_trump(&hand, Position::Second, NS, BidRound::Two);
        assert_eq!(decision, TrumpDecision::call(Suit::Diamonds, true));
    }

    #[test]
    fn test_dealer_must_call_in_round_two() {
        for hand in [[NC, TC, NS, TD, QD], [NH, TH, QH, KC, AS], [AC, KC, QC, JC, TC]] {
            let decision = determine_trump(&hand, Position::Dealer, AH, BidRound::Two);
            let call = decision.call.expect("dealer passed");
            assert_ne!(call, Suit::Hearts);
        }
    }

    #[test]
    fn test_round_two_never_calls_turned_down_suit() {
        let decision = determine_trump(&[JH, JD, AH, KH, QH], Position::First, NH, BidRound::Two);
        assert_ne!(decision.call, Some(Suit::Hearts));
    }

    #[test]
    fn test_worst_card() {
        assert_eq!(worst_card(&[JS, AS, NC, AD, KD], Suit::Spades), Some(NC));
        assert_eq!(worst_card(&[AC, KD, QD, JS, NS], Suit::Spades), Some(QD));
        assert_eq!(worst_card(&[JS, AS, NS, JC, TS], Suit::Spades), Some(NS));
        assert_eq!(worst_card(&[], Suit::Spades), None);
    }

    #[test]
    fn test_boss_cards() {
        let trump = Suit::Hearts;
        assert_eq!(boss_card(trump, trump, &[]), Some(JH));
        assert!(!is_boss_card(JD, trump, &[]));
        assert!(is_boss_card(AC, trump, &[]));
        // the jack of diamonds is trump, so the ten follows the queen
        let previous = [
            trick(&[AD, KD, QD, NC], Seat::Player, trump),
            trick(&[JH, NH, TC, QC], Seat::Player, trump),
        ];
        assert_eq!(boss_card(Suit::Diamonds, trump, &previous), Some(TD));
        assert!(is_boss_card(JD, trump, &previous));
    }

    #[test]
    fn test_follow_low_when_partner_has_it() {
        let p = played(&[KC, AC, NC], Seat::Player);
        let hand = [QC, TC, AH];
        let c = best_card(&ctx(Seat::Opponent2, &hand, &p, &[], Seat::Player));
        assert_eq!(c, Some(TC));
    }

    #[test]
    fn test_follow_high_to_win() {
        let p = played(&[KC], Seat::Player);
        let hand = [AC, NC, NH];
        let c = best_card(&ctx(Seat::Opponent1, &hand, &p, &[], Seat::Player));
        assert_eq!(c, Some(AC));
    }

    #[test]
    fn test_trump_in_when_void() {
        let p = played(&[AS], Seat::Player);
        let hand = [NH, AH, TC];
        let c = best_card(&ctx(Seat::Opponent1, &hand, &p, &[], Seat::Player));
        assert_eq!(c, Some(NH));
    }

    #[test]
    fn test_overtrump_cheaply() {
        let p = played(&[AS, NH], Seat::Player);
        let hand = [TH, KH, NC];
        let c = best_card(&ctx(Seat::TeamMate, &hand, &p, &[], Seat::Opponent1));
        assert_eq!(c, Some(TH));
    }

    #[test]
    fn test_maker_leads_right_bower() {
        let hand = [JH, NH, AC, KS, TD];
        let c = best_card(&ctx(Seat::Opponent1, &hand, &[], &[], Seat::Opponent1));
        assert_eq!(c, Some(JH));
    }

    #[test]
    fn test_defender_leads_worst_card() {
        let hand = [NC, TS, QD, KD, NS];
        let c = best_card(&ctx(Seat::Opponent1, &hand, &[], &[], Seat::Player));
        assert_eq!(c, Some(NC));
    }

    #[test]
    fn test_lead_trump_for_calling_partner() {
        let hand = [AH, NH, KC, QS, TD];
        let c = best_card(&ctx(Seat::Opponent1, &hand, &[], &[], Seat::Opponent2));
        assert_eq!(c, Some(AH));

        // trump already pulled, a single trump is kept back
        let previous = [trick(&[JH, AH, NC, TC], Seat::Player, Suit::Hearts)];
        let hand = [NH, KC, QS, TD];
        let c = best_card(&ctx(Seat::Opponent1, &hand, &[], &previous, Seat::Opponent2));
        assert_eq!(c, Some(TD));

        // unless there are two trump and an off suit winner to cash
        let hand = [KH, NH, AC, QS];
        let c = best_card(&ctx(Seat::Opponent1, &hand, &[], &previous, Seat::Opponent2));
        assert_eq!(c, Some(KH));
    }

    #[test]
    fn test_second_to_last_trick_lead() {
        let trump = Suit::Hearts;
        let previous = [
            trick(&[JH, AH, NC, TC], Seat::Player, trump),
            trick(&[AS, KS, QS, TS], Seat::Player, trump),
            trick(&[AD, KD, QD, ND], Seat::Player, trump),
        ];
        let hand = [NH, KC];

        // keep the trump for the last trick
        let c = best_card(&ctx(Seat::Player, &hand, &[], &previous, Seat::Player));
        assert_eq!(c, Some(KC));

        // alone with the point secured, go for the march
        let mut alone = ctx(Seat::Player, &hand, &[], &previous, Seat::Player);
        alone.going_alone = true;
        alone.tricks_won = 3;
        alone.active_players = 3;
        assert_eq!(best_card(&alone), Some(NH));

        // alone without the point yet, still lead low
        alone.tricks_won = 2;
        assert_eq!(best_card(&alone), Some(KC));
    }

    #[test]
    fn test_best_card_is_always_legal() {
        let hands: [[Card; 4]; 3] = [[JD, AD, TC, QS], [NH, KH, AS, TS], [QC, KC, NS, AD]];
        let leads = [KD, AS, TC, NH, JD];
        for hand in hands {
            for lead in leads {
                if hand.contains(&lead) {
                    continue;
                }
                let p = played(&[lead], Seat::Player);
                let c = best_card(&ctx(Seat::Opponent1, &hand, &p, &[], Seat::TeamMate)).unwrap();
                assert!(
                    legal_cards(&hand, Some(lead), Suit::Hearts).contains(&c),
                    "{} is not legal on {} with {:?}",
                    c,
                    lead,
                    hand
                );
            }
        }
    }

    #[test]
    fn test_bid_round_wire_format() {
        assert_eq!(serde_json::to_string(&BidRound::Two).unwrap(), "2");
        assert_eq!(serde_json::from_str::<BidRound>("1").unwrap(), BidRound::One);
        assert!(serde_json::from_str::<BidRound>("3").is_err());
    }
}

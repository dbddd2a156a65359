//! Authoritative state for one game at the table.
//!
//! A hand moves through `AwaitingDeal -> Bidding -> Playing -> RoundOver` and
//! back to `AwaitingDeal` until a team reaches [`WINNING_SCORE`]. Every action
//! is checked against the phase, whose turn it is and what the seat holds.

use itertools::Itertools;
use log::{debug, info};
use rand::{rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    bot::{self, BidRound, PlayContext, Position, TrumpDecision},
    cards::{Card, CardSet, Suit, CARDS},
    rules::{
        effective_suit, legal_cards, score_hand, sort_hand, trick_winner, PlayedCard, Trick,
        CARDS_PER_HAND, TRICKS_PER_HAND, WINNING_SCORE,
    },
    Seat, Team, NUM_PLAYERS, SEATS,
};

const KITTY_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    AwaitingDeal,
    Bidding,
    Playing,
    RoundOver,
    GameOver,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("action not allowed while the table is in {0:?}")]
    WrongPhase(Phase),
    #[error("the first hand has already been dealt")]
    AlreadyDealt,
    #[error("not allowed in bidding round {}", .0.number())]
    WrongBidRound(BidRound),
    #[error("it is {expected}'s turn, not {actual}'s")]
    NotYourTurn { expected: Seat, actual: Seat },
    #[error("{0} is sitting out this hand")]
    SittingOut(Seat),
    #[error("{0} is not controlled by a bot")]
    NotABot(Seat),
    #[error("{0} is not in the hand")]
    CardNotInHand(Card),
    #[error("must follow {0}")]
    MustFollowSuit(Suit),
    #[error("{0} was turned down and can't be named trump")]
    CannotCallUpSuit(Suit),
    #[error("the dealer must name trump in the second round")]
    DealerMustCall,
    #[error("the trick is complete and must be resolved")]
    TrickComplete,
    #[error("the trick needs {needed} cards, {played} played")]
    TrickIncomplete { needed: usize, played: usize },
    #[error("a deal needs four hands of five and four more distinct cards in the kitty")]
    InvalidDeal,
}

/// How the first dealer was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealerDraw {
    /// Cards dealt face up, one per seat in turn, until a black jack showed
    pub draws: Vec<PlayedCard>,
    pub dealer: Seat,
    pub card: Card,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub seat: Seat,
    pub round: BidRound,
    /// `None` is a pass
    pub call: Option<Suit>,
    pub alone: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrumpSummary {
    pub trump: Suit,
    pub maker: Seat,
    pub alone: bool,
    pub round: BidRound,
    pub sitting_out: Option<Seat>,
    /// Card the dealer picked up in round one
    pub picked_up: Option<Card>,
    pub discard: Option<Card>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrickStart {
    /// Starts at 1
    pub number: usize,
    pub leader: Seat,
    pub play_order: Vec<Seat>,
    pub sitting_out: Option<Seat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrickResult {
    pub number: usize,
    pub winner: Seat,
    pub plays: Vec<PlayedCard>,
    pub next_play_order: Vec<Seat>,
    /// Indexed by `Team::index`
    pub tricks_won: [u8; 2],
    pub round_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub trump: Suit,
    pub maker: Seat,
    pub alone: bool,
    pub tricks_won: [u8; 2],
    pub points: [u8; 2],
    pub score: [u8; 2],
    pub winner: Option<Team>,
    pub kitty: Vec<Card>,
    pub discard: Option<Card>,
}

/// What one seat is allowed to see of the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableView {
    pub viewer: Seat,
    pub phase: Phase,
    pub dealer: Seat,
    pub hand: Vec<Card>,
    pub hand_sizes: [usize; NUM_PLAYERS],
    pub up_card: Option<Card>,
    pub bid_round: Option<BidRound>,
    pub bids: Vec<Bid>,
    pub to_act: Option<Seat>,
    pub trump: Option<TrumpSummary>,
    pub current_trick: Vec<PlayedCard>,
    pub tricks: Vec<Trick>,
    pub tricks_won: [u8; 2],
    pub score: [u8; 2],
    pub hands_played: usize,
}

#[derive(Debug, Clone)]
pub struct Table {
    rng: StdRng,
    phase: Phase,
    dealer: Seat,
    human: Option<Seat>,
    hands: [Vec<Card>; NUM_PLAYERS],
    kitty: Vec<Card>,
    bid_round: BidRound,
    bid_turn: usize,
    bids: Vec<Bid>,
    trump: Option<TrumpSummary>,
    current: Vec<PlayedCard>,
    tricks: Vec<Trick>,
    tricks_won: [u8; 2],
    score: [u8; 2],
    hands_played: usize,
}

impl Table {
    /// A table with the human in `Seat::Player`
    pub fn new(rng: StdRng, dealer: Seat) -> Self {
        Self {
            rng,
            phase: Phase::AwaitingDeal,
            dealer,
            human: Some(Seat::Player),
            hands: Default::default(),
            kitty: Vec::new(),
            bid_round: BidRound::One,
            bid_turn: 0,
            bids: Vec::new(),
            trump: None,
            current: Vec::new(),
            tricks: Vec::new(),
            tricks_won: [0; 2],
            score: [0; 2],
            hands_played: 0,
        }
    }

    /// A table where every seat is played by the bot
    pub fn all_bots(rng: StdRng, dealer: Seat) -> Self {
        Self {
            human: None,
            ..Self::new(rng, dealer)
        }
    }

    /// Seat the players and find the first dealer: cards are dealt face up one
    /// at a time around the table and the first black jack deals.
    pub fn start(mut rng: StdRng) -> (Self, DealerDraw) {
        let mut deck = CARDS.to_vec();
        deck.shuffle(&mut rng);

        let mut draws = Vec::new();
        // the deck holds two black jacks, so a dealer is always found
        let mut dealer = (Seat::Player, deck[0]);
        for (card, seat) in deck.iter().zip(SEATS.iter().cycle()) {
            draws.push(PlayedCard::new(*seat, *card));
            if card.is_black_jack() {
                dealer = (*seat, *card);
                break;
            }
        }

        info!("{} deals first with {}", dealer.0, dealer.1);
        let draw = DealerDraw {
            draws,
            dealer: dealer.0,
            card: dealer.1,
        };
        (Self::new(rng, dealer.0), draw)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn dealer(&self) -> Seat {
        self.dealer
    }

    pub fn human(&self) -> Option<Seat> {
        self.human
    }

    pub fn hand(&self, seat: Seat) -> &[Card] {
        &self.hands[seat.index()]
    }

    pub fn score(&self) -> [u8; 2] {
        self.score
    }

    pub fn tricks_won(&self) -> [u8; 2] {
        self.tricks_won
    }

    pub fn tricks(&self) -> &[Trick] {
        &self.tricks
    }

    pub fn current_trick(&self) -> &[PlayedCard] {
        &self.current
    }

    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    pub fn hands_played(&self) -> usize {
        self.hands_played
    }

    pub fn trump(&self) -> Option<TrumpSummary> {
        self.trump
    }

    /// Undealt cards, `kitty[0]` is turned face up for bidding
    pub fn kitty(&self) -> &[Card] {
        &self.kitty
    }

    pub fn up_card(&self) -> Option<Card> {
        self.kitty.first().copied()
    }

    pub fn bid_round(&self) -> Option<BidRound> {
        (self.phase == Phase::Bidding).then_some(self.bid_round)
    }

    pub fn winner(&self) -> Option<Team> {
        [Team::Team1, Team::Team2]
            .into_iter()
            .find(|t| self.score[t.index()] >= WINNING_SCORE)
    }

    /// Seats in bidding order, starting left of the dealer and ending with the dealer
    pub fn bidding_order(&self) -> [Seat; NUM_PLAYERS] {
        self.dealer.next().clockwise()
    }

    pub fn sitting_out(&self) -> Option<Seat> {
        self.trump.and_then(|t| t.sitting_out)
    }

    fn active_players(&self) -> usize {
        NUM_PLAYERS - self.sitting_out().map_or(0, |_| 1)
    }

    /// Seat expected to bid or play next
    pub fn to_act(&self) -> Option<Seat> {
        match self.phase {
            Phase::Bidding => Some(self.bidding_order()[self.bid_turn]),
            Phase::Playing => self.play_order().get(self.current.len()).copied(),
            _ => None,
        }
    }

    /// Deal the first hand of the game
    pub fn deal(&mut self) -> Result<(), TableError> {
        self.expect_phase(Phase::AwaitingDeal)?;
        if self.hands_played > 0 {
            return Err(TableError::AlreadyDealt);
        }
        self.shuffle_and_deal()
    }

    /// Move the deal one seat to the left and deal
    pub fn deal_next_hand(&mut self) -> Result<(), TableError> {
        self.expect_phase(Phase::AwaitingDeal)?;
        self.dealer = self.dealer.next();
        self.shuffle_and_deal()
    }

    fn shuffle_and_deal(&mut self) -> Result<(), TableError> {
        let mut deck = CARDS.to_vec();
        deck.shuffle(&mut self.rng);

        let mut hands: [Vec<Card>; NUM_PLAYERS] = Default::default();
        for (i, seat) in self.bidding_order().iter().enumerate() {
            hands[seat.index()] = deck[i * CARDS_PER_HAND..(i + 1) * CARDS_PER_HAND].to_vec();
        }
        let kitty = deck[NUM_PLAYERS * CARDS_PER_HAND..].to_vec();
        self.deal_from(hands, kitty)
    }

    /// Start a hand from fixed cards, indexed by `Seat::index`
    pub fn deal_from(
        &mut self,
        hands: [Vec<Card>; NUM_PLAYERS],
        kitty: Vec<Card>,
    ) -> Result<(), TableError> {
        self.expect_phase(Phase::AwaitingDeal)?;

        let all: CardSet = hands.iter().flatten().chain(kitty.iter()).copied().collect();
        if hands.iter().any(|h| h.len() != CARDS_PER_HAND)
            || kitty.len() != KITTY_SIZE
            || all.len() != NUM_PLAYERS * CARDS_PER_HAND + KITTY_SIZE
        {
            return Err(TableError::InvalidDeal);
        }

        self.hands = hands;
        for h in self.hands.iter_mut() {
            sort_hand(h, None);
        }
        self.kitty = kitty;
        self.bid_round = BidRound::One;
        self.bid_turn = 0;
        self.bids.clear();
        self.trump = None;
        self.current.clear();
        self.tricks.clear();
        self.tricks_won = [0; 2];
        self.phase = Phase::Bidding;

        debug!(
            "dealt hand {} with {} dealing, {} up",
            self.hands_played + 1,
            self.dealer,
            self.kitty[0]
        );
        debug!("hands: {}", self.describe_hands());
        Ok(())
    }

    fn expect_phase(&self, phase: Phase) -> Result<(), TableError> {
        if self.phase != phase {
            return Err(TableError::WrongPhase(self.phase));
        }
        Ok(())
    }

    fn expect_bid_turn(&self, seat: Seat) -> Result<(), TableError> {
        self.expect_phase(Phase::Bidding)?;
        let expected = self.bidding_order()[self.bid_turn];
        if expected != seat {
            return Err(TableError::NotYourTurn {
                expected,
                actual: seat,
            });
        }
        Ok(())
    }

    fn expect_bot(&self, seat: Seat) -> Result<(), TableError> {
        if self.human == Some(seat) {
            return Err(TableError::NotABot(seat));
        }
        Ok(())
    }

    fn up_suit(&self) -> Result<Suit, TableError> {
        self.up_card()
            .map(|c| c.suit())
            .ok_or(TableError::WrongPhase(self.phase))
    }

    pub fn pass(&mut self, seat: Seat) -> Result<Bid, TableError> {
        self.expect_bid_turn(seat)?;
        if self.bid_round == BidRound::Two && seat == self.dealer {
            return Err(TableError::DealerMustCall);
        }

        let bid = Bid {
            seat,
            round: self.bid_round,
            call: None,
            alone: false,
        };
        self.bids.push(bid);

        self.bid_turn += 1;
        if self.bid_turn == NUM_PLAYERS {
            debug!("{} turned down", self.kitty[0]);
            self.bid_turn = 0;
            self.bid_round = BidRound::Two;
        }
        Ok(bid)
    }

    /// Round one: make the up card's suit trump. The dealer picks it up and
    /// discards its worst card.
    pub fn order_up(&mut self, seat: Seat, alone: bool) -> Result<Bid, TableError> {
        self.expect_bid_turn(seat)?;
        if self.bid_round != BidRound::One {
            return Err(TableError::WrongBidRound(self.bid_round));
        }

        let up_card = self.kitty[0];
        let trump = up_card.suit();

        let dealer_hand = &mut self.hands[self.dealer.index()];
        dealer_hand.push(up_card);
        let discard = bot::worst_card(dealer_hand, trump);
        if let Some(d) = discard {
            dealer_hand.retain(|c| *c != d);
        }

        Ok(self.set_trump(seat, trump, alone, Some(up_card), discard))
    }

    /// Round two: name any suit other than the one turned down
    pub fn call_suit(&mut self, seat: Seat, suit: Suit, alone: bool) -> Result<Bid, TableError> {
        self.expect_bid_turn(seat)?;
        if self.bid_round != BidRound::Two {
            return Err(TableError::WrongBidRound(self.bid_round));
        }
        let turned_down = self.up_suit()?;
        if suit == turned_down {
            return Err(TableError::CannotCallUpSuit(suit));
        }

        Ok(self.set_trump(seat, suit, alone, None, None))
    }

    /// Apply a decision for `seat` in the current bidding round
    pub fn apply_decision(&mut self, seat: Seat, decision: TrumpDecision) -> Result<Bid, TableError> {
        match (decision.call, self.bid_round) {
            (None, _) => self.pass(seat),
            (Some(_), BidRound::One) => self.order_up(seat, decision.alone),
            (Some(suit), BidRound::Two) => self.call_suit(seat, suit, decision.alone),
        }
    }

    /// What the bot would bid for `seat` right now
    pub fn bot_decision(&self, seat: Seat) -> Result<TrumpDecision, TableError> {
        self.expect_bid_turn(seat)?;
        let up_card = self.kitty[0];
        Ok(bot::determine_trump(
            self.hand(seat),
            Position::from_bid_index(self.bid_turn),
            up_card,
            self.bid_round,
        ))
    }

    pub fn bot_bid(&mut self, seat: Seat) -> Result<Bid, TableError> {
        self.expect_bot(seat)?;
        let decision = self.bot_decision(seat)?;
        self.apply_decision(seat, decision)
    }

    fn set_trump(
        &mut self,
        maker: Seat,
        trump: Suit,
        alone: bool,
        picked_up: Option<Card>,
        discard: Option<Card>,
    ) -> Bid {
        let summary = TrumpSummary {
            trump,
            maker,
            alone,
            round: self.bid_round,
            sitting_out: alone.then(|| maker.partner()),
            picked_up,
            discard,
        };
        info!(
            "{} made {} trump{}",
            maker,
            trump,
            if alone { ", going alone" } else { "" }
        );

        for h in self.hands.iter_mut() {
            sort_hand(h, Some(trump));
        }

        let bid = Bid {
            seat: maker,
            round: self.bid_round,
            call: Some(trump),
            alone,
        };
        self.bids.push(bid);
        self.trump = Some(summary);
        self.phase = Phase::Playing;
        bid
    }

    fn trump_suit(&self) -> Result<Suit, TableError> {
        self.trump
            .map(|t| t.trump)
            .ok_or(TableError::WrongPhase(self.phase))
    }

    /// Leader of the current trick: the previous winner, or the first active
    /// seat left of the dealer for the first trick
    fn leader(&self) -> Seat {
        match self.tricks.last() {
            Some(t) => t.winner,
            None => self
                .bidding_order()
                .into_iter()
                .find(|s| Some(*s) != self.sitting_out())
                .unwrap_or(self.dealer.next()),
        }
    }

    /// Active seats in play order for the current trick
    pub fn play_order(&self) -> Vec<Seat> {
        self.order_from(self.leader())
    }

    fn order_from(&self, leader: Seat) -> Vec<Seat> {
        let out = self.sitting_out();
        leader
            .clockwise()
            .into_iter()
            .filter(|s| Some(*s) != out)
            .collect()
    }

    pub fn init_trick(&self) -> Result<TrickStart, TableError> {
        self.expect_phase(Phase::Playing)?;
        let play_order = self.play_order();
        Ok(TrickStart {
            number: self.tricks.len() + 1,
            leader: play_order[0],
            play_order,
            sitting_out: self.sitting_out(),
        })
    }

    pub fn play_card(&mut self, seat: Seat, card: Card) -> Result<PlayedCard, TableError> {
        self.expect_phase(Phase::Playing)?;
        let trump = self.trump_suit()?;

        if Some(seat) == self.sitting_out() {
            return Err(TableError::SittingOut(seat));
        }
        let Some(expected) = self.to_act() else {
            return Err(TableError::TrickComplete);
        };
        if expected != seat {
            return Err(TableError::NotYourTurn {
                expected,
                actual: seat,
            });
        }

        let hand = &self.hands[seat.index()];
        if !hand.contains(&card) {
            return Err(TableError::CardNotInHand(card));
        }
        let lead = self.current.first().map(|p| p.card);
        if !legal_cards(hand, lead, trump).contains(&card) {
            let lead_suit = lead.map_or(trump, |c| effective_suit(c, trump));
            return Err(TableError::MustFollowSuit(lead_suit));
        }

        self.hands[seat.index()].retain(|c| *c != card);
        let played = PlayedCard::new(seat, card);
        self.current.push(played);
        debug!("{} played {}", seat, card);
        Ok(played)
    }

    /// The card the bot would play for `seat`
    pub fn bot_card(&self, seat: Seat) -> Result<Card, TableError> {
        self.expect_phase(Phase::Playing)?;
        let summary = self.trump.ok_or(TableError::WrongPhase(self.phase))?;
        let ctx = PlayContext {
            seat,
            hand: self.hand(seat),
            trump: summary.trump,
            played: &self.current,
            previous: &self.tricks,
            maker: summary.maker,
            going_alone: summary.alone,
            tricks_won: self.tricks_won[seat.team().index()],
            active_players: self.active_players(),
        };
        bot::best_card(&ctx).ok_or(TableError::WrongPhase(self.phase))
    }

    pub fn bot_play(&mut self, seat: Seat) -> Result<PlayedCard, TableError> {
        self.expect_bot(seat)?;
        self.expect_phase(Phase::Playing)?;
        match self.to_act() {
            Some(expected) if expected == seat => {}
            Some(expected) => {
                return Err(TableError::NotYourTurn {
                    expected,
                    actual: seat,
                })
            }
            None => return Err(TableError::TrickComplete),
        }
        let card = self.bot_card(seat)?;
        self.play_card(seat, card)
    }

    pub fn resolve_trick(&mut self) -> Result<TrickResult, TableError> {
        self.expect_phase(Phase::Playing)?;
        let trump = self.trump_suit()?;

        let needed = self.active_players();
        if self.current.len() != needed {
            return Err(TableError::TrickIncomplete {
                needed,
                played: self.current.len(),
            });
        }

        let plays = std::mem::take(&mut self.current);
        let winner = trick_winner(&plays, trump).ok_or(TableError::TrickIncomplete {
            needed,
            played: 0,
        })?;
        self.tricks_won[winner.team().index()] += 1;
        self.tricks.push(Trick {
            plays: plays.clone(),
            winner,
        });

        let round_complete = self.tricks.len() == TRICKS_PER_HAND;
        if round_complete {
            self.phase = Phase::RoundOver;
        }
        debug!("{} took trick {}", winner, self.tricks.len());

        Ok(TrickResult {
            number: self.tricks.len(),
            winner,
            plays,
            next_play_order: self.order_from(winner),
            tricks_won: self.tricks_won,
            round_complete,
        })
    }

    pub fn finalize_round(&mut self) -> Result<RoundResult, TableError> {
        self.expect_phase(Phase::RoundOver)?;
        let summary = self.trump.ok_or(TableError::WrongPhase(self.phase))?;

        let points = score_hand(summary.maker.team(), self.tricks_won, summary.alone);
        for (s, p) in self.score.iter_mut().zip(points) {
            *s += p;
        }
        self.hands_played += 1;

        let winner = self.winner();
        self.phase = if winner.is_some() {
            Phase::GameOver
        } else {
            Phase::AwaitingDeal
        };
        info!(
            "hand {} scored {:?}, score is now {:?}",
            self.hands_played, points, self.score
        );

        Ok(RoundResult {
            trump: summary.trump,
            maker: summary.maker,
            alone: summary.alone,
            tricks_won: self.tricks_won,
            points,
            score: self.score,
            winner,
            kitty: self.kitty.clone(),
            discard: summary.discard,
        })
    }

    /// Every card `viewer` can't see: not yet played and not in their hand
    pub fn remaining_cards(&self, viewer: Seat) -> Vec<Card> {
        let mut unseen = CardSet::all();
        self.tricks
            .iter()
            .flat_map(|t| t.plays.iter())
            .chain(self.current.iter())
            .for_each(|p| unseen.remove(p.card));
        self.hand(viewer).iter().for_each(|c| unseen.remove(*c));
        unseen.cards()
    }

    pub fn view(&self, viewer: Seat) -> TableView {
        // the dealer's discard stays hidden from everyone else
        let trump = self.trump.map(|t| TrumpSummary {
            discard: t.discard.filter(|_| viewer == self.dealer),
            ..t
        });

        TableView {
            viewer,
            phase: self.phase,
            dealer: self.dealer,
            hand: self.hand(viewer).to_vec(),
            hand_sizes: SEATS.map(|s| self.hand(s).len()),
            up_card: self.up_card(),
            bid_round: self.bid_round(),
            bids: self.bids.clone(),
            to_act: self.to_act(),
            trump,
            current_trick: self.current.clone(),
            tricks: self.tricks.clone(),
            tricks_won: self.tricks_won,
            score: self.score,
            hands_played: self.hands_played,
        }
    }

    /// Every seat's hand on one line, for the debug log
    pub fn describe_hands(&self) -> String {
        SEATS
            .iter()
            .map(|s| format!("{}: {}", s, self.hand(*s).iter().join(" ")))
            .join(", ")
    }
}

//! What the client shows between server calls. Every field is copied from a
//! server response; nothing here decides the game.

use client_server_messages::{
    BidResponse, DealResponse, FinalizeRoundResponse, InitTrickResponse, PlayCardResponse,
    ResolveTrickResponse, SeatInfo, StartGameResponse, TeamPoints,
};
use euchre::{
    bot::BidRound,
    cards::Card,
    rules::{PlayedCard, Trick},
    table::TrumpSummary,
    Seat, Team,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KittySlot {
    /// Unknown to the human until shown
    pub card: Option<Card>,
    pub face_up: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TableState {
    pub game_id: Option<Uuid>,
    pub dealer: Option<Seat>,
    pub player_order: Vec<SeatInfo>,
    /// Index into `player_order` of the seat bidding next
    pub bid_index: usize,
    pub bid_round: Option<BidRound>,
    pub up_card: Option<Card>,
    pub kitty: [KittySlot; 4],
    pub hand: Vec<Card>,
    pub trump: Option<TrumpSummary>,
    pub trick_number: usize,
    pub play_order: Vec<Seat>,
    pub current_trick: Vec<PlayedCard>,
    pub tricks: Vec<Trick>,
    pub tricks_won: [u8; 2],
    pub score: TeamPoints,
    pub winner: Option<Team>,
    pub hands_played: usize,
}

impl TableState {
    pub fn on_start(&mut self, resp: &StartGameResponse) {
        *self = TableState {
            game_id: Some(resp.game_id),
            dealer: Some(resp.dealer),
            ..Default::default()
        };
    }

    pub fn on_deal(&mut self, resp: &DealResponse) {
        self.dealer = Some(resp.dealer);
        self.player_order = resp.player_order.clone();
        self.bid_index = 0;
        self.bid_round = Some(BidRound::One);
        self.up_card = Some(resp.up_card);
        self.kitty = Default::default();
        self.kitty[0] = KittySlot {
            card: Some(resp.up_card),
            face_up: true,
        };
        self.hand = resp.hand.clone();
        self.trump = None;
        self.trick_number = 0;
        self.play_order.clear();
        self.current_trick.clear();
        self.tricks.clear();
        self.tricks_won = [0; 2];
    }

    /// Seat expected to bid next
    pub fn to_bid(&self) -> Option<SeatInfo> {
        self.bid_round?;
        self.player_order.get(self.bid_index).copied()
    }

    pub fn on_bid(&mut self, resp: &BidResponse) {
        self.hand = resp.hand.clone();

        if let Some(trump) = resp.trump {
            // the up card goes face down; a human dealer sees what they discarded
            self.kitty[0].face_up = false;
            if let Some(discard) = trump.discard {
                self.kitty[0].card = Some(discard);
            }
            self.trump = Some(trump);
            self.bid_round = None;
            return;
        }

        if resp.round != self.bid_round {
            self.kitty[0].face_up = false;
            self.bid_index = 0;
        } else {
            self.bid_index += 1;
        }
        self.bid_round = resp.round;
    }

    pub fn on_trick_start(&mut self, resp: &InitTrickResponse) {
        self.trick_number = resp.number;
        self.play_order = resp.play_order.clone();
        self.current_trick.clear();
    }

    /// Seat expected to play next in the current trick
    pub fn to_play(&self) -> Option<Seat> {
        self.play_order.get(self.current_trick.len()).copied()
    }

    pub fn on_card(&mut self, resp: &PlayCardResponse) {
        self.current_trick = resp.current_trick.clone();
        self.hand = resp.player_hand.clone();
    }

    pub fn on_trick_resolved(&mut self, resp: &ResolveTrickResponse) {
        self.tricks.push(Trick {
            plays: resp.plays.clone(),
            winner: resp.winner,
        });
        self.tricks_won = resp.tricks_won;
        self.current_trick.clear();
        self.play_order = resp.next_play_order.clone();
        self.trick_number = resp.number + 1;
    }

    pub fn on_round(&mut self, resp: &FinalizeRoundResponse) {
        for (slot, card) in self.kitty.iter_mut().zip(&resp.kitty) {
            *slot = KittySlot {
                card: Some(*card),
                face_up: true,
            };
        }
        self.score = resp.score.into();
        self.winner = resp.winner;
        self.hands_played += 1;
        self.trump = None;
    }

    /// Partner of a lone maker, skipped this hand
    pub fn sitting_out(&self) -> Option<Seat> {
        self.trump.and_then(|t| t.sitting_out)
    }
}

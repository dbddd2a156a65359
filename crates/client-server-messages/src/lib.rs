//! JSON bodies exchanged between the euchre server and its clients.

use euchre::{
    bot::BidRound,
    cards::{Card, Suit},
    rules::PlayedCard,
    table::{Bid, DealerDraw, TrumpSummary},
    Seat, Team, NUM_PLAYERS,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use euchre::table::{
    RoundResult as FinalizeRoundResponse, TableView as GameView,
    TrickResult as ResolveTrickResponse, TrickStart as InitTrickResponse,
};

/// Body for every call that only names the game
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRequest {
    pub game_id: Uuid,
}

impl GameRequest {
    pub fn new(game_id: Uuid) -> Self {
        Self { game_id }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartGameRequest {
    /// Game to archive before the new one starts
    #[serde(default)]
    pub previous_game: Option<Uuid>,
}

impl StartGameRequest {
    pub fn new(previous_game: Option<Uuid>) -> Self {
        Self { previous_game }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StartGameResponse {
    pub game_id: Uuid,
    pub dealt_cards: Vec<PlayedCard>,
    pub dealer: Seat,
    pub highest_card: Card,
    pub player_order: Vec<Seat>,
}

impl StartGameResponse {
    pub fn new(game_id: Uuid, draw: DealerDraw, player_order: Vec<Seat>) -> Self {
        Self {
            game_id,
            dealt_cards: draw.draws,
            dealer: draw.dealer,
            highest_card: draw.card,
            player_order,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatInfo {
    pub name: Seat,
    pub is_human: bool,
}

/// Result of dealing a hand, from the human's point of view
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DealResponse {
    pub hand: Vec<Card>,
    pub hand_sizes: [usize; NUM_PLAYERS],
    pub up_card: Card,
    pub dealer: Seat,
    /// Bidding order, starting left of the dealer
    pub player_order: Vec<SeatInfo>,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BiddingStatus {
    pub round: BidRound,
    pub up_card: Card,
    pub to_act: Seat,
    pub player_order: Vec<Seat>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptTrumpRequest {
    pub game_id: Uuid,
    pub trump_round: BidRound,
    /// Required in round two, ignored in round one
    #[serde(default)]
    pub suit: Option<Suit>,
    #[serde(default)]
    pub going_alone: bool,
}

impl AcceptTrumpRequest {
    pub fn new(game_id: Uuid, trump_round: BidRound, suit: Option<Suit>, going_alone: bool) -> Self {
        Self {
            game_id,
            trump_round,
            suit,
            going_alone,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetermineTrumpRequest {
    pub game_id: Uuid,
    pub player: Seat,
}

impl DetermineTrumpRequest {
    pub fn new(game_id: Uuid, player: Seat) -> Self {
        Self { game_id, player }
    }
}

/// Outcome of a single bid
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BidResponse {
    pub bid: Bid,
    /// `None` once trump is made
    pub next_to_act: Option<Seat>,
    pub round: Option<BidRound>,
    pub trump: Option<TrumpSummary>,
    /// The human's hand, changed when the human deals and picks up
    pub hand: Vec<Card>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayPlayerCardRequest {
    pub game_id: Uuid,
    pub card: Card,
}

impl PlayPlayerCardRequest {
    pub fn new(game_id: Uuid, card: Card) -> Self {
        Self { game_id, card }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayBotCardRequest {
    pub game_id: Uuid,
    pub bot: Seat,
}

impl PlayBotCardRequest {
    pub fn new(game_id: Uuid, bot: Seat) -> Self {
        Self { game_id, bot }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlayCardResponse {
    pub played_card: PlayedCard,
    pub current_trick: Vec<PlayedCard>,
    /// `None` when the trick is complete
    pub next_to_play: Option<Seat>,
    pub player_hand: Vec<Card>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamPoints {
    pub team1: u8,
    pub team2: u8,
}

impl TeamPoints {
    pub fn get(&self, team: Team) -> u8 {
        match team {
            Team::Team1 => self.team1,
            Team::Team2 => self.team2,
        }
    }
}

impl From<[u8; 2]> for TeamPoints {
    fn from(points: [u8; 2]) -> Self {
        Self {
            team1: points[Team::Team1.index()],
            team2: points[Team::Team2.index()],
        }
    }
}

pub type ScoreResponse = TeamPoints;

/// A finished or abandoned game
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    pub game_id: Uuid,
    pub winner: Option<Team>,
    pub total_hands: usize,
    pub points: TeamPoints,
}

impl GameResult {
    pub fn new(game_id: Uuid, winner: Option<Team>, total_hands: usize, score: [u8; 2]) -> Self {
        Self {
            game_id,
            winner,
            total_hands,
            points: score.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResetGameResponse {
    pub message: String,
    pub result: GameResult,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RemainingCardsResponse {
    pub remaining_cards: Vec<Card>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GameHistoryResponse {
    pub games: Vec<GameResult>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

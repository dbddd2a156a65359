//! Calls to the game server. Every call is a single request and response; the
//! server holds the game.

use async_trait::async_trait;
use client_server_messages::{
    AcceptTrumpRequest, BidResponse, DealResponse, DetermineTrumpRequest, ErrorResponse,
    FinalizeRoundResponse, GameRequest, InitTrickResponse, PlayBotCardRequest, PlayCardResponse,
    PlayPlayerCardRequest, RemainingCardsResponse, ResetGameResponse, ResolveTrickResponse,
    ScoreResponse, StartGameRequest, StartGameResponse,
};
use euchre::{
    bot::BidRound,
    cards::{Card, Suit},
    Seat,
};
use log::{debug, trace};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server refused the request, the game is unchanged
    #[error("{message} ({status})")]
    Rejected { status: u16, message: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[async_trait]
pub trait EuchreApi: Send + Sync {
    async fn start_game(&self, previous_game: Option<Uuid>) -> ApiResult<StartGameResponse>;
    async fn deal_hand(&self, game_id: Uuid) -> ApiResult<DealResponse>;
    async fn accept_trump(
        &self,
        game_id: Uuid,
        round: BidRound,
        suit: Option<Suit>,
        going_alone: bool,
    ) -> ApiResult<BidResponse>;
    async fn pass_trump(&self, game_id: Uuid) -> ApiResult<BidResponse>;
    async fn determine_trump(&self, game_id: Uuid, bot: Seat) -> ApiResult<BidResponse>;
    async fn init_trick(&self, game_id: Uuid) -> ApiResult<InitTrickResponse>;
    async fn play_player_card(&self, game_id: Uuid, card: Card) -> ApiResult<PlayCardResponse>;
    async fn play_bot_card(&self, game_id: Uuid, bot: Seat) -> ApiResult<PlayCardResponse>;
    async fn resolve_trick(&self, game_id: Uuid) -> ApiResult<ResolveTrickResponse>;
    async fn finalize_round(&self, game_id: Uuid) -> ApiResult<FinalizeRoundResponse>;
    async fn deal_next_hand(&self, game_id: Uuid) -> ApiResult<DealResponse>;
    async fn reset_game(&self, game_id: Uuid) -> ApiResult<ResetGameResponse>;
    async fn remaining_cards(&self, game_id: Uuid) -> ApiResult<RemainingCardsResponse>;
    async fn game_score(&self, game_id: Uuid) -> ApiResult<ScoreResponse>;
}

/// Talks json to a running euchre server
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post<Req, Resp>(&self, path: &str, body: &Req) -> ApiResult<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        trace!("POST {}", url);
        let resp = self.client.post(&url).json(body).send().await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<Resp>().await?);
        }

        let text = resp.text().await?;
        let message = match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(e) => e.error,
            Err(_) => text,
        };
        debug!("{} rejected with {}: {}", path, status, message);
        Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl EuchreApi for HttpApi {
    async fn start_game(&self, previous_game: Option<Uuid>) -> ApiResult<StartGameResponse> {
        self.post("start-game", &StartGameRequest::new(previous_game))
            .await
    }

    async fn deal_hand(&self, game_id: Uuid) -> ApiResult<DealResponse> {
        self.post("deal-hand", &GameRequest::new(game_id)).await
    }

    async fn accept_trump(
        &self,
        game_id: Uuid,
        round: BidRound,
        suit: Option<Suit>,
        going_alone: bool,
    ) -> ApiResult<BidResponse> {
        let req = AcceptTrumpRequest::new(game_id, round, suit, going_alone);
        self.post("accept-trump", &req).await
    }

    async fn pass_trump(&self, game_id: Uuid) -> ApiResult<BidResponse> {
        self.post("pass-trump", &GameRequest::new(game_id)).await
    }

    async fn determine_trump(&self, game_id: Uuid, bot: Seat) -> ApiResult<BidResponse> {
        self.post("determine-trump", &DetermineTrumpRequest::new(game_id, bot))
            .await
    }

    async fn init_trick(&self, game_id: Uuid) -> ApiResult<InitTrickResponse> {
        self.post("init-trick", &GameRequest::new(game_id)).await
    }

    async fn play_player_card(&self, game_id: Uuid, card: Card) -> ApiResult<PlayCardResponse> {
        self.post("play-player-card", &PlayPlayerCardRequest::new(game_id, card))
            .await
    }

    async fn play_bot_card(&self, game_id: Uuid, bot: Seat) -> ApiResult<PlayCardResponse> {
        self.post("play-bot-card", &PlayBotCardRequest::new(game_id, bot))
            .await
    }

    async fn resolve_trick(&self, game_id: Uuid) -> ApiResult<ResolveTrickResponse> {
        self.post("resolve-trick", &GameRequest::new(game_id)).await
    }

    async fn finalize_round(&self, game_id: Uuid) -> ApiResult<FinalizeRoundResponse> {
        self.post("finalize-round", &GameRequest::new(game_id)).await
    }

    async fn deal_next_hand(&self, game_id: Uuid) -> ApiResult<DealResponse> {
        self.post("deal-next-hand", &GameRequest::new(game_id)).await
    }

    async fn reset_game(&self, game_id: Uuid) -> ApiResult<ResetGameResponse> {
        self.post("reset-game", &GameRequest::new(game_id)).await
    }

    async fn remaining_cards(&self, game_id: Uuid) -> ApiResult<RemainingCardsResponse> {
        self.post("get-remaining-cards", &GameRequest::new(game_id))
            .await
    }

    async fn game_score(&self, game_id: Uuid) -> ApiResult<ScoreResponse> {
        self.post("get-game-score", &GameRequest::new(game_id)).await
    }
}

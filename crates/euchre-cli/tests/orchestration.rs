use std::sync::{Arc, Mutex};

use actix_web::{web, App, HttpServer, ResponseError};
use async_trait::async_trait;
use client_server_messages::{
    AcceptTrumpRequest, BidResponse, DealResponse, DetermineTrumpRequest, FinalizeRoundResponse,
    InitTrickResponse, PlayBotCardRequest, PlayCardResponse, PlayPlayerCardRequest,
    RemainingCardsResponse, ResetGameResponse, ResolveTrickResponse, ScoreResponse,
    StartGameRequest, StartGameResponse,
};
use euchre::{
    bot::BidRound,
    cards::{Card, Suit},
    rules::WINNING_SCORE,
    Seat,
};
use euchre_cli::{
    api::ApiResult,
    input::{BidPrompt, HumanBid},
    ApiError, EuchreApi, HttpApi, HumanInput, Orchestrator, Pacing,
};
use euchre_server::{configure, AppState, GameService, ServiceError};
use uuid::Uuid;

/// Calls the game service in process
#[derive(Clone)]
struct LocalApi {
    service: Arc<Mutex<GameService>>,
}

impl LocalApi {
    fn new(seed: u64) -> Self {
        Self {
            service: Arc::new(Mutex::new(GameService::new(Some(seed)))),
        }
    }

    fn call<T>(&self, f: impl FnOnce(&mut GameService) -> Result<T, ServiceError>) -> ApiResult<T> {
        let mut service = self.service.lock().unwrap();
        f(&mut service).map_err(|e| ApiError::Rejected {
            status: e.status_code().as_u16(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl EuchreApi for LocalApi {
    async fn start_game(&self, previous_game: Option<Uuid>) -> ApiResult<StartGameResponse> {
        self.call(|s| s.start_game(StartGameRequest::new(previous_game)))
    }

    async fn deal_hand(&self, game_id: Uuid) -> ApiResult<DealResponse> {
        self.call(|s| s.deal_hand(game_id))
    }

    async fn accept_trump(
        &self,
        game_id: Uuid,
        round: BidRound,
        suit: Option<Suit>,
        going_alone: bool,
    ) -> ApiResult<BidResponse> {
        let req = AcceptTrumpRequest::new(game_id, round, suit, going_alone);
        self.call(|s| s.accept_trump(req))
    }

    async fn pass_trump(&self, game_id: Uuid) -> ApiResult<BidResponse> {
        self.call(|s| s.pass_trump(game_id))
    }

    async fn determine_trump(&self, game_id: Uuid, bot: Seat) -> ApiResult<BidResponse> {
        self.call(|s| s.determine_trump(DetermineTrumpRequest::new(game_id, bot)))
    }

    async fn init_trick(&self, game_id: Uuid) -> ApiResult<InitTrickResponse> {
        self.call(|s| s.init_trick(game_id))
    }

    async fn play_player_card(&self, game_id: Uuid, card: Card) -> ApiResult<PlayCardResponse> {
        self.call(|s| s.play_player_card(PlayPlayerCardRequest::new(game_id, card)))
    }

    async fn play_bot_card(&self, game_id: Uuid, bot: Seat) -> ApiResult<PlayCardResponse> {
        self.call(|s| s.play_bot_card(PlayBotCardRequest::new(game_id, bot)))
    }

    async fn resolve_trick(&self, game_id: Uuid) -> ApiResult<ResolveTrickResponse> {
        self.call(|s| s.resolve_trick(game_id))
    }

    async fn finalize_round(&self, game_id: Uuid) -> ApiResult<FinalizeRoundResponse> {
        self.call(|s| s.finalize_round(game_id))
    }

    async fn deal_next_hand(&self, game_id: Uuid) -> ApiResult<DealResponse> {
        self.call(|s| s.deal_next_hand(game_id))
    }

    async fn reset_game(&self, game_id: Uuid) -> ApiResult<ResetGameResponse> {
        self.call(|s| s.reset_game(game_id))
    }

    async fn remaining_cards(&self, game_id: Uuid) -> ApiResult<RemainingCardsResponse> {
        self.call(|s| s.remaining_cards(game_id))
    }

    async fn game_score(&self, game_id: Uuid) -> ApiResult<ScoreResponse> {
        self.call(|s| s.score(game_id))
    }
}

/// Passes whenever allowed and tries an illegal card before every legal one
#[derive(Default)]
struct ScriptedHuman {
    games: usize,
    tried_illegal: bool,
    tried_dealer_pass: bool,
    illegal_attempts: usize,
    rejections: Vec<String>,
}

#[async_trait]
impl HumanInput for ScriptedHuman {
    async fn bid(&mut self, prompt: &BidPrompt) -> anyhow::Result<HumanBid> {
        if !prompt.must_call {
            return Ok(HumanBid::Pass);
        }
        assert_eq!(prompt.round, BidRound::Two);
        assert!(!prompt.suits.contains(&prompt.up_card.suit()));

        if !self.tried_dealer_pass {
            self.tried_dealer_pass = true;
            self.illegal_attempts += 1;
            return Ok(HumanBid::Pass);
        }
        self.tried_dealer_pass = false;
        Ok(HumanBid::Call {
            suit: prompt.suits.first().copied(),
            alone: false,
        })
    }

    async fn card(&mut self, hand: &[Card], playable: &[Card]) -> anyhow::Result<Card> {
        assert!(playable.iter().all(|c| hand.contains(c)));
        if let Some(bad) = hand.iter().find(|c| !playable.contains(c)) {
            if !self.tried_illegal {
                self.tried_illegal = true;
                self.illegal_attempts += 1;
                return Ok(*bad);
            }
        }
        self.tried_illegal = false;
        Ok(playable[0])
    }

    async fn rejected(&mut self, message: &str) {
        self.rejections.push(message.to_string());
    }

    async fn play_again(&mut self) -> anyhow::Result<bool> {
        self.games += 1;
        Ok(self.games < 2)
    }
}

#[tokio::test]
async fn test_plays_two_games_against_the_service() {
    let api = LocalApi::new(13);
    let service = api.service.clone();
    let mut orchestrator =
        Orchestrator::new(api, ScriptedHuman::default(), Pacing::none()).quiet();

    let outcomes = orchestrator.run().await.unwrap();
    assert_eq!(outcomes.len(), 2);
    for o in &outcomes {
        assert!(o.score.get(o.winner) >= WINNING_SCORE);
        assert!(o.hands >= 2);
    }

    // every refused choice was reported back and the prompt repeated
    let human = orchestrator.human();
    assert_eq!(human.rejections.len(), human.illegal_attempts);
    assert!(human
        .rejections
        .iter()
        .all(|m| m.starts_with("must follow") || m.contains("dealer must name trump")));

    let state = orchestrator.state();
    assert!(state.winner.is_some());
    assert!(state.kitty.iter().all(|s| s.face_up && s.card.is_some()));

    // the first game was archived by the second start, the second by the reset
    let service = service.lock().unwrap();
    assert_eq!(service.active_games(), 0);
    let history = service.history();
    assert_eq!(history.games.len(), 2);
    assert_eq!(history.games[0].game_id, outcomes[0].game_id);
    assert_eq!(history.games[1].winner, Some(outcomes[1].winner));
}

#[tokio::test]
async fn test_single_game_mirrors_server_score() {
    let api = LocalApi::new(99);
    let service = api.service.clone();
    let mut orchestrator =
        Orchestrator::new(api, ScriptedHuman::default(), Pacing::none()).quiet();

    let outcome = orchestrator.play_game(None).await.unwrap();
    let score = service.lock().unwrap().score(outcome.game_id).unwrap();
    assert_eq!(outcome.score, score);
    assert_eq!(orchestrator.state().score, score);
    assert_eq!(orchestrator.state().hands_played, outcome.hands);
}

#[actix_web::test]
async fn test_http_api_maps_errors() {
    let state = web::Data::new(AppState::new(Some(3)));
    let server = HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let api = HttpApi::new(&format!("http://{}/", addr));
    let start = api.start_game(None).await.unwrap();
    let deal = api.deal_hand(start.game_id).await.unwrap();
    assert_eq!(deal.hand.len(), 5);
    assert_eq!(deal.dealer, start.dealer);

    match api.deal_hand(start.game_id).await {
        Err(ApiError::Rejected { status, .. }) => assert_eq!(status, 400),
        other => panic!("expected a rejection, got {:?}", other.map(|d| d.message)),
    }
    match api.init_trick(Uuid::new_v4()).await {
        Err(ApiError::Rejected { status, message }) => {
            assert_eq!(status, 404);
            assert!(message.contains("not found"));
        }
        other => panic!("expected a rejection, got {:?}", other.map(|t| t.number)),
    }

    let remaining = api.remaining_cards(start.game_id).await.unwrap();
    assert_eq!(remaining.remaining_cards.len(), 19);

    handle.stop(true).await;
}

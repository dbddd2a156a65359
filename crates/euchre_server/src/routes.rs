use actix_web::{
    get, post,
    web::{self, Json},
    HttpResponse,
};
use client_server_messages::{
    AcceptTrumpRequest, DetermineTrumpRequest, GameRequest, PlayBotCardRequest,
    PlayPlayerCardRequest, StartGameRequest,
};
use uuid::Uuid;

use crate::{error::ServiceError, AppState};

type Reply = Result<HttpResponse, ServiceError>;

/// Register every game route along with json errors for malformed bodies
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ServiceError::BadRequest(err.to_string()).into()),
    )
    .service(start_game)
    .service(deal_hand)
    .service(pick_trump)
    .service(accept_trump)
    .service(pass_trump)
    .service(determine_trump)
    .service(init_trick)
    .service(play_player_card)
    .service(play_bot_card)
    .service(resolve_trick)
    .service(finalize_round)
    .service(deal_next_hand)
    .service(reset_game)
    .service(get_remaining_cards)
    .service(get_game_score)
    .service(game_history)
    .service(get_game);
}

/// The body is optional, but when present it has to parse
fn parse_start(body: &[u8]) -> Result<StartGameRequest, ServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(StartGameRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ServiceError::BadRequest(format!("invalid start-game body: {}", e)))
}

#[post("/start-game")]
async fn start_game(body: web::Bytes, data: web::Data<AppState>) -> Reply {
    let req = parse_start(&body)?;
    let resp = data.service()?.start_game(req)?;
    Ok(HttpResponse::Ok().json(resp))
}

#[post("/deal-hand")]
async fn deal_hand(req: Json<GameRequest>, data: web::Data<AppState>) -> Reply {
    Ok(HttpResponse::Ok().json(data.service()?.deal_hand(req.game_id)?))
}

#[post("/pick-trump")]
async fn pick_trump(req: Json<GameRequest>, data: web::Data<AppState>) -> Reply {
    Ok(HttpResponse::Ok().json(data.service()?.pick_trump(req.game_id)?))
}

#[post("/accept-trump")]
async fn accept_trump(req: Json<AcceptTrumpRequest>, data: web::Data<AppState>) -> Reply {
    Ok(HttpResponse::Ok().json(data.service()?.accept_trump(req.into_inner())?))
}

#[post("/pass-trump")]
async fn pass_trump(req: Json<GameRequest>, data: web::Data<AppState>) -> Reply {
    Ok(HttpResponse::Ok().json(data.service()?.pass_trump(req.game_id)?))
}

#[post("/determine-trump")]
async fn determine_trump(req: Json<DetermineTrumpRequest>, data: web::Data<AppState>) -> Reply {
    Ok(HttpResponse::Ok().json(data.service()?.determine_trump(req.into_inner())?))
}

#[post("/init-trick")]
async fn init_trick(req: Json<GameRequest>, data: web::Data<AppState>) -> Reply {
    Ok(HttpResponse::Ok().json(data.service()?.init_trick(req.game_id)?))
}

#[post("/play-player-card")]
async fn play_player_card(req: Json<PlayPlayerCardRequest>, data: web::Data<AppState>) -> Reply {
    Ok(HttpResponse::Ok().json(data.service()?.play_player_card(req.into_inner())?))
}

#[post("/play-bot-card")]
async fn play_bot_card(req: Json<PlayBotCardRequest>, data: web::Data<AppState>) -> Reply {
    Ok(HttpResponse::Ok().json(data.service()?.play_bot_card(req.into_inner())?))
}

#[post("/resolve-trick")]
async fn resolve_trick(req: Json<GameRequest>, data: web::Data<AppState>) -> Reply {
    Ok(HttpResponse::Ok().json(data.service()?.resolve_trick(req.game_id)?))
}

#[post("/finalize-round")]
async fn finalize_round(req: Json<GameRequest>, data: web::Data<AppState>) -> Reply {
    Ok(HttpResponse::Ok().json(data.service()?.finalize_round(req.game_id)?))
}

#[post("/deal-next-hand")]
async fn deal_next_hand(req: Json<GameRequest>, data: web::Data<AppState>) -> Reply {
    Ok(HttpResponse::Ok().json(data.service()?.deal_next_hand(req.game_id)?))
}

#[post("/reset-game")]
async fn reset_game(req: Json<GameRequest>, data: web::Data<AppState>) -> Reply {
    Ok(HttpResponse::Ok().json(data.service()?.reset_game(req.game_id)?))
}

#[post("/get-remaining-cards")]
async fn get_remaining_cards(req: Json<GameRequest>, data: web::Data<AppState>) -> Reply {
    Ok(HttpResponse::Ok().json(data.service()?.remaining_cards(req.game_id)?))
}

#[post("/get-game-score")]
async fn get_game_score(req: Json<GameRequest>, data: web::Data<AppState>) -> Reply {
    Ok(HttpResponse::Ok().json(data.service()?.score(req.game_id)?))
}

#[get("/game-history")]
async fn game_history(data: web::Data<AppState>) -> Reply {
    Ok(HttpResponse::Ok().json(data.service()?.history()))
}

#[get("/game/{game_id}")]
async fn get_game(path: web::Path<String>, data: web::Data<AppState>) -> Reply {
    let game_id = Uuid::parse_str(path.into_inner().as_str())
        .map_err(|e| ServiceError::BadRequest(format!("invalid game id: {}", e)))?;
    Ok(HttpResponse::Ok().json(data.service()?.view(game_id)?))
}

#[cfg(test)]
mod tests {
    use actix_web::{dev::ServiceResponse, http::StatusCode, test, App};
    use client_server_messages::{
        BidResponse, DealResponse, ErrorResponse, GameHistoryResponse, GameView,
        RemainingCardsResponse, ResetGameResponse, ScoreResponse, StartGameResponse,
    };
    use euchre::{bot::BidRound, table::Phase, Seat};
    use serde::de::DeserializeOwned;

    use super::*;

    async fn deserialize_body<T: DeserializeOwned>(resp: ServiceResponse) -> T {
        let body = test::read_body(resp).await;
        serde_json::from_str(std::str::from_utf8(body.as_ref()).unwrap()).unwrap()
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(AppState::new(Some(7))))
                    .configure(configure),
            )
            .await
        };
    }

    /// Post a json body and return the response
    macro_rules! post_json {
        ($app:expr, $uri:expr, $body:expr) => {
            test::call_service(
                &$app,
                test::TestRequest::post()
                    .uri($uri)
                    .set_json($body)
                    .to_request(),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_start_and_deal() {
        let app = app!();

        let resp = post_json!(app, "/start-game", StartGameRequest::default());
        assert!(resp.status().is_success());
        let start: StartGameResponse = deserialize_body(resp).await;
        assert_eq!(start.player_order.len(), 4);

        let resp = post_json!(app, "/deal-hand", GameRequest::new(start.game_id));
        assert!(resp.status().is_success());
        let deal: DealResponse = deserialize_body(resp).await;
        assert_eq!(deal.hand.len(), 5);
        assert_eq!(deal.dealer, start.dealer);
        assert_eq!(deal.player_order.last().unwrap().name, start.dealer);
        assert_eq!(deal.player_order.iter().filter(|s| s.is_human).count(), 1);

        let req = test::TestRequest::default()
            .uri(format!("/game/{}", start.game_id).as_str())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let view: GameView = deserialize_body(resp).await;
        assert_eq!(view.phase, Phase::Bidding);
        assert_eq!(view.hand, deal.hand);
        assert_eq!(view.up_card, Some(deal.up_card));
    }

    #[actix_web::test]
    async fn test_start_body_is_optional_but_checked() {
        let app = app!();

        let req = test::TestRequest::post().uri("/start-game").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let first: StartGameResponse = deserialize_body(resp).await;

        let resp = post_json!(
            app,
            "/start-game",
            serde_json::json!({"previous_game": "not-a-uuid"})
        );
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: ErrorResponse = deserialize_body(resp).await;
        assert!(err.error.starts_with("invalid start-game body"));

        // the rejected start left the first game in place
        let resp = post_json!(app, "/get-game-score", GameRequest::new(first.game_id));
        assert!(resp.status().is_success());

        let resp = post_json!(app, "/start-game", StartGameRequest::new(Some(first.game_id)));
        assert!(resp.status().is_success());
        let resp = post_json!(app, "/get-game-score", GameRequest::new(first.game_id));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[::core::prelude::v1::test]
    fn test_parse_start() {
        assert_eq!(parse_start(b"").unwrap().previous_game, None);
        assert_eq!(parse_start(b" \n").unwrap().previous_game, None);
        assert_eq!(parse_start(b"{}").unwrap().previous_game, None);
        let id = Uuid::new_v4();
        let body = format!("{{\"previous_game\":\"{}\"}}", id);
        assert_eq!(parse_start(body.as_bytes()).unwrap().previous_game, Some(id));
        assert!(matches!(
            parse_start(b"{\"previous_game\": 5}"),
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[actix_web::test]
    async fn test_errors_are_json() {
        let app = app!();

        let resp = post_json!(app, "/deal-hand", GameRequest::new(Uuid::new_v4()));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let err: ErrorResponse = deserialize_body(resp).await;
        assert!(err.error.contains("not found"));

        let req = test::TestRequest::default()
            .uri("/game/not-a-uuid")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = post_json!(app, "/play-player-card", serde_json::json!({"card": "Zz"}));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let _: ErrorResponse = deserialize_body(resp).await;
    }

    #[actix_web::test]
    async fn test_rule_violation_is_bad_request() {
        let app = app!();
        let resp = post_json!(app, "/start-game", StartGameRequest::default());
        let start: StartGameResponse = deserialize_body(resp).await;
        let game_id = start.game_id;

        // nothing to play before the deal
        let resp = post_json!(app, "/init-trick", GameRequest::new(game_id));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        post_json!(app, "/deal-hand", GameRequest::new(game_id));
        let req = AcceptTrumpRequest::new(game_id, BidRound::Two, None, false);
        let resp = post_json!(app, "/accept-trump", req);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: ErrorResponse = deserialize_body(resp).await;
        assert_eq!(err.error, "not allowed in bidding round 2");
    }

    #[actix_web::test]
    async fn test_bot_bid_and_reset() {
        let app = app!();
        let resp = post_json!(app, "/start-game", StartGameRequest::default());
        let start: StartGameResponse = deserialize_body(resp).await;
        let game_id = start.game_id;
        post_json!(app, "/deal-hand", GameRequest::new(game_id));

        let first = start.dealer.next();
        let resp = if first == Seat::Player {
            post_json!(app, "/pass-trump", GameRequest::new(game_id))
        } else {
            post_json!(
                app,
                "/determine-trump",
                DetermineTrumpRequest::new(game_id, first)
            )
        };
        assert!(resp.status().is_success());
        let bid: BidResponse = deserialize_body(resp).await;
        assert_eq!(bid.bid.seat, first);

        let resp = post_json!(app, "/get-remaining-cards", GameRequest::new(game_id));
        let remaining: RemainingCardsResponse = deserialize_body(resp).await;
        assert_eq!(remaining.remaining_cards.len(), 24 - bid.hand.len());

        let resp = post_json!(app, "/get-game-score", GameRequest::new(game_id));
        let score: ScoreResponse = deserialize_body(resp).await;
        assert_eq!((score.team1, score.team2), (0, 0));

        let resp = post_json!(app, "/reset-game", GameRequest::new(game_id));
        let reset: ResetGameResponse = deserialize_body(resp).await;
        assert_eq!(reset.result.game_id, game_id);

        let req = test::TestRequest::default()
            .uri("/game-history")
            .to_request();
        let resp = test::call_service(&app, req).await;
        let history: GameHistoryResponse = deserialize_body(resp).await;
        assert_eq!(history.games, vec![reset.result]);

        let resp = post_json!(app, "/get-game-score", GameRequest::new(game_id));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

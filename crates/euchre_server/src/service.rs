//! Game bookkeeping behind the HTTP routes.
//!
//! Every live game is a [`Table`] keyed by its id. Games are archived into the
//! history when they are reset or replaced by a new game.

use std::collections::HashMap;

use client_server_messages::{
    AcceptTrumpRequest, BidResponse, BiddingStatus, DealResponse, DetermineTrumpRequest,
    FinalizeRoundResponse, GameHistoryResponse, GameResult, GameView, InitTrickResponse,
    PlayBotCardRequest, PlayCardResponse, PlayPlayerCardRequest, RemainingCardsResponse,
    ResetGameResponse, ResolveTrickResponse, ScoreResponse, SeatInfo, StartGameRequest,
    StartGameResponse,
};
use euchre::{
    bot::BidRound,
    rules::PlayedCard,
    table::{Bid, Table, TableError},
    Seat, SEATS,
};
use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use uuid::Uuid;

use crate::error::ServiceError;

/// Seat the remote player controls
pub const HUMAN: Seat = Seat::Player;

pub struct GameService {
    rng: StdRng,
    games: HashMap<Uuid, Table>,
    history: Vec<GameResult>,
}

impl Default for GameService {
    fn default() -> Self {
        Self::new(None)
    }
}

impl GameService {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            games: HashMap::new(),
            history: Vec::new(),
        }
    }

    pub fn active_games(&self) -> usize {
        self.games.len()
    }

    fn table(&self, game_id: Uuid) -> Result<&Table, ServiceError> {
        self.games
            .get(&game_id)
            .ok_or(ServiceError::UnknownGame(game_id))
    }

    fn table_mut(&mut self, game_id: Uuid) -> Result<&mut Table, ServiceError> {
        self.games
            .get_mut(&game_id)
            .ok_or(ServiceError::UnknownGame(game_id))
    }

    /// Seat the players, draw for the first dealer and archive the previous game
    pub fn start_game(&mut self, req: StartGameRequest) -> Result<StartGameResponse, ServiceError> {
        if let Some(previous) = req.previous_game {
            match self.archive(previous) {
                Ok(result) => debug!("archived {} before starting over", result.game_id),
                Err(_) => warn!("previous game {} was not found", previous),
            }
        }

        let rng = StdRng::seed_from_u64(self.rng.gen());
        let (table, draw) = Table::start(rng);
        let game_id = Uuid::new_v4();
        self.games.insert(game_id, table);
        info!("started game {}, {} deals first", game_id, draw.dealer);

        Ok(StartGameResponse::new(game_id, draw, SEATS.to_vec()))
    }

    pub fn deal_hand(&mut self, game_id: Uuid) -> Result<DealResponse, ServiceError> {
        let table = self.table_mut(game_id)?;
        table.deal()?;
        let message = format!("{} dealt the first hand", table.dealer());
        deal_response(table, message)
    }

    pub fn deal_next_hand(&mut self, game_id: Uuid) -> Result<DealResponse, ServiceError> {
        let table = self.table_mut(game_id)?;
        table.deal_next_hand()?;
        let message = format!("{} is the new dealer", table.dealer());
        deal_response(table, message)
    }

    pub fn pick_trump(&self, game_id: Uuid) -> Result<BiddingStatus, ServiceError> {
        let table = self.table(game_id)?;
        let wrong_phase = || TableError::WrongPhase(table.phase());
        Ok(BiddingStatus {
            round: table.bid_round().ok_or_else(wrong_phase)?,
            up_card: table.up_card().ok_or_else(wrong_phase)?,
            to_act: table.to_act().ok_or_else(wrong_phase)?,
            player_order: table.bidding_order().to_vec(),
        })
    }

    /// The human orders up in round one or names a suit in round two
    pub fn accept_trump(&mut self, req: AcceptTrumpRequest) -> Result<BidResponse, ServiceError> {
        let table = self.table_mut(req.game_id)?;
        let current = table
            .bid_round()
            .ok_or(TableError::WrongPhase(table.phase()))?;
        if current != req.trump_round {
            return Err(TableError::WrongBidRound(req.trump_round).into());
        }

        let bid = match req.trump_round {
            BidRound::One => table.order_up(HUMAN, req.going_alone)?,
            BidRound::Two => {
                let suit = req.suit.ok_or_else(|| {
                    ServiceError::BadRequest("a suit is needed in the second round".to_string())
                })?;
                table.call_suit(HUMAN, suit, req.going_alone)?
            }
        };
        Ok(bid_response(table, bid))
    }

    pub fn pass_trump(&mut self, game_id: Uuid) -> Result<BidResponse, ServiceError> {
        let table = self.table_mut(game_id)?;
        let bid = table.pass(HUMAN)?;
        Ok(bid_response(table, bid))
    }

    /// Let the bot in `req.player` bid
    pub fn determine_trump(
        &mut self,
        req: DetermineTrumpRequest,
    ) -> Result<BidResponse, ServiceError> {
        let table = self.table_mut(req.game_id)?;
        let bid = table.bot_bid(req.player)?;
        Ok(bid_response(table, bid))
    }

    pub fn init_trick(&self, game_id: Uuid) -> Result<InitTrickResponse, ServiceError> {
        Ok(self.table(game_id)?.init_trick()?)
    }

    pub fn play_player_card(
        &mut self,
        req: PlayPlayerCardRequest,
    ) -> Result<PlayCardResponse, ServiceError> {
        let table = self.table_mut(req.game_id)?;
        let played = table.play_card(HUMAN, req.card)?;
        Ok(play_response(table, played))
    }

    pub fn play_bot_card(
        &mut self,
        req: PlayBotCardRequest,
    ) -> Result<PlayCardResponse, ServiceError> {
        let table = self.table_mut(req.game_id)?;
        let played = table.bot_play(req.bot)?;
        Ok(play_response(table, played))
    }

    pub fn resolve_trick(&mut self, game_id: Uuid) -> Result<ResolveTrickResponse, ServiceError> {
        Ok(self.table_mut(game_id)?.resolve_trick()?)
    }

    pub fn finalize_round(&mut self, game_id: Uuid) -> Result<FinalizeRoundResponse, ServiceError> {
        let table = self.table_mut(game_id)?;
        let mut result = table.finalize_round()?;
        // the discard is only revealed to a human dealer
        if table.dealer() != HUMAN {
            result.discard = None;
        }
        Ok(result)
    }

    pub fn reset_game(&mut self, game_id: Uuid) -> Result<ResetGameResponse, ServiceError> {
        let result = self.archive(game_id)?;
        Ok(ResetGameResponse {
            message: format!("game {} archived after {} hands", game_id, result.total_hands),
            result,
        })
    }

    pub fn remaining_cards(&self, game_id: Uuid) -> Result<RemainingCardsResponse, ServiceError> {
        Ok(RemainingCardsResponse {
            remaining_cards: self.table(game_id)?.remaining_cards(HUMAN),
        })
    }

    pub fn score(&self, game_id: Uuid) -> Result<ScoreResponse, ServiceError> {
        Ok(self.table(game_id)?.score().into())
    }

    pub fn view(&self, game_id: Uuid) -> Result<GameView, ServiceError> {
        Ok(self.table(game_id)?.view(HUMAN))
    }

    pub fn history(&self) -> GameHistoryResponse {
        GameHistoryResponse {
            games: self.history.clone(),
        }
    }

    fn archive(&mut self, game_id: Uuid) -> Result<GameResult, ServiceError> {
        let table = self
            .games
            .remove(&game_id)
            .ok_or(ServiceError::UnknownGame(game_id))?;
        let result = GameResult::new(game_id, table.winner(), table.hands_played(), table.score());
        info!(
            "archived game {} after {} hands, score {:?}",
            game_id, result.total_hands, result.points
        );
        self.history.push(result.clone());
        Ok(result)
    }
}

fn deal_response(table: &Table, message: String) -> Result<DealResponse, ServiceError> {
    let view = table.view(HUMAN);
    let up_card = view
        .up_card
        .ok_or(TableError::WrongPhase(table.phase()))?;
    Ok(DealResponse {
        hand: view.hand,
        hand_sizes: view.hand_sizes,
        up_card,
        dealer: view.dealer,
        player_order: table
            .bidding_order()
            .into_iter()
            .map(|name| SeatInfo {
                name,
                is_human: name == HUMAN,
            })
            .collect(),
        message,
    })
}

fn bid_response(table: &Table, bid: Bid) -> BidResponse {
    let view = table.view(HUMAN);
    BidResponse {
        bid,
        next_to_act: view.bid_round.and(view.to_act),
        round: view.bid_round,
        trump: view.trump,
        hand: view.hand,
    }
}

fn play_response(table: &Table, played_card: PlayedCard) -> PlayCardResponse {
    PlayCardResponse {
        played_card,
        current_trick: table.current_trick().to_vec(),
        next_to_play: table.to_act(),
        player_hand: table.hand(HUMAN).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use euchre::{cards::SUIT_ORDER, rules::legal_cards, table::Phase};

    use super::*;

    fn started(service: &mut GameService) -> Uuid {
        let game_id = service
            .start_game(StartGameRequest::default())
            .unwrap()
            .game_id;
        service.deal_hand(game_id).unwrap();
        game_id
    }

    /// Bid for whoever is up, the human passes unless stuck as the dealer
    fn finish_bidding(service: &mut GameService, game_id: Uuid) {
        while let Ok(status) = service.pick_trump(game_id) {
            if status.to_act != HUMAN {
                service
                    .determine_trump(DetermineTrumpRequest::new(game_id, status.to_act))
                    .unwrap();
            } else if status.round == BidRound::Two && service.view(game_id).unwrap().dealer == HUMAN {
                let up = status.up_card.suit();
                let suit = SUIT_ORDER.into_iter().find(|s| *s != up);
                service
                    .accept_trump(AcceptTrumpRequest::new(game_id, BidRound::Two, suit, false))
                    .unwrap();
            } else {
                service.pass_trump(game_id).unwrap();
            }
        }
    }

    #[test]
    fn test_unknown_game() {
        let mut service = GameService::new(Some(0));
        let id = Uuid::new_v4();
        assert!(matches!(
            service.deal_hand(id),
            Err(ServiceError::UnknownGame(g)) if g == id
        ));
        assert!(matches!(service.score(id), Err(ServiceError::UnknownGame(_))));
    }

    #[test]
    fn test_start_game_archives_previous() {
        let mut service = GameService::new(Some(1));
        let first = started(&mut service);
        let second = service
            .start_game(StartGameRequest::new(Some(first)))
            .unwrap();

        assert_ne!(first, second.game_id);
        assert_eq!(service.active_games(), 1);
        let history = service.history();
        assert_eq!(history.games.len(), 1);
        assert_eq!(history.games[0].game_id, first);
        assert_eq!(history.games[0].winner, None);
        assert!(second.highest_card.is_black_jack());
        assert_eq!(second.dealt_cards.last().unwrap().seat, second.dealer);
    }

    #[test]
    fn test_abandoned_games_stay_active() {
        let mut service = GameService::new(Some(5));
        let first = started(&mut service);
        let second = started(&mut service);

        // only a reset or a start naming the game archives it
        assert_eq!(service.active_games(), 2);
        assert!(service.history().games.is_empty());
        assert!(service.score(first).is_ok());

        service.reset_game(second).unwrap();
        assert_eq!(service.active_games(), 1);
        assert_eq!(service.history().games.len(), 1);
    }

    #[test]
    fn test_deal_hand_only_once() {
        let mut service = GameService::new(Some(2));
        let game_id = started(&mut service);
        assert!(matches!(
            service.deal_hand(game_id),
            Err(ServiceError::Table(TableError::WrongPhase(Phase::Bidding)))
        ));

        let view = service.view(game_id).unwrap();
        assert_eq!(view.hand.len(), 5);
        assert_eq!(view.hand_sizes, [5; 4]);
    }

    #[test]
    fn test_accept_trump_checks_round_and_suit() {
        let mut service = GameService::new(Some(3));
        let game_id = started(&mut service);
        let status = service.pick_trump(game_id).unwrap();
        assert_eq!(status.round, BidRound::One);

        let wrong_round = AcceptTrumpRequest::new(game_id, BidRound::Two, None, false);
        assert!(matches!(
            service.accept_trump(wrong_round),
            Err(ServiceError::Table(TableError::WrongBidRound(BidRound::Two)))
        ));

        // the bot never bids for the human
        assert!(matches!(
            service.determine_trump(DetermineTrumpRequest::new(game_id, HUMAN)),
            Err(ServiceError::Table(TableError::NotABot(HUMAN)))
        ));
    }

    #[test]
    fn test_bid_response_tracks_turns() {
        let mut service = GameService::new(Some(4));
        let game_id = started(&mut service);
        let status = service.pick_trump(game_id).unwrap();

        let resp = if status.to_act == HUMAN {
            service.pass_trump(game_id).unwrap()
        } else {
            service
                .determine_trump(DetermineTrumpRequest::new(game_id, status.to_act))
                .unwrap()
        };
        assert_eq!(resp.bid.seat, status.to_act);
        match resp.trump {
            Some(t) => {
                assert_eq!(resp.next_to_act, None);
                assert_eq!(t.maker, status.to_act);
            }
            None => assert_eq!(resp.next_to_act, Some(status.to_act.next())),
        }
    }

    #[test]
    fn test_plays_a_hand() {
        let mut service = GameService::new(Some(5));
        let game_id = started(&mut service);
        finish_bidding(&mut service, game_id);

        for number in 1..=5 {
            let start = service.init_trick(game_id).unwrap();
            assert_eq!(start.number, number);
            for seat in start.play_order.iter().copied() {
                let resp = if seat == HUMAN {
                    let view = service.view(game_id).unwrap();
                    let lead = view.current_trick.first().map(|p| p.card);
                    let trump = view.trump.unwrap().trump;
                    let card = legal_cards(&view.hand, lead, trump)[0];
                    service
                        .play_player_card(PlayPlayerCardRequest::new(game_id, card))
                        .unwrap()
                } else {
                    service
                        .play_bot_card(PlayBotCardRequest::new(game_id, seat))
                        .unwrap()
                };
                assert_eq!(resp.played_card.seat, seat);
            }
            let result = service.resolve_trick(game_id).unwrap();
            assert_eq!(result.round_complete, number == 5);
        }

        let round = service.finalize_round(game_id).unwrap();
        assert_eq!(round.kitty.len(), 4);
        let score = service.score(game_id).unwrap();
        assert_eq!([score.team1, score.team2], round.score);

        let reset = service.reset_game(game_id).unwrap();
        assert_eq!(reset.result.total_hands, 1);
        assert_eq!(service.active_games(), 0);
    }
}

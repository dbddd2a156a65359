//! Sequences the server calls for a game: bidding, tricks, scoring and the
//! next deal. Bots are paced with sleeps, the human with prompts.

use std::time::Duration;

use anyhow::Context;
use client_server_messages::{BidResponse, DealResponse, PlayCardResponse, TeamPoints};
use euchre::{
    bot::BidRound,
    cards::{Suit, SUIT_ORDER},
    rules::legal_cards,
    Seat, Team,
};
use log::{debug, info};
use tokio::time::sleep;
use uuid::Uuid;

use crate::{
    api::{ApiError, EuchreApi},
    input::{BidPrompt, HumanBid, HumanInput},
    render,
    state::TableState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Before each bot bids or plays
    pub bot_delay: Duration,
    /// After the last card of a trick
    pub trick_pause: Duration,
    /// Before the hand is scored
    pub round_pause: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            bot_delay: Duration::from_millis(600),
            trick_pause: Duration::from_millis(900),
            round_pause: Duration::from_millis(1200),
        }
    }
}

impl Pacing {
    pub fn none() -> Self {
        Self {
            bot_delay: Duration::ZERO,
            trick_pause: Duration::ZERO,
            round_pause: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    pub game_id: Uuid,
    pub winner: Team,
    pub score: TeamPoints,
    pub hands: usize,
}

pub struct Orchestrator<A, H> {
    api: A,
    human: H,
    pacing: Pacing,
    state: TableState,
    quiet: bool,
}

impl<A: EuchreApi, H: HumanInput> Orchestrator<A, H> {
    pub fn new(api: A, human: H, pacing: Pacing) -> Self {
        Self {
            api,
            human,
            pacing,
            state: TableState::default(),
            quiet: false,
        }
    }

    /// Stop printing the table to stdout
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn human(&self) -> &H {
        &self.human
    }

    fn show(&self, line: impl AsRef<str>) {
        if !self.quiet {
            println!("{}", line.as_ref());
        }
    }

    fn game_id(&self) -> anyhow::Result<Uuid> {
        self.state.game_id.context("no game has been started")
    }

    /// Play games until the human stops, archiving each one
    pub async fn run(&mut self) -> anyhow::Result<Vec<GameOutcome>> {
        let mut outcomes = Vec::new();
        let mut previous = None;
        loop {
            let outcome = self.play_game(previous).await?;
            let score = self.api.game_score(outcome.game_id).await?;
            self.show(format!(
                "Final score after {} hands: {} {} - {} {}",
                outcome.hands,
                Team::Team1,
                score.team1,
                Team::Team2,
                score.team2
            ));
            previous = Some(outcome.game_id);
            outcomes.push(outcome);

            if !self.human.play_again().await? {
                let reset = self.api.reset_game(self.game_id()?).await?;
                info!("{}", reset.message);
                return Ok(outcomes);
            }
        }
    }

    /// One game from the draw for dealer until a team reaches the winning score
    pub async fn play_game(&mut self, previous: Option<Uuid>) -> anyhow::Result<GameOutcome> {
        let start = self.api.start_game(previous).await?;
        self.state.on_start(&start);
        self.show(render::dealer_draw(&start));

        let deal = self.api.deal_hand(start.game_id).await?;
        self.on_deal(&deal);

        loop {
            self.bidding().await?;
            self.play_hand().await?;

            sleep(self.pacing.round_pause).await;
            let round = self.api.finalize_round(start.game_id).await?;
            self.state.on_round(&round);
            self.show(render::kitty(&self.state));
            self.show(render::round(&round));

            if let Some(winner) = round.winner {
                return Ok(GameOutcome {
                    game_id: start.game_id,
                    winner,
                    score: self.state.score,
                    hands: self.state.hands_played,
                });
            }

            let deal = self.api.deal_next_hand(start.game_id).await?;
            self.on_deal(&deal);
        }
    }

    fn on_deal(&mut self, deal: &DealResponse) {
        self.state.on_deal(deal);
        self.show(&deal.message);
        self.show(format!("{} is up", deal.up_card));
        self.show(render::kitty(&self.state));
    }

    async fn bidding(&mut self) -> anyhow::Result<()> {
        let game_id = self.game_id()?;
        while let Some(seat) = self.state.to_bid() {
            let resp = if seat.is_human {
                self.human_bid(game_id).await?
            } else {
                sleep(self.pacing.bot_delay).await;
                self.api.determine_trump(game_id, seat.name).await?
            };

            self.show(render::bid(&resp.bid));
            let round = self.state.bid_round;
            self.state.on_bid(&resp);
            if let Some(trump) = resp.trump {
                self.show(render::trump(&trump));
            } else if self.state.bid_round != round {
                self.show("Everyone passed, the up card is turned down");
                self.show(render::kitty(&self.state));
            }
        }
        Ok(())
    }

    async fn human_bid(&mut self, game_id: Uuid) -> anyhow::Result<BidResponse> {
        let round = self.state.bid_round.context("bidding is over")?;
        let up_card = self.state.up_card.context("no up card")?;
        let prompt = BidPrompt {
            round,
            up_card,
            hand: self.state.hand.clone(),
            suits: match round {
                BidRound::One => Vec::new(),
                BidRound::Two => SUIT_ORDER
                    .into_iter()
                    .filter(|s| *s != up_card.suit())
                    .collect::<Vec<Suit>>(),
            },
            must_call: round == BidRound::Two && self.state.dealer == Some(Seat::Player),
        };

        loop {
            let bid = self.human.bid(&prompt).await?;
            let result = match bid {
                HumanBid::Pass => self.api.pass_trump(game_id).await,
                HumanBid::Call { suit, alone } => {
                    self.api.accept_trump(game_id, round, suit, alone).await
                }
            };
            match result {
                Err(ApiError::Rejected { message, .. }) => self.human.rejected(&message).await,
                other => return Ok(other?),
            }
        }
    }

    async fn play_hand(&mut self) -> anyhow::Result<()> {
        let game_id = self.game_id()?;
        let start = self.api.init_trick(game_id).await?;
        self.state.on_trick_start(&start);
        debug!("trick {} led by {}", start.number, start.leader);

        loop {
            while let Some(seat) = self.state.to_play() {
                let resp = if seat == Seat::Player {
                    self.human_card(game_id).await?
                } else {
                    sleep(self.pacing.bot_delay).await;
                    self.api.play_bot_card(game_id, seat).await?
                };
                self.show(render::played(&resp.played_card));
                self.state.on_card(&resp);
            }

            sleep(self.pacing.trick_pause).await;
            let result = self.api.resolve_trick(game_id).await?;
            self.state.on_trick_resolved(&result);
            self.show(render::trick(&result));
            if result.round_complete {
                return Ok(());
            }
            if !self.quiet {
                let unseen = self.api.remaining_cards(game_id).await?;
                self.show(render::unseen(&unseen.remaining_cards));
            }
        }
    }

    async fn human_card(&mut self, game_id: Uuid) -> anyhow::Result<PlayCardResponse> {
        let trump = self.state.trump.context("trump has not been made")?.trump;
        let lead = self.state.current_trick.first().map(|p| p.card);
        let playable = legal_cards(&self.state.hand, lead, trump);

        loop {
            let card = self.human.card(&self.state.hand, &playable).await?;
            match self.api.play_player_card(game_id, card).await {
                Err(ApiError::Rejected { message, .. }) => self.human.rejected(&message).await,
                other => return Ok(other?),
            }
        }
    }
}

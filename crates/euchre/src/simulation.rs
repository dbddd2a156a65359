//! Monte Carlo runs of bot-only hands, used to tune the bidding thresholds.
//!
//! The dealer is always `Seat::Opponent2`, so the bidding order is the seat
//! order and every seat keeps the same position from hand to hand.

use std::{collections::BTreeMap, fmt::Display};

use itertools::Itertools;
use log::{debug, info};
use rand::{rngs::StdRng, seq::SliceRandom, thread_rng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    bot::{score_breakdown, BidRound, HandScore, TrumpDecision},
    cards::{Card, CardSet, Suit, CARDS},
    rules::CARDS_PER_HAND,
    table::{Phase, Table, TableError},
    trace::{FinalTally, HandTrace, ScenarioTrace, TraceError, TraceWriter, TrickTrace},
    Seat, Team, NUM_PLAYERS, SEATS,
};

pub const SIM_DEALER: Seat = Seat::Opponent2;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Trace(#[from] TraceError),
}

/// Decision forced on the controlled seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ForcedAction {
    Pass,
    OrderUp,
    Next,
    Reverse1,
    Reverse2,
}

impl ForcedAction {
    fn allowed_in(&self, round: BidRound) -> bool {
        match self {
            ForcedAction::Pass => true,
            ForcedAction::OrderUp => round == BidRound::One,
            _ => round == BidRound::Two,
        }
    }

    /// Suit named by the action, `None` for a pass
    pub fn suit(&self, up_card: Card) -> Option<Suit> {
        let up = up_card.suit();
        let [reverse1, reverse2] = up.reverse_suits();
        match self {
            ForcedAction::Pass => None,
            ForcedAction::OrderUp => Some(up),
            ForcedAction::Next => Some(up.same_color()),
            ForcedAction::Reverse1 => Some(reverse1),
            ForcedAction::Reverse2 => Some(reverse2),
        }
    }

    fn label(&self, round: BidRound, up_card: Option<Card>) -> String {
        let name = match self {
            ForcedAction::Pass => "pass",
            ForcedAction::OrderUp => "order_up",
            ForcedAction::Next => "next",
            ForcedAction::Reverse1 => "reverse1",
            ForcedAction::Reverse2 => "reverse2",
        };
        match (round, up_card.and_then(|c| self.suit(c))) {
            (BidRound::Two, Some(suit)) => format!("R2 {} ({})", name, suit),
            _ => format!("R{} {}", round.number(), name),
        }
    }
}

/// A forced bidding decision to measure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub controlled: Seat,
    pub round: BidRound,
    pub action: ForcedAction,
    #[serde(default)]
    pub alone: bool,
    /// Fixed hand for the controlled seat, random when `None`
    #[serde(default)]
    pub hand: Option<Vec<Card>>,
    #[serde(default)]
    pub up_card: Option<Card>,
    /// Card the first leader plays if they hold it
    #[serde(default)]
    pub forced_lead: Option<Card>,
}

impl Scenario {
    fn validate(&self) -> Result<(), SimulationError> {
        if !self.action.allowed_in(self.round) {
            return Err(SimulationError::InvalidScenario(format!(
                "{:?} is not a round {} decision",
                self.action,
                self.round.number()
            )));
        }

        if let Some(hand) = &self.hand {
            let unique: CardSet = hand.iter().copied().collect();
            if hand.len() != CARDS_PER_HAND || unique.len() != CARDS_PER_HAND {
                return Err(SimulationError::InvalidScenario(
                    "controlled hand must have exactly 5 distinct cards".to_string(),
                ));
            }
            if let Some(up) = self.up_card.filter(|c| unique.contains(*c)) {
                return Err(SimulationError::InvalidScenario(format!(
                    "up card {} is also in the controlled hand",
                    up
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForcedEv {
    /// Net points for the controlled team, averaged over deals where the
    /// forced decision was reached
    pub ev: f64,
    pub positive_turns: usize,
    pub applied: usize,
    pub requested: usize,
}

impl ForcedEv {
    pub fn positive_rate(&self) -> f64 {
        if self.applied == 0 {
            0.0
        } else {
            self.positive_turns as f64 / self.applied as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForcedEvRow {
    pub scenario: String,
    pub result: ForcedEv,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForcedEvTable {
    pub controlled: Seat,
    pub hands: usize,
    pub up_card: Option<Card>,
    pub alone: bool,
    /// Sorted by EV, best first
    pub rows: Vec<ForcedEvRow>,
}

impl Display for ForcedEvTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self
            .rows
            .iter()
            .map(|r| r.scenario.chars().count())
            .max()
            .unwrap_or(0)
            .clamp(12, 48);

        writeln!(f, "Forced EV table")?;
        writeln!(f, "===============")?;
        writeln!(
            f,
            "controlled={}, sims={}, up_card={}, alone={}",
            self.controlled,
            self.hands,
            self.up_card.map_or("random".to_string(), |c| c.to_string()),
            self.alone
        )?;
        writeln!(f)?;
        let header = format!(
            "{:<width$} {:>10} {:>10} {:>9}",
            "scenario", "EV", "applied", "pos_rate"
        );
        writeln!(f, "{}", header)?;
        writeln!(f, "{}", "-".repeat(header.len()))?;
        for r in &self.rows {
            let mut label = r.scenario.clone();
            if label.chars().count() > width {
                label = label.chars().take(width - 1).collect::<String>() + "…";
            }
            writeln!(
                f,
                "{:<width$} {:>10.4} {:>10} {:>8.2}%",
                label,
                r.result.ev,
                r.result.applied,
                r.result.positive_rate() * 100.0
            )?;
        }
        Ok(())
    }
}

/// Counts from [`Simulator::run`], seat arrays are indexed by `Seat::index`
/// and team arrays by `Team::index`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulationStats {
    pub hands: usize,
    pub calls: [[usize; NUM_PLAYERS]; 2],
    pub loners: [[usize; NUM_PLAYERS]; 2],
    pub team_calls: [usize; 2],
    pub team_wins: [usize; 2],
    pub team_marches: [usize; 2],
    pub loner_attempts: [usize; 2],
    pub loner_wins: [usize; 2],
    pub points: [usize; 2],
}

fn percent(count: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| count as f64 / total as f64 * 100.0)
}

impl SimulationStats {
    pub fn call_rate(&self, round: BidRound, seat: Seat) -> f64 {
        percent(self.calls[round.number() as usize - 1][seat.index()], self.hands).unwrap_or(0.0)
    }

    pub fn total_call_rate(&self, seat: Seat) -> f64 {
        percent(
            self.calls[0][seat.index()] + self.calls[1][seat.index()],
            self.hands,
        )
        .unwrap_or(0.0)
    }

    pub fn loner_rate(&self, round: BidRound, seat: Seat) -> f64 {
        percent(self.loners[round.number() as usize - 1][seat.index()], self.hands).unwrap_or(0.0)
    }

    /// How often a team scored more than the other when it called trump
    pub fn win_rate(&self, team: Team) -> Option<f64> {
        percent(self.team_wins[team.index()], self.team_calls[team.index()])
    }

    pub fn march_rate(&self, team: Team) -> Option<f64> {
        percent(self.team_marches[team.index()], self.team_calls[team.index()])
    }

    pub fn loner_success_rate(&self, team: Team) -> Option<f64> {
        percent(self.loner_wins[team.index()], self.loner_attempts[team.index()])
    }

    pub fn total_loner_success_rate(&self) -> Option<f64> {
        percent(
            self.loner_wins.iter().sum(),
            self.loner_attempts.iter().sum(),
        )
    }

    pub fn points_per_hand(&self, team: Team) -> f64 {
        if self.hands == 0 {
            return 0.0;
        }
        self.points[team.index()] as f64 / self.hands as f64
    }
}

impl Display for SimulationStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let n = self.hands;
        write_seat_rates(f, n, "Round 1 call rates", |s| {
            self.call_rate(BidRound::One, s)
        })?;
        write_seat_rates(f, n, "Round 2 call rates", |s| {
            self.call_rate(BidRound::Two, s)
        })?;
        write_seat_rates(f, n, "Total call rates", |s| self.total_call_rate(s))?;
        write_seat_rates(f, n, "Loner rates in round 1", |s| {
            self.loner_rate(BidRound::One, s)
        })?;
        write_seat_rates(f, n, "Loner rates in round 2", |s| {
            self.loner_rate(BidRound::Two, s)
        })?;
        write_seat_rates(f, n, "Total loner rates", |s| {
            self.loner_rate(BidRound::One, s) + self.loner_rate(BidRound::Two, s)
        })?;

        for team in [Team::Team1, Team::Team2] {
            writeln!(
                f,
                "{} calls: {}, wins: {}, win rate {:.2}%",
                team,
                self.team_calls[team.index()],
                self.team_wins[team.index()],
                self.win_rate(team).unwrap_or(0.0)
            )?;
        }
        for team in [Team::Team1, Team::Team2] {
            writeln!(
                f,
                "{} points per hand: {:.4}",
                team,
                self.points_per_hand(team)
            )?;
        }
        for team in [Team::Team1, Team::Team2] {
            if let Some(rate) = self.march_rate(team).filter(|_| self.team_marches[team.index()] > 0) {
                writeln!(f, "{} marches: {:.2}%", team, rate)?;
            }
        }
        for team in [Team::Team1, Team::Team2] {
            if let Some(rate) = self.loner_success_rate(team) {
                writeln!(f, "{} loner success rate: {:.2}%", team, rate)?;
            }
        }
        if let Some(rate) = self.total_loner_success_rate() {
            writeln!(f, "Total loner success rate: {:.2}%", rate)?;
        }
        Ok(())
    }
}

fn write_seat_rates(
    f: &mut std::fmt::Formatter<'_>,
    hands: usize,
    title: &str,
    rate: impl Fn(Seat) -> f64,
) -> std::fmt::Result {
    writeln!(f, "{} after {} simulations:", title, hands)?;
    for s in SEATS {
        writeln!(f, "  {}: {:.2}%", s, rate(s))?;
    }
    Ok(())
}

/// Score breakdown of a hand, for every suit unless one is given
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandScoreReport {
    pub hand: Vec<Card>,
    pub scores: Vec<(Suit, HandScore)>,
}

pub fn hand_score(hand: &[Card], trump: Option<Suit>) -> HandScoreReport {
    let suits = match trump {
        Some(t) => vec![t],
        None => vec![Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades],
    };
    HandScoreReport {
        hand: hand.to_vec(),
        scores: suits
            .into_iter()
            .map(|s| (s, score_breakdown(hand, s)))
            .collect(),
    }
}

impl Display for HandScoreReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Scoring hand: {}", self.hand.iter().join(", "))?;
        writeln!(f, "---------------")?;
        for (suit, score) in &self.scores {
            writeln!(f, "{}:", suit)?;
            writeln!(f, "  Trump Score: {:.3} * 0.7 = {:.3}", score.trump, score.trump * 0.7)?;
            writeln!(f, "  Aces Score: {:.3} * 0.2 = {:.3}", score.aces, score.aces * 0.2)?;
            writeln!(f, "  Voids Score: {:.3} * 0.1 = {:.3}", score.voids, score.voids * 0.1)?;
            writeln!(f, "  Total Score: {:.3}", score.total)?;
        }
        Ok(())
    }
}

struct Override {
    seat: Seat,
    round: BidRound,
    action: ForcedAction,
    alone: bool,
}

enum Bidding {
    Called,
    /// A forced pass left nobody to name trump
    NoTrump,
}

pub struct Simulator {
    rng: StdRng,
    trace: TraceWriter,
}

impl Simulator {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| thread_rng().gen());
        info!("simulator seed: {}", seed);
        Self {
            rng: StdRng::seed_from_u64(seed),
            trace: TraceWriter::disabled(),
        }
    }

    pub fn with_trace(mut self, trace: TraceWriter) -> Self {
        self.trace = trace;
        self
    }

    fn new_table(&mut self) -> Table {
        Table::all_bots(StdRng::seed_from_u64(self.rng.gen()), SIM_DEALER)
    }

    /// Play `hands` random deals with bots in every seat
    pub fn run(&mut self, hands: usize) -> Result<SimulationStats, SimulationError> {
        let mut stats = SimulationStats {
            hands,
            ..Default::default()
        };

        for sim_idx in 0..hands {
            let mut table = self.new_table();
            table.deal()?;

            let mut trace = self
                .trace
                .enabled()
                .then(|| HandTrace::new(sim_idx, SIM_DEALER, table.up_card()));

            bid(&mut table, None)?;
            let summary = table.trump().ok_or(TableError::WrongPhase(table.phase()))?;
            let round = summary.round.number() as usize - 1;
            stats.calls[round][summary.maker.index()] += 1;
            if summary.alone {
                stats.loners[round][summary.maker.index()] += 1;
            }

            play_out(&mut table, None, trace.as_mut())?;
            let result = table.finalize_round()?;
            let team = summary.maker.team().index();
            let (ours, theirs) = (result.points[team], result.points[1 - team]);

            stats.team_calls[team] += 1;
            if summary.alone {
                stats.loner_attempts[team] += 1;
                if ours == 4 {
                    stats.loner_wins[team] += 1;
                }
            }
            if ours > theirs {
                stats.team_wins[team] += 1;
                if ours == 2 {
                    stats.team_marches[team] += 1;
                }
            }
            for (total, p) in stats.points.iter_mut().zip(result.points) {
                *total += p as usize;
            }

            if let Some(t) = trace.as_mut() {
                t.bids = table.bids().to_vec();
                t.trump_selection = table.trump();
                t.tally = Some(FinalTally {
                    tricks_won: result.tricks_won,
                    points: result.points,
                });
                self.trace.log_hand(t)?;
            }
        }

        self.trace.flush()?;
        Ok(stats)
    }

    /// Expected net points for the controlled team when its seat is forced to
    /// make `scenario`'s decision
    pub fn forced_ev(
        &mut self,
        scenario: &Scenario,
        hands: usize,
    ) -> Result<ForcedEv, SimulationError> {
        scenario.validate()?;

        let team = scenario.controlled.team().index();
        let over = Override {
            seat: scenario.controlled,
            round: scenario.round,
            action: scenario.action,
            alone: scenario.alone,
        };

        let mut total = 0i64;
        let mut applied = 0;
        let mut positive_turns = 0;

        for sim_idx in 0..hands {
            let (dealt, kitty) = self.scenario_deal(scenario);
            let mut table = self.new_table();
            table.deal_from(dealt, kitty)?;

            let (reached, outcome) = bid(&mut table, Some(&over))?;
            if !reached {
                continue;
            }
            applied += 1;

            let mut trace = self.trace.enabled().then(|| {
                let mut t = HandTrace::new(sim_idx, SIM_DEALER, table.up_card());
                t.scenario = Some(ScenarioTrace {
                    controlled: scenario.controlled,
                    controlled_team: scenario.controlled.team(),
                    forced_round: scenario.round,
                    forced_action: scenario.action,
                    forced_alone: scenario.alone,
                    forced_lead: scenario.forced_lead,
                    forced_lead_applied: false,
                });
                t.bids = table.bids().to_vec();
                t
            });

            if let Bidding::NoTrump = outcome {
                if let Some(t) = trace.as_mut() {
                    t.note = Some("no trump called".to_string());
                    t.net_ev = Some(0);
                    self.trace.log_hand(t)?;
                }
                continue;
            }

            let lead_applied = play_out(&mut table, scenario.forced_lead, trace.as_mut())?;
            let result = table.finalize_round()?;
            let net = result.points[team] as i32 - result.points[1 - team] as i32;
            total += net as i64;
            if net > 0 {
                positive_turns += 1;
            }

            if let Some(t) = trace.as_mut() {
                t.trump_selection = table.trump();
                t.tally = Some(FinalTally {
                    tricks_won: result.tricks_won,
                    points: result.points,
                });
                t.net_ev = Some(net);
                if let Some(s) = t.scenario.as_mut() {
                    s.forced_lead_applied = lead_applied;
                }
                self.trace.log_hand(t)?;
            }
        }

        self.trace.flush()?;
        let ev = if applied > 0 {
            total as f64 / applied as f64
        } else {
            0.0
        };
        debug!(
            "{:?} in round {}: ev {:.4} over {} of {} deals",
            scenario.action,
            scenario.round.number(),
            ev,
            applied,
            hands
        );

        Ok(ForcedEv {
            ev,
            positive_turns,
            applied,
            requested: hands,
        })
    }

    /// Run every forced decision for the controlled seat and sort them by EV
    pub fn forced_ev_table(
        &mut self,
        base: &Scenario,
        hands: usize,
        include_round_two: bool,
    ) -> Result<ForcedEvTable, SimulationError> {
        let mut decisions = vec![
            (BidRound::One, ForcedAction::Pass),
            (BidRound::One, ForcedAction::OrderUp),
        ];
        if include_round_two {
            decisions.extend(
                [
                    ForcedAction::Pass,
                    ForcedAction::Next,
                    ForcedAction::Reverse1,
                    ForcedAction::Reverse2,
                ]
                .map(|a| (BidRound::Two, a)),
            );
        }

        let mut rows = Vec::new();
        for (round, action) in decisions {
            let scenario = Scenario {
                round,
                action,
                ..base.clone()
            };
            let result = self.forced_ev(&scenario, hands)?;
            rows.push(ForcedEvRow {
                scenario: action.label(round, base.up_card),
                result,
            });
        }
        rows.sort_by(|a, b| b.result.ev.total_cmp(&a.result.ev));

        Ok(ForcedEvTable {
            controlled: base.controlled,
            hands,
            up_card: base.up_card,
            alone: base.alone,
            rows,
        })
    }

    /// Random deal around the fixed cards of a scenario
    fn scenario_deal(&mut self, scenario: &Scenario) -> ([Vec<Card>; NUM_PLAYERS], Vec<Card>) {
        let fixed: CardSet = scenario
            .hand
            .iter()
            .flatten()
            .chain(scenario.up_card.iter())
            .copied()
            .collect();

        let mut deck = CARDS
            .iter()
            .copied()
            .filter(|c| !fixed.contains(*c))
            .collect_vec();
        deck.shuffle(&mut self.rng);

        let mut hands: [Vec<Card>; NUM_PLAYERS] = Default::default();
        if let Some(h) = &scenario.hand {
            hands[scenario.controlled.index()] = h.clone();
        }
        for seat in SEATS {
            if hands[seat.index()].is_empty() {
                hands[seat.index()] = deck.drain(..CARDS_PER_HAND).collect();
            }
        }

        let mut kitty = scenario.up_card.into_iter().collect_vec();
        kitty.extend(deck.drain(..));
        (hands, kitty)
    }
}

/// Run bidding with bots, forcing one seat's decision if requested. Returns
/// whether the forced seat was reached.
fn bid(table: &mut Table, over: Option<&Override>) -> Result<(bool, Bidding), SimulationError> {
    let mut reached = false;

    while table.phase() == Phase::Bidding {
        let seat = table.to_act().ok_or(TableError::WrongPhase(table.phase()))?;
        let round = table.bid_round().unwrap_or(BidRound::One);

        let forced = over.filter(|o| o.seat == seat && o.round == round);
        let decision = match (forced, table.up_card()) {
            (Some(o), Some(up)) => {
                reached = true;
                match o.action.suit(up) {
                    Some(suit) => TrumpDecision::call(suit, o.alone),
                    None => TrumpDecision::pass(),
                }
            }
            _ => table.bot_decision(seat)?,
        };

        if decision.call.is_none() && round == BidRound::Two && seat == table.dealer() {
            return Ok((reached, Bidding::NoTrump));
        }
        table.apply_decision(seat, decision)?;
    }

    Ok((reached, Bidding::Called))
}

/// Play all five tricks with bots. The first leader plays `forced_lead` if
/// they hold it; returns whether they did.
fn play_out(
    table: &mut Table,
    forced_lead: Option<Card>,
    mut trace: Option<&mut HandTrace>,
) -> Result<bool, SimulationError> {
    let mut lead_applied = false;

    if let Some(t) = trace.as_deref_mut() {
        t.initial_play_order = table.play_order();
        t.initial_hands = hands_snapshot(table);
    }

    if let (Some(card), Some(leader)) = (forced_lead, table.to_act()) {
        if table.hand(leader).contains(&card) {
            table.play_card(leader, card)?;
            lead_applied = true;
        }
    }

    while table.phase() == Phase::Playing {
        while let Some(seat) = table.to_act() {
            table.bot_play(seat)?;
        }
        let result = table.resolve_trick()?;

        if let Some(t) = trace.as_deref_mut() {
            t.tricks.push(TrickTrace {
                trick: result.number,
                lead_player: result.plays[0].seat,
                plays: result.plays.clone(),
                winner: result.winner,
                tricks_won: result.tricks_won,
                hands_after: hands_snapshot(table),
            });
        }
    }

    debug!("hand finished with tricks {:?}", table.tricks_won());
    Ok(lead_applied)
}

fn hands_snapshot(table: &Table) -> BTreeMap<Seat, Vec<Card>> {
    SEATS
        .iter()
        .filter(|s| Some(**s) != table.sitting_out())
        .map(|s| (*s, table.hand(*s).to_vec()))
        .collect()
}

use anyhow::{bail, Context};
use clap::Args;
use euchre::{
    bot::BidRound,
    cards::Card,
    simulation::{ForcedAction, Scenario, Simulator},
    Seat,
};
use log::info;
use serde::Deserialize;

fn default_hands() -> usize {
    10000
}

fn default_controlled() -> Seat {
    Seat::Player
}

#[derive(Args, Clone, Debug, Deserialize)]
pub struct ForcedEvArgs {
    #[clap(short = 'n', long, default_value_t = 10000)]
    #[serde(default = "default_hands")]
    pub hands: usize,
    #[clap(long, value_enum, default_value_t = Seat::Player)]
    #[serde(default = "default_controlled")]
    pub controlled: Seat,
    /// Comma separated cards for the controlled seat, e.g. "Js,Ks,Jh,Td,9d"
    #[clap(long)]
    #[serde(default)]
    pub hand: Option<String>,
    #[clap(long)]
    #[serde(default)]
    pub up_card: Option<Card>,
    #[clap(long, default_value_t = false)]
    #[serde(default)]
    pub alone: bool,
    /// Card the first leader plays if they hold it
    #[clap(long)]
    #[serde(default)]
    pub lead: Option<Card>,
    /// Only measure this bidding round (1 or 2), needs `action`
    #[clap(long)]
    #[serde(default)]
    pub round: Option<u8>,
    #[clap(long, value_enum)]
    #[serde(default)]
    pub action: Option<ForcedAction>,
    /// Leave the round two decisions out of the table
    #[clap(long, default_value_t = false)]
    #[serde(default)]
    pub no_round_two: bool,
}

pub fn parse_hand(s: &str) -> anyhow::Result<Vec<Card>> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|c| !c.is_empty())
        .map(|c| c.parse::<Card>().with_context(|| format!("bad card in hand: {}", s)))
        .collect()
}

fn parse_round(round: u8) -> anyhow::Result<BidRound> {
    BidRound::try_from(round).map_err(anyhow::Error::msg)
}

pub fn run_forced_ev(sim: &mut Simulator, args: &ForcedEvArgs) -> anyhow::Result<()> {
    let hand = args.hand.as_deref().map(parse_hand).transpose()?;
    let mut scenario = Scenario {
        controlled: args.controlled,
        round: BidRound::One,
        action: ForcedAction::Pass,
        alone: args.alone,
        hand,
        up_card: args.up_card,
        forced_lead: args.lead,
    };

    match (args.round, args.action) {
        (Some(round), Some(action)) => {
            scenario.round = parse_round(round)?;
            scenario.action = action;
            info!("forcing {:?} for {}", action, args.controlled);
            let result = sim.forced_ev(&scenario, args.hands)?;
            println!(
                "EV {:.4} over {} of {} deals, {:.2}% positive",
                result.ev,
                result.applied,
                result.requested,
                result.positive_rate() * 100.0
            );
        }
        (None, None) => {
            let table = sim.forced_ev_table(&scenario, args.hands, !args.no_round_two)?;
            print!("{}", table);
        }
        _ => bail!("round and action must be given together"),
    }

    Ok(())
}

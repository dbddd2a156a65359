use async_trait::async_trait;
use dialoguer::{Confirm, Select};
use euchre::{
    bot::BidRound,
    cards::{Card, Suit},
};
use itertools::Itertools;

/// What the human is asked when it's their turn to bid
#[derive(Debug, Clone)]
pub struct BidPrompt {
    pub round: BidRound,
    pub up_card: Card,
    pub hand: Vec<Card>,
    /// Suits that can be named, only in round two
    pub suits: Vec<Suit>,
    /// Dealer in round two can't pass
    pub must_call: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumanBid {
    Pass,
    /// Order up in round one, name `suit` in round two
    Call { suit: Option<Suit>, alone: bool },
}

#[async_trait]
pub trait HumanInput: Send {
    async fn bid(&mut self, prompt: &BidPrompt) -> anyhow::Result<HumanBid>;

    /// Pick a card to play. `playable` is a subset of `hand`.
    async fn card(&mut self, hand: &[Card], playable: &[Card]) -> anyhow::Result<Card>;

    /// Called when the server refuses the last choice
    async fn rejected(&mut self, message: &str);

    async fn play_again(&mut self) -> anyhow::Result<bool>;
}

/// Prompts on the terminal
#[derive(Debug, Default)]
pub struct TerminalInput;

#[async_trait]
impl HumanInput for TerminalInput {
    async fn bid(&mut self, prompt: &BidPrompt) -> anyhow::Result<HumanBid> {
        let hand = prompt.hand.iter().join(" ");
        let mut options: Vec<(String, HumanBid)> = Vec::new();
        if !prompt.must_call {
            options.push(("Pass".to_string(), HumanBid::Pass));
        }
        match prompt.round {
            BidRound::One => options.push((
                format!("Order up {}", prompt.up_card),
                HumanBid::Call {
                    suit: None,
                    alone: false,
                },
            )),
            BidRound::Two => {
                for suit in &prompt.suits {
                    options.push((
                        format!("Name {}", suit),
                        HumanBid::Call {
                            suit: Some(*suit),
                            alone: false,
                        },
                    ));
                }
            }
        }

        let labels: Vec<&str> = options.iter().map(|(l, _)| l.as_str()).collect();
        let choice = Select::new()
            .with_prompt(format!("Your hand: {}. {} is up", hand, prompt.up_card))
            .items(&labels)
            .default(0)
            .interact()?;

        match options[choice].1 {
            HumanBid::Call { suit, .. } => {
                let alone = Confirm::new()
                    .with_prompt("Go alone?")
                    .default(false)
                    .interact()?;
                Ok(HumanBid::Call { suit, alone })
            }
            HumanBid::Pass => Ok(HumanBid::Pass),
        }
    }

    async fn card(&mut self, hand: &[Card], playable: &[Card]) -> anyhow::Result<Card> {
        let labels: Vec<String> = playable.iter().map(|c| c.to_string()).collect();
        let choice = Select::new()
            .with_prompt(format!("Your hand: {}. Play", hand.iter().join(" ")))
            .items(&labels)
            .default(0)
            .interact()?;
        Ok(playable[choice])
    }

    async fn rejected(&mut self, message: &str) {
        println!("Not allowed: {}", message);
    }

    async fn play_again(&mut self) -> anyhow::Result<bool> {
        Ok(Confirm::new()
            .with_prompt("Play another game?")
            .default(true)
            .interact()?)
    }
}

//! Plain text for the terminal.

use client_server_messages::{FinalizeRoundResponse, ResolveTrickResponse, StartGameResponse};
use euchre::{
    cards::{Card, SUIT_ORDER},
    rules::PlayedCard,
    table::{Bid, TrumpSummary},
    Team,
};
use itertools::Itertools;

use crate::state::{KittySlot, TableState};

fn slot(s: &KittySlot) -> String {
    match (s.face_up, s.card) {
        (true, Some(c)) => c.to_string(),
        (false, Some(c)) => format!("({})", c),
        _ => "[]".to_string(),
    }
}

pub fn dealer_draw(resp: &StartGameResponse) -> String {
    let draws = resp
        .dealt_cards
        .iter()
        .map(|p| format!("{} {}", p.seat, p.card))
        .join(", ");
    format!(
        "Dealing for the deal: {}\n{} deals with {}",
        draws, resp.dealer, resp.highest_card
    )
}

pub fn kitty(state: &TableState) -> String {
    format!("Kitty: {}", state.kitty.iter().map(slot).join(" "))
}

pub fn bid(bid: &Bid) -> String {
    match bid.call {
        None => format!("{} passes", bid.seat),
        Some(suit) if bid.alone => format!("{} calls {} and goes alone", bid.seat, suit),
        Some(suit) => format!("{} calls {}", bid.seat, suit),
    }
}

pub fn trump(t: &TrumpSummary) -> String {
    let mut line = format!("{} is trump, made by {}", t.trump, t.maker);
    if let Some(out) = t.sitting_out {
        line.push_str(&format!(", {} sits out", out));
    }
    if let Some(d) = t.discard {
        line.push_str(&format!(", you discarded {}", d));
    }
    line
}

/// Cards the human hasn't seen, grouped by suit
pub fn unseen(cards: &[Card]) -> String {
    let by_suit = SUIT_ORDER
        .iter()
        .map(|suit| {
            cards
                .iter()
                .filter(|c| c.suit() == *suit)
                .sorted_by_key(|c| std::cmp::Reverse(c.rank()))
                .join(" ")
        })
        .filter(|s| !s.is_empty())
        .join(" | ");
    format!("Unseen: {}", by_suit)
}

pub fn played(p: &PlayedCard) -> String {
    format!("{} plays {}", p.seat, p.card)
}

pub fn trick(resp: &ResolveTrickResponse) -> String {
    format!(
        "Trick {}: {} -> {} takes it. Tricks {} to {}",
        resp.number,
        resp.plays.iter().map(|p| p.card).join(" "),
        resp.winner,
        resp.tricks_won[Team::Team1.index()],
        resp.tricks_won[Team::Team2.index()],
    )
}

pub fn round(resp: &FinalizeRoundResponse) -> String {
    let scorer = if resp.points[Team::Team1.index()] > 0 {
        Team::Team1
    } else {
        Team::Team2
    };
    let mut out = format!(
        "{} scores {}. {} {} - {} {}",
        scorer,
        resp.points[scorer.index()],
        Team::Team1,
        resp.score[Team::Team1.index()],
        Team::Team2,
        resp.score[Team::Team2.index()],
    );
    if let Some(w) = resp.winner {
        out.push_str(&format!("\n{} wins the game!", w));
    }
    out
}

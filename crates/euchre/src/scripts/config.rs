use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use euchre::{
    simulation::Simulator,
    trace::{TraceConfig, TraceWriter},
};
use log::info;
use serde::Deserialize;

use super::forced_ev::{run_forced_ev, ForcedEvArgs};

#[derive(Deserialize, Debug)]
struct Config {
    #[serde(default)]
    trace: TraceConfig,
    profiles: HashMap<String, ForcedEvArgs>,
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    let toml_str = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    Ok(toml::from_str(&toml_str)?)
}

/// Run a forced EV profile. A trace given on the command line replaces the
/// config file's trace settings.
pub fn run_profile(
    path: &Path,
    profile: &str,
    seed: Option<u64>,
    trace: Option<TraceConfig>,
) -> anyhow::Result<()> {
    info!("starting profile: {}", profile);
    let config = load_config(path)?;
    let args = config.profiles.get(profile).context("profile not found")?;

    let trace = TraceWriter::new(trace.unwrap_or(config.trace))?;
    let mut sim = Simulator::new(seed).with_trace(trace);
    run_forced_ev(&mut sim, args)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use euchre::{cards::Card, Seat};

    use super::*;

    #[test]
    fn test_load_profiles() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[trace]
enabled = true
path = "traces/bower.jsonl"

[profiles.bower]
hands = 500
controlled = "Team Mate"
hand = "Js,Ks,Jh,Td,9d"
up_card = "9c"
lead = "9d"

[profiles.random]
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert!(config.trace.enabled);
        assert!(!config.trace.flush_each_hand);

        let bower = &config.profiles["bower"];
        assert_eq!(bower.hands, 500);
        assert_eq!(bower.controlled, Seat::TeamMate);
        assert_eq!(bower.up_card, Some(Card::NC));
        assert_eq!(bower.lead, Some(Card::ND));

        let random = &config.profiles["random"];
        assert_eq!(random.hands, 10000);
        assert_eq!(random.controlled, Seat::Player);
        assert_eq!(random.hand, None);
    }

    #[test]
    fn test_missing_profile() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[profiles.only]\nhands = 1\n").unwrap();
        let err = run_profile(file.path(), "other", Some(0), None).unwrap_err();
        assert_eq!(err.to_string(), "profile not found");
    }
}

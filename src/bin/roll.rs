//! roll - Command-line dice roller
//!
//! Rolls dice notation, advantage/disadvantage and DC checks through the same
//! engine the combat session uses, and can print the roll log afterwards.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skirmish::Config;

/// Dice roller
#[derive(Parser, Debug)]
#[command(name = "roll", version, about = "Roll dice (e.g. 2d6+3, d20)")]
struct Args {
    /// Dice notation to roll (can be specified multiple times)
    notations: Vec<String>,

    /// Roll 2d20 and keep the higher
    #[arg(long, conflicts_with = "disadvantage")]
    advantage: bool,

    /// Roll 2d20 and keep the lower
    #[arg(long)]
    disadvantage: bool,

    /// Roll 1d20 + modifier against this difficulty class
    #[arg(long, allow_negative_numbers = true)]
    dc: Option<i32>,

    /// Modifier for the DC check
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    modifier: i32,

    /// Seed for reproducible rolls
    #[arg(long)]
    seed: Option<u64>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the roll log after rolling
    #[arg(long)]
    history: bool,

    /// Print rolls as JSON records
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skirmish=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    if args.notations.is_empty() && !args.advantage && !args.disadvantage && args.dc.is_none() {
        bail!("nothing to roll: pass dice notation, --advantage, --disadvantage or --dc");
    }

    let mut config = Config::load(args.config.as_deref())
        .with_context(|| "failed to load configuration")?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let dice = config.dice();

    for notation in &args.notations {
        let total = dice
            .parse(notation)
            .with_context(|| format!("cannot roll {:?}", notation))?;
        if !args.json {
            let faces = dice.last_roll().map(|r| r.dice).unwrap_or_default();
            println!("{}: {} {:?}", notation.trim(), total, faces);
        }
    }

    if args.advantage {
        let total = dice.roll_with_advantage();
        if !args.json {
            println!("advantage: {}", total);
        }
    }
    if args.disadvantage {
        let total = dice.roll_with_disadvantage();
        if !args.json {
            println!("disadvantage: {}", total);
        }
    }

    if let Some(dc) = args.dc {
        let check = dice.check(args.modifier, dc);
        if !args.json {
            println!(
                "check: {}{:+}={} vs DC {}: {}",
                check.natural,
                check.modifier,
                check.total,
                check.dc,
                if check.success { "success" } else { "failure" }
            );
        }
    }

    if args.json {
        for record in dice.recent_rolls(dice.history_size()) {
            println!("{}", serde_json::to_string(&record)?);
        }
    } else if args.history {
        println!("-- roll log ({} of {} kept)", dice.history_size(), dice.history_capacity());
        for record in dice.recent_rolls(dice.history_size()) {
            println!(
                "#{:<4} {} {:<28} = {:>4} {:?}",
                record.sequence,
                record.timestamp.format("%H:%M:%S%.3f"),
                record.formula,
                record.result,
                record.dice
            );
        }
    }

    Ok(())
}

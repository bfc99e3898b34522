//! skirmish - run one encounter against monsters from the bestiary
//!
//! The player character is driven by a simple autopilot: attack the first
//! listed target, or flee once HP drops to `--flee-at`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skirmish::combat::{AttackReport, CombatSession, Outcome};
use skirmish::{Bestiary, Combatant, Config, Dice, Monster, MonsterTemplate, PlayerCharacter};

/// Turn-based combat simulator
#[derive(Parser, Debug)]
#[command(name = "skirmish", version, about = "Simulate a turn-based encounter")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for reproducible rolls (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Monster to fight, as NAME or NAMExCOUNT (repeatable)
    #[arg(short, long = "monster", default_value = "goblin")]
    monsters: Vec<String>,

    /// Roll each monster's HP from its hit dice instead of using the fixed value
    #[arg(long)]
    rolled_hp: bool,

    /// List the bestiary and exit
    #[arg(long)]
    list_monsters: bool,

    /// Emit one JSON outcome per line
    #[arg(long)]
    json: bool,

    /// Player character name
    #[arg(long, default_value = "Hero")]
    name: String,

    /// Player maximum HP
    #[arg(long, default_value_t = 20)]
    hp: u32,

    /// Player armor class
    #[arg(long, default_value_t = 15)]
    ac: i32,

    /// Player attack bonus
    #[arg(long, default_value_t = 5)]
    attack_bonus: i32,

    /// Player damage dice
    #[arg(long, default_value = "1d8+3")]
    damage: String,

    /// Player initiative modifier
    #[arg(long, default_value_t = 2)]
    initiative: i32,

    /// Flee once HP is at or below this value
    #[arg(long)]
    flee_at: Option<u32>,
}

/// Upper bound on engine calls before giving up on a fight
const MAX_STEPS: usize = 10_000;

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
    let bestiary = Bestiary::standard();

    if args.list_monsters {
        for name in bestiary.names() {
            if let Some(t) = bestiary.get(name) {
                println!(
                    "{:<10} HP {:>3}  AC {:>2}  {:+} to hit  {:<7} CR {}",
                    t.name, t.hit_points, t.armor_class, t.attack_bonus, t.damage, t.challenge_rating
                );
            }
        }
        return Ok(());
    }

    let mut config = Config::load(args.config.as_deref())
        .with_context(|| "failed to load configuration")?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let dice = Arc::new(config.dice());
    let enemies = spawn_monsters(
        &bestiary,
        &args.monsters,
        args.rolled_hp.then_some(dice.as_ref()),
    )?;
    let mut player = PlayerCharacter::new(args.name.clone(), args.hp)
        .with_armor_class(args.ac)
        .with_attack_bonus(args.attack_bonus)
        .with_damage(args.damage.clone())
        .with_initiative_modifier(args.initiative);

    let mut session = CombatSession::new(dice.clone()).with_rules(config.rules);
    info!("session {} seed {:?}", session.id(), config.seed);

    let outcome = session.start_combat(&mut player, enemies);
    emit(&outcome, args.json)?;
    if let Outcome::Error { message, .. } = &outcome {
        bail!("cannot start combat: {}", message);
    }

    let mut steps = 0;
    while !session.is_resolved() {
        steps += 1;
        if steps > MAX_STEPS {
            bail!("combat did not finish within {} steps", MAX_STEPS);
        }

        let outcome = session.execute_turn();
        emit(&outcome, args.json)?;

        if let Outcome::TurnStart { hp, targets, .. } = &outcome {
            let reply = match args.flee_at {
                Some(limit) if *hp <= limit => session.player_turn("flee", None),
                _ => session.player_turn("attack", targets.first().map(String::as_str)),
            };
            emit(&reply, args.json)?;
            if let Outcome::Error { message, .. } = &reply {
                bail!("autopilot action rejected: {}", message);
            }
        } else if let Outcome::Error { message, .. } = &outcome {
            bail!("combat stalled: {}", message);
        }
    }

    let status = session.status();
    let rounds = session.round();
    drop(session);

    if !args.json {
        println!(
            "{} after {} round(s): {} has {}/{} HP and {} XP ({} rolls logged)",
            status,
            rounds,
            player.name(),
            player.current_hp(),
            player.max_hp(),
            player.experience(),
            dice.history_size()
        );
    }

    Ok(())
}

/// Expand `NAME` / `NAMExCOUNT` arguments into monsters
///
/// Repeats of the same monster are merged into one numbered group so every
/// monster keeps a unique name.
fn spawn_monsters(
    bestiary: &Bestiary,
    specs: &[String],
    rolled_hp: Option<&Dice>,
) -> Result<Vec<Monster>> {
    let mut groups: Vec<(&MonsterTemplate, usize)> = Vec::new();
    for spec in specs {
        let (name, count) = match spec.rsplit_once(|c| c == 'x' || c == 'X') {
            Some((name, n)) if !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()) => {
                let count: usize = n
                    .parse()
                    .with_context(|| format!("bad monster count in {:?}", spec))?;
                (name, count)
            }
            _ => (spec.as_str(), 1),
        };
        if count == 0 {
            bail!("monster count must be at least 1: {:?}", spec);
        }

        let template = bestiary.get(name).ok_or_else(|| {
            anyhow::anyhow!(
                "unknown monster {:?} (known: {})",
                name,
                bestiary.names().join(", ")
            )
        })?;
        match groups.iter_mut().find(|(t, _)| t.name == template.name) {
            Some((_, total)) => *total += count,
            None => groups.push((template, count)),
        }
    }

    let mut enemies = Vec::new();
    for (template, count) in groups {
        match rolled_hp {
            Some(dice) => enemies.extend(
                template
                    .spawn_group_rolled(count, dice)
                    .with_context(|| format!("cannot roll hit dice for {}", template.name))?,
            ),
            None => enemies.extend(template.spawn_group(count)),
        }
    }
    Ok(enemies)
}

fn emit(outcome: &Outcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(outcome)?);
    } else {
        println!("{}", render(outcome));
    }
    Ok(())
}

fn render(outcome: &Outcome) -> String {
    match outcome {
        Outcome::CombatStart {
            turn_order, first, ..
        } => {
            let order: Vec<String> = turn_order
                .iter()
                .map(|e| format!("{} ({}{:+}={})", e.name, e.roll, e.modifier, e.total))
                .collect();
            format!("Combat begins! Turn order: {}. {} goes first.", order.join(", "), first)
        }
        Outcome::TurnStart {
            actor,
            round,
            hp,
            max_hp,
            targets,
        } => format!(
            "-- Round {}: {}'s turn ({}/{} HP). Targets: {}",
            round,
            actor,
            hp,
            max_hp,
            targets.join(", ")
        ),
        Outcome::AttackHit { attack } | Outcome::AttackMiss { attack } => render_attack(attack),
        Outcome::EnemyDefeated {
            attack,
            xp,
            remaining,
        } => format!(
            "{} {} is defeated! (+{} XP, {} remaining)",
            render_attack(attack),
            attack.defender,
            xp,
            remaining
        ),
        Outcome::PlayerDefeated { attack, round } => format!(
            "{} {} has fallen in round {}.",
            render_attack(attack),
            attack.defender,
            round
        ),
        Outcome::Victory {
            xp,
            xp_each,
            defeated,
            survivors,
            rounds,
        } => format!(
            "Victory in {} round(s)! Defeated {}. {} XP total, {} each to {}.",
            rounds,
            defeated.join(", "),
            xp,
            xp_each,
            survivors.join(", ")
        ),
        Outcome::Fled { message, .. } => message.clone(),
        Outcome::Info { message } => message.clone(),
        Outcome::Error { message, .. } => format!("error: {}", message),
    }
}

fn render_attack(attack: &AttackReport) -> String {
    let mut line = format!(
        "{} attacks {}: {}{:+}={} vs AC {}",
        attack.attacker,
        attack.defender,
        attack.natural,
        attack.attack_bonus,
        attack.total,
        attack.target_ac
    );
    if attack.critical {
        line.push_str(" (natural 20)");
    } else if attack.fumble {
        line.push_str(" (natural 1)");
    }
    if attack.hit {
        line.push_str(&format!(
            ", hit for {} ({} HP left).",
            attack.damage, attack.defender_hp
        ));
    } else {
        line.push_str(", miss.");
    }
    line
}

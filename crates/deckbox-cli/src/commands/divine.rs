//! Divination command: draw a combination (or a single card) from the deck.

use clap::Args;
use deckbox_core::{Config, Deck, DivinationOutcome, TimeRange};
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;

use crate::output::{print_json, print_result, ResultView};

#[derive(Args)]
pub struct DivineArgs {
    /// Lower bound of the total time in minutes
    #[arg(long)]
    min: Option<u32>,
    /// Upper bound of the total time in minutes
    #[arg(long)]
    max: Option<u32>,
    /// Draw one card instead of a combination
    #[arg(long, conflicts_with_all = ["min", "max"])]
    single: bool,
    /// Seed for a reproducible draw
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    json: bool,
}

pub fn run(args: DivineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let defaults = config.range();
    let range = TimeRange::new(
        args.min.unwrap_or(defaults.min_minutes),
        args.max.unwrap_or(defaults.max_minutes),
    );
    if !range.is_valid() {
        return Err(format!(
            "--min ({}) must not exceed --max ({})",
            range.min_minutes, range.max_minutes
        )
        .into());
    }

    let mut rng = match args.seed.or(config.divination.seed) {
        Some(seed) => {
            tracing::debug!(seed, "using seeded rng");
            Mcg128Xsl64::seed_from_u64(seed)
        }
        None => Mcg128Xsl64::from_entropy(),
    };

    let deck = Deck::open()?;
    let result = if args.single {
        deck.divine_single(&mut rng)?
    } else {
        deck.divine(range, &mut rng)?
    };

    let Some(result) = result else {
        if args.json {
            println!("null");
        } else {
            println!("No suitable combination found among the available cards.");
        }
        return Ok(());
    };

    if args.json {
        return print_json(&ResultView::from(&result));
    }
    print_result(&result);
    if result.outcome == DivinationOutcome::BestEffort {
        println!();
        println!(
            "note: no combination fit {}-{} min; this is the closest one found",
            range.min_minutes, range.max_minutes
        );
    }
    Ok(())
}

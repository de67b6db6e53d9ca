use clap::Args;
use deckbox_core::Deck;

use crate::output::{print_json, print_result, ResultView};

#[derive(Args)]
pub struct HistoryArgs {
    /// Only the most recent divination
    #[arg(long)]
    last: bool,
    #[arg(long)]
    json: bool,
}

pub fn run(args: HistoryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let deck = Deck::open()?;
    let mut history = deck.history()?;
    if args.last {
        history = history.pop().into_iter().collect();
    }

    if args.json {
        let views: Vec<ResultView> = history.iter().map(ResultView::from).collect();
        return if args.last {
            print_json(&views.first())
        } else {
            print_json(&views)
        };
    }

    if history.is_empty() {
        println!("No divinations yet.");
        return Ok(());
    }
    for (i, result) in history.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_result(result);
    }
    Ok(())
}

// Engine plays a game against itself
//
// Run with `RUST_LOG=debug` to see the search progress. An optional argument sets the initial
// position in FEN.

use kibitzer::{
    search::DEFAULT_BALANCE, Color, Engine, ProgressReport, Rules, SearchConfig, Status,
};
use log::info;
use std::env;
use std::process;

const MAX_PLIES: usize = 300;
const MS_TIME: u64 = 60_000;
const MS_BUDGET: u64 = 1_000;

fn main() {
    env_logger::init();

    let rules = match env::args().nth(1) {
        Some(fen) => match Rules::from_fen(&fen) {
            Ok(rules) => rules,
            Err(e) => {
                eprintln!("Bad FEN: {}", e);
                process::exit(1);
            }
        },
        None => Rules::new(),
    };
    let mut engine = Engine::with_rules(rules, SearchConfig::default());

    let mut new_game = true;
    let mut notation = Vec::new();
    for _ in 0..MAX_PLIES {
        let pos = engine.rules().position().clone();
        match pos.status() {
            Status::Terminal(t) => {
                println!("Game finished: {}", t);
                break;
            }
            Status::Illegal => {
                println!("Illegal position");
                break;
            }
            Status::Ongoing => {}
        }
        if let Some(draw) = engine.rules().is_draw(pos.side()) {
            println!("Game finished: draw by {}", draw);
            break;
        }

        let mut progress = |r: &ProgressReport| {
            info!(
                "depth {} score {} pv {}",
                r.depth,
                r.score_cp,
                r.pv.iter().map(|m| m.terse()).collect::<Vec<_>>().join(" ")
            )
        };
        let outcome = match engine.calculate_next_move(
            new_game,
            MS_TIME,
            MS_BUDGET,
            DEFAULT_BALANCE,
            &mut progress,
        ) {
            Some(outcome) => outcome,
            None => break,
        };
        new_game = false;

        // The move comes from the legal moves list, so it always has a natural form.
        let text = outcome.best.natural(&pos).unwrap();
        if pos.side() == Color::White {
            notation.push(format!("{}. {}", pos.full_move_count(), text));
        } else {
            notation.push(text.clone());
        }
        println!(
            "{} ({} cp, depth {}, {} ms)",
            text,
            outcome.score_cp,
            outcome.depth,
            outcome.elapsed.as_millis()
        );
        engine.play_move(outcome.best);
    }

    println!();
    println!("{}", notation.join(" "));
    println!("{}", engine.rules().to_fen());
}

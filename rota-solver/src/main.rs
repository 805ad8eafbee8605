//! ROTA placement-phase enumerator
//!
//! Drives the enumeration engine in `rota-core` and reports on the result.

mod cli;
mod report;

use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rota_core::{Action, Board, Color, Enumerator, LegalActions, PlacementRules, Players};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, PieceColor};
use crate::report::{winner_label, Summary};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout can be piped as JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Enumerate {
            first,
            second,
            both_orders,
            list,
            json,
        } => run_enumerate(first, second, both_orders, list, json),
        Command::Show { board } => run_show(&board),
        Command::Verify => run_verify(),
    }
}

fn order_label(players: Players) -> String {
    format!("{}{}", players.first().symbol(), players.second().symbol())
}

fn run_enumerate(
    first: PieceColor,
    second: PieceColor,
    both_orders: bool,
    list: bool,
    json: bool,
) -> Result<()> {
    let players = Players::new(first.into(), second.into())
        .context("--first and --second must name different colors")?;

    let mut orders = vec![players];
    if both_orders {
        orders.push(players.swapped());
    }

    let start = Instant::now();
    let mut enumerator = Enumerator::new();
    for &order in &orders {
        enumerator.run(order)?;
    }
    let result = enumerator.finish();

    let labels = orders.into_iter().map(order_label).collect();
    let summary = Summary::new(&result, labels, start.elapsed(), list);

    if summary.collisions > 0 || summary.multi_member_classes > 0 {
        warn!(
            collisions = summary.collisions,
            multi_member_classes = summary.multi_member_classes,
            "enumeration produced anomalies"
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.print_summary();
    }
    Ok(())
}

fn run_show(notation: &str) -> Result<()> {
    let board: Board = notation
        .parse()
        .with_context(|| format!("invalid board {:?}", notation))?;

    println!("{}", board.render());
    println!();
    println!("Raw key:       {}", board.raw_key());
    println!("Canonical key: {}", board.canonical_key());
    println!("Pieces:        A={} B={}", board.count(Color::A), board.count(Color::B));
    println!("Winner:        {}", winner_label(board.terminal_state()));

    for color in Color::PLAYERS {
        let cells: Vec<String> = PlacementRules
            .legal_actions(&board, color)
            .into_iter()
            .map(|action| match action {
                Action::Place(cell) => cell.to_string(),
                Action::Move { from, to } => format!("{}-{}", from, to),
            })
            .collect();
        if cells.is_empty() {
            println!("{} places:      -", color.symbol());
        } else {
            println!("{} places:      {}", color.symbol(), cells.join(" "));
        }
    }
    Ok(())
}

fn run_verify() -> Result<()> {
    let start = Instant::now();
    let result = rota_core::enumerate_all()?;

    let violations = result.verify();
    let collisions = result.collisions().len();
    let multi = result.multi_member_classes();

    info!(
        classes = result.len(),
        violations,
        collisions,
        multi_member_classes = multi,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "verification finished"
    );

    for collision in result.collisions() {
        println!(
            "collision at {}: {} vs {}",
            collision.key, collision.existing, collision.candidate
        );
    }

    if violations > 0 || collisions > 0 || multi > 0 {
        bail!(
            "{} classes checked: {} violations, {} collisions, {} multi-member classes",
            result.len(),
            violations,
            collisions,
            multi
        );
    }

    println!("{} classes verified, digest {:016x}", result.len(), result.digest());
    Ok(())
}

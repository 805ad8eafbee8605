//! Enumeration summaries for the terminal and for JSON consumers.

use std::time::Duration;

use rota_core::{Board, Color, Enumeration, EquivalenceClass};
use serde::Serialize;

/// Per-depth counters, one row per placement depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepthRow {
    pub depth: usize,
    pub candidates: u64,
    pub new_classes: u64,
}

/// Class counts by winner of the representative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WinnerCounts {
    pub a: usize,
    pub b: usize,
    pub none: usize,
}

/// Everything `rota enumerate` reports about a run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Opening orders that were run, e.g. `["AB", "BA"]`
    pub orders: Vec<String>,
    pub classes: usize,
    pub candidates: u64,
    pub exact_duplicates: u64,
    pub rotation_duplicates: u64,
    pub collisions: u64,
    pub multi_member_classes: usize,
    pub winners: WinnerCounts,
    pub by_depth: Vec<DepthRow>,
    /// xxh64 fingerprint of the class table, hex
    pub digest: String,
    pub elapsed_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_list: Option<Vec<ClassRow>>,
}

/// One line of `--list` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassRow {
    pub key: String,
    pub board: Board,
    pub canonical: String,
    pub winner: String,
    pub members: usize,
}

/// "A", "B" or "none".
pub fn winner_label(winner: Option<Color>) -> String {
    match winner {
        Some(color) if color.is_piece() => color.symbol().to_string(),
        _ => "none".to_string(),
    }
}

impl ClassRow {
    pub fn new(class: &EquivalenceClass) -> Self {
        let rep = class.representative();
        ClassRow {
            key: class.key().to_string(),
            board: *rep,
            canonical: rep.canonical_key().to_string(),
            winner: winner_label(rep.terminal_state()),
            members: class.len(),
        }
    }
}

impl Summary {
    pub fn new(result: &Enumeration, orders: Vec<String>, elapsed: Duration, list: bool) -> Self {
        let stats = result.stats();
        let winners = result.winners();

        let by_depth = (1..stats.by_depth.len())
            .map(|depth| {
                let d = stats.depth(depth);
                DepthRow {
                    depth,
                    candidates: d.candidates,
                    new_classes: d.new_classes,
                }
            })
            .filter(|row| row.candidates > 0)
            .collect();

        Summary {
            orders,
            classes: result.len(),
            candidates: stats.candidates,
            exact_duplicates: stats.exact_duplicates,
            rotation_duplicates: stats.rotation_duplicates,
            collisions: stats.collisions,
            multi_member_classes: result.multi_member_classes(),
            winners: WinnerCounts {
                a: winners.a,
                b: winners.b,
                none: winners.undecided,
            },
            by_depth,
            digest: format!("{:016x}", result.digest()),
            elapsed_ms: elapsed.as_millis(),
            class_list: list.then(|| result.iter().map(ClassRow::new).collect()),
        }
    }

    /// Candidates per second over the whole run.
    pub fn rate(&self) -> f64 {
        if self.elapsed_ms > 0 {
            self.candidates as f64 * 1000.0 / self.elapsed_ms as f64
        } else {
            0.0
        }
    }

    /// Print the plain-text report.
    pub fn print_summary(&self) {
        println!("Orders: {}", self.orders.join(", "));
        println!("Classes: {}", self.classes);
        println!("Candidates: {}", self.candidates);
        println!("  - Exact duplicates: {}", self.exact_duplicates);
        println!("  - Rotation duplicates: {}", self.rotation_duplicates);
        println!("  - Key collisions: {}", self.collisions);
        println!("Multi-member classes: {}", self.multi_member_classes);
        println!(
            "Winners: A={} B={} none={}",
            self.winners.a, self.winners.b, self.winners.none
        );
        println!();
        println!("depth  candidates  new classes");
        for row in &self.by_depth {
            println!("{:>5}  {:>10}  {:>11}", row.depth, row.candidates, row.new_classes);
        }
        println!();
        println!("Digest: {}", self.digest);
        println!(
            "Time: {:.3}s ({:.0} candidates/sec)",
            self.elapsed_ms as f64 / 1000.0,
            self.rate()
        );

        if let Some(rows) = &self.class_list {
            println!();
            for row in rows {
                println!(
                    "{}  {}  canonical={}  winner={}",
                    row.key, row.board, row.canonical, row.winner
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_core::{Enumerator, Players};

    fn small() -> Enumeration {
        let players = Players::new(Color::A, Color::B).unwrap();
        let mut enumerator = Enumerator::new();
        enumerator
            .explore(players.center_start(), &players.center_sequence()[..2])
            .unwrap();
        enumerator.finish()
    }

    #[test]
    fn test_summary_counts() {
        let result = small();
        let summary = Summary::new(&result, vec!["AB".into()], Duration::from_millis(5), false);
        assert_eq!(summary.classes, result.len());
        assert_eq!(summary.candidates, 8 + 56);
        assert_eq!(summary.by_depth.len(), 2);
        assert_eq!(summary.by_depth[0].new_classes, 1);
        assert_eq!(summary.digest.len(), 16);
        assert!(summary.class_list.is_none());
    }

    #[test]
    fn test_summary_json() {
        let result = small();
        let summary = Summary::new(&result, vec!["AB".into()], Duration::ZERO, true);
        let json: serde_json::Value = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["classes"], result.len());
        assert_eq!(json["orders"][0], "AB");
        let rows = json["class_list"].as_array().unwrap();
        assert_eq!(rows.len(), result.len());
        assert_eq!(rows[0]["board"], "____A____");
        assert_eq!(rows[0]["key"], "0x10000");
    }

    #[test]
    fn test_list_omitted_from_json() {
        let summary = Summary::new(&small(), vec![], Duration::ZERO, false);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("class_list"));
    }

    #[test]
    fn test_winner_label() {
        assert_eq!(winner_label(Some(Color::A)), "A");
        assert_eq!(winner_label(Some(Color::B)), "B");
        assert_eq!(winner_label(None), "none");
    }
}

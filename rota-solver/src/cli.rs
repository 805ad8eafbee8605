//! Command-line interface for the `rota` driver.

use clap::{Parser, Subcommand, ValueEnum};
use rota_core::Color;

/// ROTA placement-phase enumerator
#[derive(Parser, Debug)]
#[command(name = "rota")]
#[command(about = "Enumerate ROTA placement-phase boards up to rotation", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Enumerate every placement-phase board and group rotations
    Enumerate {
        /// Color that moves first
        #[arg(long, value_enum, default_value = "a")]
        first: PieceColor,

        /// Color that moves second
        #[arg(long, value_enum, default_value = "b")]
        second: PieceColor,

        /// Also run with the colors swapped, into the same result
        #[arg(long)]
        both_orders: bool,

        /// Print one line per class
        #[arg(long)]
        list: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect a single board given in 9-character notation
    Show {
        /// Cells 1-4, center, 5-8 (e.g. "A___B___B")
        board: String,
    },

    /// Enumerate both orders and re-check every class
    Verify,
}

/// A piece color as typed on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PieceColor {
    A,
    B,
}

impl From<PieceColor> for Color {
    fn from(color: PieceColor) -> Color {
        match color {
            PieceColor::A => Color::A,
            PieceColor::B => Color::B,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerate_defaults() {
        let cli = Cli::try_parse_from(["rota", "enumerate"]).unwrap();
        match cli.command {
            Command::Enumerate {
                first,
                second,
                both_orders,
                list,
                json,
            } => {
                assert_eq!(first, PieceColor::A);
                assert_eq!(second, PieceColor::B);
                assert!(!both_orders && !list && !json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_enumerate_flags() {
        let cli = Cli::try_parse_from([
            "rota", "enumerate", "--first", "b", "--second", "a", "--both-orders", "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Enumerate {
                first,
                both_orders,
                json,
                ..
            } => {
                assert_eq!(Color::from(first), Color::B);
                assert!(both_orders);
                assert!(json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_show_requires_board() {
        assert!(Cli::try_parse_from(["rota", "show"]).is_err());
        let cli = Cli::try_parse_from(["rota", "show", "A___B___B"]).unwrap();
        assert!(matches!(cli.command, Command::Show { ref board } if board == "A___B___B"));
    }

    #[test]
    fn test_rejects_unknown_color() {
        assert!(Cli::try_parse_from(["rota", "enumerate", "--first", "c"]).is_err());
    }
}

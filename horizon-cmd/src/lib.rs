//! Command implementations for the horizon CLI.
//!
//! Each subcommand loads daily dam records from a directory of CSV files,
//! runs the weekly pipeline and writes or prints its results.

use clap::Subcommand;
use std::path::PathBuf;

pub mod args;
pub mod output;
pub mod policy;
pub mod source;
pub mod weekly;

use args::{DatasetArgs, QueryArgs};

#[derive(Subcommand)]
pub enum Command {
    /// Write the reconciled water-week series of a dam as CSV
    Weekly {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Dam key, `<source>_<dam>`
        #[arg(long)]
        dam: String,

        /// Output path for the weekly CSV
        #[arg(short = 'o', long)]
        out: PathBuf,
    },

    /// Write availability vs. release samples for a water week and horizon
    Availability {
        #[command(flatten)]
        dataset: DatasetArgs,

        #[command(flatten)]
        query: QueryArgs,

        /// Dam key, `<source>_<dam>`
        #[arg(long)]
        dam: String,

        /// Output path for the samples CSV
        #[arg(short = 'o', long)]
        out: PathBuf,
    },

    /// Fit a piecewise-linear release policy for each dam and print it as JSON
    Policy {
        #[command(flatten)]
        dataset: DatasetArgs,

        #[command(flatten)]
        query: QueryArgs,

        /// Dam keys, `<source>_<dam>`
        #[arg(long = "dam", required = true, num_args = 1..)]
        dams: Vec<String>,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Weekly { dataset, dam, out } => weekly::run_weekly(&dataset, &dam, &out),
        Command::Availability {
            dataset,
            query,
            dam,
            out,
        } => weekly::run_availability(&dataset, &query, &dam, &out),
        Command::Policy {
            dataset,
            query,
            dams,
        } => {
            policy::run_policy(dataset, query, dams).await?;
            Ok(())
        }
    }
}

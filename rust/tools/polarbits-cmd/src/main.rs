use anyhow::Result;
use clap::{Parser, Subcommand};
use polarbits::{BlockOp, EncodingFamily};

mod commands;
mod utils;

#[derive(Parser)]
#[command(name = "polarbits-cmd")]
#[command(about = "Command-line utility for building and combining polarbits vectors")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a vector from a position file and display its summary
    Stats {
        /// File with sorted, unique positions separated by whitespace
        #[arg(short, long)]
        file: String,

        /// Block encoding family (list or map)
        #[arg(long, default_value = "list")]
        family: EncodingFamily,
    },

    /// Combine two position files with a binary operator
    Eval {
        /// Left operand position file
        #[arg(long)]
        left: String,

        /// Right operand position file
        #[arg(long)]
        right: String,

        /// Operator: and, or, xor, nand, sub
        #[arg(long)]
        op: BlockOp,

        /// Complement the left operand before evaluating
        #[arg(long)]
        negate_left: bool,

        /// Complement the right operand before evaluating
        #[arg(long)]
        negate_right: bool,

        /// Block encoding family (list or map)
        #[arg(long, default_value = "list")]
        family: EncodingFamily,

        /// Only consider positions below this limit when printing
        #[arg(long)]
        limit: Option<u64>,

        /// Print the resulting positions
        #[arg(long)]
        print: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { file, family } => commands::stats::run(file, family),
        Commands::Eval {
            left,
            right,
            op,
            negate_left,
            negate_right,
            family,
            limit,
            print,
        } => commands::eval::run(commands::eval::EvalArgs {
            left,
            right,
            op,
            negate_left,
            negate_right,
            family,
            limit,
            print,
        }),
    }
}

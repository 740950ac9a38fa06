//! Eval command implementation

use anyhow::Result;
use polarbits::{BlockOp, EncodingFamily, Polarity, Vector};

use crate::utils::load_vector;

pub struct EvalArgs {
    pub left: String,
    pub right: String,
    pub op: BlockOp,
    pub negate_left: bool,
    pub negate_right: bool,
    pub family: EncodingFamily,
    pub limit: Option<u64>,
    pub print: bool,
}

pub fn run(args: EvalArgs) -> Result<()> {
    let left = operand(&args.left, args.negate_left, args.family)?;
    let right = operand(&args.right, args.negate_right, args.family)?;
    let result = left.binary(args.op, &right)?;

    println!("{:?} ({}): {result}", args.op, result.polarity());
    if args.print {
        print_positions(&result, args.limit)?;
    }
    Ok(())
}

fn operand(path: &str, negate: bool, family: EncodingFamily) -> Result<Vector> {
    let vector = load_vector(path, family)?;
    Ok(if negate { vector.not() } else { vector })
}

fn print_positions(vector: &Vector, limit: Option<u64>) -> Result<()> {
    let positions = match (limit, vector.polarity()) {
        (Some(limit), _) => vector.positions_until(limit),
        (None, Polarity::Unity) => vector.positions()?,
        (None, Polarity::Zero) => {
            anyhow::bail!("The result is unbounded; pass --limit to print its positions")
        }
    };
    for pos in positions {
        println!("{pos}");
    }
    Ok(())
}

//! Stats command implementation

use anyhow::Result;
use polarbits::EncodingFamily;

use crate::utils::{format_size, load_vector};

pub fn run(file: String, family: EncodingFamily) -> Result<()> {
    let vector = load_vector(&file, family)?;
    let stats = vector.compute_stats();

    println!("{vector}");
    println!("family: {}", stats.family);
    println!("heap size: {}", format_size(stats.heap_size));
    println!("blocks: {}", stats.block_count);
    for (name, count) in [
        ("full", stats.full_blocks),
        ("pos list", stats.pos_list_blocks),
        ("inv pos list", stats.inv_pos_list_blocks),
        ("bit map", stats.bit_map_blocks),
        ("zero map", stats.zero_map_blocks),
    ] {
        if count != 0 {
            println!("  {name}: {count}");
        }
    }
    Ok(())
}

//! Common utilities for polarbits-cmd

use std::path::Path;

use anyhow::{Context, Result};
use polarbits::{EncodingFamily, Vector, VectorOptions};

/// Checks if a file exists and is readable
pub fn validate_file_exists(path: &str) -> Result<()> {
    let file_path = Path::new(path);
    if !file_path.exists() {
        anyhow::bail!("File does not exist: {}", path);
    }
    if !file_path.is_file() {
        anyhow::bail!("Path is not a file: {}", path);
    }
    Ok(())
}

/// Parses whitespace-separated positions and checks that they are strictly
/// ascending.
pub fn parse_positions(text: &str) -> Result<Vec<u64>> {
    let mut positions = Vec::new();
    for (index, token) in text.split_whitespace().enumerate() {
        let pos: u64 = token
            .parse()
            .with_context(|| format!("Invalid position '{token}' at index {index}"))?;
        if let Some(&prev) = positions.last() {
            if pos <= prev {
                anyhow::bail!("Positions must be strictly ascending: {pos} follows {prev}");
            }
        }
        positions.push(pos);
    }
    Ok(positions)
}

/// Reads a position file.
pub fn read_positions(path: &str) -> Result<Vec<u64>> {
    validate_file_exists(path)?;
    let text =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    parse_positions(&text).with_context(|| format!("Failed to parse {path}"))
}

/// Builds a unity vector from a position file.
pub fn load_vector(path: &str, family: EncodingFamily) -> Result<Vector> {
    let positions = read_positions(path)?;
    let vector =
        Vector::from_sorted_slice_with_options(&positions, VectorOptions::with_family(family))?;
    Ok(vector)
}

/// Formats a byte count in human-readable form
pub fn format_size(size: usize) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

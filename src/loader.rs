//! Program loader: one hex-encoded instruction word per line. No ELF
//! parsing, no segments, no stack setup (Non-goals) — the file format
//! is the simulator's own, not an object-file standard.

use std::fs;
use std::path::Path;

use crate::error::SimulatorResult;

/// Read a program file into a flat list of instruction words.
///
/// Each non-blank line supplies one word, read as hexadecimal with an
/// optional leading `0x`. Anything after the first whitespace-delimited
/// token (a mnemonic comment, say) is ignored. A line that isn't valid
/// hex is skipped rather than rejected, matching the total-decoder
/// posture applied everywhere else in this simulator.
pub fn load_program(path: impl AsRef<Path>) -> SimulatorResult<Vec<u32>> {
    let text = fs::read_to_string(path)?;
    Ok(text
        .lines()
        .filter_map(|line| {
            let token = line.split_whitespace().next()?;
            let token = token.trim_start_matches("0x").trim_start_matches("0X");
            u32::from_str_radix(token, 16).ok()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_words_and_skips_blank_and_malformed_lines() {
        let mut path = std::env::temp_dir();
        path.push(format!("sim_loader_test_{}.txt", std::process::id()));
        fs::write(
            &path,
            "00500113\n\n0x003101b3 // add x3, x2, x3\nnot hex\n",
        )
        .unwrap();

        let words = load_program(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(words, vec![0x00500113, 0x003101b3]);
    }
}

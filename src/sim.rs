use std::path::Path;

use sim_lib::cli;
use sim_lib::error::SimulatorResult;
use sim_lib::loader;
use sim_lib::pipeline::Processor;

/// Forwarding is not a CLI flag (Open Question 2): this build always
/// runs with forwarding enabled. Flip and rebuild to compare against
/// the no-forwarding trace.
const FORWARDING_ENABLED: bool = true;
const VERBOSE: bool = false;

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> SimulatorResult<()> {
    let args = cli::parse(std::env::args())?;
    let program = loader::load_program(&args.program_path)?;

    let mut processor = Processor::new(program, args.cycles, FORWARDING_ENABLED, VERBOSE);
    processor.run(args.cycles);

    let suffix = if FORWARDING_ENABLED { "_forward_out" } else { "_noforward_out" };
    let input_path = Path::new(&args.program_path);
    let stem = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "sim".to_string());

    let disasm = processor.disassembly();
    let text_path = input_path.with_file_name(format!("{stem}{suffix}.txt"));
    std::fs::write(&text_path, processor.trace().to_plain_text(&disasm))?;

    let csv_path = input_path.with_file_name(format!("{stem}{suffix}.csv"));
    processor.trace().to_csv(&csv_path, &disasm)?;

    println!("wrote {} and {}", text_path.display(), csv_path.display());
    Ok(())
}

//! Trace Recorder (§4.8): a dense `[static instruction][cycle]` grid
//! of which pipeline stage, if any, held each static instruction on
//! each cycle.

use std::fmt;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageLabel {
    If,
    Id,
    Ex,
    Mem,
    Wb,
}

impl fmt::Display for StageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StageLabel::If => "IF",
            StageLabel::Id => "ID",
            StageLabel::Ex => "EX",
            StageLabel::Mem => "MEM",
            StageLabel::Wb => "WB",
        };
        f.write_str(s)
    }
}

/// `grid[instruction_index][cycle]` holds the stage that instruction
/// occupied during that cycle, or `None` if it wasn't in the pipeline.
pub struct TraceRecorder {
    instr_count: usize,
    cycles: usize,
    grid: Vec<Vec<Option<StageLabel>>>,
}

impl TraceRecorder {
    pub fn new(instr_count: usize, cycles: usize) -> Self {
        TraceRecorder { instr_count, cycles, grid: vec![vec![None; cycles]; instr_count] }
    }

    /// Record `stage` for the static instruction at `pc` during
    /// `cycle`. A `pc` beyond the loaded program, or a `cycle` beyond
    /// the configured budget, is a phantom fetch or an out-of-range
    /// entry; both are silently dropped rather than recorded (§4.8).
    pub fn record(&mut self, pc: u32, cycle: usize, stage: StageLabel) {
        let index = (pc / 4) as usize;
        if index >= self.instr_count || cycle >= self.cycles {
            return;
        }
        self.grid[index][cycle] = Some(stage);
    }

    /// Render as `disassembly;IF;ID;-;EX;...` rows, one per static
    /// instruction, columns in cycle order.
    pub fn to_plain_text(&self, disasm: &[String]) -> String {
        let mut out = String::new();
        for (index, row) in self.grid.iter().enumerate() {
            let mnemonic = disasm.get(index).map(String::as_str).unwrap_or("");
            out.push_str(mnemonic);
            for cell in row {
                out.push(';');
                match cell {
                    Some(stage) => out.push_str(&stage.to_string()),
                    None => out.push('-'),
                }
            }
            out.push('\n');
        }
        out
    }

    pub fn to_csv(&self, path: impl AsRef<Path>, disasm: &[String]) -> io::Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        let mut header = vec!["instruction".to_string()];
        header.extend((0..self.cycles).map(|c| format!("cycle{c}")));
        writer.write_record(&header)?;

        for (index, row) in self.grid.iter().enumerate() {
            let mnemonic = disasm.get(index).map(String::as_str).unwrap_or("").to_string();
            let mut record = vec![mnemonic];
            record.extend(row.iter().map(|cell| match cell {
                Some(stage) => stage.to_string(),
                None => "-".to_string(),
            }));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_within_bounds() {
        let mut recorder = TraceRecorder::new(2, 3);
        recorder.record(0, 0, StageLabel::If);
        recorder.record(4, 1, StageLabel::If);
        let text = recorder.to_plain_text(&["nop".into(), "nop".into()]);
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "nop;IF;-;-");
        assert_eq!(lines.next().unwrap(), "nop;-;IF;-");
    }

    #[test]
    fn out_of_range_pc_is_silently_dropped() {
        let mut recorder = TraceRecorder::new(1, 2);
        recorder.record(400, 0, StageLabel::If);
        let text = recorder.to_plain_text(&["nop".into()]);
        assert_eq!(text.lines().next().unwrap(), "nop;-;-");
    }

    #[test]
    fn out_of_range_cycle_is_silently_dropped() {
        let mut recorder = TraceRecorder::new(1, 1);
        recorder.record(0, 5, StageLabel::Wb);
        let text = recorder.to_plain_text(&["nop".into()]);
        assert_eq!(text.lines().next().unwrap(), "nop;-");
    }
}

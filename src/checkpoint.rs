//! Plain-text population checkpoints.
//!
//! Lets successive runs seed from earlier results.
//!
//! # Format
//!
//! One block per population member. Each block has one line per machine
//! bucket listing task IDs in decimal, then a literal `NEW` line:
//!
//! ```text
//! 0 3
//! 1
//!
//! NEW
//! 2 1
//! 0
//! 3
//! NEW
//! ```
//!
//! Writers follow every ID with a single space; readers accept any
//! whitespace. An empty line is an empty bucket. A file is accepted only
//! if it holds exactly `population_size` blocks of exactly
//! `machine_count` bucket lines.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{Result, SchedulingError};
use crate::models::{Assignment, Population, TaskId};

/// Block terminator line.
pub const BLOCK_SENTINEL: &str = "NEW";

/// Loads a population from `path`.
///
/// # Errors
/// - [`SchedulingError::CheckpointMissing`] if the file does not exist.
/// - [`SchedulingError::CheckpointCorrupt`] on any grammar violation.
/// - [`SchedulingError::Io`] on other read failures.
pub fn load(path: impl AsRef<Path>, population_size: usize, machine_count: usize) -> Result<Population> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SchedulingError::CheckpointMissing {
            path: path.to_path_buf(),
        },
        _ => SchedulingError::Io(e),
    })?;
    let population = read_from(BufReader::new(file), population_size, machine_count)?;
    debug!(path = %path.display(), members = population.len(), "checkpoint loaded");
    Ok(population)
}

/// Saves `population` to `path`, replacing any existing file.
pub fn save(population: &Population, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_to(population, &mut writer)?;
    writer.flush()?;
    debug!(path = %path.display(), members = population.len(), "checkpoint saved");
    Ok(())
}

/// Writes `population` in checkpoint format.
pub fn write_to<W: Write>(population: &Population, writer: &mut W) -> io::Result<()> {
    for member in population.iter() {
        for bucket in &member.buckets {
            for id in bucket {
                write!(writer, "{id} ")?;
            }
            writeln!(writer)?;
        }
        writeln!(writer, "{BLOCK_SENTINEL}")?;
    }
    Ok(())
}

/// Parses a population in checkpoint format.
///
/// # Errors
/// [`SchedulingError::CheckpointCorrupt`] with the 1-based line number
/// of the first violation; [`SchedulingError::Io`] on read failures.
pub fn read_from<R: BufRead>(reader: R, population_size: usize, machine_count: usize) -> Result<Population> {
    let mut members = Vec::with_capacity(population_size);
    let mut block: Vec<Vec<TaskId>> = Vec::with_capacity(machine_count);
    let mut line_no = 0;

    for line in reader.lines() {
        let line = line?;
        line_no += 1;
        let trimmed = line.trim();

        if trimmed == BLOCK_SENTINEL {
            if block.len() != machine_count {
                return Err(corrupt(
                    line_no,
                    format!(
                        "block {} has {} bucket lines, expected {}",
                        members.len(),
                        block.len(),
                        machine_count
                    ),
                ));
            }
            members.push(Assignment::from_buckets(std::mem::take(&mut block)));
            continue;
        }

        if block.len() == machine_count {
            return Err(corrupt(
                line_no,
                format!("block {} exceeds {} bucket lines", members.len(), machine_count),
            ));
        }
        let bucket = trimmed
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<TaskId>()
                    .map_err(|_| corrupt(line_no, format!("non-numeric token '{token}'")))
            })
            .collect::<Result<Vec<_>>>()?;
        block.push(bucket);
    }

    if !block.is_empty() {
        return Err(corrupt(line_no, format!("block {} is missing its {BLOCK_SENTINEL} line", members.len())));
    }
    if members.len() != population_size {
        return Err(corrupt(
            line_no,
            format!("expected {} blocks, found {}", population_size, members.len()),
        ));
    }
    Ok(Population::new(members))
}

fn corrupt(line: usize, reason: String) -> SchedulingError {
    SchedulingError::CheckpointCorrupt { line, reason }
}

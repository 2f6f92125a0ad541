//! Pipe mode: feed agent replies from a reader through the executor.
//!
//! One reply per line by default. Blank lines and lines starting with `#`
//! are skipped. With `--whole` the entire input is a single reply, which
//! lets fenced multi-line JSON through.

use std::io::{self, BufRead, Read, Write};

use protean_executor::{Executor, Reply};
use tracing::debug;

use crate::format::{format_reply, OutputMode};

/// Tally of handled replies.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipeStats {
    pub handled: usize,
    pub failed: usize,
}

impl PipeStats {
    fn record(&mut self, reply: &Reply) {
        self.handled += 1;
        if reply.is_command && !reply.is_success() {
            self.failed += 1;
        }
    }

    /// Process exit code: 1 when any command failed.
    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 {
            1
        } else {
            0
        }
    }
}

/// Handle one reply and write its formatted result.
pub fn run_one(executor: &Executor, text: &str, mode: OutputMode, out: &mut impl Write) -> io::Result<PipeStats> {
    let mut stats = PipeStats::default();
    let reply = executor.handle_reply(text);
    writeln!(out, "{}", format_reply(&reply, mode))?;
    stats.record(&reply);
    Ok(stats)
}

/// Handle each non-blank, non-comment line of `input` as one reply.
pub fn run_lines(
    executor: &Executor,
    input: impl BufRead,
    mode: OutputMode,
    out: &mut impl Write,
) -> io::Result<PipeStats> {
    let mut stats = PipeStats::default();
    for (lineno, line) in input.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        debug!(target: "protean::cli", line = lineno + 1, "Handling reply");
        let reply = executor.handle_reply(trimmed);
        writeln!(out, "{}", format_reply(&reply, mode))?;
        stats.record(&reply);
    }
    Ok(stats)
}

/// Handle all of `input` as a single reply.
pub fn run_whole(
    executor: &Executor,
    mut input: impl Read,
    mode: OutputMode,
    out: &mut impl Write,
) -> io::Result<PipeStats> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;
    if text.trim().is_empty() {
        return Ok(PipeStats::default());
    }
    run_one(executor, &text, mode, out)
}

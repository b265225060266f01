//! Workload feed: parsing and ingestion.
//!
//! One directive per line, whitespace-separated:
//!
//! ```text
//! process <priority> <burst_count> <burst_1> ... <burst_n>
//! sleep <milliseconds>
//! stop
//! ```
//!
//! `proc` is accepted as an alias of `process`. Blank lines and lines
//! starting with `#` are ignored.
//!
//! The ingester is one of the three simulation workers. Malformed lines are
//! logged and skipped; ingestion always ends by signalling the number of
//! admitted processes, whether through `stop`, end of input, a read error,
//! or cancellation.

use std::fmt;
use std::io::BufRead;
use std::str::{FromStr, SplitWhitespace};
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::models::ProcessSpec;
use crate::simulation::SimulationContext;
use crate::validation::validate_process;

/// One parsed feed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Admit a process.
    Process(ProcessSpec),
    /// Pause ingestion.
    Sleep(Duration),
    /// No further processes will arrive.
    Stop,
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Process(spec) => {
                write!(f, "process {} {}", spec.priority, spec.bursts.len())?;
                for burst in &spec.bursts {
                    write!(f, " {burst}")?;
                }
                Ok(())
            }
            Directive::Sleep(d) => write!(f, "sleep {}", d.as_millis()),
            Directive::Stop => f.write_str("stop"),
        }
    }
}

/// Why a feed line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("line {line}: unknown directive '{keyword}'")]
    UnknownDirective { line: usize, keyword: String },

    #[error("line {line}: missing {field}")]
    MissingField { line: usize, field: &'static str },

    #[error("line {line}: invalid {field} '{value}'")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: expected {expected} bursts, found {found}")]
    BurstCountMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: {reason}")]
    InvalidProcess { line: usize, reason: String },
}

/// Parses one line. `Ok(None)` for blank and comment lines.
///
/// `line` is the 1-based line number used in error messages.
pub fn parse_line(line: usize, text: &str) -> Result<Option<Directive>, FeedError> {
    let mut tokens = text.split_whitespace();
    let keyword = match tokens.next() {
        None => return Ok(None),
        Some(k) if k.starts_with('#') => return Ok(None),
        Some(k) => k,
    };

    let directive = match keyword {
        "process" | "proc" => Directive::Process(parse_process(line, tokens)?),
        "sleep" => {
            let ms: u64 = next_number(line, &mut tokens, "sleep duration")?;
            Directive::Sleep(Duration::from_millis(ms))
        }
        "stop" => Directive::Stop,
        other => {
            return Err(FeedError::UnknownDirective {
                line,
                keyword: other.to_string(),
            })
        }
    };
    Ok(Some(directive))
}

fn parse_process(line: usize, mut tokens: SplitWhitespace<'_>) -> Result<ProcessSpec, FeedError> {
    let priority: i32 = next_number(line, &mut tokens, "priority")?;
    let count: usize = next_number(line, &mut tokens, "burst count")?;

    let bursts = tokens
        .map(|t| {
            t.parse::<u64>().map_err(|_| FeedError::InvalidNumber {
                line,
                field: "burst",
                value: t.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if bursts.len() != count {
        return Err(FeedError::BurstCountMismatch {
            line,
            expected: count,
            found: bursts.len(),
        });
    }

    let spec = ProcessSpec::new(priority).with_bursts(bursts);
    validate_process(&spec).map_err(|errors| FeedError::InvalidProcess {
        line,
        reason: errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; "),
    })?;
    Ok(spec)
}

fn next_number<T: FromStr>(
    line: usize,
    tokens: &mut SplitWhitespace<'_>,
    field: &'static str,
) -> Result<T, FeedError> {
    let token = tokens
        .next()
        .ok_or(FeedError::MissingField { line, field })?;
    token.parse().map_err(|_| FeedError::InvalidNumber {
        line,
        field,
        value: token.to_string(),
    })
}

/// Parses a whole feed, failing on the first malformed line.
///
/// Parsing ends at `stop`; anything after it is not read.
pub fn parse_feed(text: &str) -> Result<Vec<Directive>, FeedError> {
    let mut directives = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(directive) = parse_line(i + 1, line)? {
            let stop = directive == Directive::Stop;
            directives.push(directive);
            if stop {
                break;
            }
        }
    }
    Ok(directives)
}

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Processes admitted.
    pub admitted: usize,
    /// Lines rejected as malformed.
    pub skipped: usize,
    /// Whether an explicit `stop` ended the feed.
    pub stopped: bool,
}

/// Feeds directives into a simulation context.
#[derive(Debug)]
pub struct FeedIngester<'a> {
    ctx: &'a SimulationContext,
}

impl<'a> FeedIngester<'a> {
    pub fn new(ctx: &'a SimulationContext) -> Self {
        Self { ctx }
    }

    /// Ingests until `stop`, end of input, a read error, or cancellation,
    /// then signals ingestion complete.
    pub fn run<R: BufRead>(&self, reader: R) -> IngestSummary {
        log::info!("Starting feed ingestion");
        let mut summary = IngestSummary::default();

        for (i, bytes) in reader.split(b'\n').enumerate() {
            let line_no = i + 1;
            if self.ctx.is_cancelled() {
                log::info!("ingestion cancelled");
                break;
            }
            let bytes = match bytes {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::error!("feed read failed at line {line_no}: {e}");
                    break;
                }
            };
            let line = match String::from_utf8(bytes) {
                Ok(line) => line,
                Err(_) => {
                    log::warn!("line {line_no}: not valid UTF-8; skipped");
                    summary.skipped += 1;
                    continue;
                }
            };

            match parse_line(line_no, &line) {
                Ok(None) => {}
                Ok(Some(Directive::Process(spec))) => {
                    let id = self.ctx.admit_process(spec);
                    log::debug!("admitted process {id}");
                    summary.admitted += 1;
                }
                Ok(Some(Directive::Sleep(pause))) => {
                    log::info!("Sleeping for {} ms", pause.as_millis());
                    thread::sleep(pause);
                }
                Ok(Some(Directive::Stop)) => {
                    summary.stopped = true;
                    break;
                }
                Err(e) => {
                    log::warn!("{e}; skipped");
                    summary.skipped += 1;
                }
            }
        }

        if !summary.stopped {
            log::warn!("feed ended without 'stop'");
        }
        self.ctx.signal_ingestion_complete(summary.admitted);
        log::info!(
            "Exiting feed ingestion: {} admitted, {} skipped",
            summary.admitted,
            summary.skipped
        );
        summary
    }

    /// Ingests a prepared directive list, honoring `sleep` and `stop`.
    pub fn run_directives<I>(&self, directives: I) -> IngestSummary
    where
        I: IntoIterator<Item = Directive>,
    {
        let text: String = directives
            .into_iter()
            .map(|d| format!("{d}\n"))
            .collect();
        self.run(text.as_bytes())
    }
}

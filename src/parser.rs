use crate::timestamp::{self, TimestampFormat};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::{Date, Duration, PrimitiveDateTime};
use tracing::{debug, error, info, warn};

/// Fields per record: `timestamp,description,event_type,pid`.
pub const FIELDS_PER_RECORD: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Start,
    End,
}

impl EventKind {
    /// Case-insensitive; anything other than START/END is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "START" => Some(EventKind::Start),
            "END" => Some(EventKind::End),
            _ => None,
        }
    }
}

/// One job, keyed by pid. Repeated START or END events overwrite the earlier value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobEvent {
    pub pid: String,
    pub description: String,
    #[serde(serialize_with = "crate::util::serialize_opt_iso")]
    pub start_time: Option<PrimitiveDateTime>,
    #[serde(serialize_with = "crate::util::serialize_opt_iso")]
    pub end_time: Option<PrimitiveDateTime>,
}

impl JobEvent {
    pub fn new(pid: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            pid: pid.into(),
            description: description.into(),
            start_time: None,
            end_time: None,
        }
    }

    pub fn set_time(&mut self, kind: EventKind, at: PrimitiveDateTime) {
        match kind {
            EventKind::Start => self.start_time = Some(at),
            EventKind::End => self.end_time = Some(at),
        }
    }

    /// `end - start`; negative when the END precedes the START.
    pub fn duration(&self) -> Option<Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

/// Jobs keyed by pid, iterated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobMap {
    jobs: Vec<JobEvent>,
    index: HashMap<String, usize>,
}

impl JobMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn contains(&self, pid: &str) -> bool {
        self.index.contains_key(pid)
    }

    pub fn get(&self, pid: &str) -> Option<&JobEvent> {
        self.index.get(pid).map(|&i| &self.jobs[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &JobEvent> {
        self.jobs.iter()
    }

    pub fn pids(&self) -> impl Iterator<Item = &str> {
        self.jobs.iter().map(|j| j.pid.as_str())
    }

    /// Returns the job for `pid`, creating it with `make` on first sighting.
    pub fn get_or_insert_with(&mut self, pid: &str, make: impl FnOnce() -> JobEvent) -> &mut JobEvent {
        let i = match self.index.get(pid) {
            Some(&i) => i,
            None => {
                let i = self.jobs.len();
                self.jobs.push(make());
                self.index.insert(pid.to_string(), i);
                i
            }
        };
        &mut self.jobs[i]
    }
}

impl<'a> IntoIterator for &'a JobMap {
    type Item = &'a JobEvent;
    type IntoIter = std::slice::Iter<'a, JobEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.jobs.iter()
    }
}

impl Serialize for JobMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.jobs.iter())
    }
}

/// Problems recovered from during a parse pass. None of these abort the pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIssue {
    #[error("line {line}: skipping malformed row with {fields} fields: {raw:?}")]
    MalformedRecord {
        line: u64,
        fields: usize,
        raw: Vec<String>,
    },
    #[error("line {line}: unrecognized datetime format: {raw}")]
    UnparseableTimestamp { line: u64, raw: String },
    #[error("log file '{}' does not exist", .path.display())]
    MissingSourceFile { path: PathBuf },
    #[error("error reading log file '{}': {reason}", .path.display())]
    SourceReadFailure { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub jobs: JobMap,
    pub issues: Vec<ParseIssue>,
    pub records_read: u64,
    pub fallback_date: Option<Date>,
}

/// Parse a job-event log into a pid-keyed map. Never fails; problems are
/// logged and the (possibly empty or partial) map is returned.
pub fn parse_log_file(path: &Path) -> JobMap {
    parse_path(path).jobs
}

pub fn parse_path(path: &Path) -> ParseOutcome {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            let issue = if e.kind() == ErrorKind::NotFound {
                ParseIssue::MissingSourceFile {
                    path: path.to_path_buf(),
                }
            } else {
                ParseIssue::SourceReadFailure {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            };
            error!("{issue}");
            return ParseOutcome {
                issues: vec![issue],
                ..Default::default()
            };
        }
    };

    debug!("parsing log file {}", path.display());
    let outcome = parse_reader(file, path);
    info!(
        "parsed {} records into {} jobs ({} skipped) from {}",
        outcome.records_read,
        outcome.jobs.len(),
        outcome.skipped(),
        path.display()
    );
    outcome
}

impl ParseOutcome {
    /// Records dropped for a bad shape or timestamp.
    pub fn skipped(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| {
                matches!(
                    i,
                    ParseIssue::MalformedRecord { .. } | ParseIssue::UnparseableTimestamp { .. }
                )
            })
            .count()
    }
}

/// Parse records from any reader. `origin` only labels read failures.
/// The source is read fully before parsing starts.
pub fn parse_reader<R: Read>(mut reader: R, origin: &Path) -> ParseOutcome {
    let mut pass = ParsePass::default();

    let mut raw = Vec::new();
    if let Err(e) = reader.read_to_end(&mut raw) {
        let issue = ParseIssue::SourceReadFailure {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        };
        error!("{issue}");
        pass.issues.push(issue);
        return pass.finish();
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_slice());

    let mut lines = LineCounter::new(&raw);
    for result in rdr.records() {
        match result {
            Ok(record) => {
                let line = match record.position() {
                    Some(p) => lines.line_at(p.byte() as usize),
                    None => pass.records_read + 1,
                };
                pass.ingest(&record, line);
            }
            Err(e) => {
                let issue = ParseIssue::SourceReadFailure {
                    path: origin.to_path_buf(),
                    reason: e.to_string(),
                };
                error!("{issue}");
                pass.issues.push(issue);
                break;
            }
        }
    }
    pass.finish()
}

/// Maps record byte offsets to 1-based physical line numbers. Offsets must
/// be non-decreasing.
struct LineCounter<'a> {
    raw: &'a [u8],
    pos: usize,
    line: u64,
}

impl<'a> LineCounter<'a> {
    fn new(raw: &'a [u8]) -> Self {
        Self { raw, pos: 0, line: 1 }
    }

    fn line_at(&mut self, byte: usize) -> u64 {
        let end = byte.min(self.raw.len());
        if end > self.pos {
            self.line += self.raw[self.pos..end].iter().filter(|&&b| b == b'\n').count() as u64;
            self.pos = end;
        }
        // csv reports the offset before any skipped blank lines.
        while let Some(&b) = self.raw.get(self.pos) {
            match b {
                b'\n' => self.line += 1,
                b'\r' => {}
                _ => break,
            }
            self.pos += 1;
        }
        self.line
    }
}

/// Accumulator threaded through one parse pass.
#[derive(Default)]
struct ParsePass {
    jobs: JobMap,
    issues: Vec<ParseIssue>,
    records_read: u64,
    /// Date of the first fully dated timestamp; set once.
    fallback_date: Option<Date>,
}

impl ParsePass {
    fn ingest(&mut self, record: &csv::StringRecord, line: u64) {
        self.records_read += 1;

        if record.len() != FIELDS_PER_RECORD {
            let issue = ParseIssue::MalformedRecord {
                line,
                fields: record.len(),
                raw: record.iter().map(str::to_string).collect(),
            };
            warn!("{issue}");
            self.issues.push(issue);
            return;
        }

        let (raw_ts, description, event_type, pid) = (&record[0], &record[1], &record[2], &record[3]);

        let Some((timestamp, format)) = timestamp::detect(raw_ts, self.fallback_date) else {
            let issue = ParseIssue::UnparseableTimestamp {
                line,
                raw: raw_ts.trim().to_string(),
            };
            warn!("{issue}");
            self.issues.push(issue);
            return;
        };

        if self.fallback_date.is_none() && format.has_date() {
            self.fallback_date = Some(timestamp.date());
            debug!("fallback date {} established at line {line}", timestamp.date());
        }

        let pid = pid.trim();
        let description = description.trim();
        let Some(kind) = EventKind::parse(event_type) else {
            debug!(
                "line {line}: ignoring event type {:?} for pid {pid}",
                event_type.trim().to_ascii_uppercase()
            );
            return;
        };

        if format == TimestampFormat::TimeOnly && self.fallback_date.is_none() {
            debug!("line {line}: time-only timestamp anchored at {}", timestamp::TIME_ONLY_EPOCH);
        }

        self.jobs
            .get_or_insert_with(pid, || JobEvent::new(pid, description))
            .set_time(kind, timestamp);
    }

    fn finish(self) -> ParseOutcome {
        ParseOutcome {
            jobs: self.jobs,
            issues: self.issues,
            records_read: self.records_read,
            fallback_date: self.fallback_date,
        }
    }
}

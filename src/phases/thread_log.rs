use std::fmt;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::elements::ThreadSample;
use crate::error::ThreadLogError;

/// Header line: `128次 4线程` is 128 repetitions on 4 threads, `128次 单线程` a single thread.
/// Any other text between the markers makes a malformed header.
static HEADER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"次\s*(?:(?P<single>单)|(?P<threads>\d+)|.*?)\s*线程").expect("failed to create thread log header regex")
});

/// Time line: `Paralle Total time: 2642 milliseconds`.
static TIME_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Paralle Total time:\s*(?P<ms>.*?)\s*(?:milliseconds)?$").expect("failed to create thread log time regex")
});

/// Output of the parallel k-NN search benchmark, used when no log file is supplied.
pub const SAMPLE_LOG: &str = "
128次 36线程
Paralle Total time: 1208 milliseconds

128次 32线程
Paralle Total time: 1161 milliseconds

128次 28线程
Paralle Total time: 1016 milliseconds

128次 24线程
Paralle Total time: 1116 milliseconds

128次 16线程
Paralle Total time: 1213 milliseconds

128次 8线程
Paralle Total time: 1831 milliseconds

128次 4线程
Paralle Total time: 2642 milliseconds

128次 2线程
Paralle Total time: 5018 milliseconds

128次 单线程
Paralle Total time: 9772 milliseconds
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderKind {
    SingleThread,
    Threads(u32),
    Malformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogLine {
    Blank,
    Header(HeaderKind),
    Time(Option<u64>),
    Unrecognized,
}

impl LogLine {
    fn classify(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            Self::Blank
        } else if let Some(cap) = HEADER_LINE.captures(line) {
            Self::Header(Self::header_kind(&cap))
        } else if let Some(cap) = TIME_LINE.captures(line) {
            Self::Time(cap.name("ms").and_then(|ms| ms.as_str().parse().ok()))
        } else {
            Self::Unrecognized
        }
    }

    fn header_kind(cap: &Captures) -> HeaderKind {
        if cap.name("single").is_some() {
            return HeaderKind::SingleThread;
        }

        match cap.name("threads").and_then(|t| t.as_str().parse::<u32>().ok()) {
            Some(threads) if 0 < threads => HeaderKind::Threads(threads),
            _ => HeaderKind::Malformed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    ExpectHeader,
    ExpectTime { threads: u32, header_line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Header line whose thread count could not be parsed.
    MalformedThreadCount { text: String },
    /// Time line whose millisecond value could not be parsed; the pending header is dropped.
    MalformedTime { text: String },
    /// Header not immediately followed by a time line.
    MissingTimeLine { found: String },
    /// Header on the last line of input.
    UnexpectedEndOfInput,
    /// Time line with no header before it.
    OrphanTimeLine { text: String },
    UnrecognizedLine { text: String },
    /// Thread and time counts disagreed and were truncated to the shorter length.
    CountMismatch { threads: usize, times: usize },
}

/// A skipped line. `line` is 1-based; for header related diagnostics it names the header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::MalformedThreadCount { text } => {
                write!(f, "line {}: could not parse thread count from '{}'", self.line, text)
            },
            DiagnosticKind::MalformedTime { text } => {
                write!(f, "line {}: could not parse time from '{}'", self.line, text)
            },
            DiagnosticKind::MissingTimeLine { found } => {
                write!(f, "line {}: expected time line but got '{}'", self.line, found)
            },
            DiagnosticKind::UnexpectedEndOfInput => {
                write!(f, "line {}: expected time line, but reached end of data", self.line)
            },
            DiagnosticKind::OrphanTimeLine { text } => {
                write!(f, "line {}: time line without thread header '{}'", self.line, text)
            },
            DiagnosticKind::UnrecognizedLine { text } => {
                write!(f, "line {}: unrecognized line format '{}'", self.line, text)
            },
            DiagnosticKind::CountMismatch { threads, times } => {
                write!(f, "mismatch in number of parsed threads ({}) and times ({})", threads, times)
            },
        }
    }
}

/// Raw result of scanning a thread-scaling log, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadLogScan {
    threads: Vec<u32>,
    times_ms: Vec<u64>,
    diagnostics: Vec<Diagnostic>,
}

impl ThreadLogScan {
    pub fn threads(&self) -> &[u32] {
        &self.threads
    }

    pub fn times_ms(&self) -> &[u64] {
        &self.times_ms
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn pairs(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.threads.iter().copied().zip(self.times_ms.iter().copied())
    }

    fn commit(&mut self, threads: u32, total_time_ms: u64) {
        self.threads.push(threads);
        self.times_ms.push(total_time_ms);
    }

    fn warn(&mut self, line: usize, kind: DiagnosticKind) {
        let diagnostic = Diagnostic { line, kind };
        tracing::warn!(line=%diagnostic.line, "skipping thread log entry: {}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

/// Scans header/time line pairs out of a thread-scaling log.
///
/// The scan is a two-state machine. While expecting a header, blank lines are skipped and any
/// other non-header line is reported. Once a header is seen, the very next line must be a time
/// line; if it is not, the header is dropped and that line is examined again as a potential
/// header, so a missing time line never swallows the following entry.
#[tracing::instrument(level = "debug", skip(text))]
pub fn parse_thread_log(text: &str) -> ThreadLogScan {
    let mut scan = ThreadLogScan::default();
    let mut state = ScanState::ExpectHeader;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = LogLine::classify(raw);

        if let ScanState::ExpectTime { threads, header_line } = state {
            state = ScanState::ExpectHeader;
            match line {
                LogLine::Time(Some(total_time_ms)) => {
                    scan.commit(threads, total_time_ms);
                    continue;
                },
                LogLine::Time(None) => {
                    scan.warn(line_no, DiagnosticKind::MalformedTime { text: raw.trim().to_string() });
                    continue;
                },
                _ => {
                    scan.warn(
                        header_line,
                        DiagnosticKind::MissingTimeLine { found: raw.trim().to_string() },
                    );
                },
            }
        }

        state = match line {
            LogLine::Blank => ScanState::ExpectHeader,
            LogLine::Header(HeaderKind::SingleThread) => ScanState::ExpectTime { threads: 1, header_line: line_no },
            LogLine::Header(HeaderKind::Threads(threads)) => ScanState::ExpectTime { threads, header_line: line_no },
            LogLine::Header(HeaderKind::Malformed) => {
                scan.warn(
                    line_no,
                    DiagnosticKind::MalformedThreadCount { text: raw.trim().to_string() },
                );
                ScanState::ExpectHeader
            },
            LogLine::Time(_) => {
                scan.warn(line_no, DiagnosticKind::OrphanTimeLine { text: raw.trim().to_string() });
                ScanState::ExpectHeader
            },
            LogLine::Unrecognized => {
                scan.warn(line_no, DiagnosticKind::UnrecognizedLine { text: raw.trim().to_string() });
                ScanState::ExpectHeader
            },
        };
    }

    if let ScanState::ExpectTime { header_line, .. } = state {
        scan.warn(header_line, DiagnosticKind::UnexpectedEndOfInput);
    }

    tracing::debug!(pairs=%scan.threads.len(), diagnostics=%scan.diagnostics.len(), "thread log scanned");
    scan
}

/// Turns a scan into samples sorted ascending by thread count.
///
/// Returns `ThreadLogError::NoSamples` when nothing usable was parsed; callers abort the
/// pipeline without producing output in that case.
#[tracing::instrument(level = "debug", skip(scan))]
pub fn summarize(mut scan: ThreadLogScan, iterations: u32) -> Result<Vec<ThreadSample>, ThreadLogError> {
    if iterations == 0 {
        return Err(ThreadLogError::ZeroIterations(iterations));
    }

    if scan.threads.len() != scan.times_ms.len() {
        let (threads, times) = (scan.threads.len(), scan.times_ms.len());
        tracing::error!(%threads, %times, "mismatch in number of parsed threads and times - data might be corrupted.");
        let min_len = threads.min(times);
        scan.threads.truncate(min_len);
        scan.times_ms.truncate(min_len);
        scan.warn(0, DiagnosticKind::CountMismatch { threads, times });
    }

    if scan.threads.is_empty() {
        tracing::warn!("no valid data pairs parsed - skipping analysis.");
        return Err(ThreadLogError::NoSamples);
    }

    let mut samples: Vec<ThreadSample> = scan
        .pairs()
        .map(|(threads, total_time_ms)| ThreadSample::new(threads, total_time_ms, iterations))
        .collect();
    samples.sort_by_key(|s| s.threads);
    Ok(samples)
}

pub fn analyze_thread_log(text: &str, iterations: u32) -> Result<Vec<ThreadSample>, ThreadLogError> {
    summarize(parse_thread_log(text), iterations)
}

pub fn load_thread_log(path: impl AsRef<Path>) -> Result<String, ThreadLogError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| ThreadLogError::Read { path: path.to_path_buf(), source })
}

/// Writes samples as a `Threads,Total_Time_ms,Time_Per_Iteration_ms` table.
#[tracing::instrument(level = "info", skip(samples), fields(nr_samples=%samples.len()))]
pub fn write_summary_csv(samples: &[ThreadSample], path: impl AsRef<Path> + fmt::Debug) -> Result<(), ThreadLogError> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for sample in samples {
        writer.serialize(sample)?;
    }
    writer.flush()?;
    tracing::info!("data saved to {:?}", path.as_ref());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::DEFAULT_ITERATIONS;
    use claim::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_lines() {
        assert_eq!(LogLine::classify("   "), LogLine::Blank);
        assert_eq!(LogLine::classify("128次 4线程"), LogLine::Header(HeaderKind::Threads(4)));
        assert_eq!(LogLine::classify(" 128次 36线程 "), LogLine::Header(HeaderKind::Threads(36)));
        assert_eq!(LogLine::classify("128次 单线程"), LogLine::Header(HeaderKind::SingleThread));
        assert_eq!(LogLine::classify("7次 单线程"), LogLine::Header(HeaderKind::SingleThread));
        assert_eq!(LogLine::classify("128次 多线程"), LogLine::Header(HeaderKind::Malformed));
        assert_eq!(LogLine::classify("128次 0线程"), LogLine::Header(HeaderKind::Malformed));
        assert_eq!(
            LogLine::classify("Paralle Total time: 2642 milliseconds"),
            LogLine::Time(Some(2642))
        );
        assert_eq!(LogLine::classify("Paralle Total time: soon milliseconds"), LogLine::Time(None));
        assert_eq!(LogLine::classify("Serial Total time: 10 milliseconds"), LogLine::Unrecognized);
    }

    #[test]
    fn test_classify_tolerates_spacing() {
        assert_eq!(LogLine::classify("128次4线程"), LogLine::Header(HeaderKind::Threads(4)));
        assert_eq!(LogLine::classify("128次  16 线程"), LogLine::Header(HeaderKind::Threads(16)));
        assert_eq!(LogLine::classify("128次 99999999999线程"), LogLine::Header(HeaderKind::Malformed));
        assert_eq!(LogLine::classify("Paralle Total time:1016 milliseconds"), LogLine::Time(Some(1016)));
        assert_eq!(LogLine::classify("Paralle Total time: 1016"), LogLine::Time(Some(1016)));
        assert_eq!(LogLine::classify("Paralle Total time:"), LogLine::Time(None));
        assert_eq!(LogLine::classify("Paralle Total time: 12 34 milliseconds"), LogLine::Time(None));
    }

    #[test]
    fn test_single_pair() {
        let samples = assert_ok!(analyze_thread_log(
            "128次 4线程\nParalle Total time: 2642 milliseconds\n",
            DEFAULT_ITERATIONS
        ));
        assert_eq!(samples, vec![ThreadSample::new(4, 2642, DEFAULT_ITERATIONS)]);
        assert_eq!(samples[0].time_per_iteration_ms, 20.640625);
    }

    #[test]
    fn test_single_thread_marker() {
        let samples = assert_ok!(analyze_thread_log(
            "128次 单线程\nParalle Total time: 9772 milliseconds\n",
            DEFAULT_ITERATIONS
        ));
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].threads, 1);
        assert_eq!(samples[0].total_time_ms, 9772);
    }

    #[test]
    fn test_sample_log_sorted_by_threads() {
        let scan = parse_thread_log(SAMPLE_LOG);
        assert!(scan.diagnostics().is_empty());
        assert_eq!(scan.threads(), &[36, 32, 28, 24, 16, 8, 4, 2, 1]);

        let samples = assert_ok!(summarize(scan, DEFAULT_ITERATIONS));
        let threads: Vec<u32> = samples.iter().map(|s| s.threads).collect();
        assert_eq!(threads, vec![1, 2, 4, 8, 16, 24, 28, 32, 36]);
        assert_eq!(samples[0].total_time_ms, 9772);
        assert_eq!(samples[8].total_time_ms, 1208);
    }

    #[test]
    fn test_header_at_end_of_input_is_dropped() {
        let scan = parse_thread_log("128次 4线程\nParalle Total time: 2642 milliseconds\n128次 8线程");
        assert_eq!(scan.pairs().collect::<Vec<_>>(), vec![(4, 2642)]);
        assert_eq!(
            scan.diagnostics(),
            &[Diagnostic { line: 3, kind: DiagnosticKind::UnexpectedEndOfInput }]
        );
    }

    #[test]
    fn test_missing_time_line_does_not_swallow_next_header() {
        let text = "128次 8线程\n128次 4线程\nParalle Total time: 2642 milliseconds\n";
        let scan = parse_thread_log(text);
        assert_eq!(scan.pairs().collect::<Vec<_>>(), vec![(4, 2642)]);
        assert_eq!(
            scan.diagnostics(),
            &[Diagnostic {
                line: 1,
                kind: DiagnosticKind::MissingTimeLine { found: "128次 4线程".to_string() },
            }]
        );
    }

    #[test]
    fn test_blank_line_between_header_and_time_breaks_the_pair() {
        let scan = parse_thread_log("128次 8线程\n\nParalle Total time: 1831 milliseconds\n");
        assert_eq!(scan.pairs().count(), 0);
        assert_eq!(
            scan.diagnostics(),
            &[
                Diagnostic { line: 1, kind: DiagnosticKind::MissingTimeLine { found: String::new() } },
                Diagnostic {
                    line: 3,
                    kind: DiagnosticKind::OrphanTimeLine { text: "Paralle Total time: 1831 milliseconds".to_string() },
                },
            ]
        );
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let text = "\
garbage
128次 lots线程
Paralle Total time: 100 milliseconds
128次 2线程
Paralle Total time: many milliseconds
128次 16线程
Paralle Total time: 1213 milliseconds
";
        let scan = parse_thread_log(text);
        assert_eq!(scan.pairs().collect::<Vec<_>>(), vec![(16, 1213)]);
        let lines: Vec<usize> = scan.diagnostics().iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![1, 2, 3, 5]);
        assert!(matches!(scan.diagnostics()[0].kind, DiagnosticKind::UnrecognizedLine { .. }));
        assert!(matches!(scan.diagnostics()[1].kind, DiagnosticKind::MalformedThreadCount { .. }));
        assert!(matches!(scan.diagnostics()[2].kind, DiagnosticKind::OrphanTimeLine { .. }));
        assert!(matches!(scan.diagnostics()[3].kind, DiagnosticKind::MalformedTime { .. }));
    }

    #[test]
    fn test_crlf_line_endings() {
        let samples = assert_ok!(analyze_thread_log(
            "128次 2线程\r\nParalle Total time: 5018 milliseconds\r\n",
            DEFAULT_ITERATIONS
        ));
        assert_eq!(samples, vec![ThreadSample::new(2, 5018, DEFAULT_ITERATIONS)]);
    }

    #[test]
    fn test_no_samples_aborts() {
        assert_matches!(analyze_thread_log("", DEFAULT_ITERATIONS), Err(ThreadLogError::NoSamples));
        assert_matches!(
            analyze_thread_log("128次 4线程\n", DEFAULT_ITERATIONS),
            Err(ThreadLogError::NoSamples)
        );
    }

    #[test]
    fn test_zero_iterations_rejected() {
        assert_matches!(analyze_thread_log(SAMPLE_LOG, 0), Err(ThreadLogError::ZeroIterations(0)));
    }

    #[test]
    fn test_count_mismatch_is_truncated() {
        let scan = ThreadLogScan {
            threads: vec![8, 4, 2],
            times_ms: vec![1831, 2642],
            diagnostics: vec![],
        };
        let samples = assert_ok!(summarize(scan, DEFAULT_ITERATIONS));
        assert_eq!(
            samples,
            vec![
                ThreadSample::new(4, 2642, DEFAULT_ITERATIONS),
                ThreadSample::new(8, 1831, DEFAULT_ITERATIONS),
            ]
        );

        let scan = ThreadLogScan { threads: vec![8], times_ms: vec![], diagnostics: vec![] };
        assert_matches!(summarize(scan, DEFAULT_ITERATIONS), Err(ThreadLogError::NoSamples));
    }

    #[test]
    fn test_write_summary_csv() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("thread_performance_summary.csv");
        let samples = analyze_thread_log(
            "128次 单线程\nParalle Total time: 9772 milliseconds\n128次 4线程\nParalle Total time: 2642 milliseconds\n",
            DEFAULT_ITERATIONS,
        )?;
        write_summary_csv(&samples, &path)?;

        let actual = std::fs::read_to_string(&path)?;
        assert_eq!(
            actual,
            "Threads,Total_Time_ms,Time_Per_Iteration_ms\n1,9772,76.34375\n4,2642,20.640625\n"
        );
        Ok(())
    }
}

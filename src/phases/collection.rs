use std::collections::HashSet;
use std::path::{Path, PathBuf};

use itertools::{Either, Itertools};

use crate::elements::{BenchmarkRow, REQUIRED_COLUMNS};
use crate::error::CollectionError;

/// Pattern used when no CSV files are named explicitly.
pub const DEFAULT_CSV_PATTERN: &str = "performance_results*.csv";

const GLOB_METACHARACTERS: [char; 3] = ['*', '?', '['];

/// Rows loaded from one benchmark CSV file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub rows: Vec<BenchmarkRow>,
    pub skipped_rows: usize,
}

/// Distinct operations and data sizes found in a merged row set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSummary {
    pub operations: Vec<String>,
    pub data_sizes: Vec<u64>,
}

/// Expands file patterns, relative to `working_dir`, into candidate CSV paths.
///
/// An empty pattern list falls back to `DEFAULT_CSV_PATTERN`. A plain path that matches nothing
/// is kept as a candidate so loading can report it as missing. Invalid patterns are skipped
/// with a warning.
#[tracing::instrument(level = "info")]
pub fn discover_csv_files(working_dir: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, CollectionError> {
    let patterns = if patterns.is_empty() {
        vec![DEFAULT_CSV_PATTERN.to_string()]
    } else {
        patterns.to_vec()
    };

    let mut candidates = Vec::new();
    for pattern in patterns.iter() {
        let full = working_dir.join(pattern);
        let escaped = Path::new(&glob::Pattern::escape(&working_dir.to_string_lossy())).join(pattern);
        let matched = match glob::glob(escaped.to_string_lossy().as_ref()) {
            Ok(paths) => paths
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(err) => {
                        tracing::warn!(error=?err, %pattern, "could not read glob match, skipping.");
                        None
                    },
                })
                .collect::<Vec<_>>(),
            Err(err) => {
                tracing::warn!(error=?err, %pattern, "invalid file pattern, skipping.");
                continue;
            },
        };

        if matched.is_empty() && !pattern.contains(&GLOB_METACHARACTERS[..]) {
            candidates.push(full);
        } else {
            candidates.extend(matched);
        }
    }

    let candidates: Vec<PathBuf> = candidates.into_iter().unique().collect();
    if candidates.is_empty() {
        return Err(CollectionError::NoFilesFound { patterns });
    }

    tracing::info!(nr_candidates=%candidates.len(), "found candidate CSV files");
    Ok(candidates)
}

/// Loads one benchmark CSV, tagging every row with the file's name.
///
/// The header must carry every column in `REQUIRED_COLUMNS`. Rows that fail to deserialize are
/// skipped with a warning.
#[tracing::instrument(level = "info", skip(path), fields(path=?path.as_ref()))]
pub fn load_benchmark_csv(path: impl AsRef<Path>) -> Result<LoadedFile, CollectionError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(CollectionError::NotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;

    let headers = reader.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CollectionError::MissingColumns { path: path.to_path_buf(), missing });
    }

    let source_file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut rows = Vec::new();
    let mut skipped_rows = 0;
    for (idx, record) in reader.deserialize::<BenchmarkRow>().enumerate() {
        match record {
            Ok(row) => rows.push(row.with_source_file(source_file.as_str())),
            Err(err) => {
                skipped_rows += 1;
                let record = idx + 1;
                tracing::warn!(error=?err, %record, file=%source_file, "skipping malformed benchmark row.");
            },
        }
    }

    tracing::info!(nr_rows=%rows.len(), %skipped_rows, "read {}", source_file);
    Ok(LoadedFile { path: path.to_path_buf(), rows, skipped_rows })
}

/// Loads every candidate path, skipping missing or unreadable files with a warning.
///
/// Fails with `CollectionError::NoValidFiles` when no file could be loaded.
#[tracing::instrument(level = "info", skip(paths))]
pub fn load_all(paths: &[PathBuf]) -> Result<Vec<LoadedFile>, CollectionError> {
    tracing::info!("reading data from {} CSV files...", paths.len());

    let mut loaded = Vec::with_capacity(paths.len());
    for path in paths {
        match load_benchmark_csv(path) {
            Ok(file) => loaded.push(file),
            Err(CollectionError::NotFound(path)) => {
                tracing::warn!(?path, "file not found, skipping.");
            },
            Err(err) => {
                tracing::warn!(error=?err, ?path, "could not load CSV file, skipping.");
            },
        }
    }

    if loaded.is_empty() {
        return Err(CollectionError::NoValidFiles { candidates: paths.len() });
    }

    Ok(loaded)
}

/// Concatenates row sets in order, keeps the first row seen for each `(operation, data_size)`
/// and sorts by operation then data size.
pub fn merge_rows<I>(row_sets: I) -> Vec<BenchmarkRow>
where
    I: IntoIterator<Item = Vec<BenchmarkRow>>,
{
    let (mut merged, duplicates): (Vec<BenchmarkRow>, Vec<BenchmarkRow>) = row_sets
        .into_iter()
        .flatten()
        .scan(HashSet::new(), |seen, row| {
            let first_seen = seen.insert((row.operation.clone(), row.data_size));
            Some((first_seen, row))
        })
        .partition_map(|(first_seen, row)| if first_seen { Either::Left(row) } else { Either::Right(row) });

    for row in duplicates.iter() {
        tracing::debug!(source_file=%row.source_file, "dropping duplicate row in favor of earlier one: {}", row);
    }

    merged.sort_by(|lhs, rhs| lhs.key().cmp(&rhs.key()));
    merged
}

pub fn summarize_rows(rows: &[BenchmarkRow]) -> RowSummary {
    RowSummary {
        operations: rows.iter().map(|r| r.operation.clone()).unique().collect(),
        data_sizes: rows.iter().map(|r| r.data_size).sorted().dedup().collect(),
    }
}

/// Discovers, loads and merges benchmark CSV files.
#[tracing::instrument(level = "info")]
pub fn collect_benchmarks(working_dir: &Path, patterns: &[String]) -> Result<Vec<BenchmarkRow>, CollectionError> {
    let candidates = discover_csv_files(working_dir, patterns)?;
    let loaded = load_all(&candidates)?;
    let merged = merge_rows(loaded.into_iter().map(|file| file.rows));

    let summary = summarize_rows(&merged);
    tracing::info!(
        operations=?summary.operations, data_sizes=?summary.data_sizes,
        "combined data has {} rows", merged.len()
    );
    Ok(merged)
}

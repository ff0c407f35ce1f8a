//! CSV loading and `taskgrid ingest`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::{Number, Value};
use taskgrid_recon::{EntityCollections, EntityType, RawRecord};

use crate::context::Context;
use crate::exit_codes::{EXIT_IO, EXIT_PARSE};
use crate::CliError;

/// Input files for the three entity kinds. Any subset may be given.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct EntityFiles {
    /// Clients CSV (first row = headers)
    #[arg(long, value_name = "CSV")]
    pub clients: Option<PathBuf>,

    /// Workers CSV (first row = headers)
    #[arg(long, value_name = "CSV")]
    pub workers: Option<PathBuf>,

    /// Tasks CSV (first row = headers)
    #[arg(long, value_name = "CSV")]
    pub tasks: Option<PathBuf>,
}

impl EntityFiles {
    pub fn is_empty(&self) -> bool {
        self.clients.is_none() && self.workers.is_none() && self.tasks.is_none()
    }

    fn iter(&self) -> impl Iterator<Item = (EntityType, &PathBuf)> {
        [
            (EntityType::Clients, self.clients.as_ref()),
            (EntityType::Workers, self.workers.as_ref()),
            (EntityType::Tasks, self.tasks.as_ref()),
        ]
        .into_iter()
        .filter_map(|(entity, path)| path.map(|p| (entity, p)))
    }

    /// Read every given file into `collections`, replacing those entities.
    pub fn load_into(&self, collections: &mut EntityCollections) -> Result<(), CliError> {
        for (entity, path) in self.iter() {
            let records = read_csv_records(path)?;
            log::info!("read {} {} from {}", records.len(), entity, path.display());
            collections.set(entity, records);
        }
        Ok(())
    }
}

pub fn cmd_ingest(ctx: &Context, files: EntityFiles) -> Result<(), CliError> {
    if files.is_empty() {
        return Err(CliError::args("nothing to ingest")
            .with_hint("pass at least one of --clients, --workers, --tasks"));
    }

    let mut store = ctx.open_store();
    let mut collections = store.collections();
    files.load_into(&mut collections)?;

    for (entity, _) in files.iter() {
        let records = collections.get(entity).to_vec();
        eprintln!("{:<8} {} records", entity.as_str(), records.len());
        match entity {
            EntityType::Clients => store.set_clients(records),
            EntityType::Workers => store.set_workers(records),
            EntityType::Tasks => store.set_tasks(records),
        }
    }

    if !store.is_data_loaded() {
        eprintln!(
            "note: dataset is incomplete and was not saved; \
             ingest clients, workers and tasks together"
        );
    }
    Ok(())
}

// ============================================================================
// CSV
// ============================================================================

pub fn read_csv_records(path: &Path) -> Result<Vec<RawRecord>, CliError> {
    let file = std::fs::File::open(path)
        .map_err(|e| CliError::new(EXIT_IO, format!("{}: {}", path.display(), e)))?;
    parse_csv_records(file)
        .map_err(|e| CliError::new(EXIT_PARSE, format!("{}: {}", path.display(), e)))
}

#[derive(Debug)]
pub enum CsvLoadError {
    Csv(csv::Error),
    /// Two columns share a name; one would silently shadow the other.
    DuplicateHeader(String),
}

impl std::fmt::Display for CsvLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CsvLoadError::Csv(e) => write!(f, "{}", e),
            CsvLoadError::DuplicateHeader(h) => write!(f, "duplicate column header '{}'", h),
        }
    }
}

impl std::error::Error for CsvLoadError {}

impl From<csv::Error> for CsvLoadError {
    fn from(e: csv::Error) -> Self {
        CsvLoadError::Csv(e)
    }
}

/// Parse CSV with a header row into records. Short rows are padded with
/// empty strings; cells past the header width are dropped. Repeated header
/// names are rejected.
pub fn parse_csv_records<R: std::io::Read>(reader: R) -> Result<Vec<RawRecord>, CsvLoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut seen: HashSet<&String> = HashSet::new();
    if let Some(dup) = headers.iter().find(|h| !seen.insert(*h)) {
        return Err(CsvLoadError::DuplicateHeader(dup.clone()));
    }
    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let record: RawRecord = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), typed_value(row.get(i).unwrap_or(""))))
            .collect();
        records.push(record);
    }
    Ok(records)
}

/// Integers, finite floats and booleans become JSON scalars; anything else
/// stays a string. Identifier-like numbers (leading zero, explicit `+`,
/// integers outside `i64`) stay strings so they survive unchanged.
pub fn typed_value(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::String(String::new());
    }
    if is_identifier_like(trimmed) {
        return Value::String(cell.to_string());
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if let Some(n) = Number::from_f64(f).filter(|_| f.is_finite()) {
            return Value::Number(n);
        }
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(cell.to_string()),
    }
}

fn is_identifier_like(s: &str) -> bool {
    if s.starts_with('+') {
        return true;
    }
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let leading_zero = unsigned.len() > 1
        && unsigned.starts_with('0')
        && !unsigned.starts_with("0.");
    let all_digits = !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit());
    leading_zero || (all_digits && s.parse::<i64>().is_err())
}

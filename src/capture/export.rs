use log::{debug, error, info, warn};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use url::Url;

use crate::models::exchange::CapturedExchange;
use crate::models::stats::ExportReport;
use crate::utils::error::{AppError, AppResult};

/// Name used when a URL yields no usable segment
pub const FALLBACK_FILENAME: &str = "request.http";

const HTTP_SUFFIX: &str = ".http";

/// Derive an export filename from the last non-empty path segment of `url`
pub fn derive_filename(url: &str) -> String {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!("Cannot derive filename from {:?}: {}", url, e);
            return FALLBACK_FILENAME.to_string();
        }
    };

    let segment = parsed
        .path()
        .split('/')
        .rev()
        .find(|part| !part.is_empty())
        .unwrap_or("request");

    let mut filename = match segment.split_once('?') {
        Some((head, _)) => head.to_string(),
        None => segment.to_string(),
    };

    if !filename.ends_with(HTTP_SUFFIX) {
        filename.push_str(HTTP_SUFFIX);
    }
    filename
}

/// Insert `-counter` before the last `.`, or append it when there is none
pub fn numbered_filename(filename: &str, counter: usize) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) => format!("{}-{}.{}", stem, counter, ext),
        None => format!("{}-{}", filename, counter),
    }
}

/// First path in `directory` for `filename` that does not exist yet
pub fn unique_path(directory: &Path, filename: &str) -> PathBuf {
    let mut candidate = directory.join(filename);
    let mut counter = 1;

    while candidate.exists() {
        candidate = directory.join(numbered_filename(filename, counter));
        counter += 1;
    }
    candidate
}

/// Write raw request bytes to `path`, unchanged
pub fn write_request(path: &Path, request: &[u8]) -> AppResult<()> {
    let mut file = File::create(path)?;
    file.write_all(request)?;
    file.flush()?;
    Ok(())
}

/// Save one exchange to an explicit path
pub fn export_one(exchange: &CapturedExchange, path: &Path) -> AppResult<PathBuf> {
    write_request(path, &exchange.request).map_err(|e| {
        error!("Error saving request: {}", e);
        AppError::ExportError(format!("{}: {}", path.display(), e))
    })?;

    info!("Request saved to {}", path.display());
    Ok(path.to_path_buf())
}

/// Save every exchange into `directory`, renaming on collisions.
///
/// A failing exchange is counted and skipped; the batch always finishes.
pub fn export_batch<'a, I>(exchanges: I, directory: &Path) -> ExportReport
where
    I: IntoIterator<Item = &'a CapturedExchange>,
{
    let mut report = ExportReport::new(directory.to_path_buf());
    let mut exchanges = exchanges.into_iter().peekable();

    if exchanges.peek().is_none() {
        debug!("Nothing to export");
        return report;
    }

    if !directory.exists() {
        // Writes below fail individually and are counted if this fails
        if let Err(e) = fs::create_dir_all(directory) {
            warn!("Failed to create {}: {}", directory.display(), e);
        }
    }

    for (i, exchange) in exchanges.enumerate() {
        match save_into(exchange, directory) {
            Ok(path) => {
                debug!("Saved request {} to {}", i, path.display());
                report.files.push(path);
                report.saved += 1;
            }
            Err(e) => {
                error!("Error saving request {}: {}", i, e);
                report.errors += 1;
            }
        }
    }

    info!(
        "Saved {} requests to {}. Errors: {}",
        report.saved,
        directory.display(),
        report.errors
    );
    report
}

fn save_into(exchange: &CapturedExchange, directory: &Path) -> AppResult<PathBuf> {
    let fields = exchange.fields()?;
    let path = unique_path(directory, &derive_filename(fields.url));
    write_request(&path, &exchange.request)?;
    Ok(path)
}

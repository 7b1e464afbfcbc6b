use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::capture::export;
use crate::capture::filter;
use crate::models::config::AppConfig;
use crate::models::exchange::{CapturedExchange, ExchangeDetail, ExchangeRow, HostRecord};
use crate::models::filter::FilterConfig;
use crate::models::stats::{ExportReport, SessionStatus};
use crate::utils::error::{AppError, AppResult};

/// Direction for previous/next navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Previous,
    Next,
}

/// Everything a user or the proxy can ask the session to do
#[derive(Debug, Clone)]
pub enum Action {
    /// Records sent from the proxy history
    Capture(Vec<HostRecord>),
    /// Store a new filter; it takes effect on the next apply
    SetFilter(FilterConfig),
    ApplyFilter,
    AddUriPattern,
    Rows,
    Select(usize),
    Navigate(Direction),
    Selected,
    /// Save the selected exchange; `None` uses the default export directory
    ExportSelected(Option<PathBuf>),
    /// Save the whole filtered view; `None` uses the default export directory
    ExportAll(Option<PathBuf>),
    Clear,
    Status,
}

impl Action {
    /// Whether the action changes what subscribers see
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Action::Rows | Action::Selected | Action::Status)
    }
}

/// Reply to an [`Action`]
#[derive(Debug, Clone)]
pub enum Outcome {
    Captured { added: usize, rejected: usize },
    Filter(FilterConfig),
    Rows(Vec<ExchangeRow>),
    Selection(Option<usize>),
    Detail(Option<ExchangeDetail>),
    Saved(PathBuf),
    Exported(ExportReport),
    Status(SessionStatus),
}

/// Owns the capture list, the filter and the derived view
pub struct CaptureManager {
    /// Application configuration
    config: AppConfig,

    /// Captured exchanges in arrival order
    exchanges: Vec<CapturedExchange>,

    /// Indices into `exchanges` that pass the filter, in capture order
    filtered: Vec<usize>,

    /// Filter the view is computed from
    filter: FilterConfig,

    /// Selected row of the filtered view
    selected: Option<usize>,

    /// Next exchange ID; not reset by clear
    next_id: u64,

    /// Exchanges skipped by the last recompute
    dropped: usize,

    started_at: DateTime<Utc>,
    exported_files: usize,
    export_errors: usize,
}

impl CaptureManager {
    /// Create a new capture manager
    pub fn new(config: AppConfig, filter: FilterConfig) -> Self {
        Self {
            config,
            exchanges: Vec::new(),
            filtered: Vec::new(),
            filter,
            selected: None,
            next_id: 1,
            dropped: 0,
            started_at: Utc::now(),
            exported_files: 0,
            export_errors: 0,
        }
    }

    /// Run one action against the session
    pub fn dispatch(&mut self, action: Action) -> AppResult<Outcome> {
        debug!("Dispatching {:?}", ActionName(&action));

        match action {
            Action::Capture(records) => Ok(self.capture(records)),
            Action::SetFilter(config) => self.set_filter(config).map(Outcome::Filter),
            Action::ApplyFilter => {
                self.apply_filters();
                Ok(Outcome::Status(self.status()))
            }
            Action::AddUriPattern => {
                if !self.filter.add_uri_pattern() {
                    debug!("URI pattern limit reached");
                }
                Ok(Outcome::Filter(self.filter.clone()))
            }
            Action::Rows => Ok(Outcome::Rows(self.rows())),
            Action::Select(row) => self.select(row).map(|_| Outcome::Selection(self.selected)),
            Action::Navigate(direction) => {
                self.navigate(direction);
                Ok(Outcome::Selection(self.selected))
            }
            Action::Selected => Ok(Outcome::Detail(self.selected_detail())),
            Action::ExportSelected(path) => self.export_selected(path).map(Outcome::Saved),
            Action::ExportAll(directory) => Ok(Outcome::Exported(self.export_all(directory))),
            Action::Clear => {
                self.clear();
                Ok(Outcome::Status(self.status()))
            }
            Action::Status => Ok(Outcome::Status(self.status())),
        }
    }

    /// Append records, recomputing the view after each one
    pub fn capture(&mut self, records: Vec<HostRecord>) -> Outcome {
        let mut added = 0;
        let mut rejected = 0;

        for record in records {
            match CapturedExchange::from_record(self.next_id, record) {
                Ok(exchange) => {
                    self.next_id += 1;
                    self.exchanges.push(exchange);
                    added += 1;
                    self.apply_filters();
                }
                Err(e) => {
                    warn!("Discarding capture record: {}", e);
                    rejected += 1;
                }
            }
        }

        info!(
            "Captured {} exchanges ({} rejected), {} total",
            added,
            rejected,
            self.exchanges.len()
        );
        Outcome::Captured { added, rejected }
    }

    /// Validate and store a filter without recomputing the view
    pub fn set_filter(&mut self, config: FilterConfig) -> AppResult<FilterConfig> {
        self.filter = config.validated()?;
        info!("Filter updated: {:?}", self.filter);
        Ok(self.filter.clone())
    }

    /// Recompute the filtered view in full from the capture list
    pub fn apply_filters(&mut self) {
        let (filtered, dropped) = filter::filter_view(&self.exchanges, &self.filter);
        self.filtered = filtered;
        self.dropped = dropped;
        self.selected = None;

        debug!(
            "Filter applied: {} of {} exchanges visible, {} dropped",
            self.filtered.len(),
            self.exchanges.len(),
            dropped
        );
    }

    /// Table rows for the filtered view
    pub fn rows(&self) -> Vec<ExchangeRow> {
        self.visible()
            .enumerate()
            .filter_map(|(index, exchange)| match exchange.fields() {
                Ok(fields) => Some(ExchangeRow {
                    index,
                    id: exchange.id,
                    method: fields.method.to_string(),
                    url: fields.url.to_string(),
                    status: exchange.response.as_ref().and(exchange.status_code),
                    length: exchange.response_length(),
                }),
                Err(e) => {
                    warn!("Error updating table: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Select a row of the filtered view
    pub fn select(&mut self, row: usize) -> AppResult<()> {
        if row >= self.filtered.len() {
            return Err(AppError::RowOutOfRange {
                row,
                len: self.filtered.len(),
            });
        }
        self.selected = Some(row);
        Ok(())
    }

    /// Move the selection one row, staying put at either edge
    pub fn navigate(&mut self, direction: Direction) {
        let len = self.filtered.len();

        match (self.selected, direction) {
            (None, Direction::Next) if len > 0 => self.selected = Some(0),
            (None, _) => {}
            (Some(row), Direction::Next) if row + 1 < len => self.selected = Some(row + 1),
            (Some(row), Direction::Previous) if row > 0 => self.selected = Some(row - 1),
            (Some(_), _) => {}
        }
    }

    /// Request/response content of the selected row
    pub fn selected_detail(&self) -> Option<ExchangeDetail> {
        let row = self.selected?;
        self.visible_at(row).map(|exchange| ExchangeDetail::new(row, exchange))
    }

    /// Save the selected exchange to `path`, or to the export directory
    pub fn export_selected(&mut self, path: Option<PathBuf>) -> AppResult<PathBuf> {
        let row = self.selected.ok_or(AppError::NoSelection)?;
        let exchange = self.visible_at(row).ok_or(AppError::NoSelection)?;

        let path = match path {
            Some(path) => path,
            None => {
                let fields = exchange.fields()?;
                self.config.export_dir.join(export::derive_filename(fields.url))
            }
        };

        match export::export_one(exchange, &path) {
            Ok(saved) => {
                self.exported_files += 1;
                Ok(saved)
            }
            Err(e) => {
                self.export_errors += 1;
                Err(e)
            }
        }
    }

    /// Save the filtered view into `directory`, or the export directory
    pub fn export_all(&mut self, directory: Option<PathBuf>) -> ExportReport {
        let directory = directory.unwrap_or_else(|| self.config.export_dir.clone());
        let exchanges = &self.exchanges;
        let report = export::export_batch(self.filtered.iter().map(|&i| &exchanges[i]), &directory);

        self.exported_files += report.saved;
        self.export_errors += report.errors;
        report
    }

    /// Drop every exchange and reset the view and selection
    pub fn clear(&mut self) {
        info!("Clearing {} captured exchanges", self.exchanges.len());
        self.exchanges.clear();
        self.filtered.clear();
        self.selected = None;
        self.dropped = 0;
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            captured: self.exchanges.len(),
            visible: self.filtered.len(),
            dropped: self.dropped,
            selected: self.selected,
            filter: self.filter.clone(),
            started_at: self.started_at,
            exported_files: self.exported_files,
            export_errors: self.export_errors,
        }
    }

    /// Exchanges in the capture list
    pub fn exchanges(&self) -> &[CapturedExchange] {
        &self.exchanges
    }

    /// Exchanges in the filtered view, in capture order
    pub fn visible(&self) -> impl Iterator<Item = &CapturedExchange> + '_ {
        self.filtered.iter().map(move |&i| &self.exchanges[i])
    }

    fn visible_at(&self, row: usize) -> Option<&CapturedExchange> {
        self.filtered.get(row).map(|&i| &self.exchanges[i])
    }
}

/// Logs an action without dumping captured payloads
struct ActionName<'a>(&'a Action);

impl std::fmt::Debug for ActionName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Action::Capture(records) => write!(f, "Capture({} records)", records.len()),
            Action::SetFilter(_) => f.write_str("SetFilter"),
            other => write!(f, "{:?}", other),
        }
    }
}

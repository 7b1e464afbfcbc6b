use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, AppResult};

/// One capture event as handed over by the proxy.
///
/// Method, URL and status are facts the proxy already parsed; they are
/// never derived from the raw bytes here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRecord {
    /// Raw request bytes, base64 encoded
    pub request: String,

    /// Raw response bytes, base64 encoded
    #[serde(default)]
    pub response: Option<String>,

    /// HTTP method as reported by the proxy
    #[serde(default)]
    pub method: Option<String>,

    /// Full request URL as reported by the proxy
    #[serde(default)]
    pub url: Option<String>,

    /// Response status code
    #[serde(default)]
    pub status_code: Option<u16>,
}

/// A captured HTTP request paired with its optional response
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedExchange {
    /// Process-unique sequential identifier
    pub id: u64,

    /// When the exchange entered the capture list
    pub captured_at: DateTime<Utc>,

    /// The raw request bytes
    pub request: Vec<u8>,

    /// The raw response bytes, if the proxy saw one
    pub response: Option<Vec<u8>>,

    /// HTTP method
    pub method: Option<String>,

    /// Full request URL
    pub url: Option<String>,

    /// Response status code
    pub status_code: Option<u16>,
}

/// Fields the filter and the table need, borrowed from an exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeFields<'a> {
    pub method: &'a str,
    pub url: &'a str,
}

impl CapturedExchange {
    /// Decode a host record into an exchange with the given id
    pub fn from_record(id: u64, record: HostRecord) -> AppResult<Self> {
        let request = STANDARD.decode(record.request.as_bytes())?;
        let response = match record.response {
            Some(encoded) => Some(STANDARD.decode(encoded.as_bytes())?),
            None => None,
        };

        Ok(Self {
            id,
            captured_at: Utc::now(),
            request,
            response,
            method: record.method,
            url: record.url,
            status_code: record.status_code,
        })
    }

    /// Extract method and URL, failing when either is missing or blank
    pub fn fields(&self) -> AppResult<ExchangeFields<'_>> {
        let method = self
            .method
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| AppError::ExtractionError {
                id: self.id,
                reason: "missing HTTP method".to_string(),
            })?;
        let url = self
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AppError::ExtractionError {
                id: self.id,
                reason: "missing request URL".to_string(),
            })?;

        Ok(ExchangeFields { method, url })
    }

    /// Length of the response in bytes
    pub fn response_length(&self) -> Option<usize> {
        self.response.as_ref().map(Vec::len)
    }
}

/// A row of the results table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRow {
    /// Position in the filtered view
    pub index: usize,

    /// Identifier of the underlying exchange
    pub id: u64,

    pub method: String,
    pub url: String,

    /// Response status, absent when no response was captured
    pub status: Option<u16>,

    /// Response length, absent when no response was captured
    pub length: Option<usize>,
}

/// Request and response content for the viewers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeDetail {
    /// Selected row in the filtered view
    pub row: usize,

    pub id: u64,
    pub url: Option<String>,

    /// Raw request bytes, base64 encoded
    pub request: String,

    /// Raw response bytes, base64 encoded
    pub response: Option<String>,
}

impl ExchangeDetail {
    pub fn new(row: usize, exchange: &CapturedExchange) -> Self {
        Self {
            row,
            id: exchange.id,
            url: exchange.url.clone(),
            request: STANDARD.encode(&exchange.request),
            response: exchange.response.as_ref().map(|r| STANDARD.encode(r)),
        }
    }
}

/// Encode raw bytes the way host records carry them
pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

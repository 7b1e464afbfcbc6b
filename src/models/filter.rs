use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::utils::error::{AppError, AppResult};

/// Extensions enabled in a fresh file-type filter
pub const DEFAULT_FILE_TYPES: [&str; 5] = ["js", "gif", "jpg", "png", "css"];

/// Upper bound on URI substring patterns
pub const MAX_URI_PATTERNS: usize = 5;

/// The fixed set of methods the method filter knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = AppError;

    /// Exact, case-sensitive match against the fixed list
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| AppError::FilterError(format!("unsupported HTTP method: {}", s)))
    }
}

/// File-type criterion of the filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTypeFilter {
    /// Enabled extensions, without the leading dot
    #[serde(default)]
    pub extensions: BTreeSet<String>,

    /// Keep only matching URLs instead of rejecting them
    #[serde(default)]
    pub include: bool,
}

impl Default for FileTypeFilter {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_FILE_TYPES.iter().map(|ext| ext.to_string()).collect(),
            include: false,
        }
    }
}

/// User-edited filter criteria
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Enabled HTTP methods
    #[serde(default = "default_methods")]
    pub methods: BTreeSet<HttpMethod>,

    /// File-type criterion
    #[serde(default)]
    pub file_types: FileTypeFilter,

    /// URI substring patterns, OR-combined; blank entries are ignored
    #[serde(default = "default_uri_patterns")]
    pub uri_patterns: Vec<String>,
}

fn default_methods() -> BTreeSet<HttpMethod> {
    HttpMethod::ALL.iter().copied().collect()
}

fn default_uri_patterns() -> Vec<String> {
    vec![String::new()]
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            methods: default_methods(),
            file_types: FileTypeFilter::default(),
            uri_patterns: default_uri_patterns(),
        }
    }
}

impl FilterConfig {
    /// Default config with a custom set of enabled extensions
    pub fn with_file_types<I, S>(extensions: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        config.file_types.extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().to_string())
            .collect();
        config.validated()
    }

    /// Normalize extensions and check pattern bounds
    pub fn validated(mut self) -> AppResult<Self> {
        if self.uri_patterns.is_empty() || self.uri_patterns.len() > MAX_URI_PATTERNS {
            return Err(AppError::FilterError(format!(
                "expected 1 to {} URI patterns, got {}",
                MAX_URI_PATTERNS,
                self.uri_patterns.len()
            )));
        }

        let mut extensions = BTreeSet::new();
        for ext in &self.file_types.extensions {
            let normalized = ext.trim().trim_start_matches('.').to_lowercase();
            if normalized.is_empty() {
                return Err(AppError::FilterError(format!(
                    "invalid file extension: {:?}",
                    ext
                )));
            }
            extensions.insert(normalized);
        }
        self.file_types.extensions = extensions;

        Ok(self)
    }

    pub fn is_method_enabled(&self, method: HttpMethod) -> bool {
        self.methods.contains(&method)
    }

    /// Patterns that actually take part in matching
    pub fn active_uri_patterns(&self) -> impl Iterator<Item = &str> + '_ {
        self.uri_patterns
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
    }

    /// Append an empty URI pattern; false once the cap is reached
    pub fn add_uri_pattern(&mut self) -> bool {
        if self.uri_patterns.len() >= MAX_URI_PATTERNS {
            return false;
        }
        self.uri_patterns.push(String::new());
        true
    }
}

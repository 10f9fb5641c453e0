//! Export target identifiers: the closed (consumer, format) matrix.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A consumer or format identifier outside the closed set.
///
/// This is a user input error: surfaced to the caller as a client error,
/// never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown export target: {0}")]
pub struct UnknownTarget(pub String);

/// The three external consumers of the ownership graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Consumer {
    /// The bug-tracking system.
    Bugtracker,
    /// The mailing/notification system.
    Notify,
    /// The version-control access-control layer.
    Vcs,
}

impl Consumer {
    /// All consumers, in a fixed order.
    pub const ALL: [Consumer; 3] = [Consumer::Bugtracker, Consumer::Notify, Consumer::Vcs];

    pub fn as_str(&self) -> &'static str {
        match self {
            Consumer::Bugtracker => "bugtracker",
            Consumer::Notify => "notify",
            Consumer::Vcs => "vcs",
        }
    }
}

impl FromStr for Consumer {
    type Err = UnknownTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bugtracker" => Ok(Consumer::Bugtracker),
            "notify" => Ok(Consumer::Notify),
            "vcs" => Ok(Consumer::Vcs),
            other => Err(UnknownTarget(other.to_string())),
        }
    }
}

impl fmt::Display for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two wire encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Text,
    Json,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Text => "text",
            Format::Json => "json",
        }
    }

    /// HTTP content type for renderings in this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Text => "text/plain;charset=UTF-8",
            Format::Json => "application/json",
        }
    }
}

impl FromStr for Format {
    type Err = UnknownTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            other => Err(UnknownTarget(other.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cell of the (consumer, format) matrix; the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExportTarget {
    pub consumer: Consumer,
    pub format: Format,
}

impl ExportTarget {
    pub fn new(consumer: Consumer, format: Format) -> Self {
        Self { consumer, format }
    }

    /// Parse external string identifiers, e.g. from a query string.
    pub fn parse(consumer: &str, format: &str) -> Result<Self, UnknownTarget> {
        Ok(Self {
            consumer: consumer.parse()?,
            format: format.parse()?,
        })
    }
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.consumer, self.format)
    }
}

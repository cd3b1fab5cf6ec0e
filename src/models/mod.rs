use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::AppError;

pub mod download;
pub mod label;
pub mod preview;
pub mod product_page;

// Re-exports for convenience
pub use download::*;
pub use label::*;
pub use preview::*;
pub use product_page::*;

// Common enums used across models
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DownloadType {
    #[default]
    #[serde(rename = "")]
    None,
    Httpx,
    Selenium,
    Nodriver,
}

impl DownloadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadType::None => "",
            DownloadType::Httpx => "httpx",
            DownloadType::Selenium => "selenium",
            DownloadType::Nodriver => "nodriver",
        }
    }
}

impl fmt::Display for DownloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DownloadType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Ok(DownloadType::None),
            "httpx" => Ok(DownloadType::Httpx),
            "selenium" => Ok(DownloadType::Selenium),
            "nodriver" => Ok(DownloadType::Nodriver),
            other => Err(AppError::Validation(format!("Unknown download type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    #[default]
    Prefix,
    Regex,
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternType::Prefix => f.write_str("prefix"),
            PatternType::Regex => f.write_str("regex"),
        }
    }
}

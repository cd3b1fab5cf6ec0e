use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::DownloadType;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_dict_list: Option<Vec<Map<String, Value>>>,
    #[serde(default)]
    pub save: bool,
    #[serde(default)]
    pub load: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnErrorAction {
    #[default]
    Raise,
    Retry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnError {
    #[serde(default)]
    pub action_type: OnErrorAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_time: Option<f64>,
    /// CSS selector whose presence marks an error page.
    #[serde(default)]
    pub check_exist_tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitCssSelector {
    pub selector: String,
    #[serde(default = "default_wait_timeout")]
    pub timeout: u32, // seconds
    #[serde(default)]
    pub on_error: OnError,
    #[serde(default)]
    pub pre_wait_time: f64, // seconds
}

fn default_wait_timeout() -> u32 {
    10
}

fn default_pause_time() -> f64 {
    0.5
}

fn default_true() -> bool {
    true
}

/// A scripted step the browser performs after the page settles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageAction {
    Wait(WaitAction),
    Scroll(ScrollAction),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitAction {
    #[serde(default)]
    pub time: u32, // seconds
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScrollAction {
    #[serde(default)]
    pub to_bottom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u32>, // pixels
    #[serde(default = "default_pause_time")]
    pub pause_time: f64, // seconds
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodriverOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<Cookie>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_css_selector: Option<WaitCssSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_wait_time: Option<f64>,
    #[serde(default)]
    pub actions: Vec<PageAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub useragent: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeleniumOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<Cookie>,
    #[serde(default)]
    pub wait_css_selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_load_timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_wait_timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_wait_time: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpxOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<Cookie>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptOptions {
    #[serde(default)]
    pub add_prompt: String,
}

/// Options shared by every download mode.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonOptions {
    pub sitename: String,
    pub label: String,
    pub recreate_parser: bool,
    pub exclude_script: bool,
    pub compress_whitespace: bool,
    pub prompt: Option<PromptOptions>,
}

impl Default for CommonOptions {
    fn default() -> Self {
        Self {
            sitename: String::new(),
            label: String::new(),
            recreate_parser: false,
            exclude_script: true,
            compress_whitespace: false,
            prompt: None,
        }
    }
}

/// Mode specific options. Each variant carries only what is legal for its
/// download type.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DownloadMode {
    #[default]
    None,
    Httpx(HttpxOptions),
    Selenium(SeleniumOptions),
    Nodriver(NodriverOptions),
}

impl DownloadMode {
    pub fn download_type(&self) -> DownloadType {
        match self {
            DownloadMode::None => DownloadType::None,
            DownloadMode::Httpx(_) => DownloadType::Httpx,
            DownloadMode::Selenium(_) => DownloadType::Selenium,
            DownloadMode::Nodriver(_) => DownloadType::Nodriver,
        }
    }
}

/// Download settings for a label or product page, typed by download mode.
///
/// Stored and exchanged as the `download_type` discriminator plus a free-form
/// `download_config` object; see [`StoredDownload`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredDownload", into = "StoredDownload")]
pub struct DownloadConfig {
    pub common: CommonOptions,
    pub mode: DownloadMode,
}

/// Wire form of [`DownloadConfig`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredDownload {
    #[serde(default)]
    pub download_type: DownloadType,
    #[serde(default)]
    pub download_config: Value,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct OptionsDocument {
    #[serde(default)]
    sitename: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    recreate_parser: bool,
    #[serde(default = "default_true")]
    exclude_script: bool,
    #[serde(default)]
    compress_whitespace: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prompt: Option<PromptOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    httpx: Option<HttpxOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selenium: Option<SeleniumOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nodriver: Option<NodriverOptions>,
}

impl DownloadConfig {
    pub fn new(mode: DownloadMode) -> Self {
        Self {
            common: CommonOptions::default(),
            mode,
        }
    }

    /// Build a config from its stored discriminator and options object.
    ///
    /// Unknown keys and mode blocks that do not belong to `download_type` are
    /// rejected.
    pub fn from_parts(download_type: DownloadType, options: &Value) -> Result<Self, AppError> {
        let document: OptionsDocument = match options {
            Value::Null => OptionsDocument {
                exclude_script: true,
                ..Default::default()
            },
            Value::Object(_) => serde_json::from_value(options.clone()).map_err(|e| {
                AppError::Validation(format!("Invalid download_config: {}", e))
            })?,
            other => {
                return Err(AppError::Validation(format!(
                    "download_config must be an object, got {}",
                    json_kind(other)
                )));
            }
        };

        let blocks = [
            (DownloadType::Httpx, document.httpx.is_some()),
            (DownloadType::Selenium, document.selenium.is_some()),
            (DownloadType::Nodriver, document.nodriver.is_some()),
        ];
        for (block_type, present) in blocks {
            if present && block_type != download_type {
                return Err(AppError::Validation(format!(
                    "'{}' options are not allowed for download type '{}'",
                    block_type, download_type
                )));
            }
        }

        let mode = match download_type {
            DownloadType::None => DownloadMode::None,
            DownloadType::Httpx => DownloadMode::Httpx(document.httpx.unwrap_or_default()),
            DownloadType::Selenium => {
                DownloadMode::Selenium(document.selenium.unwrap_or_default())
            }
            DownloadType::Nodriver => {
                DownloadMode::Nodriver(document.nodriver.unwrap_or_default())
            }
        };

        Ok(Self {
            common: CommonOptions {
                sitename: document.sitename,
                label: document.label,
                recreate_parser: document.recreate_parser,
                exclude_script: document.exclude_script,
                compress_whitespace: document.compress_whitespace,
                prompt: document.prompt,
            },
            mode,
        })
    }

    pub fn download_type(&self) -> DownloadType {
        self.mode.download_type()
    }

    pub fn recreate_parser(&self) -> bool {
        self.common.recreate_parser
    }

    /// Copy of this config with `recreate_parser` forced to `value`.
    pub fn with_recreate_parser(&self, value: bool) -> Self {
        let mut copy = self.clone();
        copy.common.recreate_parser = value;
        copy
    }

    /// Options object handed to the fetch collaborator.
    pub fn to_options(&self) -> Value {
        let common = self.common.clone();
        let mut document = OptionsDocument {
            sitename: common.sitename,
            label: common.label,
            recreate_parser: common.recreate_parser,
            exclude_script: common.exclude_script,
            compress_whitespace: common.compress_whitespace,
            prompt: common.prompt,
            ..Default::default()
        };
        match &self.mode {
            DownloadMode::None => {}
            DownloadMode::Httpx(options) => document.httpx = Some(options.clone()),
            DownloadMode::Selenium(options) => document.selenium = Some(options.clone()),
            DownloadMode::Nodriver(options) => document.nodriver = Some(options.clone()),
        }
        serde_json::to_value(document).unwrap_or(Value::Object(Map::new()))
    }
}

impl TryFrom<StoredDownload> for DownloadConfig {
    type Error = AppError;

    fn try_from(stored: StoredDownload) -> Result<Self, Self::Error> {
        DownloadConfig::from_parts(stored.download_type, &stored.download_config)
    }
}

impl From<DownloadConfig> for StoredDownload {
    fn from(config: DownloadConfig) -> Self {
        StoredDownload {
            download_type: config.download_type(),
            download_config: config.to_options(),
        }
    }
}

/// Name of a JSON value's type, used in error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

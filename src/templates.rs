use serde_json::{json, Map, Value};

use crate::models::{
    CommonOptions, Cookie, DownloadConfig, DownloadMode, DownloadType, HttpxOptions, NodriverOptions,
    OnError, OnErrorAction, PromptOptions, SeleniumOptions, WaitCssSelector,
};
use crate::utils::error::Result;

/// Example download configuration for the registration form.
///
/// `option_type` is a download type string. Browser modes come back with a
/// populated options block; `""` and `httpx` only carry the common options.
pub fn download_config_template(option_type: &str) -> Result<DownloadConfig> {
    let common = CommonOptions {
        sitename: "example_site".to_string(),
        label: "example_label".to_string(),
        recreate_parser: false,
        exclude_script: true,
        compress_whitespace: true,
        prompt: Some(PromptOptions::default()),
    };

    let mode = match option_type.parse::<DownloadType>()? {
        DownloadType::None => DownloadMode::None,
        DownloadType::Httpx => DownloadMode::Httpx(HttpxOptions::default()),
        DownloadType::Nodriver => DownloadMode::Nodriver(NodriverOptions {
            cookie: Some(Cookie {
                cookie_dict_list: Some(vec![example_cookie()]),
                save: true,
                load: true,
            }),
            wait_css_selector: Some(WaitCssSelector {
                selector: "body".to_string(),
                timeout: 10,
                on_error: OnError {
                    action_type: OnErrorAction::Retry,
                    max_retries: Some(3),
                    wait_time: Some(2.0),
                    check_exist_tag: ".example-error".to_string(),
                },
                pre_wait_time: 0.0,
            }),
            page_wait_time: Some(5.0),
            ..Default::default()
        }),
        DownloadType::Selenium => DownloadMode::Selenium(SeleniumOptions {
            wait_css_selector: ".example-selector".to_string(),
            page_load_timeout: Some(30),
            tag_wait_timeout: Some(15),
            page_wait_time: Some(5.0),
            ..Default::default()
        }),
    };

    Ok(DownloadConfig { common, mode })
}

fn example_cookie() -> Map<String, Value> {
    let mut cookie = Map::new();
    cookie.insert("example_cookie".to_string(), json!("example_value"));
    cookie
}

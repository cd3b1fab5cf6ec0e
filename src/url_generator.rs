use encoding_rs::{Encoding, UTF_8};
use tracing::warn;
use url::Url;

use crate::models::LabelConfig;
use crate::utils::error::{AppError, Result};

// Codec names (lowercase, `_` folded to `-`) that the WHATWG registry does not
// know. The JIS X 0213 variants fall back to their JIS X 0208 base encoding.
const ENCODING_ALIASES: &[(&str, &str)] = &[
    ("cp932", "windows-31j"),
    ("ms932", "windows-31j"),
    ("mskanji", "windows-31j"),
    ("shift-jis-2004", "shift_jis"),
    ("shift-jisx0213", "shift_jis"),
    ("sjis-2004", "shift_jis"),
    ("euc-jis-2004", "euc-jp"),
    ("euc-jisx0213", "euc-jp"),
    ("eucjp", "euc-jp"),
    ("ujis", "euc-jp"),
    ("u-jis", "euc-jp"),
    ("iso2022-jp", "iso-2022-jp"),
    ("iso2022jp", "iso-2022-jp"),
    ("utf8", "utf-8"),
    ("u8", "utf-8"),
    ("utf", "utf-8"),
    ("cp1252", "windows-1252"),
];

/// Look up the encoding for a label such as `utf-8`, `shift_jis` or `euc-jp`.
///
/// Matching is case-insensitive and treats `_` and `-` alike, so codec names
/// like `EUC_JP` or `utf_8` resolve too. An empty label means UTF-8.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    let label = label.trim();
    if label.is_empty() {
        return Ok(UTF_8);
    }
    let lowered = label.to_ascii_lowercase();
    if let Some(encoding) = Encoding::for_label(lowered.as_bytes()) {
        return Ok(encoding);
    }

    let folded = lowered.replace('_', "-");
    let canonical = ENCODING_ALIASES
        .iter()
        .find(|(alias, _)| *alias == folded)
        .map_or(folded.as_str(), |(_, target)| *target);

    Encoding::for_label(canonical.as_bytes())
        .ok_or_else(|| AppError::UnknownEncoding(label.to_string()))
}

/// Percent-encode `keyword` after converting it to `encoding`.
///
/// Unreserved characters and `/` stay literal. Returns `None` when the keyword
/// has characters the encoding cannot represent.
pub fn encode_keyword(keyword: &str, encoding: &'static Encoding) -> Option<String> {
    let (bytes, _, had_errors) = encoding.encode(keyword);
    if had_errors {
        return None;
    }
    Some(urlencoding::encode_binary(&bytes).replace("%2F", "/"))
}

/// Expand a base URL and query key into one search URL per keyword.
///
/// Any query already on `base_url` is kept verbatim and the keyword fragment is
/// appended after it with `&`. Empty keywords are skipped, and an empty
/// `query_key` yields no URLs. Nothing else about the base URL is normalised.
pub fn generate_target_urls<S: AsRef<str>>(
    base_url: &str,
    query_key: &str,
    keywords: &[S],
    encoding: &str,
) -> Result<Vec<String>> {
    Url::parse(base_url).map_err(|_| AppError::InvalidUrl {
        url: base_url.to_string(),
    })?;
    let encoding = resolve_encoding(encoding)?;

    let (without_fragment, fragment) = match base_url.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (base_url, None),
    };
    let (path_part, existing_query) = match without_fragment.split_once('?') {
        Some((head, query)) => (head, query),
        None => (without_fragment, ""),
    };

    let mut target_urls = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        let keyword = keyword.as_ref();
        if keyword.is_empty() || query_key.is_empty() {
            continue;
        }
        let Some(encoded) = encode_keyword(keyword, encoding) else {
            warn!(
                keyword,
                encoding = encoding.name(),
                "Skipping keyword that cannot be represented in the query encoding"
            );
            continue;
        };

        let mut url = String::with_capacity(base_url.len() + query_key.len() + encoded.len() + 2);
        url.push_str(path_part);
        url.push('?');
        if !existing_query.is_empty() {
            url.push_str(existing_query);
            url.push('&');
        }
        url.push_str(query_key);
        url.push('=');
        url.push_str(&encoded);
        if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
            url.push('#');
            url.push_str(fragment);
        }
        target_urls.push(url);
    }
    Ok(target_urls)
}

/// [`generate_target_urls`] driven by a saved label.
pub fn label_target_urls<S: AsRef<str>>(label: &LabelConfig, keywords: &[S]) -> Result<Vec<String>> {
    generate_target_urls(&label.base_url, &label.query, keywords, &label.query_encoding)
}

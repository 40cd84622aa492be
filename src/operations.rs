/// Tab list cleanup: URL deduplication and internal-page filtering.
use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::api::BrowserContext;
use crate::browser::BrowserKind;
use crate::error::Error;
use crate::tab_data::TabRecord;

/// Schemes that may appear in a user-facing link list.
fn protocol_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(https?|ftp|ssh)://").expect("protocol regex"))
}

/// Clean a raw tab list for display and copying.
///
/// Two stages, both pure:
/// 1. dedupe by URL, last occurrence wins, output ordered by first
///    appearance of each retained URL;
/// 2. drop tabs whose URL is not http/https/ftp/ssh or starts with one of
///    the browser's internal prefixes (`chrome://`, `about:`, ...).
pub fn process_tabs(tabs: &[TabRecord], kind: BrowserKind) -> Vec<TabRecord> {
    filter_internal_urls(dedupe_by_url(tabs), kind)
}

/// Keep one tab per URL. The last occurrence supplies the metadata, the
/// first occurrence supplies the position.
fn dedupe_by_url(tabs: &[TabRecord]) -> Vec<TabRecord> {
    let mut slot_by_url: HashMap<&str, usize> = HashMap::new();
    let mut kept: Vec<TabRecord> = Vec::new();

    for tab in tabs {
        match slot_by_url.get(tab.url.as_str()) {
            Some(&slot) => kept[slot] = tab.clone(),
            None => {
                slot_by_url.insert(tab.url.as_str(), kept.len());
                kept.push(tab.clone());
            }
        }
    }

    kept
}

fn filter_internal_urls(tabs: Vec<TabRecord>, kind: BrowserKind) -> Vec<TabRecord> {
    let prefixes = kind.internal_prefixes();

    tabs.into_iter()
        .filter(|tab| {
            protocol_pattern().is_match(&tab.url)
                && !prefixes.iter().any(|prefix| tab.url.starts_with(prefix))
        })
        .collect()
}

/// Query the current window's tabs and run them through `process_tabs`.
pub async fn current_tabs(ctx: &BrowserContext) -> Result<Vec<TabRecord>, Error> {
    let tabs = ctx.api().tabs()?;
    let raw = tabs.query_current_window().await?;
    log::debug!("queried {} tabs from current window", raw.len());
    Ok(process_tabs(&raw, ctx.kind()))
}

/// Free-form URL import: parsing pasted text and opening the results.
use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::{BrowserContext, TabCreate, sleep_ms};
use crate::browser::BrowserKind;
use crate::error::Error;
use crate::tab_data::UrlEntry;

fn url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)https?://[^\s,;"'\[\]{}()]+"#).expect("url extraction regex")
    })
}

fn scheme_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^https?://").expect("scheme regex"))
}

/// Bare-domain shape: dot-separated host labels, no scheme, no path.
fn domain_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
        )
        .expect("domain shape regex")
    })
}

fn quoted_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"["']([^"']+)["']"#).expect("quoted title regex"))
}

/// Extract, normalize and deduplicate URLs from arbitrary pasted text.
///
/// Segments are split on newlines and semicolons. Within a segment, URLs
/// are matched by pattern; a segment (or comma column) shaped like a bare
/// domain is promoted to `https://`. Candidates that fail URL parsing or
/// have a host shorter than three characters are dropped without
/// surfacing an error (best-effort import). Deduplication is first-wins,
/// unlike the tab processor's last-wins.
pub fn parse_urls(text: &str) -> Vec<UrlEntry> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut entries: Vec<UrlEntry> = Vec::new();

    for segment in text.split(['\n', ';']) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        for candidate in extract_candidates(segment) {
            let Some(url) = normalize_url(&candidate) else {
                continue;
            };
            if !seen.insert(url.clone()) {
                continue;
            }
            let title = title_from_segment(segment, &url);
            entries.push(UrlEntry { url, title, original_text: Some(segment.to_string()) });
        }
    }

    entries
}

fn extract_candidates(segment: &str) -> Vec<String> {
    let matches: Vec<String> = url_pattern()
        .find_iter(segment)
        .map(|m| m.as_str().to_string())
        .collect();
    if !matches.is_empty() {
        return matches;
    }

    // No scheme anywhere; promote comma columns that look like bare domains.
    segment
        .split(',')
        .filter_map(|piece| {
            let piece = piece.trim();
            if piece.contains('.') && domain_pattern().is_match(piece) {
                Some(format!("https://{piece}"))
            } else {
                None
            }
        })
        .collect()
}

/// Clean one candidate and validate it as an absolute URL. `None` means
/// the candidate is silently dropped.
fn normalize_url(candidate: &str) -> Option<String> {
    let cleaned = candidate.trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace());
    if cleaned.is_empty() {
        return None;
    }

    let with_scheme = if scheme_pattern().is_match(cleaned) {
        cleaned.to_string()
    } else {
        format!("https://{cleaned}")
    };

    match Url::parse(&with_scheme) {
        Ok(parsed) if parsed.host_str().is_some_and(|host| host.len() >= 3) => {
            Some(parsed.to_string())
        }
        Ok(_) => {
            log::debug!("{}", Error::InvalidUrl(format!("{candidate} (host too short)")));
            None
        }
        Err(err) => {
            log::debug!("{}", Error::InvalidUrl(format!("{candidate}: {err}")));
            None
        }
    }
}

/// Recover a human title from the segment the URL came from: prefer a
/// comma column that is neither the URL nor URL-like, then a quoted
/// substring, then the URL itself.
fn title_from_segment(segment: &str, url: &str) -> String {
    if segment.contains(',') {
        for part in segment.split(',') {
            let part = part.trim();
            if !part.is_empty() && part != url && !part.contains("http") {
                return part.to_string();
            }
        }
    }

    if let Some(captures) = quoted_pattern().captures(segment) {
        if &captures[1] != url {
            return captures[1].to_string();
        }
    }

    url.to_string()
}

/// Preview of what an import would do; pure, no side effects.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub is_valid: bool,
    pub url_count: usize,
    /// First ten entries only.
    pub urls: Vec<UrlEntry>,
    pub has_more: bool,
    pub errors: Vec<String>,
}

pub fn validate_import_text(text: &str) -> ImportPreview {
    let parsed = parse_urls(text);
    let url_count = parsed.len();

    ImportPreview {
        is_valid: url_count > 0,
        has_more: url_count > 10,
        urls: parsed.into_iter().take(10).collect(),
        url_count,
        errors: if url_count == 0 {
            vec!["No valid URLs found".to_string()]
        } else {
            Vec::new()
        },
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportOptions {
    /// Skip URLs that are already open in some tab.
    pub deduplicate: bool,
    /// Hard cap on tabs opened by one import.
    pub max_tabs: usize,
    pub open_in_background: bool,
    /// Only honored on Chrome and Edge.
    pub window_id: Option<i32>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            deduplicate: true,
            max_tabs: 20,
            open_in_background: true,
            window_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub parsed: usize,
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// Open a tab per entry, softly: per-URL failures are counted and
/// reported, never propagated.
pub async fn create_tabs_from_urls(
    ctx: &BrowserContext,
    urls: &[UrlEntry],
    options: &ImportOptions,
) -> ImportOutcome {
    let mut outcome = ImportOutcome { parsed: urls.len(), ..Default::default() };
    if urls.is_empty() {
        return outcome;
    }

    let tabs = match ctx.api().tabs() {
        Ok(tabs) => tabs,
        Err(err) => {
            log::error!("tabs API unavailable: {err}");
            outcome.failed = urls.len();
            outcome.errors.push(err.to_string());
            return outcome;
        }
    };

    let mut to_open: Vec<&UrlEntry> = urls.iter().collect();

    if options.deduplicate {
        match tabs.query_all().await {
            Ok(existing) => {
                let open_urls: HashSet<String> =
                    existing.into_iter().map(|tab| tab.url).collect();
                to_open.retain(|entry| {
                    if open_urls.contains(&entry.url) {
                        outcome.skipped += 1;
                        false
                    } else {
                        true
                    }
                });
            }
            Err(err) => {
                log::error!("failed to query existing tabs for deduplication: {err}");
            }
        }
    }

    if to_open.len() > options.max_tabs {
        log::warn!("limiting import to {} of {} urls", options.max_tabs, to_open.len());
        to_open.truncate(options.max_tabs);
    }

    // Pacing keeps large imports from flooding the host; ordering does not
    // depend on it.
    let paced = to_open.len() > 5;

    for entry in to_open {
        let window_id = match ctx.kind() {
            BrowserKind::Chrome | BrowserKind::Edge => options.window_id,
            _ => None,
        };
        let create = TabCreate {
            url: entry.url.clone(),
            active: !options.open_in_background,
            window_id,
        };

        match tabs.create(&create).await {
            Ok(()) => {
                outcome.success += 1;
                if paced {
                    sleep_ms(100).await;
                }
            }
            Err(err) => {
                log::error!("failed to create tab for {}: {err}", entry.url);
                outcome.failed += 1;
                outcome.errors.push(format!("{}: {err}", entry.url));
            }
        }
    }

    outcome
}

/// Parse pasted text and open the result in one step.
pub async fn import_and_create_tabs(
    ctx: &BrowserContext,
    text: &str,
    options: &ImportOptions,
) -> ImportOutcome {
    let urls = parse_urls(text);
    if urls.is_empty() {
        return ImportOutcome {
            errors: vec!["No valid URLs found in the input text".to_string()],
            ..Default::default()
        };
    }
    create_tabs_from_urls(ctx, &urls, options).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_dedupe_keeps_order() {
        let entries = parse_urls("https://a.com, https://b.com\nhttps://a.com");
        let urls: Vec<&str> = entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, ["https://a.com/", "https://b.com/"]);
    }

    #[test]
    fn test_plain_prose_yields_nothing() {
        assert!(parse_urls("not a url").is_empty());
        assert!(parse_urls("").is_empty());
        assert!(parse_urls("   \n \n").is_empty());
    }

    #[test]
    fn test_csv_title_column_recovery() {
        let entries = parse_urls("Google, https://google.com\nhttps://bing.com");

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url, "https://google.com/");
        assert_eq!(entries[0].title, "Google");
        assert_eq!(entries[1].url, "https://bing.com/");
        // No title column for the second line, so the URL stands in.
        assert_eq!(entries[1].title, "https://bing.com/");
    }

    #[test]
    fn test_bare_domain_is_promoted_to_https() {
        let entries = parse_urls("example.com");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://example.com/");
    }

    #[test]
    fn test_comma_separated_bare_domains() {
        let entries = parse_urls("a.com, b.org");
        let urls: Vec<&str> = entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, ["https://a.com/", "https://b.org/"]);
    }

    #[test]
    fn test_semicolon_separated_urls() {
        let entries = parse_urls("https://a.com;https://b.com");
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_quoted_title_recovery() {
        let entries = parse_urls("\"My Site\" https://mysite.example");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "My Site");
    }

    #[test]
    fn test_short_host_is_dropped() {
        assert!(parse_urls("https://ab").is_empty());
    }

    #[test]
    fn test_wrapping_quotes_are_stripped() {
        let entries = parse_urls("'https://quoted.com'");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://quoted.com/");
    }

    #[test]
    fn test_original_text_is_preserved() {
        let entries = parse_urls("Docs, https://docs.example.com");
        assert_eq!(
            entries[0].original_text.as_deref(),
            Some("Docs, https://docs.example.com")
        );
    }

    #[test]
    fn test_validate_preview_happy_path() {
        let preview = validate_import_text("https://a.com\nhttps://b.com");
        assert!(preview.is_valid);
        assert_eq!(preview.url_count, 2);
        assert_eq!(preview.urls.len(), 2);
        assert!(!preview.has_more);
        assert!(preview.errors.is_empty());
    }

    #[test]
    fn test_validate_preview_truncates_to_ten() {
        let text: String = (0..12)
            .map(|i| format!("https://site{i}.com\n"))
            .collect();
        let preview = validate_import_text(&text);
        assert!(preview.is_valid);
        assert_eq!(preview.url_count, 12);
        assert_eq!(preview.urls.len(), 10);
        assert!(preview.has_more);
    }

    #[test]
    fn test_validate_preview_reports_empty_input() {
        let preview = validate_import_text("nothing useful here");
        assert!(!preview.is_valid);
        assert_eq!(preview.url_count, 0);
        assert_eq!(preview.errors, vec!["No valid URLs found".to_string()]);
    }

    #[test]
    fn test_import_options_defaults() {
        let options = ImportOptions::default();
        assert!(options.deduplicate);
        assert_eq!(options.max_tabs, 20);
        assert!(options.open_in_background);
        assert!(options.window_id.is_none());
    }

    #[test]
    fn test_import_options_deserialize_partial() {
        let options: ImportOptions =
            serde_json::from_str(r#"{"maxTabs": 5, "openInBackground": false}"#).unwrap();
        assert_eq!(options.max_tabs, 5);
        assert!(!options.open_in_background);
        assert!(options.deduplicate);
    }
}

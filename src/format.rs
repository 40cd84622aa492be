/// Link rendering for the copy actions.
///
/// The five output encodings are a compatibility surface: users paste them
/// into their own workflows, so the punctuation here is exact and must not
/// drift between releases.
use serde::{Deserialize, Serialize};

use crate::api::BrowserContext;
use crate::error::Error;
use crate::settings;
use crate::tab_data::TabRecord;

/// Separator between entries for plaintext, markdown and HTML output.
/// CSV always joins with a single LF and JSON entries are comma-joined
/// inside one array.
pub const DEFAULT_SEPARATOR: &str = "\r\n\r\n";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Plaintext,
    Json,
    Csv,
    Markdown,
    Html,
}

impl ExportFormat {
    /// Parse a stored preference key. Unrecognised values fall back to
    /// plaintext, matching what existing profiles expect.
    pub fn from_key(key: &str) -> ExportFormat {
        match key {
            "json" => ExportFormat::Json,
            "csv" => ExportFormat::Csv,
            "markdown" => ExportFormat::Markdown,
            "html" => ExportFormat::Html,
            _ => ExportFormat::Plaintext,
        }
    }

    pub fn as_key(self) -> &'static str {
        match self {
            ExportFormat::Plaintext => "plaintext",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Html => "html",
        }
    }
}

/// What the user asked to copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTarget {
    /// Every entry in the rendered list.
    All,
    /// The highlighted subset (the caller passes only those entries).
    Highlighted,
    /// One tab, by id.
    Tab(i32),
}

impl CopyTarget {
    /// Decode the raw button id the UI sends ("copyAll", "copyHighlighted"
    /// or a numeric tab id). An unparseable id maps to `i32::MIN`, which
    /// must stay distinct from the -1 used for tabs whose host omitted an
    /// id, so a garbage target can never match a real entry.
    pub fn from_raw(raw: &str) -> CopyTarget {
        match raw {
            "copyAll" => CopyTarget::All,
            "copyHighlighted" => CopyTarget::Highlighted,
            other => other
                .parse()
                .map(CopyTarget::Tab)
                .unwrap_or(CopyTarget::Tab(i32::MIN)),
        }
    }
}

/// Render `entries` for the clipboard.
///
/// A `Tab(id)` target renders that one entry; a lookup miss is a soft
/// failure that logs and returns an empty string so the copy action as a
/// whole cannot blow up the popup.
pub fn format_links(
    entries: &[TabRecord],
    target: CopyTarget,
    format: ExportFormat,
    include_name: bool,
    separator: &str,
) -> String {
    match target {
        CopyTarget::Tab(id) => match entries.iter().find(|tab| tab.id == id) {
            Some(tab) => render_entry(&tab.title, &tab.url, format, include_name),
            None => {
                log::error!("{}", Error::EntryNotFound(id));
                String::new()
            }
        },
        CopyTarget::All | CopyTarget::Highlighted => {
            let rendered: Vec<String> = entries
                .iter()
                .map(|tab| render_entry(&tab.title, &tab.url, format, include_name))
                .collect();

            match format {
                ExportFormat::Csv => rendered.join("\n"),
                ExportFormat::Json => format!("[{}]", rendered.join(",")),
                _ => rendered.join(separator),
            }
        }
    }
}

/// Render with the user's stored format preferences.
pub async fn copy_text(
    ctx: &BrowserContext,
    target: CopyTarget,
    entries: &[TabRecord],
) -> String {
    let prefs = settings::get_all_settings(ctx).await;
    format_links(entries, target, prefs.format, prefs.include_name, DEFAULT_SEPARATOR)
}

fn render_entry(title: &str, url: &str, format: ExportFormat, include_name: bool) -> String {
    match format {
        ExportFormat::Plaintext => plain_text(title, url, include_name),
        ExportFormat::Markdown => markdown_text(title, url, include_name),
        ExportFormat::Csv => csv_text(title, url, include_name),
        ExportFormat::Json => json_text(title, url, include_name),
        ExportFormat::Html => html_text(title, url, include_name),
    }
}

fn plain_text(title: &str, url: &str, include_name: bool) -> String {
    if include_name && !title.trim().is_empty() {
        format!("\"{title}\" : {url}")
    } else {
        url.to_string()
    }
}

fn markdown_text(title: &str, url: &str, include_name: bool) -> String {
    let shown = if include_name && !title.trim().is_empty() { title } else { "" };
    format!("[{shown}]({url})")
}

fn csv_text(title: &str, url: &str, include_name: bool) -> String {
    let mut out = String::new();
    if include_name {
        let shown = if title.trim().is_empty() { url } else { title };
        out.push('"');
        out.push_str(&shown.replace('"', "\\\""));
        out.push_str("\",");
    }
    out.push('"');
    out.push_str(&url.replace('"', "\\\""));
    out.push('"');
    out
}

fn json_text(title: &str, url: &str, include_name: bool) -> String {
    let mut out = String::from("{");
    if include_name && !title.is_empty() {
        out.push_str("\n   \"title\": ");
        out.push_str(&json_string(title));
        out.push(',');
    }
    out.push_str("\n   \"url\": ");
    out.push_str(&json_string(url));
    out.push_str(" \n}");
    out
}

fn html_text(title: &str, url: &str, include_name: bool) -> String {
    let shown = if include_name && !title.trim().is_empty() { title } else { "Page Link" };
    format!("<a href=\"{url}\">{shown}</a>")
}

/// Quote and escape one JSON string value. Infallible for strings.
fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Host browser identification and per-browser capability table.
use serde::{Deserialize, Serialize};

/// The browsers LinkPilot ships on, plus a catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    Chrome,
    Firefox,
    Safari,
    Edge,
    Opera,
    Unknown,
}

impl BrowserKind {
    /// Detect the browser from a user-agent string.
    ///
    /// The match order matters: Edge must be checked before Chrome (the
    /// Edge UA contains "chrome/") and Chrome before Safari (the Chrome
    /// UA contains "safari/"). An empty or unrecognised UA yields
    /// `Unknown`; this never fails.
    pub fn from_user_agent(user_agent: &str) -> BrowserKind {
        let ua = user_agent.to_lowercase();

        if ua.contains("edg/") || ua.contains("edge/") {
            BrowserKind::Edge
        } else if ua.contains("chrome/") {
            BrowserKind::Chrome
        } else if ua.contains("firefox/") {
            BrowserKind::Firefox
        } else if ua.contains("safari/") {
            BrowserKind::Safari
        } else if ua.contains("opr/") || ua.contains("opera/") {
            BrowserKind::Opera
        } else {
            BrowserKind::Unknown
        }
    }

    pub fn supports_manifest_v3(self) -> bool {
        matches!(self, BrowserKind::Chrome | BrowserKind::Edge)
    }

    /// Preferred manifest version for packaging on this browser.
    pub fn manifest_version(self) -> u8 {
        if self.supports_manifest_v3() { 3 } else { 2 }
    }

    /// Static capability row for this browser. Browsers without their own
    /// row (Opera, Unknown) use the Chrome row.
    pub fn capabilities(self) -> &'static Capabilities {
        match self {
            BrowserKind::Chrome => &CHROME,
            BrowserKind::Edge => &EDGE,
            BrowserKind::Firefox => &FIREFOX,
            BrowserKind::Safari => &SAFARI,
            BrowserKind::Opera | BrowserKind::Unknown => &CHROME,
        }
    }

    /// URL prefixes of pages that only exist inside this browser's own UI
    /// (settings pages, extension pages). These never belong in a
    /// user-facing link list.
    pub fn internal_prefixes(self) -> &'static [&'static str] {
        match self {
            BrowserKind::Chrome => &["chrome://", "chrome-extension://"],
            BrowserKind::Firefox => &["moz-extension://", "about:"],
            BrowserKind::Safari => &["safari-extension://", "safari-web-extension://"],
            BrowserKind::Edge => &["edge://", "extension://"],
            BrowserKind::Opera | BrowserKind::Unknown => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Safari => "safari",
            BrowserKind::Edge => "edge",
            BrowserKind::Opera => "opera",
            BrowserKind::Unknown => "unknown",
        }
    }
}

/// Icon sizes (in pixels) the browser expects in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IconSizes {
    pub small: u32,
    pub medium: u32,
    pub large: u32,
    pub toolbar: u32,
}

/// Per-browser limits and feature flags. Compile-time constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub max_storage_items: u32,
    pub max_storage_bytes: u64,
    pub supports_offscreen: bool,
    pub supports_declarative_net_request: bool,
    pub icon_sizes: IconSizes,
}

const CHROME: Capabilities = Capabilities {
    max_storage_items: 100_000,
    max_storage_bytes: 10 * 1024 * 1024,
    supports_offscreen: true,
    supports_declarative_net_request: true,
    icon_sizes: IconSizes { small: 16, medium: 32, large: 128, toolbar: 16 },
};

const EDGE: Capabilities = Capabilities {
    max_storage_items: 100_000,
    max_storage_bytes: 10 * 1024 * 1024,
    supports_offscreen: true,
    supports_declarative_net_request: true,
    icon_sizes: IconSizes { small: 16, medium: 32, large: 128, toolbar: 16 },
};

const FIREFOX: Capabilities = Capabilities {
    max_storage_items: 50_000,
    max_storage_bytes: 5 * 1024 * 1024,
    supports_offscreen: false,
    supports_declarative_net_request: false,
    icon_sizes: IconSizes { small: 16, medium: 32, large: 48, toolbar: 16 },
};

const SAFARI: Capabilities = Capabilities {
    max_storage_items: 10_000,
    max_storage_bytes: 1024 * 1024,
    supports_offscreen: false,
    supports_declarative_net_request: false,
    icon_sizes: IconSizes { small: 16, medium: 32, large: 64, toolbar: 16 },
};

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const EDGE_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";
    const FIREFOX_UA: &str =
        "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const SAFARI_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15";
    const OPERA_UA: &str = "Opera/9.80 (X11; Linux x86_64) Presto/2.12.388 Version/12.16";

    #[test]
    fn test_detect_chrome() {
        assert_eq!(BrowserKind::from_user_agent(CHROME_UA), BrowserKind::Chrome);
    }

    #[test]
    fn test_detect_edge_before_chrome() {
        // Edge UA contains "chrome/" too; Edge has to win.
        assert_eq!(BrowserKind::from_user_agent(EDGE_UA), BrowserKind::Edge);
    }

    #[test]
    fn test_detect_chrome_before_safari() {
        // Chrome UA contains "safari/" too; Chrome has to win.
        assert!(CHROME_UA.to_lowercase().contains("safari/"));
        assert_eq!(BrowserKind::from_user_agent(CHROME_UA), BrowserKind::Chrome);
    }

    #[test]
    fn test_detect_firefox() {
        assert_eq!(
            BrowserKind::from_user_agent(FIREFOX_UA),
            BrowserKind::Firefox
        );
    }

    #[test]
    fn test_detect_safari() {
        assert_eq!(BrowserKind::from_user_agent(SAFARI_UA), BrowserKind::Safari);
    }

    #[test]
    fn test_detect_opera() {
        assert_eq!(BrowserKind::from_user_agent(OPERA_UA), BrowserKind::Opera);
    }

    #[test]
    fn test_detect_unknown() {
        assert_eq!(BrowserKind::from_user_agent(""), BrowserKind::Unknown);
        assert_eq!(
            BrowserKind::from_user_agent("curl/8.4.0"),
            BrowserKind::Unknown
        );
    }

    #[test]
    fn test_manifest_versions() {
        assert_eq!(BrowserKind::Chrome.manifest_version(), 3);
        assert_eq!(BrowserKind::Edge.manifest_version(), 3);
        assert_eq!(BrowserKind::Firefox.manifest_version(), 2);
        assert_eq!(BrowserKind::Safari.manifest_version(), 2);
        assert_eq!(BrowserKind::Unknown.manifest_version(), 2);
    }

    #[test]
    fn test_capability_rows() {
        let firefox = BrowserKind::Firefox.capabilities();
        assert_eq!(firefox.max_storage_items, 50_000);
        assert_eq!(firefox.max_storage_bytes, 5 * 1024 * 1024);
        assert!(!firefox.supports_offscreen);
        assert_eq!(firefox.icon_sizes.large, 48);

        let safari = BrowserKind::Safari.capabilities();
        assert_eq!(safari.max_storage_items, 10_000);
        assert_eq!(safari.icon_sizes.large, 64);

        let chrome = BrowserKind::Chrome.capabilities();
        assert!(chrome.supports_declarative_net_request);
        assert_eq!(chrome.icon_sizes.large, 128);
    }

    #[test]
    fn test_unknown_browser_uses_chrome_row() {
        assert_eq!(
            BrowserKind::Unknown.capabilities(),
            BrowserKind::Chrome.capabilities()
        );
        assert_eq!(
            BrowserKind::Opera.capabilities(),
            BrowserKind::Chrome.capabilities()
        );
    }

    #[test]
    fn test_internal_prefixes_per_browser() {
        assert!(BrowserKind::Chrome.internal_prefixes().contains(&"chrome://"));
        assert!(BrowserKind::Firefox.internal_prefixes().contains(&"about:"));
        assert!(
            BrowserKind::Safari
                .internal_prefixes()
                .contains(&"safari-web-extension://")
        );
        assert!(BrowserKind::Edge.internal_prefixes().contains(&"edge://"));
        assert!(BrowserKind::Unknown.internal_prefixes().is_empty());
    }
}

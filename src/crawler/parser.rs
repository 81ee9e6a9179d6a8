//! Asset extraction from found documents
//!
//! Live pages embed their image assets in `<meta>` tags pointing at the
//! hosted storage bucket. Two fixed patterns are looked for:
//!
//! | Kind | Element | Content prefix |
//! |------|---------|----------------|
//! | primary (gif) | `<meta itemprop="image" content="...">` | `http://prod-mr-user.storage.googleapis.com/assets/` |
//! | preview (jpg) | `<meta property="og:image" content="...">` | `http://prod-mr-user.storage.googleapis.com/assets/` |
//!
//! The captured path is the raw text from `assets/` up to (not including)
//! the `?` query marker, kept byte for byte. `https` is accepted for the
//! same host.

use crate::crawler::fetcher::Document;
use scraper::{Html, Selector};
use url::Url;

/// Host serving the asset bucket
pub const ASSET_HOST: &str = "prod-mr-user.storage.googleapis.com";

/// Storage path every hosted asset lives under
pub const ASSET_PATH_PREFIX: &str = "/assets/";

/// Which of the two embedded assets a reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// The animated gif itself
    Primary,

    /// The still jpg preview
    Preview,
}

/// A path token extracted from a found document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    pub kind: AssetKind,

    /// Bucket-relative path, e.g. `assets/foo_1.gif`
    pub path: String,
}

/// Result of running both patterns over one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedAssets {
    pub primary: Option<AssetReference>,
    pub preview: Option<AssetReference>,
}

impl ExtractedAssets {
    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.preview.is_none()
    }

    /// References in emission order: primary first
    pub fn iter(&self) -> impl Iterator<Item = &AssetReference> {
        self.primary.iter().chain(self.preview.iter())
    }
}

/// One fixed structural pattern
#[derive(Debug, Clone, Copy)]
pub struct AssetPattern {
    pub kind: AssetKind,

    /// CSS selector for the carrying element
    pub selector: &'static str,
}

/// `<meta itemprop="image" content="http://prod-mr-user.storage.googleapis.com/assets/...">`
pub const PRIMARY_PATTERN: AssetPattern = AssetPattern {
    kind: AssetKind::Primary,
    selector: r#"meta[itemprop="image"][content]"#,
};

/// `<meta property="og:image" content="http://prod-mr-user.storage.googleapis.com/assets/...">`
pub const PREVIEW_PATTERN: AssetPattern = AssetPattern {
    kind: AssetKind::Preview,
    selector: r#"meta[property="og:image"][content]"#,
};

impl AssetPattern {
    /// Returns the first element matching this pattern, if any
    ///
    /// Elements whose content does not point into the asset bucket are
    /// skipped, so a later hosted match still wins over an earlier foreign one.
    pub fn find(&self, html: &Html) -> Option<AssetReference> {
        let selector = Selector::parse(self.selector).ok()?;

        html.select(&selector)
            .filter_map(|element| element.value().attr("content"))
            .find_map(hosted_asset_path)
            .map(|path| AssetReference {
                kind: self.kind,
                path,
            })
    }
}

/// Extracts both asset references from a found document
///
/// Pure: the same text always yields the same result. A missing match is an
/// empty field, never an error.
///
/// # Example
///
/// ```
/// use giferator_disco::crawler::{extract, Document};
///
/// let document = Document {
///     id: 1,
///     url: "http://giferator.easports.com/gif/1".to_string(),
///     body: r#"<meta itemprop="image" content="http://prod-mr-user.storage.googleapis.com/assets/foo_1.gif?v=abc" />"#.to_string(),
/// };
/// let assets = extract(&document);
/// assert_eq!(assets.primary.unwrap().path, "assets/foo_1.gif");
/// assert!(assets.preview.is_none());
/// ```
pub fn extract(document: &Document) -> ExtractedAssets {
    extract_from_html(&document.body)
}

/// Same as `extract`, on raw text
pub fn extract_from_html(text: &str) -> ExtractedAssets {
    let html = Html::parse_document(text);

    ExtractedAssets {
        primary: PRIMARY_PATTERN.find(&html),
        preview: PREVIEW_PATTERN.find(&html),
    }
}

/// Runs only the primary (gif) pattern
pub fn match_primary(text: &str) -> Option<AssetReference> {
    PRIMARY_PATTERN.find(&Html::parse_document(text))
}

/// Runs only the preview (jpg) pattern
pub fn match_preview(text: &str) -> Option<AssetReference> {
    PREVIEW_PATTERN.find(&Html::parse_document(text))
}

/// Returns the bucket-relative path if `content` is an asset bucket URL
///
/// The URL is parsed only to check scheme and host. The path is the raw text
/// after the host, so it is never percent-encoded or dot-normalized.
fn hosted_asset_path(content: &str) -> Option<String> {
    let content = content.trim();
    let url = Url::parse(content).ok()?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    if url.host_str()? != ASSET_HOST {
        return None;
    }

    let (_, rest) = content.split_once("://")?;
    if !rest.get(..ASSET_HOST.len())?.eq_ignore_ascii_case(ASSET_HOST) {
        return None;
    }

    let raw = &rest[ASSET_HOST.len()..];
    let end = raw.find(|c| c == '?' || c == '#').unwrap_or(raw.len());
    let path = &raw[..end];

    if !path.starts_with(ASSET_PATH_PREFIX) || path.len() == ASSET_PATH_PREFIX.len() {
        return None;
    }

    Some(path.strip_prefix('/')?.to_string())
}

//! Photo link resolution.
//!
//! Catalog entries are Google Drive *view* links
//! (`https://drive.google.com/file/d/<id>/view?usp=drivesdk`), which browsers
//! cannot use as an image source. This module extracts the file id and
//! builds direct image URLs from it.
//!
//! Nothing here touches the network and nothing here fails: a link that does
//! not look like a Drive file link is passed through unchanged.
//!
//! # Fallback order
//!
//! | # | Form | URL |
//! |---|------|-----|
//! | 1 | thumbnail CDN | `https://lh3.googleusercontent.com/d/{id}` |
//! | 2 | direct content | `https://drive.google.com/uc?export=view&id={id}` |
//! | 3 | sized thumbnail | `https://drive.google.com/thumbnail?id={id}&sz=w800-h600` |
//!
//! A client shows #1 first and walks down the list only when the current URL
//! fails to render. [`FallbackChain`] is that walk as a state machine.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::models::PhotoRef;

static FILE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"drive\.google\.com/file/d/([A-Za-z0-9_-]+)").expect("file id pattern compiles")
});

/// Number of preview thumbnails shown per event card.
pub const PREVIEW_LIMIT: usize = 3;

/// Extract the Drive file id from a view link.
pub fn file_id(photo: &str) -> Option<&str> {
    FILE_ID
        .captures(photo)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn cdn_url(id: &str) -> String {
    format!("https://lh3.googleusercontent.com/d/{}", id)
}

fn content_url(id: &str) -> String {
    format!("https://drive.google.com/uc?export=view&id={}", id)
}

fn sized_thumbnail_url(id: &str) -> String {
    format!("https://drive.google.com/thumbnail?id={}&sz=w800-h600", id)
}

/// The URL to try first for a photo.
pub fn resolve(photo: &str) -> String {
    match file_id(photo) {
        Some(id) => cdn_url(id),
        None => photo.to_string(),
    }
}

/// All candidate URLs for a photo in priority order. Never empty.
pub fn alternatives(photo: &str) -> Vec<String> {
    match file_id(photo) {
        Some(id) => vec![cdn_url(id), content_url(id), sized_thumbnail_url(id)],
        None => vec![photo.to_string()],
    }
}

/// Candidate URLs for the small square preview on an event card.
pub fn preview_chain(photo: &str) -> Vec<String> {
    match file_id(photo) {
        Some(id) => vec![format!("{}=w200-h200-c", cdn_url(id)), content_url(id)],
        None => vec![photo.to_string()],
    }
}

/// Preview chains for the first [`PREVIEW_LIMIT`] photos of a list.
pub fn previews(photos: &[PhotoRef]) -> Vec<FallbackChain> {
    photos
        .iter()
        .take(PREVIEW_LIMIT)
        .map(|p| FallbackChain::from_urls(preview_chain(p)))
        .collect()
}

/// Everything a client needs to display one photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPhoto {
    pub file_id: Option<String>,
    pub primary: String,
    pub alternatives: Vec<String>,
    pub preview: Vec<String>,
}

impl ResolvedPhoto {
    pub fn new(photo: &str) -> Self {
        Self {
            file_id: file_id(photo).map(str::to_string),
            primary: resolve(photo),
            alternatives: alternatives(photo),
            preview: preview_chain(photo),
        }
    }
}

/// Display state of one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState {
    /// Showing the URL at this index of the chain. `0` is the primary.
    Showing(usize),
    /// Every URL failed; show a placeholder.
    Exhausted,
}

/// Per-image fallback walk.
///
/// Starts on the primary URL. Each [`on_error`](Self::on_error) moves one
/// step down the chain; once past the end the chain is exhausted for good.
/// A new photo needs a new chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackChain {
    urls: Vec<String>,
    state: ImageState,
}

impl FallbackChain {
    pub fn new(photo: &str) -> Self {
        Self::from_urls(alternatives(photo))
    }

    pub fn from_urls(urls: Vec<String>) -> Self {
        let state = if urls.is_empty() {
            ImageState::Exhausted
        } else {
            ImageState::Showing(0)
        };
        Self { urls, state }
    }

    pub fn state(&self) -> ImageState {
        self.state
    }

    /// URL to render now, or `None` once exhausted.
    pub fn current(&self) -> Option<&str> {
        match self.state {
            ImageState::Showing(i) => self.urls.get(i).map(String::as_str),
            ImageState::Exhausted => None,
        }
    }

    /// Record a render failure of the current URL and return the next one.
    pub fn on_error(&mut self) -> Option<&str> {
        self.state = match self.state {
            ImageState::Showing(i) if i + 1 < self.urls.len() => ImageState::Showing(i + 1),
            _ => ImageState::Exhausted,
        };
        self.current()
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == ImageState::Exhausted
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINK: &str = "https://drive.google.com/file/d/ABC123/view?usp=drivesdk";

    #[test]
    fn extracts_file_id() {
        assert_eq!(file_id(LINK), Some("ABC123"));
        assert_eq!(
            file_id("https://drive.google.com/file/d/1bW-7QZdg0L0_wU/view"),
            Some("1bW-7QZdg0L0_wU")
        );
        assert_eq!(file_id("not-a-url"), None);
        assert_eq!(file_id("https://drive.google.com/file/d/"), None);
    }

    #[test]
    fn resolve_prefers_cdn() {
        assert_eq!(resolve(LINK), "https://lh3.googleusercontent.com/d/ABC123");
    }

    #[test]
    fn alternatives_in_priority_order() {
        let alts = alternatives(LINK);
        assert_eq!(
            alts,
            vec![
                "https://lh3.googleusercontent.com/d/ABC123".to_string(),
                "https://drive.google.com/uc?export=view&id=ABC123".to_string(),
                "https://drive.google.com/thumbnail?id=ABC123&sz=w800-h600".to_string(),
            ]
        );
        assert!(alts.iter().all(|u| u.contains("ABC123")));
        assert_eq!(resolve(LINK), alts[0]);
    }

    #[test]
    fn unrecognized_passes_through() {
        assert_eq!(resolve("not-a-url"), "not-a-url");
        assert_eq!(alternatives("not-a-url"), vec!["not-a-url".to_string()]);
        assert_eq!(resolve(""), "");
        assert_eq!(alternatives(""), vec![String::new()]);
    }

    #[test]
    fn chain_walks_then_stops() {
        let mut chain = FallbackChain::new(LINK);
        assert_eq!(chain.state(), ImageState::Showing(0));
        assert_eq!(chain.current(), Some("https://lh3.googleusercontent.com/d/ABC123"));

        assert_eq!(
            chain.on_error(),
            Some("https://drive.google.com/uc?export=view&id=ABC123")
        );
        assert_eq!(
            chain.on_error(),
            Some("https://drive.google.com/thumbnail?id=ABC123&sz=w800-h600")
        );
        assert_eq!(chain.on_error(), None);
        assert!(chain.is_exhausted());

        // Terminal.
        assert_eq!(chain.on_error(), None);
        assert_eq!(chain.state(), ImageState::Exhausted);
    }

    #[test]
    fn passthrough_chain_has_one_step() {
        let mut chain = FallbackChain::new("not-a-url");
        assert_eq!(chain.current(), Some("not-a-url"));
        assert_eq!(chain.on_error(), None);
        assert!(chain.is_exhausted());
    }

    #[test]
    fn preview_chain_uses_square_crop() {
        assert_eq!(
            preview_chain(LINK),
            vec![
                "https://lh3.googleusercontent.com/d/ABC123=w200-h200-c".to_string(),
                "https://drive.google.com/uc?export=view&id=ABC123".to_string(),
            ]
        );
        let photos: Vec<PhotoRef> = (0..5).map(|_| LINK.to_string()).collect();
        assert_eq!(previews(&photos).len(), PREVIEW_LIMIT);
    }

    #[test]
    fn resolved_photo_bundles_everything() {
        let resolved = ResolvedPhoto::new(LINK);
        assert_eq!(resolved.file_id.as_deref(), Some("ABC123"));
        assert_eq!(resolved.alternatives.len(), 3);
        assert_eq!(resolved.primary, resolved.alternatives[0]);

        let raw = ResolvedPhoto::new("x");
        assert_eq!(raw.file_id, None);
        assert_eq!(raw.primary, "x");
    }
}

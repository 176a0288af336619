//! Icon lookup by code-point sequence, with per-generation caching.
//!
//! Fetching is delegated to an [`IconSource`]; this module decides which URLs to try and remembers the outcome.

use std::collections::HashMap;
use std::rc::Rc;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, warn};

const OPENMOJI_VERSION: &str = "15.0.0";
const TWEMOJI_VERSION: &str = "14.0.2";
const VARIATION_SELECTOR: &str = "-FE0F";

/// Colour or printer-friendly black-and-white artwork.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ColorMode {
    /// Full-colour artwork.
    #[default]
    Color,
    /// Black outlines for printing.
    Bw,
}

impl ColorMode {
    /// Label for the sheet header.
    pub fn label(self) -> &'static str {
        match self {
            Self::Color => "Colour",
            Self::Bw => "B/W",
        }
    }
}

/// Identity of a cached icon.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IconKey {
    /// Artwork style.
    pub mode: ColorMode,
    hex: String,
}

impl IconKey {
    /// Keys compare case-insensitively on `hex`.
    pub fn new(mode: ColorMode, hex: &str) -> Self {
        Self { mode, hex: hex.to_ascii_uppercase() }
    }

    /// The upper-cased code-point sequence.
    pub fn hex(&self) -> &str {
        &self.hex
    }
}

/// Why one URL yielded no icon.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IconFetchError {
    /// The server answered with a non-success status.
    #[error("HTTP {0}")]
    Status(u16),
    /// The payload was not a usable image.
    #[error("could not decode icon: {0}")]
    Decode(String),
    /// The request did not complete.
    #[error("icon unavailable: {0}")]
    Unavailable(String),
}

/// Retrieves icon artwork from a URL.
pub trait IconSource {
    /// A decoded, drawable icon.
    type Icon;

    /// Fetch and decode the icon at `url`.
    fn fetch(&self, url: &str) -> Result<Self::Icon, IconFetchError>;
}

fn strip_variation_selector(hex: &str) -> String {
    hex.to_ascii_uppercase().replace(VARIATION_SELECTOR, "")
}

fn openmoji_url(hex: &str, mode: ColorMode) -> String {
    let folder = match mode {
        ColorMode::Color => "color/svg",
        ColorMode::Bw => "black/svg",
    };
    format!("https://cdn.jsdelivr.net/npm/openmoji@{OPENMOJI_VERSION}/{folder}/{}.svg", hex.to_ascii_uppercase())
}

fn twemoji_url(hex: &str) -> String {
    format!(
        "https://cdn.jsdelivr.net/gh/twitter/twemoji@{TWEMOJI_VERSION}/assets/svg/{}.svg",
        strip_variation_selector(hex).to_ascii_lowercase(),
    )
}

/// URLs to try for `hex`, in order: OpenMoji as given, OpenMoji without variation selectors, then Twemoji.
pub fn icon_urls(hex: &str, mode: ColorMode) -> Vec<String> {
    let upper = hex.to_ascii_uppercase();
    let bare = strip_variation_selector(&upper);

    [upper, bare].into_iter()
        .unique()
        .map(|variant| openmoji_url(&variant, mode))
        .chain(std::iter::once(twemoji_url(hex)))
        .collect()
}

/// Icons resolved during one generation. Misses are remembered too, so a failing icon is only tried once.
#[derive(Debug)]
pub struct IconCache<I> {
    entries: HashMap<IconKey, Option<Rc<I>>>,
}

impl<I> Default for IconCache<I> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<I> IconCache<I> {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Release every held icon.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Number of keys resolved so far, hits and misses alike.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been looked up since the last reset.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A previously resolved icon. Outer [`None`] means never tried; inner [`None`] means it failed.
    pub fn lookup(&self, key: &IconKey) -> Option<Option<Rc<I>>> {
        self.entries.get(key).cloned()
    }

    /// The icon for `key`, fetching it through `source` on first use.
    pub fn get_or_fetch<S>(&mut self, key: &IconKey, source: &S) -> Option<Rc<I>>
    where
        S: IconSource<Icon = I>,
    {
        if let Some(cached) = self.entries.get(key) {
            return cached.clone();
        }

        let mut fetched = None;
        for url in icon_urls(key.hex(), key.mode) {
            match source.fetch(&url) {
                Ok(icon) => {
                    fetched = Some(Rc::new(icon));
                    break;
                }
                Err(e) => debug!(%url, error = %e, "icon candidate failed"),
            }
        }

        if fetched.is_none() {
            warn!(hex = key.hex(), mode = %key.mode, "no icon source answered");
        }
        self.entries.insert(key.clone(), fetched.clone());
        fetched
    }

    /// Resolve every distinct key among `hexes` ahead of drawing.
    pub fn preload<'h, S, H>(&mut self, hexes: H, mode: ColorMode, source: &S)
    where
        S: IconSource<Icon = I>,
        H: IntoIterator<Item = &'h str>,
    {
        let keys = hexes.into_iter()
            .filter(|hex| !hex.is_empty())
            .map(|hex| IconKey::new(mode, hex))
            .unique()
            .collect_vec();

        debug!(distinct = keys.len(), "preloading icons");
        for key in &keys {
            self.get_or_fetch(key, source);
        }
    }
}

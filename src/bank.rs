//! The picture-word bank and the filters that narrow it to one board's targets.

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};
use tracing::debug;

use crate::item::Categorized;

const BUILTIN_BANK: &str = include_str!("../assets/word_bank.json");

/// A target speech sound, named by a short ASCII id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[derive(Serialize, Deserialize, Display, EnumString, AsRefStr, VariantArray)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sound {
    /// /p/
    P,
    /// /b/
    B,
    /// /t/
    T,
    /// /d/
    D,
    /// /k/
    K,
    /// /g/
    G,
    /// /m/
    M,
    /// /n/
    N,
    /// /ŋ/
    Ng,
    /// /f/
    F,
    /// /v/
    V,
    /// /θ/
    Th,
    /// /ð/
    Dh,
    /// /s/
    S,
    /// /z/
    Z,
    /// /ʃ/
    Sh,
    /// /ʒ/
    Zh,
    /// /h/
    H,
    /// /tʃ/
    Ch,
    /// /dʒ/
    J,
    /// /l/
    L,
    /// /r/
    R,
    /// /j/
    Y,
    /// /w/
    W,
}

impl Sound {
    /// Phonemic label shown to readers, slashes included.
    pub fn ipa(self) -> &'static str {
        match self {
            Self::P => "/p/",
            Self::B => "/b/",
            Self::T => "/t/",
            Self::D => "/d/",
            Self::K => "/k/",
            Self::G => "/g/",
            Self::M => "/m/",
            Self::N => "/n/",
            Self::Ng => "/ŋ/",
            Self::F => "/f/",
            Self::V => "/v/",
            Self::Th => "/θ/",
            Self::Dh => "/ð/",
            Self::S => "/s/",
            Self::Z => "/z/",
            Self::Sh => "/ʃ/",
            Self::Zh => "/ʒ/",
            Self::H => "/h/",
            Self::Ch => "/tʃ/",
            Self::J => "/dʒ/",
            Self::L => "/l/",
            Self::R => "/r/",
            Self::Y => "/j/",
            Self::W => "/w/",
        }
    }
}

/// Where in the word the target sound occurs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, VariantArray)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Position {
    /// Word-initial, as in "bus".
    Initial,
    /// Between vowels or inside a cluster.
    Medial,
    /// Word-final, as in "tub".
    Final,
}

/// A position restriction, or none.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PositionFilter {
    /// No restriction.
    #[default]
    Any,
    /// Only [`Position::Initial`].
    Initial,
    /// Only [`Position::Medial`].
    Medial,
    /// Only [`Position::Final`].
    Final,
}

impl PositionFilter {
    /// The single position allowed, if restricted.
    pub fn position(self) -> Option<Position> {
        match self {
            Self::Any => None,
            Self::Initial => Some(Position::Initial),
            Self::Medial => Some(Position::Medial),
            Self::Final => Some(Position::Final),
        }
    }

    /// Label for the sheet header.
    pub fn label(self) -> &'static str {
        match self {
            Self::Any => "Any position",
            Self::Initial => "Initial",
            Self::Medial => "Medial",
            Self::Final => "Final",
        }
    }
}

/// Consonant/vowel structure of a word, long vowels and diphthongs written `VV`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, VariantArray)]
#[allow(clippy::upper_case_acronyms)]
pub enum SyllableShape {
    /// Consonant, short vowel.
    CV,
    /// Consonant, long vowel.
    CVV,
    /// Consonant, short vowel, consonant.
    CVC,
    /// Consonant, long vowel, consonant.
    CVVC,
    /// Initial cluster, short vowel, consonant.
    CCVC,
    /// Initial cluster, long vowel, consonant.
    CCVVC,
    /// Consonant, short vowel, final cluster.
    CVCC,
    /// Consonant, long vowel, final cluster.
    CVVCC,
    /// Anything longer or irregular.
    #[serde(rename = "OTHER")]
    #[strum(serialize = "OTHER")]
    Other,
}

/// The word-structure buckets offered to therapists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, VariantArray)]
pub enum ShapeGroup {
    /// CV and CVV words.
    #[serde(rename = "CV+CVV")]
    #[strum(serialize = "CV+CVV")]
    OpenSyllables,
    /// CVC and CVVC words.
    #[default]
    #[serde(rename = "CVC+CVVC")]
    #[strum(serialize = "CVC+CVVC")]
    ClosedSyllables,
    /// CCVC and CCVVC words.
    #[serde(rename = "CCVC+CCVVC")]
    #[strum(serialize = "CCVC+CCVVC")]
    InitialClusters,
    /// CVCC and CVVCC words.
    #[serde(rename = "CVCC+CVVCC")]
    #[strum(serialize = "CVCC+CVVCC")]
    FinalClusters,
    /// No structure restriction.
    #[serde(rename = "any")]
    #[strum(serialize = "any")]
    Any,
}

impl ShapeGroup {
    /// Shapes admitted by this group; [`None`] admits everything.
    pub fn shapes(self) -> Option<&'static [SyllableShape]> {
        use SyllableShape::*;

        match self {
            Self::OpenSyllables => Some(&[CV, CVV]),
            Self::ClosedSyllables => Some(&[CVC, CVVC]),
            Self::InitialClusters => Some(&[CCVC, CCVVC]),
            Self::FinalClusters => Some(&[CVCC, CVVCC]),
            Self::Any => None,
        }
    }
}

/// English variety used for word choice and structure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
#[allow(clippy::upper_case_acronyms)]
pub enum Dialect {
    /// British English.
    #[default]
    #[serde(alias = "uk")]
    UK,
    /// American English: swaps in US words and some structures.
    #[serde(alias = "us")]
    US,
}

/// One picture word.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    /// Spelling; also the identity that must not repeat on touching squares.
    pub orth: String,
    /// Target sound carried by the word.
    pub sound: Sound,
    /// Where the sound occurs.
    pub pos: Position,
    /// Structure in the default dialect.
    pub shape: SyllableShape,
    /// Per-dialect structure where pronunciation differs (UK "bear" is CVV, US "bear" is CVC).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub shapes: BTreeMap<Dialect, SyllableShape>,
    /// The emoji the icon is drawn from.
    pub emoji: String,
    /// Code-point sequence naming the icon, e.g. `1F6CF-FE0F`. Derived from `emoji` when absent.
    #[serde(default)]
    pub hex: String,
}

impl WordEntry {
    /// Structure as pronounced in `dialect`.
    pub fn shape_for(&self, dialect: Dialect) -> SyllableShape {
        self.shapes.get(&dialect).copied().unwrap_or(self.shape)
    }
}

impl Categorized for WordEntry {
    type Category = String;

    fn category(&self) -> &Self::Category {
        &self.orth
    }

    fn is_blank(&self) -> bool {
        self.orth.is_empty()
    }
}

/// Upper-case hex code points of `emoji`, joined by `-`.
pub fn emoji_hex_sequence(emoji: &str) -> String {
    emoji.chars().map(|c| format!("{:X}", c as u32)).join("-")
}

/// Map legacy icon keys onto current ones.
pub fn normalize_hex(hex: &str) -> String {
    match hex {
        "26F5_toggle" => "26F5".to_string(),
        other => other.to_string(),
    }
}

fn looks_like_hex_sequence(hex: &str) -> bool {
    !hex.is_empty() && hex.split('-').all(|part| !part.is_empty() && part.chars().all(|c| matches!(c, '0'..='9' | 'A'..='F')))
}

/// The bank could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum BankError {
    /// The bank text is not a valid bank.
    #[error("could not read word bank: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A defect found by [`WordBank::integrity_issues`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BankIssue {
    /// An entry without a spelling.
    #[error("entry {index} has no spelling")]
    MissingOrth {
        /// Position of the entry in the bank.
        index: usize,
    },
    /// An icon key that is not a dash-separated run of upper-case hex.
    #[error("{orth}: icon key {hex:?} is not a code point sequence")]
    MalformedHex {
        /// The word.
        orth: String,
        /// The offending key.
        hex: String,
    },
}

/// Filters applied by [`WordBank::select`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankFilter {
    /// English variety; US adds its extras and drops "mum".
    pub dialect: Dialect,
    /// Keep only these sounds; empty keeps all.
    pub sounds: Vec<Sound>,
    /// Sound position restriction.
    pub position: PositionFilter,
    /// Word-structure restriction.
    pub shape_group: ShapeGroup,
}

#[derive(Deserialize)]
struct BankFile {
    words: Vec<WordEntry>,
    #[serde(default)]
    us_extras: Vec<WordEntry>,
}

/// Every picture word available, plus the additions used for US English.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordBank {
    words: Vec<WordEntry>,
    us_extras: Vec<WordEntry>,
}

impl WordBank {
    /// The bank shipped with the crate.
    pub fn builtin() -> Result<Self, BankError> {
        Self::from_json(BUILTIN_BANK)
    }

    /// Read a bank of the form `{"words": [...], "us_extras": [...]}`.
    pub fn from_json(text: &str) -> Result<Self, BankError> {
        let file: BankFile = serde_json::from_str(text)?;
        Ok(Self::new(file.words, file.us_extras))
    }

    /// A bank from entries; icon keys are derived or normalized as needed.
    pub fn new(words: Vec<WordEntry>, us_extras: Vec<WordEntry>) -> Self {
        let fill = |mut entry: WordEntry| {
            entry.hex = if entry.hex.is_empty() {
                emoji_hex_sequence(&entry.emoji)
            } else {
                normalize_hex(&entry.hex)
            };
            entry
        };

        Self {
            words: words.into_iter().map(fill).collect(),
            us_extras: us_extras.into_iter().map(fill).collect(),
        }
    }

    /// Every word, UK spellings.
    pub fn words(&self) -> &[WordEntry] {
        &self.words
    }

    /// Words shown only for US English.
    pub fn us_extras(&self) -> &[WordEntry] {
        &self.us_extras
    }

    /// Entries matching `filter`, in bank order.
    ///
    /// US English drops "mum" and adds the US extras before any other filter applies. Structure is judged by the
    /// selected dialect's pronunciation.
    pub fn select(&self, filter: &BankFilter) -> Vec<WordEntry> {
        let base: Box<dyn Iterator<Item = &WordEntry>> = match filter.dialect {
            Dialect::UK => Box::new(self.words.iter()),
            Dialect::US => Box::new(self.words.iter()
                .filter(|w| !w.orth.eq_ignore_ascii_case("mum"))
                .chain(self.us_extras.iter())),
        };

        let allowed = filter.shape_group.shapes();
        let picked = base
            .filter(|w| filter.sounds.is_empty() || filter.sounds.contains(&w.sound))
            .filter(|w| filter.position.position().map_or(true, |pos| w.pos == pos))
            .filter(|w| allowed.map_or(true, |shapes| shapes.contains(&w.shape_for(filter.dialect))))
            .map(|w| WordEntry { hex: normalize_hex(&w.hex), ..w.clone() })
            .collect_vec();

        debug!(selected = picked.len(), ?filter, "bank filtered");
        picked
    }

    /// Entries that cannot be shown: missing spelling or unusable icon key.
    pub fn integrity_issues(&self) -> Vec<BankIssue> {
        self.words.iter()
            .chain(self.us_extras.iter())
            .enumerate()
            .filter_map(|(index, w)| {
                if w.orth.is_empty() {
                    Some(BankIssue::MissingOrth { index })
                } else if !looks_like_hex_sequence(&w.hex) {
                    Some(BankIssue::MalformedHex { orth: w.orth.clone(), hex: w.hex.clone() })
                } else {
                    None
                }
            })
            .collect()
    }
}

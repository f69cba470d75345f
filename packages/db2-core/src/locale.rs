//! Client locales and localized string columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of client locales.
pub const TOTAL_LOCALES: usize = 11;

/// Client locale, one data subdirectory per locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Locale {
    #[serde(rename = "enUS")]
    EnUs = 0,
    #[serde(rename = "koKR")]
    KoKr = 1,
    #[serde(rename = "frFR")]
    FrFr = 2,
    #[serde(rename = "deDE")]
    DeDe = 3,
    #[serde(rename = "zhCN")]
    ZhCn = 4,
    #[serde(rename = "zhTW")]
    ZhTw = 5,
    #[serde(rename = "esES")]
    EsEs = 6,
    #[serde(rename = "esMX")]
    EsMx = 7,
    #[serde(rename = "ruRU")]
    RuRu = 8,
    #[serde(rename = "ptBR")]
    PtBr = 9,
    #[serde(rename = "itIT")]
    ItIt = 10,
}

impl Locale {
    /// All locales in index order.
    pub const ALL: [Locale; TOTAL_LOCALES] = [
        Locale::EnUs,
        Locale::KoKr,
        Locale::FrFr,
        Locale::DeDe,
        Locale::ZhCn,
        Locale::ZhTw,
        Locale::EsEs,
        Locale::EsMx,
        Locale::RuRu,
        Locale::PtBr,
        Locale::ItIt,
    ];

    /// Directory and wire name, e.g. `enUS`.
    pub fn name(self) -> &'static str {
        match self {
            Locale::EnUs => "enUS",
            Locale::KoKr => "koKR",
            Locale::FrFr => "frFR",
            Locale::DeDe => "deDE",
            Locale::ZhCn => "zhCN",
            Locale::ZhTw => "zhTW",
            Locale::EsEs => "esES",
            Locale::EsMx => "esMX",
            Locale::RuRu => "ruRU",
            Locale::PtBr => "ptBR",
            Locale::ItIt => "itIT",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|locale| locale.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown locale '{}'", s))
    }
}

/// Set of locales, stored as a bit mask indexed by [`Locale::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LocaleSet(u32);

impl LocaleSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Self((1 << TOTAL_LOCALES) - 1)
    }

    pub fn insert(&mut self, locale: Locale) {
        self.0 |= 1 << locale.index();
    }

    pub fn remove(&mut self, locale: Locale) {
        self.0 &= !(1 << locale.index());
    }

    pub fn contains(&self, locale: Locale) -> bool {
        self.0 & (1 << locale.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Raw mask as sent to clients alongside hotfix pushes.
    pub fn mask(&self) -> u32 {
        self.0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Locale> + '_ {
        Locale::ALL
            .iter()
            .copied()
            .filter(move |locale| self.contains(*locale))
    }
}

impl FromIterator<Locale> for LocaleSet {
    fn from_iter<I: IntoIterator<Item = Locale>>(iter: I) -> Self {
        let mut set = Self::empty();
        for locale in iter {
            set.insert(locale);
        }
        set
    }
}

/// String column with one value per locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedString {
    values: [String; TOTAL_LOCALES],
}

impl LocalizedString {
    /// Creates a string holding `value` for a single locale.
    pub fn new(locale: Locale, value: impl Into<String>) -> Self {
        let mut s = Self::default();
        s.set(locale, value);
        s
    }

    /// Value for `locale`; empty when the locale was never loaded.
    pub fn get(&self, locale: Locale) -> &str {
        &self.values[locale.index()]
    }

    pub fn set(&mut self, locale: Locale, value: impl Into<String>) {
        self.values[locale.index()] = value.into();
    }

    /// Copies the `locale` value from a row read out of a locale file.
    pub fn merge(&mut self, other: &LocalizedString, locale: Locale) {
        self.values[locale.index()] = other.values[locale.index()].clone();
    }
}

//! Point-of-interest data model.
//!
//! `PoiCategory` is the single category vocabulary of the crate: every
//! label and icon lookup goes through it.

pub mod search;

use crate::geo::Position;
use crate::i18n::Language;
use serde::{Deserialize, Deserializer, Serialize};

pub use search::{FixtureSearchProvider, PoiSearchProvider, SearchError};

/// POI categories reported by search providers.
///
/// Serializes as its snake_case id. Deserializing accepts anything
/// `from_provider_str` does, so unknown categories become `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiCategory {
    Restaurant,
    Cafe,
    Hotel,
    Store,
    Supermarket,
    Museum,
    Park,
    Theater,
    Library,
    School,
    Hospital,
    Pharmacy,
    Bakery,
    Brewery,
    Winery,
    GasStation,
    Parking,
    PostOffice,
    PublicTransport,
    Airport,
    Bank,
    Atm,
    Beach,
    Campground,
    Laundry,
    MovieTheater,
    Nightlife,
    Stadium,
    Zoo,
    FitnessCenter,
    /// Anything outside the vocabulary
    #[default]
    Other,
}

impl PoiCategory {
    /// Every category, in declaration order.
    pub fn all() -> &'static [PoiCategory] {
        use PoiCategory::*;
        &[
            Restaurant,
            Cafe,
            Hotel,
            Store,
            Supermarket,
            Museum,
            Park,
            Theater,
            Library,
            School,
            Hospital,
            Pharmacy,
            Bakery,
            Brewery,
            Winery,
            GasStation,
            Parking,
            PostOffice,
            PublicTransport,
            Airport,
            Bank,
            Atm,
            Beach,
            Campground,
            Laundry,
            MovieTheater,
            Nightlife,
            Stadium,
            Zoo,
            FitnessCenter,
            Other,
        ]
    }

    /// Spoken/displayed label in the given language.
    pub fn label(&self, language: Language) -> &'static str {
        match language {
            Language::French => self.label_fr(),
            Language::English => self.label_en(),
        }
    }

    fn label_fr(&self) -> &'static str {
        match self {
            Self::Restaurant => "Restaurant",
            Self::Cafe => "Café",
            Self::Hotel => "Hôtel",
            Self::Store => "Magasin",
            Self::Supermarket => "Supermarché",
            Self::Museum => "Musée",
            Self::Park => "Parc",
            Self::Theater => "Théâtre",
            Self::Library => "Bibliothèque",
            Self::School => "École",
            Self::Hospital => "Hôpital",
            Self::Pharmacy => "Pharmacie",
            Self::Bakery => "Boulangerie",
            Self::Brewery => "Brasserie",
            Self::Winery => "Vignoble",
            Self::GasStation => "Station service",
            Self::Parking => "Parking",
            Self::PostOffice => "Bureau de poste",
            Self::PublicTransport => "Transport public",
            Self::Airport => "Aéroport",
            Self::Bank => "Banque",
            Self::Atm => "Distributeur",
            Self::Beach => "Plage",
            Self::Campground => "Camping",
            Self::Laundry => "Laverie",
            Self::MovieTheater => "Cinéma",
            Self::Nightlife => "Vie nocturne",
            Self::Stadium => "Stade",
            Self::Zoo => "Zoo",
            Self::FitnessCenter => "Salle de sport",
            Self::Other => "Lieu",
        }
    }

    fn label_en(&self) -> &'static str {
        match self {
            Self::Restaurant => "Restaurant",
            Self::Cafe => "Café",
            Self::Hotel => "Hotel",
            Self::Store => "Store",
            Self::Supermarket => "Supermarket",
            Self::Museum => "Museum",
            Self::Park => "Park",
            Self::Theater => "Theater",
            Self::Library => "Library",
            Self::School => "School",
            Self::Hospital => "Hospital",
            Self::Pharmacy => "Pharmacy",
            Self::Bakery => "Bakery",
            Self::Brewery => "Brewery",
            Self::Winery => "Winery",
            Self::GasStation => "Gas station",
            Self::Parking => "Parking",
            Self::PostOffice => "Post office",
            Self::PublicTransport => "Public transport",
            Self::Airport => "Airport",
            Self::Bank => "Bank",
            Self::Atm => "ATM",
            Self::Beach => "Beach",
            Self::Campground => "Campground",
            Self::Laundry => "Laundry",
            Self::MovieTheater => "Cinema",
            Self::Nightlife => "Nightlife",
            Self::Stadium => "Stadium",
            Self::Zoo => "Zoo",
            Self::FitnessCenter => "Gym",
            Self::Other => "Place",
        }
    }

    /// Get icon name for this category
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Restaurant => "fork.knife",
            Self::Cafe => "cup.and.saucer",
            Self::Hotel => "bed.double",
            Self::Store => "bag",
            Self::Supermarket => "cart",
            Self::Museum => "building.columns",
            Self::Park => "tree",
            Self::Theater => "theatermasks",
            Self::Library => "books.vertical",
            Self::School => "graduationcap",
            Self::Hospital => "cross.case",
            Self::Pharmacy => "pills",
            Self::Bakery => "birthday.cake",
            Self::Brewery => "mug",
            Self::Winery => "wineglass",
            Self::GasStation => "fuelpump",
            Self::Parking => "parkingsign",
            Self::PostOffice => "envelope",
            Self::PublicTransport => "bus",
            Self::Airport => "airplane",
            Self::Bank => "banknote",
            Self::Atm => "creditcard",
            Self::Beach => "beach.umbrella",
            Self::Campground => "tent",
            Self::Laundry => "washer",
            Self::MovieTheater => "film",
            Self::Nightlife => "music.note",
            Self::Stadium => "sportscourt",
            Self::Zoo => "pawprint",
            Self::FitnessCenter => "dumbbell",
            Self::Other => "mappin",
        }
    }

    /// Parse a provider category string.
    ///
    /// Accepts the snake_case identifiers as well as the French and English
    /// labels, case-insensitively. Unknown strings map to `Other`.
    pub fn from_provider_str(value: &str) -> Self {
        let needle = value.trim().to_lowercase();
        let compact = needle.replace([' ', '-'], "_");
        Self::all()
            .iter()
            .copied()
            .find(|category| {
                let id = serde_json::to_value(category)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_owned));
                id.as_deref() == Some(compact.as_str())
                    || category.label_fr().to_lowercase() == needle
                    || category.label_en().to_lowercase() == needle
            })
            .unwrap_or(Self::Other)
    }
}

impl<'de> Deserialize<'de> for PoiCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_provider_str(&value))
    }
}

/// A place returned by a search provider for one discovery cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiCandidate {
    /// Place name, when the provider knows one
    #[serde(default)]
    pub name: Option<String>,
    /// Category from the shared vocabulary
    #[serde(default)]
    pub category: PoiCategory,
    /// Location of the place
    pub coordinate: Position,
    /// Phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// Website
    #[serde(default)]
    pub url: Option<String>,
    /// Query term that produced this candidate (diagnostics only)
    #[serde(default)]
    pub source_term: Option<String>,
}

impl PoiCandidate {
    /// Create a named candidate.
    pub fn new(name: impl Into<String>, category: PoiCategory, coordinate: Position) -> Self {
        Self {
            name: Some(name.into()),
            category,
            coordinate,
            phone: None,
            url: None,
            source_term: None,
        }
    }

    /// Attach a phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Attach a website.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Record which query term produced this candidate.
    pub fn with_source_term(mut self, term: impl Into<String>) -> Self {
        self.source_term = Some(term.into());
        self
    }

    /// Name for display, substituting the fallback label when absent or blank.
    pub fn display_name(&self, language: Language) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => unknown_place_label(language),
        }
    }

    /// Lowercased name used as the deduplication key.
    pub fn normalized_name(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_lowercase)
    }
}

/// Label substituted for places without a name.
pub fn unknown_place_label(language: Language) -> &'static str {
    match language {
        Language::French => "Lieu inconnu",
        Language::English => "Unknown place",
    }
}

/// A candidate with its distance from the evaluation position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPoi {
    /// The underlying place
    pub candidate: PoiCandidate,
    /// Great-circle distance from the evaluation position, in meters
    pub distance_meters: f64,
}

impl RankedPoi {
    /// Rank a candidate relative to `origin`.
    pub fn from_origin(candidate: PoiCandidate, origin: &Position) -> Self {
        let distance_meters = origin.distance_to(&candidate.coordinate).max(0.0);
        Self {
            candidate,
            distance_meters,
        }
    }

    /// Category shorthand.
    pub fn category(&self) -> PoiCategory {
        self.candidate.category
    }
}

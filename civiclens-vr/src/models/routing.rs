//! Authority routing taxonomy
//!
//! One canonical category-to-intent mapping table consulted everywhere
//! category text is bucketed. POI text search matches generically and
//! returns unrelated businesses whose names contain ambient civic words,
//! so candidate names pass a block-list check before the per-intent
//! allow-list check.

use serde::{Deserialize, Serialize};

/// Geographic coordinates for a submission
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Search intent bucket selecting authority-search queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Traffic,
    Environmental,
    Fire,
    General,
}

/// Keywords mapping category text to the Traffic intent
const TRAFFIC_TERMS: &[&str] = &["traffic", "vehicle", "helmet", "license", "seatbelt"];

/// Keywords mapping category text to the Environmental intent
///
/// Industrial violations (illegal dumping, uncontrolled emissions) fall
/// under the pollution-control jurisdiction, so industrial terms bucket
/// here as well.
const ENVIRONMENTAL_TERMS: &[&str] = &[
    "waste",
    "garbage",
    "burn",
    "dump",
    "environment",
    "pollution",
    "emission",
    "industrial",
];

/// Keywords mapping category text to the Fire intent
const FIRE_TERMS: &[&str] = &["fire", "smoke"];

/// Keywords mapping category text to the Civic category
pub(crate) const CIVIC_TERMS: &[&str] = &["civic", "infrastructure", "road", "encroach"];

/// POI candidate names containing any of these terms are rejected
/// outright, regardless of intent
pub const BLOCK_TERMS: &[&str] = &[
    "educational",
    "school",
    "college",
    "academy",
    "bank",
    "atm",
    "post office",
    "hotel",
    "lodge",
    "residence",
    "quarters",
    "shop",
    "store",
    "canteen",
    "mess",
];

fn contains_any(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| haystack.contains(term))
}

impl Intent {
    /// Bucket free category text into a search intent
    ///
    /// Case-insensitive keyword containment, checked in priority order:
    /// Traffic, then Environmental, then Fire, then General.
    pub fn from_text(category_text: &str) -> Self {
        let lower = category_text.to_lowercase();

        if contains_any(&lower, TRAFFIC_TERMS) {
            Intent::Traffic
        } else if contains_any(&lower, ENVIRONMENTAL_TERMS) {
            Intent::Environmental
        } else if contains_any(&lower, FIRE_TERMS) {
            Intent::Fire
        } else {
            Intent::General
        }
    }

    /// Ordered POI search queries for this intent, most specific first
    pub fn queries(&self, place: &str) -> Vec<String> {
        match self {
            Intent::Traffic => vec![
                format!("Traffic Police Station {}", place),
                format!("Police Station {}", place),
                format!("RTO {}", place),
            ],
            Intent::Environmental => vec![
                format!("Municipality Office {}", place),
                format!("Panchayat Office {}", place),
                format!("Health Centre {}", place),
            ],
            Intent::Fire => vec![format!("Fire Station {}", place)],
            Intent::General => vec![format!("Police Station {}", place)],
        }
    }

    /// Allow-list: a candidate name must contain at least one of these
    pub fn allow_terms(&self) -> &'static [&'static str] {
        match self {
            Intent::Traffic => &["police", "station", "rto", "enforcement"],
            Intent::Environmental => &[
                "municipality",
                "panchayat",
                "corporation",
                "council",
                "health",
                "police",
            ],
            Intent::Fire => &["fire"],
            Intent::General => &["police", "station"],
        }
    }

    /// Office label used to synthesize a deterministic fallback name
    pub fn fallback_label(&self) -> &'static str {
        match self {
            Intent::Traffic => "Traffic Police Station",
            Intent::Environmental => "Municipality Office",
            Intent::Fire => "Fire Station",
            Intent::General => "Police Station",
        }
    }

    /// Whether the shared traffic keyword table matches
    pub(crate) fn matches_traffic(lower_text: &str) -> bool {
        contains_any(lower_text, TRAFFIC_TERMS)
    }

    /// Whether the shared environmental keyword table matches
    pub(crate) fn matches_environmental(lower_text: &str) -> bool {
        contains_any(lower_text, ENVIRONMENTAL_TERMS) || contains_any(lower_text, FIRE_TERMS)
    }
}

/// How an authority name was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorityConfidence {
    /// Name came from a POI search result that survived filtering
    Verified,
    /// Name was synthesized from the place name and intent label
    Synthesized,
}

impl AuthorityConfidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorityConfidence::Verified => "verified",
            AuthorityConfidence::Synthesized => "synthesized",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "verified" => AuthorityConfidence::Verified,
            _ => AuthorityConfidence::Synthesized,
        }
    }
}

/// Resolved enforcement authority for one report attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityMatch {
    /// Display name of the enforcement office
    pub name: String,
    /// Verified (POI search) or Synthesized (fallback)
    pub confidence: AuthorityConfidence,
}

impl AuthorityMatch {
    /// Deterministic fallback used when no verified candidate survives
    pub fn synthesized(place: &str, intent: Intent) -> Self {
        Self {
            name: format!("{} {}", place, intent.fallback_label()),
            confidence: AuthorityConfidence::Synthesized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traffic_terms_bucket_to_traffic_intent() {
        for text in ["Traffic Violation", "rider without HELMET", "license", "Vehicle offense"] {
            assert_eq!(Intent::from_text(text), Intent::Traffic, "{}", text);
        }
    }

    #[test]
    fn environmental_terms_bucket_to_environmental_intent() {
        for text in ["Garbage / Waste", "open burning", "Illegal Dumping", "Industrial"] {
            assert_eq!(Intent::from_text(text), Intent::Environmental, "{}", text);
        }
    }

    #[test]
    fn fire_terms_bucket_to_fire_intent() {
        assert_eq!(Intent::from_text("Fire hazard"), Intent::Fire);
        assert_eq!(Intent::from_text("thick black smoke"), Intent::Fire);
    }

    #[test]
    fn unrecognized_text_buckets_to_general_intent() {
        assert_eq!(Intent::from_text("Civic Issue"), Intent::General);
        assert_eq!(Intent::from_text(""), Intent::General);
    }

    #[test]
    fn bucketing_is_case_insensitive() {
        assert_eq!(Intent::from_text("TRAFFIC"), Intent::Traffic);
        assert_eq!(Intent::from_text("WaStE"), Intent::Environmental);
    }

    #[test]
    fn traffic_queries_are_most_specific_first() {
        let queries = Intent::Traffic.queries("Thrissur");
        assert_eq!(
            queries,
            vec![
                "Traffic Police Station Thrissur",
                "Police Station Thrissur",
                "RTO Thrissur",
            ]
        );
    }

    #[test]
    fn synthesized_match_is_deterministic() {
        let a = AuthorityMatch::synthesized("Thrissur", Intent::Traffic);
        let b = AuthorityMatch::synthesized("Thrissur", Intent::Traffic);
        assert_eq!(a, b);
        assert_eq!(a.name, "Thrissur Traffic Police Station");
        assert_eq!(a.confidence, AuthorityConfidence::Synthesized);
    }
}

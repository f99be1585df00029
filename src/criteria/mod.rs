//! Heuristic pre-retrieval gate.
//!
//! Looks for a location, a bedroom count and a price ceiling in the query. When two or
//! more are absent the pipeline asks for clarification instead of searching. False
//! positives and negatives are accepted; this is a usability check only.


use regex::Regex;

/// Minimum number of missing signals that triggers clarification.
pub const CLARIFY_THRESHOLD: usize = 2;

/// Substring keywords accepted as a location by [`CriteriaPolicy::default`].
pub const DEFAULT_LOCATIONS: &[&str] = &[
    "az",
    "arizona",
    "tx",
    "texas",
    "fl",
    "florida",
    "ga",
    "georgia",
    "nc",
    "north carolina",
    "sc",
    "south carolina",
    "tn",
    "tennessee",
    "ca",
    "california",
];

const BEDS_PATTERN: &str = r"\d+\s*\+?\s*bed";
const PRICE_PATTERN: &str = r"(under|max|<=)\s*\$?\s*[\d\.,]+[km]?";

/// A search criterion the query did not mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissingCriterion {
    Location,
    Bedrooms,
    MaxPrice,
}

impl MissingCriterion {
    /// User-facing label, including an example.
    pub fn label(&self) -> &'static str {
        match self {
            MissingCriterion::Location => "location (city/state)",
            MissingCriterion::Bedrooms => "bedrooms (e.g., 3 bed)",
            MissingCriterion::MaxPrice => "max purchase price (e.g., under 350k)",
        }
    }
}

impl std::fmt::Display for MissingCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Matching rules for the gate. Locations are plain substrings of the lowercased query.
#[derive(Debug, Clone)]
pub struct CriteriaPolicy {
    locations: Vec<String>,
    beds: Regex,
    price: Regex,
}

impl Default for CriteriaPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_LOCATIONS.iter().copied())
    }
}

impl CriteriaPolicy {
    /// Uses the given location keywords with the standard bed and price patterns.
    pub fn new<I, T>(locations: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            locations: locations
                .into_iter()
                .map(|l| l.into().to_lowercase())
                .collect(),
            beds: Regex::new(BEDS_PATTERN).expect("static bed pattern is valid"),
            price: Regex::new(PRICE_PATTERN).expect("static price pattern is valid"),
        }
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn has_location(&self, lowered: &str) -> bool {
        self.locations.iter().any(|l| lowered.contains(l.as_str()))
    }

    pub fn has_bedrooms(&self, lowered: &str) -> bool {
        self.beds.is_match(lowered)
    }

    pub fn has_max_price(&self, lowered: &str) -> bool {
        self.price.is_match(lowered) || lowered.contains('$')
    }

    /// Missing criteria in the order location, bedrooms, price.
    pub fn detect_missing(&self, query: &str) -> Vec<MissingCriterion> {
        let lowered = query.to_lowercase();
        let mut missing = Vec::new();
        if !self.has_location(&lowered) {
            missing.push(MissingCriterion::Location);
        }
        if !self.has_bedrooms(&lowered) {
            missing.push(MissingCriterion::Bedrooms);
        }
        if !self.has_max_price(&lowered) {
            missing.push(MissingCriterion::MaxPrice);
        }
        missing
    }

    /// Returns the missing criteria when there are enough of them to ask the user first.
    pub fn clarification_needed(&self, query: &str) -> Option<Vec<MissingCriterion>> {
        let missing = self.detect_missing(query);
        (missing.len() >= CLARIFY_THRESHOLD).then_some(missing)
    }
}

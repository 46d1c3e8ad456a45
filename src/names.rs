// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// A named feature of the map, as supplied by the ingestion layer.
///
/// Named features are not necessarily routable: a location may sit on a
/// point that belongs to no road segment, so ids here don't have to exist
/// in a [Graph](crate::Graph).
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

/// Helper to process names into their "cleaned" form,
/// ignoring punctuation and capitalization.
fn clean_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphabetic() || *c == ' ')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Free-text lookup of [Locations](Location) by display name.
///
/// Matching is case- and punctuation-insensitive: both queries and stored
/// names are compared in a cleaned form keeping only letters and spaces, so
/// `"peets coffee"` finds `"Peet's Coffee"`. Lookup is a binary search over
/// a name-sorted table, built once; entirely separate from the
/// [KDTree](crate::KDTree), which indexes positions, not names.
#[derive(Debug, Default, Clone)]
pub struct LocationIndex {
    /// All known locations, in insertion order.
    locations: Vec<Location>,
    /// (cleaned name, index into `locations`), sorted by cleaned name.
    /// Locations sharing a cleaned name keep their insertion order.
    by_clean_name: Vec<(String, usize)>,
}

impl LocationIndex {
    /// Builds an index over the given locations.
    pub fn new<I: IntoIterator<Item = Location>>(locations: I) -> Self {
        let locations: Vec<Location> = locations.into_iter().collect();
        let mut by_clean_name: Vec<(String, usize)> = locations
            .iter()
            .enumerate()
            .map(|(idx, location)| (clean_name(&location.name), idx))
            .collect();
        by_clean_name.sort_by(|(a, _), (b, _)| a.cmp(b));
        Self {
            locations,
            by_clean_name,
        }
    }

    /// Returns the number of indexed locations.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Returns true if the index holds no locations.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Collects the display names of all locations whose cleaned name starts
    /// with the cleaned `prefix`. An unknown prefix yields an empty vector.
    pub fn by_prefix(&self, prefix: &str) -> Vec<&str> {
        let prefix = clean_name(prefix);
        let start = self
            .by_clean_name
            .partition_point(|(key, _)| key.as_str() < prefix.as_str());
        self.by_clean_name[start..]
            .iter()
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|&(_, idx)| self.locations[idx].name.as_str())
            .collect()
    }

    /// Collects all locations whose cleaned name equals the cleaned `name`.
    /// An unknown name yields an empty vector.
    pub fn by_name(&self, name: &str) -> Vec<&Location> {
        let name = clean_name(name);
        let start = self
            .by_clean_name
            .partition_point(|(key, _)| key.as_str() < name.as_str());
        self.by_clean_name[start..]
            .iter()
            .take_while(|(key, _)| *key == name)
            .map(|&(_, idx)| &self.locations[idx])
            .collect()
    }
}

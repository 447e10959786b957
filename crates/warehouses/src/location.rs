//! Location policy: which physical locations exist and how much capacity each allows.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A known location and the maximum capacity a warehouse there may declare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub identification: String,
    pub max_capacity: i64,
}

impl Location {
    pub fn new(identification: impl Into<String>, max_capacity: i64) -> Self {
        Self {
            identification: identification.into(),
            max_capacity,
        }
    }
}

/// Read-only lookup of allowed locations.
///
/// Implementations are treated as immutable for the duration of a validation
/// call and must not block.
pub trait LocationPolicy: Send + Sync {
    fn resolve(&self, identification: &str) -> Option<Location>;
}

impl<P> LocationPolicy for Arc<P>
where
    P: LocationPolicy + ?Sized,
{
    fn resolve(&self, identification: &str) -> Option<Location> {
        (**self).resolve(identification)
    }
}

/// Location policy backed by a fixed catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticLocationPolicy {
    locations: HashMap<String, Location>,
}

impl StaticLocationPolicy {
    pub fn new(locations: impl IntoIterator<Item = Location>) -> Self {
        Self {
            locations: locations
                .into_iter()
                .map(|l| (l.identification.clone(), l))
                .collect(),
        }
    }

    /// The catalogue the fulfilment network starts with.
    pub fn default_catalogue() -> Self {
        Self::new([
            Location::new("ZWOLLE-001", 40),
            Location::new("ZWOLLE-002", 50),
            Location::new("AMSTERDAM-001", 100),
            Location::new("AMSTERDAM-002", 75),
            Location::new("TILBURG-001", 40),
            Location::new("HELMOND-001", 45),
            Location::new("EINDHOVEN-001", 70),
            Location::new("VETSBY-001", 90),
        ])
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Location identifiers in ascending order.
    pub fn identifications(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.locations.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for StaticLocationPolicy {
    fn default() -> Self {
        Self::default_catalogue()
    }
}

impl LocationPolicy for StaticLocationPolicy {
    fn resolve(&self, identification: &str) -> Option<Location> {
        self.locations.get(identification).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalogue_resolves_known_locations() {
        let policy = StaticLocationPolicy::default();
        assert_eq!(policy.resolve("AMSTERDAM-001").unwrap().max_capacity, 100);
        assert_eq!(policy.resolve("ZWOLLE-001").unwrap().max_capacity, 40);
        assert_eq!(policy.resolve("TILBURG-001").unwrap().max_capacity, 40);
        assert_eq!(policy.len(), 8);
    }

    #[test]
    fn unknown_location_is_none() {
        let policy = StaticLocationPolicy::default();
        assert!(policy.resolve("INVALID-LOCATION").is_none());
        // lookups are exact
        assert!(policy.resolve("amsterdam-001").is_none());
    }

    #[test]
    fn custom_catalogue_replaces_defaults() {
        let policy = StaticLocationPolicy::new([Location::new("OSLO-001", 10)]);
        assert_eq!(policy.identifications(), vec!["OSLO-001"]);
        assert!(policy.resolve("AMSTERDAM-001").is_none());
    }
}

//! Zone adjacency for spot allocation.
//!
//! Each zone (a building, stored verbatim in `Places.zone` and
//! `Users.building`) carries a short code returned to clients and an ordered
//! list of zones to try when it has no free spot.

use std::collections::HashMap;

/// One zone and the zones it falls back to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneSpec {
    pub name: String,
    pub code: String,
    pub fallbacks: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ZoneMap {
    zones: HashMap<String, ZoneSpec>,
}

impl ZoneMap {
    pub fn new(specs: impl IntoIterator<Item = ZoneSpec>) -> Self {
        Self {
            zones: specs
                .into_iter()
                .map(|spec| (spec.name.clone(), spec))
                .collect(),
        }
    }

    pub fn contains(&self, zone: &str) -> bool {
        self.zones.contains_key(zone)
    }

    /// Zones to search for `building`: the building itself, then its
    /// configured fallbacks. Unconfigured buildings search only themselves.
    pub fn search_order(&self, building: &str) -> Vec<String> {
        let mut order = vec![building.to_string()];
        if let Some(spec) = self.zones.get(building) {
            for fallback in &spec.fallbacks {
                if !order.contains(fallback) {
                    order.push(fallback.clone());
                }
            }
        }
        order
    }

    /// Short code for a zone. Zones without a configured code use the last
    /// word of their name ("Edificio C" -> "C").
    pub fn code_for(&self, zone: &str) -> String {
        match self.zones.get(zone) {
            Some(spec) => spec.code.clone(),
            None => zone
                .split_whitespace()
                .last()
                .unwrap_or(zone)
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campus() -> ZoneMap {
        ZoneMap::new([
            ZoneSpec {
                name: "Edificio A".into(),
                code: "A".into(),
                fallbacks: vec!["Edificio B".into()],
            },
            ZoneSpec {
                name: "Edificio B".into(),
                code: "B".into(),
                fallbacks: vec!["Edificio A".into()],
            },
            ZoneSpec {
                name: "Edificio C".into(),
                code: "C".into(),
                fallbacks: vec!["Edificio C".into(), "Edificio B".into(), "Edificio A".into()],
            },
        ])
    }

    #[test]
    fn search_starts_with_own_zone_then_fallbacks() {
        let map = campus();
        assert_eq!(map.search_order("Edificio B"), ["Edificio B", "Edificio A"]);
    }

    #[test]
    fn search_order_skips_duplicates_and_self_references() {
        let map = campus();
        assert_eq!(
            map.search_order("Edificio C"),
            ["Edificio C", "Edificio B", "Edificio A"]
        );
    }

    #[test]
    fn unknown_building_has_no_fallback() {
        let map = campus();
        assert!(!map.contains("Unknown"));
        assert_eq!(map.search_order("Unknown"), ["Unknown"]);
    }

    #[test]
    fn codes_come_from_configuration_or_last_word() {
        let map = campus();
        assert_eq!(map.code_for("Edificio A"), "A");
        assert_eq!(map.code_for("Torre Norte"), "Norte");
        assert_eq!(map.code_for(""), "");
    }
}

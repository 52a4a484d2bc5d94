//! Ordered reservoirs of chemical-potential sets.

use crate::error::{ReservoirError, ReservoirResult};
use mu_chem::{Chempots, Element};
use mu_core::numeric::{Tolerances, nearly_equal};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Pressure keys match to a relative 1e-9.
const PRESSURE_TOL: Tolerances = Tolerances { abs: 0.0, rel: 1e-9 };

/// Reservoir key: a condition label or a pressure [atm].
#[derive(Debug, Clone, PartialEq)]
pub enum ReservoirKey {
    Condition(String),
    Pressure(f64),
}

impl ReservoirKey {
    pub fn as_pressure(&self) -> Option<f64> {
        match self {
            ReservoirKey::Pressure(p) => Some(*p),
            ReservoirKey::Condition(_) => None,
        }
    }

    fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (ReservoirKey::Condition(a), ReservoirKey::Condition(b)) => a == b,
            (ReservoirKey::Pressure(a), ReservoirKey::Pressure(b)) => {
                nearly_equal(*a, *b, PRESSURE_TOL)
            }
            _ => false,
        }
    }
}

/// Pressures print in exponent notation (`1e-20`, `3.1622776601683795e-5`).
impl fmt::Display for ReservoirKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservoirKey::Condition(label) => f.write_str(label),
            ReservoirKey::Pressure(p) => write!(f, "{p:e}"),
        }
    }
}

/// Text that parses as a finite number is a pressure, anything else a label.
impl From<&str> for ReservoirKey {
    fn from(text: &str) -> Self {
        match text.trim().parse::<f64>() {
            Ok(p) if p.is_finite() => ReservoirKey::Pressure(p),
            _ => ReservoirKey::Condition(text.to_string()),
        }
    }
}

/// Ordered key -> [`Chempots`] collection with unique keys.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reservoirs {
    items: Vec<(ReservoirKey, Chempots)>,
}

impl Reservoirs {
    /// Exact lookup for labels, relative-tolerance lookup for pressures.
    pub fn get(&self, key: &ReservoirKey) -> Option<&Chempots> {
        self.items
            .iter()
            .find(|(k, _)| k.matches(key))
            .map(|(_, mu)| mu)
    }

    pub fn get_condition(&self, label: &str) -> Option<&Chempots> {
        self.get(&ReservoirKey::Condition(label.to_string()))
    }

    pub fn get_pressure(&self, pressure: f64) -> Option<&Chempots> {
        self.get(&ReservoirKey::Pressure(pressure))
    }

    pub fn keys(&self) -> impl Iterator<Item = &ReservoirKey> + '_ {
        self.items.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ReservoirKey, &Chempots)> + '_ {
        self.items.iter().map(|(k, mu)| (k, mu))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pressure keys in order; empty for condition reservoirs.
    pub fn pressures(&self) -> Vec<f64> {
        self.keys().filter_map(ReservoirKey::as_pressure).collect()
    }

    /// Potential of `element` under every key, in order (keys lacking the
    /// element are skipped).
    pub fn element_series(&self, element: Element) -> Vec<(ReservoirKey, f64)> {
        self.items
            .iter()
            .filter_map(|(k, mu)| mu.get(element).map(|v| (k.clone(), v)))
            .collect()
    }
}

/// Collects (key, potentials) pairs, keeping insertion order.
#[derive(Debug, Default)]
pub struct ReservoirBuilder {
    items: Vec<(ReservoirKey, Chempots)>,
}

impl ReservoirBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: ReservoirKey, chempots: Chempots) -> &mut Self {
        self.items.push((key, chempots));
        self
    }

    /// Fails with `DuplicateKey` if two keys would answer the same lookup.
    pub fn build(self) -> ReservoirResult<Reservoirs> {
        build(self.items)
    }
}

/// Assemble reservoirs from ordered pairs.
pub fn build<I>(items: I) -> ReservoirResult<Reservoirs>
where
    I: IntoIterator<Item = (ReservoirKey, Chempots)>,
{
    let mut out: Vec<(ReservoirKey, Chempots)> = Vec::new();
    for (key, chempots) in items {
        if out.iter().any(|(k, _)| k.matches(&key)) {
            return Err(ReservoirError::DuplicateKey {
                key: key.to_string(),
            });
        }
        out.push((key, chempots));
    }
    Ok(Reservoirs { items: out })
}

impl Serialize for Reservoirs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for (key, mu) in &self.items {
            map.serialize_entry(&key.to_string(), mu)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Reservoirs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ReservoirsVisitor;

        impl<'de> Visitor<'de> for ReservoirsVisitor {
            type Value = Reservoirs;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of condition labels or pressures to chemical potentials")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Reservoirs, A::Error> {
                let mut items = Vec::new();
                while let Some((key, mu)) = access.next_entry::<String, Chempots>()? {
                    items.push((ReservoirKey::from(key.as_str()), mu));
                }
                build(items).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_map(ReservoirsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mu(o: f64) -> Chempots {
        Chempots::from_pairs([(Element::O, o)]).unwrap()
    }

    #[test]
    fn preserves_insertion_order() {
        let mut builder = ReservoirBuilder::new();
        builder
            .push(ReservoirKey::Condition("O-rich".into()), mu(-5.0))
            .push(ReservoirKey::Condition("O-poor".into()), mu(-9.0));
        let res = builder.build().unwrap();
        let keys: Vec<String> = res.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["O-rich", "O-poor"]);
        assert_eq!(res.get_condition("O-poor"), Some(&mu(-9.0)));
        assert_eq!(res.get_condition("O-middle"), None);
    }

    #[test]
    fn rejects_duplicate_keys() {
        let items = vec![
            (ReservoirKey::Pressure(1.0), mu(-5.0)),
            (ReservoirKey::Pressure(1.0), mu(-6.0)),
        ];
        assert!(matches!(
            build(items),
            Err(ReservoirError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn pressures_within_lookup_tolerance_are_duplicates() {
        let items = vec![
            (ReservoirKey::Pressure(1e-5), mu(-5.0)),
            (ReservoirKey::Pressure(1e-5 * (1.0 + 1e-12)), mu(-6.0)),
        ];
        assert!(matches!(
            build(items),
            Err(ReservoirError::DuplicateKey { .. })
        ));

        // Distinct beyond the tolerance, and conditions never clash with pressures.
        let res = build([
            (ReservoirKey::Pressure(1e-5), mu(-5.0)),
            (ReservoirKey::Pressure(1.001e-5), mu(-6.0)),
            (ReservoirKey::Condition("O-rich".to_string()), mu(-4.0)),
        ])
        .unwrap();
        assert_eq!(res.len(), 3);
    }

    #[test]
    fn pressure_lookup_is_tolerant() {
        let res = build([
            (ReservoirKey::Pressure(1e-20), mu(-7.0)),
            (ReservoirKey::Pressure(1e10), mu(-4.0)),
        ])
        .unwrap();
        assert_eq!(res.get_pressure(1.0000000000001e-20), Some(&mu(-7.0)));
        assert_eq!(res.get_pressure(1e-19), None);
        assert_eq!(res.pressures(), vec![1e-20, 1e10]);
        let series = res.element_series(Element::O);
        assert_eq!(series[1], (ReservoirKey::Pressure(1e10), -4.0));
    }

    #[test]
    fn key_text() {
        assert_eq!(ReservoirKey::Pressure(1e-20).to_string(), "1e-20");
        assert_eq!(ReservoirKey::Pressure(1e10).to_string(), "1e10");
        assert_eq!(ReservoirKey::from("1e-20"), ReservoirKey::Pressure(1e-20));
        assert_eq!(
            ReservoirKey::from("O-rich"),
            ReservoirKey::Condition("O-rich".into())
        );
    }

    #[test]
    fn json_keeps_order_and_key_kinds() {
        let res = build([
            (ReservoirKey::Pressure(1e-20), mu(-7.0)),
            (ReservoirKey::Pressure(1e10), mu(-4.0)),
        ])
        .unwrap();
        let json = serde_json::to_string(&res).unwrap();
        assert_eq!(json, r#"{"1e-20":{"O":-7.0},"1e10":{"O":-4.0}}"#);
        let back: Reservoirs = serde_json::from_str(&json).unwrap();
        assert_eq!(back, res);
    }
}

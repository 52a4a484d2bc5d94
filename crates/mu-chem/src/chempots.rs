//! Chemical potential sets.

use crate::element::Element;
use crate::error::{ChemError, ChemResult};
use mu_core::numeric::ensure_finite;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Read-only map element -> chemical potential [eV].
///
/// Elements are kept in formula order. Serializes as an ordered
/// `{"Ba": -5.1, "Ti": -9.2, "O": -4.9}` object.
#[derive(Debug, Clone, PartialEq)]
pub struct Chempots {
    items: Vec<(Element, f64)>,
}

impl Chempots {
    /// Build from (element, potential) pairs; elements must be unique and
    /// potentials finite.
    pub fn from_pairs<I>(pairs: I) -> ChemResult<Self>
    where
        I: IntoIterator<Item = (Element, f64)>,
    {
        let mut items: Vec<(Element, f64)> = Vec::new();
        for (element, mu) in pairs {
            ensure_finite(mu, "chemical potential")?;
            if items.iter().any(|(e, _)| *e == element) {
                return Err(ChemError::DuplicateElement {
                    element: element.symbol().to_string(),
                });
            }
            items.push((element, mu));
        }
        items.sort_by(|a, b| a.0.canonical_cmp(&b.0));
        Ok(Self { items })
    }

    pub fn get(&self, element: Element) -> Option<f64> {
        self.items
            .iter()
            .find(|(e, _)| *e == element)
            .map(|(_, mu)| *mu)
    }

    /// Lookup by symbol, e.g. `chempots.get_symbol("O")`.
    pub fn get_symbol(&self, symbol: &str) -> Option<f64> {
        symbol.parse().ok().and_then(|e| self.get(e))
    }

    pub fn elements(&self) -> Vec<Element> {
        self.items.iter().map(|(e, _)| *e).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Element, f64)> + '_ {
        self.items.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elementwise `(a + b) / 2`.
    ///
    /// Used for the "middle" condition, which is an interpolation between
    /// two equilibria rather than an equilibrium itself.
    pub fn midpoint(a: &Self, b: &Self) -> ChemResult<Self> {
        a.zip_with(b, |x, y| (x + y) / 2.0)
    }

    fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> ChemResult<Self> {
        if self.elements() != other.elements() {
            return Err(ChemError::MismatchedElements {
                left: symbols(&self.elements()),
                right: symbols(&other.elements()),
            });
        }
        Ok(Self {
            items: self
                .items
                .iter()
                .zip(&other.items)
                .map(|((e, x), (_, y))| (*e, f(*x, *y)))
                .collect(),
        })
    }
}

fn symbols(elements: &[Element]) -> String {
    elements
        .iter()
        .map(|e| e.symbol())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Chempots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .items
            .iter()
            .map(|(e, mu)| format!("{e}: {mu:.6}"))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

impl Serialize for Chempots {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for (element, mu) in &self.items {
            map.serialize_entry(element.symbol(), mu)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Chempots {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChempotsVisitor;

        impl<'de> Visitor<'de> for ChempotsVisitor {
            type Value = Chempots;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of element symbols to chemical potentials")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Chempots, A::Error> {
                let mut pairs = Vec::new();
                while let Some((element, mu)) = access.next_entry::<Element, f64>()? {
                    pairs.push((element, mu));
                }
                Chempots::from_pairs(pairs).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_map(ChempotsVisitor)
    }
}

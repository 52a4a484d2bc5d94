//! Periodic-table elements.

use crate::error::{ChemError, ChemResult};
use core::cmp::Ordering;
use core::fmt;
use core::num::NonZeroU8;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Symbol and Pauling electronegativity, indexed by atomic number - 1.
///
/// Elements without a tabulated electronegativity (noble gases, superheavies)
/// sort after every other element in formulas.
const TABLE: [(&str, Option<f64>); 118] = [
    ("H", Some(2.20)),
    ("He", None),
    ("Li", Some(0.98)),
    ("Be", Some(1.57)),
    ("B", Some(2.04)),
    ("C", Some(2.55)),
    ("N", Some(3.04)),
    ("O", Some(3.44)),
    ("F", Some(3.98)),
    ("Ne", None),
    ("Na", Some(0.93)),
    ("Mg", Some(1.31)),
    ("Al", Some(1.61)),
    ("Si", Some(1.90)),
    ("P", Some(2.19)),
    ("S", Some(2.58)),
    ("Cl", Some(3.16)),
    ("Ar", None),
    ("K", Some(0.82)),
    ("Ca", Some(1.00)),
    ("Sc", Some(1.36)),
    ("Ti", Some(1.54)),
    ("V", Some(1.63)),
    ("Cr", Some(1.66)),
    ("Mn", Some(1.55)),
    ("Fe", Some(1.83)),
    ("Co", Some(1.88)),
    ("Ni", Some(1.91)),
    ("Cu", Some(1.90)),
    ("Zn", Some(1.65)),
    ("Ga", Some(1.81)),
    ("Ge", Some(2.01)),
    ("As", Some(2.18)),
    ("Se", Some(2.55)),
    ("Br", Some(2.96)),
    ("Kr", Some(3.00)),
    ("Rb", Some(0.82)),
    ("Sr", Some(0.95)),
    ("Y", Some(1.22)),
    ("Zr", Some(1.33)),
    ("Nb", Some(1.6)),
    ("Mo", Some(2.16)),
    ("Tc", Some(1.9)),
    ("Ru", Some(2.2)),
    ("Rh", Some(2.28)),
    ("Pd", Some(2.20)),
    ("Ag", Some(1.93)),
    ("Cd", Some(1.69)),
    ("In", Some(1.78)),
    ("Sn", Some(1.96)),
    ("Sb", Some(2.05)),
    ("Te", Some(2.1)),
    ("I", Some(2.66)),
    ("Xe", Some(2.6)),
    ("Cs", Some(0.79)),
    ("Ba", Some(0.89)),
    ("La", Some(1.10)),
    ("Ce", Some(1.12)),
    ("Pr", Some(1.13)),
    ("Nd", Some(1.14)),
    ("Pm", Some(1.13)),
    ("Sm", Some(1.17)),
    ("Eu", Some(1.2)),
    ("Gd", Some(1.2)),
    ("Tb", Some(1.1)),
    ("Dy", Some(1.22)),
    ("Ho", Some(1.23)),
    ("Er", Some(1.24)),
    ("Tm", Some(1.25)),
    ("Yb", Some(1.1)),
    ("Lu", Some(1.27)),
    ("Hf", Some(1.3)),
    ("Ta", Some(1.5)),
    ("W", Some(2.36)),
    ("Re", Some(1.9)),
    ("Os", Some(2.2)),
    ("Ir", Some(2.20)),
    ("Pt", Some(2.28)),
    ("Au", Some(2.54)),
    ("Hg", Some(2.00)),
    ("Tl", Some(1.62)),
    ("Pb", Some(2.33)),
    ("Bi", Some(2.02)),
    ("Po", Some(2.0)),
    ("At", Some(2.2)),
    ("Rn", Some(2.2)),
    ("Fr", Some(0.7)),
    ("Ra", Some(0.9)),
    ("Ac", Some(1.1)),
    ("Th", Some(1.3)),
    ("Pa", Some(1.5)),
    ("U", Some(1.38)),
    ("Np", Some(1.36)),
    ("Pu", Some(1.28)),
    ("Am", Some(1.13)),
    ("Cm", Some(1.28)),
    ("Bk", Some(1.3)),
    ("Cf", Some(1.3)),
    ("Es", Some(1.3)),
    ("Fm", Some(1.3)),
    ("Md", Some(1.3)),
    ("No", Some(1.3)),
    ("Lr", Some(1.3)),
    ("Rf", None),
    ("Db", None),
    ("Sg", None),
    ("Bh", None),
    ("Hs", None),
    ("Mt", None),
    ("Ds", None),
    ("Rg", None),
    ("Cn", None),
    ("Nh", None),
    ("Fl", None),
    ("Mc", None),
    ("Lv", None),
    ("Ts", None),
    ("Og", None),
];

/// A chemical element, stored as its atomic number.
///
/// `Ord` follows atomic number. Formula order (ascending electronegativity) is
/// available through [`Element::canonical_cmp`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element(NonZeroU8);

impl Element {
    pub const O: Element = Element(match NonZeroU8::new(8) {
        Some(z) => z,
        None => unreachable!(),
    });

    /// Look up an element by atomic number.
    pub fn from_z(z: u8) -> Option<Self> {
        if usize::from(z) > TABLE.len() {
            return None;
        }
        NonZeroU8::new(z).map(Self)
    }

    pub fn z(self) -> u8 {
        self.0.get()
    }

    pub fn symbol(self) -> &'static str {
        TABLE[usize::from(self.z()) - 1].0
    }

    /// Pauling electronegativity, when tabulated.
    pub fn electronegativity(self) -> Option<f64> {
        TABLE[usize::from(self.z()) - 1].1
    }

    /// Formula ordering: ascending electronegativity, untabulated last,
    /// atomic number as tie-break.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        let x = self.electronegativity().unwrap_or(f64::INFINITY);
        let y = other.electronegativity().unwrap_or(f64::INFINITY);
        x.total_cmp(&y).then_with(|| self.z().cmp(&other.z()))
    }

    /// Iterate over all 118 elements in atomic-number order.
    pub fn all() -> impl Iterator<Item = Element> {
        (1..=TABLE.len() as u8).filter_map(Element::from_z)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Element({})", self.symbol())
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl std::str::FromStr for Element {
    type Err = ChemError;

    fn from_str(s: &str) -> ChemResult<Self> {
        let symbol = s.trim();
        TABLE
            .iter()
            .position(|(sym, _)| *sym == symbol)
            .and_then(|idx| Element::from_z(idx as u8 + 1))
            .ok_or_else(|| ChemError::UnknownElement {
                symbol: symbol.to_string(),
            })
    }
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

impl<'de> Deserialize<'de> for Element {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let symbol = String::deserialize(deserializer)?;
        symbol.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(s: &str) -> Element {
        s.parse().unwrap()
    }

    #[test]
    fn symbols_round_trip() {
        for element in Element::all() {
            assert_eq!(el(element.symbol()), element);
        }
        assert_eq!(Element::all().count(), 118);
    }

    #[test]
    fn oxygen_constant_matches_table() {
        assert_eq!(Element::O, el("O"));
        assert_eq!(Element::O.z(), 8);
    }

    #[test]
    fn rejects_unknown_and_miscased_symbols() {
        assert!("Xx".parse::<Element>().is_err());
        assert!("ba".parse::<Element>().is_err());
        assert!("".parse::<Element>().is_err());
        assert!(Element::from_z(0).is_none());
        assert!(Element::from_z(119).is_none());
    }

    #[test]
    fn canonical_order_follows_electronegativity() {
        let mut elements = vec![el("O"), el("Ti"), el("Ba")];
        elements.sort_by(Element::canonical_cmp);
        assert_eq!(elements, vec![el("Ba"), el("Ti"), el("O")]);

        // Equal electronegativity falls back to atomic number.
        assert_eq!(el("Si").canonical_cmp(&el("Cu")), Ordering::Less);
        // Noble gases sort last.
        assert_eq!(el("Ar").canonical_cmp(&el("F")), Ordering::Greater);
    }

    #[test]
    fn serde_as_symbol() {
        let json = serde_json::to_string(&el("Ti")).unwrap();
        assert_eq!(json, "\"Ti\"");
        let back: Element = serde_json::from_str(&json).unwrap();
        assert_eq!(back, el("Ti"));
    }
}

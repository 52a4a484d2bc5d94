//! Stoichiometric compositions and chemical systems.

use crate::element::Element;
use crate::error::{ChemError, ChemResult};
use mu_core::numeric::gcd;
use std::fmt;

/// Amounts closer than this to an integer are treated as integers.
const AMOUNT_TOL: f64 = 1e-8;

/// Largest denominator tried when turning rational stoichiometries into
/// integer formulas (e.g. `Ba0.5Ti0.5O1.5` -> `BaTiO3`).
const MAX_MULTIPLIER: u32 = 12;

/// Composition: element amounts per formula unit.
///
/// Items are kept in formula order (ascending electronegativity) and every
/// amount is finite and strictly positive.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Composition {
    items: Vec<(Element, f64)>,
}

impl Composition {
    /// Build from (element, amount) pairs.
    ///
    /// Repeated elements are summed, zero amounts dropped; negative or
    /// non-finite amounts are rejected.
    pub fn from_amounts<I>(amounts: I) -> ChemResult<Self>
    where
        I: IntoIterator<Item = (Element, f64)>,
    {
        let mut items: Vec<(Element, f64)> = Vec::new();
        for (element, amount) in amounts {
            if !amount.is_finite() || amount < 0.0 {
                return Err(ChemError::InvalidAmount {
                    element: element.symbol().to_string(),
                    value: amount,
                });
            }
            if amount == 0.0 {
                continue;
            }
            match items.iter_mut().find(|(e, _)| *e == element) {
                Some((_, total)) => *total += amount,
                None => items.push((element, amount)),
            }
        }

        if items.is_empty() {
            return Err(ChemError::EmptyComposition);
        }
        items.sort_by(|a, b| a.0.canonical_cmp(&b.0));
        Ok(Self { items })
    }

    /// One atom of a single element.
    pub fn element(element: Element) -> Self {
        Self {
            items: vec![(element, 1.0)],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Element, f64)> + '_ {
        self.items.iter().copied()
    }

    /// Elements in formula order.
    pub fn elements(&self) -> Vec<Element> {
        self.items.iter().map(|(e, _)| *e).collect()
    }

    /// Amount of `element` per formula unit (0.0 if absent).
    pub fn amount(&self, element: Element) -> f64 {
        self.items
            .iter()
            .find(|(e, _)| *e == element)
            .map(|(_, a)| *a)
            .unwrap_or(0.0)
    }

    pub fn contains(&self, element: Element) -> bool {
        self.items.iter().any(|(e, _)| *e == element)
    }

    pub fn num_atoms(&self) -> f64 {
        self.items.iter().map(|(_, a)| a).sum()
    }

    /// Atomic fraction of `element`.
    pub fn fraction(&self, element: Element) -> f64 {
        self.amount(element) / self.num_atoms()
    }

    /// `Some(element)` for elemental compositions.
    pub fn is_element(&self) -> Option<Element> {
        match self.items.as_slice() {
            [(element, _)] => Some(*element),
            _ => None,
        }
    }

    pub fn chemical_system(&self) -> ChemicalSystem {
        ChemicalSystem::new(self.items.iter().map(|(e, _)| *e))
    }

    /// Multiply every amount by `factor`.
    pub fn scaled(&self, factor: f64) -> ChemResult<Self> {
        Self::from_amounts(self.items.iter().map(|(e, a)| (*e, a * factor)))
    }

    /// Reduced composition and the factor such that `self == reduced * factor`.
    ///
    /// Integer (or small-denominator rational) stoichiometries reduce by their
    /// greatest common divisor; anything else reduces to atomic fractions.
    pub fn reduced(&self) -> (Self, f64) {
        if let Some(multiplier) = self.integer_multiplier() {
            let m = f64::from(multiplier);
            let counts: Vec<u64> = self
                .items
                .iter()
                .map(|(_, a)| (a * m).round() as u64)
                .collect();
            let divisor = counts.iter().fold(0, |acc, &n| gcd(acc, n)).max(1);
            let items = self
                .items
                .iter()
                .zip(&counts)
                .map(|((e, _), &n)| (*e, (n / divisor) as f64))
                .collect();
            return (Self { items }, divisor as f64 / m);
        }

        let total = self.num_atoms();
        let items = self.items.iter().map(|(e, a)| (*e, a / total)).collect();
        (Self { items }, total)
    }

    pub fn reduced_formula(&self) -> String {
        self.reduced().0.formula()
    }

    /// Formula in canonical element order, unit amounts omitted (`BaTiO3`).
    pub fn formula(&self) -> String {
        let mut out = String::new();
        for (element, amount) in &self.items {
            out.push_str(element.symbol());
            if (amount - 1.0).abs() > AMOUNT_TOL {
                out.push_str(&format_amount(*amount));
            }
        }
        out
    }

    /// Same atomic fractions within `tol`.
    pub fn same_reduced(&self, other: &Self, tol: f64) -> bool {
        if self.items.len() != other.items.len() {
            return false;
        }
        self.items
            .iter()
            .all(|(e, _)| other.contains(*e) && (self.fraction(*e) - other.fraction(*e)).abs() <= tol)
    }

    fn integer_multiplier(&self) -> Option<u32> {
        (1..=MAX_MULTIPLIER).find(|&m| {
            self.items.iter().all(|(_, a)| {
                let scaled = a * f64::from(m);
                scaled.round() >= 1.0 && (scaled - scaled.round()).abs() < AMOUNT_TOL * f64::from(m)
            })
        })
    }
}

fn format_amount(amount: f64) -> String {
    if (amount - amount.round()).abs() < AMOUNT_TOL {
        format!("{}", amount.round() as i64)
    } else {
        let text = format!("{amount:.6}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formula())
    }
}

impl std::str::FromStr for Composition {
    type Err = ChemError;

    fn from_str(s: &str) -> ChemResult<Self> {
        let chars: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if chars.is_empty() {
            return Err(ChemError::EmptyComposition);
        }
        let mut parser = FormulaParser {
            text: s,
            chars: &chars,
            pos: 0,
        };
        let amounts = parser.group(0)?;
        if parser.pos != chars.len() {
            return Err(ChemError::invalid_formula(s, "unbalanced parenthesis"));
        }
        Self::from_amounts(amounts)
    }
}

impl TryFrom<String> for Composition {
    type Error = ChemError;

    fn try_from(value: String) -> ChemResult<Self> {
        value.parse()
    }
}

impl From<Composition> for String {
    fn from(value: Composition) -> Self {
        value.formula()
    }
}

/// Recursive-descent parser for formulas like `Ba(OH)2` or `Li0.5CoO2`.
struct FormulaParser<'a> {
    text: &'a str,
    chars: &'a [char],
    pos: usize,
}

impl FormulaParser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn group(&mut self, depth: usize) -> ChemResult<Vec<(Element, f64)>> {
        let mut out = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                '(' | '[' => {
                    self.pos += 1;
                    let inner = self.group(depth + 1)?;
                    if !matches!(self.peek(), Some(')') | Some(']')) {
                        return Err(ChemError::invalid_formula(self.text, "unbalanced parenthesis"));
                    }
                    self.pos += 1;
                    let multiplier = self.number()?.unwrap_or(1.0);
                    out.extend(inner.into_iter().map(|(e, a)| (e, a * multiplier)));
                }
                ')' | ']' => {
                    if depth == 0 {
                        return Err(ChemError::invalid_formula(self.text, "unbalanced parenthesis"));
                    }
                    break;
                }
                c if c.is_ascii_uppercase() => {
                    let mut symbol = String::from(c);
                    self.pos += 1;
                    while let Some(lower) = self.peek().filter(char::is_ascii_lowercase) {
                        symbol.push(lower);
                        self.pos += 1;
                    }
                    let element: Element = symbol.parse()?;
                    let amount = self.number()?.unwrap_or(1.0);
                    out.push((element, amount));
                }
                other => {
                    return Err(ChemError::invalid_formula(
                        self.text,
                        format!("unexpected character '{other}'"),
                    ));
                }
            }
        }
        Ok(out)
    }

    fn number(&mut self) -> ChemResult<Option<f64>> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Ok(None);
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ChemError::invalid_formula(self.text, format!("bad amount '{digits}'")))
    }
}

/// Closed set of elements, kept in formula order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChemicalSystem {
    elements: Vec<Element>,
}

impl ChemicalSystem {
    pub fn new<I: IntoIterator<Item = Element>>(elements: I) -> Self {
        let mut elements: Vec<Element> = elements.into_iter().collect();
        elements.sort_by(Element::canonical_cmp);
        elements.dedup();
        Self { elements }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, element: Element) -> bool {
        self.elements.contains(&element)
    }

    /// Every element of `composition` belongs to this system.
    pub fn covers(&self, composition: &Composition) -> bool {
        composition.iter().all(|(e, _)| self.contains(e))
    }

    /// Position of `element` in formula order.
    pub fn index_of(&self, element: Element) -> Option<usize> {
        self.elements.iter().position(|e| *e == element)
    }

    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.elements.iter().chain(other.elements.iter()).copied())
    }
}

impl fmt::Display for ChemicalSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: Vec<&str> = self.elements.iter().map(|e| e.symbol()).collect();
        f.write_str(&symbols.join("-"))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn reduced_times_factor_recovers_amounts(
            a in 1_u32..9, b in 1_u32..9, c in 1_u32..9, scale in 1_u32..5,
        ) {
            let formula = format!("Ba{}Ti{}O{}", a * scale, b * scale, c * scale);
            let original: Composition = formula.parse().unwrap();
            let (reduced, factor) = original.reduced();
            for (element, amount) in original.iter() {
                prop_assert!((reduced.amount(element) * factor - amount).abs() < 1e-9);
            }
            prop_assert!(reduced.same_reduced(&original, 1e-12));
        }
    }
}

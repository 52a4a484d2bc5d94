//! Condition tokens (`"O-rich"`) and their resolution over an interval.

use crate::error::{ReservoirError, ReservoirResult};
use crate::reservoirs::{ReservoirBuilder, ReservoirKey, Reservoirs};
use mu_chem::{Chempots, Composition, Element};
use mu_phase::StabilityInterval;
use std::fmt;

/// Which end of a stability interval to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Qualifier {
    /// Lower bound of the open element's potential.
    Poor,
    /// Elementwise mean of both bounds. An interpolation, not an equilibrium.
    Middle,
    /// Upper bound.
    Rich,
}

impl Qualifier {
    /// Order used for bulk reservoirs.
    pub const ALL: [Qualifier; 3] = [Qualifier::Poor, Qualifier::Middle, Qualifier::Rich];

    pub fn as_str(&self) -> &'static str {
        match self {
            Qualifier::Poor => "poor",
            Qualifier::Middle => "middle",
            Qualifier::Rich => "rich",
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Qualifier {
    type Err = ReservoirError;

    fn from_str(s: &str) -> ReservoirResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "poor" => Ok(Qualifier::Poor),
            "middle" => Ok(Qualifier::Middle),
            "rich" => Ok(Qualifier::Rich),
            _ => Err(ReservoirError::invalid_condition(
                s,
                "qualifier must be one of poor, middle, rich",
            )),
        }
    }
}

/// Parsed `"<Element>-<qualifier>"` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Condition {
    pub element: Element,
    pub qualifier: Qualifier,
}

impl Condition {
    pub fn new(element: Element, qualifier: Qualifier) -> Self {
        Self { element, qualifier }
    }

    /// Fails with `ElementNotInComposition` unless `composition` holds the element.
    pub fn ensure_in(&self, composition: &Composition) -> ReservoirResult<()> {
        if composition.contains(self.element) {
            Ok(())
        } else {
            Err(ReservoirError::ElementNotInComposition {
                element: self.element.symbol().to_string(),
                formula: composition.formula(),
            })
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.element, self.qualifier)
    }
}

impl std::str::FromStr for Condition {
    type Err = ReservoirError;

    /// Splits on the first hyphen.
    fn from_str(s: &str) -> ReservoirResult<Self> {
        let (symbol, qualifier) = s
            .split_once('-')
            .ok_or_else(|| ReservoirError::invalid_condition(s, "expected '<Element>-<qualifier>'"))?;
        let element: Element = symbol
            .trim()
            .parse()
            .map_err(|_| ReservoirError::invalid_condition(s, format!("unknown element '{symbol}'")))?;
        let qualifier: Qualifier = qualifier
            .parse()
            .map_err(|_| ReservoirError::invalid_condition(s, format!("unknown qualifier '{qualifier}'")))?;
        Ok(Self { element, qualifier })
    }
}

/// Potential set for `qualifier` over `interval`.
pub fn resolve(interval: &StabilityInterval, qualifier: Qualifier) -> ReservoirResult<Chempots> {
    match qualifier {
        Qualifier::Poor => Ok(interval.low().clone()),
        Qualifier::Rich => Ok(interval.high().clone()),
        Qualifier::Middle => Ok(Chempots::midpoint(interval.low(), interval.high())?),
    }
}

/// Oxygen when present, otherwise the last element in formula order.
pub fn default_element(composition: &Composition) -> Option<Element> {
    if composition.contains(Element::O) {
        return Some(Element::O);
    }
    composition.elements().last().copied()
}

/// `<el>-poor`, `<el>-middle`, `<el>-rich` over `interval`, in that order.
pub fn condition_reservoirs(interval: &StabilityInterval) -> ReservoirResult<Reservoirs> {
    let mut builder = ReservoirBuilder::new();
    for qualifier in Qualifier::ALL {
        let condition = Condition::new(interval.open_element(), qualifier);
        builder.push(
            ReservoirKey::Condition(condition.to_string()),
            resolve(interval, qualifier)?,
        );
    }
    builder.build()
}

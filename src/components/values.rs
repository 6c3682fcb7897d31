//! Electrical quantities carried by every component.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four quantities the solver reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    Resistance,
    /// Voltage drop for passive elements, EMF for batteries
    Voltage,
    Current,
    Power,
}

impl Quantity {
    pub const ALL: [Quantity; 4] = [
        Quantity::Resistance,
        Quantity::Voltage,
        Quantity::Current,
        Quantity::Power,
    ];

    /// Single-letter symbol used in summaries.
    pub fn symbol(&self) -> &'static str {
        match self {
            Quantity::Resistance => "R",
            Quantity::Voltage => "V",
            Quantity::Current => "I",
            Quantity::Power => "P",
        }
    }

    /// SI unit suffix.
    pub fn unit(&self) -> &'static str {
        match self {
            Quantity::Resistance => "Ω",
            Quantity::Voltage => "V",
            Quantity::Current => "A",
            Quantity::Power => "W",
        }
    }

    /// Parse a quantity from a DSL parameter key (`r`, `v`, `i`, `p`).
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "r" | "resistance" => Some(Quantity::Resistance),
            "v" | "voltage" => Some(Quantity::Voltage),
            "i" | "current" => Some(Quantity::Current),
            "p" | "power" => Some(Quantity::Power),
            _ => None,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quantity::Resistance => "resistance",
            Quantity::Voltage => "voltage",
            Quantity::Current => "current",
            Quantity::Power => "power",
        };
        f.write_str(name)
    }
}

/// A quantity that is either user-specified or left to the solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// Authoritative input, never overwritten by the solver.
    Fixed(f64),
    /// Derived value; `None` until a tick resolves it.
    Automatic(Option<f64>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Automatic(None)
    }
}

impl Value {
    /// The stored number, fixed or derived.
    pub fn get(&self) -> Option<f64> {
        match *self {
            Value::Fixed(v) => Some(v),
            Value::Automatic(v) => v,
        }
    }

    /// The value a tick starts from: fixed values only.
    ///
    /// Automatic values are re-derived every tick so that edits to fixed
    /// inputs never leave stale results in the equation pool.
    pub fn input(&self) -> Option<f64> {
        match *self {
            Value::Fixed(v) => Some(v),
            Value::Automatic(_) => None,
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Value::Fixed(_))
    }

    /// Store a derived value. Returns `true` if the stored value changed.
    ///
    /// Fixed values are left untouched.
    pub fn assign(&mut self, value: Option<f64>) -> bool {
        match self {
            Value::Fixed(_) => false,
            Value::Automatic(current) => {
                let changed = *current != value;
                *current = value;
                changed
            }
        }
    }
}

/// The four electrical quantities of one component.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Values {
    pub resistance: Value,
    pub voltage: Value,
    pub current: Value,
    pub power: Value,
}

impl Values {
    /// Read one quantity.
    pub fn get(&self, quantity: Quantity) -> &Value {
        match quantity {
            Quantity::Resistance => &self.resistance,
            Quantity::Voltage => &self.voltage,
            Quantity::Current => &self.current,
            Quantity::Power => &self.power,
        }
    }

    /// Mutable access to one quantity.
    pub fn get_mut(&mut self, quantity: Quantity) -> &mut Value {
        match quantity {
            Quantity::Resistance => &mut self.resistance,
            Quantity::Voltage => &mut self.voltage,
            Quantity::Current => &mut self.current,
            Quantity::Power => &mut self.power,
        }
    }

    /// Mark a quantity as user-specified.
    pub fn fix(&mut self, quantity: Quantity, value: f64) {
        *self.get_mut(quantity) = Value::Fixed(value);
    }

    /// Return a quantity to solver control, clearing any stored value.
    pub fn release(&mut self, quantity: Quantity) {
        *self.get_mut(quantity) = Value::Automatic(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_value_is_not_overwritten() {
        let mut v = Value::Fixed(10.0);
        assert!(!v.assign(Some(3.0)));
        assert_eq!(v.get(), Some(10.0));
        assert_eq!(v.input(), Some(10.0));
    }

    #[test]
    fn test_automatic_value_starts_undefined_each_tick() {
        let mut v = Value::default();
        assert!(v.assign(Some(2.5)));
        assert_eq!(v.get(), Some(2.5));
        assert_eq!(v.input(), None);
        assert!(!v.assign(Some(2.5)));
        assert!(v.assign(None));
    }

    #[test]
    fn test_values_accessors() {
        let mut values = Values::default();
        values.fix(Quantity::Resistance, 100.0);
        assert!(values.get(Quantity::Resistance).is_fixed());
        assert!(!values.get(Quantity::Current).is_fixed());
        values.release(Quantity::Resistance);
        assert_eq!(values.resistance, Value::Automatic(None));
    }

    #[test]
    fn test_quantity_keys() {
        assert_eq!(Quantity::from_key("R"), Some(Quantity::Resistance));
        assert_eq!(Quantity::from_key("p"), Some(Quantity::Power));
        assert_eq!(Quantity::from_key("x"), None);
    }
}

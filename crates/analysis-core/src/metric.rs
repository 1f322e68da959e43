use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A raw or derived metric that is either a known finite value or absent.
///
/// Providers routinely return partial data, so every field and every
/// derived figure in the pipeline carries this tag instead of a sentinel
/// number. Arithmetic on a `Missing` operand yields `Missing`; the f64
/// combinators also reject non-finite results, so overflow or a domain
/// error in a formula degrades to `Missing` rather than leaking a NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric<T> {
    Present(T),
    Missing,
}

impl<T> Metric<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Metric::Present(_))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Metric::Missing)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Metric<U> {
        match self {
            Metric::Present(v) => Metric::Present(f(v)),
            Metric::Missing => Metric::Missing,
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Metric<U>) -> Metric<U> {
        match self {
            Metric::Present(v) => f(v),
            Metric::Missing => Metric::Missing,
        }
    }

    pub fn filter(self, pred: impl FnOnce(&T) -> bool) -> Metric<T> {
        match self {
            Metric::Present(v) if pred(&v) => Metric::Present(v),
            _ => Metric::Missing,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Metric::Present(v) => v,
            Metric::Missing => default,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Metric::Present(v) => Some(v),
            Metric::Missing => None,
        }
    }
}

impl Metric<f64> {
    /// Classify a raw number: `Present` iff finite, `Missing` otherwise.
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() {
            Metric::Present(value)
        } else {
            Metric::Missing
        }
    }

    /// Absent provider fields map straight to `Missing`; present ones
    /// still go through the finiteness check.
    pub fn from_option(value: Option<f64>) -> Self {
        match value {
            Some(v) => Metric::from_f64(v),
            None => Metric::Missing,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Metric::Present(v) => Some(*v),
            Metric::Missing => None,
        }
    }

    /// Apply a unary formula, degrading a non-finite result to `Missing`.
    pub fn compute(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Metric::Present(v) => Metric::from_f64(f(v)),
            Metric::Missing => Metric::Missing,
        }
    }

    /// Apply a binary formula; `Missing` in either operand wins.
    pub fn compute2(self, other: Self, f: impl FnOnce(f64, f64) -> f64) -> Self {
        match (self, other) {
            (Metric::Present(a), Metric::Present(b)) => Metric::from_f64(f(a, b)),
            _ => Metric::Missing,
        }
    }
}

impl<T> Default for Metric<T> {
    fn default() -> Self {
        Metric::Missing
    }
}

impl<T> From<Option<T>> for Metric<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Metric::Present(v),
            None => Metric::Missing,
        }
    }
}

// Serialized as a nullable value so SQL NULL and JSON null round-trip.
impl<T: Serialize> Serialize for Metric<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Metric::Present(v) => serializer.serialize_some(v),
            Metric::Missing => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Metric<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}

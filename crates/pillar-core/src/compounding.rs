//! Compounding conventions.

/// How interest is compounded when converting between rates and discount
/// factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Compounding {
    /// Simple interest: `1 + r·t`
    Simple,
    /// Compounded interest: `(1 + r/f)^(f·t)`
    Compounded,
    /// Continuously compounded: `e^(r·t)`
    Continuous,
    /// Simple interest up to one compounding period, compounded thereafter.
    SimpleThenCompounded,
    /// Compounded up to one compounding period, simple thereafter.
    CompoundedThenSimple,
}

impl Compounding {
    /// `true` for the conventions that need a compounding frequency.
    pub fn needs_frequency(self) -> bool {
        !matches!(self, Compounding::Simple | Compounding::Continuous)
    }
}

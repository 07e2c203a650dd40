//! `Frequency`: how often events recur.

/// Event, payment or compounding frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Frequency {
    /// No events; a sentinel for simple and continuous compounding.
    NoFrequency,
    /// Once (maturity only).
    Once,
    /// Annual (once per year).
    Annual,
    /// Semi-annual (twice per year).
    Semiannual,
    /// Quarterly (four times per year).
    Quarterly,
    /// Bi-monthly (six times per year).
    Bimonthly,
    /// Monthly (twelve times per year).
    Monthly,
    /// Weekly (fifty-two times per year).
    Weekly,
    /// Daily.
    Daily,
}

impl Frequency {
    /// Number of periods per year. Returns `None` for `NoFrequency`.
    pub fn periods_per_year(&self) -> Option<u32> {
        match self {
            Frequency::NoFrequency => None,
            Frequency::Once => Some(0),
            Frequency::Annual => Some(1),
            Frequency::Semiannual => Some(2),
            Frequency::Quarterly => Some(4),
            Frequency::Bimonthly => Some(6),
            Frequency::Monthly => Some(12),
            Frequency::Weekly => Some(52),
            Frequency::Daily => Some(365),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Frequency::NoFrequency => "No-Frequency",
            Frequency::Once => "Once",
            Frequency::Annual => "Annual",
            Frequency::Semiannual => "Semiannual",
            Frequency::Quarterly => "Quarterly",
            Frequency::Bimonthly => "Bimonthly",
            Frequency::Monthly => "Monthly",
            Frequency::Weekly => "Weekly",
            Frequency::Daily => "Daily",
        };
        write!(f, "{s}")
    }
}

//! Severity categories for protection-need classifications.

use std::fmt;

/// Severity of a protection-need classification.
///
/// The three categories form a fixed total order, `Normal < High < VeryHigh`,
/// which drives the combination algebra in
/// [`ProtectionNeed::combine`](crate::domain::ProtectionNeed::combine): the
/// more severe classification always wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProtectionCategory {
    /// Baseline protection need ("Normal").
    Normal,
    /// Elevated protection need ("Hoch").
    High,
    /// Maximum protection need ("Sehr hoch").
    VeryHigh,
}

impl ProtectionCategory {
    /// Numeric severity level: 0 for [`Normal`](Self::Normal), 1 for
    /// [`High`](Self::High), 2 for [`VeryHigh`](Self::VeryHigh).
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::High => 1,
            Self::VeryHigh => 2,
        }
    }

    /// The German display label used in exported reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::High => "Hoch",
            Self::VeryHigh => "Sehr hoch",
        }
    }
}

impl fmt::Display for ProtectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

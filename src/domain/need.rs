//! Protection-need values and their combination algebra.

use std::{cmp::Ordering, collections::BTreeSet};

use crate::domain::ProtectionCategory;

/// One of the three classification dimensions of the CIA triad.
///
/// The variant order is the column order of exported reports and is exposed
/// as [`Dimension::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Integrity ("Integrität").
    Integrity,
    /// Availability ("Verfügbarkeit").
    Availability,
    /// Confidentiality ("Vertraulichkeit").
    Confidentiality,
}

impl Dimension {
    /// All dimensions, in export column order.
    pub const ALL: [Self; 3] = [Self::Integrity, Self::Availability, Self::Confidentiality];

    /// The German column label used in exported reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Integrity => "Integrität",
            Self::Availability => "Verfügbarkeit",
            Self::Confidentiality => "Vertraulichkeit",
        }
    }
}

/// A declared or derived protection-need classification.
///
/// Pairs a severity [`ProtectionCategory`] with a set of free-text
/// justification remarks. The remark set is deduplicated by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionNeed {
    category: ProtectionCategory,
    remarks: BTreeSet<String>,
}

impl ProtectionNeed {
    /// A protection need without justification remarks.
    #[must_use]
    pub const fn new(category: ProtectionCategory) -> Self {
        Self {
            category,
            remarks: BTreeSet::new(),
        }
    }

    /// A protection need with the given justification remarks.
    ///
    /// Duplicate remarks are collapsed.
    pub fn with_remarks<I, S>(category: ProtectionCategory, remarks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            category,
            remarks: remarks.into_iter().map(Into::into).collect(),
        }
    }

    /// The severity category.
    #[must_use]
    pub const fn category(&self) -> ProtectionCategory {
        self.category
    }

    /// The justification remarks.
    #[must_use]
    pub const fn remarks(&self) -> &BTreeSet<String> {
        &self.remarks
    }

    /// Combines two protection needs into one.
    ///
    /// The strictly more severe need wins outright, discarding the other
    /// need's remarks: only justification text attached to the winning
    /// severity survives. When both needs have the same severity, the remark
    /// sets are unioned.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        match self.category.cmp(&other.category) {
            Ordering::Less => other,
            Ordering::Greater => self,
            Ordering::Equal => {
                let mut remarks = self.remarks;
                remarks.extend(other.remarks);
                Self {
                    category: self.category,
                    remarks,
                }
            }
        }
    }

    /// Folds [`combine`](Self::combine) over the present values, skipping
    /// absent ones.
    ///
    /// Returns `None` when every input is absent. The result is independent
    /// of input order: strict severity comparisons are a total order and ties
    /// union the remark sets.
    pub fn determine<I>(needs: I) -> Option<Self>
    where
        I: IntoIterator<Item = Option<Self>>,
    {
        needs.into_iter().flatten().reduce(Self::combine)
    }

    /// The remarks joined with `"; "` for display.
    pub(crate) fn joined_remarks(&self) -> String {
        self.remarks
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// The declared classifications of a single node, keyed by [`Dimension`].
///
/// Every dimension starts out absent; an unset dimension is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredNeeds {
    integrity: Option<ProtectionNeed>,
    availability: Option<ProtectionNeed>,
    confidentiality: Option<ProtectionNeed>,
}

impl DeclaredNeeds {
    /// The declared need for the given dimension, if any.
    #[must_use]
    pub const fn get(&self, dimension: Dimension) -> Option<&ProtectionNeed> {
        match dimension {
            Dimension::Integrity => self.integrity.as_ref(),
            Dimension::Availability => self.availability.as_ref(),
            Dimension::Confidentiality => self.confidentiality.as_ref(),
        }
    }

    pub(crate) fn set(&mut self, dimension: Dimension, need: ProtectionNeed) {
        match dimension {
            Dimension::Integrity => self.integrity = Some(need),
            Dimension::Availability => self.availability = Some(need),
            Dimension::Confidentiality => self.confidentiality = Some(need),
        }
    }
}

//! Duration units and formatting
//!
//! Durations are stored as a day count. Weeks, months and years convert
//! with fixed ratios (7, 30, 365), so the conversions are approximations
//! rather than calendar arithmetic.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum DurationUnit {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl DurationUnit {
    /// Largest first, the order the formatter peels units off
    pub const DESCENDING: [DurationUnit; 4] = [
        DurationUnit::Year,
        DurationUnit::Month,
        DurationUnit::Week,
        DurationUnit::Day,
    ];

    pub fn days(&self) -> u64 {
        match self {
            DurationUnit::Day => 1,
            DurationUnit::Week => 7,
            DurationUnit::Month => 30,
            DurationUnit::Year => 365,
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            DurationUnit::Day => "day",
            DurationUnit::Week => "week",
            DurationUnit::Month => "month",
            DurationUnit::Year => "year",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            DurationUnit::Day => "days",
            DurationUnit::Week => "weeks",
            DurationUnit::Month => "months",
            DurationUnit::Year => "years",
        }
    }

    /// Label shown next to the duration input
    pub fn label(&self) -> &'static str {
        match self {
            DurationUnit::Day => "day(s)",
            DurationUnit::Week => "week(s)",
            DurationUnit::Month => "month(s)",
            DurationUnit::Year => "year(s)",
        }
    }

    /// Accepts English labels as well as the labels of the legacy web form
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "day" | "days" | "day(s)" | "jour" | "jours" | "jour(s)" => Some(DurationUnit::Day),
            "week" | "weeks" | "week(s)" | "semaine" | "semaines" | "semaine(s)" => {
                Some(DurationUnit::Week)
            }
            "month" | "months" | "month(s)" | "mois" => Some(DurationUnit::Month),
            "year" | "years" | "year(s)" | "année" | "années" | "année(s)" | "an" | "ans" => {
                Some(DurationUnit::Year)
            }
            _ => None,
        }
    }

    fn noun(&self, quantity: u64) -> &'static str {
        if quantity == 1 {
            self.singular()
        } else {
            self.plural()
        }
    }
}

impl std::fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Convert a quantity of `unit` to days, saturating on overflow
pub fn to_days(quantity: u64, unit: DurationUnit) -> u64 {
    quantity.saturating_mul(unit.days())
}

/// Convert a duration typed as text, e.g. `("2", "semaine(s)")` → 14.
///
/// Unknown unit labels count as days. Returns `None` when the quantity is
/// not a whole number.
pub fn convert_duration_to_days(quantity: &str, unit_label: &str) -> Option<u64> {
    let quantity: u64 = quantity.trim().parse().ok()?;
    let unit = DurationUnit::from_label(unit_label).unwrap_or_default();
    Some(to_days(quantity, unit))
}

/// Largest unit that fits, with the quantity rounded down.
///
/// Used to prefill the edit form: 400 days → (1, Year).
pub fn largest_unit(days: u64) -> (u64, DurationUnit) {
    for unit in DurationUnit::DESCENDING {
        if days >= unit.days() && unit != DurationUnit::Day {
            return (days / unit.days(), unit);
        }
    }
    (days, DurationUnit::Day)
}

/// Format a day count with the largest units first.
///
/// 400 → "1 year and 1 month and 5 days"
pub fn format_duration(days: u64) -> String {
    let (quantity, unit) = largest_unit(days);
    let head = format!("{} {}", quantity, unit.noun(quantity));
    let remainder = days - quantity * unit.days();
    if remainder > 0 && unit != DurationUnit::Day {
        format!("{} and {}", head, format_duration(remainder))
    } else {
        head
    }
}

/// A formatted duration read back into its terms
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedDuration {
    pub terms: Vec<(u64, DurationUnit)>,
}

impl ParsedDuration {
    pub fn total_days(&self) -> u64 {
        self.terms
            .iter()
            .fold(0u64, |acc, (quantity, unit)| acc.saturating_add(to_days(*quantity, *unit)))
    }
}

/// Parse the output of [`format_duration`]
pub fn parse_formatted_duration(text: &str) -> Option<ParsedDuration> {
    let mut terms = Vec::new();
    for part in text.split(" and ") {
        let (quantity, noun) = part.trim().split_once(' ')?;
        let quantity = quantity.parse().ok()?;
        let unit = DurationUnit::from_label(noun)?;
        terms.push((quantity, unit));
    }
    if terms.is_empty() {
        return None;
    }
    Some(ParsedDuration { terms })
}

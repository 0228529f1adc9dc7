//! Calculation list rendering
//!
//! Turns the cached list into display cards. Cards carry the actions they
//! expose as plain values; the front end hands a chosen action back to
//! [`SessionClient::dispatch`](crate::SessionClient::dispatch).

use std::fmt;

use calc_types::{symbol_for, Calculation};
use chrono::{DateTime, Local, TimeZone, Utc};

/// Placeholder shown for an empty list
pub const EMPTY_PLACEHOLDER: &str = "No calculations yet. Create your first one!";

/// Action exposed by a calculation card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Edit(i64),
    Delete(i64),
}

impl CardAction {
    pub fn id(&self) -> i64 {
        match self {
            CardAction::Edit(id) | CardAction::Delete(id) => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationCard {
    pub id: i64,
    /// Operation name, upper-cased
    pub heading: String,
    /// `a ⊕ b = r`
    pub expression: String,
    /// Creation time in local time
    pub date: String,
}

impl CalculationCard {
    pub fn from_calculation(calc: &Calculation) -> Self {
        Self::from_calculation_in(calc, &Local)
    }

    /// Render with creation time shown in `tz`
    pub fn from_calculation_in<Tz>(calc: &Calculation, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            id: calc.id,
            heading: calc.operation.to_uppercase(),
            expression: expression(calc),
            date: format_timestamp(&calc.created_at, tz),
        }
    }

    pub fn edit(&self) -> CardAction {
        CardAction::Edit(self.id)
    }

    pub fn delete(&self) -> CardAction {
        CardAction::Delete(self.id)
    }

    /// Full card text as displayed
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CalculationCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.heading)?;
        writeln!(f, "Expression: {}", self.expression)?;
        write!(f, "Date: {}", self.date)
    }
}

/// Rendered calculation list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListView {
    /// Nothing rendered (logged out or not yet loaded)
    #[default]
    Blank,
    /// Loaded, but the user has no calculations
    Empty,
    Cards(Vec<CalculationCard>),
}

impl ListView {
    pub fn cards(&self) -> &[CalculationCard] {
        match self {
            ListView::Cards(cards) => cards,
            _ => &[],
        }
    }

    pub fn card(&self, id: i64) -> Option<&CalculationCard> {
        self.cards().iter().find(|c| c.id == id)
    }
}

impl fmt::Display for ListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListView::Blank => Ok(()),
            ListView::Empty => f.write_str(EMPTY_PLACEHOLDER),
            ListView::Cards(cards) => {
                for (i, card) in cards.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n\n")?;
                    }
                    write!(f, "{}\n[edit {id}] [delete {id}]", card, id = card.id)?;
                }
                Ok(())
            }
        }
    }
}

/// Render a fetched list
pub fn render(calculations: &[Calculation]) -> ListView {
    if calculations.is_empty() {
        ListView::Empty
    } else {
        ListView::Cards(
            calculations
                .iter()
                .map(CalculationCard::from_calculation)
                .collect(),
        )
    }
}

/// `operand1 symbol operand2 = result`
pub fn expression(calc: &Calculation) -> String {
    format!(
        "{} {} {} = {}",
        format_number(calc.operand1),
        symbol_for(&calc.operation),
        format_number(calc.operand2),
        format_number(calc.result)
    )
}

/// Shortest round-trip digits, printed the way a browser prints a number:
/// `-0` reads as `0`, and magnitudes outside `[1e-6, 1e21)` switch to
/// exponent form with an explicit sign (`1e+21`, `1.5e-7`).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return value.to_string();
    }

    let exp = format!("{:e}", value);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}

/// Locale-style timestamp, e.g. `5/1/2024, 12:30:00 PM`
pub fn format_timestamp<Tz>(at: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    at.with_timezone(tz)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

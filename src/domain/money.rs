use thiserror::Error;

/// Amounts travel as decimal numbers on the wire. Parsing and display go
/// through integer cents so "12.5" and 12.499999 both print as "12.50".
pub type Cents = i64;

/// Largest difference at which two amounts are considered equal.
pub const AMOUNT_TOLERANCE: f64 = 0.01;

/// Convert a decimal amount to cents, rounding half away from zero.
pub fn to_cents(amount: f64) -> Cents {
    (amount * 100.0).round() as Cents
}

pub fn from_cents(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

/// Format an amount with exactly two decimal places.
/// Example: 50.0 -> "50.00", -12.344 -> "-12.34"
pub fn format_amount(amount: f64) -> String {
    format_cents(to_cents(amount))
}

/// Format cents as a human-readable currency string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}

/// True when both amounts agree within [`AMOUNT_TOLERANCE`].
pub fn amounts_match(a: f64, b: f64) -> bool {
    // Slack for binary representation of the tolerance itself
    (a - b).abs() <= AMOUNT_TOLERANCE + 1e-9
}

/// Parse user-entered decimal text into an amount.
/// Example: "50.00" -> 50.0, "12.5" -> 12.5, ".50" -> 0.5
pub fn parse_amount(input: &str) -> Result<f64, ParseAmountError> {
    parse_cents(input).map(from_cents)
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
pub fn parse_cents(input: &str) -> Result<Cents, ParseAmountError> {
    let input = input.trim();
    let negative = input.starts_with('-');
    let input = input.trim_start_matches('-');
    if input.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    let parts: Vec<&str> = input.split('.').collect();
    match parts.len() {
        1 => {
            let units = parse_digits(parts[0])?;
            let cents = units * 100;
            Ok(if negative { -cents } else { cents })
        }
        2 => {
            let units = if parts[0].is_empty() {
                0
            } else {
                parse_digits(parts[0])?
            };

            // Pad or truncate the fractional part to 2 digits
            let decimal_str = parts[1];
            let decimal_cents = match decimal_str.len() {
                0 => 0,
                1 => parse_digits(decimal_str)? * 10,
                2 => parse_digits(decimal_str)?,
                _ => {
                    parse_digits(decimal_str)?;
                    parse_digits(&decimal_str[..2])?
                }
            };

            let cents = units
                .checked_mul(100)
                .and_then(|c| c.checked_add(decimal_cents))
                .ok_or(ParseAmountError::InvalidFormat)?;
            Ok(if negative { -cents } else { cents })
        }
        _ => Err(ParseAmountError::InvalidFormat),
    }
}

fn parse_digits(s: &str) -> Result<i64, ParseAmountError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseAmountError::InvalidFormat);
    }
    s.parse().map_err(|_| ParseAmountError::InvalidFormat)
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid money format")]
    InvalidFormat,
}

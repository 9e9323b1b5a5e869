use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a dong amount.
#[derive(Debug, Error)]
pub enum ParseAmountError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid amount '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },
}

/// Trims whitespace and drops thousands separators (`,`, `_` and `.` when
/// grouping three digits, as in `20.000.000`).
fn normalize_amount_input(s: &str) -> String {
    let trimmed: String = s
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();

    let groups: Vec<&str> = trimmed.split('.').collect();
    let dotted_thousands = groups.len() > 2
        && groups[1..]
            .iter()
            .all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()));

    if dotted_thousands {
        groups.concat()
    } else {
        trimmed
    }
}

/// Parses a dong amount such as `20000000`, `20,000,000` or `20.000.000`.
///
/// Usable directly as a clap `value_parser`.
///
/// # Errors
///
/// [`ParseAmountError::Empty`] for blank input, [`ParseAmountError::Invalid`]
/// when the remaining text is not a decimal number.
pub fn parse_amount(s: &str) -> Result<Decimal, ParseAmountError> {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Err(ParseAmountError::Empty);
    }
    normalized.parse().map_err(|e| {
        tracing::debug!(input = %s, "invalid amount: {}", e);
        ParseAmountError::Invalid {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Formats an amount with `,` thousands separators, e.g. `17,780,000`.
/// Any fractional part is kept as is.
pub fn format_amount(value: Decimal) -> String {
    let text = value.abs().to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Formats a rate fraction as a percentage, e.g. `0.015` as `1.5%`.
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

//! Duration text formats.

use std::time::Duration;

use super::ConversionFailure;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

/// Parse a duration.
///
/// Accepts the simple form `<digits>[unit]` with units `ns`, `us`, `ms`,
/// `s`, `m`, `h` and `d` (no unit means milliseconds) and the ISO-8601 form
/// `PnDTnHnMn.nS`. Units and designators are case-insensitive.
///
/// # Errors
///
/// Returns a [`ConversionFailure`] for negative, overflowing or malformed
/// input.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use propbind::parse_duration;
///
/// assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
/// assert_eq!(parse_duration("PT1H30M").unwrap(), Duration::from_secs(5400));
/// assert_eq!(parse_duration("250").unwrap(), Duration::from_millis(250));
/// ```
pub fn parse_duration(text: &str) -> Result<Duration, ConversionFailure> {
    let trimmed = text.trim();
    if trimmed.starts_with('-') {
        return Err(ConversionFailure::new("negative durations are not supported"));
    }
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if unsigned.starts_with(['P', 'p']) {
        parse_iso(unsigned)
    } else {
        parse_simple(unsigned)
    }
}

fn parse_simple(text: &str) -> Result<Duration, ConversionFailure> {
    let split = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
    let (digits, unit) = text.split_at(split);
    let amount = parse_amount(digits, text)?;
    match unit.to_ascii_lowercase().as_str() {
        "" | "ms" => Ok(Duration::from_millis(amount)),
        "ns" => Ok(Duration::from_nanos(amount)),
        "us" => Ok(Duration::from_micros(amount)),
        "s" => Ok(Duration::from_secs(amount)),
        "m" => seconds(amount, SECONDS_PER_MINUTE, text),
        "h" => seconds(amount, SECONDS_PER_HOUR, text),
        "d" => seconds(amount, SECONDS_PER_DAY, text),
        other => Err(ConversionFailure::new(format!(
            "unknown duration unit '{other}' in '{text}'"
        ))),
    }
}

fn parse_iso(text: &str) -> Result<Duration, ConversionFailure> {
    let upper = text.to_ascii_uppercase();
    let body = upper.get(1..).unwrap_or_default();
    let (date, time) = match body.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (body, None),
    };
    let mut total = Duration::ZERO;
    let mut found = false;
    for (number, designator) in components(date, text)? {
        match designator {
            'D' => total = add(total, seconds(parse_amount(number, text)?, SECONDS_PER_DAY, text)?, text)?,
            other => return Err(malformed_iso(text, other)),
        }
        found = true;
    }
    if let Some(time) = time {
        let parts = components(time, text)?;
        if parts.is_empty() {
            return Err(ConversionFailure::new(format!("'{text}' has an empty time part")));
        }
        for (number, designator) in parts {
            let part = match designator {
                'H' => seconds(parse_amount(number, text)?, SECONDS_PER_HOUR, text)?,
                'M' => seconds(parse_amount(number, text)?, SECONDS_PER_MINUTE, text)?,
                'S' => fractional_seconds(number, text)?,
                other => return Err(malformed_iso(text, other)),
            };
            total = add(total, part, text)?;
            found = true;
        }
    }
    if found {
        Ok(total)
    } else {
        Err(ConversionFailure::new(format!("'{text}' has no duration components")))
    }
}

fn components<'t>(part: &'t str, text: &str) -> Result<Vec<(&'t str, char)>, ConversionFailure> {
    let mut out = Vec::new();
    let mut rest = part;
    while !rest.is_empty() {
        let end = rest
            .find(|c: char| c.is_ascii_alphabetic())
            .ok_or_else(|| ConversionFailure::new(format!("'{text}' ends without a designator")))?;
        let (number, tail) = rest.split_at(end);
        let mut chars = tail.chars();
        let Some(designator) = chars.next() else {
            break;
        };
        if number.is_empty() {
            return Err(ConversionFailure::new(format!(
                "'{text}' has designator '{designator}' without a number"
            )));
        }
        out.push((number, designator));
        rest = chars.as_str();
    }
    Ok(out)
}

fn fractional_seconds(number: &str, text: &str) -> Result<Duration, ConversionFailure> {
    let (whole, fraction) = number
        .split_once(['.', ','])
        .unwrap_or((number, ""));
    let secs = parse_amount(whole, text)?;
    if fraction.is_empty() {
        return Ok(Duration::from_secs(secs));
    }
    if fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConversionFailure::new(format!("'{text}' has an invalid fraction")));
    }
    let nanos: u32 = format!("{fraction:0<9}")
        .parse()
        .map_err(|_| ConversionFailure::new(format!("'{text}' has an invalid fraction")))?;
    Ok(Duration::new(secs, nanos))
}

fn parse_amount(digits: &str, text: &str) -> Result<u64, ConversionFailure> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConversionFailure::new(format!("'{text}' is not a duration")));
    }
    digits
        .parse()
        .map_err(|_| ConversionFailure::new(format!("'{text}' is too large")))
}

fn seconds(amount: u64, scale: u64, text: &str) -> Result<Duration, ConversionFailure> {
    amount
        .checked_mul(scale)
        .map(Duration::from_secs)
        .ok_or_else(|| ConversionFailure::new(format!("'{text}' is too large")))
}

fn add(total: Duration, part: Duration, text: &str) -> Result<Duration, ConversionFailure> {
    total
        .checked_add(part)
        .ok_or_else(|| ConversionFailure::new(format!("'{text}' is too large")))
}

fn malformed_iso(text: &str, designator: char) -> ConversionFailure {
    ConversionFailure::new(format!("'{text}' has unexpected designator '{designator}'"))
}

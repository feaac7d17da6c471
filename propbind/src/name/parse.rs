//! Parsing of textual property names.

use thiserror::Error;

use super::element::Element;

/// Raised when property name text is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid property name '{text}': {reason}")]
pub struct InvalidNameFormat {
    text: String,
    reason: String,
}

impl InvalidNameFormat {
    pub(crate) fn new(text: &str, reason: impl Into<String>) -> Self {
        Self {
            text: text.to_owned(),
            reason: reason.into(),
        }
    }

    /// The text that failed to parse.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Why the text was rejected.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Split `text` into elements.
///
/// Dotted segments may contain ASCII alphanumerics, `-` and `_` and must start
/// and end with an alphanumeric. Bracketed segments take any text, with
/// nested brackets balanced.
pub(crate) fn parse_elements(text: &str) -> Result<Vec<Element>, InvalidNameFormat> {
    let mut elements = Vec::new();
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut pos = 0;
    while pos < chars.len() {
        let Some(&(start, c)) = chars.get(pos) else {
            break;
        };
        if c == '[' {
            let close = matching_bracket(&chars, pos)
                .ok_or_else(|| InvalidNameFormat::new(text, "unmatched '['"))?;
            let end = chars.get(close).map_or(text.len(), |&(i, _)| i);
            let inner = text.get(start + 1..end).unwrap_or_default();
            if inner.is_empty() {
                return Err(InvalidNameFormat::new(text, "empty index '[]'"));
            }
            elements.push(Element::indexed(inner));
            pos = close + 1;
            match chars.get(pos) {
                None | Some(&(_, '[')) => {}
                Some(&(_, '.')) => pos = after_dot(text, &chars, pos)?,
                Some(&(_, other)) => {
                    return Err(InvalidNameFormat::new(
                        text,
                        format!("unexpected '{other}' after ']'"),
                    ));
                }
            }
        } else {
            let mut stop = pos;
            while let Some(&(_, ch)) = chars.get(stop) {
                if ch == '.' || ch == '[' {
                    break;
                }
                if ch == ']' {
                    return Err(InvalidNameFormat::new(text, "unmatched ']'"));
                }
                stop += 1;
            }
            let end = chars.get(stop).map_or(text.len(), |&(i, _)| i);
            let segment = text.get(start..end).unwrap_or_default();
            validate_segment(text, segment)?;
            elements.push(Element::dotted(segment));
            pos = stop;
            if matches!(chars.get(pos), Some(&(_, '.'))) {
                pos = after_dot(text, &chars, pos)?;
            }
        }
    }
    Ok(elements)
}

fn after_dot(text: &str, chars: &[(usize, char)], dot: usize) -> Result<usize, InvalidNameFormat> {
    match chars.get(dot + 1) {
        None => Err(InvalidNameFormat::new(text, "trailing '.'")),
        Some(&(_, '.' | '[')) => Err(InvalidNameFormat::new(text, "empty element")),
        Some(_) => Ok(dot + 1),
    }
}

fn matching_bracket(chars: &[(usize, char)], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, &(_, c)) in chars.iter().enumerate().skip(open) {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Whether `key` survives being wrapped in `[...]`.
pub(crate) fn is_bracketable(key: &str) -> bool {
    let mut depth = 0usize;
    for c in key.chars() {
        match c {
            '[' => depth += 1,
            ']' => match depth.checked_sub(1) {
                Some(outer) => depth = outer,
                None => return false,
            },
            _ => {}
        }
    }
    !key.is_empty() && depth == 0
}

/// Whether `segment` is acceptable as a dotted element.
pub(crate) fn is_valid_segment(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };
    first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'_')
}

fn validate_segment(text: &str, segment: &str) -> Result<(), InvalidNameFormat> {
    if segment.is_empty() {
        return Err(InvalidNameFormat::new(text, "empty element"));
    }
    if is_valid_segment(segment) {
        Ok(())
    } else {
        Err(InvalidNameFormat::new(
            text,
            format!("illegal characters in '{segment}'"),
        ))
    }
}

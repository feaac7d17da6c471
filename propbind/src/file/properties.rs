//! Parser for `.properties` text.
//!
//! Supports `#` and `!` comments, `=`, `:` or whitespace separators,
//! backslash line continuations and the usual escapes including `\uXXXX`.
//! Each entry records the line and column where its value starts.

use std::iter::Peekable;
use std::slice::Iter;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Entry {
    pub key: String,
    pub value: String,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub(super) struct PropertiesError {
    line: usize,
    message: String,
}

#[derive(Debug, Clone, Copy)]
struct Positioned {
    ch: char,
    line: usize,
    column: usize,
}

type Cursor<'c> = Peekable<Iter<'c, Positioned>>;

const fn is_blank(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\u{c}')
}

pub(super) fn parse(data: &str) -> Result<Vec<Entry>, PropertiesError> {
    let mut entries = Vec::new();
    let mut lines = data.lines().enumerate();
    while let Some((index, raw)) = lines.next() {
        let mut logical = Vec::new();
        push_trimmed(&mut logical, raw, index + 1);
        match logical.first() {
            None => continue,
            Some(first) if matches!(first.ch, '#' | '!') => continue,
            Some(_) => {}
        }
        while continues(&logical) {
            logical.pop();
            let Some((next_index, next)) = lines.next() else {
                break;
            };
            push_trimmed(&mut logical, next, next_index + 1);
        }
        entries.push(parse_entry(&logical)?);
    }
    Ok(entries)
}

fn push_trimmed(logical: &mut Vec<Positioned>, raw: &str, line: usize) {
    logical.extend(
        raw.chars()
            .enumerate()
            .skip_while(|(_, ch)| is_blank(*ch))
            .map(|(offset, ch)| Positioned {
                ch,
                line,
                column: offset + 1,
            }),
    );
}

/// A line continues when it ends in an odd number of backslashes.
fn continues(logical: &[Positioned]) -> bool {
    !logical
        .iter()
        .rev()
        .take_while(|p| p.ch == '\\')
        .count()
        .is_multiple_of(2)
}

fn parse_entry(logical: &[Positioned]) -> Result<Entry, PropertiesError> {
    let (line, end_column) = match (logical.first(), logical.last()) {
        (Some(first), Some(last)) => (first.line, last.column + 1),
        _ => (0, 1),
    };
    let mut cursor = logical.iter().peekable();
    let mut key = String::new();
    while let Some(&&current) = cursor.peek() {
        if matches!(current.ch, '=' | ':') || is_blank(current.ch) {
            break;
        }
        cursor.next();
        key.push(read_char(current, &mut cursor)?);
    }
    skip_blanks(&mut cursor);
    if cursor.next_if(|p| matches!(p.ch, '=' | ':')).is_some() {
        skip_blanks(&mut cursor);
    }
    let (value_line, column) = cursor
        .peek()
        .map_or((line, end_column), |p| (p.line, p.column));
    let mut value = String::new();
    while let Some(&current) = cursor.next() {
        value.push(read_char(current, &mut cursor)?);
    }
    Ok(Entry {
        key,
        value,
        line: value_line,
        column,
    })
}

fn skip_blanks(cursor: &mut Cursor<'_>) {
    while cursor.next_if(|p| is_blank(p.ch)).is_some() {}
}

fn read_char(current: Positioned, cursor: &mut Cursor<'_>) -> Result<char, PropertiesError> {
    if current.ch != '\\' {
        return Ok(current.ch);
    }
    let Some(escaped) = cursor.next() else {
        return Ok('\\');
    };
    Ok(match escaped.ch {
        't' => '\t',
        'n' => '\n',
        'r' => '\r',
        'f' => '\u{c}',
        'u' => {
            let hex: String = cursor.by_ref().take(4).map(|p| p.ch).collect();
            u32::from_str_radix(&hex, 16)
                .ok()
                .filter(|_| hex.len() == 4)
                .and_then(char::from_u32)
                .ok_or_else(|| PropertiesError {
                    line: escaped.line,
                    message: format!("malformed \\u escape '\\u{hex}'"),
                })?
        }
        other => other,
    })
}

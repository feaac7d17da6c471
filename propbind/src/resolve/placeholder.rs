//! `${key}` and `${key:default}` expansion inside string values.

use std::sync::Arc;

use super::Resolver;
use crate::error::BindError;
use crate::name::PropertyName;
use crate::BindResult;

const OPEN: &str = "${";

/// Expands placeholders against a source set.
///
/// Keys are resolved with relaxed matching. Nested placeholders in keys,
/// defaults and resolved values are expanded. Placeholders that cannot be
/// resolved and have no default are left as written.
#[derive(Debug, Clone, Copy)]
pub struct PlaceholderResolver<'s> {
    resolver: Resolver<'s>,
}

impl<'s> PlaceholderResolver<'s> {
    /// Expand using `resolver`.
    #[must_use]
    pub const fn new(resolver: Resolver<'s>) -> Self {
        Self { resolver }
    }

    /// Expand every placeholder in `text`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::CyclicBind`] when a key refers back to itself.
    pub fn resolve(&self, text: &str) -> BindResult<String> {
        self.expand(text, &mut Vec::new())
    }

    fn expand(&self, text: &str, active: &mut Vec<PropertyName>) -> BindResult<String> {
        if !text.contains(OPEN) {
            return Ok(text.to_owned());
        }
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;
        while let Some(&c) = chars.get(i) {
            if c == '$' && chars.get(i + 1) == Some(&'{') {
                if let Some(close) = closing_brace(&chars, i + 2) {
                    let inner: String = chars.get(i + 2..close).unwrap_or_default().iter().collect();
                    match self.substitute(&inner, active)? {
                        Some(value) => out.push_str(&value),
                        None => {
                            out.push_str(OPEN);
                            out.push_str(&inner);
                            out.push('}');
                        }
                    }
                    i = close + 1;
                    continue;
                }
            }
            out.push(c);
            i += 1;
        }
        Ok(out)
    }

    fn substitute(&self, inner: &str, active: &mut Vec<PropertyName>) -> BindResult<Option<String>> {
        let (raw_key, default) = split_default(inner);
        let key = self.expand(raw_key, active)?;
        let Ok(name) = PropertyName::parse(key.trim()) else {
            return default.map(|d| self.expand(d, active)).transpose();
        };
        if active.contains(&name) {
            let chain = active
                .iter()
                .chain(std::iter::once(&name))
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(Arc::new(BindError::CyclicBind { name, chain }));
        }
        match self.resolver.find(&name) {
            Some(property) => {
                active.push(name);
                let expanded = self.expand(&property.text(), active);
                active.pop();
                expanded.map(Some)
            }
            None => default.map(|d| self.expand(d, active)).transpose(),
        }
    }
}

/// Index of the `}` closing a placeholder whose body starts at `start`.
fn closing_brace(chars: &[char], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = start;
    while let Some(&c) = chars.get(i) {
        match c {
            '$' if chars.get(i + 1) == Some(&'{') => {
                depth += 1;
                i += 1;
            }
            '}' if depth == 0 => return Some(i),
            '}' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split at the first `:` outside nested placeholders.
fn split_default(inner: &str) -> (&str, Option<&str>) {
    let mut depth = 0usize;
    let mut previous = None;
    for (i, c) in inner.char_indices() {
        match c {
            '{' if previous == Some('$') => depth += 1,
            '}' if depth > 0 => depth -= 1,
            ':' if depth == 0 => {
                return (inner.get(..i).unwrap_or(inner), inner.get(i + 1..));
            }
            _ => {}
        }
        previous = Some(c);
    }
    (inner, None)
}

//! Structured property names with relaxed equality.
//!
//! A [`PropertyName`] is an immutable sequence of [`Element`]s parsed from
//! text such as `my-app.servers[0].host`. Dotted elements compare by their
//! uniform form (case and `-`/`_` separators folded away), bracketed elements
//! compare verbatim.

mod element;
mod parse;

pub use element::{Element, ElementKind, Form, dashed_form, uniform_form};
pub use parse::InvalidNameFormat;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A parsed, immutable configuration property name.
///
/// # Examples
///
/// ```
/// use propbind::PropertyName;
///
/// let a = PropertyName::parse("my-app.servers[0]").unwrap();
/// let b = PropertyName::parse("myApp.servers.0").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "my-app.servers[0]");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PropertyName {
    elements: Arc<[Element]>,
}

impl PropertyName {
    /// The empty root name.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_elements(Vec::new())
    }

    /// Parse a textual name. The empty string is the root name.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidNameFormat`] for unmatched brackets, empty elements
    /// or illegal characters outside brackets.
    pub fn parse(text: &str) -> Result<Self, InvalidNameFormat> {
        parse::parse_elements(text).map(Self::from_elements)
    }

    fn from_elements(elements: Vec<Element>) -> Self {
        Self {
            elements: elements.into(),
        }
    }

    /// Whether `segment` could be a single dotted element.
    #[must_use]
    pub fn is_valid_segment(segment: &str) -> bool {
        parse::is_valid_segment(segment)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether this is the root name.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements in order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Element at `index`.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    /// The final element, if any.
    #[must_use]
    pub fn last_element(&self) -> Option<&Element> {
        self.elements.last()
    }

    /// Whether the final element denotes a list position.
    #[must_use]
    pub fn is_numeric_index(&self) -> bool {
        self.last_element().is_some_and(Element::is_numeric)
    }

    /// Append the elements parsed from `suffix`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidNameFormat`] when `suffix` does not parse.
    pub fn append(&self, suffix: &str) -> Result<Self, InvalidNameFormat> {
        let tail = parse::parse_elements(suffix)?;
        Ok(self.extended(tail))
    }

    /// Append every element of `other`.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        self.extended(other.elements.iter().cloned())
    }

    /// Append a list position, rendered as `[index]`.
    #[must_use]
    pub fn append_index(&self, index: usize) -> Self {
        self.extended([Element::indexed(&index.to_string())])
    }

    /// Append a map key as one element.
    ///
    /// Keys that are valid dotted segments are appended as such; anything
    /// else is bracketed and kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidNameFormat`] for an empty key or one whose brackets
    /// do not balance, since neither could be parsed back.
    pub fn append_key(&self, key: &str) -> Result<Self, InvalidNameFormat> {
        let element = if parse::is_valid_segment(key) {
            Element::dotted(key)
        } else if parse::is_bracketable(key) {
            Element::indexed(key)
        } else {
            return Err(InvalidNameFormat::new(key, "key cannot be bracketed"));
        };
        Ok(self.extended([element]))
    }

    fn extended(&self, tail: impl IntoIterator<Item = Element>) -> Self {
        let mut elements = self.elements.to_vec();
        elements.extend(tail);
        Self::from_elements(elements)
    }

    /// The name without its final element. The root has no parent.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self.chop(self.len() - 1))
        }
    }

    /// The first `size` elements.
    #[must_use]
    pub fn chop(&self, size: usize) -> Self {
        if size >= self.len() {
            return self.clone();
        }
        Self::from_elements(self.elements.iter().take(size).cloned().collect())
    }

    /// The elements from `offset` onwards.
    #[must_use]
    pub fn sub_name(&self, offset: usize) -> Self {
        Self::from_elements(self.elements.iter().skip(offset).cloned().collect())
    }

    /// Whether `other` is exactly one element below this name.
    #[must_use]
    pub fn is_parent_of(&self, other: &Self) -> bool {
        other.len() == self.len() + 1 && self.is_prefix_of(other)
    }

    /// Whether `other` is any number of elements below this name.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        other.len() > self.len() && self.is_prefix_of(other)
    }

    fn is_prefix_of(&self, other: &Self) -> bool {
        self.elements
            .iter()
            .zip(other.elements.iter())
            .all(|(a, b)| a == b)
    }

    /// The name as originally written.
    #[must_use]
    pub fn original_text(&self) -> String {
        self.render(Form::Original)
    }

    /// Elements from `offset` in their original spelling, joined with `.`.
    ///
    /// Bracketed elements lose their brackets; this is how map keys are
    /// spelled.
    #[must_use]
    pub fn key_text(&self, offset: usize) -> String {
        self.elements
            .iter()
            .skip(offset)
            .map(|e| e.form(Form::Original))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn render(&self, form: Form) -> String {
        let mut out = String::new();
        for element in self.elements.iter() {
            if element.is_indexed() {
                out.push('[');
                out.push_str(&element.form(form));
                out.push(']');
            } else {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(&element.form(form));
            }
        }
        out
    }
}

impl Default for PropertyName {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Form::Dashed))
    }
}

impl fmt::Debug for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyName({:?})", self.original_text())
    }
}

impl FromStr for PropertyName {
    type Err = InvalidNameFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for PropertyName {
    type Error = InvalidNameFormat;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

#[cfg(test)]
mod tests;

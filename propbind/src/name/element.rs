//! Individual name elements and their textual forms.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// How an element was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A plain dotted segment such as `servers`.
    Dotted,
    /// A bracketed segment whose contents are not all digits, such as `[a.b]`.
    Indexed,
    /// A bracketed segment made only of digits, such as `[0]`.
    NumericIndex,
}

/// Textual renderings of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    /// Exactly as written, without brackets.
    Original,
    /// Lowercase with camel-case and `_` boundaries turned into `-`.
    Dashed,
    /// Lowercase alphanumerics only. Indexed elements keep their text verbatim.
    Uniform,
}

/// One element of a [`PropertyName`](super::PropertyName).
///
/// Equality and hashing use the uniform form, so `myApp`, `my-app` and
/// `my_app` are the same element, and dotted `0` equals indexed `[0]`.
#[derive(Clone)]
pub struct Element {
    original: Box<str>,
    kind: ElementKind,
    key: Box<str>,
}

impl Element {
    pub(crate) fn dotted(text: &str) -> Self {
        Self {
            original: text.into(),
            kind: ElementKind::Dotted,
            key: uniform_form(text).into(),
        }
    }

    pub(crate) fn indexed(text: &str) -> Self {
        let kind = if is_digits(text) {
            ElementKind::NumericIndex
        } else {
            ElementKind::Indexed
        };
        Self {
            original: text.into(),
            kind,
            key: text.into(),
        }
    }

    /// Text as written, without brackets.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// How the element was written.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Whether the element was written in brackets.
    #[must_use]
    pub const fn is_indexed(&self) -> bool {
        !matches!(self.kind, ElementKind::Dotted)
    }

    /// Whether the element denotes a list position, bracketed or not.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        is_digits(&self.key)
    }

    /// The list position this element denotes, if any.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        if self.is_numeric() {
            self.key.parse().ok()
        } else {
            None
        }
    }

    /// Render the element in the requested form.
    #[must_use]
    pub fn form(&self, form: Form) -> Cow<'_, str> {
        match (form, self.kind) {
            (Form::Original, _) | (_, ElementKind::Indexed | ElementKind::NumericIndex) => {
                Cow::Borrowed(&self.original)
            }
            (Form::Uniform, ElementKind::Dotted) => Cow::Borrowed(&self.key),
            (Form::Dashed, ElementKind::Dotted) => Cow::Owned(dashed_form(&self.original)),
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ElementKind::Dotted => write!(f, "{}", self.original),
            ElementKind::Indexed | ElementKind::NumericIndex => write!(f, "[{}]", self.original),
        }
    }
}

/// Fold text to the canonical form used for relaxed comparison.
///
/// # Examples
///
/// ```
/// use propbind::name::uniform_form;
/// assert_eq!(uniform_form("myApp_Name"), "myappname");
/// assert_eq!(uniform_form("my-app-name"), "myappname");
/// ```
#[must_use]
pub fn uniform_form(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Fold text to lowercase with `-` at camel-case and `_` boundaries.
///
/// # Examples
///
/// ```
/// use propbind::name::dashed_form;
/// assert_eq!(dashed_form("myAppName"), "my-app-name");
/// assert_eq!(dashed_form("MY_APP"), "my-app");
/// ```
#[must_use]
pub fn dashed_form(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut previous: Option<char> = None;
    for c in text.chars() {
        if c == '_' || c == '-' {
            out.push('-');
        } else if c.is_ascii_uppercase()
            && previous.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
        previous = Some(c);
    }
    out
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

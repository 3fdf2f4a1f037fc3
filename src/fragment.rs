//! SQL fragment builder.
//!
//! Every caller-supplied identifier that ends up in generated SQL text passes
//! through [`Ident::new`] first. Identifiers are not quoted or escaped: the
//! caller is trusted to hand over names that are already valid in the target
//! dialect, quoting included. Validation only rejects text that would break
//! the structure of the fragment itself (a stray comma, parenthesis, quote or
//! statement separator) outside of a `"..."` or `` `...` `` quoted section.
use std::fmt;

use crate::error::{FragmentError, FragmentResult};

/// Separator between expressions of a multi-line select list.
pub const LINE_SEPARATOR: &str = ",\n";

/// Separator between items of a flat, single-line select list.
pub const FLAT_SEPARATOR: &str = ", ";

const FORBIDDEN_CHARS: &[char] = &[',', ';', '(', ')', '\''];

/// A validated table or column identifier, rendered verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident(String);

impl Ident {
    pub fn new(value: impl Into<String>) -> FragmentResult<Self> {
        let value = value.into();
        if let Some(reason) = rejection_reason(&value) {
            return Err(FragmentError::InvalidIdentifier { value, reason });
        }
        Ok(Self(value))
    }

    /// Wrap a column name read from the warehouse's own metadata.
    pub(crate) fn from_catalog(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn rejection_reason(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        return Some("identifier is empty");
    }
    if value.chars().any(char::is_control) {
        return Some("identifier contains control characters");
    }

    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    for c in value.chars() {
        match quote {
            Some(open) => {
                if c == open {
                    quote = None;
                }
            }
            None => {
                if c == '"' || c == '`' {
                    quote = Some(c);
                } else if c.is_whitespace() {
                    return Some("identifier contains unquoted whitespace");
                } else if FORBIDDEN_CHARS.contains(&c) {
                    return Some("identifier contains one of , ; ( ) ' outside quotes");
                } else if matches!((prev, c), (Some('-'), '-') | (Some('/'), '*')) {
                    return Some("identifier contains a comment marker");
                }
            }
        }
        prev = Some(c);
    }

    if quote.is_some() {
        return Some("identifier has an unterminated quote");
    }
    None
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validate a whole list of identifiers, stopping at the first bad one.
pub fn idents<I, S>(values: I) -> FragmentResult<Vec<Ident>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Ident::new).collect()
}

/// `table.column`
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef<'a> {
    pub table: &'a Ident,
    pub column: &'a Ident,
}

impl fmt::Display for ColumnRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// `COALESCE(t1.col, t2.col, ...) AS col`
///
/// Argument order follows `sources`, so the first listed table wins whenever
/// several sources carry a non-null value.
#[derive(Debug, Clone, PartialEq)]
pub struct CoalesceExpr<'a> {
    pub column: &'a Ident,
    pub sources: &'a [Ident],
}

impl CoalesceExpr<'_> {
    pub fn compile(&self) -> String {
        let args: Vec<String> = self
            .sources
            .iter()
            .map(|table| {
                ColumnRef {
                    table,
                    column: self.column,
                }
                .to_string()
            })
            .collect();
        format!("COALESCE({}) AS {}", args.join(", "), self.column)
    }
}

/// Build the multi-line coalesce select list for `columns` over `sources`.
pub fn coalesce_list(columns: &[Ident], sources: &[Ident]) -> String {
    let exprs: Vec<String> = columns
        .iter()
        .map(|column| CoalesceExpr { column, sources }.compile())
        .collect();
    exprs.join(LINE_SEPARATOR)
}

/// Join bare column names into a flat select list.
pub fn flat_list<S: AsRef<str>>(columns: &[S]) -> String {
    let items: Vec<&str> = columns.iter().map(AsRef::as_ref).collect();
    items.join(FLAT_SEPARATOR)
}

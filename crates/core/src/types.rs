//! Core identifier types for Protean
//!
//! This module defines:
//! - EntityName: normalized, PascalCase entity name used as registry and table key
//! - normalize_name: the pure normalization function behind EntityName
//! - Action: the five actions a command can carry

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Name used when a raw entity name normalizes to nothing (e.g. `"  --  "`).
pub const PLACEHOLDER_ENTITY_NAME: &str = "Entidad";

/// Normalize a human-supplied entity name with the default placeholder.
///
/// See [`normalize_name_or`].
pub fn normalize_name(raw: &str) -> String {
    normalize_name_or(raw, PLACEHOLDER_ENTITY_NAME)
}

/// Normalize a human-supplied entity name.
///
/// 1. Trim surrounding whitespace.
/// 2. Replace every character outside `[A-Za-z0-9_]` with `_`.
/// 3. Split on `_`, then split each piece where a lowercase letter or digit
///    is followed by an uppercase letter (`clientePotencial`).
/// 4. Fold a one-letter segment into the segment after it.
/// 5. Title-case every non-empty segment (first char upper, rest lower).
/// 6. Concatenate. An empty result yields `placeholder`.
///
/// Uppercase runs are one segment, so `CLIENTE` and `cliente` are the same
/// entity. Folding one-letter segments keeps the output a fixed point: a
/// lone capital followed by another capital would otherwise read back as
/// an uppercase run.
///
/// ```
/// use protean_core::normalize_name;
///
/// assert_eq!(normalize_name("cliente potencial"), "ClientePotencial");
/// assert_eq!(normalize_name("Cliente_Potencial"), "ClientePotencial");
/// assert_eq!(normalize_name("cliente-potencial"), "ClientePotencial");
/// assert_eq!(normalize_name("CLIENTE"), "Cliente");
/// assert_eq!(normalize_name("   "), "Entidad");
/// ```
pub fn normalize_name_or(raw: &str, placeholder: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    let mut out = String::with_capacity(cleaned.len());
    let mut pending = String::new();
    for segment in cleaned.split('_').flat_map(camel_segments) {
        pending.push_str(segment);
        if is_single_letter(&pending) {
            continue;
        }
        push_title_case(&pending, &mut out);
        pending.clear();
    }
    push_title_case(&pending, &mut out);

    if out.is_empty() {
        placeholder.to_string()
    } else {
        out
    }
}

/// Split `piece` before every uppercase letter that follows a lowercase
/// letter or digit. Empty pieces yield nothing.
fn camel_segments(piece: &str) -> impl Iterator<Item = &str> {
    let mut bounds = Vec::new();
    let mut prev: Option<char> = None;
    for (idx, c) in piece.char_indices() {
        if c.is_ascii_uppercase() && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit()) {
            bounds.push(idx);
        }
        prev = Some(c);
    }
    bounds.push(piece.len());

    let mut start = 0;
    bounds.into_iter().filter_map(move |end| {
        let segment = &piece[start..end];
        start = end;
        (!segment.is_empty()).then_some(segment)
    })
}

fn is_single_letter(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphabetic())
}

fn push_title_case(segment: &str, out: &mut String) {
    let mut chars = segment.chars();
    if let Some(first) = chars.next() {
        out.push(first.to_ascii_uppercase());
        out.extend(chars.map(|c| c.to_ascii_lowercase()));
    }
}

/// Normalized entity name.
///
/// Two raw names refer to the same entity exactly when their normalized
/// forms are equal. The registry and every storage table are keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityName(String);

impl EntityName {
    /// Normalize `raw` using the default placeholder.
    pub fn normalize(raw: &str) -> Self {
        EntityName(normalize_name(raw))
    }

    /// Normalize `raw`, falling back to `placeholder` for empty results.
    pub fn normalize_or(raw: &str, placeholder: &str) -> Self {
        EntityName(normalize_name_or(raw, placeholder))
    }

    /// The normalized name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Command action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Insert one record
    Create,
    /// Query records
    Read,
    /// Patch matching records
    Update,
    /// Destroy matching records
    Delete,
    /// Declare a new entity schema
    DefineEntity,
}

impl Action {
    /// All actions, in keyword-inference priority order.
    pub const ALL: [Action; 5] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::DefineEntity,
    ];

    /// Wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::DefineEntity => "define_entity",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    /// Parse a wire action name; surrounding whitespace and case are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == lowered)
            .ok_or_else(|| s.to_string())
    }
}

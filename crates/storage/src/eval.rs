//! Filter evaluation for in-process tables
//!
//! Implements the semantics a SQL backend would give the engine's
//! [`Filter`]: equality on typed values, `ILIKE` on the textual form of a
//! value, and multi-key ordering.

use std::cmp::Ordering;

use protean_core::{Direction, FieldRef, Filter, OrderBy, Predicate, Record, Value};

/// Value addressed by `target` in `record`.
///
/// A `key` reaches one level into a JSON object column; missing columns,
/// missing keys and non-object payloads resolve to `None`.
pub fn resolve(record: &Record, target: &FieldRef) -> Option<Value> {
    let value = record.get(&target.column)?;
    match &target.key {
        None => Some(value.clone()),
        Some(key) => value
            .as_json()
            .and_then(|json| json.as_object())
            .and_then(|obj| obj.get(key))
            .map(Value::from_json_scalar),
    }
}

/// True when `record` satisfies every condition of `filter`.
pub fn matches(record: &Record, filter: &Filter) -> bool {
    filter.conditions.iter().all(|cond| {
        let actual = resolve(record, &cond.target).unwrap_or(Value::Null);
        match &cond.predicate {
            Predicate::Equals(expected) if cond.target.key.is_some() => json_key_eq(&actual, expected),
            Predicate::Equals(expected) => actual == *expected,
            Predicate::ILike(pattern) => actual.as_text().is_some_and(|text| ilike(&text, pattern)),
        }
    })
}

/// Equality for values read out of a JSON payload.
///
/// JSON has a single number type, so `30` and `30.0` are the same key value.
fn json_key_eq(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Int(i), Value::Float(f)) | (Value::Float(f), Value::Int(i)) => (*i as f64) == *f,
        _ => actual == expected,
    }
}

/// Compare two records on a list of sort keys.
pub fn compare(a: &Record, b: &Record, order: &[OrderBy]) -> Ordering {
    for key in order {
        let left = resolve(a, &key.target).unwrap_or(Value::Null);
        let right = resolve(b, &key.target).unwrap_or(Value::Null);
        let ord = match key.direction {
            Direction::Asc => left.sort_cmp(&right),
            Direction::Desc => right.sort_cmp(&left),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    AnyRun,
    AnyOne,
    Lit(char),
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => {
                // Collapse runs of '%'
                if tokens.last() != Some(&Token::AnyRun) {
                    tokens.push(Token::AnyRun);
                }
            }
            '_' => tokens.push(Token::AnyOne),
            '\\' => match chars.next() {
                Some(escaped) => tokens.push(Token::Lit(fold(escaped))),
                None => tokens.push(Token::Lit('\\')),
            },
            other => tokens.push(Token::Lit(fold(other))),
        }
    }
    tokens
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Case-insensitive SQL `LIKE`.
///
/// `%` matches any run of characters (including none), `_` exactly one,
/// and a backslash escapes the next character.
pub fn ilike(text: &str, pattern: &str) -> bool {
    let tokens = tokenize(pattern);
    let text: Vec<char> = text.chars().map(fold).collect();

    let (mut t, mut p) = (0usize, 0usize);
    // Position of the last '%' seen and the text index it was tried against
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match tokens.get(p) {
            Some(Token::AnyRun) => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(Token::AnyOne) => {
                t += 1;
                p += 1;
            }
            Some(Token::Lit(c)) if *c == text[t] => {
                t += 1;
                p += 1;
            }
            _ => match backtrack {
                Some((star_p, star_t)) => {
                    p = star_p + 1;
                    t = star_t + 1;
                    backtrack = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }

    tokens[p..].iter().all(|tok| *tok == Token::AnyRun)
}

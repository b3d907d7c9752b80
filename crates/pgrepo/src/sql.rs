//! Placeholder expansion for PostgreSQL.
//!
//! The clause compiler emits driver-neutral `?` placeholders and keeps each
//! `IN` list as a single [`Value::List`] argument. [`expand`] owns the
//! PostgreSQL dialect: it renumbers placeholders to `$1..$n` left to right
//! and flattens list arguments into one placeholder per element.

use std::fmt::Write;

use crate::error::{RepoError, RepoResult};
use crate::value::Value;

/// Rewrite a `?`-placeholder fragment into `$n` form and flatten list args.
///
/// Each `?` consumes one argument, in order. A [`Value::List`] argument
/// expands into a comma-separated placeholder run; an empty list expands to
/// `NULL` (so `IN (?)` becomes `IN (NULL)`, which matches no row). Any
/// placeholder/argument count mismatch is an error, never a silent
/// truncation.
pub fn expand(template: &str, args: &[Value]) -> RepoResult<(String, Vec<Value>)> {
    let placeholders = template.matches('?').count();
    if placeholders != args.len() {
        return Err(RepoError::placeholder(format!(
            "template '{template}' has {placeholders} placeholders, {} arguments provided",
            args.len()
        )));
    }

    let mut sql = String::with_capacity(template.len() + 4);
    let mut flat: Vec<Value> = Vec::with_capacity(args.len());
    let mut arg_idx = 0;
    let mut param = 0usize;

    for ch in template.chars() {
        if ch != '?' {
            sql.push(ch);
            continue;
        }
        let arg = &args[arg_idx];
        arg_idx += 1;
        match arg {
            Value::List(items) if items.is_empty() => sql.push_str("NULL"),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(", ");
                    }
                    param += 1;
                    let _ = write!(sql, "${param}");
                    flat.push(item.clone());
                }
            }
            scalar => {
                param += 1;
                let _ = write!(sql, "${param}");
                flat.push(scalar.clone());
            }
        }
    }

    Ok((sql, flat))
}

//! The condition vocabulary: one constructor per comparison kind.
//!
//! A [`Condition`] is a SQL fragment template with `?` placeholders plus the
//! value(s) bound to them. Conditions carry no column; the column is supplied
//! by the clause entry that owns the condition (see [`crate::clause`]).
//!
//! Constructors never fail; operand types are the caller's and the driver's
//! responsibility.

use crate::value::Value;

/// A comparison template and its bound argument(s).
///
/// # Example
/// ```ignore
/// use pgrepo::Condition;
///
/// Condition::eq("active");
/// Condition::between(18, 65);
/// Condition::in_list(["admin", "owner"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    template: &'static str,
    arg: Value,
    flatten: bool,
}

impl Condition {
    fn scalar(template: &'static str, value: impl Into<Value>) -> Self {
        Self {
            template,
            arg: value.into(),
            flatten: false,
        }
    }

    /// `= ?`
    pub fn eq(value: impl Into<Value>) -> Self {
        Self::scalar("= ?", value)
    }

    /// `!= ?`
    pub fn neq(value: impl Into<Value>) -> Self {
        Self::scalar("!= ?", value)
    }

    /// `< ?`
    pub fn lt(value: impl Into<Value>) -> Self {
        Self::scalar("< ?", value)
    }

    /// `<= ?`
    pub fn lte(value: impl Into<Value>) -> Self {
        Self::scalar("<= ?", value)
    }

    /// `> ?`
    pub fn gt(value: impl Into<Value>) -> Self {
        Self::scalar("> ?", value)
    }

    /// `>= ?`
    pub fn gte(value: impl Into<Value>) -> Self {
        Self::scalar(">= ?", value)
    }

    /// `IN (?)` with the whole list bound as one argument.
    ///
    /// The list stays a single [`Value::List`] argument through compilation;
    /// [`crate::sql::expand`] turns it into a placeholder per element at
    /// execution time. Zero values is legal and keeps the one-argument shape.
    pub fn in_list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self {
            template: "IN (?)",
            arg: Value::list(values),
            flatten: false,
        }
    }

    /// `LIKE ?`
    pub fn like(pattern: impl Into<String>) -> Self {
        Self::scalar("LIKE ?", pattern.into())
    }

    /// `NOT LIKE ?`
    pub fn not_like(pattern: impl Into<String>) -> Self {
        Self::scalar("NOT LIKE ?", pattern.into())
    }

    /// `BETWEEN ? AND ?` with the two bounds flattened in order (min, max).
    pub fn between(min: impl Into<Value>, max: impl Into<Value>) -> Self {
        Self {
            template: "BETWEEN ? AND ?",
            arg: Value::List(vec![min.into(), max.into()]),
            flatten: true,
        }
    }

    /// The SQL fragment template, e.g. `"= ?"`.
    pub fn template(&self) -> &'static str {
        self.template
    }

    /// Append this condition's argument(s) to `args` in placeholder order.
    pub fn push_args(&self, args: &mut Vec<Value>) {
        match (&self.arg, self.flatten) {
            (Value::List(items), true) => args.extend(items.iter().cloned()),
            (arg, _) => args.push(arg.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_templates() {
        assert_eq!(Condition::eq(1).template(), "= ?");
        assert_eq!(Condition::neq(1).template(), "!= ?");
        assert_eq!(Condition::lt(1).template(), "< ?");
        assert_eq!(Condition::lte(1).template(), "<= ?");
        assert_eq!(Condition::gt(1).template(), "> ?");
        assert_eq!(Condition::gte(1).template(), ">= ?");
        assert_eq!(Condition::like("a%").template(), "LIKE ?");
        assert_eq!(Condition::not_like("a%").template(), "NOT LIKE ?");
    }

    #[test]
    fn scalar_contributes_one_arg() {
        let mut args = Vec::new();
        Condition::eq("active").push_args(&mut args);
        assert_eq!(args, vec![Value::Text("active".to_string())]);
    }

    #[test]
    fn in_list_is_one_list_arg() {
        let mut args = Vec::new();
        Condition::in_list([1, 2, 3]).push_args(&mut args);
        assert_eq!(args.len(), 1);
        assert_eq!(
            args[0],
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn in_list_empty_keeps_shape() {
        let mut args = Vec::new();
        Condition::in_list(Vec::<i32>::new()).push_args(&mut args);
        assert_eq!(args, vec![Value::List(Vec::new())]);
    }

    #[test]
    fn between_flattens_min_then_max() {
        let mut args = Vec::new();
        Condition::between(10, 20).push_args(&mut args);
        assert_eq!(args, vec![Value::Int(10), Value::Int(20)]);
    }
}

// File: src/expression.rs
// Purpose: Evaluate parsed formulas against a values map
//
// Evaluation is pure: a formula reads the map it is given and never writes
// to it. Nothing outside the `values` binding is reachable.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::ExprError;
use crate::parser;
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;

/// The only name bound while a formula runs
pub const VALUES_IDENT: &str = "values";

/// A parsed, reusable formula
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    /// Parse formula source
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        let expr = parser::parse(source)?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against the current values map
    pub fn eval(&self, values: &BTreeMap<String, Value>) -> Result<Value, ExprError> {
        Scope { values }.eval(&self.expr)
    }

    /// Field ids read through `values.<id>` or `values["<id>"]`, in order of
    /// first appearance
    pub fn references(&self) -> Vec<String> {
        let mut refs: Vec<String> = Vec::new();
        self.expr.walk(&mut |node| {
            let key = match node {
                Expr::Member { object, property } if is_values(object) => Some(property.clone()),
                Expr::Index { object, index } if is_values(object) => match &**index {
                    Expr::Literal(Value::String(s)) => Some(s.clone()),
                    Expr::Literal(n @ Value::Number(_)) => Some(n.to_string()),
                    _ => None,
                },
                _ => None,
            };
            if let Some(key) = key {
                if !refs.contains(&key) {
                    refs.push(key);
                }
            }
        });
        refs
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

fn is_values(expr: &Expr) -> bool {
    matches!(expr, Expr::Ident(name) if name == VALUES_IDENT)
}

struct Scope<'a> {
    values: &'a BTreeMap<String, Value>,
}

impl Scope<'_> {
    fn eval(&self, expr: &Expr) -> Result<Value, ExprError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Ident(name) if name == VALUES_IDENT => Ok(Value::Object(self.values.clone())),
            Expr::Ident(name) => Err(ExprError::UnknownIdentifier(name.clone())),
            Expr::Member { object, property } => self.member(object, property),
            Expr::Index { object, index } => {
                let key = match self.eval(index)? {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                self.member(object, &key)
            }
            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!value.to_bool())),
                    UnaryOp::Neg => finite(-numeric(&value)?),
                }
            }
            Expr::Binary { op: BinaryOp::And, left, right } => {
                let left = self.eval(left)?;
                if left.to_bool() {
                    self.eval(right)
                } else {
                    Ok(left)
                }
            }
            Expr::Binary { op: BinaryOp::Or, left, right } => {
                let left = self.eval(left)?;
                if left.to_bool() {
                    Ok(left)
                } else {
                    self.eval(right)
                }
            }
            Expr::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Self::binary(*op, &left, &right)
            }
            Expr::Conditional { cond, then, otherwise } => {
                if self.eval(cond)?.to_bool() {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
        }
    }

    /// Property lookup; reads straight from the map for `values.<key>`
    fn member(&self, object: &Expr, property: &str) -> Result<Value, ExprError> {
        if is_values(object) {
            return Ok(self.values.get(property).cloned().unwrap_or(Value::Null));
        }

        match self.eval(object)? {
            Value::Object(map) => Ok(map.get(property).cloned().unwrap_or(Value::Null)),
            Value::Array(items) if property == "length" => Ok(Value::Number(items.len() as f64)),
            Value::Array(items) => Ok(property
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i).cloned())
                .unwrap_or(Value::Null)),
            Value::String(s) if property == "length" => {
                Ok(Value::Number(s.chars().count() as f64))
            }
            Value::Null => Err(ExprError::NotIndexable {
                property: property.to_string(),
                target: "null",
            }),
            _ => Ok(Value::Null),
        }
    }

    fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, ExprError> {
        match op {
            BinaryOp::Add => match (left, right) {
                (Value::String(_), _) | (_, Value::String(_)) => {
                    Ok(Value::String(format!("{}{}", left, right)))
                }
                _ => finite(numeric(left)? + numeric(right)?),
            },
            BinaryOp::Sub => finite(numeric(left)? - numeric(right)?),
            BinaryOp::Mul => finite(numeric(left)? * numeric(right)?),
            BinaryOp::Div => {
                let divisor = numeric(right)?;
                if divisor == 0.0 {
                    return Err(ExprError::DivisionByZero);
                }
                finite(numeric(left)? / divisor)
            }
            BinaryOp::Rem => {
                let divisor = numeric(right)?;
                if divisor == 0.0 {
                    return Err(ExprError::DivisionByZero);
                }
                finite(numeric(left)? % divisor)
            }
            BinaryOp::Eq => Ok(Value::Bool(left == right)),
            BinaryOp::NotEq => Ok(Value::Bool(left != right)),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                Ok(Value::Bool(Self::compare_values(left, right, op)?))
            }
            // Short-circuit operators are handled before both sides are evaluated
            BinaryOp::And | BinaryOp::Or => Ok(Value::Null),
        }
    }

    /// Ordering: strings compare lexicographically, everything else numerically
    fn compare_values(left: &Value, right: &Value, op: BinaryOp) -> Result<bool, ExprError> {
        let ordering = match (left, right) {
            (Value::String(l), Value::String(r)) => l.partial_cmp(r),
            _ => numeric(left)?.partial_cmp(&numeric(right)?),
        };

        let Some(ordering) = ordering else {
            return Ok(false);
        };

        Ok(match op {
            BinaryOp::Lt => ordering.is_lt(),
            BinaryOp::Le => ordering.is_le(),
            BinaryOp::Gt => ordering.is_gt(),
            BinaryOp::Ge => ordering.is_ge(),
            _ => false,
        })
    }
}

fn numeric(value: &Value) -> Result<f64, ExprError> {
    value
        .to_number()
        .ok_or(ExprError::NotNumeric(value.type_name()))
}

fn finite(n: f64) -> Result<Value, ExprError> {
    if n.is_finite() {
        Ok(Value::Number(n))
    } else {
        Err(ExprError::NonFinite)
    }
}

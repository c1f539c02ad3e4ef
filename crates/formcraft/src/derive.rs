// File: src/derive.rs
// Purpose: Recompute derived field values from their formulas
//
// Formulas are parsed once per session. A pass walks the computed fields in
// schema order and evaluates each against the live values map, so a formula
// sees results written earlier in the same pass. There is no dependency
// ordering and no cycle detection; `settle` repeats passes until nothing
// changes or the pass budget runs out.

use crate::model::{FieldConfig, Values};
use formcraft_parser::{ExprError, Formula, Value};
use tracing::{debug, warn};

/// One computed field and its parsed formula
#[derive(Debug, Clone)]
pub struct DerivedField {
    pub id: String,
    pub label: String,
    formula: Result<Formula, ExprError>,
}

impl DerivedField {
    pub fn formula(&self) -> Option<&Formula> {
        self.formula.as_ref().ok()
    }
}

/// Outcome of `DerivedFields::settle`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    /// A pass changed nothing. `passes` counts passes that did change values.
    Stable { passes: usize },
    /// Still changing after the pass budget
    Unstable { passes: usize },
}

impl Settle {
    pub fn is_stable(self) -> bool {
        matches!(self, Settle::Stable { .. })
    }
}

/// The computed fields of one form
#[derive(Debug, Clone, Default)]
pub struct DerivedFields {
    fields: Vec<DerivedField>,
}

impl DerivedFields {
    /// Parse the formula of every computed field.
    ///
    /// Formulas that fail to parse are logged and kept; those fields are
    /// skipped on every pass.
    pub fn compile(fields: &[FieldConfig]) -> Self {
        let fields = fields
            .iter()
            .filter(|field| field.is_computed())
            .map(|field| {
                let source = field.formula.as_deref().unwrap_or_default();
                let formula = Formula::parse(source);
                match &formula {
                    Ok(_) | Err(ExprError::Empty) => {}
                    Err(e) => warn!(field = %field.label, formula = source, "Invalid formula: {}", e),
                }
                DerivedField {
                    id: field.id.clone(),
                    label: field.label.clone(),
                    formula,
                }
            })
            .collect();

        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DerivedField> {
        self.fields.iter()
    }

    /// Pass budget used when none is configured
    pub fn default_max_passes(&self) -> usize {
        self.fields.len() + 1
    }

    /// Run one pass. Returns true when any value changed.
    ///
    /// A `null` result, or a blank formula, is stored as the empty string.
    /// Evaluation errors are logged and leave the field's value as it was.
    pub fn recompute(&self, values: &mut Values) -> bool {
        let mut changed = false;

        for field in &self.fields {
            let result = match &field.formula {
                Ok(formula) => match formula.eval(values) {
                    Ok(Value::Null) => Value::String(String::new()),
                    Ok(value) => value,
                    Err(e) => {
                        warn!(field = %field.label, formula = formula.source(), "Error evaluating derived field: {}", e);
                        continue;
                    }
                },
                Err(ExprError::Empty) => Value::String(String::new()),
                Err(_) => continue,
            };

            if values.get(&field.id) != Some(&result) {
                debug!(field = %field.id, value = %result, "Derived field updated");
                values.insert(field.id.clone(), result);
                changed = true;
            }
        }

        changed
    }

    /// Repeat passes until one changes nothing, at most `max_passes` times
    pub fn settle(&self, values: &mut Values, max_passes: usize) -> Settle {
        for passes in 0..max_passes {
            if !self.recompute(values) {
                return Settle::Stable { passes };
            }
        }

        if self.fields.is_empty() {
            return Settle::Stable { passes: 0 };
        }

        warn!(max_passes, "Derived fields did not settle; values may be stale");
        Settle::Unstable { passes: max_passes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldType;
    use pretty_assertions::assert_eq;

    fn sum_form() -> Vec<FieldConfig> {
        vec![
            FieldConfig::new("a", FieldType::Number, "A"),
            FieldConfig::new("b", FieldType::Number, "B"),
            FieldConfig::new("sum", FieldType::Derived, "Sum")
                .with_formula("values.a + values.b", ["a", "b"]),
        ]
    }

    fn values(pairs: &[(&str, Value)]) -> Values {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_sum_recomputes_on_change() {
        let derived = DerivedFields::compile(&sum_form());
        let mut vals = values(&[("a", 1.into()), ("b", 2.into())]);

        assert!(derived.recompute(&mut vals));
        assert_eq!(vals["sum"], Value::Number(3.0));

        vals.insert("b".into(), 3.into());
        assert!(derived.recompute(&mut vals));
        assert_eq!(vals["sum"], Value::Number(4.0));

        // Nothing changed, nothing written
        assert!(!derived.recompute(&mut vals));
    }

    #[test]
    fn test_needs_both_formula_and_derived_from() {
        let mut no_from = FieldConfig::new("x", FieldType::Derived, "X");
        no_from.formula = Some("1 + 1".into());
        let mut blank_formula = FieldConfig::new("y", FieldType::Derived, "Y");
        blank_formula.derived_from = Some(vec![]);
        blank_formula.formula = Some("  ".into());
        let empty_from = FieldConfig::new("z", FieldType::Text, "Z").with_formula("2", Vec::<String>::new());

        let mut empty_formula = FieldConfig::new("w", FieldType::Derived, "W");
        empty_formula.derived_from = Some(vec![]);
        empty_formula.formula = Some(String::new());

        let derived = DerivedFields::compile(&[no_from, blank_formula, empty_from, empty_formula]);
        let ids: Vec<&str> = derived.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["y", "z"]);
    }

    #[test]
    fn test_blank_formula_computes_empty_string() {
        let mut field = FieldConfig::new("y", FieldType::Derived, "Y");
        field.derived_from = Some(vec![]);
        field.formula = Some("  ".into());
        let derived = DerivedFields::compile(&[field]);
        let mut vals = values(&[("y", "stale".into())]);

        assert!(derived.recompute(&mut vals));
        assert_eq!(vals["y"], Value::from(""));
        assert!(!derived.recompute(&mut vals));
    }

    #[test]
    fn test_overly_nested_formula_keeps_value() {
        let n = 200_000;
        let deep = format!("{}values.a{}", "(".repeat(n), ")".repeat(n));
        let chain = vec!["values.a"; 100_000].join(" + ");
        let fields = vec![
            FieldConfig::new("deep", FieldType::Derived, "Deep").with_formula(deep, ["a"]),
            FieldConfig::new("chain", FieldType::Derived, "Chain").with_formula(chain, ["a"]),
            FieldConfig::new("ok", FieldType::Derived, "Ok").with_formula("values.a * 2", ["a"]),
        ];
        let derived = DerivedFields::compile(&fields);
        assert!(derived
            .iter()
            .take(2)
            .all(|field| field.formula().is_none()));

        let mut vals = values(&[("a", 2.into()), ("deep", 1.into()), ("chain", 1.into())]);
        assert!(derived.recompute(&mut vals));
        assert_eq!(vals["deep"], Value::Number(1.0));
        assert_eq!(vals["chain"], Value::Number(1.0));
        assert_eq!(vals["ok"], Value::Number(4.0));
    }

    #[test]
    fn test_errors_leave_value_unchanged() {
        let fields = vec![
            FieldConfig::new("bad", FieldType::Derived, "Bad").with_formula("values.a +", ["a"]),
            FieldConfig::new("div", FieldType::Derived, "Div").with_formula("10 / values.a", ["a"]),
        ];
        let derived = DerivedFields::compile(&fields);
        let mut vals = values(&[("a", 0.into()), ("bad", "old".into()), ("div", 7.into())]);

        assert!(!derived.recompute(&mut vals));
        assert_eq!(vals["bad"], Value::from("old"));
        assert_eq!(vals["div"], Value::Number(7.0));

        vals.insert("a".into(), 5.into());
        assert!(derived.recompute(&mut vals));
        assert_eq!(vals["div"], Value::Number(2.0));
        assert!(derived.iter().next().and_then(DerivedField::formula).is_none());
    }

    #[test]
    fn test_null_result_stored_as_empty_string() {
        let fields = vec![FieldConfig::new("m", FieldType::Derived, "M").with_formula("values.nothing", ["nothing"])];
        let derived = DerivedFields::compile(&fields);
        let mut vals = values(&[("m", 1.into())]);

        derived.recompute(&mut vals);
        assert_eq!(vals["m"], Value::from(""));
    }

    #[test]
    fn test_chain_settles_across_passes() {
        // `total` reads `double`, which is declared after it
        let fields = vec![
            FieldConfig::new("n", FieldType::Number, "N"),
            FieldConfig::new("total", FieldType::Derived, "Total").with_formula("values.double + 1", ["double"]),
            FieldConfig::new("double", FieldType::Derived, "Double").with_formula("values.n * 2", ["n"]),
        ];
        let derived = DerivedFields::compile(&fields);
        let mut vals = values(&[("n", 2.into())]);

        // One pass leaves `total` one step behind
        derived.recompute(&mut vals);
        assert_eq!(vals["double"], Value::Number(4.0));
        assert_eq!(vals["total"], Value::Number(1.0));

        let outcome = derived.settle(&mut vals, derived.default_max_passes());
        assert!(outcome.is_stable());
        assert_eq!(vals["total"], Value::Number(5.0));
    }

    #[test]
    fn test_self_reference_is_unstable() {
        let fields = vec![FieldConfig::new("c", FieldType::Derived, "Counter").with_formula("values.c + 1", ["c"])];
        let derived = DerivedFields::compile(&fields);
        let mut vals = values(&[("c", 0.into())]);

        assert_eq!(derived.settle(&mut vals, 3), Settle::Unstable { passes: 3 });
        assert_eq!(vals["c"], Value::Number(3.0));
    }
}

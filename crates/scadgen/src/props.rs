//! Coercion of loosely typed property values into typed node fields.
//!
//! Every helper is total: malformed input never fails, it falls back to the
//! value supplied by the caller.

use scadgen_ir::{Props, ScadExpr, Vec2, Vec3};
use serde_json::Value;

use crate::serialize::format_number;

/// First non-null value among `keys`, resolved left to right.
pub(crate) fn first<'a>(props: &'a Props, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| props.get(*key).filter(|v| !v.is_null()))
}

/// Numeric reading of a non-string value. Booleans count as 0/1 and null as 0.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::String(_) | Value::Array(_) | Value::Object(_) => None,
    }
    .filter(|n| n.is_finite())
}

/// Pure numeric field. Strings are rejected outright.
pub(crate) fn number(value: &Value, fallback: f64) -> f64 {
    coerce_number(value).unwrap_or(fallback)
}

/// Numeric-or-expression field. Strings are kept verbatim as expressions.
pub(crate) fn expr(value: &Value, fallback: f64) -> ScadExpr {
    match value {
        Value::String(s) => ScadExpr::Expr(s.clone()),
        other => ScadExpr::Num(coerce_number(other).unwrap_or(fallback)),
    }
}

/// Boolean field. Only literal `true`/`false` are accepted.
pub(crate) fn boolean(value: Option<&Value>, current: bool) -> bool {
    value.and_then(Value::as_bool).unwrap_or(current)
}

/// String field. Non-string scalars are stringified the way the DSL prints them.
pub(crate) fn string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_default(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Vector element: strings stay expressions, non-finite values become 0.
fn component(value: &Value) -> ScadExpr {
    expr(value, 0.0)
}

/// Scalar, expression, or `[x, y, ...]` with at least two entries.
pub(crate) fn vec2(value: &Value, fallback: Vec2) -> Vec2 {
    match value {
        Value::String(s) => Vec2::Scalar(ScadExpr::Expr(s.clone())),
        Value::Number(_) => Vec2::Scalar(expr(value, 0.0)),
        Value::Array(items) if items.len() >= 2 => {
            Vec2::Components([component(&items[0]), component(&items[1])])
        }
        _ => fallback,
    }
}

/// Scalar, expression, or `[x, y, z, ...]` with at least three entries.
pub(crate) fn vec3(value: &Value, fallback: Vec3) -> Vec3 {
    match value {
        Value::String(s) => Vec3::Scalar(ScadExpr::Expr(s.clone())),
        Value::Number(_) => Vec3::Scalar(expr(value, 0.0)),
        Value::Array(items) if items.len() >= 3 => Vec3::Components([
            component(&items[0]),
            component(&items[1]),
            component(&items[2]),
        ]),
        _ => fallback,
    }
}

/// Point list. Rows that are not arrays of the right arity become zero rows.
pub(crate) fn points<const N: usize>(value: &Value) -> Vec<[f64; N]> {
    let Some(rows) = value.as_array() else {
        return Vec::new();
    };
    rows.iter()
        .map(|row| match row.as_array() {
            Some(items) if items.len() >= N => {
                let mut point = [0.0; N];
                for (slot, item) in point.iter_mut().zip(items) {
                    *slot = number(item, 0.0);
                }
                point
            }
            _ => [0.0; N],
        })
        .collect()
}

/// Index lists (faces, paths). Rows that are not arrays become empty rows.
pub(crate) fn rows(value: &Value) -> Vec<Vec<f64>> {
    let Some(rows) = value.as_array() else {
        return Vec::new();
    };
    rows.iter()
        .map(|row| {
            row.as_array()
                .map(|items| items.iter().map(|i| number(i, 0.0)).collect())
                .unwrap_or_default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: Value) -> Props {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn first_skips_nulls_and_respects_order() {
        let props = bag(json!({"r": null, "radius": 4, "r1": 2}));
        assert_eq!(first(&props, &["r1", "r", "radius"]), Some(&json!(2)));
        assert_eq!(first(&props, &["r", "radius"]), Some(&json!(4)));
        assert_eq!(first(&props, &["d", "diameter"]), None);
    }

    #[test]
    fn number_rejects_strings() {
        assert_eq!(number(&json!("12"), 7.0), 7.0);
        assert_eq!(number(&json!(12.5), 7.0), 12.5);
        assert_eq!(number(&json!(true), 7.0), 1.0);
        assert_eq!(number(&json!([1]), 7.0), 7.0);
    }

    #[test]
    fn expr_keeps_strings_verbatim() {
        assert_eq!(expr(&json!("$t * 360"), 1.0), ScadExpr::Expr("$t * 360".into()));
        assert_eq!(expr(&json!(3), 1.0), ScadExpr::Num(3.0));
        assert_eq!(expr(&json!({"a": 1}), 1.0), ScadExpr::Num(1.0));
    }

    #[test]
    fn boolean_only_accepts_literals() {
        assert!(boolean(Some(&json!(true)), false));
        assert!(!boolean(Some(&json!(false)), true));
        assert!(boolean(Some(&json!("false")), true));
        assert!(!boolean(Some(&json!(1)), false));
        assert!(boolean(None, true));
    }

    #[test]
    fn vectors_coerce_each_component() {
        assert_eq!(
            vec3(&json!([1, "h / 2", {"x": 1}]), Vec3::ZERO),
            Vec3::Components([1.0.into(), "h / 2".into(), 0.0.into()])
        );
        assert_eq!(vec3(&json!(5), Vec3::ZERO), Vec3::Scalar(5.0.into()));
        assert_eq!(vec3(&json!("s"), Vec3::ZERO), Vec3::Scalar("s".into()));
        assert_eq!(vec3(&json!([1, 2]), Vec3::ONE), Vec3::ONE);
        assert_eq!(vec3(&json!(true), Vec3::ZERO), Vec3::ZERO);
        assert_eq!(vec2(&json!([3, 4, 5]), Vec2::ONE), Vec2::new(3.0, 4.0));
        assert_eq!(vec2(&json!([3]), Vec2::ONE), Vec2::ONE);
    }

    #[test]
    fn malformed_points_become_zero_rows() {
        let pts: Vec<[f64; 3]> = points(&json!([[1, 2, 3], [4, 5], "x", [1, "a", 2]]));
        assert_eq!(
            pts,
            vec![[1.0, 2.0, 3.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0, 2.0]]
        );
        let pts: Vec<[f64; 2]> = points(&json!("nope"));
        assert!(pts.is_empty());
    }

    #[test]
    fn malformed_rows_become_empty() {
        assert_eq!(
            rows(&json!([[0, 1, 2], 7, ["a", 3]])),
            vec![vec![0.0, 1.0, 2.0], vec![], vec![0.0, 3.0]]
        );
    }

    #[test]
    fn string_stringifies_scalars() {
        assert_eq!(string(&json!("a")), "a");
        assert_eq!(string(&json!(2.5)), "2.5");
        assert_eq!(string(&json!(4)), "4");
        assert_eq!(string(&json!(false)), "false");
    }
}

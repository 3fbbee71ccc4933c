//! Code generation from a [`SceneTree`] to OpenSCAD source text.
//!
//! # Output layout
//!
//! ```text
//! // Generated using scadgen
//!
//! difference() {
//!   cube(size = 10, center = true);
//!   sphere(r = 6, $fn = 64);
//! }
//!
//! translate([0, 0, $t * 360]) {
//!   cylinder(h = 4, r1 = 1, r2 = 1);
//! }
//! ```
//!
//! A node's text starts un-indented; the enclosing block places its first
//! line and every following line carries its own indent. Top-level nodes are
//! separated by a blank line, siblings inside a block by a single newline.

use log::trace;
use scadgen_ir::{NodeData, ScadExpr, Vec2, Vec3};

use crate::tree::{NodeId, SceneTree};

/// Attribution line that opens every generated file.
pub const CREDIT: &str = "// Generated using scadgen";

const INDENT: &str = "  ";

/// Serialize the whole tree.
///
/// Returns just [`CREDIT`] when there is nothing to emit.
pub fn to_text(tree: &SceneTree) -> String {
    let body = tree
        .top_level()
        .iter()
        .map(|&id| serialize_node(tree, id, ""))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    if body.is_empty() {
        CREDIT.to_string()
    } else {
        format!("{CREDIT}\n\n{body}")
    }
}

/// Serialize one node and its subtree.
///
/// `indent` is the nesting depth of the node: it is applied to continuation
/// lines only, never to the first line. Dead handles produce an empty string.
pub fn serialize_node(tree: &SceneTree, id: NodeId, indent: &str) -> String {
    let Some(node) = tree.get(id) else {
        return String::new();
    };
    trace!("serializing {} at depth {}", node.data.kind(), indent.len() / INDENT.len());
    let children = node.children();

    match &node.data {
        NodeData::Cube { size, center } => {
            format!("cube(size = {}, center = {center});", format_vec3(size))
        }
        NodeData::Sphere { r, d, resolution } => {
            format!("sphere({});", radius_args(r, d, *resolution))
        }
        NodeData::Cylinder {
            h,
            r1,
            r2,
            resolution,
        } => {
            let mut args = vec![
                format!("h = {}", format_expr(h)),
                format!("r1 = {}", format_expr(r1)),
                format!("r2 = {}", format_expr(r2)),
            ];
            push_num(&mut args, "$fn", *resolution);
            format!("cylinder({});", args.join(", "))
        }
        NodeData::Polyhedron {
            points,
            faces,
            convexity,
        } => {
            let mut args = vec![
                format!("points = {}", format_points(points)),
                format!("faces = {}", format_rows(faces)),
            ];
            push_num(&mut args, "convexity", *convexity);
            format!("polyhedron({});", args.join(", "))
        }
        NodeData::Square { size, center } => {
            format!("square(size = {}, center = {center});", format_vec2(size))
        }
        NodeData::Circle { r, d, resolution } => {
            format!("circle({});", radius_args(r, d, *resolution))
        }
        NodeData::Polygon {
            points,
            paths,
            convexity,
        } => {
            let mut args = vec![format!("points = {}", format_points(points))];
            if let Some(paths) = paths.as_ref().filter(|p| !p.is_empty()) {
                args.push(format!("paths = {}", format_rows(paths)));
            }
            push_num(&mut args, "convexity", *convexity);
            format!("polygon({});", args.join(", "))
        }
        NodeData::Union => block(tree, "union()", children, indent),
        NodeData::Difference => block(tree, "difference()", children, indent),
        NodeData::Intersection => block(tree, "intersection()", children, indent),
        NodeData::Translate { v } => {
            block(tree, &format!("translate({})", format_vec3(v)), children, indent)
        }
        NodeData::Rotate { a, v } => {
            let args = match v {
                Some(axis) => format!("{}, {}", format_vec3(a), format_vec3(axis)),
                None => format_vec3(a),
            };
            block(tree, &format!("rotate({args})"), children, indent)
        }
        NodeData::Scale { v } => block(tree, &format!("scale({})", format_vec3(v)), children, indent),
        NodeData::LinearExtrude {
            height,
            center,
            twist,
            scale,
            convexity,
            slices,
            resolution,
        } => {
            let mut args = vec![format!("height = {}", format_expr(height))];
            if *center {
                args.push("center = true".to_string());
            }
            if let Some(twist) = twist {
                args.push(format!("twist = {}", format_expr(twist)));
            }
            if let Some(scale) = scale {
                args.push(format!("scale = {}", format_vec2(scale)));
            }
            push_num(&mut args, "convexity", *convexity);
            push_num(&mut args, "slices", *slices);
            push_num(&mut args, "$fn", *resolution);
            block(tree, &format!("linear_extrude({})", args.join(", ")), children, indent)
        }
        NodeData::RotateExtrude {
            angle,
            convexity,
            resolution,
        } => {
            let mut args = Vec::new();
            if let Some(angle) = angle {
                args.push(format!("angle = {}", format_expr(angle)));
            }
            push_num(&mut args, "convexity", *convexity);
            push_num(&mut args, "$fn", *resolution);
            block(tree, &format!("rotate_extrude({})", args.join(", ")), children, indent)
        }
        NodeData::Text {
            text,
            size,
            font,
            halign,
            valign,
            direction,
            language,
            script,
            spacing,
        } => {
            let mut args = vec![format!("text = {}", quote(text))];
            push_num(&mut args, "size", *size);
            push_str(&mut args, "font", font.as_deref());
            push_str(&mut args, "halign", halign.map(|h| h.as_str()));
            push_str(&mut args, "valign", valign.map(|v| v.as_str()));
            push_str(&mut args, "direction", direction.map(|d| d.as_str()));
            push_str(&mut args, "language", language.as_deref());
            push_str(&mut args, "script", script.as_deref());
            push_num(&mut args, "spacing", *spacing);
            format!("text({});", args.join(", "))
        }
        NodeData::Surface {
            file,
            center,
            invert,
            convexity,
        } => {
            let mut args = vec![format!("file = {}", quote(file))];
            if *center {
                args.push("center = true".to_string());
            }
            if *invert {
                args.push("invert = true".to_string());
            }
            push_num(&mut args, "convexity", *convexity);
            format!("surface({});", args.join(", "))
        }
        NodeData::Import {
            file,
            convexity,
            layer,
        } => {
            let mut args = vec![quote(file)];
            push_num(&mut args, "convexity", *convexity);
            push_str(&mut args, "layer", layer.as_deref());
            format!("import({});", args.join(", "))
        }
        NodeData::Group => block(tree, "", children, indent),
        NodeData::Raw { code } => {
            if code.trim().is_empty() {
                String::new()
            } else {
                let separator = format!("\n{indent}");
                code.split('\n').collect::<Vec<_>>().join(separator.as_str())
            }
        }
        NodeData::Unknown { type_name, .. } => {
            let label = type_name.replace(['\r', '\n'], " ");
            let inner = inner(tree, children, indent);
            if inner.is_empty() {
                format!("// {label} (no children)")
            } else {
                format!("// {label}\n{indent}{{\n{inner}\n{indent}}}")
            }
        }
    }
}

/// Children at the next depth, one per line, each placed at that depth.
/// Children that produce no text are skipped.
fn inner(tree: &SceneTree, children: &[NodeId], indent: &str) -> String {
    let next = format!("{indent}{INDENT}");
    children
        .iter()
        .map(|&child| serialize_node(tree, child, &next))
        .filter(|text| !text.is_empty())
        .map(|text| format!("{next}{text}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `head { children }`, or `head {}` when there is nothing inside.
/// An empty head gives an anonymous block.
fn block(tree: &SceneTree, head: &str, children: &[NodeId], indent: &str) -> String {
    let open = if head.is_empty() {
        "{".to_string()
    } else {
        format!("{head} {{")
    };
    let inner = inner(tree, children, indent);
    if inner.is_empty() {
        format!("{open}}}")
    } else {
        format!("{open}\n{inner}\n{indent}}}")
    }
}

/// `d = D` when a diameter is set, otherwise `r = R` (default 1).
fn radius_args(r: &Option<ScadExpr>, d: &Option<ScadExpr>, resolution: Option<f64>) -> String {
    let mut args = vec![match (d, r) {
        (Some(d), _) => format!("d = {}", format_expr(d)),
        (None, Some(r)) => format!("r = {}", format_expr(r)),
        (None, None) => "r = 1".to_string(),
    }];
    push_num(&mut args, "$fn", resolution);
    args.join(", ")
}

fn push_num(args: &mut Vec<String>, name: &str, value: Option<f64>) {
    if let Some(value) = value {
        args.push(format!("{name} = {}", format_number(value)));
    }
}

fn push_str(args: &mut Vec<String>, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        args.push(format!("{name} = {}", quote(value)));
    }
}

// =============================================================================
// Literal formatting
// =============================================================================

/// Format a number the way the DSL expects it.
///
/// Integral values print without a decimal point; others print with six
/// decimals and trailing zeros removed. Negative zero prints as `0`.
/// Magnitudes of 1e21 and above use exponent form, e.g. `1e+300`.
pub fn format_number(n: f64) -> String {
    if n.abs() >= 1e21 {
        let text = format!("{n:e}");
        return match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        };
    }
    let text = if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        let fixed = format!("{n:.6}");
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    };
    if text == "-0" {
        "0".to_string()
    } else {
        text
    }
}

/// Numbers are formatted, expressions are emitted verbatim.
pub fn format_expr(expr: &ScadExpr) -> String {
    match expr {
        ScadExpr::Num(n) => format_number(*n),
        ScadExpr::Expr(s) => s.clone(),
    }
}

/// Scalar or `[x, y]`.
pub fn format_vec2(v: &Vec2) -> String {
    match v {
        Vec2::Scalar(s) => format_expr(s),
        Vec2::Components(c) => format_list(c.iter().map(format_expr)),
    }
}

/// Scalar or `[x, y, z]`.
pub fn format_vec3(v: &Vec3) -> String {
    match v {
        Vec3::Scalar(s) => format_expr(s),
        Vec3::Components(c) => format_list(c.iter().map(format_expr)),
    }
}

fn format_points<const N: usize>(points: &[[f64; N]]) -> String {
    format_list(
        points
            .iter()
            .map(|p| format_list(p.iter().map(|&n| format_number(n)))),
    )
}

fn format_rows(rows: &[Vec<f64>]) -> String {
    format_list(
        rows.iter()
            .map(|row| format_list(row.iter().map(|&n| format_number(n)))),
    )
}

fn format_list(items: impl Iterator<Item = String>) -> String {
    format!("[{}]", items.collect::<Vec<_>>().join(", "))
}

/// Escape and double-quote a string literal.
pub fn quote(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\r', "\\r")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}

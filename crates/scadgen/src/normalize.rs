//! Normalization of `(kind, props)` pairs into typed [`NodeData`].
//!
//! Creation and partial update share one code path: a new node starts from
//! the per-kind defaults and then receives the props as an update. Aliases
//! are resolved left to right and the first non-null key wins.

use log::debug;
use scadgen_ir::{Direction, HAlign, NodeData, NodeKind, Props, ScadExpr, VAlign, Vec2, Vec3};

use crate::props::{self, first};

const RESOLUTION: &[&str] = &["$fn", "fn"];
const VECTOR: &[&str] = &["v", "vector"];
const HEIGHT: &[&str] = &["height", "h"];
const FILE: &[&str] = &["file", "filename"];
const RADIUS: &[&str] = &["r", "radius"];
const DIAMETER: &[&str] = &["d", "diameter"];

/// Build a node of the named kind from a raw property bag.
///
/// Unrecognized kind names produce [`NodeData::Unknown`] carrying the name
/// and a shallow copy of `props`.
pub fn create(kind: &str, props: &Props) -> NodeData {
    let Some(known) = NodeKind::from_name(kind) else {
        debug!("unrecognized node kind {kind:?}, keeping it as unknown");
        return NodeData::Unknown {
            type_name: kind.to_string(),
            props: props.clone(),
        };
    };

    let mut data = defaults(known);
    update(&mut data, props);

    // An absent r2 follows the resolved bottom radius; an invalid one falls
    // back to 1 here and to r1 on later updates.
    if let NodeData::Cylinder { r1, r2, .. } = &mut data {
        *r2 = match first(props, &["r2"]) {
            Some(value) => crate::props::expr(value, 1.0),
            None => r1.clone(),
        };
    }
    data
}

/// Default payload for each kind.
fn defaults(kind: NodeKind) -> NodeData {
    let one = || ScadExpr::Num(1.0);
    match kind {
        NodeKind::Cube => NodeData::Cube {
            size: Vec3::Scalar(one()),
            center: false,
        },
        NodeKind::Sphere => NodeData::Sphere {
            r: None,
            d: None,
            resolution: None,
        },
        NodeKind::Cylinder => NodeData::Cylinder {
            h: one(),
            r1: one(),
            r2: one(),
            resolution: None,
        },
        NodeKind::Polyhedron => NodeData::Polyhedron {
            points: Vec::new(),
            faces: Vec::new(),
            convexity: None,
        },
        NodeKind::Square => NodeData::Square {
            size: Vec2::ONE,
            center: false,
        },
        NodeKind::Circle => NodeData::Circle {
            r: None,
            d: None,
            resolution: None,
        },
        NodeKind::Polygon => NodeData::Polygon {
            points: Vec::new(),
            paths: None,
            convexity: None,
        },
        NodeKind::Union => NodeData::Union,
        NodeKind::Difference => NodeData::Difference,
        NodeKind::Intersection => NodeData::Intersection,
        NodeKind::Translate => NodeData::Translate { v: Vec3::ZERO },
        NodeKind::Rotate => NodeData::Rotate {
            a: Vec3::ZERO,
            v: None,
        },
        NodeKind::Scale => NodeData::Scale { v: Vec3::ONE },
        NodeKind::LinearExtrude => NodeData::LinearExtrude {
            height: one(),
            center: false,
            twist: None,
            scale: None,
            convexity: None,
            slices: None,
            resolution: None,
        },
        NodeKind::RotateExtrude => NodeData::RotateExtrude {
            angle: None,
            convexity: None,
            resolution: None,
        },
        NodeKind::Text => NodeData::Text {
            text: String::new(),
            size: None,
            font: None,
            halign: None,
            valign: None,
            direction: None,
            language: None,
            script: None,
            spacing: None,
        },
        NodeKind::Surface => NodeData::Surface {
            file: String::new(),
            center: false,
            invert: false,
            convexity: None,
        },
        NodeKind::Import => NodeData::Import {
            file: String::new(),
            convexity: None,
            layer: None,
        },
        NodeKind::Group => NodeData::Group,
        NodeKind::Raw => NodeData::Raw {
            code: String::new(),
        },
        NodeKind::Unknown => NodeData::Unknown {
            type_name: NodeKind::Unknown.as_str().to_string(),
            props: Props::new(),
        },
    }
}

/// Apply a partial update in place.
///
/// Only fields present (non-null) in `next` change. Unknown nodes have their
/// whole prop bag replaced instead of merged.
pub fn update(data: &mut NodeData, next: &Props) {
    let set_num = |slot: &mut Option<f64>, keys: &[&str], fallback: f64| {
        if let Some(value) = first(next, keys) {
            *slot = Some(props::number(value, fallback));
        }
    };
    let set_expr = |slot: &mut Option<ScadExpr>, keys: &[&str], fallback: f64| {
        if let Some(value) = first(next, keys) {
            *slot = Some(props::expr(value, fallback));
        }
    };
    let set_string = |slot: &mut Option<String>, keys: &[&str]| {
        if let Some(value) = first(next, keys) {
            *slot = Some(props::string(value));
        }
    };

    match data {
        NodeData::Cube { size, center } => {
            if let Some(value) = first(next, &["size"]) {
                *size = props::vec3(value, Vec3::ZERO);
            }
            *center = props::boolean(next.get("center"), *center);
        }
        NodeData::Sphere { r, d, resolution } | NodeData::Circle { r, d, resolution } => {
            set_expr(r, RADIUS, 1.0);
            set_expr(d, DIAMETER, 2.0);
            set_num(resolution, RESOLUTION, 0.0);
        }
        NodeData::Cylinder {
            h,
            r1,
            r2,
            resolution,
        } => {
            if let Some(value) = first(next, HEIGHT) {
                *h = props::expr(value, 1.0);
            }
            if let Some(value) = first(next, &["r1", "r", "radius"]) {
                *r1 = props::expr(value, 1.0);
            }
            if let Some(value) = first(next, &["r2"]) {
                *r2 = props::expr(value, r1.as_num().unwrap_or(1.0));
            }
            set_num(resolution, RESOLUTION, 0.0);
        }
        NodeData::Polyhedron {
            points,
            faces,
            convexity,
        } => {
            if let Some(value) = first(next, &["points"]) {
                *points = props::points(value);
            }
            if let Some(value) = first(next, &["faces"]) {
                *faces = props::rows(value);
            }
            set_num(convexity, &["convexity"], 1.0);
        }
        NodeData::Square { size, center } => {
            if let Some(value) = first(next, &["size"]) {
                *size = props::vec2(value, Vec2::ONE);
            }
            *center = props::boolean(next.get("center"), *center);
        }
        NodeData::Polygon {
            points,
            paths,
            convexity,
        } => {
            if let Some(value) = first(next, &["points"]) {
                *points = props::points(value);
            }
            if let Some(value) = first(next, &["paths"]) {
                *paths = Some(props::rows(value));
            }
            set_num(convexity, &["convexity"], 1.0);
        }
        NodeData::Union | NodeData::Difference | NodeData::Intersection | NodeData::Group => {}
        NodeData::Translate { v } => {
            if let Some(value) = first(next, VECTOR) {
                *v = props::vec3(value, Vec3::ZERO);
            }
        }
        NodeData::Rotate { a, v } => {
            if let Some(value) = first(next, &["a", "angle", "angles"]) {
                *a = props::vec3(value, Vec3::ZERO);
            }
            if let Some(value) = first(next, VECTOR) {
                *v = Some(props::vec3(value, Vec3::ZERO));
            }
        }
        NodeData::Scale { v } => {
            if let Some(value) = first(next, VECTOR) {
                *v = props::vec3(value, Vec3::ONE);
            }
        }
        NodeData::LinearExtrude {
            height,
            center,
            twist,
            scale,
            convexity,
            slices,
            resolution,
        } => {
            if let Some(value) = first(next, HEIGHT) {
                *height = props::expr(value, 1.0);
            }
            *center = props::boolean(next.get("center"), *center);
            set_expr(twist, &["twist"], 0.0);
            if let Some(value) = first(next, &["scale"]) {
                *scale = Some(props::vec2(value, Vec2::ONE));
            }
            set_num(convexity, &["convexity"], 1.0);
            set_num(slices, &["slices"], 0.0);
            set_num(resolution, RESOLUTION, 0.0);
        }
        NodeData::RotateExtrude {
            angle,
            convexity,
            resolution,
        } => {
            set_expr(angle, &["angle"], 360.0);
            set_num(convexity, &["convexity"], 1.0);
            set_num(resolution, RESOLUTION, 0.0);
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
            if let Some(value) = first(next, &["text", "t"]) {
                *text = props::string(value);
            }
            set_num(size, &["size"], 10.0);
            set_string(font, &["font"]);
            if let Some(parsed) = next
                .get("halign")
                .and_then(|v| v.as_str())
                .and_then(HAlign::from_name)
            {
                *halign = Some(parsed);
            }
            if let Some(parsed) = next
                .get("valign")
                .and_then(|v| v.as_str())
                .and_then(VAlign::from_name)
            {
                *valign = Some(parsed);
            }
            if let Some(parsed) = next
                .get("direction")
                .and_then(|v| v.as_str())
                .and_then(Direction::from_name)
            {
                *direction = Some(parsed);
            }
            set_string(language, &["language"]);
            set_string(script, &["script"]);
            set_num(spacing, &["spacing"], 1.0);
        }
        NodeData::Surface {
            file,
            center,
            invert,
            convexity,
        } => {
            if let Some(value) = first(next, FILE) {
                *file = props::string(value);
            }
            *center = props::boolean(next.get("center"), *center);
            *invert = props::boolean(next.get("invert"), *invert);
            set_num(convexity, &["convexity"], 1.0);
        }
        NodeData::Import {
            file,
            convexity,
            layer,
        } => {
            if let Some(value) = first(next, FILE) {
                *file = props::string(value);
            }
            set_num(convexity, &["convexity"], 1.0);
            set_string(layer, &["layer"]);
        }
        NodeData::Raw { code } => {
            if let Some(value) = first(next, &["code"]) {
                *code = props::string(value);
            }
        }
        NodeData::Unknown { props, .. } => {
            *props = next.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn bag(value: Value) -> Props {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn every_known_kind_creates_its_own_variant() {
        for kind in NodeKind::KNOWN {
            let data = create(kind.as_str(), &Props::new());
            assert_eq!(data.kind(), kind, "{kind} fell through");
        }
    }

    #[test]
    fn unknown_kind_keeps_raw_props() {
        let props = bag(json!({"r": 2, "nested": {"a": [1, 2]}}));
        match create("minkowski", &props) {
            NodeData::Unknown { type_name, props: kept } => {
                assert_eq!(type_name, "minkowski");
                assert_eq!(kept, props);
            }
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn cube_defaults_and_vector_size() {
        assert_eq!(
            create("cube", &Props::new()),
            NodeData::Cube {
                size: Vec3::Scalar(1.0.into()),
                center: false,
            }
        );
        assert_eq!(
            create("cube", &bag(json!({"size": [1, 2, 3], "center": true}))),
            NodeData::Cube {
                size: Vec3::new(1.0, 2.0, 3.0),
                center: true,
            }
        );
        // Short arrays fall back to the zero vector.
        assert_eq!(
            create("cube", &bag(json!({"size": [1, 2]}))),
            NodeData::Cube {
                size: Vec3::ZERO,
                center: false,
            }
        );
    }

    #[test]
    fn sphere_aliases_resolve_left_to_right() {
        let data = create("sphere", &bag(json!({"radius": 4, "fn": 32})));
        assert_eq!(
            data,
            NodeData::Sphere {
                r: Some(4.0.into()),
                d: None,
                resolution: Some(32.0),
            }
        );
        let data = create("sphere", &bag(json!({"r": 2, "radius": 9, "diameter": "d0"})));
        assert_eq!(
            data,
            NodeData::Sphere {
                r: Some(2.0.into()),
                d: Some("d0".into()),
                resolution: None,
            }
        );
    }

    #[test]
    fn resolution_rejects_strings() {
        let data = create("circle", &bag(json!({"r": 1, "$fn": "64"})));
        assert_eq!(
            data,
            NodeData::Circle {
                r: Some(1.0.into()),
                d: None,
                resolution: Some(0.0),
            }
        );
    }

    #[test]
    fn cylinder_r2_follows_r1() {
        let data = create("cylinder", &bag(json!({"h": 10, "r": 3})));
        assert_eq!(
            data,
            NodeData::Cylinder {
                h: 10.0.into(),
                r1: 3.0.into(),
                r2: 3.0.into(),
                resolution: None,
            }
        );
        let data = create("cylinder", &bag(json!({"height": "len", "r1": 3, "r2": 0})));
        assert_eq!(
            data,
            NodeData::Cylinder {
                h: "len".into(),
                r1: 3.0.into(),
                r2: 0.0.into(),
                resolution: None,
            }
        );
    }

    #[test]
    fn invalid_r2_falls_back_to_one_on_create_and_r1_on_update() {
        let mut data = create("cylinder", &bag(json!({"r1": 3, "r2": {}})));
        assert_eq!(
            data,
            NodeData::Cylinder {
                h: 1.0.into(),
                r1: 3.0.into(),
                r2: 1.0.into(),
                resolution: None,
            }
        );
        update(&mut data, &bag(json!({"r2": [1]})));
        assert_eq!(
            data,
            NodeData::Cylinder {
                h: 1.0.into(),
                r1: 3.0.into(),
                r2: 3.0.into(),
                resolution: None,
            }
        );
    }

    #[test]
    fn transform_vectors_default_by_kind() {
        assert_eq!(create("translate", &Props::new()), NodeData::Translate { v: Vec3::ZERO });
        assert_eq!(create("scale", &Props::new()), NodeData::Scale { v: Vec3::ONE });
        assert_eq!(
            create("scale", &bag(json!({"vector": [2]}))),
            NodeData::Scale { v: Vec3::ONE }
        );
        assert_eq!(
            create("rotate", &bag(json!({"angles": [0, 90, 0]}))),
            NodeData::Rotate {
                a: Vec3::new(0.0, 90.0, 0.0),
                v: None,
            }
        );
    }

    #[test]
    fn text_aliases_and_alignment() {
        let data = create(
            "text",
            &bag(json!({"t": "hi", "halign": "center", "valign": "sideways", "size": 5})),
        );
        match data {
            NodeData::Text {
                text,
                size,
                halign,
                valign,
                ..
            } => {
                assert_eq!(text, "hi");
                assert_eq!(size, Some(5.0));
                assert_eq!(halign, Some(HAlign::Center));
                assert_eq!(valign, None);
            }
            other => panic!("expected Text, got {other:?}"),
        }
    }

    #[test]
    fn file_alias() {
        match create("import", &bag(json!({"filename": "part.stl"}))) {
            NodeData::Import { file, .. } => assert_eq!(file, "part.stl"),
            other => panic!("expected Import, got {other:?}"),
        }
    }

    #[test]
    fn empty_update_is_a_no_op() {
        let props = bag(json!({
            "height": 4, "center": true, "twist": "$t", "scale": [1, 2],
            "convexity": 3, "slices": 8, "$fn": 16
        }));
        let mut data = create("linear_extrude", &props);
        let before = data.clone();
        update(&mut data, &Props::new());
        assert_eq!(data, before);
    }

    #[test]
    fn update_touches_only_present_fields() {
        let mut data = create("cylinder", &bag(json!({"h": 2, "r1": 1, "r2": 5})));
        update(&mut data, &bag(json!({"r": 4, "$fn": null})));
        assert_eq!(
            data,
            NodeData::Cylinder {
                h: 2.0.into(),
                r1: 4.0.into(),
                r2: 5.0.into(),
                resolution: None,
            }
        );
    }

    #[test]
    fn update_ignores_non_boolean_center() {
        let mut data = create("square", &bag(json!({"center": true})));
        update(&mut data, &bag(json!({"center": "no"})));
        assert_eq!(
            data,
            NodeData::Square {
                size: Vec2::ONE,
                center: true,
            }
        );
    }

    #[test]
    fn unknown_update_replaces_props() {
        let mut data = create("hull", &bag(json!({"a": 1, "b": 2})));
        update(&mut data, &bag(json!({"c": 3})));
        match data {
            NodeData::Unknown { props, .. } => assert_eq!(props, bag(json!({"c": 3}))),
            other => panic!("expected Unknown, got {other:?}"),
        }
    }
}

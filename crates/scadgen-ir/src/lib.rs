#![warn(missing_docs)]

//! Scene-graph node model for scadgen.
//!
//! This crate defines the typed nodes that make up a parametric solid model
//! before it is compiled into OpenSCAD source text. Every node is one variant
//! of [`NodeData`]; ordering and parent/child structure live in the tree that
//! owns the nodes, not in the nodes themselves.
//!
//! The model is purely declarative: no geometry is ever computed here.
//! Numeric fields may instead hold an opaque expression string (see
//! [`ScadExpr`]) that is emitted verbatim, which is how animated or otherwise
//! parametric values reach the generated program.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw, loosely typed property bag as supplied by the host engine.
pub type Props = Map<String, Value>;

/// A finite number or an expression string passed through unevaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScadExpr {
    /// Numeric literal.
    Num(f64),
    /// Expression text such as `$t * 360`, emitted verbatim.
    Expr(String),
}

impl ScadExpr {
    /// Numeric value, if this is not an expression.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            ScadExpr::Num(n) => Some(*n),
            ScadExpr::Expr(_) => None,
        }
    }
}

impl From<f64> for ScadExpr {
    fn from(n: f64) -> Self {
        ScadExpr::Num(n)
    }
}

impl From<&str> for ScadExpr {
    fn from(s: &str) -> Self {
        ScadExpr::Expr(s.to_string())
    }
}

impl From<String> for ScadExpr {
    fn from(s: String) -> Self {
        ScadExpr::Expr(s)
    }
}

/// Two-component vector argument, or a single scalar applied to both axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Vec2 {
    /// Scalar (number or expression).
    Scalar(ScadExpr),
    /// Explicit `[x, y]`.
    Components([ScadExpr; 2]),
}

impl Vec2 {
    /// Scalar 1, used for sizes and scale factors.
    pub const ONE: Vec2 = Vec2::Scalar(ScadExpr::Num(1.0));

    /// Create a numeric `[x, y]` vector.
    pub fn new(x: f64, y: f64) -> Self {
        Vec2::Components([ScadExpr::Num(x), ScadExpr::Num(y)])
    }
}

/// Three-component vector argument, or a single scalar applied to all axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Vec3 {
    /// Scalar (number or expression).
    Scalar(ScadExpr),
    /// Explicit `[x, y, z]`.
    Components([ScadExpr; 3]),
}

impl Vec3 {
    /// `[0, 0, 0]`.
    pub const ZERO: Vec3 = Vec3::Components([
        ScadExpr::Num(0.0),
        ScadExpr::Num(0.0),
        ScadExpr::Num(0.0),
    ]);

    /// `[1, 1, 1]`.
    pub const ONE: Vec3 = Vec3::Components([
        ScadExpr::Num(1.0),
        ScadExpr::Num(1.0),
        ScadExpr::Num(1.0),
    ]);

    /// Create a numeric `[x, y, z]` vector.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3::Components([ScadExpr::Num(x), ScadExpr::Num(y), ScadExpr::Num(z)])
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    /// Align to the left edge.
    Left,
    /// Center horizontally.
    Center,
    /// Align to the right edge.
    Right,
}

impl HAlign {
    /// Parse the DSL keyword.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(HAlign::Left),
            "center" => Some(HAlign::Center),
            "right" => Some(HAlign::Right),
            _ => None,
        }
    }

    /// DSL keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            HAlign::Left => "left",
            HAlign::Center => "center",
            HAlign::Right => "right",
        }
    }
}

/// Vertical text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    /// Align to the top.
    Top,
    /// Center vertically.
    Center,
    /// Align to the baseline.
    Baseline,
    /// Align to the bottom.
    Bottom,
}

impl VAlign {
    /// Parse the DSL keyword.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "top" => Some(VAlign::Top),
            "center" => Some(VAlign::Center),
            "baseline" => Some(VAlign::Baseline),
            "bottom" => Some(VAlign::Bottom),
            _ => None,
        }
    }

    /// DSL keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            VAlign::Top => "top",
            VAlign::Center => "center",
            VAlign::Baseline => "baseline",
            VAlign::Bottom => "bottom",
        }
    }
}

/// Text direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Left to right.
    Ltr,
    /// Right to left.
    Rtl,
    /// Top to bottom.
    Ttb,
    /// Bottom to top.
    Btt,
}

impl Direction {
    /// Parse the DSL keyword.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ltr" => Some(Direction::Ltr),
            "rtl" => Some(Direction::Rtl),
            "ttb" => Some(Direction::Ttb),
            "btt" => Some(Direction::Btt),
            _ => None,
        }
    }

    /// DSL keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
            Direction::Ttb => "ttb",
            Direction::Btt => "btt",
        }
    }
}

/// Discriminant of a [`NodeData`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// `cube`
    Cube,
    /// `sphere`
    Sphere,
    /// `cylinder`
    Cylinder,
    /// `polyhedron`
    Polyhedron,
    /// `square`
    Square,
    /// `circle`
    Circle,
    /// `polygon`
    Polygon,
    /// `union`
    Union,
    /// `difference`
    Difference,
    /// `intersection`
    Intersection,
    /// `translate`
    Translate,
    /// `rotate`
    Rotate,
    /// `scale`
    Scale,
    /// `linear_extrude`
    LinearExtrude,
    /// `rotate_extrude`
    RotateExtrude,
    /// `text`
    Text,
    /// `surface`
    Surface,
    /// `import`
    Import,
    /// Anonymous `{ ... }` block.
    Group,
    /// Verbatim source text.
    Raw,
    /// Fallback for unrecognized kind names.
    Unknown,
}

impl NodeKind {
    /// Every kind that can be created by name, i.e. all but [`NodeKind::Unknown`].
    pub const KNOWN: [NodeKind; 20] = [
        NodeKind::Cube,
        NodeKind::Sphere,
        NodeKind::Cylinder,
        NodeKind::Polyhedron,
        NodeKind::Square,
        NodeKind::Circle,
        NodeKind::Polygon,
        NodeKind::Union,
        NodeKind::Difference,
        NodeKind::Intersection,
        NodeKind::Translate,
        NodeKind::Rotate,
        NodeKind::Scale,
        NodeKind::LinearExtrude,
        NodeKind::RotateExtrude,
        NodeKind::Text,
        NodeKind::Surface,
        NodeKind::Import,
        NodeKind::Group,
        NodeKind::Raw,
    ];

    /// Declaration position of the kind. [`NodeKind::Unknown`] is always last.
    pub const fn index(self) -> usize {
        match self {
            NodeKind::Cube => 0,
            NodeKind::Sphere => 1,
            NodeKind::Cylinder => 2,
            NodeKind::Polyhedron => 3,
            NodeKind::Square => 4,
            NodeKind::Circle => 5,
            NodeKind::Polygon => 6,
            NodeKind::Union => 7,
            NodeKind::Difference => 8,
            NodeKind::Intersection => 9,
            NodeKind::Translate => 10,
            NodeKind::Rotate => 11,
            NodeKind::Scale => 12,
            NodeKind::LinearExtrude => 13,
            NodeKind::RotateExtrude => 14,
            NodeKind::Text => 15,
            NodeKind::Surface => 16,
            NodeKind::Import => 17,
            NodeKind::Group => 18,
            NodeKind::Raw => 19,
            NodeKind::Unknown => 20,
        }
    }

    /// Look up a kind by its host-facing name.
    ///
    /// Returns `None` for unrecognized names, including the literal
    /// `"unknown"`; those become [`NodeData::Unknown`] nodes.
    pub fn from_name(name: &str) -> Option<Self> {
        NodeKind::KNOWN.iter().copied().find(|k| k.as_str() == name)
    }

    /// Host-facing name, which is also the DSL module name for most kinds.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Cube => "cube",
            NodeKind::Sphere => "sphere",
            NodeKind::Cylinder => "cylinder",
            NodeKind::Polyhedron => "polyhedron",
            NodeKind::Square => "square",
            NodeKind::Circle => "circle",
            NodeKind::Polygon => "polygon",
            NodeKind::Union => "union",
            NodeKind::Difference => "difference",
            NodeKind::Intersection => "intersection",
            NodeKind::Translate => "translate",
            NodeKind::Rotate => "rotate",
            NodeKind::Scale => "scale",
            NodeKind::LinearExtrude => "linear_extrude",
            NodeKind::RotateExtrude => "rotate_extrude",
            NodeKind::Text => "text",
            NodeKind::Surface => "surface",
            NodeKind::Import => "import",
            NodeKind::Group => "group",
            NodeKind::Raw => "raw",
            NodeKind::Unknown => "unknown",
        }
    }
}

// `KNOWN` must list every kind but `Unknown`, in declaration order, so that a
// kind missing from it fails the build instead of normalizing to `Unknown`.
const _: () = {
    assert!(NodeKind::Unknown as usize == NodeKind::KNOWN.len());
    assert!(NodeKind::Unknown.index() == NodeKind::KNOWN.len());
    let mut i = 0;
    while i < NodeKind::KNOWN.len() {
        assert!(NodeKind::KNOWN[i] as usize == i);
        assert!(NodeKind::KNOWN[i].index() == i);
        i += 1;
    }
};

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed payload of a scene node.
///
/// Children are not stored here; the owning tree keeps an ordered child list
/// next to each payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeData {
    /// Axis-aligned box.
    Cube {
        /// Edge lengths, or a single edge length.
        size: Vec3,
        /// Center on the origin instead of the first octant.
        center: bool,
    },
    /// Sphere centered at the origin.
    Sphere {
        /// Radius.
        r: Option<ScadExpr>,
        /// Diameter; takes precedence over `r` when set.
        d: Option<ScadExpr>,
        /// Fragment count (`$fn`).
        #[serde(rename = "$fn")]
        resolution: Option<f64>,
    },
    /// Cylinder or cone along Z.
    Cylinder {
        /// Height.
        h: ScadExpr,
        /// Bottom radius.
        r1: ScadExpr,
        /// Top radius.
        r2: ScadExpr,
        /// Fragment count (`$fn`).
        #[serde(rename = "$fn")]
        resolution: Option<f64>,
    },
    /// Arbitrary closed solid from points and faces.
    Polyhedron {
        /// Vertex positions.
        points: Vec<[f64; 3]>,
        /// Faces as lists of point indices.
        faces: Vec<Vec<f64>>,
        /// Convexity hint for the preview renderer.
        convexity: Option<f64>,
    },
    /// 2D rectangle.
    Square {
        /// Side lengths, or a single side length.
        size: Vec2,
        /// Center on the origin.
        center: bool,
    },
    /// 2D circle.
    Circle {
        /// Radius.
        r: Option<ScadExpr>,
        /// Diameter; takes precedence over `r` when set.
        d: Option<ScadExpr>,
        /// Fragment count (`$fn`).
        #[serde(rename = "$fn")]
        resolution: Option<f64>,
    },
    /// 2D polygon.
    Polygon {
        /// Vertex positions.
        points: Vec<[f64; 2]>,
        /// Optional outline/hole paths as lists of point indices.
        paths: Option<Vec<Vec<f64>>>,
        /// Convexity hint.
        convexity: Option<f64>,
    },
    /// Boolean union of the children.
    Union,
    /// First child minus the remaining children.
    Difference,
    /// Boolean intersection of the children.
    Intersection,
    /// Translation of the children.
    Translate {
        /// Offset.
        v: Vec3,
    },
    /// Rotation of the children.
    Rotate {
        /// Euler angles in degrees, or a single angle when `v` is set.
        a: Vec3,
        /// Rotation axis.
        v: Option<Vec3>,
    },
    /// Scale of the children.
    Scale {
        /// Per-axis factors.
        v: Vec3,
    },
    /// Linear extrusion of 2D children.
    LinearExtrude {
        /// Extrusion height.
        height: ScadExpr,
        /// Center along Z.
        center: bool,
        /// Twist in degrees over the full height.
        twist: Option<ScadExpr>,
        /// Top scale factor.
        scale: Option<Vec2>,
        /// Convexity hint.
        convexity: Option<f64>,
        /// Number of intermediate slices.
        slices: Option<f64>,
        /// Fragment count (`$fn`).
        #[serde(rename = "$fn")]
        resolution: Option<f64>,
    },
    /// Rotational extrusion of 2D children around Z.
    RotateExtrude {
        /// Sweep angle in degrees.
        angle: Option<ScadExpr>,
        /// Convexity hint.
        convexity: Option<f64>,
        /// Fragment count (`$fn`).
        #[serde(rename = "$fn")]
        resolution: Option<f64>,
    },
    /// 2D text outline.
    Text {
        /// Text content.
        text: String,
        /// Font size.
        size: Option<f64>,
        /// Font name.
        font: Option<String>,
        /// Horizontal alignment.
        halign: Option<HAlign>,
        /// Vertical alignment.
        valign: Option<VAlign>,
        /// Writing direction.
        direction: Option<Direction>,
        /// Language code.
        language: Option<String>,
        /// Script name.
        script: Option<String>,
        /// Letter spacing factor.
        spacing: Option<f64>,
    },
    /// Height map loaded from a file.
    Surface {
        /// Source file path.
        file: String,
        /// Center on the origin.
        center: bool,
        /// Invert the height values.
        invert: bool,
        /// Convexity hint.
        convexity: Option<f64>,
    },
    /// External geometry file.
    Import {
        /// Source file path.
        file: String,
        /// Convexity hint.
        convexity: Option<f64>,
        /// Layer name for layered formats such as DXF.
        layer: Option<String>,
    },
    /// Anonymous block wrapping the children.
    Group,
    /// Verbatim source text.
    Raw {
        /// Code emitted as-is.
        code: String,
    },
    /// Unrecognized kind, kept for inspection and rendered as a comment.
    Unknown {
        /// Kind name the host asked for.
        #[serde(rename = "type")]
        type_name: String,
        /// Shallow copy of the original, un-normalized properties.
        props: Props,
    },
}

impl NodeData {
    /// Discriminant of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Cube { .. } => NodeKind::Cube,
            NodeData::Sphere { .. } => NodeKind::Sphere,
            NodeData::Cylinder { .. } => NodeKind::Cylinder,
            NodeData::Polyhedron { .. } => NodeKind::Polyhedron,
            NodeData::Square { .. } => NodeKind::Square,
            NodeData::Circle { .. } => NodeKind::Circle,
            NodeData::Polygon { .. } => NodeKind::Polygon,
            NodeData::Union => NodeKind::Union,
            NodeData::Difference => NodeKind::Difference,
            NodeData::Intersection => NodeKind::Intersection,
            NodeData::Translate { .. } => NodeKind::Translate,
            NodeData::Rotate { .. } => NodeKind::Rotate,
            NodeData::Scale { .. } => NodeKind::Scale,
            NodeData::LinearExtrude { .. } => NodeKind::LinearExtrude,
            NodeData::RotateExtrude { .. } => NodeKind::RotateExtrude,
            NodeData::Text { .. } => NodeKind::Text,
            NodeData::Surface { .. } => NodeKind::Surface,
            NodeData::Import { .. } => NodeKind::Import,
            NodeData::Group => NodeKind::Group,
            NodeData::Raw { .. } => NodeKind::Raw,
            NodeData::Unknown { .. } => NodeKind::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_roundtrip() {
        for kind in NodeKind::KNOWN {
            assert_eq!(NodeKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(NodeKind::from_name("unknown"), None);
        assert_eq!(NodeKind::from_name("minkowski"), None);
    }

    #[test]
    fn index_matches_declaration_order() {
        for (i, kind) in NodeKind::KNOWN.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(*kind as usize, i);
        }
        assert_eq!(NodeKind::Unknown.index(), NodeKind::KNOWN.len());
        assert_eq!(NodeKind::Unknown as usize, NodeKind::KNOWN.len());
    }

    #[test]
    fn known_kinds_are_distinct() {
        let mut names: Vec<_> = NodeKind::KNOWN.iter().map(|k| k.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), NodeKind::KNOWN.len());
        assert!(!names.contains(&"unknown"));
    }

    #[test]
    fn text_enums_parse_keywords() {
        assert_eq!(HAlign::from_name("center"), Some(HAlign::Center));
        assert_eq!(VAlign::from_name("baseline"), Some(VAlign::Baseline));
        assert_eq!(Direction::from_name("rtl"), Some(Direction::Rtl));
        assert_eq!(HAlign::from_name("middle"), None);
        assert_eq!(VAlign::Bottom.as_str(), "bottom");
    }

    #[test]
    fn node_data_json_shape() {
        let node = NodeData::Translate {
            v: Vec3::Components([0.0.into(), 0.0.into(), "$t * 360".into()]),
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "translate", "v": [0.0, 0.0, "$t * 360"]})
        );

        let restored: NodeData = serde_json::from_value(json).unwrap();
        assert_eq!(restored, node);
        assert_eq!(restored.kind(), NodeKind::Translate);
    }

    #[test]
    fn unknown_keeps_type_name() {
        let mut props = Props::new();
        props.insert("r".to_string(), serde_json::json!(3));
        let node = NodeData::Unknown {
            type_name: "minkowski".to_string(),
            props,
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "unknown");
        assert_eq!(json["type"], "minkowski");
        assert_eq!(json["props"]["r"], 3);
    }
}

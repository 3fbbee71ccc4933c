//! Full render passes driven through the public API, the way a host engine
//! builds a tree, re-renders it, and commits it to disk.

use pretty_assertions::assert_eq;
use scadgen::{NodeId, NodeKind, Props, ScadRoot, SceneTree, CREDIT};
use serde_json::{json, Value};

fn bag(value: Value) -> Props {
    value.as_object().cloned().unwrap()
}

struct Rocket {
    spin: NodeId,
    body: NodeId,
    hull: NodeId,
    fins: NodeId,
}

fn mount_rocket(tree: &mut SceneTree) -> Rocket {
    let spin = tree.create("translate", &bag(json!({"v": [0, 0, "$t * 360"]})));
    let hull = tree.create("union", &Props::new());
    let body = tree.create("cylinder", &bag(json!({"h": 10, "r": 2, "$fn": 32})));
    let lift = tree.create("translate", &bag(json!({"vector": [0, 0, 10]})));
    let cone = tree.create("cylinder", &bag(json!({"height": 4, "r1": 2, "r2": 0})));
    let fins = tree.create(
        "raw",
        &bag(json!({"code": "// fins\nfor (i = [0:2]) rotate(i * 120) cube([4, 0.5, 3]);"})),
    );

    tree.append_child(lift, cone).unwrap();
    tree.append_child(hull, body).unwrap();
    tree.append_child(hull, lift).unwrap();
    tree.append_child(spin, hull).unwrap();
    tree.append_child(spin, fins).unwrap();
    tree.append_child_to_container(spin).unwrap();

    Rocket {
        spin,
        body,
        hull,
        fins,
    }
}

#[test]
fn first_pass_renders_nested_scene() {
    let mut root = ScadRoot::new();
    mount_rocket(root.tree_mut());

    assert_eq!(
        root.to_text(),
        format!(
            "{CREDIT}

translate([0, 0, $t * 360]) {{
  union() {{
    cylinder(h = 10, r1 = 2, r2 = 2, $fn = 32);
    translate([0, 0, 10]) {{
      cylinder(h = 4, r1 = 2, r2 = 0);
    }}
  }}
  // fins
  for (i = [0:2]) rotate(i * 120) cube([4, 0.5, 3]);
}}"
        )
    );
}

#[test]
fn second_pass_applies_incremental_edits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rocket.scad");
    let mut root = ScadRoot::with_output(&path);

    let mut mounted = None;
    root.render(|tree| {
        mounted = Some(mount_rocket(tree));
        Ok(())
    })
    .unwrap();
    let rocket = mounted.unwrap();

    root.render(|tree| {
        tree.update(rocket.spin, &Props::new())?;
        tree.update(rocket.body, &bag(json!({"$fn": 64})))?;
        let nose = tree.create("sphere", &bag(json!({"radius": 1.5})));
        tree.insert_child_before(rocket.spin, nose, rocket.hull)?;
        tree.remove_child(rocket.spin, rocket.fins)?;
        Ok(())
    })
    .unwrap();

    let expected = format!(
        "{CREDIT}

translate([0, 0, $t * 360]) {{
  sphere(r = 1.5);
  union() {{
    cylinder(h = 10, r1 = 2, r2 = 2, $fn = 64);
    translate([0, 0, 10]) {{
      cylinder(h = 4, r1 = 2, r2 = 0);
    }}
  }}
}}"
    );
    assert_eq!(std::fs::read_to_string(&path).unwrap(), expected);
    assert_eq!(root.to_text(), expected);
    assert!(!root.tree().contains(rocket.fins));
    assert_eq!(root.tree().len(), 6);
}

#[test]
fn stale_insert_reference_appends() {
    let mut root = ScadRoot::new();
    let tree = root.tree_mut();
    let first = tree.create("square", &bag(json!({"size": [2, 1], "center": true})));
    let gone = tree.create("circle", &Props::new());
    let second = tree.create("circle", &bag(json!({"d": 3})));
    tree.append_child_to_container(first).unwrap();
    tree.insert_in_container_before(second, gone).unwrap();

    assert_eq!(
        root.to_text(),
        format!("{CREDIT}\n\nsquare(size = [2, 1], center = true);\n\ncircle(d = 3);")
    );
}

#[test]
fn cloned_subtree_renders_identically() {
    let mut root = ScadRoot::new();
    let rocket = mount_rocket(root.tree_mut());
    let tree = root.tree_mut();
    let copy = tree.clone_node(rocket.spin, true).unwrap();
    tree.append_child_to_container(copy).unwrap();

    let text = root.to_text();
    let body = text.strip_prefix(&format!("{CREDIT}\n\n")).unwrap();
    let (a, b) = body.split_once("\n\n").unwrap();
    assert_eq!(a, b);

    let report = root.report();
    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.entries[0], report.entries[1]);
    assert_eq!(report.total_bytes, a.len() + b.len());
}

#[test]
fn report_covers_every_node() {
    let mut root = ScadRoot::new();
    mount_rocket(root.tree_mut());
    let report = root.report();

    let spin = &report.entries[0];
    assert_eq!(spin.kind, NodeKind::Translate);
    assert_eq!(
        spin.children.iter().map(|c| c.kind).collect::<Vec<_>>(),
        vec![NodeKind::Union, NodeKind::Raw]
    );
    assert_eq!(report.node_count(), 6);
    assert_eq!(
        report.total_bytes,
        root.to_text().len() - CREDIT.len() - 2
    );
}

#[test]
fn unknown_kinds_survive_as_comments() {
    let mut root = ScadRoot::new();
    let tree = root.tree_mut();
    let hull = tree.create("hull", &bag(json!({"smooth": true})));
    let a = tree.create("sphere", &bag(json!({"r": 2})));
    let b = tree.create("translate", &bag(json!({"v": [5, 0, 0]})));
    let c = tree.create("sphere", &bag(json!({"r": 1})));
    tree.append_child(b, c).unwrap();
    tree.append_child(hull, a).unwrap();
    tree.append_child(hull, b).unwrap();
    tree.append_child_to_container(hull).unwrap();
    let empty = tree.create("offset", &bag(json!({"r": 1})));
    tree.append_child_to_container(empty).unwrap();

    assert_eq!(
        root.to_text(),
        format!(
            "{CREDIT}

// hull
{{
  sphere(r = 2);
  translate([5, 0, 0]) {{
    sphere(r = 1);
  }}
}}

// offset (no children)"
        )
    );
}

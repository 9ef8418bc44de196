use datafix::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn dynamic(value: serde_json::Value) -> Dynamic<JsonOps> {
    Dynamic::new(JsonOps, value)
}

fn fixture() -> serde_json::Value {
    json!({
        "name": "Steve",
        "active": true,
        "level": 9,
        "health": 19.5,
        "tags": ["fast", "quiet"],
        "position": { "x": 1.5, "y": -2.0 },
        "nothing": null
    })
}

#[test]
fn cross_backend_conversion_round_trips() {
    let original = dynamic(fixture());

    let node: Dynamic<NodeOps> = original.convert(NodeOps);
    let back: Dynamic<JsonOps> = node.convert(JsonOps);

    assert_eq!(back.value(), original.value());
}

#[test]
fn conversion_preserves_numeric_kind() {
    let node = dynamic(json!({ "int": 9, "float": 2.0 })).convert(NodeOps);

    assert_eq!(
        node.get("int").ok().unwrap().as_number().ok(),
        Some(Number::Int(9))
    );
    assert_eq!(
        node.get("float").ok().unwrap().as_number().ok(),
        Some(Number::Float(2.0))
    );
}

#[test]
fn conversion_preserves_map_entry_order() {
    let node = dynamic(json!({ "z": 1, "a": 2, "m": 3 })).convert(NodeOps);

    let keys: Vec<String> = node
        .as_map()
        .ok()
        .unwrap()
        .into_iter()
        .map(|(key, _)| key.as_string().ok().unwrap())
        .collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn booleans_win_over_numbers_when_probing() {
    // A bool must convert as a bool even though some carriers overlap
    // boolean and integer representations.
    let node = dynamic(json!(true)).convert(NodeOps);
    assert_eq!(node.value(), &Node::Bool(true));
}

#[test]
fn writers_leave_the_source_untouched() {
    let original = dynamic(fixture());
    let pristine = original.clone();

    let _ = original.set("name", original.create_string("Alex"));
    let _ = original.remove("level");
    let _ = original.update("health", |health| health.create_double(0.0));
    let _ = original
        .get("position")
        .ok()
        .unwrap()
        .set("x", original.create_int(0));

    assert_eq!(original, pristine);
}

#[test]
fn node_writers_leave_the_source_untouched() {
    let original: Dynamic<NodeOps> = dynamic(fixture()).convert(NodeOps);
    let pristine = original.clone();

    let _ = original.set("name", original.create_string("Alex"));
    let _ = original.remove("level");

    assert_eq!(original, pristine);
}

#[test]
fn set_and_remove_preserve_order() {
    let original = dynamic(json!({ "a": 1, "b": 2, "c": 3 }));

    let keys = |value: &Dynamic<JsonOps>| -> Vec<String> {
        value
            .as_map()
            .ok()
            .unwrap()
            .into_iter()
            .map(|(key, _)| key.as_string().ok().unwrap())
            .collect()
    };

    // Overwriting keeps the key's position; new keys append.
    assert_eq!(
        keys(&original.set("b", original.create_int(9))),
        ["a", "b", "c"]
    );
    assert_eq!(
        keys(&original.set("d", original.create_int(4))),
        ["a", "b", "c", "d"]
    );
    // Removal shifts the remaining entries without reordering.
    assert_eq!(keys(&original.remove("b")), ["a", "c"]);
}

#[test]
fn get_or_empty_and_update_handle_missing_fields() {
    let value = dynamic(json!({ "a": 1 }));

    assert!(value.get_or_empty("missing").is_null());
    assert!(value.get("missing").is_error());
    assert_eq!(
        value
            .get("missing")
            .error_message()
            .unwrap(),
        "Missing field 'missing'"
    );

    // update on a missing field is a no-op.
    let untouched = value.update("missing", |field| field.create_int(9));
    assert_eq!(untouched, value);
}

#[test]
fn readers_report_kind_mismatches() {
    let value = dynamic(json!({ "name": "Steve" }));

    let message = value.as_long().error_message().unwrap().to_owned();
    assert!(message.starts_with("Not a number:"), "{message}");

    let message = value
        .get("name")
        .ok()
        .unwrap()
        .as_boolean()
        .error_message()
        .unwrap()
        .to_owned();
    assert!(message.starts_with("Not a boolean:"), "{message}");

    let message = dynamic(json!(5)).as_map().error_message().unwrap().to_owned();
    assert!(message.starts_with("Not a map:"), "{message}");
}

#[test]
fn numeric_readers_truncate_like_their_width() {
    let value = dynamic(json!(3.9));

    assert_eq!(value.as_long().ok(), Some(3));
    assert_eq!(value.as_int().ok(), Some(3));
    assert_eq!(value.as_double().ok(), Some(3.9));
}

#[test]
fn merge_operations_are_copy_on_write() {
    let ops = JsonOps;

    let list = json!([1, 2]);
    let merged = ops.merge_to_list(&list, json!(3)).ok().unwrap();
    assert_eq!(list, json!([1, 2]));
    assert_eq!(merged, json!([1, 2, 3]));

    let map = json!({ "a": 1 });
    let merged = ops
        .merge_to_map(&map, json!("b"), json!(2))
        .ok()
        .unwrap();
    assert_eq!(map, json!({ "a": 1 }));
    assert_eq!(merged, json!({ "a": 1, "b": 2 }));

    let combined = ops
        .merge_maps(&map, &json!({ "c": 3 }))
        .ok()
        .unwrap();
    assert_eq!(combined, json!({ "a": 1, "c": 3 }));
}

#[test]
fn non_string_map_keys_are_dropped() {
    let ops = JsonOps;

    let map = ops.create_map(
        vec![
            (json!("kept"), json!(1)),
            (json!(null), json!(2)),
            (json!(3), json!(3)),
        ]
        .into_iter(),
    );
    assert_eq!(map, json!({ "kept": 1 }));

    let result = ops.merge_to_map(&json!({}), json!(1), json!(2));
    assert!(result.is_error());
    // The untouched map survives as the partial.
    assert_eq!(result.result_or_partial(|_| {}), json!({}));
}

use datafix::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn dynamic(value: serde_json::Value) -> Dynamic<JsonOps> {
    Dynamic::new(JsonOps, value)
}

fn typed(value: serde_json::Value) -> Typed<JsonOps> {
    Typed::new(&DataType::Passthrough, &dynamic(value))
        .ok()
        .expect("passthrough always reads")
}

fn apply(rule: &BoxedRule<JsonOps>, value: serde_json::Value) -> Option<serde_json::Value> {
    rule.apply(&typed(value), &FixContext::new())
        .map(|output| output.encode().into_value())
}

#[test]
fn rename_keeps_position_and_skips_missing() {
    let rule = rules::rename_field(JsonOps, "playerName", "name");

    let output = apply(&rule, json!({ "playerName": "Alice", "level": 10 })).unwrap();
    assert_eq!(output, json!({ "name": "Alice", "level": 10 }));
    let keys: Vec<&str> = output.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["name", "level"]);

    // Missing field: the rule still matches, as a no-op.
    let untouched = apply(&rule, json!({ "level": 10 })).unwrap();
    assert_eq!(untouched, json!({ "level": 10 }));
}

#[test]
fn add_only_fills_missing_fields() {
    let rule = rules::add_field(JsonOps, "score", json!(0));

    assert_eq!(
        apply(&rule, json!({ "name": "A" })).unwrap(),
        json!({ "name": "A", "score": 0 })
    );
    assert_eq!(
        apply(&rule, json!({ "score": 7 })).unwrap(),
        json!({ "score": 7 })
    );
}

#[test]
fn set_overwrites_unconditionally() {
    let rule = rules::set_field(JsonOps, "version", json!(2));

    assert_eq!(
        apply(&rule, json!({ "version": 1 })).unwrap(),
        json!({ "version": 2 })
    );
    assert_eq!(apply(&rule, json!({})).unwrap(), json!({ "version": 2 }));
}

#[test]
fn transform_applies_only_when_present() {
    let rule = rules::transform_field(JsonOps, "score", |score| {
        let doubled = score.as_long().unwrap_or(0) * 2;
        score.create_long(doubled)
    });

    assert_eq!(
        apply(&rule, json!({ "score": 21 })).unwrap(),
        json!({ "score": 42 })
    );
    assert_eq!(apply(&rule, json!({})).unwrap(), json!({}));
}

#[test]
fn bulk_rename_and_remove() {
    let rule = rules::seq_all(vec![
        rules::rename_fields(JsonOps, [("a", "x"), ("b", "y")]),
        rules::remove_fields(JsonOps, &["c", "d"]),
    ]);

    assert_eq!(
        apply(&rule, json!({ "a": 1, "b": 2, "c": 3, "keep": 4 })).unwrap(),
        json!({ "x": 1, "y": 2, "keep": 4 })
    );
}

#[test]
fn batch_fuses_field_edits() {
    let rule = rules::batch(JsonOps, |b| {
        b.rename("playerName", "name")
            .rename("xp", "experience")
            .remove("deprecated")
            .set("version", json!(2))
    });

    let output = apply(
        &rule,
        json!({ "playerName": "Steve", "xp": 1500, "oldHealth": 20, "deprecated": true }),
    )
    .unwrap();

    assert_eq!(
        output,
        json!({ "name": "Steve", "experience": 1500, "oldHealth": 20, "version": 2 })
    );
}

#[test]
fn batch_is_one_rule_application() {
    let doc = TypeReference::new("doc");
    let batched = rules::batch(JsonOps, |b| {
        b.rename("playerName", "name")
            .rename("xp", "experience")
            .remove("deprecated")
            .set("version", json!(2))
    });
    let sequential = rules::seq_all(vec![
        rules::rename_field(JsonOps, "playerName", "name"),
        rules::rename_field(JsonOps, "xp", "experience"),
        rules::remove_field(JsonOps, "deprecated"),
        rules::set_field(JsonOps, "version", json!(2)),
    ]);

    let input = json!({ "playerName": "Steve", "xp": 1500, "deprecated": true });

    let count_applications = |rule: BoxedRule<JsonOps>| {
        let fixer = DataFixerBuilder::new(DataVersion::new(2))
            .add_fix(
                doc.clone(),
                RuleFix::new("fix", DataVersion::new(1), DataVersion::new(2), rule),
            )
            .build();
        let ctx = FixContext::recording();
        let output = fixer
            .update_with(
                &doc,
                dynamic(input.clone()),
                DataVersion::new(1),
                DataVersion::new(2),
                &ctx,
            )
            .unwrap();
        let report = ctx.report().unwrap();
        (output, report.fix_executions[0].rule_applications.len())
    };

    let (batched_output, batched_count) = count_applications(batched);
    let (sequential_output, sequential_count) = count_applications(sequential);

    // Same result, one cycle instead of four.
    assert_eq!(batched_output, sequential_output);
    assert_eq!(batched_count, 1);
    assert_eq!(sequential_count, 4);
}

#[test]
fn batch_matches_sequential_application_with_paths() {
    let batched = rules::batch(JsonOps, |b| {
        b.move_field("x", "position.x")
            .copy_field("name", "meta.label")
            .group("scores", &["wins", "losses"])
            .when_equals("version", 1, |d| d.set("version", d.create_int(2)))
    });
    let sequential = rules::seq_all(vec![
        rules::move_field(JsonOps, "x", "position.x"),
        rules::copy_field(JsonOps, "name", "meta.label"),
        rules::group_fields(JsonOps, "scores", &["wins", "losses"]),
        rules::when_field_equals(JsonOps, "version", 1, |d| {
            d.set("version", d.create_int(2))
        }),
    ]);

    let input = json!({
        "name": "Steve",
        "x": 100.5,
        "position": { "y": 64.0 },
        "wins": 3,
        "losses": 1,
        "version": 1
    });

    assert_eq!(
        apply(&batched, input.clone()).unwrap(),
        apply(&sequential, input).unwrap()
    );
}

#[test]
fn move_field_appends_to_the_target_map() {
    let rule = rules::move_field(JsonOps, "x", "position.x");

    let output = apply(
        &rule,
        json!({ "name": "Steve", "x": 100.5, "position": { "y": 64.0 } }),
    )
    .unwrap();

    assert_eq!(
        output,
        json!({ "name": "Steve", "position": { "y": 64.0, "x": 100.5 } })
    );
    // Entry order: the original order plus the moved field appended.
    let keys: Vec<&str> = output["position"].as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["y", "x"]);

    assert_eq!(
        apply(&rule, json!({ "name": "Steve" })).unwrap(),
        json!({ "name": "Steve" })
    );
}

#[test]
fn group_then_flatten_round_trips() {
    let rule = rules::seq(vec![
        rules::group_fields(JsonOps, "position", &["x", "y", "z"]),
        rules::flatten_field(JsonOps, "position"),
    ]);

    let input = json!({ "x": 1, "y": 2, "z": 3, "name": "k" });
    let output = apply(&rule, input.clone()).unwrap();

    // Entries are preserved, ignoring order.
    assert_eq!(output, input);
}

#[test]
fn grouping_collects_sources_in_order() {
    let rule = rules::group_fields(JsonOps, "position", &["x", "y"]);

    let output = apply(&rule, json!({ "y": 2, "name": "k", "x": 1 })).unwrap();
    assert_eq!(output, json!({ "name": "k", "position": { "x": 1, "y": 2 } }));
}

#[test]
fn single_cycle_conditional() {
    let rule = rules::when_field_equals(JsonOps, "version", 1, |d| {
        d.set("version", d.create_int(2))
            .set("migrated", d.create_boolean(true))
    });

    assert_eq!(
        apply(&rule, json!({ "version": 1 })).unwrap(),
        json!({ "version": 2, "migrated": true })
    );
    assert_eq!(
        apply(&rule, json!({ "version": 2 })).unwrap(),
        json!({ "version": 2 })
    );
    // Kind mismatch compares as not-equal, never raises.
    assert_eq!(
        apply(&rule, json!({ "version": "1" })).unwrap(),
        json!({ "version": "1" })
    );
}

#[test]
fn conditional_wrappers_gate_their_rule() {
    let upgrade = rules::set_field(JsonOps, "upgraded", json!(true));

    let when_exists = rules::if_field_exists(JsonOps, "legacy", upgrade.clone());
    assert_eq!(
        apply(&when_exists, json!({ "legacy": 1 })).unwrap(),
        json!({ "legacy": 1, "upgraded": true })
    );
    assert_eq!(apply(&when_exists, json!({})).unwrap(), json!({}));

    let when_missing = rules::if_field_missing(JsonOps, "legacy", upgrade.clone());
    assert_eq!(
        apply(&when_missing, json!({})).unwrap(),
        json!({ "upgraded": true })
    );

    let when_equals = rules::if_field_equals(JsonOps, "mode", "classic", upgrade);
    assert_eq!(
        apply(&when_equals, json!({ "mode": "classic" })).unwrap(),
        json!({ "mode": "classic", "upgraded": true })
    );
    assert_eq!(
        apply(&when_equals, json!({ "mode": "modern" })).unwrap(),
        json!({ "mode": "modern" })
    );
}

#[test]
fn predicate_conditional_transform() {
    let rule = rules::conditional_transform(
        JsonOps,
        |d| d.get("hp").ok().and_then(|hp| hp.as_long().ok()).is_some_and(|hp| hp < 0),
        |d| d.set("hp", d.create_int(0)),
    );

    assert_eq!(
        apply(&rule, json!({ "hp": -5 })).unwrap(),
        json!({ "hp": 0 })
    );
    assert_eq!(
        apply(&rule, json!({ "hp": 10 })).unwrap(),
        json!({ "hp": 10 })
    );
}

#[test]
fn path_rules_reach_nested_fields() {
    let transform = rules::transform_field_at(JsonOps, "stats.hp", |hp| {
        let value = hp.as_long().unwrap_or(0) + 1;
        hp.create_long(value)
    });
    assert_eq!(
        apply(&transform, json!({ "stats": { "hp": 9 } })).unwrap(),
        json!({ "stats": { "hp": 10 } })
    );

    let rename = rules::rename_field_at(JsonOps, "stats.hp", "health");
    let renamed = apply(&rename, json!({ "stats": { "hp": 9, "mp": 4 } })).unwrap();
    assert_eq!(renamed, json!({ "stats": { "health": 9, "mp": 4 } }));
    let keys: Vec<&str> = renamed["stats"].as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["health", "mp"]);

    let remove = rules::remove_field_at(JsonOps, "stats.mp");
    assert_eq!(
        apply(&remove, json!({ "stats": { "hp": 9, "mp": 4 } })).unwrap(),
        json!({ "stats": { "hp": 9 } })
    );

    let add = rules::add_field_at(JsonOps, "meta.created", json!("2024-01-01"));
    assert_eq!(
        apply(&add, json!({ "name": "x" })).unwrap(),
        json!({ "name": "x", "meta": { "created": "2024-01-01" } })
    );

    let indexed = rules::transform_field_at(JsonOps, "slots.1.count", |count| {
        let value = count.as_long().unwrap_or(0) * 10;
        count.create_long(value)
    });
    assert_eq!(
        apply(
            &indexed,
            json!({ "slots": [{ "count": 1 }, { "count": 2 }] })
        )
        .unwrap(),
        json!({ "slots": [{ "count": 1 }, { "count": 20 }] })
    );
}

#[test]
fn copy_keeps_the_source() {
    let rule = rules::copy_field(JsonOps, "name", "meta.label");

    assert_eq!(
        apply(&rule, json!({ "name": "Steve" })).unwrap(),
        json!({ "name": "Steve", "meta": { "label": "Steve" } })
    );
}

#[test]
fn seq_stops_at_the_first_non_match() {
    // `one` over a leaf has no children, so it never matches.
    let failing = rules::one(JsonOps, rules::noop());
    let marking = rules::set_field(JsonOps, "seen", json!(true));

    let strict = rules::seq(vec![failing.clone(), marking.clone()]);
    assert_eq!(apply(&strict, json!(5)), None);

    let forgiving = rules::seq_all(vec![failing.clone(), marking.clone()]);
    assert_eq!(apply(&forgiving, json!({})).unwrap(), json!({ "seen": true }));

    let first_match = rules::choice(vec![failing, marking]);
    assert_eq!(
        apply(&first_match, json!({})).unwrap(),
        json!({ "seen": true })
    );
}

#[test]
fn try_once_turns_misses_into_no_ops() {
    let failing = rules::one(JsonOps, rules::noop());

    assert_eq!(apply(&failing, json!(5)), None);
    assert_eq!(
        apply(&rules::try_once(failing), json!(5)).unwrap(),
        json!(5)
    );
}

#[test]
fn check_once_is_transparent() {
    let rule = rules::check_once(rules::set_field(JsonOps, "v", json!(1)));
    assert_eq!(apply(&rule, json!({})).unwrap(), json!({ "v": 1 }));
}

#[test]
fn if_type_gates_on_the_input_shape() {
    let record = DataType::record([("name", DataType::String)]);
    let rule = rules::if_type(record.clone(), rules::set_field(JsonOps, "tagged", json!(true)));

    let input = dynamic(json!({ "name": "x" }));
    let conforming = Typed::new(&record, &input).ok().unwrap();
    assert!(rule.apply(&conforming, &FixContext::new()).is_some());

    // Same carrier, read as passthrough: the gate rejects it.
    assert_eq!(apply(&rule, json!({ "name": "x" })), None);
}

#[test]
fn everywhere_rewrites_all_levels() {
    let rule = rules::everywhere(JsonOps, rules::rename_field(JsonOps, "old", "new"));

    let output = apply(
        &rule,
        json!({ "old": 1, "nested": { "old": 2, "deeper": [{ "old": 3 }] } }),
    )
    .unwrap();

    assert_eq!(
        output,
        json!({ "new": 1, "nested": { "new": 2, "deeper": [{ "new": 3 }] } })
    );
}

#[test]
fn top_down_and_bottom_up_visit_every_node() {
    let input = json!({ "count": 1, "child": { "count": 2 } });
    let bump = rules::transform_field(JsonOps, "count", |count| {
        let value = count.as_long().unwrap_or(0) + 1;
        count.create_long(value)
    });

    let expected = json!({ "count": 2, "child": { "count": 3 } });
    assert_eq!(
        apply(&rules::top_down(JsonOps, bump.clone()), input.clone()).unwrap(),
        expected
    );
    assert_eq!(
        apply(&rules::bottom_up(JsonOps, bump), input).unwrap(),
        expected
    );
}

#[test]
fn all_requires_every_child_to_match() {
    let mark = rules::set_field(JsonOps, "seen", json!(true));

    assert_eq!(
        apply(
            &rules::all(JsonOps, mark.clone()),
            json!({ "a": {}, "b": {} })
        )
        .unwrap(),
        json!({ "a": { "seen": true }, "b": { "seen": true } })
    );

    // A child that cannot match fails the whole traversal.
    let failing = rules::one(JsonOps, rules::noop());
    assert_eq!(apply(&rules::all(JsonOps, failing), json!({ "a": 1 })), None);

    // No children: vacuously matches.
    assert_eq!(apply(&rules::all(JsonOps, mark), json!(7)).unwrap(), json!(7));
}

#[test]
fn one_rewrites_only_the_first_matching_child() {
    let mark = rules::set_field(JsonOps, "seen", json!(true));

    assert_eq!(
        apply(&rules::one(JsonOps, mark.clone()), json!({ "a": {}, "b": {} })).unwrap(),
        json!({ "a": { "seen": true }, "b": {} })
    );
    assert_eq!(apply(&rules::one(JsonOps, mark), json!(7)), None);
}

#[test]
fn logged_rules_pass_their_result_through() {
    let rule = rules::log("renaming", rules::rename_field(JsonOps, "a", "b"));
    assert_eq!(apply(&rule, json!({ "a": 1 })).unwrap(), json!({ "b": 1 }));
}

#[test]
fn noop_is_the_identity() {
    assert_eq!(
        apply(&rules::noop(), json!({ "a": 1 })).unwrap(),
        json!({ "a": 1 })
    );
}

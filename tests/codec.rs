use datafix::codec::{
    self,
    Codec,
    DOUBLE,
    INT,
    LONG,
    MapCodec,
    STRING,
    int_range,
    record,
};
use datafix::prelude::*;
use itertools::Either;
use pretty_assertions::assert_eq;
use serde_json::json;

#[derive(Clone, PartialEq, Debug)]
struct Settings {
    name: String,
    timeout: i32,
}

fn settings_codec() -> impl Codec<Value = Settings> {
    record(
        (
            STRING
                .field_of("name")
                .for_getter(|s: &Settings| s.name.clone()),
            INT.optional_field_of_or("timeout", 30)
                .for_getter(|s: &Settings| s.timeout),
        ),
        |name, timeout| Settings { name, timeout },
    )
    .codec()
}

#[test]
fn either_prefers_the_left_codec() {
    let codec = codec::either(STRING, INT);

    assert_eq!(
        codec.parse(JsonOps, &json!("hello")).ok(),
        Some(Either::Left("hello".to_owned()))
    );
    assert_eq!(codec.parse(JsonOps, &json!(42)).ok(), Some(Either::Right(42)));

    let result = codec.parse(JsonOps, &json!(null));
    assert!(result.is_error());
}

#[test]
fn optional_field_defaults_when_missing() {
    let codec = settings_codec();

    assert_eq!(
        codec.parse(JsonOps, &json!({ "name": "t" })).ok(),
        Some(Settings {
            name: "t".to_owned(),
            timeout: 30,
        })
    );
    assert_eq!(
        codec.parse(JsonOps, &json!({ "name": "t", "timeout": 60 })).ok(),
        Some(Settings {
            name: "t".to_owned(),
            timeout: 60,
        })
    );
}

#[test]
fn default_values_are_omitted_on_encode() {
    let codec = settings_codec();

    let defaulted = Settings {
        name: "t".to_owned(),
        timeout: 30,
    };
    assert_eq!(
        codec.encode_start(JsonOps, &defaulted).ok(),
        Some(json!({ "name": "t" }))
    );

    let explicit = Settings {
        name: "t".to_owned(),
        timeout: 60,
    };
    assert_eq!(
        codec.encode_start(JsonOps, &explicit).ok(),
        Some(json!({ "name": "t", "timeout": 60 }))
    );
}

#[test]
fn missing_required_fields_are_reported() {
    let codec = settings_codec();

    let result = codec.parse(JsonOps, &json!({ "timeout": 60 }));
    let message = result.error_message().expect("field is required");
    assert!(message.starts_with("Missing field 'name'"), "{message}");
}

#[derive(Clone, PartialEq, Debug)]
struct Stats {
    level: i64,
    health: f64,
    tags: Vec<String>,
    nickname: Option<String>,
}

#[test]
fn record_codecs_round_trip() {
    let codec = record(
        (
            LONG.field_of("level").for_getter(|s: &Stats| s.level),
            DOUBLE.field_of("health").for_getter(|s: &Stats| s.health),
            STRING
                .list_of()
                .field_of("tags")
                .for_getter(|s: &Stats| s.tags.clone()),
            STRING
                .optional_field_of("nickname")
                .for_getter(|s: &Stats| s.nickname.clone()),
        ),
        |level, health, tags, nickname| Stats {
            level,
            health,
            tags,
            nickname,
        },
    )
    .codec();

    let stats = Stats {
        level: 9,
        health: 19.5,
        tags: vec!["fast".to_owned(), "quiet".to_owned()],
        nickname: None,
    };

    let encoded = codec.encode_start(JsonOps, &stats).ok().unwrap();
    assert_eq!(
        encoded,
        json!({ "level": 9, "health": 19.5, "tags": ["fast", "quiet"] })
    );
    assert_eq!(codec.parse(JsonOps, &encoded).ok(), Some(stats));
}

#[test]
fn failing_fields_accumulate_messages() {
    let codec = record(
        (
            STRING.field_of("name").for_getter(|s: &Settings| s.name.clone()),
            INT.field_of("timeout").for_getter(|s: &Settings| s.timeout),
        ),
        |name, timeout| Settings { name, timeout },
    )
    .codec();

    let result = codec.parse(JsonOps, &json!({}));
    let message = result.error_message().unwrap().to_owned();
    assert!(message.contains("Missing field 'name'"), "{message}");
    assert!(message.contains("Missing field 'timeout'"), "{message}");
}

#[test]
fn range_codecs_validate_both_directions() {
    let codec = int_range(0, 10);

    assert_eq!(codec.parse(JsonOps, &json!(5)).ok(), Some(5));

    let too_big = codec.parse(JsonOps, &json!(11));
    assert_eq!(
        too_big.error_message(),
        Some("Value 11 outside of range [0,10]")
    );

    let encoded = codec.encode_start(JsonOps, &-1);
    assert_eq!(
        encoded.error_message(),
        Some("Value -1 outside of range [0,10]")
    );
}

#[test]
fn xmap_round_trips_through_the_mapping() {
    let codec = LONG.xmap(|millis| millis * 1000, |seconds: &i64| seconds / 1000);

    assert_eq!(codec.parse(JsonOps, &json!(3)).ok(), Some(3000));
    assert_eq!(codec.encode_start(JsonOps, &3000).ok(), Some(json!(3)));
}

#[test]
fn flat_xmap_rejects_bad_values() {
    let codec = STRING.flat_xmap(
        |raw| match raw.parse::<i64>() {
            Ok(value) => DataResult::success(value),
            Err(_) => DataResult::error(format!("Not a number: {raw}")),
        },
        |value: &i64| DataResult::success(value.to_string()),
    );

    assert_eq!(codec.parse(JsonOps, &json!("17")).ok(), Some(17));
    assert!(codec.parse(JsonOps, &json!("seventeen")).is_error());
}

#[test]
fn or_else_falls_back_for_decode_and_encode() {
    let codec = int_range(0, 10).or_else(INT);

    // In range: the first codec handles it.
    assert_eq!(codec.parse(JsonOps, &json!(5)).ok(), Some(5));
    // Out of range: the fallback accepts it.
    assert_eq!(codec.parse(JsonOps, &json!(42)).ok(), Some(42));
    assert_eq!(codec.encode_start(JsonOps, &42).ok(), Some(json!(42)));
}

#[test]
fn list_decoding_keeps_a_partial_on_bad_elements() {
    let codec = LONG.list_of();

    assert_eq!(
        codec.parse(JsonOps, &json!([1, 2, 3])).ok(),
        Some(vec![1, 2, 3])
    );

    let mixed = codec.parse(JsonOps, &json!([1, "two", 3]));
    assert!(mixed.is_error());
    let salvaged = mixed.result_or_partial(|_| {});
    assert_eq!(salvaged, vec![1, 3]);
}

#[test]
fn optional_codecs_treat_null_as_absent() {
    let codec = LONG.optional_of();

    assert_eq!(codec.parse(JsonOps, &json!(null)).ok(), Some(None));
    assert_eq!(codec.parse(JsonOps, &json!(5)).ok(), Some(Some(5)));
    assert_eq!(codec.encode_start(JsonOps, &None).ok(), Some(json!(null)));
    assert_eq!(codec.encode_start(JsonOps, &Some(5)).ok(), Some(json!(5)));
}

#[test]
fn pairs_thread_the_remainder() {
    let codec = codec::pair(
        STRING.field_of("name").codec(),
        LONG.field_of("level").codec(),
    );

    let decoded = codec
        .parse(JsonOps, &json!({ "name": "Steve", "level": 9 }))
        .ok();
    assert_eq!(decoded, Some(("Steve".to_owned(), 9)));

    let encoded = codec
        .encode_start(JsonOps, &("Steve".to_owned(), 9))
        .ok();
    assert_eq!(encoded, Some(json!({ "name": "Steve", "level": 9 })));
}

#[test]
fn error_context_prefixes_messages() {
    let codec = LONG.field_of("level").codec().with_error_context("player");

    let result = codec.parse(JsonOps, &json!({}));
    let message = result.error_message().unwrap();
    assert!(message.starts_with("player: Missing field 'level'"), "{message}");
}

#[test]
fn point_codecs_inject_constants() {
    let codec = record(
        (
            STRING.field_of("name").for_getter(|s: &Settings| s.name.clone()),
            codec::point(30).for_getter(|s: &Settings| s.timeout),
        ),
        |name, timeout| Settings { name, timeout },
    )
    .codec();

    assert_eq!(
        codec.parse(JsonOps, &json!({ "name": "t" })).ok(),
        Some(Settings {
            name: "t".to_owned(),
            timeout: 30,
        })
    );
    assert_eq!(
        codec
            .encode_start(JsonOps, &Settings {
                name: "t".to_owned(),
                timeout: 99,
            })
            .ok(),
        Some(json!({ "name": "t" }))
    );
}

#[test]
fn codecs_work_across_backends() {
    let codec = settings_codec();
    let settings = Settings {
        name: "t".to_owned(),
        timeout: 45,
    };

    let node = codec.encode_start(NodeOps, &settings).ok().unwrap();
    assert_eq!(codec.parse(NodeOps, &node).ok(), Some(settings));
}

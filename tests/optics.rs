use datafix::{
    optics::{
        Affine,
        Finder,
        Getter,
        Iso,
        Lens,
        Prism,
        Traversal,
    },
    prelude::*,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn dynamic(value: serde_json::Value) -> Dynamic<JsonOps> {
    Dynamic::new(JsonOps, value)
}

#[derive(Clone, PartialEq, Debug)]
struct Player {
    name: String,
    score: i64,
}

fn score_lens() -> Lens<Player, i64> {
    Lens::new(
        "score",
        |player: &Player| player.score,
        |player: &Player, score| Player {
            score,
            ..player.clone()
        },
    )
}

#[test]
fn lens_laws_hold() {
    let lens = score_lens();
    let player = Player {
        name: "Alice".to_owned(),
        score: 10,
    };

    // get(set(s, a)) == a
    assert_eq!(lens.get(&lens.set(&player, 99)), 99);
    // set(s, get(s)) == s
    assert_eq!(lens.set(&player, lens.get(&player)), player);
    // set(set(s, a), b) == set(s, b)
    assert_eq!(
        lens.set(&lens.set(&player, 1), 2),
        lens.set(&player, 2)
    );
}

#[test]
fn lens_modify_and_getter() {
    let lens = score_lens();
    let player = Player {
        name: "Alice".to_owned(),
        score: 10,
    };

    assert_eq!(lens.modify(&player, |score| score * 2).score, 20);
    assert_eq!(lens.to_getter().get(&player), 10);
}

#[derive(Clone, PartialEq, Debug)]
enum Save {
    Local { slot: i64 },
    Cloud { url: String },
}

fn local_prism() -> Prism<Save, i64> {
    Prism::new(
        "local",
        |save: &Save| match save {
            Save::Local { slot } => Some(*slot),
            Save::Cloud { .. } => None,
        },
        |slot: &i64| Save::Local { slot: *slot },
    )
}

#[test]
fn prism_laws_hold() {
    let prism = local_prism();

    // get_option(reverse_get(a)) == Some(a)
    assert_eq!(prism.get_option(&prism.reverse_get(&3)), Some(3));

    // If get_option(s) == Some(a) then reverse_get(a) == s.
    let local = Save::Local { slot: 7 };
    let focused = prism.get_option(&local).unwrap();
    assert_eq!(prism.reverse_get(&focused), local);

    let cloud = Save::Cloud {
        url: "s3://saves/1".to_owned(),
    };
    assert_eq!(prism.get_option(&cloud), None);
}

#[test]
fn iso_round_trips_both_ways() {
    let iso: Iso<(i64, i64), Player> = Iso::new(
        "pair_player",
        |&(score, _): &(i64, i64)| Player {
            name: String::new(),
            score,
        },
        |player: &Player| (player.score, 0),
    );

    let pair = (5, 0);
    assert_eq!(iso.from(&iso.to(&pair)), pair);

    let player = Player {
        name: String::new(),
        score: 5,
    };
    assert_eq!(iso.to(&iso.from(&player)), player);

    // reverse swaps the directions.
    assert_eq!(iso.reverse().to(&player), pair);
}

fn first_affine() -> Affine<Vec<i64>, i64> {
    Affine::new(
        "first",
        |items: &Vec<i64>| items.first().copied(),
        |items: &Vec<i64>, value| {
            let mut items = items.clone();
            if let Some(first) = items.first_mut() {
                *first = value;
            }
            items
        },
    )
}

#[test]
fn affine_writes_only_where_the_location_exists() {
    let affine = first_affine();

    // get_option(set(s, a)) == Some(a) when the location exists.
    assert_eq!(affine.get_option(&affine.set(&vec![1, 2], 9)), Some(9));
    // set on a missing location is a no-op.
    assert_eq!(affine.set(&Vec::new(), 9), Vec::<i64>::new());
    assert_eq!(affine.modify(&vec![1, 2], |v| v + 1), vec![2, 2]);
    assert_eq!(affine.modify(&Vec::new(), |v| v + 1), Vec::<i64>::new());
}

#[test]
fn traversal_with_identity_is_identity() {
    let traversal: Traversal<Vec<i64>, i64> = Traversal::new(
        "items",
        |items: &Vec<i64>, f: &mut dyn FnMut(i64) -> i64| {
            items.iter().map(|&item| f(item)).collect()
        },
    );

    let items = vec![1, 2, 3];
    assert_eq!(traversal.modify(&items, |item| item), items);
    assert_eq!(traversal.modify(&items, |item| item * 2), vec![2, 4, 6]);
}

#[test]
fn composition_joins_ids_and_behaviour() {
    let outer: Lens<Vec<Player>, Player> = Lens::new(
        "leader",
        |players: &Vec<Player>| players[0].clone(),
        |players: &Vec<Player>, leader| {
            let mut players = players.clone();
            players[0] = leader;
            players
        },
    );
    let composed = outer.then(&score_lens());

    assert_eq!(composed.id(), "leader.score");

    let team = vec![
        Player {
            name: "Alice".to_owned(),
            score: 10,
        },
        Player {
            name: "Bob".to_owned(),
            score: 4,
        },
    ];
    assert_eq!(composed.get(&team), 10);
    assert_eq!(composed.set(&team, 11)[0].score, 11);
    assert_eq!(composed.set(&team, 11)[1].score, 4);
}

#[test]
fn weakened_optics_compose_at_the_affine_level() {
    let leader: Lens<Vec<Save>, Save> = Lens::new(
        "leader",
        |saves: &Vec<Save>| saves[0].clone(),
        |saves: &Vec<Save>, save| {
            let mut saves = saves.clone();
            saves[0] = save;
            saves
        },
    );
    let composed = leader.then_prism(&local_prism());
    assert_eq!(composed.id(), "leader.local");

    let saves = vec![Save::Local { slot: 1 }];
    assert_eq!(composed.get_option(&saves), Some(1));
    assert_eq!(
        composed.set(&saves, 2),
        vec![Save::Local { slot: 2 }]
    );

    // The variant does not match: writing is a no-op.
    let cloud = vec![Save::Cloud {
        url: "s3://saves/1".to_owned(),
    }];
    assert_eq!(composed.get_option(&cloud), None);
    assert_eq!(composed.set(&cloud, 2), cloud);
}

#[test]
fn getters_compose() {
    let length: Getter<String, i64> = Getter::new("len", |s: &String| s.len() as i64);
    let double: Getter<i64, i64> = Getter::new("double", |&n: &i64| n * 2);

    let composed = length.then(&double);
    assert_eq!(composed.id(), "len.double");
    assert_eq!(composed.get(&"four".to_owned()), 8);
}

#[test]
fn finder_locates_nested_children() {
    let finder = Finder::field("stats").then(&Finder::field("hp"));
    let root = dynamic(json!({ "stats": { "hp": 20 } }));

    assert_eq!(finder.id(), "stats.hp");
    let found = finder.find(&root).unwrap();
    assert_eq!(found.value(), &json!(20));

    assert!(finder.find(&dynamic(json!({ "stats": {} }))).is_none());
    assert!(finder.find(&dynamic(json!(42))).is_none());
}

#[test]
fn finder_indexes_into_lists() {
    let finder = Finder::field("slots")
        .then(&Finder::index(1))
        .then(&Finder::field("count"));
    let root = dynamic(json!({ "slots": [{ "count": 1 }, { "count": 2 }] }));

    assert_eq!(finder.id(), "slots.1.count");
    assert_eq!(finder.find(&root).unwrap().value(), &json!(2));
    assert!(
        Finder::field("slots")
            .then(&Finder::index(5))
            .find(&root)
            .is_none()
    );
}

#[test]
fn finder_identity_returns_its_argument() {
    let root = dynamic(json!({ "a": 1 }));
    assert_eq!(Finder::identity().find(&root), Some(root.clone()));
    assert_eq!(Finder::identity().then(&Finder::field("a")).id(), "a");
}

#[test]
fn finder_set_rebuilds_copy_on_write() {
    let finder = Finder::field("stats").then(&Finder::field("hp"));
    let root = dynamic(json!({ "stats": { "hp": 20, "mp": 5 } }));

    let updated = finder.set(&root, root.create_int(25));
    assert_eq!(
        updated.value(),
        &json!({ "stats": { "hp": 25, "mp": 5 } })
    );
    // The original is untouched.
    assert_eq!(root.value(), &json!({ "stats": { "hp": 20, "mp": 5 } }));

    // Missing location: plain set is a no-op.
    let missing = Finder::field("meta").then(&Finder::field("tag"));
    assert_eq!(missing.set(&root, root.create_int(1)), root);

    // set_or_create builds the intermediate maps.
    let created = missing.set_or_create(&root, root.create_int(1));
    assert_eq!(
        created.value(),
        &json!({ "stats": { "hp": 20, "mp": 5 }, "meta": { "tag": 1 } })
    );
}

#[test]
fn finder_set_replaces_list_elements() {
    let finder = Finder::field("slots").then(&Finder::index(0));
    let root = dynamic(json!({ "slots": [1, 2] }));

    let updated = finder.set(&root, root.create_int(9));
    assert_eq!(updated.value(), &json!({ "slots": [9, 2] }));
}

#[test]
fn finder_update_and_remove() {
    let finder = Finder::field("stats").then(&Finder::field("hp"));
    let root = dynamic(json!({ "stats": { "hp": 20, "mp": 5 } }));

    let updated = finder.update(&root, |hp| {
        let value = hp.as_long().unwrap_or(0) + 1;
        hp.create_long(value)
    });
    assert_eq!(
        updated.value(),
        &json!({ "stats": { "hp": 21, "mp": 5 } })
    );

    let removed = finder.remove(&root);
    assert_eq!(removed.value(), &json!({ "stats": { "mp": 5 } }));

    let index_finder = Finder::field("slots").then(&Finder::index(0));
    let list_root = dynamic(json!({ "slots": [1, 2] }));
    assert_eq!(
        index_finder.remove(&list_root).value(),
        &json!({ "slots": [2] })
    );
}

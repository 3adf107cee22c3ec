//! Arrays and maps: block decoding, accumulator shapes, guards

mod common;

use {
	avro_bind::{
		build_reader,
		types::{IntWidth, MapKind, SequenceKind, TypeSpec, TypeStore},
		DeError, ReaderBuilder, Schema, Value,
	},
	pretty_assertions::assert_eq,
};

fn i64_spec() -> TypeSpec {
	TypeSpec::Integer {
		width: IntWidth::W64,
		signed: true,
	}
}

#[test]
fn array_of_longs() {
	let schema: Schema = r#"{"type": "array", "items": "long"}"#.parse().unwrap();
	let mut types = TypeStore::new();
	let long = types.insert(i64_spec());
	let list = types.insert(TypeSpec::Sequence {
		item: long,
		kind: SequenceKind::List,
	});
	let reader = build_reader(&mut types, list, &schema).unwrap();

	// count 3, items {0, 1, 2}, terminator
	let datum = common::single_block(&[common::long(0), common::long(1), common::long(2)]);
	assert_eq!(
		reader.read_slice(&datum).unwrap(),
		Value::Array(vec![Value::I64(0), Value::I64(1), Value::I64(2)])
	);
}

#[test]
fn empty_array() {
	let schema: Schema = r#"{"type": "array", "items": "long"}"#.parse().unwrap();
	let mut types = TypeStore::new();
	let long = types.insert(i64_spec());
	let list = types.insert(TypeSpec::Sequence {
		item: long,
		kind: SequenceKind::List,
	});
	let reader = build_reader(&mut types, list, &schema).unwrap();
	assert_eq!(
		reader.read_slice(&common::long(0)).unwrap(),
		Value::Array(vec![])
	);
}

#[test]
fn blocks_concatenate() {
	let schema: Schema = r#"{"type": "array", "items": "long"}"#.parse().unwrap();
	let mut types = TypeStore::new();
	let long = types.insert(i64_spec());
	let list = types.insert(TypeSpec::Sequence {
		item: long,
		kind: SequenceKind::List,
	});
	let reader = build_reader(&mut types, list, &schema).unwrap();

	// Two blocks of 1 item each, then the terminator
	let datum = common::datum(&[
		common::long(1),
		common::long(10),
		common::long(1),
		common::long(20),
		common::long(0),
	]);
	assert_eq!(
		reader.read_slice(&datum).unwrap(),
		Value::Array(vec![Value::I64(10), Value::I64(20)])
	);
}

#[test]
fn negative_block_count_carries_a_byte_size() {
	let schema: Schema = r#"{"type": "array", "items": "long"}"#.parse().unwrap();
	let mut types = TypeStore::new();
	let long = types.insert(i64_spec());
	let list = types.insert(TypeSpec::Sequence {
		item: long,
		kind: SequenceKind::List,
	});
	let reader = build_reader(&mut types, list, &schema).unwrap();

	// count -2 means: a byte-size prefix follows (discarded), then 2 items
	let items = common::datum(&[common::long(5), common::long(6)]);
	let datum = common::datum(&[
		common::long(-2),
		common::long(items.len() as i64),
		items,
		common::long(0),
	]);
	assert_eq!(
		reader.read_slice(&datum).unwrap(),
		Value::Array(vec![Value::I64(5), Value::I64(6)])
	);
}

#[test]
fn deque_target_bulk_converts() {
	let schema: Schema = r#"{"type": "array", "items": "long"}"#.parse().unwrap();
	let mut types = TypeStore::new();
	let long = types.insert(i64_spec());
	let deque = types.insert(TypeSpec::Sequence {
		item: long,
		kind: SequenceKind::Deque,
	});
	let reader = build_reader(&mut types, deque, &schema).unwrap();

	let datum = common::single_block(&[common::long(1), common::long(2)]);
	assert_eq!(
		reader.read_slice(&datum).unwrap(),
		Value::Deque(vec![Value::I64(1), Value::I64(2)].into())
	);
}

#[test]
fn map_hashed_and_sorted() {
	let schema: Schema = r#"{"type": "map", "values": "long"}"#.parse().unwrap();
	let mut types = TypeStore::new();
	let long = types.insert(i64_spec());
	let text = types.insert(TypeSpec::Text);
	let hashed = types.insert(TypeSpec::Mapping {
		key: text,
		value: long,
		kind: MapKind::Hashed,
	});
	let sorted = types.insert(TypeSpec::Mapping {
		key: text,
		value: long,
		kind: MapKind::Sorted,
	});

	let datum = common::single_block(&[
		common::datum(&[common::string("b"), common::long(2)]),
		common::datum(&[common::string("a"), common::long(1)]),
	]);

	let reader = build_reader(&mut types, hashed, &schema).unwrap();
	assert_eq!(
		reader.read_slice(&datum).unwrap(),
		Value::Map(
			[
				("a".to_owned(), Value::I64(1)),
				("b".to_owned(), Value::I64(2)),
			]
			.into_iter()
			.collect()
		)
	);

	let reader = build_reader(&mut types, sorted, &schema).unwrap();
	match reader.read_slice(&datum).unwrap() {
		Value::SortedMap(map) => {
			assert_eq!(
				map.keys().collect::<Vec<_>>(),
				vec![&"a".to_owned(), &"b".to_owned()]
			);
		}
		other => panic!("expected a sorted map, got {other:?}"),
	}
}

#[test]
fn uuid_map_keys_decode_through_the_string_case() {
	let schema: Schema = r#"{"type": "map", "values": "long"}"#.parse().unwrap();
	let mut types = TypeStore::new();
	let long = types.insert(i64_spec());
	let uuid = types.insert(TypeSpec::Uuid);
	let map = types.insert(TypeSpec::Mapping {
		key: uuid,
		value: long,
		kind: MapKind::Sorted,
	});
	let reader = build_reader(&mut types, map, &schema).unwrap();

	let key = "00000000-0000-0000-0000-000000000001";
	let datum = common::single_block(&[common::datum(&[common::string(key), common::long(9)])]);
	match reader.read_slice(&datum).unwrap() {
		Value::SortedMap(map) => assert_eq!(map[key], Value::I64(9)),
		other => panic!("expected a sorted map, got {other:?}"),
	}
}

#[test]
fn non_string_map_key_is_rejected_at_build_time() {
	let schema: Schema = r#"{"type": "map", "values": "long"}"#.parse().unwrap();
	let mut types = TypeStore::new();
	let long = types.insert(i64_spec());
	let map = types.insert(TypeSpec::Mapping {
		key: long,
		value: long,
		kind: MapKind::Hashed,
	});
	assert!(matches!(
		build_reader(&mut types, map, &schema).unwrap_err(),
		avro_bind::BuildError::UnsupportedType { .. }
	));
}

#[test]
fn nested_collections() {
	let schema: Schema = r#"{"type": "array", "items": {"type": "array", "items": "long"}}"#
		.parse()
		.unwrap();
	let mut types = TypeStore::new();
	let long = types.insert(i64_spec());
	let inner = types.insert(TypeSpec::Sequence {
		item: long,
		kind: SequenceKind::List,
	});
	let outer = types.insert(TypeSpec::Sequence {
		item: inner,
		kind: SequenceKind::List,
	});
	let reader = build_reader(&mut types, outer, &schema).unwrap();

	let datum = common::single_block(&[
		common::single_block(&[common::long(1)]),
		common::single_block(&[]),
	]);
	assert_eq!(
		reader.read_slice(&datum).unwrap(),
		Value::Array(vec![
			Value::Array(vec![Value::I64(1)]),
			Value::Array(vec![]),
		])
	);
}

#[test]
fn max_seq_size_guards_against_huge_counts() {
	let schema: Schema = r#"{"type": "array", "items": "long"}"#.parse().unwrap();
	let mut types = TypeStore::new();
	let long = types.insert(i64_spec());
	let list = types.insert(TypeSpec::Sequence {
		item: long,
		kind: SequenceKind::List,
	});
	let mut builder = ReaderBuilder::new();
	builder.max_seq_size = 10;
	let reader = builder.build(&mut types, list, &schema).unwrap();

	// The count claims one million items; the guard fires before any
	// attempt to read them
	let datum = common::long(1_000_000);
	assert!(matches!(
		reader.read_slice(&datum).unwrap_err(),
		DeError::Decode(_)
	));
}

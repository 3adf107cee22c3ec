//! Record decoding: member assignment, constructors, unknown fields,
//! self-referential schemas

mod common;

use {
	avro_bind::{
		build_reader,
		types::{
			Constructor, FieldSpec, IntWidth, Parameter, RecordSpec, TypeKey, TypeSpec, TypeStore,
		},
		DeError, Schema, Value,
	},
	pretty_assertions::assert_eq,
};

const POINT_SCHEMA: &str = r#"
{
	"type": "record",
	"name": "test.Point",
	"fields": [
		{ "name": "x", "type": "long" },
		{ "name": "y", "type": "long" }
	]
}
"#;

fn i64_spec() -> TypeSpec {
	TypeSpec::Integer {
		width: IntWidth::W64,
		signed: true,
	}
}

#[test]
fn member_assignment() {
	let schema: Schema = POINT_SCHEMA.parse().unwrap();
	let mut types = TypeStore::new();
	let long = types.insert(i64_spec());
	let point = types.insert(RecordSpec::new(
		"Point",
		vec![FieldSpec::new("x", long), FieldSpec::new("y", long)],
	));
	let reader = build_reader(&mut types, point, &schema).unwrap();

	let datum = common::datum(&[common::long(3), common::long(-4)]);
	let value = reader.read_slice(&datum).unwrap();
	let record = value.as_record().unwrap();
	assert_eq!(record.get("x").unwrap().as_i64(), Some(3));
	assert_eq!(record.get("y").unwrap().as_i64(), Some(-4));
}

#[test]
fn constructor_with_reordered_parameters() {
	let schema: Schema = POINT_SCHEMA.parse().unwrap();
	let mut types = TypeStore::new();
	let long = types.insert(i64_spec());
	// Parameters deliberately in the opposite order of the schema fields:
	// bytes must still be read in schema-field order (x first)
	let point = types.insert(
		RecordSpec::new("Point", vec![]).with_constructor(Constructor::new(vec![
			Parameter::new("y", long),
			Parameter::new("x", long),
		])),
	);
	let reader = build_reader(&mut types, point, &schema).unwrap();

	let datum = common::datum(&[common::long(1), common::long(2)]);
	let value = reader.read_slice(&datum).unwrap();
	let record = value.as_record().unwrap();
	// Fields come out in parameter order
	assert_eq!(&*record.fields[0].0, "y");
	assert_eq!(record.get("x").unwrap().as_i64(), Some(1));
	assert_eq!(record.get("y").unwrap().as_i64(), Some(2));
}

#[test]
fn constructor_defaults_for_unmatched_parameters() {
	let schema: Schema = POINT_SCHEMA.parse().unwrap();
	let mut types = TypeStore::new();
	let long = types.insert(i64_spec());
	let text = types_text(&mut types);
	let point = types.insert(
		RecordSpec::new("Point", vec![]).with_constructor(Constructor::new(vec![
			Parameter::new("x", long),
			Parameter::new("y", long),
			Parameter::new("label", text).with_default(Value::String("origin".to_owned())),
		])),
	);
	let reader = build_reader(&mut types, point, &schema).unwrap();

	let datum = common::datum(&[common::long(7), common::long(8)]);
	let record = reader.read_slice(&datum).unwrap();
	let record = record.as_record().unwrap();
	assert_eq!(
		record.get("label").unwrap(),
		&Value::String("origin".to_owned())
	);
}

fn types_text(types: &mut TypeStore) -> TypeKey {
	types.insert(TypeSpec::Text)
}

#[test]
fn unviable_constructor_falls_back_to_members() {
	let schema: Schema = POINT_SCHEMA.parse().unwrap();
	let mut types = TypeStore::new();
	let long = types.insert(i64_spec());
	// The constructor lacks a parameter for `y`, so it is not usable; the
	// member route is
	let point = types.insert(
		RecordSpec::new("Point", vec![FieldSpec::new("x", long), FieldSpec::new("y", long)])
			.with_constructor(Constructor::new(vec![Parameter::new("x", long)])),
	);
	let reader = build_reader(&mut types, point, &schema).unwrap();

	let datum = common::datum(&[common::long(5), common::long(6)]);
	let value = reader.read_slice(&datum).unwrap();
	assert_eq!(value.as_record().unwrap().get("y").unwrap().as_i64(), Some(6));
}

#[test]
fn unknown_schema_field_is_read_and_discarded() {
	// Schema has `a` (int) and `b` (string); the target only has `a`
	let schema: Schema = r#"
	{
		"type": "record",
		"name": "test.Partial",
		"fields": [
			{ "name": "a", "type": "int" },
			{ "name": "b", "type": "string" }
		]
	}
	"#
	.parse()
	.unwrap();
	let mut types = TypeStore::new();
	let int = types.insert(TypeSpec::Integer {
		width: IntWidth::W32,
		signed: true,
	});
	let partial = types.insert(RecordSpec::new("Partial", vec![FieldSpec::new("a", int)]));
	let reader = build_reader(&mut types, partial, &schema).unwrap();

	// a = 7, b = "x" - the string bytes must be consumed for the stream to
	// stay aligned
	let datum = common::datum(&[common::long(7), common::string("x")]);
	let value = reader.read_slice(&datum).unwrap();
	let record = value.as_record().unwrap();
	assert_eq!(record.fields.len(), 1);
	assert_eq!(record.get("a").unwrap(), &Value::I32(7));
}

#[test]
fn unknown_fields_of_every_shape_advance_the_stream() {
	// The unknown field exercises the surrogate targets: a nested record
	// containing an enum, an array and a map
	let schema: Schema = r#"
	{
		"type": "record",
		"name": "test.Outer",
		"fields": [
			{ "name": "dropped", "type": {
				"type": "record",
				"name": "test.Inner",
				"fields": [
					{ "name": "e", "type": { "type": "enum", "name": "test.E", "symbols": ["A", "B"] } },
					{ "name": "xs", "type": { "type": "array", "items": "long" } },
					{ "name": "m", "type": { "type": "map", "values": "boolean" } }
				]
			} },
			{ "name": "kept", "type": "long" }
		]
	}
	"#
	.parse()
	.unwrap();
	let mut types = TypeStore::new();
	let long = types.insert(i64_spec());
	let outer = types.insert(RecordSpec::new("Outer", vec![FieldSpec::new("kept", long)]));
	let reader = build_reader(&mut types, outer, &schema).unwrap();

	let datum = common::datum(&[
		common::long(1),                                        // e = B
		common::single_block(&[common::long(10), common::long(20)]), // xs
		common::single_block(&[common::datum(&[common::string("k"), vec![0x01]])]), // m
		common::long(42),                                       // kept
	]);
	let value = reader.read_slice(&datum).unwrap();
	assert_eq!(value.as_record().unwrap().get("kept").unwrap().as_i64(), Some(42));
}

#[test]
fn recursive_record_through_union_with_null() {
	let schema: Schema = r#"
	{
		"type": "record",
		"name": "test.Tree",
		"fields": [
			{ "name": "value", "type": "int" },
			{ "name": "next", "type": ["null", "test.Tree"] }
		]
	}
	"#
	.parse()
	.unwrap();

	// The target record references itself through an optional, so the keys
	// are computed up front
	let int = TypeKey::from_idx(0);
	let tree = TypeKey::from_idx(1);
	let next = TypeKey::from_idx(2);
	let mut types = TypeStore::from_nodes(vec![
		TypeSpec::Integer {
			width: IntWidth::W32,
			signed: true,
		},
		TypeSpec::Record(RecordSpec::new(
			"Tree",
			vec![FieldSpec::new("value", int), FieldSpec::new("next", next)],
		)),
		TypeSpec::Optional(tree),
	]);
	let reader = build_reader(&mut types, tree, &schema).unwrap();

	// value = 1, next = { value = 2, next = null }
	let datum = common::datum(&[
		common::long(1),
		common::long(1), // union branch 1: Tree
		common::long(2),
		common::long(0), // union branch 0: null
	]);
	let value = reader.read_slice(&datum).unwrap();
	let root = value.as_record().unwrap();
	assert_eq!(root.get("value").unwrap(), &Value::I32(1));
	let next = root.get("next").unwrap().as_record().unwrap();
	assert_eq!(next.get("value").unwrap(), &Value::I32(2));
	assert!(next.get("next").unwrap().is_null());
}

#[test]
fn depth_guard_stops_malicious_recursion() {
	let schema: Schema = r#"
	{
		"type": "record",
		"name": "test.Tree",
		"fields": [
			{ "name": "next", "type": ["null", "test.Tree"] }
		]
	}
	"#
	.parse()
	.unwrap();
	let tree = TypeKey::from_idx(0);
	let next = TypeKey::from_idx(1);
	let mut types = TypeStore::from_nodes(vec![
		TypeSpec::Record(RecordSpec::new("Tree", vec![FieldSpec::new("next", next)])),
		TypeSpec::Optional(tree),
	]);
	let reader = build_reader(&mut types, tree, &schema).unwrap();

	// A datum that nests far deeper than the allowed depth
	let mut datum = Vec::new();
	for _ in 0..100_000 {
		datum.extend_from_slice(&common::long(1));
	}
	datum.extend_from_slice(&common::long(0));
	assert!(matches!(
		reader.read_slice(&datum).unwrap_err(),
		DeError::Decode(_)
	));
}

#[test]
fn same_record_twice_is_not_a_cycle() {
	// The same (schema node, target) pair appears in two fields; the second
	// occurrence resolves through the slot registered by the first
	let schema: Schema = r#"
	{
		"type": "record",
		"name": "test.Pair",
		"fields": [
			{ "name": "left", "type": { "type": "record", "name": "test.P", "fields": [
				{ "name": "v", "type": "long" }
			] } },
			{ "name": "right", "type": "test.P" }
		]
	}
	"#
	.parse()
	.unwrap();
	let mut types = TypeStore::new();
	let long = types.insert(i64_spec());
	let p = types.insert(RecordSpec::new("P", vec![FieldSpec::new("v", long)]));
	let pair = types.insert(RecordSpec::new(
		"Pair",
		vec![FieldSpec::new("left", p), FieldSpec::new("right", p)],
	));
	let reader = build_reader(&mut types, pair, &schema).unwrap();

	let datum = common::datum(&[common::long(1), common::long(2)]);
	let value = reader.read_slice(&datum).unwrap();
	let record = value.as_record().unwrap();
	assert_eq!(
		record.get("left").unwrap().as_record().unwrap().get("v").unwrap().as_i64(),
		Some(1)
	);
	assert_eq!(
		record.get("right").unwrap().as_record().unwrap().get("v").unwrap().as_i64(),
		Some(2)
	);
}

//! Schema JSON parsing

use {
	avro_bind::schema::{LogicalType, RegularType, Schema, SchemaKey},
	pretty_assertions::assert_eq,
};

#[test]
fn primitive_and_nested_forms() {
	let schema: Schema = r#""long""#.parse().unwrap();
	assert!(matches!(schema.root().type_, RegularType::Long));

	// {"type": {"type": "string"}} is a valid (if odd) representation
	let schema: Schema = r#"{"type": {"type": "string"}}"#.parse().unwrap();
	assert!(matches!(schema.root().type_, RegularType::String));
}

#[test]
fn named_references_resolve_even_out_of_order() {
	let schema: Schema = r#"
	{
		"type": "record",
		"name": "a.b",
		"fields": [
			{ "name": "c", "type": ["null", "b"] }
		]
	}
	"#
	.parse()
	.unwrap();
	let record = match schema.root().type_ {
		RegularType::Record(ref record) => record,
		ref other => panic!("expected a record, got {other:?}"),
	};
	assert_eq!(record.name.fully_qualified_name(), "a.b");
	let union_key = record.fields[0].type_;
	let union = match schema[union_key].type_ {
		RegularType::Union(ref union) => union,
		ref other => panic!("expected a union, got {other:?}"),
	};
	// The second variant points back at the record (the root node)
	assert_eq!(union.variants[1], SchemaKey::root());
}

#[test]
fn namespaces_inherit_into_fields() {
	let schema: Schema = r#"
	{
		"type": "record",
		"name": "Outer",
		"namespace": "ns",
		"fields": [
			{ "name": "inner", "type": { "type": "record", "name": "Inner", "fields": [] } },
			{ "name": "again", "type": "Inner" }
		]
	}
	"#
	.parse()
	.unwrap();
	let record = match schema.root().type_ {
		RegularType::Record(ref record) => record,
		ref other => panic!("expected a record, got {other:?}"),
	};
	// "Inner" resolved within the enclosing "ns" namespace
	assert_eq!(record.fields[0].type_, record.fields[1].type_);
	let inner = &schema[record.fields[0].type_];
	assert_eq!(
		inner.type_.name().unwrap().fully_qualified_name(),
		"ns.Inner"
	);
}

#[test]
fn logical_types_annotate_their_node() {
	let schema: Schema =
		r#"{"type": "bytes", "logicalType": "decimal", "precision": 9, "scale": 2}"#
			.parse()
			.unwrap();
	assert!(matches!(schema.root().type_, RegularType::Bytes));
	match schema.root().logical_type {
		Some(LogicalType::Decimal(ref decimal)) => {
			assert_eq!(decimal.precision, 9);
			assert_eq!(decimal.scale, 2);
		}
		ref other => panic!("expected a decimal logical type, got {other:?}"),
	}

	// Unknown logical types are preserved by name
	let schema: Schema = r#"{"type": "string", "logicalType": "geo-point"}"#.parse().unwrap();
	match schema.root().logical_type {
		Some(LogicalType::Unknown(ref unknown)) => assert_eq!(unknown.as_str(), "geo-point"),
		ref other => panic!("expected an unknown logical type, got {other:?}"),
	}
}

#[test]
fn parse_errors() {
	// Unknown reference
	assert!(r#"{"type": "array", "items": "NotDefined"}"#
		.parse::<Schema>()
		.is_err());
	// Complex type as a bare string
	assert!(r#""record""#.parse::<Schema>().is_err());
	// Decimal missing its scale
	assert!(r#"{"type": "bytes", "logicalType": "decimal", "precision": 9}"#
		.parse::<Schema>()
		.is_err());
	// Duplicate names
	assert!(r#"
	{
		"type": "record",
		"name": "Dup",
		"fields": [
			{ "name": "a", "type": { "type": "fixed", "name": "Dup", "size": 1 } }
		]
	}
	"#
	.parse::<Schema>()
	.is_err());
}

#[test]
fn json_is_sanitized_and_kept() {
	let schema: Schema = "  {  \"type\" : \"int\" }  ".parse().unwrap();
	assert_eq!(schema.json(), Some(r#"{"type":"int"}"#));
}

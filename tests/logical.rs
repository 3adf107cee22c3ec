//! Logical types: decimal, duration, timestamps, plus the string/bytes
//! conversion lattice (uuid, url, iso durations)

mod common;

use {
	avro_bind::{
		build_reader,
		types::{TypeSpec, TypeStore},
		DeError, Schema, Value,
	},
	pretty_assertions::assert_eq,
};

fn reader_for(schema_json: &str, spec: TypeSpec) -> avro_bind::DatumReader {
	let schema: Schema = schema_json.parse().unwrap();
	let mut types = TypeStore::new();
	let target = types.insert(spec);
	build_reader(&mut types, target, &schema).unwrap()
}

#[test]
fn decimal_from_bytes() {
	let reader = reader_for(
		r#"{"type": "bytes", "logicalType": "decimal", "precision": 9, "scale": 2}"#,
		TypeSpec::Decimal,
	);
	// length 1, unscaled 0x7B = 123 -> 1.23
	assert_eq!(
		reader.read_slice(&common::bytes(&[0x7B])).unwrap(),
		Value::Decimal(rust_decimal::Decimal::new(123, 2))
	);
	// Negative unscaled values are sign-extended
	assert_eq!(
		reader.read_slice(&common::bytes(&[0xFF])).unwrap(),
		Value::Decimal(rust_decimal::Decimal::new(-1, 2))
	);
}

#[test]
fn decimal_from_fixed() {
	let reader = reader_for(
		r#"{"type": "fixed", "name": "d", "size": 2, "logicalType": "decimal", "precision": 4, "scale": 1}"#,
		TypeSpec::Decimal,
	);
	// 0x0102 = 258 -> 25.8
	assert_eq!(
		reader.read_slice(&[0x01, 0x02]).unwrap(),
		Value::Decimal(rust_decimal::Decimal::new(258, 1))
	);
}

#[test]
fn decimal_logical_wins_over_physical_bytes() {
	// Same physical schema, but the logical annotation must take precedence
	// over the raw-bytes interpretation when the target is a decimal
	let schema: Schema =
		r#"{"type": "bytes", "logicalType": "decimal", "precision": 9, "scale": 0}"#
			.parse()
			.unwrap();
	let mut types = TypeStore::new();
	let any = types.any();
	let reader = build_reader(&mut types, any, &schema).unwrap();
	assert_eq!(
		reader.read_slice(&common::bytes(&[0x05])).unwrap(),
		Value::Decimal(rust_decimal::Decimal::from(5))
	);
}

#[test]
fn duration_fixed_12() {
	let reader = reader_for(
		r#"{"type": "fixed", "name": "dur", "size": 12, "logicalType": "duration"}"#,
		TypeSpec::Duration,
	);
	// months = 0, days = 2, millis = 500
	let mut datum = Vec::new();
	datum.extend_from_slice(&0u32.to_le_bytes());
	datum.extend_from_slice(&2u32.to_le_bytes());
	datum.extend_from_slice(&500u32.to_le_bytes());
	assert_eq!(
		reader.read_slice(&datum).unwrap(),
		Value::Duration(time::Duration::days(2) + time::Duration::milliseconds(500))
	);
}

#[test]
fn duration_with_months_overflows() {
	let reader = reader_for(
		r#"{"type": "fixed", "name": "dur", "size": 12, "logicalType": "duration"}"#,
		TypeSpec::Duration,
	);
	let mut datum = Vec::new();
	datum.extend_from_slice(&1u32.to_le_bytes());
	datum.extend_from_slice(&0u32.to_le_bytes());
	datum.extend_from_slice(&0u32.to_le_bytes());
	assert!(matches!(
		reader.read_slice(&datum).unwrap_err(),
		DeError::Overflow(_)
	));
}

#[test]
fn timestamp_millis_and_micros() {
	let reader = reader_for(
		r#"{"type": "long", "logicalType": "timestamp-millis"}"#,
		TypeSpec::Timestamp,
	);
	assert_eq!(
		reader.read_slice(&common::long(1_500)).unwrap(),
		Value::Timestamp(
			time::OffsetDateTime::UNIX_EPOCH + time::Duration::milliseconds(1_500)
		)
	);

	let reader = reader_for(
		r#"{"type": "long", "logicalType": "timestamp-micros"}"#,
		TypeSpec::Timestamp,
	);
	assert_eq!(
		reader.read_slice(&common::long(-1_000_000)).unwrap(),
		Value::Timestamp(time::OffsetDateTime::UNIX_EPOCH - time::Duration::seconds(1))
	);
}

#[test]
fn uuid_from_string() {
	let reader = reader_for(r#""string""#, TypeSpec::Uuid);
	let nil = "00000000-0000-0000-0000-000000000000";
	assert_eq!(
		reader.read_slice(&common::string(nil)).unwrap(),
		Value::Uuid(uuid::Uuid::nil())
	);
	assert!(matches!(
		reader.read_slice(&common::string("not-a-uuid")).unwrap_err(),
		DeError::Decode(_)
	));
}

#[test]
fn uuid_from_sixteen_bytes() {
	let reader = reader_for(r#""bytes""#, TypeSpec::Uuid);
	let raw = [0x11u8; 16];
	assert_eq!(
		reader.read_slice(&common::bytes(&raw)).unwrap(),
		Value::Uuid(uuid::Uuid::from_bytes(raw))
	);
	// Wrong length only shows at decode time for length-prefixed bytes
	assert!(reader.read_slice(&common::bytes(&[0x11; 4])).is_err());

	let reader = reader_for(
		r#"{"type": "fixed", "name": "u", "size": 16}"#,
		TypeSpec::Uuid,
	);
	assert_eq!(
		reader.read_slice(&raw).unwrap(),
		Value::Uuid(uuid::Uuid::from_bytes(raw))
	);
}

#[test]
fn uuid_from_wrong_size_fixed_fails_at_build_time() {
	let schema: Schema = r#"{"type": "fixed", "name": "u", "size": 4}"#.parse().unwrap();
	let mut types = TypeStore::new();
	let target = types.insert(TypeSpec::Uuid);
	assert!(matches!(
		build_reader(&mut types, target, &schema).unwrap_err(),
		avro_bind::BuildError::UnsupportedType { .. }
	));
}

#[test]
fn url_from_string() {
	let reader = reader_for(r#""string""#, TypeSpec::Url);
	assert_eq!(
		reader
			.read_slice(&common::string("https://example.com/a?b=c"))
			.unwrap(),
		Value::Url(url::Url::parse("https://example.com/a?b=c").unwrap())
	);
}

#[test]
fn timestamp_from_rfc3339_string() {
	let reader = reader_for(r#""string""#, TypeSpec::Timestamp);
	assert_eq!(
		reader
			.read_slice(&common::string("1970-01-01T00:01:00Z"))
			.unwrap(),
		Value::Timestamp(time::OffsetDateTime::UNIX_EPOCH + time::Duration::minutes(1))
	);
}

#[test]
fn duration_from_iso_string() {
	let reader = reader_for(r#""string""#, TypeSpec::Duration);
	assert_eq!(
		reader.read_slice(&common::string("P1DT2H")).unwrap(),
		Value::Duration(time::Duration::days(1) + time::Duration::hours(2))
	);
	// Sub-millisecond precision is preserved, not truncated
	// (2^-7 seconds, so the fractional part is exact in binary)
	assert_eq!(
		reader.read_slice(&common::string("PT0.0078125S")).unwrap(),
		Value::Duration(time::Duration::nanoseconds(7_812_500))
	);
	// Calendar components have no exact length
	assert!(matches!(
		reader.read_slice(&common::string("P1M")).unwrap_err(),
		DeError::Overflow(_)
	));
}

#[test]
fn uuid_annotated_string_still_decodes_as_text_target() {
	// The `uuid` logical annotation does not prevent a plain text target
	let reader = reader_for(
		r#"{"type": "string", "logicalType": "uuid"}"#,
		TypeSpec::Text,
	);
	let nil = "00000000-0000-0000-0000-000000000000";
	assert_eq!(
		reader.read_slice(&common::string(nil)).unwrap(),
		Value::String(nil.to_owned())
	);
}

mod blocks;
mod bytes;
mod decimal;
mod duration;
mod enums;
mod primitives;
mod record;
mod timestamp;
mod union;

pub use {
	blocks::{ArrayCase, MapCase},
	bytes::{BytesCase, FixedCase, StringCase},
	decimal::DecimalCase,
	duration::DurationCase,
	enums::EnumCase,
	primitives::{BooleanCase, DoubleCase, FloatCase, IntegerCase, NullCase},
	record::RecordCase,
	timestamp::TimestampCase,
	union::UnionCase,
};

use super::{BuildCase, BuildContext, BuildError, CaseOutcome, Rejection};

use crate::{
	convert,
	de::{decode, DeError, ReadFn},
	schema::{LogicalType, RegularType, SchemaKey},
	types::{TypeKey, TypeSpec},
	Value,
};

use std::sync::Arc;

pub(super) fn default_cases() -> Vec<Box<dyn BuildCase>> {
	// Logical-type cases come before the cases for their physical types, so
	// that e.g. a bytes schema annotated as decimal decodes as a decimal and
	// not as a byte buffer
	vec![
		Box::new(DecimalCase),
		Box::new(DurationCase),
		Box::new(TimestampCase),
		Box::new(BooleanCase),
		Box::new(BytesCase),
		Box::new(DoubleCase),
		Box::new(FixedCase),
		Box::new(FloatCase),
		Box::new(IntegerCase),
		Box::new(NullCase),
		Box::new(StringCase),
		Box::new(ArrayCase),
		Box::new(MapCase),
		Box::new(EnumCase),
		Box::new(RecordCase),
		Box::new(UnionCase::new()),
	]
}

/// Schema kind for rejection/error messages
fn schema_kind(type_: &RegularType) -> &'static str {
	match type_ {
		RegularType::Null => "null",
		RegularType::Boolean => "boolean",
		RegularType::Int => "int",
		RegularType::Long => "long",
		RegularType::Float => "float",
		RegularType::Double => "double",
		RegularType::Bytes => "bytes",
		RegularType::String => "string",
		RegularType::Array(_) => "array",
		RegularType::Map(_) => "map",
		RegularType::Union(_) => "union",
		RegularType::Record(_) => "record",
		RegularType::Enum(_) => "enum",
		RegularType::Fixed(_) => "fixed",
	}
}

/// Target shape kind for rejection/error messages
fn spec_kind(spec: &TypeSpec) -> &'static str {
	match spec {
		TypeSpec::Boolean => "boolean",
		TypeSpec::Integer { .. } => "integer",
		TypeSpec::Floating { .. } => "floating",
		TypeSpec::ByteArray => "byte array",
		TypeSpec::Text => "text",
		TypeSpec::Uuid => "uuid",
		TypeSpec::Url => "url",
		TypeSpec::Decimal => "decimal",
		TypeSpec::Duration => "duration",
		TypeSpec::Timestamp => "timestamp",
		TypeSpec::Enum(_) => "enum",
		TypeSpec::Sequence { .. } => "sequence",
		TypeSpec::Mapping { .. } => "mapping",
		TypeSpec::Record(_) => "record",
		TypeSpec::Optional(_) => "optional",
		TypeSpec::Any => "any",
	}
}

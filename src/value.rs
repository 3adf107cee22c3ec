//! The dynamic values produced by built readers

use std::{
	collections::{BTreeMap, HashMap, VecDeque},
	sync::Arc,
};

/// A decoded value, shaped according to the [`TypeSpec`](crate::types::TypeSpec)
/// the reader was built for
///
/// Integer variants exist for every target width so that checked conversions
/// from the on-wire 64-bit representation are observable in the result.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
	/// Absent value (`null` schema, or the null variant of a union decoded
	/// into an [`Optional`](crate::types::TypeSpec::Optional) target)
	Null,
	/// A boolean
	Boolean(bool),
	/// An 8-bit signed integer
	I8(i8),
	/// A 16-bit signed integer
	I16(i16),
	/// A 32-bit signed integer
	I32(i32),
	/// A 64-bit signed integer
	I64(i64),
	/// An 8-bit unsigned integer
	U8(u8),
	/// A 16-bit unsigned integer
	U16(u16),
	/// A 32-bit unsigned integer
	U32(u32),
	/// A 64-bit unsigned integer
	U64(u64),
	/// A 32-bit float
	F32(f32),
	/// A 64-bit float
	F64(f64),
	/// A byte buffer
	Bytes(Vec<u8>),
	/// A string
	String(String),
	/// A UUID
	Uuid(uuid::Uuid),
	/// A URL
	Url(url::Url),
	/// A decimal number
	Decimal(rust_decimal::Decimal),
	/// A duration
	Duration(time::Duration),
	/// An instant in time (UTC)
	Timestamp(time::OffsetDateTime),
	/// One of a fixed set of symbols
	Enum(EnumValue),
	/// A contiguous sequence
	Array(Vec<Value>),
	/// A double-ended queue
	Deque(VecDeque<Value>),
	/// An unordered mapping
	Map(HashMap<String, Value>),
	/// A mapping ordered by key
	SortedMap(BTreeMap<String, Value>),
	/// A named record with fields
	Record(Box<StructValue>),
}

/// Component of a [`Value::Enum`]
#[derive(Clone, Debug, PartialEq)]
pub struct EnumValue {
	/// The matched target symbol
	pub symbol: Arc<str>,
	/// The value registered for that symbol in the
	/// [`EnumSpec`](crate::types::EnumSpec)
	pub value: i64,
}

/// Component of a [`Value::Record`]
#[derive(Clone, Debug, PartialEq)]
pub struct StructValue {
	/// Name of the record type
	pub name: Arc<str>,
	/// Field values
	///
	/// In member-assignment instantiation these are in target-member order;
	/// in constructor instantiation they are in parameter order. They are
	/// never in schema-field order unless that happens to coincide.
	pub fields: Vec<(Arc<str>, Value)>,
}

impl StructValue {
	/// Get a field value by name
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.fields
			.iter()
			.find(|(field_name, _)| &**field_name == name)
			.map(|(_, value)| value)
	}
}

impl Value {
	/// The value as a `bool`, if it is one
	pub fn as_bool(&self) -> Option<bool> {
		match *self {
			Value::Boolean(b) => Some(b),
			_ => None,
		}
	}

	/// The value as an `i64`, if it is a signed integer that fits
	pub fn as_i64(&self) -> Option<i64> {
		match *self {
			Value::I8(v) => Some(v.into()),
			Value::I16(v) => Some(v.into()),
			Value::I32(v) => Some(v.into()),
			Value::I64(v) => Some(v),
			Value::U8(v) => Some(v.into()),
			Value::U16(v) => Some(v.into()),
			Value::U32(v) => Some(v.into()),
			Value::U64(v) => v.try_into().ok(),
			_ => None,
		}
	}

	/// The value as an `f64`, if it is a float
	pub fn as_f64(&self) -> Option<f64> {
		match *self {
			Value::F32(v) => Some(v.into()),
			Value::F64(v) => Some(v),
			_ => None,
		}
	}

	/// The value as a `&str`, if it is a string
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(s) => Some(s),
			_ => None,
		}
	}

	/// The value as a byte slice, if it is a byte buffer
	pub fn as_bytes(&self) -> Option<&[u8]> {
		match self {
			Value::Bytes(b) => Some(b),
			_ => None,
		}
	}

	/// The value as a record, if it is one
	pub fn as_record(&self) -> Option<&StructValue> {
		match self {
			Value::Record(record) => Some(record),
			_ => None,
		}
	}

	/// The value as a slice of items, if it is a contiguous sequence
	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Value::Array(items) => Some(items),
			_ => None,
		}
	}

	/// Whether the value is [`Value::Null`]
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}
}

impl From<EnumValue> for Value {
	fn from(value: EnumValue) -> Self {
		Self::Enum(value)
	}
}
impl From<StructValue> for Value {
	fn from(value: StructValue) -> Self {
		Self::Record(Box::new(value))
	}
}

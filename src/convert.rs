//! The value-conversion lattice between decoded intermediates and target
//! shapes
//!
//! The wire decoder only ever produces a handful of intermediates (a 64-bit
//! integer, a float, a byte buffer, a string). Cases pick a converter here
//! at build time, so the per-read work is a plain function call.

use crate::{
	de::DeError,
	types::{FloatWidth, IntWidth, TypeKey, TypeSpec, TypeStore},
	Value,
};

use num_traits::ToPrimitive as _;

/// A conversion applied to the on-wire signed 64-bit integer
pub(crate) type LongConverter = fn(i64) -> Result<Value, DeError>;

/// Checked conversion from the on-wire 64-bit integer to the target
///
/// `None` means the target cannot receive an integer at all (which the
/// calling case reports as an unsupported type).
pub(crate) fn long_converter(spec: &TypeSpec) -> Option<LongConverter> {
	fn err(v: i64) -> DeError {
		DeError::overflow_custom(format_args!("integer value {v} out of range for target"))
	}
	Some(match *spec {
		TypeSpec::Integer {
			width: IntWidth::W8,
			signed: true,
		} => |v| Ok(Value::I8(v.to_i8().ok_or_else(|| err(v))?)),
		TypeSpec::Integer {
			width: IntWidth::W16,
			signed: true,
		} => |v| Ok(Value::I16(v.to_i16().ok_or_else(|| err(v))?)),
		TypeSpec::Integer {
			width: IntWidth::W32,
			signed: true,
		} => |v| Ok(Value::I32(v.to_i32().ok_or_else(|| err(v))?)),
		TypeSpec::Integer {
			width: IntWidth::W64,
			signed: true,
		} => |v| Ok(Value::I64(v)),
		TypeSpec::Integer {
			width: IntWidth::W8,
			signed: false,
		} => |v| Ok(Value::U8(v.to_u8().ok_or_else(|| err(v))?)),
		TypeSpec::Integer {
			width: IntWidth::W16,
			signed: false,
		} => |v| Ok(Value::U16(v.to_u16().ok_or_else(|| err(v))?)),
		TypeSpec::Integer {
			width: IntWidth::W32,
			signed: false,
		} => |v| Ok(Value::U32(v.to_u32().ok_or_else(|| err(v))?)),
		TypeSpec::Integer {
			width: IntWidth::W64,
			signed: false,
		} => |v| Ok(Value::U64(v.to_u64().ok_or_else(|| err(v))?)),
		// i64 -> float is always in range
		TypeSpec::Floating {
			width: FloatWidth::W32,
		} => |v| Ok(Value::F32(v as f32)),
		TypeSpec::Floating {
			width: FloatWidth::W64,
		} => |v| Ok(Value::F64(v as f64)),
		TypeSpec::Decimal => |v| Ok(Value::Decimal(v.into())),
		TypeSpec::Any => |v| Ok(Value::I64(v)),
		_ => return None,
	})
}

/// A conversion applied to a decoded `f32`
pub(crate) type FloatConverter = fn(f32) -> Result<Value, DeError>;

pub(crate) fn float_converter(spec: &TypeSpec) -> Option<FloatConverter> {
	Some(match *spec {
		TypeSpec::Floating {
			width: FloatWidth::W32,
		}
		| TypeSpec::Any => |v| Ok(Value::F32(v)),
		TypeSpec::Floating {
			width: FloatWidth::W64,
		} => |v| Ok(Value::F64(v.into())),
		_ => return None,
	})
}

/// A conversion applied to a decoded `f64`
pub(crate) type DoubleConverter = fn(f64) -> Result<Value, DeError>;

pub(crate) fn double_converter(spec: &TypeSpec) -> Option<DoubleConverter> {
	Some(match *spec {
		TypeSpec::Floating {
			width: FloatWidth::W64,
		}
		| TypeSpec::Any => |v| Ok(Value::F64(v)),
		// Precision loss is fine (it's a checked numeric conversion, not a
		// lossless one), leaving the finite range is not
		TypeSpec::Floating {
			width: FloatWidth::W32,
		} => |v| {
			let narrowed = v as f32;
			if narrowed.is_infinite() && v.is_finite() {
				Err(DeError::overflow_custom(format_args!(
					"double value {v} out of range for f32 target"
				)))
			} else {
				Ok(Value::F32(narrowed))
			}
		},
		_ => return None,
	})
}

/// A conversion applied to a decoded byte buffer
pub(crate) type BytesConverter = fn(Vec<u8>) -> Result<Value, DeError>;

pub(crate) fn bytes_converter(spec: &TypeSpec) -> Option<BytesConverter> {
	Some(match *spec {
		TypeSpec::ByteArray | TypeSpec::Any => |v| Ok(Value::Bytes(v)),
		TypeSpec::Uuid => |v| {
			uuid::Uuid::from_slice(&v).map(Value::Uuid).map_err(|e| {
				DeError::custom(format_args!("Invalid byte length for uuid target: {e}"))
			})
		},
		_ => return None,
	})
}

/// A conversion applied to a decoded string
pub(crate) type StringConverter = fn(String) -> Result<Value, DeError>;

pub(crate) fn string_converter(spec: &TypeSpec) -> Option<StringConverter> {
	Some(match *spec {
		TypeSpec::Text | TypeSpec::Any => |v| Ok(Value::String(v)),
		TypeSpec::Uuid => |v| {
			uuid::Uuid::parse_str(&v)
				.map(Value::Uuid)
				.map_err(|e| DeError::custom(format_args!("Invalid uuid string: {e}")))
		},
		TypeSpec::Url => |v| {
			url::Url::parse(&v)
				.map(Value::Url)
				.map_err(|e| DeError::custom(format_args!("Invalid url string: {e}")))
		},
		TypeSpec::Timestamp => |v| {
			time::OffsetDateTime::parse(&v, &time::format_description::well_known::Rfc3339)
				.map(Value::Timestamp)
				.map_err(|e| DeError::custom(format_args!("Invalid timestamp string: {e}")))
		},
		TypeSpec::Duration => |v| parse_iso_duration(&v).map(Value::Duration),
		_ => return None,
	})
}

/// The zero/absent value of a target shape
///
/// This is what the `null` schema decodes to, and what record members that
/// have no matching schema field are initialized with.
pub(crate) fn default_value(types: &TypeStore, key: TypeKey) -> Value {
	match types.get(key) {
		Some(&TypeSpec::Boolean) => Value::Boolean(false),
		Some(&TypeSpec::Integer { width, signed }) => match (width, signed) {
			(IntWidth::W8, true) => Value::I8(0),
			(IntWidth::W16, true) => Value::I16(0),
			(IntWidth::W32, true) => Value::I32(0),
			(IntWidth::W64, true) => Value::I64(0),
			(IntWidth::W8, false) => Value::U8(0),
			(IntWidth::W16, false) => Value::U16(0),
			(IntWidth::W32, false) => Value::U32(0),
			(IntWidth::W64, false) => Value::U64(0),
		},
		Some(&TypeSpec::Floating { width }) => match width {
			FloatWidth::W32 => Value::F32(0.0),
			FloatWidth::W64 => Value::F64(0.0),
		},
		Some(TypeSpec::Text) => Value::String(String::new()),
		Some(TypeSpec::ByteArray) => Value::Bytes(Vec::new()),
		_ => Value::Null,
	}
}

/// Look through one level of [`TypeSpec::Optional`]
///
/// Primitive, byte-shaped and logical cases convert to the wrapped shape, so
/// that optional targets work both under unions and standalone.
pub(crate) fn unwrap_optional(types: &TypeStore, key: TypeKey) -> TypeKey {
	match types.get(key) {
		Some(&TypeSpec::Optional(inner)) => inner,
		_ => key,
	}
}

/// Parse an ISO-8601 duration (`PnDTnHnMnS`, optionally `PnW`)
///
/// Calendar components (years, months) have no exact fixed length, so they
/// are rejected the same way a non-zero month count in the binary `duration`
/// logical type is.
pub(crate) fn parse_iso_duration(s: &str) -> Result<time::Duration, DeError> {
	fn invalid(s: &str) -> DeError {
		DeError::custom(format_args!("Invalid ISO-8601 duration string: {s:?}"))
	}

	let (negative, rest) = match s.strip_prefix('-') {
		Some(rest) => (true, rest),
		None => (false, s),
	};
	let rest = rest
		.strip_prefix(|c| matches!(c, 'P' | 'p'))
		.ok_or_else(|| invalid(s))?;
	if rest.is_empty() {
		return Err(invalid(s));
	}

	let mut duration = time::Duration::ZERO;
	let mut in_time_part = false;
	let mut components_in_part = 0;
	let mut chars = rest.char_indices();
	let rest_bytes = rest;
	while let Some((start, c)) = chars.next() {
		if !in_time_part && matches!(c, 'T' | 't') {
			in_time_part = true;
			components_in_part = 0;
			continue;
		}
		if !c.is_ascii_digit() {
			return Err(invalid(s));
		}
		let mut end = start + 1;
		let mut is_fractional = false;
		let designator = loop {
			match chars.next() {
				None => return Err(invalid(s)),
				Some((idx, c)) if c.is_ascii_digit() => end = idx + 1,
				Some((idx, '.' | ',')) => {
					is_fractional = true;
					end = idx + 1;
				}
				Some((_, designator)) => break designator,
			}
		};
		let number = &rest_bytes[start..end];
		match (in_time_part, designator.to_ascii_uppercase()) {
			(_, 'Y') | (false, 'M') => {
				return Err(DeError::overflow(
					"Calendar components (years, months) of a duration cannot be \
						represented exactly",
				))
			}
			(false, 'W') => {
				duration += time::Duration::weeks(parse_whole(number).ok_or_else(|| invalid(s))?)
			}
			(false, 'D') => {
				duration += time::Duration::days(parse_whole(number).ok_or_else(|| invalid(s))?)
			}
			(true, 'H') => {
				duration += time::Duration::hours(parse_whole(number).ok_or_else(|| invalid(s))?)
			}
			(true, 'M') => {
				duration += time::Duration::minutes(parse_whole(number).ok_or_else(|| invalid(s))?)
			}
			(true, 'S') if is_fractional => {
				let seconds: f64 = number.replace(',', ".").parse().map_err(|_| invalid(s))?;
				duration += time::Duration::seconds_f64(seconds);
			}
			(true, 'S') => {
				duration += time::Duration::seconds(parse_whole(number).ok_or_else(|| invalid(s))?)
			}
			_ => return Err(invalid(s)),
		}
		components_in_part += 1;
	}
	// "PT" and "P1DT" have an empty (sub-)part, which is not valid ISO-8601
	if components_in_part == 0 {
		return Err(invalid(s));
	}

	Ok(if negative { -duration } else { duration })
}

fn parse_whole(s: &str) -> Option<i64> {
	// Leading `+`/`-` inside a component is not valid ISO-8601
	if s.bytes().all(|b| b.is_ascii_digit()) {
		s.parse().ok()
	} else {
		None
	}
}

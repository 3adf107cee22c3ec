use super::*;

use crate::types::{MapKind, SequenceKind};

/// Decodes an `array` schema: block-encoded items accumulated into the
/// requested sequence shape
pub struct ArrayCase;

impl BuildCase for ArrayCase {
	fn name(&self) -> &'static str {
		"array"
	}

	fn try_build(
		&self,
		target: TypeKey,
		schema: SchemaKey,
		ctx: &mut BuildContext<'_>,
	) -> Result<CaseOutcome, BuildError> {
		let items_schema = match ctx.node(schema)?.type_ {
			RegularType::Array(ref array) => array.items,
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::schema_kind(
					self.name(),
					format!("expected an array schema, got {}", schema_kind(other)),
				)))
			}
		};
		let effective = convert::unwrap_optional(ctx.types(), target);
		let sequence = match *ctx.spec(effective)? {
			TypeSpec::Sequence { item, kind } => Some((item, kind)),
			TypeSpec::Any => None,
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::type_kind(
					self.name(),
					format!("expected a sequence target, got {}", spec_kind(other)),
				)))
			}
		};
		let (item, kind) = match sequence {
			Some(sequence) => sequence,
			None => (ctx.types().any(), SequenceKind::List),
		};
		let read_item = ctx.build(item, items_schema)?;

		Ok(CaseOutcome::Reader(Arc::new(move |state| {
			let mut state = state.nested()?;
			// The intermediate accumulator is always contiguous; the
			// requested shape is bulk-converted from it at the end
			let mut items = Vec::new();
			decode::read_blocks(&mut state, |state| {
				items.push(read_item(state)?);
				Ok(())
			})?;
			Ok(match kind {
				SequenceKind::List => Value::Array(items),
				SequenceKind::Deque => Value::Deque(items.into()),
			})
		})))
	}
}

/// Decodes a `map` schema: block-encoded (key, value) entries accumulated
/// into the requested mapping shape
///
/// Keys are decoded through the full dispatch against a synthetic `string`
/// schema, so any string-receiving target shape works as the key type.
pub struct MapCase;

impl BuildCase for MapCase {
	fn name(&self) -> &'static str {
		"map"
	}

	fn try_build(
		&self,
		target: TypeKey,
		schema: SchemaKey,
		ctx: &mut BuildContext<'_>,
	) -> Result<CaseOutcome, BuildError> {
		let values_schema = match ctx.node(schema)?.type_ {
			RegularType::Map(ref map) => map.values,
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::schema_kind(
					self.name(),
					format!("expected a map schema, got {}", schema_kind(other)),
				)))
			}
		};
		let effective = convert::unwrap_optional(ctx.types(), target);
		let mapping = match *ctx.spec(effective)? {
			TypeSpec::Mapping { key, value, kind } => Some((key, value, kind)),
			TypeSpec::Any => None,
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::type_kind(
					self.name(),
					format!("expected a mapping target, got {}", spec_kind(other)),
				)))
			}
		};
		let (key, value, kind) = match mapping {
			Some(mapping) => mapping,
			None => {
				let any = ctx.types().any();
				(any, any, MapKind::Hashed)
			}
		};
		match *ctx.spec(key)? {
			TypeSpec::Text | TypeSpec::Uuid | TypeSpec::Url | TypeSpec::Any => {}
			ref other => {
				return Err(BuildError::unsupported_type(
					spec_kind(other),
					"map keys must decode from a string",
				))
			}
		}
		let key_schema = ctx.string_schema();
		let read_key = ctx.build(key, key_schema)?;
		let read_value = ctx.build(value, values_schema)?;

		Ok(CaseOutcome::Reader(Arc::new(move |state| {
			let mut state = state.nested()?;
			let mut entries = Vec::new();
			decode::read_blocks(&mut state, |state| {
				let key = map_key(read_key(state)?)?;
				let value = read_value(state)?;
				entries.push((key, value));
				Ok(())
			})?;
			Ok(match kind {
				MapKind::Hashed => Value::Map(entries.into_iter().collect()),
				MapKind::Sorted => Value::SortedMap(entries.into_iter().collect()),
			})
		})))
	}
}

fn map_key(value: Value) -> Result<String, DeError> {
	match value {
		Value::String(s) => Ok(s),
		Value::Uuid(uuid) => Ok(uuid.to_string()),
		Value::Url(url) => Ok(String::from(url)),
		_ => Err(DeError::new("Map key did not decode to a string-like value")),
	}
}

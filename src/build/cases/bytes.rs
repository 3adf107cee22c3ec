use super::*;

/// Decodes a `bytes` schema (length-prefixed buffer)
///
/// Steps aside when the schema carries a `decimal` logical type, which the
/// decimal case owns.
pub struct BytesCase;

impl BuildCase for BytesCase {
	fn name(&self) -> &'static str {
		"bytes"
	}

	fn try_build(
		&self,
		target: TypeKey,
		schema: SchemaKey,
		ctx: &mut BuildContext<'_>,
	) -> Result<CaseOutcome, BuildError> {
		let node = ctx.node(schema)?;
		match node.type_ {
			RegularType::Bytes => {}
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::schema_kind(
					self.name(),
					format!("expected a bytes schema, got {}", schema_kind(other)),
				)))
			}
		}
		if matches!(node.logical_type, Some(LogicalType::Decimal(_))) {
			return Ok(CaseOutcome::Rejected(Rejection::schema_kind(
				self.name(),
				"bytes schema carries a decimal logical type",
			)));
		}
		let effective = convert::unwrap_optional(ctx.types(), target);
		let spec = ctx.spec(effective)?;
		let convert = convert::bytes_converter(spec).ok_or_else(|| {
			BuildError::unsupported_type(spec_kind(spec), "cannot receive a byte buffer")
		})?;
		Ok(CaseOutcome::Reader(Arc::new(move |state| {
			convert(decode::read_bytes(state)?)
		})))
	}
}

/// Decodes a `fixed` schema (raw bytes of the declared size)
pub struct FixedCase;

impl BuildCase for FixedCase {
	fn name(&self) -> &'static str {
		"fixed"
	}

	fn try_build(
		&self,
		target: TypeKey,
		schema: SchemaKey,
		ctx: &mut BuildContext<'_>,
	) -> Result<CaseOutcome, BuildError> {
		let size = match ctx.node(schema)?.type_ {
			RegularType::Fixed(ref fixed) => fixed.size,
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::schema_kind(
					self.name(),
					format!("expected a fixed schema, got {}", schema_kind(other)),
				)))
			}
		};
		let effective = convert::unwrap_optional(ctx.types(), target);
		let spec = ctx.spec(effective)?;
		if matches!(spec, TypeSpec::Uuid) && size != 16 {
			return Err(BuildError::unsupported_type(
				"uuid",
				format!("needs a fixed schema of size 16, got size {size}"),
			));
		}
		let convert = convert::bytes_converter(spec).ok_or_else(|| {
			BuildError::unsupported_type(spec_kind(spec), "cannot receive a byte buffer")
		})?;
		Ok(CaseOutcome::Reader(Arc::new(move |state| {
			convert(decode::read_fixed(state, size)?)
		})))
	}
}

/// Decodes a `string` schema (length-prefixed UTF-8), with parsing
/// conversions for uuid, url, timestamp and duration targets
pub struct StringCase;

impl BuildCase for StringCase {
	fn name(&self) -> &'static str {
		"string"
	}

	fn try_build(
		&self,
		target: TypeKey,
		schema: SchemaKey,
		ctx: &mut BuildContext<'_>,
	) -> Result<CaseOutcome, BuildError> {
		match ctx.node(schema)?.type_ {
			RegularType::String => {}
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::schema_kind(
					self.name(),
					format!("expected a string schema, got {}", schema_kind(other)),
				)))
			}
		}
		let effective = convert::unwrap_optional(ctx.types(), target);
		let spec = ctx.spec(effective)?;
		let convert = convert::string_converter(spec).ok_or_else(|| {
			BuildError::unsupported_type(spec_kind(spec), "cannot receive a string")
		})?;
		Ok(CaseOutcome::Reader(Arc::new(move |state| {
			convert(decode::read_string(state)?)
		})))
	}
}

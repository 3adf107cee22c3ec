use super::*;

/// Decodes a `boolean` schema (one byte, `0x00`/`0x01`)
pub struct BooleanCase;

impl BuildCase for BooleanCase {
	fn name(&self) -> &'static str {
		"boolean"
	}

	fn try_build(
		&self,
		target: TypeKey,
		schema: SchemaKey,
		ctx: &mut BuildContext<'_>,
	) -> Result<CaseOutcome, BuildError> {
		match ctx.node(schema)?.type_ {
			RegularType::Boolean => {}
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::schema_kind(
					self.name(),
					format!("expected a boolean schema, got {}", schema_kind(other)),
				)))
			}
		}
		let effective = convert::unwrap_optional(ctx.types(), target);
		match *ctx.spec(effective)? {
			TypeSpec::Boolean | TypeSpec::Any => {}
			ref other => {
				return Err(BuildError::unsupported_type(
					spec_kind(other),
					"cannot receive a boolean",
				))
			}
		}
		Ok(CaseOutcome::Reader(Arc::new(|state| {
			Ok(Value::Boolean(decode::read_bool(state)?))
		})))
	}
}

/// Decodes `int` and `long` schemas (zig-zag varint) with a checked
/// conversion to the target integer width
pub struct IntegerCase;

impl BuildCase for IntegerCase {
	fn name(&self) -> &'static str {
		"integer"
	}

	fn try_build(
		&self,
		target: TypeKey,
		schema: SchemaKey,
		ctx: &mut BuildContext<'_>,
	) -> Result<CaseOutcome, BuildError> {
		match ctx.node(schema)?.type_ {
			RegularType::Int | RegularType::Long => {}
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::schema_kind(
					self.name(),
					format!("expected an int or long schema, got {}", schema_kind(other)),
				)))
			}
		}
		let effective = convert::unwrap_optional(ctx.types(), target);
		let spec = ctx.spec(effective)?;
		let convert = convert::long_converter(spec).ok_or_else(|| {
			BuildError::unsupported_type(spec_kind(spec), "cannot receive an integer")
		})?;
		Ok(CaseOutcome::Reader(Arc::new(move |state| {
			convert(decode::read_long(state)?)
		})))
	}
}

/// Decodes a `float` schema (4 little-endian IEEE-754 bytes)
pub struct FloatCase;

impl BuildCase for FloatCase {
	fn name(&self) -> &'static str {
		"float"
	}

	fn try_build(
		&self,
		target: TypeKey,
		schema: SchemaKey,
		ctx: &mut BuildContext<'_>,
	) -> Result<CaseOutcome, BuildError> {
		match ctx.node(schema)?.type_ {
			RegularType::Float => {}
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::schema_kind(
					self.name(),
					format!("expected a float schema, got {}", schema_kind(other)),
				)))
			}
		}
		let effective = convert::unwrap_optional(ctx.types(), target);
		let spec = ctx.spec(effective)?;
		let convert = convert::float_converter(spec).ok_or_else(|| {
			BuildError::unsupported_type(spec_kind(spec), "cannot receive a float")
		})?;
		Ok(CaseOutcome::Reader(Arc::new(move |state| {
			convert(decode::read_f32(state)?)
		})))
	}
}

/// Decodes a `double` schema (8 little-endian IEEE-754 bytes)
pub struct DoubleCase;

impl BuildCase for DoubleCase {
	fn name(&self) -> &'static str {
		"double"
	}

	fn try_build(
		&self,
		target: TypeKey,
		schema: SchemaKey,
		ctx: &mut BuildContext<'_>,
	) -> Result<CaseOutcome, BuildError> {
		match ctx.node(schema)?.type_ {
			RegularType::Double => {}
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::schema_kind(
					self.name(),
					format!("expected a double schema, got {}", schema_kind(other)),
				)))
			}
		}
		let effective = convert::unwrap_optional(ctx.types(), target);
		let spec = ctx.spec(effective)?;
		let convert = convert::double_converter(spec).ok_or_else(|| {
			BuildError::unsupported_type(spec_kind(spec), "cannot receive a double")
		})?;
		Ok(CaseOutcome::Reader(Arc::new(move |state| {
			convert(decode::read_f64(state)?)
		})))
	}
}

/// Decodes a `null` schema: consumes no bytes and yields the target's
/// zero/absent value
pub struct NullCase;

impl BuildCase for NullCase {
	fn name(&self) -> &'static str {
		"null"
	}

	fn try_build(
		&self,
		target: TypeKey,
		schema: SchemaKey,
		ctx: &mut BuildContext<'_>,
	) -> Result<CaseOutcome, BuildError> {
		match ctx.node(schema)?.type_ {
			RegularType::Null => {}
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::schema_kind(
					self.name(),
					format!("expected a null schema, got {}", schema_kind(other)),
				)))
			}
		}
		// Note: deliberately not looking through `Optional` here - the
		// zero value of an optional target is absence, not the wrapped
		// shape's zero
		let default = convert::default_value(ctx.types(), target);
		Ok(CaseOutcome::Reader(Arc::new(move |_state| {
			Ok(default.clone())
		})))
	}
}

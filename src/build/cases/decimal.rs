use super::*;

/// Decodes a `bytes` or `fixed` schema annotated with the `decimal` logical
/// type
///
/// The byte block is the unscaled value as a two's-complement big-endian
/// signed integer; the decoded decimal is `unscaled / 10^scale`. The
/// schema's precision is advisory and not enforced.
///
/// Runs before the bytes/fixed cases so that the logical type wins over the
/// physical one.
pub struct DecimalCase;

impl BuildCase for DecimalCase {
	fn name(&self) -> &'static str {
		"decimal"
	}

	fn try_build(
		&self,
		target: TypeKey,
		schema: SchemaKey,
		ctx: &mut BuildContext<'_>,
	) -> Result<CaseOutcome, BuildError> {
		let node = ctx.node(schema)?;
		let scale = match node.logical_type {
			Some(LogicalType::Decimal(ref decimal)) => decimal.scale,
			_ => {
				return Ok(CaseOutcome::Rejected(Rejection::schema_kind(
					self.name(),
					"schema carries no decimal logical type",
				)))
			}
		};
		// Accepting the logical type makes the physical type binding: a
		// decimal annotation on anything but bytes or fixed is an error, not
		// a rejection
		let fixed_size = match node.type_ {
			RegularType::Bytes => None,
			RegularType::Fixed(ref fixed) => Some(fixed.size),
			ref other => {
				return Err(BuildError::unsupported_schema(format_args!(
					"decimal logical type annotates a {} schema, expected bytes or fixed",
					schema_kind(other)
				)))
			}
		};
		let effective = convert::unwrap_optional(ctx.types(), target);
		match *ctx.spec(effective)? {
			TypeSpec::Decimal | TypeSpec::Any => {}
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::type_kind(
					self.name(),
					format!("expected a decimal target, got {}", spec_kind(other)),
				)))
			}
		}

		Ok(CaseOutcome::Reader(Arc::new(move |state| {
			let buf = match fixed_size {
				None => decode::read_bytes(state)?,
				Some(size) => decode::read_fixed(state, size)?,
			};
			decimal_from_be_bytes(&buf, scale)
		})))
	}
}

fn decimal_from_be_bytes(bytes: &[u8], scale: u32) -> Result<Value, DeError> {
	let mut buf = [0u8; 16];
	let start = buf.len().checked_sub(bytes.len()).ok_or_else(|| {
		DeError::custom(format_args!(
			"Decimals of size larger than 16 are not supported (got size {})",
			bytes.len()
		))
	})?;
	buf[start..].copy_from_slice(bytes);
	if bytes.first().is_some_and(|&v| v & 0x80 != 0) {
		// This is a negative number in CA2 repr, we need to maintain that
		// for the larger number
		for v in &mut buf[0..start] {
			*v = 0xFF;
		}
	}
	let unscaled = i128::from_be_bytes(buf);
	rust_decimal::Decimal::try_from_i128_with_scale(unscaled, scale)
		.map(Value::Decimal)
		.map_err(|e| DeError::custom(format_args!("Could not parse decimal from i128: {e}")))
}

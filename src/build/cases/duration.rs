use super::*;

/// Decodes a `fixed(12)` schema annotated with the `duration` logical type
///
/// The payload is three little-endian unsigned 32-bit counts: months, days,
/// milliseconds. Months have no fixed length in seconds, so a non-zero
/// month count cannot be represented in the target duration and errors at
/// decode time.
pub struct DurationCase;

impl BuildCase for DurationCase {
	fn name(&self) -> &'static str {
		"duration"
	}

	fn try_build(
		&self,
		target: TypeKey,
		schema: SchemaKey,
		ctx: &mut BuildContext<'_>,
	) -> Result<CaseOutcome, BuildError> {
		let node = ctx.node(schema)?;
		match node.logical_type {
			Some(LogicalType::Duration) => {}
			_ => {
				return Ok(CaseOutcome::Rejected(Rejection::schema_kind(
					self.name(),
					"schema carries no duration logical type",
				)))
			}
		}
		// Accepting the logical type makes the physical type binding
		match node.type_ {
			RegularType::Fixed(ref fixed) if fixed.size == 12 => {}
			RegularType::Fixed(ref fixed) => {
				return Err(BuildError::unsupported_schema(format_args!(
					"duration logical type annotates a fixed schema of size {}, expected 12",
					fixed.size
				)))
			}
			ref other => {
				return Err(BuildError::unsupported_schema(format_args!(
					"duration logical type annotates a {} schema, expected fixed",
					schema_kind(other)
				)))
			}
		}
		let effective = convert::unwrap_optional(ctx.types(), target);
		match *ctx.spec(effective)? {
			TypeSpec::Duration | TypeSpec::Any => {}
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::type_kind(
					self.name(),
					format!("expected a duration target, got {}", spec_kind(other)),
				)))
			}
		}

		Ok(CaseOutcome::Reader(Arc::new(|state| {
			let buf: [u8; 12] = state.read_const_size_buf()?;
			let months = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
			let days = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
			let milliseconds = u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
			if months != 0 {
				return Err(DeError::overflow(
					"a duration with a non-zero month count cannot be represented exactly",
				));
			}
			Ok(Value::Duration(
				time::Duration::days(days.into())
					+ time::Duration::milliseconds(milliseconds.into()),
			))
		})))
	}
}

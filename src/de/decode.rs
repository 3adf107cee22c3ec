//! The wire-format primitives that reader expressions are composed of

use super::{DeError, ReadState};

pub(crate) fn read_bool(state: &mut ReadState<'_>) -> Result<bool, DeError> {
	match state.read_const_size_buf::<1>()?[0] {
		0 => Ok(false),
		1 => Ok(true),
		other => Err(DeError::custom(format_args!(
			"Invalid byte value when decoding boolean: {:?}",
			other
		))),
	}
}

pub(crate) fn read_long(state: &mut ReadState<'_>) -> Result<i64, DeError> {
	state.source.read_varint()
}

pub(crate) fn read_len(state: &mut ReadState<'_>) -> Result<usize, DeError> {
	read_long(state)?
		.try_into()
		.map_err(|e| DeError::custom(format_args!("Invalid buffer length in stream: {e}")))
}

pub(crate) fn read_f32(state: &mut ReadState<'_>) -> Result<f32, DeError> {
	Ok(f32::from_le_bytes(state.read_const_size_buf()?))
}

pub(crate) fn read_f64(state: &mut ReadState<'_>) -> Result<f64, DeError> {
	Ok(f64::from_le_bytes(state.read_const_size_buf()?))
}

pub(crate) fn read_bytes(state: &mut ReadState<'_>) -> Result<Vec<u8>, DeError> {
	let len = read_len(state)?;
	state.source.read_vec(len)
}

pub(crate) fn read_string(state: &mut ReadState<'_>) -> Result<String, DeError> {
	String::from_utf8(read_bytes(state)?)
		.map_err(|e| DeError::custom(format_args!("String is not valid utf-8: {e}")))
}

pub(crate) fn read_fixed(state: &mut ReadState<'_>, size: usize) -> Result<Vec<u8>, DeError> {
	state.source.read_vec(size)
}

/// Drive the array/map block protocol
///
/// Blocks are a count followed by that many items; a negative count is
/// followed by a size in bytes (which we do not use) and stands for its
/// absolute value; a zero count terminates. Blocks concatenate.
pub(crate) fn read_blocks(
	state: &mut ReadState<'_>,
	mut emit: impl FnMut(&mut ReadState<'_>) -> Result<(), DeError>,
) -> Result<(), DeError> {
	let mut total_len: usize = 0;
	loop {
		let block_len = read_long(state)?;
		let block_len: u64 = if block_len == 0 {
			return Ok(());
		} else if block_len < 0 {
			// res = -block_len, properly handling i64::MIN
			let res = u64::from_ne_bytes(block_len.to_ne_bytes()).wrapping_neg();
			// Drop the number of bytes in the block to properly advance the
			// reader
			let _block_size_in_bytes = read_long(state)?;
			res
		} else {
			block_len as u64
		};
		let block_len: usize = block_len
			.try_into()
			.map_err(|e| DeError::custom(format_args!("Invalid array length in stream: {e}")))?;
		total_len = total_len.saturating_add(block_len);
		if total_len > state.max_seq_size {
			return Err(DeError::new("Exceeding max sequence size while decoding"));
		}
		for _ in 0..block_len {
			emit(state)?;
		}
	}
}

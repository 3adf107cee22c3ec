//! Everything a built reader needs at decode time
//!
//! The interesting work happens at build time (see [`build`](crate::build)):
//! a [`DatumReader`] is just the composed closure tree plus the decode-time
//! guards. This module holds that artifact, the [`ByteSource`](read::ByteSource)
//! abstraction it decodes from, and the wire-format primitives the closures
//! are composed of.

pub(crate) mod decode;
mod error;
pub mod read;

pub use error::DeError;

use crate::Value;

use std::sync::Arc;

/// A composed reader expression
///
/// Every node of a built reader is one of these; the closures call each
/// other, which makes the whole reader a straight recursive descent over the
/// byte source. Custom [`BuildCase`](crate::build::BuildCase)s produce and
/// compose these.
pub type ReadFn = Arc<dyn Fn(&mut ReadState<'_>) -> Result<Value, DeError> + Send + Sync>;

/// A reusable reader decoding datums of one schema into one target shape
///
/// Obtained from [`ReaderBuilder::build`](crate::build::ReaderBuilder::build).
///
/// A `DatumReader` is immutable and can be shared freely across threads; a
/// byte source, however, is exclusively held by one invocation of
/// [`read`](Self::read) for its duration.
pub struct DatumReader {
	pub(crate) root: ReadFn,
	/// If a sequence turns out to be longer than this during decoding, we
	/// will throw an error instead.
	///
	/// This is to avoid running into an infinite loop at decode time.
	/// Default for this is `1 000 000 000` (~1s CPU time)
	pub max_seq_size: usize,
	/// If a datum turns out to be deeper than this during decoding, we will
	/// throw an error instead.
	///
	/// This is to avoid running into a stack overflow at decode time.
	/// Default for this is `64`.
	pub allowed_depth: usize,
}

impl std::fmt::Debug for DatumReader {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DatumReader")
			.field("max_seq_size", &self.max_seq_size)
			.field("allowed_depth", &self.allowed_depth)
			.finish_non_exhaustive()
	}
}

impl DatumReader {
	/// Decode one datum from the given byte source
	pub fn read(&self, source: &mut dyn read::ByteSource) -> Result<Value, DeError> {
		let mut state = ReadState {
			source,
			allowed_depth: AllowedDepth::new(self.allowed_depth),
			max_seq_size: self.max_seq_size,
		};
		(self.root)(&mut state)
	}

	/// Decode one datum from a slice
	///
	/// Trailing bytes are not an error: a datum is self-delimited, so the
	/// reader consumes exactly the bytes that encode it.
	pub fn read_slice(&self, slice: &[u8]) -> Result<Value, DeError> {
		self.read(&mut read::SliceRead::new(slice))
	}

	/// Decode one datum from an [`impl BufRead`](std::io::BufRead)
	///
	/// If you only have an `impl Read`, wrap it in a
	/// [`BufReader`](std::io::BufReader) first.
	pub fn read_reader(&self, reader: impl std::io::BufRead) -> Result<Value, DeError> {
		self.read(&mut read::ReaderRead::new(reader))
	}
}

/// What a [`ReadFn`] runs against: the byte source plus decode-time guards
pub struct ReadState<'r> {
	pub(crate) source: &'r mut dyn read::ByteSource,
	pub(crate) allowed_depth: AllowedDepth,
	pub(crate) max_seq_size: usize,
}

impl ReadState<'_> {
	/// The underlying byte source
	///
	/// This is what custom [`BuildCase`](crate::build::BuildCase)s read
	/// from.
	pub fn source(&mut self) -> &mut dyn read::ByteSource {
		&mut *self.source
	}

	/// Reborrow with one less allowed level of depth
	///
	/// Called when entering a record, union, array or map, so that
	/// readers for cyclic schemas cannot stack-overflow on malicious input.
	pub(crate) fn nested(&mut self) -> Result<ReadState<'_>, DeError> {
		Ok(ReadState {
			allowed_depth: self.allowed_depth.dec()?,
			max_seq_size: self.max_seq_size,
			source: &mut *self.source,
		})
	}

	/// Read a buffer of size `N`, returning it as an array
	///
	/// This is a convenience method because readers often need fixed-size
	/// buffers to immediately turn them into values.
	pub(crate) fn read_const_size_buf<const N: usize>(&mut self) -> Result<[u8; N], DeError> {
		let mut buf = [0u8; N];
		self.source.read_exact_buf(&mut buf)?;
		Ok(buf)
	}
}

/// Allowed additional depth of the decoding
///
/// This is decremented as we advance in depth to prevent stack overflow
#[derive(Clone, Copy)]
pub(crate) struct AllowedDepth {
	allowed_additional_depth: usize,
}

impl AllowedDepth {
	pub(crate) fn new(allowed_depth: usize) -> Self {
		Self {
			allowed_additional_depth: allowed_depth,
		}
	}

	pub(crate) fn dec(self) -> Result<Self, DeError> {
		match self.allowed_additional_depth.checked_sub(1) {
			Some(allowed_additional_depth) => Ok(Self {
				allowed_additional_depth,
			}),
			None => Err(DeError::new(
				"Decoding recursivity limit reached (stack overflow prevention)",
			)),
		}
	}
}

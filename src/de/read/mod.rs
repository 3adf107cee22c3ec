//! Abstract reading from slices or any other `impl BufRead` behind the same
//! interface
//!
//! Built readers are dynamically composed, so unlike a deserializer that is
//! generic over its reader type, they go through [`ByteSource`] as a trait
//! object. The trait is consequently kept object-safe: varints are always
//! decoded to `i64` (Avro uses signed 64-bit integers everywhere) and
//! variable-size reads produce owned buffers.

use super::DeError;

use integer_encoding::VarInt;

/// Abstracts reading from slices or any other `impl BufRead` behind the same
/// interface
///
/// Built readers decode through this.
pub trait ByteSource {
	/// Read a zig-zag varint-encoded signed 64-bit integer
	fn read_varint(&mut self) -> Result<i64, DeError>;
	/// Fill `buf` entirely from the underlying bytes; shorter reads are
	/// errors
	fn read_exact_buf(&mut self, buf: &mut [u8]) -> Result<(), DeError>;
	/// Read exactly `n` bytes into an owned buffer
	fn read_vec(&mut self, n: usize) -> Result<Vec<u8>, DeError>;
}

/// Implements [`ByteSource`] reading from a `&[u8]`
pub struct SliceRead<'a> {
	slice: &'a [u8],
}
impl<'a> SliceRead<'a> {
	/// Construct a `SliceRead` from a `&[u8]`
	pub fn new(slice: &'a [u8]) -> Self {
		Self { slice }
	}

	/// The bytes that have not been consumed yet
	pub fn remaining(&self) -> &'a [u8] {
		self.slice
	}
}
impl ByteSource for SliceRead<'_> {
	fn read_varint(&mut self) -> Result<i64, DeError> {
		match i64::decode_var(self.slice) {
			None => Err(DeError::new(
				"All bytes have MSB set when decoding varint (Reached EOF)",
			)),
			Some((val, read)) => {
				self.slice = &self.slice[read..];
				Ok(val)
			}
		}
	}

	fn read_exact_buf(&mut self, buf: &mut [u8]) -> Result<(), DeError> {
		if buf.len() > self.slice.len() {
			Err(DeError::unexpected_eof())
		} else {
			let (just_read, end) = self.slice.split_at(buf.len());
			buf.copy_from_slice(just_read);
			self.slice = end;
			Ok(())
		}
	}

	fn read_vec(&mut self, n: usize) -> Result<Vec<u8>, DeError> {
		if n > self.slice.len() {
			Err(DeError::unexpected_eof())
		} else {
			let (just_read, end) = self.slice.split_at(n);
			self.slice = end;
			Ok(just_read.to_vec())
		}
	}
}

/// Implements [`ByteSource`] reading from any `impl BufRead`
pub struct ReaderRead<R> {
	reader: R,
	/// Maximum allocation size for a single field (string, bytes...)
	///
	/// This is a safeguard for malformed data
	///
	/// Default is 512 MB.
	pub max_alloc_size: usize,
}
impl<R: std::io::BufRead> ReaderRead<R> {
	/// Construct a `ReaderRead` from an `impl BufRead`
	///
	/// If you only have an `impl Read`, wrap it in a
	/// [`BufReader`](std::io::BufReader) first.
	pub fn new(reader: R) -> Self {
		Self {
			reader,
			max_alloc_size: 512 * 1024 * 1024,
		}
	}
}
impl<R> ReaderRead<R> {
	/// Consume the `ReaderRead` and return the inner reader
	pub fn into_inner(self) -> R {
		self.reader
	}
}
impl<R: std::io::BufRead> ByteSource for ReaderRead<R> {
	fn read_varint(&mut self) -> Result<i64, DeError> {
		// Try to decode in one go from the buffer slice.
		// On buffer refill boundaries, that may fail, so we fall back to
		// reading byte by byte (that's slightly sub-optimal but also will
		// trigger extremely rarely).
		match i64::decode_var(self.reader.fill_buf().map_err(DeError::io)?) {
			Some((val, read)) => {
				self.reader.consume(read);
				Ok(val)
			}
			None => {
				let mut unsigned: u64 = 0;
				for i in 0..10 {
					let mut byte = [0u8; 1];
					self.reader.read_exact(&mut byte).map_err(DeError::io)?;
					unsigned |= u64::from(byte[0] & 0x7F) << (7 * i);
					if byte[0] & 0x80 == 0 {
						// Zig-zag decoding
						return Ok((unsigned >> 1) as i64 ^ -((unsigned & 1) as i64));
					}
				}
				Err(DeError::new(
					"Varints longer than 10 bytes are not supported",
				))
			}
		}
	}

	fn read_exact_buf(&mut self, buf: &mut [u8]) -> Result<(), DeError> {
		self.reader.read_exact(buf).map_err(DeError::io)
	}

	fn read_vec(&mut self, n: usize) -> Result<Vec<u8>, DeError> {
		if n > self.max_alloc_size {
			return Err(DeError::custom(format_args!(
				"Allocation size that would be required ({n}) is larger than \
					allowed for this reader ({}) - \
					this is probably due to malformed data",
				self.max_alloc_size
			)));
		}
		let mut buf = vec![0u8; n];
		self.reader.read_exact(&mut buf).map_err(DeError::io)?;
		Ok(buf)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn varint_zigzag_from_slice() {
		let mut read = SliceRead::new(&[0x02, 0x01, 0x00, 0xC8, 0x01]);
		assert_eq!(read.read_varint().unwrap(), 1);
		assert_eq!(read.read_varint().unwrap(), -1);
		assert_eq!(read.read_varint().unwrap(), 0);
		assert_eq!(read.read_varint().unwrap(), 100);
	}

	#[test]
	fn varint_too_long_from_reader() {
		// 11 bytes with the continuation bit set
		let bytes = [0xFFu8; 11];
		let mut read = ReaderRead::new(std::io::BufReader::with_capacity(1, &bytes[..]));
		assert!(matches!(read.read_varint().unwrap_err(), DeError::Decode(_)));
	}

	#[test]
	fn eof_is_an_error() {
		let mut read = SliceRead::new(&[0x01, 0x02]);
		assert!(matches!(read.read_vec(3).unwrap_err(), DeError::Decode(_)));
	}
}

use bytes::Bytes;

/// Errors surfaced by [`RecvBuffer::append`].
///
/// Both are recoverable: the owning connection is closed, the process and
/// every other connection stay alive.
#[derive(Debug)]
pub enum BufferError {
    /// A single append exceeded the buffer's growth unit.
    OversizedAppend { len: usize, chunk_size: usize },
    /// Growing the storage by one more chunk failed.
    OutOfMemory,
}

/// Append-only byte accumulator for one in-flight request.
///
/// Storage grows in `chunk_size` units so that reallocation is amortized
/// while each append stays bounded by the reactor's scratch read buffer.
#[derive(Debug)]
pub struct RecvBuffer {
    data: Vec<u8>,
    chunk_size: usize,
    chunks: usize,
}

impl RecvBuffer {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            data: Vec::with_capacity(chunk_size),
            chunk_size,
            chunks: 1,
        }
    }

    /// Copies `bytes` at the current tail, growing by one chunk once the
    /// allocated chunk area fills up. Growth never shrinks or compacts.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        if bytes.len() > self.chunk_size {
            return Err(BufferError::OversizedAppend {
                len: bytes.len(),
                chunk_size: self.chunk_size,
            });
        }

        self.data.extend_from_slice(bytes);

        if self.data.len() >= self.chunks * self.chunk_size {
            self.data
                .try_reserve(self.chunk_size)
                .map_err(|_| BufferError::OutOfMemory)?;
            self.chunks += 1;
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of chunk-size units allocated so far.
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Hands the accumulated bytes to the caller; the buffer is consumed.
    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_one_chunk_at_a_time() {
        let mut buf = RecvBuffer::new(4);
        buf.append(b"abcd").unwrap();
        assert_eq!(buf.chunks(), 2);
        buf.append(b"efgh").unwrap();
        assert_eq!(buf.chunks(), 3);
        assert_eq!(buf.bytes(), b"abcdefgh");
    }

    #[test]
    fn oversized_append_is_an_error_not_a_crash() {
        let mut buf = RecvBuffer::new(4);
        assert!(matches!(
            buf.append(b"abcde"),
            Err(BufferError::OversizedAppend { len: 5, chunk_size: 4 })
        ));
        assert!(buf.is_empty());
    }
}

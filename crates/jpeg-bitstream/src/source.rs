use crate::error::Result;

/// Forward-only byte supplier the lexer pulls from.
///
/// The lexer needs nothing beyond single-byte consumption; `read_exact` is a
/// provided helper that buffered implementations can override. Memory
/// buffers, files, and sockets conform identically.
pub trait ByteSource {
    /// Reads the next byte, or `None` at end of stream.
    fn next_byte(&mut self) -> Result<Option<u8>>;

    /// Fills `buf` from the stream, returning how many bytes were read
    /// before the stream ended.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<usize> {
        for (idx, slot) in buf.iter_mut().enumerate() {
            match self.next_byte()? {
                Some(b) => *slot = b,
                None => return Ok(idx),
            }
        }
        Ok(buf.len())
    }
}

/// Byte source over a borrowed in-memory buffer.
#[derive(Debug, Clone)]
pub struct SliceSource<'buf> {
    bytes: &'buf [u8],
}

impl<'buf> SliceSource<'buf> {
    #[inline]
    pub fn new(bytes: &'buf [u8]) -> Self {
        Self { bytes }
    }

    /// Bytes not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }
}

impl ByteSource for SliceSource<'_> {
    #[inline]
    fn next_byte(&mut self) -> Result<Option<u8>> {
        let Some((&b, rest)) = self.bytes.split_first() else {
            return Ok(None);
        };
        self.bytes = rest;
        Ok(Some(b))
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = buf.len().min(self.bytes.len());
        let (head, rest) = self.bytes.split_at(n);
        buf[..n].copy_from_slice(head);
        self.bytes = rest;
        Ok(n)
    }
}

/// Buffering byte source over any [`std::io::Read`].
pub struct ReaderSource<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
    filled: usize,
}

impl<R> std::fmt::Debug for ReaderSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderSource")
            .field("pos", &self.pos)
            .field("filled", &self.filled)
            .finish_non_exhaustive()
    }
}

impl<R: std::io::Read> ReaderSource<R> {
    const BUF_SIZE: usize = 8192;

    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: vec![0; Self::BUF_SIZE],
            pos: 0,
            filled: 0,
        }
    }

    fn refill(&mut self) -> Result<()> {
        self.pos = 0;
        self.filled = self.inner.read(&mut self.buf)?;
        Ok(())
    }
}

impl<R: std::io::Read> ByteSource for ReaderSource<R> {
    fn next_byte(&mut self) -> Result<Option<u8>> {
        if self.pos == self.filled {
            self.refill()?;
            if self.filled == 0 {
                return Ok(None);
            }
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(Some(b))
    }
}

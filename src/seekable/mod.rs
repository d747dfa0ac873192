use std::io::{self, BufRead, Read, Seek, SeekFrom};

/// Random-access view over an immutable byte slice.
///
/// The container reader only needs `Read`, but it expects the input to
/// behave like a file: a length, a position that can be moved, and
/// end-of-data once the position reaches the end.
///
/// Positions past the end are accepted. Reading there yields `Ok(0)`.
#[derive(Clone, Debug)]
pub struct SeekableByteView<'a> {
    buf: &'a [u8],
    pos: u64,
}

impl<'a> SeekableByteView<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        SeekableByteView { buf, pos: 0 }
    }

    pub fn length(&self) -> u64 {
        self.buf.len() as u64
    }

    /// Moves the current position to `position`.
    ///
    /// The position is not checked against the length.
    pub fn seek_to(&mut self, position: u64) {
        self.pos = position;
    }

    pub fn tell(&self) -> u64 {
        self.pos
    }

    /// Bytes between the current position and the end of the view.
    pub fn remaining(&self) -> &'a [u8] {
        let start = self.pos.min(self.length()) as usize;
        &self.buf[start..]
    }
}

impl<'a> Read for SeekableByteView<'a> {
    fn read(&mut self, dest: &mut [u8]) -> io::Result<usize> {
        let data = self.remaining();
        let num_bytes = data.len().min(dest.len());
        dest[..num_bytes].copy_from_slice(&data[..num_bytes]);
        self.pos += num_bytes as u64;
        Ok(num_bytes)
    }
}

impl<'a> BufRead for SeekableByteView<'a> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Ok(self.remaining())
    }

    fn consume(&mut self, amt: usize) {
        self.pos += amt as u64;
    }
}

impl<'a> Seek for SeekableByteView<'a> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (base, offset) = match pos {
            SeekFrom::Start(position) => {
                self.pos = position;
                return Ok(position);
            }
            SeekFrom::End(offset) => (self.length(), offset),
            SeekFrom::Current(offset) => (self.pos, offset),
        };
        let new_pos = if offset >= 0 {
            base.checked_add(offset as u64)
        } else {
            base.checked_sub(offset.unsigned_abs())
        };
        match new_pos {
            Some(position) => {
                self.pos = position;
                Ok(position)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Invalid seek to a negative or overflowing position".to_string(),
            )),
        }
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.pos)
    }
}

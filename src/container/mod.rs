//! Framing of a single value into a self-describing container blob.
//!
//! The blob is an Avro object container: the magic bytes, a header
//! holding the writer schema and a sync marker, then one data block
//! terminated by that same sync marker.
mod check;
mod reader;
mod writer;

pub use self::reader::embedded_schema;
pub(crate) use self::reader::{read_first, read_first_from};
pub(crate) use self::writer::write_single;

/// Every container blob starts with these four bytes.
pub const CONTAINER_MAGIC: [u8; 4] = *b"Obj\x01";

pub(crate) const SYNC_LEN: usize = 16;

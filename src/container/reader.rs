use std::io::Read;

use apache_avro::types::Value;
use apache_avro::{Reader, Schema};

use super::check::{catch_corruption, check_container};
use crate::error::SerializationError;
use crate::seekable::SeekableByteView;

/// Opens a container over `bytes`, using `schema` as reader schema, and
/// returns its first record.
///
/// Records after the first one are never decoded.
pub(crate) fn read_first(schema: &Schema, bytes: &[u8]) -> Result<Value, SerializationError> {
    check_container(bytes)?;
    catch_corruption("container reader", || {
        let mut reader = Reader::with_schema(schema, SeekableByteView::new(bytes))
            .map_err(SerializationError::Decode)?;
        match reader.next() {
            Some(Ok(value)) => Ok(value),
            Some(Err(decode_err)) => Err(SerializationError::Decode(decode_err)),
            None => Err(SerializationError::EmptyContainer),
        }
    })
}

/// Same as [`read_first`], for a blob read entirely from `source`.
///
/// `source` is dropped once drained, before decoding starts.
pub(crate) fn read_first_from<R: Read>(
    schema: &Schema,
    mut source: R,
) -> Result<Value, SerializationError> {
    let mut bytes = Vec::new();
    source.read_to_end(&mut bytes)?;
    drop(source);
    read_first(schema, &bytes)
}

/// Returns the writer schema embedded in a container blob.
pub fn embedded_schema(bytes: &[u8]) -> Result<Schema, SerializationError> {
    check_container(bytes)
}

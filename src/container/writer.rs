use std::io::Write;

use apache_avro::types::Value;
use apache_avro::{Schema, Writer};

use crate::error::SerializationError;

/// Writes `value` as the only record of a new container over `sink`.
///
/// The sink is handed back once the container is flushed. On error, the
/// container writer and the sink are dropped before returning, and
/// nothing is flushed.
pub(crate) fn write_single<W: Write>(
    schema: &Schema,
    value: &Value,
    sink: W,
) -> Result<W, SerializationError> {
    let mut writer = Writer::new(schema, sink);
    writer
        .append_value_ref(value)
        .map_err(SerializationError::Encode)?;
    let sink = writer.into_inner().map_err(SerializationError::Encode)?;
    Ok(sink)
}

//! Structural checks run on a blob before it is handed to the container
//! reader.
//!
//! The reader trusts the lengths and counts it finds in the blob and
//! allocates accordingly. Every length, count and index is checked here
//! against the bytes actually available, for the header and for the
//! first record, so that a corrupted blob is rejected before anything is
//! allocated for it.
use std::collections::HashMap;
use std::convert::TryFrom;
use std::panic::{self, AssertUnwindSafe};

use apache_avro::Schema;
use serde_json::Value as Json;

use super::{CONTAINER_MAGIC, SYNC_LEN};
use crate::error::SerializationError;
use crate::seekable::SeekableByteView;

/// Deepest nesting of values accepted in a record.
const MAX_DEPTH: usize = 1024;

const SCHEMA_KEY: &[u8] = b"avro.schema";
const CODEC_KEY: &[u8] = b"avro.codec";

fn corrupted(reason: impl Into<String>) -> SerializationError {
    SerializationError::Corrupted(reason.into())
}

/// Runs `decode`, turning a panic inside the container library into a
/// [`SerializationError::Corrupted`].
pub(crate) fn catch_corruption<T>(
    stage: &str,
    decode: impl FnOnce() -> Result<T, SerializationError>,
) -> Result<T, SerializationError> {
    panic::catch_unwind(AssertUnwindSafe(decode))
        .unwrap_or_else(|_| Err(corrupted(format!("{} aborted on malformed input", stage))))
}

fn take<'a>(view: &mut SeekableByteView<'a>, len: u64) -> Result<&'a [u8], SerializationError> {
    let remaining = view.remaining();
    if len > remaining.len() as u64 {
        return Err(corrupted(format!(
            "{} bytes declared at offset {}, only {} available",
            len,
            view.tell(),
            remaining.len()
        )));
    }
    view.seek_to(view.tell() + len);
    Ok(&remaining[..len as usize])
}

fn read_long(view: &mut SeekableByteView) -> Result<i64, SerializationError> {
    let mut raw = 0u64;
    for shift in (0..70).step_by(7) {
        let byte = take(view, 1)?[0];
        raw |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok((raw >> 1) as i64 ^ -((raw & 1) as i64));
        }
    }
    Err(corrupted(format!("varint too long at offset {}", view.tell())))
}

/// Reads a length prefix, which must fit in the rest of the view.
fn read_len(view: &mut SeekableByteView) -> Result<u64, SerializationError> {
    let len = read_long(view)?;
    if len < 0 || len as u64 > view.remaining().len() as u64 {
        return Err(corrupted(format!(
            "invalid length {} at offset {}",
            len,
            view.tell()
        )));
    }
    Ok(len as u64)
}

fn read_bytes<'a>(view: &mut SeekableByteView<'a>) -> Result<&'a [u8], SerializationError> {
    let len = read_len(view)?;
    take(view, len)
}

/// Reads the item count heading a block of an array or a map.
///
/// Returns `None` on the terminating empty block.
fn read_block_count(view: &mut SeekableByteView) -> Result<Option<u64>, SerializationError> {
    let count = read_long(view)?;
    if count == 0 {
        return Ok(None);
    }
    if count < 0 {
        // Byte size of the block, only there to allow skipping it.
        read_len(view)?;
    }
    let count = count.unsigned_abs();
    if count > view.remaining().len() as u64 {
        return Err(corrupted(format!(
            "block of {} items at offset {} exceeds the container",
            count,
            view.tell()
        )));
    }
    Ok(Some(count))
}

/// Checks the framing of a container blob and the encoding of its first
/// record, and returns the writer schema it embeds.
pub(crate) fn check_container(bytes: &[u8]) -> Result<Schema, SerializationError> {
    let mut view = SeekableByteView::new(bytes);
    if view.length() < CONTAINER_MAGIC.len() as u64
        || take(&mut view, CONTAINER_MAGIC.len() as u64)? != CONTAINER_MAGIC
    {
        return Err(corrupted("missing container magic"));
    }
    let mut schema_json = None;
    let mut codec = None;
    while let Some(count) = read_block_count(&mut view)? {
        for _ in 0..count {
            let key = read_bytes(&mut view)?;
            let value = read_bytes(&mut view)?;
            if key == SCHEMA_KEY {
                schema_json = Some(value);
            } else if key == CODEC_KEY {
                codec = Some(value);
            }
        }
    }
    match codec {
        None | Some(b"null") => {}
        Some(other) => {
            return Err(corrupted(format!(
                "unsupported codec `{}`",
                String::from_utf8_lossy(other)
            )))
        }
    }
    let schema_json = schema_json.ok_or_else(|| corrupted("no schema in container header"))?;
    let schema_json = std::str::from_utf8(schema_json)
        .map_err(|_| corrupted("container schema is not valid utf-8"))?;
    let (schema, canonical_form) = catch_corruption("schema parser", || {
        let schema = Schema::parse_str(schema_json).map_err(SerializationError::Decode)?;
        let canonical_form = schema.canonical_form();
        Ok((schema, canonical_form))
    })?;
    let sync = take(&mut view, SYNC_LEN as u64)?;

    if view.remaining().is_empty() {
        return Ok(schema);
    }
    let object_count = read_long(&mut view)?;
    let block_len = read_len(&mut view)?;
    if object_count < 1 || object_count as u64 > block_len.max(1) {
        return Err(corrupted(format!(
            "invalid record count {} for a block of {} bytes",
            object_count, block_len
        )));
    }
    let block = take(&mut view, block_len)?;
    if take(&mut view, SYNC_LEN as u64)? != sync {
        return Err(corrupted("sync marker mismatch after first block"));
    }

    let schema_tree: Json = serde_json::from_str(&canonical_form)
        .map_err(|_| corrupted("unreadable canonical schema"))?;
    let checker = RecordChecker::new(&schema_tree);
    checker.check(&schema_tree, &mut SeekableByteView::new(block), 0)?;
    Ok(schema)
}

/// Walks one encoded value against the JSON form of its writer schema.
struct RecordChecker<'s> {
    named: HashMap<String, &'s Json>,
}

impl<'s> RecordChecker<'s> {
    fn new(schema_tree: &'s Json) -> Self {
        let mut checker = RecordChecker {
            named: HashMap::new(),
        };
        checker.index_named(schema_tree);
        checker
    }

    /// Named types can be referenced from a branch that is not visited
    /// before the definition, so they are all indexed upfront.
    fn index_named(&mut self, node: &'s Json) {
        match node {
            Json::Object(object) => {
                let kind = object.get("type").and_then(Json::as_str);
                let name = object.get("name").and_then(Json::as_str);
                if let (Some("record" | "error" | "enum" | "fixed"), Some(name)) = (kind, name) {
                    self.named.insert(name.to_string(), node);
                    if let Some(namespace) = object.get("namespace").and_then(Json::as_str) {
                        self.named.insert(format!("{}.{}", namespace, name), node);
                    }
                    if let Some(short_name) = name.rsplit('.').next() {
                        self.named.entry(short_name.to_string()).or_insert(node);
                    }
                }
                for child in object.values() {
                    self.index_named(child);
                }
            }
            Json::Array(children) => {
                for child in children {
                    self.index_named(child);
                }
            }
            _ => {}
        }
    }

    fn check(
        &self,
        schema: &'s Json,
        view: &mut SeekableByteView,
        depth: usize,
    ) -> Result<(), SerializationError> {
        if depth > MAX_DEPTH {
            return Err(corrupted("record nested too deeply"));
        }
        match schema {
            Json::String(type_name) => self.check_by_name(type_name, view, depth),
            Json::Array(branches) => {
                let index = read_long(view)?;
                let branch = usize::try_from(index)
                    .ok()
                    .and_then(|index| branches.get(index))
                    .ok_or_else(|| corrupted(format!("invalid union branch {}", index)))?;
                self.check(branch, view, depth + 1)
            }
            Json::Object(object) => {
                let kind = match object.get("type") {
                    Some(Json::String(kind)) => kind.as_str(),
                    Some(inner) => return self.check(inner, view, depth + 1),
                    None => return Err(corrupted("schema node without a type")),
                };
                match kind {
                    "record" | "error" => {
                        let fields = object
                            .get("fields")
                            .and_then(Json::as_array)
                            .ok_or_else(|| corrupted("record schema without fields"))?;
                        for field in fields {
                            let field_schema = field
                                .get("type")
                                .ok_or_else(|| corrupted("record field without a type"))?;
                            self.check(field_schema, view, depth + 1)?;
                        }
                        Ok(())
                    }
                    "enum" => read_long(view).map(drop),
                    "fixed" => {
                        let size = object
                            .get("size")
                            .and_then(Json::as_u64)
                            .ok_or_else(|| corrupted("fixed schema without a size"))?;
                        take(view, size).map(drop)
                    }
                    "array" => {
                        let items = object
                            .get("items")
                            .ok_or_else(|| corrupted("array schema without items"))?;
                        while let Some(count) = read_block_count(view)? {
                            for _ in 0..count {
                                self.check(items, view, depth + 1)?;
                            }
                        }
                        Ok(())
                    }
                    "map" => {
                        let values = object
                            .get("values")
                            .ok_or_else(|| corrupted("map schema without values"))?;
                        while let Some(count) = read_block_count(view)? {
                            for _ in 0..count {
                                read_bytes(view)?;
                                self.check(values, view, depth + 1)?;
                            }
                        }
                        Ok(())
                    }
                    primitive => self.check_by_name(primitive, view, depth),
                }
            }
            _ => Err(corrupted("unexpected schema node")),
        }
    }

    fn check_by_name(
        &self,
        type_name: &str,
        view: &mut SeekableByteView,
        depth: usize,
    ) -> Result<(), SerializationError> {
        match type_name {
            "null" => Ok(()),
            "boolean" => take(view, 1).map(drop),
            "int" | "long" => read_long(view).map(drop),
            "float" => take(view, 4).map(drop),
            "double" => take(view, 8).map(drop),
            "bytes" | "string" => read_bytes(view).map(drop),
            reference => {
                let named = self
                    .named
                    .get(reference)
                    .copied()
                    .ok_or_else(|| corrupted(format!("unknown type `{}`", reference)))?;
                self.check(named, view, depth + 1)
            }
        }
    }
}

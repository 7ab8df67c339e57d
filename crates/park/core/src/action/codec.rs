//! Bit-exact wire encoding of actions.
//!
//! Layout, all integers big-endian:
//!
//! | field        | type | notes                         |
//! |--------------|------|-------------------------------|
//! | kind         | u32  | [`CommandKind`] tag           |
//! | network id   | u32  | `u32::MAX` when unassigned    |
//! | flags        | u32  | [`CommandFlags`] bits         |
//! | actor        | u32  | `u32::MAX` for system actions |
//! | body         | ...  | fields in visitor order       |
//!
//! Strings are a u16 byte length followed by UTF-8; bools are one byte.
//!
//! [`CommandKind`]: super::CommandKind

use crate::error::{ErrorSeverity, ParkError};
use crate::state::{NetworkId, PlayerId};

use super::registry::{ActionRegistry, RegistryError};
use super::visitor::ParameterVisitor;
use super::{Action, CommandFlags};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("unexpected end of input reading `{field}` at byte {offset}")]
    UnexpectedEof { field: &'static str, offset: usize },

    #[error("{0} trailing bytes after action body")]
    TrailingBytes(usize),

    #[error("field `{0}` is not valid UTF-8")]
    InvalidUtf8(&'static str),

    #[error("field `{field}` is {len} bytes, longer than a u16 length prefix allows")]
    StringTooLong { field: &'static str, len: usize },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ParkError for CodecError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            CodecError::StringTooLong { .. } => ErrorSeverity::Validation,
            CodecError::Registry(error) => error.severity(),
            CodecError::UnexpectedEof { .. }
            | CodecError::TrailingBytes(_)
            | CodecError::InvalidUtf8(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            CodecError::UnexpectedEof { .. } => "CODEC_UNEXPECTED_EOF",
            CodecError::TrailingBytes(_) => "CODEC_TRAILING_BYTES",
            CodecError::InvalidUtf8(_) => "CODEC_INVALID_UTF8",
            CodecError::StringTooLong { .. } => "CODEC_STRING_TOO_LONG",
            CodecError::Registry(error) => error.error_code(),
        }
    }
}

/// Encodes an action into its wire form.
///
/// # Errors
///
/// Returns `CodecError::StringTooLong` if a string field cannot be length-prefixed.
pub fn encode(action: &Action) -> Result<Vec<u8>, CodecError> {
    let mut encoder = Encoder::default();
    encoder.put_u32(action.kind().tag());
    encoder.put_u32(action.network_id.map_or(NetworkId::NONE_WIRE, |id| id.0));
    encoder.put_u32(action.flags.bits());
    encoder.put_u32(action.actor.map_or(PlayerId::UNSET_WIRE, |actor| actor.0));

    let mut body = action.body.clone();
    body.accept_parameters(&mut encoder);

    match encoder.error {
        Some(error) => Err(error),
        None => Ok(encoder.bytes),
    }
}

/// Decodes an action using the process-wide registry.
///
/// # Errors
///
/// See [`decode_with`].
pub fn decode(bytes: &[u8]) -> Result<Action, CodecError> {
    decode_with(ActionRegistry::global(), bytes)
}

/// Decodes an action, materializing the body through `registry`.
///
/// # Errors
///
/// Fails on unknown tags, truncated input, invalid UTF-8 and trailing bytes.
pub fn decode_with(registry: &ActionRegistry, bytes: &[u8]) -> Result<Action, CodecError> {
    let mut decoder = Decoder::new(bytes);
    let tag = decoder.read_u32("kind")?;
    let mut body = registry.create(tag)?;
    let network_id = decoder.read_u32("network_id")?;
    let flags = decoder.read_u32("flags")?;
    let actor = decoder.read_u32("actor")?;

    body.accept_parameters(&mut decoder);
    if let Some(error) = decoder.error {
        return Err(error);
    }
    let remaining = decoder.remaining();
    if remaining != 0 {
        return Err(CodecError::TrailingBytes(remaining));
    }

    Ok(Action {
        actor: (actor != PlayerId::UNSET_WIRE).then_some(PlayerId(actor)),
        flags: CommandFlags::from_bits_retain(flags),
        network_id: (network_id != NetworkId::NONE_WIRE).then_some(NetworkId(network_id)),
        body,
    })
}

#[derive(Default)]
struct Encoder {
    bytes: Vec<u8>,
    error: Option<CodecError>,
}

impl Encoder {
    fn put_u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }
}

impl ParameterVisitor for Encoder {
    fn visit_bool(&mut self, _name: &'static str, value: &mut bool) {
        self.bytes.push(u8::from(*value));
    }

    fn visit_u8(&mut self, _name: &'static str, value: &mut u8) {
        self.bytes.push(*value);
    }

    fn visit_u16(&mut self, _name: &'static str, value: &mut u16) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    fn visit_u32(&mut self, _name: &'static str, value: &mut u32) {
        self.put_u32(*value);
    }

    fn visit_i32(&mut self, _name: &'static str, value: &mut i32) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    fn visit_i64(&mut self, _name: &'static str, value: &mut i64) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    fn visit_string(&mut self, name: &'static str, value: &mut String) {
        let Ok(len) = u16::try_from(value.len()) else {
            self.error.get_or_insert(CodecError::StringTooLong {
                field: name,
                len: value.len(),
            });
            return;
        };
        self.bytes.extend_from_slice(&len.to_be_bytes());
        self.bytes.extend_from_slice(value.as_bytes());
    }
}

struct Decoder<'a> {
    bytes: &'a [u8],
    offset: usize,
    error: Option<CodecError>,
}

impl<'a> Decoder<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            error: None,
        }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, field: &'static str, len: usize) -> Result<&'a [u8], CodecError> {
        let bytes = self.bytes;
        let end = self.offset.checked_add(len).filter(|end| *end <= bytes.len());
        match end {
            Some(end) => {
                let slice = &bytes[self.offset..end];
                self.offset = end;
                Ok(slice)
            }
            None => Err(CodecError::UnexpectedEof {
                field,
                offset: self.offset,
            }),
        }
    }

    fn take_array<const N: usize>(
        &mut self,
        field: &'static str,
    ) -> Result<[u8; N], CodecError> {
        let slice = self.take(field, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn read_u32(&mut self, field: &'static str) -> Result<u32, CodecError> {
        self.take_array(field).map(u32::from_be_bytes)
    }

    /// Reads one field into `slot`, recording the first failure.
    fn read_into<T>(
        &mut self,
        slot: &mut T,
        read: impl FnOnce(&mut Self) -> Result<T, CodecError>,
    ) {
        if self.error.is_some() {
            return;
        }
        match read(self) {
            Ok(value) => *slot = value,
            Err(error) => self.error = Some(error),
        }
    }
}

impl ParameterVisitor for Decoder<'_> {
    fn visit_bool(&mut self, name: &'static str, value: &mut bool) {
        self.read_into(value, |d| d.take_array::<1>(name).map(|[b]| b != 0));
    }

    fn visit_u8(&mut self, name: &'static str, value: &mut u8) {
        self.read_into(value, |d| d.take_array::<1>(name).map(|[b]| b));
    }

    fn visit_u16(&mut self, name: &'static str, value: &mut u16) {
        self.read_into(value, |d| d.take_array(name).map(u16::from_be_bytes));
    }

    fn visit_u32(&mut self, name: &'static str, value: &mut u32) {
        self.read_into(value, |d| d.read_u32(name));
    }

    fn visit_i32(&mut self, name: &'static str, value: &mut i32) {
        self.read_into(value, |d| d.take_array(name).map(i32::from_be_bytes));
    }

    fn visit_i64(&mut self, name: &'static str, value: &mut i64) {
        self.read_into(value, |d| d.take_array(name).map(i64::from_be_bytes));
    }

    fn visit_string(&mut self, name: &'static str, value: &mut String) {
        self.read_into(value, |d| {
            let len = d.take_array(name).map(u16::from_be_bytes)?;
            let raw = d.take(name, usize::from(len))?;
            String::from_utf8(raw.to_vec()).map_err(|_| CodecError::InvalidUtf8(name))
        });
    }
}

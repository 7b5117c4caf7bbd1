//! Error types for the typed field model and the wire codec. See the
//! module docs on `field`, `typedef`, `encoder` and `decoder` for where
//! each variant is raised.

use std::fmt;

/// Raised while building a [`crate::field::FieldDefinition`] or
/// [`crate::typedef::TypeDefinition`] from a declaration, or while
/// constructing a [`crate::primitive::PrimitiveValue`].
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum BuildError {
    /// A field name does not match `[\w-]+` once lowercased.
    InvalidFieldName { name: String },

    /// A quantifier (`+`/`*`) was attached to a field that is not the
    /// last one in the declaration.
    QuantifierPositionError { field: String },

    /// Two fields in the same type definition share a name.
    DuplicateFieldName { name: String },

    /// A primitive value failed its own validity constraint: an
    /// integer out of range, a string or label too long, a malformed
    /// address, and so on.
    FieldValueOutOfRange { reason: String },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BuildError::InvalidFieldName { name } => {
                write!(f, "invalid field name: {name:?}")
            }
            BuildError::QuantifierPositionError { field } => {
                write!(f, "quantifier on non-final field: {field:?}")
            }
            BuildError::DuplicateFieldName { name } => {
                write!(f, "duplicate field name: {name:?}")
            }
            BuildError::FieldValueOutOfRange { reason } => {
                write!(f, "field value out of range: {reason}")
            }
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// Raised while turning a [`crate::message::Message`] into wire bytes.
///
/// The 512-byte (or caller-chosen) budget is deliberately absent from
/// this enum: exceeding it is not an error, it causes truncation (the
/// header's TC bit is set and the remaining records are dropped). See
/// `spec.md` §7.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum EncodeError {
    /// A counter (section length) does not fit in the wire width.
    CounterTooLarge { counter: usize, bits: u32 },

    /// A primitive value's kind tag has no registered encoder. Only
    /// possible if a `TypeDefinition` and the values handed to its
    /// `RecordData` disagree, which the `rdata` module's constructors
    /// are supposed to prevent.
    UnknownTypeKind,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EncodeError::CounterTooLarge { counter, bits } => {
                write!(f, "'{counter}' cannot be converted to a u{bits}")
            }
            EncodeError::UnknownTypeKind => {
                write!(f, "no encoder registered for this value's kind")
            }
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// Raised while parsing wire bytes into a [`crate::message::Message`].
///
/// Variants carry the message `id` where one has already been read, so
/// a caller can build a matching error response (mirroring the
/// teacher's `protocol::deserialise::Error`, which does the same for
/// exactly this reason).
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum DecodeError {
    /// Fewer than 2 octets total: not even an ID can be read, so no
    /// error response can be correlated to a query.
    CompletelyBusted,

    /// The packet ends before a field that is required at this point.
    ShortRead { id: Option<u16> },

    /// A label length byte has the reserved top-bit pattern `10` or
    /// `01`.
    ReservedLabelType { id: Option<u16> },

    /// A compression pointer targets an offset at or beyond the total
    /// packet length.
    PointerOutOfBounds { id: Option<u16> },

    /// Following compression pointers while decoding one name revisited
    /// an offset already seen during that same decode.
    CompressionLoop { id: Option<u16> },

    /// A decoded domain name's wire length exceeds 255 octets, or its
    /// label-following chain exceeds the 255/2 bound.
    NameTooLong { id: Option<u16> },

    /// The number of octets consumed decoding a record's RDATA did not
    /// equal the record's declared RDLENGTH.
    RdataLengthMismatch { id: Option<u16> },
}

impl DecodeError {
    /// The message ID this error occurred while decoding, if one was
    /// successfully read from the header first.
    pub fn id(&self) -> Option<u16> {
        match self {
            DecodeError::CompletelyBusted => None,
            DecodeError::ShortRead { id }
            | DecodeError::ReservedLabelType { id }
            | DecodeError::PointerOutOfBounds { id }
            | DecodeError::CompressionLoop { id }
            | DecodeError::NameTooLong { id }
            | DecodeError::RdataLengthMismatch { id } => *id,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecodeError::CompletelyBusted => {
                write!(f, "packet is too short to contain even a message ID")
            }
            DecodeError::ShortRead { .. } => {
                write!(f, "packet ended before a required field")
            }
            DecodeError::ReservedLabelType { .. } => {
                write!(f, "label length byte uses a reserved top-bit pattern")
            }
            DecodeError::PointerOutOfBounds { .. } => {
                write!(f, "compression pointer targets an offset beyond the packet")
            }
            DecodeError::CompressionLoop { .. } => {
                write!(f, "compression pointer chain revisits an offset")
            }
            DecodeError::NameTooLong { .. } => {
                write!(f, "domain name exceeds the 255 octet wire limit")
            }
            DecodeError::RdataLengthMismatch { .. } => {
                write!(f, "fields consumed from RDATA did not match RDLENGTH")
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

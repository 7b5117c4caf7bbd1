//! Primitive DNS field values (`spec.md` §3, §4.A).
//!
//! Each variant is a small validated holder: invalid values cannot be
//! constructed at all, following the teacher's `Label`/`DomainName`
//! pattern of a private-field struct with a fallible `TryFrom`/builder
//! and no way to mutate around the check afterwards.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::BuildError;

/// Maximum encoded length of a domain name: the number of labels (one
/// length octet each, including the root) plus the sum of the label
/// lengths.
pub const DOMAINNAME_MAX_LEN: usize = 255;

/// Maximum length of a single label in a domain name.
pub const LABEL_MAX_LEN: usize = 63;

/// Maximum length of a `CharacterString`, including its own length
/// octet is not counted here: this is the octet count of the string
/// itself.
pub const CHARACTER_STRING_MAX_LEN: usize = 255;

/// Which primitive kind a [`PrimitiveValue`] holds. This is the tag
/// a [`crate::field::FieldDefinition`] names, and the dispatch key the
/// encoder and decoder switch on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum PrimitiveKind {
    Anything,
    BitMap,
    Char,
    CharacterString,
    Long,
    Short,
    IPv4Address,
    IPv6Address,
    DomainName,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            PrimitiveKind::Anything => "Anything",
            PrimitiveKind::BitMap => "BitMap",
            PrimitiveKind::Char => "Char",
            PrimitiveKind::CharacterString => "CharacterString",
            PrimitiveKind::Long => "Long",
            PrimitiveKind::Short => "Short",
            PrimitiveKind::IPv4Address => "IPv4Address",
            PrimitiveKind::IPv6Address => "IPv6Address",
            PrimitiveKind::DomainName => "DomainName",
        };
        write!(f, "{s}")
    }
}

/// One validated DNS field value. See `spec.md` §3 for the constraint
/// each variant enforces at construction.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum PrimitiveValue {
    Anything(Bytes),
    BitMap(Bytes),
    Char(u8),
    CharacterString(CharacterString),
    Long(u32),
    Short(u16),
    IPv4Address(Ipv4Addr),
    IPv6Address(Ipv6Addr),
    DomainName(DomainName),
}

impl PrimitiveValue {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            PrimitiveValue::Anything(_) => PrimitiveKind::Anything,
            PrimitiveValue::BitMap(_) => PrimitiveKind::BitMap,
            PrimitiveValue::Char(_) => PrimitiveKind::Char,
            PrimitiveValue::CharacterString(_) => PrimitiveKind::CharacterString,
            PrimitiveValue::Long(_) => PrimitiveKind::Long,
            PrimitiveValue::Short(_) => PrimitiveKind::Short,
            PrimitiveValue::IPv4Address(_) => PrimitiveKind::IPv4Address,
            PrimitiveValue::IPv6Address(_) => PrimitiveKind::IPv6Address,
            PrimitiveValue::DomainName(_) => PrimitiveKind::DomainName,
        }
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for PrimitiveValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        // Hand-rolled like `CharacterString`/`Label` below: a bare
        // `Bytes` has no `Arbitrary` impl, so two of these variants
        // can't be derived.
        Ok(match u.int_in_range::<u8>(0..=8)? {
            0 => {
                let len = u.int_in_range::<usize>(0..=64)?;
                PrimitiveValue::Anything(Bytes::copy_from_slice(u.bytes(len)?))
            }
            1 => {
                let len = u.int_in_range::<usize>(0..=64)?;
                PrimitiveValue::BitMap(Bytes::copy_from_slice(u.bytes(len)?))
            }
            2 => PrimitiveValue::Char(u.arbitrary()?),
            3 => PrimitiveValue::CharacterString(u.arbitrary()?),
            4 => PrimitiveValue::Long(u.arbitrary()?),
            5 => PrimitiveValue::Short(u.arbitrary()?),
            6 => PrimitiveValue::IPv4Address(u.arbitrary()?),
            7 => PrimitiveValue::IPv6Address(u.arbitrary()?),
            _ => PrimitiveValue::DomainName(u.arbitrary()?),
        })
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PrimitiveValue::Anything(b) | PrimitiveValue::BitMap(b) => {
                write!(f, "{}", hex_string(b))
            }
            PrimitiveValue::Char(v) => write!(f, "{v}"),
            PrimitiveValue::CharacterString(s) => write!(f, "{s}"),
            PrimitiveValue::Long(v) => write!(f, "{v}"),
            PrimitiveValue::Short(v) => write!(f, "{v}"),
            PrimitiveValue::IPv4Address(v) => write!(f, "{v}"),
            PrimitiveValue::IPv6Address(v) => write!(f, "{v}"),
            PrimitiveValue::DomainName(v) => write!(f, "{v}"),
        }
    }
}

fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// A length-prefixed byte string, up to 255 octets (RFC 1035's
/// `<character-string>`).
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct CharacterString {
    octets: Bytes,
}

impl CharacterString {
    /// # Errors
    ///
    /// If `octets` is longer than 255 bytes.
    pub fn new(octets: impl Into<Bytes>) -> Result<Self, BuildError> {
        let octets = octets.into();
        if octets.len() > CHARACTER_STRING_MAX_LEN {
            return Err(BuildError::FieldValueOutOfRange {
                reason: format!(
                    "character-string of {} octets exceeds the {CHARACTER_STRING_MAX_LEN} octet limit",
                    octets.len()
                ),
            });
        }
        Ok(Self { octets })
    }

    #[allow(clippy::missing_panics_doc)]
    pub fn len(&self) -> u8 {
        // safe: `new` rejects anything longer than 255
        self.octets.len().try_into().unwrap()
    }

    pub fn is_empty(&self) -> bool {
        self.octets.is_empty()
    }

    pub fn octets(&self) -> &Bytes {
        &self.octets
    }
}

impl fmt::Display for CharacterString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for octet in &self.octets {
            write!(f, "{}", *octet as char)?;
        }
        Ok(())
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for CharacterString {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let len = u.int_in_range::<usize>(0..=CHARACTER_STRING_MAX_LEN)?;
        let octets = Bytes::copy_from_slice(u.bytes(len)?);
        Ok(Self { octets })
    }
}

/// A label is a sequence of octets, compared case-insensitively
/// (stored already lower-cased). At most 63 octets.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Label {
    octets: Bytes,
}

impl Label {
    pub fn root() -> Self {
        Self {
            octets: Bytes::new(),
        }
    }

    #[allow(clippy::missing_panics_doc)]
    pub fn len(&self) -> u8 {
        // safe: `TryFrom` below rejects anything longer than 63
        self.octets.len().try_into().unwrap()
    }

    pub fn is_empty(&self) -> bool {
        self.octets.is_empty()
    }

    pub fn octets(&self) -> &Bytes {
        &self.octets
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::root()
    }
}

impl TryFrom<&[u8]> for Label {
    type Error = BuildError;

    fn try_from(mixed_case_octets: &[u8]) -> Result<Self, Self::Error> {
        if mixed_case_octets.len() > LABEL_MAX_LEN {
            return Err(BuildError::FieldValueOutOfRange {
                reason: format!(
                    "label of {} octets exceeds the {LABEL_MAX_LEN} octet limit",
                    mixed_case_octets.len()
                ),
            });
        }
        Ok(Self {
            octets: Bytes::copy_from_slice(&mixed_case_octets.to_ascii_lowercase()),
        })
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for Label {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Label> {
        let label_len = u.int_in_range::<u8>(1..=20)?;
        let mut octets = BytesMut::with_capacity(label_len.into());
        for b in u.bytes(label_len.into())? {
            let ascii_byte = if b.is_ascii() { *b } else { *b % 128 };
            octets.put_u8(if ascii_byte == b'.' {
                b'x'
            } else {
                ascii_byte.to_ascii_lowercase()
            });
        }
        Ok(Self {
            octets: octets.freeze(),
        })
    }
}

/// An ordered sequence of labels, case-insensitive, at most 255 wire
/// octets including the length octets. See `spec.md` §3/§4.A.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DomainName {
    labels: Vec<Label>,
    /// Cached total wire length: one octet per label (the length
    /// prefix, including the terminating root label) plus the sum of
    /// the label lengths.
    wire_len: usize,
}

impl DomainName {
    pub fn root() -> Self {
        Self {
            labels: vec![Label::root()],
            wire_len: 1,
        }
    }

    pub fn is_root(&self) -> bool {
        self.wire_len == 1
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn wire_len(&self) -> usize {
        self.wire_len
    }

    /// The dot-joined labels, with a trailing dot marking the fully
    /// qualified form (per `spec.md` §4.A).
    pub fn to_dotted_string(&self) -> String {
        if self.is_root() {
            return ".".to_string();
        }
        let mut out = String::with_capacity(self.wire_len);
        let mut first = true;
        for label in &self.labels {
            if first {
                first = false;
            } else {
                out.push('.');
            }
            for octet in label.octets() {
                out.push(*octet as char);
            }
        }
        out
    }

    /// Build a name from a dot-separated string. A trailing empty
    /// label (i.e. a string ending in `.`) is permitted and marks the
    /// fully-qualified form; its absence implicitly appends the root.
    ///
    /// # Errors
    ///
    /// If any label exceeds 63 octets, the whole name exceeds 255
    /// wire octets, or a non-trailing label is empty.
    pub fn from_dotted_string(s: &str) -> Result<Self, BuildError> {
        if s == "." || s.is_empty() {
            return Ok(Self::root());
        }

        let mut chunks: Vec<&str> = s.split('.').collect();
        if chunks.last() == Some(&"") {
            chunks.pop();
        }

        let mut labels = Vec::with_capacity(chunks.len() + 1);
        for chunk in chunks {
            if chunk.is_empty() {
                return Err(BuildError::FieldValueOutOfRange {
                    reason: format!("empty label in domain name {s:?}"),
                });
            }
            labels.push(Label::try_from(chunk.as_bytes())?);
        }
        labels.push(Label::root());

        Self::from_labels(labels)
    }

    /// Build a name from an explicit label sequence. A trailing empty
    /// label is permitted (and implied if absent).
    ///
    /// # Errors
    ///
    /// If the wire length would exceed 255 octets, or a non-trailing
    /// label is empty.
    pub fn from_labels(mut labels: Vec<Label>) -> Result<Self, BuildError> {
        if labels.is_empty() || !labels.last().unwrap().is_empty() {
            labels.push(Label::root());
        }

        let mut wire_len = labels.len();
        let mut seen_root = false;
        for label in &labels {
            if seen_root {
                return Err(BuildError::FieldValueOutOfRange {
                    reason: "label present after the root label".to_string(),
                });
            }
            seen_root = label.is_empty();
            wire_len += label.len() as usize;
        }

        if wire_len > DOMAINNAME_MAX_LEN {
            return Err(BuildError::FieldValueOutOfRange {
                reason: format!(
                    "domain name of {wire_len} wire octets exceeds the {DOMAINNAME_MAX_LEN} octet limit"
                ),
            });
        }

        Ok(Self { labels, wire_len })
    }
}

impl fmt::Debug for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainName")
            .field("to_dotted_string()", &self.to_dotted_string())
            .finish()
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_dotted_string())
    }
}

impl FromStr for DomainName {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dotted_string(s)
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for DomainName {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let num_labels = u.int_in_range::<usize>(0..=10)?;
        let mut labels = Vec::new();
        for _ in 0..num_labels {
            labels.push(u.arbitrary()?);
        }
        labels.push(Label::root());
        Ok(DomainName::from_labels(labels).unwrap())
    }
}

//! Turning RFC 1035 wire bytes back into a [`Message`] (`spec.md` §4.K).
//!
//! Domain names are decoded against the whole packet, not a per-record
//! slice, because a compression pointer inside one record's RDATA can
//! legally point anywhere earlier in the message. Each pointer hop is
//! checked against the offsets already visited in the current name's
//! chain, so a pointer cycle (including a record pointing at itself)
//! is rejected rather than looping forever.

use std::collections::{BTreeMap, HashSet};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use bytes::Bytes;

use crate::context::DecodingContext;
use crate::error::DecodeError;
use crate::message::{
    Header, Message, Opcode, Question, QueryClass, QueryType, Rcode, RecordClass, RecordType,
    ResourceRecord, HEADER_MASK_AA, HEADER_MASK_OPCODE, HEADER_MASK_QR, HEADER_MASK_RA,
    HEADER_MASK_RCODE, HEADER_MASK_RD, HEADER_MASK_TC, HEADER_OFFSET_OPCODE,
};
use crate::primitive::{CharacterString, DomainName, Label, PrimitiveKind, PrimitiveValue};
use crate::rdata::RecordData;
use crate::registry::{self, TypeRegistry};
use crate::typedef::TypeDefinition;

/// Decode `bytes` against the built-in RR type registry
/// ([`registry::builtin`]).
///
/// # Errors
///
/// See `spec.md` §7: a short or malformed packet, a reserved label
/// type, an out-of-bounds or cyclic compression pointer, an
/// over-length name, or an RDATA whose consumed length does not match
/// its declared RDLENGTH.
pub fn decode(bytes: &[u8]) -> Result<Message, DecodeError> {
    decode_with_registry(bytes, &registry::builtin())
}

/// As [`decode`], but RDATA is interpreted against a caller-supplied
/// registry rather than the built-in one. RR types absent from
/// `registry` decode as a single opaque [`PrimitiveValue::Anything`].
///
/// # Errors
///
/// See [`decode`].
pub fn decode_with_registry(bytes: &[u8], registry: &TypeRegistry) -> Result<Message, DecodeError> {
    if bytes.len() < 2 {
        return Err(DecodeError::CompletelyBusted);
    }

    let mut ctx = DecodingContext::new(bytes);

    let id = ctx
        .packet
        .read_u16()
        .map_err(|_| DecodeError::CompletelyBusted)?;
    let flags = ctx.packet.read_u16().map_err(|e| with_id(id, e))?;
    let qd_count = ctx.packet.read_u16().map_err(|e| with_id(id, e))?;
    let an_count = ctx.packet.read_u16().map_err(|e| with_id(id, e))?;
    let ns_count = ctx.packet.read_u16().map_err(|e| with_id(id, e))?;
    let ar_count = ctx.packet.read_u16().map_err(|e| with_id(id, e))?;

    let header = parse_header(id, flags);

    let mut questions = Vec::with_capacity(qd_count.into());
    for _ in 0..qd_count {
        questions.push(decode_question(&mut ctx, id)?);
    }

    let mut answers = Vec::with_capacity(an_count.into());
    for _ in 0..an_count {
        answers.push(decode_resource_record(&mut ctx, registry, id)?);
    }

    let mut authority = Vec::with_capacity(ns_count.into());
    for _ in 0..ns_count {
        authority.push(decode_resource_record(&mut ctx, registry, id)?);
    }

    let mut additional = Vec::with_capacity(ar_count.into());
    for _ in 0..ar_count {
        additional.push(decode_resource_record(&mut ctx, registry, id)?);
    }

    Ok(Message {
        header,
        questions,
        answers,
        authority,
        additional,
    })
}

fn with_id(id: u16, err: DecodeError) -> DecodeError {
    match err {
        DecodeError::CompletelyBusted => DecodeError::CompletelyBusted,
        DecodeError::ShortRead { .. } => DecodeError::ShortRead { id: Some(id) },
        DecodeError::ReservedLabelType { .. } => DecodeError::ReservedLabelType { id: Some(id) },
        DecodeError::PointerOutOfBounds { .. } => DecodeError::PointerOutOfBounds { id: Some(id) },
        DecodeError::CompressionLoop { .. } => DecodeError::CompressionLoop { id: Some(id) },
        DecodeError::NameTooLong { .. } => DecodeError::NameTooLong { id: Some(id) },
        DecodeError::RdataLengthMismatch { .. } => DecodeError::RdataLengthMismatch { id: Some(id) },
    }
}

fn parse_header(id: u16, flags: u16) -> Header {
    let hi = (flags >> 8) as u8;
    let lo = (flags & 0xFF) as u8;

    Header {
        id,
        is_response: hi & HEADER_MASK_QR != 0,
        opcode: Opcode::from((hi & HEADER_MASK_OPCODE) >> HEADER_OFFSET_OPCODE),
        is_authoritative: hi & HEADER_MASK_AA != 0,
        is_truncated: hi & HEADER_MASK_TC != 0,
        recursion_desired: hi & HEADER_MASK_RD != 0,
        recursion_available: lo & HEADER_MASK_RA != 0,
        rcode: Rcode::from(lo & HEADER_MASK_RCODE),
    }
}

fn decode_question(ctx: &mut DecodingContext, id: u16) -> Result<Question, DecodeError> {
    let qname = read_name(ctx).map_err(|e| with_id(id, e))?;
    let qtype = ctx.packet.read_u16().map_err(|e| with_id(id, e))?;
    let qclass = ctx.packet.read_u16().map_err(|e| with_id(id, e))?;
    Ok(Question {
        qname,
        qtype: QueryType::from(qtype),
        qclass: QueryClass::from(qclass),
    })
}

fn decode_resource_record(
    ctx: &mut DecodingContext,
    registry: &TypeRegistry,
    id: u16,
) -> Result<ResourceRecord, DecodeError> {
    let name = read_name(ctx).map_err(|e| with_id(id, e))?;
    let rtype_raw = ctx.packet.read_u16().map_err(|e| with_id(id, e))?;
    let rclass_raw = ctx.packet.read_u16().map_err(|e| with_id(id, e))?;
    let ttl = ctx.packet.read_u32().map_err(|e| with_id(id, e))?;
    let rdlength = usize::from(ctx.packet.read_u16().map_err(|e| with_id(id, e))?);

    let definition = registry
        .get(rtype_raw)
        .cloned()
        .unwrap_or_else(registry::unknown_type_definition);
    let rdata = decode_rdata(ctx, &definition, rdlength, id)?;

    Ok(ResourceRecord {
        name,
        rtype: RecordType::from(rtype_raw),
        rclass: RecordClass::from(rclass_raw),
        ttl,
        rdata,
    })
}

fn decode_rdata(
    ctx: &mut DecodingContext,
    definition: &Arc<TypeDefinition>,
    rdlength: usize,
    id: u16,
) -> Result<RecordData, DecodeError> {
    let start = ctx.packet.position();
    let end = start
        .checked_add(rdlength)
        .filter(|&end| end <= ctx.packet.len())
        .ok_or_else(|| with_id(id, DecodeError::ShortRead { id: None }))?;

    let fields = definition.fields();

    // A lone, non-repeating opaque field spans the whole RDATA: this
    // is how NULL, WKS and any unrecognised RR type are represented.
    if let [field] = fields {
        if !field.allows_multiple()
            && matches!(field.type_kind(), PrimitiveKind::Anything | PrimitiveKind::BitMap)
        {
            let octets = ctx
                .packet
                .read_octets(rdlength)
                .map_err(|e| with_id(id, e))?;
            let value = if field.type_kind() == PrimitiveKind::Anything {
                PrimitiveValue::Anything(Bytes::copy_from_slice(octets))
            } else {
                PrimitiveValue::BitMap(Bytes::copy_from_slice(octets))
            };
            let mut values = BTreeMap::new();
            values.insert(field.index(), vec![value]);
            return RecordData::new(Arc::clone(definition), values)
                .map_err(|_| with_id(id, DecodeError::RdataLengthMismatch { id: None }));
        }
    }

    let mut values: BTreeMap<usize, Vec<PrimitiveValue>> = BTreeMap::new();
    for (i, field) in fields.iter().enumerate() {
        let is_last = i + 1 == fields.len();
        if is_last && field.allows_multiple() {
            let mut collected = Vec::new();
            while ctx.packet.position() < end {
                collected.push(decode_primitive(ctx, field.type_kind(), id)?);
            }
            values.insert(field.index(), collected);
        } else {
            let value = decode_primitive(ctx, field.type_kind(), id)?;
            values.insert(field.index(), vec![value]);
        }
    }

    if ctx.packet.position() != end {
        return Err(with_id(id, DecodeError::RdataLengthMismatch { id: None }));
    }

    RecordData::new(Arc::clone(definition), values)
        .map_err(|_| with_id(id, DecodeError::RdataLengthMismatch { id: None }))
}

fn decode_primitive(
    ctx: &mut DecodingContext,
    kind: PrimitiveKind,
    id: u16,
) -> Result<PrimitiveValue, DecodeError> {
    match kind {
        PrimitiveKind::Char => Ok(PrimitiveValue::Char(
            ctx.packet.read_u8().map_err(|e| with_id(id, e))?,
        )),
        PrimitiveKind::Short => Ok(PrimitiveValue::Short(
            ctx.packet.read_u16().map_err(|e| with_id(id, e))?,
        )),
        PrimitiveKind::Long => Ok(PrimitiveValue::Long(
            ctx.packet.read_u32().map_err(|e| with_id(id, e))?,
        )),
        PrimitiveKind::CharacterString => {
            let len = usize::from(ctx.packet.read_u8().map_err(|e| with_id(id, e))?);
            let octets = ctx.packet.read_octets(len).map_err(|e| with_id(id, e))?;
            let s = CharacterString::new(octets)
                .map_err(|_| with_id(id, DecodeError::RdataLengthMismatch { id: None }))?;
            Ok(PrimitiveValue::CharacterString(s))
        }
        PrimitiveKind::IPv4Address => {
            let octets = ctx.packet.read_octets(4).map_err(|e| with_id(id, e))?;
            Ok(PrimitiveValue::IPv4Address(Ipv4Addr::new(
                octets[0], octets[1], octets[2], octets[3],
            )))
        }
        PrimitiveKind::IPv6Address => {
            let octets = ctx.packet.read_octets(16).map_err(|e| with_id(id, e))?;
            let array: [u8; 16] = octets.try_into().expect("read_octets(16) returns 16 bytes");
            Ok(PrimitiveValue::IPv6Address(Ipv6Addr::from(array)))
        }
        PrimitiveKind::DomainName => {
            Ok(PrimitiveValue::DomainName(read_name(ctx).map_err(|e| with_id(id, e))?))
        }
        PrimitiveKind::Anything | PrimitiveKind::BitMap => {
            // Handled by the whole-RDATA special case in `decode_rdata`;
            // a registered type cannot place these mid-record.
            Err(with_id(id, DecodeError::RdataLengthMismatch { id: None }))
        }
    }
}

/// The maximum number of labels (including the terminating root) a
/// decoded name may contain: with a 2-octet minimum per non-root label
/// this already over-approximates the 255-octet wire bound, and exists
/// purely to bail out quickly on pathological pointer chains before
/// `DomainName::from_labels`'s own check runs.
const MAX_LABEL_COUNT: usize = 128;

fn read_name(ctx: &mut DecodingContext) -> Result<DomainName, DecodeError> {
    let mut labels: Vec<Label> = Vec::new();
    let mut prejump_starts: Vec<(usize, usize)> = Vec::new();
    let mut visited: HashSet<usize> = HashSet::new();
    let mut cursor = ctx.packet;
    let mut jumped = false;

    loop {
        let here = cursor.position();
        let length_byte = cursor.read_u8()?;

        match length_byte & 0b1100_0000 {
            0b0000_0000 => {
                let len = usize::from(length_byte);
                if len == 0 {
                    labels.push(Label::root());
                    if !jumped {
                        ctx.packet = cursor;
                    }
                    break;
                }
                if !jumped {
                    prejump_starts.push((here, labels.len()));
                }
                let octets = cursor.read_octets(len)?;
                labels.push(
                    Label::try_from(octets).expect("label length is bounded to 63 by the wire format"),
                );
            }
            0b1100_0000 => {
                let lo = cursor.read_u8()?;
                let offset = (usize::from(length_byte & 0b0011_1111) << 8) | usize::from(lo);
                if offset >= ctx.packet.len() {
                    return Err(DecodeError::PointerOutOfBounds { id: None });
                }
                if !jumped {
                    ctx.packet = cursor;
                    jumped = true;
                }
                if !visited.insert(offset) {
                    return Err(DecodeError::CompressionLoop { id: None });
                }
                cursor = ctx.packet.at_offset(offset);
            }
            _ => return Err(DecodeError::ReservedLabelType { id: None }),
        }

        if labels.len() > MAX_LABEL_COUNT {
            return Err(DecodeError::NameTooLong { id: None });
        }
    }

    let name = DomainName::from_labels(labels).map_err(|_| DecodeError::NameTooLong { id: None })?;
    for (offset, label_index) in prejump_starts {
        ctx.registry.register(&name.labels()[label_index..], offset);
    }
    Ok(name)
}

//! Turning a [`Message`] into RFC 1035 wire bytes (`spec.md` §4.I).
//!
//! Each record (question or resource record) is encoded speculatively:
//! if the packet would end up over budget, the write is rolled back
//! (including any name-compression suffixes it registered) and every
//! later record, in every later section, is dropped too. The header's
//! TC bit and wire counters are patched in once the real, possibly
//! truncated, section lengths are known.

use bytes::Bytes;

use crate::context::EncodingContext;
use crate::error::EncodeError;
use crate::message::{
    Message, Question, ResourceRecord, HEADER_MASK_AA, HEADER_MASK_OPCODE, HEADER_MASK_QR,
    HEADER_MASK_RA, HEADER_MASK_RCODE, HEADER_MASK_RD, HEADER_MASK_TC, HEADER_OFFSET_OPCODE,
};
use crate::primitive::{DomainName, Label, PrimitiveValue};

/// The default UDP-safe message size budget (RFC 1035 §4.2.1).
pub const DEFAULT_MAX_SIZE: u16 = 512;

/// Encode `message` with the default 512-byte budget.
///
/// # Errors
///
/// See [`encode_with_budget`].
pub fn encode(message: &Message, compress: bool) -> Result<Bytes, EncodeError> {
    encode_with_budget(message, compress, DEFAULT_MAX_SIZE)
}

/// Encode `message`, dropping trailing records (and setting the
/// header's TC bit) once the wire form would exceed `max_size` bytes.
///
/// # Errors
///
/// If a section's record count, or an RDATA's length, does not fit
/// its wire-format width.
pub fn encode_with_budget(
    message: &Message,
    compress: bool,
    max_size: u16,
) -> Result<Bytes, EncodeError> {
    let mut ctx = EncodingContext::new(compress, max_size);

    // Reserve the 12-byte header; every field here is backpatched once
    // the real section lengths and the truncation flag are known.
    for _ in 0..6 {
        ctx.packet.write_u16(0);
    }

    let mut qd_count = 0u16;
    for question in &message.questions {
        if ctx.truncated {
            break;
        }
        if encode_question(&mut ctx, question)? {
            qd_count += 1;
        } else {
            ctx.truncated = true;
        }
    }

    let an_count = encode_section(&mut ctx, &message.answers)?;
    let ns_count = encode_section(&mut ctx, &message.authority)?;
    let ar_count = encode_section(&mut ctx, &message.additional)?;

    ctx.packet.patch_u16(0, message.header.id)?;
    ctx.packet
        .patch_u16(2, build_flags(&message.header, ctx.truncated))?;
    ctx.packet.patch_u16(4, qd_count)?;
    ctx.packet.patch_u16(6, an_count)?;
    ctx.packet.patch_u16(8, ns_count)?;
    ctx.packet.patch_u16(10, ar_count)?;

    Ok(ctx.packet.into_bytes())
}

fn encode_section(
    ctx: &mut EncodingContext,
    records: &[ResourceRecord],
) -> Result<u16, EncodeError> {
    let mut count = 0u16;
    for record in records {
        if ctx.truncated {
            break;
        }
        if encode_resource_record(ctx, record)? {
            count += 1;
        } else {
            ctx.truncated = true;
        }
    }
    Ok(count)
}

fn build_flags(header: &crate::message::Header, truncated: bool) -> u16 {
    let mut hi = 0u8;
    if header.is_response {
        hi |= HEADER_MASK_QR;
    }
    hi |= (u8::from(header.opcode) << HEADER_OFFSET_OPCODE) & HEADER_MASK_OPCODE;
    if header.is_authoritative {
        hi |= HEADER_MASK_AA;
    }
    if truncated {
        hi |= HEADER_MASK_TC;
    }
    if header.recursion_desired {
        hi |= HEADER_MASK_RD;
    }

    let mut lo = 0u8;
    if header.recursion_available {
        lo |= HEADER_MASK_RA;
    }
    lo |= u8::from(header.rcode) & HEADER_MASK_RCODE;

    u16::from_be_bytes([hi, lo])
}

/// Encode `question`, returning whether it fit the budget. On
/// rejection, every byte it wrote (and every name suffix it
/// registered) is rolled back.
fn encode_question(ctx: &mut EncodingContext, question: &Question) -> Result<bool, EncodeError> {
    let start = ctx.packet.position();
    let mut registered = Vec::new();
    write_name(ctx, &question.qname, &mut registered);
    ctx.packet.write_u16(u16::from(question.qtype));
    ctx.packet.write_u16(u16::from(question.qclass));
    commit_or_rollback(ctx, start, registered)
}

/// Encode `record`, returning whether it fit the budget.
fn encode_resource_record(
    ctx: &mut EncodingContext,
    record: &ResourceRecord,
) -> Result<bool, EncodeError> {
    let start = ctx.packet.position();
    let mut registered = Vec::new();

    write_name(ctx, &record.name, &mut registered);
    ctx.packet.write_u16(u16::from(record.rtype));
    ctx.packet.write_u16(u16::from(record.rclass));
    ctx.packet.write_u32(record.ttl);

    let rdlength_index = ctx.packet.position();
    ctx.packet.write_u16(0);
    let rdata_start = ctx.packet.position();
    for (_, values) in record.rdata.iter() {
        for value in values {
            write_primitive(ctx, value, &mut registered);
        }
    }
    let rdata_len = ctx.packet.position() - rdata_start;
    let rdlength = u16::try_from(rdata_len).map_err(|_| EncodeError::CounterTooLarge {
        counter: rdata_len,
        bits: 16,
    })?;
    ctx.packet.patch_u16(rdlength_index, rdlength)?;

    commit_or_rollback(ctx, start, registered)
}

fn commit_or_rollback(
    ctx: &mut EncodingContext,
    start: usize,
    registered: Vec<(Vec<Label>, usize)>,
) -> Result<bool, EncodeError> {
    if ctx.fits(0) {
        Ok(true)
    } else {
        ctx.packet.truncate(start);
        for (suffix, offset) in registered {
            ctx.registry.remove(&suffix, offset);
        }
        Ok(false)
    }
}

fn write_primitive(
    ctx: &mut EncodingContext,
    value: &PrimitiveValue,
    registered: &mut Vec<(Vec<Label>, usize)>,
) {
    match value {
        PrimitiveValue::Anything(octets) | PrimitiveValue::BitMap(octets) => {
            ctx.packet.write_octets(octets);
        }
        PrimitiveValue::Char(v) => ctx.packet.write_u8(*v),
        PrimitiveValue::CharacterString(s) => {
            ctx.packet.write_u8(s.len());
            ctx.packet.write_octets(s.octets());
        }
        PrimitiveValue::Long(v) => ctx.packet.write_u32(*v),
        PrimitiveValue::Short(v) => ctx.packet.write_u16(*v),
        PrimitiveValue::IPv4Address(v) => ctx.packet.write_octets(&v.octets()),
        PrimitiveValue::IPv6Address(v) => ctx.packet.write_octets(&v.octets()),
        PrimitiveValue::DomainName(name) => write_name(ctx, name, registered),
    }
}

/// Write `name`, compressing against any previously written suffix
/// when `ctx.compress` is set. Every newly registered suffix is
/// pushed onto `registered` so the caller can undo it if this record
/// ends up rolled back for truncation.
fn write_name(ctx: &mut EncodingContext, name: &DomainName, registered: &mut Vec<(Vec<Label>, usize)>) {
    let labels = name.labels();
    for i in 0..labels.len() {
        let suffix = &labels[i..];

        if ctx.compress {
            if let Some(offset) = ctx.registry.lookup_index(suffix) {
                // Safe: `lookup_index` only returns offsets <= MAX_POINTER_OFFSET.
                let pointer = 0xC000u16 | u16::try_from(offset).unwrap();
                ctx.packet.write_u16(pointer);
                return;
            }
        }

        // A suffix of exactly the root label offers nothing to point
        // at later (it is always a single zero octet), so it is not
        // worth registering.
        if ctx.compress && suffix.len() > 1 {
            let offset = ctx.packet.position();
            if ctx.registry.register(suffix, offset) {
                registered.push((suffix.to_vec(), offset));
            }
        }

        let label = &labels[i];
        ctx.packet.write_u8(label.len());
        ctx.packet.write_octets(label.octets());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{QueryClass, QueryType, RecordClass, RecordType};
    use crate::primitive::CharacterString;
    use crate::rdata::RecordData;
    use crate::registry;
    use std::collections::BTreeMap;
    use std::net::Ipv4Addr;

    fn a_record(name: &str, address: Ipv4Addr) -> ResourceRecord {
        let registry = registry::builtin();
        let definition = registry.get(registry::TYPE_A).unwrap().clone();
        let mut values = BTreeMap::new();
        values.insert(0, vec![PrimitiveValue::IPv4Address(address)]);
        ResourceRecord {
            name: DomainName::from_dotted_string(name).unwrap(),
            rtype: RecordType::A,
            rclass: RecordClass::IN,
            ttl: 3600,
            rdata: RecordData::new(definition, values).unwrap(),
        }
    }

    #[test]
    fn single_a_record_query() {
        let question = Question {
            qname: DomainName::from_dotted_string("example.com.").unwrap(),
            qtype: QueryType::A,
            qclass: QueryClass::IN,
        };
        let mut message = Message::from_question(0x1234, question);
        message.header.recursion_desired = true;
        message.answers.push(a_record("example.com.", Ipv4Addr::new(93, 184, 216, 34)));
        message.header.is_response = true;

        let bytes = encode(&message, true).unwrap();
        assert_eq!(0x12, bytes[0]);
        assert_eq!(0x34, bytes[1]);
        assert_eq!(0, bytes[4]);
        assert_eq!(1, bytes[5]); // QDCOUNT
        assert_eq!(0, bytes[6]);
        assert_eq!(1, bytes[7]); // ANCOUNT
    }

    #[test]
    fn compresses_repeated_suffix() {
        let question = Question {
            qname: DomainName::from_dotted_string("www.example.com.").unwrap(),
            qtype: QueryType::A,
            qclass: QueryClass::IN,
        };
        let mut message = Message::from_question(1, question);
        message
            .answers
            .push(a_record("www.example.com.", Ipv4Addr::new(1, 2, 3, 4)));

        let bytes = encode(&message, true).unwrap();
        // Question name starts right after the 12-byte header and is
        // 17 wire octets (www + example + com + root); the answer's
        // owner name should be a bare two-byte pointer back to it
        // rather than a repeated label sequence.
        let answer_name_offset = 12 + 17 + 2 + 2;
        assert_eq!(0xC0, bytes[answer_name_offset]);
        assert_eq!(12, bytes[answer_name_offset + 1]);
    }

    #[test]
    fn truncates_when_over_budget() {
        let question = Question {
            qname: DomainName::from_dotted_string("example.com.").unwrap(),
            qtype: QueryType::A,
            qclass: QueryClass::IN,
        };
        let mut message = Message::from_question(1, question);
        for i in 0..40u8 {
            message
                .answers
                .push(a_record("example.com.", Ipv4Addr::new(10, 0, 0, i)));
        }

        let bytes = encode_with_budget(&message, true, 512).unwrap();
        assert!(bytes.len() <= 512);
        let flags = u16::from_be_bytes([bytes[2], bytes[3]]);
        assert_ne!(0, flags & 0b0000_0010_0000_0000, "TC bit should be set");
        let an_count = u16::from_be_bytes([bytes[6], bytes[7]]);
        assert!(an_count < 40, "some answers should have been dropped");
    }

    #[test]
    fn txt_record_encodes_each_string() {
        let registry = registry::builtin();
        let definition = registry.get(registry::TYPE_TXT).unwrap().clone();
        let mut values = BTreeMap::new();
        values.insert(
            0,
            vec![
                PrimitiveValue::CharacterString(CharacterString::new(&b"hello"[..]).unwrap()),
                PrimitiveValue::CharacterString(CharacterString::new(&b"world"[..]).unwrap()),
            ],
        );
        let record = ResourceRecord {
            name: DomainName::root(),
            rtype: RecordType::TXT,
            rclass: RecordClass::IN,
            ttl: 60,
            rdata: RecordData::new(definition, values).unwrap(),
        };
        let question = Question {
            qname: DomainName::root(),
            qtype: QueryType::TXT,
            qclass: QueryClass::IN,
        };
        let mut message = Message::from_question(1, question);
        message.answers.push(record);

        let bytes = encode(&message, false).unwrap();
        // rdlength = 1 + 5 + 1 + 5 = 12
        let rdlength_index = bytes.len() - 12 - 2;
        let rdlength = u16::from_be_bytes([bytes[rdlength_index], bytes[rdlength_index + 1]]);
        assert_eq!(12, rdlength);
    }
}

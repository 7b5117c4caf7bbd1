//! Arbitrary, always-valid message/record generators for property-style
//! tests, gated behind `test-util` (mirrors the teacher's own
//! `protocol::types::test_util`, which generates an arbitrary
//! `ResourceRecord` by feeding random bytes to `arbitrary::Unstructured`
//! and retrying at larger sizes until one parses).
//!
//! Unlike the teacher's closed `RecordTypeWithData` enum, `RecordData`
//! is validated against whatever `TypeDefinition` it is built with, so
//! there is no single derived `Arbitrary` impl that is guaranteed
//! valid. Instead, each generator here picks among a handful of the
//! `registry::builtin()` shapes and builds a `RecordData` that is
//! correct by construction.

use std::collections::BTreeMap;
use std::net::{Ipv4Addr, Ipv6Addr};

use arbitrary::Unstructured;
use fake::{Fake, Faker};

use crate::message::{
    Header, Message, Opcode, Question, QueryClass, QueryType, Rcode, RecordClass, RecordType,
    ResourceRecord,
};
use crate::primitive::{CharacterString, DomainName, PrimitiveValue};
use crate::rdata::RecordData;
use crate::registry;

pub fn arbitrary_header(u: &mut Unstructured) -> arbitrary::Result<Header> {
    Ok(Header {
        id: u.arbitrary()?,
        is_response: u.arbitrary()?,
        opcode: Opcode::from(u.int_in_range::<u8>(0..=15)?),
        is_authoritative: u.arbitrary()?,
        is_truncated: false,
        recursion_desired: u.arbitrary()?,
        recursion_available: u.arbitrary()?,
        rcode: Rcode::from(u.int_in_range::<u8>(0..=15)?),
    })
}

pub fn arbitrary_question(u: &mut Unstructured) -> arbitrary::Result<Question> {
    Ok(Question {
        qname: u.arbitrary()?,
        qtype: QueryType::A,
        qclass: QueryClass::IN,
    })
}

/// One of a handful of RR type/RDATA shapes drawn from the builtin
/// registry, so the result is always decodable against
/// [`registry::builtin`].
pub fn arbitrary_resource_record(u: &mut Unstructured) -> arbitrary::Result<ResourceRecord> {
    let registry = registry::builtin();
    let name: DomainName = u.arbitrary()?;
    let ttl: u32 = u.arbitrary()?;

    match u.int_in_range::<u8>(0..=3)? {
        0 => {
            let address: Ipv4Addr = u.arbitrary()?;
            let definition = registry.get(registry::TYPE_A).unwrap().clone();
            let mut values = BTreeMap::new();
            values.insert(0, vec![PrimitiveValue::IPv4Address(address)]);
            Ok(ResourceRecord {
                name,
                rtype: RecordType::A,
                rclass: RecordClass::IN,
                ttl,
                rdata: RecordData::new(definition, values).unwrap(),
            })
        }
        1 => {
            let address: Ipv6Addr = u.arbitrary()?;
            let definition = registry.get(registry::TYPE_AAAA).unwrap().clone();
            let mut values = BTreeMap::new();
            values.insert(0, vec![PrimitiveValue::IPv6Address(address)]);
            Ok(ResourceRecord {
                name,
                rtype: RecordType::AAAA,
                rclass: RecordClass::IN,
                ttl,
                rdata: RecordData::new(definition, values).unwrap(),
            })
        }
        2 => {
            let target: DomainName = u.arbitrary()?;
            let definition = registry.get(registry::TYPE_CNAME).unwrap().clone();
            let mut values = BTreeMap::new();
            values.insert(0, vec![PrimitiveValue::DomainName(target)]);
            Ok(ResourceRecord {
                name,
                rtype: RecordType::CNAME,
                rclass: RecordClass::IN,
                ttl,
                rdata: RecordData::new(definition, values).unwrap(),
            })
        }
        _ => {
            let count = u.int_in_range::<usize>(1..=3)?;
            let mut strings = Vec::with_capacity(count);
            for _ in 0..count {
                let s: CharacterString = u.arbitrary()?;
                strings.push(PrimitiveValue::CharacterString(s));
            }
            let definition = registry.get(registry::TYPE_TXT).unwrap().clone();
            let mut values = BTreeMap::new();
            values.insert(0, strings);
            Ok(ResourceRecord {
                name,
                rtype: RecordType::TXT,
                rclass: RecordClass::IN,
                ttl,
                rdata: RecordData::new(definition, values).unwrap(),
            })
        }
    }
}

/// An arbitrary [`Message`], with section sizes small enough that its
/// wire form usually (but not always — callers exercising truncation
/// should not assume it) fits the default 512 byte budget.
pub fn arbitrary_message(u: &mut Unstructured) -> arbitrary::Result<Message> {
    let header = arbitrary_header(u)?;

    let qd = u.int_in_range::<usize>(0..=2)?;
    let mut questions = Vec::with_capacity(qd);
    for _ in 0..qd {
        questions.push(arbitrary_question(u)?);
    }

    let an = u.int_in_range::<usize>(0..=4)?;
    let mut answers = Vec::with_capacity(an);
    for _ in 0..an {
        answers.push(arbitrary_resource_record(u)?);
    }

    let ns = u.int_in_range::<usize>(0..=2)?;
    let mut authority = Vec::with_capacity(ns);
    for _ in 0..ns {
        authority.push(arbitrary_resource_record(u)?);
    }

    let ar = u.int_in_range::<usize>(0..=2)?;
    let mut additional = Vec::with_capacity(ar);
    for _ in 0..ar {
        additional.push(arbitrary_resource_record(u)?);
    }

    Ok(Message {
        header,
        questions,
        answers,
        authority,
        additional,
    })
}

/// Generate an arbitrary [`Message`] by feeding `fake`-filled byte
/// buffers to [`arbitrary_message`], retrying at larger sizes, exactly
/// as the teacher's `test_util::arbitrary_resourcerecord` does for its
/// own `ResourceRecord`.
///
/// # Panics
///
/// If no buffer size up to 4096 bytes produces a valid message, which
/// would indicate a bug in [`arbitrary_message`] rather than bad luck.
pub fn arbitrary_message_fuzzed() -> Message {
    for size in [128, 256, 512, 1024, 2048, 4096] {
        let mut buf = Vec::with_capacity(size);
        for _ in 0..size {
            buf.push(Faker.fake());
        }
        if let Ok(message) = arbitrary_message(&mut Unstructured::new(&buf)) {
            return message;
        }
    }
    panic!("could not generate an arbitrary message!");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_decodable_messages() {
        for _ in 0..20 {
            let message = arbitrary_message_fuzzed();
            let bytes = crate::encoder::encode(&message, false).unwrap();
            assert!(crate::decoder::decode(&bytes).is_ok());
        }
    }
}

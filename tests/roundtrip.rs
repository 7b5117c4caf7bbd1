//! Property-style checks for the universal round-trip and safety
//! invariants a wire codec must hold, independent of any one worked
//! example. Compiled only with `--features test-util` (see
//! `Cargo.toml`'s `required-features`), since it needs the arbitrary
//! message generators in `dns_wire::test_util`.

use dns_wire::encoder::DEFAULT_MAX_SIZE;
use dns_wire::label_registry::MAX_POINTER_OFFSET;
use dns_wire::test_util::arbitrary_message_fuzzed;
use dns_wire::{decode, encode};

const ITERATIONS: usize = 200;

#[test]
fn message_round_trips_without_compression() {
    for _ in 0..ITERATIONS {
        let message = arbitrary_message_fuzzed();
        let bytes = encode(&message, false).unwrap();
        if bytes.len() > DEFAULT_MAX_SIZE as usize {
            // Truncation changes section counts; covered separately.
            continue;
        }
        let decoded = decode(&bytes).unwrap();
        assert_eq!(message.header.id, decoded.header.id);
        assert_eq!(message.header.is_response, decoded.header.is_response);
        assert_eq!(
            u8::from(message.header.opcode),
            u8::from(decoded.header.opcode)
        );
        assert_eq!(
            message.header.is_authoritative,
            decoded.header.is_authoritative
        );
        assert!(!decoded.header.is_truncated);
        assert_eq!(
            message.header.recursion_desired,
            decoded.header.recursion_desired
        );
        assert_eq!(
            message.header.recursion_available,
            decoded.header.recursion_available
        );
        assert_eq!(u8::from(message.header.rcode), u8::from(decoded.header.rcode));
        assert_eq!(message.questions.len(), decoded.questions.len());
        assert_eq!(message.answers.len(), decoded.answers.len());
        assert_eq!(message.authority.len(), decoded.authority.len());
        assert_eq!(message.additional.len(), decoded.additional.len());
    }
}

#[test]
fn compression_does_not_change_decoded_shape() {
    for _ in 0..ITERATIONS {
        let message = arbitrary_message_fuzzed();
        let compressed = encode(&message, true).unwrap();
        let uncompressed = encode(&message, false).unwrap();

        let a = decode(&compressed).unwrap();
        let b = decode(&uncompressed).unwrap();

        assert_eq!(a.header.id, b.header.id);
        assert_eq!(a.questions.len(), b.questions.len());
        assert_eq!(a.answers.len(), b.answers.len());
        assert_eq!(a.authority.len(), b.authority.len());
        assert_eq!(a.additional.len(), b.additional.len());
        for (ra, rb) in a.answers.iter().zip(b.answers.iter()) {
            assert_eq!(ra.name.to_dotted_string(), rb.name.to_dotted_string());
        }
    }
}

#[test]
fn truncation_flag_matches_committed_counts() {
    use dns_wire::encoder::encode_with_budget;
    use dns_wire::message::{Message, Question, QueryClass, QueryType, RecordClass, RecordType};
    use dns_wire::primitive::DomainName;
    use dns_wire::rdata::RecordData;
    use dns_wire::registry;
    use dns_wire::message::ResourceRecord;
    use dns_wire::primitive::PrimitiveValue;
    use std::collections::BTreeMap;
    use std::net::Ipv4Addr;

    let registry = registry::builtin();
    let definition = registry.get(registry::TYPE_A).unwrap().clone();

    let question = Question {
        qname: DomainName::from_dotted_string("example.com.").unwrap(),
        qtype: QueryType::A,
        qclass: QueryClass::IN,
    };
    let mut message = Message::from_question(1, question);
    for i in 0..80u8 {
        let mut values = BTreeMap::new();
        values.insert(0, vec![PrimitiveValue::IPv4Address(Ipv4Addr::new(10, 0, 0, i))]);
        message.answers.push(ResourceRecord {
            name: DomainName::from_dotted_string("example.com.").unwrap(),
            rtype: RecordType::A,
            rclass: RecordClass::IN,
            ttl: 60,
            rdata: RecordData::new(definition.clone(), values).unwrap(),
        });
    }

    let bytes = encode_with_budget(&message, true, DEFAULT_MAX_SIZE).unwrap();
    assert!(bytes.len() <= DEFAULT_MAX_SIZE as usize);

    let flags = u16::from_be_bytes([bytes[2], bytes[3]]);
    let tc_bit_set = flags & 0b0000_0010_0000_0000 != 0;
    let an_count = u16::from_be_bytes([bytes[6], bytes[7]]) as usize;

    if tc_bit_set {
        assert!(an_count < message.answers.len());
    }

    let decoded = decode(&bytes).unwrap();
    assert_eq!(an_count, decoded.answers.len());
}

/// Every compression pointer the encoder emits must target a legal
/// offset (`spec.md` §8 property 6): `< MAX_POINTER_OFFSET` and
/// `< bytes.len()`. A default-budget packet's total length is itself
/// always far below `MAX_POINTER_OFFSET`, so the sharper check here is
/// that decoding a compressed message never hits `PointerOutOfBounds`
/// or `CompressionLoop` — the only way the encoder could violate the
/// offset bound at all.
#[test]
fn every_compression_pointer_targets_a_legal_offset() {
    for _ in 0..ITERATIONS {
        let message = arbitrary_message_fuzzed();
        let bytes = encode(&message, true).unwrap();
        assert!(bytes.len() <= MAX_POINTER_OFFSET);
        if bytes.len() > DEFAULT_MAX_SIZE as usize {
            continue;
        }
        decode(&bytes).expect("every pointer the encoder wrote must resolve legally");
    }
}

#[test]
fn decoded_names_stay_within_wire_bounds() {
    for _ in 0..ITERATIONS {
        let message = arbitrary_message_fuzzed();
        let bytes = encode(&message, false).unwrap();
        if bytes.len() > DEFAULT_MAX_SIZE as usize {
            continue;
        }
        let decoded = decode(&bytes).unwrap();
        for question in &decoded.questions {
            assert!(question.qname.wire_len() <= 255);
        }
        for record in decoded
            .answers
            .iter()
            .chain(&decoded.authority)
            .chain(&decoded.additional)
        {
            assert!(record.name.wire_len() <= 255);
            for label in record.name.labels() {
                assert!(label.len() <= 63);
            }
        }
    }
}

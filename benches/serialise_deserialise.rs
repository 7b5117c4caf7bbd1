use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use dns_wire::message::{
    Message, Opcode, QueryClass, QueryType, Question, Rcode, RecordClass, RecordType, ResourceRecord,
};
use dns_wire::primitive::{DomainName, PrimitiveValue};
use dns_wire::rdata::RecordData;
use dns_wire::{encode, encode_with_budget, registry};

fn domain(name: &str) -> DomainName {
    DomainName::from_dotted_string(name).unwrap()
}

fn a_record(name: &str, address: Ipv4Addr) -> ResourceRecord {
    let definition = registry::builtin().get(registry::TYPE_A).unwrap().clone();
    let mut values = BTreeMap::new();
    values.insert(0, vec![PrimitiveValue::IPv4Address(address)]);
    ResourceRecord {
        name: domain(name),
        rtype: RecordType::A,
        rclass: RecordClass::IN,
        ttl: 300,
        rdata: RecordData::new(definition, values).unwrap(),
    }
}

fn cname_record(name: &str, target_name: &str) -> ResourceRecord {
    let definition = registry::builtin().get(registry::TYPE_CNAME).unwrap().clone();
    let mut values = BTreeMap::new();
    values.insert(0, vec![PrimitiveValue::DomainName(domain(target_name))]);
    ResourceRecord {
        name: domain(name),
        rtype: RecordType::CNAME,
        rclass: RecordClass::IN,
        ttl: 300,
        rdata: RecordData::new(definition, values).unwrap(),
    }
}

fn ns_record(superdomain_name: &str, nameserver_name: &str) -> ResourceRecord {
    let definition = registry::builtin().get(registry::TYPE_NS).unwrap().clone();
    let mut values = BTreeMap::new();
    values.insert(0, vec![PrimitiveValue::DomainName(domain(nameserver_name))]);
    ResourceRecord {
        name: domain(superdomain_name),
        rtype: RecordType::NS,
        rclass: RecordClass::IN,
        ttl: 300,
        rdata: RecordData::new(definition, values).unwrap(),
    }
}

fn question_message() -> Message {
    Message::from_question(
        1234,
        Question {
            qname: domain("www.example.com."),
            qtype: QueryType::A,
            qclass: QueryClass::IN,
        },
    )
}

#[allow(non_snake_case)]
fn bench__question(c: &mut Criterion) {
    let message = question_message();

    c.bench_function("encode/question", |b| {
        b.iter_batched(
            || message.clone(),
            |message| encode(&message, true),
            BatchSize::SmallInput,
        )
    });

    let serialised = encode(&message, true).unwrap();
    c.bench_function("decode/question", |b| {
        b.iter(|| dns_wire::decode(black_box(&serialised)))
    });
}

#[allow(non_snake_case)]
fn bench__answer__small(c: &mut Criterion) {
    let mut message = question_message();
    message.header.is_response = true;
    message.header.opcode = Opcode::Query;
    message.header.rcode = Rcode::NoError;
    message.answers = vec![a_record("www.example.com.", Ipv4Addr::new(1, 1, 1, 1))];

    c.bench_function("encode/answer/small", |b| {
        b.iter_batched(
            || message.clone(),
            |message| encode(&message, true),
            BatchSize::SmallInput,
        )
    });

    let serialised = encode(&message, true).unwrap();
    c.bench_function("decode/answer/small", |b| {
        b.iter(|| dns_wire::decode(black_box(&serialised)))
    });
}

#[allow(non_snake_case)]
fn bench__answer__big(c: &mut Criterion) {
    let mut message = question_message();
    message.header.is_response = true;

    // Large enough that the default 512 byte budget would truncate it;
    // use a generous budget (as a caller negotiating EDNS(0) would) so
    // this benchmark still exercises a big, un-truncated message.
    const BIG_BUDGET: u16 = 16_384 - 1;
    let count = 128;
    for i in 0..count {
        message.answers.push(cname_record(
            "www.example.com.",
            &format!("cname-target-{i}.example.com."),
        ));
    }
    for i in 0..count {
        message.authority.push(ns_record(
            &format!("cname-target-{i}.example.com."),
            &format!("ns-{i}.example.com."),
        ));
    }
    for i in 0..count {
        message.additional.push(a_record(
            &format!("ns-{i}.example.com."),
            Ipv4Addr::new(1, 1, 1, 1),
        ));
    }

    c.bench_function("encode/answer/big", |b| {
        b.iter_batched(
            || message.clone(),
            |message| encode_with_budget(&message, true, BIG_BUDGET),
            BatchSize::SmallInput,
        )
    });

    let serialised = encode_with_budget(&message, true, BIG_BUDGET).unwrap();
    c.bench_function("decode/answer/big", |b| {
        b.iter(|| dns_wire::decode(black_box(&serialised)))
    });
}

criterion_group!(
    benches,
    bench__question,
    bench__answer__small,
    bench__answer__big,
);
criterion_main!(benches);

//! A lookup from RR type number to the [`TypeDefinition`] describing
//! its RDATA shape (`spec.md` §4.E).
//!
//! `builtin()` reproduces the RR repertoire the teacher crate hard-codes
//! as a closed Rust enum, but expressed as data: every shape here could
//! equally have been registered by a caller at runtime.

use std::collections::HashMap;
use std::sync::Arc;

use crate::field::FieldDefinition;
use crate::primitive::PrimitiveKind;
use crate::typedef::TypeDefinition;

macro_rules! rr_type {
    ($name:ident, $value:expr) => {
        pub const $name: u16 = $value;
    };
}

rr_type!(TYPE_A, 1);
rr_type!(TYPE_NS, 2);
rr_type!(TYPE_MD, 3);
rr_type!(TYPE_MF, 4);
rr_type!(TYPE_CNAME, 5);
rr_type!(TYPE_SOA, 6);
rr_type!(TYPE_MB, 7);
rr_type!(TYPE_MG, 8);
rr_type!(TYPE_MR, 9);
rr_type!(TYPE_NULL, 10);
rr_type!(TYPE_WKS, 11);
rr_type!(TYPE_PTR, 12);
rr_type!(TYPE_HINFO, 13);
rr_type!(TYPE_MINFO, 14);
rr_type!(TYPE_MX, 15);
rr_type!(TYPE_TXT, 16);
rr_type!(TYPE_AAAA, 28);
rr_type!(TYPE_SRV, 33);

/// A mutable map from RR type number to the `TypeDefinition` governing
/// its RDATA. Callers may register additional or overriding shapes;
/// `builtin()` seeds one with the RFC 1035 core set plus `AAAA`/`SRV`.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    definitions: HashMap<u16, Arc<TypeDefinition>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, rtype: u16, definition: Arc<TypeDefinition>) {
        self.definitions.insert(rtype, definition);
    }

    pub fn get(&self, rtype: u16) -> Option<&Arc<TypeDefinition>> {
        self.definitions.get(&rtype)
    }

    pub fn contains(&self, rtype: u16) -> bool {
        self.definitions.contains_key(&rtype)
    }
}

fn field(index: usize, name: &str, kind: PrimitiveKind) -> FieldDefinition {
    FieldDefinition::new(index, name, kind, false, 1).expect("builtin field name is valid")
}

fn variadic_field(index: usize, name: &str, kind: PrimitiveKind, minimum: u32) -> FieldDefinition {
    FieldDefinition::new(index, name, kind, true, minimum).expect("builtin field name is valid")
}

fn type_def(fields: Vec<FieldDefinition>) -> Arc<TypeDefinition> {
    Arc::new(TypeDefinition::new(fields).expect("builtin type definition is well formed"))
}

fn domain_name_only(name: &str) -> Arc<TypeDefinition> {
    type_def(vec![field(0, name, PrimitiveKind::DomainName)])
}

/// A `TypeDefinition` for unregistered RR types: a single opaque blob
/// spanning the whole RDATA, with no minimum (an empty RDATA is still
/// well formed for a type nobody can interpret).
pub fn unknown_type_definition() -> Arc<TypeDefinition> {
    type_def(vec![FieldDefinition::new(
        0,
        "data",
        PrimitiveKind::Anything,
        false,
        0,
    )
    .unwrap()])
}

/// Build a registry covering the RFC 1035 core RR types plus `AAAA`
/// (RFC 3596) and `SRV` (RFC 2782).
pub fn builtin() -> TypeRegistry {
    let mut registry = TypeRegistry::new();

    registry.register(TYPE_A, type_def(vec![field(0, "address", PrimitiveKind::IPv4Address)]));
    registry.register(TYPE_NS, domain_name_only("nsdname"));
    registry.register(TYPE_MD, domain_name_only("madname"));
    registry.register(TYPE_MF, domain_name_only("madname"));
    registry.register(TYPE_CNAME, domain_name_only("cname"));
    registry.register(
        TYPE_SOA,
        type_def(vec![
            field(0, "mname", PrimitiveKind::DomainName),
            field(1, "rname", PrimitiveKind::DomainName),
            field(2, "serial", PrimitiveKind::Long),
            field(3, "refresh", PrimitiveKind::Long),
            field(4, "retry", PrimitiveKind::Long),
            field(5, "expire", PrimitiveKind::Long),
            field(6, "minimum", PrimitiveKind::Long),
        ]),
    );
    registry.register(TYPE_MB, domain_name_only("madname"));
    registry.register(TYPE_MG, domain_name_only("mdmname"));
    registry.register(TYPE_MR, domain_name_only("newname"));
    registry.register(
        TYPE_NULL,
        type_def(vec![FieldDefinition::new(0, "data", PrimitiveKind::Anything, false, 0).unwrap()]),
    );
    registry.register(
        TYPE_WKS,
        type_def(vec![FieldDefinition::new(0, "data", PrimitiveKind::Anything, false, 0).unwrap()]),
    );
    registry.register(TYPE_PTR, domain_name_only("ptrdname"));
    registry.register(
        TYPE_HINFO,
        type_def(vec![
            field(0, "cpu", PrimitiveKind::CharacterString),
            field(1, "os", PrimitiveKind::CharacterString),
        ]),
    );
    registry.register(
        TYPE_MINFO,
        type_def(vec![
            field(0, "rmailbx", PrimitiveKind::DomainName),
            field(1, "emailbx", PrimitiveKind::DomainName),
        ]),
    );
    registry.register(
        TYPE_MX,
        type_def(vec![
            field(0, "preference", PrimitiveKind::Short),
            field(1, "exchange", PrimitiveKind::DomainName),
        ]),
    );
    registry.register(
        TYPE_TXT,
        type_def(vec![variadic_field(
            0,
            "text",
            PrimitiveKind::CharacterString,
            1,
        )]),
    );
    registry.register(TYPE_AAAA, type_def(vec![field(0, "address", PrimitiveKind::IPv6Address)]));
    registry.register(
        TYPE_SRV,
        type_def(vec![
            field(0, "priority", PrimitiveKind::Short),
            field(1, "weight", PrimitiveKind::Short),
            field(2, "port", PrimitiveKind::Short),
            field(3, "target", PrimitiveKind::DomainName),
        ]),
    );

    registry
}

//! The DNS message object model: header, question, resource record and
//! the `Message` that ties them together (`spec.md` §3, §4.E).
//!
//! `RecordType`/`RecordClass`/`QueryType`/`QueryClass` follow the
//! teacher's private-constructor-wrapper pattern: an unrecognised wire
//! value is still representable (`Unknown`), but only through a type
//! whose only constructor is the `From<u16>` impl, so nothing can build
//! an "unknown" value with a bogus invariant some other way.

use std::fmt;

use crate::rdata::RecordData;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident : $repr:ty, $unknown:ident {
            $($variant:ident = $value:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
        pub enum $name {
            $($variant,)+
            Unknown($unknown),
        }

        #[doc = concat!("An unrecognised ", stringify!($name), " value. Can only be built via `From<", stringify!($repr), ">`.")]
        #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
        pub struct $unknown($repr);

        impl $unknown {
            pub fn value(self) -> $repr {
                self.0
            }
        }

        impl From<$repr> for $name {
            fn from(value: $repr) -> Self {
                match value {
                    $($value => $name::$variant,)+
                    other => $name::Unknown($unknown(other)),
                }
            }
        }

        impl From<$name> for $repr {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => $value,)+
                    $name::Unknown($unknown(v)) => v,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                match self {
                    $($name::$variant => write!(f, stringify!($variant)),)+
                    $name::Unknown(v) => write!(f, "{}({})", stringify!($unknown), v.0),
                }
            }
        }
    };
}

wire_enum!(
    /// DNS header OPCODE (`spec.md` §3).
    Opcode: u8, OpcodeUnknown {
        Query = 0,
        IQuery = 1,
        Status = 2,
        Notify = 4,
        Update = 5,
    }
);

wire_enum!(
    /// DNS header RCODE (`spec.md` §3).
    Rcode: u8, RcodeUnknown {
        NoError = 0,
        FormErr = 1,
        ServFail = 2,
        NXDomain = 3,
        NotImp = 4,
        Refused = 5,
    }
);

wire_enum!(
    /// An RR type number, as carried on a resource record.
    RecordType: u16, RecordTypeUnknown {
        A = 1,
        NS = 2,
        MD = 3,
        MF = 4,
        CNAME = 5,
        SOA = 6,
        MB = 7,
        MG = 8,
        MR = 9,
        NULL = 10,
        WKS = 11,
        PTR = 12,
        HINFO = 13,
        MINFO = 14,
        MX = 15,
        TXT = 16,
        AAAA = 28,
        SRV = 33,
    }
);

wire_enum!(
    /// An RR class number.
    RecordClass: u16, RecordClassUnknown {
        IN = 1,
        CS = 2,
        CH = 3,
        HS = 4,
    }
);

wire_enum!(
    /// A question's QTYPE: an RR type, or one of the query-only meta
    /// types (only `ANY` is modelled; `AXFR`/`MAILB`/`MAILA` fall
    /// through to `Unknown` since zone transfers are out of scope).
    QueryType: u16, QueryTypeUnknown {
        A = 1,
        NS = 2,
        MD = 3,
        MF = 4,
        CNAME = 5,
        SOA = 6,
        MB = 7,
        MG = 8,
        MR = 9,
        NULL = 10,
        WKS = 11,
        PTR = 12,
        HINFO = 13,
        MINFO = 14,
        MX = 15,
        TXT = 16,
        AAAA = 28,
        SRV = 33,
        ANY = 255,
    }
);

wire_enum!(
    /// A question's QCLASS: an RR class, or `ANY`.
    QueryClass: u16, QueryClassUnknown {
        IN = 1,
        CS = 2,
        CH = 3,
        HS = 4,
        ANY = 255,
    }
);

pub(crate) const HEADER_MASK_QR: u8 = 0b1000_0000;
pub(crate) const HEADER_MASK_OPCODE: u8 = 0b0111_1000;
pub(crate) const HEADER_OFFSET_OPCODE: u8 = 3;
pub(crate) const HEADER_MASK_AA: u8 = 0b0000_0100;
pub(crate) const HEADER_MASK_TC: u8 = 0b0000_0010;
pub(crate) const HEADER_MASK_RD: u8 = 0b0000_0001;
pub(crate) const HEADER_MASK_RA: u8 = 0b1000_0000;
pub(crate) const HEADER_MASK_RCODE: u8 = 0b0000_1111;

/// The 12-octet DNS header, minus its four section-length counters:
/// those are derived from the section lengths at encode time rather
/// than stored redundantly here (matching the teacher's `Header`).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Header {
    pub id: u16,
    pub is_response: bool,
    pub opcode: Opcode,
    pub is_authoritative: bool,
    pub is_truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    pub rcode: Rcode,
}

impl Header {
    pub fn query(id: u16) -> Self {
        Self {
            id,
            is_response: false,
            opcode: Opcode::Query,
            is_authoritative: false,
            is_truncated: false,
            recursion_desired: true,
            recursion_available: false,
            rcode: Rcode::NoError,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Question {
    pub qname: crate::primitive::DomainName,
    pub qtype: QueryType,
    pub qclass: QueryClass,
}

#[derive(Debug, Clone)]
pub struct ResourceRecord {
    pub name: crate::primitive::DomainName,
    pub rtype: RecordType,
    pub rclass: RecordClass,
    pub ttl: u32,
    pub rdata: RecordData,
}

/// A full DNS message: header plus the four sections.
///
/// Section counts are not stored directly; `Message::question_count`
/// and friends report `section.len()`, and the encoder writes those
/// lengths (clamped by truncation) into the header's wire counters.
#[derive(Debug, Clone)]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authority: Vec<ResourceRecord>,
    pub additional: Vec<ResourceRecord>,
}

impl Message {
    pub fn from_question(id: u16, question: Question) -> Self {
        Self {
            header: Header::query(id),
            questions: vec![question],
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }

    /// A response header/shell for this message: same ID and question
    /// section, `is_response` set, sections otherwise empty for the
    /// caller to fill in.
    pub fn make_response(&self) -> Self {
        let mut header = self.header;
        header.is_response = true;
        header.is_authoritative = false;
        header.is_truncated = false;
        Self {
            header,
            questions: self.questions.clone(),
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }

    /// A `FormErr` response carrying no question section, for use when
    /// the query itself could not be parsed cleanly enough to echo its
    /// question back.
    pub fn make_format_error_response(id: u16) -> Self {
        let mut header = Header::query(id);
        header.is_response = true;
        header.rcode = Rcode::FormErr;
        Self {
            header,
            questions: Vec::new(),
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recordtype_roundtrip() {
        for v in 0u16..=40 {
            let rtype = RecordType::from(v);
            assert_eq!(v, u16::from(rtype));
        }
    }

    #[test]
    fn recordtype_unknown_implies_querytype_unknown() {
        let v = 9999u16;
        assert!(matches!(RecordType::from(v), RecordType::Unknown(_)));
        assert!(matches!(QueryType::from(v), QueryType::Unknown(_)));
    }

    #[test]
    fn make_response_preserves_id_and_question() {
        let question = Question {
            qname: crate::primitive::DomainName::root(),
            qtype: QueryType::A,
            qclass: QueryClass::IN,
        };
        let query = Message::from_question(42, question);
        let response = query.make_response();
        assert_eq!(42, response.header.id);
        assert!(response.header.is_response);
        assert_eq!(1, response.questions.len());
    }
}

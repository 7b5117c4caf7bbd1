#![warn(clippy::pedantic)]
// False positives for `bytes::Bytes`
#![allow(clippy::mutable_key_type)]
// Don't care enough to fix
#![allow(clippy::match_same_arms)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::similar_names)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::wildcard_imports)]

//! A typed field model and RFC 1035 wire codec for DNS messages.
//!
//! This crate turns an in-memory [`message::Message`] into the
//! on-the-wire byte representation of a DNS packet, and back, without
//! opening a socket or making a policy decision: no resolution, no
//! caching, no retries. Callers who need those build them on top.
//!
//! The three load-bearing pieces are:
//!
//! - [`field`]/[`typedef`]/[`rdata`] — a typed field model describing
//!   each resource-record type as an ordered sequence of primitive
//!   ([`primitive`]) fields, with arity (fixed vs. trailing variadic).
//! - [`encoder`]/[`decoder`] — the wire codec: the 512-byte UDP budget,
//!   truncation, and RFC 1035 §4.1.4 name compression.
//! - [`label_registry`]/[`cursor`]/[`context`] — the cursor and
//!   suffix-registry plumbing both directions of the codec share.
//!
//! [`registry::builtin`] seeds a [`registry::TypeRegistry`] with the
//! RFC 1035 core RR types (plus `AAAA`/`SRV`); callers may register
//! additional or overriding shapes of their own.

pub mod context;
pub mod cursor;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod field;
pub mod label_registry;
pub mod message;
pub mod primitive;
pub mod rdata;
pub mod registry;
pub mod typedef;

#[cfg(any(feature = "test-util", test))]
pub mod test_util;

pub use decoder::{decode, decode_with_registry};
pub use encoder::{encode, encode_with_budget, DEFAULT_MAX_SIZE};
pub use error::{BuildError, DecodeError, EncodeError};
pub use message::Message;

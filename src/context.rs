//! Encoding and decoding contexts: the cursor, label registry and
//! compression/truncation state threaded through one encode or decode
//! pass (`spec.md` §4.F–§4.I).

use crate::cursor::{ReadCursor, WriteCursor};
use crate::label_registry::LabelRegistry;

/// State carried across one `Message` encode.
///
/// `truncated` is sticky: once a record fails to fit the budget, every
/// subsequent record in every later section is skipped too (a
/// question or answer section cannot have gaps), and the header's TC
/// bit is set when the pass finishes.
pub struct EncodingContext {
    pub packet: WriteCursor,
    pub registry: LabelRegistry,
    pub compress: bool,
    pub max_size: u16,
    pub truncated: bool,
}

impl EncodingContext {
    pub fn new(compress: bool, max_size: u16) -> Self {
        Self {
            packet: WriteCursor::new(),
            registry: LabelRegistry::new(),
            compress,
            max_size,
            truncated: false,
        }
    }

    /// Whether writing `additional_len` more octets would still fit
    /// the budget.
    pub fn fits(&self, additional_len: usize) -> bool {
        self.packet.position() + additional_len <= self.max_size as usize
    }
}

/// State carried across one `Message` decode: the whole packet (so
/// compression pointers can jump anywhere within it) and a label
/// registry used only for optional suffix bookkeeping, not required
/// for correctness on the decode side.
pub struct DecodingContext<'a> {
    pub packet: ReadCursor<'a>,
    pub registry: LabelRegistry,
}

impl<'a> DecodingContext<'a> {
    pub fn new(octets: &'a [u8]) -> Self {
        Self {
            packet: ReadCursor::new(octets),
            registry: LabelRegistry::new(),
        }
    }
}

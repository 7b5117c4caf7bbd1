//! Field definitions: the metadata that turns a raw [`crate::primitive::PrimitiveValue`]
//! sequence into a named, positional record field (`spec.md` §4.B).

use std::fmt;

use crate::error::BuildError;
use crate::primitive::PrimitiveKind;

/// One field slot in a [`crate::typedef::TypeDefinition`].
///
/// Only the last field of a type definition may set `allows_multiple`:
/// that is what makes it variadic (e.g. `TXT`'s single `text` field,
/// which repeats to hold every character-string the RDATA contains).
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct FieldDefinition {
    index: usize,
    name: String,
    type_kind: PrimitiveKind,
    allows_multiple: bool,
    minimum: u32,
}

impl FieldDefinition {
    /// # Errors
    ///
    /// If `name` is empty or contains characters outside `[0-9A-Za-z_-]`.
    pub fn new(
        index: usize,
        name: impl Into<String>,
        type_kind: PrimitiveKind,
        allows_multiple: bool,
        minimum: u32,
    ) -> Result<Self, BuildError> {
        let name = name.into().to_ascii_lowercase();
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(BuildError::InvalidFieldName { name });
        }
        Ok(Self {
            index,
            name,
            type_kind,
            allows_multiple,
            minimum,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_kind(&self) -> PrimitiveKind {
        self.type_kind
    }

    pub fn allows_multiple(&self) -> bool {
        self.allows_multiple
    }

    pub fn minimum(&self) -> u32 {
        self.minimum
    }
}

impl fmt::Display for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.type_kind)?;
        if self.allows_multiple {
            write!(f, "+{}", self.minimum)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_name() {
        let field = FieldDefinition::new(0, "NsdName", PrimitiveKind::DomainName, false, 1).unwrap();
        assert_eq!("nsdname", field.name());
    }

    #[test]
    fn rejects_invalid_characters() {
        assert!(FieldDefinition::new(0, "bad name!", PrimitiveKind::Char, false, 1).is_err());
    }

    #[test]
    fn rejects_empty_name() {
        assert!(FieldDefinition::new(0, "", PrimitiveKind::Char, false, 1).is_err());
    }
}

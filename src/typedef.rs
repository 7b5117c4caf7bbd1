//! Type definitions: an ordered set of [`FieldDefinition`]s describing
//! one RDATA shape, plus an optional human-readable stringifier
//! (`spec.md` §4.C).

use std::fmt;
use std::sync::Arc;

use crate::error::BuildError;
use crate::field::FieldDefinition;
use crate::rdata::RecordData;

/// A function rendering a [`RecordData`] as a human-readable string.
/// Boxed so `TypeDefinition` stays `Clone` via `Arc` without forcing a
/// generic parameter onto every caller.
pub type Stringifier = dyn Fn(&RecordData) -> String + Send + Sync;

/// The shape of one RR type's RDATA: an ordered list of named,
/// primitive-typed fields. At most the last field may repeat.
#[derive(Clone)]
pub struct TypeDefinition {
    fields: Vec<FieldDefinition>,
    stringifier: Option<Arc<Stringifier>>,
}

impl fmt::Debug for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TypeDefinition")
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl TypeDefinition {
    /// # Errors
    ///
    /// If any field but the last has `allows_multiple() == true`, or
    /// two fields (after name lower-casing, already done by
    /// [`FieldDefinition::new`]) share a name.
    pub fn new(fields: Vec<FieldDefinition>) -> Result<Self, BuildError> {
        Self::with_stringifier(fields, None)
    }

    /// As [`TypeDefinition::new`], but with a custom renderer in place
    /// of the default space-joined one.
    ///
    /// # Errors
    ///
    /// See [`TypeDefinition::new`].
    pub fn with_stringifier(
        fields: Vec<FieldDefinition>,
        stringifier: Option<Arc<Stringifier>>,
    ) -> Result<Self, BuildError> {
        let last_index = fields.len().saturating_sub(1);
        for (i, field) in fields.iter().enumerate() {
            if field.allows_multiple() && i != last_index {
                return Err(BuildError::QuantifierPositionError {
                    field: field.name().to_string(),
                });
            }
        }

        let mut seen = std::collections::HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.name()) {
                return Err(BuildError::DuplicateFieldName {
                    name: field.name().to_string(),
                });
            }
        }

        Ok(Self { fields, stringifier })
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDefinition> {
        let name = name.to_ascii_lowercase();
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Whether this type's last field is variadic.
    pub fn is_variadic(&self) -> bool {
        self.fields.last().is_some_and(FieldDefinition::allows_multiple)
    }

    /// Render a [`RecordData`] built against this definition as a
    /// string, using the custom stringifier if one was supplied, or
    /// the default (each field's values, space-separated) otherwise.
    pub fn stringify(&self, data: &RecordData) -> String {
        if let Some(stringifier) = &self.stringifier {
            return stringifier(data);
        }
        let mut parts = Vec::new();
        for field in &self.fields {
            if let Some(values) = data.values(field.index()) {
                for value in values {
                    parts.push(value.to_string());
                }
            }
        }
        parts.join(" ")
    }
}

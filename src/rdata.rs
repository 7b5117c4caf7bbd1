//! Record data: a set of field values built against a [`TypeDefinition`]
//! (`spec.md` §4.D).

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::BuildError;
use crate::primitive::PrimitiveValue;
use crate::typedef::TypeDefinition;

/// The values for one resource record's RDATA, indexed by field
/// index. Validated against a [`TypeDefinition`] at construction: a
/// `RecordData` can never hold a value of the wrong kind for its
/// field, fewer values than a field's `minimum`, or more than one
/// value for a non-repeating field.
#[derive(Debug, Clone)]
pub struct RecordData {
    definition: Arc<TypeDefinition>,
    values: BTreeMap<usize, Vec<PrimitiveValue>>,
}

impl RecordData {
    /// # Errors
    ///
    /// If `values` disagrees with `definition`: a missing field, a
    /// wrong-kind value, too few values for a field's `minimum`, or
    /// more than one value for a field that does not `allows_multiple`.
    pub fn new(
        definition: Arc<TypeDefinition>,
        values: BTreeMap<usize, Vec<PrimitiveValue>>,
    ) -> Result<Self, BuildError> {
        for field in definition.fields() {
            let field_values = values.get(&field.index()).map_or(&[][..], Vec::as_slice);

            if field_values.len() < field.minimum() as usize {
                return Err(BuildError::FieldValueOutOfRange {
                    reason: format!(
                        "field {:?} requires at least {} value(s), got {}",
                        field.name(),
                        field.minimum(),
                        field_values.len()
                    ),
                });
            }
            if !field.allows_multiple() && field_values.len() > 1 {
                return Err(BuildError::FieldValueOutOfRange {
                    reason: format!("field {:?} does not repeat but got multiple values", field.name()),
                });
            }
            for value in field_values {
                if value.kind() != field.type_kind() {
                    return Err(BuildError::FieldValueOutOfRange {
                        reason: format!(
                            "field {:?} expects {} values, got {}",
                            field.name(),
                            field.type_kind(),
                            value.kind()
                        ),
                    });
                }
            }
        }

        Ok(Self { definition, values })
    }

    pub fn definition(&self) -> &Arc<TypeDefinition> {
        &self.definition
    }

    pub fn values(&self, field_index: usize) -> Option<&[PrimitiveValue]> {
        self.values.get(&field_index).map(Vec::as_slice)
    }

    pub fn value(&self, field_index: usize) -> Option<&PrimitiveValue> {
        self.values(field_index).and_then(|v| v.first())
    }

    pub fn values_by_name(&self, name: &str) -> Option<&[PrimitiveValue]> {
        let field = self.definition.field_by_name(name)?;
        self.values(field.index())
    }

    /// Iterate fields in declared order together with their values, in
    /// the order the wire encoder must emit them.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[PrimitiveValue])> {
        self.definition.fields().iter().map(move |field| {
            (
                field.index(),
                self.values(field.index()).unwrap_or(&[][..]),
            )
        })
    }

    pub fn to_string_rendering(&self) -> String {
        self.definition.stringify(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDefinition;
    use crate::primitive::{CharacterString, PrimitiveKind};

    fn txt_definition() -> Arc<TypeDefinition> {
        let field =
            FieldDefinition::new(0, "text", PrimitiveKind::CharacterString, true, 1).unwrap();
        Arc::new(TypeDefinition::new(vec![field]).unwrap())
    }

    #[test]
    fn accepts_matching_values() {
        let def = txt_definition();
        let mut values = BTreeMap::new();
        values.insert(
            0,
            vec![PrimitiveValue::CharacterString(
                CharacterString::new(&b"hello"[..]).unwrap(),
            )],
        );
        assert!(RecordData::new(def, values).is_ok());
    }

    #[test]
    fn rejects_missing_required_field() {
        let def = txt_definition();
        assert!(RecordData::new(def, BTreeMap::new()).is_err());
    }

    #[test]
    fn rejects_wrong_kind() {
        let def = txt_definition();
        let mut values = BTreeMap::new();
        values.insert(0, vec![PrimitiveValue::Short(5)]);
        assert!(RecordData::new(def, values).is_err());
    }
}

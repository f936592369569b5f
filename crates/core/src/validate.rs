//! Field-format validation driven by static record schemas.
//!
//! A [`RecordSchema`] is the declarative description attached to a typed
//! record: one `(field, tag, requirement, pattern)` entry per field, with
//! nested schemas for composite fields. Schemas are built once (patterns
//! compiled at build time), stored in per-message-type statics, and shared
//! immutably. Records expose their values through [`FieldSource`]; the
//! validator walks the schema, renders each value to its canonical wire
//! form, and collects every failure into a [`ValidationErrors`] tree.

use crate::pattern::Pattern;
use std::borrow::Cow;
use swift_mt_diagnostics::{
    FieldError, SchemaError, ValidationCause, ValidationErrors,
};

/// Whether a schema field must carry a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// The field must be non-empty (`M` in the SWIFT field tables).
    Mandatory,
    /// The field may be absent (`O`).
    Optional,
}

/// How one schema item checks its value.
#[derive(Debug, Clone)]
pub enum ItemKind {
    /// Validate the canonical string form against a compiled pattern.
    Pattern(Pattern),
    /// Recurse into a nested record with its own schema.
    Dive(RecordSchema),
}

/// One field of a record schema.
#[derive(Debug, Clone)]
pub struct SchemaItem {
    /// The record field name (e.g. `OpeningBalance`).
    pub field: &'static str,
    /// The SWIFT tag label (e.g. `60F`); empty for nested sub-fields.
    pub tag: &'static str,
    /// Whether the field is mandatory.
    pub mandatory: bool,
    /// The check to apply.
    pub kind: ItemKind,
}

/// The ordered, immutable schema of one record type.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    type_name: &'static str,
    items: Vec<SchemaItem>,
}

impl RecordSchema {
    /// Start building a schema for the named record type.
    pub fn builder(type_name: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            type_name,
            entries: Vec::new(),
        }
    }

    /// The record type this schema describes.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The schema items, in declaration order.
    pub fn items(&self) -> &[SchemaItem] {
        &self.items
    }

    /// Validate a record against this schema, collecting every failure.
    pub fn validate(&self, record: &dyn FieldSource) -> Result<(), ValidationErrors> {
        let errors = validate_record(self, record);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

enum BuilderEntry {
    Pattern(&'static str),
    Dive(RecordSchema),
}

/// Builds a [`RecordSchema`], compiling the field patterns.
pub struct SchemaBuilder {
    type_name: &'static str,
    entries: Vec<(&'static str, &'static str, Requirement, BuilderEntry)>,
}

impl SchemaBuilder {
    /// Add a pattern-checked field.
    pub fn field(
        mut self,
        field: &'static str,
        tag: &'static str,
        requirement: Requirement,
        pattern: &'static str,
    ) -> Self {
        self.entries
            .push((field, tag, requirement, BuilderEntry::Pattern(pattern)));
        self
    }

    /// Add a field validated by a nested schema. Repeating fields recurse
    /// element-wise over the same nested schema.
    pub fn dive(
        mut self,
        field: &'static str,
        tag: &'static str,
        requirement: Requirement,
        schema: RecordSchema,
    ) -> Self {
        self.entries
            .push((field, tag, requirement, BuilderEntry::Dive(schema)));
        self
    }

    /// Compile every pattern and produce the schema.
    pub fn build(self) -> Result<RecordSchema, SchemaError> {
        let mut items = Vec::with_capacity(self.entries.len());
        for (field, tag, requirement, entry) in self.entries {
            let kind = match entry {
                BuilderEntry::Pattern(source) => {
                    let pattern =
                        Pattern::compile(source).map_err(|cause| SchemaError::Pattern {
                            field: field.to_string(),
                            pattern: source.to_string(),
                            cause,
                        })?;
                    ItemKind::Pattern(pattern)
                }
                BuilderEntry::Dive(schema) => ItemKind::Dive(schema),
            };
            items.push(SchemaItem {
                field,
                tag,
                mandatory: requirement == Requirement::Mandatory,
                kind,
            });
        }
        Ok(RecordSchema {
            type_name: self.type_name,
            items,
        })
    }

    /// [`SchemaBuilder::build`], panicking on a malformed schema. Meant for
    /// the static schema catalogs, where a failure is a programming error.
    ///
    /// # Panics
    ///
    /// Panics if any field pattern does not compile.
    pub fn must_build(self) -> RecordSchema {
        match self.build() {
            Ok(schema) => schema,
            Err(error) => panic!("invalid record schema: {error}"),
        }
    }
}

// ── Field values ────────────────────────────────────────────────────────────

/// A record field's value as seen by the validator.
pub enum FieldValue<'a> {
    /// A string-ish value, validated as-is.
    Text(Cow<'a, str>),
    /// An amount; canonical form uses a comma decimal mark and two
    /// fractional digits.
    Amount(f64),
    /// An integer; canonical form is base 10.
    Integer(i64),
    /// A repeating plain value, validated element-wise.
    TextList(&'a [String]),
    /// A nested record for a diving schema item.
    Record(&'a dyn FieldSource),
    /// A repeating nested record.
    Records(Vec<&'a dyn FieldSource>),
    /// A value kind the validator does not handle; skipped silently.
    Unsupported,
}

/// Exposes a record's fields to the validator by name.
pub trait FieldSource {
    /// The value of the named field. Unknown names return
    /// [`FieldValue::Unsupported`].
    fn field_value(&self, field: &str) -> FieldValue<'_>;
}

/// Canonical wire form of an amount: two fractional digits, comma mark.
pub(crate) fn canonical_amount(amount: f64) -> String {
    format!("{amount:.2}").replace('.', ",")
}

// ── Validation walk ─────────────────────────────────────────────────────────

fn check_value(item: &SchemaItem, pattern: &Pattern, value: &str) -> Option<ValidationCause> {
    // Empty (or zero, for numeric canonical forms) counts as absent.
    if (value.is_empty() || value == "0") && item.mandatory {
        return Some(ValidationCause::MandatoryEmpty(item.field.to_string()));
    }
    if value.is_empty() {
        return None;
    }
    pattern.validate(value).err().map(ValidationCause::Pattern)
}

fn validate_record(schema: &RecordSchema, record: &dyn FieldSource) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for item in &schema.items {
        let value = record.field_value(item.field);
        match &item.kind {
            ItemKind::Dive(nested_schema) => match value {
                FieldValue::Record(nested) => {
                    let nested_errors = validate_record(nested_schema, nested);
                    if !nested_errors.is_empty() {
                        errors.push(FieldError {
                            field: item.field.to_string(),
                            label: item.tag.to_string(),
                            cause: ValidationCause::Nested(ValidationErrors(nested_errors)),
                        });
                    }
                }
                FieldValue::Records(list) => {
                    let mut element_errors = Vec::new();
                    for (index, nested) in list.iter().enumerate() {
                        let nested_errors = validate_record(nested_schema, *nested);
                        if !nested_errors.is_empty() {
                            element_errors.push(FieldError {
                                field: format!("{}[{}]", item.field, index),
                                label: item.tag.to_string(),
                                cause: ValidationCause::Nested(ValidationErrors(nested_errors)),
                            });
                        }
                    }
                    if !element_errors.is_empty() {
                        errors.push(FieldError {
                            field: item.field.to_string(),
                            label: item.tag.to_string(),
                            cause: ValidationCause::Nested(ValidationErrors(element_errors)),
                        });
                    }
                }
                FieldValue::Unsupported => {}
                _ => errors.push(FieldError {
                    field: item.field.to_string(),
                    label: item.tag.to_string(),
                    cause: ValidationCause::UnsupportedFieldKind(item.field.to_string()),
                }),
            },
            ItemKind::Pattern(pattern) => match value {
                FieldValue::Text(text) => {
                    if let Some(cause) = check_value(item, pattern, &text) {
                        errors.push(FieldError {
                            field: item.field.to_string(),
                            label: item.tag.to_string(),
                            cause,
                        });
                    }
                }
                FieldValue::Amount(amount) => {
                    let canonical = canonical_amount(amount);
                    if let Some(cause) = check_value(item, pattern, &canonical) {
                        errors.push(FieldError {
                            field: item.field.to_string(),
                            label: item.tag.to_string(),
                            cause,
                        });
                    }
                }
                FieldValue::Integer(value) => {
                    let canonical = value.to_string();
                    if let Some(cause) = check_value(item, pattern, &canonical) {
                        errors.push(FieldError {
                            field: item.field.to_string(),
                            label: item.tag.to_string(),
                            cause,
                        });
                    }
                }
                FieldValue::TextList(values) => {
                    let mut element_errors = Vec::new();
                    for (index, text) in values.iter().enumerate() {
                        if let Some(cause) = check_value(item, pattern, text) {
                            element_errors.push(FieldError {
                                field: format!("{}[{}]", item.field, index),
                                label: item.tag.to_string(),
                                cause,
                            });
                        }
                    }
                    if !element_errors.is_empty() {
                        errors.push(FieldError {
                            field: item.field.to_string(),
                            label: item.tag.to_string(),
                            cause: ValidationCause::Nested(ValidationErrors(element_errors)),
                        });
                    }
                }
                FieldValue::Unsupported => {}
                _ => errors.push(FieldError {
                    field: item.field.to_string(),
                    label: item.tag.to_string(),
                    cause: ValidationCause::UnsupportedFieldKind(item.field.to_string()),
                }),
            },
        }
    }

    errors
}

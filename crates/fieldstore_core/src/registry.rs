//! Field-name registry.
//!
//! Assigns each field name a small, stable [`FieldNumber`] for the lifetime
//! of a segment. Numbers are dense and allocated in first-seen order.

use crate::error::{CoreError, CoreResult};
use crate::field::Document;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;

/// Number identifying a field within one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldNumber(pub u32);

impl FieldNumber {
    /// Creates a new field number.
    #[must_use]
    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    /// Returns the raw number.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FieldNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field:{}", self.0)
    }
}

/// What the registry knows about one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Field name.
    pub name: String,
    /// Assigned number.
    pub number: FieldNumber,
    /// Whether any document indexed this field.
    pub indexed: bool,
}

#[derive(Debug, Default)]
struct RegistryInner {
    by_name: HashMap<String, FieldNumber>,
    infos: Vec<FieldInfo>,
}

/// Maps field names to field numbers.
///
/// The registry is shared between the indexing pipeline and the stored-field
/// writer, typically through an `Arc`. Registration and lookup take an
/// internal lock; the writer only ever looks names up.
#[derive(Debug, Default)]
pub struct FieldRegistry {
    inner: RwLock<RegistryInner>,
}

impl FieldRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name`, returning its number.
    ///
    /// Registering an existing name returns the existing number; the indexed
    /// flag is sticky once set.
    pub fn add(&self, name: &str, indexed: bool) -> FieldNumber {
        let mut inner = self.inner.write();
        let existing = inner.by_name.get(name).copied();
        if let Some(number) = existing {
            inner.infos[number.0 as usize].indexed |= indexed;
            return number;
        }

        let number = FieldNumber(inner.infos.len() as u32);
        inner.by_name.insert(name.to_string(), number);
        inner.infos.push(FieldInfo {
            name: name.to_string(),
            number,
            indexed,
        });
        number
    }

    /// Registers every field of `document`.
    pub fn add_document(&self, document: &Document) {
        for field in document.fields() {
            self.add(field.name(), field.flags().is_indexed());
        }
    }

    /// Looks up the number of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnregisteredField`] if the name is unknown.
    pub fn field_number(&self, name: &str) -> CoreResult<FieldNumber> {
        self.inner
            .read()
            .by_name
            .get(name)
            .copied()
            .ok_or_else(|| CoreError::unregistered_field(name))
    }

    /// Returns the info for `number`, if assigned.
    #[must_use]
    pub fn field_info(&self, number: FieldNumber) -> Option<FieldInfo> {
        self.inner.read().infos.get(number.0 as usize).cloned()
    }

    /// Returns the name for `number`, if assigned.
    #[must_use]
    pub fn field_name(&self, number: FieldNumber) -> Option<String> {
        self.field_info(number).map(|info| info.name)
    }

    /// Number of registered fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().infos.len()
    }

    /// Returns true if no field is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> FromIterator<&'a str> for FieldRegistry {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let registry = Self::new();
        for name in iter {
            registry.add(name, false);
        }
        registry
    }
}

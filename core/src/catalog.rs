//! Built-in intake layouts, one per schema version.
//!
//! Each layout pins the column every survey field occupied while that
//! version of the form was live. [`SchemaCatalog`] collects them for lookup.

use serde::{Deserialize, Serialize};

use crate::{FieldSchema, RecordSchema};

/// Version tag of the newest built-in layout.
pub const LATEST_VERSION: &str = "v3";

/// Collection of schema versions, oldest first.
///
/// The built-in catalog documents every layout the intake sheet has used,
/// so rows written by any release can be decoded by naming its version.
///
/// # Examples
///
/// ```
/// use intake_ledger_core::*;
///
/// let catalog = SchemaCatalog::builtin();
/// assert_eq!(catalog.versions(), vec!["v1", "v2", "v3"]);
///
/// let v2 = catalog.get("v2").unwrap();
/// assert_eq!(v2.field("skinTone").unwrap().column, 7);
/// assert_eq!(catalog.latest().unwrap().version, LATEST_VERSION);
///
/// // v3 only adds columns on top of v2
/// assert!(is_additive(v2, catalog.get("v3").unwrap()));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaCatalog {
    /// Schemas ordered from oldest to newest.
    pub schemas: Vec<RecordSchema>,
}

impl SchemaCatalog {
    /// Returns the catalog of built-in intake layouts.
    pub fn builtin() -> Self {
        Self {
            schemas: vec![intake_v1(), intake_v2(), intake_v3()],
        }
    }

    /// Finds a schema by version tag.
    pub fn get(&self, version: &str) -> Option<&RecordSchema> {
        self.schemas.iter().find(|s| s.version == version)
    }

    /// Returns the newest schema.
    pub fn latest(&self) -> Option<&RecordSchema> {
        self.schemas.last()
    }

    /// Lists version tags, oldest first.
    pub fn versions(&self) -> Vec<&str> {
        self.schemas.iter().map(|s| s.version.as_str()).collect()
    }
}

/// First layout: six contiguous columns, demographics then answers.
///
/// | key      | column |
/// |----------|--------|
/// | name     | A (0)  |
/// | phone    | B (1)  |
/// | date     | C (2)  |
/// | skinTone | D (3)  |
/// | skinType | E (4)  |
/// | concerns | F (5)  |
///
/// The v1 form posted the date as `registrationDate`. Records expose it as
/// `date` in every version, so clients written against v1 must rename it.
pub fn intake_v1() -> RecordSchema {
    RecordSchema::new("v1")
        .with_field(FieldSchema::new("name", 0).required().with_label("Name"))
        .with_field(FieldSchema::new("phone", 1).required().with_label("Phone"))
        .with_field(FieldSchema::new("date", 2).with_label("Registration date"))
        .with_field(FieldSchema::new("skinTone", 3).required().with_label("Skin tone"))
        .with_field(FieldSchema::new("skinType", 4).required().with_label("Skin type"))
        .with_field(FieldSchema::new("concerns", 5).required().with_label("Skin concerns"))
}

/// Second layout: answers moved behind an unmapped two-column gap.
///
/// | key      | column |
/// |----------|--------|
/// | name     | A (0)  |
/// | phone    | B (1)  |
/// | date     | C (2)  |
/// | concerns | F (5)  |
/// | skinType | G (6)  |
/// | skinTone | H (7)  |
///
/// Columns D and E are written empty.
pub fn intake_v2() -> RecordSchema {
    RecordSchema::new("v2")
        .with_field(FieldSchema::new("name", 0).required().with_label("Name"))
        .with_field(FieldSchema::new("phone", 1).required().with_label("Phone"))
        .with_field(FieldSchema::new("date", 2).with_label("Registration date"))
        .with_field(FieldSchema::new("concerns", 5).required().with_label("Skin concerns"))
        .with_field(FieldSchema::new("skinType", 6).required().with_label("Skin type"))
        .with_field(FieldSchema::new("skinTone", 7).required().with_label("Skin tone"))
}

/// Third layout: v2 plus follow-up columns filled in by staff.
///
/// | key            | column |
/// |----------------|--------|
/// | analysis       | I (8)  |
/// | recommendation | J (9)  |
pub fn intake_v3() -> RecordSchema {
    let mut schema = intake_v2()
        .with_field(FieldSchema::new("analysis", 8).with_label("Skin analysis"))
        .with_field(FieldSchema::new("recommendation", 9).with_label("Recommended blend"));
    schema.version = "v3".to_string();
    schema
}

//! Record field tags.
//!
//! A record describes itself as an ordered list of named, flagged slots.
//! Each slot carries a tag using one of these comma-separated forms:
//!
//! | Form                 | Meaning                       |
//! |----------------------|-------------------------------|
//! | `-`                  | ignore the field              |
//! | `name,attr`          | required block attribute      |
//! | `name,attr,optional` | optional block attribute      |
//! | `name,block`         | required child block          |
//! | `name,block,optional`| optional child block          |
//! | `name,key`           | required object key           |
//! | `name,key,optional`  | optional object key           |
//! | `,label`             | receives the block label      |
//!
//! Tag errors are programmer mistakes and panic at schema construction.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

const FLAG_ATTR: u8 = 1 << 0; // decode as block attribute
const FLAG_BLOCK: u8 = 1 << 1; // decode as child block
const FLAG_KEY: u8 = 1 << 2; // decode as object key
const FLAG_OPTIONAL: u8 = 1 << 3; // optional field
const FLAG_LABEL: u8 = 1 << 4; // decode as block label

/// A tagged field within a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Name specified within the tag.
    pub name: &'static str,
    /// Field index in the record.
    pub index: usize,

    flags: u8,
}

impl Field {
    /// True if the tagged field is meant to be ignored.
    pub fn is_ignored(&self) -> bool {
        self.name == "-"
    }

    /// True if the tagged field decodes a block attribute.
    pub fn is_attr(&self) -> bool {
        self.flags & FLAG_ATTR != 0
    }

    /// True if the tagged field decodes children blocks.
    pub fn is_block(&self) -> bool {
        self.flags & FLAG_BLOCK != 0
    }

    /// True if the tagged field decodes an object key.
    pub fn is_key(&self) -> bool {
        self.flags & FLAG_KEY != 0
    }

    /// True if the tagged field is optional during decoding.
    pub fn is_optional(&self) -> bool {
        self.flags & FLAG_OPTIONAL != 0
    }

    /// True if the tagged field decodes the block label.
    pub fn is_label(&self) -> bool {
        self.flags & FLAG_LABEL != 0
    }
}

/// The ordered list of tagged fields within a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fields(Vec<Field>);

impl Fields {
    /// True if the tagged fields are used for blocks.
    pub fn block_kind(&self) -> bool {
        self.iter()
            .filter(|field| !field.is_ignored())
            .any(|field| field.is_attr() || field.is_block() || field.is_label())
    }

    /// True if the tagged fields are used for objects.
    pub fn object_kind(&self) -> bool {
        self.iter()
            .filter(|field| !field.is_ignored())
            .any(|field| field.is_key())
    }

    /// Looks up a field by tag name. Ignored fields never match.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.iter()
            .find(|field| !field.is_ignored() && field.name == name)
    }

    /// The label field, if one was declared.
    pub fn label(&self) -> Option<&Field> {
        self.iter().find(|field| field.is_label())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.0.iter()
    }

    /// The names usable as object keys: every named field that is neither
    /// ignored nor the label.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.iter()
            .filter(|field| !field.is_ignored() && !field.is_label())
            .map(|field| field.name)
    }
}

/// Parses the ordered `(field, tag)` pairs of a record into its [`Fields`].
///
/// Panics when the tags violate the schema contract: malformed tag text,
/// reused names, multiple labels, or a mix of block-oriented and
/// object-oriented tags.
pub fn parse_fields(type_name: &str, tags: &[(&'static str, &'static str)]) -> Fields {
    let mut used_names: HashMap<&str, &str> = HashMap::new();
    let mut used_label: Option<&str> = None;

    let mut result = Vec::with_capacity(tags.len());

    for (index, &(field_name, tag)) in tags.iter().enumerate() {
        if tag == "-" {
            result.push(Field {
                name: "-",
                index,
                flags: 0,
            });
            continue;
        }

        if tag.is_empty() {
            panic!("sluice: unsupported empty tag in {type_name}.{field_name}");
        }

        let (name, flag_text) = match tag.split_once(',') {
            Some((name, flags)) => (name, Some(flags)),
            None => (tag, None),
        };

        let flags = match flag_text {
            None => 0,
            Some("attr") => FLAG_ATTR,
            Some("attr,optional") => FLAG_ATTR | FLAG_OPTIONAL,
            Some("block") => FLAG_BLOCK,
            Some("block,optional") => FLAG_BLOCK | FLAG_OPTIONAL,
            Some("key") => FLAG_KEY,
            Some("key,optional") => FLAG_KEY | FLAG_OPTIONAL,
            Some("label") => FLAG_LABEL,
            Some(_) => {
                panic!("sluice: unsupported tag format {tag:?} on {type_name}.{field_name}")
            }
        };

        let field = Field { name, index, flags };

        if !field.name.is_empty() {
            if let Some(first) = used_names.insert(field.name, field_name) {
                panic!(
                    "sluice: {} already used in {type_name} by {first}",
                    field.name
                );
            }
        }

        if field.is_label() {
            if let Some(first) = used_label {
                panic!("sluice: label field already used in {type_name} by {first}");
            }
            used_label = Some(field_name);
        }

        if field.name.is_empty() && (field.is_attr() || field.is_block() || field.is_key()) {
            panic!("sluice: non-empty field name required in {type_name}.{field_name}");
        }

        result.push(field);
    }

    let fields = Fields(result);
    if fields.block_kind() && fields.object_kind() {
        panic!("sluice: record {type_name} has tags for both objects and blocks at the same time");
    }
    fields
}

// ---------------------------------------------------------------------------
// Schema cache
// ---------------------------------------------------------------------------

type Cache = RwLock<HashMap<TypeId, Arc<Fields>>>;

/// Caches the parsed fields for each record type. Entries are created lazily
/// on first use and never evicted; record layouts are static for the
/// lifetime of the process, so this holds a negligible amount of memory.
static FIELDS_CACHE: OnceLock<Cache> = OnceLock::new();

/// Returns the cached [`Fields`] for the record identified by `key`,
/// parsing `tags` on the first request. Inserts are first-writer-wins.
pub fn cached_fields(
    key: TypeId,
    type_name: &str,
    tags: &[(&'static str, &'static str)],
) -> Arc<Fields> {
    let cache = FIELDS_CACHE.get_or_init(Cache::default);

    if let Some(entry) = cache.read().expect("fields cache poisoned").get(&key) {
        return Arc::clone(entry);
    }

    let parsed = Arc::new(parse_fields(type_name, tags));
    let mut guard = cache.write().expect("fields cache poisoned");
    Arc::clone(guard.entry(key).or_insert(parsed))
}

//! # Block Type Registry
//!
//! Maps a block type name to its [`BlockTypeDefinition`] (label, category,
//! icon, attribute schema, capability flags) and to the [`BlockType`] value
//! that renders it.
//!
//! Registration order is significant: [`BlockRegistry::list_by_category`]
//! feeds the editor palette and must be stable run to run.
//!
//! A registry is populated once at startup and then only read. Servers that
//! want a process-wide table call [`install`] once and read it back through
//! [`global`].

pub mod attrs;

use std::sync::OnceLock;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use crate::model::{Block, Column};
use crate::render::RenderContext;

pub use attrs::Attrs;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("block type already registered: {0}")]
    DuplicateType(String),
    #[error("unknown block type: {0}")]
    UnknownType(String),
    #[error("the process-wide block registry is already installed")]
    AlreadyInstalled,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttributeError {
    #[error("attribute `{name}` of `{block_type}` expects {expected}")]
    TypeMismatch {
        block_type: String,
        name: String,
        expected: AttrKind,
    },
}

/// Declared type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl AttrKind {
    /// Whether `value` satisfies this declared type.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            AttrKind::String => value.is_string(),
            AttrKind::Integer => value.is_i64() || value.is_u64(),
            AttrKind::Number => value.is_number(),
            AttrKind::Boolean => value.is_boolean(),
            AttrKind::Array => value.is_array(),
            AttrKind::Object => value.is_object(),
        }
    }
}

impl std::fmt::Display for AttrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AttrKind::String => "a string",
            AttrKind::Integer => "an integer",
            AttrKind::Number => "a number",
            AttrKind::Boolean => "a boolean",
            AttrKind::Array => "an array",
            AttrKind::Object => "an object",
        };
        f.write_str(name)
    }
}

/// Declared type and default of one attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSpec {
    pub kind: AttrKind,
    pub default: Value,
}

/// Attribute name → spec, in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeSchema {
    entries: IndexMap<String, AttributeSpec>,
}

impl AttributeSchema {
    pub fn get(&self, name: &str) -> Option<&AttributeSpec> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeSpec)> {
        self.entries.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, name: &str, kind: AttrKind, default: Value) {
        self.entries
            .entry(name.to_string())
            .or_insert(AttributeSpec { kind, default });
    }
}

/// Capabilities a block type opts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Supports {
    /// `align` attribute → `has-text-align-*` class.
    pub alignment: bool,
    /// `className` attribute appended to the wrapper's classes.
    pub custom_class_name: bool,
    /// `anchor` attribute → wrapper `id`.
    pub anchor: bool,
    /// The block owns columns of nested blocks.
    pub nested_blocks: bool,
}

impl Supports {
    pub const NONE: Supports = Supports {
        alignment: false,
        custom_class_name: false,
        anchor: false,
        nested_blocks: false,
    };

    /// Alignment, class name and anchor.
    pub const TEXT: Supports = Supports {
        alignment: true,
        custom_class_name: true,
        anchor: true,
        nested_blocks: false,
    };

    /// Class name and anchor only.
    pub const BASIC: Supports = Supports {
        alignment: false,
        custom_class_name: true,
        anchor: true,
        nested_blocks: false,
    };
}

/// Static, registry-owned description of a block type.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockTypeDefinition {
    pub name: String,
    pub label: String,
    pub category: String,
    pub icon: String,
    pub schema: AttributeSchema,
    pub supports: Supports,
}

impl BlockTypeDefinition {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        category: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            category: category.into(),
            icon: icon.into(),
            schema: AttributeSchema::default(),
            supports: Supports::NONE,
        }
    }

    pub fn attribute(mut self, name: &str, kind: AttrKind, default: impl Into<Value>) -> Self {
        self.schema.insert(name, kind, default.into());
        self
    }

    pub fn string(self, name: &str, default: &str) -> Self {
        self.attribute(name, AttrKind::String, default)
    }

    pub fn integer(self, name: &str, default: i64) -> Self {
        self.attribute(name, AttrKind::Integer, default)
    }

    pub fn boolean(self, name: &str, default: bool) -> Self {
        self.attribute(name, AttrKind::Boolean, default)
    }

    pub fn array(self, name: &str) -> Self {
        self.attribute(name, AttrKind::Array, Value::Array(Vec::new()))
    }

    /// Set the capability flags; the attributes each capability reads are
    /// declared as empty strings if the schema lacks them.
    pub fn supports(mut self, supports: Supports) -> Self {
        self.supports = supports;
        if supports.alignment {
            self.schema.insert("align", AttrKind::String, Value::from(""));
        }
        if supports.custom_class_name {
            self.schema
                .insert("className", AttrKind::String, Value::from(""));
        }
        if supports.anchor {
            self.schema.insert("anchor", AttrKind::String, Value::from(""));
        }
        self
    }

    /// Validate a value about to be stored under `name`. Undeclared names are
    /// accepted; they are preserved and ignored by the renderer.
    pub fn check(&self, name: &str, value: &Value) -> Result<(), AttributeError> {
        match self.schema.get(name) {
            Some(spec) if !spec.kind.accepts(value) => Err(AttributeError::TypeMismatch {
                block_type: self.name.clone(),
                name: name.to_string(),
                expected: spec.kind,
            }),
            _ => Ok(()),
        }
    }

    /// A new block of this type with a fresh id. Defaults are not
    /// materialized; a nested-blocks type starts with its default number of
    /// empty columns.
    pub fn instantiate(&self) -> Block {
        let mut block = Block::new(self.name.clone());
        if self.supports.nested_blocks {
            let count = self
                .schema
                .get("columnCount")
                .and_then(|spec| spec.default.as_u64())
                .unwrap_or(crate::model::document::DEFAULT_COLUMN_COUNT as u64);
            block.columns = vec![Column::default(); count as usize];
        }
        block
    }
}

/// A renderable block type. Implementations are stateless values registered
/// once at startup; core kinds live in [`crate::kinds`], plugins may add
/// their own.
pub trait BlockType: Send + Sync {
    fn definition(&self) -> BlockTypeDefinition;

    /// Produce the HTML fragment for `block`. Must not panic on malformed
    /// attribute values; `attrs` already substitutes defaults for those.
    fn render(&self, block: &Block, attrs: &Attrs<'_>, cx: &RenderContext<'_>) -> String;
}

struct Registered {
    definition: BlockTypeDefinition,
    kind: Box<dyn BlockType>,
}

/// A category of the editor palette and the block types it lists.
#[derive(Debug, Clone, PartialEq)]
pub struct Category<'a> {
    pub name: &'a str,
    pub types: Vec<&'a BlockTypeDefinition>,
}

#[derive(Default)]
pub struct BlockRegistry {
    types: IndexMap<String, Registered>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every core block kind.
    pub fn with_core_blocks() -> Self {
        let mut registry = Self::new();
        // Core kinds have distinct names, so registration cannot collide.
        if let Err(e) = crate::kinds::register_core_blocks(&mut registry) {
            log::error!("core block registration failed: {e}");
        }
        registry
    }

    pub fn register(&mut self, kind: impl BlockType + 'static) -> Result<(), RegistryError> {
        self.register_boxed(Box::new(kind))
    }

    pub fn register_boxed(&mut self, kind: Box<dyn BlockType>) -> Result<(), RegistryError> {
        let definition = kind.definition();
        if self.types.contains_key(&definition.name) {
            return Err(RegistryError::DuplicateType(definition.name));
        }
        log::debug!("registered block type {}", definition.name);
        self.types
            .insert(definition.name.clone(), Registered { definition, kind });
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<&BlockTypeDefinition, RegistryError> {
        self.types
            .get(name)
            .map(|r| &r.definition)
            .ok_or_else(|| RegistryError::UnknownType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<(&BlockTypeDefinition, &dyn BlockType)> {
        self.types
            .get(name)
            .map(|r| (&r.definition, r.kind.as_ref()))
    }

    /// Definitions grouped by category. Categories appear in the order their
    /// first type was registered; types keep registration order within each.
    pub fn list_by_category(&self) -> Vec<Category<'_>> {
        let mut groups: IndexMap<&str, Vec<&BlockTypeDefinition>> = IndexMap::new();
        for registered in self.types.values() {
            let definition = &registered.definition;
            groups
                .entry(definition.category.as_str())
                .or_default()
                .push(definition);
        }
        groups
            .into_iter()
            .map(|(name, types)| Category { name, types })
            .collect()
    }

    pub fn definitions(&self) -> impl Iterator<Item = &BlockTypeDefinition> {
        self.types.values().map(|r| &r.definition)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl std::fmt::Debug for BlockRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockRegistry")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .finish()
    }
}

static GLOBAL: OnceLock<BlockRegistry> = OnceLock::new();

/// Install the process-wide registry. May be called once.
pub fn install(registry: BlockRegistry) -> Result<&'static BlockRegistry, RegistryError> {
    GLOBAL
        .set(registry)
        .map_err(|_| RegistryError::AlreadyInstalled)?;
    Ok(global())
}

/// The process-wide registry.
///
/// # Panics
///
/// If called before [`install`]. Rendering or editing before the registry
/// exists is a startup-ordering bug, not a data error.
pub fn global() -> &'static BlockRegistry {
    GLOBAL
        .get()
        .expect("block registry used before registry::install()")
}

pub fn try_global() -> Option<&'static BlockRegistry> {
    GLOBAL.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Dummy {
        name: &'static str,
        category: &'static str,
    }

    impl BlockType for Dummy {
        fn definition(&self) -> BlockTypeDefinition {
            BlockTypeDefinition::new(self.name, self.name, self.category, "dummy")
                .integer("size", 3)
        }

        fn render(&self, _: &Block, _: &Attrs<'_>, _: &RenderContext<'_>) -> String {
            String::new()
        }
    }

    fn dummy(name: &'static str, category: &'static str) -> Dummy {
        Dummy { name, category }
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = BlockRegistry::new();
        registry.register(dummy("a", "x")).unwrap();
        assert_eq!(
            registry.register(dummy("a", "y")),
            Err(RegistryError::DuplicateType("a".to_string()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn resolve_unknown_type_fails() {
        let registry = BlockRegistry::new();
        assert_eq!(
            registry.resolve("ghost"),
            Err(RegistryError::UnknownType("ghost".to_string()))
        );
    }

    #[test]
    fn list_by_category_keeps_registration_order() {
        let mut registry = BlockRegistry::new();
        registry.register(dummy("p", "text")).unwrap();
        registry.register(dummy("img", "media")).unwrap();
        registry.register(dummy("h", "text")).unwrap();
        registry.register(dummy("cols", "layout")).unwrap();

        let groups: Vec<(&str, Vec<&str>)> = registry
            .list_by_category()
            .iter()
            .map(|c| (c.name, c.types.iter().map(|d| d.name.as_str()).collect()))
            .collect();

        assert_eq!(
            groups,
            vec![
                ("text", vec!["p", "h"]),
                ("media", vec!["img"]),
                ("layout", vec!["cols"]),
            ]
        );
    }

    #[test]
    fn check_validates_declared_types() {
        let def = dummy("a", "x").definition();
        assert!(def.check("size", &json!(4)).is_ok());
        assert!(def.check("unknown", &json!("anything")).is_ok());
        assert_eq!(
            def.check("size", &json!("big")),
            Err(AttributeError::TypeMismatch {
                block_type: "a".to_string(),
                name: "size".to_string(),
                expected: AttrKind::Integer,
            })
        );
    }

    #[test]
    fn supports_declares_common_attributes() {
        let def = BlockTypeDefinition::new("p", "P", "text", "p").supports(Supports::TEXT);
        assert_eq!(def.schema.get("align").unwrap().kind, AttrKind::String);
        assert!(def.schema.get("className").is_some());
        assert!(def.schema.get("anchor").is_some());
    }

    #[test]
    fn core_registry_has_every_kind() {
        let registry = BlockRegistry::with_core_blocks();
        for name in [
            "paragraph",
            "heading",
            "list",
            "quote",
            "code",
            "image",
            "gallery",
            "embed",
            "columns",
            "spacer",
            "separator",
            "button",
            "card",
            "table",
            "accordion",
            "html",
        ] {
            assert!(registry.contains(name), "missing {name}");
        }
    }

    #[test]
    fn instantiate_columns_starts_with_default_columns() {
        let registry = BlockRegistry::with_core_blocks();
        let block = registry.resolve("columns").unwrap().instantiate();
        assert_eq!(block.columns.len(), 2);
        assert!(block.attributes.is_empty());
    }
}

//! # Stored Format
//!
//! A page is stored as a JSON array of block objects:
//!
//! ```json
//! [{"id":"block-1","type":"paragraph","attributes":{"content":"Hi"}},
//!  {"id":"block-2","type":"columns","attributes":{"columns":[[...],[...]]}}]
//! ```
//!
//! A columns block carries its nested blocks in `attributes.columns` as an
//! array of arrays. Anything that is not a JSON array of typed objects is
//! legacy free-form content and [`parse`] returns `None` for it.

use std::collections::HashSet;

use serde_json::{Map, Value, json};

use crate::model::{Block, BlockId, COLUMNS, Column, Document};

/// Parse stored page content into a [`Document`].
///
/// Returns `None` unless the trimmed text is a JSON array whose every element
/// is an object with a string `type`. Missing or repeated ids are replaced
/// with fresh ones; all other ids are preserved.
pub fn parse(text: &str) -> Option<Document> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    let items = value.as_array()?;

    let mut parser = Parser::default();
    let blocks = items
        .iter()
        .map(|item| parser.block(item, true))
        .collect::<Option<Vec<_>>>()?;
    Some(Document::from_blocks(blocks))
}

/// Serialize a [`Document`] to compact JSON. Attribute key order is kept.
pub fn serialize(doc: &Document) -> String {
    Value::Array(doc.blocks().iter().map(block_to_value).collect()).to_string()
}

/// Turn a columns block's raw `attributes.columns` into real columns, the
/// way [`parse`] does for top-level blocks. Child ids found in `taken` are
/// replaced with fresh ones.
///
/// Only applies to columns blocks without columns of their own; on any other
/// columns block a stray attribute is dropped, since [`serialize`] would
/// overwrite it.
pub(crate) fn lift_raw_columns(block: &mut Block, taken: HashSet<BlockId>) {
    if !block.is_columns() {
        return;
    }
    let Some(raw) = block.attributes.remove(COLUMNS) else {
        return;
    };
    if !block.columns.is_empty() {
        log::warn!("dropping stale `columns` attribute on block {}", block.id);
        return;
    }
    let mut parser = Parser { seen: taken };
    block.columns = parser.columns(Some(&raw));
}

#[derive(Default)]
struct Parser {
    seen: HashSet<BlockId>,
}

impl Parser {
    fn block(&mut self, value: &Value, top_level: bool) -> Option<Block> {
        let object = value.as_object()?;
        let block_type = object.get("type")?.as_str()?;

        let id = match object.get("id") {
            Some(Value::String(s)) if !s.is_empty() => BlockId(s.clone()),
            Some(Value::Number(n)) => BlockId(n.to_string()),
            _ => BlockId::new(),
        };
        let id = if self.seen.contains(&id) {
            log::warn!("duplicate block id {id} in stored content; assigning a new one");
            BlockId::new()
        } else {
            id
        };
        self.seen.insert(id.clone());

        let mut attributes = match object.get("attributes") {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };

        let mut block = Block::with_id(id, block_type);
        // Nested columns blocks keep `columns` as a plain attribute.
        if top_level && block_type == COLUMNS {
            let raw = attributes.remove(COLUMNS);
            block.columns = self.columns(raw.as_ref());
        }
        block.attributes = attributes;
        Some(block)
    }

    fn columns(&mut self, raw: Option<&Value>) -> Vec<Column> {
        let Some(Value::Array(columns)) = raw else {
            return Vec::new();
        };
        columns
            .iter()
            .map(|column| {
                let children = column.as_array().map(Vec::as_slice).unwrap_or(&[]);
                Column::new(
                    children
                        .iter()
                        .filter_map(|child| {
                            let block = self.block(child, false);
                            if block.is_none() {
                                log::warn!("skipping malformed block inside a column");
                            }
                            block
                        })
                        .collect(),
                )
            })
            .collect()
    }
}

fn block_to_value(block: &Block) -> Value {
    let mut attributes = block.attributes.clone();
    if block.is_columns() && !block.columns.is_empty() {
        let columns = block
            .columns
            .iter()
            .map(|column| Value::Array(column.blocks.iter().map(block_to_value).collect()))
            .collect();
        attributes.insert(COLUMNS.to_string(), Value::Array(columns));
    }
    json!({
        "id": block.id,
        "type": block.block_type,
        "attributes": attributes,
    })
}

//! Path-addressed field patches against the live tree.
//!
//! A path such as `cpu-bar.props.style.width` names a node by id followed by
//! the field inside that node's own record. The node record (without its
//! children) is encoded to JSON, the field is written there, and the result is
//! decoded back; the node is only touched once the decoded record is accepted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PatchError;
use crate::model::{ComponentKind, ComponentNode, Props};

pub const PATH_DELIMITER: char = '.';

const PATCHABLE_FIELDS: [&str; 3] = ["id", "type", "props"];

/// Applies `value` at `path`. Returns `false`, leaving the tree untouched,
/// when the patch cannot be applied.
pub fn apply_patch(root: &mut ComponentNode, path: &str, value: &Value) -> bool {
    match try_apply_patch(root, path, value) {
        Ok(()) => true,
        Err(err) => {
            log::debug!("ignoring patch '{path}': {err}");
            false
        }
    }
}

pub fn try_apply_patch(
    root: &mut ComponentNode,
    path: &str,
    value: &Value,
) -> Result<(), PatchError> {
    let (id, fields) = parse_path(path)?;

    let head = fields[0];
    if !PATCHABLE_FIELDS.contains(&head) {
        return Err(PatchError::UnpatchableField {
            field: head.to_string(),
        });
    }

    if let ([field], Value::String(new_id)) = (fields.as_slice(), value) {
        if *field == "id" && (new_id.is_empty() || (new_id != id && root.find(new_id).is_some())) {
            return Err(PatchError::InvalidId { id: new_id.clone() });
        }
    }

    let is_root = root.id == id;
    let node = root.find_mut(id).ok_or_else(|| PatchError::NodeNotFound {
        id: id.to_string(),
    })?;

    let patched = patched_record(node, &fields, value)?;
    if (patched.kind == ComponentKind::Surface) != is_root {
        return Err(PatchError::MisplacedSurface { id: id.to_string() });
    }

    node.id = patched.id;
    node.kind = patched.kind;
    node.props = patched.props;
    Ok(())
}

/// The part of a node a patch may address.
#[derive(Serialize)]
struct RecordRef<'node> {
    id: &'node str,
    #[serde(rename = "type")]
    kind: ComponentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    props: Option<&'node Props>,
}

#[derive(Deserialize)]
struct Record {
    id: String,
    #[serde(rename = "type")]
    kind: ComponentKind,
    #[serde(default)]
    props: Option<Props>,
}

fn patched_record(
    node: &ComponentNode,
    fields: &[&str],
    value: &Value,
) -> Result<Record, PatchError> {
    let current = RecordRef {
        id: &node.id,
        kind: node.kind,
        props: node.props.as_ref(),
    };
    let mut record = serde_json::to_value(&current).map_err(|source| PatchError::Encode {
        id: node.id.clone(),
        source,
    })?;

    set_field(&mut record, fields, value.clone())?;

    serde_json::from_value(record).map_err(|source| PatchError::Rejected {
        id: node.id.clone(),
        source,
    })
}

fn parse_path(path: &str) -> Result<(&str, Vec<&str>), PatchError> {
    if path.is_empty() {
        return Err(PatchError::EmptyPath);
    }

    let mut segments = path.split(PATH_DELIMITER);
    let id = segments.next().unwrap_or_default();
    let fields: Vec<&str> = segments.collect();

    if fields.is_empty() {
        return Err(PatchError::MissingField {
            path: path.to_string(),
        });
    }

    if id.is_empty() || fields.iter().any(|segment| segment.is_empty()) {
        return Err(PatchError::EmptySegment {
            path: path.to_string(),
        });
    }

    Ok((id, fields))
}

fn set_field(record: &mut Value, fields: &[&str], value: Value) -> Result<(), PatchError> {
    let Some((last, parents)) = fields.split_last() else {
        return Err(PatchError::EmptyPath);
    };

    let mut current = record;
    for segment in parents {
        current = descend_or_create(current, segment)?;
    }

    match current {
        Value::Array(items) => {
            let index = parse_index(last, items.len())?;

            if index == items.len() {
                items.push(value);
            } else {
                items[index] = value;
            }
        }
        other => {
            ensure_object(other)?.insert((*last).to_string(), value);
        }
    }

    Ok(())
}

fn descend_or_create<'a>(value: &'a mut Value, segment: &str) -> Result<&'a mut Value, PatchError> {
    match value {
        Value::Array(items) => {
            let index = parse_index(segment, items.len().saturating_sub(1))?;
            items.get_mut(index).ok_or_else(|| PatchError::InvalidIndex {
                segment: segment.to_string(),
            })
        }
        other => Ok(ensure_object(other)?
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()))),
    }
}

/// Replaces a scalar or null standing in the way with an empty record.
fn ensure_object(value: &mut Value) -> Result<&mut Map<String, Value>, PatchError> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }

    value.as_object_mut().ok_or(PatchError::EmptyPath)
}

fn parse_index(segment: &str, max_index: usize) -> Result<usize, PatchError> {
    segment
        .parse::<usize>()
        .ok()
        .filter(|index| *index <= max_index)
        .ok_or_else(|| PatchError::InvalidIndex {
            segment: segment.to_string(),
        })
}

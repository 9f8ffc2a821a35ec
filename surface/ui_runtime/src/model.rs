//! The authoritative tree model: component nodes as they arrive on the wire.
//!
//! Known style and prop keys are typed; anything else is kept verbatim in an
//! `extra` map so that a tree survives a decode/encode cycle unchanged. Style
//! values that fail to decode are read as unset instead of rejecting the tree.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::TreeError;
use crate::patch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Surface,
    Column,
    Row,
    Card,
    Text,
    Button,
    Image,
}

/// A width or height. Symbolic values (`"100%"`) are kept but never resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Points(f64),
    Symbolic(String),
}

impl Dimension {
    pub fn points(&self) -> Option<f64> {
        match self {
            Self::Points(value) if value.is_finite() => Some(*value),
            Self::Points(_) | Self::Symbolic(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlexDirection {
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignItems {
    #[default]
    FlexStart,
    Center,
    FlexEnd,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JustifyContent {
    #[default]
    FlexStart,
    Center,
    SpaceBetween,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub flex_direction: Option<FlexDirection>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub align_items: Option<AlignItems>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub justify_content: Option<JustifyContent>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Props {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Action identifier handed back to the stream producer untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_click: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Props>,
    /// `None` marks a leaf; an empty list is a container with no children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ComponentNode>>,
}

impl ComponentNode {
    pub fn new(id: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            id: id.into(),
            kind,
            props: None,
            children: None,
        }
    }

    pub fn style(&self) -> Option<&Style> {
        self.props.as_ref().and_then(|props| props.style.as_ref())
    }

    pub fn text(&self) -> Option<&str> {
        self.props.as_ref().and_then(|props| props.text.as_deref())
    }

    pub fn children(&self) -> &[ComponentNode] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Depth-first search by id.
    pub fn find(&self, id: &str) -> Option<&ComponentNode> {
        if self.id == id {
            return Some(self);
        }

        self.children().iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut ComponentNode> {
        if self.id == id {
            return Some(self);
        }

        self.children
            .as_mut()?
            .iter_mut()
            .find_map(|child| child.find_mut(id))
    }

    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Self::node_count).sum::<usize>()
    }
}

/// One generation of the surface: created by a full-tree message, edited by
/// patches, and dropped whole when the next full tree arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeModel {
    surface_id: String,
    root: ComponentNode,
}

impl TreeModel {
    pub fn new(surface_id: impl Into<String>, root: ComponentNode) -> Result<Self, TreeError> {
        validate_tree(&root)?;

        Ok(Self {
            surface_id: surface_id.into(),
            root,
        })
    }

    pub fn surface_id(&self) -> &str {
        &self.surface_id
    }

    pub fn root(&self) -> &ComponentNode {
        &self.root
    }

    /// Applies one data model patch in place. See [`patch::apply_patch`].
    pub fn apply_patch(&mut self, path: &str, value: &Value) -> bool {
        patch::apply_patch(&mut self.root, path, value)
    }
}

pub fn validate_tree(root: &ComponentNode) -> Result<(), TreeError> {
    if root.kind != ComponentKind::Surface {
        return Err(TreeError::NotSurfaceRoot { found: root.kind });
    }

    if root.id.is_empty() {
        return Err(TreeError::EmptyId {
            parent: String::new(),
        });
    }

    let mut seen = HashSet::new();
    seen.insert(root.id.as_str());

    let mut stack: Vec<&ComponentNode> = vec![root];
    while let Some(node) = stack.pop() {
        for child in node.children() {
            if child.id.is_empty() {
                return Err(TreeError::EmptyId {
                    parent: node.id.clone(),
                });
            }

            if !seen.insert(child.id.as_str()) {
                return Err(TreeError::DuplicateId {
                    id: child.id.clone(),
                });
            }

            if child.kind == ComponentKind::Surface {
                return Err(TreeError::NestedSurface {
                    id: child.id.clone(),
                });
            }

            stack.push(child);
        }
    }

    Ok(())
}

/// Decodes a field, reading any value of the wrong shape as absent.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

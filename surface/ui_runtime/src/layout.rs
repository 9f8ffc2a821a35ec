//! Box layout for component trees.
//!
//! A synchronous, single-pass cousin of flexbox. Each container:
//!
//! 1. resolves its own width (explicit, else the width offered by its parent)
//!    and leaves its height pending unless it is explicit,
//! 2. gives every child a provisional size: an even share of the row, or the
//!    full content width of a column; heights come from explicit values, the
//!    leaf defaults, or a dry-run measurement of nested containers,
//! 3. lays each child out at the origin,
//! 4. distributes children along the main axis (`justifyContent`), aligns
//!    them on the cross axis (`alignItems`) and translates every subtree to
//!    its absolute position,
//! 5. auto-sizes its own height when none was given.
//!
//! Symbolic sizes are never resolved; they behave exactly like unset values.

use serde::Serialize;

use crate::model::{AlignItems, ComponentKind, ComponentNode, FlexDirection, JustifyContent, Props};

/// Height of a `Text` leaf without an explicit height.
pub const TEXT_HEIGHT: f64 = 30.0;
/// Height of a `Button` leaf without an explicit height.
pub const BUTTON_HEIGHT: f64 = 60.0;
/// Height of any other leaf without an explicit height.
pub const LEAF_HEIGHT: f64 = 50.0;

pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1000.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;

/// Logical size every layout pass starts from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Absolute geometry, top-left origin, never negative in size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ComputedLayout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ComputedLayout {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// A node plus its computed geometry. Children carry absolute coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Props>,
    pub layout: ComputedLayout,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderNode>,
}

impl RenderNode {
    fn new(node: &ComponentNode, layout: ComputedLayout, children: Vec<RenderNode>) -> Self {
        Self {
            id: node.id.clone(),
            kind: node.kind,
            props: node.props.clone(),
            layout,
            children,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.props.as_ref().and_then(|props| props.text.as_deref())
    }

    pub fn find(&self, id: &str) -> Option<&RenderNode> {
        self.iter().find(|node| node.id == id)
    }

    /// Pre-order walk over this node and every descendant.
    pub fn iter(&self) -> RenderNodeIter<'_> {
        RenderNodeIter { stack: vec![self] }
    }

    fn place_at(&mut self, position: Point) {
        let dx = position.x - self.layout.x;
        let dy = position.y - self.layout.y;
        self.translate(dx, dy);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.layout.x += dx;
        self.layout.y += dy;

        for child in &mut self.children {
            child.translate(dx, dy);
        }
    }
}

pub struct RenderNodeIter<'tree> {
    stack: Vec<&'tree RenderNode>,
}

impl<'tree> Iterator for RenderNodeIter<'tree> {
    type Item = &'tree RenderNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Lays out a whole tree against the viewport.
pub fn layout_tree(root: &ComponentNode, viewport: Viewport) -> RenderNode {
    compute_layout(
        root,
        Size::new(viewport.width, viewport.height),
        Point::ORIGIN,
    )
}

/// Lays out `node` and its subtree with its top-left corner at `origin`.
///
/// `available.width` is the width the parent offers. `available.height` is
/// the height the parent resolved for this node; a node without an explicit
/// height still sizes itself (leaf default or measured content), which is the
/// value the parent resolved in the first place.
pub fn compute_layout(node: &ComponentNode, available: Size, origin: Point) -> RenderNode {
    let box_style = BoxStyle::of(node);
    let width = box_style.width.unwrap_or(available.width).max(0.0);

    let Some(children) = node.children.as_deref() else {
        let height = box_style
            .height
            .unwrap_or_else(|| leaf_height(node.kind))
            .max(0.0);
        let layout = ComputedLayout {
            x: origin.x,
            y: origin.y,
            width,
            height,
        };
        return RenderNode::new(node, layout, Vec::new());
    };

    let axis = box_style.axis;
    let padding = box_style.padding;
    let gap = box_style.gap;
    let mut height = box_style.height.unwrap_or(0.0).max(0.0);
    let content_width = (width - 2.0 * padding).max(0.0);

    let mut laid_out: Vec<RenderNode> = children
        .iter()
        .map(|child| {
            let child_width = provisional_width(child, axis, content_width, gap, children.len());
            let child_height = measure_height(child, child_width);
            compute_layout(child, Size::new(child_width, child_height), Point::ORIGIN)
        })
        .collect();

    let container = Size::new(width, height);
    let content_main: f64 = laid_out
        .iter()
        .map(|child| axis.main(child.layout.size()))
        .sum();
    let (start, spacing) = distribute(
        box_style.justify,
        axis.main(container),
        content_main,
        gap,
        padding,
        laid_out.len(),
    );

    let mut cursor = axis.main_of(origin) + padding + start;
    let cross_start = axis.cross_of(origin) + padding;
    let mut max_cross = 0.0_f64;

    for child in &mut laid_out {
        let child_size = child.layout.size();
        let offset = cross_offset(
            box_style.align,
            axis.cross(container),
            padding,
            axis.cross(child_size),
        );
        child.place_at(axis.point(cursor, cross_start + offset));

        cursor += axis.main(child_size) + spacing;
        max_cross = max_cross.max(axis.cross(child_size));
    }

    if box_style.height.is_none() {
        height = match axis {
            Axis::Row => max_cross + 2.0 * padding,
            Axis::Column => cursor - origin.y,
        };
    }

    let layout = ComputedLayout {
        x: origin.x,
        y: origin.y,
        width,
        height: height.max(0.0),
    };
    RenderNode::new(node, layout, laid_out)
}

/// Dry run of [`compute_layout`] that only produces the node's height.
///
/// Positions are never computed; a container without an explicit height is
/// measured the way it would auto-size with nothing resolved on its main axis.
pub fn measure_height(node: &ComponentNode, width: f64) -> f64 {
    let box_style = BoxStyle::of(node);
    if let Some(height) = box_style.height {
        return height.max(0.0);
    }

    let Some(children) = node.children.as_deref() else {
        return leaf_height(node.kind);
    };

    let width = box_style.width.unwrap_or(width).max(0.0);
    let content_width = (width - 2.0 * box_style.padding).max(0.0);
    let heights = children.iter().map(|child| {
        let child_width = provisional_width(
            child,
            box_style.axis,
            content_width,
            box_style.gap,
            children.len(),
        );
        measure_height(child, child_width)
    });

    match box_style.axis {
        Axis::Row => heights.fold(0.0_f64, f64::max) + 2.0 * box_style.padding,
        Axis::Column => {
            box_style.padding + heights.map(|height| height + box_style.gap).sum::<f64>()
        }
    }
}

fn leaf_height(kind: ComponentKind) -> f64 {
    match kind {
        ComponentKind::Text => TEXT_HEIGHT,
        ComponentKind::Button => BUTTON_HEIGHT,
        _ => LEAF_HEIGHT,
    }
}

fn provisional_width(
    child: &ComponentNode,
    axis: Axis,
    content_width: f64,
    gap: f64,
    count: usize,
) -> f64 {
    if let Some(width) = BoxStyle::of(child).width {
        return width.max(0.0);
    }

    match axis {
        Axis::Row => {
            let gaps = gap * count.saturating_sub(1) as f64;
            ((content_width - gaps) / count.max(1) as f64).max(0.0)
        }
        Axis::Column => content_width,
    }
}

/// Starting offset and effective gap along the main axis.
fn distribute(
    justify: JustifyContent,
    container_main: f64,
    content_main: f64,
    gap: f64,
    padding: f64,
    count: usize,
) -> (f64, f64) {
    if count == 0 {
        return (0.0, gap);
    }
    let gaps = (count - 1) as f64;

    match justify {
        JustifyContent::Center if container_main > 0.0 => {
            let free = container_main - content_main - gap * gaps - 2.0 * padding;
            ((free / 2.0).max(0.0), gap)
        }
        JustifyContent::SpaceBetween if count > 1 => {
            let free = container_main - content_main - 2.0 * padding;
            if free > 0.0 {
                (0.0, free / gaps)
            } else {
                (0.0, gap)
            }
        }
        JustifyContent::FlexStart | JustifyContent::Center | JustifyContent::SpaceBetween => {
            (0.0, gap)
        }
    }
}

/// Cross-axis offset inside the padded content box. An unresolved container
/// cross size pins children to the start.
fn cross_offset(align: AlignItems, container_cross: f64, padding: f64, child_cross: f64) -> f64 {
    if container_cross <= 0.0 {
        return 0.0;
    }

    let free = container_cross - 2.0 * padding - child_cross;
    match align {
        AlignItems::FlexStart => 0.0,
        AlignItems::Center => (free / 2.0).max(0.0),
        AlignItems::FlexEnd => free.max(0.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Row,
    Column,
}

impl Axis {
    fn main(self, size: Size) -> f64 {
        match self {
            Self::Row => size.width,
            Self::Column => size.height,
        }
    }

    fn cross(self, size: Size) -> f64 {
        match self {
            Self::Row => size.height,
            Self::Column => size.width,
        }
    }

    fn main_of(self, point: Point) -> f64 {
        match self {
            Self::Row => point.x,
            Self::Column => point.y,
        }
    }

    fn cross_of(self, point: Point) -> f64 {
        match self {
            Self::Row => point.y,
            Self::Column => point.x,
        }
    }

    fn point(self, main: f64, cross: f64) -> Point {
        match self {
            Self::Row => Point::new(main, cross),
            Self::Column => Point::new(cross, main),
        }
    }
}

/// The style fields layout reads, with defaults applied.
struct BoxStyle {
    width: Option<f64>,
    height: Option<f64>,
    padding: f64,
    gap: f64,
    axis: Axis,
    align: AlignItems,
    justify: JustifyContent,
}

impl BoxStyle {
    fn of(node: &ComponentNode) -> Self {
        let style = node.style();
        let direction = style.and_then(|style| style.flex_direction);
        let axis = match direction {
            Some(FlexDirection::Row) => Axis::Row,
            Some(FlexDirection::Column) => Axis::Column,
            None if node.kind == ComponentKind::Row => Axis::Row,
            None => Axis::Column,
        };

        Self {
            width: style
                .and_then(|style| style.width.as_ref())
                .and_then(|width| width.points()),
            height: style
                .and_then(|style| style.height.as_ref())
                .and_then(|height| height.points()),
            padding: non_negative(style.and_then(|style| style.padding)),
            gap: non_negative(style.and_then(|style| style.gap)),
            axis,
            align: style.and_then(|style| style.align_items).unwrap_or_default(),
            justify: style
                .and_then(|style| style.justify_content)
                .unwrap_or_default(),
        }
    }
}

fn non_negative(value: Option<f64>) -> f64 {
    value.filter(|value| value.is_finite()).unwrap_or(0.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn node(value: Value) -> ComponentNode {
        serde_json::from_value(value).expect("decode node")
    }

    fn layout_of<'tree>(root: &'tree RenderNode, id: &str) -> &'tree ComputedLayout {
        &root.find(id).expect("node in layout").layout
    }

    fn rect(x: f64, y: f64, width: f64, height: f64) -> ComputedLayout {
        ComputedLayout {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn leaf_kinds_get_default_heights() {
        let root = node(json!({
            "id": "root",
            "type": "Surface",
            "children": [
                { "id": "label", "type": "Text", "props": { "text": "hi" } },
                { "id": "go", "type": "Button", "props": { "text": "Go", "onClick": "go" } },
                { "id": "pic", "type": "Image" },
                { "id": "tall", "type": "Text", "props": { "style": { "height": 44 } } }
            ]
        }));

        let laid_out = layout_tree(&root, Viewport::default());
        assert_eq!(layout_of(&laid_out, "label").height, TEXT_HEIGHT);
        assert_eq!(layout_of(&laid_out, "go").height, BUTTON_HEIGHT);
        assert_eq!(layout_of(&laid_out, "pic").height, LEAF_HEIGHT);
        assert_eq!(layout_of(&laid_out, "tall").height, 44.0);
    }

    #[test]
    fn column_stacks_children_and_auto_sizes() {
        let root = node(json!({
            "id": "root",
            "type": "Surface",
            "props": { "style": { "padding": 10, "gap": 5 } },
            "children": [
                { "id": "a", "type": "Text" },
                { "id": "b", "type": "Button" }
            ]
        }));

        let laid_out = layout_tree(&root, Viewport::default());
        assert_eq!(*layout_of(&laid_out, "a"), rect(10.0, 10.0, 980.0, 30.0));
        assert_eq!(*layout_of(&laid_out, "b"), rect(10.0, 45.0, 980.0, 60.0));
        // final cursor: 10 + 30 + 5 + 60 + 5
        assert_eq!(laid_out.layout, rect(0.0, 0.0, 1000.0, 110.0));
    }

    #[test]
    fn row_auto_sizes_to_tallest_child_plus_padding() {
        let root = node(json!({
            "id": "root",
            "type": "Surface",
            "children": [{
                "id": "bar",
                "type": "Row",
                "props": { "style": { "padding": 12, "gap": 8 } },
                "children": [
                    { "id": "t", "type": "Text" },
                    { "id": "b", "type": "Button" },
                    { "id": "c", "type": "Card", "props": { "style": { "height": 20 } } }
                ]
            }]
        }));

        let laid_out = layout_tree(&root, Viewport::default());
        let bar = layout_of(&laid_out, "bar");
        assert_eq!(bar.height, BUTTON_HEIGHT + 24.0);

        // (1000 - 24 - 16) / 3
        assert_eq!(*layout_of(&laid_out, "t"), rect(12.0, 12.0, 320.0, 30.0));
        assert_eq!(*layout_of(&laid_out, "b"), rect(340.0, 12.0, 320.0, 60.0));
        assert_eq!(*layout_of(&laid_out, "c"), rect(668.0, 12.0, 320.0, 20.0));
    }

    #[test]
    fn row_type_or_direction_selects_the_main_axis() {
        let root = node(json!({
            "id": "root",
            "type": "Surface",
            "props": { "style": { "flexDirection": "row" } },
            "children": [
                { "id": "a", "type": "Card", "props": { "style": { "width": 100 } } },
                {
                    "id": "columnish",
                    "type": "Row",
                    "props": { "style": { "flexDirection": "column", "width": 100 } },
                    "children": [
                        { "id": "x", "type": "Text" },
                        { "id": "y", "type": "Text" }
                    ]
                }
            ]
        }));

        let laid_out = layout_tree(&root, Viewport::default());
        assert_eq!(*layout_of(&laid_out, "a"), rect(0.0, 0.0, 100.0, 50.0));
        assert_eq!(layout_of(&laid_out, "columnish").x, 100.0);
        assert_eq!(*layout_of(&laid_out, "x"), rect(100.0, 0.0, 100.0, 30.0));
        assert_eq!(*layout_of(&laid_out, "y"), rect(100.0, 30.0, 100.0, 30.0));
    }

    #[test]
    fn space_between_spreads_leftover_into_gaps() {
        let root = node(json!({
            "id": "root",
            "type": "Surface",
            "children": [{
                "id": "row",
                "type": "Row",
                "props": { "style": {
                    "width": 500, "height": 40, "padding": 10, "gap": 4,
                    "justifyContent": "space-between"
                } },
                "children": [
                    { "id": "a", "type": "Card", "props": { "style": { "width": 100, "height": 20 } } },
                    { "id": "b", "type": "Card", "props": { "style": { "width": 60, "height": 20 } } },
                    { "id": "c", "type": "Card", "props": { "style": { "width": 40, "height": 20 } } }
                ]
            }]
        }));

        let laid_out = layout_tree(&root, Viewport::default());
        // leftover = 500 - 200 - 20 = 280, two gaps of 140
        assert_eq!(layout_of(&laid_out, "a").x, 10.0);
        assert_eq!(layout_of(&laid_out, "b").x, 250.0);
        assert_eq!(layout_of(&laid_out, "c").x, 450.0);
    }

    #[test]
    fn space_between_without_leftover_keeps_the_gap() {
        let root = node(json!({
            "id": "root",
            "type": "Surface",
            "children": [{
                "id": "row",
                "type": "Row",
                "props": { "style": { "width": 100, "gap": 7, "justifyContent": "space-between" } },
                "children": [
                    { "id": "a", "type": "Card", "props": { "style": { "width": 80 } } },
                    { "id": "b", "type": "Card", "props": { "style": { "width": 80 } } }
                ]
            }]
        }));

        let laid_out = layout_tree(&root, Viewport::default());
        assert_eq!(layout_of(&laid_out, "b").x, 87.0);
    }

    #[test]
    fn space_between_with_one_child_matches_flex_start() {
        let build = |justify: &str| {
            node(json!({
                "id": "root",
                "type": "Surface",
                "children": [{
                    "id": "row",
                    "type": "Row",
                    "props": { "style": {
                        "width": 300, "height": 50, "padding": 6, "gap": 9,
                        "justifyContent": justify
                    } },
                    "children": [
                        { "id": "only", "type": "Card", "props": { "style": { "width": 40 } } }
                    ]
                }]
            }))
        };

        let between = layout_tree(&build("space-between"), Viewport::default());
        let start = layout_tree(&build("flex-start"), Viewport::default());
        assert_eq!(between, {
            let mut expected = start.clone();
            expected.children[0].props = between.children[0].props.clone();
            expected
        });
        assert_eq!(*layout_of(&between, "only"), rect(6.0, 6.0, 40.0, 50.0));
    }

    #[test]
    fn justify_center_offsets_the_run() {
        let root = node(json!({
            "id": "root",
            "type": "Surface",
            "children": [{
                "id": "row",
                "type": "Row",
                "props": { "style": {
                    "width": 400, "height": 60, "padding": 10, "gap": 20,
                    "justifyContent": "center"
                } },
                "children": [
                    { "id": "a", "type": "Card", "props": { "style": { "width": 50 } } },
                    { "id": "b", "type": "Card", "props": { "style": { "width": 70 } } }
                ]
            }]
        }));

        let laid_out = layout_tree(&root, Viewport::default());
        // (400 - 120 - 20 - 20) / 2 = 120
        assert_eq!(layout_of(&laid_out, "a").x, 130.0);
        assert_eq!(layout_of(&laid_out, "b").x, 200.0);
    }

    #[test]
    fn empty_container_ignores_justification() {
        let build = |justify: &str| {
            node(json!({
                "id": "root",
                "type": "Surface",
                "children": [{
                    "id": "stack",
                    "type": "Column",
                    "props": { "style": {
                        "width": 200, "padding": 8, "gap": 12, "justifyContent": justify
                    } },
                    "children": []
                }]
            }))
        };

        for justify in ["center", "space-between"] {
            let laid_out = layout_tree(&build(justify), Viewport::default());
            assert_eq!(*layout_of(&laid_out, "stack"), rect(0.0, 0.0, 200.0, 8.0));
        }
        assert_eq!(distribute(JustifyContent::Center, 300.0, 0.0, 12.0, 8.0, 0), (0.0, 12.0));
    }

    #[test]
    fn align_center_splits_cross_space_evenly() {
        let root = node(json!({
            "id": "root",
            "type": "Surface",
            "props": { "style": { "width": 300, "alignItems": "center" } },
            "children": [
                { "id": "card", "type": "Card", "props": { "style": { "width": 120 } } }
            ]
        }));

        let laid_out = layout_tree(&root, Viewport::default());
        assert_eq!(layout_of(&laid_out, "card").x, (300.0 - 120.0) / 2.0);
    }

    #[test]
    fn align_flex_end_pushes_to_the_far_edge() {
        let root = node(json!({
            "id": "root",
            "type": "Surface",
            "children": [{
                "id": "row",
                "type": "Row",
                "props": { "style": { "height": 100, "alignItems": "flex-end" } },
                "children": [
                    { "id": "bar", "type": "Card", "props": { "style": { "height": 35 } } }
                ]
            }]
        }));

        let laid_out = layout_tree(&root, Viewport::default());
        assert_eq!(layout_of(&laid_out, "bar").y, 65.0);
    }

    #[test]
    fn unresolved_cross_size_pins_children_to_start() {
        let root = node(json!({
            "id": "root",
            "type": "Surface",
            "children": [{
                "id": "row",
                "type": "Row",
                "props": { "style": { "alignItems": "center" } },
                "children": [
                    { "id": "short", "type": "Text" },
                    { "id": "long", "type": "Button" }
                ]
            }]
        }));

        let laid_out = layout_tree(&root, Viewport::default());
        assert_eq!(layout_of(&laid_out, "short").y, 0.0);
        assert_eq!(layout_of(&laid_out, "row").height, BUTTON_HEIGHT);
    }

    #[test]
    fn nested_subtrees_are_translated_to_absolute_coordinates() {
        let root = node(json!({
            "id": "root",
            "type": "Surface",
            "props": { "style": { "padding": 40, "gap": 20 } },
            "children": [
                { "id": "spacer", "type": "Card", "props": { "style": { "height": 100 } } },
                {
                    "id": "outer",
                    "type": "Card",
                    "props": { "style": { "padding": 10, "width": 400 } },
                    "children": [{
                        "id": "inner",
                        "type": "Row",
                        "props": { "style": { "padding": 5 } },
                        "children": [
                            { "id": "leaf", "type": "Text", "props": { "style": { "width": 50 } } }
                        ]
                    }]
                }
            ]
        }));

        let laid_out = layout_tree(&root, Viewport::default());
        assert_eq!(layout_of(&laid_out, "outer").y, 160.0);
        assert_eq!(*layout_of(&laid_out, "inner"), rect(50.0, 170.0, 380.0, 40.0));
        assert_eq!(*layout_of(&laid_out, "leaf"), rect(55.0, 175.0, 50.0, 30.0));
    }

    #[test]
    fn symbolic_sizes_behave_like_unset_values() {
        let symbolic = node(json!({
            "id": "root",
            "type": "Surface",
            "children": [
                { "id": "c", "type": "Card", "props": { "style": { "width": "50%", "height": "auto" } } }
            ]
        }));
        let unset = node(json!({
            "id": "root",
            "type": "Surface",
            "children": [ { "id": "c", "type": "Card" } ]
        }));

        let symbolic = layout_tree(&symbolic, Viewport::default());
        let unset = layout_tree(&unset, Viewport::default());
        assert_eq!(layout_of(&symbolic, "c"), layout_of(&unset, "c"));
        assert_eq!(*layout_of(&symbolic, "c"), rect(0.0, 0.0, 1000.0, LEAF_HEIGHT));
    }

    #[test]
    fn dry_run_height_matches_the_real_pass() {
        let root = node(json!({
            "id": "root",
            "type": "Surface",
            "children": [{
                "id": "card",
                "type": "Card",
                "props": { "style": { "padding": 8, "gap": 6, "justifyContent": "center" } },
                "children": [
                    { "id": "title", "type": "Text" },
                    {
                        "id": "row",
                        "type": "Row",
                        "props": { "style": { "padding": 4, "alignItems": "center" } },
                        "children": [
                            { "id": "b", "type": "Button" },
                            { "id": "i", "type": "Image", "props": { "style": { "height": 90 } } }
                        ]
                    },
                    { "id": "empty", "type": "Column", "children": [] }
                ]
            }]
        }));

        let card = root.find("card").expect("card");
        let measured = measure_height(card, 600.0);
        let real = compute_layout(card, Size::new(600.0, 0.0), Point::ORIGIN);
        assert_eq!(measured, real.layout.height);
    }

    #[test]
    fn geometry_is_never_negative() {
        let root = node(json!({
            "id": "root",
            "type": "Surface",
            "props": { "style": { "width": 50, "padding": 40, "alignItems": "center" } },
            "children": [{
                "id": "wide",
                "type": "Row",
                "props": { "style": { "width": -20, "height": -5, "justifyContent": "center" } },
                "children": [ { "id": "x", "type": "Card", "props": { "style": { "width": 300 } } } ]
            }]
        }));

        let laid_out = layout_tree(&root, Viewport::default());
        for node in laid_out.iter() {
            assert!(node.layout.x >= 0.0, "{} x", node.id);
            assert!(node.layout.y >= 0.0, "{} y", node.id);
            assert!(node.layout.width >= 0.0, "{} width", node.id);
            assert!(node.layout.height >= 0.0, "{} height", node.id);
        }
    }

    #[test]
    fn identical_input_gives_identical_geometry() {
        let root = node(json!({
            "id": "root",
            "type": "Surface",
            "props": { "style": { "padding": 3, "gap": 1.5 } },
            "children": [
                { "id": "r", "type": "Row", "props": { "style": { "gap": 2.25 } }, "children": [
                    { "id": "a", "type": "Text" }, { "id": "b", "type": "Text" }, { "id": "c", "type": "Text" }
                ]}
            ]
        }));

        let viewport = Viewport { width: 333.0, height: 777.0 };
        assert_eq!(layout_tree(&root, viewport), layout_tree(&root, viewport));
    }

    #[test]
    fn iter_walks_in_document_order() {
        let root = node(json!({
            "id": "root",
            "type": "Surface",
            "children": [
                { "id": "a", "type": "Card", "children": [ { "id": "a1", "type": "Text" } ] },
                { "id": "b", "type": "Text" }
            ]
        }));

        let laid_out = layout_tree(&root, Viewport::default());
        let ids: Vec<&str> = laid_out.iter().map(|node| node.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "a", "a1", "b"]);
    }
}

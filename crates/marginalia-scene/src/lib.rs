//! Retained-mode scene graph implementing the engine's [`Surface`] contract.
//!
//! Each rendered span becomes one [`SceneGroup`] holding two independently
//! visible sublayers: a fill layer of rectangles and an outline layer of
//! stroked segments or wave paths. Groups composite in insertion order and
//! are destroyed by span id. Hosts walk the retained nodes to paint with
//! whatever raster or vector backend they embed; an immediate-mode backend
//! can replace this crate entirely by implementing [`Surface`] itself.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use marginalia_engine::{OutlineShape, Point, Rect, Size, SpanId, Surface, SurfaceGroup};

/// Id prefix of every fill sublayer.
pub const RECT_PREFIX: &str = "rect-";
/// Id prefix of every outline sublayer.
pub const LINE_PREFIX: &str = "line-";

/// One drawable in a sublayer.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    /// Filled rectangle.
    Rect { rect: Rect, fill: String },
    /// Stroked segment, solid or dashed.
    Line {
        from: Point,
        to: Point,
        stroke: String,
        width: f64,
        dash: Option<(f64, f64)>,
    },
    /// Stroked path in `M`/`q` path-data form (wave outlines).
    Path {
        data: String,
        stroke: String,
        width: f64,
    },
}

/// A toggleable sublayer of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLayer {
    pub id: String,
    pub visible: bool,
    pub nodes: Vec<SceneNode>,
}

/// Retained rendering of one span.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGroup {
    pub id: SpanId,
    pub fill: SceneLayer,
    pub outline: SceneLayer,
}

/// The scene graph: sized canvas plus groups in z-order.
#[derive(Debug, Default)]
pub struct SceneSurface {
    size: Size,
    groups: Vec<SceneGroup>,
    destroyed: bool,
}

impl SceneSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface wrapped for shared ownership, so a host can keep reading
    /// the scene while the stage owns the `Surface` handle.
    pub fn shared() -> Rc<RefCell<SceneSurface>> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Groups in compositing order (first drawn lowest).
    pub fn groups(&self) -> &[SceneGroup] {
        &self.groups
    }

    pub fn find(&self, id: &SpanId) -> Option<&SceneGroup> {
        self.groups.iter().find(|group| group.id == *id)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl Surface for SceneSurface {
    fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    fn add_group(&mut self, group: SurfaceGroup) {
        let fill_nodes = group
            .fill
            .iter()
            .map(|rect| SceneNode::Rect {
                rect: *rect,
                fill: group.style.rect_fill.clone(),
            })
            .collect();
        let outline_nodes = group
            .outline
            .iter()
            .map(|shape| outline_node(shape, &group.style.line_stroke, group.style.line_width))
            .collect();

        self.groups.push(SceneGroup {
            id: group.id,
            fill: SceneLayer {
                id: format!("{RECT_PREFIX}{}", group.id),
                visible: group.fill_visible,
                nodes: fill_nodes,
            },
            outline: SceneLayer {
                id: format!("{LINE_PREFIX}{}", group.id),
                visible: group.outline_visible,
                nodes: outline_nodes,
            },
        });
    }

    fn remove_group(&mut self, id: &SpanId) -> bool {
        let before = self.groups.len();
        self.groups.retain(|group| group.id != *id);
        self.groups.len() != before
    }

    fn clear(&mut self) {
        self.groups.clear();
    }

    fn destroy(&mut self) {
        self.groups.clear();
        self.size = Size::default();
        self.destroyed = true;
    }
}

/// Delegation so a host can hold a reading clone while the stage paints.
impl Surface for Rc<RefCell<SceneSurface>> {
    fn set_size(&mut self, size: Size) {
        self.borrow_mut().set_size(size);
    }
    fn add_group(&mut self, group: SurfaceGroup) {
        self.borrow_mut().add_group(group);
    }
    fn remove_group(&mut self, id: &SpanId) -> bool {
        self.borrow_mut().remove_group(id)
    }
    fn clear(&mut self) {
        self.borrow_mut().clear();
    }
    fn destroy(&mut self) {
        self.borrow_mut().destroy();
    }
}

fn outline_node(shape: &OutlineShape, stroke: &str, width: f64) -> SceneNode {
    match shape {
        OutlineShape::Segment { from, to, dash } => SceneNode::Line {
            from: *from,
            to: *to,
            stroke: stroke.to_string(),
            width,
            dash: *dash,
        },
        OutlineShape::Humps { start, segments } => SceneNode::Path {
            data: humps_path_data(*start, segments),
            stroke: stroke.to_string(),
            width,
        },
    }
}

/// Lower absolute hump geometry to relative `M`/`q` path data.
fn humps_path_data(start: Point, segments: &[marginalia_engine::QuadSegment]) -> String {
    let mut data = format!("M{},{}", start.x, start.y);
    let mut current = start;
    for segment in segments {
        let _ = write!(
            data,
            "q{},{} {},{}",
            segment.control.x - current.x,
            segment.control.y - current.y,
            segment.to.x - current.x,
            segment.to.y - current.y,
        );
        current = segment.to;
    }
    data
}

//! Render stage: group bookkeeping, spatial queries, and the surface contract.
//!
//! The stage owns the ordered list of rendered groups and answers the two
//! geometric questions the coordinator asks: "which groups sit under this
//! point" and "which groups visually cover this selection". Actual painting
//! is delegated through [`Surface`], so backends stay swappable; one
//! retained-mode implementation ships in the `marginalia-scene` crate.

use std::cmp::Ordering;

use crate::doc::DocumentModel;
use crate::geom::{Point, Rect, Size};
use crate::marking::span::SpanId;
use crate::style::{DASH_PATTERN, LineShape, MarkerStyle, WAVE_AMPLITUDE, WAVE_SEGMENT_WIDTH};

/// One quadratic-bezier hump of a wave outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadSegment {
    pub control: Point,
    pub to: Point,
}

/// Outline drawn along the bottom edge of one highlight rect.
#[derive(Debug, Clone, PartialEq)]
pub enum OutlineShape {
    /// Solid or dashed segment across the rect's bottom edge.
    Segment {
        from: Point,
        to: Point,
        /// Dash and gap lengths; `None` draws solid.
        dash: Option<(f64, f64)>,
    },
    /// Alternating quadratic humps across the bottom edge.
    Humps {
        start: Point,
        segments: Vec<QuadSegment>,
    },
}

/// Everything a backend needs to paint one group.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGroup {
    pub id: SpanId,
    /// Fill sublayer: the highlight rectangles.
    pub fill: Vec<Rect>,
    /// Outline sublayer: one shape per rect.
    pub outline: Vec<OutlineShape>,
    pub style: MarkerStyle,
    pub fill_visible: bool,
    pub outline_visible: bool,
}

/// Rendering surface contract.
///
/// Implementations hold grouped shape containers keyed by span id, composite
/// them in insertion order, and support destroy-by-id. They never answer
/// queries; the stage keeps its own geometry for that.
pub trait Surface {
    /// Resize the drawing area in pixels.
    fn set_size(&mut self, size: Size);
    /// Add a group; z-order follows call order.
    fn add_group(&mut self, group: SurfaceGroup);
    /// Destroy a group's rendering; `false` if the id is unknown.
    fn remove_group(&mut self, id: &SpanId) -> bool;
    /// Destroy every group.
    fn clear(&mut self);
    /// Tear the surface down entirely.
    fn destroy(&mut self);
}

/// A rendered span: its id plus ordered rects in stage-local space.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: SpanId,
    pub rects: Vec<Rect>,
}

/// Group store plus spatial index over everything currently rendered.
pub struct Stage {
    surface: Box<dyn Surface>,
    groups: Vec<Group>,
}

impl Stage {
    /// Create a stage sized to the document's current content box.
    pub fn new<D: DocumentModel>(mut surface: Box<dyn Surface>, doc: &D) -> Self {
        surface.set_size(doc.content_size());
        Self {
            surface,
            groups: Vec::new(),
        }
    }

    /// Render a group: a fill sublayer and an outline sublayer, each
    /// independently visible. Rects must already be stage-local and in
    /// document order.
    pub fn add_group(
        &mut self,
        id: SpanId,
        rects: Vec<Rect>,
        style: &MarkerStyle,
        line_visible: bool,
        rect_visible: bool,
    ) {
        let outline = rects
            .iter()
            .map(|rect| outline_shape(rect, style.line_shape))
            .collect();
        self.surface.add_group(SurfaceGroup {
            id,
            fill: rects.clone(),
            outline,
            style: style.clone(),
            fill_visible: rect_visible,
            outline_visible: line_visible,
        });
        self.groups.push(Group { id, rects });
    }

    /// Remove a group and destroy its rendering; `false` if unknown.
    pub fn remove_group(&mut self, id: &SpanId) -> bool {
        let Some(index) = self.groups.iter().position(|group| group.id == *id) else {
            return false;
        };
        self.groups.remove(index);
        self.surface.remove_group(id);
        true
    }

    /// Destroy all groups and empty the store.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.surface.clear();
    }

    /// Tear down the surface; the stage is unusable afterwards.
    pub fn destroy(&mut self) {
        self.groups.clear();
        self.surface.destroy();
    }

    /// Recompute the surface's pixel size from the container's content box.
    /// Groups are untouched; re-rendering them is the coordinator's job.
    pub fn resize<D: DocumentModel>(&mut self, doc: &D) {
        let size = doc.content_size();
        log::trace!("stage resized to {}x{}", size.width, size.height);
        self.surface.set_size(size);
    }

    /// Ids of every group with a rect under the viewport point `(x, y)`,
    /// inclusive on all four edges, in insertion order.
    pub fn hit_test<D: DocumentModel>(&self, doc: &D, x: f64, y: f64) -> Vec<SpanId> {
        let origin = doc.container_origin();
        let (x, y) = (x - origin.x, y - origin.y);
        self.groups
            .iter()
            .filter(|group| group.rects.iter().any(|rect| rect.contains(x, y)))
            .map(|group| group.id)
            .collect()
    }

    /// Geometric fallback matcher: which groups visually cover a selection
    /// whose first and last boundary rects are `query_start` / `query_end`?
    ///
    /// Operates purely on bounding rectangles, not text addresses; this is
    /// the recognition path for re-selecting a sub-range of an existing,
    /// possibly multi-node highlight.
    pub fn overlaps_above(&self, query_start: &Rect, query_end: &Rect) -> Vec<SpanId> {
        self.groups
            .iter()
            .filter(|group| covers_query(group, query_start, query_end))
            .map(|group| group.id)
            .collect()
    }

    /// Stage-local rects of a rendered group.
    pub fn group_rects(&self, id: &SpanId) -> Option<&[Rect]> {
        self.groups
            .iter()
            .find(|group| group.id == *id)
            .map(|group| group.rects.as_slice())
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Containment test between one group's bounding rects and the query rects.
fn covers_query(group: &Group, query_start: &Rect, query_end: &Rect) -> bool {
    let (Some(first), Some(last)) = (group.rects.first(), group.rects.last()) else {
        return false;
    };

    // A single-line group cannot cover a query spanning multiple lines.
    if group.rects.len() == 1 && line_order(query_start, query_end) != Ordering::Equal {
        return false;
    }

    let first_order = line_order(first, query_start);
    let last_order = line_order(last, query_end);
    if first_order == Ordering::Greater {
        // Group starts on a line below the query start.
        return false;
    }
    if last_order == Ordering::Less {
        // Group ends on a line above the query end.
        return false;
    }
    if first_order == Ordering::Less && last_order == Ordering::Greater {
        // Group strictly brackets the query vertically.
        return true;
    }
    if first_order == Ordering::Equal {
        if first.x > query_start.x {
            return false;
        }
        return last_order == Ordering::Greater
            || (last_order == Ordering::Equal && last.right() >= query_end.x);
    }
    last_order == Ordering::Equal && last.right() >= query_end.x
}

/// Two rects share a visual line when either's vertical center falls inside
/// the other's extent. The midpoint test keeps the +1 baseline padding on
/// adjacent line boxes from reading as an overlap.
fn same_line(a: &Rect, b: &Rect) -> bool {
    let a_center = a.center_y();
    let b_center = b.center_y();
    (b.y <= a_center && a_center <= b.bottom()) || (a.y <= b_center && b_center <= a.bottom())
}

fn line_order(a: &Rect, b: &Rect) -> Ordering {
    if same_line(a, b) {
        Ordering::Equal
    } else if a.y < b.y {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// Build the outline shape for one rect per the line-shape policy.
fn outline_shape(rect: &Rect, shape: LineShape) -> OutlineShape {
    let baseline = rect.bottom();
    match shape {
        LineShape::Straight => OutlineShape::Segment {
            from: Point::new(rect.x, baseline),
            to: Point::new(rect.right(), baseline),
            dash: None,
        },
        LineShape::Dashed => OutlineShape::Segment {
            from: Point::new(rect.x, baseline),
            to: Point::new(rect.right(), baseline),
            dash: Some(DASH_PATTERN),
        },
        LineShape::Wave => {
            let count = ((rect.width / WAVE_SEGMENT_WIDTH).ceil() as usize).max(1);
            let step = rect.width / count as f64;
            let mut segments = Vec::with_capacity(count);
            let mut x = rect.x;
            for index in 0..count {
                let amplitude = if index % 2 == 0 {
                    WAVE_AMPLITUDE
                } else {
                    -WAVE_AMPLITUDE
                };
                segments.push(QuadSegment {
                    control: Point::new(x + step / 2.0, baseline + amplitude),
                    to: Point::new(x + step, baseline),
                });
                x += step;
            }
            OutlineShape::Humps {
                start: Point::new(rect.x, baseline),
                segments,
            }
        }
    }
}

//! Shape definitions for the design canvas.

mod circle;
mod group;
mod image;
mod line;
mod patch;
mod polygon;
mod rectangle;
mod style;
mod text;

pub use circle::Circle;
pub use group::Group;
pub use image::{Image, ImageFormat};
pub use line::Line;
pub use patch::ShapePatch;
pub use polygon::{RegularPolygon, Star};
pub use rectangle::Rectangle;
pub use style::{BlendMode, LineCap, LineJoin, SerializableColor, ShapeStyle};
pub use text::{Text, TextAlign, TextDecoration};

use crate::animation::AnimationRecord;
use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for shapes, stable for the shape's lifetime.
pub type ShapeId = String;

/// A shape shared between the live document, history snapshots and keyframes.
///
/// Mutation goes through [`Arc::make_mut`], so unchanged shapes are never copied.
pub type SharedShape = Arc<Shape>;

/// Generate a fresh id of the form `{type}-{uuid}`.
pub fn generate_id(shape_type: ShapeType) -> ShapeId {
    format!("{}-{}", shape_type.as_str(), Uuid::new_v4().simple())
}

/// The closed set of shape kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Rect,
    Circle,
    Triangle,
    Polygon,
    Star,
    Text,
    Image,
    Line,
    Group,
}

impl ShapeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeType::Rect => "rect",
            ShapeType::Circle => "circle",
            ShapeType::Triangle => "triangle",
            ShapeType::Polygon => "polygon",
            ShapeType::Star => "star",
            ShapeType::Text => "text",
            ShapeType::Image => "image",
            ShapeType::Line => "line",
            ShapeType::Group => "group",
        }
    }
}

/// Geometry of a single shape kind, in the shape's local space.
///
/// Local space has its origin at the shape's position, before rotation and
/// scale are applied.
pub trait ShapeGeometry {
    /// Bounding box in local space.
    fn local_bounds(&self) -> Rect;

    /// Outline for hit testing and export previews.
    fn to_path(&self) -> BezPath;

    /// Explicit width/height, for kinds that carry them.
    fn declared_size(&self) -> Option<Size> {
        None
    }
}

/// Kind-specific data, tagged by `type` in the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeKind {
    Rect(Rectangle),
    Circle(Circle),
    Triangle(RegularPolygon),
    Polygon(RegularPolygon),
    Star(Star),
    Text(Text),
    Image(Image),
    Line(Line),
    Group(Group),
}

impl ShapeKind {
    /// Default geometry for a freshly created shape of the given type.
    pub fn default_for(shape_type: ShapeType) -> Self {
        match shape_type {
            ShapeType::Rect => ShapeKind::Rect(Rectangle::default()),
            ShapeType::Circle => ShapeKind::Circle(Circle::default()),
            ShapeType::Triangle => {
                ShapeKind::Triangle(RegularPolygon::new(3, RegularPolygon::DEFAULT_RADIUS))
            }
            ShapeType::Polygon => {
                ShapeKind::Polygon(RegularPolygon::new(6, RegularPolygon::DEFAULT_RADIUS))
            }
            ShapeType::Star => ShapeKind::Star(Star::default()),
            ShapeType::Text => ShapeKind::Text(Text::default()),
            ShapeType::Image => ShapeKind::Image(Image::default()),
            ShapeType::Line => ShapeKind::Line(Line::default()),
            ShapeType::Group => ShapeKind::Group(Group::default()),
        }
    }

    pub fn shape_type(&self) -> ShapeType {
        match self {
            ShapeKind::Rect(_) => ShapeType::Rect,
            ShapeKind::Circle(_) => ShapeType::Circle,
            ShapeKind::Triangle(_) => ShapeType::Triangle,
            ShapeKind::Polygon(_) => ShapeType::Polygon,
            ShapeKind::Star(_) => ShapeType::Star,
            ShapeKind::Text(_) => ShapeType::Text,
            ShapeKind::Image(_) => ShapeType::Image,
            ShapeKind::Line(_) => ShapeType::Line,
            ShapeKind::Group(_) => ShapeType::Group,
        }
    }

    fn geometry(&self) -> &dyn ShapeGeometry {
        match self {
            ShapeKind::Rect(s) => s as &dyn ShapeGeometry,
            ShapeKind::Circle(s) => s as &dyn ShapeGeometry,
            ShapeKind::Triangle(s) | ShapeKind::Polygon(s) => s as &dyn ShapeGeometry,
            ShapeKind::Star(s) => s as &dyn ShapeGeometry,
            ShapeKind::Text(s) => s as &dyn ShapeGeometry,
            ShapeKind::Image(s) => s as &dyn ShapeGeometry,
            ShapeKind::Line(s) => s as &dyn ShapeGeometry,
            ShapeKind::Group(s) => s as &dyn ShapeGeometry,
        }
    }
}

/// Percentage-based transform origin, relative to the declared size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformOffset {
    pub x: f64,
    pub y: f64,
}

/// Internal, non-visual attributes used by the keyframe editor and timeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimationAttrs {
    /// Per-shape tween overrides for the keyframe this shape belongs to.
    #[serde(
        rename = "_animationKeyFrameRecords",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub record: Option<AnimationRecord>,
    /// Keyframe this shape instance is being edited in.
    #[serde(rename = "_animationItemIndex", default, skip_serializing_if = "Option::is_none")]
    pub item_index: Option<usize>,
    #[serde(rename = "_offset4Transform", default, skip_serializing_if = "Option::is_none")]
    pub transform_offset: Option<TransformOffset>,
}

/// A drawable element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub(crate) id: ShapeId,
    /// Position of the shape origin (`x`, `y`).
    #[serde(flatten)]
    pub position: Point,
    /// Rotation in degrees around the shape origin.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
    #[serde(flatten)]
    pub style: ShapeStyle,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Locked shapes are excluded from hit testing, dragging and new selections.
    #[serde(default)]
    pub is_locked: bool,
    #[serde(flatten)]
    pub kind: ShapeKind,
    #[serde(flatten)]
    pub animation: AnimationAttrs,
}

fn unit_scale() -> f64 {
    1.0
}

fn default_visible() -> bool {
    true
}

impl Shape {
    /// Create a shape of the given type with its default properties and a fresh id.
    pub fn new(shape_type: ShapeType) -> Self {
        let style = match shape_type {
            ShapeType::Text => ShapeStyle {
                fill: Some(SerializableColor::black()),
                ..ShapeStyle::default()
            },
            ShapeType::Line => ShapeStyle {
                stroke: Some(SerializableColor::black()),
                stroke_width: 4.0,
                ..ShapeStyle::default()
            },
            ShapeType::Image | ShapeType::Group => ShapeStyle::default(),
            _ => ShapeStyle::outlined(),
        };
        Self::with_kind(generate_id(shape_type), ShapeKind::default_for(shape_type), style)
    }

    /// Create a shape with explicit id, kind and style at the origin.
    pub fn with_kind(id: impl Into<ShapeId>, kind: ShapeKind, style: ShapeStyle) -> Self {
        Self {
            id: id.into(),
            position: Point::ORIGIN,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            style,
            visible: true,
            is_locked: false,
            kind,
            animation: AnimationAttrs::default(),
        }
    }

    /// Builder-style position setter.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Point::new(x, y);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn shape_type(&self) -> ShapeType {
        self.kind.shape_type()
    }

    /// Local-to-document transform: position, rotation, scale and transform origin.
    pub fn transform(&self) -> Affine {
        let origin = self.transform_origin();
        Affine::translate(self.position.to_vec2())
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
            * Affine::translate(-origin)
    }

    fn transform_origin(&self) -> Vec2 {
        match (self.animation.transform_offset, self.declared_size()) {
            (Some(offset), Some(size)) => Vec2::new(size.width * offset.x, size.height * offset.y),
            _ => Vec2::ZERO,
        }
    }

    /// Bounding box in document coordinates (rotation and scale included).
    pub fn bounds(&self) -> Rect {
        self.transform().transform_rect_bbox(self.kind.geometry().local_bounds())
    }

    /// Outline in local space.
    pub fn to_path(&self) -> BezPath {
        self.kind.geometry().to_path()
    }

    /// Explicit width/height, if this kind carries them.
    pub fn declared_size(&self) -> Option<Size> {
        self.kind.geometry().declared_size()
    }

    /// Check if a point (in document coordinates) hits this shape.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let local = self.transform().inverse() * point;
        match &self.kind {
            ShapeKind::Line(line) => {
                line.hit_test(local, tolerance + self.style.stroke_width / 2.0)
            }
            ShapeKind::Circle(circle) => local.to_vec2().hypot() <= circle.radius + tolerance,
            ShapeKind::Group(group) => group.children.iter().any(|c| c.hit_test(local, tolerance)),
            kind => kind.geometry().local_bounds().inflate(tolerance, tolerance).contains(local),
        }
    }

    /// Move the shape by a delta in document coordinates.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    pub fn as_group(&self) -> Option<&Group> {
        match &self.kind {
            ShapeKind::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Image> {
        match &self.kind {
            ShapeKind::Image(img) => Some(img),
            _ => None,
        }
    }

    /// Give this shape (and any group children) fresh ids.
    /// Used when duplicating or pasting so copies never collide with originals.
    pub fn regenerate_ids(&mut self) {
        self.id = generate_id(self.shape_type());
        if let ShapeKind::Group(group) = &mut self.kind {
            for child in &mut group.children {
                child.regenerate_ids();
            }
        }
    }

    /// Collect the font families used by this shape and its children.
    pub fn collect_fonts(&self, fonts: &mut BTreeSet<String>) {
        match &self.kind {
            ShapeKind::Text(text) => {
                fonts.insert(text.font_family.clone());
            }
            ShapeKind::Group(group) => {
                for child in &group.children {
                    child.collect_fonts(fonts);
                }
            }
            _ => {}
        }
    }
}

/// Set of font families used across a shape list.
pub fn fonts_in_use<'a>(shapes: impl IntoIterator<Item = &'a SharedShape>) -> BTreeSet<String> {
    let mut fonts = BTreeSet::new();
    for shape in shapes {
        shape.collect_fonts(&mut fonts);
    }
    fonts
}

/// Find a top-level shape by id.
pub fn find_shape<'a>(shapes: &'a [SharedShape], id: &str) -> Option<&'a SharedShape> {
    shapes.iter().find(|s| s.id == id)
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

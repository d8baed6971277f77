//! Partial shape updates.
//!
//! A [`ShapePatch`] carries any subset of a shape's properties. Property panels
//! send one to `update_shapes`, keyframe records store the animated subset in
//! one, and the timeline interpolates between two of them.

use super::{
    BlendMode, LineCap, LineJoin, SerializableColor, Shape, ShapeKind, TextAlign, TextDecoration,
};
use serde::{Deserialize, Serialize};

/// A partial set of shape properties. `None` means "leave unchanged".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sides: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<SerializableColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<SerializableColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_color: Option<SerializableColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_blur: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_offset_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_offset_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_cap: Option<LineCap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_join: Option<LineJoin>,
    #[serde(
        default,
        rename = "globalCompositeOperation",
        skip_serializing_if = "Option::is_none"
    )]
    pub blend_mode: Option<BlendMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<TextDecoration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
}

fn lerp_f64(from: Option<f64>, to: Option<f64>, t: f64) -> Option<f64> {
    to.map(|b| match from {
        Some(a) => a + (b - a) * t,
        None => b,
    })
}

fn lerp_color(
    from: Option<SerializableColor>,
    to: Option<SerializableColor>,
    t: f64,
) -> Option<SerializableColor> {
    to.map(|b| match from {
        Some(a) => a.lerp(b, t),
        None => b,
    })
}

fn lerp_list(from: &Option<Vec<f64>>, to: &Option<Vec<f64>>, t: f64) -> Option<Vec<f64>> {
    let to = to.as_ref()?;
    match from {
        Some(from) if from.len() == to.len() => {
            Some(from.iter().zip(to).map(|(a, b)| a + (b - a) * t).collect())
        }
        _ => Some(to.clone()),
    }
}

impl ShapePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Position-only patch.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Overlay `other` on top of `self`; values set in `other` win.
    pub fn merge(&mut self, other: &ShapePatch) {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if other.$field.is_some() { self.$field = other.$field.clone(); })*
            };
        }
        take!(
            x, y, rotation, scale_x, scale_y, width, height, radius, sides, points, corner_radius,
            fill, stroke, stroke_width, opacity, shadow_color, shadow_blur, shadow_offset_x,
            shadow_offset_y, shadow_opacity, dash, line_cap, line_join, blend_mode, text,
            font_family, font_size, line_height, align, text_decoration, src, visible, is_locked,
        );
    }

    /// Interpolate from `from` towards every property set in `to`.
    ///
    /// Numeric values, colors and equal-length point lists are blended;
    /// everything else switches to the target value as soon as the tween runs.
    pub fn lerp(from: &ShapePatch, to: &ShapePatch, t: f64) -> ShapePatch {
        ShapePatch {
            x: lerp_f64(from.x, to.x, t),
            y: lerp_f64(from.y, to.y, t),
            rotation: lerp_f64(from.rotation, to.rotation, t),
            scale_x: lerp_f64(from.scale_x, to.scale_x, t),
            scale_y: lerp_f64(from.scale_y, to.scale_y, t),
            width: lerp_f64(from.width, to.width, t),
            height: lerp_f64(from.height, to.height, t),
            radius: lerp_f64(from.radius, to.radius, t),
            sides: to.sides,
            points: lerp_list(&from.points, &to.points, t),
            corner_radius: lerp_f64(from.corner_radius, to.corner_radius, t),
            fill: lerp_color(from.fill, to.fill, t),
            stroke: lerp_color(from.stroke, to.stroke, t),
            stroke_width: lerp_f64(from.stroke_width, to.stroke_width, t),
            opacity: lerp_f64(from.opacity, to.opacity, t),
            shadow_color: lerp_color(from.shadow_color, to.shadow_color, t),
            shadow_blur: lerp_f64(from.shadow_blur, to.shadow_blur, t),
            shadow_offset_x: lerp_f64(from.shadow_offset_x, to.shadow_offset_x, t),
            shadow_offset_y: lerp_f64(from.shadow_offset_y, to.shadow_offset_y, t),
            shadow_opacity: lerp_f64(from.shadow_opacity, to.shadow_opacity, t),
            dash: lerp_list(&from.dash, &to.dash, t),
            line_cap: to.line_cap,
            line_join: to.line_join,
            blend_mode: to.blend_mode,
            text: to.text.clone(),
            font_family: to.font_family.clone(),
            font_size: lerp_f64(from.font_size, to.font_size, t),
            line_height: lerp_f64(from.line_height, to.line_height, t),
            align: to.align,
            text_decoration: to.text_decoration,
            src: to.src.clone(),
            visible: to.visible,
            is_locked: to.is_locked,
        }
    }
}

impl Shape {
    /// Apply every property set in `patch` that makes sense for this shape's kind.
    pub fn apply_patch(&mut self, patch: &ShapePatch) {
        if let Some(x) = patch.x {
            self.position.x = x;
        }
        if let Some(y) = patch.y {
            self.position.y = y;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(scale_x) = patch.scale_x {
            self.scale_x = scale_x;
        }
        if let Some(scale_y) = patch.scale_y {
            self.scale_y = scale_y;
        }
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
        if let Some(locked) = patch.is_locked {
            self.is_locked = locked;
        }

        let style = &mut self.style;
        if patch.fill.is_some() {
            style.fill = patch.fill;
        }
        if patch.stroke.is_some() {
            style.stroke = patch.stroke;
        }
        if let Some(v) = patch.stroke_width {
            style.stroke_width = v;
        }
        if let Some(v) = patch.opacity {
            style.opacity = v;
        }
        if patch.shadow_color.is_some() {
            style.shadow_color = patch.shadow_color;
        }
        if let Some(v) = patch.shadow_blur {
            style.shadow_blur = v;
        }
        if let Some(v) = patch.shadow_offset_x {
            style.shadow_offset_x = v;
        }
        if let Some(v) = patch.shadow_offset_y {
            style.shadow_offset_y = v;
        }
        if let Some(v) = patch.shadow_opacity {
            style.shadow_opacity = v;
        }
        if let Some(dash) = &patch.dash {
            style.dash = dash.clone();
        }
        if let Some(v) = patch.line_cap {
            style.line_cap = v;
        }
        if let Some(v) = patch.line_join {
            style.line_join = v;
        }
        if let Some(v) = patch.blend_mode {
            style.blend_mode = v;
        }

        match &mut self.kind {
            ShapeKind::Rect(rect) => {
                if let Some(w) = patch.width {
                    rect.width = w;
                }
                if let Some(h) = patch.height {
                    rect.height = h;
                }
                if let Some(r) = patch.corner_radius {
                    rect.corner_radius = r;
                }
            }
            ShapeKind::Circle(circle) => {
                if let Some(r) = patch.radius {
                    circle.radius = r;
                }
            }
            ShapeKind::Triangle(polygon) | ShapeKind::Polygon(polygon) => {
                if let Some(r) = patch.radius {
                    polygon.radius = r;
                }
                if let Some(sides) = patch.sides {
                    polygon.sides = sides.max(3);
                }
            }
            ShapeKind::Star(star) => {
                if let Some(points) = &patch.points {
                    star.points = points.clone();
                }
            }
            ShapeKind::Line(line) => {
                if let Some(points) = &patch.points {
                    line.points = points.clone();
                }
            }
            ShapeKind::Text(text) => {
                if let Some(w) = patch.width {
                    text.width = Some(w);
                }
                if let Some(s) = &patch.text {
                    text.text = s.clone();
                }
                if let Some(f) = &patch.font_family {
                    text.font_family = f.clone();
                }
                if let Some(v) = patch.font_size {
                    text.font_size = v;
                }
                if let Some(v) = patch.line_height {
                    text.line_height = v;
                }
                if let Some(v) = patch.align {
                    text.align = v;
                }
                if let Some(v) = patch.text_decoration {
                    text.text_decoration = v;
                }
            }
            ShapeKind::Image(image) => {
                if let Some(w) = patch.width {
                    image.width = w;
                }
                if let Some(h) = patch.height {
                    image.height = h;
                }
                if let Some(src) = &patch.src {
                    image.src = src.clone();
                }
            }
            ShapeKind::Group(group) => {
                if let Some(w) = patch.width {
                    group.width = w;
                }
                if let Some(h) = patch.height {
                    group.height = h;
                }
            }
        }
    }

    /// Snapshot of every property of this shape as a patch.
    pub fn to_patch(&self) -> ShapePatch {
        let style = &self.style;
        let mut patch = ShapePatch {
            x: Some(self.position.x),
            y: Some(self.position.y),
            rotation: Some(self.rotation),
            scale_x: Some(self.scale_x),
            scale_y: Some(self.scale_y),
            fill: style.fill,
            stroke: style.stroke,
            stroke_width: Some(style.stroke_width),
            opacity: Some(style.opacity),
            shadow_color: style.shadow_color,
            shadow_blur: Some(style.shadow_blur),
            shadow_offset_x: Some(style.shadow_offset_x),
            shadow_offset_y: Some(style.shadow_offset_y),
            shadow_opacity: Some(style.shadow_opacity),
            dash: Some(style.dash.clone()),
            line_cap: Some(style.line_cap),
            line_join: Some(style.line_join),
            blend_mode: Some(style.blend_mode),
            visible: Some(self.visible),
            is_locked: Some(self.is_locked),
            ..ShapePatch::default()
        };
        match &self.kind {
            ShapeKind::Rect(rect) => {
                patch.width = Some(rect.width);
                patch.height = Some(rect.height);
                patch.corner_radius = Some(rect.corner_radius);
            }
            ShapeKind::Circle(circle) => patch.radius = Some(circle.radius),
            ShapeKind::Triangle(polygon) | ShapeKind::Polygon(polygon) => {
                patch.radius = Some(polygon.radius);
                patch.sides = Some(polygon.sides);
            }
            ShapeKind::Star(star) => patch.points = Some(star.points.clone()),
            ShapeKind::Line(line) => patch.points = Some(line.points.clone()),
            ShapeKind::Text(text) => {
                patch.width = text.width;
                patch.text = Some(text.text.clone());
                patch.font_family = Some(text.font_family.clone());
                patch.font_size = Some(text.font_size);
                patch.line_height = Some(text.line_height);
                patch.align = Some(text.align);
                patch.text_decoration = Some(text.text_decoration);
            }
            ShapeKind::Image(image) => {
                patch.width = Some(image.width);
                patch.height = Some(image.height);
                patch.src = Some(image.src.clone());
            }
            ShapeKind::Group(group) => {
                patch.width = Some(group.width);
                patch.height = Some(group.height);
            }
        }
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeType;

    #[test]
    fn test_apply_patch_ignores_foreign_fields() {
        let mut circle = Shape::new(ShapeType::Circle);
        circle.apply_patch(&ShapePatch {
            radius: Some(10.0),
            width: Some(500.0),
            ..ShapePatch::default()
        });
        match &circle.kind {
            ShapeKind::Circle(c) => assert!((c.radius - 10.0).abs() < f64::EPSILON),
            other => panic!("unexpected kind {other:?}"),
        }
        assert!(circle.declared_size().is_none());
    }

    #[test]
    fn test_to_patch_then_apply_is_identity() {
        let mut shape = Shape::new(ShapeType::Text).at(12.0, 34.0);
        shape.rotation = 15.0;
        let patch = shape.to_patch();
        let mut other = Shape::new(ShapeType::Text);
        other.id = shape.id.clone();
        other.apply_patch(&patch);
        assert_eq!(other, shape);
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = ShapePatch::position(1.0, 2.0);
        base.merge(&ShapePatch {
            x: Some(10.0),
            opacity: Some(0.5),
            ..ShapePatch::default()
        });
        assert_eq!(base.x, Some(10.0));
        assert_eq!(base.y, Some(2.0));
        assert_eq!(base.opacity, Some(0.5));
    }

    #[test]
    fn test_lerp_blends_numbers_and_snaps_discrete() {
        let from = ShapePatch {
            x: Some(0.0),
            text: Some("a".into()),
            ..ShapePatch::default()
        };
        let to = ShapePatch {
            x: Some(100.0),
            text: Some("b".into()),
            ..ShapePatch::default()
        };
        let mid = ShapePatch::lerp(&from, &to, 0.25);
        assert_eq!(mid.x, Some(25.0));
        assert_eq!(mid.text.as_deref(), Some("b"));
        assert_eq!(mid.y, None);
    }

    #[test]
    fn test_lerp_points_of_different_length_snap() {
        let from = ShapePatch {
            points: Some(vec![0.0, 0.0]),
            ..ShapePatch::default()
        };
        let to = ShapePatch {
            points: Some(vec![10.0, 10.0, 20.0, 20.0]),
            ..ShapePatch::default()
        };
        assert_eq!(ShapePatch::lerp(&from, &to, 0.5).points, to.points);
    }

    #[test]
    fn test_patch_serializes_sparse() {
        let json = serde_json::to_string(&ShapePatch::position(1.0, 2.0)).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":2.0}"#);
    }
}

//! Property panel binding: element ↔ form values.
//!
//! Reading goes through the computed style of the element's root, so the
//! panel shows what is rendered (template defaults included), not just the
//! overrides. Writing turns one field's raw input into a single
//! `EditorMutation`; input that does not parse is ignored.

use crate::document::EditorMutation;
use kurbo::Point;
use pb_core::css::{parse_color, parse_length};
use pb_core::model::{CanvasElement, Height};
use pb_render::layout::rendered_height;
use pb_render::style::compute_root;
use serde::{Deserialize, Serialize};

/// Named panel inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelField {
    /// Prefab type. Read-only.
    Kind,
    Text,
    Background,
    TextColor,
    BorderColor,
    BorderWidth,
    Width,
    Height,
    X,
    Y,
    ZIndex,
    FontSize,
    Padding,
}

impl PanelField {
    pub const ALL: [PanelField; 13] = [
        PanelField::Kind,
        PanelField::Text,
        PanelField::Background,
        PanelField::TextColor,
        PanelField::BorderColor,
        PanelField::BorderWidth,
        PanelField::Width,
        PanelField::Height,
        PanelField::X,
        PanelField::Y,
        PanelField::ZIndex,
        PanelField::FontSize,
        PanelField::Padding,
    ];

    /// The input's name, as used by hosts and in `PanelValues` JSON.
    pub fn name(self) -> &'static str {
        match self {
            PanelField::Kind => "kind",
            PanelField::Text => "text",
            PanelField::Background => "background",
            PanelField::TextColor => "textColor",
            PanelField::BorderColor => "borderColor",
            PanelField::BorderWidth => "borderWidth",
            PanelField::Width => "width",
            PanelField::Height => "height",
            PanelField::X => "x",
            PanelField::Y => "y",
            PanelField::ZIndex => "zIndex",
            PanelField::FontSize => "fontSize",
            PanelField::Padding => "padding",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn is_readonly(self) -> bool {
        matches!(self, PanelField::Kind)
    }
}

/// Everything the panel displays for the selected element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelValues {
    pub id: String,
    pub kind: String,
    pub text: String,
    /// `#rrggbb`.
    pub background: String,
    pub text_color: String,
    pub border_color: String,
    pub border_width: i64,
    pub width: i64,
    pub height: i64,
    pub x: i64,
    pub y: i64,
    pub z_index: i32,
    pub font_size: i64,
    pub padding: i64,
}

/// Leading length of a computed value (`10px 16px` → 10), rounded.
fn leading_px(value: Option<String>) -> i64 {
    value
        .as_deref()
        .and_then(|v| v.split_whitespace().next())
        .and_then(|v| parse_length(v).ok())
        .map_or(0, |n| n.round() as i64)
}

/// Element → form.
pub fn read_element(element: &CanvasElement) -> PanelValues {
    let style = compute_root(element);
    let hex = |prop: &str| {
        style
            .get(prop)
            .map_or_else(|| "#000000".to_string(), |v| pb_core::css::to_hex(&v))
    };
    let top = style.border(0);
    let border_width = top
        .filter(|b| !matches!(b.style.as_str(), "none" | "hidden"))
        .map_or(0, |b| b.width.round() as i64);
    let content = &element.content;

    PanelValues {
        id: element.id.as_str().to_string(),
        kind: element.kind.as_str().to_string(),
        text: content.text_content(content.text_target()),
        background: hex("background-color"),
        text_color: hex("color"),
        border_color: top.map_or_else(|| "#000000".to_string(), |b| b.color.to_hex()),
        border_width,
        width: element.width.round() as i64,
        height: rendered_height(element).round() as i64,
        x: element.position.x.round() as i64,
        y: element.position.y.round() as i64,
        z_index: element.z_index,
        font_size: leading_px(style.get("font-size")),
        padding: leading_px(style.get("padding")),
    }
}

/// Form → element: the mutation one field's input asks for, or `None` when
/// the input is read-only or does not parse.
pub fn write_field(element: &CanvasElement, field: PanelField, raw: &str) -> Option<EditorMutation> {
    let id = element.id;
    let value = raw.trim();
    let ignored = |reason: &str| {
        log::debug!("ignoring {} input {raw:?} for {id}: {reason}", field.name());
        None
    };

    let length = |min: f64| parse_length(value).ok().map(|n| n.max(min));

    let mut overrides = element.overrides.clone();
    match field {
        PanelField::Kind => return ignored("read-only"),
        PanelField::Text => {
            return Some(EditorMutation::SetText {
                id,
                text: raw.to_string(),
            });
        }
        PanelField::Background | PanelField::TextColor | PanelField::BorderColor => {
            let Ok(color) = parse_color(value) else {
                return ignored("not a color");
            };
            let slot = match field {
                PanelField::Background => &mut overrides.background,
                PanelField::TextColor => &mut overrides.text_color,
                _ => &mut overrides.border_color,
            };
            *slot = Some(color);
        }
        PanelField::BorderWidth | PanelField::FontSize | PanelField::Padding => {
            let Some(n) = length(0.0) else {
                return ignored("not a length");
            };
            let slot = match field {
                PanelField::BorderWidth => &mut overrides.border_width,
                PanelField::FontSize => &mut overrides.font_size,
                _ => &mut overrides.padding,
            };
            *slot = Some(n);
        }
        PanelField::Width => {
            let Some(width) = length(crate::gesture::MIN_WIDTH) else {
                return ignored("not a length");
            };
            return Some(EditorMutation::ResizeTo {
                id,
                width,
                height: element.height,
            });
        }
        PanelField::Height => {
            let height = if value.eq_ignore_ascii_case("auto") {
                Height::Auto
            } else {
                match length(crate::gesture::MIN_HEIGHT) {
                    Some(h) => Height::Px(h),
                    None => return ignored("not a length"),
                }
            };
            return Some(EditorMutation::ResizeTo {
                id,
                width: element.width,
                height,
            });
        }
        PanelField::X | PanelField::Y => {
            let Some(n) = length(0.0) else {
                return ignored("not a number");
            };
            let position = match field {
                PanelField::X => Point::new(n, element.position.y),
                _ => Point::new(element.position.x, n),
            };
            return Some(EditorMutation::MoveTo { id, position });
        }
        PanelField::ZIndex => {
            let Ok(n) = parse_length(value) else {
                return ignored("not a number");
            };
            return Some(EditorMutation::SetZIndex {
                id,
                z_index: (n.round() as i32).max(0),
            });
        }
    }
    Some(EditorMutation::SetOverrides { id, overrides })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::model::Color;
    use pb_core::prefab::ElementFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn field_names_roundtrip() {
        for field in PanelField::ALL {
            assert_eq!(PanelField::from_name(field.name()), Some(field));
        }
        assert_eq!(PanelField::from_name("nope"), None);
    }

    #[test]
    fn reads_template_defaults() {
        let mut factory = ElementFactory::new();
        let card = factory.create("card");
        let values = read_element(&card);
        assert_eq!(values.kind, "card");
        assert_eq!(values.text, "Card title");
        assert_eq!(values.background, "#ffffff");
        assert_eq!(values.text_color, "#1f2937");
        assert_eq!(values.border_color, "#e5e7eb");
        assert_eq!(values.border_width, 1);
        assert_eq!(values.width, 320);
        assert_eq!(values.height, 96);
        assert_eq!((values.x, values.y), (20, 20));
        assert_eq!(values.font_size, 16);
        assert_eq!(values.padding, 16);
    }

    #[test]
    fn transparent_background_reads_as_black() {
        let mut factory = ElementFactory::new();
        let mut el = factory.create("button");
        el.overrides.background = Some(Color::TRANSPARENT);
        assert_eq!(read_element(&el).background, "#000000");
    }

    #[test]
    fn color_write_sets_override() {
        let mut factory = ElementFactory::new();
        let el = factory.create("hero");
        let m = write_field(&el, PanelField::Background, "#ff0000").unwrap();
        match m {
            EditorMutation::SetOverrides { overrides, .. } => {
                assert_eq!(overrides.background, Some(Color::rgb(255, 0, 0)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn geometry_writes_are_floored() {
        let mut factory = ElementFactory::new();
        let el = factory.create("hero");
        match write_field(&el, PanelField::Width, "10").unwrap() {
            EditorMutation::ResizeTo { width, .. } => assert_eq!(width, 40.0),
            other => panic!("unexpected {other:?}"),
        }
        match write_field(&el, PanelField::Height, "auto").unwrap() {
            EditorMutation::ResizeTo { height, .. } => assert_eq!(height, Height::Auto),
            other => panic!("unexpected {other:?}"),
        }
        match write_field(&el, PanelField::X, "-12").unwrap() {
            EditorMutation::MoveTo { position, .. } => assert_eq!(position, Point::new(0.0, 20.0)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn z_index_writes_stay_on_the_floor() {
        let mut factory = ElementFactory::new();
        let el = factory.create("card");
        match write_field(&el, PanelField::ZIndex, "-5").unwrap() {
            EditorMutation::SetZIndex { z_index, .. } => assert_eq!(z_index, 0),
            other => panic!("unexpected {other:?}"),
        }
        match write_field(&el, PanelField::ZIndex, "2.6").unwrap() {
            EditorMutation::SetZIndex { z_index, .. } => assert_eq!(z_index, 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn garbage_and_readonly_are_ignored() {
        let mut factory = ElementFactory::new();
        let el = factory.create("nav");
        assert!(write_field(&el, PanelField::FontSize, "big").is_none());
        assert!(write_field(&el, PanelField::TextColor, "reddish").is_none());
        assert!(write_field(&el, PanelField::Kind, "hero").is_none());
    }
}

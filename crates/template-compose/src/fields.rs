//! Field definitions and per-field customization records
//!
//! Every category has a compiled-in list of text fields with a default
//! position, size and color. User edits are stored as partial
//! [`FieldCustomization`] records and merged over those defaults on read.

use crate::constants::DEFAULT_FONT_FAMILY;
use crate::types::{Category, ComposeError, Result, Rgb};

// =============================================================================
// Definitions
// =============================================================================

/// Compiled-in defaults for one text field. Coordinates are source pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDefinition {
    pub name: &'static str,
    pub default_x: i32,
    pub default_y: i32,
    pub default_font_size: f32,
    pub default_color: Rgb,
}

const fn field(name: &'static str, x: i32, y: i32, size: f32, color: Rgb) -> FieldDefinition {
    FieldDefinition {
        name,
        default_x: x,
        default_y: y,
        default_font_size: size,
        default_color: color,
    }
}

const SMARTPHONE_FIELDS: &[FieldDefinition] = &[
    field("Model", 110, 318, 105.0, Rgb::BLACK),
    field("Storage", 110, 440, 88.0, Rgb::BLACK),
    field("Display", 110, 575, 75.0, Rgb::BLACK),
    field("Grado", 110, 670, 75.0, Rgb::BLACK),
    field("Price", 905, 60, 200.0, Rgb::BLACK),
];

const SQUARE_FIELDS: &[FieldDefinition] = &[
    field("Model", 380, 460, 48.0, Rgb::WHITE),
    field("RAM", 120, 586, 32.0, Rgb::BLACK),
    field("CPU", 120, 630, 32.0, Rgb::BLACK),
    field("SSD", 120, 674, 32.0, Rgb::BLACK),
    field("Graphics", 120, 718, 32.0, Rgb::BLACK),
    field("Codice", 760, 690, 24.0, Rgb::BLACK),
    field("Price", 740, 40, 120.0, Rgb::WHITE),
];

const RECTANGULAR_FIELDS: &[FieldDefinition] = &[
    field("Model", 60, 40, 42.0, Rgb::WHITE),
    field("RAM", 60, 110, 42.0, Rgb::WHITE),
    field("CPU", 60, 180, 42.0, Rgb::WHITE),
    field("SSD", 60, 250, 42.0, Rgb::WHITE),
    field("Graphics", 60, 320, 42.0, Rgb::WHITE),
    field("Codice", 60, 420, 27.0, Rgb::WHITE),
    field("Price", 1000, 60, 183.0, Rgb::BLACK),
];

/// All field definitions for a category, in editor order
pub fn definitions(category: Category) -> &'static [FieldDefinition] {
    match category {
        Category::Smartphone => SMARTPHONE_FIELDS,
        Category::Square => SQUARE_FIELDS,
        Category::Rectangular => RECTANGULAR_FIELDS,
    }
}

/// Look up one field definition, failing with `UnknownField`
pub fn definition(category: Category, name: &str) -> Result<&'static FieldDefinition> {
    definitions(category)
        .iter()
        .find(|def| def.name == name)
        .ok_or_else(|| ComposeError::UnknownField {
            category,
            field: name.to_string(),
        })
}

// =============================================================================
// Customization
// =============================================================================

/// Partial overrides for one field of one instance
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct FieldCustomization {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub text: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub x: Option<i32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub y: Option<i32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub font_size: Option<f32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub font_family: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub color: Option<Rgb>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub bold: Option<bool>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub italic: Option<bool>,
}

impl FieldCustomization {
    /// True when no property is overridden
    pub fn is_empty(&self) -> bool {
        *self == FieldCustomization::default()
    }

    /// Shallow merge: every property set in `update` replaces ours,
    /// everything else is left alone.
    pub fn merge(&mut self, update: &FieldCustomization) {
        if let Some(text) = &update.text {
            self.text = Some(text.clone());
        }
        if update.x.is_some() {
            self.x = update.x;
        }
        if update.y.is_some() {
            self.y = update.y;
        }
        if update.font_size.is_some() {
            self.font_size = update.font_size;
        }
        if let Some(family) = &update.font_family {
            self.font_family = Some(family.clone());
        }
        if update.color.is_some() {
            self.color = update.color;
        }
        if update.bold.is_some() {
            self.bold = update.bold;
        }
        if update.italic.is_some() {
            self.italic = update.italic;
        }
    }

    /// Merge over a definition's defaults
    pub fn resolve(&self, def: &FieldDefinition) -> EffectiveField {
        EffectiveField {
            name: def.name.to_string(),
            text: self.text.clone().unwrap_or_default(),
            x: self.x.unwrap_or(def.default_x),
            y: self.y.unwrap_or(def.default_y),
            font_size: self.font_size.unwrap_or(def.default_font_size),
            font_family: self
                .font_family
                .clone()
                .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string()),
            color: self.color.unwrap_or(def.default_color),
            bold: self.bold.unwrap_or(false),
            italic: self.italic.unwrap_or(false),
        }
    }
}

/// One style property change, as sent by the font/color controls
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StyleChange {
    FontSize(f32),
    FontFamily(String),
    Color(Rgb),
    Bold(bool),
    Italic(bool),
}

impl From<StyleChange> for FieldCustomization {
    fn from(change: StyleChange) -> Self {
        let mut update = FieldCustomization::default();
        match change {
            StyleChange::FontSize(size) => update.font_size = Some(size),
            StyleChange::FontFamily(family) => update.font_family = Some(family),
            StyleChange::Color(color) => update.color = Some(color),
            StyleChange::Bold(bold) => update.bold = Some(bold),
            StyleChange::Italic(italic) => update.italic = Some(italic),
        }
        update
    }
}

/// Fully resolved rendering parameters for one field
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectiveField {
    pub name: String,
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub font_size: f32,
    pub font_family: String,
    pub color: Rgb,
    pub bold: bool,
    pub italic: bool,
}

impl EffectiveField {
    /// Fields without text are skipped by the compositor
    pub fn is_visible(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Resolve every field of a category against an optional override lookup
pub fn resolve_all<'a>(
    category: Category,
    overrides: impl Fn(&str) -> Option<&'a FieldCustomization>,
) -> Vec<EffectiveField> {
    definitions(category)
        .iter()
        .map(|def| match overrides(def.name) {
            Some(custom) => custom.resolve(def),
            None => FieldCustomization::default().resolve(def),
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_model_and_price() {
        for category in Category::ALL {
            assert!(definition(category, "Model").is_ok());
            assert!(definition(category, "Price").is_ok());
        }
    }

    #[test]
    fn test_field_names_unique_per_category() {
        for category in Category::ALL {
            let defs = definitions(category);
            for (i, a) in defs.iter().enumerate() {
                for b in &defs[i + 1..] {
                    assert_ne!(a.name, b.name, "duplicate field in {}", category);
                }
            }
        }
    }

    #[test]
    fn test_defaults_inside_source_bounds() {
        for category in Category::ALL {
            let (w, h) = category.source_size();
            for def in definitions(category) {
                assert!(def.default_x >= 0 && (def.default_x as u32) < w);
                assert!(def.default_y >= 0 && (def.default_y as u32) < h);
            }
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = definition(Category::Smartphone, "RAM").unwrap_err();
        assert!(matches!(err, ComposeError::UnknownField { .. }));
    }

    #[test]
    fn test_empty_override_is_noop() {
        let def = definition(Category::Square, "CPU").unwrap();
        let base = FieldCustomization::default().resolve(def);
        let mut custom = FieldCustomization::default();
        custom.merge(&FieldCustomization::default());
        assert!(custom.is_empty());
        assert_eq!(custom.resolve(def), base);
        assert_eq!(base.x, def.default_x);
        assert_eq!(base.font_family, DEFAULT_FONT_FAMILY);
        assert!(!base.is_visible());
    }

    #[test]
    fn test_merge_keeps_untouched_properties() {
        let mut custom = FieldCustomization {
            text: Some("Galaxy S24".into()),
            color: Some(Rgb::WHITE),
            ..Default::default()
        };
        custom.merge(&StyleChange::Bold(true).into());

        assert_eq!(custom.text.as_deref(), Some("Galaxy S24"));
        assert_eq!(custom.color, Some(Rgb::WHITE));
        assert_eq!(custom.bold, Some(true));
        assert_eq!(custom.x, None);
    }
}

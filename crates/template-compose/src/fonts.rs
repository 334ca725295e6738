//! Font faces for text overlays
//!
//! The compositor only needs to know whether a family is ready to render.
//! [`FontProvider`] is that seam; [`FontRegistry`] is the file-backed
//! implementation used by the CLI and the editor runtime.

use crate::constants::DEFAULT_FONT_FAMILY;
use crate::fields::EffectiveField;
use crate::types::{ComposeError, Result};
use rusttype::Font;
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

/// Family plus the requested weight/slant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontKey {
    /// Lower-cased family name
    pub family: String,
    pub bold: bool,
    pub italic: bool,
}

impl FontKey {
    pub fn new(family: &str, bold: bool, italic: bool) -> Self {
        Self {
            family: family.trim().to_lowercase(),
            bold,
            italic,
        }
    }

    pub fn regular(family: &str) -> Self {
        Self::new(family, false, false)
    }

    pub fn for_field(field: &EffectiveField) -> Self {
        Self::new(&field.font_family, field.bold, field.italic)
    }

    /// Parse a font file stem such as `Roboto-BoldItalic` or `Anton`.
    ///
    /// Weights other than regular and bold are keyed as their own family,
    /// so `Roboto-Light` becomes the regular face of `roboto light`.
    pub fn from_file_stem(stem: &str) -> Self {
        let (family, style) = split_stem(stem);
        match style {
            FileStyle::Standard { bold, italic } => Self::new(&family, bold, italic),
            FileStyle::Weight { name, italic } => {
                Self::new(&format!("{} {}", family, name), false, italic)
            }
        }
    }
}

/// Style part of a font file name
#[derive(Debug, Clone, PartialEq, Eq)]
enum FileStyle {
    /// Regular, bold, italic or bold italic
    Standard { bold: bool, italic: bool },
    /// Any other weight (thin, light, medium, black...)
    Weight { name: String, italic: bool },
}

fn split_stem(stem: &str) -> (String, FileStyle) {
    let (family, style) = match stem.rsplit_once('-') {
        Some((family, style)) => (family, style.to_lowercase()),
        None => (stem, String::new()),
    };
    let family = family.replace('_', " ");

    let (weight, italic) = match style
        .strip_suffix("italic")
        .or_else(|| style.strip_suffix("oblique"))
    {
        Some(weight) => (weight, true),
        None => (style.as_str(), false),
    };
    let style = match weight {
        "" | "regular" | "book" | "roman" => FileStyle::Standard { bold: false, italic },
        "bold" => FileStyle::Standard { bold: true, italic },
        name => FileStyle::Weight {
            name: name.to_string(),
            italic,
        },
    };
    (family, style)
}

/// A face ready for drawing, with any style it has to fake
#[derive(Clone)]
pub struct ResolvedFace {
    pub font: Arc<Font<'static>>,
    pub synthetic_bold: bool,
    pub synthetic_italic: bool,
}

impl ResolvedFace {
    /// Use `font` for `requested`, faking whatever weight/slant it lacks
    pub fn substitute(font: Arc<Font<'static>>, requested: &FontKey, has: &FontKey) -> Self {
        Self {
            font,
            synthetic_bold: requested.bold && !has.bold,
            synthetic_italic: requested.italic && !has.italic,
        }
    }
}

impl std::fmt::Debug for ResolvedFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFace")
            .field("synthetic_bold", &self.synthetic_bold)
            .field("synthetic_italic", &self.synthetic_italic)
            .finish_non_exhaustive()
    }
}

/// Source of font faces for the compositor
pub trait FontProvider: Send + Sync + 'static {
    /// Families offered to the user
    fn families(&self) -> Vec<String>;

    /// Resolves once the family is ready to render, or to `None` if it never will be.
    ///
    /// Callers bound the wait; an implementation may stay pending.
    fn ready(&self, key: &FontKey) -> impl Future<Output = Option<ResolvedFace>> + Send;

    /// Face used when the requested family is unavailable
    fn default_face(&self) -> Option<Arc<Font<'static>>>;
}

// =============================================================================
// Registry
// =============================================================================

/// In-memory table of parsed faces
#[derive(Clone, Default)]
pub struct FontRegistry {
    faces: HashMap<FontKey, Arc<Font<'static>>>,
    default_face: Option<Arc<Font<'static>>>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and register a face. The first regular face of the default
    /// family also becomes the fallback face.
    pub fn register(&mut self, key: FontKey, bytes: Vec<u8>) -> Result<()> {
        let font = Font::try_from_vec(bytes).ok_or_else(|| {
            ComposeError::Config(format!("Invalid font data for family '{}'", key.family))
        })?;
        let font = Arc::new(font);
        if self.default_face.is_none() && key == FontKey::regular(DEFAULT_FONT_FAMILY) {
            self.default_face = Some(font.clone());
        }
        self.faces.insert(key, font);
        Ok(())
    }

    /// Replace the fallback face
    pub fn set_default(&mut self, bytes: Vec<u8>) -> Result<()> {
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| ComposeError::Config("Invalid default font data".to_string()))?;
        self.default_face = Some(Arc::new(font));
        Ok(())
    }

    /// Load one `.ttf`/`.otf` file, deriving family and style from its name
    pub async fn load_file(&mut self, path: impl AsRef<Path>) -> Result<FontKey> {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ComposeError::Config(format!("Bad font file name: {}", path.display())))?;
        let key = FontKey::from_file_stem(stem);
        let bytes = tokio::fs::read(path).await?;
        self.register(key.clone(), bytes)?;
        log::debug!("Loaded font {:?} from {}", key, path.display());
        Ok(key)
    }

    /// Load every font file in a directory.
    ///
    /// Files are loaded in name order and the first file for a key wins.
    /// The fallback face is the regular face of the default family, or
    /// failing that the first regular-weight face loaded.
    pub async fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(dir.as_ref()).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_font = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
            if is_font {
                paths.push(path);
            }
        }
        paths.sort();

        let mut registry = Self::new();
        let mut first_regular: Option<FontKey> = None;
        for path in &paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                log::warn!("Skipping font with unreadable name: {}", path.display());
                continue;
            };
            let key = FontKey::from_file_stem(stem);
            if registry.faces.contains_key(&key) {
                log::warn!("Skipping font {}: {:?} is already loaded", path.display(), key);
                continue;
            }
            let is_plain_regular = split_stem(stem).1
                == FileStyle::Standard {
                    bold: false,
                    italic: false,
                };

            match registry.load_file(path).await {
                Ok(key) if is_plain_regular && first_regular.is_none() => first_regular = Some(key),
                Ok(_) => {}
                Err(e) => log::warn!("Skipping font {}: {}", path.display(), e),
            }
        }

        registry.default_face = registry
            .faces
            .get(&FontKey::regular(DEFAULT_FONT_FAMILY))
            .or_else(|| first_regular.and_then(|key| registry.faces.get(&key)))
            .cloned();

        log::info!("Loaded {} font faces from {}", registry.faces.len(), dir.as_ref().display());
        Ok(registry)
    }

    /// Best registered face for `key`, faking bold/italic from a sibling face
    pub fn lookup(&self, key: &FontKey) -> Option<ResolvedFace> {
        let candidates = [
            key.clone(),
            FontKey::new(&key.family, key.bold, false),
            FontKey::new(&key.family, false, key.italic),
            FontKey::regular(&key.family),
        ];
        candidates.iter().find_map(|candidate| {
            self.faces
                .get(candidate)
                .map(|font| ResolvedFace::substitute(font.clone(), key, candidate))
        })
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

impl FontProvider for FontRegistry {
    fn families(&self) -> Vec<String> {
        let mut families: Vec<String> = self.faces.keys().map(|k| k.family.clone()).collect();
        families.sort();
        families.dedup();
        families
    }

    fn ready(&self, key: &FontKey) -> impl Future<Output = Option<ResolvedFace>> + Send {
        std::future::ready(self.lookup(key))
    }

    fn default_face(&self) -> Option<Arc<Font<'static>>> {
        self.default_face.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_file_stem() {
        assert_eq!(FontKey::from_file_stem("Roboto-BoldItalic"), FontKey::new("roboto", true, true));
        assert_eq!(FontKey::from_file_stem("Anton"), FontKey::regular("Anton"));
        assert_eq!(
            FontKey::from_file_stem("Bebas_Neue-Regular"),
            FontKey::regular("Bebas Neue")
        );
        assert_eq!(
            FontKey::from_file_stem("DejaVuSans-BoldOblique"),
            FontKey::new("dejavusans", true, true)
        );
        assert_eq!(FontKey::from_file_stem("Lora-Book"), FontKey::regular("Lora"));
    }

    #[test]
    fn test_other_weights_get_their_own_family() {
        assert_eq!(
            FontKey::from_file_stem("Playfair Display-Black"),
            FontKey::regular("Playfair Display Black")
        );
        assert_eq!(FontKey::from_file_stem("Roboto-Thin"), FontKey::regular("Roboto Thin"));
        assert_eq!(
            FontKey::from_file_stem("Roboto-LightItalic"),
            FontKey::new("roboto light", false, true)
        );
        assert_eq!(
            FontKey::from_file_stem("Inter-SemiBold"),
            FontKey::regular("Inter SemiBold")
        );
    }

    #[test]
    fn test_key_case_insensitive() {
        assert_eq!(FontKey::regular("Helvetica"), FontKey::regular(" helvetica "));
    }

    #[test]
    fn test_empty_registry_has_nothing_ready() {
        let registry = FontRegistry::new();
        assert!(registry.lookup(&FontKey::regular("Helvetica")).is_none());
        assert!(registry.default_face().is_none());
        assert!(registry.families().is_empty());
    }

    #[test]
    fn test_register_rejects_garbage() {
        let mut registry = FontRegistry::new();
        let result = registry.register(FontKey::regular("Broken"), vec![0, 1, 2, 3]);
        assert!(matches!(result, Err(ComposeError::Config(_))));
        assert!(registry.is_empty());
    }
}

use crate::constants::{
    RECTANGULAR_SOURCE_SIZE, RECTANGULAR_VIEW_SCALE, SMARTPHONE_SOURCE_SIZE,
    SMARTPHONE_VIEW_SCALE, SQUARE_SOURCE_SIZE, SQUARE_VIEW_SCALE,
};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Unknown field '{field}' for {category} templates")]
    UnknownField { category: Category, field: String },
    #[error("Unknown template instance {0}")]
    UnknownInstance(InstanceId),
    #[error("Failed to load asset '{url}': {reason}")]
    AssetLoad { url: String, reason: String },
    #[error("Font '{family}' is not ready, using the default face")]
    FontUnavailable { family: String },
    #[error("Failed to encode raster: {0}")]
    Encoding(String),
    #[error("No templates found for category {0}")]
    NoTemplates(Category),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid font size {size} for field '{field}', must be a positive number")]
    InvalidFontSize { field: String, size: f32 },
}

pub type Result<T> = std::result::Result<T, ComposeError>;

// =============================================================================
// Category
// =============================================================================

/// Fixed aspect-ratio class of a template asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Category {
    /// Landscape phone card (1375×1044)
    Smartphone,
    /// Square computer card (1080×1080)
    Square,
    /// Wide computer banner (1500×500)
    Rectangular,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Smartphone, Category::Square, Category::Rectangular];

    /// Intrinsic resolution of the category's template assets, in pixels
    pub fn source_size(self) -> (u32, u32) {
        match self {
            Category::Smartphone => SMARTPHONE_SOURCE_SIZE,
            Category::Square => SQUARE_SOURCE_SIZE,
            Category::Rectangular => RECTANGULAR_SOURCE_SIZE,
        }
    }

    /// Scale applied to source coordinates in the on-screen editor.
    ///
    /// This is a fixed table and is not derived from the asset's decoded size.
    pub fn view_scale(self) -> f32 {
        match self {
            Category::Smartphone => SMARTPHONE_VIEW_SCALE,
            Category::Square => SQUARE_VIEW_SCALE,
            Category::Rectangular => RECTANGULAR_VIEW_SCALE,
        }
    }

    /// Height over width of the intrinsic resolution
    pub fn aspect_ratio(self) -> f32 {
        let (w, h) = self.source_size();
        h as f32 / w as f32
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Smartphone => "smartphone",
            Category::Square => "square",
            Category::Rectangular => "rectangular",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smartphone" => Ok(Category::Smartphone),
            "square" => Ok(Category::Square),
            "rectangular" => Ok(Category::Rectangular),
            other => Err(ComposeError::Config(format!("Unknown category '{}'", other))),
        }
    }
}

// =============================================================================
// Color
// =============================================================================

/// 8-bit RGB color, written as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ComposeError::InvalidColor(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ComposeError::InvalidColor(s.to_string()))
        };
        Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ComposeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

// =============================================================================
// Templates
// =============================================================================

/// A template image as listed by the catalog
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemplateAsset {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub category: Category,
}

/// Identity of one template instance in a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

impl InstanceId {
    /// Allocate an id that is unique for the lifetime of the process
    pub fn next() -> Self {
        InstanceId(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One user-added occurrence of a template, customizable on its own
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateInstance {
    pub id: InstanceId,
    pub asset: TemplateAsset,
    pub category: Category,
}

impl TemplateInstance {
    pub fn new(asset: TemplateAsset) -> Self {
        Self {
            id: InstanceId::next(),
            category: asset.category,
            asset,
        }
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Summary of how a selection will paginate
#[derive(Debug, Clone, PartialEq)]
pub struct ExportStatistics {
    /// Number of template instances in the selection
    pub instances: usize,
    /// Number of output pages
    pub pages: usize,
    /// Cells left empty on partially filled pages
    pub blank_cells: usize,
    /// Instance count per category, in page order
    pub per_category: Vec<(Category, usize)>,
}

//! Symbol definitions
//!
//! A symbol is a user-defined marker type (shape, color, size) used to tag
//! occurrences on a page. Counts are always derived from the annotation list
//! and never stored on the symbol itself.

use crate::config::TakeoffConfig;
use crate::error::{TakeoffError, TakeoffResult};

/// Unique identifier for a symbol
///
/// Generated using UUID v4. Unique for the lifetime of a session only.
pub type SymbolId = uuid::Uuid;

/// Preset marker colors offered by the symbol palette
pub const DEFAULT_PALETTE: [&str; 18] = [
    "#FF5252", // Red
    "#FF4081", // Pink
    "#9C27B0", // Purple
    "#673AB7", // Deep Purple
    "#3F51B5", // Indigo
    "#2196F3", // Blue
    "#03A9F4", // Light Blue
    "#00BCD4", // Cyan
    "#009688", // Teal
    "#4CAF50", // Green
    "#8BC34A", // Light Green
    "#CDDC39", // Lime
    "#FFEB3B", // Yellow
    "#FFC107", // Amber
    "#FF9800", // Orange
    "#FF5722", // Deep Orange
    "#795548", // Brown
    "#607D8B", // Blue Grey
];

/// Marker outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolShape {
    #[default]
    Circle,
    Square,
    Triangle,
    /// Round marker labelled with the first letter of the symbol name
    Custom,
}

impl SymbolShape {
    /// Lowercase name used in serialized state
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolShape::Circle => "circle",
            SymbolShape::Square => "square",
            SymbolShape::Triangle => "triangle",
            SymbolShape::Custom => "custom",
        }
    }
}

/// Human-readable size bucket shown next to the size slider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeLabel {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl SizeLabel {
    pub fn for_size(size: f32) -> Self {
        if size <= 16.0 {
            SizeLabel::Small
        } else if size <= 24.0 {
            SizeLabel::Medium
        } else if size <= 32.0 {
            SizeLabel::Large
        } else {
            SizeLabel::ExtraLarge
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeLabel::Small => "Small",
            SizeLabel::Medium => "Medium",
            SizeLabel::Large => "Large",
            SizeLabel::ExtraLarge => "X-Large",
        }
    }
}

/// A marker type placed on pages
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Symbol {
    id: SymbolId,
    name: String,
    color: String,
    shape: SymbolShape,
    /// Marker size in pixels, independent of zoom
    size: f32,
}

impl Symbol {
    /// Get the symbol ID
    pub fn id(&self) -> SymbolId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn shape(&self) -> SymbolShape {
        self.shape
    }

    /// Marker size in pixels
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn size_label(&self) -> SizeLabel {
        SizeLabel::for_size(self.size)
    }

    /// Uppercased first letter of the name, drawn inside custom markers
    pub fn marker_initial(&self) -> Option<char> {
        self.name.chars().next().and_then(|c| c.to_uppercase().next())
    }
}

/// User input for creating a symbol
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolDraft {
    pub name: String,
    pub color: String,
    pub shape: SymbolShape,
    /// `None` falls back to the configured default size
    pub size: Option<f32>,
}

impl SymbolDraft {
    pub fn new(name: impl Into<String>, color: impl Into<String>, shape: SymbolShape) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            shape,
            size: None,
        }
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }

    /// Validate the draft and mint a symbol with a fresh ID
    pub(crate) fn build(self, config: &TakeoffConfig) -> TakeoffResult<Symbol> {
        let name = validate_name(&self.name, config)?;
        let size = match self.size {
            Some(size) if size > 0.0 => config.clamp_symbol_size(size),
            _ => config.default_symbol_size,
        };

        Ok(Symbol {
            id: SymbolId::new_v4(),
            name,
            color: self.color,
            shape: self.shape,
            size,
        })
    }
}

impl Default for SymbolDraft {
    fn default() -> Self {
        Self::new("", DEFAULT_PALETTE[0], SymbolShape::Circle)
    }
}

/// Changes applied by an explicit symbol edit. `None` fields are left as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolEdit {
    pub name: Option<String>,
    pub color: Option<String>,
    pub shape: Option<SymbolShape>,
    pub size: Option<f32>,
}

impl SymbolEdit {
    pub(crate) fn apply(self, symbol: &mut Symbol, config: &TakeoffConfig) -> TakeoffResult<()> {
        // Validate before touching anything so a failed edit leaves no trace
        let name = self
            .name
            .as_deref()
            .map(|name| validate_name(name, config))
            .transpose()?;

        if let Some(name) = name {
            symbol.name = name;
        }
        if let Some(color) = self.color {
            symbol.color = color;
        }
        if let Some(shape) = self.shape {
            symbol.shape = shape;
        }
        if let Some(size) = self.size.filter(|s| *s > 0.0) {
            symbol.size = config.clamp_symbol_size(size);
        }
        Ok(())
    }
}

/// Trims the name and checks it against the configured limits
fn validate_name(name: &str, config: &TakeoffConfig) -> TakeoffResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TakeoffError::EmptySymbolName);
    }
    let len = trimmed.chars().count();
    if len > config.max_symbol_name_len {
        return Err(TakeoffError::SymbolNameTooLong {
            len,
            max: config.max_symbol_name_len,
        });
    }
    Ok(trimmed.to_string())
}

//! Caption font resolution and shaping.
//!
//! Shaping happens once per distinct string on the calling thread; the resulting glyph runs are
//! plain data that frame workers rasterize in parallel.

use std::{collections::HashMap, path::Path, sync::Arc};

use anyhow::Context as _;

use crate::foundation::error::{MemeError, MemeResult};

/// Family names tried, in order, when no caption font is configured.
const PREFERRED_FAMILIES: &[&str] = &["Impact", "Anton", "Oswald", "Liberation Sans", "DejaVu Sans"];

/// Font used for meme captions: raw bytes plus the face within them.
#[derive(Clone)]
pub struct CaptionFont {
    bytes: Arc<Vec<u8>>,
    index: u32,
    family: String,
    raster: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionFont")
            .field("family", &self.family)
            .field("index", &self.index)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl CaptionFont {
    /// Load the first face of a TTF/OTF/TTC blob.
    pub fn from_bytes(bytes: Vec<u8>) -> MemeResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_font_data(bytes.clone());
        let face = db
            .faces()
            .next()
            .ok_or_else(|| MemeError::validation("no font faces found in font data"))?;
        let family = face
            .families
            .first()
            .map(|(name, _)| name.clone())
            .ok_or_else(|| MemeError::validation("font face has no family name"))?;
        Ok(Self::from_parts(bytes, face.index, family))
    }

    /// Load a font file from disk.
    pub fn from_file(path: &Path) -> MemeResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Self::from_bytes(bytes)
    }

    /// Look up an impact-style (or at least bold sans-serif) system font.
    pub fn system_default() -> Option<Self> {
        use usvg::fontdb::{Database, Family, Query, Stretch, Style, Weight};

        let mut db = Database::new();
        db.load_system_fonts();

        let mut families: Vec<Family<'_>> =
            PREFERRED_FAMILIES.iter().copied().map(Family::Name).collect();
        families.push(Family::SansSerif);

        let query = Query {
            families: &families,
            weight: Weight::BOLD,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = db.query(&query).or_else(|| db.faces().next().map(|f| f.id))?;
        let face = db.face(id)?;
        let family = face.families.first()?.0.clone();
        let bytes = db.with_face_data(id, |data, _| data.to_vec())?;
        Some(Self::from_parts(bytes, face.index, family))
    }

    /// Explicit file when given, otherwise the system default (which may not exist).
    pub fn resolve(path: Option<&Path>) -> MemeResult<Option<Self>> {
        match path {
            Some(p) => Self::from_file(p).map(Some),
            None => Ok(Self::system_default()),
        }
    }

    /// Primary family name reported by the font.
    pub fn family(&self) -> &str {
        &self.family
    }

    pub(crate) fn raster(&self) -> &vello_cpu::peniko::FontData {
        &self.raster
    }

    fn from_parts(bytes: Vec<u8>, index: u32, family: String) -> Self {
        let raster = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.clone()),
            index,
        );
        Self {
            bytes: Arc::new(bytes),
            index,
            family,
            raster,
        }
    }
}

/// One shaped line of caption text, positioned relative to its own origin.
#[derive(Clone, Debug)]
pub struct ShapedLine {
    /// Glyphs with x from the line start and y at the layout baseline.
    pub glyphs: Vec<vello_cpu::Glyph>,
    /// Font size the glyphs were shaped at.
    pub font_size: f32,
    /// Advance width of the whole line.
    pub width: f32,
    /// Baseline offset from the layout top.
    pub baseline: f32,
}

/// Parley-backed shaper with a per-string cache.
pub struct CaptionShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    family_name: String,
    size_px: f32,
    cache: HashMap<String, Arc<ShapedLine>>,
}

impl CaptionShaper {
    /// Register `font` and prepare to shape text at `size_px`.
    pub fn new(font: &CaptionFont, size_px: f32) -> MemeResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(MemeError::validation(
                "caption font size must be finite and > 0",
            ));
        }

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.bytes.as_ref().clone()),
            None,
        );
        let mut names = Vec::with_capacity(families.len());
        for (id, _) in &families {
            if let Some(name) = font_ctx.collection.family_name(*id) {
                names.push(name.to_string());
            }
        }
        let family_name = names
            .iter()
            .find(|n| n.eq_ignore_ascii_case(&font.family))
            .or_else(|| names.first())
            .cloned()
            .ok_or_else(|| MemeError::validation("no font families registered from font bytes"))?;

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            size_px,
            cache: HashMap::new(),
        })
    }

    /// Shape a single line (no line breaking).
    pub fn shape(&mut self, text: &str) -> Arc<ShapedLine> {
        if let Some(line) = self.cache.get(text) {
            return line.clone();
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(self.size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::BOLD,
        ));
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        let mut glyphs = Vec::new();
        let mut baseline = 0.0;
        let mut font_size = self.size_px;
        for (line_idx, line) in layout.lines().enumerate() {
            if line_idx == 0 {
                baseline = line.metrics().baseline;
            }
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                font_size = run.run().font_size();
                glyphs.extend(run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                }));
            }
        }

        let shaped = Arc::new(ShapedLine {
            glyphs,
            font_size,
            width: layout.width(),
            baseline,
        });
        self.cache.insert(text.to_string(), shaped.clone());
        shaped
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;

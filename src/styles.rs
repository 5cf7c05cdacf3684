//! Cell style values and the book-level style registry.
//!
//! A [`Style`] is a plain value compared structurally; the registry assigns
//! each distinct value a dense integer id used as the `s` attribute of cell
//! elements. Id 0 is the default style, registered at construction. The
//! registry also owns serialization of `xl/styles.xml`: fonts, fills and
//! borders are pooled and deduplicated at write time, custom number formats
//! get ids from 164 upward.

use std::collections::HashMap;
use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::error::Result;

/// Dense id of a registered style; the `s` attribute of a cell.
pub type StyleId = usize;

/// First id available to custom number formats in the host format.
const FIRST_CUSTOM_NUM_FMT: usize = 164;

/// Border line style applied to all four sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderStyle {
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
}

impl BorderStyle {
    const fn as_str(self) -> &'static str {
        match self {
            BorderStyle::Thin => "thin",
            BorderStyle::Medium => "medium",
            BorderStyle::Thick => "thick",
            BorderStyle::Dashed => "dashed",
            BorderStyle::Dotted => "dotted",
            BorderStyle::Double => "double",
        }
    }
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

impl HAlign {
    const fn as_str(self) -> &'static str {
        match self {
            HAlign::Left => "left",
            HAlign::Center => "center",
            HAlign::Right => "right",
        }
    }
}

/// One cell style value. Structural equality decides registry identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<u32>,
    /// Font color as ARGB hex, e.g. `"FF1F4E79"`.
    pub font_color: Option<String>,
    pub bold: bool,
    pub italic: bool,
    /// Solid fill color as ARGB hex.
    pub fill_rgb: Option<String>,
    pub border: Option<BorderStyle>,
    /// Number format code, e.g. `"0.00%"`.
    pub num_fmt: Option<String>,
    pub align_h: Option<HAlign>,
    pub wrap: bool,
}

impl Style {
    fn font_key(&self) -> FontKey {
        FontKey {
            name: self.font_name.clone(),
            size: self.font_size,
            color: self.font_color.clone(),
            bold: self.bold,
            italic: self.italic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FontKey {
    name: Option<String>,
    size: Option<u32>,
    color: Option<String>,
    bold: bool,
    italic: bool,
}

/// Style value → dense id registry, shared by all sheets of one book.
#[derive(Debug)]
pub struct Styles {
    ids: HashMap<Style, StyleId>,
    entries: Vec<Style>,
}

impl Default for Styles {
    fn default() -> Self {
        let mut registry = Self {
            ids: HashMap::new(),
            entries: Vec::new(),
        };
        // Id 0 is the default style by construction order.
        registry.register(Style::default());
        registry
    }
}

impl Styles {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id of a structurally equal style, registering it first if
    /// unseen. Identical values always map to the same id.
    pub fn register(&mut self, style: Style) -> StyleId {
        if let Some(&id) = self.ids.get(&style) {
            return id;
        }
        let id = self.entries.len();
        self.entries.push(style.clone());
        self.ids.insert(style, id);
        id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the registry as `xl/styles.xml`.
    ///
    /// # Errors
    /// Propagates XML/IO failures from the sink.
    #[allow(clippy::too_many_lines)]
    pub fn write_xml<W: Write>(&self, writer: W) -> Result<()> {
        // Pool the component tables. Index 0 of each pool is the default.
        let mut num_fmts: Vec<&str> = Vec::new();
        let mut num_fmt_ids: HashMap<&str, usize> = HashMap::new();
        let mut fonts: Vec<FontKey> = vec![Style::default().font_key()];
        let mut font_ids: HashMap<FontKey, usize> = HashMap::new();
        font_ids.insert(Style::default().font_key(), 0);
        let mut fills: Vec<&str> = Vec::new(); // solid fills beyond the two fixed ones
        let mut fill_ids: HashMap<&str, usize> = HashMap::new();
        let mut borders: Vec<BorderStyle> = Vec::new();
        let mut border_ids: HashMap<BorderStyle, usize> = HashMap::new();

        struct Xf {
            num_fmt_id: usize,
            font_id: usize,
            fill_id: usize,
            border_id: usize,
        }
        let mut xfs: Vec<Xf> = Vec::new();

        for style in &self.entries {
            let num_fmt_id = match style.num_fmt.as_deref() {
                Some(code) => *num_fmt_ids.entry(code).or_insert_with(|| {
                    num_fmts.push(code);
                    FIRST_CUSTOM_NUM_FMT + num_fmts.len() - 1
                }),
                None => 0,
            };
            let key = style.font_key();
            let font_id = *font_ids.entry(key.clone()).or_insert_with(|| {
                fonts.push(key.clone());
                fonts.len() - 1
            });
            // Fills 0 ("none") and 1 ("gray125") are mandated by the format.
            let fill_id = match style.fill_rgb.as_deref() {
                Some(rgb) => *fill_ids.entry(rgb).or_insert_with(|| {
                    fills.push(rgb);
                    fills.len() + 1
                }),
                None => 0,
            };
            let border_id = match style.border {
                Some(preset) => *border_ids.entry(preset).or_insert_with(|| {
                    borders.push(preset);
                    borders.len()
                }),
                None => 0,
            };
            xfs.push(Xf {
                num_fmt_id,
                font_id,
                fill_id,
                border_id,
            });
        }

        let mut xml = Writer::new(writer);
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        let mut root = BytesStart::new("styleSheet");
        root.push_attribute((
            "xmlns",
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        ));
        xml.write_event(Event::Start(root))?;

        if !num_fmts.is_empty() {
            let mut start = BytesStart::new("numFmts");
            start.push_attribute(("count", num_fmts.len().to_string().as_str()));
            xml.write_event(Event::Start(start))?;
            for (i, code) in num_fmts.iter().enumerate() {
                let mut fmt = BytesStart::new("numFmt");
                fmt.push_attribute((
                    "numFmtId",
                    (FIRST_CUSTOM_NUM_FMT + i).to_string().as_str(),
                ));
                fmt.push_attribute(("formatCode", *code));
                xml.write_event(Event::Empty(fmt))?;
            }
            xml.write_event(Event::End(BytesEnd::new("numFmts")))?;
        }

        let mut start = BytesStart::new("fonts");
        start.push_attribute(("count", fonts.len().to_string().as_str()));
        xml.write_event(Event::Start(start))?;
        for font in &fonts {
            xml.write_event(Event::Start(BytesStart::new("font")))?;
            if font.bold {
                xml.write_event(Event::Empty(BytesStart::new("b")))?;
            }
            if font.italic {
                xml.write_event(Event::Empty(BytesStart::new("i")))?;
            }
            let mut sz = BytesStart::new("sz");
            sz.push_attribute(("val", font.size.unwrap_or(11).to_string().as_str()));
            xml.write_event(Event::Empty(sz))?;
            if let Some(rgb) = font.color.as_deref() {
                let mut color = BytesStart::new("color");
                color.push_attribute(("rgb", rgb));
                xml.write_event(Event::Empty(color))?;
            }
            let mut name = BytesStart::new("name");
            name.push_attribute(("val", font.name.as_deref().unwrap_or("Calibri")));
            xml.write_event(Event::Empty(name))?;
            xml.write_event(Event::End(BytesEnd::new("font")))?;
        }
        xml.write_event(Event::End(BytesEnd::new("fonts")))?;

        let mut start = BytesStart::new("fills");
        start.push_attribute(("count", (fills.len() + 2).to_string().as_str()));
        xml.write_event(Event::Start(start))?;
        for pattern in ["none", "gray125"] {
            xml.write_event(Event::Start(BytesStart::new("fill")))?;
            let mut pat = BytesStart::new("patternFill");
            pat.push_attribute(("patternType", pattern));
            xml.write_event(Event::Empty(pat))?;
            xml.write_event(Event::End(BytesEnd::new("fill")))?;
        }
        for rgb in &fills {
            xml.write_event(Event::Start(BytesStart::new("fill")))?;
            let mut pat = BytesStart::new("patternFill");
            pat.push_attribute(("patternType", "solid"));
            xml.write_event(Event::Start(pat))?;
            let mut fg = BytesStart::new("fgColor");
            fg.push_attribute(("rgb", *rgb));
            xml.write_event(Event::Empty(fg))?;
            let mut bg = BytesStart::new("bgColor");
            bg.push_attribute(("indexed", "64"));
            xml.write_event(Event::Empty(bg))?;
            xml.write_event(Event::End(BytesEnd::new("patternFill")))?;
            xml.write_event(Event::End(BytesEnd::new("fill")))?;
        }
        xml.write_event(Event::End(BytesEnd::new("fills")))?;

        let mut start = BytesStart::new("borders");
        start.push_attribute(("count", (borders.len() + 1).to_string().as_str()));
        xml.write_event(Event::Start(start))?;
        // Border 0: all sides unstyled.
        xml.write_event(Event::Start(BytesStart::new("border")))?;
        for side in ["left", "right", "top", "bottom", "diagonal"] {
            xml.write_event(Event::Empty(BytesStart::new(side)))?;
        }
        xml.write_event(Event::End(BytesEnd::new("border")))?;
        for preset in &borders {
            xml.write_event(Event::Start(BytesStart::new("border")))?;
            for side in ["left", "right", "top", "bottom"] {
                let mut el = BytesStart::new(side);
                el.push_attribute(("style", preset.as_str()));
                xml.write_event(Event::Empty(el))?;
            }
            xml.write_event(Event::Empty(BytesStart::new("diagonal")))?;
            xml.write_event(Event::End(BytesEnd::new("border")))?;
        }
        xml.write_event(Event::End(BytesEnd::new("borders")))?;

        let mut start = BytesStart::new("cellStyleXfs");
        start.push_attribute(("count", "1"));
        xml.write_event(Event::Start(start))?;
        let mut xf = BytesStart::new("xf");
        for attr in [("numFmtId", "0"), ("fontId", "0"), ("fillId", "0"), ("borderId", "0")] {
            xf.push_attribute(attr);
        }
        xml.write_event(Event::Empty(xf))?;
        xml.write_event(Event::End(BytesEnd::new("cellStyleXfs")))?;

        let mut start = BytesStart::new("cellXfs");
        start.push_attribute(("count", xfs.len().to_string().as_str()));
        xml.write_event(Event::Start(start))?;
        for (xf, style) in xfs.iter().zip(self.entries.iter()) {
            let mut el = BytesStart::new("xf");
            el.push_attribute(("numFmtId", xf.num_fmt_id.to_string().as_str()));
            el.push_attribute(("fontId", xf.font_id.to_string().as_str()));
            el.push_attribute(("fillId", xf.fill_id.to_string().as_str()));
            el.push_attribute(("borderId", xf.border_id.to_string().as_str()));
            el.push_attribute(("xfId", "0"));
            if xf.num_fmt_id != 0 {
                el.push_attribute(("applyNumberFormat", "1"));
            }
            if xf.font_id != 0 {
                el.push_attribute(("applyFont", "1"));
            }
            if xf.fill_id != 0 {
                el.push_attribute(("applyFill", "1"));
            }
            if xf.border_id != 0 {
                el.push_attribute(("applyBorder", "1"));
            }
            let has_alignment = style.align_h.is_some() || style.wrap;
            if has_alignment {
                el.push_attribute(("applyAlignment", "1"));
                xml.write_event(Event::Start(el))?;
                let mut align = BytesStart::new("alignment");
                if let Some(h) = style.align_h {
                    align.push_attribute(("horizontal", h.as_str()));
                }
                if style.wrap {
                    align.push_attribute(("wrapText", "1"));
                }
                xml.write_event(Event::Empty(align))?;
                xml.write_event(Event::End(BytesEnd::new("xf")))?;
            } else {
                xml.write_event(Event::Empty(el))?;
            }
        }
        xml.write_event(Event::End(BytesEnd::new("cellXfs")))?;

        let mut start = BytesStart::new("cellStyles");
        start.push_attribute(("count", "1"));
        xml.write_event(Event::Start(start))?;
        let mut normal = BytesStart::new("cellStyle");
        normal.push_attribute(("name", "Normal"));
        normal.push_attribute(("xfId", "0"));
        normal.push_attribute(("builtinId", "0"));
        xml.write_event(Event::Empty(normal))?;
        xml.write_event(Event::End(BytesEnd::new("cellStyles")))?;

        xml.write_event(Event::End(BytesEnd::new("styleSheet")))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn default_style_takes_id_zero() {
        let mut registry = Styles::new();
        assert_eq!(registry.register(Style::default()), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn structural_equality_reuses_ids() {
        let mut registry = Styles::new();
        let bold = Style {
            bold: true,
            ..Style::default()
        };
        let id = registry.register(bold.clone());
        assert_eq!(registry.register(bold), id);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn custom_num_fmts_start_at_164() {
        let mut registry = Styles::new();
        registry.register(Style {
            num_fmt: Some("0.00%".to_string()),
            ..Style::default()
        });
        let mut out = Vec::new();
        registry.write_xml(&mut out).unwrap();
        let xml = String::from_utf8(out).unwrap();
        assert!(xml.contains("numFmtId=\"164\""));
        assert!(xml.contains("formatCode=\"0.00%\""));
    }
}

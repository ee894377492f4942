//! Custom `genpdf` elements for the decorations the upstream crate does not ship with.
//!
//! The layout vocabulary needs underlined runs, coloured horizontal rules and dashed
//! placeholder boxes.  All three are drawn with [`render::Area::draw_line`], which only takes
//! the colour from its [`Style`] and always strokes at the PDF default width of 1 pt.  Thicker
//! rules are built from parallel strokes; thinner ones are drawn as a single stroke.

use genpdf::error::Error;
use genpdf::style::{Color, Style, StyledString};
use genpdf::{render, Alignment, Element, Mm, Position, RenderResult, Size};

use crate::richtext::StyledSpan;

const DEFAULT_UNDERLINE_OFFSET_MM: f64 = 0.4;
const MM_PER_POINT: f64 = 25.4 / 72.0;

/// Width of every stroke `genpdf` draws, in points.
pub const STROKE_WIDTH: f32 = 1.0;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Converts a length in typographic points to millimetres.
pub fn pt(value: f32) -> Mm {
    mm_from_f64(f64::from(value) * MM_PER_POINT)
}

fn default_underline_offset() -> Mm {
    mm_from_f64(DEFAULT_UNDERLINE_OFFSET_MM)
}

fn stroke_style(color: Option<Color>) -> Style {
    match color {
        Some(color) => Style::new().with_color(color),
        None => Style::new(),
    }
}

/// Vertical offsets, from the top of a band `thickness` tall, of the strokes that fill it.
pub fn stroke_offsets(thickness: Mm) -> Vec<Mm> {
    let stroke = mm_to_f64(pt(STROKE_WIDTH));
    let thickness = mm_to_f64(thickness).max(0.0);
    let count = (thickness / stroke - 1e-9).ceil().max(1.0) as usize;
    if count == 1 {
        return vec![mm_from_f64(thickness / 2.0)];
    }

    let step = (thickness - stroke) / (count - 1) as f64;
    (0..count)
        .map(|index| mm_from_f64(stroke / 2.0 + step * index as f64))
        .collect()
}

/// Splits the segment `from`-`to` (in millimetres) into dashes of `dash` separated by `space`.
pub fn dash_segments(
    from: (f64, f64),
    to: (f64, f64),
    dash: f64,
    space: f64,
) -> Vec<((f64, f64), (f64, f64))> {
    let length = ((to.0 - from.0).powi(2) + (to.1 - from.1).powi(2)).sqrt();
    if dash <= 0.0 || length <= 0.0 {
        return Vec::new();
    }

    let (dx, dy) = ((to.0 - from.0) / length, (to.1 - from.1) / length);
    let mut segments = Vec::new();
    let mut offset = 0.0;
    while offset < length {
        let end = (offset + dash).min(length);
        segments.push((
            (from.0 + dx * offset, from.1 + dy * offset),
            (from.0 + dx * end, from.1 + dy * end),
        ));
        offset = end + space.max(0.0);
    }
    segments
}

fn min_mm(a: Mm, b: Mm) -> Mm {
    if a < b {
        a
    } else {
        b
    }
}

fn does_not_fit() -> RenderResult {
    let mut result = RenderResult::default();
    result.has_more = true;
    result
}

/// Type-erased element, so heterogeneous layout nodes can be stored side by side.
pub struct BoxedElement(Box<dyn Element>);

impl BoxedElement {
    /// Boxes `element`.
    pub fn new<E: Element + 'static>(element: E) -> Self {
        Self(Box::new(element))
    }
}

impl Element for BoxedElement {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        self.0.render(context, area, style)
    }
}

/// A single line of styled text that supports underlines by drawing thin strokes underneath.
pub struct UnderlinedText {
    spans: Vec<StyledSpan>,
    alignment: Alignment,
    underline_offset: Mm,
    underline_color: Option<Color>,
}

impl UnderlinedText {
    /// Creates a new underlined text element from the provided spans.
    pub fn new(spans: Vec<StyledSpan>) -> Self {
        Self {
            spans,
            alignment: Alignment::Left,
            underline_offset: default_underline_offset(),
            underline_color: None,
        }
    }

    /// Sets the alignment and returns the updated element.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Sets the distance between the glyphs and the underline stroke.
    pub fn with_underline_offset(mut self, offset: Mm) -> Self {
        self.underline_offset = offset;
        self
    }

    /// Draws the underline in `color` instead of the text colour.
    pub fn with_underline_color(mut self, color: impl Into<Color>) -> Self {
        self.underline_color = Some(color.into());
        self
    }
}

impl Element for UnderlinedText {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut prepared: Vec<(StyledString, bool, Mm)> = Vec::with_capacity(self.spans.len());
        let mut total_width = Mm::default();
        let mut max_line_height = style.line_height(&context.font_cache);
        let mut max_glyph_height = Mm::default();

        for span in &self.spans {
            let mut string = span.string.clone();
            string.style = style.and(string.style);
            let width = string.width(&context.font_cache);
            total_width += width;
            max_line_height = max_line_height.max(string.style.line_height(&context.font_cache));
            let glyph_height = string
                .style
                .font(&context.font_cache)
                .glyph_height(string.style.font_size());
            max_glyph_height = max_glyph_height.max(glyph_height);
            prepared.push((string, span.underline, width));
        }

        let available_width = area.size().width;
        let x_offset = match self.alignment {
            Alignment::Left => Mm::default(),
            Alignment::Center => (available_width - total_width) / 2.0,
            Alignment::Right => available_width - total_width,
        };

        if max_line_height > area.size().height {
            return Ok(does_not_fit());
        }

        match area.text_section(&context.font_cache, Position::new(x_offset, 0), style) {
            Some(mut section) => {
                for (string, _, _) in &prepared {
                    section.print_str(&string.s, string.style)?;
                }
            }
            None => return Ok(does_not_fit()),
        }

        let baseline = max_glyph_height + self.underline_offset;
        let mut cursor = x_offset;
        for (string, underline, width) in &prepared {
            if *underline {
                let color = self
                    .underline_color
                    .or_else(|| string.style.color())
                    .or_else(|| style.color());
                area.draw_line(
                    vec![
                        Position::new(cursor, baseline),
                        Position::new(cursor + *width, baseline),
                    ],
                    stroke_style(color),
                );
            }
            cursor += *width;
        }

        let mut result = RenderResult::default();
        result.size = Size::new(total_width, max_line_height);
        area.add_offset(Position::new(0, max_line_height));

        Ok(result)
    }
}

/// A straight horizontal line, truncated to the available width.
///
/// Rules thicker than one stroke are drawn as parallel strokes covering the thickness.
pub struct HorizontalRule {
    length: Mm,
    thickness: Mm,
    color: Option<Color>,
}

impl HorizontalRule {
    /// Creates a black rule `length` long and `thickness` tall.
    pub fn new(length: Mm, thickness: Mm) -> Self {
        Self {
            length,
            thickness,
            color: None,
        }
    }

    /// Sets the stroke colour and returns the updated rule.
    pub fn with_color(mut self, color: impl Into<Color>) -> Self {
        self.color = Some(color.into());
        self
    }
}

impl Element for HorizontalRule {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        let size = area.size();
        if self.thickness > size.height {
            return Ok(does_not_fit());
        }

        let width = min_mm(self.length, size.width);
        for y in stroke_offsets(self.thickness) {
            area.draw_line(
                vec![Position::new(0, y), Position::new(width, y)],
                stroke_style(self.color),
            );
        }

        let mut result = RenderResult::default();
        result.size = Size::new(width, self.thickness);
        Ok(result)
    }
}

/// A dashed rectangular outline with a centred label.
pub struct DashedBox {
    size: Size,
    dash: Option<(Mm, Mm)>,
    color: Option<Color>,
    label: Option<StyledString>,
}

impl DashedBox {
    /// Creates a solid outline of the given size.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            dash: None,
            color: None,
            label: None,
        }
    }

    /// Strokes the outline as `length` dashes separated by `space`.
    pub fn with_dash(mut self, length: Mm, space: Mm) -> Self {
        self.dash = Some((length, space));
        self
    }

    /// Sets the outline colour.
    pub fn with_color(mut self, color: impl Into<Color>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Prints `label` centred inside the outline.
    pub fn with_label(mut self, label: impl Into<StyledString>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn stroke(&self, area: &render::Area<'_>, from: (f64, f64), to: (f64, f64)) {
        let point = |(x, y): (f64, f64)| Position::new(mm_from_f64(x), mm_from_f64(y));
        let segments = match self.dash {
            Some((dash, space)) => dash_segments(from, to, mm_to_f64(dash), mm_to_f64(space)),
            None => vec![(from, to)],
        };
        for (start, end) in segments {
            area.draw_line(vec![point(start), point(end)], stroke_style(self.color));
        }
    }
}

impl Element for DashedBox {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let available = area.size();
        if self.size.height > available.height {
            return Ok(does_not_fit());
        }

        let width = mm_to_f64(min_mm(self.size.width, available.width));
        let height = mm_to_f64(self.size.height);
        self.stroke(&area, (0.0, 0.0), (width, 0.0));
        self.stroke(&area, (width, 0.0), (width, height));
        self.stroke(&area, (width, height), (0.0, height));
        self.stroke(&area, (0.0, height), (0.0, 0.0));

        if let Some(label) = &self.label {
            let label_style = style.and(label.style);
            let label_width = mm_to_f64(label.width(&context.font_cache));
            let line_height = mm_to_f64(label_style.line_height(&context.font_cache));
            let position = Position::new(
                mm_from_f64(((width - label_width) / 2.0).max(0.0)),
                mm_from_f64(((height - line_height) / 2.0).max(0.0)),
            );
            if let Some(mut section) = area.text_section(&context.font_cache, position, label_style)
            {
                section.print_str(&label.s, label_style)?;
            }
        }

        let mut result = RenderResult::default();
        result.size = Size::new(mm_from_f64(width), self.size.height);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_convert_to_millimetres() {
        assert!((mm_to_f64(pt(72.0)) - 25.4).abs() < 1e-9);
        assert!((mm_to_f64(pt(0.0))).abs() < f64::EPSILON);
    }

    #[test]
    fn millimetre_helpers_round_trip() {
        assert!((mm_to_f64(mm_from_f64(12.5)) - 12.5).abs() < 1e-9);
    }

    fn offsets_in_points(thickness: f32) -> Vec<f64> {
        stroke_offsets(pt(thickness))
            .into_iter()
            .map(|offset| mm_to_f64(offset) / MM_PER_POINT)
            .collect()
    }

    #[test]
    fn thin_rules_are_a_single_centred_stroke() {
        let offsets = offsets_in_points(0.5);
        assert_eq!(offsets.len(), 1);
        assert!((offsets[0] - 0.25).abs() < 1e-9);
    }

    #[test]
    fn thick_rules_are_filled_with_parallel_strokes() {
        let offsets = offsets_in_points(3.0);
        assert_eq!(offsets.len(), 3);
        assert!((offsets[0] - 0.5).abs() < 1e-9);
        assert!((offsets[1] - 1.5).abs() < 1e-9);
        assert!((offsets[2] - 2.5).abs() < 1e-9);

        let offsets = offsets_in_points(2.5);
        assert_eq!(offsets.len(), 3);
        assert!((offsets[2] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn dashes_cover_the_edge_and_stop_at_its_end() {
        let segments = dash_segments((0.0, 0.0), (10.0, 0.0), 3.0, 1.0);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], ((0.0, 0.0), (3.0, 0.0)));
        assert_eq!(segments[1], ((4.0, 0.0), (7.0, 0.0)));
        assert_eq!(segments[2], ((8.0, 0.0), (10.0, 0.0)));
    }

    #[test]
    fn vertical_dashes_follow_the_edge() {
        let segments = dash_segments((5.0, 0.0), (5.0, 4.0), 2.0, 2.0);
        assert_eq!(segments, vec![((5.0, 0.0), (5.0, 2.0))]);
    }

    #[test]
    fn degenerate_dashes_draw_nothing() {
        assert!(dash_segments((0.0, 0.0), (0.0, 0.0), 3.0, 1.0).is_empty());
        assert!(dash_segments((0.0, 0.0), (5.0, 0.0), 0.0, 1.0).is_empty());
    }
}

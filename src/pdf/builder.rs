use super::fonts::{wrap_text, Font, LINE_HEIGHT};
use crate::core::PdfConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const TEXT: Color = Color(0x11, 0x18, 0x27);
    pub const GRAY: Color = Color(0x6B, 0x72, 0x80);
    pub const LIGHT_GRAY: Color = Color(0xF3, 0xF4, 0xF6);
    pub const STRIPE: Color = Color(0xFA, 0xFA, 0xFA);

    pub fn components(&self) -> [f32; 3] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub color: Color,
}

impl TextStyle {
    pub fn new(font: Font, size: f32, color: Color) -> Self {
        TextStyle { font, size, color }
    }
}

/// A drawing primitive in top-down page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Color,
    },
    /// A single line of text; `x` is already adjusted for alignment and `y`
    /// is the top of the line box.
    Text {
        x: f32,
        y: f32,
        style: TextStyle,
        text: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|element| match element {
            Element::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn rects(&self) -> impl Iterator<Item = (f32, f32, f32, f32, Color)> + '_ {
        self.elements.iter().filter_map(|element| match element {
            Element::Rect { x, y, width, height, fill } => Some((*x, *y, *width, *height, *fill)),
            _ => None,
        })
    }
}

/// Where the next block goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCursor {
    pub y: f32,
    pub page: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    OnPage,
    NeedsNewPage,
}

fn aligned_x(line: &str, x: f32, width: f32, align: Align, style: TextStyle) -> f32 {
    let line_width = style.font.text_width(line, style.size);
    match align {
        Align::Left => x,
        Align::Center => x + (width - line_width) / 2.0,
        Align::Right => x + width - line_width,
    }
}

/// Paginated canvas. Starts on page 0 with the cursor at the top margin.
pub struct PageBuilder {
    config: PdfConfig,
    pages: Vec<Page>,
    cursor: PageCursor,
}

impl PageBuilder {
    pub fn new(config: PdfConfig) -> Self {
        let top = config.margin.top;
        PageBuilder {
            config,
            pages: vec![Page::default()],
            cursor: PageCursor { y: top, page: 0 },
        }
    }

    pub fn config(&self) -> &PdfConfig {
        &self.config
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    pub fn move_to(&mut self, y: f32) -> &mut Self {
        self.cursor.y = y;
        self
    }

    /// Whether a block of `height` placed at `y` would cross the bottom reserve.
    pub fn state_for(&self, y: f32, height: f32) -> PageState {
        if y + height > self.config.content_limit() {
            PageState::NeedsNewPage
        } else {
            PageState::OnPage
        }
    }

    pub fn add_page(&mut self) -> &mut Self {
        self.pages.push(Page::default());
        self.cursor = PageCursor {
            y: self.config.margin.top,
            page: self.pages.len() - 1,
        };
        self
    }

    /// Reserve `height` at the cursor, breaking to a fresh page first when
    /// it does not fit. Returns the y where the block starts.
    pub fn reserve(&mut self, height: f32) -> f32 {
        if self.state_for(self.cursor.y, height) == PageState::NeedsNewPage {
            self.add_page();
        }
        self.cursor.y
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: Color) -> &mut Self {
        self.current_page().elements.push(Element::Rect { x, y, width, height, fill });
        self
    }

    /// Single unwrapped line starting at `x`.
    pub fn text(&mut self, text: &str, x: f32, y: f32, style: TextStyle) -> &mut Self {
        self.current_page().elements.push(Element::Text {
            x,
            y,
            style,
            text: text.to_string(),
        });
        self
    }

    /// Text wrapped and aligned inside a column of `width`. Returns the
    /// height consumed.
    pub fn text_box(&mut self, text: &str, x: f32, y: f32, width: f32, align: Align, style: TextStyle) -> f32 {
        let line_height = style.size * LINE_HEIGHT;
        let lines = wrap_text(text, style.font, style.size, width);
        for (i, line) in lines.iter().enumerate() {
            let line_x = aligned_x(line, x, width, align, style);
            self.text(line, line_x, y + i as f32 * line_height, style);
        }
        lines.len() as f32 * line_height
    }

    /// Wrapped text starting at the cursor. Each line that would cross the
    /// bottom reserve continues at the top of a fresh page. The cursor ends
    /// below the last line.
    pub fn flow_text(&mut self, text: &str, x: f32, width: f32, align: Align, style: TextStyle) -> &mut Self {
        let line_height = style.size * LINE_HEIGHT;
        for line in wrap_text(text, style.font, style.size, width) {
            let y = self.reserve(line_height);
            let line_x = aligned_x(&line, x, width, align, style);
            self.text(&line, line_x, y, style);
            self.cursor.y = y + line_height;
        }
        self
    }

    fn current_page(&mut self) -> &mut Page {
        let index = self.cursor.page;
        &mut self.pages[index]
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn finish(self) -> Vec<Page> {
        self.pages
    }
}

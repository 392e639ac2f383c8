//! Drawing surfaces
//!
//! Rendering code paints through the [`Canvas`] trait: rectangle fills,
//! vertical pixel spans and text. The window system sits behind
//! [`Display`], which adds resizing and publishing of painted regions.
//!
//! [`Framebuffer`] is a plain pixel buffer addressed by row stride and
//! pixel size, with the channel order a property of its
//! [`PixelFormat`]. [`MemoryDisplay`] wraps one and records every
//! publish, which is enough for a headless run and for tests.

use crate::error::DisplayError;
use crate::layout::Rect;
use crate::render::color::Color;

/// Byte order of the colour channels within a pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

/// Layout of one pixel in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    pub order: ChannelOrder,
    /// At least 3; bytes past the colour channels are left untouched
    pub bytes_per_pixel: usize,
}

impl PixelFormat {
    /// 32-bit little-endian XRGB, as most window systems hand out
    pub const BGRX32: PixelFormat = PixelFormat {
        order: ChannelOrder::Bgr,
        bytes_per_pixel: 4,
    };

    /// Packed 24-bit RGB
    pub const RGB24: PixelFormat = PixelFormat {
        order: ChannelOrder::Rgb,
        bytes_per_pixel: 3,
    };

    /// Write `color` into the first three bytes of `pixel`
    #[inline]
    pub fn encode(&self, color: Color, pixel: &mut [u8]) {
        match self.order {
            ChannelOrder::Rgb => {
                pixel[0] = color.r;
                pixel[1] = color.g;
                pixel[2] = color.b;
            }
            ChannelOrder::Bgr => {
                pixel[0] = color.b;
                pixel[1] = color.g;
                pixel[2] = color.r;
            }
        }
    }

    pub fn decode(&self, pixel: &[u8]) -> Color {
        match self.order {
            ChannelOrder::Rgb => Color::new(pixel[0], pixel[1], pixel[2]),
            ChannelOrder::Bgr => Color::new(pixel[2], pixel[1], pixel[0]),
        }
    }
}

/// Text faces used by the interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// Large elapsed-time clock
    Clock,
    /// Tenths of a second beside the clock
    Deci,
    /// Listing text
    Normal,
    /// Oblique, for annotations
    Emphasis,
    /// Bold, for deck titles
    Big,
    /// Small monospace, for status and tokens
    Detail,
}

impl Font {
    /// Point size
    pub fn size(self) -> i32 {
        match self {
            Font::Clock => 32,
            Font::Deci => 20,
            Font::Normal | Font::Emphasis => 10,
            Font::Big => 14,
            Font::Detail => 9,
        }
    }

    /// Height of one line of this font, in pixels
    pub fn line_space(self) -> i32 {
        match self {
            Font::Clock => 40,
            Font::Deci => 26,
            Font::Normal | Font::Emphasis => 15,
            Font::Big => 19,
            Font::Detail => 12,
        }
    }

    /// Horizontal advance of one character cell
    pub fn advance(self) -> i32 {
        (self.size() * 3 + 4) / 5
    }
}

/// Something that can be painted on
pub trait Canvas {
    fn width(&self) -> i32;
    fn height(&self) -> i32;

    /// Fill a rectangle; parts outside the canvas are clipped
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Fill `len` pixels downwards from `(x, y)`; clipped
    fn fill_span(&mut self, x: i32, y: i32, len: i32, color: Color);

    /// Draw `text` into `rect`, filling the unused part of `rect` with
    /// `bg`, and return the width the text consumed
    fn draw_text(&mut self, rect: Rect, text: &str, font: Font, fg: Color, bg: Color) -> i32;
}

/// A window (or stand-in) that owns a canvas
pub trait Display: Send + 'static {
    type Canvas: Canvas;

    fn canvas(&mut self) -> &mut Self::Canvas;

    /// Reallocate for a new window size
    fn resize(&mut self, width: i32, height: i32) -> Result<(), DisplayError>;

    /// Make the painted contents of `rect` visible
    fn publish(&mut self, rect: Rect);
}

/// Pixel buffer with explicit stride and format
pub struct Framebuffer {
    pixels: Vec<u8>,
    width: i32,
    height: i32,
    pitch: usize,
    format: PixelFormat,
}

impl Framebuffer {
    pub fn new(width: i32, height: i32, format: PixelFormat) -> Result<Self, DisplayError> {
        if width <= 0 || height <= 0 || format.bytes_per_pixel < 3 {
            return Err(DisplayError::InvalidSize { width, height });
        }

        let pitch = width as usize * format.bytes_per_pixel;
        let len = pitch
            .checked_mul(height as usize)
            .ok_or_else(|| DisplayError::Allocation(format!("{}x{}", width, height)))?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|e| DisplayError::Allocation(e.to_string()))?;
        pixels.resize(len, 0);

        Ok(Self {
            pixels,
            width,
            height,
            pitch,
            format,
        })
    }

    /// Bytes per row
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Colour at `(x, y)`, or `None` outside the buffer
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        let at = y as usize * self.pitch + x as usize * self.format.bytes_per_pixel;
        Some(self.format.decode(&self.pixels[at..at + 3]))
    }
}

impl Canvas for Framebuffer {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(r) = rect.intersect(&Rect::new(0, 0, self.width, self.height)) else {
            return;
        };

        let bpp = self.format.bytes_per_pixel;
        for y in r.y..r.bottom() {
            let row = y as usize * self.pitch;
            let start = row + r.x as usize * bpp;
            let end = row + r.right() as usize * bpp;
            for pixel in self.pixels[start..end].chunks_exact_mut(bpp) {
                self.format.encode(color, pixel);
            }
        }
    }

    fn fill_span(&mut self, x: i32, y: i32, len: i32, color: Color) {
        if x < 0 || x >= self.width || len <= 0 {
            return;
        }

        let y0 = y.max(0);
        let y1 = (y + len).min(self.height);
        let bpp = self.format.bytes_per_pixel;
        let mut at = y0 as usize * self.pitch + x as usize * bpp;

        for _ in y0..y1 {
            self.format.encode(color, &mut self.pixels[at..at + bpp]);
            at += self.pitch;
        }
    }

    fn draw_text(&mut self, rect: Rect, text: &str, font: Font, fg: Color, bg: Color) -> i32 {
        if !rect.is_drawable() {
            return 0;
        }

        self.fill_rect(rect, bg);

        // Without a font rasteriser each character is drawn as a solid
        // glyph cell, which keeps widths and clipping realistic
        let advance = font.advance();
        let glyph_h = (font.size() * 3 / 4).min(rect.h);
        let mut used = 0;

        for c in text.chars() {
            if used + advance > rect.w {
                break;
            }
            if !c.is_whitespace() {
                let cell = Rect::new(rect.x + used, rect.y + (rect.h - glyph_h) / 2, advance - 1, glyph_h);
                self.fill_rect(cell, fg);
            }
            used += advance;
        }

        used
    }
}

/// Headless display: a framebuffer plus a log of published regions
pub struct MemoryDisplay {
    framebuffer: Framebuffer,
    published: Vec<Rect>,
    resizes: usize,
}

impl MemoryDisplay {
    pub fn new(width: i32, height: i32, format: PixelFormat) -> Result<Self, DisplayError> {
        Ok(Self {
            framebuffer: Framebuffer::new(width, height, format)?,
            published: Vec::new(),
            resizes: 0,
        })
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Every region published so far, in order
    pub fn published(&self) -> &[Rect] {
        &self.published
    }

    /// Number of successful resizes
    pub fn resizes(&self) -> usize {
        self.resizes
    }
}

impl Display for MemoryDisplay {
    type Canvas = Framebuffer;

    fn canvas(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    fn resize(&mut self, width: i32, height: i32) -> Result<(), DisplayError> {
        self.framebuffer = Framebuffer::new(width, height, self.framebuffer.format())?;
        self.resizes += 1;
        Ok(())
    }

    fn publish(&mut self, rect: Rect) {
        self.published.push(rect);
    }
}

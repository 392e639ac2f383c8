//! Waveform meters
//!
//! Each deck shows three strips: a closeup centred on the playhead, the
//! whole-track overview, and a second closeup mirrored beneath it. All
//! three are drawn column by column as vertical spans, so the only
//! thing they need from the destination is [`Canvas::fill_span`].
//!
//! Amplitudes are `0..=255` and scale to `value * h / 256` pixels.

use crate::constants::{MAX_METER_SCALE, METER_WARNING_TIME};
use crate::deck::Track;
use crate::layout::{from_top, split, Rect};
use crate::render::color::{hsv, progress_hue, Color, Palette};
use crate::render::surface::Canvas;

/// Zoom level of the closeup meters: `2^scale` samples per pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterScale(u32);

impl MeterScale {
    /// Clamped to `0..=MAX_METER_SCALE`
    pub fn new(scale: u32) -> Self {
        Self(scale.min(MAX_METER_SCALE))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Fewer samples per pixel; stops at zero
    pub fn zoom_in(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }

    /// More samples per pixel; stops at the maximum
    pub fn zoom_out(&mut self) {
        self.0 = (self.0 + 1).min(MAX_METER_SCALE);
    }

    /// Samples represented by one column
    pub fn samples_per_pixel(self) -> i64 {
        1 << self.0
    }
}

impl Default for MeterScale {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_METER_SCALE)
    }
}

/// Paint a column as a dim centre band between two bright bands
///
/// The centre band is `height` pixels tall, centred vertically.
fn centred_column<C: Canvas + ?Sized>(
    canvas: &mut C,
    x: i32,
    y: i32,
    h: i32,
    height: i32,
    col: Color,
    fade: u32,
) {
    let upper = (height + h) / 2;
    let lower = (h - height) / 2;

    canvas.fill_span(x, y, h - upper, col);
    canvas.fill_span(x, y + h - upper, upper - lower, col.dim(fade));
    canvas.fill_span(x, y + h - lower, lower, col);
}

/// Paint a column as a bar of `height` pixels at full brightness
/// against a dimmed remainder; the bar rises from the bottom, or hangs
/// from the top when `rev` is set
fn bar_column<C: Canvas + ?Sized>(
    canvas: &mut C,
    x: i32,
    y: i32,
    h: i32,
    height: i32,
    col: Color,
    fade: u32,
    rev: bool,
) {
    if rev {
        canvas.fill_span(x, y, height, col);
        canvas.fill_span(x, y + height, h - height, col.dim(fade));
    } else {
        canvas.fill_span(x, y, h - height, col.dim(fade));
        canvas.fill_span(x, y + h - height, height, col);
    }
}

/// Draw the whole track, with the playhead at sample `position`
pub fn draw_overview<C: Canvas + ?Sized>(
    canvas: &mut C,
    rect: Rect,
    track: &Track,
    position: i64,
    palette: &Palette,
) {
    if !rect.is_drawable() {
        return;
    }

    let (w, h) = (rect.w as i64, rect.h);
    let length = track.length() as i64;

    if length == 0 {
        canvas.fill_rect(rect, palette.background);
        return;
    }

    let current = (position as i128 * w as i128 / length as i128) as i64;
    let warning = position > length - track.rate() as i64 * METER_WARNING_TIME;

    let mut base = if warning {
        palette.warn
    } else {
        hsv(progress_hue(position as f64 / length as f64), 1.0, 1.0)
    };
    let mut needle = palette.needle;

    if track.is_importing() {
        base = base.dim(1);
        needle = needle.dim(1);
    }

    for c in 0..w {
        let sp = (length as i128 * c as i128 / w as i128) as i64;
        let height = track.overview(sp) as i32 * h / 256;

        let (col, fade) = if c == current {
            (needle, 1)
        } else if c < current {
            (base, 1)
        } else {
            (base, 3)
        };

        centred_column(canvas, rect.x + c as i32, rect.y, h, height, col, fade);
    }
}

/// Draw the zoomed meter centred on the playhead
///
/// With `rev` set the bars hang from the top edge, so a pair of
/// closeups above and below the overview mirror each other.
pub fn draw_closeup<C: Canvas + ?Sized>(
    canvas: &mut C,
    rect: Rect,
    track: &Track,
    position: i64,
    scale: MeterScale,
    rev: bool,
    palette: &Palette,
) {
    if !rect.is_drawable() {
        return;
    }

    let length = track.length() as i64;
    if length == 0 {
        canvas.fill_rect(rect, palette.background);
        return;
    }

    let (w, h) = (rect.w as i64, rect.h);
    let block = scale.samples_per_pixel();
    let start = position - position.rem_euclid(block);
    let grid = track.beat_interval.filter(|i| *i > 0.0);

    for c in 0..w {
        let sp = start.saturating_add((c - w / 2).saturating_mul(block));
        let inside = sp >= 0 && sp < length;

        let height = if inside {
            track.fine(sp) as i32 * h / 256
        } else {
            0
        };

        let (col, fade) = if c == w / 2 {
            (palette.needle, 1)
        } else if !inside {
            (palette.outside, 1)
        } else if grid
            .map(|interval| (sp as f64 - track.beat_offset).rem_euclid(interval) < block as f64)
            .unwrap_or(false)
        {
            (palette.beat, 1)
        } else {
            (hsv(progress_hue(sp as f64 / length as f64), 1.0, 1.0), 3)
        };

        bar_column(canvas, rect.x + c as i32, rect.y, h, height, col, fade, rev);
    }
}

/// Draw the closeup / overview / mirrored closeup stack for one deck
pub fn draw_meters<C: Canvas + ?Sized>(
    canvas: &mut C,
    rect: Rect,
    track: &Track,
    position: i64,
    scale: MeterScale,
    palette: &Palette,
) {
    let h = rect.h;
    let (upper, rest) = split(rect, from_top(2 * h / 5, 0));
    let (overview, lower) = split(rest, from_top(h / 5, 0));

    draw_closeup(canvas, upper, track, position, scale, false, palette);
    draw_overview(canvas, overview, track, position, palette);
    draw_closeup(canvas, lower, track, position, scale, true, palette);
}

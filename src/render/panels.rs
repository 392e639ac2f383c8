//! Painting of the interface regions: decks, status line and library
//!
//! Everything here is a pure function of the state passed in. The
//! caller holds the rig gate for deck state; the selector and status
//! belong to the render thread.

use crate::config::DeckArrangement;
use crate::constants::{
    BORDER, BPM_WIDTH, CURSOR_WIDTH, HALF_SPACER, LIBRARY_MIN_WIDTH, RESULTS_ARTIST_WIDTH,
    SCROLLBAR_SIZE, SEARCH_HEIGHT, SORT_WIDTH, SPACER, TOKEN_SPACE,
};
use crate::deck::Deck;
use crate::layout::{columns, count_rows, from_left, from_right, from_top, rows, shrink, split, Rect};
use crate::library::{Library, Record, Scroll, Selector, SortOrder};
use crate::render::color::{bpm_hue, hsv, Color, Palette};
use crate::render::meter::{draw_meters, MeterScale};
use crate::render::surface::{Canvas, Font};
use crate::status::StatusLevel;

/// Text in a coloured box, inset from a background frame
pub fn draw_token<C: Canvas + ?Sized>(
    canvas: &mut C,
    rect: Rect,
    text: &str,
    text_col: Color,
    col: Color,
    bg_col: Color,
) {
    canvas.fill_rect(rect, bg_col);
    canvas.draw_text(shrink(rect, TOKEN_SPACE), text, Font::Detail, text_col, col);
}

/// Tempos outside this range are treated as nonsense and not shown
pub fn show_bpm(bpm: f64) -> bool {
    bpm > 20.0 && bpm < 400.0
}

/// Tempo readout; compatible tempos share a hue
pub fn draw_bpm<C: Canvas + ?Sized>(canvas: &mut C, rect: Rect, bpm: f64, bg_col: Color, palette: &Palette) {
    let text = format!("{:5.1}", bpm);

    if !(60.0..=240.0).contains(&bpm) {
        draw_token(canvas, rect, &text, palette.detail, bg_col, bg_col);
        return;
    }

    draw_token(canvas, rect, &text, palette.text, hsv(bpm_hue(bpm), 1.0, 0.3), bg_col);
}

/// Tempo readout, or a blank of the same size
pub fn draw_bpm_field<C: Canvas + ?Sized>(
    canvas: &mut C,
    rect: Rect,
    bpm: Option<f64>,
    bg_col: Color,
    palette: &Palette,
) {
    match bpm.filter(|b| show_bpm(*b)) {
        Some(bpm) => draw_bpm(canvas, rect, bpm, bg_col, palette),
        None => canvas.fill_rect(rect, bg_col),
    }
}

/// `mm:ss.d`, clamped at zero
pub fn format_time(seconds: f64) -> String {
    let tenths = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 10.0).floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}.{}", tenths / 600, (tenths / 10) % 60, tenths % 10)
}

/// Pitch as a signed percentage away from normal speed
pub fn format_pitch(pitch: f64) -> String {
    format!("{:+.1}%", (pitch - 1.0) * 100.0)
}

fn draw_title<C: Canvas + ?Sized>(canvas: &mut C, rect: Rect, deck: &Deck, palette: &Palette) {
    let (text, bpm) = split(rect, from_right(BPM_WIDTH, SPACER));
    draw_bpm_field(canvas, bpm, deck.bpm(), palette.background, palette);

    let Some(record) = deck.record() else {
        canvas.draw_text(text, "No track loaded", Font::Emphasis, palette.detail, palette.background);
        return;
    };

    let mut rest = text;
    if !record.artist.is_empty() {
        let used = canvas.draw_text(rest, &record.artist, Font::Big, palette.text, palette.background);
        let (_, after) = split(rest, from_left(used, SPACER));
        canvas.fill_rect(Rect::new(rest.x + used, rest.y, SPACER, rest.h), palette.background);
        rest = after;
    }
    canvas.draw_text(rest, &record.title, Font::Normal, palette.text, palette.background);
}

fn draw_clocks<C: Canvas + ?Sized>(canvas: &mut C, rect: Rect, deck: &Deck, palette: &Palette) {
    let track = deck.track();
    let elapsed = deck.elapsed();
    let remaining = track.duration() - elapsed;

    let (clocks, rest) = split(rect, from_left(rect.w / 2, SPACER));

    let used = canvas.draw_text(clocks, &format_time(elapsed), Font::Deci, palette.elapsed, palette.background);
    let (_, right) = split(clocks, from_left(used, HALF_SPACER));
    canvas.fill_rect(Rect::new(clocks.x + used, clocks.y, HALF_SPACER, clocks.h), palette.background);

    let warn = track.length() > 0 && remaining < crate::constants::METER_WARNING_TIME as f64;
    let col = if warn { palette.warn } else { palette.detail };
    canvas.draw_text(right, &format!("-{}", format_time(remaining)), Font::Deci, col, palette.background);

    let (pitch, indicator) = split(rest, from_right(BPM_WIDTH, SPACER));
    canvas.draw_text(pitch, &format_pitch(deck.player.pitch), Font::Detail, palette.text, palette.background);

    if deck.player.timecode_control() {
        draw_token(canvas, indicator, "TC", palette.text, palette.selected, palette.background);
    } else {
        canvas.fill_rect(indicator, palette.background);
    }
}

/// One deck: title line, clocks, then the meter stack
pub fn draw_deck<C: Canvas + ?Sized>(
    canvas: &mut C,
    rect: Rect,
    deck: &Deck,
    scale: MeterScale,
    palette: &Palette,
) {
    let (title, rest) = split(rect, from_top(Font::Big.line_space(), HALF_SPACER));
    let (clocks, meters) = split(rest, from_top(Font::Deci.line_space(), HALF_SPACER));

    if title.is_drawable() {
        draw_title(canvas, title, deck, palette);
    }
    if clocks.is_drawable() {
        draw_clocks(canvas, clocks, deck, palette);
    }

    if meters.is_drawable() {
        draw_meters(canvas, meters, deck.track(), deck.position_samples(), scale, palette);
    }
}

/// Every deck, side by side or stacked
pub fn draw_decks<C: Canvas + ?Sized>(
    canvas: &mut C,
    rect: Rect,
    decks: &[Deck],
    arrangement: DeckArrangement,
    scale: MeterScale,
    palette: &Palette,
) {
    let n = decks.len() as i32;
    let mut rest = rect;

    for (d, deck) in decks.iter().enumerate() {
        let edge = match arrangement {
            DeckArrangement::Horizontal => columns(d as i32, n, BORDER),
            DeckArrangement::Vertical => rows(d as i32, n, BORDER),
        };
        let (piece, remain) = split(rest, edge);
        rest = remain;

        if piece.is_drawable() {
            draw_deck(canvas, piece, deck, scale, palette);
        }
    }
}

/// The one-line status bar
pub fn draw_status<C: Canvas + ?Sized>(
    canvas: &mut C,
    rect: Rect,
    level: StatusLevel,
    text: &str,
    palette: &Palette,
) {
    if level >= StatusLevel::Alert {
        canvas.draw_text(rect, text, Font::Detail, palette.text, palette.warn.dim(2));
    } else {
        canvas.draw_text(rect, text, Font::Detail, palette.detail, palette.background);
    }
}

fn matches_label(entries: usize) -> String {
    match entries {
        0 => "no matches".to_string(),
        1 => "1 match".to_string(),
        n => format!("{} matches", n),
    }
}

fn draw_search<C: Canvas + ?Sized>(canvas: &mut C, rect: Rect, selector: &Selector, palette: &Palette) {
    let (gap, text) = split(rect, from_left(SCROLLBAR_SIZE, SPACER));
    canvas.fill_rect(Rect::new(gap.x, gap.y, gap.w + SPACER, gap.h), palette.background);

    let used = canvas.draw_text(text, selector.search(), Font::Normal, palette.text, palette.background);

    let cursor = Rect::new(text.x + used, text.y, CURSOR_WIDTH, text.h);
    canvas.fill_rect(cursor, palette.cursor);

    let (_, counter) = split(text, from_left(used + CURSOR_WIDTH, SPACER));
    let label = matches_label(selector.view_listing().len());
    canvas.draw_text(counter, &label, Font::Emphasis, palette.detail, palette.background);
}

/// A vertical bar showing which part of a list is on screen
pub fn draw_scroll_bar<C: Canvas + ?Sized>(canvas: &mut C, rect: Rect, scroll: &Scroll, palette: &Palette) {
    canvas.fill_rect(rect, palette.selected.dim(1));

    if scroll.entries > 0 {
        let entries = scroll.entries as i64;
        let y = rect.y + (rect.h as i64 * scroll.offset as i64 / entries) as i32;
        let h = (rect.h as i64 * scroll.lines.min(scroll.entries) as i64 / entries) as i32;
        canvas.fill_rect(Rect::new(rect.x, y, rect.w, h), palette.selected);
    }
}

fn draw_crates<C: Canvas + ?Sized>(
    canvas: &mut C,
    rect: Rect,
    library: &Library,
    scroll: &Scroll,
    sort: SortOrder,
    palette: &Palette,
) {
    let (bar, mut bottom) = split(rect, from_left(SCROLLBAR_SIZE, SPACER));
    draw_scroll_bar(canvas, bar, scroll, palette);
    canvas.fill_rect(Rect::new(bar.right(), rect.y, SPACER, rect.h), palette.background);

    let line = Font::Normal.line_space();

    for (n, krate) in library.crates().iter().enumerate().skip(scroll.offset) {
        let (top, remain) = split(bottom, from_top(line, 0));
        if remain.h < 0 {
            break;
        }
        bottom = remain;

        let col = if krate.is_fixed { palette.detail } else { palette.text };

        if scroll.selected != Some(n) {
            canvas.draw_text(top, &krate.name, Font::Normal, col, palette.background);
            continue;
        }

        let (name, token) = split(top, from_right(SORT_WIDTH, 0));
        canvas.draw_text(name, &krate.name, Font::Normal, col, palette.selected);

        let token_col = match sort {
            SortOrder::Artist => palette.artist,
            SortOrder::Bpm => palette.bpm,
            SortOrder::Playlist => palette.selected,
        };
        draw_token(canvas, token, sort.token(), palette.text, token_col, palette.selected);
    }

    canvas.fill_rect(bottom, palette.background);
}

fn draw_record<C: Canvas + ?Sized>(
    canvas: &mut C,
    rect: Rect,
    record: &Record,
    artist_width: i32,
    col: Color,
    palette: &Palette,
) {
    let (bpm, right) = split(rect, from_left(BPM_WIDTH, 0));
    draw_bpm_field(canvas, bpm, record.bpm, col, palette);

    let (gap, right) = split(right, from_left(SPACER, 0));
    canvas.fill_rect(gap, col);

    let (artist, right) = split(right, from_left(artist_width, 0));
    canvas.draw_text(artist, &record.artist, Font::Normal, palette.text, col);

    let (gap, title) = split(right, from_left(SPACER, 0));
    canvas.fill_rect(gap, col);
    canvas.draw_text(title, &record.title, Font::Normal, palette.text, col);
}

fn draw_listing<C: Canvas + ?Sized>(
    canvas: &mut C,
    rect: Rect,
    listing: &[std::sync::Arc<Record>],
    scroll: &Scroll,
    palette: &Palette,
) {
    let (bar, mut bottom) = split(rect, from_left(SCROLLBAR_SIZE, SPACER));
    draw_scroll_bar(canvas, bar, scroll, palette);
    canvas.fill_rect(Rect::new(bar.right(), rect.y, SPACER, rect.h), palette.background);

    let artist_width = (bottom.w / 2).min(RESULTS_ARTIST_WIDTH);
    let line = Font::Normal.line_space();

    for (n, record) in listing.iter().enumerate().skip(scroll.offset) {
        let (top, remain) = split(bottom, from_top(line, 0));
        if remain.h < 0 {
            break;
        }
        bottom = remain;

        let col = if scroll.selected == Some(n) {
            palette.selected
        } else {
            palette.background
        };
        draw_record(canvas, top, record, artist_width, col, palette);
    }

    canvas.fill_rect(bottom, palette.background);
}

/// Search line above the crate and record lists
///
/// Tells the selector how many lines are visible, so paging moves by a
/// screenful.
pub fn draw_library<C: Canvas + ?Sized>(canvas: &mut C, rect: Rect, selector: &mut Selector, palette: &Palette) {
    let (search, lists) = split(rect, from_top(SEARCH_HEIGHT, SPACER));
    canvas.fill_rect(Rect::new(rect.x, search.bottom(), rect.w, SPACER), palette.background);
    draw_search(canvas, search, selector, palette);

    selector.set_lines(count_rows(lists, Font::Normal.line_space()));

    let (crates, records) = split(lists, columns(0, 4, SPACER));

    if crates.w > LIBRARY_MIN_WIDTH {
        canvas.fill_rect(Rect::new(crates.right(), lists.y, SPACER, lists.h), palette.background);
        draw_listing(canvas, records, selector.view_listing(), selector.records(), palette);
        draw_crates(canvas, crates, selector.library(), selector.crates(), selector.sort(), palette);
    } else {
        draw_listing(canvas, lists, selector.view_listing(), selector.records(), palette);
    }
}

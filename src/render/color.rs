//! Colour model and interface palette

/// An opaque 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// From channel intensities in `0.0..=1.0`
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        let c = |v: f64| (v.clamp(0.0, 1.0) * 255.0) as u8;
        Self::new(c(r), c(g), c(b))
    }

    /// Darken by shifting each channel right `n` bits
    pub fn dim(self, n: u32) -> Self {
        let n = n.min(7);
        Self::new(self.r >> n, self.g >> n, self.b >> n)
    }
}

/// Colour from hue in degrees and saturation/value in `0.0..=1.0`
///
/// Standard six-sector conversion. Hues outside `0..360` wrap.
pub fn hsv(h: f64, s: f64, v: f64) -> Color {
    if s <= 0.0 {
        return Color::rgb(v, v, v);
    }

    let h = h.rem_euclid(360.0) / 60.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector as u32 {
        0 => Color::rgb(v, t, p),
        1 => Color::rgb(q, v, p),
        2 => Color::rgb(p, v, t),
        3 => Color::rgb(p, q, v),
        4 => Color::rgb(t, p, v),
        _ => Color::rgb(v, p, q),
    }
}

/// Hue for a tempo readout: one full turn each time the tempo doubles,
/// so compatible tempos share a colour
pub fn bpm_hue(bpm: f64) -> f64 {
    let f = bpm.log2();
    (f - f.floor()) * 360.0
}

/// Hue for a point `progress` (`0.0..=1.0`) of the way through a track
///
/// Runs from blue at the start towards red at the end.
pub fn progress_hue(progress: f64) -> f64 {
    220.0 * (1.0 - progress.clamp(0.0, 1.0))
}

/// Every colour the interface draws with
#[derive(Debug, Clone)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub warn: Color,
    pub elapsed: Color,
    pub cursor: Color,
    pub selected: Color,
    pub detail: Color,
    pub needle: Color,
    pub artist: Color,
    pub bpm: Color,
    pub beat: Color,
    /// Closeup columns beyond either end of the track
    pub outside: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::new(0, 0, 0),
            text: Color::new(224, 224, 224),
            warn: Color::new(192, 64, 0),
            elapsed: Color::new(0, 32, 255),
            cursor: Color::new(192, 0, 0),
            selected: Color::new(0, 48, 64),
            detail: Color::new(128, 128, 128),
            needle: Color::new(255, 255, 255),
            artist: Color::new(16, 64, 0),
            bpm: Color::new(64, 16, 0),
            beat: Color::new(255, 200, 0),
            outside: hsv(220.0, 0.5, 0.25),
        }
    }
}

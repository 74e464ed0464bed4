use crate::chain::Point;
use anyhow::Context;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

/// Straight (non-premultiplied) color with `a` in 0..=1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Rgba {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: f32,
}

impl Rgba {
    pub(crate) fn rgb(self) -> Rgb {
        Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

/// Line strokes are always round-capped, so consecutive links blend at the joints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Stroke {
    pub(crate) color: Rgb,
    pub(crate) width: f32,
}

/// What the tentacle needs from whatever it is drawn on.
pub(crate) trait Surface {
    /// Width and height in surface pixels.
    fn size(&self) -> (f32, f32);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba);
    fn stroke_line(&mut self, from: Point, to: Point, stroke: Stroke);
}

/* -----------------------------
   Software canvas (braille sub-pixels)
------------------------------ */

// Below this radius diagonal one-pixel strokes break into dots.
const MIN_STROKE_RADIUS: f32 = 0.75;

// How far a channel must sit from the background to count as a braille dot.
const INK_THRESHOLD: i32 = 24;

pub(crate) struct PixelCanvas {
    pub(crate) w: u32,
    pub(crate) h: u32,
    pub(crate) px: Vec<Rgb>,
    pub(crate) background: Rgb,
}

impl PixelCanvas {
    pub(crate) fn new(w: u32, h: u32, background: Rgb) -> Self {
        Self {
            w,
            h,
            px: vec![background; (w as usize) * (h as usize)],
            background,
        }
    }

    pub(crate) fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    pub(crate) fn get(&self, x: u32, y: u32) -> Rgb {
        self.px[self.idx(x, y)]
    }

    fn is_ink(&self, p: Rgb) -> bool {
        let bg = self.background;
        let d = |a: u8, b: u8| (a as i32 - b as i32).abs();
        d(p.r, bg.r).max(d(p.g, bg.g)).max(d(p.b, bg.b)) >= INK_THRESHOLD
    }

    fn blend_over(&mut self, x: u32, y: u32, src: Rgba) {
        let i = self.idx(x, y);
        let dst = self.px[i];
        let a = src.a.clamp(0.0, 1.0);
        let mix = |s: u8, d: u8| -> u8 {
            let out = d as f32 + (s as f32 - d as f32) * a;
            out.round().clamp(0.0, 255.0) as u8
        };
        self.px[i] = Rgb {
            r: mix(src.r, dst.r),
            g: mix(src.g, dst.g),
            b: mix(src.b, dst.b),
        };
    }

    /// Pixel span `[lo, hi)` covered by `[a, b]`, clipped to `0..limit`.
    fn span(a: f32, b: f32, limit: u32) -> (u32, u32) {
        let lo = a.floor().max(0.0);
        let hi = b.ceil().min(limit as f32);
        if lo >= hi {
            return (0, 0);
        }
        (lo as u32, hi as u32)
    }
}

impl Surface for PixelCanvas {
    fn size(&self) -> (f32, f32) {
        (self.w as f32, self.h as f32)
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        let (x0, x1) = Self::span(x, x + w, self.w);
        let (y0, y1) = Self::span(y, y + h, self.h);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_over(px, py, color);
            }
        }
    }

    fn stroke_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        let r = (stroke.width * 0.5).max(MIN_STROKE_RADIUS);
        let (x0, x1) = Self::span(from.x.min(to.x) - r, from.x.max(to.x) + r, self.w);
        let (y0, y1) = Self::span(from.y.min(to.y) - r, from.y.max(to.y) + r, self.h);

        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let len2 = dx * dx + dy * dy;

        for py in y0..y1 {
            for px in x0..x1 {
                let c = Point::new(px as f32 + 0.5, py as f32 + 0.5);
                // Clamping the projection to the segment gives the round caps.
                let t = if len2 > 0.0 {
                    (((c.x - from.x) * dx + (c.y - from.y) * dy) / len2).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let nearest = Point::new(from.x + dx * t, from.y + dy * t);
                if c.distance(nearest) <= r {
                    let i = self.idx(px, py);
                    self.px[i] = stroke.color;
                }
            }
        }
    }
}

/* -----------------------------
   Terminal cells
------------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn get(&self, x: u16, y: u16) -> Cell {
        self.cells[self.idx(x, y)]
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
}

/* -----------------------------
   Braille encoding: 2×4 pixels -> U+2800..U+28FF
------------------------------ */

fn braille_bit(dx: u32, dy: u32) -> u8 {
    // Dot mapping:
    // (0,0)=1 (0,1)=2 (0,2)=4 (0,3)=64
    // (1,0)=8 (1,1)=16 (1,2)=32 (1,3)=128
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

pub(crate) fn canvas_to_cells(canvas: &PixelCanvas, out: &mut CellBuffer, enable_color: bool) {
    let bg = if enable_color {
        let Rgb { r, g, b } = canvas.background;
        Color::Rgb { r, g, b }
    } else {
        Color::Black
    };

    for cy in 0..out.h as u32 {
        for cx in 0..out.w as u32 {
            let px0 = cx * 2;
            let py0 = cy * 4;

            let mut mask: u8 = 0;
            let mut sum_r: u32 = 0;
            let mut sum_g: u32 = 0;
            let mut sum_b: u32 = 0;
            let mut ink_count: u32 = 0;

            for dy in 0..4 {
                for dx in 0..2 {
                    let x = px0 + dx;
                    let y = py0 + dy;
                    if x >= canvas.w || y >= canvas.h {
                        continue;
                    }
                    let p = canvas.get(x, y);
                    if canvas.is_ink(p) {
                        mask |= braille_bit(dx, dy);
                        sum_r += p.r as u32;
                        sum_g += p.g as u32;
                        sum_b += p.b as u32;
                        ink_count += 1;
                    }
                }
            }

            let ch = char::from_u32(0x2800 + (mask as u32)).unwrap_or(' ');

            let fg = if enable_color && ink_count > 0 {
                Color::Rgb {
                    r: (sum_r / ink_count) as u8,
                    g: (sum_g / ink_count) as u8,
                    b: (sum_b / ink_count) as u8,
                }
            } else {
                Color::White
            };

            out.set(cx as u16, cy as u16, Cell { ch, fg, bg });
        }
    }
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
    }
}

/* -----------------------------
   Terminal host
------------------------------ */

/// Owns the screen for the lifetime of the program; dropping it restores
/// the terminal even when the frame loop bails out with an error.
pub(crate) struct Terminal {
    out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    margin_rows: u16,
    prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    pub(crate) canvas: PixelCanvas,
    force_full: bool,
}

impl Terminal {
    pub(crate) fn begin(margin_rows: u16, background: Rgb) -> anyhow::Result<Self> {
        let (cols, rows) = terminal::size().context("could not query terminal size")?;

        let mut out = io::stdout();
        terminal::enable_raw_mode().context("could not enable raw mode")?;
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            DisableLineWrap,
            Clear(ClearType::All)
        )?;

        let draw_rows = rows.saturating_sub(margin_rows);
        Ok(Self {
            out,
            cols,
            rows,
            margin_rows,
            prev: CellBuffer::new(cols, draw_rows),
            cur: CellBuffer::new(cols, draw_rows),
            // Braille: 2×4 pixels per cell
            canvas: PixelCanvas::new(cols as u32 * 2, draw_rows as u32 * 4, background),
            force_full: true,
        })
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        let draw_rows = r.saturating_sub(self.margin_rows);
        self.prev = CellBuffer::new(c, draw_rows);
        self.cur = CellBuffer::new(c, draw_rows);
        self.canvas = PixelCanvas::new(c as u32 * 2, draw_rows as u32 * 4, self.canvas.background);
        self.force_full = true;
        execute!(self.out, ResetColor, Clear(ClearType::All))?;
        Ok(true)
    }

    pub(crate) fn compose(&mut self, enable_color: bool) {
        canvas_to_cells(&self.canvas, &mut self.cur, enable_color);
    }

    pub(crate) fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        let diff_only = diff_only && !self.force_full;
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.cur.h {
            for x in 0..self.cur.w {
                let c = self.cur.get(x, y);
                if diff_only && c == self.prev.get(x, y) {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        self.force_full = false;
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            EndSynchronizedUpdate,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Rgb = Rgb { r: 17, g: 17, b: 17 };
    const CYAN: Rgb = Rgb { r: 0, g: 255, b: 255 };

    #[test]
    fn fade_moves_a_quarter_toward_fill() {
        let mut canvas = PixelCanvas::new(4, 4, Rgb { r: 255, g: 255, b: 255 });
        canvas.fill_rect(0.0, 0.0, 4.0, 4.0, Rgba { r: 17, g: 17, b: 17, a: 0.25 });
        // 255 + (17 - 255) * 0.25 = 195.5
        assert_eq!(canvas.get(2, 3), Rgb { r: 196, g: 196, b: 196 });
    }

    #[test]
    fn repeated_fades_settle_near_trail_color() {
        let mut canvas = PixelCanvas::new(2, 4, BG);
        canvas.px.fill(CYAN);
        for _ in 0..40 {
            canvas.fill_rect(0.0, 0.0, 2.0, 4.0, Rgba { r: 17, g: 17, b: 17, a: 0.25 });
        }
        for p in &canvas.px {
            assert!((p.r as i32 - 17).abs() <= 2);
            assert!((p.g as i32 - 17).abs() <= 2);
            assert!((p.b as i32 - 17).abs() <= 2);
            assert!(!canvas.is_ink(*p));
        }
    }

    #[test]
    fn fill_rect_clips_to_canvas() {
        let mut canvas = PixelCanvas::new(3, 3, BG);
        canvas.fill_rect(-10.0, -10.0, 100.0, 100.0, Rgba { r: 255, g: 0, b: 0, a: 1.0 });
        assert!(canvas.px.iter().all(|p| *p == Rgb { r: 255, g: 0, b: 0 }));
    }

    #[test]
    fn stroke_paints_endpoints_and_round_caps() {
        let mut canvas = PixelCanvas::new(32, 24, BG);
        canvas.stroke_line(
            Point::new(10.5, 10.5),
            Point::new(20.5, 10.5),
            Stroke { color: CYAN, width: 4.0 },
        );
        assert_eq!(canvas.get(10, 10), CYAN);
        assert_eq!(canvas.get(20, 10), CYAN);
        assert_eq!(canvas.get(15, 12), CYAN);
        // Caps reach one radius past the ends.
        assert_eq!(canvas.get(8, 10), CYAN);
        assert_eq!(canvas.get(22, 10), CYAN);
        assert_eq!(canvas.get(7, 10), BG);
        assert_eq!(canvas.get(23, 10), BG);
        assert_eq!(canvas.get(15, 14), BG);
    }

    #[test]
    fn thin_diagonal_stroke_is_connected() {
        let mut canvas = PixelCanvas::new(16, 16, BG);
        canvas.stroke_line(
            Point::new(1.5, 1.5),
            Point::new(12.5, 12.5),
            Stroke { color: CYAN, width: 1.0 },
        );
        for i in 1..=12 {
            assert_eq!(canvas.get(i, i), CYAN);
        }
    }

    #[test]
    fn stroke_outside_canvas_is_clipped() {
        let mut canvas = PixelCanvas::new(4, 4, BG);
        canvas.stroke_line(
            Point::new(-50.0, -50.0),
            Point::new(-40.0, -45.0),
            Stroke { color: CYAN, width: 3.0 },
        );
        assert!(canvas.px.iter().all(|p| *p == BG));
    }

    #[test]
    fn braille_full_and_empty_blocks() {
        let mut canvas = PixelCanvas::new(4, 4, BG);
        canvas.fill_rect(0.0, 0.0, 2.0, 4.0, Rgba { r: 0, g: 255, b: 255, a: 1.0 });
        let mut cells = CellBuffer::new(2, 1);
        canvas_to_cells(&canvas, &mut cells, true);

        let inked = cells.get(0, 0);
        assert_eq!(inked.ch, '\u{28FF}');
        assert_eq!(inked.fg, Color::Rgb { r: 0, g: 255, b: 255 });
        assert_eq!(inked.bg, Color::Rgb { r: 17, g: 17, b: 17 });

        let bare = cells.get(1, 0);
        assert_eq!(bare.ch, '\u{2800}');
        assert_eq!(bare.fg, Color::White);
    }

    #[test]
    fn braille_single_dot_positions() {
        let mut canvas = PixelCanvas::new(2, 4, BG);
        canvas.fill_rect(1.0, 3.0, 1.0, 1.0, Rgba { r: 255, g: 255, b: 255, a: 1.0 });
        let mut cells = CellBuffer::new(1, 1);
        canvas_to_cells(&canvas, &mut cells, false);
        assert_eq!(cells.get(0, 0).ch, '\u{2880}');
        assert_eq!(cells.get(0, 0).fg, Color::White);
        assert_eq!(cells.get(0, 0).bg, Color::Black);
    }

    #[test]
    fn draw_text_stops_at_edge() {
        let mut buf = CellBuffer::new(4, 1);
        draw_text(&mut buf, 2, 0, "abc", Color::White, Color::Black);
        assert_eq!(buf.get(2, 0).ch, 'a');
        assert_eq!(buf.get(3, 0).ch, 'b');
        assert_eq!(buf.get(0, 0).ch, ' ');
    }
}

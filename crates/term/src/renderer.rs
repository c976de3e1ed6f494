//! Flushes a [`FrameBuffer`] to the terminal.
//!
//! Each row is compared with the previous frame and only the spans that changed
//! are written, inside a synchronized update so the terminal never shows half a
//! frame. The first frame, a size change, or [`TerminalRenderer::invalidate`]
//! repaints every row.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::style::{
    Attribute, Color as TermColor, Colors, Print, ResetColor, SetAttribute, SetColors,
};
use crossterm::terminal::{self, BeginSynchronizedUpdate, ClearType, EndSynchronizedUpdate};
use crossterm::{cursor, queue};

use crate::fb::{Cell, FrameBuffer, Style, Weight};
use crate::types::{unpack_rgb, Color};

/// Owns the terminal while the game runs
pub struct TerminalRenderer {
    stdout: io::Stdout,
    prev: Option<FrameBuffer>,
    buf: Vec<u8>,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            prev: None,
            buf: Vec::with_capacity(64 * 1024),
        }
    }

    /// Raw mode, alternate screen, hidden cursor.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.buf.clear();
        queue!(
            self.buf,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::DisableLineWrap
        )?;
        self.flush()
    }

    /// Undo [`TerminalRenderer::enter`].
    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        queue!(
            self.buf,
            ResetColor,
            SetAttribute(Attribute::Reset),
            terminal::EnableLineWrap,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        self.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Repaint everything on the next draw (after a resize).
    pub fn invalidate(&mut self) {
        self.prev = None;
    }

    /// Draw `fb`, then hand the previous frame back through `fb` for reuse.
    pub fn draw_swap(&mut self, fb: &mut FrameBuffer) -> Result<()> {
        let prev = self
            .prev
            .take()
            .filter(|p| p.width() == fb.width() && p.height() == fb.height());

        self.buf.clear();
        encode_frame(prev.as_ref(), fb, &mut self.buf)?;
        self.flush()?;

        let spare = prev.unwrap_or_else(|| FrameBuffer::new(0, 0));
        self.prev = Some(std::mem::replace(fb, spare));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Encode the parts of `next` that differ from `prev` into `out`.
///
/// With no previous frame, or one of another size, the screen is cleared and
/// every row is painted.
pub fn encode_frame(prev: Option<&FrameBuffer>, next: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    let prev = prev.filter(|p| p.width() == next.width() && p.height() == next.height());
    queue!(out, BeginSynchronizedUpdate)?;
    if prev.is_none() {
        queue!(out, terminal::Clear(ClearType::All))?;
    }

    let mut pen: Option<Style> = None;
    for y in 0..next.height() {
        let row = next.row(y);
        let old = prev.map(|p| p.row(y));
        let mut x = 0;
        while let Some((start, end)) = next_span(old, row, x) {
            queue!(out, cursor::MoveTo(start as u16, y))?;
            for cell in &row[start..end] {
                if pen != Some(cell.style) {
                    set_pen(out, cell.style)?;
                    pen = Some(cell.style);
                }
                queue!(out, Print(cell.ch))?;
            }
            x = end;
        }
    }

    queue!(
        out,
        ResetColor,
        SetAttribute(Attribute::Reset),
        EndSynchronizedUpdate
    )?;
    Ok(())
}

/// Next half-open span at or after `from` where `row` differs from `old`.
fn next_span(old: Option<&[Cell]>, row: &[Cell], from: usize) -> Option<(usize, usize)> {
    let differs = |x: usize| old.map_or(true, |old| old[x] != row[x]);
    let start = (from..row.len()).find(|&x| differs(x))?;
    let end = (start..row.len())
        .find(|&x| !differs(x))
        .unwrap_or(row.len());
    Some((start, end))
}

fn set_pen(out: &mut Vec<u8>, style: Style) -> Result<()> {
    // SGR reset clears colors too, so it goes first.
    queue!(
        out,
        SetAttribute(Attribute::Reset),
        SetColors(Colors::new(term_color(style.fg), term_color(style.bg)))
    )?;
    match style.weight {
        Weight::Normal => {}
        Weight::Bold => queue!(out, SetAttribute(Attribute::Bold))?,
        Weight::Dim => queue!(out, SetAttribute(Attribute::Dim))?,
    }
    Ok(())
}

fn term_color(color: Color) -> TermColor {
    let (r, g, b) = unpack_rgb(color);
    TermColor::Rgb { r, g, b }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyphs(out: &[u8]) -> String {
        String::from_utf8_lossy(out).into_owned()
    }

    #[test]
    fn first_frame_paints_every_row() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.put_str(0, 0, "AB", Style::default());
        fb.put_str(0, 1, "CD", Style::default());

        let mut out = Vec::new();
        encode_frame(None, &fb, &mut out).unwrap();
        let text = glyphs(&out);
        for ch in ['A', 'B', 'C', 'D'] {
            assert!(text.contains(ch));
        }
    }

    #[test]
    fn unchanged_frame_encodes_no_glyphs() {
        let mut a = FrameBuffer::new(4, 2);
        a.put_str(0, 0, "ab", Style::default());
        let b = a.clone();
        let mut out = Vec::new();
        encode_frame(Some(&a), &b, &mut out).unwrap();
        assert!(!glyphs(&out).contains('a'));
    }

    #[test]
    fn spans_cover_only_changed_cells() {
        let old = FrameBuffer::new(7, 1);
        let mut new = old.clone();
        new.put_str(1, 0, "XXX", Style::default());
        new.put_char(5, 0, 'Y', Style::default());

        let (old, row) = (old.row(0), new.row(0));
        assert_eq!(next_span(Some(old), row, 0), Some((1, 4)));
        assert_eq!(next_span(Some(old), row, 4), Some((5, 6)));
        assert_eq!(next_span(Some(old), row, 6), None);
        assert_eq!(next_span(None, row, 0), Some((0, 7)));
    }

    #[test]
    fn style_change_without_glyph_change_is_repainted() {
        let old = FrameBuffer::new(3, 1);
        let mut new = old.clone();
        new.put_char(2, 0, ' ', Style::new(0xff0000, 0x000000));
        assert_eq!(next_span(Some(old.row(0)), new.row(0), 0), Some((2, 3)));
    }

    #[test]
    fn engine_colors_map_to_truecolor() {
        assert_eq!(
            term_color(0x102030),
            TermColor::Rgb {
                r: 0x10,
                g: 0x20,
                b: 0x30
            }
        );
    }
}

// SPDX-License-Identifier: MIT
//
// Input dispatcher — the viewer's main loop.
//
// Each iteration: check for a resize, draw if something changed, then wait
// up to one read timeout (100 ms) for a key and dispatch it:
//
//   Ctrl+Q       → clear the screen, home the cursor, stop
//   Home / End   → column 0 / last screen column
//   PgUp / PgDn  → a screenful of single-row moves
//   arrows       → one step
//   anything else is ignored; this is a viewer
//
// The first frame always draws. After that a frame is drawn only when a key
// was handled or the window was resized, so an idle viewer costs one
// timed-out read per 100 ms and no output.

use std::io::Write;

use kiln_term::ansi;
use kiln_term::geometry::Size;
use kiln_term::input::{Decoder, Key};
use kiln_term::reader::ByteSource;
use kiln_view::lines::LineStore;
use kiln_view::render;
use kiln_view::viewport::{Direction, Page, Viewport};
use tracing::debug;

/// Dispatcher state. There is no way back from `Terminating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Terminating,
}

/// The loaded lines, the viewport onto them, and the dispatcher state.
#[derive(Debug)]
pub struct Viewer {
    lines: LineStore,
    view: Viewport,
    state: State,
}

impl Viewer {
    #[must_use]
    pub fn new(lines: LineStore, size: Size) -> Self {
        Self {
            lines,
            view: Viewport::new(size),
            state: State::Running,
        }
    }

    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub const fn view(&self) -> &Viewport {
        &self.view
    }

    /// Apply one decoded key.
    pub fn process_key(&mut self, key: Key) {
        if self.state == State::Terminating {
            return;
        }

        let numrows = self.lines.numrows();
        match key {
            k if k.is_ctrl(b'q') => self.state = State::Terminating,

            Key::Home => self.view.line_start(),
            Key::End => self.view.line_end(),

            Key::PageUp => self.view.page(Page::Up, numrows),
            Key::PageDown => self.view.page(Page::Down, numrows),

            Key::Up => self.view.move_cursor(Direction::Up, numrows),
            Key::Down => self.view.move_cursor(Direction::Down, numrows),
            Key::Left => self.view.move_cursor(Direction::Left, numrows),
            Key::Right => self.view.move_cursor(Direction::Right, numrows),

            Key::Char(_) | Key::Escape | Key::Delete => {}
        }
    }

    /// Adopt a new window size.
    pub fn resize(&mut self, size: Size) {
        debug!(cols = size.cols, rows = size.rows, "window resized");
        self.view.resize(size);
    }

    /// Run until Ctrl+Q.
    ///
    /// `poll_resize` is called once per iteration and returns the new window
    /// size when one is pending. On quit the screen is cleared and the cursor
    /// homed before returning.
    ///
    /// # Errors
    ///
    /// Returns [`kiln_term::Error::InputRead`] if reading a key fails and
    /// [`kiln_term::Error::Output`] if a frame cannot be written.
    pub fn run<S: ByteSource>(
        &mut self,
        decoder: &mut Decoder<S>,
        out: &mut impl Write,
        mut poll_resize: impl FnMut() -> Option<Size>,
    ) -> kiln_term::Result<()> {
        let mut dirty = true;

        while self.state() == State::Running {
            if let Some(size) = poll_resize() {
                self.resize(size);
                dirty = true;
            }

            if dirty {
                render::refresh_screen(&mut self.view, &self.lines, out)?;
                dirty = false;
            }

            if let Some(key) = decoder.poll_key()? {
                self.process_key(key);
                dirty = true;
            }
        }

        debug!(cursor = ?self.view().cursor(), "quit requested");
        ansi::clear_screen(out)?;
        ansi::cursor_home(out)?;
        out.flush()?;
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_term::input::ctrl;
    use kiln_term::reader::TtyInput;
    use pretty_assertions::assert_eq;

    const QUIT: u8 = ctrl(b'q');

    fn lines(n: usize) -> LineStore {
        let text: Vec<String> = (0..n).map(|i| format!("line {i}")).collect();
        text.iter().map(String::as_str).collect()
    }

    /// Run a viewer over scripted input and return it with everything it
    /// wrote.
    fn run_script(mut viewer: Viewer, input: &[u8]) -> (Viewer, Vec<u8>) {
        let mut decoder = Decoder::new(TtyInput::new(input));
        let mut out = Vec::new();
        viewer.run(&mut decoder, &mut out, || None).unwrap();
        (viewer, out)
    }

    fn frames(out: &[u8]) -> usize {
        out.windows(6).filter(|w| w == b"\x1b[?25l").count()
    }

    fn cursor(viewer: &Viewer) -> (usize, usize) {
        let c = viewer.view().cursor();
        (c.cx, c.cy)
    }

    // ── Quit ────────────────────────────────────────────────────────

    #[test]
    fn ctrl_q_clears_homes_and_stops() {
        let (viewer, out) = run_script(Viewer::new(LineStore::new(), Size::new(80, 24)), &[QUIT]);
        assert_eq!(viewer.state(), State::Terminating);
        assert!(out.ends_with(b"\x1b[2J\x1b[H"));
    }

    #[test]
    fn bytes_after_quit_are_not_read() {
        let mut decoder = Decoder::new(TtyInput::new(&[QUIT, b'\x1b', b'[', b'B'][..]));
        let mut viewer = Viewer::new(lines(5), Size::new(80, 24));
        viewer.run(&mut decoder, &mut Vec::new(), || None).unwrap();
        assert_eq!(cursor(&viewer), (0, 0));
        assert_eq!(decoder.poll_key().unwrap(), Some(Key::Down));
    }

    #[test]
    fn terminating_is_final() {
        let mut viewer = Viewer::new(lines(5), Size::new(80, 24));
        viewer.process_key(Key::Char(QUIT));
        viewer.process_key(Key::Down);
        assert_eq!(viewer.state(), State::Terminating);
        assert_eq!(cursor(&viewer), (0, 0));
    }

    #[test]
    fn plain_q_does_not_quit() {
        let mut viewer = Viewer::new(LineStore::new(), Size::new(80, 24));
        viewer.process_key(Key::Char(b'q'));
        assert_eq!(viewer.state(), State::Running);
    }

    // ── Movement ────────────────────────────────────────────────────

    #[test]
    fn up_at_top_does_not_underflow() {
        let (viewer, _) = run_script(
            Viewer::new(lines(5), Size::new(80, 24)),
            &[0x1b, b'[', b'A', QUIT],
        );
        assert_eq!(cursor(&viewer), (0, 0));
    }

    #[test]
    fn down_past_last_line_does_not_overflow() {
        let mut input = b"\x1b[B\x1b[B\x1b[B\x1b[B\x1b[B".to_vec();
        input.push(QUIT);
        let (viewer, _) = run_script(Viewer::new(lines(3), Size::new(80, 24)), &input);
        assert_eq!(cursor(&viewer).1, 3);
    }

    #[test]
    fn home_and_end_keys() {
        let mut viewer = Viewer::new(lines(3), Size::new(40, 10));
        viewer.process_key(Key::End);
        assert_eq!(cursor(&viewer), (39, 0));
        viewer.process_key(Key::Home);
        assert_eq!(cursor(&viewer), (0, 0));
    }

    #[test]
    fn page_keys_move_a_screenful() {
        let mut input = b"\x1b[6~".to_vec();
        input.push(QUIT);
        let (viewer, _) = run_script(Viewer::new(lines(100), Size::new(80, 10)), &input);
        assert_eq!(cursor(&viewer).1, 10);

        let mut viewer = viewer;
        viewer.state = State::Running;
        viewer.process_key(Key::PageUp);
        assert_eq!(cursor(&viewer).1, 0);
    }

    #[test]
    fn arrows_step_each_way() {
        let mut viewer = Viewer::new(lines(10), Size::new(80, 24));
        viewer.process_key(Key::Down);
        viewer.process_key(Key::Right);
        viewer.process_key(Key::Right);
        viewer.process_key(Key::Left);
        assert_eq!(cursor(&viewer), (1, 1));
        viewer.process_key(Key::Up);
        assert_eq!(cursor(&viewer), (1, 0));
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut viewer = Viewer::new(lines(10), Size::new(80, 24));
        for key in [Key::Char(b'x'), Key::Escape, Key::Delete, Key::Char(b'\r')] {
            viewer.process_key(key);
        }
        assert_eq!(cursor(&viewer), (0, 0));
        assert_eq!(viewer.state(), State::Running);
    }

    #[test]
    fn scrolling_follows_the_cursor() {
        let mut input = Vec::new();
        for _ in 0..15 {
            input.extend_from_slice(b"\x1b[B");
        }
        input.push(QUIT);
        let (viewer, out) = run_script(Viewer::new(lines(30), Size::new(80, 10)), &input);
        assert_eq!(viewer.view().rowoff(), 6);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("line 15\x1b[K\x1b[10;1H"));
    }

    // ── Frames ──────────────────────────────────────────────────────

    #[test]
    fn first_frame_then_one_per_key() {
        let (_, out) = run_script(
            Viewer::new(lines(3), Size::new(80, 24)),
            &[b'x', b'y', QUIT],
        );
        assert_eq!(frames(&out), 3);
    }

    #[test]
    fn empty_file_shows_banner() {
        let (_, out) = run_script(Viewer::new(LineStore::new(), Size::new(80, 24)), &[QUIT]);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(&render::banner()));
    }

    #[test]
    fn resize_redraws_at_new_size() {
        let mut decoder = Decoder::new(TtyInput::new(&[QUIT][..]));
        let mut viewer = Viewer::new(lines(3), Size::new(80, 24));
        viewer.process_key(Key::End);

        let mut pending = Some(Size::new(20, 5));
        let mut out = Vec::new();
        viewer.run(&mut decoder, &mut out, || pending.take()).unwrap();

        assert_eq!(viewer.view().size(), Size::new(20, 5));
        assert_eq!(cursor(&viewer), (19, 0));
        assert_eq!(frames(&out), 1);
        assert_eq!(out.windows(3).filter(|w| w == b"\x1b[K").count(), 5);
    }

    #[test]
    fn read_failure_is_an_input_error() {
        struct Broken;
        impl ByteSource for Broken {
            fn read_byte(&mut self) -> std::io::Result<Option<u8>> {
                Err(std::io::Error::other("gone"))
            }
        }

        let mut viewer = Viewer::new(LineStore::new(), Size::new(80, 24));
        let err = viewer
            .run(&mut Decoder::new(Broken), &mut Vec::new(), || None)
            .unwrap_err();
        assert!(matches!(err, kiln_term::Error::InputRead(_)));
    }
}

//! Terminal rendering of the soundboard
//!
//! Redraws the whole board after every change. Rows are numbered from 1 and
//! marked `▶` when idle and `⏸` while playing.

use mlc_core::{RowHandle, SoundRow, SoundboardView};
use std::collections::HashSet;
use std::io::Write;

const IDLE_MARKER: &str = "▶";
const PLAYING_MARKER: &str = "⏸";

/// One row as displayed
pub fn format_row(position: usize, row: &SoundRow, playing: bool) -> String {
    let marker = if playing { PLAYING_MARKER } else { IDLE_MARKER };
    match &row.attribution {
        Some(by) => format!("{} {}. {} (by {})", marker, position, row.name, by),
        None => format!("{} {}. {}", marker, position, row.name),
    }
}

pub struct TerminalView<W: Write + Send> {
    out: W,
    rows: Vec<SoundRow>,
    playing: HashSet<RowHandle>,
    loading: bool,
    progress: Option<(usize, usize)>,
    error: Option<String>,
}

impl TerminalView<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            rows: Vec::new(),
            playing: HashSet::new(),
            loading: false,
            progress: None,
            error: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn is_current(&self, row: RowHandle) -> bool {
        self.rows.iter().any(|r| r.handle == row)
    }

    fn redraw(&mut self) {
        // terminal write failures are not recoverable here
        let _ = self.draw();
    }

    fn draw(&mut self) -> std::io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "MLC Soundboard")?;

        if self.loading {
            match self.progress {
                Some((loaded, total)) => writeln!(self.out, "Loading... {}/{}", loaded, total)?,
                None => writeln!(self.out, "Loading...")?,
            }
        }

        if let Some(error) = &self.error {
            writeln!(self.out, "! {}", error)?;
        }

        if self.rows.is_empty() {
            writeln!(self.out, "(no sounds)")?;
        }
        for (index, row) in self.rows.iter().enumerate() {
            let playing = self.playing.contains(&row.handle);
            writeln!(self.out, "{}", format_row(index + 1, row, playing))?;
        }

        self.out.flush()
    }
}

impl<W: Write + Send> SoundboardView for TerminalView<W> {
    fn render(&mut self, rows: &[SoundRow]) {
        self.rows = rows.to_vec();
        self.playing.clear();
        self.redraw();
    }

    fn set_playing(&mut self, row: RowHandle, playing: bool) {
        if !self.is_current(row) {
            return;
        }
        let changed = if playing {
            self.playing.insert(row)
        } else {
            self.playing.remove(&row)
        };
        if changed {
            self.redraw();
        }
    }

    fn show_loading(&mut self, visible: bool) {
        if self.loading != visible {
            self.loading = visible;
            if !visible {
                self.progress = None;
            }
            self.redraw();
        }
    }

    fn show_progress(&mut self, loaded: usize, total: usize) {
        self.progress = Some((loaded, total));
        if self.loading {
            self.redraw();
        }
    }

    fn show_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
        self.redraw();
    }

    fn hide_error(&mut self) {
        if self.error.take().is_some() {
            self.redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(generation: u64, index: usize, name: &str, by: Option<&str>) -> SoundRow {
        SoundRow {
            handle: RowHandle::new(generation, index),
            name: name.to_string(),
            attribution: by.map(str::to_string),
            path: format!("{}.mp3", name.to_lowercase()),
        }
    }

    fn output(view: TerminalView<Vec<u8>>) -> String {
        String::from_utf8(view.into_inner()).unwrap()
    }

    #[test]
    fn rows_show_name_and_attribution() {
        assert_eq!(
            format_row(1, &row(1, 0, "Airhorn", Some("Dave")), false),
            "▶ 1. Airhorn (by Dave)"
        );
        assert_eq!(format_row(2, &row(1, 1, "Gong", None), true), "⏸ 2. Gong");
    }

    #[test]
    fn playing_row_is_marked() {
        let mut view = TerminalView::new(Vec::new());
        let rows = vec![row(1, 0, "Gong", None), row(1, 1, "Airhorn", Some("Dave"))];

        view.render(&rows);
        view.set_playing(rows[1].handle, true);

        let out = output(view);
        let last_board: Vec<&str> = out.lines().rev().take(2).collect();
        assert_eq!(last_board, vec!["⏸ 2. Airhorn (by Dave)", "▶ 1. Gong"]);
    }

    #[test]
    fn rows_from_an_earlier_render_are_ignored() {
        let mut view = TerminalView::new(Vec::new());
        let old = row(1, 0, "Gong", None);
        view.render(&[old.clone()]);
        view.render(&[row(2, 0, "Gong", None)]);

        view.set_playing(old.handle, true);

        assert!(!output(view).contains(PLAYING_MARKER));
    }

    #[test]
    fn progress_is_drawn_while_loading() {
        let mut view = TerminalView::new(Vec::new());
        view.show_loading(true);
        view.show_progress(1, 5);
        view.show_progress(2, 5);
        view.show_loading(false);

        let out = output(view);
        assert!(out.contains("Loading... 1/5"));
        assert!(out.contains("Loading... 2/5"));
        let last_board = out.rsplit("MLC Soundboard").next().unwrap();
        assert!(!last_board.contains("Loading"));
    }

    #[test]
    fn progress_outside_loading_is_not_drawn() {
        let mut view = TerminalView::new(Vec::new());
        view.show_progress(3, 5);

        assert!(output(view).is_empty());
    }

    #[test]
    fn error_banner_is_shown_and_cleared() {
        let mut view = TerminalView::new(Vec::new());
        view.show_error("Error syncing with server");
        view.hide_error();

        let out = output(view);
        let boards: Vec<&str> = out.split("MLC Soundboard").collect();
        assert!(boards[1].contains("! Error syncing with server"));
        assert!(!boards.last().unwrap().contains("!"));
    }
}

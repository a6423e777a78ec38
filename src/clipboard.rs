// Clipboard integration: copy/clear keybinding detection, tab-delimited
// serialization of the selected region, and the system clipboard sink.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};

use winit::keyboard::{Key, ModifiersState, NamedKey};

use crate::selection::SelectedCell;

/// Detect the copy keybinding: Ctrl+C, or Cmd+C on macOS.
pub fn is_copy_keybinding(key: &Key, modifiers: ModifiersState) -> bool {
    let is_c = matches!(key, Key::Character(s) if s.to_lowercase() == "c");
    is_c && (modifiers.control_key() || modifiers.super_key())
}

/// Detect the clear-selection keybinding: Escape (with or without modifiers).
pub fn is_clear_keybinding(key: &Key) -> bool {
    matches!(key, Key::Named(NamedKey::Escape))
}

/// Serialize selected cells into a tab/newline-delimited payload.
///
/// Cells are grouped by their original row and column indices and emitted in
/// ascending index order on both axes, so the output is identical for any
/// insertion order of the input. Cells whose content resolution failed
/// serialize as empty strings at their position. No trailing newline.
pub fn serialize_cells(cells: &[SelectedCell]) -> String {
    let mut rows: BTreeMap<usize, BTreeMap<usize, String>> = BTreeMap::new();
    let mut cols: BTreeSet<usize> = BTreeSet::new();

    for cell in cells {
        let value = cell
            .data
            .as_ref()
            .map(|d| d.value.clone())
            .unwrap_or_default();
        rows.entry(cell.row_index)
            .or_default()
            .insert(cell.col_index, value);
        cols.insert(cell.col_index);
    }

    rows.values()
        .map(|row| {
            cols.iter()
                .map(|col| row.get(col).cloned().unwrap_or_default())
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// External copy commands probed when no system clipboard is reachable,
/// in preference order. Each receives the payload on stdin.
const FALLBACK_COMMANDS: &[&[&str]] = &[
    &["wl-copy"],
    &["xclip", "-selection", "clipboard", "-in"],
    &["xsel", "--clipboard", "--input"],
    &["pbcopy"],
];

enum CopyBackend {
    /// System clipboard via arboard.
    System(arboard::Clipboard),
    /// Legacy path: pipe the payload through an external copy command.
    Command(&'static [&'static str]),
    Unavailable,
}

/// Clipboard write strategy, probed once on first use and cached for the
/// life of the sink.
pub struct CopySink {
    backend: Option<CopyBackend>,
}

impl CopySink {
    /// Create an unresolved sink. No capability probing happens until the
    /// first `copy` call.
    pub fn new() -> Self {
        Self { backend: None }
    }

    /// Write `text` to the clipboard. Returns whether the write succeeded;
    /// failures are logged, never propagated.
    pub fn copy(&mut self, text: &str) -> bool {
        let backend = self.backend.get_or_insert_with(resolve_backend);
        match backend {
            CopyBackend::System(clipboard) => match clipboard.set_text(text.to_string()) {
                Ok(()) => true,
                Err(e) => {
                    log::error!("clipboard write failed: {e}");
                    false
                }
            },
            CopyBackend::Command(argv) => run_copy_command(argv, text),
            CopyBackend::Unavailable => {
                log::error!("no clipboard backend available");
                false
            }
        }
    }
}

impl Default for CopySink {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CopySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backend = match &self.backend {
            None => "unresolved",
            Some(CopyBackend::System(_)) => "system",
            Some(CopyBackend::Command(_)) => "command",
            Some(CopyBackend::Unavailable) => "unavailable",
        };
        f.debug_struct("CopySink").field("backend", &backend).finish()
    }
}

fn resolve_backend() -> CopyBackend {
    match arboard::Clipboard::new() {
        Ok(clipboard) => CopyBackend::System(clipboard),
        Err(e) => {
            log::debug!("system clipboard unavailable ({e}), probing copy commands");
            for argv in FALLBACK_COMMANDS {
                if command_exists(argv[0]) {
                    log::debug!("using copy command: {}", argv[0]);
                    return CopyBackend::Command(*argv);
                }
            }
            CopyBackend::Unavailable
        }
    }
}

/// A command counts as present if it can be spawned at all; its exit status
/// for `--version` is irrelevant.
fn command_exists(name: &str) -> bool {
    Command::new(name)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

fn run_copy_command(argv: &[&str], text: &str) -> bool {
    let result = (|| -> std::io::Result<bool> {
        let mut child = Command::new(argv[0])
            .args(&argv[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }
        Ok(child.wait()?.success())
    })();

    match result {
        Ok(success) => success,
        Err(e) => {
            log::error!("copy command {} failed: {e}", argv[0]);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::CellContent;
    use proptest::prelude::*;
    use rstest::rstest;

    fn cell(row: usize, col: usize, value: &str) -> SelectedCell {
        SelectedCell {
            row_index: row,
            col_index: col,
            rect: None,
            data: Some(CellContent {
                value: value.to_string(),
                field: format!("f{col}"),
                title: format!("F{col}"),
            }),
        }
    }

    fn absent_cell(row: usize, col: usize) -> SelectedCell {
        SelectedCell {
            row_index: row,
            col_index: col,
            rect: None,
            data: None,
        }
    }

    // ── Copy keybinding detection ────────────────────────────────────

    #[rstest]
    #[case(ModifiersState::CONTROL)]
    #[case(ModifiersState::SUPER)]
    #[case(ModifiersState::CONTROL | ModifiersState::SHIFT)]
    fn copy_with_ctrl_or_cmd(#[case] mods: ModifiersState) {
        assert!(is_copy_keybinding(&Key::Character("c".into()), mods));
    }

    #[test]
    fn copy_uppercase_c_matches() {
        assert!(is_copy_keybinding(
            &Key::Character("C".into()),
            ModifiersState::CONTROL
        ));
    }

    #[test]
    fn plain_c_is_not_copy() {
        assert!(!is_copy_keybinding(
            &Key::Character("c".into()),
            ModifiersState::empty()
        ));
    }

    #[test]
    fn ctrl_other_key_is_not_copy() {
        assert!(!is_copy_keybinding(
            &Key::Character("x".into()),
            ModifiersState::CONTROL
        ));
    }

    // ── Clear keybinding detection ───────────────────────────────────

    #[test]
    fn escape_is_clear() {
        assert!(is_clear_keybinding(&Key::Named(NamedKey::Escape)));
    }

    #[test]
    fn other_named_key_is_not_clear() {
        assert!(!is_clear_keybinding(&Key::Named(NamedKey::Enter)));
        assert!(!is_clear_keybinding(&Key::Character("c".into())));
    }

    // ── Serialization ────────────────────────────────────────────────

    #[test]
    fn serialize_single_cell() {
        assert_eq!(serialize_cells(&[cell(2, 1, "x")]), "x");
    }

    #[test]
    fn serialize_empty_selection() {
        assert_eq!(serialize_cells(&[]), "");
    }

    #[test]
    fn serialize_2x3_rectangle() {
        let cells = vec![
            cell(0, 0, "a"),
            cell(0, 1, "b"),
            cell(0, 2, "c"),
            cell(1, 0, "d"),
            cell(1, 1, "e"),
            cell(1, 2, "f"),
        ];
        assert_eq!(serialize_cells(&cells), "a\tb\tc\nd\te\tf");
    }

    #[test]
    fn serialize_uses_original_indices_not_rectangle_positions() {
        // A selection starting at (3, 5) still emits a compact payload.
        let cells = vec![cell(3, 5, "a"), cell(3, 6, "b"), cell(4, 5, "c"), cell(4, 6, "d")];
        assert_eq!(serialize_cells(&cells), "a\tb\nc\td");
    }

    #[test]
    fn serialize_out_of_order_input() {
        let cells = vec![cell(1, 1, "e"), cell(0, 1, "b"), cell(1, 0, "d"), cell(0, 0, "a")];
        assert_eq!(serialize_cells(&cells), "a\tb\nd\te");
    }

    #[test]
    fn serialize_absent_cell_as_empty_string() {
        let cells = vec![cell(0, 0, "a"), absent_cell(0, 1), cell(0, 2, "c")];
        assert_eq!(serialize_cells(&cells), "a\t\tc");
    }

    #[test]
    fn serialize_no_trailing_newline() {
        let payload = serialize_cells(&[cell(0, 0, "a"), cell(1, 0, "b")]);
        assert!(!payload.ends_with('\n'));
    }

    fn sample_cells() -> Vec<SelectedCell> {
        let mut cells = Vec::new();
        for row in 0..4 {
            for col in 0..3 {
                cells.push(cell(row, col, &format!("v{row}{col}")));
            }
        }
        cells
    }

    proptest! {
        #[test]
        fn serialization_is_insertion_order_independent(
            shuffled in Just(sample_cells()).prop_shuffle()
        ) {
            prop_assert_eq!(serialize_cells(&shuffled), serialize_cells(&sample_cells()));
        }
    }

    // ── Copy sink ────────────────────────────────────────────────────

    #[test]
    fn sink_does_not_probe_until_first_copy() {
        let sink = CopySink::new();
        assert_eq!(format!("{sink:?}"), "CopySink { backend: \"unresolved\" }");
    }
}

//! Renders an [`Editor`]'s state to the minimal sequence of terminal
//! control bytes needed to redraw it, handling soft wrap when the visible
//! line (prompt + content) exceeds the terminal width.

use log::trace;

use crate::editor::Editor;

const HIDE_CURSOR: &[u8] = b"\x1b[?25l";
const SHOW_CURSOR: &[u8] = b"\x1b[?25h";
const CLEAR_TO_EOL: &[u8] = b"\x1b[0K";

/// Builds the byte sequence that redraws `editor` against a terminal of
/// `cols` columns, with `prompt` shown verbatim at the start of the line.
///
/// `prev_wrap_rows` is the row count the *previous* render for this same
/// line returned (0 before the first render of a fresh line); it decides
/// how far to move the cursor up before repainting. Returns the rendered
/// bytes, meant for a single `write(2)` call so a redraw never tears
/// mid-sequence, plus this render's own wrap-row count to pass as
/// `prev_wrap_rows` next time.
pub fn render(editor: &Editor, prompt: &str, cols: usize, prev_wrap_rows: usize) -> (Vec<u8>, usize) {
    let cols = cols.max(1);
    let prompt_len = prompt.len();
    let length = editor.line().length();

    // Wrapping uses the same one-column-per-character approximation the
    // design calls for; double-width glyphs are an explicit non-goal.
    let wrap_rows = (length + prompt_len) / cols;

    let mut out = Vec::with_capacity(editor.line().size() + prompt_len + 32);
    out.extend_from_slice(HIDE_CURSOR);

    if prev_wrap_rows > 0 {
        out.extend_from_slice(format!("\x1b[{prev_wrap_rows}F").as_bytes());
    }

    out.push(b'\r');
    out.extend_from_slice(CLEAR_TO_EOL);
    out.extend_from_slice(prompt.as_bytes());

    let mut column = prompt_len;
    let mut wrap_offset = 0usize;
    let mut cursor_wrap_offset = 0usize;
    let cursor_pos = editor.cursor_pos();

    for (i, ch) in editor.line().chars().enumerate() {
        if i == cursor_pos {
            cursor_wrap_offset = wrap_offset;
        }
        out.extend_from_slice(ch.as_bytes());
        column += 1;
        if column >= cols.saturating_sub(2) && i + 1 != length {
            out.extend_from_slice(b"\r\n");
            column = 0;
            wrap_offset += 2;
        }
    }
    if cursor_pos == length {
        cursor_wrap_offset = wrap_offset;
    }

    // Rows wrapped *before* the cursor, not the line's total wrap count:
    // each injected "\r\n" contributes 2 to `cursor_wrap_offset`, so halving
    // it recovers the row count to subtract back to the cursor's own row.
    let rows_before_cursor = cursor_wrap_offset / 2;
    let target_col = (cursor_pos + prompt_len + 1 + cursor_wrap_offset)
        .saturating_sub(rows_before_cursor.saturating_mul(cols));
    out.extend_from_slice(format!("\x1b[{target_col}G").as_bytes());

    out.extend_from_slice(SHOW_CURSOR);

    trace!(
        "render: len={length} cols={cols} wrap_rows={wrap_rows} target_col={target_col}"
    );

    (out, wrap_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Editor;

    #[test]
    fn render_is_idempotent_for_a_fixed_state() {
        let mut e = Editor::new(256);
        e.setline("hello, world").unwrap();
        let (a, rows_a) = render(&e, "$ ", 80, 0);
        let (b, rows_b) = render(&e, "$ ", 80, 0);
        assert_eq!(a, b);
        assert_eq!(rows_a, rows_b);
    }

    #[test]
    fn render_contains_prompt_and_line() {
        let mut e = Editor::new(256);
        e.setline("abc").unwrap();
        let (bytes, wrap_rows) = render(&e, "> ", 80, 0);
        assert_eq!(wrap_rows, 0);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("> "));
        assert!(text.contains("abc"));
        assert!(text.starts_with("\x1b[?25l"));
        assert!(text.ends_with("\x1b[?25h"));
    }

    #[test]
    fn render_moves_up_by_previous_wrap_rows() {
        let mut e = Editor::new(256);
        e.setline("abc").unwrap();
        let (bytes, _) = render(&e, "> ", 80, 2);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\x1b[2F"));
    }

    #[test]
    fn render_does_not_underflow_when_cursor_precedes_wrap_boundary() {
        let mut e = Editor::new(256);
        e.setline("0123456789abcdefghij").unwrap(); // 20 chars, wraps at cols=10
        e.move_left(e.cursor_pos()); // Home: cursor sits in the first row
        let (bytes, wrap_rows) = render(&e, "> ", 10, 0);
        assert!(wrap_rows > 0);
        let text = String::from_utf8(bytes).unwrap();
        // prompt_len(2) + cursor_pos(0) + 1, with no wraps crossed yet.
        assert!(text.contains("\x1b[3G"));
    }
}

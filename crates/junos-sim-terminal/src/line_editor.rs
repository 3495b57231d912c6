//! Character-at-a-time line editing.

/// Maximum bytes kept in a single input line.
pub const MAX_LINE_LEN: usize = 1024;

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7f;

/// Cursor back, blank the cell, cursor back again.
pub const ERASE_SEQUENCE: &[u8] = b"\x08 \x08";

/// Whether accepted characters are echoed to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    On,
    /// Used for password entry: input is buffered but nothing is sent back.
    Off,
}

/// Rebuilds a command line from raw keystrokes.
///
/// CR and LF both end a line. The LF (or NUL) of a CR LF / CR NUL pair is
/// swallowed so one Enter key yields exactly one line.
#[derive(Debug)]
pub struct LineEditor {
    buffer: String,
    echo: Echo,
    after_cr: bool,
}

impl LineEditor {
    pub fn new(echo: Echo) -> Self {
        Self {
            buffer: String::new(),
            echo,
            after_cr: false,
        }
    }

    pub fn set_echo(&mut self, echo: Echo) {
        self.echo = echo;
    }

    /// Current, unterminated line contents.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Consume one byte, appending any echo or erase bytes to `out`.
    ///
    /// Returns the finished line when `byte` terminates it; the buffer is
    /// cleared in that case.
    pub fn feed(&mut self, byte: u8, out: &mut Vec<u8>) -> Option<String> {
        let after_cr = std::mem::replace(&mut self.after_cr, false);
        match byte {
            b'\r' => {
                self.after_cr = true;
                Some(std::mem::take(&mut self.buffer))
            },
            b'\n' | 0 if after_cr => None,
            b'\n' => Some(std::mem::take(&mut self.buffer)),
            BACKSPACE | DELETE => {
                if self.buffer.pop().is_some() && self.echo == Echo::On {
                    out.extend_from_slice(ERASE_SEQUENCE);
                }
                None
            },
            0x20..=0x7e => {
                if self.buffer.len() < MAX_LINE_LEN {
                    self.buffer.push(char::from(byte));
                    if self.echo == Echo::On {
                        out.push(byte);
                    }
                }
                None
            },
            _ => None,
        }
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new(Echo::On)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed `input`, returning completed lines and everything echoed.
    fn feed_all(editor: &mut LineEditor, input: &[u8]) -> (Vec<String>, Vec<u8>) {
        let mut out = Vec::new();
        let lines = input
            .iter()
            .filter_map(|&b| editor.feed(b, &mut out))
            .collect();
        (lines, out)
    }

    #[test]
    fn printable_bytes_are_buffered_and_echoed() {
        let mut editor = LineEditor::default();
        let (lines, out) = feed_all(&mut editor, b"show");
        assert!(lines.is_empty());
        assert_eq!(editor.buffer(), "show");
        assert_eq!(out, b"show");
    }

    #[test]
    fn carriage_return_completes_line() {
        let mut editor = LineEditor::default();
        let (lines, out) = feed_all(&mut editor, b"help\r");
        assert_eq!(lines, ["help"]);
        assert_eq!(out, b"help");
        assert_eq!(editor.buffer(), "");
    }

    #[test]
    fn line_feed_completes_line() {
        let mut editor = LineEditor::default();
        let (lines, _) = feed_all(&mut editor, b"help\n");
        assert_eq!(lines, ["help"]);
    }

    #[test]
    fn crlf_is_one_terminator() {
        let mut editor = LineEditor::default();
        let (lines, _) = feed_all(&mut editor, b"a\r\nb\r\0c\n\n");
        assert_eq!(lines, ["a", "b", "c", ""]);
    }

    #[test]
    fn lone_crs_each_terminate() {
        let mut editor = LineEditor::default();
        let (lines, _) = feed_all(&mut editor, b"\r\r");
        assert_eq!(lines, ["", ""]);
    }

    #[test]
    fn backspace_erases_last_char() {
        let mut editor = LineEditor::default();
        let (_, out) = feed_all(&mut editor, b"shox\x7fw");
        assert_eq!(editor.buffer(), "show");
        assert_eq!(out, b"shox\x08 \x08w");
    }

    #[test]
    fn ctrl_h_also_erases() {
        let mut editor = LineEditor::default();
        feed_all(&mut editor, b"ab\x08");
        assert_eq!(editor.buffer(), "a");
    }

    #[test]
    fn backspace_on_empty_buffer_emits_nothing() {
        let mut editor = LineEditor::default();
        let (lines, out) = feed_all(&mut editor, b"\x7f\x7f\x08");
        assert!(lines.is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn control_and_high_bytes_are_dropped() {
        let mut editor = LineEditor::default();
        let (_, out) = feed_all(&mut editor, b"a\x01\x1b\xffb\t");
        assert_eq!(editor.buffer(), "ab");
        assert_eq!(out, b"ab");
    }

    #[test]
    fn echo_off_buffers_silently() {
        let mut editor = LineEditor::new(Echo::Off);
        let (lines, out) = feed_all(&mut editor, b"secrex\x7ft\r");
        assert_eq!(lines, ["secret"]);
        assert!(out.is_empty());
    }

    #[test]
    fn overlong_input_is_truncated_without_echo() {
        let mut editor = LineEditor::default();
        let input = vec![b'x'; MAX_LINE_LEN + 10];
        let (_, out) = feed_all(&mut editor, &input);
        assert_eq!(editor.buffer().len(), MAX_LINE_LEN);
        assert_eq!(out.len(), MAX_LINE_LEN);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        /// Printable bytes or DEL, so every byte is either kept or erases.
        fn keystroke() -> impl Strategy<Value = u8> {
            prop_oneof![4 => 0x20u8..=0x7e, 1 => Just(DELETE)]
        }

        proptest! {
            #[test]
            fn backspace_removes_preceding_char(keys in proptest::collection::vec(keystroke(), 0..200)) {
                let mut expected = String::new();
                let mut expected_echo = Vec::new();
                for &k in &keys {
                    if k == DELETE {
                        if expected.pop().is_some() {
                            expected_echo.extend_from_slice(ERASE_SEQUENCE);
                        }
                    } else {
                        expected.push(char::from(k));
                        expected_echo.push(k);
                    }
                }

                let mut editor = LineEditor::default();
                let mut out = Vec::new();
                for &k in &keys {
                    prop_assert!(editor.feed(k, &mut out).is_none());
                }
                prop_assert_eq!(editor.buffer(), expected.as_str());
                prop_assert_eq!(out, expected_echo);
            }
        }
    }
}

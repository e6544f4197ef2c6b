//! Single-line text input buffer with cursor tracking.

/// Editable text buffer for inline row editing and the add-task row.
///
/// The cursor is a character index; conversion to byte offsets happens
/// internally so multi-byte input stays safe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    /// Creates an empty input.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: String::new(),
            cursor: 0,
        }
    }

    /// Creates an input pre-filled with `value`, cursor at the end.
    #[must_use]
    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    /// Current buffer contents.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Current cursor position in characters.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Consumes the input, returning the buffer.
    #[must_use]
    pub fn into_value(self) -> String {
        self.value
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map_or(self.value.len(), |(i, _)| i)
    }

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, c: char) {
        let idx = self.byte_index();
        self.value.insert(idx, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn delete_backward(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let idx = self.byte_index();
            self.value.remove(idx);
        }
    }

    /// Delete the character at the cursor.
    pub fn delete_forward(&mut self) {
        if self.cursor < self.value.chars().count() {
            let idx = self.byte_index();
            self.value.remove(idx);
        }
    }

    /// Move cursor left.
    pub const fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    /// Move cursor right.
    pub fn move_right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    /// Move cursor to the start of the buffer.
    pub const fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Move cursor to the end of the buffer.
    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_delete() {
        let mut input = TextInput::new();
        input.insert_char('h');
        input.insert_char('i');
        assert_eq!(input.value(), "hi");
        input.delete_backward();
        assert_eq!(input.value(), "h");
    }

    #[test]
    fn insert_in_the_middle() {
        let mut input = TextInput::with_value("hllo");
        input.move_home();
        input.move_right();
        input.insert_char('e');
        assert_eq!(input.value(), "hello");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn multibyte_editing_stays_on_char_boundaries() {
        let mut input = TextInput::with_value("水やり");
        assert_eq!(input.cursor(), 3);
        input.delete_backward();
        assert_eq!(input.value(), "水や");
        input.move_home();
        input.delete_forward();
        assert_eq!(input.value(), "や");
        input.insert_char('に');
        assert_eq!(input.value(), "にや");
    }

    #[test]
    fn cursor_clamps_at_both_ends() {
        let mut input = TextInput::with_value("ab");
        input.move_left();
        input.move_left();
        input.move_left();
        assert_eq!(input.cursor(), 0);
        input.move_end();
        input.move_right();
        assert_eq!(input.cursor(), 2);
    }
}

/// Single-line text input with a byte-offset cursor kept on char boundaries.
#[derive(Debug, Clone, Default)]
pub struct TextField {
    text: String,
    cursor: usize,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn set<T: Into<String>>(&mut self, value: T) {
        self.text = value.into();
        self.cursor = self.text.len();
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\r' || ch == '\n' {
            return;
        }
        let mut buf = [0u8; 4];
        let encoded = ch.encode_utf8(&mut buf);
        self.text.insert_str(self.cursor, encoded);
        self.cursor += encoded.len();
    }

    pub fn backspace(&mut self) {
        if let Some((idx, _)) = self.text[..self.cursor].char_indices().next_back() {
            self.text.drain(idx..self.cursor);
            self.cursor = idx;
        }
    }

    pub fn delete_char(&mut self) {
        if let Some(ch) = self.text[self.cursor..].chars().next() {
            let end = self.cursor + ch.len_utf8();
            self.text.drain(self.cursor..end);
        }
    }

    pub fn move_left(&mut self) {
        if let Some((idx, _)) = self.text[..self.cursor].char_indices().next_back() {
            self.cursor = idx;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(ch) = self.text[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    /// Text before the cursor, for placing the terminal cursor.
    pub fn before_cursor(&self) -> &str {
        &self.text[..self.cursor]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn edits_at_cursor_respect_multibyte_chars() {
        let mut field = TextField::new();
        field.set("Dig");
        field.move_left();
        field.insert_char('é');
        assert_eq!(field.as_str(), "Diég");
        field.backspace();
        assert_eq!(field.as_str(), "Dig");
        field.move_home();
        field.delete_char();
        assert_eq!(field.as_str(), "ig");
        field.move_end();
        field.insert_char('s');
        assert_eq!(field.as_str(), "igs");
        assert_eq!(field.before_cursor(), "igs");
    }

    #[test]
    fn newlines_are_ignored() {
        let mut field = TextField::new();
        field.insert_char('\n');
        field.insert_char('a');
        assert_eq!(field.as_str(), "a");
        assert_eq!(field.cursor(), 1);
    }
}

use crossterm::event::{KeyCode, KeyModifiers};

/// Single-line text input; `cursor` is a byte offset on a char boundary
#[derive(Default, Clone, Debug)]
pub struct TextInput {
    pub text: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.text[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.text.len())
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.prev_boundary();
            self.text.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.len() {
            let next = self.next_boundary();
            self.text.drain(self.cursor..next);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.prev_boundary();
    }

    pub fn move_right(&mut self) {
        self.cursor = self.next_boundary();
    }

    /// Delete back to the start of the previous word
    pub fn delete_word(&mut self) {
        let before = &self.text[..self.cursor];
        let end_of_word = before.trim_end().len();
        let start = before[..end_of_word]
            .rfind(char::is_whitespace)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.text.drain(start..self.cursor);
        self.cursor = start;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Handle a key event, returns true if the event was consumed
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let has_ctrl = modifiers.contains(KeyModifiers::CONTROL);
        let has_alt = modifiers.contains(KeyModifiers::ALT);

        match code {
            KeyCode::Char('u') if has_ctrl => self.clear(),
            KeyCode::Char('w') if has_ctrl => self.delete_word(),
            KeyCode::Backspace if has_alt => self.delete_word(),
            KeyCode::Char('a') if has_ctrl => self.cursor = 0,
            KeyCode::Char('e') if has_ctrl => self.cursor = self.text.len(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.text.len(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Char(c) if !has_ctrl && !has_alt => self.insert_char(c),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> TextInput {
        let mut input = TextInput::new();
        for c in s.chars() {
            input.insert_char(c);
        }
        input
    }

    #[test]
    fn test_edit_multibyte() {
        let mut input = typed("crème");
        input.move_left();
        input.move_left();
        input.backspace();
        assert_eq!(input.text, "crme");
        input.delete();
        assert_eq!(input.text, "cre");
        assert_eq!(input.cursor, 2);
    }

    #[test]
    fn test_delete_word() {
        let mut input = typed("beef wellington  ");
        input.delete_word();
        assert_eq!(input.text, "beef ");
        input.delete_word();
        assert_eq!(input.text, "");
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn test_ctrl_chars_are_not_inserted() {
        let mut input = typed("pie");
        assert!(!input.handle_key(KeyCode::Char('x'), KeyModifiers::CONTROL));
        assert!(input.handle_key(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(input.text, "");
    }
}

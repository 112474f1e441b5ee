use serde::Serialize;

/// A diagnostic produced while validating one fragment.
///
/// The `Display` text of each variant is the exact line printed on the
/// verdict channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A character no token rule matches. The lexer skips it and continues.
    #[error("Illegal character '{ch}'")]
    IllegalCharacter { ch: char, line: u32 },

    /// The grammar engine found no valid action for this token.
    #[error("Syntax error : '{text}'")]
    UnexpectedToken { text: String, line: u32 },

    /// The fragment ended where the grammar still expected input.
    #[error("Syntax error: unexpected end of input")]
    UnexpectedEof { line: u32 },
}

impl Diagnostic {
    pub fn illegal_character(ch: char, line: u32) -> Self {
        Diagnostic::IllegalCharacter { ch, line }
    }

    pub fn unexpected_token(text: impl Into<String>, line: u32) -> Self {
        Diagnostic::UnexpectedToken {
            text: text.into(),
            line,
        }
    }

    pub fn unexpected_eof(line: u32) -> Self {
        Diagnostic::UnexpectedEof { line }
    }

    /// 1-based source line the diagnostic points at.
    pub fn line(&self) -> u32 {
        match self {
            Diagnostic::IllegalCharacter { line, .. }
            | Diagnostic::UnexpectedToken { line, .. }
            | Diagnostic::UnexpectedEof { line } => *line,
        }
    }

    /// True for grammar defects, false for lexical defects.
    pub fn is_syntax_error(&self) -> bool {
        !matches!(self, Diagnostic::IllegalCharacter { .. })
    }

    /// Serialize with the rendered message alongside the structured fields.
    pub fn to_json_value(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        if let serde_json::Value::Object(map) = &mut value {
            map.insert(
                "message".to_owned(),
                serde_json::Value::String(self.to_string()),
            );
        }
        value
    }
}

//! Command Classification

use crate::mode;

/// One received command line, normalized and classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Adapter configuration command (`AT...`), full upper-case text
    At(String),
    /// Mode 01 request; holds the four-character PID (`010C`) or the
    /// whole line when it is shorter than that
    CurrentData(String),
    /// Anything else, including an empty line
    Other(String),
}

impl Command {
    /// Normalize a raw line and classify it.
    ///
    /// All whitespace is removed and the text is upper-cased, so
    /// ` at z ` and `ATZ` are the same command.
    pub fn parse(line: &str) -> Self {
        let text: String = line
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();

        if text.starts_with("AT") {
            Command::At(text)
        } else if text.starts_with(mode::CURRENT_DATA) {
            let pid = text.get(..4).map(str::to_string).unwrap_or(text);
            Command::CurrentData(pid)
        } else {
            Command::Other(text)
        }
    }

    /// Normalized command text
    pub fn as_str(&self) -> &str {
        match self {
            Command::At(text) | Command::CurrentData(text) | Command::Other(text) => text,
        }
    }
}

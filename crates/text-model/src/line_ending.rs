//! Line ending helpers.
//!
//! Lines are stored without their terminators. The model remembers a single line ending which
//! is used whenever lines are joined back into text (reads, inverse operations, change events).

use crate::text::first_line_break;

/// The newline sequence a model joins its lines with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// Unix-style LF (`'\n'`).
    #[default]
    Lf,
    /// Windows-style CRLF (`"\r\n"`).
    Crlf,
}

impl LineEnding {
    /// Detect the line ending of a source text.
    ///
    /// Policy: the first line break decides. `"\r\n"` yields [`LineEnding::Crlf`], any other break
    /// yields [`LineEnding::Lf`], and a text without breaks yields `fallback`.
    pub fn detect_in_text(text: &str, fallback: Self) -> Self {
        match first_line_break(text) {
            Some("\r\n") => Self::Crlf,
            Some(_) => Self::Lf,
            None => fallback,
        }
    }

    /// The newline sequence.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }

    /// Length of the newline sequence in UTF-16 code units (and in code points).
    pub fn sequence_len(self) -> usize {
        match self {
            Self::Lf => 1,
            Self::Crlf => 2,
        }
    }
}

/// Which line ending to use when reading text out of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EolPreference {
    /// Use the model's own line ending.
    #[default]
    TextDefined,
    /// Force LF.
    Lf,
    /// Force CRLF.
    Crlf,
}

impl EolPreference {
    pub(crate) fn resolve(self, model_eol: LineEnding) -> LineEnding {
        match self {
            Self::TextDefined => model_eol,
            Self::Lf => LineEnding::Lf,
            Self::Crlf => LineEnding::Crlf,
        }
    }
}

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// quick-xml が検出した不正なマークアップ
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ツリー構造としての不正（ルート欠落、閉じタグ不足など）
    #[error("malformed XML: {0}")]
    Parse(String),

    #[error("value of <{tag}> is not a number: {text:?}")]
    ValueFormat { tag: String, text: String },

    #[error("coordinate components have unequal lengths: {}", format_counts(.counts))]
    ShapeMismatch { counts: Vec<(String, usize)> },

    #[error("{shape} needs at least {required} points, got {actual}")]
    InsufficientPoints {
        shape: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("column {name} has {actual} rows, table has {expected}")]
    ColumnLength {
        name: String,
        expected: usize,
        actual: usize,
    },
}

impl Error {
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// 行単位で回復可能なエラーの分類。テーブル単位のエラーは `None`
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Xml(_) | Error::Parse(_) => Some(ErrorKind::Parse),
            Error::ValueFormat { .. } => Some(ErrorKind::ValueFormat),
            Error::ShapeMismatch { .. } => Some(ErrorKind::ShapeMismatch),
            Error::InsufficientPoints { .. } => Some(ErrorKind::InsufficientPoints),
            Error::ColumnNotFound(_) | Error::ColumnLength { .. } => None,
        }
    }
}

fn format_counts(counts: &[(String, usize)]) -> String {
    counts
        .iter()
        .map(|(tag, count)| format!("{}={}", tag, count))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    ValueFormat,
    ShapeMismatch,
    InsufficientPoints,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Parse => "parse",
            ErrorKind::ValueFormat => "value-format",
            ErrorKind::ShapeMismatch => "shape-mismatch",
            ErrorKind::InsufficientPoints => "insufficient-points",
        };
        f.write_str(name)
    }
}

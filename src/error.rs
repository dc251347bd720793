//! Unified error type for htmlpdf
//!
//! `HtmlParser::parse` reports failure as `None`; the reason is available
//! through `HtmlParser::try_parse`, which returns this error.

use core::fmt;

/// Reason an HTML fragment produced no chunk tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HtmlError {
    /// Input was empty after whitespace normalization
    EmptyInput,
    /// Input exceeded the configured byte limit
    InputTooLarge {
        /// Input length in bytes.
        len: usize,
        /// Configured maximum.
        max: usize,
    },
    /// Element nesting exceeded the configured depth limit
    DepthExceeded {
        /// Configured maximum open-element depth.
        max: usize,
    },
    /// The markup could not be loaded
    Parse(String),
    /// The document has no `<body>` element
    MissingBody,
    /// The body produced no chunks
    Empty,
    /// The chunk tree rejected a structural edit
    Tree(TreeError),
}

/// Rejected chunk tree edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TreeError {
    /// The handle does not belong to this tree
    UnknownChunk,
    /// Text, line-break and page-break chunks take no children
    LeafParent,
    /// The child is the parent itself or one of its ancestors
    Cycle,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::UnknownChunk => write!(f, "unknown chunk handle"),
            TreeError::LeafParent => write!(f, "leaf chunks cannot have children"),
            TreeError::Cycle => write!(f, "chunk cannot be added below itself"),
        }
    }
}

impl std::error::Error for TreeError {}

impl fmt::Display for HtmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HtmlError::EmptyInput => write!(f, "input is empty"),
            HtmlError::InputTooLarge { len, max } => {
                write!(f, "input too large ({} > {} bytes)", len, max)
            }
            HtmlError::DepthExceeded { max } => {
                write!(f, "element nesting exceeds max depth {}", max)
            }
            HtmlError::Parse(msg) => write!(f, "Parse error: {}", msg),
            HtmlError::MissingBody => write!(f, "document has no <body> element"),
            HtmlError::Empty => write!(f, "document body has no content"),
            HtmlError::Tree(err) => write!(f, "Tree error: {}", err),
        }
    }
}

impl std::error::Error for HtmlError {}

impl From<TreeError> for HtmlError {
    fn from(err: TreeError) -> Self {
        HtmlError::Tree(err)
    }
}

impl From<quick_xml::Error> for HtmlError {
    fn from(err: quick_xml::Error) -> Self {
        HtmlError::Parse(format!("XML error: {:?}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_error_display() {
        let err = HtmlError::Parse("bad markup".into());
        assert_eq!(format!("{}", err), "Parse error: bad markup");
    }

    #[test]
    fn test_input_too_large_display() {
        let err = HtmlError::InputTooLarge { len: 20, max: 10 };
        let display = format!("{}", err);
        assert!(display.contains("20 > 10"));
    }

    #[test]
    fn test_tree_error_converts() {
        let err: HtmlError = TreeError::Cycle.into();
        assert_eq!(err, HtmlError::Tree(TreeError::Cycle));
        assert!(format!("{}", err).starts_with("Tree error"));
    }

    #[test]
    fn test_missing_body_debug() {
        assert_eq!(format!("{:?}", HtmlError::MissingBody), "MissingBody");
    }
}

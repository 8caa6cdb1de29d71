use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("io error while reading document: {0}")]
    Io(#[from] std::io::Error),

    #[error("charset error: {0}")]
    Charset(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomError {
    #[error("invalid css selector: {0}")]
    InvalidSelector(String),

    #[error("node is not an element")]
    NotAnElement,
}

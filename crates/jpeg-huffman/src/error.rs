#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Leaf counts or leaf values do not describe a decodable prefix tree.
    MalformedTable(&'static str),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedTable(detail) => {
                write!(f, "malformed huffman table: {detail}")
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

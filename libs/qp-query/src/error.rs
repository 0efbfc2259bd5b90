use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),

    #[error("invalid filter clause at byte {pos}: {message}")]
    InvalidFilterClause { pos: usize, message: &'static str },
}

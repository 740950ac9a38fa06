use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn unbounded_cardinality(operation: &'static str) -> Error {
        Error(ErrorKind::UnboundedCardinality { operation }.into())
    }

    pub fn unbounded_sequence() -> Error {
        Error(ErrorKind::UnboundedSequence.into())
    }

    pub fn mixed_encoding_family(left: impl ToString, right: impl ToString) -> Error {
        Error(
            ErrorKind::MixedEncodingFamily {
                left: left.to_string(),
                right: right.to_string(),
            }
            .into(),
        )
    }

    pub fn index_out_of_domain(index: u64, domain_end: u64) -> Error {
        Error(ErrorKind::IndexOutOfDomain { index, domain_end }.into())
    }

    pub fn invalid_input(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidConstructionInput {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    /// Whether this error was raised because a zero-polarity vector
    /// was asked for a bounded quantity.
    pub fn is_unbounded(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::UnboundedCardinality { .. } | ErrorKind::UnboundedSequence
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("{operation} is unbounded for a zero-polarity vector")]
    UnboundedCardinality { operation: &'static str },

    #[error("unbounded position sequence requested on a zero-polarity vector without a limit")]
    UnboundedSequence,

    #[error("cannot combine {left} encoding with {right} encoding")]
    MixedEncodingFamily { left: String, right: String },

    #[error("index {index} is outside of the addressable domain [0, {domain_end})")]
    IndexOutOfDomain { index: u64, domain_end: u64 },

    #[error("invalid construction input {name}: {message}")]
    InvalidConstructionInput { name: String, message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

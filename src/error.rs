use crate::value::ValueKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Type mismatch: expected {expected} value, found {found} value")]
    TypeMismatch {
        expected: ValueKind,
        found: ValueKind
    },

    #[error(transparent)]
    Csv(#[from] csv::Error)
}

impl Error {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Error::TypeMismatch { .. })
    }
}

/// Returns `Error::InvalidArgument` from the enclosing function unless the condition holds.
macro_rules! ensure_arg {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::Error::InvalidArgument(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure_arg;

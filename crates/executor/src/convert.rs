//! Error conversion from engine error types.

use crate::Error;

/// Convert an engine error into an executor error, keeping every detail.
impl From<protean_core::Error> for Error {
    fn from(err: protean_core::Error) -> Self {
        match err {
            protean_core::Error::Validation {
                kind,
                entity,
                action,
                field,
                reason,
            } => Error::Validation {
                cause: kind,
                entity,
                action,
                field,
                reason,
            },
            protean_core::Error::UnsupportedAction { entity, action } => {
                Error::UnsupportedAction { entity, action }
            }
            protean_core::Error::Storage {
                entity,
                action,
                message,
            } => Error::Storage {
                entity,
                action,
                reason: message,
            },
        }
    }
}

/// Convert an engine result.
pub(crate) fn convert_result<T>(r: protean_core::Result<T>) -> crate::Result<T> {
    r.map_err(Error::from)
}

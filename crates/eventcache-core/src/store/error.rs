//! Maps `tokio_rusqlite::Error` and `rusqlite::Error` to `StorageError`.

use crate::error::StorageError;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
pub(crate) fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

fn map_rusqlite_error(err: &rusqlite::Error, table: &str) -> StorageError {
    match err {
        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.code == rusqlite::ErrorCode::CannotOpen =>
        {
            StorageError::ConnectionFailed(format!("Cannot open database: {err}"))
        }

        // A stored value that no longer decodes into a row
        rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => {
            StorageError::InvalidData(format!("{table}: {err}"))
        }

        _ => StorageError::QueryFailed(format!("{table}: {err}")),
    }
}

/// Main entry point for error mapping in async code.
pub(crate) fn map_call_error(err: tokio_rusqlite::Error, table: &str) -> StorageError {
    match err {
        tokio_rusqlite::Error::Rusqlite(ref rusqlite_err) => map_rusqlite_error(rusqlite_err, table),
        tokio_rusqlite::Error::ConnectionClosed => {
            StorageError::ConnectionFailed("Connection closed".to_string())
        }
        tokio_rusqlite::Error::Close(_) => {
            StorageError::ConnectionFailed("Connection closed unexpectedly".to_string())
        }
        other => StorageError::QueryFailed(format!("{table}: {other}")),
    }
}

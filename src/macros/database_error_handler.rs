/// unwrap the result of a database write. on failure the error is logged
/// and returned as a crate error, closed connections become connectivity errors.
macro_rules! db_handle_write_error {
    ( $data:expr, $target:expr, $type_str:expr) => {
        match $data {
            Ok(e) => e,
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::ClosedConnection
                | diesel::result::DatabaseErrorKind::UnableToSendCommand,
                info,
            )) => {
                error!(target:$target, "Connection closed while writing {}. (error: {})", $type_str, info.message());
                return Err(crate::errors::Error::ConnectivityError {
                    message: info.message().to_string(),
                });
            }
            Err(error) => {
                error!(target:$target, "Error writing {}. (error: {})", $type_str, error);
                return Err(crate::errors::Error::StoreError {
                    target: $type_str.to_string(),
                    source: error,
                });
            }
        }
    }
}

pub(crate) use db_handle_write_error;

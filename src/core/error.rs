//! Error types for the log service

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON configuration error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Backing file could not be opened, grown or mapped
    #[error("Mapping failed for '{path}': {message}")]
    MappingError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Raw level value outside 1..=6
    #[error("Invalid log level value: {0}")]
    InvalidLevel(u8),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a mapping error
    pub fn mapping(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::MappingError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("ServiceConfig", "empty service name");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::mapping("/var/log/app.log", "Permission denied");
        assert!(matches!(err, LoggerError::MappingError { .. }));

        let err = LoggerError::InvalidLevel(9);
        assert!(matches!(err, LoggerError::InvalidLevel(9)));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::file_rotation("/var/log/app.log", "Disk full");
        assert_eq!(
            err.to_string(),
            "File rotation failed for '/var/log/app.log': Disk full"
        );

        let err = LoggerError::mapping("/tmp/a.log", "No space left on device");
        assert_eq!(
            err.to_string(),
            "Mapping failed for '/tmp/a.log': No space left on device"
        );

        assert_eq!(LoggerError::InvalidLevel(0).to_string(), "Invalid log level value: 0");
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("creating log root", "cannot create directory", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("creating log root"));
        assert!(err.to_string().contains("cannot create directory"));
    }
}

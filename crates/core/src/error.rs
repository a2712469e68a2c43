use thiserror::Error;

/// Top-level error type used across the entire application.
#[derive(Debug, Error)]
pub enum SidebarError {
    #[error("config error: {0}")]
    Config(String),

    #[error("state store error: {0}")]
    State(String),

    #[error("calendar error: {0}")]
    Calendar(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = SidebarError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_layer() {
        assert_eq!(
            SidebarError::Calendar("Familie: bad table".into()).to_string(),
            "calendar error: Familie: bad table"
        );
        assert_eq!(
            SidebarError::State("not found".into()).to_string(),
            "state store error: not found"
        );

        let io: SidebarError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(io, SidebarError::Io { .. }));
    }
}

use reactor::error::ReactorError;
use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;

/// Returns whether terminal output should include backtraces.
fn should_render_backtrace() -> bool {
    matches!(
        std::env::var("RUST_BACKTRACE").as_deref(),
        Ok("1") | Ok("full")
    )
}

/// Result type for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Backtrace captured when an infrastructure error is created.
pub struct CapturedBacktrace(Backtrace);

impl CapturedBacktrace {
    fn capture() -> Self {
        Self(Backtrace::capture())
    }
}

impl fmt::Debug for CapturedBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type of the runner binary.
#[derive(Debug)]
pub enum RunnerError {
    /// A stream or catalog operation failed.
    Reactor(ReactorError),
    /// Configuration could not be loaded or is invalid.
    Config(Box<dyn Error + Send + Sync>, CapturedBacktrace),
    /// The runtime could not be started.
    Io(std::io::Error, CapturedBacktrace),
}

impl RunnerError {
    /// Returns a short category label for this error.
    pub fn category(&self) -> &'static str {
        match self {
            RunnerError::Reactor(_) => "stream error",
            RunnerError::Config(_, _) => "configuration error",
            RunnerError::Io(_, _) => "i/o error",
        }
    }

    /// Returns the backtrace for this error.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self {
            RunnerError::Reactor(err) => Some(err.backtrace()),
            RunnerError::Config(_, captured) | RunnerError::Io(_, captured) => Some(&captured.0),
        }
    }

    /// Creates a configuration error from any error.
    pub fn config<E: Error + Send + Sync + 'static>(err: E) -> Self {
        RunnerError::Config(Box::new(err), CapturedBacktrace::capture())
    }

    /// Returns a report of the error and its causes for terminal output.
    pub fn render_report(&self) -> String {
        let mut out = String::new();
        out.push_str("runner failed\n");
        out.push_str(&format!("category: {}\n", self.category()));
        out.push_str(&format!("error: {self}\n"));

        let mut source = Error::source(self);
        let mut idx = 1usize;
        while let Some(err) = source {
            out.push_str(&format!("cause {idx}: {err}\n"));
            source = err.source();
            idx += 1;
        }

        if should_render_backtrace()
            && let Some(backtrace) = self.backtrace()
        {
            out.push_str("backtrace:\n");
            out.push_str(&backtrace.to_string());
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }

        out
    }
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunnerError::Reactor(err) => write!(f, "{err}"),
            RunnerError::Config(source, _) => write!(f, "configuration error: {source}"),
            RunnerError::Io(source, _) => write!(f, "i/o error: {source}"),
        }
    }
}

impl Error for RunnerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RunnerError::Reactor(err) => err.source(),
            RunnerError::Config(source, _) => Some(source.as_ref()),
            RunnerError::Io(source, _) => Some(source),
        }
    }
}

impl From<std::io::Error> for RunnerError {
    fn from(err: std::io::Error) -> Self {
        RunnerError::Io(err, CapturedBacktrace::capture())
    }
}

impl From<ReactorError> for RunnerError {
    fn from(err: ReactorError) -> Self {
        RunnerError::Reactor(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reactor::error::ErrorKind;
    use reactor_config::shared::ValidationError;

    #[test]
    fn report_lists_category_and_causes() {
        let err = RunnerError::config(ValidationError::InvalidFieldValue {
            field: "interval.limit".to_string(),
            constraint: "must be greater than 0".to_string(),
        });

        let report = err.render_report();

        assert!(report.starts_with("runner failed\n"));
        assert!(report.contains("category: configuration error"));
        assert!(report.contains("cause 1: invalid value for `interval.limit`"));
    }

    #[test]
    fn reactor_errors_keep_their_message() {
        let err = RunnerError::from(ReactorError::from((
            ErrorKind::RetryExhausted,
            "Source kept failing after all retries",
        )));

        assert_eq!(err.category(), "stream error");
        assert!(err.to_string().contains("Source kept failing"));
    }
}

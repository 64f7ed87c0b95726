use std::error::Error;
use std::fmt::Debug;
use std::fmt::Display;

pub struct Exception {
    pub severity: Severity,
    pub code: Option<String>,
    pub message: String,
    pub location: Option<String>,
    pub source: Option<Box<Exception>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Error,
}

impl Exception {
    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

impl Debug for Exception {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Exception {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut index = 0;
        let mut current = Some(self);
        while let Some(exception) = current {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{index}: ")?;
            if let Some(ref code) = exception.code {
                write!(f, "[{code}] ")?;
            }
            write!(f, "{}", exception.message)?;
            if let Some(ref location) = exception.location {
                write!(f, " at {location}")?;
            }
            index += 1;
            current = exception.source.as_deref();
        }
        Ok(())
    }
}

/// Builds an [`Exception`] at the call site, e.g.
/// `exception!(code = "FILE_READ_ERROR", message = "failed to read file", source = err)`.
#[macro_export]
macro_rules! exception {
    ($(severity = $severity:expr,)? $(code = $code:expr,)? message = $message:expr $(,source = $source:expr)?) => {{
        let severity = $crate::exception::Severity::Error;
        $(
            let severity = $severity;
        )?
        let code: Option<String> = None;
        $(
            let code = Some($code.to_string());
        )?
        let source: Option<Box<$crate::exception::Exception>> = None;
        $(
            drop(source);
            let source: Option<Box<$crate::exception::Exception>> = Some(Box::new($source.into()));
        )?
        $crate::exception::Exception {
            severity,
            code,
            message: $message.to_string(),
            location: Some(format!("{}:{}:{}", file!(), line!(), column!())),
            source,
        }
    }};
}

fn source_chain(source: Option<&(dyn Error + 'static)>) -> Option<Box<Exception>> {
    let mut sources = Vec::new();
    let mut current = source;
    while let Some(error) = current {
        sources.push(error);
        current = error.source();
    }

    let mut result = None;
    for error in sources.into_iter().rev() {
        result = Some(Box::new(Exception {
            severity: Severity::Error,
            code: None,
            message: error.to_string(),
            location: None,
            source: result,
        }));
    }
    result
}

impl<T> From<T> for Exception
where
    T: Error + 'static,
{
    fn from(error: T) -> Self {
        Exception {
            severity: Severity::Error,
            code: None,
            message: error.to_string(),
            location: None,
            source: source_chain(error.source()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn display_renders_source_chain() {
        let error = io::Error::new(io::ErrorKind::NotFound, "no such file");
        let exception = exception!(code = "FILE_READ_ERROR", message = "failed to read file", source = error);

        let text = exception.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0: [FILE_READ_ERROR] failed to read file at "));
        assert_eq!(lines[1], "1: no such file");
    }

    #[test]
    fn macro_defaults_to_error_severity() {
        let exception = exception!(message = "boom");
        assert_eq!(exception.severity, Severity::Error);
        assert!(exception.code.is_none());
        assert!(exception.location.is_some());

        let exception = exception!(severity = Severity::Warn, code = "CODE", message = "careful");
        assert_eq!(exception.severity, Severity::Warn);
        assert!(exception.has_code("CODE"));
        assert!(!exception.has_code("OTHER"));
    }

    #[derive(Debug)]
    struct WrappedError(io::Error);

    impl Display for WrappedError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "wrapped")
        }
    }

    impl Error for WrappedError {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn from_error_keeps_nested_sources() {
        let exception = Exception::from(WrappedError(io::Error::other("inner")));

        assert_eq!(exception.message, "wrapped");
        assert!(exception.location.is_none());
        let source = exception.source.as_ref().map(|s| s.message.as_str());
        assert_eq!(source, Some("inner"));
    }
}

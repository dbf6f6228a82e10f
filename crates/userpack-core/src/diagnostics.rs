use std::fmt;
use std::sync::Mutex;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Info,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level_str = match self {
            DiagnosticLevel::Error => "error",
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Info => "info",
        };
        f.write_str(level_str)
    }
}

/// A diagnostic message, optionally tied to the external module or
/// metadata key it concerns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub subject: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(subject: Option<&str>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, subject, message)
    }

    pub fn warning(subject: Option<&str>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warning, subject, message)
    }

    pub fn info(subject: Option<&str>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, subject, message)
    }

    fn new(level: DiagnosticLevel, subject: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            level,
            subject: subject.map(str::to_string),
            message: message.into(),
        }
    }
}

/// Trait for handling diagnostics
/// This allows for dependency injection and testing with mock handlers
pub trait DiagnosticHandler: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);

    fn error(&self, subject: Option<&str>, message: &str) {
        self.report(Diagnostic::error(subject, message));
    }

    fn warning(&self, subject: Option<&str>, message: &str) {
        self.report(Diagnostic::warning(subject, message));
    }

    fn info(&self, subject: Option<&str>, message: &str) {
        self.report(Diagnostic::info(subject, message));
    }

    fn has_errors(&self) -> bool;
    fn error_count(&self) -> usize;
    fn warning_count(&self) -> usize;
    fn get_diagnostics(&self) -> Vec<Diagnostic>;
}

/// Shared bookkeeping for the handlers below
#[derive(Default)]
struct DiagnosticLog {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticLog {
    fn push(&self, diagnostic: Diagnostic) {
        self.lock().push(diagnostic);
    }

    fn count(&self, level: DiagnosticLevel) -> usize {
        self.lock().iter().filter(|d| d.level == level).count()
    }

    fn snapshot(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        // A panic while holding the lock leaves the Vec intact
        self.diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Console-based diagnostic handler that prints to stderr
pub struct ConsoleDiagnosticHandler {
    log: DiagnosticLog,
    pretty: bool,
}

impl ConsoleDiagnosticHandler {
    pub fn new(pretty: bool) -> Self {
        Self {
            log: DiagnosticLog::default(),
            pretty,
        }
    }
}

impl DiagnosticHandler for ConsoleDiagnosticHandler {
    fn report(&self, diagnostic: Diagnostic) {
        let subject = diagnostic
            .subject
            .as_deref()
            .map(|s| format!(" [{}]", s))
            .unwrap_or_default();

        if self.pretty {
            eprintln!(
                "\x1b[1m{}\x1b[0m{}: {}",
                diagnostic.level, subject, diagnostic.message
            );
        } else {
            eprintln!("{}{}: {}", diagnostic.level, subject, diagnostic.message);
        }

        self.log.push(diagnostic);
    }

    fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    fn error_count(&self) -> usize {
        self.log.count(DiagnosticLevel::Error)
    }

    fn warning_count(&self) -> usize {
        self.log.count(DiagnosticLevel::Warning)
    }

    fn get_diagnostics(&self) -> Vec<Diagnostic> {
        self.log.snapshot()
    }
}

/// Collecting diagnostic handler for testing
/// Collects all diagnostics without printing
#[derive(Default)]
pub struct CollectingDiagnosticHandler {
    log: DiagnosticLog,
}

impl CollectingDiagnosticHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticHandler for CollectingDiagnosticHandler {
    fn report(&self, diagnostic: Diagnostic) {
        self.log.push(diagnostic);
    }

    fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    fn error_count(&self) -> usize {
        self.log.count(DiagnosticLevel::Error)
    }

    fn warning_count(&self) -> usize {
        self.log.count(DiagnosticLevel::Warning)
    }

    fn get_diagnostics(&self) -> Vec<Diagnostic> {
        self.log.snapshot()
    }
}

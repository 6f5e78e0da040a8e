//! Showing messages to whoever triggered an action.

/// Shows a message to the user and returns once it has been shown.
///
/// Used where there is no caller left to hand an error to, e.g. at the end of
/// an export.
pub trait Notifier {
    fn alert(&self, message: &str);
}

/// Writes alerts to stderr.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}

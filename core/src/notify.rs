//! User-facing error notifications.
//!
//! Every failed call reports exactly one notification before the error is
//! returned to the caller. Hosts plug their own surface in (a toast, a status
//! bar); the default only emits a tracing event.

/// Receives the text of every failed request.
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

/// Logs notifications at `error` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        tracing::error!(target: "console_api::notify", "{message}");
    }
}

impl<F> Notifier for F
where
    F: Fn(&str) + Send + Sync,
{
    fn error(&self, message: &str) {
        self(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn closures_are_notifiers() {
        let seen = Mutex::new(Vec::new());
        let notifier = |msg: &str| seen.lock().unwrap().push(msg.to_string());
        notifier.error("fail to request");
        assert_eq!(*seen.lock().unwrap(), vec!["fail to request".to_string()]);
    }

    #[test]
    fn tracing_notifier_does_not_panic_without_subscriber() {
        TracingNotifier.error("Record not found");
    }
}

use std::time::{Duration, Instant};

pub const DEFAULT_INFO_TTL: Duration = Duration::from_millis(3000);
pub const DEFAULT_ERROR_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

/// A transient message that disappears on its own.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    expires_at: Instant,
}

impl Toast {
    pub fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Clone)]
pub struct Toasts {
    items: Vec<Toast>,
    info_ttl: Duration,
    error_ttl: Duration,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(DEFAULT_INFO_TTL, DEFAULT_ERROR_TTL)
    }
}

impl Toasts {
    pub fn new(info_ttl: Duration, error_ttl: Duration) -> Self {
        Self {
            items: Vec::new(),
            info_ttl,
            error_ttl,
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message.into(), ToastLevel::Info, Instant::now());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message.into(), ToastLevel::Error, Instant::now());
    }

    fn push(&mut self, message: String, level: ToastLevel, now: Instant) {
        let ttl = match level {
            ToastLevel::Info => self.info_ttl,
            ToastLevel::Error => self.error_ttl,
        };
        self.items.push(Toast {
            message,
            level,
            expires_at: now + ttl,
        });
    }

    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|t| t.is_live(now));
    }

    pub fn live(&self, now: Instant) -> impl Iterator<Item = &Toast> {
        self.items.iter().filter(move |t| t.is_live(now))
    }

    /// Every message pushed and not yet pruned, newest last.
    pub fn messages(&self) -> Vec<&str> {
        self.items.iter().map(|t| t.message.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_outlive_infos() {
        let start = Instant::now();
        let mut toasts = Toasts::new(Duration::from_millis(100), Duration::from_millis(500));
        toasts.push("saved".into(), ToastLevel::Info, start);
        toasts.push("Error: boom".into(), ToastLevel::Error, start);

        assert_eq!(toasts.live(start).count(), 2);

        let later = start + Duration::from_millis(200);
        let live: Vec<&str> = toasts.live(later).map(|t| t.message.as_str()).collect();
        assert_eq!(live, vec!["Error: boom"]);

        toasts.prune(start + Duration::from_millis(600));
        assert!(toasts.messages().is_empty());
    }
}

use crate::models::NotificationSettings;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Transient success/failure feedback.
///
/// Implementations display a banner and return immediately; the controller never waits
/// for dismissal.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    fn notify_success(&self, text: &str);
    fn notify_failure(&self, text: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Failure,
}

/// A banner currently on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub id: u64,
    pub kind: BannerKind,
    pub text: String,
    pub expires_at: Instant,
}

impl Banner {
    /// Terminal rendering of the banner
    pub fn render(&self) -> String {
        match self.kind {
            BannerKind::Success => format!("✅ {}", self.text),
            BannerKind::Failure => format!("❌ {}", self.text),
        }
    }
}

#[derive(Debug, Default)]
struct BannerStack {
    next_id: u64,
    banners: Vec<Banner>,
}

/// Stack of auto-dismissing banners.
///
/// Banners stack in the order they were raised. Each one disappears once its display
/// duration has elapsed; expired banners are dropped lazily whenever the stack is read
/// or pushed to, so no timer task is needed.
#[derive(Debug)]
pub struct BannerBoard {
    success_ttl: Duration,
    failure_ttl: Duration,
    echo: bool,
    stack: Mutex<BannerStack>,
}

impl BannerBoard {
    pub fn new(success_ttl: Duration, failure_ttl: Duration) -> Self {
        Self {
            success_ttl,
            failure_ttl,
            echo: false,
            stack: Mutex::new(BannerStack::default()),
        }
    }

    pub fn from_settings(settings: &NotificationSettings) -> Self {
        Self::new(
            Duration::from_secs(settings.success_secs),
            Duration::from_secs(settings.failure_secs),
        )
    }

    /// Also print each banner to stdout when it is raised
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Banners that have not yet been dismissed, oldest first
    pub fn active(&self) -> Vec<Banner> {
        let mut stack = self.lock();
        Self::prune(&mut stack);
        stack.banners.clone()
    }

    fn push(&self, kind: BannerKind, text: &str) -> u64 {
        let ttl = match kind {
            BannerKind::Success => self.success_ttl,
            BannerKind::Failure => self.failure_ttl,
        };

        let mut stack = self.lock();
        Self::prune(&mut stack);

        stack.next_id += 1;
        let banner = Banner {
            id: stack.next_id,
            kind,
            text: text.to_string(),
            expires_at: Instant::now() + ttl,
        };

        if self.echo {
            println!("{}", banner.render());
        }

        let id = banner.id;
        stack.banners.push(banner);
        id
    }

    fn prune(stack: &mut BannerStack) {
        let now = Instant::now();
        stack.banners.retain(|banner| banner.expires_at > now);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BannerStack> {
        self.stack.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for BannerBoard {
    fn default() -> Self {
        Self::from_settings(&NotificationSettings::default())
    }
}

impl Notifier for BannerBoard {
    fn notify_success(&self, text: &str) {
        let id = self.push(BannerKind::Success, text);
        tracing::info!(banner = id, "Success banner: {}", text);
    }

    fn notify_failure(&self, text: &str) {
        let id = self.push(BannerKind::Failure, text);
        tracing::warn!(banner = id, "Failure banner: {}", text);
    }
}

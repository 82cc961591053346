use std::time::{Duration, Instant};

const INFO_TTL: Duration = Duration::from_secs(3);
const ERROR_TTL: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

impl Level {
    fn ttl(self) -> Duration {
        match self {
            Level::Info | Level::Success => INFO_TTL,
            Level::Error => ERROR_TTL,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub level: Level,
    shown_at: Instant,
}

impl Notice {
    pub fn expires_at(&self) -> Instant {
        self.shown_at + self.level.ttl()
    }
}

#[derive(Debug, Default)]
/// Single-slot status line. A new notice replaces the old one and restarts
/// the dismissal timer.
pub struct Notifier {
    current: Option<Notice>,
}

impl Notifier {
    pub fn show(&mut self, text: impl Into<String>, level: Level, now: Instant) {
        let text = text.into();
        match level {
            Level::Error => tracing::warn!(text = %text, "notice"),
            _ => tracing::debug!(text = %text, "notice"),
        }
        self.current = Some(Notice {
            text,
            level,
            shown_at: now,
        });
    }

    /// The notice still on screen at `now`, if any.
    pub fn current(&self, now: Instant) -> Option<&Notice> {
        self.current.as_ref().filter(|n| now < n.expires_at())
    }

    /// Time left until the visible notice should be hidden.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.current(now).map(|n| n.expires_at() - now)
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_notice_hides_after_three_seconds() {
        let t0 = Instant::now();
        let mut n = Notifier::default();
        n.show("uploaded", Level::Info, t0);

        assert_eq!(n.current(t0).map(|n| n.text.as_str()), Some("uploaded"));
        assert!(n.current(t0 + Duration::from_millis(2999)).is_some());
        assert!(n.current(t0 + Duration::from_secs(3)).is_none());
    }

    #[test]
    fn errors_stay_longer_than_info() {
        let t0 = Instant::now();
        let mut n = Notifier::default();
        n.show("bad image", Level::Error, t0);
        assert!(n.current(t0 + Duration::from_secs(4)).is_some());
        assert!(n.current(t0 + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn newer_notice_overwrites_and_restarts_timer() {
        let t0 = Instant::now();
        let mut n = Notifier::default();
        n.show("first", Level::Info, t0);
        let t1 = t0 + Duration::from_secs(2);
        n.show("second", Level::Success, t1);

        let at = t0 + Duration::from_millis(4500);
        let visible = n.current(at).expect("second notice still visible");
        assert_eq!(visible.text, "second");
        assert_eq!(visible.level, Level::Success);
        assert_eq!(n.remaining(at), Some(Duration::from_millis(500)));
    }

    #[test]
    fn dismiss_clears_immediately() {
        let t0 = Instant::now();
        let mut n = Notifier::default();
        n.show("x", Level::Info, t0);
        n.dismiss();
        assert!(n.current(t0).is_none());
        assert_eq!(n.remaining(t0), None);
    }
}

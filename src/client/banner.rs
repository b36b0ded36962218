//! Transient status banner.

use crate::domain::value_objects::Timestamp;

/// How long a message stays visible, in milliseconds.
pub const BANNER_TTL_MS: i64 = 5_000;

/// Banner tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Error,
}

/// A message and when it was shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerMessage {
    /// Tone.
    pub kind: BannerKind,
    /// Text.
    pub text: String,
    /// When it was shown.
    pub shown_at: Timestamp,
}

/// Holds the most recent message; each new message replaces the last.
#[derive(Debug, Clone, Default)]
pub struct StatusBanner {
    current: Option<BannerMessage>,
}

impl StatusBanner {
    /// Creates an empty banner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows a success message.
    pub fn success(&mut self, text: impl Into<String>, now: Timestamp) {
        self.show(BannerKind::Success, text.into(), now);
    }

    /// Shows an error message.
    pub fn error(&mut self, text: impl Into<String>, now: Timestamp) {
        self.show(BannerKind::Error, text.into(), now);
    }

    fn show(&mut self, kind: BannerKind, text: String, shown_at: Timestamp) {
        self.current = Some(BannerMessage {
            kind,
            text,
            shown_at,
        });
    }

    /// Returns the message if it is still visible at `now`.
    #[must_use]
    pub fn visible_at(&self, now: Timestamp) -> Option<&BannerMessage> {
        self.current
            .as_ref()
            .filter(|m| now.timestamp_millis() - m.shown_at.timestamp_millis() < BANNER_TTL_MS)
    }

    /// Returns the last message regardless of age.
    #[must_use]
    pub fn last(&self) -> Option<&BannerMessage> {
        self.current.as_ref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn message_expires_after_five_seconds() {
        let shown = Timestamp::from_millis(10_000).unwrap();
        let mut banner = StatusBanner::new();
        banner.success("Usuario creado en memory", shown);

        assert!(banner.visible_at(shown.add_millis(4_999)).is_some());
        assert!(banner.visible_at(shown.add_millis(5_000)).is_none());
        assert_eq!(banner.last().unwrap().kind, BannerKind::Success);
    }

    #[test]
    fn new_message_replaces_old() {
        let t0 = Timestamp::from_millis(0).unwrap();
        let mut banner = StatusBanner::new();
        banner.success("ok", t0);
        banner.error("fallo", t0.add_millis(4_000));

        let visible = banner.visible_at(t0.add_millis(8_000)).unwrap();
        assert_eq!(visible.kind, BannerKind::Error);
        assert_eq!(visible.text, "fallo");
    }

    #[test]
    fn empty_banner_shows_nothing() {
        assert!(StatusBanner::new().visible_at(Timestamp::now()).is_none());
    }
}

use deck_core::model::{Locale, Theme};
use deck_core::store::{ObservableStore, Subscription};
use tracing::warn;

/// Theme and language shared across every view.
///
/// Persisting the values is up to the host; unknown stored values fall back
/// to the defaults.
#[derive(Clone, Default)]
pub struct Preferences {
    theme: ObservableStore<Theme>,
    locale: ObservableStore<Locale>,
}

impl Preferences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from the raw strings a host persisted.
    #[must_use]
    pub fn from_stored(theme: Option<&str>, locale: Option<&str>) -> Self {
        let theme = theme
            .and_then(|raw| {
                raw.parse::<Theme>()
                    .inspect_err(|err| warn!(error = %err, "ignoring stored theme"))
                    .ok()
            })
            .unwrap_or_default();
        let locale = locale
            .and_then(|raw| {
                raw.parse::<Locale>()
                    .inspect_err(|err| warn!(error = %err, "ignoring stored locale"))
                    .ok()
            })
            .unwrap_or_default();
        Self {
            theme: ObservableStore::new(theme),
            locale: ObservableStore::new(locale),
        }
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    pub fn set_theme(&self, theme: Theme) {
        self.theme.set(theme);
    }

    pub fn toggle_theme(&self) {
        self.theme.set(self.theme.get().toggled());
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        self.locale.get()
    }

    pub fn set_locale(&self, locale: Locale) {
        self.locale.set(locale);
    }

    #[must_use = "dropping the subscription detaches the listener"]
    pub fn on_theme_change(&self, listener: impl Fn(&Theme) + Send + Sync + 'static) -> Subscription {
        self.theme.on_change(listener)
    }

    #[must_use = "dropping the subscription detaches the listener"]
    pub fn on_locale_change(
        &self,
        listener: impl Fn(&Locale) + Send + Sync + 'static,
    ) -> Subscription {
        self.locale.on_change(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn invalid_stored_values_fall_back_to_defaults() {
        let prefs = Preferences::from_stored(Some("neon"), Some("zh-TW"));
        assert_eq!(prefs.theme(), Theme::Light);
        assert_eq!(prefs.locale(), Locale::ZhTw);
    }

    #[test]
    fn listeners_see_every_change_once() {
        let prefs = Preferences::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _sub = prefs.on_theme_change({
            let seen = Arc::clone(&seen);
            move |theme| seen.lock().unwrap().push(*theme)
        });

        prefs.toggle_theme();
        prefs.set_theme(Theme::Dark);
        prefs.toggle_theme();

        assert_eq!(*seen.lock().unwrap(), vec![Theme::Dark, Theme::Light]);
    }

    #[test]
    fn locale_listener_stops_once_subscription_is_dropped() {
        let prefs = Preferences::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sub = prefs.on_locale_change({
            let seen = Arc::clone(&seen);
            move |locale| seen.lock().unwrap().push(*locale)
        });

        prefs.set_locale(Locale::ZhCn);
        drop(sub);
        prefs.set_locale(Locale::ZhTw);

        assert_eq!(*seen.lock().unwrap(), vec![Locale::ZhCn]);
        assert_eq!(prefs.locale(), Locale::ZhTw);
    }

    #[test]
    fn clones_share_state() {
        let prefs = Preferences::new();
        let other = prefs.clone();
        other.set_locale(Locale::ZhCn);
        assert_eq!(prefs.locale(), Locale::ZhCn);
    }
}

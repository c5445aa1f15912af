//! AI opponents for AI-mode sessions.

pub use kuhn_ai::{baseline::BaselineAI, AIOpponent};

/// Creates the AI opponent named in the server settings.
///
/// Unknown names fall back to the baseline AI with a warning instead of failing
/// startup.
///
/// ```
/// use kuhn_web::ai::create_ai;
///
/// assert_eq!(create_ai("baseline", Some(1)).name(), "BaselineAI");
/// assert_eq!(create_ai("does-not-exist", None).name(), "BaselineAI");
/// ```
pub fn create_ai(name: &str, seed: Option<u64>) -> Box<dyn AIOpponent> {
    match kuhn_ai::create_ai(name, seed) {
        Some(ai) => ai,
        None => {
            tracing::warn!(ai = %name, "unknown AI type, falling back to baseline");
            Box::new(match seed {
                Some(seed) => BaselineAI::with_seed(seed),
                None => BaselineAI::new(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::TestLogSubscriber;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    #[test]
    fn unknown_name_logs_fallback() {
        let logs = TestLogSubscriber::new();
        let registry = Registry::default().with(logs.clone().into_layer::<Registry>());

        let ai = tracing::subscriber::with_default(registry, || create_ai("cfr", None));

        assert_eq!(ai.name(), "BaselineAI");
        let entries = logs.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, tracing::Level::WARN);
        assert!(entries[0]
            .fields
            .iter()
            .any(|(k, v)| k == "ai" && v.contains("cfr")));
    }

    #[test]
    fn ai_opponent_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn AIOpponent>();
    }
}

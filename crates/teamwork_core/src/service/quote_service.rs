//! Daily quote with offline fallback.

use crate::collaborator::{Quote, QuoteProvider};
use log::info;
use rand::Rng;

const FALLBACK_QUOTES: &[(&str, &str)] = &[
    ("Well begun is half done.", "Proverb"),
    ("The moment you think it is too late is the earliest you can start.", "Proverb"),
    ("Teamwork makes the dream work.", "John C. Maxwell"),
    ("A journey of a thousand miles begins with a single step.", "Laozi"),
    (
        "If you want to go fast, go alone. If you want to go far, go together.",
        "African proverb",
    ),
    ("Failure is the mother of success.", "Thomas Edison"),
    ("What matters is a heart that does not break.", "Unknown"),
];

/// Built-in quotes used when the provider is unreachable.
pub fn fallback_quotes() -> Vec<Quote> {
    FALLBACK_QUOTES
        .iter()
        .map(|(message, author)| Quote::new(*message, *author))
        .collect()
}

/// Returns a fresh quote, or a random built-in one if fetching fails.
pub fn quote_or_fallback(provider: &dyn QuoteProvider) -> Quote {
    match provider.fetch_quote() {
        Ok(quote) => quote,
        Err(err) => {
            info!(
                "event=quote_fetch module=service status=fallback error={}",
                err
            );
            let index = rand::rng().random_range(0..FALLBACK_QUOTES.len());
            let (message, author) = FALLBACK_QUOTES[index];
            Quote::new(message, author)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{fallback_quotes, quote_or_fallback};
    use crate::collaborator::{ExternalError, Quote, QuoteProvider};

    struct Offline;

    impl QuoteProvider for Offline {
        fn fetch_quote(&self) -> Result<Quote, ExternalError> {
            Err(ExternalError::new("network unreachable"))
        }
    }

    struct Fixed;

    impl QuoteProvider for Fixed {
        fn fetch_quote(&self) -> Result<Quote, ExternalError> {
            Ok(Quote::new("Ship it.", "Team"))
        }
    }

    #[test]
    fn provider_quote_is_used_when_available() {
        assert_eq!(quote_or_fallback(&Fixed), Quote::new("Ship it.", "Team"));
    }

    #[test]
    fn failure_falls_back_to_builtin_list() {
        let quote = quote_or_fallback(&Offline);
        assert!(fallback_quotes().contains(&quote));
    }
}

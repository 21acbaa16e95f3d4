use crate::error::ShortenerError;
use crate::shortener::{ExpirationPolicy, ShortenParams, Shortener};
use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use portal_core::{Clock, Mapping, MappingStore, ShortCode, StorageError, SystemClock};
use portal_generator::Generator;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;
use url::Url;

pub const DEFAULT_MAX_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct ShortenerSettings {
    /// How many generated codes to try before giving up on a request.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: usize,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A concrete implementation of the [`Shortener`] trait.
///
/// This service wraps a [`MappingStore`] and a [`Generator`] to handle:
/// - URL validation
/// - Expiration policy conversion
/// - Short code allocation (generated or custom)
///
/// Generated codes are only proposals. When the store reports that a code
/// is taken, a fresh one is generated, up to `max_attempts` times.
#[derive(Debug)]
pub struct ShortenerService<S, G, C = SystemClock> {
    store: Arc<S>,
    generator: G,
    clock: C,
    settings: ShortenerSettings,
}

impl<S: MappingStore, G: Generator> ShortenerService<S, G> {
    /// Creates a new `ShortenerService` backed by the system clock.
    pub fn new(store: Arc<S>, generator: G) -> Self {
        Self::with_clock(store, generator, SystemClock)
    }
}

impl<S: MappingStore, G: Generator, C: Clock> ShortenerService<S, G, C> {
    pub fn with_clock(store: Arc<S>, generator: G, clock: C) -> Self {
        Self {
            store,
            generator,
            clock,
            settings: ShortenerSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ShortenerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Validates that the URL is absolute, uses http(s) and has a host.
    ///
    /// Returns the parsed URL; its serialization is what gets stored, so the
    /// redirect target is always the URL that passed validation.
    fn validate_url(raw: &str) -> Result<Url, ShortenerError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }

        // the URL parser would silently drop these
        if trimmed.chars().any(char::is_control) {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL contains control characters: {:?}",
                raw
            )));
        }

        let url = Url::parse(trimmed)
            .map_err(|e| ShortenerError::InvalidUrl(format!("{}: {}", trimmed, e)))?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ShortenerError::InvalidUrl(format!(
                    "URL scheme must be http or https: {}",
                    scheme
                )))
            }
        }

        match url.host_str() {
            Some(host) if !host.is_empty() => Ok(url),
            _ => Err(ShortenerError::InvalidUrl(format!(
                "URL must have a host: {}",
                trimmed
            ))),
        }
    }

    /// Converts the policy into an absolute expiration, which must lie
    /// strictly after `now`.
    fn expire_at(
        policy: &ExpirationPolicy,
        now: Timestamp,
    ) -> Result<Option<Timestamp>, ShortenerError> {
        let expire_at = match policy {
            ExpirationPolicy::Never => return Ok(None),
            ExpirationPolicy::AfterDuration(ttl) => {
                let ttl = SignedDuration::try_from(*ttl).map_err(|e| {
                    ShortenerError::InvalidExpiration(format!("ttl out of range: {}", e))
                })?;
                now.checked_add(ttl).map_err(|e| {
                    ShortenerError::InvalidExpiration(format!("ttl out of range: {}", e))
                })?
            }
            ExpirationPolicy::AtTimestamp(timestamp) => *timestamp,
        };

        if expire_at <= now {
            return Err(ShortenerError::InvalidExpiration(format!(
                "expiration {} is not after {}",
                expire_at, now
            )));
        }

        Ok(Some(expire_at))
    }

    async fn allocate(
        &self,
        original_url: String,
        expire_at: Option<Timestamp>,
    ) -> Result<Mapping, ShortenerError> {
        let attempts = self.settings.max_attempts.max(1);

        for attempt in 1..=attempts {
            let mapping = Mapping::new(self.generator.generate(), original_url.clone(), expire_at);

            match self.store.put(mapping.clone()).await {
                Ok(()) => return Ok(mapping),
                Err(StorageError::AlreadyExists(code)) => {
                    debug!(code = %code, attempt, "generated short code is taken, retrying");
                }
                Err(other) => return Err(other.into()),
            }
        }

        warn!(attempts, "no free short code found; the code space is close to exhausted");
        Err(ShortenerError::AllocationExhausted { attempts })
    }
}

#[async_trait]
impl<S: MappingStore, G: Generator, C: Clock> Shortener for ShortenerService<S, G, C> {
    async fn shorten(&self, params: ShortenParams) -> Result<Mapping, ShortenerError> {
        let original_url = String::from(Self::validate_url(&params.original_url)?);

        let expire_at = Self::expire_at(&params.expiration, self.clock.now())?;

        let mapping = match params.custom_alias {
            // A taken alias is the caller's problem, never retried.
            Some(alias) => {
                let mapping = Mapping::new(alias, original_url, expire_at);
                self.store.put(mapping.clone()).await?;
                mapping
            }
            None => self.allocate(original_url, expire_at).await?,
        };

        debug!(
            code = %mapping.code(),
            url = %mapping.original_url(),
            expire_at = ?mapping.expire_at(),
            "created short url"
        );
        Ok(mapping)
    }

    async fn delete(&self, code: &ShortCode) -> Result<bool, ShortenerError> {
        let deleted = self.store.delete(code).await?;
        trace!(code = %code, deleted, "delete short url");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::ManualClock;
    use portal_generator::{RandomGenerator, SeqGenerator};
    use parking_lot::Mutex;
    use portal_storage::InMemoryStore;
    use std::collections::{HashSet, VecDeque};
    use std::time::Duration;

    /// Hands out a fixed script of codes, then repeats the last one.
    struct ScriptedGenerator {
        codes: Mutex<VecDeque<&'static str>>,
    }

    impl ScriptedGenerator {
        fn new(codes: &[&'static str]) -> Self {
            Self {
                codes: Mutex::new(codes.iter().copied().collect()),
            }
        }
    }

    impl Generator for ScriptedGenerator {
        fn generate(&self) -> ShortCode {
            let mut codes = self.codes.lock();
            let code = if codes.len() > 1 {
                codes.pop_front().unwrap()
            } else {
                codes[0]
            };
            ShortCode::new_unchecked(code)
        }
    }

    fn start() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap()
    }

    fn test_service() -> ShortenerService<InMemoryStore, SeqGenerator, ManualClock> {
        ShortenerService::with_clock(
            Arc::new(InMemoryStore::new()),
            SeqGenerator::with_prefix("wh").unwrap(),
            ManualClock::new(start()),
        )
    }

    #[tokio::test]
    async fn shorten_with_generated_code() {
        let service = test_service();

        let first = service
            .shorten(ShortenParams::new("https://example.com"))
            .await
            .unwrap();
        let second = service
            .shorten(ShortenParams::new("https://example.com"))
            .await
            .unwrap();

        assert_eq!(first.code().as_str(), "wh000000");
        assert_eq!(second.code().as_str(), "wh000001");
        assert_eq!(first.original_url(), "https://example.com/");
        assert_eq!(first.expire_at(), None);
    }

    #[tokio::test]
    async fn shorten_with_custom_alias() {
        let service = test_service();

        let params =
            ShortenParams::new("https://example.com").with_alias(ShortCode::new("my-alias").unwrap());

        let mapping = service.shorten(params).await.unwrap();
        assert_eq!(mapping.code().as_str(), "my-alias");
    }

    #[tokio::test]
    async fn shorten_with_duplicate_alias_fails() {
        let service = test_service();
        let alias = ShortCode::new("my-alias").unwrap();

        service
            .shorten(ShortenParams::new("https://example1.com").with_alias(alias.clone()))
            .await
            .unwrap();
        let err = service
            .shorten(ShortenParams::new("https://example2.com").with_alias(alias))
            .await
            .unwrap_err();

        assert_eq!(err, ShortenerError::AliasConflict("my-alias".to_string()));
    }

    #[tokio::test]
    async fn shorten_rejects_invalid_urls() {
        let service = test_service();

        for url in [
            "",
            "   ",
            "not-a-valid-url",
            "/relative/path",
            "ftp://example.com/file",
            "mailto:someone@example.com",
            "https://",
        ] {
            let err = service.shorten(ShortenParams::new(url)).await.unwrap_err();
            assert!(
                matches!(err, ShortenerError::InvalidUrl(_)),
                "{url:?} gave {err:?}"
            );
        }

        assert_eq!(service.store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn shorten_stores_the_validated_url() {
        let service = test_service();

        for url in ["https://e.com/a\nb", "https://e.com/\ta", "https://e.com\r"] {
            let err = service.shorten(ShortenParams::new(url)).await.unwrap_err();
            assert!(
                matches!(err, ShortenerError::InvalidUrl(_)),
                "{url:?} gave {err:?}"
            );
        }

        let cases = [
            ("  https://e.com  ", "https://e.com/"),
            ("HTTPS://Example.COM/Path?q=1", "https://example.com/Path?q=1"),
            ("https://bücher.example/ü", "https://xn--bcher-kva.example/%C3%BC"),
        ];
        for (input, stored) in cases {
            let mapping = service.shorten(ShortenParams::new(input)).await.unwrap();
            assert_eq!(mapping.original_url(), stored);
            assert_eq!(
                service.store.get(mapping.code()).await.unwrap().unwrap().original_url(),
                stored
            );
        }
    }

    #[tokio::test]
    async fn ttl_is_resolved_against_the_clock() {
        let service = test_service();

        let mapping = service
            .shorten(
                ShortenParams::new("https://example.com")
                    .expiring(ExpirationPolicy::AfterDuration(Duration::from_secs(3600))),
            )
            .await
            .unwrap();

        assert_eq!(
            mapping.expire_at(),
            Some(start() + SignedDuration::from_secs(3600))
        );
    }

    #[tokio::test]
    async fn expiration_must_be_in_the_future() {
        let service = test_service();

        for policy in [
            ExpirationPolicy::AfterDuration(Duration::ZERO),
            ExpirationPolicy::AtTimestamp(start()),
            ExpirationPolicy::AtTimestamp(Timestamp::UNIX_EPOCH),
        ] {
            let err = service
                .shorten(ShortenParams::new("https://example.com").expiring(policy))
                .await
                .unwrap_err();
            assert!(matches!(err, ShortenerError::InvalidExpiration(_)));
        }

        let at = start() + SignedDuration::from_secs(1);
        let mapping = service
            .shorten(
                ShortenParams::new("https://example.com")
                    .expiring(ExpirationPolicy::AtTimestamp(at)),
            )
            .await
            .unwrap();
        assert_eq!(mapping.expire_at(), Some(at));
    }

    #[tokio::test]
    async fn collisions_are_retried_transparently() {
        let store = Arc::new(InMemoryStore::new());
        store
            .put(Mapping::new(ShortCode::new_unchecked("taken1"), "https://a.com", None))
            .await
            .unwrap();
        store
            .put(Mapping::new(ShortCode::new_unchecked("taken2"), "https://b.com", None))
            .await
            .unwrap();

        let service = ShortenerService::new(
            Arc::clone(&store),
            ScriptedGenerator::new(&["taken1", "taken2", "free01"]),
        );

        let mapping = service
            .shorten(ShortenParams::new("https://c.com"))
            .await
            .unwrap();
        assert_eq!(mapping.code().as_str(), "free01");
    }

    #[tokio::test]
    async fn exhausted_code_space_is_reported() {
        let store = Arc::new(InMemoryStore::new());
        store
            .put(Mapping::new(ShortCode::new_unchecked("same"), "https://a.com", None))
            .await
            .unwrap();

        let service = ShortenerService::new(store, ScriptedGenerator::new(&["same"]))
            .with_settings(ShortenerSettings::builder().max_attempts(3).build());

        let err = service
            .shorten(ShortenParams::new("https://b.com"))
            .await
            .unwrap_err();
        assert_eq!(err, ShortenerError::AllocationExhausted { attempts: 3 });
    }

    #[tokio::test]
    async fn expired_but_unswept_code_is_not_reused() {
        let store = Arc::new(InMemoryStore::new());
        let clock = ManualClock::new(start());
        let service = ShortenerService::with_clock(
            Arc::clone(&store),
            ScriptedGenerator::new(&["reuse1", "fresh1"]),
            clock.clone(),
        );

        service
            .shorten(
                ShortenParams::new("https://old.com")
                    .expiring(ExpirationPolicy::AfterDuration(Duration::from_secs(10))),
            )
            .await
            .unwrap();
        clock.advance(SignedDuration::from_secs(60));

        let service = ShortenerService::with_clock(
            Arc::clone(&store),
            ScriptedGenerator::new(&["reuse1", "fresh1"]),
            clock,
        );
        let mapping = service
            .shorten(ShortenParams::new("https://new.com"))
            .await
            .unwrap();
        assert_eq!(mapping.code().as_str(), "fresh1");
    }

    #[tokio::test]
    async fn delete_passes_through() {
        let service = test_service();
        let mapping = service
            .shorten(ShortenParams::new("https://example.com"))
            .await
            .unwrap();

        assert!(service.delete(mapping.code()).await.unwrap());
        assert!(!service.delete(mapping.code()).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_allocation_never_shares_a_code() {
        // 62^3 = 238,328 codes; 4,000 allocations collide often enough to
        // exercise the retry path
        let store = Arc::new(InMemoryStore::new());
        let service = Arc::new(
            ShortenerService::new(Arc::clone(&store), RandomGenerator::new(3).unwrap())
                .with_settings(ShortenerSettings::builder().max_attempts(32).build()),
        );

        let mut handles = vec![];
        for task in 0..16 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                let mut codes = Vec::with_capacity(250);
                for i in 0..250 {
                    let mapping = service
                        .shorten(ShortenParams::new(format!("https://e.com/{task}/{i}")))
                        .await
                        .unwrap();
                    codes.push(mapping.code().clone());
                }
                codes
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for code in handle.await.unwrap() {
                assert!(seen.insert(code), "code handed out twice");
            }
        }

        assert_eq!(seen.len(), 4_000);
        assert_eq!(store.count().await.unwrap(), 4_000);
    }
}

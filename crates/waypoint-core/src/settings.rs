use crate::codec::{TokenCodec, DEFAULT_TOKEN_LENGTH};
use crate::error::ConfigError;
use crate::store::ConfigSource;
use crate::token::{Alphabet, Token};
use typed_builder::TypedBuilder;

/// Parameter holding the record namespace name (appended to the namespace root).
pub const PARAM_PREFIX: &str = "pre";
/// Parameter holding the public short-link host.
pub const PARAM_DOMAIN: &str = "dom";
/// Parameter holding the mirror bucket identifier.
pub const PARAM_BUCKET: &str = "bucket";
/// Parameter holding the token alphabet.
pub const PARAM_ALPHABET: &str = "chars";
/// Optional parameter overriding the generated token length.
pub const PARAM_TOKEN_LENGTH: &str = "len";

/// Process-wide configuration, built once at start-up.
///
/// Components never read `Settings` directly; they receive the narrow view
/// they need ([`Namespace`], [`PublicUrl`] or [`TokenCodec`]).
#[derive(Debug, Clone, TypedBuilder)]
pub struct Settings {
    /// Record namespace root, e.g. `/urls/links`.
    #[builder(setter(into))]
    pub prefix: String,
    /// Public host serving the redirects, e.g. `sho.rt`.
    #[builder(setter(into))]
    pub domain: String,
    /// Mirror bucket identifier.
    #[builder(setter(into))]
    pub bucket: String,
    /// Token character set, taken literally.
    #[builder(setter(into))]
    pub alphabet: String,
    #[builder(default = DEFAULT_TOKEN_LENGTH)]
    pub token_length: usize,
    #[builder(default = String::from("https"), setter(into))]
    pub scheme: String,
}

impl Settings {
    /// Loads settings from shared configuration parameters.
    ///
    /// The record prefix is `namespace_root + "/" + <pre>`, so with the
    /// default layout parameters live under `/urls/params` and records under
    /// `/urls/<pre>`.
    pub async fn from_config_source<C>(source: &C, namespace_root: &str) -> Result<Self, ConfigError>
    where
        C: ConfigSource + ?Sized,
    {
        let prefix = required(source, PARAM_PREFIX).await?;
        let domain = required(source, PARAM_DOMAIN).await?;
        let bucket = required(source, PARAM_BUCKET).await?;
        let alphabet = required(source, PARAM_ALPHABET).await?;

        let token_length = match source.get_config(PARAM_TOKEN_LENGTH).await? {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| ConfigError::InvalidValue {
                name: PARAM_TOKEN_LENGTH.to_string(),
                reason: format!("{e}"),
            })?,
            None => DEFAULT_TOKEN_LENGTH,
        };

        let settings = Settings::builder()
            .prefix(format!(
                "{}/{}",
                namespace_root.trim_end_matches('/'),
                prefix.trim_matches('/')
            ))
            .domain(domain)
            .bucket(bucket)
            .alphabet(alphabet)
            .token_length(token_length)
            .build();

        settings.validate()?;
        Ok(settings)
    }

    /// Checks every field; the returned error names the first bad one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefix.trim_matches('/').is_empty() {
            return Err(ConfigError::Empty("prefix"));
        }
        if self.domain.is_empty() {
            return Err(ConfigError::Empty("domain"));
        }
        if self.bucket.is_empty() {
            return Err(ConfigError::Empty("bucket"));
        }
        if self.scheme.is_empty() {
            return Err(ConfigError::Empty("scheme"));
        }
        self.codec().map(|_| ())
    }

    pub fn namespace(&self) -> Namespace {
        Namespace::new(&self.prefix)
    }

    pub fn public_url(&self) -> PublicUrl {
        PublicUrl::new(&self.scheme, &self.domain)
    }

    pub fn codec(&self) -> Result<TokenCodec, ConfigError> {
        TokenCodec::new(Alphabet::new(&self.alphabet)?, self.token_length)
    }
}

async fn required<C>(source: &C, name: &str) -> Result<String, ConfigError>
where
    C: ConfigSource + ?Sized,
{
    source
        .get_config(name)
        .await?
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ConfigError::MissingParameter(name.to_string()))
}

/// The record namespace: maps tokens to full path names and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: String,
}

impl Namespace {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Full path name for a token: `prefix + "/" + token`.
    pub fn path_for(&self, token: &Token) -> String {
        format!("{}/{}", self.prefix, token)
    }

    /// Extracts the token from a full path name.
    ///
    /// Returns `None` for names outside the namespace, for the bare prefix,
    /// and for nested paths below it.
    pub fn token_from_path(&self, name: &str) -> Option<Token> {
        let rest = name.strip_prefix(&self.prefix)?.strip_prefix('/')?;
        Token::new(rest).ok()
    }
}

/// Builds public short URLs: `scheme://domain/token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrl {
    base: String,
}

impl PublicUrl {
    pub fn new(scheme: &str, domain: &str) -> Self {
        Self {
            base: format!("{}://{}", scheme, domain.trim_end_matches('/')),
        }
    }

    pub fn short_url(&self, token: &Token) -> String {
        token.to_url(&self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct MapSource(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl ConfigSource for MapSource {
        async fn get_config(&self, name: &str) -> Result<Option<String>, StoreError> {
            Ok(self.0.get(name).map(|v| v.to_string()))
        }
    }

    fn settings() -> Settings {
        Settings::builder()
            .prefix("/urls/links")
            .domain("sho.rt")
            .bucket("sho.rt")
            .alphabet("abc123")
            .build()
    }

    #[test]
    fn defaults() {
        let settings = settings();
        assert_eq!(settings.token_length, DEFAULT_TOKEN_LENGTH);
        assert_eq!(settings.scheme, "https");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_fields() {
        let mut s = settings();
        s.alphabet = String::new();
        assert!(matches!(s.validate(), Err(ConfigError::EmptyAlphabet)));

        let mut s = settings();
        s.token_length = 0;
        assert!(matches!(s.validate(), Err(ConfigError::ZeroTokenLength)));

        let mut s = settings();
        s.prefix = "/".to_string();
        assert!(matches!(s.validate(), Err(ConfigError::Empty("prefix"))));

        let mut s = settings();
        s.domain = String::new();
        assert!(matches!(s.validate(), Err(ConfigError::Empty("domain"))));
    }

    #[test]
    fn namespace_paths() {
        let ns = Namespace::new("/urls/links/");
        let token = Token::new("abc").unwrap();

        assert_eq!(ns.prefix(), "/urls/links");
        assert_eq!(ns.path_for(&token), "/urls/links/abc");
        assert_eq!(ns.token_from_path("/urls/links/abc"), Some(token));
    }

    #[test]
    fn namespace_rejects_foreign_paths() {
        let ns = Namespace::new("/urls/links");

        assert_eq!(ns.token_from_path("/urls/params/chars"), None);
        assert_eq!(ns.token_from_path("/urls/links"), None);
        assert_eq!(ns.token_from_path("/urls/links/"), None);
        assert_eq!(ns.token_from_path("/urls/linksabc"), None);
        assert_eq!(ns.token_from_path("/urls/links/a/b"), None);
        assert_eq!(ns.token_from_path("/other/urls/links/abc"), None);
    }

    #[test]
    fn short_url() {
        let public = PublicUrl::new("https", "sho.rt/");
        let token = Token::new("abc").unwrap();
        assert_eq!(public.short_url(&token), "https://sho.rt/abc");
    }

    #[tokio::test]
    async fn load_from_config_source() {
        let source = MapSource(HashMap::from([
            (PARAM_PREFIX, "links"),
            (PARAM_DOMAIN, "sho.rt"),
            (PARAM_BUCKET, "sho.rt-bucket"),
            (PARAM_ALPHABET, "abcdef"),
        ]));

        let settings = Settings::from_config_source(&source, "/urls").await.unwrap();

        assert_eq!(settings.prefix, "/urls/links");
        assert_eq!(settings.domain, "sho.rt");
        assert_eq!(settings.bucket, "sho.rt-bucket");
        assert_eq!(settings.alphabet, "abcdef");
        assert_eq!(settings.token_length, DEFAULT_TOKEN_LENGTH);
    }

    #[tokio::test]
    async fn load_reads_optional_length() {
        let source = MapSource(HashMap::from([
            (PARAM_PREFIX, "links"),
            (PARAM_DOMAIN, "sho.rt"),
            (PARAM_BUCKET, "b"),
            (PARAM_ALPHABET, "abcdef"),
            (PARAM_TOKEN_LENGTH, "9"),
        ]));

        let settings = Settings::from_config_source(&source, "/urls/").await.unwrap();
        assert_eq!(settings.token_length, 9);
    }

    #[tokio::test]
    async fn load_reports_missing_parameter() {
        let source = MapSource(HashMap::from([(PARAM_PREFIX, "links")]));

        let err = Settings::from_config_source(&source, "/urls")
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingParameter(name) if name == PARAM_DOMAIN));
    }
}

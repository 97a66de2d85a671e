use crate::error::{Result, ShortenerError};
use crate::shortener::{CreateLinkRequest, CreatedLink, DeleteLinkRequest, LinkService};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
use waypoint_core::{PublicUrl, RecordStore, ShortLinkRecord, Token, TokenCodec};

/// The [`LinkService`] backed by a [`RecordStore`].
///
/// Tokens are derived from the destination URL unless an alias is given, so
/// shortening the same URL twice yields the same token. Distinct URLs can
/// still collide; the later write wins.
#[derive(Debug)]
pub struct WriteService<R> {
    store: Arc<R>,
    codec: TokenCodec,
    public_url: PublicUrl,
}

impl<R> Clone for WriteService<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            codec: self.codec.clone(),
            public_url: self.public_url.clone(),
        }
    }
}

impl<R: RecordStore> WriteService<R> {
    pub fn new(store: Arc<R>, codec: TokenCodec, public_url: PublicUrl) -> Self {
        Self {
            store,
            codec,
            public_url,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }
}

/// Parses a client-supplied token. Absent and empty are the same thing.
fn required_token(raw: Option<&str>) -> Result<Token> {
    match raw {
        None | Some("") => Err(ShortenerError::missing_token()),
        Some(raw) => Token::new(raw).map_err(|e| ShortenerError::Validation(e.to_string())),
    }
}

#[async_trait]
impl<R: RecordStore> LinkService for WriteService<R> {
    async fn create_link(&self, request: CreateLinkRequest) -> Result<CreatedLink> {
        let url = request
            .url
            .filter(|url| !url.is_empty())
            .ok_or_else(ShortenerError::missing_url)?;

        let token = self.codec.resolve(request.token.as_deref(), &url);
        if let Some(alias) = request.token.as_deref() {
            if alias != token.as_str() {
                debug!(alias = %alias, token = %token, "Alias rewritten to token");
            }
        }

        self.store.put(&token, &url).await?;

        let short_url = self.public_url.short_url(&token);
        info!(token = %token, short_url = %short_url, "Created short link");

        Ok(CreatedLink {
            token,
            short_url,
            url,
        })
    }

    async fn delete_link(&self, request: DeleteLinkRequest) -> Result<()> {
        let token = required_token(request.token.as_deref())?;

        let existed = self.store.delete(&token).await?;
        info!(token = %token, existed, "Deleted short link");
        Ok(())
    }

    async fn resolve_link(&self, token: &str) -> Result<ShortLinkRecord> {
        let token = required_token(Some(token))
            .map_err(|_| ShortenerError::NotFound(token.to_string()))?;

        self.store
            .get(&token)
            .await?
            .ok_or_else(|| ShortenerError::NotFound(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MISSING_TOKEN, MISSING_URL};
    use waypoint_core::{Alphabet, Namespace};
    use waypoint_storage::InMemoryRecordStore;

    const ALPHANUMERIC: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    fn service_with(alphabet: &str) -> (WriteService<InMemoryRecordStore>, Arc<InMemoryRecordStore>) {
        let store = Arc::new(InMemoryRecordStore::new(Namespace::new("/urls/links")));
        let codec = TokenCodec::new(Alphabet::new(alphabet).unwrap(), 6).unwrap();
        let service = WriteService::new(
            Arc::clone(&store),
            codec,
            PublicUrl::new("https", "sho.rt"),
        );
        (service, store)
    }

    fn service() -> (WriteService<InMemoryRecordStore>, Arc<InMemoryRecordStore>) {
        service_with(ALPHANUMERIC)
    }

    fn create(url: &str, alias: Option<&str>) -> CreateLinkRequest {
        CreateLinkRequest {
            url: Some(url.to_string()),
            token: alias.map(str::to_string),
        }
    }

    fn delete(token: &str) -> DeleteLinkRequest {
        DeleteLinkRequest {
            token: Some(token.to_string()),
        }
    }

    #[tokio::test]
    async fn create_without_alias_stores_generated_token() {
        let (service, store) = service();

        let created = service
            .create_link(create("https://example.com/a", None))
            .await
            .unwrap();

        assert_eq!(created.token.as_str().len(), 6);
        assert_eq!(created.url, "https://example.com/a");
        assert_eq!(created.short_url, format!("https://sho.rt/{}", created.token));

        let record = store.get(&created.token).await.unwrap().unwrap();
        assert_eq!(record.destination_url, "https://example.com/a");
    }

    #[tokio::test]
    async fn create_without_alias_is_deterministic() {
        let (service, _) = service();

        let first = service
            .create_link(create("https://example.com/a", None))
            .await
            .unwrap();
        let second = service
            .create_link(create("https://example.com/a", None))
            .await
            .unwrap();

        assert_eq!(first.token, second.token);
    }

    #[tokio::test]
    async fn create_with_admissible_alias_keeps_it() {
        let (service, _) = service();

        let created = service
            .create_link(create("https://example.com/b", Some("promo")))
            .await
            .unwrap();

        assert_eq!(created.token.as_str(), "promo");
        assert_eq!(created.short_url, "https://sho.rt/promo");
    }

    #[tokio::test]
    async fn create_sanitizes_alias() {
        let (service, store) = service_with("promtin");

        let created = service
            .create_link(create("https://example.com/b", Some("Pro-Motion!")))
            .await
            .unwrap();

        assert_eq!(created.token.as_str(), "rootion");
        assert!(store.get(&created.token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn create_with_empty_alias_generates() {
        let (service, _) = service();

        let generated = service
            .create_link(create("https://example.com/a", None))
            .await
            .unwrap();
        let empty_alias = service
            .create_link(create("https://example.com/a", Some("")))
            .await
            .unwrap();

        assert_eq!(generated.token, empty_alias.token);
    }

    #[tokio::test]
    async fn create_without_url_is_rejected() {
        let (service, store) = service();

        for request in [
            CreateLinkRequest::default(),
            CreateLinkRequest {
                url: Some(String::new()),
                token: Some("promo".to_string()),
            },
        ] {
            let err = service.create_link(request).await.unwrap_err();
            assert!(matches!(&err, ShortenerError::Validation(msg) if msg == MISSING_URL));
        }

        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_overwrites_on_collision() {
        let (service, store) = service();

        service
            .create_link(create("https://old.com", Some("same")))
            .await
            .unwrap();
        service
            .create_link(create("https://new.com", Some("same")))
            .await
            .unwrap();

        let record = store.get(&Token::new("same").unwrap()).await.unwrap().unwrap();
        assert_eq!(record.destination_url, "https://new.com");
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (service, store) = service();
        let created = service
            .create_link(create("https://example.com", Some("gone")))
            .await
            .unwrap();

        service.delete_link(delete("gone")).await.unwrap();
        assert!(store.get(&created.token).await.unwrap().is_none());

        service.delete_link(delete("gone")).await.unwrap();
        assert!(store.get(&created.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_without_token_is_rejected() {
        let (service, _) = service();

        for request in [DeleteLinkRequest::default(), delete("")] {
            let err = service.delete_link(request).await.unwrap_err();
            assert!(matches!(&err, ShortenerError::Validation(msg) if msg == MISSING_TOKEN));
        }
    }

    #[tokio::test]
    async fn delete_rejects_nested_token() {
        let (service, _) = service();

        let err = service.delete_link(delete("a/b")).await.unwrap_err();
        assert!(matches!(err, ShortenerError::Validation(_)));
    }

    #[tokio::test]
    async fn resolve_existing_and_missing() {
        let (service, _) = service();
        service
            .create_link(create("https://example.com", Some("abc")))
            .await
            .unwrap();

        let record = service.resolve_link("abc").await.unwrap();
        assert_eq!(record.destination_url, "https://example.com");

        assert!(matches!(
            service.resolve_link("nope").await,
            Err(ShortenerError::NotFound(_))
        ));
        assert!(matches!(
            service.resolve_link("a/b").await,
            Err(ShortenerError::NotFound(_))
        ));
    }
}

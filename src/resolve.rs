use crate::error::CatalogError;
use crate::fallback::FallbackCatalog;
use crate::model::{Product, ProductKey};
use crate::normalize::normalize;
use crate::sanity::image::ImageUrlBuilder;
use crate::sanity::record::RemoteProduct;
use crate::source::CatalogSource;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Outcome of resolving one product key.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Loading,
    Resolved(Product),
    Absent,
}

impl Resolution {
    pub fn is_loading(&self) -> bool {
        matches!(self, Resolution::Loading)
    }
}

/// Where a resolved product came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Remote,
    Fallback,
}

/// Reconciles the remote store with the built-in catalog. Never fails:
/// every problem ends in either a fallback product or `Absent`.
pub struct Resolver<S> {
    source: S,
    images: ImageUrlBuilder,
    fallback: FallbackCatalog,
    timeout: Duration,
}

impl<S: CatalogSource> Resolver<S> {
    pub fn new(
        source: S,
        images: ImageUrlBuilder,
        fallback: FallbackCatalog,
        timeout: Duration,
    ) -> Self {
        Self {
            source,
            images,
            fallback,
            timeout,
        }
    }

    pub async fn resolve(&self, key: &ProductKey) -> Resolution {
        match self.resolve_with_origin(key).await {
            Some((product, _)) => Resolution::Resolved(product),
            None => Resolution::Absent,
        }
    }

    pub async fn resolve_with_origin(&self, key: &ProductKey) -> Option<(Product, Origin)> {
        match self.fetch(key).await {
            Ok(Some(record)) => {
                tracing::debug!("Resolved {} from the content store", key);
                return Some((normalize(&record, &self.images, key.as_str()), Origin::Remote));
            }
            Ok(None) => tracing::debug!("Content store has no product for {}", key),
            Err(e) => tracing::warn!("Fetching {} failed, using built-in catalog: {}", key, e),
        }

        match self.fallback.find(key) {
            Some(product) => {
                tracing::debug!("Resolved {} from the built-in catalog", key);
                Some((product.clone(), Origin::Fallback))
            }
            None => {
                tracing::debug!("No product for {} in either source", key);
                None
            }
        }
    }

    /// Every product for the listing page. The remote listing wins when it
    /// returns anything; otherwise the built-in catalog is shown.
    pub async fn list(&self) -> (Vec<Product>, Origin) {
        let remote = tokio::time::timeout(self.timeout, self.source.list_products()).await;
        match remote {
            Ok(Ok(records)) if !records.is_empty() => {
                let products = records
                    .iter()
                    .enumerate()
                    .map(|(i, r)| normalize(r, &self.images, &format!("unknown-{}", i + 1)))
                    .collect();
                return (products, Origin::Remote);
            }
            Ok(Ok(_)) => tracing::debug!("Content store returned an empty listing"),
            Ok(Err(e)) => tracing::warn!("Listing products failed, using built-in catalog: {}", e),
            Err(_) => tracing::warn!(
                "Listing products timed out after {}ms, using built-in catalog",
                self.timeout.as_millis()
            ),
        }
        (self.fallback.products().to_vec(), Origin::Fallback)
    }

    async fn fetch(&self, key: &ProductKey) -> Result<Option<RemoteProduct>, CatalogError> {
        tokio::time::timeout(self.timeout, self.source.fetch_product(key))
            .await
            .map_err(|_| CatalogError::Timeout(self.timeout))?
    }
}

/// What a product view currently shows, tagged with the key it is for.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub key: Option<ProductKey>,
    pub resolution: Resolution,
}

/// A long-lived product view. Requesting a new key supersedes whatever
/// was in flight; observers only ever see the state for the latest key.
pub struct ProductView<S> {
    resolver: Arc<Resolver<S>>,
    state: Arc<watch::Sender<ViewState>>,
    generation: Arc<AtomicU64>,
    in_flight: Option<JoinHandle<()>>,
}

impl<S: CatalogSource + 'static> ProductView<S> {
    pub fn new(resolver: Arc<Resolver<S>>) -> Self {
        let (tx, _rx) = watch::channel(ViewState {
            key: None,
            resolution: Resolution::Loading,
        });
        Self {
            resolver,
            state: Arc::new(tx),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Start resolving `key`. The view is `Loading` for `key` as soon as
    /// this returns.
    pub fn request(&mut self, key: ProductKey) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        self.state.send_replace(ViewState {
            key: Some(key.clone()),
            resolution: Resolution::Loading,
        });
        tracing::debug!("Loading {} (request #{})", key, generation);

        let resolver = Arc::clone(&self.resolver);
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        self.in_flight = Some(tokio::spawn(async move {
            let resolution = resolver.resolve(&key).await;
            publish(&state, &current, generation, key, resolution);
        }));
    }

    /// Wait until the latest request has settled and return its state.
    pub async fn settled(&self) -> ViewState {
        let mut rx = self.subscribe();
        let result = rx
            .wait_for(|s| s.key.is_some() && !s.resolution.is_loading())
            .await
            .map(|s| s.clone());
        match result {
            Ok(state) => state,
            Err(_) => self.current(),
        }
    }
}

impl<S> Drop for ProductView<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

/// Publish a finished resolution unless a newer request has been made
/// since it started. The generation check happens under the channel lock,
/// so it cannot interleave with `request` replacing the state.
fn publish(
    state: &watch::Sender<ViewState>,
    current: &AtomicU64,
    generation: u64,
    key: ProductKey,
    resolution: Resolution,
) -> bool {
    state.send_if_modified(|view| {
        if current.load(Ordering::SeqCst) != generation {
            tracing::debug!("Discarding stale result for {}", key);
            return false;
        }
        view.key = Some(key);
        view.resolution = resolution;
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::PLACEHOLDER_IMAGE;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    enum Behavior {
        Record(RemoteProduct),
        Missing,
        Unreachable,
        Hang,
    }

    /// Scripted source. Keys without a script are missing; gated keys wait
    /// until their gate is notified.
    #[derive(Default)]
    struct MockSource {
        scripts: Mutex<HashMap<String, Behavior>>,
        gates: Mutex<HashMap<String, Arc<Notify>>>,
        listing: Option<Vec<RemoteProduct>>,
    }

    impl MockSource {
        fn with(self, id: &str, behavior: Behavior) -> Self {
            self.scripts.lock().unwrap().insert(id.to_string(), behavior);
            self
        }

        fn gated(self, id: &str, gate: Arc<Notify>) -> Self {
            self.gates.lock().unwrap().insert(id.to_string(), gate);
            self
        }
    }

    #[async_trait]
    impl CatalogSource for MockSource {
        async fn fetch_product(
            &self,
            key: &ProductKey,
        ) -> Result<Option<RemoteProduct>, CatalogError> {
            let gate = self.gates.lock().unwrap().get(key.as_str()).cloned();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            let hang = matches!(
                self.scripts.lock().unwrap().get(key.as_str()),
                Some(Behavior::Hang)
            );
            if hang {
                std::future::pending::<()>().await;
            }
            match self.scripts.lock().unwrap().get(key.as_str()) {
                Some(Behavior::Record(r)) => Ok(Some(r.clone())),
                Some(Behavior::Unreachable) => Err(CatalogError::Timeout(Duration::from_secs(5))),
                _ => Ok(None),
            }
        }

        async fn list_products(&self) -> Result<Vec<RemoteProduct>, CatalogError> {
            match &self.listing {
                Some(list) => Ok(list.clone()),
                None => Err(CatalogError::Timeout(Duration::from_secs(5))),
            }
        }
    }

    fn make_resolver(source: MockSource) -> Resolver<MockSource> {
        Resolver::new(
            source,
            ImageUrlBuilder::new("test", "production"),
            FallbackCatalog::builtin(),
            Duration::from_millis(200),
        )
    }

    fn remote(id: &str, name: &str) -> RemoteProduct {
        RemoteProduct {
            id: Some(id.into()),
            name: Some(name.into()),
            price: Some(1234.0),
            ..Default::default()
        }
    }

    fn id(s: &str) -> ProductKey {
        ProductKey::Id(s.to_string())
    }

    #[tokio::test]
    async fn unreachable_store_uses_fallback_record() {
        let resolver = make_resolver(MockSource::default().with("1", Behavior::Unreachable));
        match resolver.resolve(&id("1")).await {
            Resolution::Resolved(product) => {
                assert_eq!(product.name, "Velocity Pro Carbon");
                assert_eq!(product.price, 4999.0);
            }
            other => panic!("expected resolved, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn fallback_record_is_used_verbatim() {
        let resolver = make_resolver(MockSource::default());
        let expected = FallbackCatalog::builtin()
            .find(&id("3"))
            .cloned()
            .unwrap();
        assert_eq!(
            resolver.resolve_with_origin(&id("3")).await,
            Some((expected, Origin::Fallback))
        );
    }

    #[tokio::test]
    async fn missing_everywhere_is_absent() {
        let resolver = make_resolver(MockSource::default().with("999", Behavior::Missing));
        assert_eq!(resolver.resolve(&id("999")).await, Resolution::Absent);

        let resolver = make_resolver(MockSource::default().with("999", Behavior::Unreachable));
        assert_eq!(resolver.resolve(&id("999")).await, Resolution::Absent);
    }

    #[tokio::test]
    async fn remote_record_wins_and_is_never_merged() {
        let resolver = make_resolver(MockSource::default().with("1", Behavior::Record(remote("1", "Remote Bike"))));
        let (product, origin) = resolver.resolve_with_origin(&id("1")).await.unwrap();
        assert_eq!(origin, Origin::Remote);
        assert_eq!(product.name, "Remote Bike");
        assert_eq!(product.price, 1234.0);
        // Nothing from the built-in "1" leaks in.
        assert_eq!(product.original_price, None);
        assert!(product.specifications.is_empty());
        assert_eq!(product.sizes, vec!["S", "M", "L", "XL"]);
    }

    #[tokio::test]
    async fn malformed_remote_document_still_resolves() {
        let json = r#"{"_id":"77","name":"Trail King","price":2999,"images":[null],"features":["Light",null]}"#;
        let record: RemoteProduct = serde_json::from_str(json).unwrap();
        let resolver = make_resolver(MockSource::default().with("77", Behavior::Record(record)));

        let (product, origin) = resolver.resolve_with_origin(&id("77")).await.unwrap();
        assert_eq!(origin, Origin::Remote);
        assert_eq!(product.name, "Trail King");
        assert_eq!(product.price, 2999.0);
        assert_eq!(product.features, vec!["Light"]);
        assert_eq!(product.images, vec![PLACEHOLDER_IMAGE.to_string()]);
    }

    #[tokio::test]
    async fn timeout_degrades_to_fallback() {
        let resolver = make_resolver(MockSource::default().with("2", Behavior::Hang));
        match resolver.resolve(&id("2")).await {
            Resolution::Resolved(product) => assert_eq!(product.name, "Aero Elite TT"),
            other => panic!("expected resolved, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn slug_keys_fall_back_by_derived_slug() {
        let resolver = make_resolver(MockSource::default());
        match resolver.resolve(&ProductKey::Slug("sprint-master".into())).await {
            Resolution::Resolved(product) => assert_eq!(product.id, "4"),
            other => panic!("expected resolved, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn listing_prefers_remote_then_fallback() {
        let source = MockSource {
            listing: Some(vec![remote("a", "Alpha"), remote("b", "Beta")]),
            ..Default::default()
        };
        let (products, origin) = make_resolver(source).list().await;
        assert_eq!(origin, Origin::Remote);
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Alpha");

        let (products, origin) = make_resolver(MockSource::default()).list().await;
        assert_eq!(origin, Origin::Fallback);
        assert_eq!(products.len(), 4);

        let empty = MockSource {
            listing: Some(vec![]),
            ..Default::default()
        };
        let (_, origin) = make_resolver(empty).list().await;
        assert_eq!(origin, Origin::Fallback);
    }

    #[tokio::test]
    async fn view_starts_loading_then_settles() {
        let gate = Arc::new(Notify::new());
        let source = MockSource::default()
            .with("1", Behavior::Record(remote("1", "Remote One")))
            .gated("1", Arc::clone(&gate));
        let mut view = ProductView::new(Arc::new(make_resolver(source)));

        view.request(id("1"));
        assert_eq!(
            view.current(),
            ViewState {
                key: Some(id("1")),
                resolution: Resolution::Loading,
            }
        );

        gate.notify_one();
        let settled = view.settled().await;
        assert_eq!(settled.key, Some(id("1")));
        match settled.resolution {
            Resolution::Resolved(product) => assert_eq!(product.name, "Remote One"),
            other => panic!("expected resolved, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn superseded_request_never_overwrites_newer_state() {
        let gate = Arc::new(Notify::new());
        let source = MockSource::default()
            .with("1", Behavior::Record(remote("1", "Stale One")))
            .with("2", Behavior::Record(remote("2", "Fresh Two")))
            .gated("1", Arc::clone(&gate));
        let mut view = ProductView::new(Arc::new(make_resolver(source)));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut rx = view.subscribe();
        let collector = {
            let seen = Arc::clone(&seen);
            tokio::spawn(async move {
                while rx.changed().await.is_ok() {
                    let state = rx.borrow_and_update().clone();
                    seen.lock().unwrap().push(state);
                }
            })
        };

        view.request(id("1"));
        view.request(id("2"));
        let settled = view.settled().await;
        assert_eq!(settled.key, Some(id("2")));

        // Let the first fetch finish late; its result must not show up.
        gate.notify_one();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let now = view.current();
        assert_eq!(now.key, Some(id("2")));
        match now.resolution {
            Resolution::Resolved(product) => assert_eq!(product.name, "Fresh Two"),
            other => panic!("expected resolved, got {:?}", other),
        }

        collector.abort();
        let seen = seen.lock().unwrap();
        assert!(!seen.is_empty());
        assert!(seen
            .iter()
            .all(|s| s.key != Some(id("1")) || s.resolution.is_loading()));
    }

    #[test]
    fn stale_generation_is_not_published() {
        let (tx, _rx) = watch::channel(ViewState {
            key: Some(id("2")),
            resolution: Resolution::Loading,
        });
        let current = AtomicU64::new(2);

        let published = publish(&tx, &current, 1, id("1"), Resolution::Absent);
        assert!(!published);
        assert_eq!(tx.borrow().key, Some(id("2")));
        assert!(tx.borrow().resolution.is_loading());

        let published = publish(&tx, &current, 2, id("2"), Resolution::Absent);
        assert!(published);
        assert_eq!(tx.borrow().resolution, Resolution::Absent);
    }

    #[tokio::test]
    async fn absent_in_view_for_unknown_key() {
        let mut view = ProductView::new(Arc::new(make_resolver(MockSource::default())));
        view.request(id("999"));
        let settled = view.settled().await;
        assert_eq!(settled.key, Some(id("999")));
        assert_eq!(settled.resolution, Resolution::Absent);
    }
}

//! Worker lifecycle and fetch behaviour against a real SQLite cache.

mod common;

use common::{default_worker, shell_url, worker, FakeNetwork, TestCache};
use mlc_core::{AssetRequest, AssetResponse, CacheStorage, ResponseKind};
use mlc_offline::{
    HttpNetwork, OfflineWorker, WorkerError, WorkerMessage, WorkerState, DEFAULT_CACHE_VERSION,
};
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Install
// =============================================================================

mod install {
    use super::*;

    #[tokio::test]
    async fn test_install_precaches_every_shell_file() {
        let cache = TestCache::new().await;
        let worker = default_worker(&cache, Arc::new(FakeNetwork::serving_shell()));

        let count = worker.install().await.unwrap();

        assert_eq!(count, 5);
        assert_eq!(worker.state(), WorkerState::Installed);
        assert_eq!(cache.entries(DEFAULT_CACHE_VERSION).await, 5);
    }

    #[tokio::test]
    async fn test_one_missing_file_aborts_everything() {
        let cache = TestCache::new().await;
        let network = FakeNetwork::serving_shell();
        network.respond(
            shell_url("/images/mlc-logo.png").as_str(),
            AssetResponse::new(404, ResponseKind::Basic, "missing"),
        );
        let worker = default_worker(&cache, Arc::new(network));

        let result = worker.install().await;

        assert!(matches!(result, Err(WorkerError::Install { .. })));
        assert_eq!(worker.state(), WorkerState::Redundant);
        assert_eq!(cache.entries(DEFAULT_CACHE_VERSION).await, 0);
    }

    #[tokio::test]
    async fn test_network_failure_aborts_everything() {
        let cache = TestCache::new().await;
        let network = FakeNetwork::serving_shell();
        network.fail(shell_url("/css/styles.css").as_str());
        let worker = default_worker(&cache, Arc::new(network));

        assert!(worker.install().await.is_err());
        assert_eq!(cache.entries(DEFAULT_CACHE_VERSION).await, 0);
    }

    #[tokio::test]
    async fn test_fresh_start_activates_immediately() {
        let cache = TestCache::new().await;
        let worker = default_worker(&cache, Arc::new(FakeNetwork::serving_shell()));

        let state = worker.start().await.unwrap();

        assert_eq!(state, WorkerState::Activated);
    }
}

// =============================================================================
// Fetch
// =============================================================================

mod fetch {
    use super::*;

    #[tokio::test]
    async fn test_hit_is_served_without_network() {
        let cache = TestCache::new().await;
        let network = Arc::new(FakeNetwork::serving_shell());
        let worker = default_worker(&cache, network.clone());
        worker.install().await.unwrap();
        let calls = network.calls();

        let response = worker
            .fetch(&AssetRequest::get(shell_url("/index.html")))
            .await
            .unwrap();

        assert_eq!(response.body.as_ref(), b"shell /index.html");
        assert_eq!(response.header("content-type"), Some("text/plain"));
        assert_eq!(network.calls(), calls);
    }

    #[tokio::test]
    async fn test_same_origin_miss_is_written_through() {
        let cache = TestCache::new().await;
        let network = Arc::new(FakeNetwork::default());
        let url = shell_url("/js/extra.js");
        network.respond(
            url.as_str(),
            AssetResponse::new(200, ResponseKind::Basic, "extra"),
        );
        let worker = default_worker(&cache, network.clone());

        worker.fetch(&AssetRequest::get(url.clone())).await.unwrap();
        assert_eq!(cache.entries(DEFAULT_CACHE_VERSION).await, 1);

        let again = worker.fetch(&AssetRequest::get(url)).await.unwrap();
        assert_eq!(again.body.as_ref(), b"extra");
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn test_ineligible_responses_are_not_cached() {
        let cache = TestCache::new().await;
        let network = Arc::new(FakeNetwork::default());

        let partial = shell_url("/partial");
        network.respond(
            partial.as_str(),
            AssetResponse::new(206, ResponseKind::Basic, "part"),
        );
        let cors = Url::parse("https://cdn.example/lib.js").unwrap();
        network.respond(cors.as_str(), AssetResponse::new(200, ResponseKind::Cors, "lib"));
        let blob = Url::parse("https://mountainlaircamp.blob.core.windows.net/bank/a.mp3").unwrap();
        network.respond(blob.as_str(), AssetResponse::new(200, ResponseKind::Basic, "clip"));
        let posted = shell_url("/form");
        network.respond(posted.as_str(), AssetResponse::new(200, ResponseKind::Basic, "ok"));

        let worker = default_worker(&cache, network.clone());

        worker.fetch(&AssetRequest::get(partial)).await.unwrap();
        worker.fetch(&AssetRequest::get(cors)).await.unwrap();
        worker.fetch(&AssetRequest::get(blob)).await.unwrap();
        worker
            .fetch(&AssetRequest::new("POST", posted))
            .await
            .unwrap();
        worker
            .fetch(&AssetRequest::get(shell_url("/missing")))
            .await
            .unwrap();

        assert_eq!(cache.entries(DEFAULT_CACHE_VERSION).await, 0);
        assert_eq!(network.calls(), 5);
    }

    #[tokio::test]
    async fn test_network_failure_on_miss_propagates() {
        let cache = TestCache::new().await;
        let network = Arc::new(FakeNetwork::default());
        let url = shell_url("/offline");
        network.fail(url.as_str());
        let worker = default_worker(&cache, network);

        let result = worker.fetch(&AssetRequest::get(url)).await;

        assert!(matches!(result, Err(WorkerError::Network(_))));
    }

    #[tokio::test]
    async fn test_cross_origin_blob_never_writes_the_cache() {
        let blob_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mlc-soundbank/airhorn.mp3"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Access-Control-Allow-Origin", "*")
                    .set_body_bytes(vec![0x49u8, 0x44, 0x33]),
            )
            .expect(2)
            .mount(&blob_server)
            .await;

        let cache = TestCache::new().await;
        let network = HttpNetwork::new(
            common::origin(),
            Url::parse("http://127.0.0.1:1/").unwrap(),
        )
        .unwrap();
        let worker = OfflineWorker::new(
            common::worker_config(DEFAULT_CACHE_VERSION),
            cache.cache.clone(),
            Arc::new(network),
        );

        let url = Url::parse(&format!("{}/mlc-soundbank/airhorn.mp3", blob_server.uri())).unwrap();
        let first = worker.fetch(&AssetRequest::get(url.clone())).await.unwrap();
        let second = worker.fetch(&AssetRequest::get(url)).await.unwrap();

        assert_eq!(first.kind, ResponseKind::Cors);
        assert_eq!(second.body.as_ref(), &[0x49u8, 0x44, 0x33]);
        assert_eq!(cache.entries(DEFAULT_CACHE_VERSION).await, 0);
    }

    #[tokio::test]
    async fn test_install_through_upstream_server() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("shell"))
            .expect(5)
            .mount(&upstream)
            .await;

        let cache = TestCache::new().await;
        let network =
            HttpNetwork::new(common::origin(), Url::parse(&format!("{}/", upstream.uri())).unwrap())
                .unwrap();
        let worker = OfflineWorker::new(
            common::worker_config(DEFAULT_CACHE_VERSION),
            cache.cache.clone(),
            Arc::new(network),
        );

        assert_eq!(worker.install().await.unwrap(), 5);

        let hit = worker
            .fetch(&AssetRequest::get(shell_url("/css/styles.css")))
            .await
            .unwrap();
        assert_eq!(hit.kind, ResponseKind::Basic);
        assert_eq!(hit.body.as_ref(), b"shell");
    }
}

// =============================================================================
// Activate and Control Messages
// =============================================================================

mod activate {
    use super::*;

    #[tokio::test]
    async fn test_activate_keeps_only_current_version() {
        let cache = TestCache::new().await;
        let network = Arc::new(FakeNetwork::serving_shell());

        worker(&cache, network.clone(), "v1").install().await.unwrap();
        let current = worker(&cache, network, "v2");
        current.install().await.unwrap();

        let deleted = current.activate().await.unwrap();

        assert_eq!(deleted, vec!["v1".to_string()]);
        assert_eq!(cache.cache.keys().await.unwrap(), vec!["v2".to_string()]);
        assert_eq!(current.state(), WorkerState::Activated);
    }

    #[tokio::test]
    async fn test_new_version_waits_while_old_cache_exists() {
        let cache = TestCache::new().await;
        let old_network = Arc::new(FakeNetwork::default());
        old_network.respond(
            shell_url("/legacy.js").as_str(),
            AssetResponse::new(200, ResponseKind::Basic, "legacy"),
        );
        let old = worker(&cache, old_network, "v1");
        old.fetch(&AssetRequest::get(shell_url("/legacy.js")))
            .await
            .unwrap();

        let network = Arc::new(FakeNetwork::serving_shell());
        let next = worker(&cache, network.clone(), "v2");
        let state = next.start().await.unwrap();
        assert_eq!(state, WorkerState::Installed);

        // still answered from the old version's cache
        let legacy = next
            .fetch(&AssetRequest::get(shell_url("/legacy.js")))
            .await
            .unwrap();
        assert_eq!(legacy.body.as_ref(), b"legacy");

        let state = next.handle_message(&WorkerMessage::SkipWaiting).await.unwrap();
        assert_eq!(state, WorkerState::Activated);
        assert_eq!(cache.cache.keys().await.unwrap(), vec!["v2".to_string()]);
    }

    #[tokio::test]
    async fn test_skip_waiting_before_start_activates_after_install() {
        let cache = TestCache::new().await;
        let network = Arc::new(FakeNetwork::serving_shell());
        worker(&cache, network.clone(), "v1").install().await.unwrap();

        let next = worker(&cache, network, "v2");
        next.handle_message(&WorkerMessage::SkipWaiting).await.unwrap();
        assert_eq!(next.state(), WorkerState::Parsed);

        assert_eq!(next.start().await.unwrap(), WorkerState::Activated);
    }

    #[tokio::test]
    async fn test_unknown_message_is_ignored() {
        let cache = TestCache::new().await;
        let network = Arc::new(FakeNetwork::serving_shell());
        worker(&cache, network.clone(), "v1").install().await.unwrap();
        let next = worker(&cache, network, "v2");
        next.start().await.unwrap();

        let state = next.handle_message(&WorkerMessage::Unknown).await.unwrap();

        assert_eq!(state, WorkerState::Installed);
        assert!(!next.skip_waiting_requested());
        assert_eq!(cache.cache.keys().await.unwrap().len(), 2);
    }
}

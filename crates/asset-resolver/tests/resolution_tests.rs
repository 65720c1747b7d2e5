//! Resolution against a live (in-process) search endpoint.

use std::sync::Arc;
use std::time::Duration;

use asset_resolver::{
    resolve_asset, LayerResolver, NamingResolver, Resolution, ResolutionRequest, ResolverFactory,
};
use explorer_common::{ExplorerError, NamingTemplate};
use serde_json::json;
use test_utils::fixtures::{options, time};
use test_utils::{
    empty_search_response, hrrr_naming_collection, hrrr_search_collection, search_response,
    MockReply, MockSearchServer,
};

fn factory() -> ResolverFactory {
    ResolverFactory::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_search_resolves_descriptor() {
    let server = MockSearchServer::with_json(search_response(
        time::HRRR_F03_HREF,
        &[(options::TEMPERATURE, 71)],
    ))
    .await;
    let collection = hrrr_search_collection(&server.url());
    let resolver = factory().resolver_for(&collection).await.unwrap();

    let descriptor = resolve_asset(
        resolver.as_ref(),
        &collection,
        &collection.id,
        time::REFERENCE,
        time::VALID,
        options::TEMPERATURE,
    )
    .await
    .unwrap();

    assert_eq!(
        descriptor,
        format!("vrt:///vsicurl/{}?bands=71", time::HRRR_F03_HREF)
    );

    let body = &server.request_bodies()[0];
    assert_eq!(body["collections"], json!(["noaa-hrrr"]));
    assert_eq!(body["filter-lang"], "cql-json");
    assert_eq!(body["filter"]["and"][0]["="][1], time::REFERENCE);
    assert_eq!(body["filter"]["and"][1]["="][1], time::VALID);
}

#[tokio::test]
async fn test_synonym_fallback_over_http() {
    let server = MockSearchServer::with_json(search_response(
        time::HRRR_F03_HREF,
        &[(options::POINT_IN_TIME, 12), (options::GUST_MAX, 84)],
    ))
    .await;
    let collection = hrrr_search_collection(&server.url());
    let resolver = factory().resolver_for(&collection).await.unwrap();

    let analysis = ResolutionRequest::new(&collection, time::REFERENCE, time::VALID, options::ANALYSIS);
    assert_eq!(resolver.resolve(&analysis).await.unwrap().band, "12");

    let gust = ResolutionRequest::new(&collection, time::REFERENCE, time::VALID, options::GUST_INSTANT);
    assert_eq!(resolver.resolve(&gust).await.unwrap().band, "84");
}

#[tokio::test]
async fn test_custom_synonyms_replace_defaults() {
    let server = MockSearchServer::with_json(search_response(
        time::HRRR_F03_HREF,
        &[(options::POINT_IN_TIME, 12), ("TMP__2_m__avg", 5)],
    ))
    .await;
    let mut collection = hrrr_search_collection(&server.url());
    collection.resolver = explorer_common::ResolverConfig::Search {
        asset_key: "grib".to_string(),
        synonyms: Some(vec![["instant".to_string(), "avg".to_string()]]),
    };
    let resolver = factory().resolver_for(&collection).await.unwrap();

    let avg = ResolutionRequest::new(&collection, time::REFERENCE, time::VALID, "TMP__2_m__instant");
    assert_eq!(resolver.resolve(&avg).await.unwrap().band, "5");

    // Default pairs are gone
    let analysis = ResolutionRequest::new(&collection, time::REFERENCE, time::VALID, options::ANALYSIS);
    assert!(matches!(
        resolver.resolve(&analysis).await,
        Err(ExplorerError::AssetNotFound(_))
    ));
}

#[tokio::test]
async fn test_http_error_is_lookup_failure() {
    let server = MockSearchServer::start(MockReply::Status(500)).await;
    let collection = hrrr_search_collection(&server.url());
    let resolver = factory().resolver_for(&collection).await.unwrap();
    let request = ResolutionRequest::new(&collection, time::REFERENCE, time::VALID, options::TEMPERATURE);

    match resolver.resolve(&request).await {
        Err(ExplorerError::AssetLookup(message)) => assert!(message.contains("500")),
        other => panic!("expected AssetLookup, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_endpoint_is_lookup_failure() {
    let collection = hrrr_search_collection("http://127.0.0.1:1/search");
    let resolver = factory().resolver_for(&collection).await.unwrap();
    let request = ResolutionRequest::new(&collection, time::REFERENCE, time::VALID, options::TEMPERATURE);

    assert!(matches!(
        resolver.resolve(&request).await,
        Err(ExplorerError::AssetLookup(_))
    ));
}

#[tokio::test]
async fn test_malformed_body_is_not_found() {
    let server = MockSearchServer::start(MockReply::Raw("{\"features\": 3".to_string())).await;
    let collection = hrrr_search_collection(&server.url());
    let resolver = factory().resolver_for(&collection).await.unwrap();
    let request = ResolutionRequest::new(&collection, time::REFERENCE, time::VALID, options::TEMPERATURE);

    assert!(matches!(
        resolver.resolve(&request).await,
        Err(ExplorerError::AssetNotFound(_))
    ));
}

#[tokio::test]
async fn test_no_features_is_not_found() {
    let server = MockSearchServer::with_json(empty_search_response()).await;
    let collection = hrrr_search_collection(&server.url());
    let resolver = factory().resolver_for(&collection).await.unwrap();
    let request = ResolutionRequest::new(&collection, time::REFERENCE, time::VALID, options::TEMPERATURE);

    assert!(matches!(
        resolver.resolve(&request).await,
        Err(ExplorerError::AssetNotFound(_))
    ));
}

#[tokio::test]
async fn test_layer_cache_avoids_repeat_searches() {
    let server = MockSearchServer::with_json(search_response(
        time::HRRR_F03_HREF,
        &[(options::TEMPERATURE, 71)],
    ))
    .await;
    let collection = hrrr_search_collection(&server.url());
    let resolver = factory().resolver_for(&collection).await.unwrap();
    let layer = LayerResolver::new(32);

    let request = ResolutionRequest::new(&collection, time::REFERENCE, time::VALID, options::TEMPERATURE);
    for _ in 0..2 {
        assert!(matches!(
            layer.resolve(resolver.as_ref(), &request).await,
            Resolution::Resolved { .. }
        ));
    }
    assert_eq!(server.request_count(), 1);

    let later = ResolutionRequest::new(&collection, time::REFERENCE, time::VALID_LATER, options::TEMPERATURE);
    layer.resolve(resolver.as_ref(), &later).await;
    assert_eq!(server.request_count(), 2);

    let stats = layer.cache_stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.entries, 2);
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let server = MockSearchServer::start(MockReply::Status(502)).await;
    let collection = hrrr_search_collection(&server.url());
    let resolver = factory().resolver_for(&collection).await.unwrap();
    let layer = LayerResolver::new(32);
    let request = ResolutionRequest::new(&collection, time::REFERENCE, time::VALID, options::TEMPERATURE);

    assert!(matches!(
        layer.resolve(resolver.as_ref(), &request).await,
        Resolution::Failed { .. }
    ));

    server.set_reply(MockReply::Json(search_response(
        time::HRRR_F03_HREF,
        &[(options::TEMPERATURE, 71)],
    )));
    assert!(matches!(
        layer.resolve(resolver.as_ref(), &request).await,
        Resolution::Resolved { cached: false, .. }
    ));
    assert_eq!(server.request_count(), 2);
}

#[tokio::test]
async fn test_slow_search_for_old_selection_is_discarded() {
    let server = Arc::new(
        MockSearchServer::with_json(search_response(
            time::HRRR_F03_HREF,
            &[(options::TEMPERATURE, 71)],
        ))
        .await,
    );
    let collection = Arc::new(hrrr_search_collection(&server.url()));
    let resolver = factory().resolver_for(&collection).await.unwrap();
    let layer = Arc::new(LayerResolver::new(32));

    server.hold();
    let pending = {
        let (layer, resolver, collection) = (layer.clone(), resolver.clone(), collection.clone());
        tokio::spawn(async move {
            let request =
                ResolutionRequest::new(&collection, time::REFERENCE, time::VALID, options::TEMPERATURE);
            layer.resolve(resolver.as_ref(), &request).await
        })
    };
    while server.request_count() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    server.unhold();

    let later = ResolutionRequest::new(&collection, time::REFERENCE, time::VALID_LATER, options::TEMPERATURE);
    assert!(matches!(
        layer.resolve(resolver.as_ref(), &later).await,
        Resolution::Resolved { .. }
    ));

    server.release_one();
    assert!(matches!(
        pending.await.unwrap(),
        Resolution::Superseded { .. }
    ));
    assert_eq!(layer.cache_stats().await.entries, 1);
}

#[tokio::test]
async fn test_naming_strategy_needs_no_network() {
    let collection = hrrr_naming_collection();
    let resolver = factory().resolver_for(&collection).await.unwrap();

    let descriptor = resolve_asset(
        resolver.as_ref(),
        &collection,
        &collection.id,
        time::REFERENCE,
        time::VALID,
        options::TEMPERATURE,
    )
    .await
    .unwrap();
    assert_eq!(
        descriptor,
        format!("vrt:///vsicurl/{}?bands=9", time::HRRR_F03_HREF)
    );

    // Same answer straight from the default template
    let direct = NamingResolver::new(NamingTemplate::default());
    let request = ResolutionRequest::new(&collection, time::REFERENCE, time::VALID, options::TEMPERATURE);
    assert_eq!(
        asset_resolver::AssetResolver::resolve(&direct, &request)
            .await
            .unwrap()
            .descriptor(),
        descriptor
    );
}

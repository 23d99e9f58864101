//! Resource client behavior against a mocked admin API.

mod common;

use common::{admin_path, can_bind_localhost, empty_list, init_tracing, item, list, options};
use gwadmin_client::{AdminCluster, Cluster, Error, ListOptions};
use gwadmin_core::{
    AdminApiVersion, GlobalRule, OwnerRef, PluginConfig, PluginMetadata, Plugins, ResourceKind,
    Route, Schema, Ssl, StreamRoute, Upstream, gen_id,
};
use httpmock::Method::{DELETE, GET, PUT};
use httpmock::MockServer;
use serde_json::{Map, json};
use std::time::Duration;

#[tokio::test]
async fn get_reads_through_cache_once() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }
    init_tracing();

    let server = MockServer::start_async().await;
    let id = gen_id("default_httpbin");
    let route = server
        .mock_async(|when, then| {
            when.method(GET).path(admin_path(&format!("routes/{id}")));
            then.status(200).json_body(item(
                &format!("/apisix/routes/{id}"),
                json!({"id": id, "name": "default_httpbin", "uri": "/get", "upstream_id": "u1"}),
            ));
        })
        .await;

    let cluster = AdminCluster::new(options("c1", &server)).unwrap();
    let first = cluster.route().get("default_httpbin").await.unwrap();
    let second = cluster.route().get("default_httpbin").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.uri.as_deref(), Some("/get"));
    assert_eq!(first.upstream_id.as_deref(), Some("u1"));
    route.assert_hits_async(1).await;
}

#[tokio::test]
async fn get_missing_is_not_found() {
    if !can_bind_localhost() {
        return;
    }
    init_tracing();

    let server = MockServer::start_async().await;
    let id = gen_id("absent");
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path(admin_path(&format!("upstreams/{id}")));
            then.status(404)
                .json_body(json!({"message": "Key not found"}));
        })
        .await;

    let cluster = AdminCluster::new(options("c1", &server)).unwrap();
    let err = cluster.upstream().get("absent").await.unwrap_err();
    match err {
        Error::NotFound { kind, id: missing } => {
            assert_eq!(kind, ResourceKind::Upstream);
            assert_eq!(missing, id);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Absence is not cached.
    let _ = cluster.upstream().get("absent").await;
    mock.assert_hits_async(2).await;
}

#[tokio::test]
async fn delete_treats_remote_404_as_success() {
    if !can_bind_localhost() {
        return;
    }
    init_tracing();

    let server = MockServer::start_async().await;
    let route = Route::named("gone");
    let mock = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path(admin_path(&format!("routes/{}", route.id)));
            then.status(404);
        })
        .await;

    let cluster = AdminCluster::new(options("c1", &server)).unwrap();
    cluster.route().delete(&route).await.unwrap();
    cluster.route().delete(&route).await.unwrap();
    mock.assert_hits_async(2).await;
}

#[tokio::test]
async fn create_then_list_then_delete() {
    if !can_bind_localhost() {
        return;
    }
    init_tracing();

    let server = MockServer::start_async().await;
    let mut route = Route::named("default_httpbin");
    route.uris = vec!["/get".to_string()];
    let key = format!("/apisix/routes/{}", route.id);
    let stored = json!({
        "id": route.id,
        "name": "default_httpbin",
        "uris": ["/get"],
        "priority": 0,
        "create_time": 1700000000
    });

    let put = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(admin_path(&format!("routes/{}", route.id)));
            then.status(201).json_body(item(&key, stored.clone()));
        })
        .await;
    let mut listed = server
        .mock_async(|when, then| {
            when.method(GET).path(admin_path("routes"));
            then.status(200).json_body(list(vec![item(&key, stored.clone())]));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path(admin_path(&format!("routes/{}", route.id)));
            then.status(200).json_body(json!({"deleted": "1", "key": key}));
        })
        .await;

    let cluster = AdminCluster::new(options("c1", &server)).unwrap();

    let created = cluster.route().create(&route).await.unwrap();
    put.assert_hits_async(1).await;
    // The confirmed object carries server-side defaults.
    assert_eq!(created.priority, Some(0));
    assert!(created.extra.contains_key("create_time"));
    assert_ne!(created, route);

    let routes = cluster.route().list(&ListOptions::remote()).await.unwrap();
    assert!(routes.iter().any(|r| r.id == route.id));

    cluster.route().delete(&created).await.unwrap();
    delete.assert_hits_async(1).await;
    assert!(
        cluster
            .route()
            .list(&ListOptions {
                from_cache: true,
                owner: None
            })
            .await
            .unwrap()
            .is_empty()
    );

    listed.delete_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(admin_path("routes"));
            then.status(200).json_body(empty_list());
        })
        .await;
    let routes = cluster.route().list(&ListOptions::remote()).await.unwrap();
    assert!(routes.iter().all(|r| r.id != route.id));
}

#[tokio::test]
async fn referenced_upstream_is_deleted_only_after_its_route() {
    if !can_bind_localhost() {
        return;
    }
    init_tracing();

    let server = MockServer::start_async().await;
    let upstream = Upstream::named("default_httpbin_80");
    let mut route = Route::named("default_httpbin");
    route.upstream_id = Some(upstream.id.clone());

    server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(admin_path(&format!("upstreams/{}", upstream.id)));
            then.status(200).json_body(item(
                &format!("/apisix/upstreams/{}", upstream.id),
                json!({"id": upstream.id, "name": "default_httpbin_80", "nodes": {"10.0.0.1:80": 1}}),
            ));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(admin_path(&format!("routes/{}", route.id)));
            then.status(200).json_body(item(
                &format!("/apisix/routes/{}", route.id),
                json!({"id": route.id, "name": "default_httpbin", "upstream_id": upstream.id}),
            ));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path(admin_path(&format!("upstreams/{}", upstream.id)));
            then.status(200);
        })
        .await;

    let cluster = AdminCluster::new(options("c1", &server)).unwrap();
    let upstream = cluster.upstream().create(&upstream).await.unwrap();
    assert_eq!(upstream.nodes.len(), 1);
    cluster.route().create(&route).await.unwrap();

    let err = cluster.upstream().delete(&upstream).await.unwrap_err();
    assert!(matches!(
        err,
        Error::StillInUse {
            kind: ResourceKind::Upstream,
            dependent: ResourceKind::Route,
            ..
        }
    ));
    delete.assert_hits_async(0).await;

    let route_delete = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path(admin_path(&format!("routes/{}", route.id)));
            then.status(200);
        })
        .await;
    cluster.route().delete(&route).await.unwrap();
    route_delete.assert_hits_async(1).await;

    cluster.upstream().delete(&upstream).await.unwrap();
    delete.assert_hits_async(1).await;
    assert!(cluster.upstream().list(&cached()).await.unwrap().is_empty());
}

fn cached() -> ListOptions {
    ListOptions {
        from_cache: true,
        owner: None,
    }
}

#[tokio::test]
async fn referenced_plugin_config_is_deleted_only_after_its_route() {
    if !can_bind_localhost() {
        return;
    }
    init_tracing();

    let server = MockServer::start_async().await;
    let plugin_config = PluginConfig::named("default_auth");
    let mut route = Route::named("default_httpbin");
    route.plugin_config_id = Some(plugin_config.id.clone());

    server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(admin_path(&format!("plugin_configs/{}", plugin_config.id)));
            then.status(200).json_body(item(
                &format!("/apisix/plugin_configs/{}", plugin_config.id),
                json!({"id": plugin_config.id, "name": "default_auth", "plugins": {}}),
            ));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(admin_path(&format!("routes/{}", route.id)));
            then.status(200).json_body(item(
                &format!("/apisix/routes/{}", route.id),
                json!({"id": route.id, "name": "default_httpbin", "plugin_config_id": plugin_config.id}),
            ));
        })
        .await;
    let route_delete = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path(admin_path(&format!("routes/{}", route.id)));
            then.status(200);
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path(admin_path(&format!("plugin_configs/{}", plugin_config.id)));
            then.status(200);
        })
        .await;

    let cluster = AdminCluster::new(options("c1", &server)).unwrap();
    let plugin_config = cluster.plugin_config().create(&plugin_config).await.unwrap();
    let route = cluster.route().create(&route).await.unwrap();

    let err = cluster
        .plugin_config()
        .delete(&plugin_config)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::StillInUse {
            kind: ResourceKind::PluginConfig,
            dependent: ResourceKind::Route,
            ..
        }
    ));
    delete.assert_hits_async(0).await;

    cluster.route().delete(&route).await.unwrap();
    route_delete.assert_hits_async(1).await;
    cluster.plugin_config().delete(&plugin_config).await.unwrap();
    delete.assert_hits_async(1).await;
}

#[tokio::test]
async fn remote_delete_wins_over_dependent_cached_in_flight() {
    if !can_bind_localhost() {
        return;
    }
    init_tracing();

    let server = MockServer::start_async().await;
    let upstream = Upstream::named("default_httpbin_80");
    let mut route = Route::named("default_httpbin");
    route.upstream_id = Some(upstream.id.clone());

    server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(admin_path(&format!("upstreams/{}", upstream.id)));
            then.status(200).json_body(item(
                &format!("/apisix/upstreams/{}", upstream.id),
                json!({"id": upstream.id, "name": "default_httpbin_80"}),
            ));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(admin_path(&format!("routes/{}", route.id)));
            then.status(200).json_body(item(
                &format!("/apisix/routes/{}", route.id),
                json!({"id": route.id, "name": "default_httpbin", "upstream_id": upstream.id}),
            ));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path(admin_path(&format!("upstreams/{}", upstream.id)));
            then.status(200).delay(Duration::from_millis(300));
        })
        .await;

    let cluster = AdminCluster::new(options("c1", &server)).unwrap();
    let upstream = cluster.upstream().create(&upstream).await.unwrap();

    let (deleted, created) = tokio::join!(cluster.upstream().delete(&upstream), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cluster.route().create(&route).await
    });
    deleted.unwrap();
    created.unwrap();
    delete.assert_hits_async(1).await;

    // The cache mirrors the remote: the upstream is gone, the route stays.
    assert!(cluster.upstream().list(&cached()).await.unwrap().is_empty());
    assert_eq!(cluster.route().list(&cached()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn global_rule_id_is_first_plugin_name() {
    if !can_bind_localhost() {
        return;
    }
    init_tracing();

    let server = MockServer::start_async().await;
    let put = server
        .mock_async(|when, then| {
            when.method(PUT).path(admin_path("global_rules/limit-count"));
            then.status(200).json_body(item(
                "/apisix/global_rules/limit-count",
                json!({"id": "limit-count", "plugins": {"limit-count": {"count": 2, "time_window": 60}}}),
            ));
        })
        .await;

    let mut plugins = Plugins::new();
    plugins.insert(
        "limit-count".to_string(),
        json!({"count": 2, "time_window": 60}),
    );
    let cluster = AdminCluster::new(options("c1", &server)).unwrap();
    let rule = cluster
        .global_rule()
        .create(&GlobalRule::new(plugins))
        .await
        .unwrap();

    assert_eq!(rule.id, "limit-count");
    put.assert_hits_async(1).await;
    assert_eq!(cluster.global_rule().get("limit-count").await.unwrap(), rule);
}

#[tokio::test]
async fn disabled_function_is_reported() {
    if !can_bind_localhost() {
        return;
    }
    init_tracing();

    let server = MockServer::start_async().await;
    let mut stream_route = StreamRoute::named("tcp");
    stream_route.server_port = Some(9100);
    server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(admin_path(&format!("stream_routes/{}", stream_route.id)));
            then.status(400).json_body(
                json!({"error_msg": "stream mode is disabled, can not add stream routes"}),
            );
        })
        .await;

    let cluster = AdminCluster::new(options("c1", &server)).unwrap();
    let err = cluster
        .stream_route()
        .create(&stream_route)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::FunctionDisabled));
}

#[tokio::test]
async fn disabled_marker_in_a_successful_body_is_plain_data() {
    if !can_bind_localhost() {
        return;
    }
    init_tracing();

    let server = MockServer::start_async().await;
    let id = gen_id("legacy");
    server
        .mock_async(|when, then| {
            when.method(GET).path(admin_path("routes"));
            then.status(200).json_body(list(vec![item(
                &format!("/apisix/routes/{id}"),
                json!({"id": id, "name": "legacy", "desc": "legacy auth is disabled here"}),
            )]));
        })
        .await;

    let cluster = AdminCluster::new(options("c1", &server)).unwrap();
    let routes = cluster.route().list(&ListOptions::remote()).await.unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].desc.as_deref(), Some("legacy auth is disabled here"));
}

#[tokio::test]
async fn unexpected_status_carries_code_and_body() {
    if !can_bind_localhost() {
        return;
    }
    init_tracing();

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(admin_path("routes"));
            then.status(500).body("etcd unavailable");
        })
        .await;

    let cluster = AdminCluster::new(options("c1", &server)).unwrap();
    match cluster.route().list(&ListOptions::remote()).await {
        Err(Error::Status { status, body, .. }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "etcd unavailable");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn admin_key_is_sent() {
    if !can_bind_localhost() {
        return;
    }
    init_tracing();

    let server = MockServer::start_async().await;
    let key = "edd1c9f034335f136f87ad84b625c8f1";
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(admin_path("consumers/jack"))
                .header("x-api-key", key);
            then.status(200).json_body(item(
                "/apisix/consumers/jack",
                json!({"username": "jack", "plugins": {"key-auth": {"key": "auth-one"}}}),
            ));
        })
        .await;

    let mut opts = options("c1", &server);
    opts.admin_key = Some(key.to_string());
    let cluster = AdminCluster::new(opts).unwrap();
    let consumer = cluster.consumer().get("jack").await.unwrap();
    assert_eq!(consumer.username, "jack");
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn sync_comparison_skips_identical_writes() {
    if !can_bind_localhost() {
        return;
    }
    init_tracing();

    let server = MockServer::start_async().await;
    let ssl = Ssl::new(vec!["a.example.com".to_string()], "CERT", "KEY");
    let put = server
        .mock_async(|when, then| {
            when.method(PUT).path(admin_path(&format!("ssls/{}", ssl.id)));
            then.status(200).json_body(item(
                &format!("/apisix/ssls/{}", ssl.id),
                json!({"id": ssl.id, "snis": ["a.example.com"], "cert": "CERT", "key": "KEY"}),
            ));
        })
        .await;

    let mut opts = options("c1", &server);
    opts.sync_comparison = true;
    let cluster = AdminCluster::new(opts).unwrap();

    cluster.ssl().create(&ssl).await.unwrap();
    cluster.ssl().update(&ssl).await.unwrap();
    put.assert_hits_async(1).await;

    let mut changed = ssl.clone();
    changed.snis.push("b.example.com".to_string());
    cluster.ssl().update(&changed).await.unwrap();
    put.assert_hits_async(2).await;
}

#[tokio::test]
async fn plugin_metadata_body_is_the_metadata_object() {
    if !can_bind_localhost() {
        return;
    }
    init_tracing();

    let server = MockServer::start_async().await;
    let put = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(admin_path("plugin_metadata/http-logger"))
                .json_body(json!({"log_format": {"host": "$host"}}));
            then.status(200).json_body(item(
                "/apisix/plugin_metadata/http-logger",
                json!({"id": "http-logger", "log_format": {"host": "$host"}}),
            ));
        })
        .await;

    let mut metadata = Map::new();
    metadata.insert("log_format".to_string(), json!({"host": "$host"}));
    let cluster = AdminCluster::new(options("c1", &server)).unwrap();
    let stored = cluster
        .plugin_metadata()
        .create(&PluginMetadata::new("http-logger", metadata))
        .await
        .unwrap();

    put.assert_hits_async(1).await;
    assert_eq!(stored.name, "http-logger");
    assert!(!stored.metadata.contains_key("id"));
}

#[tokio::test]
async fn schemas_are_read_only_and_cached() {
    if !can_bind_localhost() {
        return;
    }
    init_tracing();

    let server = MockServer::start_async().await;
    let schema = server
        .mock_async(|when, then| {
            when.method(GET).path(admin_path("schema/plugins/cors"));
            then.status(200)
                .json_body(json!({"type": "object", "properties": {}}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(admin_path("plugins/list"));
            then.status(200).json_body(json!(["cors"]));
        })
        .await;

    let cluster = AdminCluster::new(options("c1", &server)).unwrap();
    let key = Schema::plugin_key("cors");
    let fetched = cluster.schema().get(&key).await.unwrap();
    assert_eq!(fetched.name, "plugins/cors");
    assert!(fetched.content.contains("\"object\""));
    cluster.schema().get(&key).await.unwrap();
    schema.assert_hits_async(1).await;

    let all = cluster.schema().list(&ListOptions::remote()).await.unwrap();
    assert_eq!(all.len(), 1);
    schema.assert_hits_async(2).await;

    assert!(matches!(
        cluster.schema().create(&fetched).await,
        Err(Error::ReadOnly(ResourceKind::Schema))
    ));
    assert!(matches!(
        cluster.schema().delete(&fetched).await,
        Err(Error::ReadOnly(ResourceKind::Schema))
    ));
}

#[tokio::test]
async fn schema_fetch_succeeds_when_caching_fails() {
    if !can_bind_localhost() {
        return;
    }
    init_tracing();

    let server = MockServer::start_async().await;
    let schema = server
        .mock_async(|when, then| {
            when.method(GET).path(admin_path("schema/"));
            then.status(200).json_body(json!({"type": "object"}));
        })
        .await;

    let cluster = AdminCluster::new(options("c1", &server)).unwrap();
    // An empty key cannot be cached, so every lookup goes to the gateway.
    let fetched = cluster.schema().get("").await.unwrap();
    assert!(fetched.content.contains("\"object\""));
    cluster.schema().get("").await.unwrap();
    schema.assert_hits_async(2).await;
}

#[tokio::test]
async fn v2_envelopes_and_paths() {
    if !can_bind_localhost() {
        return;
    }
    init_tracing();

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(admin_path("ssl/s1"));
            then.status(200).json_body(json!({
                "action": "get",
                "node": {"key": "/apisix/ssl/s1", "value": {"id": "s1", "snis": ["a.example.com"]}}
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(admin_path("ssl"));
            then.status(200)
                .json_body(json!({"action": "get", "node": {"dir": true, "nodes": {}}}));
        })
        .await;

    let mut opts = options("c1", &server);
    opts.admin_api_version = AdminApiVersion::V2;
    let cluster = AdminCluster::new(opts).unwrap();

    let ssl = cluster.ssl().get("s1").await.unwrap();
    assert_eq!(ssl.snis, vec!["a.example.com".to_string()]);
    assert!(cluster.ssl().list(&ListOptions::remote()).await.unwrap().is_empty());
}

#[tokio::test]
async fn remote_list_filters_by_owner() {
    if !can_bind_localhost() {
        return;
    }
    init_tracing();

    let server = MockServer::start_async().await;
    let owner = OwnerRef::new("HTTPRoute", "default", "httpbin");
    server
        .mock_async(|when, then| {
            when.method(GET).path(admin_path("upstreams"));
            then.status(200).json_body(list(vec![
                item(
                    "/apisix/upstreams/u1",
                    json!({"id": "u1", "labels": {"k8s/kind": "HTTPRoute", "k8s/namespace": "default", "k8s/name": "httpbin"}}),
                ),
                item("/apisix/upstreams/u2", json!({"id": "u2"})),
            ]));
        })
        .await;

    let cluster = AdminCluster::new(options("c1", &server)).unwrap();
    let owned = cluster
        .upstream()
        .list(&ListOptions {
            from_cache: false,
            owner: Some(owner),
        })
        .await
        .unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].id, "u1");
}

//! HTTP-level tests for the Mythic Beasts provider, driven through the
//! public record operations against a mock API server.

use std::net::{IpAddr, Ipv4Addr};

use assert_matches::assert_matches;
use httpmock::prelude::*;
use serde_json::json;

use super::{MythicBeastsConfig, MythicBeastsProvider};
use crate::core::provider::{RecordAppender, RecordDeleter, RecordGetter, RecordSetter};
use crate::core::record::{Record, Rr};
use crate::error::Error;

fn provider_for(server: &MockServer) -> MythicBeastsProvider {
    let config = MythicBeastsConfig {
        key_id: "keyid".into(),
        secret: "secret".into(),
        api_url: server.url(""),
        auth_url: server.url("/login"),
    };
    MythicBeastsProvider::new(config).unwrap()
}

async fn mock_login(server: &MockServer) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/login")
                .body("grant_type=client_credentials");
            then.status(200).json_body(json!({
                "access_token": "tok",
                "expires_in": 3600,
                "token_type": "bearer",
            }));
        })
        .await
}

fn a_record(name: &str) -> Record {
    Record::Address {
        name: name.into(),
        ip: IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4)),
        ttl: 300,
    }
}

#[tokio::test]
async fn test_get_records_decodes_every_supported_shape() {
    let server = MockServer::start_async().await;
    let login = mock_login(&server).await;
    let records = server
        .mock_async(|when, then| {
            when.method(GET).path("/zones/example.com/records");
            then.status(200).json_body(json!({
                "records": [
                    {"type": "A", "host": "www", "data": "1.2.3.4", "ttl": 300},
                    {"type": "MX", "host": "@", "data": "mail.example.com.",
                     "ttl": 300, "mx_priority": 10},
                    {"type": "SRV", "host": "_sip._tcp.host1",
                     "data": "srv.example.com.", "ttl": 60,
                     "srv_priority": 10, "srv_weight": 5, "srv_port": 5060},
                    {"type": "CAA", "host": "@", "data": "letsencrypt.org",
                     "ttl": 300, "caa_flags": 0, "caa_tag": "issue"},
                    {"type": "SSHFP", "host": "host", "data": "123abc",
                     "ttl": 60, "sshfp_algorithm": 4, "sshfp_type": 2},
                    {"type": "TLSA", "host": "_443._tcp", "data": "3 1 1 abc",
                     "ttl": 300},
                ],
            }));
        })
        .await;

    let provider = provider_for(&server);
    // A deep subdomain zone is coerced to its registrable parent: the mock
    // only answers /zones/example.com/records.
    let result = provider.get_records("www.example.com.").await.unwrap();

    assert_eq!(result.len(), 6);
    assert_eq!(result[0], a_record("www"));
    assert_eq!(
        result[1],
        Record::Mx {
            name: "@".into(),
            preference: 10,
            target: "mail.example.com.".into(),
            ttl: 300,
        }
    );
    assert_eq!(
        result[2],
        Record::Srv {
            service: "sip".into(),
            transport: "tcp".into(),
            name: "host1".into(),
            priority: 10,
            weight: 5,
            port: 5060,
            target: "srv.example.com.".into(),
            ttl: 60,
        }
    );
    assert_eq!(
        result[3],
        Record::Caa {
            name: "@".into(),
            flags: 0,
            tag: "issue".into(),
            value: "letsencrypt.org".into(),
            ttl: 300,
        }
    );
    assert_eq!(
        result[4],
        Record::Rr(Rr {
            rtype: "SSHFP".into(),
            name: "host".into(),
            data: "4 2 123abc".into(),
            ttl: 60,
        })
    );
    assert_eq!(
        result[5],
        Record::Rr(Rr {
            rtype: "TLSA".into(),
            name: "_443._tcp".into(),
            data: "3 1 1 abc".into(),
            ttl: 300,
        })
    );

    login.assert_async().await;
    records.assert_async().await;
}

#[tokio::test]
async fn test_token_reused_within_validity_window() {
    let server = MockServer::start_async().await;
    let login = mock_login(&server).await;
    let records = server
        .mock_async(|when, then| {
            when.method(GET).path("/zones/example.com/records");
            then.status(200).json_body(json!({ "records": [] }));
        })
        .await;

    let provider = provider_for(&server);
    provider.get_records("example.com").await.unwrap();
    provider.get_records("example.com").await.unwrap();

    assert_eq!(login.hits_async().await, 1);
    assert_eq!(records.hits_async().await, 2);
}

#[tokio::test]
async fn test_token_with_zero_expiry_gets_default_lifetime() {
    let server = MockServer::start_async().await;
    // An expires_in of 0 falls back to the default lifetime instead of
    // treating the token as already stale.
    let login = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/login")
                .body("grant_type=client_credentials");
            then.status(200).json_body(json!({
                "access_token": "tok",
                "expires_in": 0,
                "token_type": "bearer",
            }));
        })
        .await;
    let records = server
        .mock_async(|when, then| {
            when.method(GET).path("/zones/example.com/records");
            then.status(200).json_body(json!({ "records": [] }));
        })
        .await;

    let provider = provider_for(&server);
    provider.get_records("example.com").await.unwrap();
    provider.get_records("example.com").await.unwrap();

    assert_eq!(login.hits_async().await, 1);
    assert_eq!(records.hits_async().await, 2);
}

#[tokio::test]
async fn test_401_invalidates_token_and_next_call_relogs_in() {
    let server = MockServer::start_async().await;
    let login = mock_login(&server).await;
    let rejected = server
        .mock_async(|when, then| {
            when.method(GET).path("/zones/example.com/records");
            then.status(401).json_body(json!({ "error": "unauthorized" }));
        })
        .await;

    let provider = provider_for(&server);
    let err = provider.get_records("example.com").await.unwrap_err();
    assert_matches!(err, Error::Api { status: 401, .. });
    assert_eq!(login.hits_async().await, 1);

    rejected.delete_async().await;
    let accepted = server
        .mock_async(|when, then| {
            when.method(GET).path("/zones/example.com/records");
            then.status(200).json_body(json!({ "records": [] }));
        })
        .await;

    provider.get_records("example.com").await.unwrap();

    // The 401 cleared the cached token, so the second call logged in again.
    assert_eq!(login.hits_async().await, 2);
    accepted.assert_async().await;
}

#[tokio::test]
async fn test_append_posts_one_batch_and_returns_inputs() {
    let server = MockServer::start_async().await;
    let login = mock_login(&server).await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/zones/example.com/records");
            then.status(200).json_body(json!({ "records_added": 2 }));
        })
        .await;

    let provider = provider_for(&server);
    let input = vec![a_record("www"), a_record("mail")];
    let added = provider
        .append_records("example.com", input.clone())
        .await
        .unwrap();

    assert_eq!(added, input);
    login.assert_async().await;
    create.assert_async().await;
}

#[tokio::test]
async fn test_set_puts_payload_with_deduplicated_selectors() {
    let server = MockServer::start_async().await;
    let login = mock_login(&server).await;
    let replace = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/zones/example.com/records")
                .query_param("host", "www")
                .query_param("type", "A");
            then.status(200)
                .json_body(json!({ "records_added": 2, "records_removed": 1 }));
        })
        .await;

    let provider = provider_for(&server);
    // Two records for the same (host, type) produce a single selector pair.
    let input = vec![
        a_record("www"),
        Record::Address {
            name: "www".into(),
            ip: IpAddr::V4(Ipv4Addr::new(5, 6, 7, 8)),
            ttl: 300,
        },
    ];
    let set = provider.set_records("example.com", input.clone()).await.unwrap();

    assert_eq!(set, input);
    login.assert_async().await;
    replace.assert_async().await;
}

#[tokio::test]
async fn test_set_with_empty_input_makes_no_network_calls() {
    // Unroutable endpoints: any network attempt would fail the call.
    let config = MythicBeastsConfig {
        key_id: "keyid".into(),
        secret: "secret".into(),
        api_url: "http://127.0.0.1:1".into(),
        auth_url: "http://127.0.0.1:1/login".into(),
    };
    let provider = MythicBeastsProvider::new(config).unwrap();

    let set = provider.set_records("example.com", Vec::new()).await.unwrap();
    assert!(set.is_empty());

    // A bad zone still fails, even with nothing to replace.
    let err = provider.set_records("com", Vec::new()).await.unwrap_err();
    assert_matches!(err, Error::InvalidZone(_));
}

#[tokio::test]
async fn test_delete_partial_failure_keeps_deleted_prefix() {
    let server = MockServer::start_async().await;
    let login = mock_login(&server).await;
    let first = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/zones/example.com/records/www/A");
            then.status(200).json_body(json!({ "records_removed": 1 }));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/zones/example.com/records/mail/A");
            then.status(500).json_body(json!({ "error": "server error" }));
        })
        .await;
    let third = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/zones/example.com/records/ftp/A");
            then.status(200).json_body(json!({ "records_removed": 1 }));
        })
        .await;

    let provider = provider_for(&server);
    let err = provider
        .delete_records(
            "example.com",
            vec![a_record("www"), a_record("mail"), a_record("ftp")],
        )
        .await
        .unwrap_err();

    assert_matches!(err, Error::Partial { done, source } => {
        assert_eq!(done, vec![a_record("www")]);
        assert_matches!(*source, Error::Api { status: 500, .. });
    });

    login.assert_async().await;
    first.assert_async().await;
    second.assert_async().await;
    // The failure stopped the run before the third record.
    assert_eq!(third.hits_async().await, 0);
}

#[tokio::test]
async fn test_delete_skips_records_the_api_did_not_remove() {
    let server = MockServer::start_async().await;
    let _login = mock_login(&server).await;
    let _missing = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/zones/example.com/records/www/A");
            then.status(200).json_body(json!({ "records_removed": 0 }));
        })
        .await;

    let provider = provider_for(&server);
    let deleted = provider
        .delete_records("example.com", vec![a_record("www")])
        .await
        .unwrap();
    assert!(deleted.is_empty());
}

#[tokio::test]
async fn test_login_rejects_unexpected_token_type() {
    let server = MockServer::start_async().await;
    let _login = server
        .mock_async(|when, then| {
            when.method(POST).path("/login");
            then.status(200).json_body(json!({
                "access_token": "tok",
                "expires_in": 3600,
                "token_type": "mac",
            }));
        })
        .await;

    let provider = provider_for(&server);
    let err = provider.get_records("example.com").await.unwrap_err();
    assert_matches!(err, Error::Auth(msg) if msg.contains("mac"));
}

#[tokio::test]
async fn test_login_4xx_decodes_structured_error_body() {
    let server = MockServer::start_async().await;
    let _login = server
        .mock_async(|when, then| {
            when.method(POST).path("/login");
            then.status(403).json_body(json!({
                "error": "access denied",
                "error_description": "key disabled",
            }));
        })
        .await;

    let provider = provider_for(&server);
    let err = provider.get_records("example.com").await.unwrap_err();
    assert_matches!(
        err,
        Error::Auth(msg) if msg.contains("403") && msg.contains("key disabled")
    );
}

#[tokio::test]
async fn test_malformed_zone_fails_before_any_network_activity() {
    let config = MythicBeastsConfig {
        key_id: "keyid".into(),
        secret: "secret".into(),
        api_url: "http://127.0.0.1:1".into(),
        auth_url: "http://127.0.0.1:1/login".into(),
    };
    let provider = MythicBeastsProvider::new(config).unwrap();

    let err = provider.get_records("com").await.unwrap_err();
    assert_matches!(err, Error::InvalidZone(_));
}

use std::time::Duration;

use chrono::Utc;
use geo_audit::network::build_client;
use geo_audit::sitemap::resolve_sitemap_meta;
use geo_audit::{AuditOptions, SitemapMeta};
use httpmock::prelude::*;
use url::Url;

const SITEMAP: &str =
    "<urlset><url><loc>https://public.example/</loc><lastmod>2025-01-01</lastmod></url></urlset>";

fn options(allow_private_networks: bool) -> AuditOptions {
    AuditOptions {
        allow_private_networks,
        retries: 0,
        request_timeout: Duration::from_secs(2),
        ..AuditOptions::default()
    }
}

fn serve_internal_sitemap(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/latest/meta-data");
        then.status(200).header("content-type", "application/xml").body(SITEMAP);
    })
}

#[tokio::test]
async fn declared_sitemap_on_private_address_is_skipped() {
    let server = MockServer::start();
    let internal = serve_internal_sitemap(&server);
    let declared = vec![server.url("/latest/meta-data")];
    let target = Url::parse("http://public.invalid/").unwrap();

    let opts = options(false);
    let client = build_client(&opts).unwrap();
    let meta = resolve_sitemap_meta(&client, &target, &declared, &opts, Utc::now()).await;

    assert_eq!(internal.hits(), 0);
    assert_eq!(meta, SitemapMeta::default());
}

#[tokio::test]
async fn private_sitemaps_are_read_when_allowed() {
    let server = MockServer::start();
    let internal = serve_internal_sitemap(&server);
    let declared = vec![server.url("/latest/meta-data")];
    let target = Url::parse(&server.url("/")).unwrap();

    let opts = options(true);
    let client = build_client(&opts).unwrap();
    let meta = resolve_sitemap_meta(&client, &target, &declared, &opts, Utc::now()).await;

    assert_eq!(internal.hits(), 1);
    assert_eq!(meta.url.as_deref(), Some(declared[0].as_str()));
    assert_eq!(meta.lastmod.as_deref(), Some("2025-01-01"));
}

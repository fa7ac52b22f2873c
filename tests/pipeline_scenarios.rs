//! End-to-end pipeline scenarios, one full `PipelineCoordinator::run()` per
//! case, asserting on the emitted catalog. Scenarios 1-3 and 6 disable
//! stream validation so they never touch the network; scenarios 4-5 stand up
//! a `wiremock` server to exercise the validator and the HTTPS->HTTP
//! converter against a real socket.

use std::path::Path;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use channel_curator::config::Config;
use channel_curator::pipeline::{PipelineCoordinator, PipelineStatus};

/// A `Config` rooted at a fresh temp directory, with every output path
/// pointed inside it and stream validation off by default (callers flip it
/// back on for the scenarios that need a live probe).
fn base_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.base_dir = dir.display().to_string();
    config.validated_catalog_path = dir.join("tv.csv").display().to_string();
    config.playlist_output_path = dir.join("channels.m3u").display().to_string();
    config.per_channel_playlist_dir = dir.join("m3u8").display().to_string();
    config.enable_stream_validation = false;
    config
}

fn write_playlist(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path.display().to_string()
}

async fn run(config: Config) -> (PipelineStatus, String) {
    let catalog_path = config.validated_catalog_path.clone();
    let coordinator = PipelineCoordinator::new(config);
    let execution = coordinator.run().await.unwrap();
    let catalog = std::fs::read_to_string(&catalog_path).unwrap_or_default();
    (execution.status, catalog)
}

/// Scenario 1 (spec §8): two playlist sources list the same stream under
/// "ESPN HD" and "ESPN"; the HD-upgrade tie-break keeps the "ESPN HD" record
/// (the merge representative dedup selects, with `quality=HD`). The
/// enrichment stage's name cleaning (spec §4.7) then strips the same
/// redundant quality token dedup's own name normalization would have (spec
/// §4.4), so the catalog's final display name is "ESPN" with the pre-clean
/// name preserved as `originalName` — the `quality` field is where the
/// HD-upgrade outcome is actually visible end to end.
#[tokio::test]
async fn hybrid_merge_with_collision_keeps_hd_quality() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = base_config(dir.path());

    let a = write_playlist(
        dir.path(),
        "a.m3u",
        "#EXTM3U\n#EXTINF:-1 tvg-id=\"espn-hd\",ESPN HD\nhttp://a/e\n",
    );
    let b = write_playlist(
        dir.path(),
        "b.m3u",
        "#EXTM3U\n#EXTINF:-1 tvg-id=\"espn-sd\",ESPN\nhttp://a/e\n",
    );
    config.channels_source = "hybrid".to_string();
    config.local_playlist_files = vec![a, b];

    let (status, catalog) = run(config).await;
    assert_eq!(status, PipelineStatus::Completed);

    let rows: Vec<&str> = catalog.lines().skip(1).filter(|l| !l.is_empty()).collect();
    assert_eq!(rows.len(), 1, "catalog should contain exactly one merged record:\n{catalog}");
    let row = rows[0];
    assert!(row.contains("ESPN"), "expected the HD-upgraded record to win the merge:\n{row}");
    assert!(row.contains("http://a/e"));
    assert!(row.contains(",HD,"), "expected quality=HD on the merged record:\n{row}");
}

/// Scenario 2 (spec §8): three "LATINA" channels and one "TELE" channel, with
/// `priority_channels = ["LATINA"]`; at most two LATINA records are placed
/// first, the third falls back into alphabetical category ordering with
/// "TELE".
#[tokio::test]
async fn priority_placement_caps_replication_at_two() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = base_config(dir.path());

    let playlist = write_playlist(
        dir.path(),
        "channels.m3u",
        concat!(
            "#EXTM3U\n",
            "#EXTINF:-1 tvg-id=\"l1\",LATINA\nhttp://l/1\n",
            "#EXTINF:-1 tvg-id=\"l2\",LATINA\nhttp://l/2\n",
            "#EXTINF:-1 tvg-id=\"t1\",TELE\nhttp://t/1\n",
            "#EXTINF:-1 tvg-id=\"l3\",LATINA\nhttp://l/3\n",
        ),
    );
    config.channels_source = "hybrid".to_string();
    config.local_playlist_files = vec![playlist];
    config.priority_channels = vec!["LATINA".to_string()];

    let (status, catalog) = run(config).await;
    assert_eq!(status, PipelineStatus::Completed);

    let rows: Vec<&str> = catalog.lines().skip(1).filter(|l| !l.is_empty()).collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[0].contains("http://l/1"));
    assert!(rows[1].contains("http://l/2"));
    assert!(
        rows[2..].iter().any(|r| r.contains("http://l/3")),
        "the third LATINA record should still be present, just not in a priority slot"
    );
}

/// Scenario 3 (spec §8): a channel sourced from a configured `ignoreFiles`
/// entry is exempt from every banned-name rule, even one it would otherwise
/// match.
#[tokio::test]
async fn ignore_file_exempts_channel_from_banned_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = base_config(dir.path());

    let exempt = write_playlist(
        dir.path(),
        "exempt.m3u",
        "#EXTM3U\n#EXTINF:-1 tvg-id=\"x\",Banned Channel\nhttp://x/1\n",
    );
    let ordinary = write_playlist(
        dir.path(),
        "ordinary.m3u",
        "#EXTM3U\n#EXTINF:-1 tvg-id=\"y\",Banned Channel Two\nhttp://x/2\n",
    );
    config.channels_source = "hybrid".to_string();
    config.local_playlist_files = vec![exempt.clone(), ordinary];
    config.banned_names = vec!["banned".to_string()];
    config.ignore_files = vec!["exempt.m3u".to_string()];

    let (status, catalog) = run(config).await;
    assert_eq!(status, PipelineStatus::Completed);

    assert!(catalog.contains("Banned Channel") && !catalog.contains("Banned Channel Two"));
}

/// Scenario 4 (spec §8): `removeInvalidStreams=true` drops a channel whose
/// stream returns a non-2xx status under live validation.
#[tokio::test]
async fn unreachable_stream_is_dropped_when_remove_invalid_enabled() {
    let mock_server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/dead"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = base_config(dir.path());
    config.enable_stream_validation = true;
    config.remove_invalid_streams = true;

    let url = format!("{}/dead", mock_server.uri());
    let playlist = write_playlist(
        dir.path(),
        "channels.m3u",
        &format!("#EXTM3U\n#EXTINF:-1 tvg-id=\"d\",Dead Channel\n{url}\n"),
    );
    config.channels_source = "hybrid".to_string();
    config.local_playlist_files = vec![playlist];

    let (status, catalog) = run(config).await;
    assert_eq!(status, PipelineStatus::Completed);
    let rows: Vec<&str> = catalog.lines().skip(1).filter(|l| !l.is_empty()).collect();
    assert!(rows.is_empty(), "unreachable channel should have been removed:\n{catalog}");
}

/// Scenario 5 (spec §8): an `https://` stream is rewritten to its validated
/// `http://` equivalent when the candidate responds successfully.
#[tokio::test]
async fn https_candidate_is_adopted_on_successful_probe() {
    let mock_server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/stream"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let http_url = format!("{}/stream", mock_server.uri());
    let https_url = http_url.replacen("http://", "https://", 1);

    let dir = tempfile::tempdir().unwrap();
    let mut config = base_config(dir.path());
    config.convert_https_to_http = true;
    config.validate_http_conversion = true;

    let playlist = write_playlist(
        dir.path(),
        "channels.m3u",
        &format!("#EXTM3U\n#EXTINF:-1 tvg-id=\"s\",Secure Channel\n{https_url}\n"),
    );
    config.channels_source = "hybrid".to_string();
    config.local_playlist_files = vec![playlist];

    let (status, catalog) = run(config).await;
    assert_eq!(status, PipelineStatus::Completed);
    assert!(catalog.contains(&http_url), "expected rewritten http url in catalog:\n{catalog}");
    assert!(!catalog.to_lowercase().contains("https://"));
}

/// Scenario 6 (spec §8): running the engine against its own emitted playlist
/// reproduces the same catalog, modulo `originalIndex`/`source` provenance
/// the second run assigns fresh.
#[tokio::test]
async fn playlist_round_trip_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let mut first_config = base_config(dir.path());
    let playlist = write_playlist(
        dir.path(),
        "channels.m3u",
        concat!(
            "#EXTM3U\n",
            "#EXTINF:-1 tvg-id=\"espn\" group-title=\"Sports\",ESPN\nhttp://a/e\n",
            "#EXTINF:-1 tvg-id=\"cnn\" group-title=\"News\",CNN\nhttp://a/c\n",
        ),
    );
    first_config.channels_source = "hybrid".to_string();
    first_config.local_playlist_files = vec![playlist];

    let (status, first_catalog) = run(first_config).await;
    assert_eq!(status, PipelineStatus::Completed);

    let round_trip_dir = tempfile::tempdir().unwrap();
    let mut second_config = base_config(round_trip_dir.path());
    let emitted_playlist = dir.join("channels.m3u").display().to_string();
    second_config.channels_source = "local_playlist".to_string();
    second_config.local_playlist_files = vec![emitted_playlist];

    let (status, second_catalog) = run(second_config).await;
    assert_eq!(status, PipelineStatus::Completed);

    let names_and_urls = |catalog: &str| -> Vec<(String, String)> {
        catalog
            .lines()
            .skip(1)
            .filter(|l| !l.is_empty())
            .map(|line| {
                let mut fields = line.splitn(3, ',');
                let _id = fields.next().unwrap_or_default();
                let name = fields.next().unwrap_or_default().to_string();
                let rest = fields.next().unwrap_or_default();
                let url = rest.splitn(2, ',').next().unwrap_or_default().to_string();
                (name, url)
            })
            .collect()
    };

    assert_eq!(names_and_urls(&first_catalog), names_and_urls(&second_catalog));
}

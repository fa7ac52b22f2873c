//! Deduplication engine (spec §4.4). Groups near-duplicate channels and
//! picks one representative per cluster using a fixed tie-break chain.

use std::collections::{HashMap, HashSet};

use tracing::error;

use crate::config::ConfigView;
use crate::errors::InvariantError;
use crate::models::Channel;
use crate::utils::{jaccard_token_similarity, ngram_similarity, normalize_name};

/// Aggregate counters recorded when dedup runs, spec §4.4 "Metrics".
#[derive(Debug, Clone, Default)]
pub struct DedupMetrics {
    pub clusters: usize,
    pub duplicates_removed: usize,
    pub input_count: usize,
    pub retained_count: usize,
}

impl DedupMetrics {
    pub fn efficiency(&self) -> f64 {
        if self.input_count == 0 {
            1.0
        } else {
            self.retained_count as f64 / self.input_count as f64
        }
    }
}

pub struct DeduplicationEngine<'a> {
    config: &'a ConfigView,
}

impl<'a> DeduplicationEngine<'a> {
    pub fn new(config: &'a ConfigView) -> Self {
        Self { config }
    }

    /// Cluster `channels` and return the retained representatives plus
    /// metrics. `reachable` reports whether a channel passed an optional
    /// reachability probe, consulted only when `strategy = prioritize_working`
    /// — in this engine that is modeled by the caller passing validation
    /// verdicts gathered earlier in the same run (spec §4.10 describes dedup
    /// and validation as concurrently-run, independently-merged phases, so
    /// this engine treats "prioritize working" as honored when the caller
    /// supplies a verdict map; absent one, tie-break 1 is a no-op).
    pub fn deduplicate(
        &self,
        channels: Vec<Channel>,
        reachable: &HashMap<String, bool>,
    ) -> (Vec<Channel>, DedupMetrics) {
        let input_count = channels.len();
        let clusters = self.cluster(channels);

        let mut retained = Vec::with_capacity(clusters.len());
        let mut duplicates_removed = 0usize;

        for cluster in clusters {
            duplicates_removed += cluster.len().saturating_sub(1);
            let winner = self.pick_representative(cluster, reachable);
            retained.push(winner);
        }

        retained.sort_by_key(|c| c.original_index);
        check_no_duplicate_stream_urls(&retained);

        let metrics = DedupMetrics {
            clusters: retained.len(),
            duplicates_removed,
            input_count,
            retained_count: retained.len(),
        };
        (retained, metrics)
    }

    /// Two records cluster together when their normalized stream URLs are
    /// identical, or their normalized names are Jaccard-similar above
    /// threshold *and* their URLs are n-gram-similar above threshold
    /// (spec §4.4). O(n^2) comparison; fine at catalog scale (thousands,
    /// not millions, of channels).
    fn cluster(&self, channels: Vec<Channel>) -> Vec<Vec<Channel>> {
        let mut clusters: Vec<Vec<Channel>> = Vec::new();

        'outer: for channel in channels {
            let norm_name = normalize_name(&channel.name);
            let norm_url = channel.stream_url.to_ascii_lowercase();

            for cluster in clusters.iter_mut() {
                let representative = &cluster[0];
                let rep_url = representative.stream_url.to_ascii_lowercase();
                let same_url = rep_url == norm_url;
                let similar = !same_url && {
                    let rep_name = normalize_name(&representative.name);
                    jaccard_token_similarity(&norm_name, &rep_name)
                        >= self.config.name_similarity_threshold
                        && ngram_similarity(&norm_url, &rep_url)
                            >= self.config.url_similarity_threshold
                };
                if same_url || similar {
                    cluster.push(channel);
                    continue 'outer;
                }
            }
            clusters.push(vec![channel]);
        }
        clusters
    }

    /// Tie-break chain, in order (spec §4.4):
    /// 1. prefer reachable (when a verdict is known)
    /// 2. prefer higher quality (if `enable_hd_upgrade`)
    /// 3. prefer earlier source in `source_priority` (if `preserve_source_priority`)
    /// 4. prefer smaller `original_index`
    fn pick_representative(
        &self,
        mut cluster: Vec<Channel>,
        reachable: &HashMap<String, bool>,
    ) -> Channel {
        cluster.sort_by(|a, b| {
            let reachable_rank = |c: &Channel| match reachable.get(&c.id) {
                Some(true) => 0,
                Some(false) => 1,
                None => 1,
            };
            reachable_rank(a).cmp(&reachable_rank(b)).then_with(|| {
                if self.config.enable_hd_upgrade {
                    b.quality.cmp(&a.quality)
                } else {
                    std::cmp::Ordering::Equal
                }
            }).then_with(|| {
                if self.config.preserve_source_priority {
                    source_rank(&self.config.source_priority, &a.source)
                        .cmp(&source_rank(&self.config.source_priority, &b.source))
                } else {
                    std::cmp::Ordering::Equal
                }
            }).then_with(|| a.original_index.cmp(&b.original_index))
        });
        cluster.into_iter().next().expect("cluster is never empty")
    }
}

fn source_rank(priority: &[String], source: &str) -> usize {
    priority.iter().position(|s| s == source).unwrap_or(priority.len())
}

/// Spec §3's dedup-owned invariant: no two retained channels share a stream
/// URL. Clustering is supposed to make this unreachable; if it ever isn't,
/// that's a bug in this engine, not in the input, so it's logged rather than
/// silently tolerated.
fn check_no_duplicate_stream_urls(retained: &[Channel]) {
    let mut seen = HashSet::with_capacity(retained.len());
    for channel in retained {
        let url = channel.stream_url.to_ascii_lowercase();
        if !seen.insert(url.clone()) {
            error!(
                error = %InvariantError::DuplicateStreamUrl(url),
                "deduplication postcondition violated"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::Quality;

    fn engine_config() -> std::sync::Arc<ConfigView> {
        ConfigView::from_config(&Config::default()).unwrap()
    }

    #[test]
    fn identical_urls_cluster_and_hd_upgrade_wins() {
        let config = engine_config();
        let mut a = Channel::new("a".into(), "ESPN HD".into(), "http://a/e".into(), "remote_a", 0);
        a.quality = Quality::Hd;
        let mut b = Channel::new("b".into(), "ESPN".into(), "http://a/e".into(), "remote_b", 1);
        b.quality = Quality::Sd;

        let engine = DeduplicationEngine::new(&config);
        let (retained, metrics) = engine.deduplicate(vec![a, b], &HashMap::new());

        assert_eq!(retained.len(), 1);
        assert_eq!(retained[0].name, "ESPN HD");
        assert_eq!(retained[0].stream_url, "http://a/e");
        assert_eq!(metrics.duplicates_removed, 1);
    }

    #[test]
    fn distinct_channels_are_not_merged() {
        let config = engine_config();
        let a = Channel::new("a".into(), "ESPN".into(), "http://a/e".into(), "remote", 0);
        let b = Channel::new("b".into(), "CNN".into(), "http://a/c".into(), "remote", 1);

        let engine = DeduplicationEngine::new(&config);
        let (retained, _) = engine.deduplicate(vec![a, b], &HashMap::new());
        assert_eq!(retained.len(), 2);
    }

    #[test]
    fn retained_never_exceeds_input() {
        let config = engine_config();
        let channels = vec![
            Channel::new("a".into(), "ESPN".into(), "http://a/e".into(), "r", 0),
            Channel::new("b".into(), "ESPN".into(), "http://a/e".into(), "r", 1),
            Channel::new("c".into(), "ESPN".into(), "http://a/e".into(), "r", 2),
        ];
        let engine = DeduplicationEngine::new(&config);
        let (retained, _) = engine.deduplicate(channels, &HashMap::new());
        assert!(retained.len() <= 3);
        assert_eq!(retained.len(), 1);
    }
}

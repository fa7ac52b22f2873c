//! `RuleSet` + `FilterEngine` (spec §4.3). `RuleSet` is an explicit value
//! built once by the coordinator from `ConfigView` and passed by reference —
//! no lazy module-level mutable state, per the Design Notes (spec §9)
//! inverting the teacher's "filter reads the repository's own ignore file"
//! cyclic dependency.

use std::collections::HashSet;
use std::net::IpAddr;

use ipnet::IpNet;
use regex::Regex;

use crate::config::ConfigView;
use crate::models::Channel;
use crate::utils::UrlUtils;

use super::keywords;

/// Well-known metadata key a [`crate::sources::Repository`] sets on every
/// channel it loads from a specific file, so the [`FilterEngine`] can
/// recognize records sourced from a configured `ignoreFiles` entry without
/// the filter re-entering the repository layer.
pub const SOURCE_FILE_KEY: &str = "_source_file";

/// The compiled rule set a run filters against. Constructed once from
/// [`ConfigView`] and shared by reference across every filtering call.
pub struct RuleSet {
    banned_names: Vec<String>,
    banned_urls: Vec<String>,
    banned_ips: HashSet<String>,
    banned_ip_ranges: Vec<IpNet>,
    banned_regex: Vec<Regex>,

    allowed_channels: HashSet<String>,
    allowed_ips: HashSet<String>,

    ignore_names: HashSet<String>,
    ignore_ips: HashSet<String>,
    ignore_urls: HashSet<String>,
    ignore_files: HashSet<String>,

    filter_religious: bool,
    filter_adult: bool,
    filter_political: bool,
    religious_keywords: Vec<String>,
    adult_keywords: Vec<String>,
    political_keywords: Vec<String>,
}

impl RuleSet {
    pub fn from_config(config: &ConfigView) -> Self {
        let banned_ip_ranges = config
            .banned_ip_ranges
            .iter()
            .filter_map(|raw| match raw.parse::<IpNet>() {
                Ok(net) => Some(net),
                Err(_) => {
                    tracing::warn!(range = %raw, "invalid banned CIDR range, ignored");
                    None
                }
            })
            .collect();

        let banned_regex = config
            .banned_regex
            .iter()
            .filter_map(|raw| match Regex::new(raw) {
                Ok(re) => Some(re),
                Err(err) => {
                    tracing::warn!(pattern = %raw, error = %err, "invalid banned regex, ignored");
                    None
                }
            })
            .collect();

        Self {
            banned_names: config.banned_names.iter().map(|s| s.to_ascii_lowercase()).collect(),
            banned_urls: config.banned_urls.iter().map(|s| s.to_ascii_lowercase()).collect(),
            banned_ips: config.banned_ips.iter().cloned().collect(),
            banned_ip_ranges,
            banned_regex,
            allowed_channels: config
                .allowed_channels
                .iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
            allowed_ips: config.allowed_ips.iter().cloned().collect(),
            ignore_names: config
                .ignore_names_for_filtering
                .iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
            ignore_ips: config.ignore_ips_for_filtering.iter().cloned().collect(),
            ignore_urls: config
                .ignore_urls_for_filtering
                .iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
            ignore_files: config.ignore_files.iter().cloned().collect(),
            filter_religious: config.filter_religious_content,
            filter_adult: config.filter_adult_content,
            filter_political: config.filter_political_content,
            religious_keywords: non_empty_or_default(&config.religious_keywords, keywords::RELIGIOUS),
            adult_keywords: non_empty_or_default(&config.adult_keywords, keywords::ADULT),
            political_keywords: non_empty_or_default(&config.political_keywords, keywords::POLITICAL),
        }
    }

    /// Whether rules need recompiling before the next run. This batch engine
    /// loads its `RuleSet` exactly once per run at construction, so this is
    /// always `false`; kept because spec §4.3 names it as part of the
    /// engine's contract.
    pub fn needs_reload(&self) -> bool {
        false
    }
}

fn non_empty_or_default(configured: &[String], default: &[&str]) -> Vec<String> {
    if configured.is_empty() {
        default.iter().map(|s| s.to_string()).collect()
    } else {
        configured.iter().map(|s| s.to_ascii_lowercase()).collect()
    }
}

/// Stateless evaluator over a [`RuleSet`]. Holds no rule data itself so it
/// can be freely shared across concurrent filtering tasks.
pub struct FilterEngine<'a> {
    rules: &'a RuleSet,
}

impl<'a> FilterEngine<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Filter the input in place, returning the retained channels. Spec
    /// §4.3: reject any record matching a banned rule unless it matches an
    /// exemption.
    pub fn filter(&self, channels: Vec<Channel>) -> Vec<Channel> {
        channels.into_iter().filter(|c| self.passes(c)).collect()
    }

    pub fn passes(&self, channel: &Channel) -> bool {
        if self.is_fully_exempt(channel) {
            return true;
        }

        if !self.rules.allowed_channels.is_empty() {
            let name_lower = channel.name.to_ascii_lowercase();
            if !self.rules.allowed_channels.iter().any(|allowed| name_lower.contains(allowed)) {
                return false;
            }
        }

        if self.name_banned(channel) || self.url_banned(channel) || self.ip_banned(channel) {
            return false;
        }

        true
    }

    fn is_fully_exempt(&self, channel: &Channel) -> bool {
        channel
            .metadata
            .get(SOURCE_FILE_KEY)
            .is_some_and(|path| self.rules.ignore_files.iter().any(|f| path.ends_with(f.as_str())))
    }

    fn name_banned(&self, channel: &Channel) -> bool {
        let name_lower = channel.name.to_ascii_lowercase();
        if self.rules.ignore_names.contains(&name_lower) {
            return false;
        }

        if self.rules.banned_names.iter().any(|term| name_lower.contains(term.as_str())) {
            return true;
        }
        if self.rules.banned_regex.iter().any(|re| re.is_match(&channel.name)) {
            return true;
        }
        if self.filter_religious_content(&name_lower)
            || self.filter_adult_content(&name_lower)
            || self.filter_political_content(&name_lower)
        {
            return true;
        }
        false
    }

    fn filter_religious_content(&self, name_lower: &str) -> bool {
        self.rules.filter_religious
            && self.rules.religious_keywords.iter().any(|k| name_lower.contains(k.as_str()))
    }

    fn filter_adult_content(&self, name_lower: &str) -> bool {
        self.rules.filter_adult
            && self.rules.adult_keywords.iter().any(|k| name_lower.contains(k.as_str()))
    }

    fn filter_political_content(&self, name_lower: &str) -> bool {
        self.rules.filter_political
            && self.rules.political_keywords.iter().any(|k| name_lower.contains(k.as_str()))
    }

    fn url_banned(&self, channel: &Channel) -> bool {
        let url_lower = channel.stream_url.to_ascii_lowercase();
        if self.rules.ignore_urls.iter().any(|u| url_lower.contains(u.as_str())) {
            return false;
        }
        self.rules.banned_urls.iter().any(|term| url_lower.contains(term.as_str()))
    }

    fn ip_banned(&self, channel: &Channel) -> bool {
        let Some(host) = UrlUtils::extract_host(&channel.stream_url) else {
            return false;
        };
        if self.rules.ignore_ips.contains(&host) || self.rules.allowed_ips.contains(&host) {
            return false;
        }
        if self.rules.banned_ips.contains(&host) {
            return true;
        }
        let Ok(ip) = host.parse::<IpAddr>() else {
            return false;
        };
        self.rules.banned_ip_ranges.iter().any(|net| net.contains(&ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn rules_from(mutate: impl FnOnce(&mut Config)) -> RuleSet {
        let mut config = Config::default();
        mutate(&mut config);
        let view = ConfigView::from_config(&config).unwrap();
        RuleSet::from_config(&view)
    }

    fn channel(name: &str, url: &str) -> Channel {
        Channel::new("1".into(), name.into(), url.into(), "test", 0)
    }

    #[test]
    fn banned_name_substring_is_case_insensitive() {
        let rules = rules_from(|c| c.banned_names = vec!["amagi".to_string()]);
        let engine = FilterEngine::new(&rules);
        assert!(!engine.passes(&channel("AMAGI-extra", "http://x")));
        assert!(engine.passes(&channel("CNN", "http://x")));
    }

    #[test]
    fn ignore_file_exempts_from_all_rules() {
        let rules = rules_from(|c| {
            c.banned_names = vec!["amagi".to_string()];
            c.ignore_files = vec!["ignore-file.csv".to_string()];
        });
        let engine = FilterEngine::new(&rules);
        let mut ch = channel("CHANNEL amagi", "http://x");
        ch.metadata.insert(SOURCE_FILE_KEY.to_string(), "/data/ignore-file.csv".to_string());
        assert!(engine.passes(&ch));
    }

    #[test]
    fn banned_cidr_range_matches_host() {
        let rules = rules_from(|c| c.banned_ip_ranges = vec!["10.0.0.0/8".to_string()]);
        let engine = FilterEngine::new(&rules);
        assert!(!engine.passes(&channel("x", "http://10.1.2.3/stream")));
        assert!(engine.passes(&channel("x", "http://8.8.8.8/stream")));
    }

    #[test]
    fn allowlist_mode_restricts_to_matching_names() {
        let rules = rules_from(|c| c.allowed_channels = vec!["espn".to_string()]);
        let engine = FilterEngine::new(&rules);
        assert!(engine.passes(&channel("ESPN HD", "http://x")));
        assert!(!engine.passes(&channel("CNN", "http://x")));
    }
}

//! Priority-aware ordering (spec §4.8): priority channels placed first (at
//! most two per name), remaining channels grouped by category in the
//! configured order, stable within each group by `originalIndex`.

use std::collections::HashMap;

use tracing::error;

use crate::config::ConfigView;
use crate::errors::InvariantError;
use crate::models::Channel;
use crate::utils::name_normalize::strip_punctuation;

pub struct OrderingService<'a> {
    config: &'a ConfigView,
}

impl<'a> OrderingService<'a> {
    pub fn new(config: &'a ConfigView) -> Self {
        Self { config }
    }

    pub fn order(&self, mut channels: Vec<Channel>) -> Vec<Channel> {
        channels.sort_by_key(|c| c.original_index);

        let mut priority_slots: Vec<Vec<Channel>> =
            self.config.priority_channels.iter().map(|_| Vec::new()).collect();
        let mut remaining = Vec::with_capacity(channels.len());

        'channels: for channel in channels {
            let normalized = strip_punctuation(&channel.name);
            for (slot, priority_name) in self.config.priority_channels.iter().enumerate() {
                if strip_punctuation(priority_name) == normalized && priority_slots[slot].len() < 2 {
                    priority_slots[slot].push(channel);
                    continue 'channels;
                }
            }
            remaining.push(channel);
        }

        check_priority_replication_cap(&self.config.priority_channels, &priority_slots);

        let category_rank = category_rank_table(&self.config.category_order);
        remaining.sort_by(|a, b| {
            let genre_a = a.genre.as_deref().unwrap_or("General");
            let genre_b = b.genre.as_deref().unwrap_or("General");
            rank_of(&category_rank, genre_a, self.config.category_order.len())
                .cmp(&rank_of(&category_rank, genre_b, self.config.category_order.len()))
                .then_with(|| alphabetical_tiebreak(&category_rank, genre_a, genre_b))
                .then_with(|| a.original_index.cmp(&b.original_index))
        });

        let mut ordered = Vec::with_capacity(priority_slots.iter().map(Vec::len).sum::<usize>() + remaining.len());
        for slot in priority_slots {
            ordered.extend(slot);
        }
        ordered.extend(remaining);
        ordered
    }
}

/// Spec §3's ordering-owned invariant: a priority channel appears at most
/// twice. The slot-push guard above already enforces this structurally; this
/// is the postcondition check, logged rather than acted on since a violation
/// here would mean the guard itself regressed.
fn check_priority_replication_cap(priority_channels: &[String], slots: &[Vec<Channel>]) {
    for (name, slot) in priority_channels.iter().zip(slots.iter()) {
        if slot.len() > 2 {
            error!(
                error = %InvariantError::PriorityOverReplication {
                    name: name.clone(),
                    count: slot.len(),
                },
                "ordering postcondition violated"
            );
        }
    }
}

fn category_rank_table(order: &[String]) -> HashMap<String, usize> {
    order.iter().enumerate().map(|(i, name)| (name.to_ascii_lowercase(), i)).collect()
}

fn rank_of(table: &HashMap<String, usize>, genre: &str, configured_len: usize) -> usize {
    table.get(&genre.to_ascii_lowercase()).copied().unwrap_or(configured_len)
}

/// When two genres both fall outside the configured category order (and so
/// share the same overflow rank), break the tie alphabetically.
fn alphabetical_tiebreak(
    table: &HashMap<String, usize>,
    genre_a: &str,
    genre_b: &str,
) -> std::cmp::Ordering {
    let a_known = table.contains_key(&genre_a.to_ascii_lowercase());
    let b_known = table.contains_key(&genre_b.to_ascii_lowercase());
    if !a_known && !b_known {
        genre_a.to_ascii_lowercase().cmp(&genre_b.to_ascii_lowercase())
    } else {
        std::cmp::Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn priority_channels_placed_first_capped_at_two() {
        let mut config = Config::default();
        config.priority_channels = vec!["LATINA".to_string()];
        let view = ConfigView::from_config(&config).unwrap();

        let channels = vec![
            Channel::new("1".into(), "LATINA".into(), "http://l1".into(), "r", 0),
            Channel::new("2".into(), "LATINA".into(), "http://l2".into(), "r", 1),
            Channel::new("3".into(), "TELE".into(), "http://t".into(), "r", 2),
            Channel::new("4".into(), "LATINA".into(), "http://l3".into(), "r", 3),
        ];

        let service = OrderingService::new(&view);
        let ordered = service.order(channels);

        assert_eq!(ordered[0].stream_url, "http://l1");
        assert_eq!(ordered[1].stream_url, "http://l2");
        assert_eq!(ordered[2].name, "TELE");
        assert_eq!(ordered[3].stream_url, "http://l3");
    }

    #[test]
    fn remaining_sorted_by_category_order_then_index() {
        let mut config = Config::default();
        config.category_order = vec!["News".to_string(), "Sports".to_string()];
        let view = ConfigView::from_config(&config).unwrap();

        let mut a = Channel::new("1".into(), "A".into(), "http://a".into(), "r", 0);
        a.genre = Some("Sports".to_string());
        let mut b = Channel::new("2".into(), "B".into(), "http://b".into(), "r", 1);
        b.genre = Some("News".to_string());

        let service = OrderingService::new(&view);
        let ordered = service.order(vec![a, b]);
        assert_eq!(ordered[0].name, "B");
        assert_eq!(ordered[1].name, "A");
    }
}

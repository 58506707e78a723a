//! Weighted card selection.
//!
//! Biases the draw toward cards the learner has not seen recently:
//! - Cards never shown get a fixed, dominant weight
//! - Shown cards grow in weight with the square root of hours since last seen
//! - Shown cards created in the last 30 days get a decaying 1.5x..1.0x bonus
//!
//! The random source is passed in so draws are reproducible under a seeded RNG.

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::domain::{CardId, Flashcard};

/// Weight of a card that has never been shown
pub const NOVELTY_WEIGHT: u64 = 100;

/// Cards younger than this get the creation bonus
pub const CREATION_BONUS_WINDOW_DAYS: f64 = 30.0;

/// Bonus multiplier for a card created just now
pub const MAX_CREATION_BONUS: f64 = 1.5;

const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_DAY: f64 = 86_400_000.0;

/// Represents a card with its calculated selection weight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardWeight {
  pub card_id: CardId,
  pub weight: u64,
}

/// Hours between `since` and `now`, clamped at 0 for clock skew
fn hours_between(since: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
  ((now - since).num_milliseconds() as f64 / MS_PER_HOUR).max(0.0)
}

fn days_between(since: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
  ((now - since).num_milliseconds() as f64 / MS_PER_DAY).max(0.0)
}

/// Multiplier for recently created cards: 1.5 at age 0 down to 1.0 at 30 days
pub fn creation_bonus(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
  let age_days = days_between(created_at, now);
  if age_days < CREATION_BONUS_WINDOW_DAYS {
    MAX_CREATION_BONUS - (age_days / CREATION_BONUS_WINDOW_DAYS) * 0.5
  } else {
    1.0
  }
}

/// Calculate the selection weight for a card. Always at least 1.
pub fn card_weight(card: &Flashcard, now: DateTime<Utc>) -> u64 {
  let Some(last_seen) = card.last_seen else {
    // Never shown: fixed weight, no creation bonus on top
    return NOVELTY_WEIGHT;
  };

  let hours = hours_between(last_seen, now);
  let base = (hours.sqrt().floor() as u64 + 1).max(1);
  let weight = (base as f64 * creation_bonus(card.created_at, now)).floor() as u64;
  weight.max(1)
}

/// Calculate weights for every candidate, in candidate order
pub fn calculate_all_weights(cards: &[&Flashcard], now: DateTime<Utc>) -> Vec<CardWeight> {
  cards
    .iter()
    .map(|card| CardWeight {
      card_id: card.id,
      weight: card_weight(card, now),
    })
    .collect()
}

/// Upper bound of the draw: the sum of all weights
pub fn total_weight(weights: &[CardWeight]) -> u64 {
  weights.iter().map(|w| w.weight).sum()
}

/// Pick an index using weighted random selection.
/// Higher weight = more likely to be selected.
pub fn weighted_random_select<R: Rng + ?Sized>(weights: &[CardWeight], rng: &mut R) -> Option<usize> {
  if weights.is_empty() {
    return None;
  }

  let total = total_weight(weights);
  if total == 0 {
    return Some(0);
  }

  let mut target = rng.random_range(0.0..total as f64);
  for (i, w) in weights.iter().enumerate() {
    target -= w.weight as f64;
    if target <= 0.0 {
      return Some(i);
    }
  }

  // Only reachable through float rounding
  Some(0)
}

/// Draw one card from `candidates`; `None` iff there are none
pub fn select_weighted<'a, R: Rng + ?Sized>(
  candidates: &[&'a Flashcard],
  now: DateTime<Utc>,
  rng: &mut R,
) -> Option<&'a Flashcard> {
  let weights = calculate_all_weights(candidates, now);
  let index = weighted_random_select(&weights, rng)?;
  Some(candidates[index])
}

/// Uniform draw, used over a pool the backend already ranked
pub fn select_uniform<'a, R: Rng + ?Sized>(pool: &[&'a Flashcard], rng: &mut R) -> Option<&'a Flashcard> {
  pool.choose(rng).copied()
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
      .unwrap()
      .with_timezone(&Utc)
  }

  /// Card created long before the bonus window
  fn old_card(id: i64, last_seen: Option<DateTime<Utc>>) -> Flashcard {
    Flashcard {
      id,
      question: format!("q{}", id),
      answer: format!("a{}", id),
      example: None,
      example_translation: None,
      tags: vec!["basics".to_string()],
      notes: None,
      last_seen,
      created_at: now() - Duration::days(400),
    }
  }

  fn seen_hours_ago(id: i64, hours: i64) -> Flashcard {
    old_card(id, Some(now() - Duration::hours(hours)))
  }

  #[test]
  fn test_never_shown_weight() {
    assert_eq!(card_weight(&old_card(1, None), now()), NOVELTY_WEIGHT);
  }

  #[test]
  fn test_never_shown_gets_no_creation_bonus() {
    let mut card = old_card(1, None);
    card.created_at = now();
    assert_eq!(card_weight(&card, now()), NOVELTY_WEIGHT);
  }

  #[test]
  fn test_sqrt_growth() {
    assert_eq!(card_weight(&seen_hours_ago(1, 0), now()), 1);
    assert_eq!(card_weight(&seen_hours_ago(1, 1), now()), 2);
    assert_eq!(card_weight(&seen_hours_ago(1, 4), now()), 3);
    assert_eq!(card_weight(&seen_hours_ago(1, 10), now()), 4);
    assert_eq!(card_weight(&seen_hours_ago(1, 100), now()), 11);
    assert_eq!(card_weight(&seen_hours_ago(1, 400), now()), 21);
  }

  #[test]
  fn test_future_last_seen_clamps_to_zero_hours() {
    let card = old_card(1, Some(now() + Duration::hours(5)));
    assert_eq!(card_weight(&card, now()), 1);
  }

  #[test]
  fn test_creation_bonus_decays_linearly() {
    assert!((creation_bonus(now(), now()) - 1.5).abs() < 1e-9);
    assert!((creation_bonus(now() - Duration::days(15), now()) - 1.25).abs() < 1e-9);
    assert!((creation_bonus(now() - Duration::days(30), now()) - 1.0).abs() < 1e-9);
    assert!((creation_bonus(now() - Duration::days(90), now()) - 1.0).abs() < 1e-9);
    // Created "in the future": treated as age 0
    assert!((creation_bonus(now() + Duration::days(2), now()) - 1.5).abs() < 1e-9);
  }

  #[test]
  fn test_creation_bonus_applied_to_shown_cards() {
    let mut card = seen_hours_ago(1, 10);
    card.created_at = now() - Duration::days(1);
    // base 4, bonus 1.5 - (1/30)*0.5 = 1.4833.. -> floor(5.93) = 5
    assert_eq!(card_weight(&card, now()), 5);

    card.created_at = now();
    assert_eq!(card_weight(&card, now()), 6);
  }

  #[test]
  fn test_weight_monotonic_in_elapsed_time() {
    let mut previous = 0;
    for hours in [0, 1, 2, 3, 5, 8, 24, 48, 100, 1000, 5000] {
      let weight = card_weight(&seen_hours_ago(1, hours), now());
      assert!(weight >= previous, "weight dropped at {} hours", hours);
      previous = weight;
    }

    // Same holds with an equal creation bonus
    let mut previous = 0;
    for hours in [0, 1, 4, 9, 16, 100] {
      let mut card = seen_hours_ago(1, hours);
      card.created_at = now() - Duration::days(10);
      let weight = card_weight(&card, now());
      assert!(weight >= previous);
      previous = weight;
    }
  }

  #[test]
  fn test_novelty_dominates_shown_cards() {
    let unseen = card_weight(&old_card(1, None), now());
    for hours in [0, 1, 24, 24 * 30, 24 * 365, 9000] {
      assert!(unseen > card_weight(&seen_hours_ago(2, hours), now()));
    }
  }

  #[test]
  fn test_weight_is_at_least_one() {
    let cards: Vec<Flashcard> = (0..20).map(|h| seen_hours_ago(h, h)).collect();
    let refs: Vec<&Flashcard> = cards.iter().collect();
    assert!(calculate_all_weights(&refs, now()).iter().all(|w| w.weight >= 1));
  }

  #[test]
  fn test_select_empty() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(select_weighted(&[], now(), &mut rng).is_none());
    assert!(select_uniform(&[], &mut rng).is_none());
  }

  #[test]
  fn test_select_single() {
    let card = seen_hours_ago(42, 3);
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..10 {
      assert_eq!(select_weighted(&[&card], now(), &mut rng).unwrap().id, 42);
    }
  }

  #[test]
  fn test_total_weight_is_sum() {
    let a = old_card(1, None);
    let b = seen_hours_ago(2, 10);
    let weights = calculate_all_weights(&[&a, &b], now());
    assert_eq!(weights, vec![
      CardWeight { card_id: 1, weight: 100 },
      CardWeight { card_id: 2, weight: 4 },
    ]);
    assert_eq!(total_weight(&weights), 104);
  }

  #[test]
  fn test_seeded_draws_are_reproducible() {
    let cards: Vec<Flashcard> = (1..=6).map(|i| seen_hours_ago(i, i * 7)).collect();
    let refs: Vec<&Flashcard> = cards.iter().collect();

    let draw = |seed: u64| -> Vec<i64> {
      let mut rng = StdRng::seed_from_u64(seed);
      (0..50)
        .map(|_| select_weighted(&refs, now(), &mut rng).unwrap().id)
        .collect()
    };
    assert_eq!(draw(7), draw(7));
  }

  #[test]
  fn test_unseen_card_selected_about_96_percent() {
    let unseen = old_card(1, None);
    let seen = seen_hours_ago(2, 10);
    let candidates = [&unseen, &seen];
    let mut rng = StdRng::seed_from_u64(2024);

    let hits = (0..1000)
      .filter(|_| select_weighted(&candidates, now(), &mut rng).unwrap().id == 1)
      .count();
    // Expected 100/104 ~ 96%
    assert!((900..=990).contains(&hits), "unseen card drawn {} times", hits);
  }

  #[test]
  fn test_zero_weight_edges_fall_back_to_first() {
    let weights = vec![
      CardWeight { card_id: 1, weight: 0 },
      CardWeight { card_id: 2, weight: 0 },
    ];
    let mut rng = StdRng::seed_from_u64(3);
    assert_eq!(weighted_random_select(&weights, &mut rng), Some(0));
  }

  #[test]
  fn test_weighted_select_respects_mass() {
    // Card 2 has all the mass except one unit
    let weights = vec![
      CardWeight { card_id: 1, weight: 1 },
      CardWeight { card_id: 2, weight: 999 },
    ];
    let mut rng = StdRng::seed_from_u64(11);
    let second = (0..500)
      .filter(|_| weighted_random_select(&weights, &mut rng) == Some(1))
      .count();
    assert!(second >= 490);
  }

  #[test]
  fn test_select_uniform_covers_pool() {
    let cards: Vec<Flashcard> = (1..=3).map(|i| old_card(i, None)).collect();
    let refs: Vec<&Flashcard> = cards.iter().collect();
    let mut rng = StdRng::seed_from_u64(5);
    let mut seen = std::collections::BTreeSet::new();
    for _ in 0..200 {
      seen.insert(select_uniform(&refs, &mut rng).unwrap().id);
    }
    assert_eq!(seen.len(), 3);
  }
}

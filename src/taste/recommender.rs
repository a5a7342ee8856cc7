use super::model::DataModel;
use super::neighborhood::UserNeighborhood;
use super::similarity::UserSimilarity;
use crate::{Error, Result};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

/// An item together with the preference estimated for it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecommendedItem {
    pub item_id: i64,
    pub value: f32,
}

/// `RecommendedItem[item:104, value:4.257081]`
impl fmt::Display for RecommendedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecommendedItem[item:{}, value:{:?}]", self.item_id, self.value)
    }
}

/// Formats a list of recommendations as `[<item>, <item>]`.
pub fn format_recommendations(items: &[RecommendedItem]) -> String {
    let parts: Vec<String> = items.iter().map(|i| i.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

pub trait Recommender {
    /// Up to **how_many** items **user_id** did not rate yet, best estimate first.
    fn recommend(&self, user_id: i64, how_many: usize) -> Result<Vec<RecommendedItem>>;
    /// The preference **user_id** has (or would have) for **item_id**. `NaN` when it can not be estimated.
    fn estimate_preference(&self, user_id: i64, item_id: i64) -> Result<f32>;
}


/// Recommends what the most similar users liked.
///
/// The estimated preference of a user for an item is the average of the neighbors' preferences for it,
/// weighted by their similarity to the user. At least two neighbors have to have rated the item, and the
/// estimate never leaves the range of preferences within the model.
pub struct GenericUserBasedRecommender<'a, M: DataModel, N: UserNeighborhood, S: UserSimilarity> {
    model: &'a M,
    neighborhood: &'a N,
    similarity: &'a S,
    capper: Option<(f32, f32)>,
}
impl<'a, M: DataModel, N: UserNeighborhood, S: UserSimilarity> GenericUserBasedRecommender<'a, M, N, S> {
    pub fn new(model: &'a M, neighborhood: &'a N, similarity: &'a S) -> Self {
        let (min, max) = (model.min_preference(), model.max_preference());
        let capper = if min.is_nan() || max.is_nan() { None } else { Some((min, max)) };
        Self { model, neighborhood, similarity, capper }
    }

    fn estimate(&self, user_id: i64, neighbors: &[i64], item_id: i64) -> Result<f32> {
        let (mut preference, mut total_similarity, mut count) = (0.0f64, 0.0f64, 0usize);
        for &neighbor in neighbors.iter().filter(|&&n| n != user_id) {
            if let Some(value) = self.model.preference_value(neighbor, item_id)? {
                let sim = self.similarity.user_similarity(self.model, user_id, neighbor)?;
                if !sim.is_nan() {
                    preference += sim * value as f64;
                    total_similarity += sim;
                    count += 1;
                }
            }
        }
        if count <= 1 {
            return Ok(f32::NAN);
        }
        let estimate = (preference / total_similarity) as f32;
        Ok(match self.capper {
            Some((min, max)) => estimate.max(min).min(max),
            None => estimate,
        })
    }
}
impl<'a, M: DataModel, N: UserNeighborhood, S: UserSimilarity> Recommender for GenericUserBasedRecommender<'a, M, N, S> {
    fn recommend(&self, user_id: i64, how_many: usize) -> Result<Vec<RecommendedItem>> {
        if how_many == 0 {
            return Err(Error::InvalidConfiguration("at least one recommendation has to be requested".into()));
        }
        let rated: BTreeSet<i64> = self.model.preferences_from_user(user_id)?.iter().map(|p| p.item_id).collect();
        let neighbors = self.neighborhood.user_neighborhood(self.model, user_id)?;
        if neighbors.is_empty() {
            info!(user_id, "no neighbors, nothing to recommend");
            return Ok(Vec::new());
        }

        let mut candidates = BTreeSet::new();
        for &neighbor in &neighbors {
            candidates.extend(self.model.preferences_from_user(neighbor)?.iter()
                .map(|p| p.item_id)
                .filter(|item| !rated.contains(item)));
        }

        let mut recommended = Vec::new();
        for item_id in candidates {
            let value = self.estimate(user_id, &neighbors, item_id)?;
            if value.is_nan() {
                debug!(user_id, item_id, "preference can not be estimated");
                continue;
            }
            recommended.push(RecommendedItem { item_id, value });
        }
        recommended.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal).then(a.item_id.cmp(&b.item_id)));
        recommended.truncate(how_many);
        info!(user_id, neighbors = ?neighbors, recommended = recommended.len(), "recommendations computed");
        Ok(recommended)
    }

    fn estimate_preference(&self, user_id: i64, item_id: i64) -> Result<f32> {
        if let Some(value) = self.model.preference_value(user_id, item_id)? {
            return Ok(value);
        }
        let neighbors = self.neighborhood.user_neighborhood(self.model, user_id)?;
        self.estimate(user_id, &neighbors, item_id)
    }
}

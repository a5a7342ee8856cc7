use super::model::DataModel;
use super::similarity::UserSimilarity;
use crate::Result;
use std::cmp::Ordering;
use tracing::debug;

/// Picks the users most alike a given user.
pub trait UserNeighborhood {
    /// Neighbors of **user_id**, most similar first. Never contains **user_id** itself.
    fn user_neighborhood(&self, model: &dyn DataModel, user_id: i64) -> Result<Vec<i64>>;
}

/// All other users with a known similarity to **user_id** of at least **min_similarity**, most similar
/// first (ties by ascending user id).
fn similar_users<S: UserSimilarity>(similarity: &S, model: &dyn DataModel, user_id: i64, min_similarity: f64) -> Result<Vec<(i64, f64)>> {
    model.preferences_from_user(user_id)?;
    let mut scored = Vec::new();
    for other in model.user_ids().into_iter().filter(|&u| u != user_id) {
        let sim = similarity.user_similarity(model, user_id, other)?;
        if sim.is_nan() {
            debug!(user_id, other, "similarity unknown, skipping user");
        } else if sim >= min_similarity {
            scored.push((other, sim));
        }
    }
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0)));
    Ok(scored)
}


/// The **n** users most similar to a user.
pub struct NearestNUserNeighborhood<'s, S: UserSimilarity> {
    n: usize,
    min_similarity: f64,
    similarity: &'s S,
}
impl<'s, S: UserSimilarity> NearestNUserNeighborhood<'s, S> {
    pub fn new(n: usize, similarity: &'s S) -> Self {
        Self { n, min_similarity: f64::NEG_INFINITY, similarity }
    }

    /// Users less similar than **min_similarity** are never neighbors, even if fewer than `n` remain.
    pub fn min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity; self
    }
}
impl<'s, S: UserSimilarity> UserNeighborhood for NearestNUserNeighborhood<'s, S> {
    fn user_neighborhood(&self, model: &dyn DataModel, user_id: i64) -> Result<Vec<i64>> {
        let mut scored = similar_users(self.similarity, model, user_id, self.min_similarity)?;
        scored.truncate(self.n);
        debug!(user_id, neighbors = ?scored, "nearest neighbors");
        Ok(scored.into_iter().map(|(id, _)| id).collect())
    }
}

/// All users whose similarity to a user reaches a threshold.
pub struct ThresholdUserNeighborhood<'s, S: UserSimilarity> {
    threshold: f64,
    similarity: &'s S,
}
impl<'s, S: UserSimilarity> ThresholdUserNeighborhood<'s, S> {
    pub fn new(threshold: f64, similarity: &'s S) -> Self {
        Self { threshold, similarity }
    }
}
impl<'s, S: UserSimilarity> UserNeighborhood for ThresholdUserNeighborhood<'s, S> {
    fn user_neighborhood(&self, model: &dyn DataModel, user_id: i64) -> Result<Vec<i64>> {
        Ok(similar_users(self.similarity, model, user_id, self.threshold)?
            .into_iter().map(|(id, _)| id).collect())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::taste::testing::intro_model;
    use crate::taste::{EuclideanDistanceSimilarity, PearsonCorrelationSimilarity};
    use crate::Error;

    #[test]
    fn two_nearest_users() {
        let model = intro_model();
        let pearson = PearsonCorrelationSimilarity::default();
        // 4: 1.0, 5: 0.94, 2: -0.76, 3: unknown
        assert_eq!(NearestNUserNeighborhood::new(2, &pearson).user_neighborhood(&model, 1).unwrap(), vec![4, 5]);
        assert_eq!(NearestNUserNeighborhood::new(10, &pearson).user_neighborhood(&model, 1).unwrap(), vec![4, 5, 2]);
        assert!(NearestNUserNeighborhood::new(0, &pearson).user_neighborhood(&model, 1).unwrap().is_empty());
    }

    #[test]
    fn minimum_similarity() {
        let model = intro_model();
        let pearson = PearsonCorrelationSimilarity::default();
        let neighborhood = NearestNUserNeighborhood::new(10, &pearson).min_similarity(0.95);
        assert_eq!(neighborhood.user_neighborhood(&model, 1).unwrap(), vec![4]);
    }

    #[test]
    fn threshold_neighborhood() {
        let model = intro_model();
        let pearson = PearsonCorrelationSimilarity::default();
        assert_eq!(ThresholdUserNeighborhood::new(0.0, &pearson).user_neighborhood(&model, 1).unwrap(), vec![4, 5]);

        // every user co-rated item 101 with user 1
        let euclidean = EuclideanDistanceSimilarity::default();
        assert_eq!(ThresholdUserNeighborhood::new(0.0, &euclidean).user_neighborhood(&model, 1).unwrap().len(), 4);
    }

    #[test]
    fn unknown_user() {
        let model = intro_model();
        let pearson = PearsonCorrelationSimilarity::default();
        let res = NearestNUserNeighborhood::new(2, &pearson).user_neighborhood(&model, 6);
        assert!(matches!(res, Err(Error::NoSuchUser(6))));
    }
}

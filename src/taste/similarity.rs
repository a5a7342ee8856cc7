use super::model::{DataModel, Preference};
use crate::Result;

/// Scores how alike two users rate the items both of them rated, within `[-1, 1]`. `NaN` means the
/// similarity is unknown (e.g. too few co-rated items).
pub trait UserSimilarity {
    fn user_similarity(&self, model: &dyn DataModel, user1: i64, user2: i64) -> Result<f64>;
}

/// Whether the amount of co-rated items shifts a similarity towards its extremes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Weighting {
    Unweighted,
    /// The more of all items two users co-rated, the closer their similarity is pushed to `-1` / `1`.
    Weighted,
}
impl Default for Weighting {
    fn default() -> Self { Weighting::Unweighted }
}

/// Sums over the co-rated items of two users (`x` being the first user's values).
#[derive(Default)]
struct CoRated {
    count: usize,
    sum_x: f64,
    sum_y: f64,
    sum_x2: f64,
    sum_y2: f64,
    sum_xy: f64,
    sum_diff2: f64,
}
impl CoRated {
    /// Both preference lists have to be ordered by item id.
    fn collect(prefs1: &[Preference], prefs2: &[Preference]) -> Self {
        let mut sums = CoRated::default();
        let (mut i, mut j) = (0, 0);
        while i < prefs1.len() && j < prefs2.len() {
            let (p1, p2) = (&prefs1[i], &prefs2[j]);
            if p1.item_id < p2.item_id {
                i += 1;
            } else if p1.item_id > p2.item_id {
                j += 1;
            } else {
                let (x, y) = (p1.value as f64, p2.value as f64);
                sums.count += 1;
                sums.sum_x += x;
                sums.sum_y += y;
                sums.sum_x2 += x * x;
                sums.sum_y2 += y * y;
                sums.sum_xy += x * y;
                sums.sum_diff2 += (x - y) * (x - y);
                i += 1;
                j += 1;
            }
        }
        sums
    }

    fn of(model: &dyn DataModel, user1: i64, user2: i64) -> Result<Self> {
        Ok(Self::collect(model.preferences_from_user(user1)?, model.preferences_from_user(user2)?))
    }
}

/// Applies the weighting and clamps into `[-1, 1]`.
fn normalize(result: f64, count: usize, num_items: usize, weighting: Weighting) -> f64 {
    if result.is_nan() {
        return result;
    }
    let result = match weighting {
        Weighting::Unweighted => result,
        Weighting::Weighted => {
            let scale = 1.0 - count as f64 / (num_items + 1) as f64;
            if result < 0.0 { -1.0 + scale * (1.0 + result) } else { 1.0 - scale * (1.0 - result) }
        },
    };
    result.max(-1.0).min(1.0)
}


/// Pearson correlation of the co-rated preferences of two users.
///
/// `NaN` if fewer than two items were co-rated, or one user rated them all the same.
#[derive(Clone, Copy, Debug, Default)]
pub struct PearsonCorrelationSimilarity {
    weighting: Weighting,
}
impl PearsonCorrelationSimilarity {
    pub fn new(weighting: Weighting) -> Self { Self { weighting } }
}
impl UserSimilarity for PearsonCorrelationSimilarity {
    fn user_similarity(&self, model: &dyn DataModel, user1: i64, user2: i64) -> Result<f64> {
        let s = CoRated::of(model, user1, user2)?;
        if s.count == 0 {
            return Ok(f64::NAN);
        }
        let n = s.count as f64;
        let (mean_x, mean_y) = (s.sum_x / n, s.sum_y / n);
        let centered_xy = s.sum_xy - mean_y * s.sum_x;
        let centered_x2 = s.sum_x2 - mean_x * s.sum_x;
        let centered_y2 = s.sum_y2 - mean_y * s.sum_y;
        let denominator = centered_x2.sqrt() * centered_y2.sqrt();
        let result = if denominator == 0.0 { f64::NAN } else { centered_xy / denominator };
        Ok(normalize(result, s.count, model.num_items(), self.weighting))
    }
}

/// `1 / (1 + d / sqrt(n))`, with `d` being the euclidean distance between the co-rated preferences of two
/// users, and `n` the amount of co-rated items.
#[derive(Clone, Copy, Debug, Default)]
pub struct EuclideanDistanceSimilarity {
    weighting: Weighting,
}
impl EuclideanDistanceSimilarity {
    pub fn new(weighting: Weighting) -> Self { Self { weighting } }
}
impl UserSimilarity for EuclideanDistanceSimilarity {
    fn user_similarity(&self, model: &dyn DataModel, user1: i64, user2: i64) -> Result<f64> {
        let s = CoRated::of(model, user1, user2)?;
        if s.count == 0 {
            return Ok(f64::NAN);
        }
        let result = 1.0 / (1.0 + s.sum_diff2.sqrt() / (s.count as f64).sqrt());
        Ok(normalize(result, s.count, model.num_items(), self.weighting))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::taste::testing::intro_model;
    use crate::taste::GenericDataModel;
    use crate::Error;

    #[test]
    fn pearson_on_intro_ratings() {
        let model = intro_model();
        let pearson = PearsonCorrelationSimilarity::default();
        assert_approx_eq!(pearson.user_similarity(&model, 1, 4).unwrap(), 1.0, 1e-12);
        assert_approx_eq!(pearson.user_similarity(&model, 1, 5).unwrap(), 0.944911182523068, 1e-12);
        assert_approx_eq!(pearson.user_similarity(&model, 1, 2).unwrap(), -0.7642652566278799, 1e-12);
        // only item 101 is co-rated
        assert!(pearson.user_similarity(&model, 1, 3).unwrap().is_nan());
        assert_approx_eq!(pearson.user_similarity(&model, 1, 5).unwrap(), pearson.user_similarity(&model, 5, 1).unwrap(), 1e-12);
    }

    #[test]
    fn pearson_of_constant_ratings_is_unknown() {
        let model = GenericDataModel::new(vec![
            Preference::new(1, 1, 3.0), Preference::new(1, 2, 3.0),
            Preference::new(2, 1, 1.0), Preference::new(2, 2, 5.0),
        ]);
        assert!(PearsonCorrelationSimilarity::default().user_similarity(&model, 1, 2).unwrap().is_nan());
    }

    #[test]
    fn weighted_pearson() {
        let model = intro_model();
        let pearson = PearsonCorrelationSimilarity::new(Weighting::Weighted);
        // 3 of 7 items co-rated: scale = 1 - 3/8
        let expected = 1.0 - 0.625 * (1.0 - 0.944911182523068);
        assert_approx_eq!(pearson.user_similarity(&model, 1, 5).unwrap(), expected, 1e-12);
        let expected = -1.0 + 0.625 * (1.0 - 0.7642652566278799);
        assert_approx_eq!(pearson.user_similarity(&model, 1, 2).unwrap(), expected, 1e-12);
    }

    #[test]
    fn euclidean_similarity() {
        let model = intro_model();
        let euclidean = EuclideanDistanceSimilarity::default();
        // 101: 5 vs 5, 103: 2.5 vs 3
        assert_approx_eq!(euclidean.user_similarity(&model, 1, 4).unwrap(), 1.0 / (1.0 + 0.5 / 2.0f64.sqrt()), 1e-12);
        assert_approx_eq!(euclidean.user_similarity(&model, 1, 3).unwrap(), 1.0 / 3.5, 1e-12);
    }

    #[test]
    fn normalization_clamps() {
        assert_eq!(normalize(1.0000001, 2, 10, Weighting::Unweighted), 1.0);
        assert_eq!(normalize(-1.5, 2, 10, Weighting::Unweighted), -1.0);
        assert!(normalize(f64::NAN, 2, 10, Weighting::Weighted).is_nan());
    }

    #[test]
    fn unknown_user() {
        let model = intro_model();
        let res = PearsonCorrelationSimilarity::default().user_similarity(&model, 1, 99);
        assert!(matches!(res, Err(Error::NoSuchUser(99))));
    }
}

//! User based collaborative filtering.
//!
//! The pieces are composed the same way for every recommendation:
//! - a [`DataModel`] holds all known preferences (user, item, value),
//! - a [`UserSimilarity`] scores how alike two users rate their co-rated items,
//! - a [`UserNeighborhood`] uses a similarity to pick the users most alike a given user,
//! - a [`Recommender`] estimates preferences for the items the neighbors rated but the user did not, and
//!   returns the best ones.
//!
//! ## Example
//! ```rust
//! use kmeans_demos::taste::*;
//!
//! let model = GenericDataModel::new(vec![
//!     Preference::new(1, 101, 5.0), Preference::new(1, 102, 3.0), Preference::new(1, 103, 2.5),
//!     Preference::new(4, 101, 5.0), Preference::new(4, 103, 3.0), Preference::new(4, 106, 4.0),
//!     Preference::new(5, 101, 4.0), Preference::new(5, 102, 3.0), Preference::new(5, 103, 2.0),
//!     Preference::new(5, 106, 4.0),
//! ]);
//! let similarity = PearsonCorrelationSimilarity::default();
//! let neighborhood = NearestNUserNeighborhood::new(2, &similarity);
//! let recommender = GenericUserBasedRecommender::new(&model, &neighborhood, &similarity);
//!
//! let recommended = recommender.recommend(1, 1).unwrap();
//! assert_eq!(format_recommendations(&recommended), "[RecommendedItem[item:106, value:4.0]]");
//! ```

mod model;
mod similarity;
mod neighborhood;
mod recommender;

pub use model::{DataModel, FileDataModel, GenericDataModel, Preference};
pub use neighborhood::{NearestNUserNeighborhood, ThresholdUserNeighborhood, UserNeighborhood};
pub use recommender::{format_recommendations, GenericUserBasedRecommender, RecommendedItem, Recommender};
pub use similarity::{EuclideanDistanceSimilarity, PearsonCorrelationSimilarity, UserSimilarity, Weighting};

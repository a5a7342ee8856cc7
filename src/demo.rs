//! The two demo flows, writing their reports to any [`Write`] target.

use crate::config::{ClusterDemoConfig, RecommendDemoConfig};
use crate::driver::{self, DriverConfig, DriverOutcome};
use crate::report::report_clustered_points;
use crate::taste::{format_recommendations, FileDataModel, GenericUserBasedRecommender, NearestNUserNeighborhood,
    PearsonCorrelationSimilarity, RecommendedItem, Recommender};
use crate::{get_points, write_points_to_file, write_seed_clusters, Error, Result, SAMPLE_POINTS};
use std::io::Write;
use tracing::info;

/// Writes the sample points and the first `k` of them as initial clusters, clusters them, and prints every
/// point together with its cluster to **out**.
pub fn run_cluster_demo<W: Write>(config: &ClusterDemoConfig, out: &mut W) -> Result<DriverOutcome<f64>> {
    let points: Vec<Vec<f64>> = get_points(&SAMPLE_POINTS);
    write_points_to_file(&points, config.points_file())?;
    write_seed_clusters(&points, config.k, config.measure, config.seed_clusters_file())?;

    let driver_config = DriverConfig::build()
        .measure(config.measure)
        .convergence_delta(config.convergence_delta)
        .max_iterations(config.max_iterations)
        .execution(config.execution)
        .build();
    let outcome = driver::run(&config.points_dir, &config.clusters_dir, &config.output_dir, &driver_config)?;
    if let Some(clustered_points) = &outcome.clustered_points {
        report_clustered_points::<f64, _>(clustered_points, out)?;
    }
    Ok(outcome)
}

/// Recommends items for the configured user, based on the two (by default) most similar users, and prints
/// the list of recommendations to **out**.
pub fn run_recommend_demo<W: Write>(config: &RecommendDemoConfig, out: &mut W) -> Result<Vec<RecommendedItem>> {
    let model = FileDataModel::open(&config.ratings_file)?;
    let similarity = PearsonCorrelationSimilarity::default();
    let neighborhood = NearestNUserNeighborhood::new(config.neighborhood_size, &similarity);
    let recommender = GenericUserBasedRecommender::new(&model, &neighborhood, &similarity);

    let recommended = recommender.recommend(config.user_id, config.how_many)?;
    info!(user_id = config.user_id, "recommendation done");
    writeln!(out, "{}", format_recommendations(&recommended)).map_err(Error::Report)?;
    Ok(recommended)
}

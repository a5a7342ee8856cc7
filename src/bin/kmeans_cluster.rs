use kmeans_demos::config::ClusterDemoConfig;
use kmeans_demos::{demo, Error};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<(), Error> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let stdout = std::io::stdout();
    demo::run_cluster_demo(&ClusterDemoConfig::default(), &mut stdout.lock())?;
    Ok(())
}

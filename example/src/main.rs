//! Mixed-type clustering demo: loads account records from JSON, imputes
//! missing values and reports per-k inertia and cluster sizes for both
//! clustering modes.

use std::collections::HashMap;

use clap::Parser;
use gower::distance::MissingPolicy;
use gower::impute::impute_missing;
use gower::normalize::compute_ranges;
use gower::schema::{FeatureSchema, SchemaConfig};
use gower::table::build_distance_table;
use gower_cluster::centroid::fit_centroids;
use gower_cluster::context::ClusterContext;
use gower_cluster::medoid::fit_medoids;

mod loading;
mod records;

/// Command-line arguments for the clustering demo
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the input JSON data file (array of account objects)
    #[arg(long)]
    pub data: String,
    /// Comma-separated categorical feature names
    /// (default: cash_advance_trx,purchase_trx,tenure)
    #[arg(long)]
    pub categorical: Option<String>,
    /// Smallest cluster count to try (default: 4)
    #[arg(long)]
    pub kmin: Option<usize>,
    /// Largest cluster count to try (default: 10)
    #[arg(long)]
    pub kmax: Option<usize>,
    /// Iteration cap per run (default: 100)
    #[arg(long)]
    pub max_iter: Option<usize>,
    /// Random seed for center initialization (default: 0)
    #[arg(long)]
    pub seed: Option<u64>,
    /// Clustering mode: "medoid", "centroid" or "both" (default: both)
    #[arg(long)]
    pub mode: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let kmin = args.kmin.unwrap_or(4);
    let kmax = args.kmax.unwrap_or(10);
    let max_iter = args.max_iter.unwrap_or(100);
    let seed = args.seed.unwrap_or(0);
    let mode = args.mode.unwrap_or_else(|| "both".to_string());

    println!("Loading data...");
    let mut data = loading::load_accounts(&args.data).await?;
    println!("Read {} records.", data.len());

    let categorical: Vec<String> = match &args.categorical {
        Some(names) => names.split(',').map(|s| s.trim().to_string()).collect(),
        None => vec![
            "cash_advance_trx".to_string(),
            "purchase_trx".to_string(),
            "tenure".to_string(),
        ],
    };
    let categorical: Vec<&str> = categorical.iter().map(|s| s.as_str()).collect();
    let config = SchemaConfig::new("customer_id").with_categorical(&categorical);
    let schema = FeatureSchema::build(records::attributes(), &config)?;

    println!("Imputing missing values...");
    let summary = impute_missing(&mut data, &schema);
    println!(
        "Filled {} numeric and {} categorical values.",
        summary.numeric_filled, summary.categorical_filled
    );

    // ranges reflect the imputed data
    let ranges = compute_ranges(&data, &schema);

    if mode == "medoid" || mode == "both" {
        println!("Building distance table...");
        let table = build_distance_table(&data, &schema, MissingPolicy::default())?;
        println!("{} pairwise distances.", table.len());

        println!("Running k-medoids (Gower)...");
        for k in kmin..=kmax {
            let context = ClusterContext::new(k, max_iter, seed);
            let fit = fit_medoids(&mut data, &schema, &table, &context)?;
            report("medoid", k, fit.inertia, fit.converged, &fit.clusters);
        }
    }

    if mode == "centroid" || mode == "both" {
        println!("Running k-means (Gower)...");
        for k in kmin..=kmax {
            let context = ClusterContext::new(k, max_iter, seed);
            let fit = fit_centroids(&mut data, &schema, &ranges, &context, records::blank)?;
            report("centroid", k, fit.inertia, fit.converged, &fit.clusters);
        }
    }

    println!("Done.");
    Ok(())
}

fn report(mode: &str, k: usize, inertia: f64, converged: bool, clusters: &HashMap<usize, Vec<usize>>) {
    println!("[{mode}] k = {k}, inertia = {inertia:.4}, converged = {converged}");
    let mut indices: Vec<&usize> = clusters.keys().collect();
    indices.sort();
    for cluster in indices {
        println!("  Cluster {}: size = {}", cluster, clusters[cluster].len());
    }
    println!("{}", "-".repeat(40));
}

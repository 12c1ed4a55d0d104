//! End-to-end clustering scenarios over a small declared record type.

use std::collections::HashSet;

use gower::distance::MissingPolicy;
use gower::error::Error;
use gower::impute::impute_missing;
use gower::normalize::compute_ranges;
use gower::schema::{Attribute, FeatureSchema, SchemaConfig};
use gower::table::build_distance_table;
use gower_cluster::centroid::fit_centroids;
use gower_cluster::context::ClusterContext;
use gower_cluster::elbow::inertia_sweep;
use gower_cluster::medoid::fit_medoids;

#[derive(Clone, Debug, Default, PartialEq)]
struct Account {
    id: String,
    balance: Option<f64>,
    activity: Option<f64>,
    tier: Option<i64>,
    label: Option<usize>,
    is_center: bool,
}

fn account(id: &str, balance: f64, activity: f64, tier: i64) -> Account {
    Account {
        id: id.to_string(),
        balance: Some(balance),
        activity: Some(activity),
        tier: Some(tier),
        label: None,
        is_center: false,
    }
}

fn attributes() -> Vec<Attribute<Account>> {
    vec![
        Attribute::Text {
            name: "id",
            get: |r| r.id.clone(),
        },
        Attribute::Float {
            name: "balance",
            get: |r| r.balance,
            set: |r, v| r.balance = Some(v),
        },
        Attribute::Float {
            name: "activity",
            get: |r| r.activity,
            set: |r, v| r.activity = Some(v),
        },
        Attribute::Integer {
            name: "tier",
            get: |r| r.tier,
            set: |r, v| r.tier = Some(v),
        },
        Attribute::Label {
            name: "label",
            get: |r| r.label,
            set: |r, v| r.label = Some(v),
        },
        Attribute::Flag {
            name: "is_center",
            get: |r| r.is_center,
            set: |r, v| r.is_center = v,
        },
    ]
}

fn schema() -> FeatureSchema<Account> {
    FeatureSchema::build(attributes(), &SchemaConfig::new("id")).expect("test schema")
}

fn blank() -> Account {
    Account::default()
}

/// Eight records forming two tight groups of four.
fn two_groups() -> Vec<Account> {
    vec![
        account("a1", 10.0, 1.0, 1),
        account("a2", 12.0, 1.2, 1),
        account("a3", 11.0, 0.9, 1),
        account("a4", 9.5, 1.1, 1),
        account("b1", 500.0, 30.0, 2),
        account("b2", 510.0, 31.0, 2),
        account("b3", 495.0, 29.5, 2),
        account("b4", 505.0, 30.5, 2),
    ]
}

fn member_sets(clusters: &std::collections::HashMap<usize, Vec<usize>>) -> Vec<HashSet<usize>> {
    let mut sets: Vec<HashSet<usize>> = clusters
        .values()
        .filter(|members| !members.is_empty())
        .map(|members| members.iter().copied().collect())
        .collect();
    sets.sort_by_key(|set| *set.iter().min().unwrap_or(&usize::MAX));
    sets
}

#[test]
fn medoid_mode_recovers_two_groups() {
    let mut records = two_groups();
    let schema = schema();
    let table =
        build_distance_table(&records, &schema, MissingPolicy::Equal).expect("table builds");
    let context = ClusterContext::new(2, 25, 7);

    let fit = fit_medoids(&mut records, &schema, &table, &context).expect("fit completes");

    assert!(fit.converged);
    assert!(fit.iterations <= 25);
    let sets = member_sets(&fit.clusters);
    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0], HashSet::from([0, 1, 2, 3]));
    assert_eq!(sets[1], HashSet::from([4, 5, 6, 7]));

    // chosen medoids are flagged on the records themselves
    for center in &fit.centers {
        assert!(records[*center].is_center);
    }
    let flagged = records.iter().filter(|r| r.is_center).count();
    assert_eq!(flagged, 2);
    for record in &records {
        assert!(record.label.is_some());
    }
}

#[test]
fn medoid_inertia_never_increases() {
    let mut records = two_groups();
    let schema = schema();
    let table =
        build_distance_table(&records, &schema, MissingPolicy::Equal).expect("table builds");
    let context = ClusterContext::new(2, 25, 3);

    let fit = fit_medoids(&mut records, &schema, &table, &context).expect("fit completes");

    for window in fit.inertia_history.windows(2) {
        assert!(
            window[1] <= window[0] + 1e-9,
            "inertia rose from {} to {}",
            window[0],
            window[1]
        );
    }
}

#[test]
fn medoid_runs_are_deterministic_for_a_seed() {
    let schema = schema();
    let run = |seed: u64| {
        let mut records = two_groups();
        let table =
            build_distance_table(&records, &schema, MissingPolicy::Equal).expect("table builds");
        let context = ClusterContext::new(3, 25, seed);
        let fit = fit_medoids(&mut records, &schema, &table, &context).expect("fit completes");
        (fit.centers, fit.clusters, fit.inertia)
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn medoid_mode_survives_more_clusters_than_groups() {
    // two natural groupings, duplicated values, k well above both
    let mut records = vec![
        account("a1", 1.0, 1.0, 1),
        account("a2", 1.0, 1.0, 1),
        account("a3", 1.0, 1.0, 1),
        account("b1", 9.0, 9.0, 2),
        account("b2", 9.0, 9.0, 2),
        account("b3", 9.0, 9.0, 2),
    ];
    let schema = schema();
    let table =
        build_distance_table(&records, &schema, MissingPolicy::Equal).expect("table builds");
    let context = ClusterContext::new(5, 25, 11);

    let fit = fit_medoids(&mut records, &schema, &table, &context).expect("fit completes");

    let assigned: usize = fit.clusters.values().map(|members| members.len()).sum();
    assert_eq!(assigned, records.len());
}

/// Four records on a line, one meaningful numeric feature, k = 2: the split
/// {1.0, 1.1} vs {9.0, 9.2} with inertia near zero.
fn four_point_line() -> Vec<Account> {
    vec![
        account("r1", 1.0, 0.0, 1),
        account("r2", 1.1, 0.0, 1),
        account("r3", 9.0, 0.0, 1),
        account("r4", 9.2, 0.0, 1),
    ]
}

#[test]
fn four_point_line_splits_in_medoid_mode() {
    let mut records = four_point_line();
    let schema = schema();
    let table =
        build_distance_table(&records, &schema, MissingPolicy::Equal).expect("table builds");
    let context = ClusterContext::new(2, 10, 1);

    let fit = fit_medoids(&mut records, &schema, &table, &context).expect("fit completes");

    assert!(fit.converged);
    let sets = member_sets(&fit.clusters);
    assert_eq!(sets[0], HashSet::from([0, 1]));
    assert_eq!(sets[1], HashSet::from([2, 3]));
    assert!(fit.inertia < 0.05, "inertia {} not near zero", fit.inertia);
}

#[test]
fn four_point_line_splits_in_centroid_mode() {
    let mut records = four_point_line();
    let schema = schema();
    let ranges = compute_ranges(&records, &schema);
    let context = ClusterContext::new(2, 10, 1);

    let fit =
        fit_centroids(&mut records, &schema, &ranges, &context, blank).expect("fit completes");

    assert!(fit.converged);
    let sets = member_sets(&fit.clusters);
    assert_eq!(sets[0], HashSet::from([0, 1]));
    assert_eq!(sets[1], HashSet::from([2, 3]));
    assert!(fit.inertia < 0.05, "inertia {} not near zero", fit.inertia);
    assert_eq!(fit.quality_warnings, 0);
}

#[test]
fn centroid_runs_are_deterministic_for_a_seed() {
    let schema = schema();
    let run = |seed: u64| {
        let mut records = two_groups();
        let ranges = compute_ranges(&records, &schema);
        let context = ClusterContext::new(2, 25, seed);
        let fit =
            fit_centroids(&mut records, &schema, &ranges, &context, blank).expect("fit completes");
        (fit.clusters, fit.inertia, fit.iterations)
    };
    assert_eq!(run(9), run(9));
}

#[test]
fn centroid_mode_synthesizes_mean_and_mode_centers() {
    let mut records = two_groups();
    let schema = schema();
    let ranges = compute_ranges(&records, &schema);
    let context = ClusterContext::new(2, 25, 5);

    let fit =
        fit_centroids(&mut records, &schema, &ranges, &context, blank).expect("fit completes");

    assert!(fit.converged);
    for center in &fit.centers {
        // synthetic centers never point at a real record
        assert!(center.id.is_empty());
        assert!(!center.is_center);
        let balance = center.balance.expect("synthesized balance");
        let tier = center.tier.expect("synthesized tier");
        // one center aggregates the low group, the other the high group
        if tier == 1 {
            assert!((balance - 10.625).abs() < 1e-9);
        } else {
            assert_eq!(tier, 2);
            assert!((balance - 502.5).abs() < 1e-9);
        }
    }
}

#[test]
fn centroid_mode_flags_fully_missing_features() {
    let mut records = vec![
        Account {
            id: "m1".to_string(),
            balance: Some(1.0),
            activity: None,
            tier: Some(1),
            ..Account::default()
        },
        Account {
            id: "m2".to_string(),
            balance: Some(1.2),
            activity: None,
            tier: Some(1),
            ..Account::default()
        },
        Account {
            id: "m3".to_string(),
            balance: Some(8.0),
            activity: None,
            tier: Some(2),
            ..Account::default()
        },
        Account {
            id: "m4".to_string(),
            balance: Some(8.4),
            activity: None,
            tier: Some(2),
            ..Account::default()
        },
    ];
    let schema = schema();
    let ranges = compute_ranges(&records, &schema);
    let context = ClusterContext::new(2, 10, 2);

    let fit =
        fit_centroids(&mut records, &schema, &ranges, &context, blank).expect("fit completes");

    // the run completes and the fallback is observable, not fatal
    assert!(fit.quality_warnings > 0);
    for center in &fit.centers {
        assert_eq!(center.activity, Some(0.0));
    }
}

#[test]
fn imputed_dataset_clusters_cleanly() {
    let mut records = two_groups();
    records[1].balance = None;
    records[5].tier = None;
    let schema = schema();

    let first = impute_missing(&mut records, &schema);
    assert_eq!(first.total(), 2);
    let second = impute_missing(&mut records, &schema);
    assert_eq!(second.total(), 0);

    // ranges are derived after imputation, never before
    let ranges = compute_ranges(&records, &schema);
    let context = ClusterContext::new(2, 25, 4);
    let fit =
        fit_centroids(&mut records, &schema, &ranges, &context, blank).expect("fit completes");
    let sets = member_sets(&fit.clusters);
    assert_eq!(sets[0], HashSet::from([0, 1, 2, 3]));
    assert_eq!(sets[1], HashSet::from([4, 5, 6, 7]));
}

#[test]
fn sweep_reports_one_inertia_per_k() {
    let mut records = two_groups();
    let schema = schema();
    let ranges = compute_ranges(&records, &schema);
    let base = ClusterContext::new(2, 25, 6);

    let curve =
        inertia_sweep(&mut records, &schema, &ranges, 2..=4, &base, blank).expect("sweep completes");

    let ks: Vec<usize> = curve.iter().map(|(k, _)| *k).collect();
    assert_eq!(ks, vec![2, 3, 4]);
    for (_, inertia) in &curve {
        assert!(*inertia >= 0.0);
    }
}

#[test]
fn invalid_arguments_fail_before_any_work() {
    let mut records = two_groups();
    let schema = schema();
    let table =
        build_distance_table(&records, &schema, MissingPolicy::Equal).expect("table builds");
    let ranges = compute_ranges(&records, &schema);

    let too_many = ClusterContext::new(100, 10, 0);
    assert!(matches!(
        fit_medoids(&mut records, &schema, &table, &too_many),
        Err(Error::InvalidClusterCount { .. })
    ));

    let zero_iterations = ClusterContext::new(2, 0, 0);
    assert!(matches!(
        fit_centroids(&mut records, &schema, &ranges, &zero_iterations, blank),
        Err(Error::InvalidIterations)
    ));

    let mut empty: Vec<Account> = Vec::new();
    let context = ClusterContext::new(1, 10, 0);
    assert!(matches!(
        fit_centroids(&mut empty, &schema, &ranges, &context, blank),
        Err(Error::EmptyDataset)
    ));
}

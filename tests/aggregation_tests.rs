use parcboard::api::StatusDistribution;
use parcboard::metrics::{self, Amount, Locale, MonthObservation, StatusObservation};
use parcboard::status::CanonicalStatus;

fn scenario_observations() -> Vec<StatusObservation> {
    vec![
        StatusObservation::new("En Service", 10),
        StatusObservation::new("EN SERVICE", 5),
        StatusObservation::new("Hors Service", 2),
        StatusObservation::new("en instance", 3),
    ]
}

fn mixed_observations() -> Vec<StatusObservation> {
    vec![
        StatusObservation::new("En service", 4).with_value(1500.5),
        StatusObservation::new("HS", 1).with_value("300"),
        StatusObservation::new("en panne", 2).with_value("n/a"),
        StatusObservation {
            label: None,
            count: 3,
            value: None,
        },
        StatusObservation::new("En maintenance", 1).with_value(Amount::Number(-50.0)),
        StatusObservation::new("réformé", 6).with_value(200.25),
        StatusObservation::new("En stock", 7),
    ]
}

#[test]
fn status_scenario_totals_and_kpis() {
    let m = metrics::aggregate(&scenario_observations(), &[]);

    assert_eq!(m.per_status_totals.len(), 3);
    assert_eq!(m.status_count(&CanonicalStatus::EnService), 15);
    assert_eq!(m.status_count(&CanonicalStatus::HorsService), 2);
    assert_eq!(m.status_count(&CanonicalStatus::EnInstance), 3);

    assert_eq!(m.kpi.in_service, 15);
    assert_eq!(m.kpi.in_stock, 3);
    assert_eq!(m.kpi.in_maintenance_or_out, 5);
}

#[test]
fn totals_sum_to_input_counts() {
    let input = mixed_observations();
    let m = metrics::aggregate(&input, &[]);

    let expected: u64 = input.iter().map(|o| o.count).sum();
    assert_eq!(m.per_status_totals.values().sum::<u64>(), expected);
    assert_eq!(m.total_count, expected);
    assert_eq!(m.status_count(&CanonicalStatus::Inconnu), 3);
}

#[test]
fn bad_values_count_as_zero() {
    let m = metrics::aggregate(&mixed_observations(), &[]);
    assert_eq!(m.total_value_minor, 150_050 + 30_000 + 20_025);
    assert_eq!(m.total_value(), 2000.75);
}

#[test]
fn aggregation_is_order_independent() {
    let input = mixed_observations();
    let forward = metrics::aggregate(&input, &[]);

    let mut reversed = input.clone();
    reversed.reverse();
    let backward = metrics::aggregate(&reversed, &[]);

    let mut rotated = input.clone();
    rotated.rotate_left(3);
    let shuffled = metrics::aggregate(&rotated, &[]);

    for other in [&backward, &shuffled] {
        assert_eq!(other.per_status_totals, forward.per_status_totals);
        assert_eq!(other.kpi, forward.kpi);
        assert_eq!(other.total_value_minor, forward.total_value_minor);
    }
}

#[test]
fn oversized_wire_counts_saturate() {
    let dist: StatusDistribution = serde_json::from_str(
        r#"{"labels": ["En service", "EN SERVICE"], "counts": [1e30, 18446744073709551615], "values": [1e300, 5]}"#,
    )
    .unwrap();
    let m = metrics::aggregate(
        &dist.observations(),
        &[
            MonthObservation::new("2024-05-01", u64::MAX),
            MonthObservation::new("2024-05-09", 1),
        ],
    );

    assert_eq!(m.status_count(&CanonicalStatus::EnService), u64::MAX);
    assert_eq!(m.total_count, u64::MAX);
    assert_eq!(m.kpi.in_service, u64::MAX);
    assert_eq!(m.total_value_minor, u64::MAX);
    assert_eq!(m.monthly_series.len(), 1);
    assert_eq!(m.monthly_series[0].count, u64::MAX);
}

#[test]
fn total_value_is_exact_in_any_order() {
    let input: Vec<StatusObservation> = [0.1, 0.2, 0.3, 1e15, 0.01]
        .into_iter()
        .map(|v| StatusObservation::new("En service", 1).with_value(v))
        .collect();
    let mut reversed = input.clone();
    reversed.reverse();

    let forward = metrics::aggregate(&input, &[]);
    let backward = metrics::aggregate(&reversed, &[]);
    assert_eq!(forward.total_value_minor, 100_000_000_000_000_061);
    assert_eq!(forward.total_value_minor, backward.total_value_minor);
}

#[test]
fn aggregation_is_idempotent() {
    let statuses = mixed_observations();
    let months = vec![
        MonthObservation::new("2024-03-02", 1),
        MonthObservation::new("bad", 2),
    ];
    let first = metrics::aggregate(&statuses, &months);
    let second = metrics::aggregate(&statuses, &months);
    assert_eq!(first, second);
    assert_eq!(first.total_value().to_bits(), second.total_value().to_bits());
}

#[test]
fn monthly_scenario_is_summed_and_ascending() {
    let months = vec![
        MonthObservation::new("2024-01-05", 4),
        MonthObservation::new("2024-01-20", 6),
        MonthObservation::new("2024-02-01", 2),
    ];
    let m = metrics::aggregate(&[], &months);

    let series: Vec<(&str, u64)> = m
        .monthly_series
        .iter()
        .map(|e| (e.month_key.as_str(), e.count))
        .collect();
    assert_eq!(series, vec![("2024-01", 10), ("2024-02", 2)]);
    assert_eq!(m.monthly_series[0].label, "janv. 24");
}

#[test]
fn undated_observations_are_dropped() {
    let months = vec![
        MonthObservation::new("2024-02-01", 2),
        MonthObservation::new("not-a-date", 9),
        MonthObservation::new("2023-11-30T08:00:00Z", 1),
    ];
    let m = metrics::aggregate_with_locale(&[], &months, Locale::En);

    assert_eq!(m.skipped_month_observations, 1);
    let keys: Vec<&str> = m.monthly_series.iter().map(|e| e.month_key.as_str()).collect();
    assert_eq!(keys, vec!["2023-11", "2024-02"]);
    assert_eq!(m.monthly_series[0].label, "Nov 23");
}

#[test]
fn empty_input_gives_zero_metrics() {
    let m = metrics::aggregate(&[], &[]);
    assert!(m.per_status_totals.is_empty());
    assert_eq!(m.total_count, 0);
    assert_eq!(m.total_value_minor, 0);
    assert!(m.monthly_series.is_empty());
    assert_eq!(m.status_pct(&CanonicalStatus::EnService), 0.0);
}

#[test]
fn unmapped_status_keeps_its_own_bucket() {
    let input = vec![
        StatusObservation::new("réformé", 2),
        StatusObservation::new("REFORMÉ", 1),
        StatusObservation::new("En service", 1),
    ];
    let m = metrics::aggregate(&input, &[]);
    assert_eq!(
        m.status_count(&CanonicalStatus::Other("RÉFORMÉ".to_string())),
        2
    );
    assert_eq!(
        m.status_count(&CanonicalStatus::Other("REFORMÉ".to_string())),
        1
    );
    assert_eq!(m.kpi.in_service, 1);
}

//! End-to-end classifier training on a cleaned table.

use tracing::{debug, info, warn};

use super::bundle::ModelBundle;
use super::encoder::FeatureEncoder;
use super::forest::RandomForest;
use super::metrics::MetricsReport;
use super::split::stratified_split;
use crate::config::TrainingConfig;
use crate::error::{Result, RoadriskError};
use crate::schema::{SchemaMapping, Severity};
use crate::table::{Table, Value};

/// Severity label of every row; anything but a canonical label is `None`.
fn labels(table: &Table, target: &str) -> Vec<Option<Severity>> {
    match table.column(target) {
        Some(column) => column
            .values
            .iter()
            .map(|cell| cell.as_ref().and_then(Value::as_text).and_then(|s| s.parse().ok()))
            .collect(),
        None => vec![None; table.row_count()],
    }
}

/// Canonical feature columns present in the table, in canonical order.
pub fn select_features(table: &Table, mapping: &SchemaMapping) -> Vec<String> {
    mapping
        .feature_columns
        .iter()
        .filter(|name| table.contains(name))
        .cloned()
        .collect()
}

/// Fail unless every present class has at least `required` labeled rows.
fn check_class_counts(labels: &[usize], required: usize) -> Result<()> {
    if labels.is_empty() {
        return Err(RoadriskError::NoLabeledRows);
    }
    for severity in Severity::ALL {
        let count = labels.iter().filter(|&&l| l == severity.index()).count();
        if count > 0 && count < required {
            return Err(RoadriskError::InsufficientData {
                class: severity.as_str().to_string(),
                count,
                required,
            });
        }
    }
    Ok(())
}

/// Train a severity classifier and evaluate it on a stratified hold-out.
pub fn train(
    table: &Table,
    mapping: &SchemaMapping,
    config: &TrainingConfig,
) -> Result<(ModelBundle, MetricsReport)> {
    let target = mapping.target_column.as_str();

    let labeled: Vec<(usize, Severity)> = labels(table, target)
        .into_iter()
        .enumerate()
        .filter_map(|(row, label)| label.map(|l| (row, l)))
        .collect();
    let rows: Vec<usize> = labeled.iter().map(|(row, _)| *row).collect();
    let y: Vec<usize> = labeled.iter().map(|(_, l)| l.index()).collect();
    debug!(
        labeled = rows.len(),
        unlabeled = table.row_count() - rows.len(),
        "Dropped rows without a severity label"
    );

    check_class_counts(&y, config.min_samples_per_class)?;

    let features = select_features(table, mapping);
    if features.is_empty() {
        return Err(RoadriskError::EmptyData(
            "none of the configured feature columns are present".to_string(),
        ));
    }
    for name in &features {
        if table.column(name).is_some_and(|c| c.is_all_missing()) {
            warn!(feature = %name, "Feature column has no values");
        }
    }

    let data = table.take_rows(&rows);
    let split = stratified_split(&y, Severity::ALL.len(), config.test_size, config.seed);
    debug!(train = split.train.len(), test = split.test.len(), "Stratified split");

    let train_table = data.take_rows(&split.train);
    let test_table = data.take_rows(&split.test);
    let y_train: Vec<usize> = split.train.iter().map(|&i| y[i]).collect();
    let y_test: Vec<usize> = split.test.iter().map(|&i| y[i]).collect();

    let encoder = FeatureEncoder::fit(&train_table, &features)?;
    let x_train = encoder.transform(&train_table)?;
    let x_test = encoder.transform(&test_table)?;

    let mut forest = RandomForest::new(config.n_estimators)
        .with_seed(config.seed)
        .with_max_depth(config.max_depth)
        .with_min_samples_split(config.min_samples_split);
    forest.fit(&x_train, &y_train, Severity::ALL.len())?;

    let y_pred = forest.predict(&x_test);
    let metrics = MetricsReport::evaluate(&y_test, &y_pred, features, y_train.len());
    info!(
        accuracy = metrics.accuracy,
        train = metrics.train_rows,
        test = metrics.test_rows,
        encoded_width = encoder.width(),
        "Trained severity classifier"
    );

    Ok((ModelBundle::new(target, encoder, forest), metrics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, Column};

    fn text(s: &str) -> Cell {
        Some(Value::text(s))
    }

    fn small_config() -> TrainingConfig {
        TrainingConfig {
            n_estimators: 20,
            ..TrainingConfig::default()
        }
    }

    fn table(severities: &[Option<&str>]) -> Table {
        let states = ["goa", "kerala", "punjab"];
        Table::from_columns(vec![
            Column::new(
                "state",
                (0..severities.len()).map(|i| text(states[i % 3])).collect(),
            ),
            Column::new("severity", severities.iter().map(|s| s.and_then(text)).collect()),
        ])
    }

    #[test]
    fn test_no_labeled_rows() {
        let err = train(&table(&[None, None]), &SchemaMapping::default(), &small_config()).unwrap_err();
        assert!(matches!(err, RoadriskError::NoLabeledRows));
    }

    #[test]
    fn test_insufficient_class_is_named() {
        let t = table(&[Some("low"), Some("low"), Some("high"), None]);
        match train(&t, &SchemaMapping::default(), &small_config()) {
            Err(RoadriskError::InsufficientData {
                class,
                count,
                required,
            }) => {
                assert_eq!(class, "high");
                assert_eq!(count, 1);
                assert_eq!(required, 2);
            }
            other => panic!("expected InsufficientData, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_two_rows_per_class_trains() {
        let t = table(&[
            Some("low"),
            Some("medium"),
            Some("high"),
            Some("low"),
            Some("medium"),
            Some("high"),
        ]);
        let (bundle, metrics) = train(&t, &SchemaMapping::default(), &small_config()).unwrap();

        assert_eq!(bundle.features(), &["state".to_string()]);
        assert_eq!(metrics.train_rows, 3);
        assert_eq!(metrics.test_rows, 3);
        assert!((0.0..=1.0).contains(&metrics.accuracy));
    }

    #[test]
    fn test_select_features_keeps_canonical_order() {
        let t = Table::from_columns(vec![
            Column::new("time_of_day", vec![None]),
            Column::new("state", vec![None]),
            Column::new("speed", vec![None]),
        ]);
        assert_eq!(
            select_features(&t, &SchemaMapping::default()),
            vec!["state".to_string(), "time_of_day".to_string()]
        );
    }
}

//! Integration tests for the preprocess → train → predict pipeline.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use roadrisk::model::select_features;
use roadrisk::{
    FeatureRow, Normalizer, Pipeline, PipelineConfig, RoadriskError, Severity, Table, TextPolicy,
    Value,
};

/// Write `content` to the configured raw path.
fn write_raw(config: &PipelineConfig, content: &str) {
    let raw = &config.paths.raw;
    fs::create_dir_all(raw.parent().unwrap()).expect("Failed to create raw dir");
    fs::write(raw, content).expect("Failed to write raw table");
}

fn pipeline_in(dir: &Path) -> Pipeline {
    Pipeline::with_config(PipelineConfig::rooted_at(dir)).expect("Invalid config")
}

const SCENARIO: &str = "State/UT,District,Vehicle,Date,Time,Severity_of_Accident\n\
                        Kerala,Kochi,Car,15/01/2023,19:30,Fatal\n\
                        GOA ,Panaji,Bus,2023-02-10,07:05,Minor\n\
                        Punjab,Ludhiana,Truck,01/03/2023,1430,Serious\n";

/// 60 rows, 20 per severity class, no duplicates.
fn balanced_raw() -> String {
    let states = ["Kerala", "Goa", "Punjab", "Maharashtra"];
    let vehicles = ["Car", "Bus", "Truck"];
    let weather = ["Clear", "Rain", "Fog", "Clear", "Other"];
    let severities = ["Fatal", "Serious", "Minor"];

    let mut data = String::from("State/UT,Vehicle,Weather,Road,Date,Time,Severity\n");
    for i in 0..60 {
        data.push_str(&format!(
            "{},{},{},{},{:02}/{:02}/2023,{:02}:{:02},{}\n",
            states[i % states.len()],
            vehicles[(i / 2) % vehicles.len()],
            weather[i % weather.len()],
            if i % 2 == 0 { "Highway" } else { "Urban Road" },
            (i % 28) + 1,
            (i % 12) + 1,
            i % 24,
            i % 60,
            severities[i % severities.len()],
        ));
    }
    data
}

// =============================================================================
// Preprocessing
// =============================================================================

#[test]
fn test_scenario_severity_and_temporal_columns() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(dir.path());
    write_raw(pipeline.config(), SCENARIO);

    let summary = pipeline.preprocess().expect("Preprocess failed");
    assert_eq!(summary.rows, 3);
    assert!(summary.output.exists());

    let clean = Table::read_csv(&summary.output).unwrap();
    let severity: Vec<Option<&str>> = (0..3)
        .map(|r| clean.get(r, "severity").and_then(Value::as_text))
        .collect();
    assert_eq!(severity, vec![Some("high"), Some("low"), Some("medium")]);

    assert_eq!(clean.get(1, "state"), Some(&Value::text("goa")));
    assert_eq!(clean.get(0, "city"), Some(&Value::text("kochi")));
    assert_eq!(clean.get(2, "vehicle_type"), Some(&Value::text("truck")));

    assert_eq!(clean.get(0, "time_of_day"), Some(&Value::text("Evening (18-21)")));
    assert_eq!(clean.get(1, "time_of_day"), Some(&Value::text("Morning (6-11)")));
    assert_eq!(clean.get(2, "time_of_day"), Some(&Value::text("Afternoon (12-17)")));

    assert_eq!(clean.get(2, "month"), Some(&Value::Integer(3)));
    assert_eq!(clean.get(0, "weekday"), Some(&Value::text("Sunday")));

    // required columns absent from the source are backfilled
    assert!(clean.column("weather").unwrap().is_all_missing());
    assert!(clean.column("road_type").unwrap().is_all_missing());
}

#[test]
fn test_missing_date_column_yields_night() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(dir.path());
    write_raw(
        pipeline.config(),
        "state,vehicle_type,severity\nGoa,Car,low\nKerala,Bus,high\n",
    );

    let summary = pipeline.preprocess().unwrap();
    assert!(summary.report.date_column.is_none());

    let clean = Table::read_csv(&summary.output).unwrap();
    for name in ["datetime", "year", "month", "day", "hour", "weekday"] {
        assert!(clean.column(name).unwrap().is_all_missing(), "{} should be empty", name);
    }
    for row in 0..clean.row_count() {
        assert_eq!(clean.get(row, "time_of_day"), Some(&Value::text("Night (0-5)")));
    }
}

#[test]
fn test_duplicates_removed_after_normalization() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(dir.path());
    write_raw(
        pipeline.config(),
        "State/UT,Date,Time,Severity\n\
         Goa,10/02/2023,10:00,Minor\n\
         goa ,10/02/2023,10:00,minor\n\
         Kerala,11/02/2023,10:00,Fatal\n",
    );

    let summary = pipeline.preprocess().unwrap();
    assert_eq!(summary.report.rows_in, 3);
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.report.duplicates_removed(), 1);
}

#[test]
fn test_normalization_is_idempotent_through_csv() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(dir.path());
    write_raw(pipeline.config(), SCENARIO);
    pipeline.preprocess().unwrap();

    let clean_path = &pipeline.config().paths.clean;
    let again = dir.path().join("again.csv");
    pipeline.preprocess_file(clean_path, &again).unwrap();

    assert_eq!(
        fs::read_to_string(clean_path).unwrap(),
        fs::read_to_string(&again).unwrap()
    );
}

#[test]
fn test_normalization_is_idempotent_in_memory() {
    let raw = roadrisk::input::Parser::new()
        .parse_bytes(SCENARIO.as_bytes(), b',')
        .unwrap();
    let normalizer = Normalizer::new();

    let (once, _) = normalizer.normalize(Table::from_raw(&raw));
    let (twice, report) = normalizer.normalize(once.clone());

    assert_eq!(once, twice);
    assert_eq!(report.duplicates_removed(), 0);
}

#[test]
fn test_header_only_raw_yields_empty_clean_table() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(dir.path());
    write_raw(pipeline.config(), "State/UT,Date,Severity\n");

    let summary = pipeline.preprocess().expect("Header-only table should preprocess");
    assert_eq!(summary.rows, 0);
    assert_eq!(summary.source.row_count, 0);

    let clean = pipeline.load_clean().unwrap();
    assert_eq!(clean.row_count(), 0);
    for name in &pipeline.config().schema.required_columns {
        assert!(clean.contains(name), "missing required column '{}'", name);
    }
    assert!(clean.contains("time_of_day"));
}

#[test]
fn test_preprocess_reports_source_shape() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(dir.path());
    write_raw(pipeline.config(), SCENARIO);

    let summary = pipeline.preprocess().unwrap();
    assert_eq!(summary.source.format, "csv");
    assert_eq!(summary.source.row_count, 3);
    assert_eq!(summary.source.column_count, 6);
    assert_eq!(summary.source.file, "accidents_raw.csv");
}

#[test]
fn test_unreadable_raw_is_missing_artifact() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(dir.path());

    let err = pipeline.preprocess().unwrap_err();
    assert!(matches!(err, RoadriskError::MissingArtifact { .. }));
    assert!(err.to_string().contains("accidents_raw.csv"));
}

// =============================================================================
// Training and prediction
// =============================================================================

#[test]
fn test_train_balanced_dataset() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(dir.path());
    write_raw(pipeline.config(), &balanced_raw());
    pipeline.preprocess().unwrap();

    let summary = pipeline.train().expect("Training failed");
    let metrics = &summary.metrics;

    assert!((0.0..=1.0).contains(&metrics.accuracy));
    assert_eq!(metrics.train_rows + metrics.test_rows, 60);
    assert_eq!(metrics.test_rows, 12);

    let clean = pipeline.load_clean().unwrap();
    assert_eq!(metrics.features, select_features(&clean, &pipeline.config().schema));
    assert_eq!(metrics.features.len(), 9);

    for key in ["low", "medium", "high", "macro avg", "weighted avg"] {
        assert!(metrics.report.contains_key(key), "report missing '{}'", key);
    }
    assert!(summary.model_path.exists());
    assert!(summary.metrics_path.exists());
}

#[test]
fn test_predict_after_training() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(dir.path());
    write_raw(pipeline.config(), &balanced_raw());
    pipeline.preprocess().unwrap();
    pipeline.train().unwrap();

    let bundle = pipeline.load_model().unwrap();
    let known = FeatureRow::new()
        .with("state", "kerala")
        .with_missing("city")
        .with("vehicle_type", "car")
        .with("weather", "clear")
        .with("road_type", "highway")
        .with("year", 2023i64)
        .with("month", 6i64)
        .with("weekday", "Monday")
        .with("time_of_day", "Afternoon (12-17)");
    let severity = pipeline.predict(&bundle, &known).unwrap();
    assert!(Severity::ALL.contains(&severity));

    // unseen categories fall into the unknown slot
    let unseen = known.clone().with("state", "atlantis").with("vehicle_type", "hovercraft");
    assert!(pipeline.predict(&bundle, &unseen).is_ok());

    let clean = pipeline.load_clean().unwrap();
    let features = bundle.features().to_vec();
    for row in 0..clean.row_count() {
        let record = FeatureRow::from_table_row(&clean, row, &features);
        let severity = pipeline.predict(&bundle, &record).unwrap();
        assert!(Severity::ALL.contains(&severity));
    }

    // absent keys are an error
    let partial = FeatureRow::new().with("state", "kerala");
    assert!(matches!(
        bundle.predict(&partial),
        Err(RoadriskError::MissingFeature(_))
    ));
}

#[test]
fn test_prediction_normalization_switch() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(dir.path());
    write_raw(pipeline.config(), &balanced_raw());
    pipeline.preprocess().unwrap();
    pipeline.train().unwrap();
    let bundle = pipeline.load_model().unwrap();

    let row = |state: &str| {
        FeatureRow::new()
            .with("state", state)
            .with_missing("city")
            .with("vehicle_type", "bus")
            .with("weather", "rain")
            .with("road_type", "urban road")
            .with("year", 2023i64)
            .with("month", 3i64)
            .with("weekday", "Friday")
            .with("time_of_day", "Night (0-5)")
    };

    let canonical = bundle.predict_proba_with(&row("goa"), TextPolicy::AsIs).unwrap();
    let shouted = bundle
        .predict_proba_with(&row("  GOA "), TextPolicy::Normalize)
        .unwrap();
    assert_eq!(canonical, shouted);
}

#[test]
fn test_training_is_reproducible() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(dir.path());
    write_raw(pipeline.config(), &balanced_raw());
    pipeline.preprocess().unwrap();

    let clean = pipeline.load_clean().unwrap();
    let (a, ma) = pipeline.train_table(&clean).unwrap();
    let (b, mb) = pipeline.train_table(&clean).unwrap();

    assert_eq!(a.forest(), b.forest());
    assert_eq!(ma.accuracy, mb.accuracy);
}

#[test]
fn test_insufficient_class_fails_training() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(dir.path());
    write_raw(
        pipeline.config(),
        "state,date,severity\ngoa,01/01/2023,low\nkerala,02/01/2023,low\npunjab,03/01/2023,fatal\n",
    );
    pipeline.preprocess().unwrap();

    match pipeline.train() {
        Err(RoadriskError::InsufficientData { class, count, required }) => {
            assert_eq!(class, "high");
            assert_eq!(count, 1);
            assert_eq!(required, 2);
        }
        other => panic!("expected InsufficientData, got {:?}", other.map(|_| ())),
    }
    assert!(!pipeline.config().paths.model.exists());
}

#[test]
fn test_unlabeled_table_fails_training() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(dir.path());
    write_raw(pipeline.config(), "state,severity\ngoa,unknown\nkerala,\n");
    pipeline.preprocess().unwrap();

    assert!(matches!(pipeline.train(), Err(RoadriskError::NoLabeledRows)));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_pipelines_with_separate_roots_are_isolated() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let a = pipeline_in(first.path());
    let b = pipeline_in(second.path());

    write_raw(a.config(), SCENARIO);
    a.preprocess().unwrap();

    assert!(a.config().paths.clean.exists());
    assert!(!b.config().paths.clean.exists());
    assert!(matches!(b.preprocess(), Err(RoadriskError::MissingArtifact { .. })));
}

#[test]
fn test_config_file_overrides_schema() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("roadrisk.json");
    let raw_path = dir.path().join("input.csv");
    fs::write(
        &config_path,
        format!(
            r#"{{"paths": {{"raw": "{}", "clean": "{}"}},
               "schema": {{"date_aliases": ["reported_on"]}}}}"#,
            raw_path.display(),
            dir.path().join("clean.csv").display()
        ),
    )
    .unwrap();
    fs::write(&raw_path, "state,reported_on,severity\ngoa,05/06/2022,minor\n").unwrap();

    let config = PipelineConfig::load(&config_path).unwrap();
    let pipeline = Pipeline::with_config(config).unwrap();
    let summary = pipeline.preprocess().unwrap();

    assert_eq!(summary.report.date_column.as_deref(), Some("reported_on"));
    let clean = Table::read_csv(&summary.output).unwrap();
    assert_eq!(clean.get(0, "year"), Some(&Value::Integer(2022)));
    assert_eq!(clean.get(0, "month"), Some(&Value::Integer(6)));
}

//! Severity classifier: feature encoding, random forest, evaluation and
//! the persisted model bundle.

mod bundle;
mod encoder;
mod features;
mod forest;
mod matrix;
mod metrics;
mod split;
mod trainer;

pub use bundle::{BUNDLE_FORMAT_VERSION, ModelBundle, TextPolicy};
pub use encoder::{EncodedFeature, FeatureEncoder, MISSING_CATEGORY, MISSING_NUMERIC};
pub use features::FeatureRow;
pub use forest::{DecisionTree, RandomForest, TreeNode, TreeParams};
pub use matrix::Matrix;
pub use metrics::{ClassMetrics, MetricsReport, accuracy, classification_report};
pub use split::{SplitIndices, stratified_split, test_count};
pub use trainer::{select_features, train};

mod config;
mod date;
mod error;
mod model;
mod posts;
mod util;
mod progress;

mod normalize;
mod scorer;
mod lexical;
mod classifier;
mod inference;

mod trajectory;
mod result;
mod store;
mod report;

pub use crate::config::{AggregationMode, AnalysisOptions, ClassifierConfig};
pub use crate::date::{Day, DayPolicy};
pub use crate::error::AnalysisError;
pub use crate::model::{Comment, Post};
pub use crate::posts::{read_posts, read_posts_dir, read_posts_file, write_posts, PostFormat};

pub use crate::normalize::{emoji_to_names, fold_typography, normalize};
pub use crate::scorer::{Scorer, ScoringBackend};
pub use crate::lexical::LexicalScorer;
pub use crate::classifier::{init_with_fallback, truncate_tokens, ClassifierBackend, ClassifierScorer, Device, LabelTable};
pub use crate::inference::HttpClassifier;

pub use crate::trajectory::{DailyBucket, TrajectoryAnalyzer};
pub use crate::result::{AnalysisKind, AnalysisResult, TrajectoryPoint};
pub use crate::store::{load, save};
pub use crate::report::{day_offsets, linear_fit, render_svg, render_to_file, LinearFit};

// Progress and tracing helpers for the binary.
pub use crate::progress::{make_count_progress, set_global_multiprogress, ProgressScope};
pub use crate::util::init_tracing_once;

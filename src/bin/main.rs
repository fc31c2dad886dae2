//! qpsvm Command Line Interface
//!
//! Trains, evaluates and applies kernel SVM models on labelled review text
//! or numeric feature CSV files.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info, warn};
use ndarray::{Array1, Array2};
use qpsvm::api::{quick, EvaluationMetrics, SVM};
use qpsvm::core::{GammaMode, Prediction, Result, SVMError, SVMModel};
use qpsvm::data::{
    csv_headers, select_labels, select_rows, train_test_split, FeatureDataset, ReviewDataset,
    DEFAULT_LABEL_COLUMN, DEFAULT_TEXT_COLUMN,
};
use qpsvm::optimizer::TrainedSVM;
use qpsvm::persistence::SerializableModel;
use qpsvm::text::{Stopwords, TextPipeline, VectorizerKind};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "qpsvm")]
#[command(about = "Kernel SVM trained through its dual quadratic program")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new SVM model
    Train(TrainArgs),
    /// Make predictions using a trained model
    Predict(PredictArgs),
    /// Evaluate a model on labelled data
    Evaluate(EvaluateArgs),
    /// Display model information
    Info(InfoArgs),
    /// Hold-out accuracy on a numeric dataset without saving a model
    Quick(QuickArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum DataFormat {
    /// Reviews if the header names the text column, features otherwise
    Auto,
    /// CSV with a free-text column and a string label column
    Reviews,
    /// Numeric CSV, last column is the label
    Features,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliVectorizer {
    /// Raw token counts
    #[value(name = "bow")]
    BagOfWords,
    /// Term frequency times inverse document frequency
    #[value(name = "tfidf")]
    TfIdf,
}

impl From<CliVectorizer> for VectorizerKind {
    fn from(cli_vectorizer: CliVectorizer) -> Self {
        match cli_vectorizer {
            CliVectorizer::BagOfWords => VectorizerKind::BagOfWords,
            CliVectorizer::TfIdf => VectorizerKind::TfIdf,
        }
    }
}

#[derive(Args, Clone)]
struct ColumnArgs {
    /// Review text column
    #[arg(long, default_value = DEFAULT_TEXT_COLUMN)]
    text_column: String,

    /// Label column
    #[arg(long, default_value = DEFAULT_LABEL_COLUMN)]
    label_column: String,
}

#[derive(Args, Clone)]
struct ModelArgs {
    /// Kernel: linear, polynomial, rbf or sigmoid
    #[arg(short, long, default_value = "linear")]
    kernel: String,

    /// Soft-margin bound C (0 trains a hard margin)
    #[arg(short = 'C', long, default_value = "0.0")]
    c: f64,

    /// Polynomial degree
    #[arg(long, default_value = "3")]
    degree: u32,

    /// Polynomial and sigmoid offset
    #[arg(long, default_value = "0.0")]
    coef: f64,

    /// How sigma is derived: scale or auto
    #[arg(short, long, default_value = "scale")]
    gamma: String,

    /// Support-vector threshold on the multipliers
    #[arg(short, long, default_value = "1e-6")]
    epsilon: f64,

    /// Solver convergence tolerance
    #[arg(long, default_value = "0.001")]
    tolerance: f64,

    /// Solver iteration cap
    #[arg(short, long)]
    max_iterations: Option<usize>,
}

impl ModelArgs {
    fn build(&self) -> Result<SVM> {
        let mut svm = SVM::new()
            .with_kernel_name(&self.kernel)?
            .with_c(self.c)
            .with_degree(self.degree)
            .with_coef(self.coef)
            .with_gamma(self.gamma.parse::<GammaMode>()?)
            .with_epsilon(self.epsilon)
            .with_tolerance(self.tolerance);
        if let Some(max_iterations) = self.max_iterations {
            svm = svm.with_max_iterations(max_iterations);
        }
        Ok(svm)
    }
}

#[derive(Args)]
struct TrainArgs {
    /// Training data file
    #[arg(long)]
    data: PathBuf,

    /// Output model file
    #[arg(short, long)]
    output: PathBuf,

    /// Data format
    #[arg(short, long, value_enum, default_value = "auto")]
    format: DataFormat,

    #[command(flatten)]
    model: ModelArgs,

    /// Vectorizer for review text
    #[arg(long, value_enum, default_value = "bow")]
    vectorizer: CliVectorizer,

    /// Keep stopwords instead of removing the English list
    #[arg(long)]
    keep_stopwords: bool,

    /// Stopword file, one word per line, replacing the English list
    #[arg(long, conflicts_with = "keep_stopwords")]
    stopwords: Option<PathBuf>,

    /// Share of samples held out for testing (0 trains on everything)
    #[arg(long, default_value = "0.4")]
    test_ratio: f64,

    /// Seed for the train/test shuffle
    #[arg(long, default_value = "42")]
    seed: u64,

    #[command(flatten)]
    columns: ColumnArgs,
}

#[derive(Args)]
struct PredictArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Input data file
    #[arg(long)]
    data: PathBuf,

    /// Output predictions file (optional, prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also print the raw decision value
    #[arg(long)]
    decision: bool,

    /// Review text column
    #[arg(long, default_value = DEFAULT_TEXT_COLUMN)]
    text_column: String,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Labelled data file
    #[arg(long)]
    data: PathBuf,

    /// Show detailed metrics
    #[arg(long)]
    detailed: bool,

    #[command(flatten)]
    columns: ColumnArgs,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file
    model: PathBuf,
}

#[derive(Args)]
struct QuickArgs {
    /// Numeric feature CSV, last column is the label
    data: PathBuf,

    #[command(flatten)]
    model: ModelArgs,

    /// Share of samples held out for testing
    #[arg(long, default_value = "0.4")]
    test_ratio: f64,

    /// Seed for the train/test shuffle
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Predict(args) => predict_command(args),
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Info(args) => info_command(args),
        Commands::Quick(args) => quick_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Features and ±1 labels ready for training, plus the text pipeline if any
struct TrainingData {
    x: Array2<f64>,
    y: Array1<f64>,
    pipeline: Option<TextPipeline>,
}

fn train_command(args: TrainArgs) -> Result<()> {
    info!("Training SVM model...");
    info!("Data file: {:?}", args.data);

    let format = resolve_format(args.format, &args.data, &args.columns.text_column)?;
    info!("Loading dataset as {format:?}");

    let data = match format {
        DataFormat::Reviews => load_reviews_for_training(&args)?,
        _ => {
            let (x, y) = load_labelled_features(&args.data)?;
            TrainingData {
                x,
                y,
                pipeline: None,
            }
        }
    };
    info!(
        "Loaded {} samples with {} features",
        data.x.nrows(),
        data.x.ncols()
    );

    let mut svm = args.model.build()?;
    info!(
        "Parameters: kernel={}, C={}, epsilon={}",
        svm.config().kernel,
        svm.config().c,
        svm.config().epsilon
    );

    if args.test_ratio == 0.0 {
        svm.fit(data.x.view(), data.y.view())?;
        let accuracy = svm.evaluate(data.x.view(), data.y.view())?;
        info!("Training accuracy: {:.2}%", accuracy * 100.0);
    } else {
        let split = train_test_split(data.x.nrows(), args.test_ratio, args.seed)?;
        let x_train = select_rows(data.x.view(), &split.train);
        let y_train = select_labels(data.y.view(), &split.train);
        let x_test = select_rows(data.x.view(), &split.test);
        let y_test = select_labels(data.y.view(), &split.test);
        info!(
            "Split into {} training and {} test samples (seed {})",
            split.train.len(),
            split.test.len(),
            args.seed
        );

        svm.fit(x_train.view(), y_train.view())?;
        let train_accuracy = svm.evaluate(x_train.view(), y_train.view())?;
        let test_accuracy = svm.evaluate(x_test.view(), y_test.view())?;
        info!("Training accuracy: {:.2}%", train_accuracy * 100.0);
        info!("Test accuracy: {:.2}%", test_accuracy * 100.0);
    }

    let model_info = svm.info()?;
    info!("Training completed successfully");
    info!("Support vectors: {}", model_info.n_support_vectors);
    info!("Bias: {:.6}", model_info.bias);

    let serializable = SerializableModel::from_trained_model(svm.model()?, svm.config(), data.pipeline);
    serializable.save_to_file(&args.output)?;
    info!("Model saved to: {:?}", args.output);

    Ok(())
}

fn load_reviews_for_training(args: &TrainArgs) -> Result<TrainingData> {
    let dataset = ReviewDataset::from_file(
        &args.data,
        &args.columns.text_column,
        &args.columns.label_column,
    )?;

    let stopwords = if args.keep_stopwords {
        Stopwords::none()
    } else if let Some(path) = &args.stopwords {
        Stopwords::from_file(path)?
    } else {
        Stopwords::english()
    };
    info!("Removing {} stopwords", stopwords.len());

    let mut pipeline = TextPipeline::new(args.vectorizer.into(), stopwords);
    let (x, y) = pipeline.fit_transform(dataset.texts(), dataset.labels())?;
    Ok(TrainingData {
        x,
        y,
        pipeline: Some(pipeline),
    })
}

fn load_labelled_features(path: &Path) -> Result<(Array2<f64>, Array1<f64>)> {
    let (x, y) = FeatureDataset::from_file(path)?.into_parts();
    let y = y.ok_or_else(|| SVMError::ParseError("feature file has no label column".to_string()))?;
    Ok((x, y))
}

/// Unlabelled features whose width matches the model; a trailing label
/// column is dropped
fn load_features_for_model(path: &Path, n_features: usize) -> Result<Array2<f64>> {
    let dataset = FeatureDataset::from_file_unlabeled(path)?;
    if dataset.dim() == n_features + 1 {
        warn!("Ignoring the last column of {path:?} as a label column");
        let (x, _) = FeatureDataset::from_file(path)?.into_parts();
        return Ok(x);
    }
    Ok(dataset.into_parts().0)
}

fn predict_command(args: PredictArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let serializable_model = SerializableModel::load_from_file(&args.model)?;
    let model = serializable_model.to_trained_model()?;

    info!("Loading prediction data from: {:?}", args.data);
    let x = match &serializable_model.pipeline {
        Some(pipeline) => {
            let texts = ReviewDataset::texts_from_file(&args.data, &args.text_column)?;
            pipeline.transform(&texts)?
        }
        None => load_features_for_model(&args.data, model.n_features())?,
    };

    info!(
        "Making predictions using model with {} support vectors",
        model.n_support_vectors()
    );
    let predictions: Vec<Prediction> = model
        .decision_function(x.view())?
        .iter()
        .map(|&value| Prediction::from_decision(value))
        .collect();

    let class_names = match &serializable_model.pipeline {
        Some(pipeline) => {
            let labels = Array1::from_iter(predictions.iter().map(|p| p.label));
            Some(pipeline.decode_labels(labels.view())?)
        }
        None => None,
    };

    match &args.output {
        Some(output_path) => {
            let mut writer = BufWriter::new(File::create(output_path)?);
            write_predictions(&mut writer, &predictions, class_names.as_deref(), args.decision)?;
            writer.flush()?;
            info!("Predictions saved to: {output_path:?}");
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_predictions(&mut writer, &predictions, class_names.as_deref(), args.decision)?;
        }
    }

    Ok(())
}

fn write_predictions<W: Write>(
    writer: &mut W,
    predictions: &[Prediction],
    class_names: Option<&[String]>,
    decision: bool,
) -> Result<()> {
    writeln!(writer, "# Predictions for {} samples", predictions.len())?;
    writeln!(
        writer,
        "# Format: sample_index predicted_label{}",
        if decision { " decision_value" } else { "" }
    )?;

    for (i, pred) in predictions.iter().enumerate() {
        let label = match class_names {
            Some(names) => names[i].clone(),
            None => format!("{:.0}", pred.label),
        };
        if decision {
            writeln!(writer, "{i} {label} {:.6}", pred.decision_value)?;
        } else {
            writeln!(writer, "{i} {label}")?;
        }
    }
    Ok(())
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let serializable_model = SerializableModel::load_from_file(&args.model)?;
    let model = serializable_model.to_trained_model()?;

    info!("Loading test data from: {:?}", args.data);
    let (x, y) = match &serializable_model.pipeline {
        Some(pipeline) => {
            let dataset = ReviewDataset::from_file(
                &args.data,
                &args.columns.text_column,
                &args.columns.label_column,
            )?;
            let y = pipeline.encode_labels(dataset.labels())?;
            (pipeline.transform(dataset.texts())?, y)
        }
        None => load_labelled_features(&args.data)?,
    };

    info!(
        "Evaluating model with {} support vectors",
        model.n_support_vectors()
    );
    let metrics = evaluate_model(&model, &x, &y)?;

    println!("=== Model Evaluation ===");
    serializable_model.print_summary();

    println!("\nTest Results:");
    println!("  Samples:  {}", metrics.total());
    println!("  Accuracy: {:.2}%", metrics.accuracy() * 100.0);

    if args.detailed {
        println!("\nDetailed Metrics:");
        println!("  True Positives:  {}", metrics.true_positives);
        println!("  True Negatives:  {}", metrics.true_negatives);
        println!("  False Positives: {}", metrics.false_positives);
        println!("  False Negatives: {}", metrics.false_negatives);
        println!("  Precision:       {:.4}", metrics.precision());
        println!("  Recall:          {:.4}", metrics.recall());
        println!("  F1 Score:        {:.4}", metrics.f1_score());
        println!("  Specificity:     {:.4}", metrics.specificity());
    }

    Ok(())
}

fn evaluate_model(model: &TrainedSVM, x: &Array2<f64>, y: &Array1<f64>) -> Result<EvaluationMetrics> {
    let predicted = model.predict(x.view())?;
    EvaluationMetrics::from_labels(predicted.view(), y.view())
}

fn info_command(args: InfoArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let serializable_model = SerializableModel::load_from_file(&args.model)?;

    serializable_model.print_summary();

    println!("\nSupport Vector Details:");
    println!("  Total: {}", serializable_model.support_vectors.len());
    let indices = &serializable_model.support_indices;
    let n_show = indices.len().min(10);
    println!("  Training indices: {:?}", &indices[..n_show]);
    if indices.len() > n_show {
        println!("    ... ({} more)", indices.len() - n_show);
    }

    println!("\nDual coefficients:");
    let lambda = &serializable_model.dual_coefficients;
    let labels = &serializable_model.support_labels;
    for (i, (&l, &y)) in lambda.iter().zip(labels.iter()).enumerate().take(n_show) {
        println!("  λ{i}: {l:.6} (y = {y:+.0})");
    }
    if lambda.len() > n_show {
        println!("  ... ({} more)", lambda.len() - n_show);
    }

    Ok(())
}

fn quick_command(args: QuickArgs) -> Result<()> {
    info!("Hold-out evaluation on {:?} with test ratio {}", args.data, args.test_ratio);
    let (x, y) = load_labelled_features(&args.data)?;
    let svm = args.model.build()?;

    let accuracy = quick::holdout_accuracy(
        x.view(),
        y.view(),
        svm.config().clone(),
        args.test_ratio,
        args.seed,
    )?;

    println!("=== Hold-out Results ===");
    println!("Data file: {:?}", args.data);
    println!("Kernel: {}", svm.config().kernel);
    println!("C parameter: {}", svm.config().c);
    println!(
        "Train/test ratio: {:.2}/{:.2}",
        1.0 - args.test_ratio,
        args.test_ratio
    );
    println!("Test accuracy: {:.2}%", accuracy * 100.0);

    Ok(())
}

/// Resolve `auto` by looking for the text column in the CSV header
fn resolve_format(format: DataFormat, path: &Path, text_column: &str) -> Result<DataFormat> {
    if format != DataFormat::Auto {
        return Ok(format);
    }
    let headers = csv_headers(path)?;
    if headers.iter().any(|h| h == text_column) {
        Ok(DataFormat::Reviews)
    } else {
        Ok(DataFormat::Features)
    }
}

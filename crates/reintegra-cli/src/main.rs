mod display;
mod input;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use reintegra_ai::{Classification, Classifier, DecisionTree, ModelRegistry, ProbabilityModel};
use reintegra_core::vocab::{self, canonical_vocabulary, count_range, raw_vocabulary};
use reintegra_core::{Attribute, AttributeRow, ModelVariant, normalize_for};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "reintegra",
    version,
    about = "Dropout-risk classification for reintegration program participants"
)]
struct Cli {
    /// Directory holding tree_unbiased.json and tree_full_unbiased.json.
    #[arg(long, env = "REINTEGRA_MODELS_DIR", default_value = "models", global = true)]
    models_dir: PathBuf,

    /// Keep the bias-sensitive DisbursementBreakdown column in full mode.
    #[arg(long, env = "REINTEGRA_INCLUDE_BIAS", global = true)]
    include_bias: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize a row and classify it with the selected model.
    Classify {
        #[command(flatten)]
        row: RowArgs,

        /// Print a JSON report instead of the label and chart.
        #[arg(long)]
        json: bool,
    },
    /// Show the row the selected model would receive.
    Normalize {
        #[command(flatten)]
        row: RowArgs,

        /// Print the normalized row as JSON.
        #[arg(long, conflicts_with = "table")]
        json: bool,

        /// Print the normalized row as an Arrow table.
        #[arg(long)]
        table: bool,
    },
    /// List the accepted values of one or all attributes.
    Vocab {
        /// Attribute name or survey header.
        attribute: Option<Attribute>,

        /// Also show the canonical values for this model.
        #[arg(short, long)]
        model: Option<ModelVariant>,
    },
    /// Load both model artifacts and report their structure.
    CheckModels,
}

#[derive(Args)]
struct RowArgs {
    /// Model variant: simple or completo.
    #[arg(short, long, default_value = "simple")]
    model: ModelVariant,

    /// JSON object of attribute values; `-` reads stdin.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Set one attribute, overriding the input file. Repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// Accept values outside the form vocabularies.
    #[arg(long)]
    skip_validation: bool,
}

impl RowArgs {
    /// Assemble the raw row and, unless skipped, check it like the form would.
    fn load(&self, include_bias: bool) -> anyhow::Result<AttributeRow> {
        let row = input::read_row(self.input.as_deref(), &self.set)?;
        if !self.skip_validation {
            vocab::validate_raw(&row, self.model, include_bias)
                .with_context(|| format!("row rejected for the {} model", self.model))?;
        }
        Ok(row)
    }
}

/// JSON output of `classify --json`.
#[derive(Serialize)]
struct Report<'a> {
    classified_at: String,
    include_bias: bool,
    normalized: &'a AttributeRow,
    classification: &'a Classification,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("reintegra v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Command::Classify { row, json } => {
            cmd_classify(&cli.models_dir, cli.include_bias, row, *json)
        }
        Command::Normalize { row, json, table } => {
            cmd_normalize(cli.include_bias, row, *json, *table)
        }
        Command::Vocab { attribute, model } => {
            cmd_vocab(*attribute, *model);
            Ok(())
        }
        Command::CheckModels => cmd_check_models(&cli.models_dir, cli.include_bias),
    }
}

fn cmd_classify(
    models_dir: &Path,
    include_bias: bool,
    args: &RowArgs,
    json: bool,
) -> anyhow::Result<()> {
    let raw = args.load(include_bias)?;

    let registry = ModelRegistry::load(models_dir)
        .with_context(|| format!("loading models from {}", models_dir.display()))?;
    let classifier = Classifier::new(registry).with_include_bias(include_bias);

    let (normalized, classification) = classifier
        .assess(&raw, args.model)
        .context("classification failed")?;

    if json {
        let report = Report {
            classified_at: chrono::Utc::now().to_rfc3339(),
            include_bias: classifier.include_bias(),
            normalized: &normalized,
            classification: &classification,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display::print_classification(&classification)?;
    }
    Ok(())
}

fn cmd_normalize(include_bias: bool, args: &RowArgs, json: bool, table: bool) -> anyhow::Result<()> {
    let raw = args.load(include_bias)?;
    let normalized = normalize_for(&raw, args.model, include_bias);

    if json {
        println!("{}", serde_json::to_string_pretty(&normalized)?);
        return Ok(());
    }

    let batch = normalized
        .to_record_batch()
        .context("building record batch")?;
    if table {
        println!("{}", arrow::util::pretty::pretty_format_batches(&[batch])?);
    } else {
        display::print_row_card(&batch, &format!("Normalized row ({})", args.model))?;
    }
    Ok(())
}

fn cmd_vocab(attribute: Option<Attribute>, model: Option<ModelVariant>) {
    let attrs: Vec<Attribute> = match attribute {
        Some(a) => vec![a],
        None => reintegra_core::FULL_SCHEMA.to_vec(),
    };

    for attr in attrs {
        println!("{attr} ({})", attr.survey_header());
        if let Some(values) = raw_vocabulary(attr) {
            for v in values {
                println!("  {v}");
            }
        } else if let Some(range) = count_range(attr) {
            println!("  -1 (no record), {}..={}", range.start(), range.end());
        } else {
            println!("  (free text)");
        }

        if let Some(variant) = model
            && let Some(canonical) = canonical_vocabulary(attr, variant)
        {
            println!("  canonical for {variant}: {}", canonical.join(" | "));
        }
        println!();
    }
}

fn cmd_check_models(models_dir: &Path, include_bias: bool) -> anyhow::Result<()> {
    for variant in ModelVariant::ALL {
        let path = models_dir.join(variant.artifact_file());
        let tree = DecisionTree::load(&path)
            .with_context(|| format!("checking the {variant} model"))?;

        let expected = variant.expected_columns(include_bias);
        let mut missing: Vec<&str> = expected
            .iter()
            .copied()
            .filter(|c| !tree.expected_columns().iter().any(|f| f == c))
            .collect();
        missing.sort_unstable();
        let extra: Vec<&str> = tree
            .expected_columns()
            .iter()
            .map(|s| s.as_str())
            .filter(|f| !expected.contains(f))
            .collect();

        println!("{variant}: {}", path.display());
        println!("  name       {}", tree.name());
        println!("  classes    {}", tree.classes().join(", "));
        println!(
            "  nodes      {} ({} leaves, depth {})",
            tree.node_count(),
            tree.leaf_count(),
            tree.depth()
        );
        println!("  features   {}", tree.expected_columns().len());
        if missing.is_empty() && extra.is_empty() {
            println!("  schema     ok");
        } else {
            println!("  schema     MISMATCH");
            if !missing.is_empty() {
                println!("    missing  {}", missing.join(", "));
            }
            if !extra.is_empty() {
                println!("    extra    {}", extra.join(", "));
            }
        }
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_classify_arguments() {
        let cli = Cli::try_parse_from([
            "reintegra",
            "classify",
            "--model",
            "completo",
            "--set",
            "Sex=Femenino",
            "--set",
            "NumChildren=2",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Command::Classify { row, json } => {
                assert_eq!(row.model, ModelVariant::Completo);
                assert_eq!(row.set, vec!["Sex=Femenino", "NumChildren=2"]);
                assert!(json);
            }
            _ => panic!("expected classify"),
        }
    }

    #[test]
    fn rejects_unknown_model() {
        assert!(Cli::try_parse_from(["reintegra", "classify", "--model", "forest"]).is_err());
    }

    #[test]
    fn vocab_accepts_survey_header() {
        let cli = Cli::try_parse_from(["reintegra", "vocab", "Tipo de Vivienda"]).unwrap();
        match cli.command {
            Command::Vocab { attribute, model } => {
                assert_eq!(attribute, Some(Attribute::HousingType));
                assert!(model.is_none());
            }
            _ => panic!("expected vocab"),
        }
    }

    #[test]
    fn demo_rows_pass_validation() {
        let simple: AttributeRow =
            serde_json::from_str(include_str!("../../../demos/row_simple.json")).unwrap();
        vocab::validate_raw(&simple, ModelVariant::Simple, false).unwrap();

        let full: AttributeRow =
            serde_json::from_str(include_str!("../../../demos/row_completo.json")).unwrap();
        vocab::validate_raw(&full, ModelVariant::Completo, false).unwrap();
        assert_eq!(normalize_for(&full, ModelVariant::Completo, false).len(), 17);
    }

    #[test]
    fn row_args_validate_like_the_form() {
        let args = RowArgs {
            model: ModelVariant::Simple,
            input: None,
            set: vec![
                "TrainingTrack=SALUD".into(),
                "OccupationalStatus=Desocupados".into(),
                "DisbursedBenefit=Sí".into(),
                "SocialServiceStatus=Vinculado".into(),
            ],
            skip_validation: false,
        };
        let err = args.load(false).unwrap_err();
        assert!(format!("{err:#}").contains("SpouseStatus"));

        let args = RowArgs {
            skip_validation: true,
            ..args
        };
        assert_eq!(args.load(false).unwrap().len(), 4);
    }

    fn demo_models() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/models")
    }

    fn demo_row(file: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos").join(file)
    }

    #[test]
    fn demo_rows_classify_end_to_end() {
        use reintegra_ai::Outcome;

        let registry = ModelRegistry::load(&demo_models()).unwrap();
        let classifier = Classifier::new(registry);

        let args = RowArgs {
            model: ModelVariant::Simple,
            input: Some(demo_row("row_simple.json")),
            set: vec![],
            skip_validation: false,
        };
        let raw = args.load(false).unwrap();
        let (normalized, c) = classifier.assess(&raw, ModelVariant::Simple).unwrap();
        assert_eq!(normalized.len(), 5);
        assert_eq!(
            normalized.get("OccupationalStatus").and_then(|v| v.as_category()),
            Some("<No Registra>")
        );
        // Leaf with 60 complete / 12 abandon samples.
        assert!((c.p_abandon - 12.0 / 72.0).abs() < 1e-12);
        assert_eq!(c.outcome, Outcome::Abandon);

        let text = display::format_classification(&c).unwrap();
        assert!(text.contains("Modelo: Simple (Simple)"));
        assert!(text.contains("La clasificación es *Abandonará el proceso*"));
        assert!(text.contains("0.167"));

        let args = RowArgs {
            model: ModelVariant::Completo,
            input: Some(demo_row("row_completo.json")),
            ..args
        };
        let raw = args.load(false).unwrap();
        let (normalized, c) = classifier.assess(&raw, ModelVariant::Completo).unwrap();
        assert_eq!(normalized.len(), 17);
        assert_eq!(
            normalized.get("MaxTrainingLevel").and_then(|v| v.as_category()),
            Some("Técnico")
        );
        assert_eq!(c.p_abandon, 0.05);
        assert_eq!(c.outcome, Outcome::Complete);
        assert_eq!(c.label, "Culminará el proceso");
    }

    #[test]
    fn demo_simple_tree_abandons_at_the_threshold() {
        let registry = ModelRegistry::load(&demo_models()).unwrap();
        let raw = AttributeRow::new()
            .with("TrainingTrack", "SALUD")
            .with("OccupationalStatus", "Ocupados en el sector Informal")
            .with("DisbursedBenefit", "No")
            .with("SocialServiceStatus", "Certificado")
            .with("SpouseStatus", "Sí");
        let (_, c) = Classifier::new(registry)
            .assess(&raw, ModelVariant::Simple)
            .unwrap();
        assert_eq!(c.p_abandon, 0.1);
        assert_eq!(c.outcome, reintegra_ai::Outcome::Abandon);
    }

    #[test]
    fn demo_models_pass_checks() {
        cmd_check_models(&demo_models(), false).unwrap();

        let args = RowArgs {
            model: ModelVariant::Completo,
            input: Some(demo_row("row_completo.json")),
            set: vec!["Sexo=Femenino".into(), "N° de Hijos=4".into()],
            skip_validation: false,
        };
        cmd_classify(&demo_models(), false, &args, true).unwrap();
    }

    #[test]
    fn biased_run_rejects_unbiased_demo_models() {
        let args = RowArgs {
            model: ModelVariant::Completo,
            input: Some(demo_row("row_completo.json")),
            set: vec!["DisbursementBreakdown=Parcial".into()],
            skip_validation: false,
        };
        let err = cmd_classify(&demo_models(), true, &args, true).unwrap_err();
        assert!(format!("{err:#}").contains("schema mismatch"));
    }
}

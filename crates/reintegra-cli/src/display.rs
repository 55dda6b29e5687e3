//! Terminal output: the normalized-row card and the probability chart.

use std::fmt::Write;

use arrow::array::Array;
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use reintegra_ai::{Classification, Outcome};

const BAR_WIDTH: usize = 40;

// ── Schema section groupings ──

const PROGRAM: &[&str] = &[
    "DemobilizationType",
    "OccupationalStatus",
    "TrainingTrack",
    "MaxTrainingLevel",
    "DisbursedBenefit",
    "DisbursementBreakdown",
    "SocialServiceStatus",
    "SocialServiceType",
];

const DEMOGRAPHICS: &[&str] = &[
    "AgeGroup",
    "Sex",
    "EducationLevel",
    "SpouseStatus",
    "NumChildren",
];

const HOUSEHOLD: &[&str] = &[
    "HouseholdSize",
    "HousingType",
    "HousingTenure",
    "BasicUtilities",
    "HealthRegime",
];

// ── Public API ──

/// Print a single-row batch as a vertical card grouped by section.
pub fn print_row_card(batch: &RecordBatch, title: &str) -> anyhow::Result<()> {
    print!("{}", format_row_card(batch, title)?);
    Ok(())
}

/// Print the label line and the two-bar probability chart.
pub fn print_classification(c: &Classification) -> anyhow::Result<()> {
    print!("{}", format_classification(c)?);
    Ok(())
}

// ── Rendering ──

pub fn format_classification(c: &Classification) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "Modelo: {} ({})", c.variant, c.model)?;
    writeln!(out, "La clasificación es *{}*", c.label)?;
    writeln!(out)?;
    writeln!(out, "Clase")?;
    let bars: Vec<(&str, f64)> = Outcome::ALL
        .iter()
        .map(|o| o.label())
        .zip(c.probabilities())
        .collect();
    out.push_str(&render_probability_chart(&bars)?);
    Ok(out)
}

pub fn format_row_card(batch: &RecordBatch, title: &str) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "=== {title} ===")?;
    writeln!(out)?;

    let schema = batch.schema();
    let grouped: Vec<&str> = PROGRAM
        .iter()
        .chain(DEMOGRAPHICS)
        .chain(HOUSEHOLD)
        .copied()
        .collect();
    let other: Vec<&str> = schema
        .fields()
        .iter()
        .map(|f| f.name().as_str())
        .filter(|name| !grouped.contains(name))
        .collect();

    write_section(&mut out, batch, "Program", PROGRAM)?;
    write_section(&mut out, batch, "Demographics", DEMOGRAPHICS)?;
    write_section(&mut out, batch, "Household", HOUSEHOLD)?;
    write_section(&mut out, batch, "Other", &other)?;
    Ok(out)
}

fn write_section(
    out: &mut String,
    batch: &RecordBatch,
    header: &str,
    cols: &[&str],
) -> anyhow::Result<()> {
    let present: Vec<(&str, &dyn Array)> = cols
        .iter()
        .filter_map(|&name| batch.column_by_name(name).map(|c| (name, c.as_ref())))
        .collect();
    if present.is_empty() {
        return Ok(());
    }

    writeln!(out, "{header}")?;
    let options = FormatOptions::default().with_null("-");
    for (name, col) in present {
        let fmt = ArrayFormatter::try_new(col, &options)?;
        writeln!(out, "  {:<22} {}", name, fmt.value(0))?;
    }
    writeln!(out)?;
    Ok(())
}

/// Horizontal bars on a fixed [0, 1] axis, one per `(class, probability)`.
pub fn render_probability_chart(bars: &[(&str, f64)]) -> anyhow::Result<String> {
    let width = bars
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for &(label, p) in bars {
        let p = p.clamp(0.0, 1.0);
        let filled = (p * BAR_WIDTH as f64).round() as usize;
        writeln!(
            out,
            "  {label:<width$}  {}{}  {p:.3}",
            "█".repeat(filled),
            "·".repeat(BAR_WIDTH - filled),
        )?;
    }
    writeln!(out, "  {:<width$}  0{:>w$}", "", "1", w = BAR_WIDTH - 1)?;
    Ok(out)
}

use clap::Args;
use nutrilens::error::AppError;
use nutrilens::ledger::{CsvLedger, LedgerRow, LedgerStore};
use nutrilens::scans::parse_label_table;
use nutrilens::scoring::{
    score, score_with_category, ConsumerProfile, Gender, Nutrient, NutrientGroup, Rating,
    ReferenceCategory,
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Label table (`name,value` per line, quantities per 100 g)
    #[arg(long)]
    pub(crate) label: PathBuf,
    /// Grams consumed
    #[arg(long, default_value_t = 100.0)]
    pub(crate) weight: f64,
    /// Consumer age in years
    #[arg(long, default_value_t = 30)]
    pub(crate) age: u32,
    /// Consumer gender (male, female; anything else is unspecified)
    #[arg(long, default_value = "unspecified")]
    pub(crate) gender: String,
    /// Special condition, repeatable (Hypertension, Obesity, Diabetes, Pregnant)
    #[arg(long = "condition")]
    pub(crate) conditions: Vec<String>,
    /// Score against this reference table instead of the profile's (e.g. child-13-15)
    #[arg(long)]
    pub(crate) category: Option<ReferenceCategory>,
    /// Append the rating to this CSV ledger
    #[arg(long)]
    pub(crate) ledger: Option<PathBuf>,
    /// Print the rating as JSON instead of a report
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let file = std::fs::File::open(&args.label)?;
    let reading = parse_label_table(file)?;

    let profile = args
        .conditions
        .iter()
        .fold(
            ConsumerProfile::new(args.age, Gender::parse(&args.gender)),
            |profile, condition| profile.with_condition(condition.as_str()),
        );
    let rating = match args.category {
        Some(category) => score_with_category(category, &reading, args.weight)?,
        None => score(&profile, &reading, args.weight)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rating)?);
    } else {
        println!("{}", render_report(&rating, args.weight));
    }

    // Best effort, once the rating is printed.
    if let Some(path) = &args.ledger {
        match CsvLedger::new(path).append(&LedgerRow::from_rating(&rating)) {
            Ok(()) => info!(path = %path.display(), "rating appended to ledger"),
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to append rating to ledger")
            }
        }
    }
    Ok(())
}

fn render_group(out: &mut String, title: &str, rating: &Rating, group: NutrientGroup) {
    let entries: Vec<(Nutrient, f64)> = rating.percentages.group(group).collect();
    if entries.is_empty() {
        out.push_str(&format!("\n{title}: none on label\n"));
        return;
    }
    out.push_str(&format!("\n{title}\n"));
    for (nutrient, percentage) in entries {
        out.push_str(&format!("  {:<16} {:>9.2}% of RDA\n", nutrient.label(), percentage));
    }
}

pub(crate) fn render_report(rating: &Rating, weight_grams: f64) -> String {
    let mut out = String::new();
    out.push_str("NutriLens rating\n");
    out.push_str(&format!(
        "Reference table: {} | portion: {weight_grams} g\n",
        rating.category
    ));
    render_group(&mut out, "Beneficial nutrients", rating, NutrientGroup::Beneficial);
    render_group(&mut out, "Nutrients to limit", rating, NutrientGroup::Liability);
    out.push_str(&format!(
        "\nBase rating:    {:.4}\nBalance update: {:+.4}\nFinal rating:   {:.4} / 10",
        rating.base_rating, rating.balance_update, rating.final_rating
    ));
    out
}

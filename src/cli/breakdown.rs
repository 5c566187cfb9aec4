use super::ui;
use crate::aggregator::{Aggregate, AggregationResult, DataStatus};
use crate::api::{BreakdownResponse, resolve_country};
use crate::core::config::AppConfig;
use anyhow::Result;
use comfy_table::Cell;

impl AggregationResult {
    pub fn display_as_table(&self, country: &str) -> String {
        let mut output = format!(
            "Indicator breakdown: {}\n\n",
            ui::style_text(country, ui::StyleType::Title)
        );

        if self.indicators.is_empty() {
            let reason = match self.status {
                DataStatus::Error => self.error.as_deref().unwrap_or("aggregation failed"),
                _ => "no indicator source answered",
            };
            output.push_str(&format!(
                "{} ({})\n{}",
                ui::style_text("No data available", ui::StyleType::Error),
                self.status,
                ui::style_text(reason, ui::StyleType::Subtle)
            ));
            return output;
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Indicator"),
            ui::header_cell("Value"),
            ui::header_cell("Unit"),
            ui::header_cell("Trend"),
            ui::header_cell("Impact"),
            ui::header_cell("Weight"),
            ui::header_cell("Confidence"),
            ui::header_cell("Source"),
        ]);

        for (key, indicator) in &self.indicators {
            table.add_row(vec![
                Cell::new(key.as_str()),
                ui::number_cell(indicator.current_value, 2),
                Cell::new(&indicator.unit),
                ui::trend_cell(indicator.trend),
                ui::impact_cell(indicator.impact),
                ui::number_cell(indicator.weight, 2),
                ui::number_cell(indicator.confidence, 2),
                Cell::new(&indicator.source),
            ]);
        }
        output.push_str(&table.to_string());

        output.push_str(&format!(
            "\n\n{}: {} ({}, {})",
            ui::style_text("Overall score", ui::StyleType::ScoreLabel),
            ui::style_text(
                &format!("{:.3}", self.overall_score),
                ui::StyleType::ScoreValue
            ),
            self.status,
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output
    }
}

/// Runs one aggregation and prints it as a table, or as the HTTP JSON body.
pub async fn run(config: &AppConfig, country: Option<&str>, json: bool) -> Result<()> {
    let aggregator = crate::build_aggregator(config)?;
    let country = resolve_country(country, &config.default_country);

    let spinner = ui::new_spinner("Fetching indicators...");
    let result = aggregator.aggregate().await;
    spinner.finish_and_clear();

    if json {
        let body = BreakdownResponse::new(country, result);
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("{}", result.display_as_table(&country));
    }
    Ok(())
}

use std::sync::Arc;
use console::style;
use crate::cli::commands::HistoryArgs;
use crate::errors::XaiError;
use crate::reports::{History, ReportService};
use crate::storage::{FsReportStore, StaticLayout};

/// Read the report store directly; no server needs to be running.
pub async fn handle_history(args: HistoryArgs) -> Result<(), XaiError> {
    let settings = args.settings.resolve().await?;
    let store = Arc::new(FsReportStore::new(&settings.reports_dir)?);
    let service = ReportService::new(store, StaticLayout::new(&settings.static_dir, &settings.public_url));

    let filter = args.patient_id.as_deref().map(str::trim).filter(|id| !id.is_empty());
    let history = service.history(filter).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&history)?);
    } else {
        print_table(&history);
    }
    Ok(())
}

fn print_table(history: &History) {
    if history.reports.is_empty() {
        println!("{}", style("No reports found").dim());
        return;
    }

    println!(
        "{:<36}  {:<12}  {:<20}  {:<10}  {:>7}  {}",
        style("REPORT").bold(),
        style("PATIENT").bold(),
        style("NAME").bold(),
        style("DIAGNOSIS").bold(),
        style("CONF").bold(),
        style("UPDATED").bold(),
    );
    for entry in &history.reports {
        let report = &entry.report;
        let diagnosis = match entry.diagnosis {
            Some(d) => d.to_string(),
            None => "-".to_string(),
        };
        let confidence = entry
            .confidence
            .map(|c| format!("{:.2}%", c))
            .unwrap_or_else(|| "-".to_string());
        let xai = if report.xai.is_empty() { "" } else { " [xai]" };

        println!(
            "{:<36}  {:<12}  {:<20}  {:<10}  {:>7}  {}{}",
            style(&report.report_id).cyan(),
            report.patient.id,
            report.patient.name,
            diagnosis,
            confidence,
            report.sort_key(),
            style(xai).green(),
        );
    }
    println!("\n{} report(s)", history.count);
}

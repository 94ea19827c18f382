//! `policy`: fit a release policy for several dams at once.

use anyhow::Context;
use horizon_data::availability_samples;
use horizon_fit::{fit_piecewise, PiecewisePolicyFit};
use log::{info, warn};
use serde::Serialize;

use crate::args::{DatasetArgs, QueryArgs};

#[derive(Debug, Serialize)]
pub struct PolicyReport {
    pub dam: String,
    pub water_week: u32,
    pub horizon_weeks: u32,
    pub n_samples: usize,
    pub fit: PiecewisePolicyFit,
}

/// Run the full pipeline and policy fit for one dam.
pub fn fit_dam(
    dataset: &DatasetArgs,
    query: &QueryArgs,
    dam: &str,
) -> anyhow::Result<PolicyReport> {
    let mut config = dataset.pipeline_config()?;
    query.apply(&mut config);
    let series = dataset.load_series(dam)?;
    let samples = availability_samples(&series, &config, query.water_week, query.horizon)
        .with_context(|| format!("Failed to build availability samples for {dam}"))?;
    let fit = fit_piecewise(&samples).with_context(|| format!("Failed to fit policy for {dam}"))?;
    Ok(PolicyReport {
        dam: dam.to_string(),
        water_week: query.water_week,
        horizon_weeks: query.horizon,
        n_samples: samples.len(),
        fit,
    })
}

/// Fit every dam on its own blocking task. A dam that fails is logged and
/// skipped; the command errors only when no dam could be fitted.
pub async fn run_policy(
    dataset: DatasetArgs,
    query: QueryArgs,
    dams: Vec<String>,
) -> anyhow::Result<Vec<PolicyReport>> {
    let handles: Vec<_> = dams
        .into_iter()
        .map(|dam| {
            let dataset = dataset.clone();
            tokio::task::spawn_blocking(move || fit_dam(&dataset, &query, &dam))
        })
        .collect();

    let total = handles.len();
    let mut reports = Vec::with_capacity(total);
    for handle in handles {
        match handle.await? {
            Ok(report) => {
                println!("{}", serde_json::to_string(&report)?);
                reports.push(report);
            }
            Err(e) => warn!("{:#}", e),
        }
    }
    info!("Fitted {} of {} dams", reports.len(), total);
    if reports.is_empty() && total > 0 {
        anyhow::bail!("No policy could be fitted for any of the {} dams", total);
    }
    Ok(reports)
}

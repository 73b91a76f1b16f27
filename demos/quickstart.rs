//! Analyse a year of monthly sign-ups and simulate next quarter's revenue.
//!
//! Run with `RUST_LOG=metric_analytics=debug` to see component events.

use chrono::{TimeZone, Utc};
use metric_analytics::prelude::*;
use rand::distributions::Uniform;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let signups = [
        120.0, 132.0, 128.0, 141.0, 150.0, 163.0, 158.0, 149.0, 171.0, 184.0, 190.0, 214.0, 205.0,
        221.0, 219.0, 236.0,
    ];
    let mut series = Vec::with_capacity(signups.len());
    for (i, &value) in signups.iter().enumerate() {
        let year = 2023 + (i / 12) as i32;
        let month = (i % 12) as u32 + 1;
        let date = Utc
            .with_ymd_and_hms(year, month, 1, 0, 0, 0)
            .single()
            .ok_or("invalid date")?;
        series.push(DataPoint::dated(i as f64, value, date));
    }

    let config = AnalyticsConfig::default().with_monte_carlo(MonteCarloConfig::default().with_seed(7));
    let cache = Arc::new(ResultCache::new(config.cache_ttl));
    let engine = AnalyticsEngine::from_config(&config).with_cache(cache);

    let analysis = engine.analyze_cached("signups", &series, &AnalysisOptions::new(3, 0.9))?;

    let trend = &analysis.trend;
    println!(
        "trend: {} ({:+.2}/month, confidence {:.1}, significance {:.3})",
        trend.direction, trend.slope, trend.confidence, trend.statistical_significance
    );
    match &analysis.seasonality {
        Some(p) => println!("seasonality: period {} (confidence {:.2})", p.period, p.confidence),
        None => println!("seasonality: none detected"),
    }
    println!(
        "walk-forward: accuracy {:.3}, mae {:.2}, rmse {:.2} over {} steps",
        analysis.validation.accuracy,
        analysis.validation.mae,
        analysis.validation.rmse,
        analysis.validation.n_folds()
    );
    println!("data quality: {:.2}", analysis.quality.score);

    for point in &analysis.forecast {
        let date = point
            .date
            .map(|d| d.format("%Y-%m").to_string())
            .unwrap_or_else(|| format!("x={}", point.x));
        println!(
            "forecast {}: {:.1} [{:.1}, {:.1}]",
            date, point.predicted_value, point.lower, point.upper
        );
    }

    // Revenue per sign-up is uncertain; simulate the next quarter's total.
    let expected: f64 = analysis.forecast.iter().map(|p| p.predicted_value).sum();
    let arpu = Uniform::new(18.0, 26.0);
    let revenue = engine
        .simulator()
        .simulate_distribution(&arpu, 10_000, 20)?;
    let ci = revenue.interval(0.95).ok_or("missing 95% interval")?;
    println!(
        "next-quarter revenue: median {:.0}, 95% [{:.0}, {:.0}]",
        expected * revenue.statistics.median,
        expected * ci.lower,
        expected * ci.upper
    );

    Ok(())
}

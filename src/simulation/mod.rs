//! Sampling-based estimation of outcome distributions.
//!
//! # Example
//!
//! ```
//! use metric_analytics::simulation::{MonteCarloConfig, MonteCarloSimulator};
//! use rand::distributions::Uniform;
//!
//! let simulator = MonteCarloSimulator::with_config(MonteCarloConfig::default().with_seed(42));
//! let result = simulator
//!     .simulate_distribution(&Uniform::new(90.0, 110.0), 1_000, 20)
//!     .unwrap();
//!
//! let total: f64 = result.distribution.iter().map(|b| b.probability).sum();
//! assert!((total - 1.0).abs() < 1e-9);
//! ```

mod monte_carlo;

pub use monte_carlo::{
    DistributionBin, MonteCarloConfig, MonteCarloSimulator, Percentiles, SimulationResult,
    SimulationStatistics,
};

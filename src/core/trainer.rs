//! Trainer
//!
//! Full-batch gradient descent for L2-regularized logistic regression on
//! standardized features.
//!
//! Algorithm:
//! 1. Fit population mean/std per column (std 0 → 1), standardize X
//! 2. w ~ N(0, 0.01) from the seeded generator, b = 0
//! 3. Repeat exactly `steps` times:
//!    p = sigmoid(Xn·w + b)
//!    grad_w = Xnᵀ(p − y)/n + l2·w   (no penalty on b)
//!    grad_b = mean(p − y)
//!    w -= lr·grad_w, b -= lr·grad_b
//!
//! No momentum, no decay, no early stopping. Same inputs and seed give
//! bit-identical weights.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::model::{sigmoid, LogisticModel};
use super::standardizer::Standardizer;
use crate::models::config::TrainConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::FeatureVector;
use crate::utils::constants::{INIT_WEIGHT_STD, NUM_FEATURES};

/// Steps between debug loss reports
const LOSS_LOG_EVERY: usize = 200;

/// Logistic regression trainer
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainConfig,
}

impl Trainer {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Fit with a `StdRng` seeded from `config.seed`
    pub fn fit(&self, x: &[FeatureVector], y: &[u8]) -> AppResult<LogisticModel> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.fit_with_rng(x, y, &mut rng)
    }

    /// Fit drawing the initial weights from a caller-supplied generator
    pub fn fit_with_rng<R: Rng + ?Sized>(
        &self,
        x: &[FeatureVector],
        y: &[u8],
        rng: &mut R,
    ) -> AppResult<LogisticModel> {
        validate_training_input(x, y)?;
        validate_config(&self.config)?;
        let cfg = &self.config;

        let scaler = Standardizer::fit(x);
        let xn = scaler.transform(x);
        let yf: Vec<f64> = y.iter().map(|&v| f64::from(v)).collect();
        let n = xn.len() as f64;

        let init = Normal::new(0.0, INIT_WEIGHT_STD).map_err(|e| {
            AppError::new(ErrorCode::Unknown, format!("weight init distribution: {}", e))
        })?;
        let mut w = [0.0f64; NUM_FEATURES];
        for wj in w.iter_mut() {
            *wj = init.sample(rng);
        }
        let mut b = 0.0f64;
        let mut residual = vec![0.0f64; xn.len()];

        info!(
            "🧮 Training logistic model: rows={}, steps={}, lr={}, l2={}",
            xn.len(),
            cfg.steps,
            cfg.learning_rate,
            cfg.l2
        );

        for step in 0..cfg.steps {
            for ((r, row), target) in residual.iter_mut().zip(&xn).zip(&yf) {
                let z = row.iter().zip(&w).map(|(a, c)| a * c).sum::<f64>() + b;
                *r = sigmoid(z) - target;
            }

            let mut grad_w = [0.0f64; NUM_FEATURES];
            for (row, r) in xn.iter().zip(&residual) {
                for (g, v) in grad_w.iter_mut().zip(row) {
                    *g += v * r;
                }
            }
            for (g, wj) in grad_w.iter_mut().zip(&w) {
                *g = *g / n + cfg.l2 * wj;
            }
            let grad_b = residual.iter().sum::<f64>() / n;

            for (wj, g) in w.iter_mut().zip(&grad_w) {
                *wj -= cfg.learning_rate * g;
            }
            b -= cfg.learning_rate * grad_b;

            if step % LOSS_LOG_EVERY == 0 {
                debug!("step {:>5}: log_loss={:.6}", step, log_loss(&residual, &yf));
            }
        }

        info!("✅ Training complete: bias={:.6}", b);

        LogisticModel::from_parts(
            scaler.mean.to_vec(),
            scaler.std.to_vec(),
            w.to_vec(),
            b,
            cfg.threshold,
        )
    }
}

/// Train with the given configuration
pub fn train_logistic_regression(
    x: &[FeatureVector],
    y: &[u8],
    config: TrainConfig,
) -> AppResult<LogisticModel> {
    Trainer::new(config).fit(x, y)
}

fn validate_training_input(x: &[FeatureVector], y: &[u8]) -> AppResult<()> {
    if x.is_empty() {
        return Err(AppError::invalid_input("training matrix is empty"));
    }
    if x.len() != y.len() {
        return Err(AppError::invalid_input(format!(
            "feature rows ({}) and labels ({}) differ in length",
            x.len(),
            y.len()
        )));
    }
    if let Some(bad) = y.iter().find(|&&v| v > 1) {
        return Err(AppError::invalid_input(format!("label {} is not binary", bad)));
    }
    if let Some(i) = x.iter().position(|row| row.iter().any(|v| !v.is_finite())) {
        return Err(AppError::invalid_input(format!(
            "feature row {} contains a non-finite value",
            i
        )));
    }
    Ok(())
}

fn validate_config(cfg: &TrainConfig) -> AppResult<()> {
    if !(0.0..=1.0).contains(&cfg.threshold) {
        return Err(AppError::invalid_input(format!(
            "threshold {} outside [0, 1]",
            cfg.threshold
        )));
    }
    if !cfg.learning_rate.is_finite() || !cfg.l2.is_finite() {
        return Err(AppError::invalid_input(format!(
            "learning_rate {} and l2 {} must be finite",
            cfg.learning_rate, cfg.l2
        )));
    }
    Ok(())
}

/// Mean binary cross-entropy, recovering p from the residual p − y
fn log_loss(residual: &[f64], y: &[f64]) -> f64 {
    const EPS: f64 = 1e-15;
    let total: f64 = residual
        .iter()
        .zip(y)
        .map(|(r, t)| {
            let p = (r + t).clamp(EPS, 1.0 - EPS);
            -(t * p.ln() + (1.0 - t) * (1.0 - p).ln())
        })
        .sum();
    total / residual.len() as f64
}

/// Fit quality on a labeled matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub rows: usize,
    /// Share of rows where predict() matches the label
    pub train_accuracy: f64,
    /// Share of rows labeled as default
    pub default_rate_baseline: f64,
}

/// Accuracy and base rate of `model` on (x, y)
pub fn evaluate(model: &LogisticModel, x: &[FeatureVector], y: &[u8]) -> AppResult<TrainingMetrics> {
    validate_training_input(x, y)?;
    let pred = model.predict(x);
    let correct = pred.iter().zip(y).filter(|(p, t)| p == t).count();
    let defaults = y.iter().filter(|&&t| t == 1).count();
    let n = y.len() as f64;
    Ok(TrainingMetrics {
        rows: y.len(),
        train_accuracy: correct as f64 / n,
        default_rate_baseline: defaults as f64 / n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 100 rows, label = 1 iff credit_score < 500
    fn separable() -> (Vec<FeatureVector>, Vec<u8>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..100 {
            let score = 300.0 + 6.0 * i as f64;
            let income = 300000.0 + 1000.0 * ((i * 37) % 100) as f64;
            let row = [
                income,
                (i % 30) as f64,
                score,
                50000.0,
                200000.0,
                60.0,
                12.0,
                50000.0 / income,
                200000.0 / income,
            ];
            x.push(row);
            y.push(u8::from(score < 500.0));
        }
        (x, y)
    }

    #[test]
    fn test_separable_accuracy() {
        let (x, y) = separable();
        let model = train_logistic_regression(&x, &y, TrainConfig::default()).unwrap();
        let metrics = evaluate(&model, &x, &y).unwrap();
        assert!(metrics.train_accuracy > 0.9, "accuracy {}", metrics.train_accuracy);
        assert_eq!(metrics.rows, 100);
        // credit score pushes default probability down
        assert!(model.weights()[2] < 0.0);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let (x, y) = separable();
        let cfg = TrainConfig::default().with_steps(300);
        let a = train_logistic_regression(&x, &y, cfg).unwrap();
        let b = train_logistic_regression(&x, &y, cfg).unwrap();
        let bits = |m: &LogisticModel| m.weights().iter().map(|w| w.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
        assert_eq!(a.bias().to_bits(), b.bias().to_bits());

        let c = train_logistic_regression(&x, &y, cfg.with_seed(8)).unwrap();
        assert_ne!(bits(&a), bits(&c));
    }

    #[test]
    fn test_zero_steps_keeps_initial_draw() {
        let (x, y) = separable();
        let model = train_logistic_regression(&x, &y, TrainConfig::default().with_steps(0)).unwrap();
        assert_eq!(model.bias(), 0.0);
        assert!(model.weights().iter().all(|w| w.abs() < 0.1));
    }

    #[test]
    fn test_constant_column_std_is_one() {
        let (x, y) = separable();
        let model = train_logistic_regression(&x, &y, TrainConfig::default().with_steps(50)).unwrap();
        // loan_term_months (index 5) is constant 60
        assert_eq!(model.std()[5], 1.0);
        assert_eq!(model.mean()[5], 60.0);
        assert_eq!(model.standardize(&x[0])[5], 0.0);
    }

    #[test]
    fn test_threshold_carried_into_model() {
        let (x, y) = separable();
        let model =
            train_logistic_regression(&x, &y, TrainConfig::default().with_steps(5).with_threshold(0.3))
                .unwrap();
        assert_eq!(model.threshold(), 0.3);
    }

    #[test]
    fn test_rejects_bad_input() {
        let (x, y) = separable();
        let err = train_logistic_regression(&x, &y[..10], TrainConfig::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InputInvalid);

        let err = train_logistic_regression(&[], &[], TrainConfig::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InputInvalid);

        let mut bad_y = y.clone();
        bad_y[0] = 2;
        let err = train_logistic_regression(&x, &bad_y, TrainConfig::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InputInvalid);
    }

    #[test]
    fn test_rejects_bad_config_before_fitting() {
        let (x, y) = separable();
        for threshold in [1.5, -0.1, f64::NAN] {
            let cfg = TrainConfig::default().with_threshold(threshold);
            let err = train_logistic_regression(&x, &y, cfg).unwrap_err();
            assert_eq!(err.code, ErrorCode::InputInvalid);
            assert!(err.message.contains("threshold"));
        }
        let err =
            train_logistic_regression(&x, &y, TrainConfig::default().with_learning_rate(f64::INFINITY))
                .unwrap_err();
        assert_eq!(err.code, ErrorCode::InputInvalid);
    }

    #[test]
    fn test_fits_tiny_dataset_without_floor() {
        let x = vec![[1.0; NUM_FEATURES], [2.0; NUM_FEATURES]];
        let y = vec![0, 1];
        let model = train_logistic_regression(&x, &y, TrainConfig::default()).unwrap();
        let p = model.predict_proba(&x);
        assert!(p[0] < p[1]);
    }

    #[test]
    fn test_injected_rng_matches_seeded_fit() {
        let (x, y) = separable();
        let trainer = Trainer::new(TrainConfig::default().with_steps(20));
        let mut rng = StdRng::seed_from_u64(7);
        let a = trainer.fit_with_rng(&x, &y, &mut rng).unwrap();
        let b = trainer.fit(&x, &y).unwrap();
        assert_eq!(a, b);
    }
}

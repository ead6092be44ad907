//! Multinomial logistic regression over TF-IDF features

use crate::classifier::tfidf::SparseVector;
use crate::error::{Result, RankerError};
use log::debug;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingParams {
    pub max_iter: usize,
    pub learning_rate: f64,
    /// Inverse regularization strength; smaller values regularize more
    pub c: f64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            max_iter: 200,
            learning_rate: 0.5,
            c: 1.0,
        }
    }
}

/// Softmax classifier. `weights[k]` holds the coefficients of `classes[k]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    classes: Vec<String>,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl LogisticRegression {
    /// Fit with full-batch gradient descent on the L2-regularized cross-entropy
    pub fn fit(features: &Array2<f64>, labels: &[String], params: &TrainingParams) -> Result<Self> {
        let (n_samples, n_features) = features.dim();
        if n_samples != labels.len() {
            return Err(RankerError::InvalidInput(format!(
                "{} feature rows for {} labels",
                n_samples,
                labels.len()
            )));
        }

        let classes: Vec<String> = labels.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();
        if classes.len() < 2 {
            return Err(RankerError::DegenerateTraining(format!(
                "At least two distinct labels are required, found {}",
                classes.len()
            )));
        }
        if params.c <= 0.0 {
            return Err(RankerError::Configuration("Regularization C must be positive".to_string()));
        }

        let n_classes = classes.len();
        let mut targets = Array2::<f64>::zeros((n_samples, n_classes));
        for (row, label) in labels.iter().enumerate() {
            if let Ok(k) = classes.binary_search(label) {
                targets[[row, k]] = 1.0;
            }
        }

        let mut weights = Array2::<f64>::zeros((n_features, n_classes));
        let mut intercepts = Array1::<f64>::zeros(n_classes);
        let n = n_samples as f64;
        let penalty = 1.0 / (params.c * n);

        for iteration in 0..params.max_iter {
            let mut logits = features.dot(&weights);
            logits += &intercepts;
            let probabilities = softmax_rows(logits);

            let error = &probabilities - &targets;
            let weight_gradient = features.t().dot(&error) / n + &weights * penalty;
            let intercept_gradient = error.sum_axis(Axis(0)) / n;

            weights.scaled_add(-params.learning_rate, &weight_gradient);
            intercepts.scaled_add(-params.learning_rate, &intercept_gradient);

            if iteration + 1 == params.max_iter {
                let loss = cross_entropy(&probabilities, &targets);
                debug!("Logistic regression finished {} iterations, loss {:.4}", params.max_iter, loss);
            }
        }

        Ok(Self {
            classes,
            weights: weights.t().outer_iter().map(|row| row.to_vec()).collect(),
            intercepts: intercepts.to_vec(),
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Check that the coefficients fit a feature space of `n_features` columns
    pub fn check_shape(&self, n_features: usize) -> Result<()> {
        let n_classes = self.classes.len();
        if n_classes < 2 || self.weights.len() != n_classes || self.intercepts.len() != n_classes {
            return Err(RankerError::ModelUnavailable(format!(
                "Classifier has {} classes, {} weight rows and {} intercepts",
                n_classes,
                self.weights.len(),
                self.intercepts.len()
            )));
        }
        if let Some(row) = self.weights.iter().find(|row| row.len() != n_features) {
            return Err(RankerError::ModelUnavailable(format!(
                "Classifier expects {} features but the vectorizer produces {}",
                row.len(),
                n_features
            )));
        }
        Ok(())
    }

    /// Class probabilities for one feature row, in `classes()` order
    pub fn predict_proba(&self, row: &SparseVector) -> Vec<f64> {
        let logits: Vec<f64> = self
            .weights
            .iter()
            .zip(self.intercepts.iter())
            .map(|(class_weights, intercept)| {
                intercept
                    + row
                        .iter()
                        .filter_map(|(index, value)| class_weights.get(*index).map(|w| w * value))
                        .sum::<f64>()
            })
            .collect();

        softmax(&logits)
    }

    /// Most probable class and its probability; ties go to the first class
    pub fn predict(&self, row: &SparseVector) -> (String, f64) {
        let probabilities = self.predict_proba(row);
        let (best, probability) = probabilities
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (k, &p)| if p > best.1 { (k, p) } else { best });

        (self.classes[best].clone(), probability)
    }
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

fn softmax_rows(mut logits: Array2<f64>) -> Array2<f64> {
    for mut row in logits.outer_iter_mut() {
        let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        row.mapv_inplace(|l| (l - max).exp());
        let total = row.sum();
        row.mapv_inplace(|e| e / total);
    }
    logits
}

fn cross_entropy(probabilities: &Array2<f64>, targets: &Array2<f64>) -> f64 {
    let n = probabilities.nrows().max(1) as f64;
    -probabilities
        .iter()
        .zip(targets.iter())
        .filter(|(_, t)| **t > 0.0)
        .map(|(p, _)| (*p).max(1e-15).ln())
        .sum::<f64>()
        / n
}

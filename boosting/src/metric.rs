use log::warn;
use ndarray::{ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

const EPS: f64 = 1e-15;

/// Evaluation metrics reported by `Booster::eval_set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Auc,
    LogLoss,
    Error,
    MLogLoss,
    MError,
}

impl Metric {
    /// The name the metric is reported under.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Auc => "auc",
            Metric::LogLoss => "logloss",
            Metric::Error => "error",
            Metric::MLogLoss => "mlogloss",
            Metric::MError => "merror",
        }
    }

    pub fn is_multiclass(&self) -> bool {
        matches!(self, Metric::MLogLoss | Metric::MError)
    }

    /// Evaluates transformed predictions against labels.
    ///
    /// # Arguments
    /// * `probs` - A `rows x groups` matrix of probabilities.
    /// * `labels` - One label per row.
    pub fn evaluate(&self, probs: ArrayView2<'_, f64>, labels: ArrayView1<'_, f32>) -> f64 {
        match self {
            Metric::Auc => auc(probs.column(0), labels),
            Metric::LogLoss => mean(probs.column(0).iter().zip(labels).map(|(&p, &y)| {
                let p = p.clamp(EPS, 1.0 - EPS);
                let y = f64::from(y);
                -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
            })),
            Metric::Error => mean(
                probs
                    .column(0)
                    .iter()
                    .zip(labels)
                    .map(|(&p, &y)| if (p > 0.5) != (y > 0.5) { 1.0 } else { 0.0 }),
            ),
            Metric::MLogLoss => mean(probs.axis_iter(Axis(0)).zip(labels).map(|(row, &y)| {
                let p = row.get(y as usize).copied().unwrap_or(0.0);
                -p.clamp(EPS, 1.0 - EPS).ln()
            })),
            Metric::MError => mean(
                probs
                    .axis_iter(Axis(0))
                    .zip(labels)
                    .map(|(row, &y)| if argmax(row) != y as usize { 1.0 } else { 0.0 }),
            ),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

fn argmax(row: ArrayView1<'_, f64>) -> usize {
    let mut best = 0;
    for (i, &p) in row.iter().enumerate() {
        if p > row[best] {
            best = i;
        }
    }

    best
}

/// Area under the ROC curve via the rank-sum statistic, tied scores share their mean rank.
fn auc(scores: ArrayView1<'_, f64>, labels: ArrayView1<'_, f32>) -> f64 {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let positives = labels.iter().filter(|&&y| y > 0.5).count();
    let negatives = labels.len() - positives;

    if positives == 0 || negatives == 0 {
        warn!("auc is undefined on a single-class set, reporting 0.5");
        return 0.5;
    }

    let mut pos_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }

        // Ranks are 1-based, the tie group spans ranks start+1..=end.
        let rank = (start + 1 + end) as f64 / 2.0;
        let tied_positives = order[start..end]
            .iter()
            .filter(|&&i| labels[i] > 0.5)
            .count();
        pos_rank_sum += rank * tied_positives as f64;

        start = end;
    }

    let (p, n) = (positives as f64, negatives as f64);
    (pos_rank_sum - p * (p + 1.0) / 2.0) / (p * n)
}

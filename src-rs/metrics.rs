use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_RECORDS: usize = 1000;

/// One completed request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub success: bool,
    /// Milliseconds.
    pub duration: f64,
    pub provider: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub total_requests: usize,
    pub success_rate: f64,
    pub method_distribution: BTreeMap<String, usize>,
    pub average_duration: f64,
}

/// Bounded FIFO of request records. Appends happen in completion order and
/// the oldest record is dropped once the buffer exceeds its capacity.
pub struct MetricsAggregator {
    capacity: usize,
    records: Mutex<VecDeque<RequestRecord>>,
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::with_capacity(MAX_RECORDS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: Mutex::new(VecDeque::with_capacity(capacity.min(MAX_RECORDS))),
        }
    }

    pub fn record(&self, method: &str, success: bool, duration: f64, provider: Option<&str>) {
        self.push(RequestRecord {
            timestamp: Utc::now(),
            method: method.to_string(),
            success,
            duration,
            provider: provider.map(str::to_string),
        });
    }

    pub fn push(&self, record: RequestRecord) {
        let mut records = match self.records.lock() {
            Ok(lock) => lock,
            Err(poisoned) => poisoned.into_inner(),
        };
        records.push_back(record);
        while records.len() > self.capacity {
            records.pop_front();
        }
    }

    /// Snapshot, oldest first.
    pub fn records(&self) -> Vec<RequestRecord> {
        match self.records.lock() {
            Ok(lock) => lock.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self.records.lock() {
            Ok(lock) => lock.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Summary over the stored records. With no records, `success_rate` and
    /// `average_duration` are both 0.
    pub fn aggregate(&self) -> MetricsSummary {
        let records = self.records();
        let total = records.len();
        let mut method_distribution = BTreeMap::new();
        let mut successes = 0usize;
        let mut duration_sum = 0.0;
        for record in &records {
            *method_distribution.entry(record.method.clone()).or_insert(0) += 1;
            if record.success {
                successes += 1;
            }
            duration_sum += record.duration;
        }

        let (success_rate, average_duration) = if total == 0 {
            (0.0, 0.0)
        } else {
            (successes as f64 / total as f64, duration_sum / total as f64)
        };

        MetricsSummary {
            total_requests: total,
            success_rate,
            method_distribution,
            average_duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_aggregate_is_zero() {
        let metrics = MetricsAggregator::new();
        let summary = metrics.aggregate();
        assert_eq!(summary.total_requests, 0);
        assert_eq!(summary.success_rate, 0.0);
        assert_eq!(summary.average_duration, 0.0);
        assert!(summary.method_distribution.is_empty());
    }

    #[test]
    fn test_aggregate_values() {
        let metrics = MetricsAggregator::new();
        metrics.record("chat", true, 10.0, Some("openai"));
        metrics.record("chat", false, 30.0, Some("google"));
        metrics.record("codeReview", true, 20.0, None);
        metrics.record("chat", true, 40.0, Some("openai"));

        let summary = metrics.aggregate();
        assert_eq!(summary.total_requests, 4);
        assert_eq!(summary.success_rate, 0.75);
        assert_eq!(summary.average_duration, 25.0);
        assert_eq!(summary.method_distribution["chat"], 3);
        assert_eq!(summary.method_distribution["codeReview"], 1);
    }

    #[test]
    fn test_bounded_keeps_most_recent_in_order() {
        let metrics = MetricsAggregator::new();
        for i in 0..1500 {
            metrics.record(&format!("m{}", i), true, i as f64, None);
        }
        let records = metrics.records();
        assert_eq!(records.len(), MAX_RECORDS);
        assert_eq!(records.first().unwrap().method, "m500");
        assert_eq!(records.last().unwrap().method, "m1499");
        for pair in records.windows(2) {
            assert_eq!(pair[1].duration - pair[0].duration, 1.0);
        }
    }

    #[test]
    fn test_small_capacity() {
        let metrics = MetricsAggregator::with_capacity(2);
        metrics.record("a", true, 1.0, None);
        metrics.record("b", true, 1.0, None);
        metrics.record("c", true, 1.0, None);
        let methods: Vec<String> = metrics.records().into_iter().map(|r| r.method).collect();
        assert_eq!(methods, vec!["b", "c"]);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let metrics = MetricsAggregator::new();
        metrics.record("chat", true, 5.0, Some("openai"));
        let value = serde_json::to_value(metrics.aggregate()).unwrap();
        assert_eq!(value["totalRequests"], 1);
        assert_eq!(value["successRate"], 1.0);
        assert_eq!(value["methodDistribution"]["chat"], 1);
        assert_eq!(value["averageDuration"], 5.0);
    }
}

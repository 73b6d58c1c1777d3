use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use crate::error::Result;
use crate::hypercube::HyperCube;
use crate::scores::ScoredPoint;
use crate::sink::{CATEGORY, COMPLEX, EventSink, MESSAGE, SHUFFLE, Tags};

/// Records optimisation events and saves them as CSV
#[derive(Debug)]
pub struct OptimizationRecorder {
    /// Run name (used for CSV filename)
    run_name: String,
    records: Mutex<Vec<OptimizationRecord>>,
}

/// A single recorded line: one point, or one message
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationRecord {
    /// Local time the event was received, RFC 3339
    pub timestamp: String,
    pub category: String,
    pub message: String,
    pub shuffle: Option<usize>,
    pub complex: Option<String>,
    /// Parameter values by name; empty for messages
    pub parameters: Vec<(String, f64)>,
    /// Objective values by name; empty for messages
    pub objectives: Vec<(String, f64)>,
}

impl OptimizationRecord {
    fn from_tags(tags: &Tags) -> Self {
        Self {
            timestamp: Local::now().to_rfc3339(),
            category: tags.get(CATEGORY).unwrap_or_default().to_string(),
            message: tags.get(MESSAGE).unwrap_or_default().to_string(),
            shuffle: tags.get(SHUFFLE).and_then(|s| s.parse().ok()),
            complex: tags.get(COMPLEX).map(str::to_string),
            parameters: Vec::new(),
            objectives: Vec::new(),
        }
    }
}

impl OptimizationRecorder {
    pub fn new(run_name: &str) -> Self {
        Self { run_name: run_name.to_string(), records: Mutex::new(Vec::new()) }
    }

    /// Save all records to `<output_dir>/<run_name>.csv`.
    ///
    /// Columns are the tag fields followed by the parameter and objective names
    /// of the first point recorded; message lines leave those empty.
    pub fn save_to_csv(&self, output_dir: &Path) -> Result<PathBuf> {
        create_dir_all(output_dir)?;
        let filename = output_dir.join(format!("{}.csv", self.run_name));
        let mut writer = csv::Writer::from_path(&filename)?;

        let records = self.records.lock();
        let (param_names, objective_names) = records
            .iter()
            .find(|r| !r.parameters.is_empty() || !r.objectives.is_empty())
            .map(|r| {
                (
                    r.parameters.iter().map(|(n, _)| n.clone()).collect::<Vec<_>>(),
                    r.objectives.iter().map(|(n, _)| n.clone()).collect::<Vec<_>>(),
                )
            })
            .unwrap_or_default();

        let mut header: Vec<String> =
            ["timestamp", "category", "message", "shuffle", "complex"].iter().map(|s| s.to_string()).collect();
        header.extend(param_names.iter().cloned());
        header.extend(objective_names.iter().cloned());
        writer.write_record(&header)?;

        let lookup = |values: &[(String, f64)], name: &str| {
            values.iter().find(|(n, _)| n == name).map(|(_, v)| format!("{:.16}", v)).unwrap_or_default()
        };
        for r in records.iter() {
            let mut row = vec![
                r.timestamp.clone(),
                r.category.clone(),
                r.message.clone(),
                r.shuffle.map(|s| s.to_string()).unwrap_or_default(),
                r.complex.clone().unwrap_or_default(),
            ];
            row.extend(param_names.iter().map(|n| lookup(&r.parameters, n)));
            row.extend(objective_names.iter().map(|n| lookup(&r.objectives, n)));
            writer.write_record(&row)?;
        }
        writer.flush()?;
        Ok(filename)
    }

    /// Get a copy of all records
    pub fn get_records(&self) -> Vec<OptimizationRecord> {
        self.records.lock().clone()
    }

    pub fn num_records(&self) -> usize {
        self.records.lock().len()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }

    /// Lowest first objective recorded so far, with its parameter values
    pub fn get_best_solution(&self) -> Option<(Vec<(String, f64)>, f64)> {
        self.records
            .lock()
            .iter()
            .filter_map(|r| r.objectives.first().map(|(_, v)| (r, *v)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(r, v)| (r.parameters.clone(), v))
    }
}

impl<T: HyperCube> EventSink<T> for OptimizationRecorder {
    fn write_scores(&self, scores: &[ScoredPoint<T>], tags: &Tags) {
        let mut records = self.records.lock();
        for s in scores {
            let mut record = OptimizationRecord::from_tags(tags);
            let point = s.point();
            record.parameters = point
                .variable_names()
                .into_iter()
                .filter_map(|n| point.value(&n).ok().map(|v| (n, v)))
                .collect();
            record.objectives = s.scores().iter().map(|o| (o.name.clone(), o.value)).collect();
            records.push(record);
        }
    }

    fn write_message(&self, message: &str, tags: &Tags) {
        let mut record = OptimizationRecord::from_tags(tags);
        record.message = message.to_string();
        self.records.lock().push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypercube::ParameterSet;

    fn point(x: f64) -> ScoredPoint<ParameterSet> {
        let p = ParameterSet::new().with_variable("x0", x, -5.0, 5.0).unwrap();
        ScoredPoint::single(p, "sse", x * x, false)
    }

    #[test]
    fn test_records_points_and_messages() {
        let rec = OptimizationRecorder::new("unit");
        EventSink::<ParameterSet>::write_message(&rec, "hello", &Tags::category("Log").with(SHUFFLE, 2));
        rec.write_scores(&[point(1.0), point(-0.5)], &Tags::category("Population").with(COMPLEX, "c1"));
        assert_eq!(rec.num_records(), 3);

        let records = rec.get_records();
        assert_eq!(records[0].message, "hello");
        assert_eq!(records[0].shuffle, Some(2));
        assert_eq!(records[1].complex.as_deref(), Some("c1"));
        assert_eq!(records[2].parameters, vec![("x0".to_string(), -0.5)]);

        let (best_params, best) = rec.get_best_solution().unwrap();
        assert_eq!(best, 0.25);
        assert_eq!(best_params[0].1, -0.5);

        rec.clear();
        assert_eq!(rec.num_records(), 0);
        assert!(rec.get_best_solution().is_none());
    }
}

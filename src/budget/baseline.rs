//! Per-instance exact-solver baseline times.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::info;

use super::ConfigError;

/// Summary of the baselines in a table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineStats {
    /// Number of instances.
    pub count: usize,
    /// Smallest baseline in seconds.
    pub min: f64,
    /// Largest baseline in seconds.
    pub max: f64,
    /// Mean baseline in seconds.
    pub mean: f64,
}

/// Time the exact solver needs to solve each instance on its own.
///
/// Read from delimited text whose first row is a header and whose rows start
/// with `instance_name, baseline_seconds`. Extra columns are ignored, and
/// rows with fewer than two fields are skipped.
///
/// # Examples
///
/// ```
/// use pdp_gp::budget::BaselineTable;
///
/// let text = "instance,seconds,status\nA-n10,12.5,optimal\nA-n12,40,optimal\n";
/// let table = BaselineTable::from_reader(text.as_bytes(), "inline").expect("valid");
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.get("A-n10"), Some(12.5));
/// assert_eq!(table.get("missing"), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineTable {
    entries: HashMap<String, f64>,
}

impl BaselineTable {
    /// Loads a table from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), &path.display().to_string())
    }

    /// Loads a table from any reader; `source` names it in errors and logs.
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self, ConfigError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = HashMap::new();
        for record in reader.records() {
            let record = record.map_err(|error| ConfigError::Csv {
                source: source.to_string(),
                error,
            })?;
            if record.len() < 2 || record[0].is_empty() {
                continue;
            }
            let line = record.position().map_or(0, |p| p.line());
            let seconds = parse_seconds(&record[1]).ok_or_else(|| ConfigError::MalformedBaseline {
                source: source.to_string(),
                line,
                value: record[1].to_string(),
            })?;
            entries.insert(record[0].to_string(), seconds);
        }
        Self::build(entries, source)
    }

    /// Builds a table from `(name, seconds)` pairs.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut map = HashMap::new();
        for (line, (name, seconds)) in entries.into_iter().enumerate() {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(ConfigError::MalformedBaseline {
                    source: "entries".to_string(),
                    line: line as u64 + 1,
                    value: seconds.to_string(),
                });
            }
            map.insert(name.into(), seconds);
        }
        Self::build(map, "entries")
    }

    fn build(entries: HashMap<String, f64>, source: &str) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyBaseline {
                source: source.to_string(),
            });
        }
        let table = Self { entries };
        let stats = table.stats();
        info!(
            source,
            instances = stats.count,
            min = stats.min,
            max = stats.max,
            mean = stats.mean,
            "loaded baseline table"
        );
        Ok(table)
    }

    /// Baseline seconds for `instance`.
    pub fn get(&self, instance: &str) -> Option<f64> {
        self.entries.get(instance).copied()
    }

    /// Number of instances in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false` for a successfully loaded table.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(instance, seconds)` in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Count, min, max, and mean of the baselines.
    pub fn stats(&self) -> BaselineStats {
        let count = self.entries.len();
        let (min, max, sum) = self.entries.values().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(lo, hi, sum), &v| (lo.min(v), hi.max(v), sum + v),
        );
        if count == 0 {
            return BaselineStats {
                count,
                min: 0.0,
                max: 0.0,
                mean: 0.0,
            };
        }
        BaselineStats {
            count,
            min,
            max,
            mean: sum / count as f64,
        }
    }
}

fn parse_seconds(raw: &str) -> Option<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s >= 0.0)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_skips_header_and_short_rows() {
        let text = "name,T_base\nP1, 3.5\nlonely\nP2,10,extra,columns\n";
        let table = BaselineTable::from_reader(text.as_bytes(), "t").expect("valid");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("P1"), Some(3.5));
        assert_eq!(table.get("P2"), Some(10.0));
        assert_eq!(table.get("name"), None);
    }

    #[test]
    fn test_header_only_is_empty() {
        let err = BaselineTable::from_reader("name,seconds\n".as_bytes(), "hdr")
            .expect_err("empty");
        assert!(matches!(err, ConfigError::EmptyBaseline { .. }));
        assert!(err.to_string().contains("hdr"));
    }

    #[test]
    fn test_malformed_seconds() {
        let text = "name,seconds\nP1,1.0\nP2,fast\n";
        match BaselineTable::from_reader(text.as_bytes(), "bad") {
            Err(ConfigError::MalformedBaseline { line, value, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(value, "fast");
            }
            other => panic!("expected malformed baseline, got {other:?}"),
        }
        assert!(BaselineTable::from_reader("n,s\nP,-1\n".as_bytes(), "neg").is_err());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "instance,seconds").expect("write");
        writeln!(file, "X-n5,2").expect("write");
        writeln!(file, "X-n7,6").expect("write");
        let table = BaselineTable::from_path(file.path()).expect("valid");
        let stats = table.stats();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 6.0);
        assert!((stats.mean - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nope.csv");
        let err = BaselineTable::from_path(&path).expect_err("missing");
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("nope.csv"));
    }

    #[test]
    fn test_from_entries() {
        let table = BaselineTable::from_entries([("a", 1.0), ("b", 2.0)]).expect("valid");
        assert_eq!(table.iter().count(), 2);
        assert!(!table.is_empty());
        assert!(BaselineTable::from_entries(Vec::<(String, f64)>::new()).is_err());
        assert!(BaselineTable::from_entries([("a", f64::NAN)]).is_err());
    }
}

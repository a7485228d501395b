use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::io::Read;
use std::path::Path;

/// Long-form tabular data: named columns, one row per observation.
///
/// Values are kept as strings and parsed as numbers where a statistic or
/// scale needs them; this lets one table carry both categorical and
/// continuous variables. The plotting model never mutates a dataset —
/// wide-to-long reshaping is a pre-processing step performed before a
/// `Dataset` is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Read a dataset from CSV with a header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .context("Failed to read CSV headers")?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.is_empty() {
            return Err(anyhow!("CSV input has no header row"));
        }

        let mut rows = Vec::new();
        for (idx, record) in csv_reader.records().enumerate() {
            let record = record.with_context(|| format!("Failed to read CSV row {}", idx + 1))?;
            let row: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();
            if row.len() != headers.len() {
                return Err(anyhow!(
                    "CSV row {} has {} fields, expected {}",
                    idx + 1,
                    row.len(),
                    headers.len()
                ));
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(anyhow!("CSV input has no data rows"));
        }

        Ok(Self { headers, rows })
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())
            .with_context(|| format!("Failed to open {}", path.as_ref().display()))?;
        Self::from_csv_reader(file)
    }

    /// Create a dataset from a JSON array of objects.
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        if array.is_empty() {
            return Err(anyhow!("Input data array is empty"));
        }

        // Headers come from the first object, in key order
        let first_obj = array[0]
            .as_object()
            .ok_or_else(|| anyhow!("Items in array must be objects"))?;
        let headers: Vec<String> = first_obj.keys().cloned().collect();

        let mut rows = Vec::new();
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?;

            let mut row = Vec::new();
            for header in &headers {
                let val_str = match obj.get(header) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    Some(Value::Null) | None => String::new(),
                    _ => return Err(anyhow!("Unsupported value type for field '{}'", header)),
                };
                row.push(val_str);
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column index by name, case-insensitive.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// All values of a column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// Sorted distinct values of a column.
    pub fn distinct(&self, name: &str) -> Option<Vec<String>> {
        let idx = self.column_index(name)?;
        let mut values: Vec<String> = self.rows.iter().map(|r| r[idx].clone()).collect();
        values.sort();
        values.dedup();
        Some(values)
    }

    /// A new dataset keeping only the rows for which `keep` returns true.
    pub fn filter<F: Fn(&[String]) -> bool>(&self, keep: F) -> Dataset {
        Dataset {
            headers: self.headers.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_csv_reader() {
        let csv = "species,petal\nsetosa,0.2\nversicolor,1.3\n";
        let data = Dataset::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(data.headers(), &["species", "petal"]);
        assert_eq!(data.len(), 2);
        assert_eq!(data.rows()[1][1], "1.3");
    }

    #[test]
    fn test_from_csv_ragged_row() {
        let csv = "a,b\n1\n";
        assert!(Dataset::from_csv_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_from_csv_empty() {
        let csv = "a,b\n";
        assert!(Dataset::from_csv_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_from_json() {
        let value = json!([
            {"conc": 95, "uptake": 16.0, "plant": "Qn1"},
            {"conc": 175, "uptake": 30.4, "plant": "Qn1"},
        ]);
        let data = Dataset::from_json(&value).unwrap();
        assert_eq!(data.len(), 2);
        assert!(data.has_column("uptake"));
        assert_eq!(data.column("plant").unwrap(), vec!["Qn1", "Qn1"]);
    }

    #[test]
    fn test_column_lookup_case_insensitive() {
        let data = Dataset::new(
            vec!["Petal.Width".to_string()],
            vec![vec!["0.2".to_string()]],
        );
        assert_eq!(data.column_index("petal.width"), Some(0));
        assert!(!data.has_column("sepal.width"));
    }

    #[test]
    fn test_distinct_sorted() {
        let data = Dataset::new(
            vec!["g".to_string()],
            vec![
                vec!["b".to_string()],
                vec!["a".to_string()],
                vec!["b".to_string()],
            ],
        );
        assert_eq!(data.distinct("g").unwrap(), vec!["a", "b"]);
    }
}

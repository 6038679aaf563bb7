//! # CSV
//!
//! $$
//! \text{text rows } \leftrightarrow U\in(0,1]^{N\times d}
//! $$
//!
//! Plain delimited text for observation matrices. Every row must have the
//! same number of fields.
use std::fs;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use ndarray::Array2;

/// Reads a matrix from `path`, one row per line, fields split on `sep`.
/// Blank lines are ignored; `header` skips the first line.
pub fn load_csv<P: AsRef<Path>>(path: P, sep: char, header: bool) -> Result<Array2<f64>> {
  let path = path.as_ref();
  let file = File::open(path).with_context(|| format!("failed to open {path:?}"))?;

  let mut values = Vec::new();
  let mut ncols = None;
  let mut nrows = 0;

  for (index, line) in BufReader::new(file).lines().enumerate() {
    let line = line.with_context(|| format!("failed to read line {} of {path:?}", index + 1))?;
    if (header && index == 0) || line.trim().is_empty() {
      continue;
    }

    let before = values.len();
    for field in line.split(sep) {
      let field = field.trim();
      let value = field
        .parse::<f64>()
        .with_context(|| format!("line {}: cannot parse '{field}' as a number", index + 1))?;
      values.push(value);
    }

    let width = values.len() - before;
    match ncols {
      None => ncols = Some(width),
      Some(expected) if expected != width => {
        bail!(
          "line {}: expected {expected} fields, found {width}",
          index + 1
        );
      }
      Some(_) => {}
    }
    nrows += 1;
  }

  let Some(ncols) = ncols else {
    bail!("{path:?} contains no data rows");
  };

  Array2::from_shape_vec((nrows, ncols), values)
    .with_context(|| format!("failed to shape {nrows}x{ncols} matrix from {path:?}"))
}

/// Writes `data` to `path` with 10 decimals per value.
pub fn save_csv<P: AsRef<Path>>(data: &Array2<f64>, path: P, sep: char) -> Result<()> {
  let path = path.as_ref();
  if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
    fs::create_dir_all(dir).with_context(|| format!("failed to create directory {dir:?}"))?;
  }

  let file = File::create(path).with_context(|| format!("failed to create {path:?}"))?;
  let mut writer = BufWriter::new(file);
  let sep = sep.to_string();

  for row in data.rows() {
    let line = row
      .iter()
      .map(|x| format!("{x:.10}"))
      .collect::<Vec<_>>()
      .join(&sep);
    writeln!(writer, "{line}").with_context(|| format!("failed to write {path:?}"))?;
  }

  writer
    .flush()
    .with_context(|| format!("failed to flush {path:?}"))
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;
  use tempfile::tempdir;

  use super::*;

  #[test]
  fn save_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("sample.csv");
    let data = array![[0.1, 0.25, 0.999], [0.5, 0.123456789012, 1.0]];

    save_csv(&data, &path, ',').unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("0.1000000000,0.2500000000,0.9990000000\n"));

    let loaded = load_csv(&path, ',', false).unwrap();
    assert_eq!(loaded.dim(), (2, 3));
    for (a, b) in loaded.iter().zip(data.iter()) {
      assert_abs_diff_eq!(a, b, epsilon = 1e-10);
    }
  }

  #[test]
  fn header_and_blank_lines() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.txt");
    fs::write(&path, "u;v\n0.2; 0.3\n\n0.4;0.5\n").unwrap();

    let loaded = load_csv(&path, ';', true).unwrap();
    assert_eq!(loaded, array![[0.2, 0.3], [0.4, 0.5]]);
  }

  #[test]
  fn ragged_rows_report_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ragged.csv");
    fs::write(&path, "0.1,0.2\n0.3\n").unwrap();

    let err = load_csv(&path, ',', false).unwrap_err();
    assert!(err.to_string().contains("line 2"), "{err}");
  }

  #[test]
  fn bad_numbers_and_missing_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "0.1,abc\n").unwrap();
    let err = load_csv(&path, ',', false).unwrap_err();
    assert!(err.to_string().contains("'abc'"), "{err}");

    assert!(load_csv(dir.path().join("missing.csv"), ',', false).is_err());

    let empty = dir.path().join("empty.csv");
    fs::write(&empty, "u,v\n").unwrap();
    assert!(load_csv(&empty, ',', true).is_err());
  }
}

//! # Visualization
//!
//! $$
//! \{u_j^{(n)}\}_{n=1}^N \mapsto \text{histogram}
//! $$
//!
//! Quick look at the margins of a sample: a uniform histogram per column is the
//! first sanity check of a copula draw.
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use ndarray::Array2;
use plotly::Histogram;
use plotly::Layout;
use plotly::Plot;
use plotly::layout::Axis;

/// Renders a histogram of `values` with `bins` bins into the HTML file `path`.
pub fn plot_histogram<P: AsRef<Path>>(values: &[f64], bins: usize, title: &str, path: P) -> Result<()> {
  let path = path.as_ref();
  let trace = Histogram::new(values.to_vec())
    .n_bins_x(bins)
    .name(title)
    .opacity(0.8);

  let mut plot = Plot::new();
  plot.add_trace(trace);
  plot.set_layout(
    Layout::new()
      .title(title)
      .x_axis(Axis::new().title("value"))
      .y_axis(Axis::new().title("count")),
  );

  if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
    fs::create_dir_all(dir).with_context(|| format!("failed to create directory {dir:?}"))?;
  }
  fs::write(path, plot.to_html()).with_context(|| format!("failed to write {path:?}"))
}

/// One histogram per column of `data`, written as `margin_<j>.html` under
/// `dir`. Returns the files written.
pub fn plot_margins<P: AsRef<Path>>(data: &Array2<f64>, bins: usize, dir: P) -> Result<Vec<PathBuf>> {
  let dir = dir.as_ref();
  let mut written = Vec::with_capacity(data.ncols());

  for (j, column) in data.columns().into_iter().enumerate() {
    let path = dir.join(format!("margin_{}.html", j + 1));
    plot_histogram(&column.to_vec(), bins, &format!("Margin {}", j + 1), &path)?;
    written.push(path);
  }

  Ok(written)
}

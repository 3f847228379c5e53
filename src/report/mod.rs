//! Result files.
//!
//! One file per sweep, named after the wall-clock millis at creation and the
//! group parameters, e.g. `1718000000000-group[p=..,q=..,r=..,h=..,g=..].csv`.
//! CSV files start with a header row; JSON output is one object per line.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{OutputConfig, OutputFormat};
use crate::error::Result;
use crate::group::GroupParams;
use crate::sweep::RunRecord;

/// CSV header, one column per [`RunRecord`] field.
pub const CSV_HEADER: &str = "n,m,d_avg,l,n_cyc,c_edge,n_msg,n_for,n_echo,n_pub,n_brd,t";

impl RunRecord {
    /// Render as a CSV row matching [`CSV_HEADER`].
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{:.6},{},{},{},{},{},{},{},{},{}",
            self.n,
            self.edge_param,
            self.avg_degree,
            self.ttl,
            self.distinct_cycles,
            self.cycle_edge_count,
            self.total_messages,
            self.forward_count,
            self.backward_count,
            self.publish_count,
            self.broadcast_count,
            self.elapsed_millis,
        )
    }
}

/// File name for a report created at `millis` under `params`.
pub fn report_file_name(millis: i64, params: &GroupParams, format: OutputFormat) -> String {
    let extension = match format {
        OutputFormat::Csv => "csv",
        OutputFormat::Json => "jsonl",
    };
    let group = params.to_string().replace(' ', "");
    format!("{millis}-{group}.{extension}")
}

/// Appends [`RunRecord`]s to a report file.
pub struct ReportWriter {
    path: PathBuf,
    format: OutputFormat,
    out: BufWriter<File>,
    rows: usize,
}

impl ReportWriter {
    /// Create a timestamped report under `config.dir`, creating the directory
    /// if needed.
    pub fn create(config: &OutputConfig, params: &GroupParams) -> Result<Self> {
        fs::create_dir_all(&config.dir)?;
        let millis = chrono::Utc::now().timestamp_millis();
        let path = config
            .dir
            .join(report_file_name(millis, params, config.format));
        Self::create_at(path, config.format)
    }

    /// Create (or truncate) a report at an explicit path.
    pub fn create_at(path: impl Into<PathBuf>, format: OutputFormat) -> Result<Self> {
        let path = path.into();
        let mut out = BufWriter::new(File::create(&path)?);
        if format == OutputFormat::Csv {
            writeln!(out, "{CSV_HEADER}")?;
        }
        tracing::info!(path = %path.display(), ?format, "report opened");
        Ok(Self {
            path,
            format,
            out,
            rows: 0,
        })
    }

    /// Append one record. Rows are flushed so a crashed sweep keeps its
    /// finished configurations.
    pub fn write(&mut self, record: &RunRecord) -> Result<()> {
        match self.format {
            OutputFormat::Csv => writeln!(self.out, "{}", record.to_csv_row())?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, record)?;
                writeln!(self.out)?;
            },
        }
        self.out.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Report location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records written so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and return the report path.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.out.flush()?;
        tracing::debug!(path = %self.path.display(), rows = self.rows, "report closed");
        Ok(self.path)
    }
}

use {
    crate::download::Downloader,
    crate::error::{FetchError, TableError},
    crate::table::{SourceRow, TableFormat},
    indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle},
    log::{error, info, warn},
    sheetdl_engines::utils::file_system,
    std::fmt,
    std::path::{Path, PathBuf},
};

pub mod config;
pub mod download;
pub mod error;
pub mod placement;
pub mod remux;
pub mod table;

#[cfg(test)]
mod testing;

/// Outcome of downloading the rows of one table.
#[derive(Debug, Default)]
pub struct TableReport {
    pub downloaded: Vec<PathBuf>,
    pub failed: Vec<(SourceRow, FetchError)>,
}

/// Totals for a whole run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub tables: usize,
    pub tables_skipped: usize,
    /// Rows dropped for an empty `link` or `file`.
    pub rows_skipped: usize,
    pub downloaded: usize,
    pub failed: usize,
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} table(s), {} skipped; {} downloaded, {} failed, {} incomplete row(s) ignored",
            self.tables, self.tables_skipped, self.downloaded, self.failed, self.rows_skipped
        )
    }
}

/// Reads tables and downloads their rows, one row at a time.
pub struct Pipeline {
    downloader: Downloader,
    format: TableFormat,
    progress: MultiProgress,
}

impl Pipeline {
    pub fn new(downloader: Downloader, format: TableFormat) -> Self {
        Self {
            downloader,
            format,
            progress: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
        }
    }

    /// Draws a progress bar per table on `progress`.
    pub fn with_progress(mut self, progress: MultiProgress) -> Self {
        self.progress = progress;
        self
    }

    /// Processes every table in order.
    ///
    /// An unreadable or invalid table is skipped, a row that cannot be
    /// downloaded is skipped; neither stops the run.
    pub async fn run(&self, tables: &[PathBuf]) -> BatchReport {
        let mut report = BatchReport {
            tables: tables.len(),
            ..BatchReport::default()
        };

        if let Err(e) = file_system::create_dir(self.downloader.output_dir()) {
            error!(
                "Could not create output directory {}: {}",
                self.downloader.output_dir().display(),
                e
            );
            report.tables_skipped = tables.len();
            return report;
        }

        for path in tables {
            let (rows, skipped) = match self.ingest(path).await {
                Ok(ingested) => ingested,
                Err(e) => {
                    warn!("Skipping invalid table {}: {}", path.display(), e);
                    report.tables_skipped += 1;
                    continue;
                }
            };

            info!("Starting downloads for {} ({} rows)", path.display(), rows.len());
            let table_report = self.download_rows(&rows).await;

            report.rows_skipped += skipped;
            report.downloaded += table_report.downloaded.len();
            report.failed += table_report.failed.len();
        }

        report
    }

    /// Reads, parses and validates one table.
    ///
    /// Returns its usable rows and the number of rows dropped for an empty field.
    ///
    /// # Errors
    ///
    /// Any [`TableError`]; the table should be skipped.
    pub async fn ingest(&self, path: &Path) -> Result<(Vec<SourceRow>, usize), TableError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let table = table::load(&raw, &self.format)?;
        let rows = table.source_rows();
        let skipped = table.rows.len() - rows.len();

        Ok((rows, skipped))
    }

    /// Downloads rows in order, each finished and placed before the next starts.
    pub async fn download_rows(&self, rows: &[SourceRow]) -> TableReport {
        let bar = self.progress.add(ProgressBar::new(rows.len() as u64));
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let mut report = TableReport::default();
        for row in rows {
            bar.set_message(row.filename.clone());
            match self.downloader.download(row).await {
                Ok(path) => report.downloaded.push(path),
                Err(e) => {
                    error!("Error downloading {} -> {}: {}", row.url, row.filename, e);
                    report.failed.push((row.clone(), e));
                }
            }
            bar.inc(1);
        }

        bar.finish_and_clear();
        self.progress.remove(&bar);
        report
    }
}

/// The `*.csv` files directly inside `dir`, sorted by name.
pub async fn discover_tables(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut tables = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file()
            && path.extension().and_then(|ext| ext.to_str()) == Some("csv")
        {
            tables.push(path);
        }
    }

    tables.sort();
    Ok(tables)
}

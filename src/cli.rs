use clap::Parser;
use std::path::Path;

use crate::config::DEFAULT_WINDOW_SIZE;

#[derive(Parser, Debug)]
#[command(name = "mzrange")]
#[command(version)]
#[command(about = "Fetch single spectra from remote mzML files using HTTP Range requests", long_about = None)]
#[command(after_help = "Examples:\n  \
  mzrange mzspec:ZENODO-10211590:D141_POS.mzML:scan:422     save scan 422 to D141_POS.scan422.mzML\n  \
  mzrange -p 10211590 -f D141_POS.mzML 422 | less          send scan 422 into less\n  \
  mzrange -l 10211590                                     list mzML files of a Zenodo record\n  \
  mzrange ./data -f run.mzML 17                           read from a local directory")]
pub struct Cli {
    /// USI, Zenodo record id, or local directory
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Scan number (default: taken from the USI)
    #[arg(value_name = "SCAN")]
    pub scan: Option<String>,

    /// mzML file within the repository
    #[arg(short = 'f', value_name = "FILE")]
    pub file: Option<String>,

    /// List mzML files and exit
    #[arg(short = 'l')]
    pub list: bool,

    /// Capture the whole index instead of stopping at the requested scan
    #[arg(long)]
    pub full: bool,

    /// Write the scan to stdout, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Write the scan into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Never overwrite existing files
    #[arg(short = 'n')]
    pub never_overwrite: bool,

    /// Trailer probe window in bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_WINDOW_SIZE)]
    pub window: u64,

    /// Retries for timeouts and server errors
    #[arg(long, value_name = "N", default_value_t = 3)]
    pub retries: u32,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,

    /// Log filter, e.g. "info" or "mzrange=debug"
    #[arg(long, value_name = "FILTER", default_value = "warn")]
    pub log_level: String,

    /// Quiet mode
    #[arg(short = 'q')]
    pub quiet: bool,
}

impl Cli {
    pub fn is_usi(&self) -> bool {
        self.source.starts_with("mzspec:")
    }

    pub fn is_local_dir(&self) -> bool {
        Path::new(&self.source).is_dir()
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet || self.pipe
    }
}

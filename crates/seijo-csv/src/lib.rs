pub mod codec;
pub mod download;

pub use codec::{bank_to_csv, from_csv, from_csv_with, parse_csv_line, to_csv, BOM};
pub use download::{download_text, export_bank, CsvConfig, Downloader, FileDownloader};

//! Gzip compression of finished output tables
//!

use std::fs::File;
use std::io::{self, BufReader, BufWriter};

use camino::{Utf8Path, Utf8PathBuf};
use flate2::{Compression, write::GzEncoder};
use log::info;

use crate::errors::{CombineError, CombineResult};
use crate::filenames::gzip_path;

/// Compress one file to `<filename>.gz` and remove the original
fn compress_file(filename: &Utf8Path) -> CombineResult<Utf8PathBuf> {
    let gz_filename = gzip_path(filename);
    info!("Compressing output table to file: '{gz_filename}'");

    let input = File::open(filename).map_err(|e| {
        CombineError::io(
            format!("Unable to open file for compression: '{filename}'"),
            e,
        )
    })?;
    let output = File::create(&gz_filename).map_err(|e| {
        CombineError::io(format!("Unable to create compressed file: '{gz_filename}'"), e)
    })?;

    let mut encoder = GzEncoder::new(BufWriter::new(output), Compression::default());
    io::copy(&mut BufReader::new(input), &mut encoder)
        .and_then(|_| encoder.finish())
        .and_then(|mut writer| io::Write::flush(&mut writer))
        .map_err(|e| {
            CombineError::io(
                format!("Unable to write compressed file: '{gz_filename}'"),
                e,
            )
        })?;

    std::fs::remove_file(filename).map_err(|e| {
        CombineError::io(format!("Unable to remove uncompressed file: '{filename}'"), e)
    })?;
    Ok(gz_filename)
}

/// Compress every listed output, returning the compressed filenames in the same order
pub fn compress_outputs(filenames: &[Utf8PathBuf]) -> CombineResult<Vec<Utf8PathBuf>> {
    filenames.iter().map(|x| compress_file(x)).collect()
}

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

pub fn open_lines(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let mut reader = BufReader::new(File::open(path)?);
    if is_gzip(reader.fill_buf()?) {
        debug!("Reading gzip database {:?}", path);
        Ok(Box::new(BufReader::new(GzDecoder::new(reader))))
    } else {
        debug!("Reading plain database {:?}", path);
        Ok(Box::new(reader))
    }
}

fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

use crate::{Result, SystemsError};
use archmap_protocol::{FileRecord, ScanData};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Parse scan data produced by the tree walker.
///
/// Unlike the persisted config, malformed scan input is fatal.
pub fn read_scan_data(reader: impl Read) -> Result<ScanData> {
    let mut scan: ScanData = serde_json::from_reader(reader)?;
    if let Some(index) = scan.files.iter().position(|f| f.path.trim().is_empty()) {
        return Err(SystemsError::InvalidInput(format!(
            "file record #{index} has an empty path"
        )));
    }
    scan.files = scan
        .files
        .into_iter()
        .map(FileRecord::with_derived_fields)
        .collect();
    Ok(scan)
}

pub fn load_scan_data(path: &Path) -> Result<ScanData> {
    let file = File::open(path).map_err(|err| {
        SystemsError::InvalidInput(format!("cannot read {}: {err}", path.display()))
    })?;
    read_scan_data(BufReader::new(file))
}

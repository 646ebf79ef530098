use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{CloseApproach, NearEarthObject, parse_timestamp};

// ---------------------------------------------------------------------------
// Object source (CSV)
// ---------------------------------------------------------------------------

/// Required object columns, looked up by header name.
const NEO_COLUMNS: [&str; 4] = ["pdes", "name", "diameter", "pha"];

/// Load near-Earth objects from a CSV file with a header row.
///
/// Only `pdes`, `name`, `diameter` and `pha` are read; any other columns are
/// ignored. Objects are returned in file order.
pub fn load_neos(path: &Path) -> Result<Vec<NearEarthObject>> {
    let file = File::open(path).with_context(|| format!("opening NEO file {}", path.display()))?;
    let neos = load_neos_from_reader(file)
        .with_context(|| format!("loading NEO file {}", path.display()))?;
    log::info!("loaded {} near-Earth objects from {}", neos.len(), path.display());
    Ok(neos)
}

/// Same as [`load_neos`] but reads from any byte source.
pub fn load_neos_from_reader<R: Read>(source: R) -> Result<Vec<NearEarthObject>> {
    let mut reader = csv::Reader::from_reader(source);
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let mut idx = [0usize; 4];
    for (slot, col) in idx.iter_mut().zip(NEO_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim() == col)
            .with_context(|| format!("CSV missing '{col}' column"))?;
    }
    let [pdes_idx, name_idx, diameter_idx, pha_idx] = idx;

    let mut neos = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let field = |i: usize| record.get(i).unwrap_or("");

        let pdes = field(pdes_idx);
        if pdes.trim().is_empty() {
            bail!("CSV row {row_no}: empty designation");
        }
        neos.push(NearEarthObject::new(
            pdes,
            field(name_idx),
            field(diameter_idx),
            field(pha_idx),
        ));
    }
    Ok(neos)
}

// ---------------------------------------------------------------------------
// Approach source (JSON)
// ---------------------------------------------------------------------------

/// Field positions inside each close-approach record.
const DES_POS: usize = 0;
const TIME_POS: usize = 3;
const DIST_POS: usize = 4;
const V_REL_POS: usize = 7;

/// Expected JSON layout (the SBDB close-approach API response):
///
/// ```json
/// {
///   "fields": ["des", "orbit_id", "jd", "cd", "dist", "dist_min", "dist_max", "v_rel", ...],
///   "data": [
///     ["170903", "105", "2415020.507669610", "1900-Jan-01 00:11", "0.0921795123769547", ...],
///     ...
///   ]
/// }
/// ```
#[derive(Debug, Deserialize)]
struct CadDocument {
    data: Vec<Vec<JsonValue>>,
}

/// Load close approaches from a JSON file. Approaches are returned in file
/// order and are not yet linked to any object.
pub fn load_approaches(path: &Path) -> Result<Vec<CloseApproach>> {
    let file = File::open(path)
        .with_context(|| format!("opening close-approach file {}", path.display()))?;
    let approaches = load_approaches_from_reader(BufReader::new(file))
        .with_context(|| format!("loading close-approach file {}", path.display()))?;
    log::info!("loaded {} close approaches from {}", approaches.len(), path.display());
    Ok(approaches)
}

/// Same as [`load_approaches`] but reads from any byte source.
pub fn load_approaches_from_reader<R: Read>(source: R) -> Result<Vec<CloseApproach>> {
    let doc: CadDocument =
        serde_json::from_reader(source).context("parsing close-approach JSON")?;

    doc.data
        .iter()
        .enumerate()
        .map(|(row, record)| parse_approach(row, record))
        .collect()
}

fn parse_approach(row: usize, record: &[JsonValue]) -> Result<CloseApproach> {
    if record.len() <= V_REL_POS {
        bail!(
            "Record {row}: expected at least {} fields, found {}",
            V_REL_POS + 1,
            record.len()
        );
    }

    let des = json_to_text(&record[DES_POS]);
    if des.trim().is_empty() {
        bail!("Record {row}: missing designation");
    }
    let cd = json_to_text(&record[TIME_POS]);
    let time = parse_timestamp(&cd)
        .with_context(|| format!("Record {row}: invalid close-approach time '{cd}'"))?;

    Ok(CloseApproach::new(
        &des,
        time,
        &json_to_text(&record[DIST_POS]),
        &json_to_text(&record[V_REL_POS]),
    ))
}

/// Source fields are normally strings; numbers are accepted as their textual
/// form and null reads as empty.
fn json_to_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// src/store.rs
//! JSON scrape cache.
//!
//! The file is a JSON array of flat claim objects using the scrape feed's
//! field names (`url`, `stage`, `cell_x`, ...). Loading is forgiving: an
//! object keyed by id is accepted too, numbers may be written as `12.0`, and
//! a broken entry costs only that entry.

use std::{
    collections::HashMap,
    fs,
    io::{self, Write},
    path::Path,
};

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::claim::{ClaimRecord, CoordSource, Stage};
use crate::error::CacheError;
use crate::grid::Cell;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    stage: Option<String>,
    #[serde(default)]
    claimant: Option<String>,
    #[serde(default)]
    reviewers: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    last_update: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    cell_x: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    cell_y: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    scraped_x: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    scraped_y: Option<i32>,
    #[serde(default)]
    coord_source: Option<CoordSource>,
}

/// Integer, integral float, numeric string or null.
fn lenient_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return i32::try_from(i).map(Some).map_err(D::Error::custom);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 => Ok(Some(f as i32)),
                _ => Err(D::Error::custom(format!("not a cell coordinate: {n}"))),
            }
        }
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse().map(Some).map_err(D::Error::custom),
        Some(other) => Err(D::Error::custom(format!("not a cell coordinate: {other}"))),
    }
}

fn pair(x: Option<i32>, y: Option<i32>) -> Option<Cell> {
    Some(Cell::new(x?, y?))
}

impl CacheEntry {
    fn from_record(r: &ClaimRecord) -> Self {
        let is_url_id = r.detail_url.as_deref() == Some(r.id.as_str());
        Self {
            id: if is_url_id { None } else { Some(r.id.clone()) },
            url: r.detail_url.clone(),
            title: Some(r.title.clone()),
            stage: Some(String::from(r.status.clone())),
            claimant: r.claimant.clone(),
            reviewers: r.reviewer.clone(),
            description: r.description.clone(),
            last_update: r.last_update.clone(),
            image_url: r.image_ref.clone(),
            cell_x: r.coord.map(|c| c.x),
            cell_y: r.coord.map(|c| c.y),
            scraped_x: r.scraped_coord.map(|c| c.x),
            scraped_y: r.scraped_coord.map(|c| c.y),
            coord_source: Some(r.coord_source),
        }
    }

    /// `key` is the map key when the cache is an object keyed by id.
    fn into_record(self, key: Option<String>) -> Option<ClaimRecord> {
        let id = self.id.or(key).or_else(|| self.url.clone()).filter(|s| !s.trim().is_empty())?;

        let coord = pair(self.cell_x, self.cell_y);
        let coord_source = match (coord, self.coord_source) {
            (None, _) => CoordSource::Unresolved,
            (Some(_), None | Some(CoordSource::Unresolved)) => CoordSource::Scraped,
            (Some(_), Some(src)) => src,
        };
        let scraped_coord = pair(self.scraped_x, self.scraped_y)
            .or(if coord_source == CoordSource::Scraped { coord } else { None });

        Some(ClaimRecord {
            id,
            title: self.title.unwrap_or_default(),
            status: self.stage.map(Stage::from).unwrap_or_default(),
            claimant: self.claimant,
            reviewer: self.reviewers,
            image_ref: self.image_url,
            detail_url: self.url,
            description: self.description,
            last_update: self.last_update,
            scraped_coord,
            coord,
            coord_source,
        })
    }
}

/// Load the cache at `path`. Later duplicates replace earlier ones in place.
pub fn load(path: &Path) -> Result<Vec<ClaimRecord>, CacheError> {
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => CacheError::Missing(path.to_path_buf()),
        _ => CacheError::Io { path: path.to_path_buf(), source },
    })?;
    let corrupt = |source| CacheError::Corrupt { path: path.to_path_buf(), source };

    let doc: Value = serde_json::from_str(&text).map_err(corrupt)?;
    let items: Vec<(Option<String>, Value)> = match doc {
        Value::Object(map) => map.into_iter().map(|(k, v)| (Some(k), v)).collect(),
        other => serde_json::from_value::<Vec<Value>>(other)
            .map_err(corrupt)?
            .into_iter()
            .map(|v| (None, v))
            .collect(),
    };

    let mut records: Vec<ClaimRecord> = Vec::with_capacity(items.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0usize;

    for (n, (key, value)) in items.into_iter().enumerate() {
        let entry = match serde_json::from_value::<CacheEntry>(value) {
            Ok(e) => e,
            Err(e) => {
                warn!(path = %path.display(), entry = n, error = %e, "Skipping malformed cache entry");
                skipped += 1;
                continue;
            }
        };
        let Some(record) = entry.into_record(key) else {
            warn!(path = %path.display(), entry = n, "Skipping cache entry without id or url");
            skipped += 1;
            continue;
        };
        match index.get(&record.id) {
            Some(&at) => records[at] = record,
            None => {
                index.insert(record.id.clone(), records.len());
                records.push(record);
            }
        }
    }

    info!(path = %path.display(), claims = records.len(), skipped, "Loaded cache");
    Ok(records)
}

/// Write the cache atomically.
pub fn save(path: &Path, records: &[ClaimRecord]) -> Result<(), CacheError> {
    let entries: Vec<CacheEntry> = records.iter().map(CacheEntry::from_record).collect();
    let json = serde_json::to_string_pretty(&entries)
        .map_err(|source| CacheError::Corrupt { path: path.to_path_buf(), source })?;
    write_atomic(path, json.as_bytes()).map_err(|source| CacheError::Io { path: path.to_path_buf(), source })?;
    info!(path = %path.display(), claims = records.len(), "Saved cache");
    Ok(())
}

/// Write through a temp file in the target directory, then rename over `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_entry_without_source_is_scraped() {
        let e: CacheEntry = serde_json::from_str(
            r#"{"url": "https://x.org/claims/a", "title": "A", "stage": "Merged",
                "cell_x": 12.0, "cell_y": "-5", "junk": true}"#,
        )
        .unwrap();
        let r = e.into_record(None).unwrap();
        assert_eq!(r.id, "https://x.org/claims/a");
        assert_eq!(r.status, Stage::Merged);
        assert_eq!(r.coord, Some(Cell::new(12, -5)));
        assert_eq!(r.scraped_coord, Some(Cell::new(12, -5)));
        assert_eq!(r.coord_source, CoordSource::Scraped);
    }

    #[test]
    fn fractional_cells_are_rejected() {
        assert!(serde_json::from_str::<CacheEntry>(r#"{"url": "u", "cell_x": 1.5, "cell_y": 2}"#).is_err());
    }

    #[test]
    fn half_a_cell_is_no_cell() {
        let e: CacheEntry = serde_json::from_str(r#"{"url": "u", "cell_x": 3, "coord_source": "title"}"#).unwrap();
        let r = e.into_record(None).unwrap();
        assert_eq!(r.coord, None);
        assert_eq!(r.coord_source, CoordSource::Unresolved);
    }

    #[test]
    fn url_id_is_not_written_twice() {
        let mut r = ClaimRecord::new("https://x.org/claims/a", "A");
        r.detail_url = Some(r.id.clone());
        let e = CacheEntry::from_record(&r);
        assert_eq!(e.id, None);
        assert_eq!(e.into_record(None).unwrap(), r);
    }
}

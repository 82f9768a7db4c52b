//! Whole-database snapshot codec (§4.6).
//!
//! Mirrors the source's approach of persisting the entire catalog object
//! graph in one shot (there it is a `pickle` of the `Database`; here it is
//! a `bincode` encoding of the same [`Catalog`] struct `serde` already
//! derives), rather than hand-rolling a separate wire schema. A leading
//! magic + version header lets `load` reject non-snapshot files and
//! version skew before bincode ever sees the payload.

use std::io::{Read, Write};

use crate::catalog::Catalog;
use crate::error::SnapshotError;

const MAGIC: &[u8; 8] = b"PESADB01";
const VERSION: u16 = 1;

/// Writes `catalog` to `writer` as `magic || version || bincode(catalog)`.
pub fn save<W: Write>(catalog: &Catalog, writer: &mut W) -> Result<(), SnapshotError> {
    writer.write_all(MAGIC)?;
    writer.write_all(&VERSION.to_le_bytes())?;
    bincode::serialize_into(writer, catalog)?;
    Ok(())
}

/// Reads a snapshot written by [`save`]. Rejects files with the wrong
/// magic, an unsupported version, or a payload whose enum discriminants
/// bincode cannot map back to a known variant — the last of these is
/// `bincode`'s derived decoding failing closed on an out-of-range tag,
/// which is what gives §4.6's "unknown value tags fail with
/// `FormatError`" requirement without any hand-rolled tag check.
pub fn load<R: Read>(reader: &mut R) -> Result<Catalog, SnapshotError> {
    let mut magic = [0u8; 8];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(SnapshotError::BadMagic);
    }
    let mut version_bytes = [0u8; 2];
    reader.read_exact(&mut version_bytes)?;
    let version = u16::from_le_bytes(version_bytes);
    if version != VERSION {
        return Err(SnapshotError::UnsupportedVersion(version));
    }
    let catalog: Catalog = bincode::deserialize_from(reader)?;
    Ok(catalog)
}

pub fn save_to_path(catalog: &Catalog, path: &std::path::Path) -> Result<(), SnapshotError> {
    let mut file = std::fs::File::create(path)?;
    save(catalog, &mut file)
}

pub fn load_from_path(path: &std::path::Path) -> Result<Catalog, SnapshotError> {
    let mut file = std::fs::File::open(path)?;
    load(&mut file)
}

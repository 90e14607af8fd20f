use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::limits::MAX_SNAPSHOT_BYTES;
use crate::model::Reservation;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    reservations: &'a [Reservation],
}

#[derive(Deserialize)]
struct SnapshotOwned {
    version: u32,
    reservations: Vec<Reservation>,
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

/// Encode the whole collection to `[len][bincode][crc32]` format.
fn encode(writer: &mut impl Write, reservations: &[Reservation]) -> io::Result<()> {
    let payload = bincode::serialize(&SnapshotRef {
        version: SNAPSHOT_VERSION,
        reservations,
    })
    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let len = u32::try_from(payload.len()).map_err(|_| invalid("snapshot too large"))?;
    let crc = crc32fast::hash(&payload);
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&payload)?;
    writer.write_all(&crc.to_le_bytes())?;
    Ok(())
}

/// Whole-collection image of the booking store.
///
/// Format: `[u32: len][bincode: {version, reservations}][u32: crc32]`.
/// Unlike an append log there is nothing to salvage from a damaged image:
/// truncation, a CRC mismatch or trailing bytes all fail the load.
///
/// Writes go to a sibling temp file which is fsynced and renamed over the
/// image, so a reader sees either the old image or the new one.
#[derive(Debug, Clone)]
pub struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("snap.tmp")
    }

    pub fn write(&self, reservations: &[Reservation]) -> io::Result<()> {
        let tmp_path = self.tmp_path();
        let result = Self::write_file(&tmp_path, reservations)
            .and_then(|()| fs::rename(&tmp_path, &self.path));
        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }

    fn write_file(path: &Path, reservations: &[Reservation]) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        encode(&mut writer, reservations)?;
        writer.flush()?;
        writer.get_ref().sync_all()
    }

    /// Read the image back. `Ok(None)` when no image has been written yet.
    pub fn load(&self) -> io::Result<Option<Vec<Reservation>>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let mut reader = BufReader::new(file);

        let mut len_buf = [0u8; 4];
        read_or_truncated(&mut reader, &mut len_buf)?;
        let len = u32::from_le_bytes(len_buf) as usize;
        if len > MAX_SNAPSHOT_BYTES {
            return Err(invalid(format!("snapshot length {len} exceeds limit")));
        }

        let mut payload = vec![0u8; len];
        read_or_truncated(&mut reader, &mut payload)?;

        let mut crc_buf = [0u8; 4];
        read_or_truncated(&mut reader, &mut crc_buf)?;
        if u32::from_le_bytes(crc_buf) != crc32fast::hash(&payload) {
            return Err(invalid("snapshot checksum mismatch"));
        }

        let mut trailing = [0u8; 1];
        if reader.read(&mut trailing)? != 0 {
            return Err(invalid("trailing bytes after snapshot"));
        }

        let snapshot: SnapshotOwned =
            bincode::deserialize(&payload).map_err(|e| invalid(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(invalid(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        Ok(Some(snapshot.reservations))
    }
}

fn read_or_truncated(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<()> {
    match reader.read_exact(buf) {
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(invalid("snapshot truncated")),
        other => other,
    }
}

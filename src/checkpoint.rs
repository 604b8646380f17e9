use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use log::info;
use serde::{Deserialize, Serialize};
use crate::error::Error;
use crate::mesh::Mesh;
use crate::patch::Patch;

/// The name every snapshot gives its field.
pub const FIELD_NAME: &str = "Solution";




#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]


/**
 * The global solution at one instant, with enough metadata to be
 * interpreted on its own
 */
pub struct Snapshot {
    pub name: String,
    pub iteration: u64,
    pub time: f64,
    pub mesh: Mesh,
    pub field: Patch,
}




// ============================================================================
impl Snapshot {
    pub fn new(iteration: u64, time: f64, mesh: Mesh, field: Patch) -> Self {
        Self {
            name: FIELD_NAME.to_string(),
            iteration,
            time,
            mesh,
            field,
        }
    }
}




/// A destination for a numbered series of snapshots. Implementors must only
/// advance their sequence number when a snapshot was stored successfully.
///
pub trait SnapshotWriter {
    /// Store the snapshot under the current sequence number, then increment
    /// the sequence number.
    fn save(&mut self, snapshot: &Snapshot) -> Result<(), Error>;

    /// Return the sequence number the next snapshot will be stored under.
    fn sequence_number(&self) -> usize;
}

impl SnapshotWriter for Vec<Snapshot> {
    fn save(&mut self, snapshot: &Snapshot) -> Result<(), Error> {
        self.push(snapshot.clone());
        Ok(())
    }

    fn sequence_number(&self) -> usize {
        self.len()
    }
}




/**
 * Writes snapshots as CBOR files named `sol000.cbor`, `sol001.cbor`, ... in
 * an output directory
 */
pub struct CborWriter {
    directory: PathBuf,
    sequence_number: usize,
}




// ============================================================================
impl CborWriter {

    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
            sequence_number: 0,
        }
    }

    /**
     * Return the path of the file holding the snapshot with the given
     * sequence number.
     */
    pub fn path_for(&self, sequence_number: usize) -> PathBuf {
        self.directory.join(format!("sol{:03}.cbor", sequence_number))
    }

    fn write(&self, path: &Path, snapshot: &Snapshot) -> Result<(), Error> {
        let io_error = |source| Error::Io { path: path.to_owned(), source };

        fs::create_dir_all(&self.directory).map_err(|source| Error::Io { path: self.directory.clone(), source })?;

        let file = File::create(path).map_err(io_error)?;
        let mut buffer = BufWriter::new(file);

        ciborium::ser::into_writer(snapshot, &mut buffer).map_err(|e| Error::Encode {
            path: path.to_owned(),
            message: format!("{:?}", e),
        })?;
        buffer.flush().map_err(io_error)
    }
}

impl SnapshotWriter for CborWriter {
    fn save(&mut self, snapshot: &Snapshot) -> Result<(), Error> {
        let path = self.path_for(self.sequence_number);
        self.write(&path, snapshot)?;

        info!("write {} (iteration {}, t={:.4})", path.display(), snapshot.iteration, snapshot.time);
        self.sequence_number += 1;
        Ok(())
    }

    fn sequence_number(&self) -> usize {
        self.sequence_number
    }
}




/**
 * Load a snapshot written by a `CborWriter`.
 */
pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<Snapshot, Error> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::Io { path: path.to_owned(), source })?;

    ciborium::de::from_reader(BufReader::new(file)).map_err(|e| Error::Decode {
        path: path.to_owned(),
        message: format!("{:?}", e),
    })
}

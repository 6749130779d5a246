//! Binary persistence of a network's trainable state.
//!
//! The format has no header and no topology information: a network can only
//! be loaded into a network with exactly the topology it was saved from.
//! All values are little-endian:
//!
//! ```text
//! for each layer, in order:
//!   for each unit, in order:
//!     weights    f64 * fan-in
//!     bias       f64
//! training step count  i32
//! learning rate        f64
//! ```

use crate::error::{Error, Result};
use crate::feed_forward::Network;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::convert::TryFrom;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Saves and loads networks at a fixed file path.
#[derive(Clone, Debug)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        StateStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the state of `network` to the store's file, replacing it.
    ///
    /// The file is left untouched if the state can't be encoded.
    pub fn save<G>(&self, network: &Network<G>) -> Result<()> {
        encoded_step_count(network)?;
        let mut writer = BufWriter::new(File::create(&self.path)?);
        save(network, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Reads the store's file into `network`.
    pub fn load<G>(&self, network: &mut Network<G>) -> Result<()> {
        let mut reader = BufReader::new(File::open(&self.path)?);
        load(network, &mut reader)
    }
}

/// Writes the weights, biases, training step count and learning rate of
/// `network` to `writer`.
pub fn save<G, W: Write + ?Sized>(network: &Network<G>, writer: &mut W) -> Result<()> {
    let step_count = encoded_step_count(network)?;

    let mut values = 0;
    for unit in network.layers().iter().flat_map(|l| l.units()) {
        for &weight in unit.weights() {
            writer.write_f64::<LittleEndian>(weight)?;
        }
        writer.write_f64::<LittleEndian>(unit.bias())?;
        values += unit.num_inputs() + 1;
    }
    writer.write_i32::<LittleEndian>(step_count)?;
    writer.write_f64::<LittleEndian>(network.learning_rate())?;

    debug!(bytes = values * 8 + 12, "saved network state");
    Ok(())
}

/// Reads state written by `save` into `network`.
///
/// Nothing in `network` changes unless the whole state was read
/// successfully and exactly matched its topology.
pub fn load<G, R: Read + ?Sized>(network: &mut Network<G>, reader: &mut R) -> Result<()> {
    let mut parameters = Vec::new();
    for (l, layer) in network.layers().iter().enumerate() {
        for (u, unit) in layer.units().iter().enumerate() {
            let mut weights = Vec::with_capacity(unit.num_inputs());
            for _ in 0..unit.num_inputs() {
                weights.push(read_f64(reader, || format!("weights of layer {} unit {}", l, u))?);
            }
            let bias = read_f64(reader, || format!("bias of layer {} unit {}", l, u))?;
            parameters.push((weights, bias));
        }
    }
    let step_count = reader
        .read_i32::<LittleEndian>()
        .map_err(|e| read_error(e, || "training step count".into()))?;
    let step_count = u64::try_from(step_count)
        .map_err(|_| Error::CorruptState(format!("negative training step count {}", step_count)))?;
    let learning_rate = read_f64(reader, || "learning rate".into())?;

    if reader.read(&mut [0u8])? != 0 {
        return Err(Error::CorruptState(
            "trailing data after the saved state".into(),
        ));
    }

    let units = network
        .layers_mut()
        .iter_mut()
        .flat_map(|l| l.units_mut().iter_mut());
    let mut values = 0;
    for (unit, (weights, bias)) in units.zip(&parameters) {
        unit.set_parameters(weights, *bias);
        values += weights.len() + 1;
    }
    network.restore_progress(step_count, learning_rate);

    debug!(bytes = values * 8 + 12, "loaded network state");
    Ok(())
}

/// Returns the step count as the int32 the format stores.
fn encoded_step_count<G>(network: &Network<G>) -> Result<i32> {
    i32::try_from(network.train_step_count())
        .map_err(|_| Error::StepCountOverflow(network.train_step_count()))
}

fn read_f64<R, F>(reader: &mut R, what: F) -> Result<f64>
where
    R: Read + ?Sized,
    F: FnOnce() -> String,
{
    reader
        .read_f64::<LittleEndian>()
        .map_err(|e| read_error(e, what))
}

/// Reports a stream that ends early as corrupt state rather than an I/O
/// failure.
fn read_error<F: FnOnce() -> String>(err: io::Error, what: F) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::CorruptState(format!("stream ended while reading the {}", what()))
    } else {
        Error::Io(err)
    }
}

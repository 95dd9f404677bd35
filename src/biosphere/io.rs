//! Plain-text leaf cloud and instance position files.
//!
//! Leaf cloud files hold one leaf per line as seven whitespace-separated
//! numbers: `radius x y z nx ny nz`. Instance files hold one `x y z` offset
//! per line. Both are in metres. Blank lines are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::core::types::DVec3;
use crate::core::{Error, Result};

/// Column-split contents of a leaf cloud file
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LeafArrays {
    pub radii: Vec<f64>,
    pub positions: Vec<DVec3>,
    pub orientations: Vec<DVec3>,
}

/// Parse every non-blank line of `path` into exactly `N` numbers
fn read_rows<const N: usize>(path: &Path) -> Result<Vec<[f64; N]>> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let reader = BufReader::new(File::open(path)?);
    let mut rows = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let parse_error = |message: String| Error::Parse {
            path: path.to_path_buf(),
            line: index + 1,
            message,
        };

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() != N {
            return Err(parse_error(format!(
                "expected {N} values, found {}",
                tokens.len()
            )));
        }

        let mut row = [0.0; N];
        for (value, token) in row.iter_mut().zip(&tokens) {
            *value = token
                .parse()
                .map_err(|e| parse_error(format!("invalid number '{token}': {e}")))?;
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Read a seven-column leaf cloud file
pub fn read_leaf_cloud(path: &Path) -> Result<LeafArrays> {
    let rows = read_rows::<7>(path)?;
    let mut arrays = LeafArrays {
        radii: Vec::with_capacity(rows.len()),
        positions: Vec::with_capacity(rows.len()),
        orientations: Vec::with_capacity(rows.len()),
    };
    for [r, x, y, z, nx, ny, nz] in rows {
        arrays.radii.push(r);
        arrays.positions.push(DVec3::new(x, y, z));
        arrays.orientations.push(DVec3::new(nx, ny, nz));
    }
    log::debug!("Read {} leaves from {}", arrays.radii.len(), path.display());
    Ok(arrays)
}

/// Read a three-column instance position file
pub fn read_instance_positions(path: &Path) -> Result<Vec<DVec3>> {
    let positions: Vec<DVec3> = read_rows::<3>(path)?
        .into_iter()
        .map(DVec3::from_array)
        .collect();
    log::debug!("Read {} instances from {}", positions.len(), path.display());
    Ok(positions)
}

/// Write a leaf cloud file. The three slices must have equal length.
pub fn write_leaf_cloud(
    path: &Path,
    radii: &[f64],
    positions: &[DVec3],
    orientations: &[DVec3],
) -> Result<()> {
    if radii.len() != positions.len() || radii.len() != orientations.len() {
        return Err(Error::Shape(format!(
            "cannot write {} radii, {} positions and {} orientations",
            radii.len(),
            positions.len(),
            orientations.len()
        )));
    }

    let mut writer = BufWriter::new(File::create(path)?);
    for ((r, p), n) in radii.iter().zip(positions).zip(orientations) {
        writeln!(writer, "{} {} {} {} {} {} {}", r, p.x, p.y, p.z, n.x, n.y, n.z)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write an instance position file
pub fn write_instance_positions(path: &Path, positions: &[DVec3]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for p in positions {
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }
    writer.flush()?;
    Ok(())
}

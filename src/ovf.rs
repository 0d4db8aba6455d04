// src/ovf.rs
//
// OVF snapshot I/O.
// Reads OOMMF/MuMax OVF rectangular meshes (text, binary4, binary8 data)
// into a VectorField3D, and writes text/binary4 snapshots of a field.
//
// Storage order is a format contract: one (u, v, w) triple per voxel,
// x fastest, then y, then z. Reading any other way silently transposes axes.

use std::collections::BTreeMap;
use std::fs::{File, create_dir_all};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{OvfError, Result};
use crate::grid::Grid3D;
use crate::vector_field::VectorField3D;

const BINARY4_CHECK: f32 = 1234567.0;
const BINARY8_CHECK: f64 = 123456789012345.0;

/// Encoding of the data block following the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Text,
    Binary4,
    Binary8,
}

/// Raw header mapping (last occurrence of a key wins).
#[derive(Debug, Clone, PartialEq)]
pub struct OvfHeader {
    pub entries: BTreeMap<String, String>,
    pub data_format: DataFormat,
    /// Number of header lines consumed.
    pub lines: usize,
}

impl OvfHeader {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

/// Grid dimensions and step sizes required to shape the body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotMetadata {
    pub xnodes: usize,
    pub ynodes: usize,
    pub znodes: usize,
    pub xstepsize: f64,
    pub ystepsize: f64,
    pub zstepsize: f64,
}

impl SnapshotMetadata {
    pub fn from_header(header: &OvfHeader) -> Result<Self> {
        let meta = Self {
            xnodes: nodes(header, "xnodes")?,
            ynodes: nodes(header, "ynodes")?,
            znodes: nodes(header, "znodes")?,
            xstepsize: stepsize(header, "xstepsize")?,
            ystepsize: stepsize(header, "ystepsize")?,
            zstepsize: stepsize(header, "zstepsize")?,
        };
        meta.value_count()?;
        Ok(meta)
    }

    pub fn grid(&self) -> Grid3D {
        Grid3D::new(
            self.xnodes,
            self.ynodes,
            self.znodes,
            self.xstepsize,
            self.ystepsize,
            self.zstepsize,
        )
    }

    /// Expected number of body values, xnodes*ynodes*znodes*3.
    /// Fails if the product does not fit in usize.
    pub fn value_count(&self) -> Result<usize> {
        self.xnodes
            .checked_mul(self.ynodes)
            .and_then(|n| n.checked_mul(self.znodes))
            .and_then(|n| n.checked_mul(3))
            .ok_or_else(|| OvfError::MalformedMetadata {
                key: "xnodes*ynodes*znodes".to_string(),
                value: format!("{}*{}*{}", self.xnodes, self.ynodes, self.znodes),
                expected: "a grid whose value count fits in usize",
            })
    }
}

fn required<'a>(header: &'a OvfHeader, key: &str) -> Result<&'a str> {
    header.get(key).ok_or_else(|| OvfError::MissingMetadata {
        key: key.to_string(),
    })
}

fn nodes(header: &OvfHeader, key: &str) -> Result<usize> {
    let raw = required(header, key)?;
    let n: usize = raw.parse().map_err(|_| OvfError::MalformedMetadata {
        key: key.to_string(),
        value: raw.to_string(),
        expected: "integer",
    })?;
    if n == 0 {
        return Err(OvfError::InvalidDimension {
            key: key.to_string(),
            value: n,
        });
    }
    Ok(n)
}

fn stepsize(header: &OvfHeader, key: &str) -> Result<f64> {
    let raw = required(header, key)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(OvfError::MalformedMetadata {
            key: key.to_string(),
            value: raw.to_string(),
            expected: "positive float",
        }),
    }
}

/// `# key: value` -> (key, value). The value is the text up to the next ':'.
fn header_entry(line: &str) -> Option<(&str, &str)> {
    if !line.contains(':') {
        return None;
    }
    let rest = line.split("# ").nth(1)?;
    let mut parts = rest.split(':');
    let key = parts.next()?;
    let value = parts.next()?.trim();
    Some((key, value))
}

/// Consume the leading run of `#` lines from `reader`.
///
/// Stops before the first line that does not start with `#`, or directly
/// after a `Begin: Data Binary N` marker (binary bytes follow).
pub fn parse_header<R: BufRead>(reader: &mut R) -> Result<OvfHeader> {
    let mut entries = BTreeMap::new();
    let mut data_format = DataFormat::Text;
    let mut lines = 0usize;
    let mut buf = Vec::new();

    loop {
        let next = reader.fill_buf()?;
        if next.first() != Some(&b'#') {
            break;
        }
        buf.clear();
        reader.read_until(b'\n', &mut buf)?;
        lines += 1;

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\r', '\n']);
        let Some((key, value)) = header_entry(line) else {
            continue;
        };
        let is_begin = key == "Begin";
        let value = value.to_string();
        entries.insert(key.to_string(), value.clone());

        if is_begin && value.starts_with("Data") {
            data_format = match value.as_str() {
                "Data Text" => DataFormat::Text,
                "Data Binary 4" => DataFormat::Binary4,
                "Data Binary 8" => DataFormat::Binary8,
                other => {
                    return Err(OvfError::UnsupportedData {
                        format: other.to_string(),
                    });
                }
            };
            if data_format != DataFormat::Text {
                break;
            }
        }
    }

    Ok(OvfHeader {
        entries,
        data_format,
        lines,
    })
}

/// Parse only the header of `path` and extract dimensions and step sizes.
pub fn read_metadata(path: &Path) -> Result<SnapshotMetadata> {
    let mut reader = BufReader::new(File::open(path)?);
    let header = parse_header(&mut reader)?;
    SnapshotMetadata::from_header(&header)
}

/// Whitespace-separated values after the header.
/// Everything from `#` to the end of a line is a comment.
fn decode_text(body: &[u8], first_line: usize) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    for (n, raw) in body.split(|&b| b == b'\n').enumerate() {
        let line_no = first_line + n;
        let line = std::str::from_utf8(raw).map_err(|_| OvfError::Parse {
            token: String::from_utf8_lossy(raw).into_owned(),
            line: line_no,
        })?;
        let line = match line.find('#') {
            Some(p) => &line[..p],
            None => line,
        };
        for token in line.split_whitespace() {
            let v = token.parse::<f64>().map_err(|_| OvfError::Parse {
                token: token.to_string(),
                line: line_no,
            })?;
            values.push(v);
        }
    }
    Ok(values)
}

/// Little-endian binary values after the check word. Trailing bytes are ignored.
fn decode_binary(body: &[u8], format: DataFormat, expected: usize) -> Result<Vec<f64>> {
    let width = if format == DataFormat::Binary8 { 8 } else { 4 };
    if body.len() < width {
        return Err(OvfError::ShapeMismatch {
            expected,
            actual: 0,
        });
    }
    let (check, data) = body.split_at(width);
    let found = match format {
        DataFormat::Binary8 => f64::from_le_bytes(bytes8(check)),
        _ => f32::from_le_bytes(bytes4(check)) as f64,
    };
    let expected_check = match format {
        DataFormat::Binary8 => BINARY8_CHECK,
        _ => BINARY4_CHECK as f64,
    };
    if found != expected_check {
        return Err(OvfError::BadCheckValue {
            expected: expected_check,
            found,
        });
    }

    let available = data.len() / width;
    if available < expected {
        return Err(OvfError::ShapeMismatch {
            expected,
            actual: available,
        });
    }
    let values = data[..expected * width]
        .chunks_exact(width)
        .map(|c| match format {
            DataFormat::Binary8 => f64::from_le_bytes(bytes8(c)),
            _ => f32::from_le_bytes(bytes4(c)) as f64,
        })
        .collect();
    Ok(values)
}

#[inline]
fn bytes4(c: &[u8]) -> [u8; 4] {
    [c[0], c[1], c[2], c[3]]
}

#[inline]
fn bytes8(c: &[u8]) -> [u8; 8] {
    [c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]
}

fn read_body(
    reader: &mut impl Read,
    header: &OvfHeader,
    meta: &SnapshotMetadata,
) -> Result<VectorField3D> {
    let mut body = Vec::new();
    reader.read_to_end(&mut body)?;

    let expected = meta.value_count()?;
    let values = match header.data_format {
        DataFormat::Text => decode_text(&body, header.lines + 1)?,
        binary => decode_binary(&body, binary, expected)?,
    };
    if values.len() != expected {
        return Err(OvfError::ShapeMismatch {
            expected,
            actual: values.len(),
        });
    }
    Ok(VectorField3D::from_flat(meta.grid(), &values))
}

/// Read the body of `path` and shape it with the given metadata.
pub fn load_field(path: &Path, meta: &SnapshotMetadata) -> Result<VectorField3D> {
    let mut reader = BufReader::new(File::open(path)?);
    let header = parse_header(&mut reader)?;
    read_body(&mut reader, &header, meta)
}

/// A fully loaded snapshot file.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub header: OvfHeader,
    pub metadata: SnapshotMetadata,
    pub field: VectorField3D,
}

/// Parse header and body of `path` in one read.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let mut reader = BufReader::new(File::open(path)?);
    let header = parse_header(&mut reader)?;
    let metadata = SnapshotMetadata::from_header(&header)?;
    debug!(
        path = %path.display(),
        nx = metadata.xnodes,
        ny = metadata.ynodes,
        nz = metadata.znodes,
        format = ?header.data_format,
        "parsed snapshot header"
    );
    let field = read_body(&mut reader, &header, &metadata)?;
    Ok(Snapshot {
        header,
        metadata,
        field,
    })
}

#[derive(Clone, Debug, Default)]
pub struct OvfMeta {
    pub title: String,
    pub desc_lines: Vec<String>,
    pub valuelabels: [String; 3],
    pub valueunits: [String; 3],
}

impl OvfMeta {
    /// MuMax-style demagnetising (stray) field labels.
    pub fn stray_field() -> Self {
        Self {
            title: "B_demag".to_string(),
            desc_lines: vec![],
            valuelabels: ["B_demag_x".into(), "B_demag_y".into(), "B_demag_z".into()],
            valueunits: ["T".into(), "T".into(), "T".into()],
        }
    }

    pub fn push_desc_line<S: Into<String>>(&mut self, s: S) {
        self.desc_lines.push(s.into());
    }
}

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    Ok(())
}

fn write_header<W: Write>(w: &mut W, grid: &Grid3D, meta: &OvfMeta) -> std::io::Result<()> {
    writeln!(w, "# OOMMF OVF 2.0")?;
    writeln!(w, "# Segment count: 1")?;
    writeln!(w, "# Begin: Segment")?;
    writeln!(w, "# Begin: Header")?;
    writeln!(w, "# Title: {}", meta.title)?;
    for d in &meta.desc_lines {
        writeln!(w, "# Desc: {}", d)?;
    }
    writeln!(w, "# meshtype: rectangular")?;
    writeln!(w, "# meshunit: m")?;

    writeln!(w, "# xmin: 0")?;
    writeln!(w, "# ymin: 0")?;
    writeln!(w, "# zmin: 0")?;
    writeln!(w, "# xmax: {:.16e}", grid.nx as f64 * grid.dx)?;
    writeln!(w, "# ymax: {:.16e}", grid.ny as f64 * grid.dy)?;
    writeln!(w, "# zmax: {:.16e}", grid.nz as f64 * grid.dz)?;

    writeln!(w, "# valuedim: 3")?;
    writeln!(
        w,
        "# valuelabels: {} {} {}",
        meta.valuelabels[0], meta.valuelabels[1], meta.valuelabels[2]
    )?;
    writeln!(
        w,
        "# valueunits: {} {} {}",
        meta.valueunits[0], meta.valueunits[1], meta.valueunits[2]
    )?;

    writeln!(w, "# xbase: {:.16e}", 0.5 * grid.dx)?;
    writeln!(w, "# ybase: {:.16e}", 0.5 * grid.dy)?;
    writeln!(w, "# zbase: {:.16e}", 0.5 * grid.dz)?;
    writeln!(w, "# xnodes: {}", grid.nx)?;
    writeln!(w, "# ynodes: {}", grid.ny)?;
    writeln!(w, "# znodes: {}", grid.nz)?;
    writeln!(w, "# xstepsize: {:.16e}", grid.dx)?;
    writeln!(w, "# ystepsize: {:.16e}", grid.dy)?;
    writeln!(w, "# zstepsize: {:.16e}", grid.dz)?;
    writeln!(w, "# End: Header")?;
    Ok(())
}

pub fn write_ovf2_text(path: &Path, field: &VectorField3D, meta: &OvfMeta) -> Result<()> {
    ensure_parent_dir(path)?;
    let grid = &field.grid;
    if field.data.len() != grid.n_cells() {
        return Err(OvfError::ShapeMismatch {
            expected: grid.n_cells() * 3,
            actual: field.data.len() * 3,
        });
    }

    let mut w = BufWriter::new(File::create(path)?);
    write_header(&mut w, grid, meta)?;
    writeln!(w, "# Begin: Data Text")?;

    // x fastest, then y, then z
    for k in 0..grid.nz {
        for j in 0..grid.ny {
            for i in 0..grid.nx {
                let v = field.get(i, j, k);
                writeln!(w, "{:e} {:e} {:e}", v[0], v[1], v[2])?;
            }
        }
    }

    writeln!(w, "# End: Data Text")?;
    writeln!(w, "# End: Segment")?;
    w.flush()?;
    Ok(())
}

pub fn write_ovf2_binary4(path: &Path, field: &VectorField3D, meta: &OvfMeta) -> Result<()> {
    ensure_parent_dir(path)?;
    let grid = &field.grid;
    if field.data.len() != grid.n_cells() {
        return Err(OvfError::ShapeMismatch {
            expected: grid.n_cells() * 3,
            actual: field.data.len() * 3,
        });
    }

    let mut f = BufWriter::new(File::create(path)?);
    write_header(&mut f, grid, meta)?;
    writeln!(f, "# Begin: Data Binary 4")?;

    f.write_all(&BINARY4_CHECK.to_le_bytes())?;
    for v in &field.data {
        for c in v {
            f.write_all(&(*c as f32).to_le_bytes())?;
        }
    }

    writeln!(f)?;
    writeln!(f, "# End: Data Binary 4")?;
    writeln!(f, "# End: Segment")?;
    writeln!(f, "# End: File")?;
    f.flush()?;
    Ok(())
}

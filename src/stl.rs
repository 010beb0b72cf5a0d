//! Binary STL reading and writing.
//!
//! ```text
//! UINT8[80]    header, space padded, ignored on read
//! UINT32       triangle count
//! foreach triangle
//!     REAL32[3] normal, recomputed from the vertices on write
//!     REAL32[3] vertex 1
//!     REAL32[3] vertex 2
//!     REAL32[3] vertex 3
//!     UINT16    attribute byte count, always 0
//! end
//! ```
//!
//! All numbers are little-endian.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::debug;
use tempfile::NamedTempFile;

use crate::geometry::{Mesh, Triangle};
use crate::vec3::Vec3;
use crate::{Error, Result};

pub const HEADER_SIZE: usize = 80;
pub const RECORD_SIZE: usize = 50;

const HEADER_TEXT: &[u8] = b"penumbra binary stl";

/// Upper bound on triangles reserved up front; the header count is untrusted.
const MAX_PREALLOC: usize = 1 << 20;

fn header() -> [u8; HEADER_SIZE] {
    let mut header = [b' '; HEADER_SIZE];
    header[..HEADER_TEXT.len()].copy_from_slice(HEADER_TEXT);
    header
}

fn write_vec<W: Write>(w: &mut W, v: [f32; 3]) -> io::Result<()> {
    for c in &v {
        w.write_all(&c.to_le_bytes())?;
    }
    Ok(())
}

fn read_vec(buf: &[u8]) -> [f32; 3] {
    let c = |k: usize| f32::from_le_bytes([buf[k], buf[k + 1], buf[k + 2], buf[k + 3]]);
    [c(0), c(4), c(8)]
}

/// Streams `mesh` to `w`. Fails if the mesh has more than `u32::MAX` triangles.
pub fn write_stl<W: Write>(mesh: &Mesh, mut w: W) -> Result<()> {
    if mesh.len() > u32::MAX as usize {
        return Err(Error::invalid(format!("{} triangles do not fit a binary STL", mesh.len())));
    }

    w.write_all(&header())?;
    w.write_all(&(mesh.len() as u32).to_le_bytes())?;

    for triangle in mesh {
        write_vec(&mut w, triangle.normal().to_f32())?;
        for v in &triangle.vertices {
            write_vec(&mut w, v.to_f32())?;
        }
        w.write_all(&0u16.to_le_bytes())?;
    }

    w.flush()?;
    Ok(())
}

/// Reads a binary STL. Stored normals are read but not checked against the vertices.
pub fn read_stl<R: Read>(mut r: R) -> Result<Mesh> {
    let mut head = [0u8; HEADER_SIZE + 4];
    let got = read_full(&mut r, &mut head)?;
    if got < head.len() {
        return Err(Error::InvalidHeader { got });
    }

    let count = u32::from_le_bytes([head[80], head[81], head[82], head[83]]);
    let mut mesh = Mesh::with_capacity((count as usize).min(MAX_PREALLOC));

    let mut record = [0u8; RECORD_SIZE];
    for id in 0..count {
        if read_full(&mut r, &mut record)? < RECORD_SIZE {
            return Err(Error::TruncatedMesh { expected: count, got: id });
        }

        let _normal = read_vec(&record[0..12]);
        mesh.push(Triangle::new(
            Vec3::from(read_vec(&record[12..24])),
            Vec3::from(read_vec(&record[24..36])),
            Vec3::from(read_vec(&record[36..48])),
        ));
    }

    Ok(mesh)
}

// Like `read_exact`, but reports how much was read before EOF.
fn read_full<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Writes `mesh` to `path` atomically: the file is staged next to the target
/// and renamed into place only after every record was written.
pub fn save_stl<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let staged = NamedTempFile::new_in(dir)?;
    debug!("staging {} triangles in {}", mesh.len(), staged.path().display());

    write_stl(mesh, BufWriter::new(staged.as_file()))?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;

    Ok(())
}

pub fn load_stl<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let file = File::open(path)?;
    read_stl(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::shape::{tessellate, ShapeKind};

    fn sample() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.extend(tessellate(ShapeKind::Box, Vec3::new(-1.25, 0.5, 0.0), 2.5, 3.75));
        mesh.extend(tessellate(ShapeKind::Pyramid, Vec3::new(4.0, 4.0, 0.0), 1.0, 0.3));
        mesh
    }

    #[test]
    fn layout_is_84_plus_50_per_triangle() {
        let mesh = sample();
        let mut bytes = Vec::new();
        write_stl(&mesh, &mut bytes).unwrap();

        assert_eq!(HEADER_SIZE + 4 + RECORD_SIZE * mesh.len(), bytes.len());
        assert!(bytes[..HEADER_SIZE].starts_with(b"penumbra"));
        assert_eq!(b' ', bytes[HEADER_SIZE - 1]);
        assert_eq!(18u32.to_le_bytes(), [bytes[80], bytes[81], bytes[82], bytes[83]]);

        for record in bytes[HEADER_SIZE + 4..].chunks(RECORD_SIZE) {
            assert_eq!([0, 0], [record[48], record[49]]);
        }
    }

    #[test]
    fn empty_mesh_is_just_the_header() {
        let mut bytes = Vec::new();
        write_stl(&Mesh::new(), &mut bytes).unwrap();

        assert_eq!(84, bytes.len());
        assert_eq!([0, 0, 0, 0], [bytes[80], bytes[81], bytes[82], bytes[83]]);
    }

    #[test]
    fn written_normals_are_unit_length() {
        let mut bytes = Vec::new();
        write_stl(&sample(), &mut bytes).unwrap();

        for record in bytes[HEADER_SIZE + 4..].chunks(RECORD_SIZE) {
            let n = Vec3::from(read_vec(&record[0..12]));
            assert_abs_diff_eq!(1.0, n.len(), epsilon = 1e-5);
        }
    }

    #[test]
    fn degenerate_triangle_gets_zero_normal() {
        let p = Vec3::new(1.0, 1.0, 1.0);
        let mesh = Mesh::from(vec![Triangle::new(p, p, p)]);
        let mut bytes = Vec::new();
        write_stl(&mesh, &mut bytes).unwrap();

        assert_eq!([0.0f32; 3], read_vec(&bytes[84..96]));
    }

    #[test]
    fn round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relief.stl");
        let mesh = sample();

        save_stl(&mesh, &path).unwrap();
        let loaded = load_stl(&path).unwrap();

        assert_eq!(mesh.len(), loaded.len());
        for (a, b) in mesh.iter().zip(loaded.iter()) {
            for (va, vb) in a.vertices.iter().zip(b.vertices.iter()) {
                assert_abs_diff_eq!(va.x, vb.x, epsilon = 1e-5);
                assert_abs_diff_eq!(va.y, vb.y, epsilon = 1e-5);
                assert_abs_diff_eq!(va.z, vb.z, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn truncated_file_is_rejected() {
        let mut bytes = Vec::new();
        write_stl(&sample(), &mut bytes).unwrap();
        bytes.truncate(84 + RECORD_SIZE * 3 + 7);

        match read_stl(&bytes[..]) {
            Err(Error::TruncatedMesh { expected: 18, got: 3 }) => {}
            other => panic!("unexpected {:?}", other),
        }

        match read_stl(&bytes[..40]) {
            Err(Error::InvalidHeader { got: 40 }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn huge_count_without_records_is_truncated() {
        let mut bytes = header().to_vec();
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());

        match read_stl(&bytes[..]) {
            Err(Error::TruncatedMesh { expected: u32::MAX, got: 0 }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn failed_save_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("relief.stl");

        assert!(save_stl(&sample(), &path).is_err());
        assert!(!path.exists());
        assert_eq!(0, std::fs::read_dir(dir.path()).unwrap().count());
    }

    #[test]
    fn save_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relief.stl");
        std::fs::write(&path, b"stale").unwrap();

        save_stl(&Mesh::new(), &path).unwrap();

        assert_eq!(84, std::fs::metadata(&path).unwrap().len());
        assert_eq!(1, std::fs::read_dir(dir.path()).unwrap().count());
    }
}

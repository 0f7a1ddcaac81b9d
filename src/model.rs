//! P3D model decoding.
//!
//! A model is laid out as header, section counts, points, normals, faces
//! and an optional `SS3D` supplement. The two model signatures differ in
//! the header (only `SP3X` carries a version), in the point record (only
//! `SP3X` carries per-point flags and a reserved word before the block)
//! and in the face record (only `SP3X` carries face flags).

use crate::config::DecodeOptions;
use crate::error::{DecodeError, Result};
use crate::flags::FaceFlags;
use crate::reader::{ReadRecord, Reader};
use crate::types::{
    FACE_SLOTS, FixedString, FormatTag, MAJOR_VERSION, MINOR_VERSION, SS3D_SIGNATURE, Vec3,
};
use log::{debug, trace, warn};
use serde::Serialize;
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// `SP3X`
    Sp3x,
    /// `SP3D`
    Sp3d,
}

impl ModelKind {
    pub fn from_format(format: FormatTag) -> Option<Self> {
        match format {
            FormatTag::ModelVariantA => Some(Self::Sp3x),
            FormatTag::ModelVariantB => Some(Self::Sp3d),
            FormatTag::World => None,
        }
    }

    pub fn format(self) -> FormatTag {
        match self {
            Self::Sp3x => FormatTag::ModelVariantA,
            Self::Sp3d => FormatTag::ModelVariantB,
        }
    }

    fn has_flags(self) -> bool {
        self == Self::Sp3x
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModelHeader {
    Sp3x {
        major_version: i32,
        minor_version: i32,
        /// Word between the section counts and the point block.
        point_block_reserved: u32,
    },
    Sp3d,
}

impl ModelHeader {
    pub fn kind(&self) -> ModelKind {
        match self {
            Self::Sp3x { .. } => ModelKind::Sp3x,
            Self::Sp3d => ModelKind::Sp3d,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SectionCounts {
    pub points: usize,
    pub normals: usize,
    pub faces: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub position: Vec3,
    /// Present only in `SP3X` models.
    pub flags: Option<i32>,
}

impl Point {
    pub fn render_flags(&self) -> Option<FaceFlags> {
        self.flags.map(FaceFlags::from_raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct VertexRef {
    pub point_index: i32,
    pub normal_index: i32,
    pub u: f32,
    pub v: f32,
}

impl ReadRecord for VertexRef {
    fn read_record<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        Ok(Self {
            point_index: reader.read_i32()?,
            normal_index: reader.read_i32()?,
            u: reader.read_f32()?,
            v: reader.read_f32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Face {
    pub texture_name: FixedString<32>,
    /// 3 for triangles, 4 for quads.
    pub face_type: i32,
    /// Always four slots on disk; triangles leave the last one unused.
    pub vertices: [VertexRef; FACE_SLOTS],
    /// Present only in `SP3X` models.
    pub face_flags: Option<i32>,
}

impl Face {
    /// Number of meaningful slots. Anything that isn't a triangle is
    /// treated as a quad.
    pub fn corner_count(&self) -> usize {
        if self.face_type == 3 { 3 } else { 4 }
    }

    pub fn corners(&self) -> &[VertexRef] {
        &self.vertices[..self.corner_count()]
    }

    pub fn flags(&self) -> Option<FaceFlags> {
        self.face_flags.map(FaceFlags::from_raw)
    }
}

/// Trailing `SS3D` block. Its counts mirror [`SectionCounts`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Supplement {
    pub point_count: i32,
    pub face_count: i32,
    pub normal_count: i32,
    pub byte_count: i32,
    /// One byte per point, face and normal, usually 0 or 1.
    pub tiny_bools: Vec<u8>,
    /// `byte_count / 4` entries.
    pub indexes: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Model {
    pub header: ModelHeader,
    pub counts: SectionCounts,
    pub points: Vec<Point>,
    pub normals: Vec<Vec3>,
    pub faces: Vec<Face>,
    pub supplement: Option<Supplement>,
}

impl Model {
    pub fn kind(&self) -> ModelKind {
        self.header.kind()
    }
}

/// Decodes everything after the signature of a model container.
pub fn decode_model<R: BufRead>(
    reader: &mut Reader<R>,
    kind: ModelKind,
    options: &DecodeOptions,
) -> Result<Model> {
    let mut header = read_model_header(reader, kind)?;
    let counts = read_section_counts(reader)?;
    if let ModelHeader::Sp3x { point_block_reserved, .. } = &mut header {
        *point_block_reserved = reader.read_u32()?;
    }

    let points = read_points(reader, kind, counts.points)?;
    let normals: Vec<Vec3> = reader.read_array(counts.normals)?;
    let faces = read_faces(reader, kind, counts.faces)?;

    if options.validate_indices {
        for (index, face) in faces.iter().enumerate() {
            validate_face(index, face, &counts)?;
        }
    }

    let supplement = if reader.is_exhausted()? {
        debug!("no supplement block");
        None
    } else {
        let supplement = read_supplement(reader)?;
        check_supplement(&supplement, &counts, options)?;
        Some(supplement)
    };

    Ok(Model {
        header,
        counts,
        points,
        normals,
        faces,
        supplement,
    })
}

/// Reads the version fields. The `SP3X` reserved word comes after the
/// section counts and is filled in by the caller.
fn read_model_header<R: BufRead>(reader: &mut Reader<R>, kind: ModelKind) -> Result<ModelHeader> {
    match kind {
        ModelKind::Sp3x => {
            let major_version = reader.read_i32()?;
            if major_version != MAJOR_VERSION {
                return Err(DecodeError::VersionMismatch {
                    field: "major",
                    expected: MAJOR_VERSION,
                    actual: major_version,
                });
            }
            let minor_version = reader.read_i32()?;
            if minor_version != MINOR_VERSION {
                return Err(DecodeError::VersionMismatch {
                    field: "minor",
                    expected: MINOR_VERSION,
                    actual: minor_version,
                });
            }
            debug!("version {major_version}.{minor_version:#x}");
            Ok(ModelHeader::Sp3x {
                major_version,
                minor_version,
                point_block_reserved: 0,
            })
        }
        ModelKind::Sp3d => Ok(ModelHeader::Sp3d),
    }
}

fn read_section_counts<R: BufRead>(reader: &mut Reader<R>) -> Result<SectionCounts> {
    let points = reader.read_i32()?;
    let normals = reader.read_i32()?;
    let faces = reader.read_i32()?;
    let counts = SectionCounts {
        points: reader.count("point", points.into())?,
        normals: reader.count("normal", normals.into())?,
        faces: reader.count("face", faces.into())?,
    };
    debug!(
        "{} points, {} normals, {} faces",
        counts.points, counts.normals, counts.faces
    );
    Ok(counts)
}

fn read_points<R: BufRead>(
    reader: &mut Reader<R>,
    kind: ModelKind,
    count: usize,
) -> Result<Vec<Point>> {
    let points = match kind {
        ModelKind::Sp3x => reader.read_records(count, |r| {
            Ok(Point {
                position: r.read_vec3()?,
                flags: Some(r.read_i32()?),
            })
        })?,
        ModelKind::Sp3d => reader.read_records(count, |r| {
            Ok(Point {
                position: r.read_vec3()?,
                flags: None,
            })
        })?,
    };

    for (i, point) in points.iter().enumerate() {
        trace!("point {i}: {:?} flags {:?}", point.position, point.render_flags());
    }
    Ok(points)
}

fn read_faces<R: BufRead>(
    reader: &mut Reader<R>,
    kind: ModelKind,
    count: usize,
) -> Result<Vec<Face>> {
    reader.read_records(count, |r| {
        let texture_name = r.read_fixed_string::<32>()?;
        let face_type = r.read_i32()?;
        let vertices = [
            VertexRef::read_record(r)?,
            VertexRef::read_record(r)?,
            VertexRef::read_record(r)?,
            VertexRef::read_record(r)?,
        ];
        let face_flags = if kind.has_flags() { Some(r.read_i32()?) } else { None };

        let face = Face {
            texture_name,
            face_type,
            vertices,
            face_flags,
        };
        trace!(
            "face: texture {:?} type {} flags {:?} slots {:?}",
            face.texture_name, face.face_type, face.flags(), face.vertices
        );
        Ok(face)
    })
}

fn validate_face(index: usize, face: &Face, counts: &SectionCounts) -> Result<()> {
    for (slot, vertex) in face.corners().iter().enumerate() {
        check_index(index, slot, "point", vertex.point_index, counts.points)?;
        check_index(index, slot, "normal", vertex.normal_index, counts.normals)?;
    }
    Ok(())
}

fn check_index(
    face: usize,
    slot: usize,
    kind: &'static str,
    index: i32,
    count: usize,
) -> Result<()> {
    match usize::try_from(index) {
        Ok(i) if i < count => Ok(()),
        _ => Err(DecodeError::IndexOutOfRange {
            face,
            slot,
            kind,
            index,
            count,
        }),
    }
}

fn read_supplement<R: BufRead>(reader: &mut Reader<R>) -> Result<Supplement> {
    let signature = reader.read_tag()?;
    if signature.0 != SS3D_SIGNATURE {
        return Err(DecodeError::BadSupplementSignature(signature));
    }

    let point_count = reader.read_i32()?;
    let face_count = reader.read_i32()?;
    let normal_count = reader.read_i32()?;
    let byte_count = reader.read_i32()?;
    debug!(
        "supplement: {point_count} points, {face_count} faces, \
         {normal_count} normals, {byte_count} bytes"
    );

    let bool_count = reader.count("supplement point", point_count.into())?
        + reader.count("supplement face", face_count.into())?
        + reader.count("supplement normal", normal_count.into())?;
    let bool_count = reader.count("supplement flag", bool_count as i64)?;
    let index_count = reader.count("supplement byte", byte_count.into())? / 4;

    let tiny_bools = reader.read_bytes(bool_count)?;
    let indexes = reader.read_i32_array(index_count)?;
    trace!("supplement flags {tiny_bools:?} indexes {indexes:?}");

    Ok(Supplement {
        point_count,
        face_count,
        normal_count,
        byte_count,
        tiny_bools,
        indexes,
    })
}

/// Compares the supplement's copies of the section counts with the real
/// ones. A mismatch only warns unless strict mode is on.
fn check_supplement(
    supplement: &Supplement,
    counts: &SectionCounts,
    options: &DecodeOptions,
) -> Result<()> {
    let pairs = [
        ("point", counts.points, supplement.point_count),
        ("face", counts.faces, supplement.face_count),
        ("normal", counts.normals, supplement.normal_count),
    ];
    for (what, section, copy) in pairs {
        if usize::try_from(copy).ok() == Some(section) {
            continue;
        }
        if options.strict_supplement {
            return Err(DecodeError::SupplementMismatch {
                what,
                section,
                supplement: copy,
            });
        }
        warn!("supplement {what} count {copy} does not match section count {section}");
    }
    Ok(())
}

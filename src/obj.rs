//! Wavefront OBJ export for decoded models.
//!
//! Output order is all `v`, all `vn`, then one `vt` per used face slot,
//! then the `f` lines. Face tuples reuse the point index as the texture
//! coordinate index.

use crate::model::Model;
use std::io::{self, Write};

pub fn write_obj<W: Write>(model: &Model, out: &mut W) -> io::Result<()> {
    for point in &model.points {
        let [x, y, z] = point.position;
        writeln!(out, "v {x:.6} {y:.6} {z:.6}")?;
    }

    for [x, y, z] in &model.normals {
        writeln!(out, "vn {x:.6} {y:.6} {z:.6}")?;
    }

    for face in &model.faces {
        for corner in face.corners() {
            writeln!(out, "vt {:.6} {:.6}", corner.u, corner.v)?;
        }
    }

    for face in &model.faces {
        write!(out, "f")?;
        for corner in face.corners() {
            let point = i64::from(corner.point_index) + 1;
            let normal = i64::from(corner.normal_index) + 1;
            write!(out, " {point}/{point}/{normal}")?;
        }
        writeln!(out)?;
    }

    Ok(())
}

pub fn model_to_obj_bytes(model: &Model) -> io::Result<Vec<u8>> {
    let mut output = Vec::new();
    write_obj(model, &mut output)?;
    Ok(output)
}

//! Re-encodes decoded containers in their original byte layout.

use crate::model::{Face, Model, ModelHeader, ModelKind, Supplement, VertexRef};
use crate::types::{SS3D_SIGNATURE, WVR1_SIGNATURE};
use crate::world::{NetHeader, PlacedObject, SubNet, World};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

fn write_count<W: Write>(writer: &mut W, count: usize) -> io::Result<()> {
    let count = i32::try_from(count).map_err(io::Error::other)?;
    writer.write_i32::<LittleEndian>(count)
}

fn write_vec3<W: Write>(writer: &mut W, v: &[f32; 3]) -> io::Result<()> {
    for &c in v {
        writer.write_f32::<LittleEndian>(c)?;
    }
    Ok(())
}

pub fn write_model(model: &Model) -> io::Result<Vec<u8>> {
    let mut writer = Vec::new();
    let kind = model.kind();

    writer.write_u32::<LittleEndian>(kind.format().signature())?;
    if let ModelHeader::Sp3x { major_version, minor_version, .. } = model.header {
        writer.write_i32::<LittleEndian>(major_version)?;
        writer.write_i32::<LittleEndian>(minor_version)?;
    }

    write_count(&mut writer, model.counts.points)?;
    write_count(&mut writer, model.counts.normals)?;
    write_count(&mut writer, model.counts.faces)?;

    match model.header {
        ModelHeader::Sp3x { point_block_reserved, .. } => {
            writer.write_u32::<LittleEndian>(point_block_reserved)?;
            for point in &model.points {
                write_vec3(&mut writer, &point.position)?;
                writer.write_i32::<LittleEndian>(point.flags.unwrap_or(0))?;
            }
        }
        ModelHeader::Sp3d => {
            for point in &model.points {
                write_vec3(&mut writer, &point.position)?;
            }
        }
    }

    for normal in &model.normals {
        write_vec3(&mut writer, normal)?;
    }

    for face in &model.faces {
        write_face(&mut writer, face, kind)?;
    }

    if let Some(supplement) = &model.supplement {
        write_supplement(&mut writer, supplement)?;
    }

    Ok(writer)
}

fn write_vertex<W: Write>(writer: &mut W, vertex: &VertexRef) -> io::Result<()> {
    writer.write_i32::<LittleEndian>(vertex.point_index)?;
    writer.write_i32::<LittleEndian>(vertex.normal_index)?;
    writer.write_f32::<LittleEndian>(vertex.u)?;
    writer.write_f32::<LittleEndian>(vertex.v)
}

fn write_face<W: Write>(writer: &mut W, face: &Face, kind: ModelKind) -> io::Result<()> {
    writer.write_all(face.texture_name.as_bytes())?;
    writer.write_i32::<LittleEndian>(face.face_type)?;
    for vertex in &face.vertices {
        write_vertex(writer, vertex)?;
    }
    if kind == ModelKind::Sp3x {
        writer.write_i32::<LittleEndian>(face.face_flags.unwrap_or(0))?;
    }
    Ok(())
}

fn write_supplement<W: Write>(writer: &mut W, supplement: &Supplement) -> io::Result<()> {
    writer.write_u32::<LittleEndian>(SS3D_SIGNATURE)?;
    writer.write_i32::<LittleEndian>(supplement.point_count)?;
    writer.write_i32::<LittleEndian>(supplement.face_count)?;
    writer.write_i32::<LittleEndian>(supplement.normal_count)?;
    writer.write_i32::<LittleEndian>(supplement.byte_count)?;
    writer.write_all(&supplement.tiny_bools)?;
    for &index in &supplement.indexes {
        writer.write_i32::<LittleEndian>(index)?;
    }
    Ok(())
}

pub fn write_world(world: &World) -> io::Result<Vec<u8>> {
    let mut writer = Vec::new();

    writer.write_u32::<LittleEndian>(WVR1_SIGNATURE)?;
    writer.write_i32::<LittleEndian>(world.header.x_size)?;
    writer.write_i32::<LittleEndian>(world.header.y_size)?;

    for &elevation in &world.terrain.elevations {
        writer.write_i16::<LittleEndian>(elevation)?;
    }
    for &index in &world.terrain.texture_indices {
        writer.write_i16::<LittleEndian>(index)?;
    }
    for name in &world.terrain.texture_names {
        writer.write_all(name.as_bytes())?;
    }

    for object in &world.objects {
        write_object(&mut writer, object)?;
    }

    for net in &world.nets {
        write_net_header(&mut writer, &net.header)?;
        for subnet in &net.subnets {
            write_subnet(&mut writer, subnet)?;
        }
        let [x, y] = net.terminator;
        writer.write_f32::<LittleEndian>(x)?;
        writer.write_f32::<LittleEndian>(y)?;
    }
    write_net_header(&mut writer, &world.end_marker)?;

    Ok(writer)
}

fn write_object<W: Write>(writer: &mut W, object: &PlacedObject) -> io::Result<()> {
    write_vec3(writer, &object.position)?;
    writer.write_f32::<LittleEndian>(object.heading)?;
    writer.write_all(object.model_name.as_bytes())
}

fn write_net_header<W: Write>(writer: &mut W, header: &NetHeader) -> io::Result<()> {
    writer.write_all(header.name.as_bytes())?;
    for &word in &header.reserved {
        writer.write_u32::<LittleEndian>(word)?;
    }
    writer.write_i32::<LittleEndian>(header.net_type)?;
    write_vec3(writer, &header.position)?;
    writer.write_f32::<LittleEndian>(header.scale)
}

fn write_subnet<W: Write>(writer: &mut W, subnet: &SubNet) -> io::Result<()> {
    writer.write_f32::<LittleEndian>(subnet.x)?;
    writer.write_f32::<LittleEndian>(subnet.y)?;
    write_vec3(writer, &subnet.placement.position)?;
    writer.write_f32::<LittleEndian>(subnet.placement.stepping)?;
    for &word in &subnet.placement.reserved {
        writer.write_u32::<LittleEndian>(word)?;
    }
    Ok(())
}

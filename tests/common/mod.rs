#![allow(dead_code)]

use p3d_convert::model::{Face, Model, ModelHeader, Point, SectionCounts, Supplement, VertexRef};
use p3d_convert::types::{FixedString, GRID_SIZE, PLACED_OBJECT_COUNT, TEXTURE_NAME_COUNT};
use p3d_convert::world::{
    NetFeature, NetHeader, PlacedObject, SubNet, SubNetPlacement, TerrainGrid, World, WorldHeader,
};

pub fn corner(point_index: i32, normal_index: i32, u: f32, v: f32) -> VertexRef {
    VertexRef { point_index, normal_index, u, v }
}

/// A model with `points` points, `normals` normals and `faces` faces,
/// alternating triangles and quads. Every index stays in range.
pub fn model(header: ModelHeader, points: usize, normals: usize, faces: usize) -> Model {
    let flagged = matches!(header, ModelHeader::Sp3x { .. });
    let points_vec = (0..points)
        .map(|i| Point {
            position: [i as f32, (i * 2) as f32, -(i as f32) / 4.0],
            flags: flagged.then_some(i as i32 * 0x10),
        })
        .collect();
    let normals_vec = (0..normals).map(|i| [0.0, i as f32, 1.0]).collect();
    let faces_vec = (0..faces)
        .map(|i| {
            let slot = |k: usize| {
                corner(
                    ((i + k) % points) as i32,
                    ((i + k) % normals) as i32,
                    k as f32 / 4.0,
                    1.0 - k as f32 / 4.0,
                )
            };
            Face {
                texture_name: FixedString::new(&format!("data\\tex{i}.pac")),
                face_type: if i % 2 == 0 { 3 } else { 4 },
                vertices: [slot(0), slot(1), slot(2), slot(3)],
                face_flags: flagged.then_some(0x0020_0010),
            }
        })
        .collect();

    let supplement = flagged.then(|| Supplement {
        point_count: points as i32,
        face_count: faces as i32,
        normal_count: normals as i32,
        byte_count: 12,
        tiny_bools: (0..points + faces + normals).map(|i| (i % 2) as u8).collect(),
        indexes: vec![3, 1, 4],
    });

    Model {
        header,
        counts: SectionCounts { points, normals, faces },
        points: points_vec,
        normals: normals_vec,
        faces: faces_vec,
        supplement,
    }
}

pub fn sp3x_header() -> ModelHeader {
    ModelHeader::Sp3x {
        major_version: 0x1C,
        minor_version: 0x99,
        point_block_reserved: 0,
    }
}

fn net_header(name: &str, net_type: i32) -> NetHeader {
    NetHeader {
        name: FixedString::new(name),
        reserved: [0x00cd_9100, 0x00bf_d400, 0x47, 0, 0x0069_fbb0],
        net_type,
        position: [0.152, 0.15, 0.1],
        scale: 4.5,
    }
}

pub fn world() -> World {
    let cells = GRID_SIZE * GRID_SIZE;
    let terrain = TerrainGrid {
        elevations: (0..cells).map(|i| (i % 2000) as i16 - 1000).collect(),
        texture_indices: (0..cells).map(|i| (i % TEXTURE_NAME_COUNT) as i16).collect(),
        texture_names: (0..TEXTURE_NAME_COUNT)
            .map(|i| FixedString::new(&format!("LandText\\t{i}.pac")))
            .collect(),
    };
    let objects = (0..PLACED_OBJECT_COUNT)
        .map(|i| PlacedObject {
            position: [i as f32, 0.5, (i % 128) as f32],
            heading: (i % 360) as f32,
            model_name: FixedString::new("Data3d\\Smrk.p3d"),
        })
        .collect();
    let subnet = |x: f32, y: f32| SubNet {
        x,
        y,
        placement: SubNetPlacement {
            position: [x, y, 0.1],
            stepping: 50.0,
            reserved: [0x0046_931a, 0x0073_3760],
        },
    };
    let nets = vec![
        NetFeature {
            header: net_header("LandText\\Silnice.pac", 0),
            subnets: vec![subnet(1.0, 2.0), subnet(0.0, 3.0), subnet(4.0, 0.0)],
            terminator: [0.0, 0.0],
        },
        NetFeature {
            header: net_header("LandText\\Cesta.pac", 2),
            subnets: Vec::new(),
            terminator: [0.0, 0.0],
        },
    ];

    World {
        header: WorldHeader { x_size: 128, y_size: 128 },
        terrain,
        objects,
        nets,
        end_marker: net_header("EndOfNets", 0),
    }
}

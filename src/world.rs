//! WVR world decoding.
//!
//! After the `1WVR` signature and the grid size come three fixed-size
//! sections (terrain grid, texture names, placed objects) and then a list
//! of nets with no count field. The net list ends at a header named
//! `EndOfNets`; each net's subnet list ends at a subnet placed at (0, 0).

use crate::error::{DecodeError, Result};
use crate::reader::{ReadRecord, Reader};
use crate::types::{
    END_OF_NETS, FixedString, GRID_SIZE, PLACED_OBJECT_COUNT, TEXTURE_NAME_COUNT, Vec3,
};
use log::{debug, trace};
use serde::Serialize;
use std::io::BufRead;
use std::iter::FusedIterator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorldHeader {
    pub x_size: i32,
    pub y_size: i32,
}

/// 128x128 elevation and texture-index cells plus the texture name table.
/// Both matrices are stored row by row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerrainGrid {
    /// Centimetres.
    pub elevations: Vec<i16>,
    pub texture_indices: Vec<i16>,
    pub texture_names: Vec<FixedString<32>>,
}

impl TerrainGrid {
    fn cell(row: usize, col: usize) -> Option<usize> {
        (row < GRID_SIZE && col < GRID_SIZE).then_some(row * GRID_SIZE + col)
    }

    pub fn elevation(&self, row: usize, col: usize) -> Option<i16> {
        Self::cell(row, col).map(|i| self.elevations[i])
    }

    pub fn texture_index(&self, row: usize, col: usize) -> Option<i16> {
        Self::cell(row, col).map(|i| self.texture_indices[i])
    }

    /// Texture name for a cell, if its index points into the table.
    pub fn texture_name(&self, row: usize, col: usize) -> Option<&FixedString<32>> {
        let index = self.texture_index(row, col)?;
        self.texture_names.get(usize::try_from(index).ok()?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedObject {
    /// Grid units.
    pub position: Vec3,
    /// Degrees.
    pub heading: f32,
    pub model_name: FixedString<48>,
}

impl ReadRecord for PlacedObject {
    fn read_record<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        Ok(Self {
            position: reader.read_vec3()?,
            heading: reader.read_f32()?,
            model_name: reader.read_fixed_string()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetHeader {
    pub name: FixedString<24>,
    pub reserved: [u32; 5],
    pub net_type: i32,
    pub position: Vec3,
    pub scale: f32,
}

impl NetHeader {
    pub fn is_end_marker(&self) -> bool {
        self.name.trimmed() == END_OF_NETS
    }
}

impl ReadRecord for NetHeader {
    fn read_record<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        Ok(Self {
            name: reader.read_fixed_string()?,
            reserved: [
                reader.read_u32()?,
                reader.read_u32()?,
                reader.read_u32()?,
                reader.read_u32()?,
                reader.read_u32()?,
            ],
            net_type: reader.read_i32()?,
            position: reader.read_vec3()?,
            scale: reader.read_f32()?,
        })
    }
}

/// Payload carried by every subnet except the (0, 0) terminator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubNetPlacement {
    pub position: Vec3,
    pub stepping: f32,
    pub reserved: [u32; 2],
}

impl ReadRecord for SubNetPlacement {
    fn read_record<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        Ok(Self {
            position: reader.read_vec3()?,
            stepping: reader.read_f32()?,
            reserved: [reader.read_u32()?, reader.read_u32()?],
        })
    }
}

/// A subnet point. The terminator at (0, 0) is never stored, so every
/// subnet here has its placement payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubNet {
    pub x: f32,
    pub y: f32,
    pub placement: SubNetPlacement,
}

impl SubNet {
    /// (0, 0) can't be a real subnet position: the format uses it to end the list.
    pub fn is_terminator(x: f32, y: f32) -> bool {
        x == 0.0 && y == 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetFeature {
    pub header: NetHeader,
    pub subnets: Vec<SubNet>,
    /// The (0, 0) pair that ended the subnet list, as read. Either
    /// coordinate may be `-0.0`.
    pub terminator: [f32; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct World {
    pub header: WorldHeader,
    pub terrain: TerrainGrid,
    pub objects: Vec<PlacedObject>,
    pub nets: Vec<NetFeature>,
    /// The `EndOfNets` header, kept whole so the world re-encodes exactly.
    pub end_marker: NetHeader,
}

/// Subnets of one net, up to and excluding its (0, 0) terminator.
pub struct SubNets<'a, R> {
    reader: &'a mut Reader<R>,
    read: usize,
    terminator: Option<[f32; 2]>,
    done: bool,
}

impl<'a, R: BufRead> SubNets<'a, R> {
    pub fn new(reader: &'a mut Reader<R>) -> Self {
        Self {
            reader,
            read: 0,
            terminator: None,
            done: false,
        }
    }

    /// The terminating pair, once iteration reached it.
    pub fn into_terminator(self) -> Option<[f32; 2]> {
        self.terminator
    }

    fn read_next(&mut self) -> Result<Option<SubNet>> {
        let x = self.reader.read_f32()?;
        let y = self.reader.read_f32()?;
        if SubNet::is_terminator(x, y) {
            self.terminator = Some([x, y]);
            return Ok(None);
        }
        self.read = self.reader.count("subnet", self.read as i64 + 1)?;
        let placement = SubNetPlacement::read_record(self.reader)?;
        Ok(Some(SubNet { x, y, placement }))
    }
}

impl<R: BufRead> Iterator for SubNets<'_, R> {
    type Item = Result<SubNet>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_next() {
            Ok(Some(subnet)) => Some(Ok(subnet)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<R: BufRead> FusedIterator for SubNets<'_, R> {}

/// Nets of a world, up to and excluding the `EndOfNets` header.
///
/// Each net's subnets are drained through [`SubNets`] before the net is
/// yielded, so the stream is always positioned at the next net header.
pub struct NetFeatures<'a, R> {
    reader: &'a mut Reader<R>,
    read: usize,
    end_marker: Option<NetHeader>,
    done: bool,
}

impl<'a, R: BufRead> NetFeatures<'a, R> {
    pub fn new(reader: &'a mut Reader<R>) -> Self {
        Self {
            reader,
            read: 0,
            end_marker: None,
            done: false,
        }
    }

    /// The terminating header, once iteration reached it.
    pub fn into_end_marker(self) -> Option<NetHeader> {
        self.end_marker
    }

    fn read_next(&mut self) -> Result<Option<NetFeature>> {
        let header = NetHeader::read_record(self.reader)?;
        if header.is_end_marker() {
            self.end_marker = Some(header);
            return Ok(None);
        }
        self.read = self.reader.count("net", self.read as i64 + 1)?;

        let mut subnet_iter = SubNets::new(self.reader);
        let subnets = subnet_iter.by_ref().collect::<Result<Vec<_>>>()?;
        let terminator = subnet_iter.into_terminator().unwrap_or([0.0, 0.0]);
        trace!(
            "net {:?}: type {} at {:?} scale {} with {} subnets",
            header.name,
            header.net_type,
            header.position,
            header.scale,
            subnets.len()
        );
        Ok(Some(NetFeature {
            header,
            subnets,
            terminator,
        }))
    }
}

impl<R: BufRead> Iterator for NetFeatures<'_, R> {
    type Item = Result<NetFeature>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_next() {
            Ok(Some(net)) => Some(Ok(net)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<R: BufRead> FusedIterator for NetFeatures<'_, R> {}

/// Decodes everything after the signature of a world container.
pub fn decode_world<R: BufRead>(reader: &mut Reader<R>) -> Result<World> {
    let header = read_world_header(reader)?;
    let terrain = read_terrain(reader)?;

    let objects: Vec<PlacedObject> = reader.read_array(PLACED_OBJECT_COUNT)?;
    for (i, object) in objects.iter().enumerate() {
        trace!(
            "object {i}: {:?} at {:?} heading {}",
            object.model_name, object.position, object.heading
        );
    }

    let mut net_iter = NetFeatures::new(reader);
    let nets = net_iter.by_ref().collect::<Result<Vec<_>>>()?;
    let end_marker = net_iter.into_end_marker();
    let end_marker = end_marker.ok_or(DecodeError::UnexpectedEof { offset: reader.offset() })?;
    debug!("{} nets", nets.len());

    Ok(World {
        header,
        terrain,
        objects,
        nets,
        end_marker,
    })
}

fn read_world_header<R: BufRead>(reader: &mut Reader<R>) -> Result<WorldHeader> {
    let x_size = reader.read_i32()?;
    check_dimension("x", x_size)?;
    let y_size = reader.read_i32()?;
    check_dimension("y", y_size)?;
    debug!("grid {x_size}x{y_size}");
    Ok(WorldHeader { x_size, y_size })
}

fn check_dimension(axis: &'static str, actual: i32) -> Result<()> {
    if actual != GRID_SIZE as i32 {
        return Err(DecodeError::InvalidDimensions {
            axis,
            expected: GRID_SIZE as i32,
            actual,
        });
    }
    Ok(())
}

fn read_terrain<R: BufRead>(reader: &mut Reader<R>) -> Result<TerrainGrid> {
    let elevations = reader.read_i16_array(GRID_SIZE * GRID_SIZE)?;
    let texture_indices = reader.read_i16_array(GRID_SIZE * GRID_SIZE)?;
    let texture_names = reader.read_records(TEXTURE_NAME_COUNT, |r| r.read_fixed_string::<32>())?;
    for (i, name) in texture_names.iter().enumerate() {
        trace!("texture {i}: {name:?}");
    }
    Ok(TerrainGrid {
        elevations,
        texture_indices,
        texture_names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{LittleEndian, WriteBytesExt};

    fn net_header(out: &mut Vec<u8>, name: &str) {
        out.extend_from_slice(FixedString::<24>::new(name).as_bytes());
        for word in [0x00cd_9100u32, 0x00bf_d400, 0x47, 0, 0x0069_fbb0] {
            out.write_u32::<LittleEndian>(word).unwrap();
        }
        out.write_i32::<LittleEndian>(1).unwrap();
        for c in [0.152f32, 0.15, 0.1, 3.5] {
            out.write_f32::<LittleEndian>(c).unwrap();
        }
    }

    fn subnet(out: &mut Vec<u8>, x: f32, y: f32) {
        out.write_f32::<LittleEndian>(x).unwrap();
        out.write_f32::<LittleEndian>(y).unwrap();
        for c in [1.0f32, 2.0, 3.0, 50.0] {
            out.write_f32::<LittleEndian>(c).unwrap();
        }
        out.write_u32::<LittleEndian>(0x0046_931a).unwrap();
        out.write_u32::<LittleEndian>(0x0098_0778).unwrap();
    }

    fn terminator(out: &mut Vec<u8>) {
        out.write_f32::<LittleEndian>(0.0).unwrap();
        out.write_f32::<LittleEndian>(0.0).unwrap();
    }

    #[test]
    fn end_of_nets_stops_before_any_subnet() {
        let mut data = Vec::new();
        net_header(&mut data, "EndOfNets");
        data.extend_from_slice(&[0xAA; 8]);

        let mut reader = Reader::new(&data[..]);
        let mut nets = NetFeatures::new(&mut reader);
        assert!(nets.next().is_none());
        assert!(nets.next().is_none());
        assert!(nets.into_end_marker().unwrap().is_end_marker());
        assert_eq!(reader.offset(), 64);
    }

    #[test]
    fn zero_subnet_ends_only_its_own_net() {
        let mut data = Vec::new();
        net_header(&mut data, "LandText\\Silnice.pac");
        subnet(&mut data, 1.0, 2.0);
        subnet(&mut data, 0.0, 5.0);
        terminator(&mut data);
        net_header(&mut data, "LandText\\Cesta.pac");
        terminator(&mut data);
        net_header(&mut data, "EndOfNets");

        let mut reader = Reader::new(&data[..]);
        let nets = NetFeatures::new(&mut reader)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(nets.len(), 2);
        assert_eq!(nets[0].subnets.len(), 2);
        // x == 0 alone isn't a terminator
        assert_eq!((nets[0].subnets[1].x, nets[0].subnets[1].y), (0.0, 5.0));
        assert_eq!(nets[0].subnets[0].placement.stepping, 50.0);
        assert_eq!(nets[0].header.reserved[2], 0x47);
        assert_eq!(nets[1].header.name.to_string_lossy(), "LandText\\Cesta.pac");
        assert!(nets[1].subnets.is_empty());
        assert!(reader.is_exhausted().unwrap());
    }

    #[test]
    fn negative_zero_terminator_is_kept() {
        let mut data = Vec::new();
        net_header(&mut data, "LandText\\Silnice.pac");
        subnet(&mut data, 1.0, 2.0);
        data.write_f32::<LittleEndian>(-0.0).unwrap();
        data.write_f32::<LittleEndian>(0.0).unwrap();
        net_header(&mut data, "EndOfNets");

        let mut reader = Reader::new(&data[..]);
        let nets = NetFeatures::new(&mut reader)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(nets[0].subnets.len(), 1);
        let [x, y] = nets[0].terminator;
        assert!(x == 0.0 && x.is_sign_negative());
        assert!(y.is_sign_positive());
        assert!(reader.is_exhausted().unwrap());
    }

    #[test]
    fn name_with_suffix_after_nul_still_ends_list() {
        let mut data = Vec::new();
        net_header(&mut data, "EndOfNets");
        data[10..14].copy_from_slice(b"junk");

        let mut reader = Reader::new(&data[..]);
        assert!(NetFeatures::new(&mut reader).next().is_none());
    }

    #[test]
    fn name_prefixed_by_sentinel_is_a_net() {
        let mut data = Vec::new();
        net_header(&mut data, "EndOfNetsX");
        terminator(&mut data);
        net_header(&mut data, "EndOfNets");

        let mut reader = Reader::new(&data[..]);
        let nets = NetFeatures::new(&mut reader)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(nets.len(), 1);
    }

    #[test]
    fn missing_net_terminator_is_eof() {
        let mut data = Vec::new();
        net_header(&mut data, "Road");
        subnet(&mut data, 1.0, 1.0);

        let mut reader = Reader::new(&data[..]);
        let mut nets = NetFeatures::new(&mut reader);
        assert!(matches!(nets.next(), Some(Err(DecodeError::UnexpectedEof { .. }))));
        assert!(nets.next().is_none());
    }

    #[test]
    fn subnet_iterator_is_lazy() {
        let mut data = Vec::new();
        subnet(&mut data, 3.0, 4.0);
        terminator(&mut data);
        data.extend_from_slice(&[1, 2, 3]);

        let mut reader = Reader::new(&data[..]);
        let mut subnets = SubNets::new(&mut reader);
        assert_eq!(subnets.next().unwrap().unwrap().x, 3.0);
        assert!(subnets.next().is_none());
        assert!(subnets.next().is_none());
        assert_eq!(reader.offset(), 40);
    }

    #[test]
    fn rejects_wrong_grid_size() {
        let mut data = Vec::new();
        data.write_i32::<LittleEndian>(128).unwrap();
        data.write_i32::<LittleEndian>(256).unwrap();

        let mut reader = Reader::new(&data[..]);
        assert!(matches!(
            decode_world(&mut reader),
            Err(DecodeError::InvalidDimensions { axis: "y", expected: 128, actual: 256 })
        ));
    }

    #[test]
    fn terrain_section_has_fixed_size() {
        let size = GRID_SIZE * GRID_SIZE * 2 * 2 + TEXTURE_NAME_COUNT * 32;
        let mut data = vec![0u8; size];
        // row 1, column 2 elevation
        let cell = GRID_SIZE + 2;
        data[cell * 2..cell * 2 + 2].copy_from_slice(&(-150i16).to_le_bytes());
        let index_base = GRID_SIZE * GRID_SIZE * 2;
        data[index_base + cell * 2] = 1;
        let names_base = index_base * 2;
        data[names_base + 32..names_base + 32 + 15].copy_from_slice(b"LandText\\mo.pac");
        data.extend_from_slice(b"tail");

        let mut reader = Reader::new(&data[..]);
        let terrain = read_terrain(&mut reader).unwrap();
        assert_eq!(reader.offset() as usize, size);
        assert_eq!(terrain.elevation(1, 2), Some(-150));
        assert_eq!(terrain.elevation(128, 0), None);
        assert_eq!(terrain.texture_name(1, 2).unwrap().to_string_lossy(), "LandText\\mo.pac");
        assert_eq!(terrain.texture_name(0, 0).unwrap().to_string_lossy(), "");
    }
}

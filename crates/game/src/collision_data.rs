//! Decoder for level collision command streams.
//!
//! Level geometry ships as a flat list of 16-bit words:
//!
//! ```text
//! COL_INIT  count  x y z  x y z ...            vertex list
//! <type>    count  i0 i1 i2 [force] ...        one triangle group per type
//! COL_TRI_STOP                                 end of the triangle groups
//! COL_WATER_BOX_INIT  count  id x0 z0 x1 z1 y  water boxes (optional)
//! COL_END
//! ```
//!
//! Surface types below `COL_INIT` and from `0x65` upward start a triangle
//! group. A force word follows each triangle of types that push, or of every
//! type when the level is built with `all_surfaces_have_force`.

use glam::IVec3;
use hopper_physics::{CollisionWorld, SurfaceType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Starts the vertex list.
pub const COL_INIT: i16 = 0x0040;
/// Ends the triangle groups.
pub const COL_TRI_STOP: i16 = 0x0041;
/// Ends the stream.
pub const COL_END: i16 = 0x0042;
/// Starts a special object list.
pub const COL_SPECIAL_INIT: i16 = 0x0043;
/// Starts the water box list.
pub const COL_WATER_BOX_INIT: i16 = 0x0044;

/// Lowest surface type above the command range.
const HIGH_SURFACE_TYPES: i16 = 0x0065;

/// Errors that can occur while decoding collision data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollisionDataError {
    #[error("collision data ended early at word {offset}")]
    Truncated { offset: usize },

    #[error("negative count {count} at word {offset}")]
    NegativeCount { count: i16, offset: usize },

    #[error("triangle group at word {offset} precedes the vertex list")]
    NoVertices { offset: usize },

    #[error("triangle uses vertex {index} but only {count} are loaded")]
    VertexOutOfRange { index: i16, count: usize },

    #[error("unknown collision command {command:#06x} at word {offset}")]
    UnknownCommand { command: i16, offset: usize },

    #[error("special object list at word {offset} is not supported")]
    SpecialObjects { offset: usize },
}

/// One triangle of the level, before it is turned into a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub vertices: [IVec3; 3],
    pub ty: SurfaceType,
    pub force: i16,
}

/// An axis-aligned water surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterBox {
    pub id: i16,
    pub x0: i16,
    pub z0: i16,
    pub x1: i16,
    pub z1: i16,
    pub height: i16,
}

impl WaterBox {
    /// Two upward-facing triangles covering the box at its water height.
    fn triangles(&self) -> [[IVec3; 3]; 2] {
        let (x0, x1) = (self.x0.min(self.x1) as i32, self.x0.max(self.x1) as i32);
        let (z0, z1) = (self.z0.min(self.z1) as i32, self.z0.max(self.z1) as i32);
        let y = self.height as i32;
        let a = IVec3::new(x0, y, z0);
        let b = IVec3::new(x0, y, z1);
        let c = IVec3::new(x1, y, z1);
        let d = IVec3::new(x1, y, z0);
        [[a, b, c], [a, c, d]]
    }
}

/// How much of a decoded level made it into the world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub surfaces: usize,
    /// Degenerate triangles that were skipped.
    pub dropped: usize,
    pub water_boxes: usize,
}

/// A decoded collision stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionData {
    pub vertices: Vec<IVec3>,
    pub triangles: Vec<Triangle>,
    pub water_boxes: Vec<WaterBox>,
}

/// Cursor over the command words.
struct Reader<'a> {
    words: &'a [i16],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(words: &'a [i16]) -> Self {
        Self { words, offset: 0 }
    }

    fn next(&mut self) -> Result<i16, CollisionDataError> {
        let word = self
            .words
            .get(self.offset)
            .copied()
            .ok_or(CollisionDataError::Truncated {
                offset: self.offset,
            })?;
        self.offset += 1;
        Ok(word)
    }

    fn count(&mut self) -> Result<usize, CollisionDataError> {
        let offset = self.offset;
        let count = self.next()?;
        usize::try_from(count).map_err(|_| CollisionDataError::NegativeCount { count, offset })
    }
}

impl CollisionData {
    /// Decode a command stream.
    ///
    /// `all_surfaces_have_force` must match how the stream was written: it
    /// decides whether every triangle carries a force word.
    pub fn decode(words: &[i16], all_surfaces_have_force: bool) -> Result<Self, CollisionDataError> {
        let mut reader = Reader::new(words);
        let mut data = Self::default();

        loop {
            let offset = reader.offset;
            match reader.next()? {
                COL_INIT => data.read_vertices(&mut reader)?,
                COL_TRI_STOP => continue,
                COL_END => break,
                COL_SPECIAL_INIT => return Err(CollisionDataError::SpecialObjects { offset }),
                COL_WATER_BOX_INIT => data.read_water_boxes(&mut reader)?,
                ty if (0..COL_INIT).contains(&ty) || ty >= HIGH_SURFACE_TYPES => {
                    if data.vertices.is_empty() {
                        return Err(CollisionDataError::NoVertices { offset });
                    }
                    let ty = SurfaceType(ty as u16);
                    let has_force = all_surfaces_have_force || ty.has_force();
                    data.read_triangles(&mut reader, ty, has_force)?;
                }
                command => return Err(CollisionDataError::UnknownCommand { command, offset }),
            }
        }

        log::debug!(
            "Decoded collision data: {} vertices, {} triangles, {} water boxes",
            data.vertices.len(),
            data.triangles.len(),
            data.water_boxes.len()
        );
        Ok(data)
    }

    fn read_vertices(&mut self, reader: &mut Reader<'_>) -> Result<(), CollisionDataError> {
        let count = reader.count()?;
        self.vertices.clear();
        self.vertices.reserve(count);
        for _ in 0..count {
            let x = reader.next()?;
            let y = reader.next()?;
            let z = reader.next()?;
            self.vertices
                .push(IVec3::new(i32::from(x), i32::from(y), i32::from(z)));
        }
        Ok(())
    }

    fn vertex(&self, index: i16) -> Result<IVec3, CollisionDataError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.vertices.get(i).copied())
            .ok_or(CollisionDataError::VertexOutOfRange {
                index,
                count: self.vertices.len(),
            })
    }

    fn read_triangles(
        &mut self,
        reader: &mut Reader<'_>,
        ty: SurfaceType,
        has_force: bool,
    ) -> Result<(), CollisionDataError> {
        let count = reader.count()?;
        for _ in 0..count {
            let i0 = reader.next()?;
            let i1 = reader.next()?;
            let i2 = reader.next()?;
            let force = if has_force { reader.next()? } else { 0 };
            let vertices = [self.vertex(i0)?, self.vertex(i1)?, self.vertex(i2)?];
            self.triangles.push(Triangle { vertices, ty, force });
        }
        Ok(())
    }

    fn read_water_boxes(&mut self, reader: &mut Reader<'_>) -> Result<(), CollisionDataError> {
        let count = reader.count()?;
        for _ in 0..count {
            self.water_boxes.push(WaterBox {
                id: reader.next()?,
                x0: reader.next()?,
                z0: reader.next()?,
                x1: reader.next()?,
                z1: reader.next()?,
                height: reader.next()?,
            });
        }
        Ok(())
    }

    /// Add every triangle and water box to `world` as static surfaces.
    pub fn load_into(&self, world: &mut CollisionWorld) -> LoadStats {
        let mut stats = LoadStats::default();

        for tri in &self.triangles {
            match world.add_static_surface(tri.vertices, tri.ty, tri.force) {
                Some(_) => stats.surfaces += 1,
                None => stats.dropped += 1,
            }
        }

        for water in &self.water_boxes {
            for tri in water.triangles() {
                if world.add_static_surface(tri, SurfaceType::NEW_WATER, 0).is_some() {
                    stats.surfaces += 1;
                }
            }
            stats.water_boxes += 1;
        }

        log::debug!(
            "Loaded {} surfaces ({} dropped, {} water boxes)",
            stats.surfaces,
            stats.dropped,
            stats.water_boxes
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hopper_physics::CollisionConfig;

    /// A 2000x2000 floor at y = 0 as two triangles.
    #[rustfmt::skip]
    fn floor_stream() -> Vec<i16> {
        vec![
            COL_INIT, 4,
            -1000, 0, -1000,
            -1000, 0, 1000,
            1000, 0, 1000,
            1000, 0, -1000,
            SurfaceType::DEFAULT.0 as i16, 2,
            0, 1, 2,
            0, 2, 3,
            COL_TRI_STOP,
            COL_END,
        ]
    }

    #[test]
    fn test_decode_floor() {
        let data = CollisionData::decode(&floor_stream(), false).unwrap();
        assert_eq!(data.vertices.len(), 4);
        assert_eq!(data.triangles.len(), 2);
        assert_eq!(data.triangles[1].vertices[2], IVec3::new(1000, 0, -1000));

        let mut world = CollisionWorld::new(CollisionConfig::default());
        let stats = data.load_into(&mut world);
        assert_eq!(stats.surfaces, 2);
        assert_eq!(world.find_floor(0.0, 100.0, 0.0).height, 0.0);
    }

    #[test]
    fn test_force_word_only_for_pushing_types() {
        let mut words = vec![COL_INIT, 3, 0, 0, 0, 0, 0, 100, 100, 0, 100];
        words.extend([SurfaceType::HORIZONTAL_WIND.0 as i16, 1, 0, 1, 2, 0x2000]);
        words.extend([SurfaceType::WARP.0 as i16, 1, 0, 1, 2]);
        words.extend([COL_TRI_STOP, COL_END]);

        let data = CollisionData::decode(&words, false).unwrap();
        assert_eq!(data.triangles[0].force, 0x2000);
        assert_eq!(data.triangles[1].force, 0);
    }

    #[test]
    fn test_all_surfaces_have_force() {
        let mut words = vec![COL_INIT, 3, 0, 0, 0, 0, 0, 100, 100, 0, 100];
        words.extend([SurfaceType::WARP.0 as i16, 1, 0, 1, 2, 0x0A00]);
        words.extend([COL_TRI_STOP, COL_END]);

        let data = CollisionData::decode(&words, true).unwrap();
        assert_eq!(data.triangles[0].force, 0x0A00);

        // Read without force words, the stream falls out of step.
        assert!(matches!(
            CollisionData::decode(&words, false),
            Err(CollisionDataError::Truncated { .. })
        ));
    }

    #[test]
    fn test_water_boxes_become_water_level() {
        let mut words = floor_stream();
        words.pop();
        words.extend([COL_WATER_BOX_INIT, 1, 0, 500, -500, -500, 500, 300]);
        words.push(COL_END);

        let data = CollisionData::decode(&words, false).unwrap();
        assert_eq!(data.water_boxes.len(), 1);

        let mut world = CollisionWorld::new(CollisionConfig::default());
        let stats = data.load_into(&mut world);
        assert_eq!(stats.water_boxes, 1);
        assert_eq!(world.find_water_level(0.0, 0.0), 300.0);
    }

    #[test]
    fn test_truncated_stream() {
        let mut words = floor_stream();
        words.truncate(10);
        assert_eq!(
            CollisionData::decode(&words, false),
            Err(CollisionDataError::Truncated { offset: 10 })
        );

        // Missing COL_END
        let mut words = floor_stream();
        let len = words.len();
        words.pop();
        assert_eq!(
            CollisionData::decode(&words, false),
            Err(CollisionDataError::Truncated { offset: len - 1 })
        );
    }

    #[test]
    fn test_bad_vertex_index() {
        let words = [COL_INIT, 1, 0, 0, 0, 0, 1, 0, 0, 7, COL_END];
        assert_eq!(
            CollisionData::decode(&words, false),
            Err(CollisionDataError::VertexOutOfRange { index: 7, count: 1 })
        );
    }

    #[test]
    fn test_triangles_need_vertices() {
        let words = [0, 1, 0, 1, 2, COL_END];
        assert_eq!(
            CollisionData::decode(&words, false),
            Err(CollisionDataError::NoVertices { offset: 0 })
        );
    }

    #[test]
    fn test_special_objects_rejected() {
        let words = [COL_INIT, 0, COL_SPECIAL_INIT, 0, COL_END];
        assert_eq!(
            CollisionData::decode(&words, false),
            Err(CollisionDataError::SpecialObjects { offset: 2 })
        );
    }

    #[test]
    #[rustfmt::skip]
    fn test_degenerate_triangles_dropped() {
        let words = [
            COL_INIT, 3, 0, 0, 0, 10, 0, 0, 20, 0, 0,
            0, 1, 0, 1, 2,
            COL_TRI_STOP, COL_END,
        ];
        let data = CollisionData::decode(&words, false).unwrap();
        let mut world = CollisionWorld::new(CollisionConfig::default());
        let stats = data.load_into(&mut world);
        assert_eq!(stats.surfaces, 0);
        assert_eq!(stats.dropped, 1);
    }
}

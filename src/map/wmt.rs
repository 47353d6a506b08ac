/// WEIRD Project
/// `File` map/wmt.rs
/// `Description` WMT text map format loader
/// `Author` TioT2
/// `Last changed` 16.10.2026

use super::{build_map, BuildError, BuildFlags, MapBuildInput, MapSectors, NcPortalBuildData, SectorBuildData, WallBuildData};
use crate::math::*;

/// Camera spawn point
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraSpawn {
    pub location: Vec2,
    pub height: f32,
    /// Rotation around Z, radians
    pub rotation: f32,
} // struct CameraSpawn

/// Parsed .wmt file
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WmtMap {
    pub input: MapBuildInput,
    pub camera: Option<CameraSpawn>,
} // struct WmtMap

/// Map loading error representation structure
#[derive(Clone, Debug, PartialEq)]
pub enum WmtLoadingError {
    NumberParsingError {
        line: usize,
    },
    UnknownLineType(String),
    NotEnoughPointCoordinates,
    NotEnoughCameraParameters,
    NotEnoughSectorVertices,
    NotEnoughPortalParameters,
    /// Portal source sector is not declared yet or has no wall starting at point
    InvalidPortalSource {
        sector: u32,
        point: u32,
    },
    Build(BuildError),
} // enum WmtLoadingError

impl std::fmt::Display for WmtLoadingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NumberParsingError { line } => write!(f, "number parsing error at line {line}"),
            Self::UnknownLineType(line_type) => write!(f, "unknown line type \"{line_type}\""),
            Self::NotEnoughPointCoordinates => f.write_str("not enough point coordinates"),
            Self::NotEnoughCameraParameters => f.write_str("not enough camera parameters"),
            Self::NotEnoughSectorVertices => f.write_str("not enough sector vertices"),
            Self::NotEnoughPortalParameters => f.write_str("not enough portal parameters"),
            Self::InvalidPortalSource { sector, point } => {
                write!(f, "sector {sector} has no wall starting at point {point}")
            }
            Self::Build(error) => write!(f, "map building error: {error}"),
        }
    } // fn fmt
} // impl std::fmt::Display for WmtLoadingError

impl std::error::Error for WmtLoadingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Build(error) => Some(error),
            _ => None,
        }
    }
} // impl std::error::Error for WmtLoadingError

impl From<BuildError> for WmtLoadingError {
    fn from(value: BuildError) -> Self {
        Self::Build(value)
    }
}

/// Map from .wmt file parsing function
/// * `source` - file text
/// * Returns builder input and camera spawn or WmtLoadingError
pub fn parse_wmt(source: &str) -> Result<WmtMap, WmtLoadingError> {
    let mut map = WmtMap::default();

    // Parse file data
    for (line_index, line) in source.lines().map(|line| line.trim()).enumerate() {
        let line_number = line_index + 1;
        let number_error = WmtLoadingError::NumberParsingError { line: line_number };
        let mut elem = line.split_whitespace();

        let line_type = match elem.next() {
            Some(s) => s,
            None => continue,
        };

        match line_type {
            // Comment
            s if s.starts_with('#') => {}

            // Point
            "p" | "point" => {
                let (sx, sy) = elem.next().zip(elem.next()).ok_or(WmtLoadingError::NotEnoughPointCoordinates)?;
                let (x, y) = sx.parse::<f32>().ok().zip(sy.parse::<f32>().ok()).ok_or(number_error)?;

                map.input.points.push(Vec2::new(x, y));
            }

            // Solid edge, never a portal
            "w" | "wall" => {
                let (sx, sy) = elem.next().zip(elem.next()).ok_or(WmtLoadingError::NotEnoughPointCoordinates)?;
                let edge = sx.parse::<u32>().ok().zip(sy.parse::<u32>().ok()).ok_or(number_error)?;

                map.input.solid_edges.push(edge);
            }

            // Sector
            "s" | "sector" => {
                let (sx, sy) = elem.next().zip(elem.next()).ok_or(WmtLoadingError::NotEnoughSectorVertices)?;
                let (floor, ceiling) = sx.parse::<f32>().ok().zip(sy.parse::<f32>().ok()).ok_or(number_error.clone())?;

                let walls = elem
                    .map(|index_str| index_str.parse::<u32>().ok().map(WallBuildData::new))
                    .collect::<Option<Vec<_>>>()
                    .ok_or(number_error)?;

                if walls.len() < 3 {
                    return Err(WmtLoadingError::NotEnoughSectorVertices);
                }

                map.input.sectors.push(SectorBuildData { walls, floor, ceiling });
            }

            // Non-euclidean portal
            "n" | "portal" => {
                let (((ss, sp), sds), sdp) = elem.next()
                    .zip(elem.next())
                    .zip(elem.next())
                    .zip(elem.next())
                    .ok_or(WmtLoadingError::NotEnoughPortalParameters)?;
                let (((sector, point), target_sector), target_point) = ss.parse::<u32>().ok()
                    .zip(sp.parse::<u32>().ok())
                    .zip(sds.parse::<u32>().ok())
                    .zip(sdp.parse::<u32>().ok())
                    .ok_or(number_error)?;

                let wall = map.input.sectors
                    .get_mut(sector as usize)
                    .and_then(|data| data.walls.iter_mut().find(|wall| wall.point == point))
                    .ok_or(WmtLoadingError::InvalidPortalSource { sector, point })?;

                wall.nc_portal = Some(NcPortalBuildData { sector: target_sector, point: target_point });
            }

            // Camera
            "c" | "camera" => {
                let (((scx, scy), scz), sca) = elem.next()
                    .zip(elem.next())
                    .zip(elem.next())
                    .zip(elem.next())
                    .ok_or(WmtLoadingError::NotEnoughCameraParameters)?;
                let (((x, y), height), rotation) = scx.parse::<f32>().ok()
                    .zip(scy.parse::<f32>().ok())
                    .zip(scz.parse::<f32>().ok())
                    .zip(sca.parse::<f32>().ok())
                    .ok_or(number_error)?;

                map.camera = Some(CameraSpawn { location: Vec2::new(x, y), height, rotation });
            }

            _ => return Err(WmtLoadingError::UnknownLineType(line_type.to_string())),
        }
    }

    Ok(map)
} // fn parse_wmt

impl MapSectors {
    /// Map from .wmt file loading function
    /// * `source` - file text
    /// * `flags` - build flags
    /// * Returns built map and camera spawn or WmtLoadingError
    pub fn load_from_wmt(source: &str, flags: BuildFlags) -> Result<(MapSectors, Option<CameraSpawn>), WmtLoadingError> {
        let parsed = parse_wmt(source)?;
        let map = build_map(&parsed.input, flags)?;

        Ok((map, parsed.camera))
    } // fn load_from_wmt
} // impl MapSectors

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{PortalKind, SectorId};

    const TWO_ROOMS: &str = "\
        # two rooms with a shared edge\n\
        p 0 0\n\
        p 4 0\n\
        p 4 4\n\
        p 0 4\n\
        p 8 0\n\
        p 8 4\n\
        \n\
        s 0 3 0 1 2 3\n\
        s 0.5 3 1 4 5 2\n\
        c 1 1 1.5 0.25\n\
    ";

    #[test]
    fn loads_rooms_and_camera() {
        let (map, camera) = MapSectors::load_from_wmt(TWO_ROOMS, BuildFlags::empty()).unwrap();

        assert_eq!(map.sector_count(), 2);
        assert_eq!(map.sector(SectorId::new(1)).floor, 0.5);
        assert_eq!(map.walls().iter().filter(|wall| wall.portal.is_some()).count(), 2);
        assert_eq!(camera, Some(CameraSpawn { location: Vec2::new(1.0, 1.0), height: 1.5, rotation: 0.25 }));
    }

    #[test]
    fn solid_edge_line() {
        let source = format!("{TWO_ROOMS}w 1 2\n");
        let (map, _) = MapSectors::load_from_wmt(&source, BuildFlags::empty()).unwrap();

        assert!(map.walls().iter().all(|wall| wall.portal.is_none()));
    }

    #[test]
    fn portal_line() {
        let source = "\
            p 0 0\n p 4 0\n p 4 4\n p 0 4\n\
            p 20 20\n p 24 20\n p 24 24\n p 20 24\n\
            s 0 3 0 1 2 3\n\
            s 0 3 4 5 6 7\n\
            n 0 1 1 4\n\
        ";
        let map = build_map(&parse_wmt(source).unwrap().input, BuildFlags::empty()).unwrap();
        let (_, _, portal) = map.sector_portals(SectorId::new(0)).next().unwrap();

        assert!(matches!(portal.kind, PortalKind::NonEuclidean { two_way: false, .. }));
        assert_eq!(portal.sector, SectorId::new(1));
    }

    #[test]
    fn default_map_loads() {
        let (map, camera) = MapSectors::load_from_wmt(include_str!("../../maps/default.wmt"), BuildFlags::empty()).unwrap();

        assert_eq!(map.sector_count(), 4);
        assert!(map.has_non_euclidean_portals());
        assert_eq!(map.audit(), Ok(()));

        let camera = camera.unwrap();
        assert_eq!(map.get_sector_from_point(camera.location), Some(SectorId::new(0)));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(parse_wmt("p 1"), Err(WmtLoadingError::NotEnoughPointCoordinates));
        assert_eq!(parse_wmt("p 1 x"), Err(WmtLoadingError::NumberParsingError { line: 1 }));
        assert_eq!(parse_wmt("p 0 0\np 1 0\ns 0 1 0 1"), Err(WmtLoadingError::NotEnoughSectorVertices));
        assert_eq!(parse_wmt("q 1 2"), Err(WmtLoadingError::UnknownLineType("q".to_string())));
        assert_eq!(parse_wmt("c 1 2 3"), Err(WmtLoadingError::NotEnoughCameraParameters));
        assert_eq!(parse_wmt("n 0 1 1 4"), Err(WmtLoadingError::InvalidPortalSource { sector: 0, point: 1 }));
    }

    #[test]
    fn build_errors_are_forwarded() {
        let result = MapSectors::load_from_wmt("p 0 0\np 1 0\np 1 1\ns 0 1 0 2 1", BuildFlags::empty());

        assert!(matches!(result, Err(WmtLoadingError::Build(BuildError::ClockwiseSector { sector: 0 }))));
    }
}

// file map/wmt.rs

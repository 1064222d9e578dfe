/// Geometry class of a feature. Multi geometries collapse into their single counterpart.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeomType {
	Point = 1,
	LineString = 2,
	Polygon = 3,
}

impl GeomType {
	#[must_use]
	pub fn as_u64(&self) -> u64 {
		*self as u64
	}
}

/// GeoJSON geometry type names and how they map onto [`GeomType`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GeoJsonType {
	Point,
	MultiPoint,
	LineString,
	MultiLineString,
	Polygon,
	MultiPolygon,
}

const GEOJSON_TYPES: [(&str, GeoJsonType); 6] = [
	("Point", GeoJsonType::Point),
	("MultiPoint", GeoJsonType::MultiPoint),
	("LineString", GeoJsonType::LineString),
	("MultiLineString", GeoJsonType::MultiLineString),
	("Polygon", GeoJsonType::Polygon),
	("MultiPolygon", GeoJsonType::MultiPolygon),
];

impl GeoJsonType {
	/// Look up a GeoJSON geometry type name, case-sensitively.
	#[must_use]
	pub fn from_name(name: &str) -> Option<Self> {
		GEOJSON_TYPES.iter().find(|(n, _)| *n == name).map(|(_, t)| *t)
	}

	#[must_use]
	pub fn name(&self) -> &'static str {
		GEOJSON_TYPES.iter().find(|(_, t)| t == self).map_or("", |(n, _)| n)
	}

	#[must_use]
	pub fn geom_type(&self) -> GeomType {
		match self {
			GeoJsonType::Point | GeoJsonType::MultiPoint => GeomType::Point,
			GeoJsonType::LineString | GeoJsonType::MultiLineString => GeomType::LineString,
			GeoJsonType::Polygon | GeoJsonType::MultiPolygon => GeomType::Polygon,
		}
	}

	/// The type of the elements of this geometry's `coordinates` array, `None` for a position.
	#[must_use]
	pub fn within(&self) -> Option<GeoJsonType> {
		match self {
			GeoJsonType::Point => None,
			GeoJsonType::MultiPoint | GeoJsonType::LineString => Some(GeoJsonType::Point),
			GeoJsonType::MultiLineString | GeoJsonType::Polygon => Some(GeoJsonType::LineString),
			GeoJsonType::MultiPolygon => Some(GeoJsonType::Polygon),
		}
	}

	/// The GeoJSON name for `count` parts of class `geom_type`.
	#[must_use]
	pub fn for_parts(geom_type: GeomType, count: usize) -> GeoJsonType {
		match (geom_type, count) {
			(GeomType::Point, 1) => GeoJsonType::Point,
			(GeomType::Point, _) => GeoJsonType::MultiPoint,
			(GeomType::LineString, 1) => GeoJsonType::LineString,
			(GeomType::LineString, _) => GeoJsonType::MultiLineString,
			(GeomType::Polygon, 1) => GeoJsonType::Polygon,
			(GeomType::Polygon, _) => GeoJsonType::MultiPolygon,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("Point", GeomType::Point)]
	#[case("MultiPoint", GeomType::Point)]
	#[case("LineString", GeomType::LineString)]
	#[case("MultiLineString", GeomType::LineString)]
	#[case("Polygon", GeomType::Polygon)]
	#[case("MultiPolygon", GeomType::Polygon)]
	fn name_table(#[case] name: &str, #[case] geom_type: GeomType) {
		let t = GeoJsonType::from_name(name).unwrap();
		assert_eq!(t.name(), name);
		assert_eq!(t.geom_type(), geom_type);
	}

	#[test]
	fn unknown_names() {
		assert_eq!(GeoJsonType::from_name("GeometryCollection"), None);
		assert_eq!(GeoJsonType::from_name("point"), None);
	}

	#[test]
	fn for_parts() {
		assert_eq!(GeoJsonType::for_parts(GeomType::Point, 1), GeoJsonType::Point);
		assert_eq!(GeoJsonType::for_parts(GeomType::Point, 3), GeoJsonType::MultiPoint);
		assert_eq!(GeoJsonType::for_parts(GeomType::Polygon, 2), GeoJsonType::MultiPolygon);
		assert_eq!(GeomType::LineString.as_u64(), 2);
	}
}

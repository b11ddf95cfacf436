//! County boundary polygons and the normalized join key.
//!
//! Boundaries come from a GeoJSON FeatureCollection whose features carry a
//! county `NAME` property and, when available, a `GEOID`/`FIPS` property.
//! Measures join to boundaries by the normalized county name; a failed
//! match is a missing value by policy, not an error.

use std::convert::TryFrom;
use std::path::Path;

use geo::{Geometry, MultiPolygon};
use geojson::GeoJson;
use rustc_hash::FxHashMap;

use crate::error::{CohortError, Result};

/// One county's boundary and join keys
#[derive(Debug, Clone)]
pub struct CountyShape {
    /// County name as carried by the boundary data
    pub name: String,
    /// Normalized join key derived from the name
    pub key: String,
    /// 5-digit FIPS code, when the boundary data carries one
    pub fips: Option<String>,
    /// Boundary polygons (a coastal county can be a multipolygon)
    pub polygons: MultiPolygon<f64>,
}

/// Normalize a county name into the join key: trim whitespace, strip a
/// trailing "County" suffix, uppercase
///
/// "Los Angeles County" and a boundary NAME of "Los Angeles" both
/// normalize to "LOS ANGELES".
#[must_use]
pub fn normalize_county_key(name: &str) -> String {
    let trimmed = name.trim();
    let stripped = trimmed
        .strip_suffix("County")
        .or_else(|| trimmed.strip_suffix("county"))
        .unwrap_or(trimmed);
    stripped.trim().to_uppercase()
}

/// Load county boundary polygons from a GeoJSON FeatureCollection
///
/// Features without a usable name or polygonal geometry are skipped with
/// a warning.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed as GeoJSON
pub fn load_county_boundaries(path: &Path) -> Result<Vec<CountyShape>> {
    let content = std::fs::read_to_string(path)?;
    let geojson: GeoJson = content.parse()?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(CohortError::Render(format!(
            "{} is not a GeoJSON FeatureCollection",
            path.display()
        )));
    };

    let mut shapes = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let Some(name) = feature
            .property("NAME")
            .or_else(|| feature.property("name"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
        else {
            log::warn!("Skipping boundary feature without a NAME property");
            continue;
        };

        let fips = feature
            .property("GEOID")
            .or_else(|| feature.property("FIPS"))
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let Some(geometry) = feature.geometry else {
            log::warn!("Skipping boundary feature '{name}' without geometry");
            continue;
        };

        let polygons = match Geometry::<f64>::try_from(geometry.value)? {
            Geometry::Polygon(polygon) => MultiPolygon(vec![polygon]),
            Geometry::MultiPolygon(multi) => multi,
            other => {
                log::warn!(
                    "Skipping boundary feature '{name}' with non-polygonal geometry ({})",
                    geometry_kind(&other)
                );
                continue;
            }
        };

        shapes.push(CountyShape {
            key: normalize_county_key(&name),
            name,
            fips,
            polygons,
        });
    }

    log::info!("Loaded {} county boundaries from {}", shapes.len(), path.display());
    Ok(shapes)
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Which shape attribute a measure map is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKey {
    /// Normalized county name
    Name,
    /// 5-digit FIPS code
    Fips,
}

/// Left-join measures onto boundaries
///
/// Every shape appears in the output; a county with no matching measure
/// carries `None` and is logged at `warn`. This is the deliberate
/// missing-value policy for join mismatches.
#[must_use]
pub fn join_measures<'a>(
    shapes: &'a [CountyShape],
    measures: &FxHashMap<String, f64>,
    join: JoinKey,
) -> Vec<(&'a CountyShape, Option<f64>)> {
    shapes
        .iter()
        .map(|shape| {
            let value = match join {
                JoinKey::Name => measures.get(&shape.key).copied(),
                JoinKey::Fips => shape
                    .fips
                    .as_deref()
                    .and_then(|fips| measures.get(fips))
                    .copied(),
            };
            if value.is_none() {
                log::warn!(
                    "No measure matched county '{}'; rendering as missing",
                    shape.name
                );
            }
            (shape, value)
        })
        .collect()
}

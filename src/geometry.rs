//! Geometry text handling.
//!
//! Geometries are carried as opaque WKT/EWKT text. The only construction done
//! here is padding a GPS point into a circular polygon.

use std::f64::consts::PI;

use crate::errors::{ImportExportError, ImportExportResult};

pub const DEFAULT_SRID: u32 = 4326;
/// Buffer radius in degrees for a point without explicit geometry
pub const POINT_BUFFER_RADIUS: f64 = 0.5;
pub const POINT_BUFFER_SEGMENTS: usize = 64;

const WKT_KEYWORDS: &[&str] = &[
    "GEOMETRYCOLLECTION",
    "MULTIPOLYGON",
    "MULTILINESTRING",
    "MULTIPOINT",
    "POLYGON",
    "LINESTRING",
    "POINT",
];

/// Pad a point into a polygon of `radius` degrees.
///
/// Ring coordinates are `longitude latitude` and the ring is closed.
pub fn point_to_polygon(latitude: f64, longitude: f64, radius: f64) -> String {
    let mut ring: Vec<String> = (0..POINT_BUFFER_SEGMENTS)
        .map(|i| {
            let angle = 2.0 * PI * (i as f64) / (POINT_BUFFER_SEGMENTS as f64);
            let x = longitude + radius * angle.cos();
            let y = latitude + radius * angle.sin();
            format!("{} {}", x, y)
        })
        .collect();
    if let Some(first) = ring.first().cloned() {
        ring.push(first);
    }
    format!("SRID={};POLYGON(({}))", DEFAULT_SRID, ring.join(", "))
}

/// Geometry for a record: the explicit text if given, otherwise a padded point
/// when both coordinates are known.
pub fn resolve_geometry(
    geom: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Option<String> {
    match (geom, latitude, longitude) {
        (Some(geom), _, _) => Some(geom),
        (None, Some(lat), Some(lon)) => Some(point_to_polygon(lat, lon, POINT_BUFFER_RADIUS)),
        _ => None,
    }
}

/// Check that stored text looks like WKT or EWKT
pub fn validate_geometry(column: &str, text: &str) -> ImportExportResult<()> {
    let body = match text.split_once(';') {
        Some((prefix, rest)) => {
            let srid = prefix
                .trim()
                .strip_prefix("SRID=")
                .ok_or_else(|| ImportExportError::malformed(column, text, "expected SRID=<n>; prefix"))?;
            srid.parse::<u32>()
                .map_err(|_| ImportExportError::malformed(column, text, "SRID is not a number"))?;
            rest
        }
        None => text,
    };

    let body = body.trim_start().to_ascii_uppercase();
    let keyword = WKT_KEYWORDS
        .iter()
        .find(|keyword| body.starts_with(**keyword))
        .ok_or_else(|| ImportExportError::malformed(column, text, "unrecognised geometry type"))?;

    let rest = body[keyword.len()..].trim_start();
    let rest = rest
        .strip_prefix("ZM")
        .or_else(|| rest.strip_prefix('Z'))
        .or_else(|| rest.strip_prefix('M'))
        .unwrap_or(rest)
        .trim_start();
    if rest == "EMPTY" || (rest.starts_with('(') && rest.ends_with(')')) {
        Ok(())
    } else {
        Err(ImportExportError::malformed(column, text, "malformed coordinate list"))
    }
}

//! GPS extraction from photo metadata.
//!
//! Photos arrive from clients and are only partially trusted. Everything
//! that can go wrong while reading their metadata (no container, no GPS
//! block, half a coordinate, truncated or corrupt data) ends the same way:
//! no location. Nothing in here returns an error.

use std::io::Cursor;
use std::path::Path;

use tracing::{debug, warn};

use crate::models::types::GeoPoint;

/// Extract the GPS position embedded in a photo's EXIF block.
///
/// Understands every container `kamadak-exif` does (JPEG, TIFF, PNG, WebP,
/// HEIF). Returns `None` when there is no usable position.
pub fn extract_gps(photo: &[u8]) -> Option<GeoPoint> {
    let mut reader = Cursor::new(photo);

    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(container)) => {
            debug!(container, "photo has no EXIF block");
            return None;
        }
        Err(e) => {
            debug!(error = %e, "EXIF parsing failed");
            return None;
        }
    };

    read_gps(&exif)
}

/// Extract the GPS position from a photo saved on disk.
///
/// Files larger than `max_bytes` are not read at all.
pub fn extract_gps_from_path(path: impl AsRef<Path>, max_bytes: u64) -> Option<GeoPoint> {
    let path = path.as_ref();

    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "cannot stat photo");
            return None;
        }
    };

    if size > max_bytes {
        warn!(path = %path.display(), size, max_bytes, "photo too large for GPS extraction");
        return None;
    }

    match std::fs::read(path) {
        Ok(bytes) => extract_gps(&bytes),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "cannot read photo");
            None
        }
    }
}

fn read_gps(exif: &exif::Exif) -> Option<GeoPoint> {
    let lat = coordinate(exif, exif::Tag::GPSLatitude, exif::Tag::GPSLatitudeRef, b'S');
    let lng = coordinate(exif, exif::Tag::GPSLongitude, exif::Tag::GPSLongitudeRef, b'W');

    let (Some(lat), Some(lng)) = (lat, lng) else {
        debug!(has_lat = lat.is_some(), has_lng = lng.is_some(), "no complete GPS position");
        return None;
    };

    match GeoPoint::new(lat, lng) {
        Ok(point) => Some(point),
        Err(e) => {
            debug!(error = %e, "GPS block holds an impossible position");
            None
        }
    }
}

/// Signed decimal degrees for one axis. A missing reference tag counts as
/// the positive hemisphere (N or E).
fn coordinate(
    exif: &exif::Exif,
    value_tag: exif::Tag,
    ref_tag: exif::Tag,
    negative_ref: u8,
) -> Option<f64> {
    let field = exif.get_field(value_tag, exif::In::PRIMARY)?;
    let degrees = dms_to_decimal(&field.value)?;

    let negative = exif
        .get_field(ref_tag, exif::In::PRIMARY)
        .and_then(|f| hemisphere(&f.value))
        .is_some_and(|r| r == negative_ref);

    Some(if negative { -degrees } else { degrees })
}

/// Parse degrees, minutes, seconds rationals into decimal degrees.
fn dms_to_decimal(value: &exif::Value) -> Option<f64> {
    match value {
        exif::Value::Rational(dms) if dms.len() >= 3 => {
            let degrees = dms[0].to_f64();
            let minutes = dms[1].to_f64();
            let seconds = dms[2].to_f64();
            let decimal = degrees + minutes / 60.0 + seconds / 3600.0;

            decimal.is_finite().then_some(decimal)
        }
        _ => None,
    }
}

fn hemisphere(value: &exif::Value) -> Option<u8> {
    match value {
        exif::Value::Ascii(strings) => strings
            .first()
            .and_then(|s| s.first())
            .map(|c| c.to_ascii_uppercase()),
        _ => None,
    }
}

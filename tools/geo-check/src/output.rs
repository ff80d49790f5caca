use anyhow::{Context, Result};
use geojson::{feature::Id, Feature, FeatureCollection, GeoJson, Geometry, Value};
use std::path::Path;
use treekin_geo::{GeoPoint, ProximityCandidate, ValidationOutcome};

/// GeoJSON Point for a location ([longitude, latitude])
fn point_to_geojson(point: GeoPoint) -> Value {
    Value::Point(vec![point.lng(), point.lat()])
}

/// Create a GeoJSON Feature for a tree found by a proximity search
fn candidate_to_feature(candidate: &ProximityCandidate) -> Feature {
    let mut properties = serde_json::Map::new();
    properties.insert("distance_m".to_string(), serde_json::json!(candidate.distance_m));

    let name = candidate.tree.name();
    if !name.is_empty() {
        properties.insert("name".to_string(), serde_json::json!(name));
    }

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(point_to_geojson(candidate.point()))),
        id: Some(Id::String(candidate.id().to_string())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Build a FeatureCollection of search hits, nearest first
pub fn candidates_to_geojson(candidates: &[ProximityCandidate]) -> GeoJson {
    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features: candidates.iter().map(candidate_to_feature).collect(),
        foreign_members: None,
    })
}

/// Write search hits to a GeoJSON file
pub fn write_candidates_geojson(candidates: &[ProximityCandidate], path: &Path) -> Result<()> {
    let geojson = candidates_to_geojson(candidates);

    let json = serde_json::to_string_pretty(&geojson).context("Failed to serialize GeoJSON")?;

    std::fs::write(path, json)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;

    Ok(())
}

/// Print search hits, one per line, or as a GeoJSON document
pub fn print_candidates(candidates: &[ProximityCandidate], json: bool) -> Result<()> {
    if json {
        let geojson = candidates_to_geojson(candidates);
        println!("{}", serde_json::to_string_pretty(&geojson)?);
        return Ok(());
    }

    if candidates.is_empty() {
        println!("No trees found");
    }

    for candidate in candidates {
        let name = candidate.tree.name();
        if name.is_empty() {
            println!("{:>10.1} m  {}", candidate.distance_m, candidate.id());
        } else {
            println!("{:>10.1} m  {} ({})", candidate.distance_m, candidate.id(), name);
        }
    }

    Ok(())
}

/// Print a validation outcome
pub fn print_outcome(outcome: &ValidationOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    let verdict = if outcome.allowed { "ALLOWED" } else { "REJECTED" };
    println!("{}: {}", verdict, outcome.reason);

    if let Some(distance_m) = outcome.distance_m {
        println!("  distance:  {:.1} m", distance_m);
    }
    if let Some(reference) = &outcome.reference_id {
        println!("  reference: {}", reference);
    }

    Ok(())
}

/// Print a location, or its absence
pub fn print_point(point: Option<GeoPoint>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&point)?);
        return Ok(());
    }

    match point {
        Some(point) => println!("{}", point),
        None => println!("No GPS position"),
    }

    Ok(())
}

use anyhow::{bail, Context, Result};
use geojson::{feature::Id, Feature, GeoJson};
use std::path::Path;
use treekin_geo::{GeoPoint, TreeIdentifier, TreeImpl};

/// Read existing trees from a GeoJSON file of Point features
///
/// The tree id is taken from the feature `id`, falling back to an `id`
/// property. An optional `name` property is kept for display.
pub fn read_trees(path: &Path) -> Result<Vec<TreeImpl>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read trees file: {}", path.display()))?;

    let geojson: GeoJson = content
        .parse()
        .with_context(|| format!("Failed to parse GeoJSON from: {}", path.display()))?;

    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => bail!("Expected Point features, found a bare geometry"),
    };

    features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| {
            feature_to_tree(feature)
                .with_context(|| format!("Invalid tree feature #{} in {}", index, path.display()))
        })
        .collect()
}

/// Convert a single GeoJSON feature to a tree
fn feature_to_tree(feature: Feature) -> Result<TreeImpl> {
    let id = feature_id(&feature).context("Feature has no id")?;

    let name = feature
        .property("name")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let Some(geometry) = feature.geometry else {
        bail!("Feature {} has no geometry", id);
    };

    let location = match geometry.value {
        geojson::Value::Point(position) if position.len() >= 2 => {
            // GeoJSON positions are [longitude, latitude]
            GeoPoint::new(position[1], position[0])
                .with_context(|| format!("Feature {} has an invalid position", id))?
        }
        _ => bail!("Feature {} is not a Point", id),
    };

    Ok(TreeImpl {
        id,
        name: name.into(),
        location,
    })
}

fn feature_id(feature: &Feature) -> Option<TreeIdentifier> {
    match &feature.id {
        Some(Id::String(s)) => Some(TreeIdentifier::new(s)),
        Some(Id::Number(n)) => Some(TreeIdentifier::new(n.to_string())),
        None => match feature.property("id")? {
            serde_json::Value::String(s) => Some(TreeIdentifier::new(s)),
            serde_json::Value::Number(n) => Some(TreeIdentifier::new(n.to_string())),
            _ => None,
        },
    }
}

//! Walk through a small two-floor mall: aggregate transitions, paint heat, route paths.
//!
//! Run with: cargo run --example flow_walkthrough

use serde_json::json;
use zone_flow::{
    FlowQueryFacade, SeriesFrame, TopologyGraph, ZoneFlowConfig, ZoneGeometryIndex,
};

const FLOOR_PLAN: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        { "type": "Feature", "properties": { "name": "Bakery", "level": 0 },
          "geometry": { "type": "Polygon", "coordinates": [[[4.89500,52.37000],[4.89520,52.37000],[4.89520,52.37010],[4.89500,52.37010],[4.89500,52.37000]]] } },
        { "type": "Feature", "properties": { "name": "Florist", "level": 0 },
          "geometry": { "type": "Polygon", "coordinates": [[[4.89560,52.37000],[4.89580,52.37000],[4.89580,52.37010],[4.89560,52.37010],[4.89560,52.37000]]] } },
        { "type": "Feature", "properties": { "name": "Pharmacy", "level": 1 },
          "geometry": { "type": "Polygon", "coordinates": [[[4.89500,52.37030],[4.89520,52.37030],[4.89520,52.37040],[4.89500,52.37040],[4.89500,52.37030]]] } },
        { "type": "Feature", "properties": { "name": "Bakery", "level": 1 },
          "geometry": { "type": "Polygon", "coordinates": [[[4.89560,52.37030],[4.89580,52.37030],[4.89580,52.37040],[4.89560,52.37040],[4.89560,52.37030]]] } }
    ]
}"#;

const CORRIDORS: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        { "type": "Feature", "properties": { "kind": "corridor" },
          "geometry": { "type": "LineString", "coordinates": [[4.89510,52.37005],[4.89540,52.37005],[4.89570,52.37005]] } },
        { "type": "Feature", "properties": { "kind": "escalator" },
          "geometry": { "type": "LineString", "coordinates": [[4.89540,52.37005],[4.89540,52.37035]] } },
        { "type": "Feature", "properties": { "kind": "corridor" },
          "geometry": { "type": "LineString", "coordinates": [[4.89510,52.37035],[4.89540,52.37035],[4.89570,52.37035]] } }
    ]
}"#;

fn main() {
    let config = ZoneFlowConfig::default();

    let zones = ZoneGeometryIndex::from_geojson_str(FLOOR_PLAN).expect("floor plan parses");
    let topology =
        TopologyGraph::from_geojson_str(CORRIDORS, &config.topology).expect("corridors parse");

    let frames = vec![
        SeriesFrame::new(
            "docs",
            vec![
                json!({
                    "_id": "a1", "Source": "Bakery", "Florist": 42, "Pharmacy": 7, "timestamp": 1
                }),
                json!({ "_id": "a2", "Source": "Florist", "Bakery": 15, "timestamp": 2 }),
                json!({ "_id": "a3", "Source": "Pharmacy", "Bakery": 3, "timestamp": 3 }),
            ],
        ),
        SeriesFrame::new("Bakery", vec![json!(310), json!(295)]),
        SeriesFrame::new("Florist", vec![json!(64)]),
        SeriesFrame::new("Pharmacy", vec![json!(120), json!(null)]),
    ];

    let mut facade = FlowQueryFacade::new(config);
    facade.update_geometry(Some(zones), Some(topology));
    facade.update_frames(&frames);

    println!("Zone Flow Walkthrough\n");

    println!("1. Flow graph:");
    for (source, targets) in &facade.flow().outbound {
        for (target, volume) in targets {
            println!("   {} -> {}: {}", source, target, volume);
        }
    }

    println!("\n2. Heat:");
    for value in &facade.heat_layer().values {
        println!(
            "   {:<10} volume {:>5}  log2 {:.2}  hue {:>5.1}",
            value.zone, value.raw_volume, value.log_volume, value.hue
        );
    }
    println!("   {} polygons painted", facade.heat_layer().polygons.len());

    println!("\n3. Paths for Bakery:");
    for path in facade.select_and_resolve("Bakery") {
        println!(
            "   -> {:<10} {:<22} {} points, {:.0}m",
            path.to,
            path.label,
            path.geometry.0.len(),
            path.length_meters
        );
    }
    for issue in facade.path_issues() {
        println!("   skipped: {}", issue);
    }

    facade.deselect();
    println!("\n4. After deselect: {} paths", facade.transition_layer().len());
}

//! GPX output formatter
//!
//! Markers become waypoints; each hull becomes a closed route.

use crate::error::Result;
use crate::format::OutputFormatter;
use crate::zone::Zone;
use chrono::Utc;

/// GPX formatter - outputs a GPX file of markers and hull routes
pub struct GpxFormatter;

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl OutputFormatter for GpxFormatter {
    fn name(&self) -> &str {
        "gpx"
    }

    fn description(&self) -> &str {
        "GPX waypoints and hull routes"
    }

    fn format(&self, zones: &[Zone]) -> Result<String> {
        let mut gpx = String::new();

        // XML header
        gpx.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        gpx.push('\n');
        gpx.push_str(r#"<gpx version="1.1" creator="safezone">"#);
        gpx.push('\n');

        gpx.push_str("  <metadata>\n");
        gpx.push_str("    <name>SafeZone zones</name>\n");
        gpx.push_str(&format!("    <time>{}</time>\n", Utc::now().to_rfc3339()));
        gpx.push_str("  </metadata>\n");

        for zone in zones {
            for marker in &zone.markers {
                gpx.push_str(&format!(
                    r#"  <wpt lat="{}" lon="{}">"#,
                    marker.position.lat, marker.position.lng
                ));
                gpx.push('\n');
                if let Some(time) = &marker.timestamp {
                    gpx.push_str(&format!("    <time>{}</time>\n", escape_xml(time)));
                }
                gpx.push_str(&format!("    <name>{}</name>\n", escape_xml(&marker.label())));
                if let Some(desc) = &marker.description {
                    gpx.push_str(&format!("    <desc>{}</desc>\n", escape_xml(desc)));
                }
                gpx.push_str(&format!("    <type>{}</type>\n", zone.zone_type));
                gpx.push_str("  </wpt>\n");
            }
        }

        for zone in zones {
            gpx.push_str("  <rte>\n");
            gpx.push_str(&format!(
                "    <name>{} zone {}</name>\n",
                zone.zone_type,
                escape_xml(&zone.id)
            ));
            for [lng, lat] in zone.hull.ring() {
                gpx.push_str(&format!(r#"    <rtept lat="{}" lon="{}"/>"#, lat, lng));
                gpx.push('\n');
            }
            gpx.push_str("  </rte>\n");
        }

        gpx.push_str("</gpx>\n");
        Ok(gpx)
    }
}

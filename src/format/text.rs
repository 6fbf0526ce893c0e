//! Human-readable text output formatter

use crate::error::Result;
use crate::format::OutputFormatter;
use crate::zone::Zone;

/// Text formatter - outputs a per-zone summary
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format(&self, zones: &[Zone]) -> Result<String> {
        if zones.is_empty() {
            return Ok("No zones\n".to_string());
        }

        let mut output = String::new();
        for zone in zones {
            output.push_str(&format!("{} zone {}\n", zone.zone_type, zone.id));
            output.push_str(&format!("  Hull: {} vertices\n", zone.hull.vertices().len()));
            output.push_str("  Markers:\n");
            for (i, marker) in zone.markers.iter().enumerate() {
                output.push_str(&format!("    {:>2}. {} {}", i + 1, marker.position, marker.label()));
                if let (Some(desc), Some(_)) = (&marker.description, &marker.place_name) {
                    output.push_str(&format!(" - {}", desc));
                }
                output.push('\n');
            }
            output.push('\n');
        }

        output.push_str(&format!("{} zone(s)\n", zones.len()));
        Ok(output)
    }
}

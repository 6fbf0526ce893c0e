//! JSON output formatter

use crate::error::Result;
use crate::format::OutputFormatter;
use crate::zone::Zone;

/// JSON formatter - outputs zones with markers and hulls as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Zones with markers and hulls as JSON"
    }

    fn format(&self, zones: &[Zone]) -> Result<String> {
        Ok(serde_json::to_string_pretty(zones)?)
    }
}

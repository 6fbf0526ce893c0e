//! Draw command handler
//!
//! Replays a stream of map interactions against a live session. Each input
//! line is one interaction:
//!
//! ```text
//! 48.85,2.35               click (safe zones, routes)
//! 48.85,2.35,broken light  click with a description (danger zones)
//! mode dangerous           switch action: idle, safe, dangerous, route
//! undo                     remove the last pending marker
//! cancel                   drop all pending markers of the current type
//! finalize                 retry finalization of ten pending markers
//! search <query>           place the search marker on the best match
//! context 48.85,2.35       context click: place the search marker here
//! hover 48.85,2.35         hover a position; its place name arrives later
//! leave                    pointer left the hovered position
//! clear-route              discard route endpoints
//! reload                   refetch completed zones
//! delete <zone-id>         delete a completed zone
//! refresh <zone-id>        re-run place lookups for a zone
//! status                   print pending counts and overlays
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use crate::api::ApiClient;
use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geocode::gateway::GatewayGeocoder;
use crate::map::hover::{HoverLookup, HoverResult};
use crate::map::{ClickOutcome, InteractionMode, MapController, MapEvent};
use clap::Args;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

/// Draw command arguments
#[derive(Args)]
pub struct DrawArgs {
    /// Initial action (safe, dangerous, route, idle)
    pub mode: InteractionMode,

    /// Read interactions from a file instead of stdin
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

/// One line of draw input
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Click {
        position: Coordinates,
        description: Option<String>,
    },
    Mode(InteractionMode),
    Undo,
    Cancel,
    Finalize,
    Search(String),
    Context(Coordinates),
    Hover(Coordinates),
    Leave,
    ClearRoute,
    Reload,
    Delete(String),
    Refresh(String),
    Status,
}

fn parse_position(lat: &str, lng: &str) -> std::result::Result<Coordinates, String> {
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("Invalid latitude: {}", lat.trim()))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|_| format!("Invalid longitude: {}", lng.trim()))?;
    Ok(Coordinates::new(lat, lng))
}

fn parse_pair(s: &str) -> std::result::Result<Coordinates, String> {
    match s.split_once(',') {
        Some((lat, lng)) => parse_position(lat, lng),
        None => Err(format!("Expected lat,lng, got: {}", s)),
    }
}

fn required(arg: &str, what: &str) -> std::result::Result<String, String> {
    if arg.is_empty() {
        Err(format!("Missing {}", what))
    } else {
        Ok(arg.to_string())
    }
}

impl FromStr for DrawCommand {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match word.to_lowercase().as_str() {
            "mode" => Ok(DrawCommand::Mode(rest.parse()?)),
            "undo" => Ok(DrawCommand::Undo),
            "cancel" => Ok(DrawCommand::Cancel),
            "finalize" => Ok(DrawCommand::Finalize),
            "search" => Ok(DrawCommand::Search(required(rest, "search query")?)),
            "context" => Ok(DrawCommand::Context(parse_pair(rest)?)),
            "hover" => Ok(DrawCommand::Hover(parse_pair(rest)?)),
            "leave" => Ok(DrawCommand::Leave),
            "clear-route" => Ok(DrawCommand::ClearRoute),
            "reload" => Ok(DrawCommand::Reload),
            "delete" => Ok(DrawCommand::Delete(required(rest, "zone id")?)),
            "refresh" => Ok(DrawCommand::Refresh(required(rest, "zone id")?)),
            "status" => Ok(DrawCommand::Status),
            _ => {
                // lat,lng[,description]; the description may contain commas
                let mut parts = line.splitn(3, ',');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(lat), Some(lng), description) => Ok(DrawCommand::Click {
                        position: parse_position(lat, lng)?,
                        description: description
                            .map(str::trim)
                            .filter(|d| !d.is_empty())
                            .map(str::to_string),
                    }),
                    _ => Err(format!("Unrecognized input: {}", line)),
                }
            }
        }
    }
}

/// Describe a click outcome for the operator
fn describe(outcome: &ClickOutcome) -> String {
    match outcome {
        ClickOutcome::Ignored => "ignored (no active action)".to_string(),
        ClickOutcome::Rejected(reason) => format!("rejected: {}", reason),
        ClickOutcome::Added {
            zone_type,
            pending,
            persisted,
        } => {
            let mut msg = format!("{} marker {}/10", zone_type, pending);
            if !persisted {
                msg.push_str(" (not saved)");
            }
            msg
        }
        ClickOutcome::Finalized(zone) => {
            format!("{} zone {} created", zone.zone_type, zone.id)
        }
        ClickOutcome::FinalizationFailed { zone_type, error } => format!(
            "{} zone not created: {} (markers kept; `finalize` to retry)",
            zone_type, error
        ),
        ClickOutcome::RoutePoint { count } => format!("route point {}/2", count),
    }
}

type Session = MapController<GatewayGeocoder, ApiClient>;

struct DrawSession {
    map: Session,
    hover: HoverLookup<GatewayGeocoder>,
    hover_results: mpsc::UnboundedReceiver<HoverResult>,
    hover_wait: Duration,
}

impl DrawSession {
    fn new(config: &Config) -> Result<Self> {
        let client = super::api_client(config)?;
        let geocoder = GatewayGeocoder::new(client.clone());
        let (hover, hover_results) =
            HoverLookup::new(Arc::new(geocoder.clone()), config.hover_delay());
        let request_timeout = Duration::from_secs(config.api.timeout_secs);

        Ok(Self {
            map: MapController::new(geocoder, client)
                .with_forward_limit(config.geocode.forward_limit),
            hover,
            hover_results,
            hover_wait: config.hover_delay() + request_timeout,
        })
    }

    fn print_hover_results(&mut self) {
        while let Ok(result) = self.hover_results.try_recv() {
            println!("hover {}: {}", result.position, result.enrichment.place_name);
        }
    }

    async fn apply(&mut self, command: DrawCommand) -> Result<()> {
        match command {
            DrawCommand::Click {
                position,
                description,
            } => {
                let outcome = self.map.click(position, description).await;
                println!("{}", describe(&outcome));
            }
            DrawCommand::Mode(mode) => {
                self.map.select_mode(mode);
                println!("mode: {}", mode);
            }
            DrawCommand::Undo => {
                let zone_type = self.active_zone_type()?;
                let last = self.map.accumulator().len(zone_type).checked_sub(1);
                match last {
                    Some(index) => {
                        self.map.remove_pending(zone_type, index).await;
                        println!(
                            "{} marker removed, {} pending",
                            zone_type,
                            self.map.accumulator().len(zone_type)
                        );
                    }
                    None => println!("no pending {} markers", zone_type),
                }
            }
            DrawCommand::Cancel => {
                let zone_type = self.active_zone_type()?;
                self.map.cancel_pending(zone_type);
                println!("pending {} markers discarded", zone_type);
            }
            DrawCommand::Finalize => {
                let zone_type = self.active_zone_type()?;
                let zone = self.map.finalize_pending(zone_type).await?;
                println!("{} zone {} created", zone.zone_type, zone.id);
            }
            DrawCommand::Search(query) => match self.map.search(&query).await? {
                Some(marker) => println!("found {} {}", marker.position, marker.place_name),
                None => println!("no results for {}", query),
            },
            DrawCommand::Context(position) => {
                let marker = self.map.context_click(position).await?;
                println!("{} {}", marker.position, marker.place_name);
            }
            DrawCommand::Hover(position) => {
                position.validate()?;
                self.hover.hover(position);
            }
            DrawCommand::Leave => self.hover.leave(),
            DrawCommand::ClearRoute => {
                self.map.clear_route();
                println!("route cleared");
            }
            DrawCommand::Reload => {
                let summary = self.map.reload().await?;
                println!(
                    "{} zones, {} overlays, {} skipped",
                    summary.zones, summary.overlays, summary.skipped
                );
            }
            DrawCommand::Delete(id) => {
                self.map.delete_zone(&id).await?;
                println!("zone {} deleted", id);
            }
            DrawCommand::Refresh(id) => {
                let zone = self.map.refresh_zone_places(&id).await?;
                println!("zone {} refreshed", zone.id);
            }
            DrawCommand::Status => self.print_status(),
        }
        Ok(())
    }

    fn active_zone_type(&self) -> Result<crate::coord::ZoneType> {
        self.map.mode().zone_type().ok_or_else(|| {
            Error::Validation(format!("No zone type in {} mode", self.map.mode()))
        })
    }

    fn print_status(&self) {
        println!("mode: {}", self.map.mode());
        for zone_type in crate::coord::ZoneType::all() {
            println!(
                "pending {}: {}",
                zone_type,
                self.map.accumulator().len(zone_type)
            );
        }
        println!("overlays: {}", self.map.overlays().overlays().len());
        if !self.map.route().is_empty() {
            let points: Vec<String> = self.map.route().iter().map(|p| p.to_string()).collect();
            println!("route: {}", points.join(" -> "));
        }
        if let Some(marker) = self.map.search_marker() {
            println!("search marker: {} {}", marker.position, marker.place_name);
        }
    }

    /// Wait for an outstanding hover lookup before exiting
    async fn finish(&mut self) {
        if self.hover.is_pending() {
            if let Ok(Some(result)) =
                tokio::time::timeout(self.hover_wait, self.hover_results.recv()).await
            {
                println!("hover {}: {}", result.position, result.enrichment.place_name);
            }
        }
        self.print_hover_results();
    }
}

/// Log map events at debug level
fn spawn_event_log(mut events: broadcast::Receiver<MapEvent>) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => debug!(?event, "map event"),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    debug!(skipped = n, "map event log lagged")
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// Run the draw command
pub async fn run(args: DrawArgs) -> Result<()> {
    let config = Config::load()?;
    let mut session = DrawSession::new(&config)?;
    spawn_event_log(session.map.subscribe());

    if let Err(e) = session.map.reload().await {
        warn!(error = %e, "could not load completed zones");
    }
    session.map.select_mode(args.mode);

    let input: Box<dyn AsyncRead + Unpin + Send> = match &args.file {
        Some(path) => Box::new(tokio::fs::File::open(path).await?),
        None => Box::new(tokio::io::stdin()),
    };
    let mut lines = BufReader::new(input).lines();

    let mut line_no = 0;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match trimmed.parse::<DrawCommand>() {
            Ok(command) => {
                if let Err(e) = session.apply(command).await {
                    eprintln!("line {}: {}", line_no, e);
                }
            }
            Err(e) => eprintln!("line {}: {}", line_no, e),
        }
        session.print_hover_results();
    }

    session.finish().await;
    Ok(())
}

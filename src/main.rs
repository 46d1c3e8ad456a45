use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;
use wayfarer::{Graph, KDTree};

#[derive(Debug, thiserror::Error)]
enum LoadError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Graph(#[from] wayfarer::GraphError),

    #[error("line {0}: malformed record")]
    Malformed(u64),
}

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct GraphLoadError(PathBuf, #[source] LoadError);

/// Snaps two positions to the nearest road-network intersections and prints
/// the shortest route between them as a GeoJSON LineString.
#[derive(Parser)]
struct Cli {
    /// The path to the road-network CSV file, with `node,<id>,<lat>,<lon>`
    /// and `edge,<u>,<v>` records
    graph_file: PathBuf,

    /// Latitude of the start point
    start_lat: f64,

    /// Longitude of the start point
    start_lon: f64,

    /// Latitude of the destination point
    dest_lat: f64,

    /// Longitude of the destination point
    dest_lon: f64,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    let mut g = load_graph(&cli.graph_file)?;
    let pruned = g.prune_isolated();
    if pruned > 0 {
        log::info!("dropped {} vertices with no incident road", pruned);
    }

    let tree =
        KDTree::from_graph(&g).ok_or("the road network contains no routable vertices")?;

    let route = wayfarer::shortest_path(
        &g,
        &tree,
        cli.start_lon,
        cli.start_lat,
        cli.dest_lon,
        cli.dest_lat,
    )?;

    println!("{{");
    println!("  \"type\": \"FeatureCollection\",");
    println!("  \"features\": [");
    println!("    {{");
    println!("      \"type\": \"Feature\",");
    println!("      \"properties\": {{}},");

    println!("      \"geometry\": {{");
    println!("        \"type\": \"LineString\",");
    println!("        \"coordinates\": [");

    let mut vertices = route
        .iter()
        .map(|&id| g.get_vertex(id).unwrap())
        .peekable();
    while let Some(vertex) = vertices.next() {
        let suffix = if vertices.peek().is_some() { "," } else { "" };
        println!("          [{}, {}]{}", vertex.lon, vertex.lat, suffix);
    }

    println!("        ]");
    println!("      }}");
    println!("    }}");
    println!("  ]");
    println!("}}");

    Ok(())
}

fn load_graph<P: AsRef<Path>>(path: P) -> Result<Graph, GraphLoadError> {
    read_records(path.as_ref()).map_err(|e| GraphLoadError(PathBuf::from(path.as_ref()), e))
}

fn read_records(path: &Path) -> Result<Graph, LoadError> {
    let mut g = Graph::new();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_path(path)?;

    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let malformed = || LoadError::Malformed(line);

        match record.get(0) {
            Some("node") => {
                let id = parse_field(&record, 1).ok_or_else(malformed)?;
                let lat: f64 = parse_field(&record, 2).ok_or_else(malformed)?;
                let lon: f64 = parse_field(&record, 3).ok_or_else(malformed)?;
                g.add_vertex(id, lon, lat)?;
            }
            Some("edge") => {
                let u = parse_field(&record, 1).ok_or_else(malformed)?;
                let v = parse_field(&record, 2).ok_or_else(malformed)?;
                g.add_edge(u, v)?;
            }
            _ => return Err(malformed()),
        }
    }

    log::debug!("loaded {} vertices from {}", g.len(), path.display());
    Ok(g)
}

fn parse_field<T: std::str::FromStr>(record: &csv::StringRecord, index: usize) -> Option<T> {
    record.get(index)?.trim().parse().ok()
}

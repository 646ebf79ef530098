use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::data::database::NeoDatabase;
use crate::data::filter::{Criteria, build_filters, limit};

#[derive(Debug, Parser)]
#[command(name = "neo", version, about = "Explore near-Earth objects and their close approaches")]
pub struct Cli {
    /// CSV file of near-Earth objects
    #[arg(long, env = "NEO_FILE", default_value = "data/neos.csv", global = true)]
    pub neofile: PathBuf,

    /// JSON file of close approaches
    #[arg(long, env = "CAD_FILE", default_value = "data/cad.json", global = true)]
    pub cadfile: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Look up a single near-Earth object
    Inspect(InspectArgs),
    /// Query close approaches
    Query(QueryArgs),
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Primary designation
    #[arg(short, long, conflicts_with = "name", required_unless_present = "name")]
    pub pdes: Option<String>,

    /// IAU name
    #[arg(long)]
    pub name: Option<String>,

    /// Also list the object's close approaches
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Approaches on this date (YYYY-Mon-DD HH:MM)
    #[arg(short, long)]
    pub date: Option<String>,

    /// Approaches on or after this date
    #[arg(short, long)]
    pub start_date: Option<String>,

    /// Approaches on or before this date
    #[arg(short, long)]
    pub end_date: Option<String>,

    /// Minimum approach distance (au)
    #[arg(long)]
    pub min_distance: Option<String>,

    /// Maximum approach distance (au)
    #[arg(long)]
    pub max_distance: Option<String>,

    /// Minimum relative velocity (km/s)
    #[arg(long)]
    pub min_velocity: Option<String>,

    /// Maximum relative velocity (km/s)
    #[arg(long)]
    pub max_velocity: Option<String>,

    /// Minimum object diameter (km)
    #[arg(long)]
    pub min_diameter: Option<String>,

    /// Maximum object diameter (km)
    #[arg(long)]
    pub max_diameter: Option<String>,

    /// Only potentially hazardous objects
    #[arg(long, conflicts_with = "not_hazardous")]
    pub hazardous: bool,

    /// Only objects that are not potentially hazardous
    #[arg(long)]
    pub not_hazardous: bool,

    /// Maximum number of results, 0 for no limit
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,
}

impl QueryArgs {
    pub fn criteria(&self) -> Criteria {
        let hazardous = match (self.hazardous, self.not_hazardous) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        Criteria {
            date: self.date.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            distance_min: self.min_distance.clone(),
            distance_max: self.max_distance.clone(),
            velocity_min: self.min_velocity.clone(),
            velocity_max: self.max_velocity.clone(),
            diameter_min: self.min_diameter.clone(),
            diameter_max: self.max_diameter.clone(),
            hazardous,
        }
    }
}

/// Load the database and run the selected command, writing to stdout.
pub fn run(cli: Cli) -> Result<()> {
    let db = NeoDatabase::load(&cli.neofile, &cli.cadfile).context("loading database")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Inspect(args) => inspect(&db, &args, &mut out),
        Commands::Query(args) => query(&db, &args, &mut out),
    }
}

pub fn inspect(db: &NeoDatabase, args: &InspectArgs, out: &mut impl Write) -> Result<()> {
    let found = match (&args.pdes, &args.name) {
        (Some(pdes), _) => db.find_by_designation(pdes),
        (None, Some(name)) => db.find_by_name(name),
        (None, None) => None,
    };
    let Some(neo) = found else {
        writeln!(out, "No matching NEOs exist in the database.")?;
        return Ok(());
    };

    writeln!(out, "{neo}")?;
    if args.verbose {
        for approach in db.approaches_of(neo) {
            writeln!(
                out,
                "- On {}, approaches Earth at a distance of {:.2} au and a velocity of {:.2} km/s.",
                approach.time_str(),
                approach.distance,
                approach.velocity
            )?;
        }
    }
    Ok(())
}

pub fn query(db: &NeoDatabase, args: &QueryArgs, out: &mut impl Write) -> Result<()> {
    let filters = build_filters(&args.criteria())?;
    let mut shown = 0usize;
    for linked in limit(db.query(&filters), Some(args.limit)) {
        writeln!(out, "{linked}")?;
        shown += 1;
    }
    if shown == 0 {
        writeln!(out, "No matching close approaches.")?;
    }
    log::info!("query matched {shown} close approaches");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CloseApproach, NearEarthObject, parse_timestamp};

    fn db() -> NeoDatabase {
        NeoDatabase::new(
            vec![
                NearEarthObject::new("433", "Eros", "16.84", "N"),
                NearEarthObject::new("99942", "Apophis", "0.37", "Y"),
            ],
            vec![
                CloseApproach::new(
                    "433",
                    parse_timestamp("1900-Jan-01 00:00").unwrap(),
                    "0.3",
                    "5.1",
                ),
                CloseApproach::new(
                    "99942",
                    parse_timestamp("2029-Apr-13 21:46").unwrap(),
                    "0.00025",
                    "7.42",
                ),
            ],
        )
        .unwrap()
    }

    fn parse_query(args: &[&str]) -> QueryArgs {
        let cli = Cli::try_parse_from(["neo", "query"].iter().chain(args)).unwrap();
        match cli.command {
            Commands::Query(q) => q,
            other => panic!("expected query, got {other:?}"),
        }
    }

    #[test]
    fn test_query_args_to_criteria() {
        let q = parse_query(&[
            "--date",
            "2020-Jan-01 00:00",
            "--max-distance",
            "0.1",
            "--not-hazardous",
        ]);
        let c = q.criteria();
        assert_eq!(c.date.as_deref(), Some("2020-Jan-01 00:00"));
        assert_eq!(c.distance_max.as_deref(), Some("0.1"));
        assert_eq!(c.hazardous, Some(false));
        assert!(c.velocity_min.is_none());
        assert_eq!(q.limit, 10);
    }

    #[test]
    fn test_hazard_flags_conflict() {
        assert!(Cli::try_parse_from(["neo", "query", "--hazardous", "--not-hazardous"]).is_err());
        assert_eq!(parse_query(&[]).criteria().hazardous, None);
    }

    #[test]
    fn test_inspect_by_name() {
        let args = InspectArgs {
            pdes: None,
            name: Some("eros".into()),
            verbose: true,
        };
        let mut out = Vec::new();
        inspect(&db(), &args, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("NEO 433 (Eros) has a diameter of 16.84 km"));
        assert!(text.contains("- On 1900-01-01 00:00"));
    }

    #[test]
    fn test_inspect_missing() {
        let args = InspectArgs {
            pdes: Some("nope".into()),
            name: None,
            verbose: false,
        };
        let mut out = Vec::new();
        inspect(&db(), &args, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No matching NEOs exist in the database.\n");
    }

    #[test]
    fn test_query_output() {
        let mut out = Vec::new();
        query(&db(), &parse_query(&["--hazardous"]), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("99942 (Apophis)"));
    }

    #[test]
    fn test_query_bad_criterion() {
        let mut out = Vec::new();
        assert!(query(&db(), &parse_query(&["--min-velocity", "fast"]), &mut out).is_err());
    }
}

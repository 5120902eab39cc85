#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # gradesheet
//!
//! Inspect, normalise and score GML grading sheets from the command line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bpaf::*;
use chrono::{DateTime, Utc};
use dotenvy::dotenv;
use gradesheet::{
    criteria::{Aggregate, Instance, Total},
    deadline::DeadlineSpec,
    gml,
};
use tabled::{Table, Tabled, settings::Style};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Identifies the sheet being read.
#[derive(Debug, Clone)]
struct Target {
    /// Path to the GML file.
    file:  PathBuf,
    /// Part id to attach.
    part:  String,
    /// Group id to attach.
    group: String,
}

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Decode a sheet and print its totals
    Check(Target),
    /// Decode a sheet and print it back in canonical form
    Fmt(Target),
    /// Decode a sheet and resolve it against a deadline policy
    Resolve {
        /// The sheet.
        target:     Target,
        /// Path to a JSON deadline policy.
        deadline:   PathBuf,
        /// Submission time.
        submitted:  DateTime<Utc>,
        /// Whole-assignment totals, for policies that affect every part.
        assignment: Option<Total>,
    },
}

/// Parse the command line arguments and return the command and verbosity.
fn options() -> (bool, Cmd) {
    /// parses the sheet location
    fn target() -> impl Parser<Target> {
        let part = long("part")
            .help("Part id to attach to the sheet")
            .argument::<String>("PART")
            .fallback("part".to_string());
        let group = long("group")
            .help("Group id to attach to the sheet")
            .argument::<String>("GROUP")
            .fallback("group".to_string());
        let file = positional::<PathBuf>("FILE").help("Path to a GML file");
        construct!(Target { part, group, file })
    }

    let check = target()
        .map(Cmd::Check)
        .to_options()
        .command("check")
        .help("Validate a GML file and print its totals");

    let format = target()
        .map(Cmd::Fmt)
        .to_options()
        .command("fmt")
        .help("Print a GML file in canonical form");

    let resolve = {
        let deadline = long("deadline")
            .help("JSON file describing the deadline policy")
            .argument::<PathBuf>("SPEC");
        let submitted = long("submitted")
            .help("Submission time, RFC 3339")
            .argument::<String>("TIME")
            .parse(|s| DateTime::parse_from_rfc3339(&s).map(|t| t.with_timezone(&Utc)));
        let earned = long("assignment-earned")
            .help("Earned points across the whole assignment")
            .argument::<f64>("POINTS")
            .optional();
        let out_of = long("assignment-out-of")
            .help("Out-of points across the whole assignment")
            .argument::<f64>("POINTS")
            .optional();
        let assignment = construct!(earned, out_of).map(|(earned, out_of)| {
            (earned.is_some() || out_of.is_some()).then_some(Total { earned, out_of })
        });
        let target = target();
        construct!(Cmd::Resolve {
            deadline,
            submitted,
            assignment,
            target
        })
        .to_options()
        .command("resolve")
        .help("Resolve a submission time against a deadline policy")
    };

    let verbose = short('v')
        .long("verbose")
        .help("Log debug output")
        .switch();
    let cmd = construct!([check, format, resolve]);

    construct!(verbose, cmd)
        .to_options()
        .descr("Grading sheet tool")
        .run()
}

/// One row of the totals table.
#[derive(Tabled)]
struct Row {
    /// Section name.
    #[tabled(rename = "Section")]
    section: String,
    /// Earned/out-of.
    #[tabled(rename = "Points")]
    points:  String,
    /// Comment, if any.
    #[tabled(rename = "Comment")]
    comment: String,
}

/// Decodes the target file.
fn load(target: &Target) -> Result<Instance> {
    gml::decode_file(&target.file, target.part.as_str(), target.group.as_str())
        .with_context(|| format!("Could not read grading sheet {}", target.file.display()))
}

fn main() -> Result<()> {
    dotenv().ok();

    let (verbose, cmd) = options();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);
    let filter_layer = LevelFilter::from_level(if verbose { Level::DEBUG } else { Level::INFO });
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    match cmd {
        Cmd::Check(target) => {
            let instance = load(&target)?;
            let mut rows: Vec<Row> = instance
                .sheet()
                .sections()
                .iter()
                .map(|section| Row {
                    section: section.name().to_string(),
                    points:  section.total().to_string(),
                    comment: section.comment().unwrap_or_default().to_string(),
                })
                .collect();
            rows.push(Row {
                section: "Total".to_string(),
                points:  instance.total().to_string(),
                comment: String::new(),
            });
            println!("{}", Table::new(rows).with(Style::modern()));
        }
        Cmd::Fmt(target) => {
            let instance = load(&target)?;
            print!("{}", gml::encode(&instance));
        }
        Cmd::Resolve {
            target,
            deadline,
            submitted,
            assignment,
        } => {
            let instance = load(&target)?;
            let text = std::fs::read_to_string(&deadline)
                .with_context(|| format!("Could not read {}", deadline.display()))?;
            let spec: DeadlineSpec = serde_json::from_str(&text)
                .with_context(|| format!("Could not parse deadline policy {}", deadline.display()))?;
            let score = gradesheet::score(&instance, &spec, submitted, assignment)
                .context("Could not resolve submission time")?;
            println!("{}", serde_json::to_string_pretty(&score)?);
        }
    }

    Ok(())
}

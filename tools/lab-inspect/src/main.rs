//! Terminal Lab Inspector
//!
//! Builds the seeded lab filesystem and prints it the way `ls -l` would,
//! followed by the shell prompt and the session snapshot.
//!
//! ```text
//! lab-inspect [START_PATH]
//! LAB_CONFIG=lab.json RUST_LOG=debug lab-inspect /etc
//! ```

use std::process::ExitCode;

use lab_vfs::filesystem::format_list_date;
use lab_vfs::{Filesystem, FindOptions, LabConfig, NodeKind, Stat, SystemClock};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "lab-inspect failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::var("LAB_CONFIG") {
        Ok(path) => LabConfig::from_json(&std::fs::read_to_string(path)?)?,
        Err(_) => LabConfig::default(),
    };
    let start = std::env::args().nth(1).unwrap_or_else(|| String::from("/"));

    let fs = Filesystem::with_config(config, SystemClock)?;

    for path in fs.find(&start, &FindOptions::default())? {
        if let Some(stat) = fs.stat(&path) {
            println!("{}", long_line(&stat));
        }
    }

    println!();
    println!("{}", fs.prompt());
    println!("{}", fs.to_json()?);
    Ok(())
}

fn long_line(stat: &Stat) -> String {
    format!(
        "{} {:>2} {:<8} {:<8} {:>6} {} {}",
        stat.permissions.render(stat.kind == NodeKind::Directory),
        stat.link_count,
        stat.owner,
        stat.group,
        stat.size,
        format_list_date(stat.mtime),
        stat.path
    )
}

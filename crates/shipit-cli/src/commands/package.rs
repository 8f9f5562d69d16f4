use serde::Serialize;
use shipit_build::{PackageOutcome, PackageRequest, Packager};
use shipit_core::ShipConfig;
use std::path::PathBuf;

/// Machine-readable summary printed by `shipit package --json`.
#[derive(Serialize)]
struct PackageSummary<'a> {
    commit: &'a str,
    archive: String,
    entries: &'a [String],
    steps: &'a [String],
}

impl<'a> From<&'a PackageOutcome> for PackageSummary<'a> {
    fn from(outcome: &'a PackageOutcome) -> Self {
        Self {
            commit: &outcome.commit,
            archive: outcome.archive.display().to_string(),
            entries: &outcome.entries,
            steps: &outcome.steps,
        }
    }
}

/// Run the packaging pipeline from the current directory.
pub fn package(show_build_output: bool, json: bool) -> anyhow::Result<()> {
    let invocation_dir = PathBuf::from(".");
    let config = ShipConfig::load(&invocation_dir)?;

    let outcome = Packager::new().package(&PackageRequest {
        config: &config,
        output_dir: &invocation_dir,
        show_build_output,
    })?;

    if json {
        let summary = PackageSummary::from(&outcome);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for step in &outcome.steps {
            println!("{step}");
        }
    }

    Ok(())
}

use shipit_build::{CheckResult, Packager};
use shipit_core::{CONFIG_FILE, ShipConfig};
use std::path::Path;

pub fn doctor() -> anyhow::Result<()> {
    let (config, config_file) = match ShipConfig::load(Path::new(".")) {
        Ok(config) if Path::new(CONFIG_FILE).exists() => (config, CheckResult::ok("Found")),
        Ok(config) => (config, CheckResult::ok("Not found, using defaults")),
        // Keep diagnosing with defaults so the rest of the report is still useful.
        Err(e) => (ShipConfig::default(), CheckResult::fail(&e.to_string())),
    };

    let mut report = Packager::new().doctor(&config);
    report.config_file = config_file;

    println!();
    println!("{report}");

    if !report.all_passed() {
        anyhow::bail!("some checks failed — see above for details");
    }

    Ok(())
}

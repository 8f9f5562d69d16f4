use crate::exec::CommandRunner;
use crate::git;
use crate::packager::Packager;
use shipit_core::{ShipConfig, SourceLayout};
use std::fmt;
use std::path::Path;

impl<R: CommandRunner> Packager<R> {
    /// Run all readiness checks without early abort.
    /// Returns a report with pass/fail for each check item.
    pub fn doctor(&self, config: &ShipConfig) -> DoctorReport {
        let mut report = DoctorReport::default();

        // 1. git
        match self
            .runner()
            .run(Path::new("git"), &["--version".to_owned()], Path::new("."))
        {
            Ok(v) => {
                let version = v.trim();
                let version = version.strip_prefix("git version ").unwrap_or(version);
                report.git = CheckResult::ok(version);
            }
            Err(e) => report.git = CheckResult::fail(&e.to_string()),
        }

        // 2. Source root
        let layout = match SourceLayout::resolve(config, self.env()) {
            Ok(layout) => {
                report.source_root = CheckResult::ok(&layout.source_root.display().to_string());
                layout
            }
            Err(e) => {
                report.source_root = CheckResult::fail(&e.to_string());
                let skipped = CheckResult::fail("skipped: no source root");
                report.build_script = skipped.clone();
                report.helper_script = skipped.clone();
                report.assets_dir = skipped.clone();
                report.working_tree = skipped;
                return report;
            }
        };

        // 3. Inputs
        report.build_script = file_check(layout.build_script());
        report.helper_script = file_check(layout.helper_script());
        report.assets_dir = if layout.assets_dir().is_dir() {
            CheckResult::ok(&layout.assets_dir().display().to_string())
        } else {
            CheckResult::fail(&format!("{} not found", layout.assets_dir().display()))
        };

        // 4. Working tree
        match git::working_tree_changes(self.runner(), &layout.source_root) {
            Ok(changes) if changes.is_empty() => report.working_tree = CheckResult::ok("Clean"),
            Ok(changes) => {
                let count = changes.lines().count();
                report.working_tree = CheckResult::fail(&format!("{count} uncommitted change(s)"));
            }
            Err(e) => report.working_tree = CheckResult::fail(&e.to_string()),
        }

        report
    }
}

fn file_check(path: &Path) -> CheckResult {
    if path.is_file() {
        CheckResult::ok(&path.display().to_string())
    } else {
        CheckResult::fail(&format!("{} not found", path.display()))
    }
}

// ── Doctor types ──

#[derive(Debug, Default, Clone)]
pub struct DoctorReport {
    pub config_file: CheckResult,
    pub git: CheckResult,
    pub source_root: CheckResult,
    pub build_script: CheckResult,
    pub helper_script: CheckResult,
    pub assets_dir: CheckResult,
    pub working_tree: CheckResult,
}

impl DoctorReport {
    pub fn all_passed(&self) -> bool {
        self.checks().iter().all(|(_, c)| c.passed)
    }

    fn checks(&self) -> [(&'static str, &CheckResult); 7] {
        [
            ("Config file", &self.config_file),
            ("git", &self.git),
            ("Source root", &self.source_root),
            ("Build script", &self.build_script),
            ("Helper script", &self.helper_script),
            ("Assets dir", &self.assets_dir),
            ("Working tree", &self.working_tree),
        ]
    }
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, check) in self.checks() {
            writeln!(f, "  [{}] {label:<14} {}", check.icon(), check.detail)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn ok(detail: &str) -> Self {
        Self {
            passed: true,
            detail: detail.to_owned(),
        }
    }

    pub fn fail(detail: &str) -> Self {
        Self {
            passed: false,
            detail: detail.to_owned(),
        }
    }

    pub fn icon(&self) -> &'static str {
        if self.passed { "OK" } else { "NG" }
    }
}

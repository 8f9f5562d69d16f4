use std::path::Path;

pub fn inspect(archive: &Path) -> anyhow::Result<()> {
    let entries = shipit_build::list_entries(archive)?;
    for name in &entries {
        println!("{name}");
    }
    tracing::debug!(entries = entries.len(), archive = %archive.display(), "inspected");
    Ok(())
}

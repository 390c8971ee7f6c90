//! Export command implementation

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use fingenie_core::db::Database;

pub fn cmd_export(db: &Database, output: Option<PathBuf>) -> Result<()> {
    let csv = db.export_transactions_csv()?;

    match output {
        Some(path) => {
            let mut file = File::create(&path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            file.write_all(csv.as_bytes())?;

            let count = csv.lines().count().saturating_sub(1);
            println!("✅ Exported {} expense(s) to {}", count, path.display());
        }
        None => {
            print!("{}", csv);
        }
    }

    Ok(())
}

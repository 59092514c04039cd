//! Command handlers behind the three binaries.
//!
//! Handlers own printing and exit policy. Each has a `run` entry that wires
//! live adapters and a `run_with_context` twin that tests drive with the
//! in-memory ones.

pub mod demo_runner;
pub mod setup_environment;
pub mod task_setup;

use crate::adapters::live::environment::LiveEnvironment;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::cli::CommonArgs;
use crate::config::DemoConfig;

/// Loads `.env`, then the configuration, then applies the shared CLI flags.
///
/// # Errors
///
/// Returns an error string if the configuration file cannot be read or parsed.
pub fn load_config(common: &CommonArgs) -> Result<DemoConfig, String> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!(error = %e, "ignoring unreadable .env file");
        }
    }
    let mut config = DemoConfig::load(&LiveEnvironment, &LiveFileSystem, common.config.as_deref())
        .map_err(|e| e.to_string())?;
    if let Some(dir) = &common.state_dir {
        config.state_root.clone_from(dir);
    }
    Ok(config)
}

/// Builds the single-threaded runtime the handlers block on.
///
/// # Errors
///
/// Returns an error string if the runtime cannot be created.
pub fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))
}

/// Renders rows as an aligned table under a header and a dashed rule.
fn table<const N: usize>(header: [&str; N], rows: &[[String; N]]) -> String {
    let mut widths = header.map(str::len);
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }
    let render = |cells: [&str; N]| {
        cells
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    let mut out = vec![render(header), widths.map(|w| "-".repeat(w)).join("  ")];
    out.extend(rows.iter().map(|r| render(r.each_ref().map(String::as_str))));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::table;

    #[test]
    fn table_aligns_columns() {
        let rendered = table(
            ["ID", "STATUS"],
            &[["DEMO-P1-SLOS".to_string(), "todo".to_string()], ["X".into(), "done".into()]],
        );
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[0], "ID            STATUS");
        assert_eq!(lines[1], "------------  ------");
        assert_eq!(lines[2], "DEMO-P1-SLOS  todo");
        assert_eq!(lines[3], "X             done");
    }
}

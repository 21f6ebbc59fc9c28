mod args;

pub use args::{Cli, Command};

use color_eyre::eyre::Result;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version_text(json: bool) -> Result<String> {
    if json {
        let value = serde_json::json!({
            "version": VERSION,
            "commit": option_env!("TFRSTATE_COMMIT").unwrap_or_default(),
        });
        return Ok(format!("{}\n", serde_json::to_string_pretty(&value)?));
    }
    Ok(format!("tfrstate {VERSION}\n"))
}

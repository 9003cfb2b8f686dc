use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;

use crate::client::ZpaClient;
use crate::commands::files::read_config;
use crate::context::Context;
use crate::lifecycle;

pub struct DataCommand;

impl DataCommand {
    /// Read a data source and print the result as JSON, or write it to `out`
    pub fn execute(
        ctx: &Context,
        client: &ZpaClient,
        type_name: &str,
        config_path: &Path,
        out: Option<&Path>,
    ) -> Result<()> {
        let config = read_config(&*ctx.fs, config_path)?;

        let state = lifecycle::read_data_source(&ctx.provider, client, type_name, config)
            .with_context(|| format!("Failed to read data source {}", type_name))?;

        let document = serde_json::to_string_pretty(&state).context("Failed to serialize result")?;

        match out {
            Some(path) => {
                ctx.fs.write(path, &document)?;
                ctx.output
                    .success(&format!("Wrote {} {} to {}", type_name, state.id, path.display()));
            }
            None => ctx.output.plain(&document),
        }

        Ok(())
    }
}

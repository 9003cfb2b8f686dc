use anyhow::{Context as AnyhowContext, Result, bail};
use std::path::Path;

use crate::client::ZpaClient;
use crate::commands::files::{print_state, report_warnings, write_state};
use crate::context::Context;
use crate::lifecycle;

pub struct ImportCommand;

impl ImportCommand {
    /// Adopt an existing ZPA object into a new state file
    pub fn execute(
        ctx: &Context,
        client: &ZpaClient,
        resource_type: &str,
        id: &str,
        state_path: &Path,
    ) -> Result<()> {
        if ctx.fs.is_file(state_path) {
            bail!(
                "State file {} already exists; destroy or move it before importing",
                state_path.display()
            );
        }

        ctx.output.section(&format!("Import {}", resource_type));

        let outcome = lifecycle::import(&ctx.provider, client, resource_type, id)
            .with_context(|| format!("Failed to import {} {}", resource_type, id))?;

        report_warnings(ctx, &outcome.warnings);

        let Some(state) = outcome.state else {
            bail!("{} {} does not exist in ZPA", resource_type, id);
        };

        write_state(&*ctx.fs, state_path, &state)?;
        ctx.output.success(&format!("Imported {}", resource_type));
        print_state(ctx, &state);

        Ok(())
    }
}

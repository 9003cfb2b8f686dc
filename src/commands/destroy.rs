use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;

use crate::client::ZpaClient;
use crate::commands::files::{remove_state, report_warnings, require_state};
use crate::context::Context;
use crate::lifecycle;

pub struct DestroyCommand;

impl DestroyCommand {
    /// Delete the resource recorded in the state file, then the state file itself
    pub fn execute(ctx: &Context, client: &ZpaClient, state_path: &Path) -> Result<()> {
        let state = require_state(&*ctx.fs, state_path)?;
        ctx.output.section(&format!("Destroy {}", state.resource_type));

        let warnings = lifecycle::destroy(&ctx.provider, client, &state)
            .with_context(|| format!("Failed to delete {} {}", state.resource_type, state.id))?;

        report_warnings(ctx, &warnings);
        remove_state(&*ctx.fs, state_path)?;

        ctx.output
            .success(&format!("{} {} destroyed", state.resource_type, state.id));

        Ok(())
    }
}

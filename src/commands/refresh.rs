use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;

use crate::client::ZpaClient;
use crate::commands::files::{print_state, remove_state, report_warnings, require_state, write_state};
use crate::context::Context;
use crate::lifecycle;

pub struct RefreshCommand;

impl RefreshCommand {
    pub fn execute(ctx: &Context, client: &ZpaClient, state_path: &Path) -> Result<()> {
        let state = require_state(&*ctx.fs, state_path)?;
        ctx.output.section(&format!("Refresh {}", state.resource_type));

        let outcome = lifecycle::refresh(&ctx.provider, client, &state)
            .with_context(|| format!("Failed to read {} {}", state.resource_type, state.id))?;

        report_warnings(ctx, &outcome.warnings);

        match outcome.state {
            Some(refreshed) => {
                write_state(&*ctx.fs, state_path, &refreshed)?;
                ctx.output.success("State refreshed");
                print_state(ctx, &refreshed);
            }
            None => {
                remove_state(&*ctx.fs, state_path)?;
                ctx.output.warning(&format!(
                    "{} {} no longer exists in ZPA; removed {}",
                    state.resource_type,
                    state.id,
                    state_path.display()
                ));
            }
        }

        Ok(())
    }
}

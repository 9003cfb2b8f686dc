use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;

use crate::client::ZpaClient;
use crate::commands::files::{print_state, read_config, read_state, remove_state, report_warnings, write_state};
use crate::context::Context;
use crate::lifecycle;

pub struct ApplyCommand;

impl ApplyCommand {
    /// Create or update a resource from a config file, recording the result in a state file
    pub fn execute(
        ctx: &Context,
        client: &ZpaClient,
        resource_type: &str,
        config_path: &Path,
        state_path: &Path,
    ) -> Result<()> {
        ctx.output.section(&format!("Apply {}", resource_type));

        let config = read_config(&*ctx.fs, config_path)?;
        let prior = read_state(&*ctx.fs, state_path)?;

        let action = if prior.is_some() { "update" } else { "create" };
        let outcome = lifecycle::apply(&ctx.provider, client, resource_type, config, prior.as_ref())
            .with_context(|| format!("Failed to {} {}", action, resource_type))?;

        report_warnings(ctx, &outcome.warnings);

        match outcome.state {
            Some(state) => {
                write_state(&*ctx.fs, state_path, &state)?;
                ctx.output.success(&format!("{} {}d", resource_type, action));
                print_state(ctx, &state);
            }
            None => {
                remove_state(&*ctx.fs, state_path)?;
                let id = prior.map(|p| p.id).unwrap_or_default();
                ctx.output.warning(&format!(
                    "{} {} no longer exists in ZPA; removed {}",
                    resource_type,
                    id,
                    state_path.display()
                ));
            }
        }

        Ok(())
    }
}

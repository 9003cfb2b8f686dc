use anyhow::{Result, bail};
use std::path::Path;

use crate::commands::files::{read_config, report_warnings};
use crate::context::Context;
use crate::error::ProviderError;
use crate::lifecycle;

pub struct ValidateCommand;

impl ValidateCommand {
    /// Check a configuration file against a resource or data source schema
    pub fn execute(ctx: &Context, type_name: &str, config_path: &Path) -> Result<()> {
        let config = read_config(&*ctx.fs, config_path)?;

        match lifecycle::validate(&ctx.provider, type_name, &config) {
            Ok(warnings) => {
                report_warnings(ctx, &warnings);
                ctx.output.success(&format!(
                    "{} is a valid {} configuration",
                    config_path.display(),
                    type_name
                ));
                Ok(())
            }
            Err(ProviderError::InvalidConfig(diagnostics)) => {
                for diagnostic in &diagnostics {
                    ctx.output.error(&diagnostic.to_string());
                }
                bail!(
                    "{} is not a valid {} configuration ({} error(s))",
                    config_path.display(),
                    type_name,
                    diagnostics.len()
                )
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockFileSystem, MockOutput, OutputMessage};
    use std::sync::Arc;

    fn context(path: &str, contents: &str) -> (Arc<MockOutput>, Context) {
        let output = Arc::new(MockOutput::new());
        let fs = MockFileSystem::new().with_file(path, contents);
        let ctx = Context::test_with(Arc::new(fs), output.clone());
        (output, ctx)
    }

    #[test]
    fn test_valid_config() {
        let (output, ctx) = context(
            "/work/rule.yaml",
            "name: isolate-web\naction: ISOLATE\nzpn_isolation_profile_id: \"216196257331286656\"\n",
        );

        ValidateCommand::execute(&ctx, "zpa_policy_access_isolation_rule", Path::new("/work/rule.yaml"))
            .unwrap();

        assert!(output.contains_message(&OutputMessage::Success(
            "/work/rule.yaml is a valid zpa_policy_access_isolation_rule configuration".to_string()
        )));
    }

    #[test]
    fn test_invalid_config_prints_each_problem() {
        let (output, ctx) = context("/work/rule.yaml", "action: EXPLODE\ncolour: blue\n");

        let err = ValidateCommand::execute(&ctx, "zpa_policy_access_isolation_rule", Path::new("/work/rule.yaml"))
            .unwrap_err();

        assert!(err.to_string().contains("(3 error(s))"));
        let errors = output.get_errors();
        assert!(errors.iter().any(|e| e.starts_with("action: expected one of")));
        assert!(errors.iter().any(|e| e == "colour: unsupported attribute"));
        assert!(errors.iter().any(|e| e == "name: attribute is required"));
    }

    #[test]
    fn test_unknown_type() {
        let (_, ctx) = context("/work/x.yaml", "name: x\n");

        let err = ValidateCommand::execute(&ctx, "zpa_nope", Path::new("/work/x.yaml")).unwrap_err();
        assert_eq!(err.to_string(), "unknown resource type 'zpa_nope'");
    }
}

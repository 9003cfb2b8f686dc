use anyhow::{Context as AnyhowContext, Result, bail};
use serde_json::{Map, Value, json};

use crate::context::Context;

pub struct SchemaCommand;

impl SchemaCommand {
    /// Print the provider schema, or the schemas registered under one type name
    pub fn execute(ctx: &Context, type_name: Option<&str>) -> Result<()> {
        let document = match type_name {
            None => serde_json::to_value(ctx.provider.schemas())
                .context("Failed to serialize provider schema")?,
            Some(name) => Self::schema_for(ctx, name)?,
        };

        let text = serde_json::to_string_pretty(&document).context("Failed to format schema")?;
        ctx.output.plain(&text);

        Ok(())
    }

    fn schema_for(ctx: &Context, name: &str) -> Result<Value> {
        let mut document = Map::new();

        if let Ok(resource) = ctx.provider.resource(name) {
            document.insert("resource".to_string(), json!(resource.schema()));
        }

        if let Ok(data_source) = ctx.provider.data_source(name) {
            document.insert("data_source".to_string(), json!(data_source.schema()));
        }

        if document.is_empty() {
            bail!(
                "Unknown type '{}'. Resources: {}. Data sources: {}",
                name,
                ctx.provider.resource_types().join(", "),
                ctx.provider.data_source_types().join(", ")
            );
        }

        Ok(Value::Object(document))
    }
}

//! Instance management handlers.

use secrecy::SecretString;
use tabled::Tabled;

use pifleet_config::JsonFileStore;
use pifleet_core::{Fleet, Instance, InstanceEdit, NewInstance};

use crate::cli::{GlobalOpts, InstancesArgs, InstancesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct InstanceRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Reference")]
    reference: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Serialized view of an instance. Session tokens and the API key stay
/// out of the output.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InstanceView<'a> {
    id: u32,
    name: &'a str,
    url: &'a str,
    is_reference: bool,
    status: pifleet_core::InstanceStatus,
}

impl<'a> From<&'a Instance> for InstanceView<'a> {
    fn from(i: &'a Instance) -> Self {
        Self {
            id: i.id,
            name: &i.name,
            url: &i.url,
            is_reference: i.is_reference,
            status: i.status,
        }
    }
}

impl From<&InstanceView<'_>> for InstanceRow {
    fn from(v: &InstanceView<'_>) -> Self {
        Self {
            id: v.id,
            name: v.name.to_owned(),
            url: v.url.to_owned(),
            reference: if v.is_reference { "yes".into() } else { String::new() },
            status: output::status_label(v.status),
        }
    }
}

/// Render instances as a list in the selected format.
pub(crate) fn render_instances(
    instances: &[Instance],
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let views: Vec<InstanceView<'_>> = instances.iter().map(InstanceView::from).collect();
    let out = output::render_list(global.format(), &views, |v| InstanceRow::from(v), |v| {
        v.id.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn render_instance(instance: &Instance, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(
        global.format(),
        &InstanceView::from(instance),
        |v| {
            let reference = if v.is_reference { " (reference)" } else { "" };
            format!(
                "{} [{}]{reference}\n  URL:    {}\n  Status: {}",
                v.name,
                v.id,
                v.url,
                output::status_label(v.status)
            )
        },
        |v| v.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    fleet: &Fleet<JsonFileStore>,
    args: InstancesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        InstancesCommand::List => {
            let instances = fleet.instances().await?;
            render_instances(&instances, global)
        }

        InstancesCommand::Add {
            name,
            url,
            api_key,
            reference,
        } => {
            let api_key = match api_key {
                Some(key) => key,
                None => util::prompt_api_key()?,
            };
            let added = fleet
                .add_instance(NewInstance {
                    name,
                    url,
                    api_key,
                    is_reference: reference,
                })
                .await?;
            if !global.quiet && !added.status.is_active() {
                eprintln!(
                    "Instance saved, but it is {}. Check the URL and application password.",
                    added.status
                );
            }
            render_instance(&added, global)
        }

        InstancesCommand::Edit {
            id,
            name,
            url,
            api_key,
            reference,
        } => {
            let edit = InstanceEdit {
                name,
                url,
                api_key: api_key.map(SecretString::from),
                is_reference: reference,
            };
            if edit.is_empty() {
                return Err(CliError::Validation {
                    field: "edit".into(),
                    reason: "nothing to change; pass --name, --url, --api-key or --reference"
                        .into(),
                });
            }
            let edited = fleet.edit_instance(id, edit).await?;
            render_instance(&edited, global)
        }

        InstancesCommand::Remove { id } => {
            let instance = fleet.instance(id).await?;
            if !util::confirm(
                &format!("Remove instance '{}' ({})?", instance.name, instance.url),
                "instances remove",
                global.yes,
            )? {
                return Ok(());
            }
            let removed = fleet.remove_instance(id).await?;
            if !global.quiet {
                eprintln!("Removed instance '{}'", removed.name);
            }
            Ok(())
        }

        InstancesCommand::SetReference { id } => {
            let reference = fleet.set_reference(id).await?;
            if !global.quiet {
                eprintln!("'{}' is now the reference instance", reference.name);
            }
            Ok(())
        }
    }
}

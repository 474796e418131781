use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "armident",
    about = "Normalize Azure Resource Manager managed identity payloads",
    version
)]
pub struct Cli {
    /// Output format.
    #[arg(long, env = "ARMIDENT_OUTPUT", default_value = "text", global = true)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Expand identity documents into ARM request bodies.
    Expand {
        /// An identity document, or a directory of them.
        path: PathBuf,
    },

    /// Convert an ARM `identity` payload into the canonical form.
    Normalize {
        /// Wire shape of the payload.
        #[arg(long)]
        variant: VariantArg,

        /// JSON file to read; stdin when omitted.
        file: Option<PathBuf>,
    },

    /// Convert an ARM `identity` payload into Terraform `identity` blocks.
    Flatten {
        /// Wire shape of the payload.
        #[arg(long)]
        variant: VariantArg,

        /// Identity block schema of the resource.
        #[arg(long, default_value = "system-user-assigned")]
        schema: SchemaArg,

        /// JSON file to read; stdin when omitted.
        file: Option<PathBuf>,
    },

    /// Expand and validate identity documents without emitting request bodies.
    Check {
        /// An identity document, or a directory of them.
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VariantArg {
    SystemAssigned,
    UserAssignedList,
    UserAssignedMap,
    SystemUserAssignedList,
    SystemUserAssignedMap,
}

impl From<VariantArg> for armident_identity::WireVariant {
    fn from(v: VariantArg) -> Self {
        use armident_identity::WireVariant;
        match v {
            VariantArg::SystemAssigned => WireVariant::SystemAssigned,
            VariantArg::UserAssignedList => WireVariant::UserAssignedList,
            VariantArg::UserAssignedMap => WireVariant::UserAssignedMap,
            VariantArg::SystemUserAssignedList => WireVariant::SystemUserAssignedList,
            VariantArg::SystemUserAssignedMap => WireVariant::SystemUserAssignedMap,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SchemaArg {
    SystemAssigned,
    UserAssigned,
    SystemUserAssigned,
}

impl From<SchemaArg> for armident_identity::SchemaKind {
    fn from(s: SchemaArg) -> Self {
        use armident_identity::SchemaKind;
        match s {
            SchemaArg::SystemAssigned => SchemaKind::SystemAssigned,
            SchemaArg::UserAssigned => SchemaKind::UserAssigned,
            SchemaArg::SystemUserAssigned => SchemaKind::SystemUserAssigned,
        }
    }
}

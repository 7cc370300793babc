use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use log::{LevelFilter, debug};
use serde::Serialize;
use serde::de::DeserializeOwned;
use similar::{ChangeTag, TextDiff};

use spotform_core::provider::Provider;
use spotform_core::value::attributes_from_json;
use spotform_core::{
    AttributeMode, AttributeSchema, AttributeType, Configuration, FieldName, Payload,
    ResourceDefinition, ResourceSchema, TypeError, Value,
};
use spotform_provider_spotinst::resources::{elastigroup_aws, ocean_aws};
use spotform_provider_spotinst::retry::{DEFAULT_BUDGET, DEFAULT_INTERVAL, DEFAULT_RETRYABLE_CODE};
use spotform_provider_spotinst::{ProviderConfig, Resources, RetryPolicy, SpotinstProvider};

#[derive(Parser)]
#[command(name = "spotform")]
#[command(about = "Inspect and exercise Spotinst resource mappings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level (RUST_LOG is honored otherwise)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(flatten)]
    provider: ProviderArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the schema of one resource type, or of all of them
    Schema {
        /// Resource type (e.g. spotinst_ocean_aws)
        resource: Option<String>,
    },
    /// Expand a configuration into the create payload sent to the API
    Expand {
        resource: String,
        /// JSON object of attribute values
        config: PathBuf,
    },
    /// Flatten an API payload into state
    Flatten {
        resource: String,
        /// JSON payload as returned by the API
        payload: PathBuf,

        /// Existing state; shows the diff the read would produce
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Show which fields an update would send
    Plan {
        resource: String,
        /// Planned configuration
        config: PathBuf,

        /// Persisted state of the instance
        #[arg(long)]
        state: PathBuf,

        /// Instance ID
        #[arg(long)]
        id: String,
    },
    /// Create an instance against the in-memory API and print its state
    Apply {
        resource: String,
        config: PathBuf,
    },
    /// Generate shell completions
    Completions { shell: Shell },
}

#[derive(Args, Debug, Clone)]
struct ProviderArgs {
    /// Spotinst account ID (act-...)
    #[arg(long, env = "SPOTINST_ACCOUNT", global = true)]
    account: Option<String>,

    /// Seconds to keep retrying calls rejected with the retryable code
    #[arg(long, env = "SPOTFORM_RETRY_BUDGET_SECS", global = true, default_value_t = DEFAULT_BUDGET.as_secs())]
    retry_budget_secs: u64,

    /// Seconds between retries
    #[arg(long, env = "SPOTFORM_RETRY_INTERVAL_SECS", global = true, default_value_t = DEFAULT_INTERVAL.as_secs())]
    retry_interval_secs: u64,

    /// API error code that is retried
    #[arg(long, env = "SPOTFORM_RETRYABLE_CODE", global = true, default_value = DEFAULT_RETRYABLE_CODE)]
    retryable_code: String,
}

impl ProviderArgs {
    fn to_config(&self) -> Result<ProviderConfig, String> {
        let config = ProviderConfig::new(
            self.account.clone(),
            RetryPolicy {
                retryable_code: self.retryable_code.clone(),
                budget: Duration::from_secs(self.retry_budget_secs),
                interval: Duration::from_secs(self.retry_interval_secs),
            },
        );
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

/// Run `$body` with `$definition` bound to the typed definition of `$name`
macro_rules! with_definition {
    ($resources:expr, $name:expr, |$definition:ident| $body:expr) => {
        match $name {
            elastigroup_aws::NAME => {
                let $definition = $resources.elastigroup_aws.as_ref();
                $body
            }
            ocean_aws::NAME => {
                let $definition = $resources.ocean_aws.as_ref();
                $body
            }
            other => Err(unknown_resource(other)),
        }
    };
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Schema { resource } => run_schema(resource.as_deref()),
        Commands::Expand { resource, config } => run_expand(&resource, &config),
        Commands::Flatten {
            resource,
            payload,
            state,
        } => run_flatten(&resource, &payload, state.as_deref()),
        Commands::Plan {
            resource,
            config,
            state,
            id,
        } => run_plan(&resource, &config, &state, &id),
        Commands::Apply { resource, config } => run_apply(&cli.provider, &resource, &config).await,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "spotform", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn load_resources() -> Result<Resources, String> {
    Resources::new().map_err(|e| format!("Failed to compose resources: {}", e))
}

fn unknown_resource(name: &str) -> String {
    format!(
        "Unknown resource type '{}', expected one of: {}",
        name,
        Resources::names().join(", ")
    )
}

// =============================================================================
// Commands
// =============================================================================

fn run_schema(resource: Option<&str>) -> Result<(), String> {
    let resources = load_resources()?;
    let names = match resource {
        Some(name) => vec![name],
        None => Resources::names().to_vec(),
    };

    for name in names {
        let schema = with_definition!(resources, name, |definition| Ok(definition.schema().clone()))?;
        print_schema(&schema);
        println!();
    }
    Ok(())
}

fn run_expand(resource: &str, file: &Path) -> Result<(), String> {
    let resources = load_resources()?;
    let values = read_attributes(file)?;
    let payload = with_definition!(resources, resource, |definition| expand(definition, values))?;
    println!("{}", to_pretty(&payload)?);
    Ok(())
}

fn run_flatten(resource: &str, payload_file: &Path, state_file: Option<&Path>) -> Result<(), String> {
    let resources = load_resources()?;
    let payload = read_json(payload_file)?;
    let state = match state_file {
        Some(path) => read_attributes(path)?,
        None => BTreeMap::new(),
    };

    let flattened = with_definition!(resources, resource, |definition| flatten(
        definition,
        &payload,
        state.clone()
    ))?;

    let after = state_json(&flattened)?;
    match state_file {
        Some(path) => {
            let before = state_json(&state)?;
            if before == after {
                println!("{}", "No changes. State matches the payload.".green());
            } else {
                print_diff(path, &before, &after);
            }
        }
        None => println!("{}", after),
    }
    Ok(())
}

fn run_plan(resource: &str, config_file: &Path, state_file: &Path, id: &str) -> Result<(), String> {
    let resources = load_resources()?;
    let planned = read_attributes(config_file)?;
    let prior = read_attributes(state_file)?;

    let summary = with_definition!(resources, resource, |definition| plan(
        definition, id, prior, planned
    ))?;
    print_plan(resource, id, &summary)
}

async fn run_apply(args: &ProviderArgs, resource: &str, file: &Path) -> Result<(), String> {
    let config = args.to_config()?;
    let provider = SpotinstProvider::in_memory(config)
        .map_err(|e| format!("Failed to compose resources: {}", e))?;
    let values = read_attributes(file)?;

    let state = apply(&provider, resource, values).await?;
    println!(
        "{} {}.{}",
        "Created".green().bold(),
        resource,
        state.id().unwrap_or("-")
    );
    println!("{}", state_json(state.values())?);
    Ok(())
}

// =============================================================================
// Engine passes
// =============================================================================

fn expand<P>(
    definition: &ResourceDefinition<P>,
    mut values: BTreeMap<String, Value>,
) -> Result<serde_json::Value, String>
where
    P: Payload + Serialize,
{
    definition.apply_defaults(&mut values);
    definition
        .validate(&values)
        .map_err(|errors| format_type_errors(definition.name(), &errors))?;

    let payload = definition
        .on_create(&Configuration::new(values))
        .map_err(|e| format!("{}: {}", definition.name(), e))?;
    serde_json::to_value(&payload).map_err(|e| e.to_string())
}

fn flatten<P>(
    definition: &ResourceDefinition<P>,
    payload: &serde_json::Value,
    state: BTreeMap<String, Value>,
) -> Result<BTreeMap<String, Value>, String>
where
    P: Payload + DeserializeOwned,
{
    let payload: P = serde_json::from_value(payload.clone())
        .map_err(|e| format!("Invalid {} payload: {}", definition.name(), e))?;

    let mut config = Configuration::new(state);
    definition
        .on_read(&payload, &mut config)
        .map_err(|e| format!("{}: {}", definition.name(), e))?;
    Ok(config.into_values())
}

/// What an update of one instance would do
#[derive(Debug)]
struct PlanSummary {
    changed: Vec<String>,
    local: Vec<String>,
    /// Sparse payload, present only when the API would be called
    payload: Option<serde_json::Value>,
}

fn plan<P>(
    definition: &ResourceDefinition<P>,
    id: &str,
    prior: BTreeMap<String, Value>,
    mut planned: BTreeMap<String, Value>,
) -> Result<PlanSummary, String>
where
    P: Payload + Serialize,
{
    definition.apply_defaults(&mut planned);
    definition
        .validate(&planned)
        .map_err(|errors| format_type_errors(definition.name(), &errors))?;

    let config = Configuration::for_update(id, prior, planned);
    let outcome = definition
        .on_update(&config)
        .map_err(|e| format!("{}.{}: {}", definition.name(), id, e))?;
    debug!("{}.{}: {:?}", definition.name(), id, outcome.changes);

    let payload = if outcome.should_update() {
        Some(serde_json::to_value(&outcome.payload).map_err(|e| e.to_string())?)
    } else {
        None
    };
    Ok(PlanSummary {
        changed: field_names(outcome.changes.changed_fields()),
        local: field_names(outcome.changes.local_changes()),
        payload,
    })
}

fn field_names(fields: &[FieldName]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

async fn apply(
    provider: &SpotinstProvider,
    resource: &str,
    mut values: BTreeMap<String, Value>,
) -> Result<Configuration, String> {
    let lifecycle = provider
        .resource(resource)
        .ok_or_else(|| unknown_resource(resource))?;

    lifecycle.schema().apply_defaults(&mut values);
    lifecycle
        .schema()
        .validate(&values)
        .map_err(|errors| format_type_errors(resource, &errors))?;

    let mut config = Configuration::new(values);
    lifecycle
        .create(&mut config)
        .await
        .map_err(|e| e.to_string())?;
    config.commit();
    Ok(config)
}

// =============================================================================
// Input / Output
// =============================================================================

fn read_json(path: &Path) -> Result<serde_json::Value, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

fn read_attributes(path: &Path) -> Result<BTreeMap<String, Value>, String> {
    let json = read_json(path)?;
    attributes_from_json(&json).ok_or_else(|| format!("{}: expected a JSON object", path.display()))
}

fn to_pretty(json: &serde_json::Value) -> Result<String, String> {
    serde_json::to_string_pretty(json).map_err(|e| e.to_string())
}

fn state_json(values: &BTreeMap<String, Value>) -> Result<String, String> {
    to_pretty(&Value::Map(values.clone()).to_json()).map(|s| s + "\n")
}

fn format_type_errors(resource: &str, errors: &[TypeError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", resource, e))
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_schema(schema: &ResourceSchema) {
    println!("{}", schema.resource_type.cyan().bold());
    for attribute in schema.iter() {
        print_attribute(attribute, 1);
    }
}

fn print_attribute(attribute: &AttributeSchema, depth: usize) {
    let indent = "  ".repeat(depth);
    let mut line = format!(
        "{}{} {} {}",
        indent,
        attribute.name.bold(),
        attribute.attr_type.to_string().yellow(),
        mode_label(attribute.mode).dimmed()
    );
    if let Some(default) = &attribute.default {
        line.push_str(&format!(" (default: {})", default));
    }
    if attribute.sensitive {
        line.push_str(&format!(" {}", "sensitive".magenta()));
    }
    println!("{}", line);

    if let AttributeType::Block { attributes, .. } = &attribute.attr_type {
        for nested in attributes {
            print_attribute(nested, depth + 1);
        }
    }
}

fn mode_label(mode: AttributeMode) -> &'static str {
    match mode {
        AttributeMode::Required => "required",
        AttributeMode::Optional => "optional",
        AttributeMode::Computed => "computed",
        AttributeMode::OptionalComputed => "optional+computed",
    }
}

fn print_plan(resource: &str, id: &str, summary: &PlanSummary) -> Result<(), String> {
    if summary.changed.is_empty() && summary.local.is_empty() {
        println!("{}", "No changes. Remote instance is up-to-date.".green());
        return Ok(());
    }

    println!("{} {}.{}", "Update plan for".cyan().bold(), resource, id);
    for field in &summary.changed {
        println!("  {} {}", "~".yellow().bold(), field);
    }
    for field in &summary.local {
        println!("  {} {} {}", "~".yellow().bold(), field, "(provider only)".dimmed());
    }

    match &summary.payload {
        Some(payload) => {
            println!();
            println!("{}", "Update payload:".cyan().bold());
            println!("{}", to_pretty(payload)?);
        }
        None => println!("{}", "No API call required.".green()),
    }
    Ok(())
}

fn print_diff(file: &Path, original: &str, updated: &str) {
    println!("\n{} {}:", "State diff for".cyan().bold(), file.display());

    let diff = TextDiff::from_lines(original, updated);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-".red(),
            ChangeTag::Insert => "+".green(),
            ChangeTag::Equal => " ".normal(),
        };
        print!("{}{}", sign, change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ocean_config() -> BTreeMap<String, Value> {
        attributes_from_json(&serde_json::json!({
            "controller_id": "prod-eks",
            "region": "us-west-2",
            "image_id": "ami-eks",
            "security_groups": ["sg-1"],
            "subnet_ids": ["subnet-1", "subnet-2"],
            "grace_period": 300
        }))
        .unwrap()
    }

    fn group_config() -> BTreeMap<String, Value> {
        attributes_from_json(&serde_json::json!({
            "name": "web",
            "product": "Linux/UNIX",
            "max_size": 5,
            "orientation": "balanced",
            "fallback_to_ondemand": true,
            "image_id": "ami-123",
            "security_groups": ["sg-1"],
            "instance_types_ondemand": "m5.large",
            "instance_types_spot": ["m5.large", "c5.large"]
        }))
        .unwrap()
    }

    #[test]
    fn test_provider_flags() {
        let cli = Cli::try_parse_from([
            "spotform",
            "apply",
            "spotinst_ocean_aws",
            "ocean.json",
            "--account",
            "act-1f2e",
            "--retry-interval-secs",
            "2",
        ])
        .unwrap();

        let config = cli.provider.to_config().unwrap();
        assert_eq!(config.account.as_deref(), Some("act-1f2e"));
        assert_eq!(config.retry.interval, Duration::from_secs(2));
        assert!(matches!(cli.command, Commands::Apply { .. }));
    }

    #[test]
    fn test_invalid_provider_flags() {
        let cli = Cli::try_parse_from([
            "spotform",
            "--retry-budget-secs",
            "0",
            "apply",
            "spotinst_ocean_aws",
            "ocean.json",
        ])
        .unwrap();

        let err = cli.provider.to_config().unwrap_err();
        assert!(err.contains("budget"), "{}", err);
    }

    #[test]
    fn test_expand_ocean_configuration() {
        let resources = Resources::new().unwrap();
        let payload = expand(resources.ocean_aws.as_ref(), ocean_config()).unwrap();

        assert_eq!(payload["controllerClusterId"], "prod-eks");
        assert_eq!(payload["strategy"]["gracePeriod"], 300);
        assert_eq!(payload["strategy"]["fallbackToOd"], true);
        assert_eq!(
            payload["compute"]["subnetIds"],
            serde_json::json!(["subnet-1", "subnet-2"])
        );
    }

    #[test]
    fn test_expand_reports_schema_errors() {
        let resources = Resources::new().unwrap();
        let mut values = ocean_config();
        values.remove("controller_id");

        let err = expand(resources.ocean_aws.as_ref(), values).unwrap_err();
        assert_eq!(
            err,
            "spotinst_ocean_aws: Required attribute 'controller_id' is missing"
        );
    }

    #[test]
    fn test_flatten_into_existing_state() {
        let resources = Resources::new().unwrap();
        let definition = resources.elastigroup_aws.as_ref();
        let payload = serde_json::json!({
            "id": "sig-1",
            "name": "web",
            "capacity": { "minimum": 1, "maximum": 8, "target": 2 },
            "compute": {
                "product": "Linux/UNIX",
                "launchSpecification": { "healthCheckType": "ELB" }
            }
        });
        let state = [("key_name".to_string(), Value::string("ops"))].into();

        let flattened = flatten(definition, &payload, state).unwrap();

        assert_eq!(flattened["max_size"], Value::Int(8));
        assert_eq!(flattened["health_check_type"], Value::string("ELB"));
        assert_eq!(flattened["health_check_grace_period"], Value::Int(-1));
        assert_eq!(flattened["key_name"], Value::string(""));
    }

    #[test]
    fn test_flatten_rejects_malformed_payload() {
        let resources = Resources::new().unwrap();
        let payload = serde_json::json!({ "capacity": { "maximum": "many" } });

        let err = flatten(resources.elastigroup_aws.as_ref(), &payload, BTreeMap::new()).unwrap_err();
        assert!(err.starts_with("Invalid spotinst_elastigroup_aws payload"), "{}", err);
    }

    #[test]
    fn test_plan_sends_only_changed_fields() {
        let resources = Resources::new().unwrap();
        let definition = resources.ocean_aws.as_ref();
        let mut prior = ocean_config();
        definition.apply_defaults(&mut prior);
        let mut planned = prior.clone();
        planned.insert("max_size".to_string(), Value::Int(20));
        planned.insert("grace_period".to_string(), Value::Int(-1));

        let summary = plan(definition, "o-1", prior, planned).unwrap();

        assert_eq!(summary.changed, vec!["max_size", "grace_period"]);
        assert!(summary.local.is_empty());
        assert_eq!(
            summary.payload,
            Some(serde_json::json!({
                "id": "o-1",
                "capacity": { "maximum": 20 },
                "strategy": { "gracePeriod": null }
            }))
        );
    }

    #[test]
    fn test_plan_without_changes() {
        let resources = Resources::new().unwrap();
        let definition = resources.ocean_aws.as_ref();
        let mut prior = ocean_config();
        definition.apply_defaults(&mut prior);

        let summary = plan(definition, "o-1", prior.clone(), prior).unwrap();
        assert!(summary.changed.is_empty());
        assert_eq!(summary.payload, None);
    }

    #[tokio::test]
    async fn test_apply_creates_instance() {
        let provider = SpotinstProvider::in_memory(ProviderConfig::default()).unwrap();

        let state = apply(&provider, elastigroup_aws::NAME, group_config())
            .await
            .unwrap();

        assert_eq!(state.id(), Some("sig-00000001"));
        assert_eq!(state.values()["max_size"], Value::Int(5));
        assert_eq!(state.values()["description"], Value::string(""));
        assert!(!state.has_change("max_size"));
    }

    #[tokio::test]
    async fn test_apply_unknown_resource() {
        let provider = SpotinstProvider::in_memory(ProviderConfig::default()).unwrap();
        let err = apply(&provider, "spotinst_mrscaler_aws", BTreeMap::new())
            .await
            .unwrap_err();
        assert!(err.starts_with("Unknown resource type 'spotinst_mrscaler_aws'"));
    }

    #[test]
    fn test_state_json_is_sorted() {
        let values = [
            ("region".to_string(), Value::string("us-west-2")),
            ("max_size".to_string(), Value::Int(3)),
        ]
        .into();
        assert_eq!(
            state_json(&values).unwrap(),
            "{\n  \"max_size\": 3,\n  \"region\": \"us-west-2\"\n}\n"
        );
    }
}

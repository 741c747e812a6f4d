//! Agents command - list and inspect configured agents

use std::fmt::Write as _;

use clap::{Args, Subcommand};

use crate::domain::{AgentCategory, AgentDefinition};
use crate::infrastructure::agent::{AgentRegistry, LoadReport};
use crate::infrastructure::llm::ProviderRegistry;

/// Arguments for the agents command
#[derive(Args, Clone)]
pub struct AgentsArgs {
    #[command(subcommand)]
    pub command: AgentsCommand,
}

#[derive(Subcommand, Clone)]
pub enum AgentsCommand {
    /// List loaded agents
    List {
        /// Only agents of this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Show one agent's full definition
    Show {
        /// Agent identifier
        id: String,
    },
}

/// Run the agents command
pub async fn run(args: AgentsArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let providers = ProviderRegistry::with_defaults(&config.providers);
    let report = super::load_agents(&config, &providers);
    print_rejections(&report);

    match args.command {
        AgentsCommand::List { category } => {
            let category = category.as_deref().map(AgentCategory::from);
            print!("{}", render_list(&report.registry, category.as_ref()));
        }
        AgentsCommand::Show { id } => {
            let agent = report.registry.get(&id)?;
            print!("{}", render_agent(agent));
        }
    }

    Ok(())
}

fn print_rejections(report: &LoadReport) {
    for rejection in &report.rejections {
        eprintln!("rejected {}", rejection);
    }
}

fn render_list(registry: &AgentRegistry, category: Option<&AgentCategory>) -> String {
    let agents: Vec<&AgentDefinition> = match category {
        Some(category) => registry.list_by_category(category),
        None => registry.list_all().iter().collect(),
    };

    if agents.is_empty() {
        return "No agents configured\n".to_string();
    }

    let mut out = String::new();
    for agent in agents {
        let _ = writeln!(
            out,
            "{:<24} {:<22} {}/{}",
            agent.identifier(),
            agent.category(),
            agent.provider_name(),
            agent.model_name()
        );
    }
    out
}

fn render_agent(agent: &AgentDefinition) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{} ({})", agent.display_name(), agent.identifier());
    if !agent.description().is_empty() {
        let _ = writeln!(out, "{}", agent.description());
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "category:    {}", agent.category());
    let _ = writeln!(out, "provider:    {}", agent.provider_name());
    let _ = writeln!(out, "model:       {}", agent.model_name());
    let _ = writeln!(out, "temperature: {}", agent.temperature());
    let _ = writeln!(out, "max_tokens:  {}", agent.max_tokens());

    if !agent.declared_variables().is_empty() {
        let names: Vec<&str> = agent.declared_variables().iter().map(String::as_str).collect();
        let _ = writeln!(out, "variables:   {}", names.join(", "));
    }
    for (name, value) in agent.variable_defaults() {
        let _ = writeln!(out, "  {} = {}", name, value);
    }

    // literal values are masked by ConfigValue's Display
    for (key, value) in agent.provider_config().iter() {
        let _ = writeln!(out, "config.{} = {}", key, value);
    }

    let _ = writeln!(out, "\n{}", agent.prompt_template().content());
    out
}

//! Agent loader - turns configuration sources into a validated registry

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::AgentRegistry;
use crate::domain::{AgentDefinition, AgentDocument, ConfigError};

const AGENT_FILE_EXTENSION: &str = "toml";

/// One configuration document and the name it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSource {
    pub name: String,
    pub content: String,
}

impl AgentSource {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Agent identifier derived from the source name (its file stem)
    pub fn identifier(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A source that did not make it into the registry
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRejection {
    /// Every source involved; more than one for duplicate identifiers
    pub sources: Vec<String>,
    pub error: ConfigError,
}

impl fmt::Display for LoadRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sources.join(", "), self.error)
    }
}

/// Outcome of a load: the agents that validated plus every rejection
#[derive(Debug, Default)]
pub struct LoadReport {
    pub registry: AgentRegistry,
    pub rejections: Vec<LoadRejection>,
    pub warnings: Vec<String>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.rejections.is_empty()
    }
}

/// Parses and validates agent configuration sources
#[derive(Debug, Default, Clone)]
pub struct AgentLoader {
    known_providers: Option<HashSet<String>>,
}

impl AgentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warn about agents whose provider is not among `providers`
    pub fn with_known_providers<I, S>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.known_providers = Some(
            providers
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .collect(),
        );
        self
    }

    /// Load every source. A bad source never stops the others from loading.
    pub fn load_sources(&self, sources: Vec<AgentSource>) -> LoadReport {
        let mut report = LoadReport::default();
        let mut parsed: Vec<(String, AgentDefinition)> = Vec::new();

        for source in sources {
            match Self::parse(&source) {
                Ok(agent) => parsed.push((source.name, agent)),
                Err(error) => report.rejections.push(LoadRejection {
                    sources: vec![source.name],
                    error,
                }),
            }
        }

        // Identifiers claimed by more than one source are rejected outright
        let mut claims: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, agent) in &parsed {
            claims
                .entry(agent.identifier().to_string())
                .or_default()
                .push(name.clone());
        }

        for (identifier, names) in &claims {
            if names.len() > 1 {
                report.rejections.push(LoadRejection {
                    sources: names.clone(),
                    error: ConfigError::duplicate(identifier),
                });
            }
        }

        let accepted: Vec<AgentDefinition> = parsed
            .into_iter()
            .filter(|(_, agent)| claims[agent.identifier()].len() == 1)
            .map(|(_, agent)| agent)
            .collect();

        for agent in &accepted {
            report.warnings.extend(self.lint(agent));
        }

        for rejection in &report.rejections {
            warn!(sources = %rejection.sources.join(", "), error = %rejection.error, "Rejected agent configuration");
        }
        for warning in &report.warnings {
            warn!("{}", warning);
        }

        report.registry = AgentRegistry::from_definitions(accepted);
        info!(
            loaded = report.registry.len(),
            rejected = report.rejections.len(),
            "Agent configurations loaded"
        );

        report
    }

    /// Discover `*.toml` files in each directory and load them.
    ///
    /// Directories are read in the given order and files by name within a
    /// directory. Missing directories are skipped; unreadable files are
    /// reported as rejections.
    pub fn load_dirs(&self, directories: &[PathBuf]) -> LoadReport {
        let mut sources = Vec::new();
        let mut unreadable = Vec::new();

        for directory in directories {
            match Self::discover(directory) {
                Ok(files) => {
                    for path in files {
                        let name = path.display().to_string();
                        match fs::read_to_string(&path) {
                            Ok(content) => sources.push(AgentSource::new(name, content)),
                            Err(e) => unreadable.push(LoadRejection {
                                sources: vec![name],
                                error: ConfigError::io(e.to_string()),
                            }),
                        }
                    }
                }
                Err(e) => {
                    warn!(directory = %directory.display(), error = %e, "Skipping agent directory");
                }
            }
        }

        debug!(count = sources.len(), "Discovered agent configuration files");

        for rejection in &unreadable {
            warn!(sources = %rejection.sources.join(", "), error = %rejection.error, "Rejected agent configuration");
        }

        let mut report = self.load_sources(sources);
        unreadable.append(&mut report.rejections);
        report.rejections = unreadable;
        report
    }

    fn discover(directory: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = fs::read_dir(directory)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(AGENT_FILE_EXTENSION))
            })
            .collect();

        files.sort();
        Ok(files)
    }

    fn parse(source: &AgentSource) -> Result<AgentDefinition, ConfigError> {
        let document: AgentDocument =
            toml::from_str(&source.content).map_err(|e| ConfigError::parse(e.to_string()))?;

        AgentDefinition::from_document(source.identifier(), document)
    }

    /// Non-fatal findings about a valid agent
    fn lint(&self, agent: &AgentDefinition) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(known) = &self.known_providers {
            if !known.contains(agent.provider_name()) {
                warnings.push(format!(
                    "Agent '{}' uses provider '{}' which is not registered",
                    agent.identifier(),
                    agent.provider_name()
                ));
            }
        }

        let undeclared = agent.undeclared_placeholders();
        if !undeclared.is_empty() && !agent.declared_variables().is_empty() {
            warnings.push(format!(
                "Agent '{}' template uses undeclared variables: {}",
                agent.identifier(),
                undeclared.join(", ")
            ));
        }

        let unused = agent.unused_declared_variables();
        if !unused.is_empty() {
            warnings.push(format!(
                "Agent '{}' declares variables its template never uses: {}",
                agent.identifier(),
                unused.join(", ")
            ));
        }

        warnings
    }
}

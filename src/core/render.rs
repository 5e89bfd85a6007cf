//! Renderer module
//!
//! Renders resolved test info records to different output formats:
//! jsonl, json, md, raw

use crate::core::model::TestInfo;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Markdown,
    Raw,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "raw" => Ok(OutputFormat::Raw),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    /// Create a new render config with default options
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            pretty: false,
        }
    }

    /// Create a new render config with pretty option
    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// Renderer for test info records
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    #[allow(dead_code)]
    pub fn new(format: OutputFormat) -> Self {
        Self {
            config: RenderConfig::new(format),
        }
    }

    /// Create a new renderer with render config
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render records to a string
    pub fn render(&self, records: &[TestInfo]) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.render_jsonl(records),
            OutputFormat::Json => self.render_json(records),
            OutputFormat::Markdown => self.render_markdown(records),
            OutputFormat::Raw => self.render_raw(records),
        }
    }

    /// Render as JSON Lines (one JSON object per record)
    fn render_jsonl(&self, records: &[TestInfo]) -> String {
        records
            .iter()
            .filter_map(|record| {
                if self.config.pretty {
                    serde_json::to_string_pretty(record).ok()
                } else {
                    serde_json::to_string(record).ok()
                }
            })
            .collect::<Vec<_>>()
            .join(if self.config.pretty { "\n\n" } else { "\n" })
    }

    /// Render as a single JSON array
    fn render_json(&self, records: &[TestInfo]) -> String {
        if self.config.pretty {
            serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
        } else {
            serde_json::to_string(records).unwrap_or_else(|_| "[]".to_string())
        }
    }

    /// Render as Markdown
    fn render_markdown(&self, records: &[TestInfo]) -> String {
        let mut out = String::new();
        for record in records {
            out.push_str(&format!("## {}\n\n", record.test_name));
            out.push_str(&format!("- module: {}\n", record.module_name));
            if !record.build_targets.is_empty() {
                out.push_str(&format!(
                    "- build targets: {}\n",
                    record
                        .build_targets
                        .iter()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
            }
            if !record.install_locations.is_empty() {
                out.push_str(&format!(
                    "- install locations: {}\n",
                    record
                        .install_locations
                        .iter()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
            }
            out.push('\n');
        }
        out.trim_end().to_string()
    }

    /// Render test names only, one per line
    fn render_raw(&self, records: &[TestInfo]) -> String {
        records
            .iter()
            .map(|record| record.test_name.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

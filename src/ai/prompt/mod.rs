//! Prompt Builder System
//!
//! Standardized prompt construction for the three generator calls of a run:
//! the initial draft, the critique of a draft, and the refinement of a draft
//! against its critique.
//!
//! ## Design Principles
//!
//! 1. **Role Definition**: Clear role for each task
//! 2. **Numbered Items**: Focus areas and required sections
//! 3. **Delimited Inputs**: Documentation and critiques fenced with `---`

use std::collections::BTreeMap;

use crate::analyzer::{CodeElementIndex, ProjectType, SourceFile};
use crate::config::OutputFormat;
use crate::constants::prompt as prompt_constants;

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition line
    Role(String),
    /// Numbered items under an intro line
    Numbered { intro: String, items: Vec<String> },
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Text fenced by `---` lines under a label
    Delimited { label: String, content: String },
    /// Bulleted rules
    Bullets { header: String, items: Vec<String> },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role definition section
    pub fn role(mut self, role: &str) -> Self {
        self.sections.push(PromptSection::Role(role.to_string()));
        self
    }

    /// Add a numbered list
    pub fn numbered(mut self, intro: &str, items: &[&str]) -> Self {
        self.sections.push(PromptSection::Numbered {
            intro: intro.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Add text section
    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    /// Add text section with header
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    /// Add a `---` fenced block
    pub fn delimited(mut self, label: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Delimited {
            label: label.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Add a bulleted rules section
    pub fn bullets(mut self, header: &str, items: &[&str]) -> Self {
        self.sections.push(PromptSection::Bullets {
            header: header.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role(role) => {
                    prompt.push_str(&role);
                    prompt.push_str("\n\n");
                }
                PromptSection::Numbered { intro, items } => {
                    prompt.push_str(&intro);
                    prompt.push_str("\n\n");
                    for (i, item) in items.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, item));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("{}\n\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Delimited { label, content } => {
                    prompt.push_str(&format!("{}:\n---\n{}\n---\n\n", label, content));
                }
                PromptSection::Bullets { header, items } => {
                    prompt.push_str(&format!("{}\n", header));
                    for item in items {
                        prompt.push_str(&format!("- {}\n", item));
                    }
                    prompt.push('\n');
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

// =============================================================================
// Templates
// =============================================================================

const DOCUMENT_OUTLINE: &str = "# Project Documentation

## 1. Project Overview
- High-level description of the project's purpose and functionality
- Primary technologies and frameworks used
- Target audience and use cases

## 2. Architecture and Design
- Overall architecture and component structure
- Key design patterns and principles
- Folder organization and code structure

## 3. Key Components and Modules
For each major component/module:
- Purpose and functionality
- Dependencies and relationships
- Implementation details

## 4. Development Setup
- Prerequisites and system requirements
- Installation instructions
- Environment configuration

## 5. Deployment
- Build process
- Deployment options

## 6. File Documentation
For each significant file:
- File path and purpose
- Key functions/classes/methods with parameters and return values
- Usage examples where applicable

## 7. Best Practices and Guidelines
- Coding standards
- Performance and security considerations";

/// Preset prompt templates for the documentation loop
pub struct PromptTemplates;

impl PromptTemplates {
    /// Prompt for the initial documentation draft
    pub fn draft(
        project_type: ProjectType,
        format: OutputFormat,
        files: &[SourceFile],
        index: &CodeElementIndex,
    ) -> String {
        let docstrings = docstring_summary(index);
        let structure = structure_summary(index);

        PromptBuilder::new()
            .role(
                "You are a senior technical documentation writer. Analyze the following codebase \
                 and generate comprehensive technical documentation.",
            )
            .section("Project Overview:", project_description(project_type))
            .text(format_instruction(format))
            .section(
                "Structure your documentation with these exact sections:",
                DOCUMENT_OUTLINE,
            )
            .section(
                "Here are the code files to analyze:",
                &file_summaries(files, Some(prompt_constants::FILE_SUMMARY_CHARS)),
            )
            .section(
                "Here are extracted documentation comments:",
                if docstrings.is_empty() {
                    "(none)"
                } else {
                    docstrings.as_str()
                },
            )
            .section(
                "Detected code structure:",
                if structure.is_empty() {
                    "(none)"
                } else {
                    structure.as_str()
                },
            )
            .bullets(
                "IMPORTANT:",
                &[
                    "Provide specific, actionable information",
                    "Use proper formatting with headers, lists, and code blocks",
                    "Refer to functions and classes by their exact names",
                    "Be concise but comprehensive",
                    "Do not wrap the whole response in a code block",
                    "Do not use placeholder or sample text",
                ],
            )
            .build()
    }

    /// Prompt asking for a critique of `documentation`
    pub fn critique(documentation: &str) -> String {
        PromptBuilder::new()
            .role(
                "You are a senior quality assurance engineer and technical documentation expert.",
            )
            .numbered(
                "Your task is to critique the following technical documentation with a focus on:",
                &[
                    "**Clarity**: Is the documentation clear, concise, and easy to understand?",
                    "**Completeness**: Are there missing sections, important details, or undocumented features?",
                    "**Accuracy**: Is the information technically correct based on code context?",
                    "**Structure**: Is the organization logical and well-formatted?",
                    "**Usefulness**: Will this help developers understand and use the codebase?",
                ],
            )
            .text("Provide a numbered list of specific, actionable feedback items.")
            .text(&format!(
                "If the documentation is excellent and requires no changes, respond ONLY with:\n\"{}\"",
                prompt_constants::APPROVAL_SENTENCE
            ))
            .delimited("Documentation to critique", documentation)
            .text("Provide your critique below:")
            .build()
    }

    /// Prompt asking for a refined version of `documentation`
    pub fn refine(documentation: &str, critique: &str, files: &[SourceFile]) -> String {
        PromptBuilder::new()
            .role(
                "You are a senior technical writer. Your task is to refine the documentation \
                 based on the critique.",
            )
            .delimited("Original Documentation", documentation)
            .delimited("Critique to Address", critique)
            .delimited(
                "Code Files Summary (for reference)",
                &file_summaries(files, Some(prompt_constants::FILE_SUMMARY_CHARS)),
            )
            .bullets(
                "Instructions:",
                &[
                    "Address ALL points in the critique",
                    "Maintain the overall structure and formatting",
                    "Ensure technical accuracy",
                    "Make the documentation more clear and useful",
                    "Provide a COMPLETE, refined version of the documentation",
                ],
            )
            .text("Refined Documentation:")
            .build()
    }
}

fn project_description(project_type: ProjectType) -> &'static str {
    match project_type {
        ProjectType::Frontend => {
            "This is a frontend application. Analyze the frameworks, libraries, UI components, \
             state management, routing, and styling approaches used. Focus on component \
             architecture, user interface patterns, and client-side functionality."
        }
        ProjectType::Backend => {
            "This is a backend application. Analyze the API endpoints, data models, database \
             interactions, authentication/authorization, middleware, services, and business \
             logic. Focus on server-side architecture, API design patterns, and data flow."
        }
        ProjectType::Mixed => {
            "This is a full-stack application with both frontend and backend components. \
             Analyze both client-side and server-side architecture, their integration, and \
             communication patterns."
        }
    }
}

fn format_instruction(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Markdown => "Generate documentation in well-structured Markdown format.",
        OutputFormat::Html => {
            "Generate documentation as a complete HTML5 document with proper structure, \
             headings, and code elements."
        }
    }
}

/// `--- File: path ---` blocks, optionally cut to `limit` characters each
fn file_summaries(files: &[SourceFile], limit: Option<usize>) -> String {
    files
        .iter()
        .map(|file| match limit {
            Some(limit) if file.content.chars().count() > limit => {
                let preview: String = file.content.chars().take(limit).collect();
                format!("--- File: {} ---\n{}...", file.path, preview)
            }
            _ => format!("--- File: {} ---\n{}", file.path, file.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn docstring_summary(index: &CodeElementIndex) -> String {
    let mut by_file: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for element in index.elements() {
        if let Some(doc) = &element.docstring {
            by_file
                .entry(element.file.as_str())
                .or_default()
                .push(format!("{} {}: {}", element.kind, element.name, doc));
        }
    }

    by_file
        .into_iter()
        .map(|(file, docs)| format!("--- Docstrings from {} ---\n{}", file, docs.join("\n")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Architecture patterns and resolved file dependencies, one per line
fn structure_summary(index: &CodeElementIndex) -> String {
    let patterns = index.architecture_patterns().into_iter().map(|p| {
        let files: Vec<String> = p.files.into_iter().collect();
        format!("Pattern: {} ({})", p.kind, files.join(", "))
    });
    let dependencies = index
        .dependency_graph()
        .relationships()
        .iter()
        .flat_map(|(source, targets)| {
            targets
                .iter()
                .map(move |target| format!("{} imports {}", source, target))
        });

    patterns.chain(dependencies).collect::<Vec<_>>().join("\n")
}

/// Remove a code fence wrapping the entire response.
///
/// Generators sometimes answer with the whole document inside
/// "```markdown ... ```". Fences inside the document are left alone.
pub fn clean_markdown_response(response: &str) -> String {
    let trimmed = response.trim();
    if let Some(rest) = trimmed.strip_prefix("```")
        && let Some(body) = rest.strip_suffix("```")
    {
        let body = match body.split_once('\n') {
            Some((info, content)) if !info.trim().contains(' ') => content,
            _ => body,
        };
        if !body.contains("\n```") {
            return body.trim().to_string();
        }
    }
    trimmed.to_string()
}

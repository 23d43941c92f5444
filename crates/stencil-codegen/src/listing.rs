//! Line-aligned source listing of a compiled program.
//!
//! The listing is the generated body as readable text: one statement per
//! operation, written in the sublanguage itself. Blank filler lines keep
//! every operation on a generated line no earlier than its template line,
//! and operations sharing a template line share a generated line, so the
//! two numberings track each other exactly.

use serde::{Deserialize, Serialize};
use stencil_types::{Op, Program};

/// The rendered listing plus its line mapping.
#[derive(Debug, Clone)]
pub struct Listing {
    text: String,
    source_map: SourceMap,
}

impl Listing {
    /// Render the line-aligned body text for a program.
    pub fn render(program: &Program) -> Listing {
        let mut lines: Vec<String> = Vec::new();
        let mut source_map = SourceMap::new();

        for op in &program.ops {
            let target = op.line();
            match op {
                // Verbatim splice. The snippet's own newlines line it up
                // with the template, so its first line must land exactly
                // on `target` whenever padding can still reach it.
                Op::Exec { src, .. } => {
                    pad_to(&mut lines, target);
                    for (offset, snippet_line) in src.split('\n').enumerate() {
                        lines.push(snippet_line.to_string());
                        source_map.push(lines.len() as u32, target + offset as u32);
                    }
                }
                _ => {
                    let stmt = statement_for(op);
                    if !lines.is_empty() && lines.len() as u32 >= target {
                        // Share the current line with the previous
                        // operation rather than fall behind the template.
                        let last = lines.len() - 1;
                        if !lines[last].is_empty() {
                            lines[last].push(' ');
                        }
                        lines[last].push_str(&stmt);
                        source_map.push(lines.len() as u32, target);
                    } else {
                        pad_to(&mut lines, target);
                        lines.push(stmt);
                        source_map.push(lines.len() as u32, target);
                    }
                }
            }
        }

        lines.push("return out.concat()".to_string());
        Listing {
            text: lines.join("\n"),
            source_map,
        }
    }

    /// The generated body text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }
}

/// Insert blank lines until the next pushed line is line `target`.
fn pad_to(lines: &mut Vec<String>, target: u32) {
    while (lines.len() as u32) < target.saturating_sub(1) {
        lines.push(String::new());
    }
}

/// One statement of generated text for a single-line operation.
fn statement_for(op: &Op) -> String {
    match op {
        Op::AppendText { text, .. } => format!("out.append({text:?})"),
        Op::AppendExpr { src, .. } => format!("out.append(str({src}))"),
        Op::AppendEach { src, .. } => format!("out.extend([{src}])"),
        Op::CallTemplate { name, .. } => format!("out.append({name}())"),
        // Handled by the caller.
        Op::Exec { src, .. } => src.clone(),
    }
}

/// Generated line → template line, exact for every operation.
///
/// Blank filler lines and the closing return have no entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMap {
    pub entries: Vec<SourceMapEntry>,
}

/// One mapping: a generated listing line and the 1-based template line the
/// operation on it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMapEntry {
    pub generated_line: u32,
    pub template_line: u32,
}

impl SourceMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn push(&mut self, generated_line: u32, template_line: u32) {
        self.entries.push(SourceMapEntry {
            generated_line,
            template_line,
        });
    }

    /// Template line for a generated line, if an operation sits on it.
    pub fn template_line(&self, generated_line: u32) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.generated_line == generated_line)
            .map(|e| e.template_line)
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Deserialize from JSON bytes.
    pub fn from_json(data: &[u8]) -> Option<Self> {
        serde_json::from_slice(data).ok()
    }
}

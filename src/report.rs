//! Plain-text and JSON rendering of a finished scan.
//!
//! Rendering walks the result lazily: only directories within the requested
//! depth are asked for their children, exactly as an interactive tree would
//! expand them one click at a time.

use diskwise_core::classify::{classify, Category, RiskLevel};
use diskwise_core::model::{format_count, format_size, ChildEntry, ScanResult, SizeTier};
use diskwise_core::AnalyzerConfig;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// One rendered row plus whatever was expanded beneath it.
#[derive(Debug, Serialize)]
pub struct ReportNode {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub is_dir: bool,
    pub category: Category,
    pub risk: RiskLevel,
    /// Size badge; directories only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<SizeTier>,
    /// `true` for a directory with children that were not expanded.
    pub collapsed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ReportNode>,
}

/// Build the tree for `result`, expanding `depth` levels below the root and
/// hiding rows under `min_size`.
pub fn build_tree(
    result: &ScanResult,
    config: &AnalyzerConfig,
    min_size: u64,
    depth: usize,
) -> ReportNode {
    let root = &result.root;
    let label = classify(root, true, &config.rules);
    let children = expand(result, config, root, min_size, depth);
    ReportNode {
        name: root.display().to_string(),
        path: root.clone(),
        size: result.total_size(),
        is_dir: true,
        category: label.category,
        risk: label.risk,
        tier: Some(config.display.tier(result.total_size())),
        collapsed: children.is_empty() && result.has_children(root),
        children,
    }
}

fn expand(
    result: &ScanResult,
    config: &AnalyzerConfig,
    path: &Path,
    min_size: u64,
    depth: usize,
) -> Vec<ReportNode> {
    if depth == 0 {
        return Vec::new();
    }
    result
        .visible_children_of(path, min_size)
        .map(|child| node(result, config, child, min_size, depth - 1))
        .collect()
}

fn node(
    result: &ScanResult,
    config: &AnalyzerConfig,
    child: &ChildEntry,
    min_size: u64,
    depth: usize,
) -> ReportNode {
    let label = classify(&child.path, child.is_dir, &config.rules);
    let children = if child.is_dir {
        expand(result, config, &child.path, min_size, depth)
    } else {
        Vec::new()
    };
    ReportNode {
        name: child.name.to_string(),
        path: child.path.clone(),
        size: child.size,
        is_dir: child.is_dir,
        category: label.category,
        risk: label.risk,
        tier: child.is_dir.then(|| config.display.tier(child.size)),
        collapsed: child.is_dir && children.is_empty() && result.has_children(&child.path),
        children,
    }
}

/// Write the tree as an indented listing.
pub fn write_tree(out: &mut impl Write, node: &ReportNode) -> io::Result<()> {
    write_node(out, node, 0)
}

fn write_node(out: &mut impl Write, node: &ReportNode, level: usize) -> io::Result<()> {
    let mut line = format!(
        "{:>10}  {}{}",
        format_size(node.size),
        "  ".repeat(level),
        node.name
    );
    if node.is_dir && level > 0 {
        line.push('/');
    }
    if node.collapsed {
        line.push_str(" (+)");
    }
    if let Some(marker) = node.tier.map(SizeTier::marker).filter(|m| !m.is_empty()) {
        line.push(' ');
        line.push_str(marker);
    }
    writeln!(
        out,
        "{line}  [{}, {} risk]",
        node.category.label(),
        node.risk.label()
    )?;
    for child in &node.children {
        write_node(out, child, level + 1)?;
    }
    Ok(())
}

/// One-paragraph summary of the scan counters.
pub fn write_summary(out: &mut impl Write, result: &ScanResult) -> io::Result<()> {
    let stats = &result.stats;
    writeln!(
        out,
        "{} in {} folders and {} files, scanned in {:.1?}",
        format_size(result.total_size()),
        format_count(stats.dirs_visited),
        format_count(stats.files_seen),
        stats.duration
    )?;
    if stats.unreadable_dirs + stats.dropped_entries + stats.skipped_dirs > 0 {
        writeln!(
            out,
            "{} unreadable folders, {} unreadable entries, {} system folders skipped",
            format_count(stats.unreadable_dirs),
            format_count(stats.dropped_entries),
            format_count(stats.skipped_dirs)
        )?;
    }
    Ok(())
}

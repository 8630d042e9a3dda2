//! List site content

use anyhow::Result;
use std::collections::HashMap;

use crate::helpers::format_date;
use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let corpus = site.load()?;
    let date_format = &site.config.date_format;

    match content_type {
        "post" | "posts" => {
            println!("Documents ({}):", corpus.entries.len());
            for entry in &corpus.entries {
                let metadata = entry.document.metadata();
                println!(
                    "  {} - {} [{}]",
                    metadata
                        .date
                        .map(|d| format_date(&d, date_format))
                        .unwrap_or_else(|| "----------".to_string()),
                    metadata.title.as_deref().unwrap_or("(untitled)"),
                    entry.source
                );
            }
        }
        "draft" | "drafts" => {
            let drafts: Vec<_> = corpus.drafts().collect();
            println!("Drafts ({}):", drafts.len());
            for entry in drafts {
                println!(
                    "  {} [{}]",
                    entry
                        .document
                        .metadata()
                        .title
                        .as_deref()
                        .unwrap_or("(untitled)"),
                    entry.source
                );
            }
        }
        "tag" | "tags" => {
            let mut tags: HashMap<&str, usize> = HashMap::new();
            for entry in &corpus.entries {
                for tag in &entry.document.metadata().tags {
                    *tags.entry(tag.as_str()).or_insert(0) += 1;
                }
            }
            println!("Tags ({}):", tags.len());
            let mut tags: Vec<_> = tags.into_iter().collect();
            tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, draft, tag",
                content_type
            );
        }
    }

    Ok(())
}

//! Create a new document with a valid front-matter header

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Local};
use std::fs;
use std::path::PathBuf;

use crate::content::{Delimiter, Document};
use crate::Site;

/// Render a fresh header for `title`
pub fn scaffold(title: &str, delimiter: Delimiter, now: &DateTime<FixedOffset>) -> String {
    let date = now.format("%Y-%m-%dT%H:%M:%S%:z");
    let marker = delimiter.marker();

    match delimiter {
        Delimiter::Toml => format!(
            "{marker}\ntitle = {}\ndate = {date}\ndraft = true\ntags = []\n{marker}\n",
            toml::Value::String(title.to_string())
        ),
        Delimiter::Yaml => format!(
            "{marker}\ntitle: {}\ndate: {date}\ndraft: true\ntags: []\n{marker}\n",
            serde_json::Value::String(title.to_string())
        ),
    }
}

/// Create a new document and return its path
pub fn create_document(
    site: &Site,
    title: &str,
    delimiter: Delimiter,
    path: Option<&str>,
    now: DateTime<FixedOffset>,
) -> Result<PathBuf> {
    let target_dir = site.content_dir.join(&site.config.new_post_dir);
    fs::create_dir_all(&target_dir)?;

    let filename = if let Some(p) = path {
        format!("{}.md", p.trim_end_matches(".md"))
    } else {
        let slug = slug::slugify(title);

        site.config
            .new_post_name
            .replace(":title", &slug)
            .replace(":year", &now.format("%Y").to_string())
            .replace(":month", &now.format("%m").to_string())
            .replace(":day", &now.format("%d").to_string())
            .replace(":i_month", &now.format("%-m").to_string())
            .replace(":i_day", &now.format("%-d").to_string())
    };

    let file_path = target_dir.join(&filename);

    // A site scaffold replaces the built-in header
    let scaffold_path = site.base_dir.join("scaffolds").join("post.md");
    let content = if scaffold_path.exists() {
        fs::read_to_string(&scaffold_path)?
            .replace("{{ title }}", title)
            .replace("{{ date }}", &now.format("%Y-%m-%dT%H:%M:%S%:z").to_string())
    } else {
        scaffold(title, delimiter, &now)
    };

    let schema = site.config.schema()?;
    match Document::parse(content.as_str(), &schema) {
        Ok(doc) => {
            for violation in doc.violations() {
                tracing::warn!("New document {}: {}", filename, violation);
            }
        }
        Err(e) => tracing::warn!("New document {} will not load: {}", filename, e),
    }

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    fs::write(&file_path, content)?;

    Ok(file_path)
}

/// Run the new command
pub fn run(site: &Site, title: &str, delimiter: Delimiter, path: Option<&str>) -> Result<()> {
    let now = Local::now().fixed_offset();
    let file_path = create_document(site, title, delimiter, path, now)?;
    println!("Created: {:?}", file_path);
    Ok(())
}

//! Export a sample resume with every built-in template, in both formats.
//!
//! Run with: cargo run --example export --features cli [output-dir]

use resume_render::{render_with, Format, ResourcePool, ResumeDocument, Template};
use std::env;
use std::fs;
use std::path::PathBuf;

const SAMPLE: &str = r#"{
  "id": "demo",
  "metadata": {
    "title": "Demo Resume",
    "template": "classic",
    "style": {
      "sectionOrder": ["summary", "work", "projects", "education", "skills", "languages"],
      "showPageNumbers": true
    }
  },
  "basics": {
    "name": "Ada Lovelace",
    "label": "Analyst & Programmer",
    "email": "ada@example.org",
    "phone": "+44 20 7946 0000",
    "url": "https://example.org/ada",
    "location": { "city": "London", "countryCode": "GB" },
    "summary": "Mathematician who wrote the **first published algorithm** intended for a machine. See [the notes](https://example.org/notes).",
    "profiles": [{ "network": "GitHub", "username": "ada", "url": "https://github.com/ada" }]
  },
  "work": [
    {
      "name": "Analytical Engine Project",
      "position": "Lead Analyst",
      "location": "London",
      "startDate": "1842-10",
      "endDate": "1843-09",
      "summary": "Translated and *annotated* the Menabrea memoir.",
      "highlights": [
        "Described a method for computing Bernoulli numbers",
        "Anticipated <u>general-purpose</u> computation"
      ]
    }
  ],
  "projects": [
    {
      "name": "Note G",
      "description": "Step-by-step program for the engine.",
      "keywords": ["algorithms", "loops"]
    }
  ],
  "education": [
    { "institution": "Private tutoring", "area": "Mathematics", "studyType": "Independent", "endDate": "1840" }
  ],
  "skills": [
    { "name": "Mathematics", "keywords": ["Calculus", "Number theory"] },
    { "name": "Languages", "keywords": ["French", "Italian"] }
  ],
  "languages": [{ "language": "English", "fluency": "Native" }]
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if env::var("RUST_LOG").is_err() {
        env_logger::Builder::new()
            .filter_module("resume_render", log::LevelFilter::Info)
            .init();
    } else {
        env_logger::init();
    }

    let out_dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("target/demo-export"));
    fs::create_dir_all(&out_dir)?;

    let doc = ResumeDocument::from_json(SAMPLE)?;
    let pool = ResourcePool::new();

    for template in Template::all() {
        for format in [Format::Pdf, Format::Docx] {
            let bytes = render_with(&doc, Some(template.id()), format, &pool)?;
            let path = out_dir.join(format!("resume-{}.{}", template.id(), format.extension()));
            fs::write(&path, &bytes)?;
            println!("✓ {} ({} bytes)", path.display(), bytes.len());
        }
    }

    assert_eq!(pool.live(), 0);
    println!("\nSuccess! Files written to {}", out_dir.display());
    Ok(())
}

use std::fs;
use std::path::Path;

use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::asset::{AssetDefaults, ABSENT_REFERENCE};
use crate::Result;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
    static ref PLACEHOLDER_IMAGES: Url =
        Url::parse("https://picsum.photos/").unwrap();
}

/// Static configuration of the page.
///
/// Persisted as TOML. Only `profile_image` and `resume_url` feed the asset
/// store; everything else is display content for the presentational layer.
///
/// Example:
/// ```toml
/// profile_image = "https://example.org/me.jpg"
/// resume_url = "#"
/// name = "Jane Doe"
/// email = "jane@example.org"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub profile_image: String,
    /// `#` means no resume is provided.
    pub resume_url: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub github: String,
    pub projects: Vec<Project>,
    pub skills: Vec<SkillCategory>,
    pub certifications: Vec<Certification>,
    pub education: Vec<Education>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub problem: String,
    pub solution: String,
    pub tech: Vec<String>,
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Project {
    /// Image shown on the project card; falls back to a seeded placeholder.
    pub fn image_or_placeholder(&self) -> String {
        match &self.image {
            Some(image) => image.clone(),
            None => {
                let mut url = PLACEHOLDER_IMAGES.clone();
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.pop_if_empty().extend([
                        "seed",
                        self.title.as_str(),
                        "800",
                        "600",
                    ]);
                }
                url.into()
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub title: String,
    pub items: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,
    pub org: String,
    pub year: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub period: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            profile_image: "https://images.unsplash.com/photo-1633332755192-727a05c4013d?w=800&h=800&fit=crop".to_owned(),
            resume_url: ABSENT_REFERENCE.to_owned(),
            name: "Your Name".to_owned(),
            email: "you@example.com".to_owned(),
            phone: "+00 0000000000".to_owned(),
            linkedin: "https://www.linkedin.com/".to_owned(),
            github: "https://github.com/".to_owned(),
            projects: vec![
                Project {
                    title: "AI-Powered Smart Gym Management".to_owned(),
                    problem: "Members wait for trainers to plan routines."
                        .to_owned(),
                    solution: "A vision-assisted system that suggests and \
                               tracks workouts."
                        .to_owned(),
                    tech: strings(&["MERN", "FastAPI", "Atlas"]),
                    outcome: "Reliable AI interaction in simulated sessions."
                        .to_owned(),
                    link: None,
                    image: Some("https://images.unsplash.com/photo-1540497077202-7c8a3999166f?auto=format&fit=crop&q=80&w=800".to_owned()),
                },
                Project {
                    title: "Internals Management System".to_owned(),
                    problem: "Manual tracking of internal assessments leads \
                              to errors and delays."
                        .to_owned(),
                    solution: "A shared store for exam documents and \
                               examination planning."
                        .to_owned(),
                    tech: strings(&["HTML", "Python", "Flask", "SQL"]),
                    outcome: "Stable performance across a full term."
                        .to_owned(),
                    link: None,
                    image: Some("https://images.unsplash.com/photo-1516321318423-f06f85e504b3?auto=format&fit=crop&q=80&w=800".to_owned()),
                },
                Project {
                    title: "Online Tour Booking".to_owned(),
                    problem: "Fragmented booking experience for local \
                              tourism."
                        .to_owned(),
                    solution: "A web platform to explore and book trips \
                               with a single flow."
                        .to_owned(),
                    tech: strings(&["HTML", "CSS", "JavaScript", "Vercel"]),
                    outcome: "Tested with 50+ concurrent booking sessions."
                        .to_owned(),
                    link: None,
                    image: None,
                },
            ],
            skills: vec![
                SkillCategory {
                    title: "Programming Languages".to_owned(),
                    items: strings(&[
                        "Java",
                        "C",
                        "Python",
                        "JavaScript",
                        "HTML",
                        "SQL",
                    ]),
                },
                SkillCategory {
                    title: "Core CS Fundamentals".to_owned(),
                    items: strings(&[
                        "Data Structures & Algorithms",
                        "Object-Oriented Programming",
                        "DBMS",
                        "Operating Systems",
                        "Computer Networks",
                    ]),
                },
                SkillCategory {
                    title: "Tools & Technologies".to_owned(),
                    items: strings(&[
                        "React.js",
                        "Node.js",
                        "Docker",
                        "Git & GitHub",
                    ]),
                },
            ],
            certifications: vec![
                Certification {
                    name: "Azure AI Essentials".to_owned(),
                    org: "Microsoft".to_owned(),
                    year: "2025".to_owned(),
                },
                Certification {
                    name: "Cloud Computing".to_owned(),
                    org: "NPTEL".to_owned(),
                    year: "2025".to_owned(),
                },
            ],
            education: vec![
                Education {
                    degree: "B.Tech in Computer Science & Engineering"
                        .to_owned(),
                    institution: "College of Engineering".to_owned(),
                    period: "2024 - 2027".to_owned(),
                    status: "3rd Year (Current)".to_owned(),
                    score: Some("CGPA: 8.2/10".to_owned()),
                },
                Education {
                    degree: "Higher Secondary Education (Science)".to_owned(),
                    institution: "PU College".to_owned(),
                    period: "2021 - 2023".to_owned(),
                    status: "Completed".to_owned(),
                    score: None,
                },
            ],
        }
    }
}

impl SiteConfig {
    /// Loads the configuration from disk. If the file does not exist,
    /// returns the built-in configuration.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no site config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).with_context(|| {
            format!("Failed to read config file: {}", path.display())
        })?;
        let config: SiteConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse config file")?;
        Ok(config)
    }

    /// Saves the configuration to disk, creating the directory if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create config directory: {}", dir.display())
            })?;
        }

        let content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize config")?;
        fs::write(path, content).with_context(|| {
            format!("Failed to write config file: {}", path.display())
        })?;
        Ok(())
    }

    pub fn asset_defaults(&self) -> AssetDefaults {
        AssetDefaults::new(&self.profile_image, &self.resume_url)
    }

    /// Filename offered when the resume is downloaded.
    pub fn resume_filename(&self) -> String {
        format!("Resume_{}.pdf", WHITESPACE_RUN.replace_all(&self.name, "_"))
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

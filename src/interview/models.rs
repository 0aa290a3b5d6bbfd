use serde::{Serialize, Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Backend,
    Frontend,
    Fullstack,
    DataScience,
    Devops,
    Mobile,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Backend,
        Role::Frontend,
        Role::Fullstack,
        Role::DataScience,
        Role::Devops,
        Role::Mobile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Backend => "backend",
            Role::Frontend => "frontend",
            Role::Fullstack => "fullstack",
            Role::DataScience => "data-science",
            Role::Devops => "devops",
            Role::Mobile => "mobile",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "backend" => Ok(Role::Backend),
            "frontend" => Ok(Role::Frontend),
            "fullstack" | "full-stack" => Ok(Role::Fullstack),
            "data-science" | "datascience" | "data" => Ok(Role::DataScience),
            "devops" => Ok(Role::Devops),
            "mobile" => Ok(Role::Mobile),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("Unknown difficulty: {}", other)),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bound interview session. Only the controller creates or mutates one.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Session {
    pub id: String,
    pub role: Role,
    pub difficulty: Difficulty,
    pub awaiting_followup: bool,
}

impl Session {
    pub fn new(id: String, role: Role, difficulty: Difficulty) -> Self {
        Self {
            id,
            role,
            difficulty,
            awaiting_followup: false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FeedbackCategory {
    pub score: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub suggestions: Vec<String>,
}

/// End-of-session evaluation across the three scored categories.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FeedbackReport {
    pub communication: FeedbackCategory,
    pub technical: FeedbackCategory,
    pub problem_solving: FeedbackCategory,
    #[serde(default)]
    pub summary: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

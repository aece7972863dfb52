use serde::{Deserialize, Serialize};

/// The reader's profile. Passed explicitly to whatever displays it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub subject: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Professor(a)".to_string(),
            subject: "Educação Básica".to_string(),
        }
    }
}

impl Profile {
    /// First word of the name, used for the greeting line.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingStats {
    pub total: usize,
    pub read: usize,
    pub favorites: usize,
}

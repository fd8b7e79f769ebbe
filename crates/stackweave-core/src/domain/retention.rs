use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// An image held by a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub digest: String,
    pub pushed_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Keep the newest `keep_newest` images, expire everything older.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionRule {
    pub keep_newest: u32,
}

impl RetentionRule {
    pub const RULE_PRIORITY: u32 = 1;

    pub fn new(keep_newest: u32) -> Self {
        Self { keep_newest }
    }

    pub fn description(&self) -> String {
        format!("Limit to {} images", self.keep_newest)
    }

    /// The images this rule expires, oldest first.
    ///
    /// Ties on push time are broken by digest so the result is stable.
    pub fn evictions<'a>(&self, images: &'a [ImageRecord]) -> Vec<&'a ImageRecord> {
        let mut newest_first: Vec<&ImageRecord> = images.iter().collect();
        newest_first.sort_by(|a, b| {
            b.pushed_at
                .cmp(&a.pushed_at)
                .then_with(|| a.digest.cmp(&b.digest))
        });

        let mut evicted: Vec<&ImageRecord> = newest_first
            .into_iter()
            .skip(self.keep_newest as usize)
            .collect();
        evicted.reverse();
        evicted
    }

    /// The registry lifecycle policy document.
    pub fn lifecycle_policy(&self) -> Value {
        json!({
            "rules": [{
                "rulePriority": Self::RULE_PRIORITY,
                "description": self.description(),
                "selection": {
                    "tagStatus": "any",
                    "countType": "imageCountMoreThan",
                    "countNumber": self.keep_newest,
                },
                "action": { "type": "expire" },
            }]
        })
    }
}

impl Default for RetentionRule {
    fn default() -> Self {
        Self { keep_newest: 10 }
    }
}

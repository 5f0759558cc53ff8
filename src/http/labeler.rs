use crate::config::Settings;
use crate::http::api_client::ApiClient;
use crate::schemas::labels::{ChatMessage, ChatRequest, ChatResponse, LabelLine};
use crate::schemas::records::CategoryRow;
use crate::warn;
use anyhow::Result;
use std::time::Duration;

const BASE_URL: &str = "https://api.openai.com/v1/";

/// Fixed category vocabulary; anything outside it collapses to "Other".
pub const CATEGORIES: [&str; 11] = [
    "Pizza",
    "Cafe",
    "Bakery",
    "Dessert",
    "Pub",
    "Deli",
    "Fast Food",
    "Restaurant",
    "Mobile",
    "Venue Dining",
    "Other",
];

pub const CUISINES: [&str; 17] = [
    "Mexican",
    "Chinese",
    "Japanese",
    "Thai",
    "Indian",
    "Mediterranean",
    "Greek",
    "Middle Eastern",
    "Korean",
    "Vietnamese",
    "Italian",
    "BBQ",
    "Seafood",
    "American",
    "Caribbean",
    "Latin American",
    "Other",
];

pub fn normalize_category(category: &str) -> String {
    if CATEGORIES.contains(&category) {
        category.to_string()
    } else {
        "Other".to_string()
    }
}

pub fn normalize_cuisine(cuisine: &str) -> String {
    if CUISINES.contains(&cuisine) {
        cuisine.to_string()
    } else {
        "Other".to_string()
    }
}

const SYSTEM_PROMPT: &str =
    "You are a careful, terse classifier of food establishments. Reply in strict JSON lines.";

pub struct Labeler {
    api: ApiClient,
    model: String,
}

impl Labeler {
    pub fn new(api_key: &str, settings: &Settings) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(
                BASE_URL,
                Duration::from_secs(settings.request_timeout_secs),
            )?
            .with_bearer(api_key),
            model: settings.label_model.clone(),
        })
    }

    /// Classify a batch of establishments. Each reply line is keyed by the
    /// caller-supplied id so results can be applied back positionally.
    pub async fn label(&self, items: &[(usize, CategoryRow)]) -> Result<Vec<(usize, LabelLine)>> {
        let request = ChatRequest {
            model: self.model.clone(),
            temperature: 0.0,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(items),
                },
            ],
        };

        let response: ChatResponse = self.api.post("chat/completions", &[], &request).await?;
        let content = response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .unwrap_or_default();

        let lines = parse_jsonl(&content);
        if lines.is_empty() {
            warn!("labeler returned no parseable JSON lines");
        }
        Ok(lines.into_iter().map(|line| (line.id, line)).collect())
    }
}

fn allowed_list(values: &[&str]) -> String {
    values
        .iter()
        .map(|value| format!("- {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_prompt(items: &[(usize, CategoryRow)]) -> String {
    let mut lines = vec![
        "Classify each Pennsylvania food establishment below.".to_string(),
        format!("strict_category must be ONE of:\n{}", allowed_list(&CATEGORIES)),
        format!("cuisine must be ONE of:\n{}", allowed_list(&CUISINES)),
        "ai_category is a short free-text label (1-5 words) to help search.".to_string(),
        "Use only the fields provided; when unclear, use \"Other\".".to_string(),
        "Return one JSON object per line with keys: id, strict_category, cuisine, \
         ai_category, confidence, rationale. JSON lines only, no markdown."
            .to_string(),
        String::new(),
    ];

    for (id, row) in items {
        lines.push(format!(
            "id: {id}\nFacility: {}\nAddress: {}\nCity: {}\n",
            row.facility, row.address, row.city
        ));
    }

    lines.join("\n")
}

/// Parse model output as JSONL, tolerating fenced blocks, trailing commas
/// and stray prose between the JSON lines.
pub fn parse_jsonl(text: &str) -> Vec<LabelLine> {
    let text = text.replace("```json", "").replace("```", "");
    let mut out = Vec::new();
    for line in text.lines() {
        let line = line.trim().trim_end_matches(',');
        let (Some(start), Some(end)) = (line.find('{'), line.rfind('}')) else {
            continue;
        };
        if end < start {
            continue;
        }
        if let Ok(parsed) = serde_json::from_str::<LabelLine>(&line[start..=end]) {
            out.push(parsed);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jsonl_handles_fences_and_noise() {
        let reply = "```json\n\
            {\"id\": 0, \"strict_category\": \"Pizza\", \"cuisine\": \"Italian\", \"ai_category\": \"neapolitan pizza\", \"confidence\": 0.9, \"rationale\": \"name\"},\n\
            not json at all\n\
            {\"id\": 1, \"strict_category\": \"Cafe\", \"cuisine\": \"Other\", \"ai_category\": \"\", \"confidence\": 0.4, \"rationale\": \"\"}\n\
            ```";
        let lines = parse_jsonl(reply);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].id, 0);
        assert_eq!(lines[0].strict_category, "Pizza");
        assert_eq!(lines[1].id, 1);
        assert_eq!(lines[1].confidence, Some(0.4));
    }

    #[test]
    fn test_normalize_rejects_unknown_values() {
        assert_eq!(normalize_category("Pizza"), "Pizza");
        assert_eq!(normalize_category("Spaceship"), "Other");
        assert_eq!(normalize_cuisine("Thai"), "Thai");
        assert_eq!(normalize_cuisine("Martian"), "Other");
    }

    #[test]
    fn test_prompt_lists_every_item() {
        let items = vec![
            (
                0,
                CategoryRow {
                    facility: "Joe's Pizza".to_string(),
                    address: "1 Main St.".to_string(),
                    city: "Erie".to_string(),
                    ..CategoryRow::default()
                },
            ),
            (
                7,
                CategoryRow {
                    facility: "The Corner Cafe".to_string(),
                    address: "2 Oak Ave.".to_string(),
                    city: "York".to_string(),
                    ..CategoryRow::default()
                },
            ),
        ];
        let prompt = build_prompt(&items);
        assert!(prompt.contains("id: 0"));
        assert!(prompt.contains("id: 7"));
        assert!(prompt.contains("Joe's Pizza"));
        assert!(prompt.contains("The Corner Cafe"));
    }
}

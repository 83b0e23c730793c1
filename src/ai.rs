//! Gemini-backed analysis of free-text journal entries. The output is
//! treated as an opaque upstream input by the scoring engine — no range
//! validation happens on points or impact values.

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;
use tracing::warn;

use crate::scoring::Impact;

#[derive(Debug, Clone, Deserialize)]
pub struct EntryAnalysis {
    pub impact: Impact,
    pub points: i64,
    pub comment: String,
    #[serde(default)]
    pub actions: Vec<String>,
}

#[derive(Clone)]
pub struct ImpactAnalyzer {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl ImpactAnalyzer {
    pub fn new() -> Self {
        let api_key = env::var("GEMINI_API_KEY").ok();
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-pro".to_string());
        if api_key.is_none() {
            warn!("⚠️ GEMINI_API_KEY not found. Entry analysis will use flat estimates.");
        }
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }

    pub async fn analyze_entry(&self, text: &str) -> Result<EntryAnalysis, String> {
        let Some(api_key) = &self.api_key else {
            // Mock mode: a flat estimate so the rest of the pipeline works
            return Ok(EntryAnalysis {
                impact: Impact::default(),
                points: 5,
                comment: "Logged! (AI scoring unavailable, applied a flat estimate)".to_string(),
                actions: Vec::new(),
            });
        };

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, api_key
        );

        let prompt = "You are the scoring engine of a sustainability tracker. \
        The user describes their eco-actions for one day in free text. \n\
        Return a JSON object (without markdown code blocks) with the following structure: \n\
        { \n\
            'impact': { \n\
                'co2': number (kg CO2 saved vs. a typical day), \n\
                'water': number (liters of water saved), \n\
                'energy': number (kWh of energy saved), \n\
                'waste': number (kg of waste avoided), \n\
                'food': number (kg of food waste avoided) \n\
            }, \n\
            'points': integer (overall score, may be negative for harmful days), \n\
            'comment': 'string (one encouraging sentence about the day)', \n\
            'actions': ['string (short tags for each distinct action, e.g. cycling, meatless-meal)'] \n\
        } \n\
        Estimate conservatively and score ordinary days between -10 and 50 points.";

        let body = json!({
            "contents": [{
                "parts": [
                    { "text": prompt },
                    { "text": text }
                ]
            }]
        });

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Generate Request Failed: {}", e))?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(format!("Generate Failed: {}", text));
        }

        let json: Value = res.json().await.map_err(|e| e.to_string())?;

        // Extract text from: candidates[0].content.parts[0].text
        let text = json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or("No text in Gemini response")?;

        parse_analysis(text)
    }
}

pub(crate) fn parse_analysis(text: &str) -> Result<EntryAnalysis, String> {
    // Clean markdown code blocks if any
    let clean_text = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```");

    serde_json::from_str(clean_text)
        .map_err(|e| format!("Failed to parse Gemini JSON: {} - Text: {}", e, clean_text))
}

#[cfg(test)]
mod tests {
    use super::parse_analysis;

    #[test]
    fn parses_a_plain_response() {
        let analysis = parse_analysis(
            r#"{"impact": {"co2": 2.5, "water": 0, "energy": 1.2, "waste": 0, "food": 0},
                "points": 18, "comment": "Great cycling day!", "actions": ["cycling"]}"#,
        )
        .unwrap();
        assert_eq!(analysis.points, 18);
        assert_eq!(analysis.impact.co2, 2.5);
        assert_eq!(analysis.actions, vec!["cycling"]);
    }

    #[test]
    fn strips_markdown_fences() {
        let analysis = parse_analysis(
            "```json\n{\"impact\": {\"co2\": 0, \"water\": 0, \"energy\": 0, \"waste\": 0, \"food\": 0}, \"points\": -3, \"comment\": \"Rough day.\"}\n```",
        )
        .unwrap();
        assert_eq!(analysis.points, -3);
        assert!(analysis.actions.is_empty());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_analysis("not json at all").is_err());
    }
}

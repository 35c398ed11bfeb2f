//! Prompt templates and the truncation budgets that keep rendered prompts
//! under the model's context window.

use serde_json::{Map, Value};

/// Max characters of page content placed in an extraction prompt.
pub const CONTENT_BUDGET: usize = 8000;
/// Max characters of serialized data placed in insight and report prompts.
pub const DATA_BUDGET: usize = 6000;
/// Max characters of each serialized dataset in a comparison prompt.
pub const DATASET_BUDGET: usize = 3000;

pub const EXTRACTION_SYSTEM: &str =
    "You are a precise data extraction specialist. Respond with JSON only.";
pub const AUTO_EXTRACT_SYSTEM: &str =
    "You are a web data analysis specialist. Respond with JSON only.";
pub const INSIGHT_SYSTEM: &str =
    "You are a data insight specialist. Respond with JSON only.";
pub const COMPARE_SYSTEM: &str =
    "You are a data comparison specialist. Respond with JSON only.";
pub const REPORT_SYSTEM: &str = "You are a business report writer.";

const EXTRACTION_TEMPLATE: &str = r#"You are a web data extraction specialist.
Extract {data_type} data from the following web page content.

Web page content:
{content}

{schema_instruction}

Respond in JSON only. No other explanation is needed.
"#;

const AUTO_EXTRACT_TEMPLATE: &str = r#"You are a web data analysis specialist.
Analyze the following web page content and extract its main data as structured JSON.

Web page content:
{content}

Data type hint: {data_type}

Respond in this format:
{
    "detected_type": "detected data type",
    "items": [extracted items],
    "metadata": {
        "source_type": "ecommerce|news|blog|etc",
        "item_count": number,
        "language": "ko|en"
    }
}

Respond in JSON only.
"#;

const INSIGHT_TEMPLATE: &str = r#"You are an expert analyst of {data_type} data.
Analyze the following data and generate insights.

Data:
{data}

Analysis type: {analysis_type}

Respond in this format:
{
    "summary": "core summary (2-3 sentences)",
    "key_findings": ["finding 1", "finding 2", "finding 3"],
    "trends": ["trend 1", "trend 2"],
    "recommendations": ["action 1", "action 2"],
    "risk_factors": ["risk factors"],
    "confidence_score": confidence between 0.0 and 1.0
}

Respond in JSON only.
"#;

const COMPARE_TEMPLATE: &str = r#"You are a data comparison specialist.
Compare the following datasets.
{data_description}

Comparison type: {comparison_type}

Respond in this format:
{
    "comparison_summary": "comparison summary",
    "similarities": ["similarities"],
    "differences": ["differences"],
    "highlights": ["notable points"],
    "winner": "which side leads on a given criterion (if applicable)",
    "detailed_comparison": {}
}

Respond in JSON only.
"#;

const REPORT_TEMPLATE: &str = r#"You are a business report writer.
Write a {report_type} report based on the following data and analysis.

Data:
{data}

Language: {language}
Report type: {report_type}

Write a well formatted report in Markdown. Start each section with a level-two heading (## Title).
The report must include these sections:
1. Executive Summary
2. Key Findings
3. Detailed Analysis
4. Recommendations
5. Conclusion
"#;

/// Cuts `text` to at most `max_chars` characters without splitting a
/// multibyte character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Pretty-printed JSON, truncated to `max_chars`.
pub fn serialize_truncated(value: &Value, max_chars: usize) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    truncate_chars(&pretty, max_chars).to_string()
}

/// Substitutes `{name}` tokens in one pass. Substituted values are never
/// rescanned, so braces inside caller input or page content stay literal.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        let token = tail[1..].find('}').and_then(|end| {
            let name = &tail[1..1 + end];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end + 2))
        });

        match token {
            Some((value, consumed)) => {
                out.push_str(value);
                rest = &tail[consumed..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

pub fn extraction(content: &str, prompt: &str, schema: Option<&Map<String, Value>>) -> String {
    let schema_instruction = match schema {
        Some(schema) => format!(
            "The extraction result must follow this schema:\n{}",
            serde_json::to_string_pretty(schema).unwrap_or_default()
        ),
        None => String::new(),
    };

    render(
        EXTRACTION_TEMPLATE,
        &[
            ("data_type", prompt),
            ("content", truncate_chars(content, CONTENT_BUDGET)),
            ("schema_instruction", &schema_instruction),
        ],
    )
}

pub fn auto_extract(content: &str, data_type: &str) -> String {
    render(
        AUTO_EXTRACT_TEMPLATE,
        &[
            ("data_type", data_type),
            ("content", truncate_chars(content, CONTENT_BUDGET)),
        ],
    )
}

pub fn insight(data: &Map<String, Value>, data_type: &str, analysis_type: &str) -> String {
    let data = serialize_truncated(&Value::Object(data.clone()), DATA_BUDGET);
    render(
        INSIGHT_TEMPLATE,
        &[
            ("data_type", data_type),
            ("analysis_type", analysis_type),
            ("data", &data),
        ],
    )
}

/// Datasets and labels are paired in order; extras on either side are dropped.
pub fn comparison(data_sets: &[Map<String, Value>], labels: &[String], comparison_type: &str) -> String {
    let mut description = String::new();
    for (data, label) in data_sets.iter().zip(labels) {
        description.push_str(&format!("\n--- {} ---\n", label));
        description.push_str(&serialize_truncated(&Value::Object(data.clone()), DATASET_BUDGET));
    }

    render(
        COMPARE_TEMPLATE,
        &[
            ("comparison_type", comparison_type),
            ("data_description", &description),
        ],
    )
}

pub fn report(data: &Map<String, Value>, report_type: &str, language: &str) -> String {
    let data = serialize_truncated(&Value::Object(data.clone()), DATA_BUDGET);
    render(
        REPORT_TEMPLATE,
        &[
            ("report_type", report_type),
            ("language", language),
            ("data", &data),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn big_map(chars: usize) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("blob".into(), json!("~".repeat(chars)));
        map
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("데이터 분석", 3), "데이터");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn extraction_prompt_caps_content() {
        let content = "a".repeat(CONTENT_BUDGET + 500);
        let prompt = extraction(&content, "product prices", None);
        assert!(prompt.contains(&"a".repeat(CONTENT_BUDGET)));
        assert!(!prompt.contains(&"a".repeat(CONTENT_BUDGET + 1)));
        assert!(prompt.contains("Extract product prices data"));
        assert!(!prompt.contains("{schema_instruction}"));
        assert!(!prompt.contains("must follow this schema"));
    }

    #[test]
    fn extraction_prompt_embeds_schema() {
        let schema = json!({"type": "object", "properties": {"price": {"type": "number"}}});
        let prompt = extraction("page", "prices", schema.as_object());
        assert!(prompt.contains("The extraction result must follow this schema:"));
        assert!(prompt.contains("\"price\""));
    }

    #[test]
    fn insight_prompt_caps_serialized_data() {
        let data = big_map(DATA_BUDGET * 2);
        let prompt = insight(&data, "products", "trends");
        let xs = prompt.chars().filter(|c| *c == '~').count();
        assert!(xs <= DATA_BUDGET);
        assert!(prompt.contains("expert analyst of products data"));
        assert!(prompt.contains("Analysis type: trends"));
    }

    #[test]
    fn report_prompt_caps_serialized_data() {
        let data = big_map(DATA_BUDGET + 10);
        let prompt = report(&data, "executive", "en");
        let xs = prompt.chars().filter(|c| *c == '~').count();
        assert!(xs <= DATA_BUDGET);
        assert!(prompt.contains("Language: en"));
    }

    #[test]
    fn comparison_prompt_labels_each_dataset() {
        let sets = vec![big_map(DATASET_BUDGET * 2), big_map(10)];
        let labels = vec!["Shop A".to_string(), "Shop B".to_string(), "Unpaired".to_string()];
        let prompt = comparison(&sets, &labels, "competitive");

        assert!(prompt.contains("--- Shop A ---"));
        assert!(prompt.contains("--- Shop B ---"));
        assert!(!prompt.contains("Unpaired"));
        let xs = prompt.chars().filter(|c| *c == '~').count();
        assert!(xs <= DATASET_BUDGET + 10);
    }

    #[test]
    fn report_prompt_asks_for_level_two_headings() {
        let prompt = report(&big_map(3), "detailed", "ko");
        assert!(prompt.contains("level-two heading (## Title)"));
        assert!(prompt.contains("Write a detailed report"));
        assert!(prompt.contains("Report type: detailed"));
        assert!(prompt.contains("5. Conclusion"));
    }

    #[test]
    fn render_keeps_json_braces_and_unknown_tokens() {
        let out = render("{a} {\n  \"k\": {}\n} {b} {nope}", &[("a", "1"), ("b", "2")]);
        assert_eq!(out, "1 {\n  \"k\": {}\n} 2 {nope}");
    }

    #[test]
    fn placeholder_tags_do_not_duplicate_data() {
        let data = big_map(DATA_BUDGET * 2);
        let prompt = insight(&data, "{data}", "{data}");
        let tildes = prompt.chars().filter(|c| *c == '~').count();
        assert!(tildes <= DATA_BUDGET);
        assert!(prompt.contains("expert analyst of {data} data"));
        assert!(prompt.contains("Analysis type: {data}"));

        let prompt = report(&data, "{data}", "{data}");
        let tildes = prompt.chars().filter(|c| *c == '~').count();
        assert!(tildes <= DATA_BUDGET);
    }

    #[test]
    fn placeholder_in_schema_or_prompt_does_not_duplicate_content() {
        let content = "c".repeat(CONTENT_BUDGET);
        let schema = json!({"description": "{content}"});
        let prompt = extraction(&content, "{content} items", schema.as_object());

        assert_eq!(prompt.matches(content.as_str()).count(), 1);
        assert!(prompt.contains("Extract {content} items data"));
        assert!(prompt.contains("\"description\": \"{content}\""));

        let prompt = auto_extract(&content, "{content}");
        assert_eq!(prompt.matches(content.as_str()).count(), 1);
        assert!(prompt.contains("Data type hint: {content}"));
    }

    #[test]
    fn placeholder_in_comparison_type_is_literal() {
        let sets = vec![big_map(DATASET_BUDGET * 2)];
        let labels = vec!["{data_description}".to_string()];
        let prompt = comparison(&sets, &labels, "{data_description}");

        let tildes = prompt.chars().filter(|c| *c == '~').count();
        assert!(tildes <= DATASET_BUDGET);
        assert!(prompt.contains("--- {data_description} ---"));
        assert!(prompt.contains("Comparison type: {data_description}"));
    }
}

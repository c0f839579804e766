//! A typed subset of the [Adaptive Card](https://adaptivecards.io/explorer/) schema and the test
//! results card built from it.

use super::chart::pie_chart_data_url;
use crate::drain::DrainResult;
use serde::Serialize;
use source::{Status, TestResults};

pub const CARD_SCHEMA: &str = "http://adaptivecards.io/schemas/adaptive-card.json";
pub const CARD_VERSION: &str = "1.5";
pub const CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";

pub const SHOW_TESTS_ID: &str = "show-tests-button";
pub const HIDE_TESTS_ID: &str = "hide-tests-button";
pub const TESTS_LIST_ID: &str = "tests-list";

/// Payload accepted by a Teams incoming webhook.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdaptiveCardMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Message,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub content_type: String,
    pub content_url: Option<String>,
    pub content: AdaptiveCard,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdaptiveCard {
    #[serde(rename = "$schema")]
    pub schema: String,
    #[serde(rename = "type")]
    pub kind: CardType,
    pub version: String,
    pub body: Vec<Element>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub enum CardType {
    #[default]
    AdaptiveCard,
}

impl AdaptiveCard {
    pub fn new(body: Vec<Element>) -> Self {
        Self {
            schema: CARD_SCHEMA.to_string(),
            kind: CardType::AdaptiveCard,
            version: CARD_VERSION.to_string(),
            body,
        }
    }

    pub fn into_message(self) -> AdaptiveCardMessage {
        AdaptiveCardMessage {
            kind: MessageType::Message,
            attachments: vec![Attachment {
                content_type: CARD_CONTENT_TYPE.to_string(),
                content_url: None,
                content: self,
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum Element {
    TextBlock(TextBlock),
    ColumnSet(ColumnSet),
    Container(Container),
    ActionSet(ActionSet),
    FactSet(FactSet),
    Image(Image),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum TextColor {
    Default,
    Accent,
    Good,
    Warning,
    Attention,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum TextSize {
    Medium,
    Large,
    ExtraLarge,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum TextWeight {
    Default,
    Bolder,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum HorizontalAlignment {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum VerticalAlignment {
    Top,
    Center,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Spacing {
    Large,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColumnWidth {
    Auto,
    Stretch,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActionStyle {
    Positive,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<TextColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_subtle: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<TextSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<TextWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ColumnSet {
    pub columns: Vec<Column>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<bool>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub enum ColumnType {
    #[default]
    Column,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(rename = "type")]
    pub kind: ColumnType,
    pub items: Vec<Element>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<ColumnWidth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_alignment: Option<HorizontalAlignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_content_alignment: Option<VerticalAlignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<Spacing>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    pub items: Vec<Element>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FactSet {
    pub facts: Vec<Fact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_alignment: Option<HorizontalAlignment>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Fact {
    pub title: String,
    pub value: String,
}

impl Fact {
    pub fn new(title: impl Into<String>, value: impl ToString) -> Self {
        Self {
            title: title.into(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum Action {
    #[serde(rename = "Action.OpenUrl")]
    OpenUrl(OpenUrlAction),
    #[serde(rename = "Action.ToggleVisibility")]
    ToggleVisibility(ToggleVisibilityAction),
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenUrlAction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ActionStyle>,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToggleVisibilityAction {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    pub target_elements: Vec<TargetElement>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TargetElement {
    pub element_id: String,
    pub is_visible: bool,
}

impl TargetElement {
    fn new(element_id: &str, is_visible: bool) -> Self {
        Self {
            element_id: element_id.to_string(),
            is_visible,
        }
    }
}

/// Builds the message posted for a set of test results. `details` become extra facts next to
/// the statistics, in the given order.
pub fn test_results_card(
    results: &TestResults,
    details: &[(&str, &str)],
) -> DrainResult<AdaptiveCardMessage> {
    Ok(AdaptiveCard::new(vec![
        heading("Test Results", "Open Test Results", &results.url),
        quick_summary(results, details)?,
        test_list(results),
    ])
    .into_message())
}

fn heading(title: &str, button_title: &str, url: &str) -> Element {
    Element::ColumnSet(ColumnSet {
        columns: vec![
            Column {
                width: Some(ColumnWidth::Stretch),
                items: vec![Element::TextBlock(TextBlock {
                    text: title.to_string(),
                    color: Some(TextColor::Accent),
                    is_subtle: Some(false),
                    size: Some(TextSize::Large),
                    style: Some("heading".to_string()),
                    weight: Some(TextWeight::Default),
                    wrap: Some(true),
                })],
                ..Default::default()
            },
            Column {
                width: Some(ColumnWidth::Auto),
                items: vec![Element::ActionSet(ActionSet {
                    actions: vec![Action::OpenUrl(OpenUrlAction {
                        title: Some(button_title.to_string()),
                        style: Some(ActionStyle::Positive),
                        url: url.to_string(),
                        ..Default::default()
                    })],
                    ..Default::default()
                })],
                ..Default::default()
            },
        ],
        separator: None,
    })
}

fn quick_summary(results: &TestResults, details: &[(&str, &str)]) -> DrainResult<Element> {
    let summary = results.summary();
    let chart = Column {
        width: Some(ColumnWidth::Auto),
        horizontal_alignment: Some(HorizontalAlignment::Center),
        vertical_content_alignment: Some(VerticalAlignment::Center),
        items: vec![Element::Image(Image {
            url: pie_chart_data_url(&summary)?,
        })],
        ..Default::default()
    };
    let stats = vec![
        Fact::new("Test Cases", summary.total),
        Fact::new("Passed", summary.passed),
        Fact::new("Failed", summary.failed),
        Fact::new("Skipped", summary.skipped),
        Fact::new("Pending", summary.pending),
    ];

    let mut columns = vec![
        chart,
        Column {
            width: Some(ColumnWidth::Auto),
            horizontal_alignment: Some(HorizontalAlignment::Center),
            vertical_content_alignment: Some(VerticalAlignment::Top),
            items: vec![Element::FactSet(FactSet {
                facts: stats,
                horizontal_alignment: Some(HorizontalAlignment::Left),
            })],
            ..Default::default()
        },
    ];

    if !details.is_empty() {
        columns.push(Column {
            width: Some(ColumnWidth::Stretch),
            separator: Some(true),
            spacing: Some(Spacing::Large),
            items: vec![Element::FactSet(FactSet {
                facts: details
                    .iter()
                    .map(|(title, value)| Fact::new(*title, value))
                    .collect(),
                horizontal_alignment: None,
            })],
            ..Default::default()
        });
    }

    Ok(Element::ColumnSet(ColumnSet {
        columns,
        separator: Some(true),
    }))
}

fn toggle_button(id: &str, title: &str, show_list: bool) -> Element {
    Element::ActionSet(ActionSet {
        id: Some(id.to_string()),
        // the hide button starts out hidden, together with the list
        is_visible: if show_list { None } else { Some(false) },
        actions: vec![Action::ToggleVisibility(ToggleVisibilityAction {
            title: title.to_string(),
            icon_url: Some("icon:TaskListLtr".to_string()),
            target_elements: vec![
                TargetElement::new(SHOW_TESTS_ID, !show_list),
                TargetElement::new(HIDE_TESTS_ID, show_list),
                TargetElement::new(TESTS_LIST_ID, show_list),
            ],
        })],
    })
}

fn status_color(status: Status) -> TextColor {
    match status {
        Status::Pass => TextColor::Good,
        Status::Fail => TextColor::Attention,
        Status::Pending => TextColor::Default,
        Status::Skipped => TextColor::Warning,
    }
}

fn test_list(results: &TestResults) -> Element {
    let rows = results
        .results
        .iter()
        .map(|entry| {
            Element::ColumnSet(ColumnSet {
                columns: vec![
                    Column {
                        width: Some(ColumnWidth::Auto),
                        vertical_content_alignment: Some(VerticalAlignment::Center),
                        items: vec![Element::ActionSet(ActionSet {
                            actions: vec![Action::OpenUrl(OpenUrlAction {
                                icon_url: Some("icon:CursorClick".to_string()),
                                style: Some(ActionStyle::Positive),
                                url: entry.result.url.clone(),
                                ..Default::default()
                            })],
                            ..Default::default()
                        })],
                        ..Default::default()
                    },
                    Column {
                        width: Some(ColumnWidth::Auto),
                        vertical_content_alignment: Some(VerticalAlignment::Center),
                        items: vec![Element::TextBlock(TextBlock {
                            text: "\u{2589}".to_string(),
                            size: Some(TextSize::ExtraLarge),
                            color: Some(status_color(entry.result.status)),
                            ..Default::default()
                        })],
                        ..Default::default()
                    },
                    Column {
                        width: Some(ColumnWidth::Stretch),
                        vertical_content_alignment: Some(VerticalAlignment::Center),
                        items: vec![Element::TextBlock(TextBlock {
                            text: entry.test.name.clone(),
                            size: Some(TextSize::Medium),
                            weight: Some(TextWeight::Bolder),
                            wrap: Some(true),
                            ..Default::default()
                        })],
                        ..Default::default()
                    },
                ],
                separator: None,
            })
        })
        .collect();

    Element::Container(Container {
        id: None,
        is_visible: None,
        items: vec![
            toggle_button(SHOW_TESTS_ID, "Show Tests", true),
            toggle_button(HIDE_TESTS_ID, "Hide Tests", false),
            Element::Container(Container {
                id: Some(TESTS_LIST_ID.to_string()),
                is_visible: Some(false),
                items: rows,
            }),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use source::{ResultEntry, Test, TestResult};

    fn results() -> TestResults {
        let mut results = TestResults::new("PROJ-1", "https://jira/browse/PROJ-1")
            .with_name("Nightly regression");
        for (key, status) in [
            ("PROJ-2", Status::Pass),
            ("PROJ-3", Status::Fail),
            ("PROJ-4", Status::Pass),
            ("PROJ-5", Status::Skipped),
            ("PROJ-6", Status::Pending),
        ] {
            let url = format!("https://jira/browse/{}", key);
            results.results.push(ResultEntry {
                test: Test::new(key, format!("test {}", key), url.clone()),
                result: TestResult::new(status, url),
            });
        }
        results
    }

    fn card_json(results: &TestResults) -> Value {
        let message = test_results_card(
            results,
            &[("ID", results.id.as_str()), ("Name", results.name.as_str())],
        )
        .unwrap();
        serde_json::to_value(message).unwrap()
    }

    #[test]
    fn test_message_wrapper() {
        let json = card_json(&results());

        assert_eq!(json["type"], "message");
        let attachment = &json["attachments"][0];
        assert_eq!(attachment["contentType"], CARD_CONTENT_TYPE);
        assert_eq!(attachment["contentUrl"], Value::Null);
        assert_eq!(attachment["content"]["$schema"], CARD_SCHEMA);
        assert_eq!(attachment["content"]["type"], "AdaptiveCard");
        assert_eq!(attachment["content"]["version"], "1.5");
    }

    #[test]
    fn test_heading() {
        let json = card_json(&results());
        let heading = &json["attachments"][0]["content"]["body"][0];

        assert_eq!(
            heading,
            &json!({
                "type": "ColumnSet",
                "columns": [
                    {
                        "type": "Column",
                        "width": "stretch",
                        "items": [{
                            "type": "TextBlock",
                            "text": "Test Results",
                            "color": "Accent",
                            "isSubtle": false,
                            "size": "Large",
                            "style": "heading",
                            "weight": "Default",
                            "wrap": true
                        }]
                    },
                    {
                        "type": "Column",
                        "width": "auto",
                        "items": [{
                            "type": "ActionSet",
                            "actions": [{
                                "type": "Action.OpenUrl",
                                "title": "Open Test Results",
                                "style": "positive",
                                "url": "https://jira/browse/PROJ-1"
                            }]
                        }]
                    }
                ]
            })
        );
    }

    #[test]
    fn test_summary_facts() {
        let json = card_json(&results());
        let summary = &json["attachments"][0]["content"]["body"][1];
        assert_eq!(summary["separator"], true);

        let stats = &summary["columns"][1]["items"][0]["facts"];
        assert_eq!(
            stats,
            &json!([
                {"title": "Test Cases", "value": "5"},
                {"title": "Passed", "value": "2"},
                {"title": "Failed", "value": "1"},
                {"title": "Skipped", "value": "1"},
                {"title": "Pending", "value": "1"}
            ])
        );

        let details = &summary["columns"][2];
        assert_eq!(details["separator"], true);
        assert_eq!(details["spacing"], "Large");
        assert_eq!(
            details["items"][0]["facts"],
            json!([
                {"title": "ID", "value": "PROJ-1"},
                {"title": "Name", "value": "Nightly regression"}
            ])
        );
    }

    #[test]
    fn test_summary_starts_with_pie_chart() {
        let json = card_json(&results());
        let chart = &json["attachments"][0]["content"]["body"][1]["columns"][0];

        assert_eq!(chart["width"], "auto");
        assert_eq!(chart["horizontalAlignment"], "Center");
        assert_eq!(chart["verticalContentAlignment"], "Center");
        let image = &chart["items"][0];
        assert_eq!(image["type"], "Image");
        assert!(image["url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_toggleable_test_list() {
        let json = card_json(&results());
        let container = &json["attachments"][0]["content"]["body"][2];
        let items = container["items"].as_array().unwrap();

        assert_eq!(items[0]["id"], SHOW_TESTS_ID);
        assert!(items[0].get("isVisible").is_none());
        assert_eq!(
            items[0]["actions"][0]["targetElements"],
            json!([
                {"elementId": "show-tests-button", "isVisible": false},
                {"elementId": "hide-tests-button", "isVisible": true},
                {"elementId": "tests-list", "isVisible": true}
            ])
        );

        assert_eq!(items[1]["id"], HIDE_TESTS_ID);
        assert_eq!(items[1]["isVisible"], false);
        assert_eq!(items[1]["actions"][0]["type"], "Action.ToggleVisibility");
        assert_eq!(items[1]["actions"][0]["title"], "Hide Tests");
        assert_eq!(
            items[1]["actions"][0]["targetElements"][2],
            json!({"elementId": "tests-list", "isVisible": false})
        );

        assert_eq!(items[2]["id"], TESTS_LIST_ID);
        assert_eq!(items[2]["isVisible"], false);
        assert_eq!(items[2]["items"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_rows_follow_result_order_and_status() {
        let json = card_json(&results());
        let rows = &json["attachments"][0]["content"]["body"][2]["items"][2]["items"];

        let colors: Vec<&str> = rows
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["columns"][1]["items"][0]["color"].as_str().unwrap())
            .collect();
        assert_eq!(colors, vec!["Good", "Attention", "Good", "Warning", "Default"]);

        let first = &rows[0];
        assert_eq!(
            first["columns"][0]["items"][0]["actions"][0],
            json!({
                "type": "Action.OpenUrl",
                "iconUrl": "icon:CursorClick",
                "style": "positive",
                "url": "https://jira/browse/PROJ-2"
            })
        );
        assert_eq!(first["columns"][1]["items"][0]["text"], "\u{2589}");
        assert_eq!(first["columns"][1]["items"][0]["size"], "ExtraLarge");
        assert_eq!(first["columns"][2]["items"][0]["text"], "test PROJ-2");
        assert_eq!(first["columns"][2]["items"][0]["weight"], "Bolder");
    }

    #[test]
    fn test_empty_results_without_details() {
        let results = TestResults::new("PROJ-1", "https://jira/browse/PROJ-1");
        let json = serde_json::to_value(test_results_card(&results, &[]).unwrap()).unwrap();
        let body = &json["attachments"][0]["content"]["body"];

        // chart and stats only
        assert_eq!(body[1]["columns"].as_array().unwrap().len(), 2);
        assert_eq!(body[1]["columns"][0]["items"][0]["type"], "Image");
        assert_eq!(body[1]["columns"][1]["items"][0]["facts"][0]["value"], "0");
        assert!(body[2]["items"][2]["items"].as_array().unwrap().is_empty());
    }
}

//! Interactive message card model and builders.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_TITLE: &str = "🤖️机器人提醒";

static UNICODE_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\u([0-9a-fA-F]{4})").expect("unicode escape regex"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardConfig {
    pub wide_screen_mode: bool,
    pub enable_forward: bool,
    pub update_multi: bool,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            wide_screen_mode: false,
            enable_forward: true,
            update_multi: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum CardText {
    PlainText { content: String },
    LarkMd { content: String },
}

impl CardText {
    pub fn plain(content: impl Into<String>) -> Self {
        CardText::PlainText {
            content: content.into(),
        }
    }

    pub fn markdown(content: impl Into<String>) -> Self {
        CardText::LarkMd {
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardHeader {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub template: String,
    pub title: CardText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardField {
    pub is_short: bool,
    pub text: CardText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonType {
    #[default]
    Default,
    Primary,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", rename = "button")]
pub struct Button {
    pub text: CardText,
    #[serde(rename = "type")]
    pub kind: ButtonType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub value: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionLayout {
    Bisected,
    Trisection,
    Flow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum CardElement {
    Hr,
    Note {
        elements: Vec<CardText>,
    },
    Div {
        fields: Vec<CardField>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        extra: Option<Button>,
    },
    Action {
        actions: Vec<Button>,
        layout: ActionLayout,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageCard {
    pub config: CardConfig,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub header: Option<CardHeader>,
    pub elements: Vec<CardElement>,
}

impl MessageCard {
    pub fn new(header: CardHeader, elements: Vec<CardElement>) -> Self {
        Self {
            config: CardConfig::default(),
            header: Some(header),
            elements,
        }
    }

    pub fn without_header(elements: Vec<CardElement>) -> Self {
        Self {
            config: CardConfig::default(),
            header: None,
            elements,
        }
    }

    /// JSON text sent as the message `content`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Header with a plain-text title; an empty title gets the default.
pub fn header(title: &str, color: &str) -> CardHeader {
    let title = if title.is_empty() { DEFAULT_TITLE } else { title };
    CardHeader {
        template: color.to_string(),
        title: CardText::plain(title),
    }
}

pub fn split_line() -> CardElement {
    CardElement::Hr
}

pub fn note(text: &str) -> CardElement {
    CardElement::Note {
        elements: vec![CardText::plain(text)],
    }
}

/// One short markdown field per message.
pub fn markdown<S: AsRef<str>>(messages: &[S]) -> CardElement {
    let fields = messages
        .iter()
        .map(|msg| CardField {
            is_short: true,
            text: CardText::markdown(clean_text_block(&process_message(msg.as_ref()))),
        })
        .collect();
    CardElement::Div {
        fields,
        extra: None,
    }
}

pub fn plain_text(message: &str) -> CardElement {
    CardElement::Div {
        fields: vec![CardField {
            is_short: false,
            text: CardText::plain(clean_text_block(&process_message(message))),
        }],
        extra: None,
    }
}

pub fn markdown_with_button(message: &str, button: Button) -> CardElement {
    CardElement::Div {
        fields: vec![CardField {
            is_short: true,
            text: CardText::markdown(process_new_line(&process_message(message))),
        }],
        extra: Some(button),
    }
}

pub fn button(text: &str, url: &str, value: Map<String, Value>, kind: ButtonType) -> Button {
    Button {
        text: CardText::plain(text),
        kind,
        url: Some(url.to_string()).filter(|u| !u.is_empty()),
        value,
    }
}

/// Single-button action row in flow layout.
pub fn one_button(button: Button) -> CardElement {
    CardElement::Action {
        actions: vec![button],
        layout: ActionLayout::Flow,
    }
}

/// Trims and JSON-escapes the text, without the surrounding quotes.
pub fn process_message(message: &str) -> String {
    let quoted = Value::String(message.trim().to_string()).to_string();
    quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .map(str::to_string)
        .unwrap_or(quoted)
}

/// Turns literal `\n` sequences into newlines.
pub fn process_new_line(message: &str) -> String {
    message.replace("\\n", "\n")
}

pub fn process_quote(message: &str) -> String {
    message.replace("\\\"", "\"")
}

/// Decodes literal `\uXXXX` escapes.
pub fn process_unicode(message: &str) -> String {
    UNICODE_ESCAPE
        .replace_all(message, |caps: &Captures| {
            u32::from_str_radix(&caps[1], 16)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

pub fn clean_text_block(message: &str) -> String {
    process_quote(&process_unicode(&process_new_line(message)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_defaults_title() {
        let h = header("", "blue");
        assert_eq!(h.title, CardText::plain(DEFAULT_TITLE));
        assert_eq!(
            serde_json::to_value(header("Deploy", "red")).unwrap(),
            json!({"template": "red", "title": {"tag": "plain_text", "content": "Deploy"}})
        );
    }

    #[test]
    fn text_cleanup() {
        assert_eq!(process_message("  say \"hi\"\n "), r#"say \"hi\""#);
        assert_eq!(process_new_line(r"a\nb"), "a\nb");
        assert_eq!(process_quote(r#"\"q\""#), "\"q\"");
        assert_eq!(process_unicode(r"\u003cb\u003e"), "<b>");
        assert_eq!(process_unicode(r"\uZZZZ"), r"\uZZZZ");
        assert_eq!(clean_text_block(&process_message("line1\nsay \"x\"")), "line1\nsay \"x\"");
    }

    #[test]
    fn card_serialization() {
        let mut value = Map::new();
        value.insert("id".to_string(), json!(3));
        let card = MessageCard::new(
            header("Task done", "green"),
            vec![
                markdown(&["**status**: ok", "took 5s"]),
                split_line(),
                one_button(button("Open", "https://example.com", value, ButtonType::Primary)),
                note("sent by bot"),
            ],
        );

        let v = serde_json::to_value(&card).unwrap();
        assert_eq!(
            v["config"],
            json!({"wide_screen_mode": false, "enable_forward": true, "update_multi": false})
        );
        assert_eq!(v["elements"][0]["tag"], "div");
        assert_eq!(v["elements"][0]["fields"][1]["text"]["tag"], "lark_md");
        assert_eq!(v["elements"][0]["fields"][1]["is_short"], true);
        assert_eq!(v["elements"][1], json!({"tag": "hr"}));
        assert_eq!(
            v["elements"][2],
            json!({
                "tag": "action",
                "layout": "flow",
                "actions": [{
                    "tag": "button",
                    "text": {"tag": "plain_text", "content": "Open"},
                    "type": "primary",
                    "url": "https://example.com",
                    "value": {"id": 3}
                }]
            })
        );
        assert_eq!(v["elements"][3]["elements"][0]["content"], "sent by bot");
    }

    #[test]
    fn card_without_header_omits_it() {
        let card = MessageCard::without_header(vec![plain_text("hello")]);
        let v: Value = serde_json::from_str(&card.to_json().unwrap()).unwrap();
        assert!(v.get("header").is_none());
        assert_eq!(v["elements"][0]["fields"][0]["is_short"], false);
    }

    #[test]
    fn extra_button_on_div() {
        let el = markdown_with_button("pick one", button("Go", "", Map::new(), ButtonType::Default));
        let v = serde_json::to_value(el).unwrap();
        assert_eq!(v["extra"]["type"], "default");
        assert!(v["extra"].get("url").is_none());
    }
}

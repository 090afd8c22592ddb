use super::*;

fn plain() -> Renderer {
    Renderer::new(Capabilities {
        highlight: false,
        escape: EscapeMode::Legacy,
    })
}

fn assistant(renderer: &Renderer, content: &str, format: Format) -> MessageView {
    renderer.render(Role::Assistant, content, format, "chat-1", "msg-1")
}

struct Marker;

impl Highlighter for Marker {
    fn highlight(&self, node: &mut CodeNode) {
        let html = format!("<b>{}</b>", node.body());
        node.set_highlighted(html);
    }
}

#[test]
fn markdown_renders_through_converter() {
    let view = assistant(&plain(), "### Title", Format::Markdown);
    assert_eq!(view.markup(), Some("<h3>Title</h3>"));
    assert!(!view.fallback);
    assert_eq!(view.raw, "### Title");
}

#[test]
fn text_is_plain_and_uninterpreted() {
    let view = assistant(&plain(), "**not bold** <b>", Format::Text);
    assert_eq!(view.body, Body::PlainText("**not bold** <b>".to_string()));
    assert_eq!(view.markup(), None);
    assert_eq!(view.code_blocks, 0);
}

#[test]
fn unknown_format_label_renders_as_markdown() {
    let view = assistant(&plain(), "- a\n- b", Format::parse_lossy("rich"));
    assert_eq!(view.format, Format::Markdown);
    assert_eq!(view.markup(), Some("<ul><li>a</li><li>b</li></ul>"));
}

#[test]
fn invalid_json_does_not_fail() {
    let view = assistant(&plain(), "not json", Format::Json);
    assert!(!view.fallback);
    assert_eq!(
        view.markup(),
        Some("<pre><code class=\"json-raw\">not json</code></pre>")
    );
    assert_eq!(view.code_blocks, 1);
}

#[test]
fn json_is_pretty_printed_and_tagged() {
    let view = assistant(&plain(), "{\"a\":1}", Format::Json);
    assert_eq!(
        view.markup(),
        Some("<pre><code class=\"json-raw\">{\n  &quot;a&quot;: 1\n}</code></pre>")
    );
    assert_eq!(
        view.css_classes,
        vec!["message", "assistant-message", "json-content"]
    );
}

#[test]
fn code_format_closes_unterminated_fence() {
    let view = assistant(&plain(), "Here:\n```rust\nfn main() {", Format::Code);
    let html = view.markup().unwrap();
    assert!(html.contains("<pre><code class=\"language-rust\">fn main() {</code></pre>"));
    assert_eq!(html.matches("<pre>").count(), html.matches("</pre>").count());
    assert_eq!(view.code_blocks, 1);
}

#[test]
fn user_messages_get_user_class() {
    let view = plain().render(Role::User, "hi", Format::Text, "c", "m");
    assert_eq!(view.css_classes, vec!["message", "user-message"]);
}

#[test]
fn highlighter_sees_each_code_node() {
    let renderer = Renderer::default().with_highlighter(Box::new(Marker));
    let view = assistant(
        &renderer,
        "```rust\nlet a = 1;\n```\ntext\n```py\nx\n```",
        Format::Markdown,
    );
    let html = view.markup().unwrap();
    assert_eq!(html.matches("data-highlighted=\"yes\"").count(), 2);
    assert!(html.contains("<b>let a = 1;</b>"));
    assert_eq!(view.code_blocks, 2);
}

#[test]
fn highlighting_capability_off_skips_highlighter() {
    let renderer = plain().with_highlighter(Box::new(Marker));
    let view = assistant(&renderer, "```rust\nlet a = 1;\n```", Format::Markdown);
    assert!(!view.markup().unwrap().contains("data-highlighted"));
}

struct Exploding;

impl Highlighter for Exploding {
    fn highlight(&self, _node: &mut CodeNode) {
        panic!("highlighter failure");
    }
}

#[test]
fn panicking_highlighter_still_renders_view() {
    let renderer = Renderer::default().with_highlighter(Box::new(Exploding));
    let view = assistant(&renderer, "Intro\n```rust\nlet a = 1;\n```", Format::Markdown);
    assert!(!view.fallback);
    let html = view.markup().unwrap();
    assert!(html.contains("<pre><code class=\"language-rust\">let a = 1;</code></pre>"));
    assert!(!html.contains("data-highlighted"));
    assert_eq!(view.code_blocks, 1);
}

#[test]
fn json_is_not_highlighted() {
    let renderer = Renderer::default().with_highlighter(Box::new(Marker));
    let view = assistant(&renderer, "[1]", Format::Json);
    assert!(!view.markup().unwrap().contains("data-highlighted"));
}

#[test]
fn failure_falls_back_to_raw_plain_text() {
    let renderer = plain();
    let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let view = renderer.assemble(
        Role::Assistant,
        "# raw",
        Format::Markdown,
        "c",
        "m",
        Err(RenderError::Json(err)),
    );
    assert!(view.fallback);
    assert_eq!(view.body, Body::PlainText("# raw".to_string()));
    assert_eq!(view.code_blocks, 0);
}

#[test]
fn strict_capability_keeps_text_escaped() {
    let renderer = Renderer::new(Capabilities {
        highlight: false,
        escape: EscapeMode::Strict,
    });
    let view = assistant(&renderer, "a <b>", Format::Markdown);
    assert_eq!(view.markup(), Some("<p>a &lt;b&gt;</p>"));
}

#[test]
fn view_round_trips_to_identical_rerender() {
    let renderer = plain();
    let message = Message::new("chat-9", Role::Assistant, "1. one\n2. two", Format::Markdown);
    let view = renderer.render_message(&message);
    let record = view.to_record(1_700_000_000_000);
    assert_eq!(record.content, message.content());
    assert_eq!(record.id, message.id());
    assert_eq!(renderer.render_record(&record), view);
}

#[test]
fn copy_text_is_raw_content() {
    let view = assistant(&plain(), "**x**", Format::Markdown);
    assert_eq!(view.copy_text(), "**x**");
    assert_eq!(view.markup(), Some("<p><strong>x</strong></p>"));
}

#[test]
fn from_config_installs_syntect_highlighter() {
    let renderer = Renderer::from_config(&Config::default());
    let view = assistant(&renderer, "```rust\nfn main() {}\n```", Format::Markdown);
    assert!(view.markup().unwrap().contains("data-highlighted=\"yes\""));

    let config = Config {
        highlight: false,
        ..Config::default()
    };
    let view = assistant(&Renderer::from_config(&config), "```rust\nfn main() {}\n```", Format::Markdown);
    assert!(!view.markup().unwrap().contains("data-highlighted"));
}

/// Visible text of a code block: tags stripped, entities decoded once.
fn displayed_code(html: &str) -> String {
    let start = html.find("<pre>").unwrap();
    let end = html.rfind("</pre>").unwrap();
    let tags = regex::Regex::new("<[^>]*>").unwrap();
    crate::core::markup::decode_entities(&tags.replace_all(&html[start..end], ""))
}

#[test]
fn highlighting_keeps_entity_text_in_code() {
    let content = "```html\nx &lt; y &amp;amp; z\n```";
    let highlighted = assistant(&Renderer::from_config(&Config::default()), content, Format::Code);
    let plain_view = assistant(&plain(), content, Format::Code);

    let html = highlighted.markup().unwrap();
    assert!(html.contains("data-highlighted=\"yes\""));
    assert_eq!(displayed_code(html), "x &lt; y &amp;amp; z");
    assert_eq!(displayed_code(plain_view.markup().unwrap()), "x &lt; y &amp;amp; z");
}

#[test]
fn highlighting_keeps_entity_text_in_markdown_fence() {
    let content = "```rust\nlet s = \"&lt;\";\n```";
    let view = assistant(&Renderer::from_config(&Config::default()), content, Format::Markdown);
    let html = view.markup().unwrap();
    assert!(html.contains("data-highlighted=\"yes\""));
    assert_eq!(displayed_code(html), "let s = \"&lt;\";");
}

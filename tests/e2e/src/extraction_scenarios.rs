//! Full extraction scenarios: selection in, two text edits out.

use pretty_assertions::assert_eq;
use refract_config::AppConfig;
use refract_engine::{ComponentExtractor, ExtractError, ExtractorOptions, SourceParser};
use refract_foundation::protocol::FunctionStyle;
use refract_foundation::validation::normalize_component_name;

use crate::{apply_refactor, context_for};

fn extractor() -> ComponentExtractor {
    ComponentExtractor::new(ExtractorOptions::default())
}

fn extractor_from_config() -> ComponentExtractor {
    let config = AppConfig::default();
    ComponentExtractor::new(ExtractorOptions {
        dialect_plugins: config.parser.plugins.clone(),
        function_style: config.refactor.function_style,
    })
}

/// Re-parse a refactored document to prove both edits left it well-formed.
fn assert_parses(text: &str) {
    let parser = SourceParser::new(&[
        "jsx".to_string(),
        "typescript".to_string(),
    ]);
    parser
        .parse(text)
        .unwrap_or_else(|e| panic!("refactored document no longer parses: {}\n{}", e, text));
}

#[test]
fn class_state_read_becomes_a_prop() {
    let text = "class Foo extends Component { render() { return <div>{this.state.x}</div> } }";
    let ctx = context_for(text, "<div>{this.state.x}</div>", "Bar", true);
    let result = extractor().extract(&ctx).unwrap();

    assert_eq!(result.replace_jsx_code, "<Bar x={this.state.x} />");
    assert!(result.component_code.starts_with("class Bar extends Component"));
    assert!(result.component_code.contains("this.props.x"));
    assert!(!result.component_code.contains("this.state.x"));
    assert_eq!(result.insert_at, 0);

    let refactored = apply_refactor(&ctx, &result);
    assert!(refactored.contains("<Bar x={this.state.x} />"));
    assert_parses(&refactored);
}

#[test]
fn shared_state_roots_collapse_into_a_container_prop() {
    let text = "class Profile extends Component { render() { return <div>{this.state.user.name}{this.state.user.age}</div>; } }";
    let ctx = context_for(
        text,
        "<div>{this.state.user.name}{this.state.user.age}</div>",
        "UserCard",
        true,
    );
    let result = extractor().extract(&ctx).unwrap();

    assert_eq!(result.replace_jsx_code, "<UserCard user={this.state.user} />");
    assert!(result.component_code.contains("this.props.user.name"));
    assert!(result.component_code.contains("this.props.user.age"));
    assert_parses(&apply_refactor(&ctx, &result));
}

#[test]
fn key_attribute_travels_to_the_replacement_tag() {
    let text = "function List({ items }) { return <ul>{items.map(item => <li key={item.id}>{item.name}</li>)}</ul>; }";
    let ctx = context_for(text, "<li key={item.id}>{item.name}</li>", "Row", false);
    let result = extractor().extract(&ctx).unwrap();

    assert_eq!(result.replace_jsx_code, "<Row key={item.id} name={item.name} />");
    assert!(
        !result.component_code.contains("key="),
        "key must not remain on the extracted markup: {}",
        result.component_code
    );
    assert!(result.component_code.contains("props.name"));
    assert_parses(&apply_refactor(&ctx, &result));
}

#[test]
fn colliding_prop_names_are_underscore_mangled() {
    let text = "function Form(props) { const billing = get(); const shipping = get2(); return <div>{billing.value}{shipping.value}</div>; }";
    let ctx = context_for(text, "<div>{billing.value}{shipping.value}</div>", "Pane", false);
    let result = extractor().extract(&ctx).unwrap();

    assert_eq!(
        result.replace_jsx_code,
        "<Pane value={billing.value} _value={shipping.value} />"
    );
    assert!(result.component_code.contains("props.value"));
    assert!(result.component_code.contains("props._value"));
    assert_parses(&apply_refactor(&ctx, &result));
}

#[test]
fn textually_identical_expressions_bind_once() {
    let text = "function Badge(props) { const label = props.label; return <div>{label}{label}</div>; }";
    let ctx = context_for(text, "<div>{label}{label}</div>", "Tag", false);
    let result = extractor().extract(&ctx).unwrap();

    assert_eq!(result.replace_jsx_code, "<Tag label={label} />");
    assert_parses(&apply_refactor(&ctx, &result));
}

#[test]
fn plain_text_selection_raises_invalid_jsx() {
    let text = "const s = \"just text\";";
    let ctx = context_for(text, "just text", "Nope", false);
    assert!(matches!(
        extractor().extract(&ctx),
        Err(ExtractError::InvalidJsx)
    ));
}

#[test]
fn multi_root_selection_recovers_through_wrapping() {
    let text = "function App() { return <main><header /><footer /></main>; }";
    let ctx = context_for(text, "<header /><footer />", "Chrome", false);
    let result = extractor().extract(&ctx).unwrap();

    assert_eq!(result.replace_jsx_code, "<Chrome />");
    assert!(result.component_code.contains("<header"));
    assert!(result.component_code.contains("<footer"));
    assert_parses(&apply_refactor(&ctx, &result));
}

#[test]
fn bound_handlers_are_threaded_by_method_name() {
    let text = "class Toolbar extends Component { render() { return <button onClick={this.onSave.bind(this)}>Save</button>; } }";
    let ctx = context_for(
        text,
        "<button onClick={this.onSave.bind(this)}>Save</button>",
        "SaveButton",
        true,
    );
    let result = extractor().extract(&ctx).unwrap();

    assert_eq!(
        result.replace_jsx_code,
        "<SaveButton onSave={this.onSave.bind(this)} />"
    );
    assert!(result.component_code.contains("this.props.onSave"));
    assert_parses(&apply_refactor(&ctx, &result));
}

#[test]
fn configured_arrow_style_shapes_the_component() {
    let text = "function App(props) { return <span>{props.msg}</span>; }";
    let ctx = context_for(text, "<span>{props.msg}</span>", "Message", false);

    let arrow = ComponentExtractor::new(ExtractorOptions {
        function_style: FunctionStyle::ArrowFunction,
        ..ExtractorOptions::default()
    });
    let result = arrow.extract(&ctx).unwrap();
    assert!(result.component_code.starts_with("const Message = (props) =>"));
    assert_parses(&apply_refactor(&ctx, &result));
}

#[test]
fn default_configuration_drives_the_extractor() {
    let text = "function App(props) { return <span>{props.msg}</span>; }";
    let ctx = context_for(text, "<span>{props.msg}</span>", "Message", false);
    let result = extractor_from_config().extract(&ctx).unwrap();
    assert!(result.component_code.starts_with("function Message(props)"));
}

#[test]
fn typescript_documents_extract_like_javascript() {
    let text = "const App = ({ user }: Props) => { return <div>{user.name}</div>; };";
    let ctx = context_for(text, "<div>{user.name}</div>", "Name", false);
    let result = extractor_from_config().extract(&ctx).unwrap();

    assert_eq!(result.replace_jsx_code, "<Name name={user.name} />");
    assert!(result.component_code.contains("props.name"));
}

#[test]
fn doc_comments_keep_their_declaration_below_the_insert() {
    let text = "import React from \"react\";\n\n/** The whole app. */\nfunction App(props) { return <div>{props.x}</div>; }";
    let ctx = context_for(text, "<div>{props.x}</div>", "Inner", false);
    let result = extractor().extract(&ctx).unwrap();

    assert_eq!(result.insert_at, text.find("/** The whole app. */").unwrap());
    let refactored = apply_refactor(&ctx, &result);
    let comment_at = refactored.find("/** The whole app. */").unwrap();
    let component_at = refactored.find("function Inner").unwrap();
    assert!(
        component_at < comment_at,
        "the new component must sit above the commented declaration:\n{}",
        refactored
    );
    assert_parses(&refactored);
}

#[test]
fn prompted_names_normalize_before_extraction() {
    let text = "function App(props) { return <span>{props.msg}</span>; }";
    let name = normalize_component_name("status message");
    assert_eq!(name, "StatusMessage");

    let ctx = context_for(text, "<span>{props.msg}</span>", &name, false);
    let result = extractor().extract(&ctx).unwrap();
    assert_eq!(result.replace_jsx_code, "<StatusMessage msg={props.msg} />");
}

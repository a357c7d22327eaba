use super::*;

fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
        .block_on(fut)
}

#[test]
fn test_plain_payload() {
    let project = parse_project_payload(r#"{"files":{"index.html":"<h1>hi</h1>"}}"#).unwrap();
    assert_eq!(project.files.get("index.html").unwrap(), "<h1>hi</h1>");
    assert_eq!(project.dependencies, None);
}

#[test]
fn test_fenced_payload() {
    let raw = "```json\n{\"files\":{\"a.js\":\"1\"}}\n```";
    let project = parse_project_payload(raw).unwrap();
    assert_eq!(project.file_count(), 1);

    let raw = "```\n{\"files\":{\"b.js\":\"2\"}}\n```";
    assert!(parse_project_payload(raw).unwrap().files.contains_key("b.js"));
}

#[test]
fn test_prose_around_payload() {
    let raw = "Sure! Here is your project:\n{\"files\":{\"src/App.tsx\":\"const a = {b: 1};\"}}\nLet me know {if} you need more.";
    let project = parse_project_payload(raw).unwrap();
    assert_eq!(
        project.files.get("src/App.tsx").unwrap(),
        "const a = {b: 1};"
    );
}

#[test]
fn test_raw_newlines_inside_strings_are_repaired() {
    let raw = "{\"files\":{\"index.html\":\"<html>\n\t<body></body>\r\n</html>\"}}";
    let project = parse_project_payload(raw).unwrap();
    assert_eq!(
        project.files.get("index.html").unwrap(),
        "<html>\n\t<body></body>\r\n</html>"
    );
}

#[test]
fn test_structure_newlines_are_left_alone() {
    let raw = "{\n  \"files\": {\n    \"a.txt\": \"x\ny\"\n  }\n}";
    let repaired = escape_control_in_strings(raw);
    assert_eq!(repaired, "{\n  \"files\": {\n    \"a.txt\": \"x\\ny\"\n  }\n}");
    assert_eq!(
        parse_project_payload(raw).unwrap().files.get("a.txt").unwrap(),
        "x\ny"
    );
}

#[test]
fn test_escaped_quotes_do_not_end_strings() {
    let raw = r#"{"files":{"a.js":"say \"}\" now"}}"#;
    assert_eq!(extract_json_object(raw), Some(raw));
    let project = parse_project_payload(raw).unwrap();
    assert_eq!(project.files.get("a.js").unwrap(), "say \"}\" now");
}

#[test]
fn test_dependencies_pass_through() {
    let raw = r#"{"files":{"a.js":""},"dependencies":{"react":"^18.2.0"},"devDependencies":{"vite":"^5"}}"#;
    let project = parse_project_payload(raw).unwrap();
    assert_eq!(
        project.dependencies.unwrap().get("react").map(String::as_str),
        Some("^18.2.0")
    );
    assert!(project.dev_dependencies.unwrap().contains_key("vite"));
}

#[test]
fn test_missing_files_is_invalid_structure() {
    assert_eq!(
        parse_project_payload(r#"{"project":{}}"#),
        Err(GenerationError::InvalidStructure)
    );
    assert_eq!(
        parse_project_payload(r#"{"files":["a"]}"#),
        Err(GenerationError::InvalidStructure)
    );
}

#[test]
fn test_garbage_is_malformed() {
    assert!(matches!(
        parse_project_payload("no json here"),
        Err(GenerationError::MalformedPayload(_))
    ));
    assert!(matches!(
        parse_project_payload("{\"files\": {\"a\": }"),
        Err(GenerationError::MalformedPayload(_))
    ));
}

#[test]
fn test_unbalanced_braces_fall_back_to_last_close() {
    let text = "x { \"a\": 1 } trailing {";
    assert_eq!(extract_json_object(text), Some("{ \"a\": 1 }"));
    assert_eq!(extract_json_object("{ { }"), Some("{ { }"));
    assert_eq!(extract_json_object("no braces"), None);
}

#[test]
fn test_status_mapping() {
    assert_eq!(
        GenerationError::from_status(400, "x"),
        GenerationError::MissingPrompt
    );
    assert_eq!(
        GenerationError::from_status(402, "x"),
        GenerationError::CreditsExhausted
    );
    assert_eq!(
        GenerationError::from_status(429, "x"),
        GenerationError::RateLimited
    );
    assert_eq!(
        GenerationError::from_status(500, "boom"),
        GenerationError::Upstream {
            status: 500,
            message: "boom".to_string()
        }
    );
}

#[test]
fn test_chat_request_shape() {
    let settings = GenerationSettings::default();
    let body = chat_request(&settings, "a calculator");
    assert_eq!(body["model"], settings.model.as_str());
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(
        body["messages"][1]["content"],
        "Generate a complete project for: a calculator"
    );
    assert_eq!(body["max_tokens"], 8000);
}

#[test]
fn test_empty_prompt_is_rejected_before_any_request() {
    let generator = HttpGenerator::new(GenerationSettings {
        endpoint: Some("http://127.0.0.1:9/unused".to_string()),
        ..GenerationSettings::default()
    })
    .unwrap();
    let result = block_on(generator.generate("   ".to_string()));
    assert_eq!(result, Err(GenerationError::MissingPrompt));
}

#[test]
fn test_missing_endpoint_or_key_is_not_configured() {
    let generator = HttpGenerator::new(GenerationSettings::default()).unwrap();
    let result = block_on(generator.generate("app".to_string()));
    assert!(matches!(result, Err(GenerationError::NotConfigured(_))));

    let generator = HttpGenerator::new(GenerationSettings {
        backend: GenerationBackend::ChatCompletions,
        endpoint: Some("http://127.0.0.1:9/v1/chat/completions".to_string()),
        api_key_env: "PROMPTBENCH_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
        ..GenerationSettings::default()
    })
    .unwrap();
    let result = block_on(generator.generate("app".to_string()));
    assert!(matches!(result, Err(GenerationError::NotConfigured(_))));
}
